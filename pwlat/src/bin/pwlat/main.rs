//! Page walk latency (`pwlat`)

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	pwlat::{
		aggregate::{self, LogFile},
		compare::{AccessTable, Comparison, IpcTable},
		config::{ConfigFile, Overrides, RunConfig},
		Aggregator,
		BenchmarkTable,
	},
	pwlat_util::logger,
	std::{fs, path::Path},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	match args.sub_cmd {
		args::SubCmd::Latency(cmd_args) => self::latency(cmd_args),
		args::SubCmd::Compare(cmd_args) => self::compare(cmd_args),
		args::SubCmd::Presets(cmd_args) => self::presets(cmd_args),
	}
}

/// Reads the config file, if any
fn read_config_file(path: Option<&Path>) -> Result<ConfigFile, anyhow::Error> {
	match path {
		Some(path) => ConfigFile::from_path(path),
		None => Ok(ConfigFile::default()),
	}
}

/// Runs the `latency` sub-command
fn latency(cmd_args: args::Latency) -> Result<(), anyhow::Error> {
	// Resolve the configuration before touching any trace
	let config_file = self::read_config_file(cmd_args.config_file.as_deref())?;
	let config = RunConfig::resolve(&config_file, Overrides {
		design:      cmd_args.design,
		preset:      cmd_args.preset,
		suffix:      cmd_args.suffix,
		strict:      cmd_args.strict,
		memory_cost: cmd_args.memory_cost,
	})
	.context("Invalid configuration")?;
	tracing::debug!(?config, "Resolved configuration");

	let log_files = match (&cmd_args.input.dir, &cmd_args.input.file) {
		(Some(dir), _) => aggregate::discover(dir, &config.suffix, &config.exclude_extensions)
			.context("Unable to discover log files")?,
		(None, Some(file)) => vec![LogFile::from_path(file, &config.suffix)],
		(None, None) => anyhow::bail!("Either `--dir` or `--file` must be given"),
	};
	if log_files.is_empty() {
		tracing::warn!(suffix = %config.suffix, "No log files found");
		return Ok(());
	}

	if cmd_args.dry_run {
		for log_file in &log_files {
			println!("{}: {}", log_file.benchmark, log_file.path.display());
		}
		return Ok(());
	}

	tracing::info!(
		design = %config.design,
		preset = %config.preset,
		"Reducing {} log files",
		log_files.len()
	);

	let mut aggregator = Aggregator::new(&config);
	if let Some(results_dir) = &cmd_args.results_dir {
		fs::create_dir_all(results_dir)
			.with_context(|| format!("Unable to create results directory {results_dir:?}"))?;
		aggregator = aggregator.with_results_dir(results_dir);
	}
	let output = aggregator.run(&log_files).context("Unable to reduce log files")?;

	print!("{}", output.table);
	if let Some(output_path) = &cmd_args.output_file {
		output.table.to_path(output_path)?;
		tracing::info!(path = ?output_path, "Wrote latency table");
	}

	Ok(())
}

/// Runs the `compare` sub-command
fn compare(cmd_args: args::Compare) -> Result<(), anyhow::Error> {
	let ipc_table = |access_path: &Path, latency_path: &Path, design| -> Result<IpcTable, anyhow::Error> {
		let access = AccessTable::from_path(access_path)?;
		let latencies = BenchmarkTable::from_path(latency_path, design)?;
		IpcTable::new(&access, &latencies, cmd_args.ecpt_metric)
			.with_context(|| format!("Unable to join {access_path:?} with {latency_path:?}"))
	};

	let baseline = ipc_table(
		&cmd_args.baseline_access,
		&cmd_args.baseline_latency,
		cmd_args.baseline_design,
	)
	.context("Unable to compute baseline IPC")?;
	let candidate = ipc_table(
		&cmd_args.candidate_access,
		&cmd_args.candidate_latency,
		cmd_args.candidate_design,
	)
	.context("Unable to compute candidate IPC")?;

	let comparison = Comparison::new(&baseline, &candidate).context("Unable to compare designs")?;
	print!("{comparison}");

	if let Some(output_path) = &cmd_args.output_file {
		comparison.to_path(output_path)?;
		tracing::info!(path = ?output_path, "Wrote comparison");
	}

	Ok(())
}

/// Runs the `presets` sub-command
fn presets(cmd_args: args::Presets) -> Result<(), anyhow::Error> {
	let config_file = self::read_config_file(cmd_args.config_file.as_deref())?;
	for preset in config_file.presets() {
		let costs = preset.costs;
		let overheads = preset.overheads;
		println!(
			"{}: ZERO {}, L1 {}, L2 {}, LLC {}, PWC {}, MEMORY {} | hash {}, pud_cwc {}, pmd_cwc {} | suffixes: {}",
			preset.name,
			costs.zero,
			costs.l1,
			costs.l2,
			costs.llc,
			costs.pwc,
			costs.memory,
			overheads.hash,
			overheads.pud_cwc,
			overheads.pmd_cwc,
			preset.suffixes.join(", ")
		);
	}

	Ok(())
}
