//! Arguments

// Imports
use {
	pwlat::{config::Design, data::EcptMetric},
	std::path::PathBuf,
};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "latency")]
	Latency(Latency),

	#[clap(name = "compare")]
	Compare(Compare),

	#[clap(name = "presets")]
	Presets(Presets),
}

/// Reduces page walk traces into a latency table
#[derive(Debug, clap::Args)]
pub struct Latency {
	/// Input
	#[clap(flatten)]
	pub input: Input,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Page table design
	#[clap(long = "design")]
	pub design: Option<Design>,

	/// Cost model preset
	#[clap(long = "preset")]
	pub preset: Option<String>,

	/// Trace file suffix
	#[clap(long = "suffix")]
	pub suffix: Option<String>,

	/// Main memory cost
	///
	/// Overrides the cost of the `MEMORY` level of the preset
	#[clap(long = "memory-cost")]
	pub memory_cost: Option<u64>,

	/// Fails a trace on its first unknown label or malformed field
	#[clap(long = "strict")]
	pub strict: bool,

	/// Only lists the traces that would be reduced
	#[clap(long = "dry-run")]
	pub dry_run: bool,

	/// Output table
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,

	/// Results directory
	///
	/// Receives a report and a copy of the log of each benchmark
	#[clap(long = "results-dir")]
	pub results_dir: Option<PathBuf>,
}

/// Traces to reduce
#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub struct Input {
	/// Directory with the traces of every benchmark
	#[clap(long = "dir")]
	pub dir: Option<PathBuf>,

	/// Single trace
	#[clap(long = "file")]
	pub file: Option<PathBuf>,
}

/// Compares the IPC of two designs
#[derive(Debug, clap::Args)]
pub struct Compare {
	/// Access rates of the baseline
	#[clap(long = "baseline-access")]
	pub baseline_access: PathBuf,

	/// Latency table of the baseline
	#[clap(long = "baseline-latency")]
	pub baseline_latency: PathBuf,

	/// Design of the baseline
	#[clap(long = "baseline-design", default_value = "radix")]
	pub baseline_design: Design,

	/// Access rates of the candidate
	#[clap(long = "candidate-access")]
	pub candidate_access: PathBuf,

	/// Latency table of the candidate
	#[clap(long = "candidate-latency")]
	pub candidate_latency: PathBuf,

	/// Design of the candidate
	#[clap(long = "candidate-design", default_value = "ecpt")]
	pub candidate_design: Design,

	/// Latency used as the page walk latency of ECPT tables
	#[clap(long = "ecpt-metric", default_value = "parallel")]
	pub ecpt_metric: EcptMetric,

	/// Output comparison
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,
}

/// Lists all presets
#[derive(Debug, clap::Args)]
pub struct Presets {
	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,
}
