//! Benchmark aggregation

// Imports
use {
	crate::{
		config::{Design, RunConfig},
		data::FileReport,
		dyna_log::DynaLogReader,
		reduce::{ReduceError, TraceReducer},
		reducers::{EcptReducer, RadixReducer},
		stats::IssueTally,
		table::{BenchmarkRow, BenchmarkTable},
	},
	anyhow::Context,
	itertools::Itertools,
	std::{
		fs,
		io,
		path::{Path, PathBuf},
	},
};

/// Log file of a benchmark
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct LogFile {
	/// Benchmark name
	pub benchmark: String,

	/// Path
	pub path: PathBuf,
}

impl LogFile {
	/// Creates a log file from a path given directly, bypassing discovery.
	///
	/// The benchmark name is recovered from the file name if it contains `suffix`,
	/// otherwise the file stem is used.
	pub fn from_path(path: &Path, suffix: &str) -> Self {
		let file_name = path.file_name().map(|file_name| file_name.to_string_lossy()).unwrap_or_default();
		let benchmark = match self::benchmark_name(&file_name, suffix) {
			Some(benchmark) => benchmark.to_owned(),
			None => path
				.file_stem()
				.map(|stem| stem.to_string_lossy().into_owned())
				.unwrap_or_else(|| path.display().to_string()),
		};

		Self {
			benchmark,
			path: path.to_path_buf(),
		}
	}
}

/// Returns the benchmark name of a log file named `file_name`.
///
/// Log files are named `<benchmark><suffix>`, optionally followed by more
/// text, so the name is everything before the first `suffix`.
pub fn benchmark_name<'a>(file_name: &'a str, suffix: &str) -> Option<&'a str> {
	file_name
		.find(suffix)
		.map(|suffix_idx| &file_name[..suffix_idx])
		.filter(|benchmark| !benchmark.is_empty())
}

/// Returns whether `file_name` has one of the extensions in `exclude_extensions`
pub fn is_excluded(file_name: &str, exclude_extensions: &[String]) -> bool {
	Path::new(file_name)
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| exclude_extensions.iter().any(|exclude| exclude.eq_ignore_ascii_case(ext)))
}

/// Discovers all log files in `dir` containing `suffix`, sorted by benchmark name
pub fn discover(dir: &Path, suffix: &str, exclude_extensions: &[String]) -> Result<Vec<LogFile>, anyhow::Error> {
	let entries = fs::read_dir(dir).with_context(|| format!("Unable to read directory {dir:?}"))?;

	let mut log_files = vec![];
	for entry in entries {
		let entry = entry.with_context(|| format!("Unable to read entry of {dir:?}"))?;
		let path = entry.path();
		if !path.is_file() {
			continue;
		}

		let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
			tracing::debug!(?path, "Skipping non-utf8 file name");
			continue;
		};
		if self::is_excluded(&file_name, exclude_extensions) {
			tracing::trace!(?path, "Skipping excluded file");
			continue;
		}

		if let Some(benchmark) = self::benchmark_name(&file_name, suffix) {
			log_files.push(LogFile {
				benchmark: benchmark.to_owned(),
				path,
			});
		}
	}

	Ok(log_files.into_iter().sorted().collect())
}

/// Aggregator
#[derive(Debug)]
pub struct Aggregator<'a> {
	/// Run config
	config: &'a RunConfig,

	/// Results directory
	results_dir: Option<&'a Path>,
}

impl<'a> Aggregator<'a> {
	/// Creates a new aggregator
	pub fn new(config: &'a RunConfig) -> Self {
		Self {
			config,
			results_dir: None,
		}
	}

	/// Saves per-benchmark reports and a copy of each log in `results_dir`
	#[must_use]
	pub fn with_results_dir(self, results_dir: &'a Path) -> Self {
		Self {
			results_dir: Some(results_dir),
			..self
		}
	}

	/// Reduces a single log file
	pub fn reduce_file(&self, log_file: &LogFile) -> Result<FileReport, anyhow::Error> {
		let file = fs::File::open(&log_file.path).with_context(|| format!("Unable to open log file {:?}", log_file.path))?;
		let mut log = DynaLogReader::from_reader(io::BufReader::new(file), self.config.design.format())
			.context("Unable to read dyna log")?;
		match log.marker_line() {
			Some(marker_line) => tracing::debug!(benchmark = %log_file.benchmark, "Statistics start after line {}", marker_line + 1),
			None => tracing::warn!(benchmark = %log_file.benchmark, "No marker line found, reading from the first line"),
		}

		let trace_reducer = TraceReducer::new(self.config.strictness, self.config.debug_output_period);
		let (output, statistics) = match self.config.design {
			Design::Radix => trace_reducer.reduce(&mut log, RadixReducer::new(self.config.costs)),
			Design::Ecpt => trace_reducer.reduce(&mut log, EcptReducer::new(self.config.costs, self.config.overheads)),
		}
		.context("Unable to reduce trace")?;
		tracing::debug!(benchmark = %log_file.benchmark, records = output.records, "Reduced trace");

		Ok(FileReport {
			benchmark: log_file.benchmark.clone(),
			log_file: log_file.path.clone(),
			preset: self.config.preset.clone(),
			issues: output.issues,
			statistics,
		})
	}

	/// Reduces every log file into a table.
	///
	/// Files that fail are kept as annotated rows, unless the error is fatal.
	pub fn run(&self, log_files: &[LogFile]) -> Result<AggregateOutput, anyhow::Error> {
		let mut table = BenchmarkTable::new(self.config.design);
		let mut issues = IssueTally::default();
		for log_file in log_files {
			let benchmark = &log_file.benchmark;
			if table.rows.contains_key(benchmark) {
				tracing::warn!(%benchmark, path = ?log_file.path, "Skipping duplicate benchmark");
				continue;
			}

			tracing::info!(%benchmark, path = ?log_file.path, "Reducing trace");
			let row = match self.reduce_file(log_file) {
				Ok(report) => {
					if !report.issues.is_empty() {
						tracing::warn!(%benchmark, "Ignored {}", report.issues);
					}
					issues += report.issues;

					let summary = report.statistics.summary;
					if summary.total_requests() == 0 {
						tracing::warn!(%benchmark, "Trace has no requests, latencies are undefined");
					}
					tracing::info!(%benchmark, "{summary}");
					if let Some(breakdown) = &report.statistics.breakdown {
						tracing::debug!(%benchmark, "Level breakdown:\n{breakdown}");
					}

					// Note: The summary is still valid even if we can't save the results
					if let Some(results_dir) = self.results_dir {
						if let Err(err) = self::save_results(results_dir, log_file, &report) {
							tracing::warn!(%benchmark, ?results_dir, "Unable to save results: {err:?}");
						}
					}

					BenchmarkRow::from_summary(summary)
				},
				Err(err) if ReduceError::is_fatal_chain(&err) =>
					return Err(err.context(format!("Unable to reduce {:?}", log_file.path))),
				Err(err) => {
					tracing::warn!(%benchmark, "Unable to reduce trace: {err:?}");
					BenchmarkRow::failed(format!("{err:#}"))
				},
			};

			table.rows.insert(benchmark.clone(), row);
		}

		if !issues.is_empty() {
			tracing::warn!("Ignored {issues} over {} traces", log_files.len());
		}

		Ok(AggregateOutput { table, issues })
	}
}

/// Output of [`Aggregator::run`]
#[derive(PartialEq, Clone, Debug)]
pub struct AggregateOutput {
	/// Table
	pub table: BenchmarkTable,

	/// Issues ignored over all files
	pub issues: IssueTally,
}

/// Saves the report of a benchmark, along with a copy of its log
fn save_results(results_dir: &Path, log_file: &LogFile, report: &FileReport) -> Result<(), anyhow::Error> {
	// Note: Reports of traces without requests only hold undefined values
	if report.statistics.summary.total_requests() != 0 {
		let report_path = results_dir.join(format!("{}.json", log_file.benchmark));
		report.to_path(&report_path)?;
	}

	if let Some(file_name) = log_file.path.file_name() {
		let log_copy_path = results_dir.join(file_name);
		fs::copy(&log_file.path, &log_copy_path)
			.with_context(|| format!("Unable to copy {:?} to {log_copy_path:?}", log_file.path))?;
	}

	Ok(())
}
