//! Trace reduction

// Imports
use {
	crate::{
		config::Strictness,
		data::FileStatistics,
		dyna_log::DynaLogReader,
		record::Record,
		stats::IssueTally,
	},
	anyhow::Context,
	std::{
		fmt,
		io,
		time::{Duration, Instant},
	},
};

/// Trace reducer.
///
/// Streams every record of a dyna log into a [`Reducer`].
#[derive(Debug)]
pub struct TraceReducer {
	/// Strictness
	strictness: Strictness,

	/// Debug output period
	///
	/// Interval in which to output debug output for the reducer
	debug_output_period: Duration,
}

impl TraceReducer {
	/// Creates a new trace reducer
	pub fn new(strictness: Strictness, debug_output_period: Duration) -> Self {
		Self {
			strictness,
			debug_output_period,
		}
	}

	/// Runs reducer `reducer` on all records from `log`
	pub fn run<R: Reducer>(
		&self,
		log: &mut DynaLogReader<impl io::BufRead + io::Seek>,
		reducer: &mut R,
	) -> Result<RunOutput, anyhow::Error> {
		// Note: We start in the past so that we output right away at the start
		let mut last_debug_time = Instant::now()
			.checked_sub(self.debug_output_period)
			.unwrap_or_else(Instant::now);

		let format = log.format();
		let mut output = RunOutput::default();
		while let Some(line) = log.read_next().context("Unable to read next line")? {
			let line_num = line.idx + 1;
			let parsed = Record::parse(line.text, format)
				.with_context(|| format!("Unable to parse record at line {line_num}"))?;

			for issue in &parsed.issues {
				match self.strictness {
					Strictness::Strict => {
						return Err(anyhow::Error::new(issue.clone()))
							.with_context(|| format!("Invalid record at line {line_num}"))
					},
					Strictness::Lenient => {
						tracing::debug!(line_num, %issue, "Ignoring invalid record field");
						output.issues.register(issue);
					},
				}
			}

			reducer
				.handle_record(&parsed.record)
				.with_context(|| format!("Unable to reduce record at line {line_num}"))?;
			output.records += 1;

			// Then show debug output, if it's been long enough
			let cur_time = Instant::now();
			if cur_time.duration_since(last_debug_time) >= self.debug_output_period {
				let progress_percentage = 100.0 * log.progress();
				tracing::info!(
					"[{progress_percentage:.2}%] Debug: {}",
					pwlat_util::DisplayWrapper::new(|f| reducer.fmt_debug(f))
				);
				last_debug_time = cur_time
			}
		}

		Ok(output)
	}

	/// Runs `reducer` on all records from `log` and returns its statistics
	pub fn reduce<R: Reducer>(
		&self,
		log: &mut DynaLogReader<impl io::BufRead + io::Seek>,
		mut reducer: R,
	) -> Result<(RunOutput, FileStatistics), anyhow::Error> {
		let output = self.run(log, &mut reducer)?;
		Ok((output, reducer.into_statistics()))
	}
}

/// Output for [`TraceReducer::run`]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct RunOutput {
	/// Records reduced
	pub records: u64,

	/// Issues ignored
	pub issues: IssueTally,
}

/// Reducer
pub trait Reducer {
	/// Handles a record
	fn handle_record(&mut self, record: &Record) -> Result<(), anyhow::Error>;

	/// Formats debug output to `f`.
	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error>;

	/// Returns the accumulated statistics
	fn into_statistics(self) -> FileStatistics
	where
		Self: Sized;
}

/// Reduction error
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum ReduceError {
	#[error("Walk has {probes} probes, but at most {max} are supported")]
	ProbeOverflow { probes: usize, max: usize },

	#[error("Record has no way")]
	MissingWay,

	#[error("Adding {frequency} requests to {total_requests} overflows the request count")]
	RequestOverflow { total_requests: u64, frequency: u64 },
}

impl ReduceError {
	/// Returns whether this error should abort the whole run, instead of a single file
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::ProbeOverflow { .. })
	}

	/// Returns whether any error in `err`'s chain is fatal
	pub fn is_fatal_chain(err: &anyhow::Error) -> bool {
		err.chain()
			.any(|err| err.downcast_ref::<Self>().is_some_and(Self::is_fatal))
	}
}
