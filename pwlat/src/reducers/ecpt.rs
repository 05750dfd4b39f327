//! ECPT reducer
//!
//! An ECPT walk probes several candidate ways, only one of which holds the
//! translation. The trace records which way that was, which lets us compare
//! three designs from the same run:
//!
//! - `max`: probe every way and wait for the slowest one.
//! - `correct`: go straight to the correct way.
//! - `parallel`: like `correct`, but with both walk-cache lookups issued concurrently.

// Imports
use {
	crate::{
		cost_model::Overheads,
		data::{EcptSummary, FileStatistics, Summary},
		record::{Record, RecordError},
		reduce::{self, ReduceError},
		stats::LatencyStats,
		CostModel,
	},
	std::{collections::BTreeMap, fmt},
};

/// Histogram names
pub const HISTOGRAM_MAX: &str = "max";
pub const HISTOGRAM_CORRECT: &str = "correct";
pub const HISTOGRAM_PARALLEL: &str = "parallel";

/// Latencies of a single ECPT walk under each model
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct WayLatencies {
	/// Cost of the slowest probe
	pub max_raw: u64,

	/// Cost of the correct probe
	pub correct_raw: u64,

	/// Slowest probe, plus serial overheads
	pub max: u64,

	/// Correct probe, plus serial overheads
	pub correct: u64,

	/// Correct probe, plus parallel overheads
	pub parallel: u64,
}

impl WayLatencies {
	/// Computes the latencies of a walk given the cost of each of its probes.
	///
	/// Returns `None` if `way` isn't a probe.
	pub fn new(probe_costs: &[u64], way: usize, overheads: &Overheads) -> Option<Self> {
		let correct_raw = *probe_costs.get(way)?;
		let max_raw = probe_costs.iter().copied().max()?;

		Some(Self {
			max_raw,
			correct_raw,
			max: max_raw + overheads.serial(),
			correct: correct_raw + overheads.serial(),
			parallel: correct_raw + overheads.parallel(),
		})
	}

	/// Returns the cycles saved by going to the correct probe instead of the slowest
	pub fn saved(&self) -> u64 {
		self.max_raw - self.correct_raw
	}
}

/// ECPT reducer
#[derive(Clone, Debug)]
pub struct EcptReducer {
	/// Costs
	costs: CostModel,

	/// Overheads
	overheads: Overheads,

	/// Slowest-probe latency
	max: LatencyStats,

	/// Correct-probe latency
	correct: LatencyStats,

	/// Parallel latency
	parallel: LatencyStats,

	/// Total saved latency
	saved_latency: u128,
}

impl EcptReducer {
	/// Creates an ECPT reducer
	pub fn new(costs: CostModel, overheads: Overheads) -> Self {
		Self {
			costs,
			overheads,
			max: LatencyStats::default(),
			correct: LatencyStats::default(),
			parallel: LatencyStats::default(),
			saved_latency: 0,
		}
	}

	/// Returns the total requests
	pub fn total_requests(&self) -> u64 {
		// Note: All models see the same requests
		self.correct.total_requests()
	}

	/// Returns the total saved latency
	pub fn saved_latency(&self) -> u128 {
		self.saved_latency
	}

	/// Returns the summary so far
	pub fn summary(&self) -> EcptSummary {
		let total_requests = self.total_requests();
		EcptSummary {
			mean_max_latency:      self.max.mean(),
			mean_correct_latency:  self.correct.mean(),
			mean_parallel_latency: self.parallel.mean(),
			total_saved_latency:   self.saved_latency,
			avg_reduction:         match total_requests {
				0 => f64::NAN,
				_ => self.saved_latency as f64 / total_requests as f64,
			},
			total_requests,
		}
	}
}

impl reduce::Reducer for EcptReducer {
	fn handle_record(&mut self, record: &Record) -> Result<(), anyhow::Error> {
		let way = record.way.ok_or(ReduceError::MissingWay)?;
		let probe_costs = record.probe_costs(&self.costs);
		let latencies =
			WayLatencies::new(&probe_costs, way, &self.overheads).ok_or(RecordError::WayOutOfRange {
				way,
				probes: probe_costs.len(),
			})?;

		// Note: All models see the same requests, so only the first can overflow
		self.max.register(latencies.max, record.frequency)?;
		self.correct.register(latencies.correct, record.frequency)?;
		self.parallel.register(latencies.parallel, record.frequency)?;

		if latencies.correct_raw < latencies.max_raw {
			self.saved_latency += u128::from(latencies.saved()) * u128::from(record.frequency);
		}

		Ok(())
	}

	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		write!(
			f,
			"{} requests, avg latency {:.4} / {:.4} / {:.4} (max / correct / parallel), {} saved",
			self.total_requests(),
			self.max.mean(),
			self.correct.mean(),
			self.parallel.mean(),
			self.saved_latency
		)
	}

	fn into_statistics(self) -> FileStatistics {
		let summary = Summary::Ecpt(self.summary());
		FileStatistics {
			summary,
			histograms: BTreeMap::from([
				(HISTOGRAM_MAX.to_owned(), self.max.into_histogram()),
				(HISTOGRAM_CORRECT.to_owned(), self.correct.into_histogram()),
				(HISTOGRAM_PARALLEL.to_owned(), self.parallel.into_histogram()),
			]),
			breakdown: None,
		}
	}
}
