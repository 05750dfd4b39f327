//! Radix reducer
//!
//! A radix walk probes every page table level in order, so a walk costs the
//! sum of all its probes.

// Imports
use {
	crate::{
		data::{FileStatistics, RadixSummary, Summary},
		record::Record,
		reduce::{self, ReduceError},
		stats::{Breakdown, LatencyStats, MAX_PROBES},
		CostModel,
	},
	std::{collections::BTreeMap, fmt},
};

/// Histogram name
pub const HISTOGRAM_LATENCY: &str = "latency";

/// Radix reducer
#[derive(Clone, Debug)]
pub struct RadixReducer {
	/// Costs
	costs: CostModel,

	/// Latency
	latency: LatencyStats,

	/// Per-probe breakdown
	breakdown: Breakdown,
}

impl RadixReducer {
	/// Creates a radix reducer
	pub fn new(costs: CostModel) -> Self {
		Self {
			costs,
			latency: LatencyStats::default(),
			breakdown: Breakdown::new(),
		}
	}

	/// Returns the cost of the walk described by `record`
	pub fn walk_cost(costs: &CostModel, record: &Record) -> u64 {
		record.probes.iter().map(|&probe| costs.probe_cost(probe)).sum()
	}

	/// Returns the summary so far
	pub fn summary(&self) -> RadixSummary {
		RadixSummary {
			mean_latency:   self.latency.mean(),
			total_requests: self.latency.total_requests(),
		}
	}

	/// Returns the latency statistics
	pub fn latency(&self) -> &LatencyStats {
		&self.latency
	}

	/// Returns the per-probe breakdown
	pub fn breakdown(&self) -> &Breakdown {
		&self.breakdown
	}
}

impl reduce::Reducer for RadixReducer {
	fn handle_record(&mut self, record: &Record) -> Result<(), anyhow::Error> {
		if record.probes.len() > MAX_PROBES {
			return Err(ReduceError::ProbeOverflow {
				probes: record.probes.len(),
				max:    MAX_PROBES,
			}
			.into());
		}

		let cost = Self::walk_cost(&self.costs, record);
		self.latency.register(cost, record.frequency)?;

		for (position, probe) in record.probes.iter().enumerate() {
			if let Some(level) = *probe {
				self.breakdown.register(position, level, record.frequency)?;
			}
		}

		Ok(())
	}

	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		write!(
			f,
			"{} requests, avg latency {:.4}",
			self.latency.total_requests(),
			self.latency.mean()
		)
	}

	fn into_statistics(self) -> FileStatistics {
		let summary = Summary::Radix(self.summary());
		FileStatistics {
			summary,
			histograms: BTreeMap::from([(HISTOGRAM_LATENCY.to_owned(), self.latency.into_histogram())]),
			breakdown: Some(self.breakdown),
		}
	}
}
