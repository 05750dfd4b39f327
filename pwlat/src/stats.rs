//! Statistics accumulators

// Imports
use {
	crate::{record::RecordIssue, reduce::ReduceError, Level},
	std::{collections::BTreeMap, fmt, ops},
};

/// Latency histogram, mapping a latency to the number of requests that took it
#[derive(PartialEq, Eq, Clone, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Histogram {
	counts: BTreeMap<u64, u64>,
}

impl Histogram {
	/// Registers `frequency` requests with latency `latency`
	pub fn register(&mut self, latency: u64, frequency: u64) {
		if frequency != 0 {
			*self.counts.entry(latency).or_default() += frequency;
		}
	}

	/// Returns the number of requests with latency `latency`
	pub fn frequency(&self, latency: u64) -> u64 {
		self.counts.get(&latency).copied().unwrap_or(0)
	}

	/// Returns all `(latency, frequency)` pairs, by increasing latency
	pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
		self.counts.iter().map(|(&latency, &frequency)| (latency, frequency))
	}

	/// Returns if no requests were registered
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}
}

/// Request-weighted latency
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct LatencyStats {
	/// Sum of `latency * frequency`.
	///
	/// Bounded by `u64::MAX * u64::MAX` as long as `total_requests` doesn't overflow
	total_latency: u128,

	/// Sum of `frequency`
	total_requests: u64,

	/// Histogram
	histogram: Histogram,
}

impl LatencyStats {
	/// Registers `frequency` requests with latency `latency`.
	///
	/// Nothing is registered if the total number of requests would overflow.
	pub fn register(&mut self, latency: u64, frequency: u64) -> Result<(), ReduceError> {
		self.total_requests = self
			.total_requests
			.checked_add(frequency)
			.ok_or(ReduceError::RequestOverflow {
				total_requests: self.total_requests,
				frequency,
			})?;
		self.total_latency += u128::from(latency) * u128::from(frequency);
		self.histogram.register(latency, frequency);

		Ok(())
	}

	/// Returns the request-weighted mean latency.
	///
	/// Returns `NaN` if there were no requests.
	pub fn mean(&self) -> f64 {
		match self.total_requests {
			0 => f64::NAN,
			total_requests => self.total_latency as f64 / total_requests as f64,
		}
	}

	/// Returns the sum of `latency * frequency`
	pub fn total_latency(&self) -> u128 {
		self.total_latency
	}

	/// Returns the total number of requests
	pub fn total_requests(&self) -> u64 {
		self.total_requests
	}

	/// Returns the histogram
	pub fn histogram(&self) -> &Histogram {
		&self.histogram
	}

	/// Returns the histogram, consuming these statistics
	pub fn into_histogram(self) -> Histogram {
		self.histogram
	}
}

/// Maximum number of probes tracked by a [`Breakdown`]
pub const MAX_PROBES: usize = 4;

/// Per-probe-position breakdown of the levels requests were resolved at.
///
/// Positions correspond to page table depths, so they're kept apart.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Breakdown {
	positions: Vec<BTreeMap<Level, u64>>,
}

impl Breakdown {
	/// Creates an empty breakdown
	pub fn new() -> Self {
		Self {
			positions: vec![BTreeMap::new(); MAX_PROBES],
		}
	}

	/// Registers `frequency` requests resolved at `level` on probe `position`.
	///
	/// Patterns that never occurred are only checked against the position bound.
	pub fn register(&mut self, position: usize, level: Level, frequency: u64) -> Result<(), ReduceError> {
		let levels = self
			.positions
			.get_mut(position)
			.ok_or(ReduceError::ProbeOverflow {
				probes: position + 1,
				max:    MAX_PROBES,
			})?;
		if frequency != 0 {
			*levels.entry(level).or_default() += frequency;
		}

		Ok(())
	}

	/// Returns the number of requests resolved at `level` on probe `position`
	pub fn frequency(&self, position: usize, level: Level) -> u64 {
		self.positions
			.get(position)
			.and_then(|levels| levels.get(&level))
			.copied()
			.unwrap_or(0)
	}

}

impl Default for Breakdown {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for Breakdown {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (position, levels) in self.positions.iter().enumerate() {
			let total = levels.values().sum::<u64>();
			write!(f, "probe {position}:")?;
			for (level, &frequency) in levels {
				let percentage = 100.0 * frequency as f64 / total as f64;
				write!(f, " {level}={frequency} ({percentage:.2}%)")?;
			}
			writeln!(f)?;
		}

		Ok(())
	}
}

/// Tally of recoverable record issues
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct IssueTally {
	/// Unknown labels
	pub unknown_labels: u64,

	/// Malformed numeric fields
	pub malformed_fields: u64,
}

impl IssueTally {
	/// Registers an issue
	pub fn register(&mut self, issue: &RecordIssue) {
		match issue {
			RecordIssue::UnknownLabel { .. } => self.unknown_labels += 1,
			RecordIssue::MalformedField { .. } => self.malformed_fields += 1,
		}
	}

	/// Returns the total number of issues
	pub fn total(&self) -> u64 {
		self.unknown_labels + self.malformed_fields
	}

	/// Returns if there were no issues
	pub fn is_empty(&self) -> bool {
		self.total() == 0
	}
}

impl ops::AddAssign for IssueTally {
	fn add_assign(&mut self, rhs: Self) {
		self.unknown_labels += rhs.unknown_labels;
		self.malformed_fields += rhs.malformed_fields;
	}
}

impl fmt::Display for IssueTally {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} unknown labels, {} malformed fields",
			self.unknown_labels, self.malformed_fields
		)
	}
}
