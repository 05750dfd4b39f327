//! Output data

// Imports
use {
	crate::{
		config::Design,
		stats::{Breakdown, Histogram, IssueTally},
	},
	anyhow::Context,
	std::{collections::BTreeMap, fmt, fs, path::Path, path::PathBuf},
};

/// Radix summary
#[derive(PartialEq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RadixSummary {
	pub mean_latency:   f64,
	pub total_requests: u64,
}

/// ECPT summary
#[derive(PartialEq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EcptSummary {
	/// Mean latency when always waiting for the slowest probe
	pub mean_max_latency: f64,

	/// Mean latency when going straight to the correct probe
	pub mean_correct_latency: f64,

	/// Mean latency when walk-cache lookups happen concurrently
	pub mean_parallel_latency: f64,

	/// Cycles saved by knowing the correct probe
	pub total_saved_latency: u128,

	/// Mean cycles saved per request
	pub avg_reduction: f64,

	pub total_requests: u64,
}

/// Per-file summary
#[derive(PartialEq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Summary {
	Radix(RadixSummary),
	Ecpt(EcptSummary),
}

impl Summary {
	/// Returns the design of this summary
	pub fn design(&self) -> Design {
		match self {
			Self::Radix(_) => Design::Radix,
			Self::Ecpt(_) => Design::Ecpt,
		}
	}

	/// Returns the total number of requests
	pub fn total_requests(&self) -> u64 {
		match self {
			Self::Radix(summary) => summary.total_requests,
			Self::Ecpt(summary) => summary.total_requests,
		}
	}

	/// Returns the page walk latency, picking `metric` for ECPT
	pub fn page_walk_latency(&self, metric: EcptMetric) -> f64 {
		match self {
			Self::Radix(summary) => summary.mean_latency,
			Self::Ecpt(summary) => match metric {
				EcptMetric::Max => summary.mean_max_latency,
				EcptMetric::Correct => summary.mean_correct_latency,
				EcptMetric::Parallel => summary.mean_parallel_latency,
			},
		}
	}
}

impl fmt::Display for Summary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Radix(summary) => write!(
				f,
				"avg latency: {:.4}, total requests: {}",
				summary.mean_latency, summary.total_requests
			),
			Self::Ecpt(summary) => write!(
				f,
				"avg latency (max / correct / parallel): {:.4} / {:.4} / {:.4}, total requests: {}, total saved \
				 latency: {}, avg reduction: {:.4}",
				summary.mean_max_latency,
				summary.mean_correct_latency,
				summary.mean_parallel_latency,
				summary.total_requests,
				summary.total_saved_latency,
				summary.avg_reduction,
			),
		}
	}
}

/// ECPT latency model used as the page walk latency
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[derive(clap::ValueEnum)]
pub enum EcptMetric {
	/// Slowest probe
	Max,

	/// Correct probe
	Correct,

	/// Correct probe, with concurrent walk-cache lookups
	#[default]
	Parallel,
}

/// Statistics of a single file
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FileStatistics {
	/// Summary
	pub summary: Summary,

	/// Histograms, by latency model
	pub histograms: BTreeMap<String, Histogram>,

	/// Per-probe breakdown
	pub breakdown: Option<Breakdown>,
}

/// Report of a single file
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FileReport {
	/// Benchmark name
	pub benchmark: String,

	/// Log file the report was produced from
	pub log_file: PathBuf,

	/// Preset name
	pub preset: String,

	/// Ignored issues
	pub issues: IssueTally,

	/// Statistics
	pub statistics: FileStatistics,
}

impl FileReport {
	/// Reads a report
	pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
		let report_file = fs::File::open(path).with_context(|| format!("Unable to open report {path:?}"))?;
		serde_json::from_reader(report_file).with_context(|| format!("Unable to parse report {path:?}"))
	}

	/// Writes this report
	pub fn to_path(&self, path: &Path) -> Result<(), anyhow::Error> {
		let report_file = fs::File::create(path).with_context(|| format!("Unable to create report {path:?}"))?;
		serde_json::to_writer_pretty(report_file, self).with_context(|| format!("Unable to write report {path:?}"))
	}
}
