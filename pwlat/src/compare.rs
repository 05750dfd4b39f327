//! Cross-design comparison
//!
//! Combines the page walk latency of each benchmark with its access rates into
//! an IPC, and compares the IPC of two designs.

// Imports
use {
	crate::{data::EcptMetric, table::BenchmarkTable},
	anyhow::Context,
	itertools::Itertools,
	std::{collections::BTreeMap, fmt, fs, io, path::Path},
};

/// Access rates of a benchmark
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct AccessRates {
	/// Memory requests
	pub memory_requests: f64,

	/// Requests that hit the TLB
	pub tlb_hits: f64,

	/// TLB hit latency
	pub tlb_hit_latency: f64,

	/// Requests that required a page walk
	pub page_walks: f64,
}

impl AccessRates {
	/// Returns the IPC given the page walk latency
	pub fn ipc(&self, page_walk_latency: f64) -> f64 {
		let cycles =
			self.tlb_hits * self.tlb_hit_latency + self.page_walks * (page_walk_latency + self.tlb_hit_latency);
		self.memory_requests / cycles
	}
}

/// Access rates csv row
#[derive(Debug)]
#[derive(serde::Deserialize)]
struct AccessRatesCsvRow {
	#[serde(rename = "Benchmark")]
	benchmark: String,

	#[serde(rename = "Memory Request")]
	memory_requests: f64,

	#[serde(rename = "TLB Hit")]
	tlb_hits: f64,

	#[serde(rename = "TLB Hit Latency")]
	tlb_hit_latency: f64,

	#[serde(rename = "Page Walk")]
	page_walks: f64,
}

/// Access rates table
#[derive(PartialEq, Clone, Debug, Default)]
pub struct AccessTable {
	/// Rates, by benchmark
	pub rows: BTreeMap<String, AccessRates>,
}

impl AccessTable {
	/// Reads an access rates table.
	///
	/// Columns other than the access rates are ignored.
	pub fn read_csv<R: io::Read>(reader: R) -> Result<Self, anyhow::Error> {
		let mut reader = csv::Reader::from_reader(reader);
		let headers = reader.headers().context("Unable to read header")?.clone();

		let mut rows = BTreeMap::new();
		for record in reader.records() {
			let record = record.context("Unable to read row")?;
			let row = record
				.deserialize::<AccessRatesCsvRow>(Some(&headers))
				.context("Unable to parse row")?;
			let rates = AccessRates {
				memory_requests: row.memory_requests,
				tlb_hits:        row.tlb_hits,
				tlb_hit_latency: row.tlb_hit_latency,
				page_walks:      row.page_walks,
			};
			anyhow::ensure!(
				rows.insert(row.benchmark.clone(), rates).is_none(),
				"Benchmark {:?} appears more than once",
				row.benchmark
			);
		}

		Ok(Self { rows })
	}

	/// Reads an access rates table from `path`
	pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
		let file = fs::File::open(path).with_context(|| format!("Unable to open access table {path:?}"))?;
		Self::read_csv(io::BufReader::new(file)).with_context(|| format!("Unable to read access table {path:?}"))
	}
}

/// Joins two tables by benchmark.
///
/// Returns an error listing every benchmark that's only in one of the tables.
pub fn join<'a, L, R>(
	left: &'a BTreeMap<String, L>,
	right: &'a BTreeMap<String, R>,
) -> Result<Vec<(&'a str, &'a L, &'a R)>, KeyMismatch> {
	let only_left = left.keys().filter(|key| !right.contains_key(*key)).cloned().collect::<Vec<_>>();
	let only_right = right.keys().filter(|key| !left.contains_key(*key)).cloned().collect::<Vec<_>>();
	if !only_left.is_empty() || !only_right.is_empty() {
		return Err(KeyMismatch { only_left, only_right });
	}

	Ok(left
		.iter()
		.map(|(key, left_value)| (key.as_str(), left_value, &right[key]))
		.collect())
}

/// Benchmarks present in only one side of a join
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
#[error(
	"Benchmarks differ: only on the left: [{}], only on the right: [{}]",
	.only_left.iter().join(", "),
	.only_right.iter().join(", ")
)]
pub struct KeyMismatch {
	pub only_left:  Vec<String>,
	pub only_right: Vec<String>,
}

/// IPC of each benchmark of a design
#[derive(PartialEq, Clone, Debug, Default)]
pub struct IpcTable {
	pub ipc: BTreeMap<String, f64>,
}

impl IpcTable {
	/// Computes the IPC of every benchmark from its access rates and page walk latency.
	///
	/// Benchmarks whose trace failed to reduce are skipped before joining.
	pub fn new(access: &AccessTable, latencies: &BenchmarkTable, metric: EcptMetric) -> Result<Self, KeyMismatch> {
		let page_walk_latencies = latencies.page_walk_latencies(metric);
		let ipc = self::join(&access.rows, &page_walk_latencies)?
			.into_iter()
			.map(|(benchmark, rates, &page_walk_latency)| (benchmark.to_owned(), rates.ipc(page_walk_latency)))
			.collect();

		Ok(Self { ipc })
	}
}

/// Comparison between two designs
#[derive(PartialEq, Clone, Debug)]
pub struct Comparison {
	/// Rows, by benchmark
	pub rows: BTreeMap<String, ComparisonRow>,

	/// Mean speedup
	pub mean_speedup: f64,

	/// Standard error of the mean speedup
	pub mean_speedup_error: f64,
}

/// Comparison of a single benchmark
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct ComparisonRow {
	pub baseline_ipc:  f64,
	pub candidate_ipc: f64,
	pub speedup:       f64,
}

impl Comparison {
	/// Compares the IPC of a candidate design against a baseline
	pub fn new(baseline: &IpcTable, candidate: &IpcTable) -> Result<Self, anyhow::Error> {
		let rows = self::join(&baseline.ipc, &candidate.ipc)?
			.into_iter()
			.map(|(benchmark, &baseline_ipc, &candidate_ipc)| {
				(benchmark.to_owned(), ComparisonRow {
					baseline_ipc,
					candidate_ipc,
					speedup: candidate_ipc / baseline_ipc,
				})
			})
			.collect::<BTreeMap<_, _>>();
		anyhow::ensure!(!rows.is_empty(), "No benchmarks to compare");

		let speedup = rows.values().map(|row| row.speedup).collect::<average::Variance>();
		Ok(Self {
			rows,
			mean_speedup: speedup.mean(),
			mean_speedup_error: speedup.error(),
		})
	}

	/// Writes this comparison as csv
	pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), anyhow::Error> {
		let mut writer = csv::Writer::from_writer(writer);
		for (benchmark, row) in &self.rows {
			writer
				.serialize(ComparisonCsvRow {
					benchmark:     benchmark.clone(),
					baseline_ipc:  row.baseline_ipc,
					candidate_ipc: row.candidate_ipc,
					speedup:       row.speedup,
				})
				.context("Unable to write row")?;
		}
		writer.flush().context("Unable to flush comparison")?;

		Ok(())
	}

	/// Reads the rows of a comparison written by [`Self::write_csv`]
	pub fn read_csv_rows<R: io::Read>(reader: R) -> Result<BTreeMap<String, ComparisonRow>, anyhow::Error> {
		let mut reader = csv::Reader::from_reader(reader);
		let headers = reader.headers().context("Unable to read header")?.clone();
		reader
			.records()
			.map(|record| -> Result<_, anyhow::Error> {
				let record = record.context("Unable to read row")?;
				let row = record
					.deserialize::<ComparisonCsvRow>(Some(&headers))
					.context("Unable to parse row")?;
				Ok((row.benchmark, ComparisonRow {
					baseline_ipc:  row.baseline_ipc,
					candidate_ipc: row.candidate_ipc,
					speedup:       row.speedup,
				}))
			})
			.collect()
	}

	/// Writes this comparison to `path`
	pub fn to_path(&self, path: &Path) -> Result<(), anyhow::Error> {
		let file = fs::File::create(path).with_context(|| format!("Unable to create comparison {path:?}"))?;
		self.write_csv(io::BufWriter::new(file))
			.with_context(|| format!("Unable to write comparison {path:?}"))
	}
}

impl fmt::Display for Comparison {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let width = self.rows.keys().map(String::len).chain(["Benchmark".len()]).max().unwrap_or(0);
		writeln!(f, "{:<width$}  {:>12}  {:>13}  {:>8}", "Benchmark", "baseline IPC", "candidate IPC", "speedup")?;
		for (benchmark, row) in &self.rows {
			writeln!(
				f,
				"{benchmark:<width$}  {:>12.6}  {:>13.6}  {:>8.4}",
				row.baseline_ipc, row.candidate_ipc, row.speedup
			)?;
		}
		writeln!(f, "mean speedup: {:.4} ± {:.4}", self.mean_speedup, self.mean_speedup_error)
	}
}

/// Comparison csv row
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
struct ComparisonCsvRow {
	#[serde(rename = "Benchmark")]
	benchmark:     String,
	baseline_ipc:  f64,
	candidate_ipc: f64,
	speedup:       f64,
}
