//! Benchmark tables

// Imports
use {
	crate::{
		config::Design,
		data::{EcptMetric, EcptSummary, RadixSummary, Summary},
	},
	anyhow::Context,
	std::{collections::BTreeMap, fmt, fs, io, path::Path},
};

/// Benchmark row
#[derive(PartialEq, Clone, Debug)]
pub struct BenchmarkRow {
	/// Summary, if the trace could be reduced
	pub summary: Option<Summary>,

	/// Error, if the trace couldn't be reduced or had no requests
	pub error: Option<String>,
}

impl BenchmarkRow {
	/// Creates a row from a summary
	pub fn from_summary(summary: Summary) -> Self {
		let error = (summary.total_requests() == 0).then(|| "No requests in trace".to_owned());
		Self {
			summary: Some(summary),
			error,
		}
	}

	/// Creates a failed row
	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			summary: None,
			error:   Some(error.into()),
		}
	}

	/// Returns the page walk latency of this row, if it didn't fail
	pub fn page_walk_latency(&self, metric: EcptMetric) -> Option<f64> {
		match (&self.summary, &self.error) {
			(Some(summary), None) => Some(summary.page_walk_latency(metric)),
			_ => None,
		}
	}
}

/// Benchmark table, with one row per benchmark of a design
#[derive(PartialEq, Clone, Debug)]
pub struct BenchmarkTable {
	/// Design
	pub design: Design,

	/// Rows, by benchmark name
	pub rows: BTreeMap<String, BenchmarkRow>,
}

impl BenchmarkTable {
	/// Creates an empty table
	pub fn new(design: Design) -> Self {
		Self {
			design,
			rows: BTreeMap::new(),
		}
	}

	/// Returns the page walk latency of every benchmark that didn't fail
	pub fn page_walk_latencies(&self, metric: EcptMetric) -> BTreeMap<String, f64> {
		self.rows
			.iter()
			.filter_map(|(benchmark, row)| match row.page_walk_latency(metric) {
				Some(latency) => Some((benchmark.clone(), latency)),
				None => {
					tracing::warn!(%benchmark, error = ?row.error, "Skipping benchmark without a page walk latency");
					None
				},
			})
			.collect()
	}

	/// Writes this table as csv
	pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), anyhow::Error> {
		let mut writer = csv::Writer::from_writer(writer);
		for (benchmark, row) in &self.rows {
			let benchmark = benchmark.clone();
			let error = row.error.clone();
			let res = match self.design {
				Design::Radix => {
					let summary = match row.summary {
						Some(Summary::Radix(summary)) => Some(summary),
						Some(Summary::Ecpt(_)) => anyhow::bail!("Benchmark {benchmark:?} has an ECPT summary in a radix table"),
						None => None,
					};
					writer.serialize(RadixCsvRow {
						benchmark,
						latency: summary.map(|summary| summary.mean_latency),
						total_requests: summary.map(|summary| summary.total_requests),
						error,
					})
				},
				Design::Ecpt => {
					let summary = match row.summary {
						Some(Summary::Ecpt(summary)) => Some(summary),
						Some(Summary::Radix(_)) => anyhow::bail!("Benchmark {benchmark:?} has a radix summary in an ECPT table"),
						None => None,
					};
					writer.serialize(EcptCsvRow {
						benchmark,
						max_latency: summary.map(|summary| summary.mean_max_latency),
						correct_latency: summary.map(|summary| summary.mean_correct_latency),
						parallel_latency: summary.map(|summary| summary.mean_parallel_latency),
						avg_reduction: summary.map(|summary| summary.avg_reduction),
						total_saved_latency: summary.map(|summary| summary.total_saved_latency),
						total_requests: summary.map(|summary| summary.total_requests),
						error,
					})
				},
			};
			res.context("Unable to write row")?;
		}

		// Note: Without any rows, `serialize` never wrote the header
		if self.rows.is_empty() {
			let header: &[&str] = match self.design {
				Design::Radix => &RADIX_HEADER,
				Design::Ecpt => &ECPT_HEADER,
			};
			writer.write_record(header).context("Unable to write header")?;
		}

		writer.flush().context("Unable to flush table")?;
		Ok(())
	}

	/// Reads a table written by [`Self::write_csv`]
	pub fn read_csv<R: io::Read>(reader: R, design: Design) -> Result<Self, anyhow::Error> {
		let mut reader = csv::Reader::from_reader(reader);
		let mut table = Self::new(design);
		match design {
			Design::Radix =>
				for row in reader.deserialize::<RadixCsvRow>() {
					let row = row.context("Unable to parse radix row")?;
					let summary = row
						.latency
						.zip(row.total_requests)
						.map(|(mean_latency, total_requests)| {
							Summary::Radix(RadixSummary {
								mean_latency,
								total_requests,
							})
						});
					table.insert_row(row.benchmark, BenchmarkRow {
						summary,
						error: row.error,
					})?;
				},
			Design::Ecpt =>
				for row in reader.deserialize::<EcptCsvRow>() {
					let row = row.context("Unable to parse ECPT row")?;
					let summary = (|| {
						Some(Summary::Ecpt(EcptSummary {
							mean_max_latency:      row.max_latency?,
							mean_correct_latency:  row.correct_latency?,
							mean_parallel_latency: row.parallel_latency?,
							total_saved_latency:   row.total_saved_latency?,
							avg_reduction:         row.avg_reduction?,
							total_requests:        row.total_requests?,
						}))
					})();
					table.insert_row(row.benchmark, BenchmarkRow {
						summary,
						error: row.error,
					})?;
				},
		}

		Ok(table)
	}

	/// Writes this table to `path`
	pub fn to_path(&self, path: &Path) -> Result<(), anyhow::Error> {
		let file = fs::File::create(path).with_context(|| format!("Unable to create table {path:?}"))?;
		self.write_csv(io::BufWriter::new(file))
			.with_context(|| format!("Unable to write table {path:?}"))
	}

	/// Reads a table from `path`
	pub fn from_path(path: &Path, design: Design) -> Result<Self, anyhow::Error> {
		let file = fs::File::open(path).with_context(|| format!("Unable to open table {path:?}"))?;
		Self::read_csv(io::BufReader::new(file), design).with_context(|| format!("Unable to read table {path:?}"))
	}

	fn insert_row(&mut self, benchmark: String, row: BenchmarkRow) -> Result<(), anyhow::Error> {
		anyhow::ensure!(
			!self.rows.contains_key(&benchmark),
			"Benchmark {benchmark:?} appears more than once"
		);
		self.rows.insert(benchmark, row);
		Ok(())
	}
}

impl fmt::Display for BenchmarkTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let header: &[&str] = match self.design {
			Design::Radix => &RADIX_HEADER[..3],
			Design::Ecpt => &ECPT_HEADER[..7],
		};

		let rows = self
			.rows
			.iter()
			.map(|(benchmark, row)| {
				let mut cells = vec![benchmark.clone()];
				match &row.summary {
					Some(Summary::Radix(summary)) => cells.extend([
						format!("{:.4}", summary.mean_latency),
						summary.total_requests.to_string(),
					]),
					Some(Summary::Ecpt(summary)) => cells.extend([
						format!("{:.4}", summary.mean_max_latency),
						format!("{:.4}", summary.mean_correct_latency),
						format!("{:.4}", summary.mean_parallel_latency),
						format!("{:.4}", summary.avg_reduction),
						summary.total_saved_latency.to_string(),
						summary.total_requests.to_string(),
					]),
					None => cells.resize(header.len(), "-".to_owned()),
				}
				if let Some(error) = &row.error {
					cells.push(format!("({error})"));
				}
				cells
			})
			.collect::<Vec<_>>();

		let widths = header
			.iter()
			.enumerate()
			.map(|(idx, name)| {
				rows.iter()
					.filter_map(|cells| cells.get(idx))
					.map(String::len)
					.chain([name.len()])
					.max()
					.unwrap_or(0)
			})
			.collect::<Vec<_>>();

		for (name, width) in header.iter().zip(&widths) {
			write!(f, "{name:<width$}  ")?;
		}
		writeln!(f)?;
		for cells in &rows {
			for (idx, cell) in cells.iter().enumerate() {
				let width = widths.get(idx).copied().unwrap_or(0);
				write!(f, "{cell:<width$}  ")?;
			}
			writeln!(f)?;
		}

		Ok(())
	}
}

/// Radix csv header
const RADIX_HEADER: [&str; 4] = ["Benchmark", "latency", "total requests", "error"];

/// ECPT csv header
const ECPT_HEADER: [&str; 8] = [
	"Benchmark",
	"avg latency max",
	"avg latency correct",
	"avg latency parallel CWC",
	"avg reduction",
	"total saved latency",
	"total requests",
	"error",
];

/// Radix csv row
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
struct RadixCsvRow {
	#[serde(rename = "Benchmark")]
	benchmark:      String,
	latency:        Option<f64>,
	#[serde(rename = "total requests")]
	total_requests: Option<u64>,
	error:          Option<String>,
}

/// ECPT csv row
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
struct EcptCsvRow {
	#[serde(rename = "Benchmark")]
	benchmark:           String,
	#[serde(rename = "avg latency max")]
	max_latency:         Option<f64>,
	#[serde(rename = "avg latency correct")]
	correct_latency:     Option<f64>,
	#[serde(rename = "avg latency parallel CWC")]
	parallel_latency:    Option<f64>,
	#[serde(rename = "avg reduction")]
	avg_reduction:       Option<f64>,
	#[serde(rename = "total saved latency")]
	total_saved_latency: Option<u128>,
	#[serde(rename = "total requests")]
	total_requests:      Option<u64>,
	error:               Option<String>,
}
