//! Trace records
//!
//! Each line of the statistics section describes one access pattern: the
//! levels each probe of the walk was resolved at, followed by how many times
//! the pattern occurred.
//!
//! Simple format: `ZERO,ZERO,PWC,MEMORY,   497`
//!
//! Way-indexed format: `L1,LLC,MEMORY,1\t5`, where the last field holds the
//! index of the probe that held the translation and the frequency.

// Imports
use {
	crate::{segment, Level},
	std::fmt,
};

/// Record format
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RecordFormat {
	/// Probes followed by a frequency
	Simple,

	/// Probes followed by the winning way and a frequency
	WithWay,
}

impl RecordFormat {
	/// Returns the marker that precedes records of this format
	pub const fn marker(self) -> &'static str {
		match self {
			Self::Simple => segment::RADIX_MARKER,
			Self::WithWay => segment::WAY_MARKER,
		}
	}

	/// Returns whether a later `~` line ends the records of this format
	pub const fn ends_at_next_marker(self) -> bool {
		matches!(self, Self::Simple)
	}
}

/// Record
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Record {
	/// Level of each probe, in order.
	///
	/// Unknown labels are kept as `None` so positions stay aligned.
	pub probes: Vec<Option<Level>>,

	/// Number of times this pattern occurred
	pub frequency: u64,

	/// Index of the probe that held the translation
	pub way: Option<usize>,
}

impl Record {
	/// Parses a record.
	///
	/// Unknown labels and malformed numeric fields don't fail the parse, and are
	/// instead returned as issues alongside the record.
	pub fn parse(line: &str, format: RecordFormat) -> Result<ParsedRecord, RecordError> {
		let mut issues = vec![];

		let mut fields = line.trim().split(',').collect::<Vec<_>>();
		let last_field = fields.pop().unwrap_or_default();

		let probes = fields
			.iter()
			.enumerate()
			.map(|(position, label)| match label.trim().parse::<Level>() {
				Ok(level) => Some(level),
				Err(_) => {
					issues.push(RecordIssue::UnknownLabel {
						position,
						label: (*label).to_owned(),
					});
					None
				},
			})
			.collect::<Vec<_>>();

		let (way, frequency) = match format {
			RecordFormat::Simple => (None, self::parse_field(last_field, Field::Frequency, &mut issues)),
			RecordFormat::WithWay => {
				// Note: If the way isn't readable, the frequency can't be trusted either.
				//       Any fields after the frequency are ignored.
				let mut fields = last_field.split('\t');
				let (way, frequency) = match (fields.next(), fields.next()) {
					(Some(way), Some(frequency)) => match way.trim().parse::<usize>() {
						Ok(way) => (way, self::parse_field(frequency, Field::Frequency, &mut issues)),
						Err(_) => {
							issues.push(RecordIssue::MalformedField {
								field: Field::Way,
								value: last_field.to_owned(),
							});
							(0, 0)
						},
					},
					_ => {
						issues.push(RecordIssue::MalformedField {
							field: Field::Way,
							value: last_field.to_owned(),
						});
						(0, 0)
					},
				};

				if way >= probes.len() {
					return Err(RecordError::WayOutOfRange {
						way,
						probes: probes.len(),
					});
				}

				(Some(way), frequency)
			},
		};

		Ok(ParsedRecord {
			record: Record {
				probes,
				frequency,
				way,
			},
			issues,
		})
	}

	/// Returns the cost of each probe
	pub fn probe_costs(&self, costs: &crate::CostModel) -> Vec<u64> {
		self.probes.iter().map(|&probe| costs.probe_cost(probe)).collect()
	}
}

/// Parses an integer field, defaulting to `0` and registering an issue if malformed
fn parse_field(value: &str, field: Field, issues: &mut Vec<RecordIssue>) -> u64 {
	value.trim().parse::<u64>().unwrap_or_else(|_| {
		issues.push(RecordIssue::MalformedField {
			field,
			value: value.to_owned(),
		});
		0
	})
}

/// Output of [`Record::parse`]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ParsedRecord {
	/// Record
	pub record: Record,

	/// Issues found while parsing
	pub issues: Vec<RecordIssue>,
}

/// Numeric record field
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Field {
	Frequency,
	Way,
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(match self {
			Self::Frequency => "frequency",
			Self::Way => "way",
		})
	}
}

/// Recoverable record issue
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum RecordIssue {
	#[error("Unknown label {label:?} at probe {position}")]
	UnknownLabel { position: usize, label: String },

	#[error("Malformed {field} field {value:?}")]
	MalformedField { field: Field, value: String },
}

/// Record error
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum RecordError {
	#[error("Way {way} is out of range for a walk with {probes} probes")]
	WayOutOfRange { way: usize, probes: usize },
}
