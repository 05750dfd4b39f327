//! Hierarchy levels

// Imports
use std::{fmt, str::FromStr};

/// Memory hierarchy level a probe was resolved at
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
	/// No access was necessary
	Zero,

	/// L1 cache
	L1,

	/// L2 cache
	L2,

	/// Last-level cache
	Llc,

	/// Page-walk cache
	Pwc,

	/// Main memory
	Memory,
}

impl Level {
	/// All levels
	pub const ALL: [Self; 6] = [Self::Zero, Self::L1, Self::L2, Self::Llc, Self::Pwc, Self::Memory];

	/// Returns the trace label of this level
	pub const fn label(self) -> &'static str {
		match self {
			Self::Zero => "ZERO",
			Self::L1 => "L1",
			Self::L2 => "L2",
			Self::Llc => "LLC",
			Self::Pwc => "PWC",
			Self::Memory => "MEMORY",
		}
	}
}

impl FromStr for Level {
	type Err = UnknownLevel;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|level| level.label() == s)
			.ok_or_else(|| UnknownLevel(s.to_owned()))
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.label())
	}
}

/// Error for [`Level::from_str`]
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
#[error("Unknown level label {0:?}")]
pub struct UnknownLevel(pub String);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn labels_round_trip() {
		for level in Level::ALL {
			assert_eq!(level.label().parse::<Level>(), Ok(level));
		}
	}

	#[test]
	fn labels_are_case_sensitive() {
		assert_eq!("llc".parse::<Level>(), Err(UnknownLevel("llc".to_owned())));
		assert!(" L1".parse::<Level>().is_err());
	}

	#[test]
	fn serde_uses_trace_labels() {
		assert_eq!(serde_json::to_string(&Level::Llc).unwrap(), "\"LLC\"");
		assert_eq!(serde_json::from_str::<Level>("\"MEMORY\"").unwrap(), Level::Memory);
	}
}
