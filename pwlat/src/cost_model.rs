//! Cost models

// Imports
use crate::Level;

/// Cost, in cycles, of resolving a probe at each level
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostModel {
	pub zero:   u64,
	pub l1:     u64,
	pub l2:     u64,
	pub llc:    u64,
	pub pwc:    u64,
	pub memory: u64,
}

impl CostModel {
	/// Returns the cost of `level`
	pub const fn cost(&self, level: Level) -> u64 {
		match level {
			Level::Zero => self.zero,
			Level::L1 => self.l1,
			Level::L2 => self.l2,
			Level::Llc => self.llc,
			Level::Pwc => self.pwc,
			Level::Memory => self.memory,
		}
	}

	/// Returns the cost of a probe, where an unknown label costs nothing
	pub fn probe_cost(&self, probe: Option<Level>) -> u64 {
		probe.map_or(0, |level| self.cost(level))
	}

	/// Returns this cost model with the main memory cost replaced
	#[must_use]
	pub const fn with_memory_cost(self, memory: u64) -> Self {
		Self { memory, ..self }
	}
}

/// Fixed per-record overheads of the ECPT walk, in cycles
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overheads {
	/// Hash computation
	pub hash: u64,

	/// PUD cuckoo-walk-cache lookup
	pub pud_cwc: u64,

	/// PMD cuckoo-walk-cache lookup
	pub pmd_cwc: u64,
}

impl Overheads {
	/// Overhead when both walk-cache lookups are issued one after the other
	pub const fn serial(&self) -> u64 {
		self.hash + self.pud_cwc + self.pmd_cwc
	}

	/// Overhead when both walk-cache lookups are issued concurrently
	pub fn parallel(&self) -> u64 {
		self.hash + self.pud_cwc.max(self.pmd_cwc)
	}
}

/// Named cost model preset
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
	/// Name
	pub name: String,

	/// Costs
	pub costs: CostModel,

	/// Overheads
	pub overheads: Overheads,

	/// File-name suffixes of the traces this preset applies to
	pub suffixes: Vec<String>,
}

/// Overheads shared by the built-in presets
const DEFAULT_OVERHEADS: Overheads = Overheads {
	hash:    2,
	pud_cwc: 4,
	pmd_cwc: 4,
};

/// Suffix of dynamic instrumentation logs
pub const DYNA_LOG_SUFFIX: &str = "_dyna.log";

/// Returns the built-in presets.
///
/// The first preset is the default one.
pub fn builtin_presets() -> Vec<Preset> {
	vec![
		// Measured with a pointer-chasing benchmark on the trace collection machine
		Preset {
			name:      "default".to_owned(),
			costs:     CostModel {
				zero:   0,
				l1:     4,
				l2:     14,
				llc:    54,
				pwc:    1,
				memory: 200,
			},
			overheads: DEFAULT_OVERHEADS,
			suffixes:  vec![DYNA_LOG_SUFFIX.to_owned()],
		},
		// Reference latencies from the ECPT paper
		Preset {
			name:      "paper".to_owned(),
			costs:     CostModel {
				zero:   0,
				l1:     5,
				l2:     20,
				llc:    80,
				pwc:    1,
				memory: 200,
			},
			overheads: DEFAULT_OVERHEADS,
			suffixes:  vec![DYNA_LOG_SUFFIX.to_owned()],
		},
	]
}
