//! Configuration

// Imports
use {
	crate::{
		cost_model::{self, CostModel, Overheads, Preset},
		record::RecordFormat,
	},
	anyhow::Context,
	itertools::Itertools,
	std::{fmt, fs, path::Path, time::Duration},
};

/// Page table design a trace was collected under
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Design {
	/// Radix tree walker
	#[default]
	Radix,

	/// Elastic cuckoo page table walker
	Ecpt,
}

impl Design {
	/// Returns the trace format this design's logs are reduced from
	pub const fn format(self) -> RecordFormat {
		match self {
			Self::Radix => RecordFormat::Simple,
			Self::Ecpt => RecordFormat::WithWay,
		}
	}
}

impl fmt::Display for Design {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(match self {
			Self::Radix => "radix",
			Self::Ecpt => "ecpt",
		})
	}
}

/// What to do with unknown labels and malformed fields
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Strictness {
	/// Count and report them, but keep going
	#[default]
	Lenient,

	/// Fail the file they appear in
	Strict,
}

/// Extensions of files that are never traces
pub const DEFAULT_EXCLUDE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "svg", "pdf", "csv", "json"];

/// Default debug output period (in seconds)
pub const DEFAULT_DEBUG_OUTPUT_PERIOD_SECS: f64 = 1.0;

/// Configuration file.
///
/// Every field is optional, command line arguments take precedence.
#[derive(Clone, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
	/// Design
	pub design: Option<Design>,

	/// Preset name
	pub preset: Option<String>,

	/// Trace file suffix
	pub suffix: Option<String>,

	/// Strict mode
	pub strict: Option<bool>,

	/// Main memory cost override
	pub memory_cost: Option<u64>,

	/// Extensions to skip when discovering traces
	pub exclude_extensions: Option<Vec<String>>,

	/// Debug output period (in seconds)
	pub debug_output_period_secs: Option<f64>,

	/// Extra presets
	pub presets: Vec<Preset>,
}

impl ConfigFile {
	/// Reads a config file
	pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
		let config_file = fs::File::open(path).with_context(|| format!("Unable to open config file {path:?}"))?;
		serde_json::from_reader(config_file).with_context(|| format!("Unable to parse config file {path:?}"))
	}

	/// Returns all presets, built-in ones first.
	///
	/// Presets in this file replace built-in presets with the same name.
	pub fn presets(&self) -> Vec<Preset> {
		let mut presets = cost_model::builtin_presets();
		for preset in &self.presets {
			match presets.iter_mut().find(|builtin| builtin.name == preset.name) {
				Some(builtin) => *builtin = preset.clone(),
				None => presets.push(preset.clone()),
			}
		}

		presets
	}
}

/// Command line overrides for a [`ConfigFile`]
#[derive(Clone, Debug, Default)]
pub struct Overrides {
	pub design:      Option<Design>,
	pub preset:      Option<String>,
	pub suffix:      Option<String>,
	pub strict:      bool,
	pub memory_cost: Option<u64>,
}

/// Run configuration.
///
/// Validated as a whole, once, before any trace is read.
#[derive(Clone, Debug)]
pub struct RunConfig {
	/// Design
	pub design: Design,

	/// Preset name
	pub preset: String,

	/// Costs, including any override
	pub costs: CostModel,

	/// Overheads
	pub overheads: Overheads,

	/// Trace file suffix
	pub suffix: String,

	/// Strictness
	pub strictness: Strictness,

	/// Extensions to skip when discovering traces
	pub exclude_extensions: Vec<String>,

	/// Debug output period
	pub debug_output_period: Duration,
}

impl RunConfig {
	/// Resolves the run configuration from a config file and overrides
	pub fn resolve(config_file: &ConfigFile, overrides: Overrides) -> Result<Self, ConfigError> {
		let presets = config_file.presets();
		let preset_name = overrides
			.preset
			.or_else(|| config_file.preset.clone())
			.unwrap_or_else(|| presets[0].name.clone());
		let preset = presets
			.iter()
			.find(|preset| preset.name == preset_name)
			.ok_or_else(|| ConfigError::UnknownPreset {
				name:      preset_name.clone(),
				available: presets.iter().map(|preset| &preset.name).join(", "),
			})?;

		// Note: Presets without any suffixes can't be run with anything
		let suffix = match overrides.suffix.or_else(|| config_file.suffix.clone()) {
			Some(suffix) => suffix,
			None => preset
				.suffixes
				.first()
				.cloned()
				.ok_or_else(|| ConfigError::NoSuffixes(preset.name.clone()))?,
		};
		if suffix.is_empty() {
			return Err(ConfigError::EmptySuffix);
		}
		if !preset.suffixes.contains(&suffix) {
			return Err(ConfigError::IncompatibleSuffix {
				suffix,
				preset: preset.name.clone(),
				compatible: preset.suffixes.iter().join(", "),
			});
		}

		let costs = match overrides.memory_cost.or(config_file.memory_cost) {
			Some(memory_cost) => preset.costs.with_memory_cost(memory_cost),
			None => preset.costs,
		};

		let strictness = match overrides.strict || config_file.strict.unwrap_or(false) {
			true => Strictness::Strict,
			false => Strictness::Lenient,
		};

		let debug_output_period_secs = config_file
			.debug_output_period_secs
			.unwrap_or(DEFAULT_DEBUG_OUTPUT_PERIOD_SECS);
		let debug_output_period = Duration::try_from_secs_f64(debug_output_period_secs)
			.map_err(|_| ConfigError::InvalidDebugOutputPeriod(debug_output_period_secs))?;

		Ok(Self {
			design: overrides.design.or(config_file.design).unwrap_or_default(),
			preset: preset.name.clone(),
			costs,
			overheads: preset.overheads,
			suffix,
			strictness,
			exclude_extensions: config_file.exclude_extensions.clone().unwrap_or_else(|| {
				DEFAULT_EXCLUDE_EXTENSIONS
					.iter()
					.map(|&ext| ext.to_owned())
					.collect()
			}),
			debug_output_period,
		})
	}
}

/// Configuration error
#[derive(Debug)]
#[derive(thiserror::Error)]
pub enum ConfigError {
	#[error("Unknown preset {name:?}, available presets: {available}")]
	UnknownPreset { name: String, available: String },

	#[error("Preset {0:?} has no trace suffixes")]
	NoSuffixes(String),

	#[error("Trace suffix must not be empty")]
	EmptySuffix,

	#[error("Suffix {suffix:?} is not compatible with preset {preset:?}, expected one of: {compatible}")]
	IncompatibleSuffix {
		suffix:     String,
		preset:     String,
		compatible: String,
	},

	#[error("Invalid debug output period: {0}s")]
	InvalidDebugOutputPeriod(f64),
}

#[cfg(test)]
mod tests {
	use {super::*, crate::cost_model::DYNA_LOG_SUFFIX};

	#[test]
	fn defaults() {
		let config = RunConfig::resolve(&ConfigFile::default(), Overrides::default()).unwrap();
		assert_eq!(config.design, Design::Radix);
		assert_eq!(config.preset, "default");
		assert_eq!(config.suffix, DYNA_LOG_SUFFIX);
		assert_eq!(config.strictness, Strictness::Lenient);
		assert_eq!(config.costs.memory, 200);
		assert_eq!(config.debug_output_period, Duration::from_secs(1));
		assert!(config.exclude_extensions.iter().any(|ext| ext == "png"));
	}

	#[test]
	fn unknown_preset_is_rejected() {
		let overrides = Overrides {
			preset: Some("skylake".to_owned()),
			..Overrides::default()
		};
		let err = RunConfig::resolve(&ConfigFile::default(), overrides).unwrap_err();
		assert!(matches!(err, ConfigError::UnknownPreset { ref name, .. } if name == "skylake"));
		assert!(err.to_string().contains("default, paper"));
	}

	#[test]
	fn incompatible_suffix_is_rejected() {
		let overrides = Overrides {
			suffix: Some("_thp.log".to_owned()),
			..Overrides::default()
		};
		let err = RunConfig::resolve(&ConfigFile::default(), overrides).unwrap_err();
		assert!(matches!(err, ConfigError::IncompatibleSuffix { .. }));
	}

	#[test]
	fn overrides_beat_config_file() {
		let config_file = serde_json::from_str::<ConfigFile>(
			r#"{
				"design": "ecpt",
				"preset": "paper",
				"memory_cost": 300,
				"strict": false
			}"#,
		)
		.unwrap();

		let config = RunConfig::resolve(&config_file, Overrides::default()).unwrap();
		assert_eq!(config.design, Design::Ecpt);
		assert_eq!(config.preset, "paper");
		assert_eq!(config.costs.llc, 80);
		assert_eq!(config.costs.memory, 300);

		let config = RunConfig::resolve(&config_file, Overrides {
			design:      Some(Design::Radix),
			preset:      Some("default".to_owned()),
			suffix:      None,
			strict:      true,
			memory_cost: Some(150),
		})
		.unwrap();
		assert_eq!(config.design, Design::Radix);
		assert_eq!(config.costs.llc, 54);
		assert_eq!(config.costs.memory, 150);
		assert_eq!(config.strictness, Strictness::Strict);
	}

	#[test]
	fn config_presets_extend_and_replace_builtins() {
		let config_file = serde_json::from_str::<ConfigFile>(
			r#"{
				"preset": "thp",
				"presets": [
					{
						"name": "thp",
						"costs": { "zero": 0, "l1": 4, "l2": 14, "llc": 54, "pwc": 1, "memory": 250 },
						"overheads": { "hash": 3, "pud_cwc": 4, "pmd_cwc": 5 },
						"suffixes": ["_thp_dyna.log"]
					},
					{
						"name": "paper",
						"costs": { "zero": 0, "l1": 1, "l2": 1, "llc": 1, "pwc": 1, "memory": 1 },
						"overheads": { "hash": 0, "pud_cwc": 0, "pmd_cwc": 0 },
						"suffixes": ["_dyna.log"]
					}
				]
			}"#,
		)
		.unwrap();

		let names = config_file.presets().into_iter().map(|preset| preset.name).collect::<Vec<_>>();
		assert_eq!(names, ["default", "paper", "thp"]);

		let config = RunConfig::resolve(&config_file, Overrides::default()).unwrap();
		assert_eq!(config.suffix, "_thp_dyna.log");
		assert_eq!(config.costs.memory, 250);
		assert_eq!(config.overheads.parallel(), 8);

		let config = RunConfig::resolve(&config_file, Overrides {
			preset: Some("paper".to_owned()),
			..Overrides::default()
		})
		.unwrap();
		assert_eq!(config.costs.llc, 1);
	}

	#[test]
	fn invalid_debug_period_is_rejected() {
		let config_file = ConfigFile {
			debug_output_period_secs: Some(-1.0),
			..ConfigFile::default()
		};
		let err = RunConfig::resolve(&config_file, Overrides::default()).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidDebugOutputPeriod(_)));
	}
}
