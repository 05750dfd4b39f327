//! Page walk latency (`pwlat`)
//!
//! Reduces page walk traces of radix and ECPT page tables into latency statistics,
//! aggregates them across benchmarks and compares designs.

// Modules
pub mod aggregate;
pub mod compare;
pub mod config;
pub mod cost_model;
pub mod data;
pub mod dyna_log;
pub mod level;
pub mod record;
pub mod reduce;
pub mod reducers;
pub mod segment;
pub mod stats;
pub mod table;

// Exports
pub use self::{
	aggregate::Aggregator,
	cost_model::CostModel,
	dyna_log::DynaLogReader,
	level::Level,
	reduce::{Reducer, TraceReducer},
	table::BenchmarkTable,
};
