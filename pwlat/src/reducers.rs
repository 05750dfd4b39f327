//! Reducers

// Modules
pub mod ecpt;
pub mod radix;

// Exports
pub use self::{
	ecpt::{EcptReducer, WayLatencies},
	radix::RadixReducer,
};
