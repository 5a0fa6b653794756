//! Treasury command line support.
//!
//! Script replay and output formatting used by the `treasury` binary.

pub mod output;
pub mod script;

pub use output::*;
pub use script::*;
