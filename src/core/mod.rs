//! # Core
//!
//! Plain data shared by every layer: the FFI record, the export table,
//! configuration and errors. No I/O beyond reading a config file.

pub mod config;
pub mod error;
pub mod export;
pub mod step;

pub use config::SapfConfig;
pub use error::{SapfError, SapfResult};
pub use export::Export;
pub use step::{NodeId, StepResult};
