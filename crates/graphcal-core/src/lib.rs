//! Core types: identifier re-encoding, time windows, tracing setup

pub mod time;
pub mod tracing;
pub mod uid;

pub use time::{TimeError, TimeWindow};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use uid::{GlobalObjectId, UidError, reencode};
