//! zdchf-io: Event file I/O for the ZDC/HF pileup filter.
//!
//! This crate reads events from JSON Lines files and writes filter
//! decisions and accepted events back out.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{EventFileReader, EventReader};
pub use writer::{OutputWriter, DECISION_CSV_HEADER};
