//! zdchf-core: ZDC/HF pileup filter for heavy-ion event selection.
//!
//! This crate provides the per-event data model, the filter configuration,
//! the input-provider interface and the pileup metric itself.
//!

pub mod candidate;
pub mod config;
pub mod error;
pub mod filter;
pub mod source;
pub mod statistics;

pub use candidate::{Candidate, CentralityInfo, ParticleCandidate, Species};
pub use config::{FilterConfig, InputTag, ParameterSetDescription};
pub use error::{Error, Result};
pub use filter::{evaluate, hf_sum, in_hf_acceptance, Decision, PileupMetric, ZdcHfPileupFilter};
pub use source::{EventId, EventRecord, EventSource};
pub use statistics::FilterStatistics;
