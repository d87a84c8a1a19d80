//! Input-provider interface between the filter and whatever holds the events.

use crate::candidate::{Candidate, CentralityInfo, ParticleCandidate};
use crate::config::InputTag;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Run / luminosity-block / event number triple.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct EventId {
    /// Run number.
    pub run: u32,
    /// Luminosity block.
    pub lumi: u32,
    /// Event number within the run.
    pub event: u64,
}

impl EventId {
    /// Creates a new event id.
    #[must_use]
    pub fn new(run: u32, lumi: u32, event: u64) -> Self {
        Self { run, lumi, event }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// Provides the two inputs the filter reads from an event.
///
/// Products are looked up by [`InputTag`]; a missing product is an error.
pub trait EventSource {
    /// Candidate type stored by this source.
    type Candidate: Candidate;

    /// Identifier of the event; sources without one report the default id.
    fn id(&self) -> EventId {
        EventId::default()
    }

    /// Returns the centrality summary registered under `tag`.
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`] if the event has no such product.
    fn centrality(&self, tag: &InputTag) -> Result<CentralityInfo>;

    /// Returns the candidate collection registered under `tag`.
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`] if the event has no such product.
    fn candidates(&self, tag: &InputTag) -> Result<&[Self::Candidate]>;
}

/// One event as stored in an event file.
///
/// Products are keyed by input-tag string; a lookup tries the full tag
/// first and then the bare label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event identifier.
    #[serde(default)]
    pub id: EventId,
    /// Centrality summaries by tag.
    #[serde(default)]
    pub centrality: BTreeMap<String, CentralityInfo>,
    /// Candidate collections by tag.
    #[serde(default)]
    pub candidates: BTreeMap<String, Vec<ParticleCandidate>>,
}

impl EventRecord {
    /// Creates an empty event.
    #[must_use]
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Adds a centrality product.
    #[must_use]
    pub fn with_centrality(mut self, tag: &InputTag, info: CentralityInfo) -> Self {
        self.centrality.insert(tag.to_string(), info);
        self
    }

    /// Adds a candidate collection.
    #[must_use]
    pub fn with_candidates(mut self, tag: &InputTag, candidates: Vec<ParticleCandidate>) -> Self {
        self.candidates.insert(tag.to_string(), candidates);
        self
    }
}

fn lookup<'a, V>(products: &'a BTreeMap<String, V>, tag: &InputTag) -> Option<&'a V> {
    products
        .get(&tag.to_string())
        .or_else(|| products.get(tag.label()))
}

impl EventSource for EventRecord {
    type Candidate = ParticleCandidate;

    fn id(&self) -> EventId {
        self.id
    }

    fn centrality(&self, tag: &InputTag) -> Result<CentralityInfo> {
        lookup(&self.centrality, tag)
            .copied()
            .ok_or_else(|| Error::ProductNotFound {
                kind: "centrality",
                tag: tag.to_string(),
            })
    }

    fn candidates(&self, tag: &InputTag) -> Result<&[ParticleCandidate]> {
        lookup(&self.candidates, tag)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::ProductNotFound {
                kind: "candidate collection",
                tag: tag.to_string(),
            })
    }
}
