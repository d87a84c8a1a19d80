//! Per-event detector inputs: centrality summary and particle-flow candidates.

use serde::{Deserialize, Serialize};

/// Centrality summary of one event.
///
/// Only the ZDC energy sum is consumed by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CentralityInfo {
    /// Total Zero Degree Calorimeter energy sum (arbitrary units).
    #[serde(rename = "zdcSum")]
    pub zdc_sum: f64,
}

impl CentralityInfo {
    /// Creates a centrality record with the given ZDC sum.
    #[inline]
    #[must_use]
    pub fn new(zdc_sum: f64) -> Self {
        Self { zdc_sum }
    }
}

/// Particle species that deposit energy in the HF calorimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Species {
    /// Hadronic deposit in the forward calorimeter.
    Hadron = 1,
    /// Electromagnetic deposit in the forward calorimeter.
    Electromagnetic = 2,
}

impl Species {
    /// Classifies a raw species code; codes other than 1 and 2 are ignored.
    #[inline]
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Hadron),
            2 => Some(Self::Electromagnetic),
            _ => None,
        }
    }

    /// Returns the raw species code.
    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// A reconstructed particle-flow candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleCandidate {
    /// Species classification code.
    #[serde(rename = "speciesCode", alias = "pdgId")]
    pub species_code: i32,
    /// Pseudorapidity.
    #[serde(rename = "pseudorapidity", alias = "eta")]
    pub eta: f64,
    /// Transverse energy.
    #[serde(rename = "transverseEnergy", alias = "et")]
    pub et: f64,
}

impl ParticleCandidate {
    /// Creates a new candidate.
    #[inline]
    #[must_use]
    pub fn new(species_code: i32, eta: f64, et: f64) -> Self {
        Self {
            species_code,
            eta,
            et,
        }
    }
}

/// Read access to a particle-flow candidate.
///
/// Lets the filter run over any candidate representation, so host event
/// types can be passed in without copying into [`ParticleCandidate`].
pub trait Candidate: Send + Sync {
    /// Returns the species classification code.
    fn species_code(&self) -> i32;

    /// Returns the pseudorapidity.
    fn eta(&self) -> f64;

    /// Returns the transverse energy.
    fn et(&self) -> f64;

    /// Returns the species, if it is one the HF sum counts.
    #[inline]
    fn species(&self) -> Option<Species> {
        Species::from_code(self.species_code())
    }
}

impl Candidate for ParticleCandidate {
    #[inline]
    fn species_code(&self) -> i32 {
        self.species_code
    }

    #[inline]
    fn eta(&self) -> f64 {
        self.eta
    }

    #[inline]
    fn et(&self) -> f64 {
        self.et
    }
}

impl<C: Candidate> Candidate for &C {
    #[inline]
    fn species_code(&self) -> i32 {
        (**self).species_code()
    }

    #[inline]
    fn eta(&self) -> f64 {
        (**self).eta()
    }

    #[inline]
    fn et(&self) -> f64 {
        (**self).et()
    }
}
