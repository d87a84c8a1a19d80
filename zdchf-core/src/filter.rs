//! ZDC/HF pileup rejection.
//!
//! The filter combines the ZDC energy sum with the HF transverse-energy sum
//! recomputed from particle-flow candidates:
//!
//! ```text
//! metric = zdc_sum / zdc_divisor + hf_sum / hihf_divisor
//! ```
//!
//! Events with `metric > 1.0` are pileup or electromagnetic peripheral
//! collisions and are rejected. A metric of exactly 1.0 is accepted.

use crate::candidate::{Candidate, CentralityInfo, Species};
use crate::config::FilterConfig;
use crate::source::{EventId, EventSource};
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Inner edge of the HF acceptance window in |eta| (exclusive).
pub const HF_ETA_MIN: f64 = 3.0;

/// Outer edge of the HF acceptance window in |eta| (exclusive).
pub const HF_ETA_MAX: f64 = 6.0;

/// Metric value above which an event is pileup.
pub const PILEUP_THRESHOLD: f64 = 1.0;

/// Log target for per-event diagnostics.
pub const LOG_TARGET: &str = "ZdcHfPileupFilter";

/// Returns true if `eta` lies inside the forward or backward HF window.
///
/// Both windows are open intervals: `(3, 6)` and `(-6, -3)`.
#[inline]
#[must_use]
pub fn in_hf_acceptance(eta: f64) -> bool {
    (eta > HF_ETA_MIN && eta < HF_ETA_MAX) || (eta < -HF_ETA_MIN && eta > -HF_ETA_MAX)
}

/// Sums transverse energy of hadron and EM candidates inside the HF windows.
///
/// Selection uses the raw species code, never an overridden
/// [`Candidate::species`].
#[must_use]
pub fn hf_sum<C: Candidate>(candidates: &[C]) -> f64 {
    candidates
        .iter()
        .filter(|c| {
            Species::from_code(c.species_code()).is_some() && in_hf_acceptance(c.eta())
        })
        .map(Candidate::et)
        .sum()
}

/// The pileup metric of one event and the sums it was built from.
///
/// Non-finite values serialize as the strings `"inf"`, `"-inf"` and `"NaN"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileupMetric {
    /// ZDC energy sum.
    #[serde(with = "non_finite")]
    pub zdc_sum: f64,
    /// HF transverse-energy sum from candidates.
    #[serde(with = "non_finite")]
    pub hf_sum: f64,
    /// Normalized combination of both sums.
    #[serde(with = "non_finite")]
    pub value: f64,
}

/// JSON has no literal for infinity or NaN; write them as strings.
mod non_finite {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if value.is_sign_positive() { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!(
                    "expected a number, \"inf\", \"-inf\" or \"NaN\", got {other:?}"
                ))),
            },
        }
    }
}

impl PileupMetric {
    /// Computes the metric for one event.
    #[must_use]
    pub fn compute<C: Candidate>(
        centrality: &CentralityInfo,
        candidates: &[C],
        config: &FilterConfig,
    ) -> Self {
        let zdc_sum = centrality.zdc_sum;
        let hf_sum = hf_sum(candidates);
        let value = zdc_sum / config.zdc_divisor + hf_sum / config.hihf_divisor;
        Self {
            zdc_sum,
            hf_sum,
            value,
        }
    }

    /// Returns true if the metric exceeds the pileup threshold.
    ///
    /// A NaN metric is not pileup.
    #[inline]
    #[must_use]
    pub fn is_pileup(&self) -> bool {
        self.value > PILEUP_THRESHOLD
    }
}

/// Accept/reject decision for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Event the decision belongs to.
    pub id: EventId,
    /// Metric the decision was taken on.
    pub metric: PileupMetric,
    /// True if the event passes the filter.
    pub accepted: bool,
}

/// Evaluates one event: `true` keeps it, `false` rejects it as pileup.
///
/// Divisors are not checked here; see [`FilterConfig::validate`].
#[must_use]
pub fn evaluate<C: Candidate>(
    centrality: &CentralityInfo,
    candidates: &[C],
    config: &FilterConfig,
) -> bool {
    let metric = PileupMetric::compute(centrality, candidates, config);
    judge(&metric, config)
}

fn judge(metric: &PileupMetric, config: &FilterConfig) -> bool {
    let is_pileup = metric.is_pileup();

    if config.debug {
        log::info!(
            target: LOG_TARGET,
            "zdc_sum={} hf_sum={} metric={} reject={}",
            metric.zdc_sum,
            metric.hf_sum,
            metric.value,
            is_pileup
        );
    }

    !is_pileup
}

/// ZDC/HF pileup filter bound to a validated configuration.
#[derive(Debug, Clone)]
pub struct ZdcHfPileupFilter {
    config: FilterConfig,
}

impl ZdcHfPileupFilter {
    /// Creates a filter, validating the configuration.
    ///
    /// # Errors
    /// Returns an error if either divisor is not finite and positive.
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Computes the metric without taking a decision.
    #[must_use]
    pub fn metric<C: Candidate>(
        &self,
        centrality: &CentralityInfo,
        candidates: &[C],
    ) -> PileupMetric {
        PileupMetric::compute(centrality, candidates, &self.config)
    }

    /// Evaluates one event from its inputs.
    #[must_use]
    pub fn evaluate<C: Candidate>(&self, centrality: &CentralityInfo, candidates: &[C]) -> bool {
        evaluate(centrality, candidates, &self.config)
    }

    /// Reads both inputs from `source` and evaluates the event.
    ///
    /// # Errors
    /// Returns an error if either configured product is missing.
    pub fn filter<S: EventSource>(&self, source: &S) -> Result<bool> {
        Ok(self.decide(source)?.accepted)
    }

    /// Like [`Self::filter`], but keeps the metric alongside the decision.
    ///
    /// # Errors
    /// Returns an error if either configured product is missing.
    pub fn decide<S: EventSource>(&self, source: &S) -> Result<Decision> {
        let centrality = source.centrality(&self.config.centrality_src)?;
        let candidates = source.candidates(&self.config.pf_src)?;

        let metric = self.metric(&centrality, candidates);
        let accepted = judge(&metric, &self.config);
        Ok(Decision {
            id: source.id(),
            metric,
            accepted,
        })
    }

    /// Decides a batch of events in parallel.
    ///
    /// Decisions are returned in input order. The first missing product
    /// encountered aborts the batch.
    ///
    /// # Errors
    /// Returns an error if any event lacks a configured product.
    pub fn filter_batch<S>(&self, events: &[S]) -> Result<Vec<Decision>>
    where
        S: EventSource + Sync,
    {
        events.par_iter().map(|event| self.decide(event)).collect()
    }
}
