//! Filter configuration and its parameter-set description.
#![allow(clippy::doc_markdown)]

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// Module label under which the filter is registered by default.
pub const MODULE_LABEL: &str = "zdcHfPileupFilter";

/// Default ZDC normalization divisor.
pub const DEFAULT_ZDC_DIVISOR: f64 = 700_000.0;

/// Default HF normalization divisor.
pub const DEFAULT_HIHF_DIVISOR: f64 = 9000.0;

/// Identifier of an event product: `label[:instance[:process]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InputTag {
    label: String,
    instance: String,
    process: String,
}

impl InputTag {
    /// Creates a tag from a bare module label.
    ///
    /// # Errors
    /// Returns an error if the label is blank or contains `:`.
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() || label.contains(':') {
            return Err(Error::InvalidInputTag(label));
        }
        Ok(Self {
            label,
            instance: String::new(),
            process: String::new(),
        })
    }

    /// Module label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Product instance name (empty when unset).
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Process name (empty when unset).
    #[must_use]
    pub fn process(&self) -> &str {
        &self.process
    }
}

impl FromStr for InputTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 3 || parts[0].trim().is_empty() {
            return Err(Error::InvalidInputTag(s.to_string()));
        }
        let field = |i: usize| parts.get(i).map_or_else(String::new, |p| p.trim().to_string());
        Ok(Self {
            label: field(0),
            instance: field(1),
            process: field(2),
        })
    }
}

impl TryFrom<String> for InputTag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<InputTag> for String {
    fn from(tag: InputTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)?;
        if !self.instance.is_empty() || !self.process.is_empty() {
            write!(f, ":{}", self.instance)?;
        }
        if !self.process.is_empty() {
            write!(f, ":{}", self.process)?;
        }
        Ok(())
    }
}

/// Configuration for the ZDC/HF pileup filter.
///
/// Built once before filtering starts and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilterConfig {
    /// Source of the centrality summary.
    #[serde(rename = "centralitySrc")]
    pub centrality_src: InputTag,
    /// Source of the particle-flow candidate collection.
    #[serde(rename = "pfSrc")]
    pub pf_src: InputTag,
    /// Normalization divisor for the ZDC sum.
    #[serde(rename = "zdcDivisor")]
    pub zdc_divisor: f64,
    /// Normalization divisor for the HF sum.
    #[serde(rename = "hihfDivisor")]
    pub hihf_divisor: f64,
    /// Log a diagnostic line per event.
    pub debug: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            centrality_src: InputTag {
                label: "hiCentrality".to_string(),
                instance: String::new(),
                process: String::new(),
            },
            pf_src: InputTag {
                label: "packedPFCandidates".to_string(),
                instance: String::new(),
                process: String::new(),
            },
            zdc_divisor: DEFAULT_ZDC_DIVISOR,
            hihf_divisor: DEFAULT_HIHF_DIVISOR,
            debug: false,
        }
    }
}

// Parameter-set JSON; every key is optional and falls back to the defaults.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct JsonParameterSet {
    #[serde(rename = "centralitySrc")]
    centrality_src: InputTag,
    #[serde(rename = "pfSrc")]
    pf_src: InputTag,
    #[serde(rename = "zdcDivisor")]
    zdc_divisor: f64,
    #[serde(rename = "hihfDivisor")]
    hihf_divisor: f64,
    debug: bool,
}

impl Default for JsonParameterSet {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self {
            centrality_src: config.centrality_src,
            pf_src: config.pf_src,
            zdc_divisor: config.zdc_divisor,
            hihf_divisor: config.hihf_divisor,
            debug: config.debug,
        }
    }
}

impl FilterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the centrality source.
    #[must_use]
    pub fn with_centrality_src(mut self, tag: InputTag) -> Self {
        self.centrality_src = tag;
        self
    }

    /// Sets the candidate source.
    #[must_use]
    pub fn with_pf_src(mut self, tag: InputTag) -> Self {
        self.pf_src = tag;
        self
    }

    /// Sets the ZDC divisor.
    #[must_use]
    pub fn with_zdc_divisor(mut self, divisor: f64) -> Self {
        self.zdc_divisor = divisor;
        self
    }

    /// Sets the HF divisor.
    #[must_use]
    pub fn with_hihf_divisor(mut self, divisor: f64) -> Self {
        self.hihf_divisor = divisor;
        self
    }

    /// Enables or disables per-event diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load a parameter set from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds an invalid divisor.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let pset: JsonParameterSet = serde_json::from_reader(reader)?;
        Self::from_parameter_set(pset)
    }

    /// Load a parameter set from a JSON string.
    ///
    /// Keys use the framework parameter names (`centralitySrc`, `pfSrc`,
    /// `zdcDivisor`, `hihfDivisor`, `debug`).
    ///
    /// # Errors
    /// Returns an error if the string is not valid JSON or holds an invalid
    /// divisor.
    pub fn from_json(json: &str) -> Result<Self> {
        let pset: JsonParameterSet = serde_json::from_str(json)?;
        Self::from_parameter_set(pset)
    }

    fn from_parameter_set(pset: JsonParameterSet) -> Result<Self> {
        let config = Self {
            centrality_src: pset.centrality_src,
            pf_src: pset.pf_src,
            zdc_divisor: pset.zdc_divisor,
            hihf_divisor: pset.hihf_divisor,
            debug: pset.debug,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that both divisors are finite and strictly positive.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("zdcDivisor", self.zdc_divisor),
            ("hihfDivisor", self.hihf_divisor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigError(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Describes the accepted parameters and their defaults.
    #[must_use]
    pub fn describe() -> ParameterSetDescription {
        let defaults = Self::default();
        ParameterSetDescription {
            module_label: MODULE_LABEL.to_string(),
            parameters: vec![
                ParameterDescription::new(
                    "centralitySrc",
                    ParameterType::InputTag,
                    defaults.centrality_src.to_string(),
                ),
                ParameterDescription::new(
                    "pfSrc",
                    ParameterType::InputTag,
                    defaults.pf_src.to_string(),
                ),
                ParameterDescription::new(
                    "zdcDivisor",
                    ParameterType::Double,
                    format!("{:.1}", defaults.zdc_divisor),
                ),
                ParameterDescription::new(
                    "hihfDivisor",
                    ParameterType::Double,
                    format!("{:.1}", defaults.hihf_divisor),
                ),
                ParameterDescription::new(
                    "debug",
                    ParameterType::Bool,
                    defaults.debug.to_string(),
                ),
            ],
        }
    }
}

/// Type of a configurable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Product identifier.
    InputTag,
    /// Double-precision float.
    Double,
    /// Boolean flag.
    Bool,
}

/// One entry of a [`ParameterSetDescription`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescription {
    /// Parameter name.
    pub name: &'static str,
    /// Parameter type.
    #[serde(rename = "type")]
    pub kind: ParameterType,
    /// Default value, rendered as text.
    pub default: String,
}

impl ParameterDescription {
    fn new(name: &'static str, kind: ParameterType, default: String) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }
}

/// Accepted parameters of the filter module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSetDescription {
    /// Default module label.
    pub module_label: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterDescription>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.centrality_src.to_string(), "hiCentrality");
        assert_eq!(config.pf_src.to_string(), "packedPFCandidates");
        assert!((config.zdc_divisor - 700_000.0).abs() < f64::EPSILON);
        assert!((config.hihf_divisor - 9000.0).abs() < f64::EPSILON);
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = FilterConfig::new()
            .with_zdc_divisor(1000.0)
            .with_hihf_divisor(10.0)
            .with_debug(true)
            .with_pf_src(InputTag::new("particleFlow").unwrap());

        assert!((config.zdc_divisor - 1000.0).abs() < f64::EPSILON);
        assert!((config.hihf_divisor - 10.0).abs() < f64::EPSILON);
        assert!(config.debug);
        assert_eq!(config.pf_src.label(), "particleFlow");
    }

    #[test]
    fn test_input_tag_parsing() {
        let tag: InputTag = "hiCentrality".parse().unwrap();
        assert_eq!(tag.label(), "hiCentrality");
        assert_eq!(tag.instance(), "");
        assert_eq!(tag.process(), "");

        let tag: InputTag = "packedPFCandidates::PAT".parse().unwrap();
        assert_eq!(tag.label(), "packedPFCandidates");
        assert_eq!(tag.instance(), "");
        assert_eq!(tag.process(), "PAT");
        assert_eq!(tag.to_string(), "packedPFCandidates::PAT");

        let tag: InputTag = "hiCentrality:zdc".parse().unwrap();
        assert_eq!(tag.to_string(), "hiCentrality:zdc");

        assert!("".parse::<InputTag>().is_err());
        assert!(":instance".parse::<InputTag>().is_err());
        assert!("a:b:c:d".parse::<InputTag>().is_err());
        assert!(InputTag::new("a:b").is_err());
    }

    #[test]
    fn test_input_tag_rejects_blank_label() {
        assert!(InputTag::new("").is_err());
        assert!(InputTag::new(" ").is_err());
        assert!(InputTag::new("\t \n").is_err());
        assert!("  ".parse::<InputTag>().is_err());
        assert!(serde_json::from_str::<InputTag>(r#"" ""#).is_err());
        assert_eq!(InputTag::new("hiCentrality").unwrap().label(), "hiCentrality");
    }

    #[test]
    fn test_json_full_parameter_set() {
        let json = r#"{
            "centralitySrc": "hiCentrality::RECO",
            "pfSrc": "packedPFCandidates",
            "zdcDivisor": 650000.0,
            "hihfDivisor": 8500.0,
            "debug": true
        }"#;

        let config = FilterConfig::from_json(json).expect("Failed to parse JSON");
        assert_eq!(config.centrality_src.process(), "RECO");
        assert!((config.zdc_divisor - 650_000.0).abs() < f64::EPSILON);
        assert!((config.hihf_divisor - 8500.0).abs() < f64::EPSILON);
        assert!(config.debug);
    }

    #[test]
    fn test_json_partial_parameter_set() {
        let config = FilterConfig::from_json(r#"{ "zdcDivisor": 500000.0 }"#)
            .expect("Should parse partial config");
        assert!((config.zdc_divisor - 500_000.0).abs() < f64::EPSILON);
        assert!((config.hihf_divisor - 9000.0).abs() < f64::EPSILON);
        assert_eq!(config.pf_src.label(), "packedPFCandidates");
    }

    #[test]
    fn test_json_empty_is_default() {
        let config = FilterConfig::from_json("{}").expect("Should parse minimal config");
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_json_rejects_unknown_and_invalid() {
        assert!(FilterConfig::from_json(r#"{ "zdcDivsor": 1.0 }"#).is_err());
        assert!(FilterConfig::from_json(r#"{ "pfSrc": "" }"#).is_err());

        let err = FilterConfig::from_json(r#"{ "hihfDivisor": 0.0 }"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("hihfDivisor"), "unexpected error: {err}");
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hihfDivisor": 8000.0, "debug": true }}"#).unwrap();
        file.flush().unwrap();

        let config = FilterConfig::from_file(file.path()).unwrap();
        assert!((config.hihf_divisor - 8000.0).abs() < f64::EPSILON);
        assert!(config.debug);

        assert!(FilterConfig::from_file("/nonexistent/zdchf.json").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_divisors() {
        assert!(FilterConfig::new().with_zdc_divisor(0.0).validate().is_err());
        assert!(FilterConfig::new().with_zdc_divisor(-1.0).validate().is_err());
        assert!(FilterConfig::new()
            .with_hihf_divisor(f64::NAN)
            .validate()
            .is_err());
        assert!(FilterConfig::new()
            .with_hihf_divisor(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn test_describe_matches_defaults() {
        let desc = FilterConfig::describe();
        assert_eq!(desc.module_label, "zdcHfPileupFilter");

        let names: Vec<&str> = desc.parameters.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["centralitySrc", "pfSrc", "zdcDivisor", "hihfDivisor", "debug"]
        );
        assert_eq!(desc.parameters[0].default, "hiCentrality");
        assert_eq!(desc.parameters[2].default, "700000.0");
        assert_eq!(desc.parameters[3].default, "9000.0");
        assert_eq!(desc.parameters[4].kind, ParameterType::Bool);
        assert_eq!(desc.parameters[4].default, "false");
    }
}
