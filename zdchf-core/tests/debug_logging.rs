//! Debug diagnostics of the pileup filter.
//!
//! The global logger is process-wide, so this binary holds a single test.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};
use zdchf_core::filter::LOG_TARGET;
use zdchf_core::{
    evaluate, CentralityInfo, EventId, EventRecord, FilterConfig, ParticleCandidate,
    PileupMetric, ZdcHfPileupFilter,
};

struct CapturingLogger;

static RECORDS: Mutex<Vec<(Level, String, String)>> = Mutex::new(Vec::new());
static LOGGER: CapturingLogger = CapturingLogger;
static INIT: Once = Once::new();

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.lock().unwrap().push((
            record.level(),
            record.target().to_string(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

fn install() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Drains the captured messages logged under the filter's target.
fn take_filter_records() -> Vec<(Level, String)> {
    RECORDS
        .lock()
        .unwrap()
        .drain(..)
        .filter(|(_, target, _)| target == LOG_TARGET)
        .map(|(level, _, message)| (level, message))
        .collect()
}

#[test]
fn test_debug_diagnostic_is_emitted_only_when_enabled() {
    install();

    let candidates = [ParticleCandidate::new(1, 4.0, 5000.0)];
    let centrality = CentralityInfo::new(350_000.0);
    let metric = PileupMetric::compute(&centrality, &candidates, &FilterConfig::default());
    take_filter_records();

    // debug off: nothing under the filter target
    assert!(!evaluate(&centrality, &candidates, &FilterConfig::default()));
    assert!(take_filter_records().is_empty());

    // debug on: exactly one record carrying all four values
    let loud = FilterConfig::default().with_debug(true);
    assert!(!evaluate(&centrality, &candidates, &loud));
    let records = take_filter_records();
    assert_eq!(records.len(), 1, "{records:?}");
    let (level, message) = &records[0];
    assert_eq!(*level, Level::Info);
    assert!(message.contains("zdc_sum=350000"), "{message}");
    assert!(message.contains("hf_sum=5000"), "{message}");
    assert!(message.contains(&format!("metric={}", metric.value)), "{message}");
    assert!(message.contains("reject=true"), "{message}");

    // an accepted event reports reject=false
    let quiet_candidates = [ParticleCandidate::new(1, 4.0, 4500.0)];
    assert!(evaluate(&centrality, &quiet_candidates, &loud));
    let records = take_filter_records();
    assert_eq!(records.len(), 1, "{records:?}");
    assert!(records[0].1.contains("metric=1 "), "{}", records[0].1);
    assert!(records[0].1.contains("reject=false"), "{}", records[0].1);

    // the event-source path logs once per event, and not at all without debug
    let event = EventRecord::new(EventId::new(1, 1, 1))
        .with_centrality(&"hiCentrality".parse().unwrap(), centrality)
        .with_candidates(&"packedPFCandidates".parse().unwrap(), candidates.to_vec());
    let events = vec![event.clone(), event];

    let filter = ZdcHfPileupFilter::new(loud).unwrap();
    filter.filter_batch(&events).unwrap();
    assert_eq!(take_filter_records().len(), 2);

    let filter = ZdcHfPileupFilter::new(FilterConfig::default()).unwrap();
    filter.filter_batch(&events).unwrap();
    assert!(take_filter_records().is_empty());
}
