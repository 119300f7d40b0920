use std::sync::Arc;
use std::thread;

use csv_timeseries::ingestion::CsvProcessor;

const ROWS: usize = 50;

// Every row of payload `id` carries the value `id`, so a torn read would mix values.
fn payload(id: usize) -> Vec<u8> {
    let mut out = String::from("time,v\n");
    for row in 0..ROWS {
        out.push_str(&format!("{},{}\n", 1_600_000_000 + row, id));
    }
    out.into_bytes()
}

#[test]
fn concurrent_updates_and_extractions_never_tear() {
    let processor = Arc::new(CsvProcessor::default());

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let processor = Arc::clone(&processor);
            thread::spawn(move || {
                let mut seen = Vec::new();
                for round in 0..20 {
                    processor.on_data(&payload(id * 100 + round)).unwrap();
                    if let Some(out) = processor.get_observations().unwrap() {
                        seen.push(out.output);
                    }
                }
                seen
            })
        })
        .collect();

    let mut extractions = 0;
    for handle in handles {
        for observations in handle.join().unwrap() {
            extractions += 1;
            assert_eq!(observations.len(), ROWS);
            let first = observations[0].data["v"];
            assert!(observations.iter().all(|o| o.data["v"] == first));
        }
    }
    assert!(extractions > 0);
}

#[test]
fn identical_update_does_not_evict_pending_payload() {
    let processor = CsvProcessor::default();
    let a = payload(1);

    assert!(processor.on_data(&a).unwrap());
    assert!(!processor.on_data(&a).unwrap());
    assert!(processor.has_pending());

    let out = processor.get_observations().unwrap().unwrap();
    assert_eq!(out.output[0].data["v"], 1.0);
}

#[test]
fn newer_update_replaces_unconsumed_payload() {
    let processor = CsvProcessor::default();

    processor.on_data(&payload(1)).unwrap();
    let first_fp = processor.fingerprint().unwrap();
    assert!(processor.on_data(&payload(2)).unwrap());
    assert_ne!(processor.fingerprint().unwrap(), first_fp);

    let out = processor.get_observations().unwrap().unwrap();
    assert_eq!(out.output[0].data["v"], 2.0);
    assert!(processor.get_observations().unwrap().is_none());
}
