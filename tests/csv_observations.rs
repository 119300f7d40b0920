use std::collections::{BTreeMap, HashMap};

use csv_timeseries::ingestion::{extract_observations, CsvProcessor, ProcessorOptions};
use csv_timeseries::types::{DiagnosticKind, Observation};
use csv_timeseries::ProcessorError;
use serde_json::json;

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("tests/fixtures/{name}")).unwrap()
}

fn data(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn expected_first_btcusd() -> Observation {
    Observation::new(
        1605312000,
        data(&[
            ("open", 16339.56),
            ("high", 16339.6),
            ("low", 16240.0),
            ("close", 16254.51),
            ("volume", 274.42607),
        ]),
        vec![],
    )
}

#[test]
fn get_observations_happy_path() {
    let processor = CsvProcessor::default();
    assert!(processor.on_data(&fixture("btcusd.csv")).unwrap());

    let out = processor.get_observations().unwrap().unwrap();
    assert!(out.is_clean());
    assert_eq!(out.output.len(), 4);
    assert_eq!(out.output[0], expected_first_btcusd());

    let times: Vec<i64> = out.output.iter().map(|o| o.time).collect();
    assert_eq!(times, vec![1605312000, 1605313800, 1605315600, 1605317400]);
}

#[test]
fn get_observations_with_tags() {
    let processor = CsvProcessor::default();
    processor.on_data(&fixture("btcusd_tags.csv")).unwrap();

    let obs = processor.get_observations().unwrap().unwrap().into_output();
    assert_eq!(obs.len(), 3);

    let mut expected = expected_first_btcusd();
    expected.tags = vec!["elon_tweet".to_string(), "market_open".to_string()];
    assert_eq!(obs[0], expected);
    assert!(obs[1].tags.is_empty());
    assert_eq!(obs[2].tags, vec!["market_close"]);
    assert!(!obs[0].data.contains_key("_tags"));
}

#[test]
fn get_observations_custom_time_format() {
    let mut processor = CsvProcessor::default();
    processor
        .init(&HashMap::from([(
            "time_format".to_string(),
            "%Y-%m-%d %H:%M:%S%:z".to_string(),
        )]))
        .unwrap();
    assert_eq!(
        processor.options().time_format.as_deref(),
        Some("%Y-%m-%d %H:%M:%S%:z")
    );
    processor.on_data(&fixture("custom_time.csv")).unwrap();

    let obs = processor.get_observations().unwrap().unwrap().output;
    assert_eq!(obs.len(), 3);
    assert_eq!(obs[0], Observation::new(1547575074, data(&[("val", 34.0)]), vec![]));
}

#[test]
fn get_observations_called_twice() {
    let processor = CsvProcessor::default();
    processor.on_data(&fixture("btcusd.csv")).unwrap();

    let first = processor.get_observations().unwrap().unwrap();
    assert_eq!(first.output[0], expected_first_btcusd());

    assert!(processor.get_observations().unwrap().is_none());
    assert!(!processor.has_pending());
}

#[test]
fn get_observations_updated_with_same_data() {
    let processor = CsvProcessor::default();
    let payload = fixture("btcusd.csv");

    processor.on_data(&payload).unwrap();
    let fp = processor.fingerprint().unwrap();
    assert_eq!(
        processor.get_observations().unwrap().unwrap().output[0],
        expected_first_btcusd()
    );

    // Fresh copy of the same bytes.
    let copy = payload.clone();
    assert!(!processor.on_data(&copy).unwrap());
    assert_eq!(processor.fingerprint(), Some(fp));
    assert!(processor.get_observations().unwrap().is_none());
}

#[test]
fn bad_timestamp_row_is_dropped_and_bad_field_only_loses_that_field() {
    let csv = "time,a,b\n\
               2020-11-14T00:00:00Z,1,2\n\
               not-a-time,3,4\n\
               2020-11-14T01:00:00Z,oops,6\n";
    let out = extract_observations(csv.as_bytes(), &ProcessorOptions::default()).unwrap();

    assert_eq!(out.output.len(), 2);
    assert_eq!(out.output[1].time, 1605315600);
    assert_eq!(out.output[1].data, data(&[("b", 6.0)]));

    assert_eq!(out.diagnostics.len(), 2);
    assert_eq!(out.diagnostics[0].row, 3);
    assert!(matches!(out.diagnostics[0].kind, DiagnosticKind::InvalidTime { .. }));
    assert_eq!(out.diagnostics[1].row, 4);
    match &out.diagnostics[1].kind {
        DiagnosticKind::InvalidField { column, raw, .. } => {
            assert_eq!(column, "a");
            assert_eq!(raw, "oops");
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn flat_extraction_keeps_qualified_headers_verbatim() {
    let csv = "time,coinbase.btcusd.price\n1626697480,31232.7\n";
    let out = extract_observations(csv.as_bytes(), &ProcessorOptions::default()).unwrap();
    assert_eq!(out.output[0].data, data(&[("coinbase.btcusd.price", 31232.7)]));
}

#[test]
fn structural_errors_surface() {
    let opts = ProcessorOptions::default();

    let err = extract_observations(b"ts,a\n1,2\n", &opts).unwrap_err();
    assert!(err.to_string().contains("first column must be 'time'"));

    let err = extract_observations(b"time,a\n", &opts).unwrap_err();
    assert!(matches!(err, ProcessorError::NoData));

    let err = extract_observations(b"time,a\n1,2,3\n", &opts).unwrap_err();
    assert!(matches!(err, ProcessorError::Rows(_)));
}

#[test]
fn unterminated_quote_fails_instead_of_swallowing_rows() {
    let processor = CsvProcessor::default();
    processor.on_data(b"time,a\n10,\"1\n20,2\n30,3\n").unwrap();

    let err = processor.get_observations().unwrap_err();
    assert!(matches!(err, ProcessorError::Rows(_)));
    assert!(processor.has_pending());

    let err = extract_observations(b"time,a\n10,1\"\n", &ProcessorOptions::default()).unwrap_err();
    assert!(matches!(err, ProcessorError::Rows(_)));
}

#[test]
fn observation_serializes_to_json() {
    let payload = fixture("btcusd_tags.csv");
    let out = extract_observations(&payload, &ProcessorOptions::default()).unwrap();

    assert_eq!(
        serde_json::to_value(&out.output[0]).unwrap(),
        json!({
            "time": 1605312000,
            "data": {
                "close": 16254.51,
                "high": 16339.6,
                "low": 16240.0,
                "open": 16339.56,
                "volume": 274.42607
            },
            "tags": ["elon_tweet", "market_open"]
        })
    );
}
