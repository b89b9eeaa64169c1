use passenger_stats::analyzers::aggregate::try_aggregate;
use passenger_stats::analyzers::distribution::{GaussianFit, Histogram};
use passenger_stats::analyzers::evaluation::summarize;
use passenger_stats::error::ParseError;
use passenger_stats::output::write_report;
use passenger_stats::parser::{read_eval_data, read_rides, read_values};
use passenger_stats::stations::Station;

#[test]
fn test_full_ride_pipeline() {
    let bytes = include_bytes!("fixtures/passengers_sample.csv");
    let result = try_aggregate(read_rides(&bytes[..])).expect("Failed to aggregate rides");

    assert_eq!(result.records(), 5);

    let dam = Station::from("Dam");
    let centraal = Station::from("Centraal");
    assert_eq!(result.origin_totals().get(&dam), 12);
    assert_eq!(result.origin_totals().get(&Station::from("RAI")), 0);
    assert!(result.origin_totals().contains(&Station::from("RAI")));
    assert_eq!(result.destination_totals().get(&centraal), 13);
    assert!(!result.destination_totals().contains(&Station::from("RAI")));
    assert_eq!(result.pair_counts().get(&(dam.clone(), centraal.clone())), 11);
    assert_eq!(result.time_totals().get(&"08:00".to_string()), 10);
    assert_eq!(result.time_totals().get(&"08:15".to_string()), 7);

    let total = result.origin_totals().total();
    assert_eq!(total, 24);
    assert_eq!(result.riders(), total);
    assert_eq!(result.destination_totals().total(), total);
    assert_eq!(result.time_totals().total(), total);
    assert_eq!(result.pair_counts().total(), total);

    let mut report = Vec::new();
    write_report(&mut report, &result, 3).unwrap();
    let report = String::from_utf8(report).unwrap();
    let first_origin = report.lines().nth(1).unwrap();
    assert!(first_origin.contains("Dam"));
}

#[test]
fn test_malformed_row_aborts_aggregation() {
    let fixture = include_str!("fixtures/passengers_sample.csv");
    let broken = fixture.replacen("08:15;Zuid;1;", "08:15;Zuid;one;", 1);

    let err = try_aggregate(read_rides(broken.as_bytes())).unwrap_err();
    match err {
        ParseError::InvalidCount { line, column, .. } => {
            assert_eq!(line, 5);
            assert_eq!(column, "Amstel");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_eval_pipeline() {
    let data = read_eval_data(&include_bytes!("fixtures/eval_sample.txt")[..]).unwrap();
    let summary = summarize(&data).unwrap();

    let get = |name: &str| {
        summary
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .unwrap()
    };
    assert_eq!(get("EXPENSES"), 130.0);
    assert_eq!(get("NUMBER_OF_MESSAGES"), 60.0);
    assert_eq!(get("FINAL_AVERAGE_TRAVELLING_TIME"), 12.5);
    assert_eq!(get("AVERAGE_UTILIZATION"), 0.375);
    assert_eq!(get("AVERAGE_AMOUNT_PASSENGERS_WAITING"), 3.0);
}

#[test]
fn test_disappointment_pipeline() {
    let counts = read_values(&include_bytes!("fixtures/disappointments_sample.txt")[..]).unwrap();
    let histogram = Histogram::from_counts(&counts);
    let fit = GaussianFit::from_counts(&counts);

    assert_eq!(histogram.bins(), &[0, 3, 2, 0, 1]);
    assert!((fit.mu - 8.0 / 6.0).abs() < 1e-12);
    assert!(fit.sigma > 0.0);
    assert_eq!(fit.curve(histogram.len()).unwrap().len(), 5);
}
