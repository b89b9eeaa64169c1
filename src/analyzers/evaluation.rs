use crate::analyzers::utility::mean;
use crate::error::EvalError;
use indexmap::IndexMap;

/// Metric values recorded by one simulation run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EvalData {
    /// Every metric sampled at a given time, last write wins.
    pub(crate) times: IndexMap<String, IndexMap<String, f64>>,
    /// Every value of a metric, in file order.
    pub(crate) series: IndexMap<String, Vec<f64>>,
}

impl EvalData {
    pub fn insert(&mut self, time: &str, metric: &str, value: f64) {
        self.times
            .entry(time.to_string())
            .or_default()
            .insert(metric.to_string(), value);
        self.series
            .entry(metric.to_string())
            .or_default()
            .push(value);
    }

    pub fn at(&self, time: &str, metric: &str) -> Option<f64> {
        self.times.get(time)?.get(metric).copied()
    }

    pub fn series(&self) -> &IndexMap<String, Vec<f64>> {
        &self.series
    }

    pub fn time_count(&self) -> usize {
        self.times.len()
    }
}

enum Reduction {
    Last,
    Mean,
}

/// (reported name, source metric, reduction), in report order.
static SUMMARY: &[(&str, &str, Reduction)] = &[
    ("EXPENSES", "EXPENSES", Reduction::Last),
    ("AVERAGE_WAITING_TIME", "AVERAGE_WAITING_TIME", Reduction::Last),
    ("NUMBER_OF_MESSAGES", "NUMBER_OF_MESSAGES", Reduction::Last),
    (
        "FINAL_AVERAGE_TRAVELLING_TIME",
        "FINAL_AVERAGE_TRAVELLING_TIME",
        Reduction::Last,
    ),
    (
        "AVERAGE_TRAVELLING_TIME",
        "AVERAGE_TRAVELLING_TIME",
        Reduction::Last,
    ),
    ("AVERAGE_UTILIZATION", "AVERAGE_UTILIZATION", Reduction::Mean),
    (
        "AVERAGE_AMOUNT_PASSENGERS_WAITING",
        "AMOUNT_PASSENGERS_WAITING",
        Reduction::Mean,
    ),
];

/// Reduces a run to its headline metrics.
pub fn summarize(data: &EvalData) -> Result<Vec<(String, f64)>, EvalError> {
    SUMMARY
        .iter()
        .map(|(name, source, reduction)| {
            let values = data
                .series
                .get(*source)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| EvalError::MissingMetric(source.to_string()))?;

            let value = match reduction {
                Reduction::Last => values[values.len() - 1],
                Reduction::Mean => mean(values),
            };
            Ok((name.to_string(), value))
        })
        .collect()
}

/// Inserts `_<identifier>` before `.txt` when an identifier is set.
pub fn result_path(path: &str, identifier: &str) -> String {
    if identifier.is_empty() {
        path.to_string()
    } else {
        path.replace(".txt", &format!("_{identifier}.txt"))
    }
}

/// Axis label for a metric: `AVERAGE_UTILIZATION` becomes `average utilization`.
pub fn metric_label(metric: &str) -> String {
    metric.replace('_', " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_run() -> EvalData {
        let mut data = EvalData::default();
        for (t, scale) in [("0", 1.0), ("1", 2.0), ("2", 3.0)] {
            data.insert(t, "EXPENSES", 100.0 * scale);
            data.insert(t, "AVERAGE_WAITING_TIME", 4.0 * scale);
            data.insert(t, "NUMBER_OF_MESSAGES", 10.0 * scale);
            data.insert(t, "FINAL_AVERAGE_TRAVELLING_TIME", 20.0 + scale);
            data.insert(t, "AVERAGE_TRAVELLING_TIME", 15.0 + scale);
            data.insert(t, "AVERAGE_UTILIZATION", 0.2 * scale);
            data.insert(t, "AMOUNT_PASSENGERS_WAITING", 6.0 * scale);
        }
        data
    }

    #[test]
    fn test_insert_tracks_times_and_series() {
        let mut data = EvalData::default();
        data.insert("0", "EXPENSES", 1.0);
        data.insert("1", "EXPENSES", 2.0);
        data.insert("1", "EXPENSES", 3.0);

        assert_eq!(data.time_count(), 2);
        assert_eq!(data.at("1", "EXPENSES"), Some(3.0));
        assert_eq!(data.at("2", "EXPENSES"), None);
        assert_eq!(data.series()["EXPENSES"], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_summarize_reductions() {
        let summary = summarize(&complete_run()).unwrap();
        let names: Vec<_> = summary.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "EXPENSES",
                "AVERAGE_WAITING_TIME",
                "NUMBER_OF_MESSAGES",
                "FINAL_AVERAGE_TRAVELLING_TIME",
                "AVERAGE_TRAVELLING_TIME",
                "AVERAGE_UTILIZATION",
                "AVERAGE_AMOUNT_PASSENGERS_WAITING",
            ]
        );
        assert_eq!(summary[0].1, 300.0);
        assert_eq!(summary[4].1, 18.0);
        assert!((summary[5].1 - 0.4).abs() < 1e-12);
        assert_eq!(summary[6].1, 12.0);
    }

    #[test]
    fn test_summarize_missing_metric() {
        let mut data = complete_run();
        data.series.shift_remove("AMOUNT_PASSENGERS_WAITING");

        let err = summarize(&data).unwrap_err();
        assert!(matches!(err, EvalError::MissingMetric(m) if m == "AMOUNT_PASSENGERS_WAITING"));
    }

    #[test]
    fn test_result_path() {
        assert_eq!(result_path("./eval_out/result.txt", ""), "./eval_out/result.txt");
        assert_eq!(
            result_path("./eval_out/result.txt", "run3"),
            "./eval_out/result_run3.txt"
        );
    }

    #[test]
    fn test_metric_label() {
        assert_eq!(metric_label("AVERAGE_UTILIZATION"), "average utilization");
    }
}
