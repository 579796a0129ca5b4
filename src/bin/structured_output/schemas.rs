use crate::models::{ResponseModel, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Canonical metric names, in report order.
const METRIC_ORDER: [&str; 10] = [
    "Average Sessions",
    "Average Users",
    "Average New Users",
    "Average Pageviews",
    "Pages per Session",
    "Average Session Duration",
    "Bounce Rate",
    "Conversion Rate",
    "Average Transactions",
    "Average Revenue",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unexpected metric name: {0}")]
    UnexpectedMetric(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub name: String,
    pub value: f64,
}

impl KeyMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The ten known metrics, zero-valued, in canonical order.
    pub fn ordered_metrics() -> Vec<KeyMetric> {
        METRIC_ORDER.iter().map(|name| KeyMetric::new(*name, 0.0)).collect()
    }

    pub fn validate_name(&self) -> Result<(), SchemaError> {
        if METRIC_ORDER.contains(&self.name.as_str()) {
            Ok(())
        } else {
            Err(SchemaError::UnexpectedMetric(self.name.clone()))
        }
    }

    fn rank(&self) -> usize {
        METRIC_ORDER
            .iter()
            .position(|name| *name == self.name)
            .unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub dataset_summary: String,
    pub key_metrics: Vec<KeyMetric>,
}

impl SummaryOutput {
    /// Stable-sorts metrics into canonical order with unknown names last,
    /// then rejects the first unknown name. The reorder sticks either way.
    pub fn enforce_ordered_metrics(&mut self) -> Result<(), SchemaError> {
        self.key_metrics.sort_by_key(KeyMetric::rank);
        self.key_metrics.iter().try_for_each(KeyMetric::validate_name)
    }
}

impl ResponseModel for SummaryOutput {
    fn name() -> &'static str {
        "SummaryOutput"
    }

    fn description() -> &'static str {
        "A concise English summary of a dataset with its key metrics."
    }

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "dataset_summary": {
                    "type": "string",
                    "description": "A concise English summary of the dataset."
                },
                "key_metrics": {
                    "type": "array",
                    "description": "List of key metrics extracted from the dataset.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"enum": METRIC_ORDER},
                            "value": {"type": "number"}
                        },
                        "required": ["name", "value"]
                    }
                }
            },
            "required": ["dataset_summary", "key_metrics"]
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut checked = self.clone();
        checked
            .enforce_ordered_metrics()
            .map_err(|err| ValidationError::single(Self::name(), "key_metrics", err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetricComparison {
    pub name: String,
    pub value1: f64,
    pub value2: f64,
    pub description: String,
}

impl KeyMetricComparison {
    pub fn change(&self) -> f64 {
        self.value2 - self.value1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub comparison_summary: String,
    pub key_metrics_comparison: Vec<KeyMetricComparison>,
}

impl ResponseModel for ComparisonOutput {
    fn name() -> &'static str {
        "ComparisonOutput"
    }

    fn description() -> &'static str {
        "Differences and similarities between the current week and the previous week."
    }

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "comparison_summary": {
                    "type": "string",
                    "description": concat!(
                        "A concise English summary highlighting differences and similarities ",
                        "between the current week and the previous week."
                    )
                },
                "key_metrics_comparison": {
                    "type": "array",
                    "description": concat!(
                        "Key metrics with values from both weeks ",
                        "and descriptions of differences."
                    ),
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "value1": {"type": "number"},
                            "value2": {"type": "number"},
                            "description": {"type": "string"}
                        },
                        "required": ["name", "value1", "value2", "description"]
                    }
                }
            },
            "required": ["comparison_summary", "key_metrics_comparison"]
        })
    }
}
