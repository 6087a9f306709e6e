//! Chart specifications handed to the presentation layer.
//!
//! These describe what to draw, not how; styling is left to the renderer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One bar in a categorical bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    /// Missing values are drawn as gaps.
    pub value: Option<f64>,
    /// Colour group, when the chart is coloured by category.
    pub group: Option<String>,
}

/// Categorical bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub x: String,
    pub y: String,
    pub color_by: String,
    pub orientation: Orientation,
    pub bars: Vec<Bar>,
}

/// One entity's values across the grouped categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Grouped bar chart for a two-entity comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedBarChart {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

/// One closed polygon on a radar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarTrace {
    pub name: String,
    pub values: Vec<f64>,
    pub filled: bool,
}

/// Radial chart for a multi-metric comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarChart {
    pub title: String,
    pub axes: Vec<String>,
    pub traces: Vec<RadarTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Orientation::Horizontal).unwrap(),
            "\"horizontal\""
        );
    }

    #[test]
    fn test_missing_bar_value_serializes_as_null() {
        let bar = Bar {
            label: "Bench Guy".to_string(),
            value: None,
            group: Some("BOS".to_string()),
        };
        let json = serde_json::to_value(&bar).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["group"], "BOS");
    }
}
