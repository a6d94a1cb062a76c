//! Pure planning step: resolve columns and compute what to draw
//!
//! Building a plan touches no files and no drawing backend, so the same
//! dataset and spec always yield an equal plan.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::dataset::{Column, Dataset};
use super::spec::{ChartKind, ChartSpec};
use super::ChartError;

/// One numeric series; `None` marks a missing point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Option<f64>>,
}

/// One wedge of a pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Share of the total, in `0.0..=1.0`
    pub fraction: f64,
}

impl PieSlice {
    /// Percentage with one decimal, e.g. `33.3%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Data laid out for one chart kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlotData {
    /// Bars or lines over categorical labels
    Categorical {
        x_label: String,
        labels: Vec<String>,
        series: Vec<Series>,
    },
    /// Value counts of one column
    Pie { column: String, slices: Vec<PieSlice> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPlan {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub data: PlotData,
}

impl ChartPlan {
    pub fn build(dataset: &Dataset, spec: &ChartSpec) -> Result<Self, ChartError> {
        if dataset.is_empty() {
            return Err(ChartError::EmptyDataset);
        }

        let data = match spec.kind {
            ChartKind::Pie => pie_data(dataset, spec)?,
            ChartKind::Bar | ChartKind::Line => categorical_data(dataset, spec)?,
        };

        Ok(Self {
            kind: spec.kind,
            title: spec.title.clone(),
            data,
        })
    }

    /// Number of series (bar/line) or slices (pie)
    pub fn len(&self) -> usize {
        match &self.data {
            PlotData::Categorical { series, .. } => series.len(),
            PlotData::Pie { slices, .. } => slices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn resolve<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, ChartError> {
    dataset
        .column(name)
        .ok_or_else(|| ChartError::ColumnNotFound(name.trim().to_lowercase()))
}

fn first_column(dataset: &Dataset) -> Result<&Column, ChartError> {
    dataset.first_column().ok_or(ChartError::EmptyDataset)
}

/// Value counts of the first named y column, or of the first column
fn pie_data(dataset: &Dataset, spec: &ChartSpec) -> Result<PlotData, ChartError> {
    let column = match spec.y.first() {
        Some(name) => resolve(dataset, name)?,
        None => first_column(dataset)?,
    };

    // Slot per distinct value in first-seen order
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in column.values.iter().filter(|v| !v.is_empty()) {
        match slots.get(value.as_str()) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value.as_str(), counts.len());
                counts.push((value.as_str(), 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Err(ChartError::EmptyDataset);
    }

    let slices = counts
        .into_iter()
        .map(|(label, count)| PieSlice {
            label: label.to_string(),
            count,
            fraction: count as f64 / total as f64,
        })
        .collect();

    Ok(PlotData::Pie {
        column: column.name.clone(),
        slices,
    })
}

fn categorical_data(dataset: &Dataset, spec: &ChartSpec) -> Result<PlotData, ChartError> {
    let x = match &spec.x {
        Some(name) => resolve(dataset, name)?,
        None => first_column(dataset)?,
    };

    let y_columns: Vec<&Column> = if spec.y.is_empty() {
        dataset
            .columns()
            .iter()
            .filter(|c| c.name != x.name && c.is_numeric())
            .collect()
    } else {
        spec.y
            .iter()
            .map(|name| resolve(dataset, name))
            .collect::<Result<_, _>>()?
    };

    if y_columns.is_empty() {
        return Err(ChartError::NoNumericColumns);
    }

    let series = y_columns
        .into_iter()
        .map(|column| {
            Ok(Series {
                name: column.name.clone(),
                points: column.numeric_values()?,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(PlotData::Categorical {
        x_label: x.name.clone(),
        labels: x.values.clone(),
        series,
    })
}
