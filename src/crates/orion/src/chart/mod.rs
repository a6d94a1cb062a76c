//! Chart synthesis from tabular data
//!
//! A request flows through three steps:
//!
//! 1. [`Dataset`] loads a CSV file into normalized columns
//! 2. [`ChartPlan::build`] resolves columns and computes series or slices
//! 3. a [`ChartRenderer`] draws the plan to a PNG file
//!
//! Only the last step has side effects.

pub mod dataset;
pub mod plan;
pub mod render;
pub mod spec;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tooling::logging::LogGuard;
use tracing::{debug, info};

use crate::error::ErrorClass;

pub use dataset::{Column, Dataset};
pub use plan::{ChartPlan, PieSlice, PlotData, Series};
pub use render::{ChartRenderer, PlottersRenderer};
pub use spec::{ChartKind, ChartSpec};

/// Errors raised while loading, planning or drawing a chart
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{column}' has a non-numeric value '{value}' in row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("no numeric columns to plot")]
    NoNumericColumns,

    #[error("the dataset has no rows")]
    EmptyDataset,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(String),
}

impl ChartError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::DataError
    }
}

/// A chart written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub kind: ChartKind,
    pub plan: ChartPlan,
}

/// Plans and draws charts through a pluggable renderer
#[derive(Clone)]
pub struct ChartSynthesizer {
    renderer: Arc<dyn ChartRenderer>,
}

impl std::fmt::Debug for ChartSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSynthesizer").finish_non_exhaustive()
    }
}

impl ChartSynthesizer {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { renderer }
    }

    /// Plan and draw `spec` over `dataset` into `output`
    ///
    /// An existing file at `output` is overwritten.
    pub fn render(
        &self,
        dataset: &Dataset,
        spec: &ChartSpec,
        output: &Path,
    ) -> Result<ChartArtifact, ChartError> {
        let _guard = LogGuard::new("chart.render");
        let plan = ChartPlan::build(dataset, spec)?;
        debug!(kind = %plan.kind, items = plan.len(), "chart planned");

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.renderer.draw(&plan, output)?;
        info!(kind = %plan.kind, path = %output.display(), "chart written");

        Ok(ChartArtifact {
            path: output.to_path_buf(),
            kind: plan.kind,
            plan,
        })
    }

    /// Load `csv` and render it on the blocking pool
    pub async fn render_file(
        &self,
        csv: PathBuf,
        spec: ChartSpec,
        output: PathBuf,
    ) -> Result<ChartArtifact, ChartError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            let dataset = Dataset::from_path(&csv)?;
            this.render(&dataset, &spec, &output)
        })
        .await
        .map_err(|e| ChartError::Render(format!("render task failed: {}", e)))?
    }
}
