//! Column-oriented tables loaded from CSV

use std::io::Read;
use std::path::Path;

use super::ChartError;

/// One named column; cells are kept as trimmed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

impl Column {
    /// Whether every non-empty cell parses as a number, with at least one such cell
    pub fn is_numeric(&self) -> bool {
        let mut seen = false;
        for cell in self.values.iter().filter(|v| !v.is_empty()) {
            if parse_number(cell).is_none() {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Parse every cell; empty cells become `None`
    ///
    /// The first non-empty cell that is not a number fails the whole column.
    pub fn numeric_values(&self) -> Result<Vec<Option<f64>>, ChartError> {
        self.values
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                if cell.is_empty() {
                    return Ok(None);
                }
                parse_number(cell).map(Some).ok_or_else(|| ChartError::NonNumeric {
                    column: self.name.clone(),
                    row: idx + 1,
                    value: cell.clone(),
                })
            })
            .collect()
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// In-memory table with normalized (trimmed, lower-cased) column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn from_path(path: &Path) -> Result<Self, ChartError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ChartError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut columns: Vec<Column> = reader
            .headers()?
            .iter()
            .map(|h| Column {
                name: h.trim().to_lowercase(),
                values: Vec::new(),
            })
            .collect();

        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            for (idx, column) in columns.iter_mut().enumerate() {
                column
                    .values
                    .push(record.get(idx).unwrap_or_default().to_string());
            }
            rows += 1;
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a column by name, normalizing the query like the headers
    pub fn column(&self, name: &str) -> Option<&Column> {
        let wanted = name.trim().to_lowercase();
        self.columns.iter().find(|c| c.name == wanted)
    }

    pub fn first_column(&self) -> Option<&Column> {
        self.columns.first()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }
}
