//! Chart kind and column selection extracted from a message

use serde::{Deserialize, Serialize};

use crate::intent::keywords::{contains_any, Keywords};

/// Supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" | "barras" => Ok(ChartKind::Bar),
            "line" | "linea" | "línea" | "lineas" | "líneas" => Ok(ChartKind::Line),
            "pie" | "pastel" | "circular" => Ok(ChartKind::Pie),
            other => Err(format!("unknown chart kind '{}'", other)),
        }
    }
}

/// What to draw: kind, optional x column and ordered y columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: Option<String>,
    #[serde(default)]
    pub y: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_x(mut self, x: impl Into<String>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn with_y<I, S>(mut self, y: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.y = y.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Extract a spec from normalized (lower-cased, trimmed) text
    ///
    /// - kind: first of bar, line, pie whose keywords appear; bar otherwise
    /// - `x=` value runs to the next `,` or `y=`
    /// - `y=` value runs to a following `x=`, split on `,`
    pub fn parse(text: &str, keywords: &Keywords) -> Self {
        let kind = if contains_any(text, &keywords.bar) {
            ChartKind::Bar
        } else if contains_any(text, &keywords.line) {
            ChartKind::Line
        } else if contains_any(text, &keywords.pie) {
            ChartKind::Pie
        } else {
            ChartKind::default()
        };

        let x = text.find("x=").and_then(|pos| {
            let rest = &text[pos + 2..];
            let end = [rest.find(','), rest.find("y=")]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(rest.len());
            let name = rest[..end].trim();
            (!name.is_empty()).then(|| name.to_string())
        });

        let y = text
            .find("y=")
            .map(|pos| {
                let rest = &text[pos + 2..];
                let rest = rest.find("x=").map_or(rest, |end| &rest[..end]);
                rest.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            kind,
            x,
            y,
            title: None,
        }
    }
}
