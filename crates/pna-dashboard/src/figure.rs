//! Plot payloads
//!
//! A [`Figure`] serializes to the `{data, layout}` shape the browser's plotting
//! component renders. Only the chart kinds the dashboard draws are built here.

use pna_data::Table;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trace type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    /// Bars
    Bar,
    /// Points or labels
    Scatter,
}

/// One series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Trace type
    #[serde(rename = "type")]
    pub kind: TraceKind,
    /// Legend entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// X values
    pub x: Vec<Value>,
    /// Y values
    pub y: Vec<Value>,
    /// Per-point labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<Value>>,
    /// Scatter drawing mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// `"h"` for horizontal bars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}

/// Plot title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    /// Text
    pub text: String,
}

/// Figure-level layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureLayout {
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// Height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// How grouped bars combine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
}

/// A plot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Series
    pub data: Vec<Trace>,
    /// Layout
    pub layout: FigureLayout,
}

fn column(table: &Table, name: &str) -> Vec<Value> {
    table.column(name).cloned().collect()
}

fn label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Figure {
    /// No series, no title
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Vertical bars of `y` against `x`
    ///
    /// With `color`, rows are split into one trace per distinct value of that
    /// column, in first-seen order, stacked.
    #[must_use]
    pub fn bar(table: &Table, x: &str, y: &str, color: Option<&str>) -> Self {
        let Some(color) = color else {
            return Self {
                data: vec![Trace::bar(column(table, x), column(table, y))],
                layout: FigureLayout::default(),
            };
        };

        let data = table
            .unique(color)
            .into_iter()
            .map(|group| {
                let rows = table.filter_eq(color, group);
                Trace {
                    name: Some(label(group)),
                    ..Trace::bar(column(&rows, x), column(&rows, y))
                }
            })
            .collect();
        Self {
            data,
            layout: FigureLayout {
                barmode: Some("relative".into()),
                ..FigureLayout::default()
            },
        }
    }

    /// Horizontal bars: numeric `x` per category `y`
    #[must_use]
    pub fn hbar(table: &Table, x: &str, y: &str) -> Self {
        Self {
            data: vec![Trace {
                orientation: Some("h".into()),
                ..Trace::bar(column(table, x), column(table, y))
            }],
            layout: FigureLayout::default(),
        }
    }

    /// Points drawn as their `text` labels only
    #[must_use]
    pub fn scatter_text(table: &Table, x: &str, y: &str, text: &str) -> Self {
        Self {
            data: vec![Trace {
                kind: TraceKind::Scatter,
                name: None,
                x: column(table, x),
                y: column(table, y),
                text: Some(column(table, text)),
                mode: Some("text".into()),
                orientation: None,
            }],
            layout: FigureLayout::default(),
        }
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, text: impl Into<String>) -> Self {
        self.layout.title = Some(Title { text: text.into() });
        self
    }

    /// Set the height
    #[must_use]
    pub fn height(mut self, px: u32) -> Self {
        self.layout.height = Some(px);
        self
    }

    /// Set the width
    #[must_use]
    pub fn width(mut self, px: u32) -> Self {
        self.layout.width = Some(px);
        self
    }

    /// Whether there are no series
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// As a property value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parse a property value
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

impl Trace {
    fn bar(x: Vec<Value>, y: Vec<Value>) -> Self {
        Self {
            kind: TraceKind::Bar,
            name: None,
            x,
            y,
            text: None,
            mode: None,
            orientation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn liwc_time() -> Table {
        let mut t = Table::new(["Date", "Category", "Frequency"]);
        for (d, c, f) in [
            ("2020-06-01", "posemo", 0.1),
            ("2020-06-01", "negemo", 0.2),
            ("2020-06-02", "posemo", 0.3),
        ] {
            t.push_row(vec![json!(d), json!(c), json!(f)]).unwrap();
        }
        t
    }

    #[test]
    fn bar_groups_by_color() {
        let fig = Figure::bar(&liwc_time(), "Date", "Frequency", Some("Category"))
            .title("Types of words over time");
        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0].name.as_deref(), Some("posemo"));
        assert_eq!(fig.data[0].y, [json!(0.1), json!(0.3)]);
        assert_eq!(fig.data[1].x, [json!("2020-06-01")]);
        assert_eq!(fig.layout.title.as_ref().unwrap().text, "Types of words over time");
    }

    #[test]
    fn empty_figure_wire_shape() {
        assert_eq!(Figure::empty().to_value(), json!({"data": [], "layout": {}}));
        assert_eq!(
            Figure::from_value(&json!({"data": [], "layout": {}})),
            Some(Figure::empty())
        );
    }

    #[test]
    fn scatter_text_sets_mode_and_labels() {
        let mut t = Table::new(["token", "PC1", "PC2"]);
        t.push_row(vec![json!("China"), json!(0.1), json!(0.2)]).unwrap();
        let v = Figure::scatter_text(&t, "PC1", "PC2", "token").height(1000).to_value();
        assert_eq!(v["data"][0]["mode"], json!("text"));
        assert_eq!(v["data"][0]["text"], json!(["China"]));
        assert_eq!(v["layout"]["height"], json!(1000));
    }
}
