//! Figure Model
//! Typed view of the chart payload served by `/update_view`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Timestamp layouts the server emits for the `x` column.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A chart figure: traces plus layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub data: Vec<Trace>,
    #[serde(default)]
    pub layout: Layout,
}

/// A single scatter/line trace.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub x: Vec<Value>,
    /// Kept optional so a missing `y` can be told apart from an empty one.
    #[serde(default)]
    pub y: Option<Vec<Value>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub line: Option<LineStyle>,
    #[serde(default)]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineStyle {
    #[serde(default)]
    pub shape: Option<String>,
}

/// Figure layout. Axis entries (`yaxis`, `yaxis2`, ...) are kept raw and
/// decoded on demand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Tick overrides for one axis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AxisSpec {
    #[serde(default)]
    pub tickvals: Vec<f64>,
    #[serde(default)]
    pub ticktext: Vec<String>,
    #[serde(default)]
    pub title: Option<Value>,
}

/// How the x values of a trace were interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XAxisKind {
    /// Seconds since the Unix epoch.
    Time,
    Numeric,
    /// No usable x values; points are placed at their index.
    Index,
}

/// Traces sharing one y axis, drawn as one subplot.
#[derive(Debug, Clone)]
pub struct Panel<'a> {
    pub axis_ref: String,
    pub traces: Vec<&'a Trace>,
}

impl Figure {
    /// Number of values in the first trace's `y` column.
    pub fn record_count(&self) -> Option<usize> {
        self.data.first()?.y.as_ref().map(Vec::len)
    }

    pub fn title(&self) -> Option<String> {
        self.layout.title.as_ref().and_then(title_text)
    }

    /// Group traces by y axis, ordered `y`, `y2`, `y3`, ...
    pub fn panels(&self) -> Vec<Panel<'_>> {
        let mut panels: BTreeMap<u32, Panel<'_>> = BTreeMap::new();
        for trace in &self.data {
            let axis_ref = trace.axis_ref();
            panels
                .entry(axis_index(&axis_ref))
                .or_insert_with(|| Panel {
                    axis_ref: axis_ref.clone(),
                    traces: Vec::new(),
                })
                .traces
                .push(trace);
        }
        panels.into_values().collect()
    }
}

impl Trace {
    pub fn axis_ref(&self) -> String {
        self.yaxis.clone().unwrap_or_else(|| "y".to_string())
    }

    pub fn is_step(&self) -> bool {
        self.line
            .as_ref()
            .and_then(|line| line.shape.as_deref())
            .is_some_and(|shape| shape == "hv")
    }

    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("trace {}", index))
    }

    /// Decide how x values are read: all timestamps, all numbers, or index.
    pub fn x_kind(&self) -> XAxisKind {
        if self.x.is_empty() {
            return XAxisKind::Index;
        }
        let present = self.x.iter().filter(|value| !value.is_null());
        let mut any = false;
        let mut all_numeric = true;
        let mut all_time = true;
        for value in present {
            any = true;
            all_numeric &= value.as_f64().is_some();
            all_time &= value.as_str().and_then(parse_timestamp).is_some();
        }
        if !any {
            XAxisKind::Index
        } else if all_numeric {
            XAxisKind::Numeric
        } else if all_time {
            XAxisKind::Time
        } else {
            XAxisKind::Index
        }
    }

    /// Plot points in trace order. Null or non-numeric `y` entries are skipped.
    pub fn points(&self) -> Vec<[f64; 2]> {
        let Some(ys) = &self.y else {
            return Vec::new();
        };
        let kind = self.x_kind();
        let points = ys.iter().enumerate().filter_map(|(i, y)| {
            let y = value_as_f64(y)?;
            let x = match kind {
                XAxisKind::Index => Some(i as f64),
                XAxisKind::Numeric => self.x.get(i).and_then(Value::as_f64),
                XAxisKind::Time => self
                    .x
                    .get(i)
                    .and_then(Value::as_str)
                    .and_then(parse_timestamp),
            }?;
            Some([x, y])
        });

        let points: Vec<[f64; 2]> = points.collect();
        if self.is_step() {
            step_points(&points)
        } else {
            points
        }
    }
}

impl Layout {
    /// Decode the axis block for a trace axis reference (`y` → `yaxis`).
    pub fn y_axis(&self, axis_ref: &str) -> AxisSpec {
        let key = format!("yaxis{}", axis_ref.trim_start_matches('y'));
        self.extra
            .get(&key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }
}

impl AxisSpec {
    /// Label for a tick value, when the layout overrides tick text.
    pub fn tick_label(&self, value: f64) -> Option<&str> {
        self.tickvals
            .iter()
            .position(|tick| (tick - value).abs() < 1e-9)
            .and_then(|idx| self.ticktext.get(idx))
            .map(String::as_str)
    }

    pub fn has_tick_labels(&self) -> bool {
        !self.tickvals.is_empty() && !self.ticktext.is_empty()
    }

    pub fn title_text(&self) -> Option<String> {
        self.title.as_ref().and_then(title_text)
    }
}

/// Parse a server timestamp into seconds since the Unix epoch.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis() as f64 / 1000.0);
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp_millis() as f64 / 1000.0);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp() as f64)
}

/// Format epoch seconds for axis labels.
pub fn format_timestamp(seconds: f64) -> String {
    DateTime::from_timestamp(seconds.round() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Expand points into a horizontal-then-vertical staircase.
pub fn step_points(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut stepped = Vec::with_capacity(points.len() * 2);
    for pair in points.windows(2) {
        let [x0, y0] = pair[0];
        let [x1, _] = pair[1];
        stepped.push([x0, y0]);
        stepped.push([x1, y0]);
    }
    if let Some(last) = points.last() {
        stepped.push(*last);
    }
    stepped
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn title_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn axis_index(axis_ref: &str) -> u32 {
    axis_ref
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .unwrap_or(1)
}
