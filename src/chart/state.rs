use serde::Serialize;
use utoipa::ToSchema;

use super::series::{AxisPosition, SeriesSpec, HUMIDITY, PRESSURE, SERIES, TEMPERATURE};
use super::time::{TimeUnit, TimestampParser, TOOLTIP_FORMAT};

pub const CHART_CANVAS_ID: &str = "chart";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("{series} has {actual} values but there are {expected} labels")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("label {index} is not a timestamp: '{value}'")]
    InvalidTimestamp { index: usize, value: String },
}

/// New label and series values for the chart. The three value sequences run
/// parallel to `labels`; `None` marks a missing reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub pressure: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    pub data: Vec<Option<f64>>,
    #[serde(rename = "yAxisID")]
    pub y_axis_id: String,
}

impl Dataset {
    fn from_spec(spec: &SeriesSpec, data: Vec<Option<f64>>) -> Self {
        Self {
            label: spec.name.to_string(),
            border_color: spec.border_color.to_string(),
            background_color: spec.background_color.to_string(),
            data,
            y_axis_id: spec.axis_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ChartContents {
    /// Epoch milliseconds, one per data point
    pub labels: Vec<i64>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeOptions {
    pub tooltip_format: String,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaleLabel {
    pub display: bool,
    pub label_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeAxis {
    #[serde(rename = "type")]
    pub axis_type: String,
    pub time: TimeOptions,
    pub scale_label: ScaleLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LinearAxis {
    pub id: String,
    #[serde(rename = "type")]
    pub axis_type: String,
    pub position: AxisPosition,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scales {
    pub x_axes: Vec<TimeAxis>,
    pub y_axes: Vec<LinearAxis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartOptions {
    pub scales: Scales,
}

/// The page's one line chart.
///
/// Serializes to a Chart.js configuration object (plus the canvas id and the
/// redraw revision) that the page hands straight to the widget.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartState {
    pub canvas_id: String,
    /// Bumped on every redraw
    pub revision: u64,
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartContents,
    pub options: ChartOptions,
    #[serde(skip)]
    parser: TimestampParser,
}

impl ChartState {
    /// Build the chart bound to `canvas_id`: a time x-axis read with `parser`,
    /// temperature and humidity stacked on the left, pressure on the right.
    #[must_use]
    pub fn initialize(canvas_id: impl Into<String>, parser: TimestampParser) -> Self {
        let x_axis = TimeAxis {
            axis_type: "time".to_string(),
            time: TimeOptions {
                tooltip_format: TOOLTIP_FORMAT.to_string(),
                unit: TimeUnit::default(),
            },
            scale_label: ScaleLabel {
                display: true,
                label_string: "Date".to_string(),
            },
        };

        let y_axes = SERIES
            .iter()
            .map(|spec| LinearAxis {
                id: spec.axis_id.to_string(),
                axis_type: "linear".to_string(),
                position: spec.position,
                stacked: spec.stacked,
            })
            .collect();

        Self {
            canvas_id: canvas_id.into(),
            revision: 0,
            chart_type: "line".to_string(),
            data: ChartContents::default(),
            options: ChartOptions {
                scales: Scales {
                    x_axes: vec![x_axis],
                    y_axes,
                },
            },
            parser,
        }
    }

    /// Replace the labels and datasets with `update` and redraw.
    ///
    /// Pressure is only charted when at least one pressure value is present.
    /// An empty pressure sequence counts as "no pressure".
    ///
    /// # Errors
    ///
    /// Returns `ChartError` when a series length differs from the label count
    /// or a label cannot be parsed. The chart is left untouched in that case.
    pub fn update(&mut self, update: ChartData) -> Result<(), ChartError> {
        let expected = update.labels.len();
        check_len(TEMPERATURE.name, expected, &update.temperature)?;
        check_len(HUMIDITY.name, expected, &update.humidity)?;
        if !update.pressure.is_empty() {
            check_len(PRESSURE.name, expected, &update.pressure)?;
        }

        let labels = update
            .labels
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                self.parser
                    .parse(raw)
                    .ok_or_else(|| ChartError::InvalidTimestamp {
                        index,
                        value: raw.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let has_pressure = update.pressure.iter().any(Option::is_some);

        let mut datasets = vec![
            Dataset::from_spec(&TEMPERATURE, update.temperature),
            Dataset::from_spec(&HUMIDITY, update.humidity),
        ];
        if has_pressure {
            datasets.push(Dataset::from_spec(&PRESSURE, update.pressure));
        }

        for axis in &mut self.options.scales.x_axes {
            axis.time.unit = TimeUnit::for_span(&labels);
        }
        self.data = ChartContents { labels, datasets };
        self.redraw();

        Ok(())
    }

    /// Dataset with the given series name, if currently charted.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<&Dataset> {
        self.data.datasets.iter().find(|d| d.label == name)
    }

    fn redraw(&mut self) {
        self.revision += 1;
        tracing::debug!(
            canvas = %self.canvas_id,
            revision = self.revision,
            points = self.data.labels.len(),
            datasets = self.data.datasets.len(),
            "chart redrawn"
        );
    }
}

fn check_len(
    series: &'static str,
    expected: usize,
    values: &[Option<f64>],
) -> Result<(), ChartError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ChartError::LengthMismatch {
            series,
            expected,
            actual: values.len(),
        })
    }
}
