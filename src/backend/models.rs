use serde::{Deserialize, Serialize};

use crate::chart::ChartData;

/// Body of `GET /{timeframe}/{device}` on the sensor backend.
///
/// All series run parallel to `labels`; `null` entries are missing readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesResponse {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "Temperature", default)]
    pub temperature: Vec<Option<f64>>,
    #[serde(rename = "Humidity", default)]
    pub humidity: Vec<Option<f64>>,
    #[serde(rename = "Pressure", default)]
    pub pressure: Vec<Option<f64>>,
}

impl From<SeriesResponse> for ChartData {
    fn from(r: SeriesResponse) -> Self {
        Self {
            labels: r.labels,
            temperature: r.temperature,
            humidity: r.humidity,
            pressure: r.pressure,
        }
    }
}
