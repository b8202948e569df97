use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

/// Display and axis settings for one named series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub name: &'static str,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub axis_id: &'static str,
    pub position: AxisPosition,
    pub stacked: bool,
}

pub const TEMPERATURE: SeriesSpec = SeriesSpec {
    name: "Temperature",
    border_color: "#FCB1C3B0",
    background_color: "#FCB1C390",
    axis_id: "temperature",
    position: AxisPosition::Left,
    stacked: true,
};

pub const HUMIDITY: SeriesSpec = SeriesSpec {
    name: "Humidity",
    border_color: "#7CE0F9B0",
    background_color: "#7CE0F990",
    axis_id: "humidity",
    position: AxisPosition::Left,
    stacked: true,
};

pub const PRESSURE: SeriesSpec = SeriesSpec {
    name: "Pressure",
    border_color: "#F5F5F5B0",
    background_color: "#F5F5F590",
    axis_id: "pressure",
    position: AxisPosition::Right,
    stacked: false,
};

/// Every series the chart knows about, in dataset and axis order.
pub const SERIES: [SeriesSpec; 3] = [TEMPERATURE, HUMIDITY, PRESSURE];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn axis_ids_are_unique() {
        let ids: HashSet<&str> = SERIES.iter().map(|s| s.axis_id).collect();
        assert_eq!(ids.len(), SERIES.len());
    }

    #[test]
    fn only_pressure_sits_on_the_right() {
        let right: Vec<&str> = SERIES
            .iter()
            .filter(|s| s.position == AxisPosition::Right)
            .map(|s| s.name)
            .collect();
        assert_eq!(right, vec!["Pressure"]);
    }
}
