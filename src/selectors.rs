//! Device and timeframe dropdowns.
//!
//! The selectors are filled once from configuration and then only their
//! selection changes. The page builds its `<option>` elements from the JSON
//! form of these types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEVICE_SELECT_ID: &str = "device-select";
pub const TIMEFRAME_SELECT_ID: &str = "timeframe-select";

/// A named duration bucket. `value` is sent to the backend, `name` is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Timeframe {
    pub value: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SelectControl {
    pub id: String,
    pub options: Vec<SelectOption>,
    /// Index into `options`; a fresh control selects its first option.
    pub selected: usize,
}

impl SelectControl {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Vec::new(),
            selected: 0,
        }
    }

    pub fn append(&mut self, value: impl Into<String>, text: impl Into<String>) {
        self.options.push(SelectOption {
            value: value.into(),
            text: text.into(),
        });
    }

    /// Currently selected value, `None` for a control without options.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.options.get(self.selected).map(|o| o.value.as_str())
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Select the option carrying `value`. Unknown values keep the current
    /// selection and return `false`.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Selectors {
    pub device: SelectControl,
    pub timeframe: SelectControl,
}

/// Fill the device and timeframe controls, one option per entry, in list order.
#[must_use]
pub fn populate_selectors(devices: &[String], timeframes: &[Timeframe]) -> Selectors {
    let mut device = SelectControl::new(DEVICE_SELECT_ID);
    for d in devices {
        device.append(d.as_str(), d.as_str());
    }

    let mut timeframe = SelectControl::new(TIMEFRAME_SELECT_ID);
    for t in timeframes {
        timeframe.append(t.value.as_str(), t.name.as_str());
    }

    Selectors { device, timeframe }
}
