//! Widget records.
//!
//! A widget is one positioned entity on a plan. There is a single record type;
//! kind-specific behavior hangs off the [`WidgetKind`] tag through plain
//! functions instead of a type hierarchy.

use crate::geometry::NormalizedPosition;
use crate::id::ObjectId;
use serde::{Deserialize, Serialize};

/// What a widget represents. Inferred from the entity domain and, for
/// covers and sensors, the device class found in the state payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Light,
    Switch,
    Cover,
    Blind,
    Thermostat,
    Sensor,
    Generic,
}

impl WidgetKind {
    /// Classify an entity from its id and raw state.
    pub fn infer(object_id: &ObjectId, state: &serde_json::Value) -> Self {
        let device_class = state
            .pointer("/attributes/device_class")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        match object_id.domain() {
            "light" => WidgetKind::Light,
            "switch" | "input_boolean" | "fan" => WidgetKind::Switch,
            "cover" if matches!(device_class, "blind" | "shutter" | "shade") => WidgetKind::Blind,
            "cover" => WidgetKind::Cover,
            "climate" | "water_heater" => WidgetKind::Thermostat,
            "sensor" | "binary_sensor" => WidgetKind::Sensor,
            _ => WidgetKind::Generic,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            WidgetKind::Light => "widget-light",
            WidgetKind::Switch => "widget-switch",
            WidgetKind::Cover => "widget-cover",
            WidgetKind::Blind => "widget-blind",
            WidgetKind::Thermostat => "widget-thermostat",
            WidgetKind::Sensor => "widget-sensor",
            WidgetKind::Generic => "widget-generic",
        }
    }

    /// Label shown when the state carries no friendly name.
    pub fn default_label(self) -> &'static str {
        match self {
            WidgetKind::Light => "Light",
            WidgetKind::Switch => "Switch",
            WidgetKind::Cover => "Cover",
            WidgetKind::Blind => "Blind",
            WidgetKind::Thermostat => "Thermostat",
            WidgetKind::Sensor => "Sensor",
            WidgetKind::Generic => "Entity",
        }
    }
}

/// A widget as the engine sees it: identity, kind, position and the last raw
/// state payload (opaque to the engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub object_id: ObjectId,
    pub kind: WidgetKind,
    pub position: NormalizedPosition,
    #[serde(default)]
    pub state: serde_json::Value,
}

impl WidgetRecord {
    pub fn new(object_id: ObjectId, position: NormalizedPosition, state: serde_json::Value) -> Self {
        let kind = WidgetKind::infer(&object_id, &state);
        Self {
            object_id,
            kind,
            position,
            state,
        }
    }

    /// Replace the raw state. The kind is re-inferred since a device class may
    /// only show up in later payloads.
    pub fn update_state(&mut self, state: serde_json::Value) {
        self.kind = WidgetKind::infer(&self.object_id, &state);
        self.state = state;
    }

    /// Short text shown on the widget: friendly name when present, else the id.
    pub fn label(&self) -> String {
        self.state
            .pointer("/attributes/friendly_name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.object_id.to_string())
    }

    /// Raw state string (`on`, `21.5`, …) with the unit appended for sensors.
    pub fn state_text(&self) -> String {
        let raw = self
            .state
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let unit = self
            .state
            .pointer("/attributes/unit_of_measurement")
            .and_then(|v| v.as_str());
        match (self.kind, unit) {
            (WidgetKind::Sensor, Some(unit)) if !raw.is_empty() => format!("{raw} {unit}"),
            _ => raw.to_string(),
        }
    }
}

/// Object creation request from the outer application. Shape follows the
/// persisted entry plus an optional raw state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub entity_id: ObjectId,
    #[serde(default)]
    pub position: Option<NormalizedPosition>,
    #[serde(default)]
    pub state: serde_json::Value,
}
