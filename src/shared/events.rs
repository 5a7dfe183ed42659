//! Ausgehende Draw-Events (von Store, Mode-Controller und Use-Cases erzeugt).

use super::ModeName;
use serde_json::Value;

/// Art einer Feature-Aktualisierung in `draw.update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    ChangeCoordinates,
    ChangeProperties,
}

impl UpdateAction {
    /// Stabile String-Kennung (`change_coordinates`, `change_properties`).
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateAction::ChangeCoordinates => "change_coordinates",
            UpdateAction::ChangeProperties => "change_properties",
        }
    }
}

/// Ein Event an den externen Event-Empfänger. Features liegen in GeoJSON-Form vor.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// Neue Features wurden erzeugt (z.B. durch Merge/Split)
    Create { features: Vec<Value> },
    /// Features wurden durch eine Benutzeraktion gelöscht
    Delete { features: Vec<Value> },
    /// Features wurden verändert
    Update {
        action: UpdateAction,
        features: Vec<Value>,
    },
    /// Selektion (Features und Vertices) hat sich geändert
    SelectionChange {
        features: Vec<Value>,
        points: Vec<Value>,
    },
    /// Modus wurde gewechselt
    ModeChange { mode: ModeName },
}

impl DrawEvent {
    /// Stabiler Event-Name (`draw.create`, …).
    pub fn name(&self) -> &'static str {
        match self {
            DrawEvent::Create { .. } => "draw.create",
            DrawEvent::Delete { .. } => "draw.delete",
            DrawEvent::Update { .. } => "draw.update",
            DrawEvent::SelectionChange { .. } => "draw.selectionchange",
            DrawEvent::ModeChange { .. } => "draw.modechange",
        }
    }
}
