//! Stabile Modus-Bezeichner (geteilt zwischen Optionen und Mode-Controller).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Öffentliche, stabile Kennung eines Interaktionsmodus.
///
/// Die String-Form (`simple_select`, `direct_select`, …) ist Teil des
/// externen Vertrags und darf sich nicht ändern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeName {
    /// Features selektieren und verschieben
    #[default]
    SimpleSelect,
    /// Vertices eines einzelnen Features bearbeiten
    DirectSelect,
    /// Punkt zeichnen
    DrawPoint,
    /// Linie zeichnen
    DrawLineString,
    /// Polygon zeichnen
    DrawPolygon,
    /// Keine Interaktion
    Static,
}

impl ModeName {
    /// Alle Modi in stabiler Reihenfolge.
    pub const ALL: [ModeName; 6] = [
        ModeName::SimpleSelect,
        ModeName::DirectSelect,
        ModeName::DrawPoint,
        ModeName::DrawLineString,
        ModeName::DrawPolygon,
        ModeName::Static,
    ];

    /// Gibt die stabile String-Kennung zurück.
    pub fn as_str(self) -> &'static str {
        match self {
            ModeName::SimpleSelect => "simple_select",
            ModeName::DirectSelect => "direct_select",
            ModeName::DrawPoint => "draw_point",
            ModeName::DrawLineString => "draw_line_string",
            ModeName::DrawPolygon => "draw_polygon",
            ModeName::Static => "static",
        }
    }

    /// `true` für Modi, in denen gerade eine Geometrie gezeichnet wird.
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            ModeName::DrawPoint | ModeName::DrawLineString | ModeName::DrawPolygon
        )
    }
}

impl fmt::Display for ModeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
