//! Feature-Modell: ID, Properties und typisierte Geometrie.

use super::geometry::{Geometry, GeometryType, Position};
use crate::shared::Result;
use serde_json::{json, Map, Value};

/// Ungeordnete Key→Value-Properties eines Features.
pub type Properties = Map<String, Value>;

/// Ein editierbares Feature. Die Geometrie ist nie null.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: String,
    /// Freie Properties (werden unverändert durchgereicht)
    pub properties: Properties,
    geometry: Geometry,
}

impl Feature {
    /// Erstellt ein neues Feature.
    pub fn new(id: impl Into<String>, geometry: Geometry, properties: Properties) -> Self {
        Self {
            id: id.into(),
            properties,
            geometry,
        }
    }

    /// Feature-ID (eindeutig innerhalb eines Stores).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry.geometry_type()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Mutabler Zugriff auf die Geometrie; die Variante bleibt fix.
    pub(crate) fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Koordinaten in GeoJSON-Form.
    pub fn coordinates(&self) -> Value {
        coordinates_value(&self.geometry)
    }

    /// Ersetzt die Koordinaten (Verschachtelung muss zum eigenen Typ passen).
    ///
    /// Gibt `true` zurück, wenn sich die Koordinaten tatsächlich geändert haben.
    pub fn set_coordinates(&mut self, coordinates: &Value) -> Result<bool> {
        let geometry = Geometry::decode(self.geometry_type(), coordinates)?;
        Ok(self.replace_geometry(geometry))
    }

    /// Ersetzt die Geometrie, sofern sie gleichen Typs ist und sich unterscheidet.
    pub(crate) fn replace_geometry(&mut self, geometry: Geometry) -> bool {
        if geometry.geometry_type() != self.geometry_type() || geometry == self.geometry {
            return false;
        }
        self.geometry = geometry;
        true
    }

    pub fn is_valid(&self) -> bool {
        self.geometry.is_valid()
    }

    pub fn get_coordinate(&self, path: &str) -> Result<Position> {
        self.geometry.get_coordinate(path)
    }

    /// Serialisiert das Feature als GeoJSON-Feature-Objekt.
    ///
    /// Koordinaten werden intern als `f64` gehalten; die Zahlform der Eingabe
    /// geht dabei verloren. Ganzzahlige Werte erscheinen immer als Integer,
    /// d.h. `[1.0, 2.0]` kommt als `[1, 2]` zurück. Strukturelle Gleichheit
    /// mit der Eingabe gilt daher nur, wenn ganzzahlige Koordinaten dort
    /// ebenfalls als Integer stehen.
    pub fn to_geojson(&self) -> Value {
        json!({
            "id": self.id,
            "type": "Feature",
            "properties": Value::Object(self.properties.clone()),
            "geometry": geometry_value(&self.geometry),
        })
    }
}

/// GeoJSON-Geometrieobjekt (`{"type", "coordinates"}`).
pub fn geometry_value(geometry: &Geometry) -> Value {
    json!({
        "type": geometry.geometry_type().as_str(),
        "coordinates": coordinates_value(geometry),
    })
}

/// Koordinaten einer Geometrie als verschachteltes JSON-Array.
pub fn coordinates_value(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Point(p) => position_value(p),
        Geometry::LineString(line) | Geometry::MultiPoint(line) => seq_value(line),
        Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
            Value::Array(rings.iter().map(|r| seq_value(r)).collect())
        }
        Geometry::MultiPolygon(polygons) => Value::Array(
            polygons
                .iter()
                .map(|rings| Value::Array(rings.iter().map(|r| seq_value(r)).collect()))
                .collect(),
        ),
    }
}

fn seq_value(seq: &[Position]) -> Value {
    Value::Array(seq.iter().map(|p| position_value(p)).collect())
}

fn position_value(pos: &[f64]) -> Value {
    Value::Array(pos.iter().copied().map(number_value).collect())
}

/// Ganzzahlige Werte werden als JSON-Integer ausgegeben (`1` statt `1.0`).
/// Nicht-endliche Werte werden zu `null`.
fn number_value(v: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests;
