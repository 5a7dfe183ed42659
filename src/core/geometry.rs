//! Geometrie-Varianten des Feature-Modells als geschlossene Tagged Union.

use crate::shared::{DrawError, Result};
use serde_json::Value;
use std::fmt;

/// Eine Position: `[x, y]` oder `[x, y, z, …]` (Zusatzwerte werden durchgereicht).
pub type Position = Vec<f64>;

/// Geometrie-Typ-Tag der sechs unterstützten GeoJSON-Varianten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryType {
    /// Alle Varianten in stabiler Reihenfolge.
    pub const ALL: [GeometryType; 6] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
    ];

    /// GeoJSON-Typname (`"Point"`, `"MultiPolygon"`, …).
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }

    /// Parst einen GeoJSON-Typnamen.
    ///
    /// Unbekannte Namen (auch `GeometryCollection`) liefern `DrawError::InvalidType`.
    pub fn parse(type_name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == type_name)
            .ok_or_else(|| DrawError::InvalidType {
                type_name: type_name.to_string(),
            })
    }

    /// `true` für Multi-Varianten.
    pub fn is_multi(self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint | GeometryType::MultiLineString | GeometryType::MultiPolygon
        )
    }

    /// Einzelteil-Typ (`MultiPoint` → `Point`; Einzelteil-Typen bleiben gleich).
    pub fn base(self) -> Self {
        match self {
            GeometryType::MultiPoint => GeometryType::Point,
            GeometryType::MultiLineString => GeometryType::LineString,
            GeometryType::MultiPolygon => GeometryType::Polygon,
            single => single,
        }
    }

    /// Multi-Typ zum Basistyp (`Point` → `MultiPoint`; Multi-Typen bleiben gleich).
    pub fn multi(self) -> Self {
        match self {
            GeometryType::Point => GeometryType::MultiPoint,
            GeometryType::LineString => GeometryType::MultiLineString,
            GeometryType::Polygon => GeometryType::MultiPolygon,
            multi => multi,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometrie eines Features. Die Verschachtelung der Koordinaten ist
/// durch die Variante festgelegt und kann nicht vom Typ abweichen.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    /// Ringe in GeoJSON-Form (geschlossen: erster == letzter Vertex)
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

/// Dekodiert Koordinaten in die Zielverschachtelung.
fn decode<T: serde::de::DeserializeOwned>(
    geometry_type: GeometryType,
    coordinates: &Value,
) -> Result<T> {
    T::deserialize(coordinates).map_err(|e| {
        DrawError::validation(format!(
            "Koordinaten passen nicht zum Typ {}: {}",
            geometry_type, e
        ))
    })
}

impl Geometry {
    /// Factory: baut die passende Variante aus Typ-Tag und Roh-Koordinaten.
    pub fn from_type_and_coordinates(type_name: &str, coordinates: &Value) -> Result<Self> {
        let geometry_type = GeometryType::parse(type_name)?;
        Self::decode(geometry_type, coordinates)
    }

    /// Dekodiert Roh-Koordinaten für einen bereits bekannten Typ.
    pub fn decode(geometry_type: GeometryType, coordinates: &Value) -> Result<Self> {
        let geometry = match geometry_type {
            GeometryType::Point => Geometry::Point(decode(geometry_type, coordinates)?),
            GeometryType::LineString => Geometry::LineString(decode(geometry_type, coordinates)?),
            GeometryType::Polygon => Geometry::Polygon(decode(geometry_type, coordinates)?),
            GeometryType::MultiPoint => Geometry::MultiPoint(decode(geometry_type, coordinates)?),
            GeometryType::MultiLineString => {
                Geometry::MultiLineString(decode(geometry_type, coordinates)?)
            }
            GeometryType::MultiPolygon => {
                Geometry::MultiPolygon(decode(geometry_type, coordinates)?)
            }
        };
        Ok(geometry)
    }

    /// Typ-Tag dieser Geometrie.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// `true` für Multi-Varianten.
    pub fn is_multi(&self) -> bool {
        self.geometry_type().is_multi()
    }

    /// Minimale geometrische Gültigkeit.
    ///
    /// - LineString: mindestens 2 Positionen
    /// - Polygon: mindestens ein Ring, jeder mit mindestens 3 Vertices (ohne Schluss-Vertex)
    /// - Multi*: mindestens ein Teil, jeder Teil gültig
    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Point(p) => p.len() >= 2,
            Geometry::LineString(line) => line_is_valid(line),
            Geometry::Polygon(rings) => polygon_is_valid(rings),
            Geometry::MultiPoint(points) => {
                !points.is_empty() && points.iter().all(|p| p.len() >= 2)
            }
            Geometry::MultiLineString(lines) => {
                !lines.is_empty() && lines.iter().all(|l| line_is_valid(l))
            }
            Geometry::MultiPolygon(polygons) => {
                !polygons.is_empty() && polygons.iter().all(|p| polygon_is_valid(p))
            }
        }
    }

    /// Zerlegt eine Multi-Geometrie in ihre Einzelteile (Reihenfolge bleibt).
    ///
    /// Einzelteil-Geometrien liefern `None`.
    pub fn split_parts(&self) -> Option<Vec<Geometry>> {
        match self {
            Geometry::MultiPoint(points) => {
                Some(points.iter().cloned().map(Geometry::Point).collect())
            }
            Geometry::MultiLineString(lines) => {
                Some(lines.iter().cloned().map(Geometry::LineString).collect())
            }
            Geometry::MultiPolygon(polygons) => {
                Some(polygons.iter().cloned().map(Geometry::Polygon).collect())
            }
            _ => None,
        }
    }

    /// Setzt eine Multi-Geometrie vom Basistyp `base` aus Teilen zusammen.
    ///
    /// Teile eines anderen Basistyps werden übersprungen; Multi-Teile desselben
    /// Basistyps steuern alle ihre Einzelteile bei. `None`, wenn `base` selbst
    /// ein Multi-Typ ist.
    pub fn compose<'a>(
        base: GeometryType,
        parts: impl IntoIterator<Item = &'a Geometry>,
    ) -> Option<Geometry> {
        let mut composite = match base {
            GeometryType::Point => Geometry::MultiPoint(Vec::new()),
            GeometryType::LineString => Geometry::MultiLineString(Vec::new()),
            GeometryType::Polygon => Geometry::MultiPolygon(Vec::new()),
            _ => return None,
        };

        for part in parts {
            match (&mut composite, part) {
                (Geometry::MultiPoint(out), Geometry::Point(p)) => out.push(p.clone()),
                (Geometry::MultiPoint(out), Geometry::MultiPoint(ps)) => {
                    out.extend(ps.iter().cloned())
                }
                (Geometry::MultiLineString(out), Geometry::LineString(l)) => out.push(l.clone()),
                (Geometry::MultiLineString(out), Geometry::MultiLineString(ls)) => {
                    out.extend(ls.iter().cloned())
                }
                (Geometry::MultiPolygon(out), Geometry::Polygon(p)) => out.push(p.clone()),
                (Geometry::MultiPolygon(out), Geometry::MultiPolygon(ps)) => {
                    out.extend(ps.iter().cloned())
                }
                (_, other) => {
                    log::debug!(
                        "Teil vom Typ {} passt nicht zu {}, übersprungen",
                        other.geometry_type(),
                        base
                    );
                }
            }
        }

        Some(composite)
    }

    /// Alle Positionen der Geometrie in Dokumentreihenfolge.
    pub fn positions(&self) -> Vec<&Position> {
        match self {
            Geometry::Point(p) => vec![p],
            Geometry::LineString(line) | Geometry::MultiPoint(line) => line.iter().collect(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().flatten().collect()
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().collect(),
        }
    }
}

fn line_is_valid(line: &[Position]) -> bool {
    line.len() >= 2
}

/// Anzahl der Vertices eines Rings ohne den Schluss-Vertex.
pub(crate) fn open_ring_len(ring: &[Position]) -> usize {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.len() - 1
    } else {
        ring.len()
    }
}

fn polygon_is_valid(rings: &[Vec<Position>]) -> bool {
    !rings.is_empty() && rings.iter().all(|ring| open_ring_len(ring) >= 3)
}
