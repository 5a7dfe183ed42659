//! Strukturelle GeoJSON-Prüfung.
//!
//! Liefert alle gefundenen Probleme in Dokumentreihenfolge. Probleme mit
//! `IssueLevel::Message` sind rein informativ (z.B. Ring-Orientierung) und
//! brechen die Übernahme nicht ab.

use serde_json::{Map, Value};

/// Schweregrad eines Prüfbefunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Verletzt die Wohlgeformtheit
    Error,
    /// Nur ein Hinweis
    Message,
}

/// Ein Prüfbefund mit Fundstelle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintIssue {
    pub level: IssueLevel,
    /// Fundstelle, z.B. `features[2].geometry.coordinates[0]`
    pub path: String,
    pub message: String,
}

impl HintIssue {
    /// Meldung inklusive Fundstelle.
    pub fn describe(&self) -> String {
        if self.path.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.path, self.message)
        }
    }
}

/// Prüf-Einstellungen.
#[derive(Debug, Clone, Copy)]
pub struct HintOptions {
    /// Hinweise zur Ring-Orientierung (Rechte-Hand-Regel) erzeugen
    pub check_winding: bool,
}

impl Default for HintOptions {
    fn default() -> Self {
        Self {
            check_winding: true,
        }
    }
}

/// Prüft ein beliebiges GeoJSON-Objekt (FeatureCollection, Feature oder Geometrie).
pub fn hint(value: &Value, options: HintOptions) -> Vec<HintIssue> {
    let mut checker = Checker {
        options,
        issues: Vec::new(),
    };
    checker.root(value, "");
    checker.issues
}

/// Erster nicht-informativer Befund, falls vorhanden.
pub fn first_error(issues: &[HintIssue]) -> Option<&HintIssue> {
    issues.iter().find(|i| i.level == IssueLevel::Error)
}

struct Checker {
    options: HintOptions,
    issues: Vec<HintIssue>,
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

impl Checker {
    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(HintIssue {
            level: IssueLevel::Error,
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn message(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(HintIssue {
            level: IssueLevel::Message,
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.error(path, "GeoJSON-Objekt muss ein JSON-Objekt sein");
        }
        obj
    }

    fn type_name<'v>(&mut self, obj: &'v Map<String, Value>, path: &str) -> Option<&'v str> {
        match obj.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(_) => {
                self.error(path, "\"type\" muss ein String sein");
                None
            }
            None => {
                self.error(path, "\"type\" fehlt");
                None
            }
        }
    }

    fn root(&mut self, value: &Value, path: &str) {
        let Some(obj) = self.object(value, path) else {
            return;
        };
        let Some(type_name) = self.type_name(obj, path) else {
            return;
        };
        match type_name {
            "FeatureCollection" => self.feature_collection(obj, path),
            "Feature" => self.feature(obj, path),
            _ => self.geometry_body(obj, type_name, path),
        }
    }

    fn bbox(&mut self, obj: &Map<String, Value>, path: &str) {
        let Some(bbox) = obj.get("bbox") else {
            return;
        };
        let valid = bbox
            .as_array()
            .is_some_and(|a| a.len() >= 4 && a.iter().all(Value::is_number));
        if !valid {
            self.error(&child(path, "bbox"), "\"bbox\" muss ein Array aus Zahlen sein");
        }
    }

    fn feature_collection(&mut self, obj: &Map<String, Value>, path: &str) {
        self.bbox(obj, path);
        let features_path = child(path, "features");
        match obj.get("features") {
            Some(Value::Array(features)) => {
                for (i, feature) in features.iter().enumerate() {
                    let p = index(&features_path, i);
                    let Some(f) = self.object(feature, &p) else {
                        continue;
                    };
                    match self.type_name(f, &p) {
                        Some("Feature") => self.feature(f, &p),
                        Some(other) => self.error(
                            &p,
                            format!("FeatureCollection darf nur Features enthalten, nicht {other}"),
                        ),
                        None => {}
                    }
                }
            }
            Some(_) => self.error(&features_path, "\"features\" muss ein Array sein"),
            None => self.error(path, "\"features\" fehlt"),
        }
    }

    fn feature(&mut self, obj: &Map<String, Value>, path: &str) {
        self.bbox(obj, path);
        if let Some(id) = obj.get("id") {
            if !(id.is_string() || id.is_number()) {
                self.error(&child(path, "id"), "\"id\" muss String oder Zahl sein");
            }
        }
        match obj.get("properties") {
            Some(Value::Object(_)) | Some(Value::Null) => {}
            Some(_) => self.error(
                &child(path, "properties"),
                "\"properties\" muss ein Objekt oder null sein",
            ),
            None => self.error(path, "\"properties\" fehlt"),
        }
        let geometry_path = child(path, "geometry");
        match obj.get("geometry") {
            Some(Value::Null) => {}
            Some(geometry) => {
                let Some(g) = self.object(geometry, &geometry_path) else {
                    return;
                };
                if let Some(type_name) = self.type_name(g, &geometry_path) {
                    self.geometry_body(g, type_name, &geometry_path);
                }
            }
            None => self.error(path, "\"geometry\" fehlt"),
        }
    }

    fn geometry_body(&mut self, obj: &Map<String, Value>, type_name: &str, path: &str) {
        self.bbox(obj, path);
        if type_name == "GeometryCollection" {
            let geometries_path = child(path, "geometries");
            match obj.get("geometries") {
                Some(Value::Array(geometries)) => {
                    for (i, g) in geometries.iter().enumerate() {
                        let p = index(&geometries_path, i);
                        let Some(g) = self.object(g, &p) else {
                            continue;
                        };
                        if let Some(t) = self.type_name(g, &p) {
                            self.geometry_body(g, t, &p);
                        }
                    }
                }
                _ => self.error(path, "\"geometries\" muss ein Array sein"),
            }
            return;
        }

        let coords_path = child(path, "coordinates");
        let Some(coords) = obj.get("coordinates") else {
            // Unbekannte Typen ohne Koordinaten melden wir am Typ
            if !is_geometry_type(type_name) {
                self.error(path, format!("Unbekannter Typ {type_name}"));
            } else {
                self.error(path, "\"coordinates\" fehlt");
            }
            return;
        };

        match type_name {
            "Point" => self.position(coords, &coords_path),
            "LineString" => self.line(coords, &coords_path),
            "Polygon" => self.polygon(coords, &coords_path),
            "MultiPoint" => self.each(coords, &coords_path, Self::position),
            "MultiLineString" => self.each(coords, &coords_path, Self::line),
            "MultiPolygon" => self.each(coords, &coords_path, Self::polygon),
            other => self.error(path, format!("Unbekannter Typ {other}")),
        }
    }

    fn each(&mut self, value: &Value, path: &str, f: fn(&mut Self, &Value, &str)) {
        let Some(items) = value.as_array() else {
            self.error(path, "Koordinaten müssen ein Array sein");
            return;
        };
        for (i, item) in items.iter().enumerate() {
            f(self, item, &index(path, i));
        }
    }

    fn position(&mut self, value: &Value, path: &str) {
        let Some(pos) = value.as_array() else {
            self.error(path, "Position muss ein Array sein");
            return;
        };
        if pos.len() < 2 {
            self.error(path, "Position braucht mindestens 2 Elemente");
            return;
        }
        if !pos.iter().all(Value::is_number) {
            self.error(path, "Jedes Element einer Position muss eine Zahl sein");
        }
    }

    fn line(&mut self, value: &Value, path: &str) {
        let Some(positions) = value.as_array() else {
            self.error(path, "LineString-Koordinaten müssen ein Array sein");
            return;
        };
        if positions.len() < 2 {
            self.error(path, "Eine Linie braucht mindestens 2 Positionen");
        }
        self.each(value, path, Self::position);
    }

    fn polygon(&mut self, value: &Value, path: &str) {
        let Some(rings) = value.as_array() else {
            self.error(path, "Polygon-Koordinaten müssen ein Array sein");
            return;
        };
        for (i, ring) in rings.iter().enumerate() {
            let ring_path = index(path, i);
            let errors_before = self.error_count();
            self.ring(ring, &ring_path);
            if self.options.check_winding && self.error_count() == errors_before {
                self.winding(ring, &ring_path, i == 0);
            }
        }
    }

    fn ring(&mut self, value: &Value, path: &str) {
        let Some(positions) = value.as_array() else {
            self.error(path, "LinearRing muss ein Array sein");
            return;
        };
        if positions.len() < 4 {
            self.error(path, "Ein LinearRing braucht mindestens 4 Positionen");
        }
        let errors_before = self.error_count();
        self.each(value, path, Self::position);
        let closed = match (positions.first(), positions.last()) {
            (Some(first), Some(last)) => same_position(first, last),
            _ => false,
        };
        if self.error_count() == errors_before && !closed {
            self.error(
                path,
                "Erste und letzte Position eines LinearRing müssen gleich sein",
            );
        }
    }

    fn winding(&mut self, ring: &Value, path: &str, exterior: bool) {
        let Some(positions) = ring.as_array() else {
            return;
        };
        let points: Vec<(f64, f64)> = positions
            .iter()
            .filter_map(|p| Some((p.get(0)?.as_f64()?, p.get(1)?.as_f64()?)))
            .collect();
        let area2: f64 = points
            .windows(2)
            .map(|w| w[0].0 * w[1].1 - w[1].0 * w[0].1)
            .sum();
        let counter_clockwise = area2 > 0.0;
        if exterior != counter_clockwise && area2 != 0.0 {
            self.message(
                path,
                "Polygone sollten der Rechte-Hand-Regel folgen (außen gegen, innen im Uhrzeigersinn)",
            );
        }
    }

    fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.level == IssueLevel::Error)
            .count()
    }
}

/// Numerischer Vergleich (`[0, 0]` und `[0.0, 0.0]` sind gleich).
fn same_position(a: &Value, b: &Value) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(a), Some(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.as_f64() == y.as_f64())
        }
        _ => false,
    }
}

fn is_geometry_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "Point" | "LineString" | "Polygon" | "MultiPoint" | "MultiLineString" | "MultiPolygon"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(value: &Value) -> Vec<HintIssue> {
        hint(value, HintOptions::default())
            .into_iter()
            .filter(|i| i.level == IssueLevel::Error)
            .collect()
    }

    #[test]
    fn test_valid_collection_has_no_errors() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1, 2] } },
                { "type": "Feature", "properties": null, "geometry": null },
                { "type": "Feature", "id": 7, "properties": {}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
                } }
            ]
        });
        assert!(errors(&fc).is_empty());
    }

    #[test]
    fn test_short_position_reports_path() {
        let feature = json!({
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "LineString", "coordinates": [[0, 0], [1]] }
        });
        let errs = errors(&feature);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "geometry.coordinates[1]");
        assert!(errs[0].describe().starts_with("geometry.coordinates[1]: "));
    }

    #[test]
    fn test_open_ring_is_error() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1]]]
        });
        let errs = errors(&polygon);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("gleich"));
    }

    #[test]
    fn test_ring_closed_with_mixed_number_forms() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [1, 0], [1, 1], [0.0, 0.0]]]
        });
        assert!(errors(&polygon).is_empty());
    }

    #[test]
    fn test_missing_properties_is_error() {
        let feature = json!({ "type": "Feature", "geometry": null });
        assert_eq!(errors(&feature).len(), 1);
    }

    #[test]
    fn test_clockwise_exterior_is_only_a_message() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
        });
        let issues = hint(&polygon, HintOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, IssueLevel::Message);
        assert!(first_error(&issues).is_none());

        let quiet = hint(
            &polygon,
            HintOptions {
                check_winding: false,
            },
        );
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let point = json!({ "type": "Point", "coordinates": ["a", 1] });
        assert_eq!(errors(&point).len(), 1);
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert_eq!(errors(&json!({ "type": "Circle", "radius": 3 })).len(), 1);
    }
}
