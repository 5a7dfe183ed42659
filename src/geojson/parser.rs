//! Normalisierung eingehender GeoJSON-Objekte zu einer FeatureCollection
//! und Zerlegung in Roh-Features.

use crate::core::Properties;
use crate::shared::{DrawError, Result};
use serde_json::{json, Value};

/// Ein Feature aus der Eingabe, noch ohne ID-Vergabe und Typ-Auflösung.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingFeature {
    /// Vom Aufrufer vergebene ID (Zahlen werden zu Strings)
    pub id: Option<String>,
    pub properties: Properties,
    /// Roh-Geometrie; `Value::Null` bei fehlender Geometrie
    pub geometry: Value,
}

/// Normalisiert Feature bzw. nackte Geometrie zu einer FeatureCollection.
///
/// Das Ergebnis ist eine eigenständige Kopie ohne Aliasing zur Eingabe.
pub fn normalize(value: &Value) -> Value {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => value.clone(),
        Some("Feature") => json!({
            "type": "FeatureCollection",
            "features": [value.clone()],
        }),
        _ => json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": value.clone(),
            }],
        }),
    }
}

/// Prüft die Top-Level-Form einer FeatureCollection (für `set`).
pub fn check_feature_collection(value: &Value) -> Result<()> {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(DrawError::InvalidCollection {
                reason: format!("erwartet FeatureCollection, erhalten {other}"),
            })
        }
        None => {
            return Err(DrawError::InvalidCollection {
                reason: "\"type\" fehlt".into(),
            })
        }
    }
    if !value.get("features").is_some_and(Value::is_array) {
        return Err(DrawError::InvalidCollection {
            reason: "\"features\" muss ein Array sein".into(),
        });
    }
    Ok(())
}

/// Zerlegt eine (normalisierte) FeatureCollection in Roh-Features.
pub fn incoming_features(collection: Value) -> Result<Vec<IncomingFeature>> {
    let Value::Object(mut obj) = collection else {
        return Err(DrawError::validation("FeatureCollection erwartet"));
    };
    let Some(Value::Array(features)) = obj.remove("features") else {
        return Err(DrawError::validation("\"features\" muss ein Array sein"));
    };

    features
        .into_iter()
        .map(|feature| {
            let Value::Object(mut f) = feature else {
                return Err(DrawError::validation("Feature muss ein Objekt sein"));
            };
            let id = match f.remove("id") {
                Some(Value::String(s)) => Some(s),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            let properties = match f.remove("properties") {
                Some(Value::Object(props)) => props,
                _ => Properties::new(),
            };
            let geometry = f.remove("geometry").unwrap_or(Value::Null);
            Ok(IncomingFeature {
                id,
                properties,
                geometry,
            })
        })
        .collect()
}
