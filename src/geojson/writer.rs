//! Export von Features als GeoJSON-FeatureCollection.

use crate::core::Feature;
use serde_json::{json, Value};

/// Baut eine FeatureCollection aus den Features (Reihenfolge bleibt erhalten).
pub fn feature_collection<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Value {
    let features: Vec<Value> = features.into_iter().map(Feature::to_geojson).collect();
    feature_collection_from_values(features)
}

/// Baut eine FeatureCollection aus bereits serialisierten Features.
pub fn feature_collection_from_values(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
