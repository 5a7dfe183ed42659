//! Use-Case: GeoJSON übernehmen (`add`) und Store ersetzen (`set`).

use crate::core::{Feature, FeatureStore, Geometry};
use crate::geojson::{
    check_feature_collection, first_error, hint, incoming_features, normalize, HintOptions,
    IssueLevel,
};
use crate::shared::{DrawError, Result};
use indexmap::IndexSet;
use serde_json::Value;

/// Übernimmt ein GeoJSON-Objekt (FeatureCollection, Feature oder Geometrie).
///
/// Zweiphasig: zuerst werden alle Features geprüft und aufgelöst, erst danach
/// wird der Store verändert. Ein Fehler lässt den Store daher unverändert.
/// Am Ende wird genau ein Render angefordert.
///
/// Gibt die IDs in Eingabereihenfolge zurück.
pub fn add_geojson(
    store: &mut FeatureStore,
    geojson: &Value,
    hint_options: HintOptions,
) -> Result<Vec<String>> {
    let collection = normalize(geojson);

    let issues = hint(&collection, hint_options);
    if let Some(issue) = first_error(&issues) {
        return Err(DrawError::validation(issue.describe()));
    }
    for issue in issues.iter().filter(|i| i.level == IssueLevel::Message) {
        log::debug!("GeoJSON-Hinweis: {}", issue.describe());
    }

    let prepared = resolve_features(store, collection)?;
    let ids: Vec<String> = prepared.iter().map(|f| f.id().to_string()).collect();

    for feature in prepared {
        commit_feature(store, feature);
    }
    store.render();

    log::debug!("{} Features übernommen", ids.len());
    Ok(ids)
}

/// Ersetzt den Store-Inhalt durch eine FeatureCollection.
///
/// Gibt die IDs der übernommenen Features sowie die IDs der nicht mehr
/// enthaltenen (zu löschenden) Features zurück. Das Löschen selbst übernimmt
/// der Aufrufer, damit er den Moduswechsel steuern kann.
pub fn replace_with_collection(
    store: &mut FeatureStore,
    collection: &Value,
    hint_options: HintOptions,
) -> Result<(Vec<String>, Vec<String>)> {
    check_feature_collection(collection)?;

    let previous = store.get_all_ids();
    let ids = add_geojson(store, collection, hint_options)?;

    let kept: IndexSet<&str> = ids.iter().map(String::as_str).collect();
    let stale = previous
        .into_iter()
        .filter(|id| !kept.contains(id.as_str()))
        .collect();
    Ok((ids, stale))
}

/// Phase 1: IDs vergeben und Geometrien auflösen, ohne den Store zu verändern.
fn resolve_features(store: &mut FeatureStore, collection: Value) -> Result<Vec<Feature>> {
    let incoming = incoming_features(collection)?;
    let mut prepared = Vec::with_capacity(incoming.len());
    // Explizite IDs der Eingabe sind für generierte IDs tabu
    let reserved: IndexSet<String> = incoming.iter().filter_map(|f| f.id.clone()).collect();

    for feature in incoming {
        let id = match feature.id {
            Some(id) => id,
            None => store.generate_id_avoiding(&reserved),
        };
        if feature.geometry.is_null() {
            return Err(DrawError::InvalidGeometry { id });
        }
        let type_name = feature
            .geometry
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let coordinates = feature.geometry.get("coordinates").unwrap_or(&Value::Null);
        let geometry = Geometry::from_type_and_coordinates(type_name, coordinates)?;
        prepared.push(Feature::new(id, geometry, feature.properties));
    }
    Ok(prepared)
}

/// Phase 2: Feature einfügen bzw. vorhandenes Feature aktualisieren.
///
/// Neue ID oder geänderter Geometrietyp → neues Feature (ersetzt das alte).
/// Gleicher Typ → Properties übernehmen, Koordinaten nur bei Abweichung.
fn commit_feature(store: &mut FeatureStore, feature: Feature) {
    let id = feature.id().to_string();
    let Some(existing) = store.get(&id) else {
        store.add(feature);
        return;
    };
    if existing.geometry_type() != feature.geometry_type() {
        log::debug!(
            "Feature {}: Typwechsel {} → {}",
            id,
            existing.geometry_type(),
            feature.geometry_type()
        );
        store.add(feature);
        return;
    }

    let properties_changed = existing.properties != feature.properties;
    let geometry_changed = existing.geometry() != feature.geometry();
    if properties_changed {
        store.set_properties(&id, feature.properties.clone());
    }
    if geometry_changed {
        let geometry = feature.geometry().clone();
        store.update_feature(&id, |f| f.replace_geometry(geometry));
    }
}
