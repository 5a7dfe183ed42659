//! Use-Case: Features zu einer Multi-Geometrie kombinieren und wieder zerlegen.

use crate::core::{Feature, FeatureStore, Geometry, Properties};
use crate::shared::DrawEvent;
use indexmap::IndexSet;

/// Kombiniert gleichartige Features zu einem neuen Multi-Feature.
///
/// Der Basistyp des ersten auflösbaren Features bestimmt den Zieltyp; Features
/// anderen Typs werden übersprungen. Bei weniger als zwei passenden Features
/// passiert nichts. Die Quell-Features werden gelöscht, das Ergebnis erhält
/// eine neue ID und leere Properties und wird nicht selektiert.
///
/// Gibt die ID des neuen Features zurück.
pub fn merge_features<S: AsRef<str>>(store: &mut FeatureStore, ids: &[S]) -> Option<String> {
    let unique: IndexSet<&str> = ids.iter().map(AsRef::as_ref).collect();
    let live: Vec<&Feature> = unique.iter().filter_map(|id| store.get(id)).collect();
    let base = live.first()?.geometry_type().base();

    let members: Vec<&Feature> = live
        .into_iter()
        .filter(|f| {
            let matches = f.geometry_type().base() == base;
            if !matches {
                log::debug!(
                    "Merge: {} ({}) passt nicht zu {}",
                    f.id(),
                    f.geometry_type(),
                    base
                );
            }
            matches
        })
        .collect();
    if members.len() < 2 {
        log::debug!("Merge: weniger als zwei passende Features, nichts zu tun");
        return None;
    }

    let geometry = Geometry::compose(base, members.iter().map(|f| f.geometry()))?;
    let member_ids: Vec<String> = members.iter().map(|f| f.id().to_string()).collect();

    let id = store.generate_id();
    let merged = Feature::new(id.clone(), geometry, Properties::new());
    let created = merged.to_geojson();

    store.batch(|store| {
        store.add(merged);
        store.delete(&member_ids);
    });
    store.queue_event(DrawEvent::Create {
        features: vec![created],
    });

    log::info!("{} Features zu {} kombiniert", member_ids.len(), id);
    Some(id)
}

/// Zerlegt alle Multi-Features in Einzel-Features.
///
/// Jedes Teil erhält eine neue ID und eine Kopie der Properties; das Original
/// wird gelöscht. Einzelteil-Features und leere Multi-Geometrien bleiben
/// unverändert. Alle neuen Features werden in einem `draw.create` gemeldet.
pub fn split_features<S: AsRef<str>>(store: &mut FeatureStore, ids: &[S]) -> Vec<String> {
    let unique: IndexSet<&str> = ids.iter().map(AsRef::as_ref).collect();
    let mut created = Vec::new();
    let mut created_ids = Vec::new();

    store.batch(|store| {
        for id in unique {
            let Some(feature) = store.get(id) else {
                continue;
            };
            let Some(parts) = feature.geometry().split_parts() else {
                log::debug!("Split: {} ist keine Multi-Geometrie", id);
                continue;
            };
            if parts.is_empty() {
                continue;
            }
            let properties = feature.properties.clone();

            for part in parts {
                let part_id = store.generate_id();
                let single = Feature::new(part_id.clone(), part, properties.clone());
                created.push(single.to_geojson());
                created_ids.push(part_id);
                store.add(single);
            }
            store.delete(&[id]);
        }
    });

    if !created.is_empty() {
        store.queue_event(DrawEvent::Create { features: created });
        log::info!("{} Einzel-Features erzeugt", created_ids.len());
    }
    created_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeometryType;

    fn point(id: &str, x: f64) -> Feature {
        Feature::new(id, Geometry::Point(vec![x, 0.0]), Properties::new())
    }

    #[test]
    fn test_merge_requires_two_matching_features() {
        let mut store = FeatureStore::default();
        store.add(point("a", 0.0));
        store.add(Feature::new(
            "l",
            Geometry::LineString(vec![vec![0.0, 0.0], vec![1.0, 0.0]]),
            Properties::new(),
        ));

        assert_eq!(merge_features(&mut store, &["a", "l"]), None);
        assert_eq!(merge_features(&mut store, &["a", "a"]), None);
        assert_eq!(merge_features(&mut store, &["fehlt", "a"]), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_merge_skips_mismatched_types() {
        let mut store = FeatureStore::default();
        store.add(point("a", 0.0));
        store.add(Feature::new(
            "l",
            Geometry::LineString(vec![vec![0.0, 0.0], vec![1.0, 0.0]]),
            Properties::new(),
        ));
        store.add(point("b", 1.0));

        let id = merge_features(&mut store, &["a", "l", "b"]).expect("zwei Punkte");

        assert_eq!(
            store.get(&id).map(|f| f.geometry().clone()),
            Some(Geometry::MultiPoint(vec![vec![0.0, 0.0], vec![1.0, 0.0]]))
        );
        assert!(store.contains("l"));
        assert!(!store.contains("a") && !store.contains("b"));
    }

    #[test]
    fn test_split_copies_properties_and_skips_single_parts() {
        let mut store = FeatureStore::default();
        let mut props = Properties::new();
        props.insert("name".into(), "x".into());
        store.add(Feature::new(
            "multi",
            Geometry::MultiLineString(vec![
                vec![vec![0.0, 0.0], vec![1.0, 0.0]],
                vec![vec![2.0, 0.0], vec![3.0, 0.0]],
            ]),
            props.clone(),
        ));
        store.add(point("single", 5.0));

        let ids = split_features(&mut store, &["multi", "single"]);

        assert_eq!(ids.len(), 2);
        assert!(!store.contains("multi"));
        assert!(store.contains("single"));
        for id in &ids {
            let part = store.get(id).expect("Teil vorhanden");
            assert_eq!(part.geometry_type(), GeometryType::LineString);
            assert_eq!(part.properties, props);
        }
        let creates: Vec<_> = store
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, DrawEvent::Create { .. }))
            .collect();
        assert_eq!(creates.len(), 1);
    }
}
