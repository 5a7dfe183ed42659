//! Spatial-Index (KD-Tree) über alle Vertices für Hit-Tests.

use glam::DVec2;
use kiddo::{KdTree, SquaredEuclidean};
use std::cell::RefCell;

use super::FeatureStore;

/// Räumliche Trefferabfrage: welche Features liegen am Punkt?
pub trait HitTester {
    /// Gibt die IDs der Features am Punkt zurück (nächste zuerst).
    fn feature_ids_at(&self, point: DVec2, store: &FeatureStore) -> Vec<String>;
}

/// Read-only Index über alle Vertices eines Stores.
#[derive(Debug, Clone)]
pub struct VertexIndex {
    tree: KdTree<f64, 2>,
    /// Feature-ID je indexiertem Vertex (Index = KD-Tree-Item)
    owners: Vec<String>,
}

impl VertexIndex {
    /// Erstellt einen leeren Index.
    pub fn empty() -> Self {
        Self {
            tree: KdTree::new(),
            owners: Vec::new(),
        }
    }

    /// Baut einen Index aus allen Vertices des Stores.
    pub fn from_store(store: &FeatureStore) -> Self {
        let mut entries: Vec<[f64; 2]> = Vec::new();
        let mut owners = Vec::new();
        for feature in store.get_all() {
            for pos in feature.geometry().positions() {
                if let [x, y, ..] = pos.as_slice() {
                    entries.push([*x, *y]);
                    owners.push(feature.id().to_string());
                }
            }
        }

        let tree: KdTree<f64, 2> = (&entries).into();
        Self { tree, owners }
    }

    /// Anzahl indexierter Vertices.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Feature-IDs mit mindestens einem Vertex im Radius, nach Distanz sortiert
    /// und ohne Duplikate.
    pub fn feature_ids_within(&self, query: DVec2, radius: f64) -> Vec<String> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut hits = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut ids: Vec<String> = Vec::new();
        for hit in hits {
            let Some(owner) = self.owners.get(hit.item as usize) else {
                continue;
            };
            if !ids.contains(owner) {
                ids.push(owner.clone());
            }
        }
        ids
    }
}

/// Standard-Hit-Test über Vertices im Klickradius.
///
/// Der Vertex-Index wird zwischengespeichert und nur neu aufgebaut, wenn
/// sich die [`FeatureStore::revision`] geändert hat. Ein Tester gehört zu
/// genau einem Store.
#[derive(Debug)]
pub struct VertexHitTester {
    /// Suchradius in Koordinateneinheiten
    pub click_buffer: f64,
    cache: RefCell<Option<(u64, VertexIndex)>>,
}

impl VertexHitTester {
    pub fn new(click_buffer: f64) -> Self {
        Self {
            click_buffer,
            cache: RefCell::new(None),
        }
    }

    /// Store-Revision, für die der zwischengespeicherte Index gebaut wurde.
    pub fn cached_revision(&self) -> Option<u64> {
        self.cache.borrow().as_ref().map(|(revision, _)| *revision)
    }
}

impl HitTester for VertexHitTester {
    fn feature_ids_at(&self, point: DVec2, store: &FeatureStore) -> Vec<String> {
        let mut cache = self.cache.borrow_mut();
        let stale = !matches!(
            cache.as_ref(),
            Some((revision, _)) if *revision == store.revision()
        );
        if stale {
            let index = VertexIndex::from_store(store);
            log::debug!(
                "Vertex-Index neu aufgebaut: {} Vertices (Revision {})",
                index.len(),
                store.revision()
            );
            *cache = Some((store.revision(), index));
        }
        cache
            .as_ref()
            .map(|(_, index)| index.feature_ids_within(point, self.click_buffer))
            .unwrap_or_default()
    }
}
