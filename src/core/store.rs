//! Feature-Store: autoritative ID→Feature-Zuordnung, Selektion und Render-Batching.
//!
//! Der Store ist der einzige Besitzer der Features. Invariante: jede
//! selektierte ID existiert in der Feature-Map; Löschen entfernt die ID
//! atomar auch aus der Selektion und der Vertex-Selektion.

use super::feature::{geometry_value, Feature, Properties};
use super::geometry::Geometry;
use crate::shared::{DrawEvent, Result};
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value};

/// Externer Render-Empfänger (Karten-Oberfläche).
pub trait RenderSink {
    /// Zeichnet den aktuellen Stand neu. `frame` beschreibt die Änderungen
    /// seit dem letzten Aufruf.
    fn render(&mut self, frame: &RenderFrame);
}

/// Render-Empfänger, der nichts tut (Headless-Betrieb).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderSink;

impl RenderSink for NoopRenderSink {
    fn render(&mut self, _frame: &RenderFrame) {}
}

/// Änderungsbeschreibung für einen Render-Aufruf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFrame {
    /// Seit dem letzten Render hinzugefügte oder veränderte Features
    pub changed_ids: Vec<String>,
    /// Seit dem letzten Render gelöschte Features
    pub deleted_ids: Vec<String>,
    /// Aktuelle Selektion
    pub selected_ids: Vec<String>,
}

/// Ein selektierter Vertex (Direct-Select).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectedCoordinate {
    pub feature_id: String,
    pub coord_path: String,
}

impl SelectedCoordinate {
    pub fn new(feature_id: impl Into<String>, coord_path: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            coord_path: coord_path.into(),
        }
    }
}

/// Offener Render-Batch. Muss über [`FeatureStore::close_render_batch`]
/// geschlossen werden; bis dahin werden Render-Anforderungen gesammelt.
#[must_use = "RenderBatch muss mit FeatureStore::close_render_batch geschlossen werden"]
#[derive(Debug)]
pub struct RenderBatch {
    silent: bool,
}

impl RenderBatch {
    /// Beim Schließen wird nicht gerendert, auch wenn Mutationen stattfanden.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// In-Memory Feature-Store.
pub struct FeatureStore {
    features: IndexMap<String, Feature>,
    selected: IndexSet<String>,
    selected_coordinates: Vec<SelectedCoordinate>,
    changed: IndexSet<String>,
    deleted_since_render: Vec<String>,
    selection_dirty: bool,
    pending_events: Vec<DrawEvent>,
    /// Pro offenem Batch: wurde darin ein Render angefordert?
    batches: Vec<bool>,
    render_sink: Box<dyn RenderSink>,
    id_prefix: String,
    next_id: u64,
    /// Zählt jede Änderung an Feature-Bestand oder Geometrien
    revision: u64,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new(Box::new(NoopRenderSink))
    }
}

impl FeatureStore {
    /// Erstellt einen leeren Store mit dem gegebenen Render-Empfänger.
    pub fn new(render_sink: Box<dyn RenderSink>) -> Self {
        Self {
            features: IndexMap::new(),
            selected: IndexSet::new(),
            selected_coordinates: Vec::new(),
            changed: IndexSet::new(),
            deleted_since_render: Vec::new(),
            selection_dirty: false,
            pending_events: Vec::new(),
            batches: Vec::new(),
            render_sink,
            id_prefix: String::new(),
            next_id: 0,
            revision: 0,
        }
    }

    /// Setzt das Präfix für generierte IDs.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Erzeugt eine neue, im Store noch unbenutzte ID.
    pub fn generate_id(&mut self) -> String {
        self.generate_id_avoiding(&IndexSet::new())
    }

    /// Wie [`Self::generate_id`], überspringt zusätzlich `reserved`
    /// (z.B. explizite IDs einer gerade eingelesenen Collection).
    pub fn generate_id_avoiding(&mut self, reserved: &IndexSet<String>) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{}{:08x}", self.id_prefix, self.next_id);
            if !self.features.contains_key(&id) && !reserved.contains(&id) {
                return id;
            }
        }
    }

    /// Änderungszähler; steigt bei jedem Einfügen, Löschen und Verändern.
    ///
    /// Abgeleitete Strukturen (z.B. der Vertex-Index) vergleichen ihn, um
    /// nur bei Änderungen neu aufzubauen.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ── CRUD ────────────────────────────────────────────────────

    /// Fügt ein Feature ein oder ersetzt das Feature mit gleicher ID
    /// (Position in der Iterationsreihenfolge bleibt dabei erhalten).
    pub fn add(&mut self, feature: Feature) {
        let id = feature.id().to_string();
        self.features.insert(id.clone(), feature);
        self.changed.insert(id);
        self.revision += 1;
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Alle Features in stabiler Reihenfolge.
    pub fn get_all(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn get_all_ids(&self) -> Vec<String> {
        self.features.keys().cloned().collect()
    }

    /// Löscht die Features und entfernt sie aus Selektion und Vertex-Selektion.
    ///
    /// Fordert einen Render an (innerhalb eines Batches zusammengefasst).
    /// Gibt die entfernten Features zurück; unbekannte IDs werden ignoriert.
    pub fn delete<S: AsRef<str>>(&mut self, ids: &[S]) -> Vec<Feature> {
        let mut removed = Vec::new();
        for id in ids {
            let id = id.as_ref();
            let Some(feature) = self.features.shift_remove(id) else {
                continue;
            };
            if self.selected.shift_remove(id) {
                self.selection_dirty = true;
            }
            self.changed.shift_remove(id);
            self.deleted_since_render.push(id.to_string());
            removed.push(feature);
        }
        if !removed.is_empty() {
            self.revision += 1;
            let before = self.selected_coordinates.len();
            let features = &self.features;
            self.selected_coordinates
                .retain(|c| features.contains_key(&c.feature_id));
            if self.selected_coordinates.len() != before {
                self.selection_dirty = true;
            }
        }
        self.render();
        removed
    }

    // ── In-place-Mutation ───────────────────────────────────────

    /// Ersetzt die Properties eines Features.
    pub fn set_properties(&mut self, id: &str, properties: Properties) -> bool {
        self.update_feature(id, |f| f.properties = properties).is_some()
    }

    /// Setzt eine einzelne Property.
    pub fn set_feature_property(&mut self, id: &str, key: &str, value: Value) -> bool {
        self.update_feature(id, |f| {
            f.properties.insert(key.to_string(), value);
        })
        .is_some()
    }

    /// Ersetzt die Koordinaten, falls sie sich unterscheiden.
    ///
    /// `Ok(false)` wenn das Feature fehlt oder die Koordinaten gleich sind.
    pub fn set_coordinates(&mut self, id: &str, coordinates: &Value) -> Result<bool> {
        let Some(feature) = self.features.get_mut(id) else {
            return Ok(false);
        };
        let changed = feature.set_coordinates(coordinates)?;
        if changed {
            self.changed.insert(id.to_string());
            self.revision += 1;
        }
        Ok(changed)
    }

    /// Führt eine Mutation auf einem Feature aus und markiert es als geändert.
    pub fn update_feature<R>(&mut self, id: &str, f: impl FnOnce(&mut Feature) -> R) -> Option<R> {
        let feature = self.features.get_mut(id)?;
        let result = f(feature);
        self.changed.insert(id.to_string());
        self.revision += 1;
        Some(result)
    }

    /// Mutation direkt auf der Geometrie (Vertex-Operationen).
    pub fn update_geometry<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut Geometry) -> R,
    ) -> Option<R> {
        self.update_feature(id, |feature| f(feature.geometry_mut()))
    }

    pub fn changed_ids(&self) -> Vec<String> {
        self.changed.iter().cloned().collect()
    }

    pub fn clear_changed(&mut self) {
        self.changed.clear();
    }

    // ── Selektion ───────────────────────────────────────────────

    pub fn get_selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn get_selected(&self) -> Vec<&Feature> {
        self.selected
            .iter()
            .filter_map(|id| self.features.get(id))
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Ersetzt die Selektion. Nicht existierende IDs werden still verworfen.
    pub fn set_selected<S: AsRef<str>>(&mut self, ids: &[S]) {
        if self.replace_selection(ids) {
            self.selection_dirty = true;
        }
    }

    /// Wie [`set_selected`](Self::set_selected), aber ohne `draw.selectionchange`.
    pub fn set_selected_silently<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.replace_selection(ids);
    }

    /// Fügt IDs zur Selektion hinzu.
    pub fn select<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            let id = id.as_ref();
            if !self.features.contains_key(id) {
                log::debug!("Selektion ignoriert unbekannte ID {}", id);
                continue;
            }
            if self.selected.insert(id.to_string()) {
                self.selection_dirty = true;
            }
        }
    }

    /// Entfernt IDs aus der Selektion.
    pub fn deselect<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            if self.selected.shift_remove(id.as_ref()) {
                self.selection_dirty = true;
            }
        }
        self.prune_selected_coordinates();
    }

    pub fn clear_selected(&mut self) {
        if !self.selected.is_empty() || !self.selected_coordinates.is_empty() {
            self.selection_dirty = true;
        }
        self.selected.clear();
        self.selected_coordinates.clear();
    }

    fn replace_selection<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        let next: IndexSet<String> = ids
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| {
                let known = self.features.contains_key(*id);
                if !known {
                    log::debug!("Selektion ignoriert unbekannte ID {}", id);
                }
                known
            })
            .map(str::to_string)
            .collect();

        // Vergleich als ungeordnete Menge
        let changed = next.len() != self.selected.len()
            || !next.iter().all(|id| self.selected.contains(id));
        self.selected = next;
        let coords_before = self.selected_coordinates.len();
        self.prune_selected_coordinates();
        changed || coords_before != self.selected_coordinates.len()
    }

    fn prune_selected_coordinates(&mut self) {
        let selected = &self.selected;
        self.selected_coordinates
            .retain(|c| selected.contains(&c.feature_id));
    }

    /// Setzt die Vertex-Selektion; Vertices nicht selektierter Features entfallen.
    pub fn set_selected_coordinates(&mut self, coordinates: Vec<SelectedCoordinate>) {
        let selected = &self.selected;
        let next: Vec<SelectedCoordinate> = coordinates
            .into_iter()
            .filter(|c| selected.contains(&c.feature_id))
            .collect();
        if next != self.selected_coordinates {
            self.selection_dirty = true;
        }
        self.selected_coordinates = next;
    }

    pub fn selected_coordinates(&self) -> &[SelectedCoordinate] {
        &self.selected_coordinates
    }

    pub fn clear_selected_coordinates(&mut self) {
        if !self.selected_coordinates.is_empty() {
            self.selection_dirty = true;
        }
        self.selected_coordinates.clear();
    }

    /// Selektierte Vertices als GeoJSON-Point-Features.
    pub fn selected_points(&self) -> Vec<Value> {
        self.selected_coordinates
            .iter()
            .filter_map(|c| {
                let feature = self.features.get(&c.feature_id)?;
                let position = feature.get_coordinate(&c.coord_path).ok()?;
                Some(json!({
                    "type": "Feature",
                    "properties": {},
                    "geometry": geometry_value(&Geometry::Point(position)),
                }))
            })
            .collect()
    }

    // ── Events ──────────────────────────────────────────────────

    /// Reiht ein Event zur Auslieferung ein.
    pub fn queue_event(&mut self, event: DrawEvent) {
        self.pending_events.push(event);
    }

    /// Entnimmt alle eingereihten Events in Erzeugungsreihenfolge.
    pub fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Rendering ───────────────────────────────────────────────

    /// Öffnet einen Render-Batch. Verschachtelte Batches sind erlaubt;
    /// nur das Schließen des äußersten Batches rendert.
    pub fn create_render_batch(&mut self) -> RenderBatch {
        self.batches.push(false);
        RenderBatch { silent: false }
    }

    /// Schließt einen Batch: genau ein Render, falls darin einer angefordert
    /// wurde (keiner bei `silent`).
    pub fn close_render_batch(&mut self, batch: RenderBatch) {
        let Some(requested) = self.batches.pop() else {
            log::warn!("close_render_batch ohne offenen Batch");
            return;
        };
        if !requested || batch.silent {
            return;
        }
        match self.batches.last_mut() {
            Some(outer) => *outer = true,
            None => self.flush_render(),
        }
    }

    /// Führt `f` innerhalb eines Render-Batches aus.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let batch = self.create_render_batch();
        let result = f(self);
        self.close_render_batch(batch);
        result
    }

    /// Fordert einen Render an. Innerhalb eines Batches wird nur vorgemerkt.
    pub fn render(&mut self) {
        match self.batches.last_mut() {
            Some(requested) => *requested = true,
            None => self.flush_render(),
        }
    }

    fn flush_render(&mut self) {
        if self.selection_dirty {
            self.selection_dirty = false;
            let features = self.get_selected().iter().map(|f| f.to_geojson()).collect();
            let points = self.selected_points();
            self.pending_events
                .push(DrawEvent::SelectionChange { features, points });
        }

        let frame = RenderFrame {
            changed_ids: self.changed.drain(..).collect(),
            deleted_ids: std::mem::take(&mut self.deleted_since_render),
            selected_ids: self.get_selected_ids(),
        };
        self.render_sink.render(&frame);
    }
}
