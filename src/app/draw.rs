//! Öffentliche API-Fassade: bündelt Store, Mode-Controller und externe Empfänger.
//!
//! Jede Operation liefert die dabei eingereihten Events nach Abschluss an den
//! [`EventSink`] aus.

use super::events::{EventSink, NoopEventSink};
use super::mode::{Mode, ModeController, ModeTransition};
use super::mode_handler::{DefaultModeHandler, ModeHandler};
use super::use_cases;
use crate::core::{FeatureStore, HitTester, NoopRenderSink, RenderSink, VertexHitTester};
use crate::geojson::{feature_collection, feature_collection_from_values, HintOptions};
use crate::shared::{DrawEvent, DrawOptions, ModeName, Result, UpdateAction};
use glam::DVec2;
use serde_json::Value;

/// Externe Mitspieler der Fassade.
pub struct Collaborators {
    pub render_sink: Box<dyn RenderSink>,
    pub event_sink: Box<dyn EventSink>,
    pub mode_handler: Box<dyn ModeHandler>,
    pub hit_tester: Box<dyn HitTester>,
}

impl Collaborators {
    /// Ohne Oberfläche: Render und Events werden verworfen.
    pub fn headless(options: &DrawOptions) -> Self {
        Self {
            render_sink: Box::new(NoopRenderSink),
            event_sink: Box::new(NoopEventSink),
            mode_handler: Box::new(DefaultModeHandler),
            hit_tester: Box::new(VertexHitTester::new(options.click_buffer)),
        }
    }
}

/// Die Draw-API.
pub struct Draw {
    options: DrawOptions,
    store: FeatureStore,
    modes: ModeController,
    event_sink: Box<dyn EventSink>,
    mode_handler: Box<dyn ModeHandler>,
    hit_tester: Box<dyn HitTester>,
}

impl Draw {
    /// Headless-Instanz mit den gegebenen Optionen.
    pub fn new(options: DrawOptions) -> Self {
        let collaborators = Collaborators::headless(&options);
        Self::with_collaborators(options, collaborators)
    }

    pub fn with_collaborators(options: DrawOptions, collaborators: Collaborators) -> Self {
        let store =
            FeatureStore::new(collaborators.render_sink).with_id_prefix(options.id_prefix.clone());
        let modes = ModeController::for_default_mode(options.default_mode);
        Self {
            options,
            store,
            modes,
            event_sink: collaborators.event_sink,
            mode_handler: collaborators.mode_handler,
            hit_tester: collaborators.hit_tester,
        }
    }

    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    /// Lesezugriff auf den Store.
    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    // ── Abfragen ────────────────────────────────────────────────

    /// IDs der Features am Punkt (Hit-Test).
    pub fn get_feature_ids_at(&self, point: DVec2) -> Vec<String> {
        self.hit_tester.feature_ids_at(point, &self.store)
    }

    pub fn get_selected_ids(&self) -> Vec<String> {
        self.store.get_selected_ids()
    }

    /// Selektierte Features als FeatureCollection.
    pub fn get_selected(&self) -> Value {
        feature_collection(self.store.get_selected())
    }

    /// Selektierte Vertices als FeatureCollection aus Punkten.
    pub fn get_selected_points(&self) -> Value {
        feature_collection_from_values(self.store.selected_points())
    }

    /// Einzelnes Feature als GeoJSON.
    pub fn get(&self, id: &str) -> Option<Value> {
        self.store.get(id).map(|f| f.to_geojson())
    }

    /// Alle Features in Store-Reihenfolge.
    pub fn get_all(&self) -> Value {
        feature_collection(self.store.get_all())
    }

    pub fn get_mode(&self) -> ModeName {
        self.modes.name()
    }

    /// Aktiver Modus inklusive Optionen.
    pub fn current_mode(&self) -> &Mode {
        self.modes.current()
    }

    // ── Mutationen ──────────────────────────────────────────────

    /// Ersetzt den gesamten Inhalt durch eine FeatureCollection.
    ///
    /// Features mit bekannter ID werden aktualisiert, fehlende gelöscht.
    /// Insgesamt wird höchstens einmal gerendert.
    pub fn set(&mut self, collection: &Value) -> Result<Vec<String>> {
        let hint_options = self.hint_options();
        let batch = self.store.create_render_batch();
        let result = use_cases::replace_with_collection(&mut self.store, collection, hint_options)
            .map(|(ids, stale)| {
                if !stale.is_empty() {
                    self.delete_in_batch(&stale);
                }
                ids
            });
        self.store.close_render_batch(batch);
        self.flush_events();
        result
    }

    /// Übernimmt FeatureCollection, Feature oder nackte Geometrie.
    pub fn add(&mut self, geojson: &Value) -> Result<Vec<String>> {
        let hint_options = self.hint_options();
        let result = use_cases::add_geojson(&mut self.store, geojson, hint_options);
        self.flush_events();
        result
    }

    /// Löscht Features. Unbekannte IDs werden ignoriert.
    pub fn delete<S: AsRef<str>>(&mut self, ids: &[S]) -> &mut Self {
        let batch = self.store.create_render_batch();
        self.delete_in_batch(ids);
        self.store.close_render_batch(batch);
        self.flush_events();
        self
    }

    pub fn delete_all(&mut self) -> &mut Self {
        let ids = self.store.get_all_ids();
        self.delete(&ids)
    }

    /// Setzt eine einzelne Property eines Features.
    ///
    /// Meldet `draw.update` mit `change_properties` und rendert.
    pub fn set_feature_property(&mut self, id: &str, key: &str, value: Value) -> &mut Self {
        if self.store.set_feature_property(id, key, value) {
            if let Some(feature) = self.store.get(id).map(|f| f.to_geojson()) {
                self.store.queue_event(DrawEvent::Update {
                    action: UpdateAction::ChangeProperties,
                    features: vec![feature],
                });
            }
            self.store.render();
        } else {
            log::debug!("set_feature_property: Feature {} unbekannt", id);
        }
        self.flush_events();
        self
    }

    /// Kombiniert die Features zu einem Multi-Feature.
    pub fn merge_selected_features<S: AsRef<str>>(&mut self, ids: &[S]) -> &mut Self {
        self.batched(|draw| {
            use_cases::merge_features(&mut draw.store, ids);
        })
    }

    /// Zerlegt Multi-Features in Einzel-Features.
    pub fn split_selected_features<S: AsRef<str>>(&mut self, ids: &[S]) -> &mut Self {
        self.batched(|draw| {
            use_cases::split_features(&mut draw.store, ids);
        })
    }

    // ── Modi ────────────────────────────────────────────────────

    /// Wechselt den Modus (mit Guards, siehe [`ModeController::change_mode`]).
    pub fn change_mode(&mut self, mode: Mode) -> Result<&mut Self> {
        let result = self.enter_mode(mode);
        self.flush_events();
        result.map(|_| self)
    }

    /// Löscht im aktiven Modus das Selektierte.
    pub fn trash(&mut self) -> &mut Self {
        self.batched(|draw| {
            let next = draw
                .mode_handler
                .trash(draw.modes.current(), &mut draw.store);
            if let Some(mode) = next {
                if let Err(e) = draw.enter_mode(mode) {
                    log::warn!("Folgemodus nach trash nicht möglich: {}", e);
                }
            }
        })
    }

    // ── Intern ──────────────────────────────────────────────────

    fn hint_options(&self) -> HintOptions {
        HintOptions {
            check_winding: self.options.validate_winding,
        }
    }

    /// Führt `f` in einem Render-Batch aus und liefert danach die Events aus.
    fn batched(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        let batch = self.store.create_render_batch();
        f(self);
        self.escape_orphaned_direct_select();
        self.store.close_render_batch(batch);
        self.flush_events();
        self
    }

    /// Löschen innerhalb eines offenen Batches inkl. Modus-Rückfall.
    fn delete_in_batch<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.store.delete(ids);
        if !self.escape_orphaned_direct_select() {
            self.store.render();
        }
    }

    /// Direct-Select ohne selektiertes Feature ist ungültig → Simple-Select.
    fn escape_orphaned_direct_select(&mut self) -> bool {
        if self.modes.name() != ModeName::DirectSelect || !self.store.get_selected_ids().is_empty()
        {
            return false;
        }
        log::debug!("direct_select ohne Ziel, wechsle zu simple_select");
        if let Err(e) = self.enter_mode(Mode::simple_select()) {
            log::warn!("Rückfall auf simple_select fehlgeschlagen: {}", e);
        }
        true
    }

    fn enter_mode(&mut self, mode: Mode) -> Result<ModeTransition> {
        let transition = self.modes.change_mode(mode, &mut self.store)?;
        if let ModeTransition::Entered { .. } = transition {
            self.mode_handler
                .on_mode_change(self.modes.current(), &mut self.store);
        }
        Ok(transition)
    }

    fn flush_events(&mut self) {
        for event in self.store.take_events() {
            self.event_sink.emit(&event);
        }
    }
}
