//! Modus-Implementierungen hinter der Controller-Schnittstelle.
//!
//! Der Handler wird nach jedem vollständigen Moduswechsel benachrichtigt und
//! führt `trash` für den aktiven Modus aus. Er besitzt seine eigene
//! Render-Planung.

use super::mode::Mode;
use crate::core::FeatureStore;
use crate::shared::{DrawEvent, UpdateAction};

/// Verhalten der einzelnen Modi.
pub trait ModeHandler {
    /// Wird nach einem vollständigen Übergang in `mode` aufgerufen.
    fn on_mode_change(&mut self, mode: &Mode, store: &mut FeatureStore);

    /// Löscht im aktiven Modus das Selektierte.
    ///
    /// Gibt optional einen Folgemodus zurück, den der Aufrufer aktiviert.
    fn trash(&mut self, mode: &Mode, store: &mut FeatureStore) -> Option<Mode>;
}

/// Standardverhalten ohne Zeiger-Interaktion.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultModeHandler;

impl ModeHandler for DefaultModeHandler {
    fn on_mode_change(&mut self, mode: &Mode, store: &mut FeatureStore) {
        log::debug!("Modus aktiv: {}", mode.name());
        store.render();
    }

    fn trash(&mut self, mode: &Mode, store: &mut FeatureStore) -> Option<Mode> {
        match mode {
            Mode::SimpleSelect { .. } => {
                trash_selected_features(store);
                None
            }
            Mode::DirectSelect { feature_id, .. } => trash_selected_vertices(store, feature_id),
            mode if mode.name().is_drawing() => {
                // Unfertige Zeichnung verwerfen, ohne draw.delete
                let ids = store.get_selected_ids();
                store.delete(&ids);
                Some(Mode::simple_select())
            }
            _ => None,
        }
    }
}

fn trash_selected_features(store: &mut FeatureStore) {
    let ids = store.get_selected_ids();
    if ids.is_empty() {
        return;
    }
    let removed = store.delete(&ids);
    log::info!("{} Features gelöscht", removed.len());
    store.queue_event(DrawEvent::Delete {
        features: removed.iter().map(|f| f.to_geojson()).collect(),
    });
}

/// Entfernt die selektierten Vertices; wird das Feature dabei ungültig,
/// wird es gelöscht und Simple-Select angefordert.
fn trash_selected_vertices(store: &mut FeatureStore, feature_id: &str) -> Option<Mode> {
    let paths: Vec<String> = store
        .selected_coordinates()
        .iter()
        .filter(|c| c.feature_id == feature_id)
        .map(|c| c.coord_path.clone())
        .collect();
    if paths.is_empty() {
        return None;
    }

    // Pfade beziehen sich alle auf die Geometrie vor dem Entfernen
    store.update_geometry(feature_id, |geometry| {
        if let Err(e) = geometry.remove_coordinates(&paths) {
            log::warn!("Vertices {:?} nicht entfernt: {}", paths, e);
        }
    });
    store.clear_selected_coordinates();

    let feature = store.get(feature_id)?;
    let valid = feature.is_valid();
    let updated = feature.to_geojson();
    store.queue_event(DrawEvent::Update {
        action: UpdateAction::ChangeCoordinates,
        features: vec![updated],
    });

    if valid {
        store.render();
        return None;
    }

    log::info!("Feature {} nach Vertex-Löschung ungültig, wird entfernt", feature_id);
    let removed = store.delete(&[feature_id]);
    store.queue_event(DrawEvent::Delete {
        features: removed.iter().map(|f| f.to_geojson()).collect(),
    });
    Some(Mode::simple_select())
}
