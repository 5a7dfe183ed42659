//! Interaktionsmodi und Mode-Controller (Zustandsautomat).
//!
//! Es gibt immer genau einen aktiven Modus. Übergänge laufen über
//! [`ModeController::change_mode`]; die Guards für Simple-/Direct-Select
//! verhindern unnötiges Teardown/Setup.

use crate::core::{FeatureStore, GeometryType, SelectedCoordinate};
use crate::shared::{DrawError, DrawEvent, ModeName, Result};
use std::collections::HashSet;

/// Aktiver Modus inklusive modusspezifischer Optionen.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Features selektieren; `feature_ids` = vorselektierte Features
    SimpleSelect { feature_ids: Vec<String> },
    /// Vertices genau eines Features bearbeiten
    DirectSelect {
        feature_id: String,
        /// Optional vorselektierter Vertex
        coord_path: Option<String>,
    },
    DrawPoint,
    DrawLineString,
    DrawPolygon,
    /// Keine Interaktion
    Static,
}

/// Ungetypte Modus-Optionen für Aufrufer, die Modi per Namen anfordern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeOptions {
    pub feature_ids: Vec<String>,
    pub feature_id: Option<String>,
    pub coord_path: Option<String>,
}

impl Mode {
    /// Simple-Select ohne Vorselektion.
    pub fn simple_select() -> Self {
        Mode::SimpleSelect {
            feature_ids: Vec::new(),
        }
    }

    /// Direct-Select auf ein Feature ohne Vertex-Selektion.
    pub fn direct_select(feature_id: impl Into<String>) -> Self {
        Mode::DirectSelect {
            feature_id: feature_id.into(),
            coord_path: None,
        }
    }

    /// Baut einen Modus aus stabilem Namen und Optionen.
    pub fn with_options(name: ModeName, options: ModeOptions) -> Result<Self> {
        let mode = match name {
            ModeName::SimpleSelect => Mode::SimpleSelect {
                feature_ids: options.feature_ids,
            },
            ModeName::DirectSelect => {
                let feature_id = options.feature_id.ok_or_else(|| DrawError::InvalidModeOptions {
                    reason: "direct_select braucht eine feature_id".into(),
                })?;
                Mode::DirectSelect {
                    feature_id,
                    coord_path: options.coord_path,
                }
            }
            ModeName::DrawPoint => Mode::DrawPoint,
            ModeName::DrawLineString => Mode::DrawLineString,
            ModeName::DrawPolygon => Mode::DrawPolygon,
            ModeName::Static => Mode::Static,
        };
        Ok(mode)
    }

    /// Stabiler Name dieses Modus.
    pub fn name(&self) -> ModeName {
        match self {
            Mode::SimpleSelect { .. } => ModeName::SimpleSelect,
            Mode::DirectSelect { .. } => ModeName::DirectSelect,
            Mode::DrawPoint => ModeName::DrawPoint,
            Mode::DrawLineString => ModeName::DrawLineString,
            Mode::DrawPolygon => ModeName::DrawPolygon,
            Mode::Static => ModeName::Static,
        }
    }
}

/// Ergebnis eines Moduswechsels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Guard hat gegriffen, nichts passiert
    Unchanged,
    /// Simple-Select blieb aktiv, nur die Selektion wurde ersetzt
    SelectionUpdated,
    /// Vollständiger Übergang; der Mode-Handler muss benachrichtigt werden
    Entered { previous: ModeName },
}

/// Zustandsautomat über die Interaktionsmodi.
#[derive(Debug, Clone)]
pub struct ModeController {
    current: Mode,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(Mode::simple_select())
    }
}

impl ModeController {
    pub fn new(initial: Mode) -> Self {
        Self { current: initial }
    }

    /// Startmodus für einen konfigurierten Modusnamen.
    ///
    /// Direct-Select braucht ein Ziel-Feature und fällt daher auf Simple-Select zurück.
    pub fn for_default_mode(name: ModeName) -> Self {
        let mode = Mode::with_options(name, ModeOptions::default()).unwrap_or_else(|e| {
            log::warn!("Startmodus {} nicht möglich ({}), nutze simple_select", name, e);
            Mode::simple_select()
        });
        Self::new(mode)
    }

    pub fn current(&self) -> &Mode {
        &self.current
    }

    pub fn name(&self) -> ModeName {
        self.current.name()
    }

    /// Wechselt den Modus unter Anwendung der Guards.
    ///
    /// - Simple-Select → Simple-Select mit gleicher Selektion (als Menge): no-op
    /// - Simple-Select → Simple-Select mit anderer Selektion: Selektion still
    ///   ersetzen und rendern, kein Teardown/Setup
    /// - Direct-Select → Direct-Select auf dasselbe Feature: no-op
    /// - sonst: Setup des neuen Modus, `draw.modechange` einreihen
    ///
    /// Bei Fehlern im Setup bleiben Modus und Store unverändert.
    pub fn change_mode(&mut self, mode: Mode, store: &mut FeatureStore) -> Result<ModeTransition> {
        match (&self.current, &mode) {
            (Mode::SimpleSelect { .. }, Mode::SimpleSelect { feature_ids }) => {
                let requested: HashSet<&str> = feature_ids.iter().map(String::as_str).collect();
                let selected = store.get_selected_ids();
                let current: HashSet<&str> = selected.iter().map(String::as_str).collect();
                if requested == current {
                    log::debug!("simple_select: Selektion unverändert, kein Wechsel");
                    return Ok(ModeTransition::Unchanged);
                }
                store.set_selected_silently(feature_ids);
                store.render();
                self.current = Mode::SimpleSelect {
                    feature_ids: store.get_selected_ids(),
                };
                return Ok(ModeTransition::SelectionUpdated);
            }
            (
                Mode::DirectSelect {
                    feature_id: active, ..
                },
                Mode::DirectSelect { feature_id, .. },
            ) if active == feature_id => {
                log::debug!("direct_select: Feature {} bereits aktiv", feature_id);
                return Ok(ModeTransition::Unchanged);
            }
            _ => {}
        }

        setup(&mode, store)?;
        let previous = self.current.name();
        self.current = mode;
        store.queue_event(DrawEvent::ModeChange {
            mode: self.current.name(),
        });
        log::info!("Modus: {} → {}", previous, self.current.name());
        Ok(ModeTransition::Entered { previous })
    }
}

/// Prüft die Modus-Optionen und wendet die Start-Selektion auf den Store an.
fn setup(mode: &Mode, store: &mut FeatureStore) -> Result<()> {
    match mode {
        Mode::SimpleSelect { feature_ids } => {
            store.clear_selected_coordinates();
            store.set_selected(feature_ids);
        }
        Mode::DirectSelect {
            feature_id,
            coord_path,
        } => {
            let feature = store
                .get(feature_id)
                .ok_or_else(|| DrawError::InvalidModeOptions {
                    reason: format!("Feature {feature_id} existiert nicht"),
                })?;
            if feature.geometry_type() == GeometryType::Point {
                return Err(DrawError::InvalidModeOptions {
                    reason: "direct_select unterstützt keine Point-Features".into(),
                });
            }
            if let Some(path) = coord_path {
                feature.get_coordinate(path)?;
            }

            store.set_selected(&[feature_id]);
            match coord_path {
                Some(path) => store.set_selected_coordinates(vec![SelectedCoordinate::new(
                    feature_id.clone(),
                    path.clone(),
                )]),
                None => store.clear_selected_coordinates(),
            }
        }
        Mode::DrawPoint | Mode::DrawLineString | Mode::DrawPolygon => store.clear_selected(),
        Mode::Static => {}
    }
    Ok(())
}
