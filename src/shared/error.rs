//! Fehler-Taxonomie des Editier-Kerns.
//!
//! Alle Fehler werden synchron an den Aufrufer der öffentlichen API
//! weitergereicht. No-op-Fälle (Merge/Split, Modus-Guards) sind bewusst
//! keine Fehler.

/// Fehler der öffentlichen Draw-API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// GeoJSON ist strukturell nicht wohlgeformt (erste Verletzung).
    #[error("Ungültiges GeoJSON: {message}")]
    Validation { message: String },

    /// Feature ohne Geometrie (`geometry: null`).
    #[error("Feature {id} hat keine Geometrie")]
    InvalidGeometry { id: String },

    /// Geometrie-Typ gehört nicht zu den sechs unterstützten Varianten.
    #[error("Nicht unterstützter Geometrie-Typ: {type_name}")]
    InvalidType { type_name: String },

    /// `set` wurde nicht mit einer FeatureCollection aufgerufen.
    #[error("Ungültige FeatureCollection: {reason}")]
    InvalidCollection { reason: String },

    /// Modus-Optionen passen nicht zum angeforderten Modus.
    #[error("Ungültige Modus-Optionen: {reason}")]
    InvalidModeOptions { reason: String },

    /// Koordinatenpfad adressiert keinen Vertex des Features.
    #[error("Ungültiger Koordinatenpfad: {path}")]
    InvalidCoordinatePath { path: String },
}

impl DrawError {
    /// Kurzform für einen Validierungsfehler.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Ergebnis-Typ der Draw-API.
pub type Result<T> = std::result::Result<T, DrawError>;
