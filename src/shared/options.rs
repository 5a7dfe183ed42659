//! Zentrale Konfiguration für den Editier-Kern.
//!
//! `DrawOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use super::ModeName;
use serde::{Deserialize, Serialize};

// ── Hit-Test ────────────────────────────────────────────────────────

/// Standard-Klickradius (Koordinateneinheiten) für den Vertex-Hit-Test.
pub const CLICK_BUFFER: f64 = 2.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Draw-Optionen.
/// Wird typischerweise als `geo_draw.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Modus, in dem der Editor startet
    #[serde(default)]
    pub default_mode: ModeName,
    /// Radius für `get_feature_ids_at` (Koordinateneinheiten)
    #[serde(default = "default_click_buffer")]
    pub click_buffer: f64,
    /// Präfix für generierte Feature-IDs
    #[serde(default)]
    pub id_prefix: String,
    /// Informative Hinweise zur Ring-Orientierung erzeugen (nie fatal)
    #[serde(default = "default_validate_winding")]
    pub validate_winding: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            default_mode: ModeName::SimpleSelect,
            click_buffer: CLICK_BUFFER,
            id_prefix: String::new(),
            validate_winding: true,
        }
    }
}

/// Serde-Default für `click_buffer` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_click_buffer() -> f64 {
    CLICK_BUFFER
}

fn default_validate_winding() -> bool {
    true
}

impl DrawOptions {
    /// Standardpfad der Optionen-Datei: `geo_draw.toml` neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("geo-draw"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("geo_draw.toml")
    }

    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let opts: DrawOptions = toml::from_str("id_prefix = \"f-\"").expect("TOML gültig");
        assert_eq!(opts.id_prefix, "f-");
        assert_eq!(opts.default_mode, ModeName::SimpleSelect);
        assert_eq!(opts.click_buffer, CLICK_BUFFER);
        assert!(opts.validate_winding);
    }

    #[test]
    fn test_default_mode_uses_stable_identifier() {
        let opts: DrawOptions =
            toml::from_str("default_mode = \"static\"").expect("TOML gültig");
        assert_eq!(opts.default_mode, ModeName::Static);

        let text = toml::to_string_pretty(&DrawOptions::default()).expect("serialisierbar");
        assert!(text.contains("default_mode = \"simple_select\""));
    }

    #[test]
    fn test_load_from_missing_file_falls_back_to_defaults() {
        let opts = DrawOptions::load_from_file(std::path::Path::new(
            "/nonexistent/geo_draw_options.toml",
        ));
        assert_eq!(opts, DrawOptions::default());
    }
}
