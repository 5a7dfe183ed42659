//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält Typen, die zwischen `core`, `geojson` und `app` geteilt werden,
//! um direkte Abhängigkeiten zu vermeiden.

mod error;
mod events;
mod mode_name;
pub mod options;

pub use error::{DrawError, Result};
pub use events::{DrawEvent, UpdateAction};
pub use mode_name::ModeName;
pub use options::DrawOptions;
pub use options::CLICK_BUFFER;
