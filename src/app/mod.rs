//! Application-Layer: Modi, Mode-Controller, Use-Cases und API-Fassade.

pub mod draw;
pub mod events;
pub mod mode;
pub mod mode_handler;
pub mod use_cases;

pub use draw::{Collaborators, Draw};
pub use events::{EventSink, LoggingEventSink, NoopEventSink};
pub use mode::{Mode, ModeController, ModeOptions, ModeTransition};
pub use mode_handler::{DefaultModeHandler, ModeHandler};
