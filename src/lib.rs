//! Geo-Draw Editier-Kern.
//! Feature-Store, Modi und GeoJSON-Schnittstelle als Library für Hosts und Tests.

pub mod app;
pub mod core;
pub mod geojson;
pub mod shared;

pub use app::{
    Collaborators, DefaultModeHandler, Draw, EventSink, Mode, ModeHandler, ModeOptions,
};
pub use core::{
    Feature, FeatureStore, Geometry, GeometryType, HitTester, Properties, RenderFrame, RenderSink,
    VertexHitTester,
};
pub use shared::{DrawError, DrawEvent, DrawOptions, ModeName, Result, UpdateAction};
