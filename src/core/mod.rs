//! Core-Domänentypen: Geometrien, Features, Feature-Store, Spatial-Index.

mod coord_path;
/// Feature-Modell
///
/// Ein Feature besteht aus ID, Properties und einer typisierten Geometrie.
pub mod feature;
pub mod geometry;
pub mod spatial;
pub mod store;

pub use coord_path::parse_path;
pub use feature::{Feature, Properties};
pub use geometry::{Geometry, GeometryType, Position};
pub use spatial::{HitTester, VertexHitTester, VertexIndex};
pub use store::{FeatureStore, NoopRenderSink, RenderBatch, RenderFrame, RenderSink, SelectedCoordinate};
