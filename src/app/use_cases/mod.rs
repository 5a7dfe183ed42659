//! Use-Cases: Operationen auf dem Feature-Store, die mehrere Schritte bündeln.

pub mod ingest;
pub mod merge_split;

pub use ingest::{add_geojson, replace_with_collection};
pub use merge_split::{merge_features, split_features};
