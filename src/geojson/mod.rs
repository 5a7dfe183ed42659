//! GeoJSON-Schicht: strukturelle Prüfung, Normalisierung und Export.

pub mod hint;
pub mod parser;
pub mod writer;

pub use hint::{first_error, hint, HintIssue, HintOptions, IssueLevel};
pub use parser::{check_feature_collection, incoming_features, normalize, IncomingFeature};
pub use writer::{feature_collection, feature_collection_from_values};
