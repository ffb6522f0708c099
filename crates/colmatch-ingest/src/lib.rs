//! Loading of source tables, target data dictionaries and ground-truth mappings.

pub mod csv_frame;
pub mod dictionary;
pub mod groundtruth;

pub use csv_frame::{read_csv_frame, read_csv_str};
pub use dictionary::{load_target_schema, parse_target_schema, schema_frame};
pub use groundtruth::{GroundTruthPair, load_groundtruth, parse_groundtruth};
