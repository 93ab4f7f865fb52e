pub mod aggregate;
pub mod config;
pub mod domain;
pub mod errors;
pub mod explode;
pub mod reconcile;

pub use aggregate::{build_length_list, build_parts_list, LengthRequirement, PartsRequirement};
pub use domain::item::ItemId;
pub use domain::path::{DerivationPath, PathStep, TraceEntry};
pub use domain::row::{classify_fields, is_length_item, BomRow, Classification, ClassifiedRow};
pub use errors::DomainError;
pub use explode::{explode, BomTable, ExplodeOptions, Explosion};
pub use reconcile::{
    reconcile, ComparisonRow, ComparisonStatus, TargetRow, DEFAULT_TOLERANCE,
};
