//! Domain layer: entities and annotation logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod annotate;
pub mod entities;
pub mod error;
pub mod lookup;
pub mod render;

pub use annotate::{
    annotate, annotate_evolves, annotate_lineage, AnnotateOptions, AnnotationPolicy,
    AnnotationSummary, EvolvesDepth, UnmatchedNodes, EVOLVED_FROM_FIELD, EVOLVES_FIELD,
    EVOLVES_TO_FIELD,
};
pub use entities::{record_file_name, EntityRecord, EntityRef, EvolutionNode, RECORD_EXTENSION};
pub use error::DomainError;
pub use lookup::EntityTable;
pub use render::render_forest;
