//! dexlink: annotate creature records with evolution links.
//!
//! Layers, innermost first:
//! - `domain`: records, lookup table, annotation policies, forest rendering
//! - `application`: loading, JSON output and the annotation service
//! - `infrastructure`: filesystem seam and service wiring
//! - `cli`: argument parsing, dispatch and exit codes

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
