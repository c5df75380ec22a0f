//! PipeQL Analyzer - EXPLAIN plan parsing
//!
//! This crate provides functionality for:
//! - Parsing PostgreSQL EXPLAIN output (text and JSON) into one canonical operator tree
//! - Exposing that tree to renderers and tree views through a stable node interface

pub mod explain;

pub use explain::*;
