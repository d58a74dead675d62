//! ormjoin - join planning for a compile-time ORM code generator
//!
//! This crate turns static schema metadata into the set of legal join shapes
//! a code emitter can expose as strongly-typed accessors:
//! - Schema loading from YAML table definitions
//! - Enumeration of every connected table combination up to a width bound
//! - Navigation edges between tables and joined tables
//! - A serialisable plan handed to the emission pass

pub mod utils;

pub mod config;
pub mod generation;
pub mod join_planner;
pub mod schema_catalog;
