//! Core engine for generating typed TypeScript bindings to Python
//! libraries.
//!
//! Input is a JSON manifest produced by a Python introspection probe
//! (functions, classes, parameter kinds, type annotations, docstrings).
//! Output is a deterministic tree of TypeScript modules whose async wrapper
//! functions delegate every actual call to an external runtime dispatcher.
//!
//! The crate is organized as a pipeline:
//!
//! - [`manifest`]: serde model of the probe's JSON
//! - [`ir`]: lowering passes (normalize, plan, name, document, map types)
//!   and TypeScript AST emission
//! - [`layout`]: deterministic output-tree planning
//! - [`writer`]: idempotent atomic writes
//! - [`generator`]: the end-to-end [`generate`] entry point

pub mod error;
pub mod generator;
pub mod ir;
pub mod layout;
pub mod manifest;
pub mod writer;

pub use error::Error;
pub use generator::{GenerateConfig, GenerateReport, generate};
pub use manifest::Manifest;
