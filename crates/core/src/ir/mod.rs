//! Intermediate representations and lowering passes.
//!
//! The manifest is lowered in stages: [`normalize`] turns raw descriptors
//! into the [`binding`] IR (names resolved, calls planned, types mapped,
//! docs rendered), [`codegen`] turns that into per-file TypeScript ASTs
//! ([`types`]), and [`emit`] renders the ASTs to source text.

pub mod binding;
pub mod codegen;
pub mod docstring;
pub mod emit;
pub mod naming;
pub mod plan;
pub mod typemap;
pub mod types;
pub mod utils;

pub mod normalize;
