//! Domain IR for generated bindings.
//!
//! Normalization lowers the raw manifest into these structures: every name
//! is resolved, every type mapped, every call planned, every doc rendered.
//! Codegen and layout consume this IR without looking back at the manifest.

use super::plan::CallPlan;
use super::types::TsType;

/// A whole library, ready for layout and codegen.
#[derive(Debug)]
pub struct LibraryIR {
    /// Importable source module path of the library (e.g. "mylib").
    pub library: String,
    /// Source library version, when the probe found one.
    pub version: Option<String>,
    /// Modules sorted by namespace path; the root namespace comes first.
    pub modules: Vec<ModuleIR>,
}

/// One source namespace, which becomes one directory with an `index.ts`.
#[derive(Debug)]
pub struct ModuleIR {
    /// Namespace segments relative to the library root; empty for the root.
    pub namespace: Vec<String>,
    /// Fully dotted source module path (library + namespace).
    pub py_path: String,
    /// Rendered TSDoc block for the namespace, when it had a docstring.
    pub doc: Option<String>,
    /// Free functions, in resolved-name order.
    pub functions: Vec<FunctionBinding>,
    /// Classes, sorted by source name.
    pub classes: Vec<ClassBinding>,
}

/// A wrapped free function or method.
#[derive(Debug)]
pub struct FunctionBinding {
    /// Resolved TypeScript identifier.
    pub ident: String,
    /// Original source name, used in the runtime call.
    pub source: String,
    /// Fully dotted source path, for docs.
    pub qualified: String,
    /// Planned call shape.
    pub plan: CallPlan,
    /// Mapped return type (pre-`Promise` wrapping).
    pub ret: TsType,
    /// Type parameters from unconstrained TypeVars in the signature.
    pub type_params: Vec<String>,
    /// Rendered TSDoc block.
    pub doc: String,
}

/// A wrapped class: one sibling file with a branded handle type.
#[derive(Debug)]
pub struct ClassBinding {
    /// TypeScript type name (sanitized source class name).
    pub name: String,
    /// Original source class name.
    pub source: String,
    /// Fully dotted source path (e.g. "mylib.geometry.Point").
    pub qualified: String,
    /// Rendered TSDoc block for the handle type.
    pub doc: String,
    /// Constructor wrapper; synthesized with an empty plan when the class
    /// has no `__init__`.
    pub constructor: ConstructorBinding,
    /// Instance methods, in resolved-name order.
    pub methods: Vec<FunctionBinding>,
    /// Attribute accessors, in resolved-name order.
    pub attrs: Vec<AttrBinding>,
}

/// The `construct` wrapper of a class.
#[derive(Debug)]
pub struct ConstructorBinding {
    /// Planned call shape, `self` already stripped.
    pub plan: CallPlan,
    /// Rendered TSDoc block.
    pub doc: String,
}

/// An async attribute read accessor.
#[derive(Debug)]
pub struct AttrBinding {
    /// Resolved TypeScript identifier.
    pub ident: String,
    /// Original source attribute name, used in the runtime call.
    pub source: String,
    /// Mapped attribute type.
    pub ty: TsType,
    /// Rendered TSDoc block.
    pub doc: String,
}
