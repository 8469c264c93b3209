//! TypeScript AST for binding emission.
//!
//! This module defines the TypeScript representation the codegen layer
//! builds and the `Emit` trait renders:
//! - `TsType`: type expressions (primitives, arrays, tuples, unions, ...)
//! - `TsExpr`: the small expression subset wrapper bodies need
//! - `TsFunction` / `TsTypeDef` / `TsConst` / `TsModule`: module items

/// TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, void, unknown.
    Primitive(TsPrimitive),
    /// Array type: `T[]`.
    Array(Box<TsType>),
    /// Fixed-arity tuple type: `[A, B]`.
    Tuple(Vec<TsType>),
    /// Union type: `A | B | C`.
    Union(Vec<TsType>),
    /// Intersection type: `A & B`.
    Intersection(Vec<TsType>),
    /// Inline object type: `{ foo: string; readonly bar: number }`.
    Object(Vec<TsProp>),
    /// Record type: `Record<K, V>`.
    Record {
        /// Key type.
        key: Box<TsType>,
        /// Value type.
        value: Box<TsType>,
    },
    /// Parametrized named type: `Set<T>`, `Promise<T>`.
    Generic {
        /// Type name.
        name: String,
        /// Type arguments.
        args: Vec<TsType>,
    },
    /// Function type: `(arg0: T0, arg1: T1) => R`.
    Function {
        /// Parameter types, named positionally. Ignored when `variadic`.
        params: Vec<TsType>,
        /// Return type.
        ret: Box<TsType>,
        /// Unknown arity: `(...args: unknown[]) => R`.
        variadic: bool,
    },
    /// Literal type: `"foo"`, `42`, `true`.
    Literal(TsLiteral),
    /// Named type reference.
    Ref(String),
}

/// TypeScript primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Void,
    Unknown,
}

/// Object property definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property name.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Emits a trailing `?`.
    pub optional: bool,
    /// Emits a `readonly` modifier.
    pub readonly: bool,
}

/// TypeScript literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Null,
}

/// TypeScript expression (the subset wrapper bodies need).
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Identifier: `foo`.
    Ident(String),
    /// Literal value: `"bar"`, `42`.
    Literal(TsLiteral),
    /// Function call: `foo(a, b)`.
    Call {
        /// Called expression.
        callee: Box<TsExpr>,
        /// Arguments.
        args: Vec<TsExpr>,
    },
    /// Member access: `foo.bar`.
    Member {
        /// Object expression.
        object: Box<TsExpr>,
        /// Property name.
        prop: String,
    },
    /// Array literal: `[a, b, c]`.
    Array(Vec<TsExpr>),
    /// Spread: `...extra`.
    Spread(Box<TsExpr>),
    /// Await expression.
    Await(Box<TsExpr>),
    /// Type cast: `expr as T`.
    Cast {
        /// Expression being cast.
        expr: Box<TsExpr>,
        /// Target type.
        ty: TsType,
    },
    /// Raw code that does not fit the AST.
    Raw(String),
}

/// Statement in a function body.
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// `const name = init;`
    ConstDecl {
        /// Binding pattern (may be a destructuring pattern).
        pattern: String,
        /// Initializer.
        init: TsExpr,
    },
    /// Return statement.
    Return(Option<TsExpr>),
    /// Raw code block.
    Raw(String),
}

/// Function parameter.
#[derive(Debug, Clone)]
pub struct TsParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type annotation.
    pub ty: Option<TsType>,
    /// Emits a trailing `?`.
    pub optional: bool,
}

/// Type definition kind.
#[derive(Debug, Clone)]
pub enum TypeDefKind {
    /// `export interface Name extends Base { ... }`
    Interface {
        /// Extended interfaces.
        extends: Vec<String>,
        /// Declared properties.
        properties: Vec<TsProp>,
        /// Optional `[key: string]: T` index signature value type.
        index_signature: Option<TsType>,
    },
    /// `export type Name = ...;`
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
}

/// Type definition.
#[derive(Debug, Clone)]
pub struct TsTypeDef {
    /// Type name.
    pub name: String,
    /// Kind and payload.
    pub kind: TypeDefKind,
    /// Pre-rendered doc comment, including delimiters.
    pub doc: Option<String>,
}

/// Exported module-level constant.
#[derive(Debug, Clone)]
pub struct TsConst {
    /// Constant name.
    pub name: String,
    /// Optional type annotation.
    pub ty: Option<TsType>,
    /// Initializer.
    pub value: TsExpr,
}

/// Function definition.
#[derive(Debug, Clone)]
pub struct TsFunction {
    /// Function name.
    pub name: String,
    /// Generic type parameters.
    pub type_params: Vec<String>,
    /// Parameters.
    pub params: Vec<TsParam>,
    /// Return type annotation.
    pub return_type: Option<TsType>,
    /// Body statements.
    pub body: Vec<TsStmt>,
    /// Emits `async`.
    pub is_async: bool,
    /// Pre-rendered doc comment, including delimiters.
    pub doc: Option<String>,
}

/// Import statement.
#[derive(Debug, Clone)]
pub struct TsImport {
    /// Items to import.
    pub items: Vec<ImportItem>,
    /// Module path.
    pub from: String,
    /// Whether this is a type-only import.
    pub type_only: bool,
}

/// Import item.
#[derive(Debug, Clone)]
pub struct ImportItem {
    /// Imported name.
    pub name: String,
    /// Optional alias.
    pub alias: Option<String>,
}

/// Namespace re-export: `export * as name from "./name";`
#[derive(Debug, Clone)]
pub struct TsReexport {
    /// Exported namespace alias.
    pub alias: String,
    /// Module path.
    pub from: String,
}

/// Complete TypeScript module (one output file).
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// File banner comment, emitted verbatim before everything else.
    pub header: Option<String>,
    /// Imports.
    pub imports: Vec<TsImport>,
    /// Namespace re-exports.
    pub reexports: Vec<TsReexport>,
    /// Exported constants (metadata surface).
    pub consts: Vec<TsConst>,
    /// Type definitions.
    pub types: Vec<TsTypeDef>,
    /// Functions.
    pub functions: Vec<TsFunction>,
}

impl TsType {
    /// `unknown`.
    pub fn unknown() -> Self {
        TsType::Primitive(TsPrimitive::Unknown)
    }

    /// `Promise<T>`.
    pub fn promise(inner: TsType) -> Self {
        TsType::Generic {
            name: "Promise".to_string(),
            args: vec![inner],
        }
    }

    /// Collect every `Ref`/`Generic` head name mentioned in this type.
    pub fn collect_refs(&self, out: &mut std::collections::BTreeSet<String>) {
        match self {
            TsType::Primitive(_) | TsType::Literal(_) => {}
            TsType::Ref(name) => {
                out.insert(name.clone());
            }
            TsType::Array(inner) => inner.collect_refs(out),
            TsType::Tuple(items) | TsType::Union(items) | TsType::Intersection(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            TsType::Object(props) => {
                for prop in props {
                    prop.ty.collect_refs(out);
                }
            }
            TsType::Record { key, value } => {
                key.collect_refs(out);
                value.collect_refs(out);
            }
            TsType::Generic { name, args } => {
                out.insert(name.clone());
                for arg in args {
                    arg.collect_refs(out);
                }
            }
            TsType::Function { params, ret, .. } => {
                for param in params {
                    param.collect_refs(out);
                }
                ret.collect_refs(out);
            }
        }
    }
}
