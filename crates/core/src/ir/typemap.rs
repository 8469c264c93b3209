//! Lowering of probe type descriptors to TypeScript types.
//!
//! The mapping is total: every descriptor, including ones the probe emits
//! that we do not model, lowers to some TypeScript type. Fidelity degrades
//! toward `unknown` rather than failing.

use std::collections::BTreeSet;

use crate::manifest::{LiteralValue, TypeDesc};

use super::types::{TsLiteral, TsPrimitive, TsType};

/// Opaque handle type for class instances the runtime round-trips.
pub const PYHANDLE: &str = "PyHandle";

/// Runtime-provided view of `numpy.ndarray`.
pub const NDARRAY: &str = "NdArray";

/// Runtime-provided view of `pandas.DataFrame`.
pub const DATAFRAME: &str = "DataFrame";

/// Well-known classes that get a richer runtime type than the opaque handle.
fn class_override(module: Option<&str>, name: &str) -> Option<&'static str> {
    match (module, name) {
        (Some("numpy"), "ndarray") => Some(NDARRAY),
        (Some("pandas"), "DataFrame") | (Some("pandas.core.frame"), "DataFrame") => {
            Some(DATAFRAME)
        }
        _ => None,
    }
}

/// Map a type descriptor to a TypeScript type. Never fails.
pub fn map_type(desc: &TypeDesc) -> TsType {
    match desc {
        TypeDesc::Int | TypeDesc::Float => TsType::Primitive(TsPrimitive::Number),
        TypeDesc::String => TsType::Primitive(TsPrimitive::String),
        TypeDesc::Boolean => TsType::Primitive(TsPrimitive::Boolean),
        TypeDesc::Bytes | TypeDesc::Bytearray => TsType::Ref("Uint8Array".to_string()),
        TypeDesc::None => TsType::Primitive(TsPrimitive::Null),
        TypeDesc::Any | TypeDesc::Generic | TypeDesc::Other => TsType::unknown(),
        TypeDesc::List { element_type } => {
            let inner = element_type.as_deref().map_or_else(TsType::unknown, map_type);
            TsType::Array(Box::new(inner))
        }
        TypeDesc::Dict { key_type, value_type } => {
            let key = key_type.as_deref().map_or_else(TsType::unknown, map_type);
            // Record keys must be string or number in TypeScript.
            let key = match key {
                k @ TsType::Primitive(TsPrimitive::String | TsPrimitive::Number) => k,
                _ => TsType::Primitive(TsPrimitive::String),
            };
            let value = value_type.as_deref().map_or_else(TsType::unknown, map_type);
            TsType::Record { key: Box::new(key), value: Box::new(value) }
        }
        TypeDesc::Tuple { element_types, variadic } => {
            if *variadic {
                let inner = element_types.first().map_or_else(TsType::unknown, map_type);
                TsType::Array(Box::new(inner))
            } else if element_types.is_empty() {
                TsType::Array(Box::new(TsType::unknown()))
            } else {
                TsType::Tuple(element_types.iter().map(map_type).collect())
            }
        }
        TypeDesc::Set { element_type } | TypeDesc::Frozenset { element_type } => {
            let inner = element_type.as_deref().map_or_else(TsType::unknown, map_type);
            TsType::Generic { name: "Set".to_string(), args: vec![inner] }
        }
        TypeDesc::Union { types } => map_union(types),
        TypeDesc::Optional { inner_type } => {
            let inner = map_type(inner_type);
            let mut members = flatten_union(inner);
            if !members.contains(&TsType::Primitive(TsPrimitive::Null)) {
                members.push(TsType::Primitive(TsPrimitive::Null));
            }
            collapse_union(members)
        }
        TypeDesc::Literal { values } => map_literal(values),
        TypeDesc::Callable { parameters, return_type, variadic } => {
            let ret = return_type.as_deref().map_or_else(TsType::unknown, map_type);
            TsType::Function {
                params: if *variadic { Vec::new() } else { parameters.iter().map(map_type).collect() },
                ret: Box::new(ret),
                variadic: *variadic,
            }
        }
        TypeDesc::Typevar { name, constraints } => {
            if constraints.is_empty() {
                TsType::Ref(name.clone())
            } else {
                map_union(constraints)
            }
        }
        TypeDesc::Class { name, module } => {
            match class_override(module.as_deref(), name) {
                Some(known) => TsType::Ref(known.to_string()),
                None => TsType::Ref(PYHANDLE.to_string()),
            }
        }
    }
}

fn map_union(members: &[TypeDesc]) -> TsType {
    if members.is_empty() {
        return TsType::unknown();
    }
    let mut flat = Vec::new();
    for member in members {
        flat.extend(flatten_union(map_type(member)));
    }
    collapse_union(flat)
}

/// A mapped member that is itself a union contributes its members.
fn flatten_union(ty: TsType) -> Vec<TsType> {
    match ty {
        TsType::Union(members) => members,
        other => vec![other],
    }
}

/// Dedupe members, keeping first-occurrence order; `unknown` absorbs the
/// whole union.
fn collapse_union(members: Vec<TsType>) -> TsType {
    if members.contains(&TsType::unknown()) {
        return TsType::unknown();
    }
    let mut seen = Vec::new();
    for member in members {
        if !seen.contains(&member) {
            seen.push(member);
        }
    }
    match seen.len() {
        0 => TsType::unknown(),
        1 => seen.into_iter().next().unwrap_or_else(TsType::unknown),
        _ => TsType::Union(seen),
    }
}

/// `Literal[...]` maps to a union of literal types when every value is a
/// string, int, or bool; floats degrade to plain `number`, a `None` member
/// contributes `null`, and an empty literal degrades to `unknown`.
fn map_literal(values: &[LiteralValue]) -> TsType {
    if values.is_empty() {
        return TsType::unknown();
    }
    let mut members = Vec::new();
    for value in values {
        let ty = match value {
            LiteralValue::String(s) => TsType::Literal(TsLiteral::String(s.clone())),
            LiteralValue::Int(i) => TsType::Literal(TsLiteral::Int(*i)),
            LiteralValue::Bool(b) => TsType::Literal(TsLiteral::Bool(*b)),
            LiteralValue::Float(_) => TsType::Primitive(TsPrimitive::Number),
            LiteralValue::Null => TsType::Primitive(TsPrimitive::Null),
        };
        members.push(ty);
    }
    collapse_union(members)
}

/// Collect the names of unconstrained TypeVars reachable from `desc`.
///
/// The planner turns these into per-function type parameters so a
/// `def first(items: list[T]) -> T` binding emits `first<T>(...)`.
pub fn collect_type_params(desc: &TypeDesc, out: &mut BTreeSet<String>) {
    match desc {
        TypeDesc::Typevar { name, constraints } => {
            if constraints.is_empty() {
                out.insert(name.clone());
            } else {
                for c in constraints {
                    collect_type_params(c, out);
                }
            }
        }
        TypeDesc::List { element_type }
        | TypeDesc::Set { element_type }
        | TypeDesc::Frozenset { element_type } => {
            if let Some(inner) = element_type {
                collect_type_params(inner, out);
            }
        }
        TypeDesc::Dict { key_type, value_type } => {
            if let Some(k) = key_type {
                collect_type_params(k, out);
            }
            if let Some(v) = value_type {
                collect_type_params(v, out);
            }
        }
        TypeDesc::Tuple { element_types, .. } => {
            for t in element_types {
                collect_type_params(t, out);
            }
        }
        TypeDesc::Union { types } => {
            for t in types {
                collect_type_params(t, out);
            }
        }
        TypeDesc::Optional { inner_type } => collect_type_params(inner_type, out),
        TypeDesc::Callable { parameters, return_type, .. } => {
            for p in parameters {
                collect_type_params(p, out);
            }
            if let Some(r) = return_type {
                collect_type_params(r, out);
            }
        }
        TypeDesc::Int
        | TypeDesc::Float
        | TypeDesc::String
        | TypeDesc::Boolean
        | TypeDesc::Bytes
        | TypeDesc::Bytearray
        | TypeDesc::None
        | TypeDesc::Any
        | TypeDesc::Literal { .. }
        | TypeDesc::Class { .. }
        | TypeDesc::Generic
        | TypeDesc::Other => {}
    }
}
