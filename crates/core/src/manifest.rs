//! Introspection manifest structs for serde deserialization.
//!
//! This module defines the JSON manifest produced by the Python probe:
//! module metadata, functions, classes (methods and properties), parameter
//! descriptors with Python parameter kinds, type descriptors, and docstrings.
//! Both the namespaced (v2.1) and the flat (v2.0) manifest layouts are
//! accepted.
//!
//! The manifest is trusted as a syntactic description of the source library.
//! Structural problems (empty names, duplicate parameters) are caught by
//! [`Manifest::validate`] before any file is written.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::Error;

/// Root introspection manifest.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Importable module path of the source library (e.g. "numpy").
    pub module: String,
    /// Manifest format version as emitted by the probe ("2.0" or "2.1").
    #[serde(default)]
    pub version: Option<String>,
    /// Source library version (`__version__`), if the probe found one.
    #[serde(default)]
    pub module_version: Option<String>,
    /// Module-level docstring.
    #[serde(default)]
    pub docstring: Option<Docstring>,
    /// Namespaced layout: relative dotted namespace ("" for the root) to its
    /// symbols. Sorted map so generation order never depends on probe order.
    #[serde(default)]
    pub namespaces: BTreeMap<String, Namespace>,
    /// Flat layout (v2.0): root-namespace functions.
    #[serde(default)]
    pub functions: Vec<FunctionDesc>,
    /// Flat layout (v2.0): root-namespace classes.
    #[serde(default)]
    pub classes: Vec<ClassDesc>,
}

/// Symbols of one namespace.
#[derive(Debug, Default, Deserialize)]
pub struct Namespace {
    /// Namespace docstring, if the probe collected one.
    #[serde(default)]
    pub docstring: Option<Docstring>,
    /// Free functions.
    #[serde(default)]
    pub functions: Vec<FunctionDesc>,
    /// Classes.
    #[serde(default)]
    pub classes: Vec<ClassDesc>,
}

/// A function or method descriptor.
#[derive(Debug, Deserialize)]
pub struct FunctionDesc {
    /// Source name.
    pub name: String,
    /// Ordered parameters, including `self` for methods.
    #[serde(default)]
    pub parameters: Vec<ParameterDesc>,
    /// Return type annotation, if any.
    #[serde(default)]
    pub return_type: Option<TypeDesc>,
    /// Docstring, raw or pre-parsed.
    #[serde(default)]
    pub docstring: Option<Docstring>,
}

/// A class descriptor with an already-flattened member list.
#[derive(Debug, Deserialize)]
pub struct ClassDesc {
    /// Source class name.
    pub name: String,
    /// Class docstring.
    #[serde(default)]
    pub docstring: Option<Docstring>,
    /// Methods, possibly including `__init__` (treated as the constructor).
    #[serde(default)]
    pub methods: Vec<FunctionDesc>,
    /// Instance properties/attributes.
    #[serde(default)]
    pub properties: Vec<PropertyDesc>,
    /// Base class names (informational only; inheritance is pre-flattened).
    #[serde(default)]
    pub bases: Vec<String>,
}

/// An attribute/property descriptor.
#[derive(Debug, Deserialize)]
pub struct PropertyDesc {
    /// Source attribute name.
    pub name: String,
    /// Attribute type annotation, if any.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDesc>,
    /// Docstring of the property getter.
    #[serde(default)]
    pub docstring: Option<Docstring>,
}

/// Python parameter kinds, as `inspect.Parameter.kind` names lowercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Before a `/` marker.
    PositionalOnly,
    /// Ordinary parameter.
    PositionalOrKeyword,
    /// `*args`.
    VarPositional,
    /// After a `*` marker.
    KeywordOnly,
    /// `**kwargs`.
    VarKeyword,
}

/// A single parameter descriptor.
#[derive(Debug, Deserialize)]
pub struct ParameterDesc {
    /// Source parameter name.
    pub name: String,
    /// Calling-convention kind.
    pub kind: ParamKind,
    /// Whether the parameter has no default.
    #[serde(default)]
    pub required: bool,
    /// Serialized default value, when representable.
    #[serde(default)]
    pub default: Option<LiteralValue>,
    /// Type annotation, if any.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDesc>,
}

/// A literal value (defaults, `Literal[...]` members).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// `None`.
    Null,
}

/// Recursive type descriptor, tagged on `"type"`.
///
/// Every shape the probe can emit maps to exactly one variant; anything it
/// emits that this enum does not know about lands in [`TypeDesc::Other`],
/// which the type mapper lowers to `unknown` — deserialization of a type
/// never fails on an unrecognized tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDesc {
    /// Python `int`.
    Int,
    /// Python `float`.
    Float,
    /// Python `str`.
    String,
    /// Python `bool`.
    Boolean,
    /// Python `bytes`.
    Bytes,
    /// Python `bytearray`.
    Bytearray,
    /// `None` / `NoneType`.
    None,
    /// Unannotated or unrepresentable.
    Any,
    /// `list[T]`.
    List {
        /// Element type; absent for a bare `list`.
        #[serde(default)]
        element_type: Option<Box<TypeDesc>>,
    },
    /// `dict[K, V]`.
    Dict {
        /// Key type; absent for a bare `dict`.
        #[serde(default)]
        key_type: Option<Box<TypeDesc>>,
        /// Value type; absent for a bare `dict`.
        #[serde(default)]
        value_type: Option<Box<TypeDesc>>,
    },
    /// `tuple[...]`.
    Tuple {
        /// Element types for a fixed-arity tuple.
        #[serde(default)]
        element_types: Vec<TypeDesc>,
        /// True for `tuple[T, ...]` (homogeneous, any length).
        #[serde(default)]
        variadic: bool,
    },
    /// `set[T]`.
    Set {
        /// Element type; absent for a bare `set`.
        #[serde(default)]
        element_type: Option<Box<TypeDesc>>,
    },
    /// `frozenset[T]`.
    Frozenset {
        /// Element type; absent for a bare `frozenset`.
        #[serde(default)]
        element_type: Option<Box<TypeDesc>>,
    },
    /// `Union[...]`.
    Union {
        /// Member types.
        #[serde(default)]
        types: Vec<TypeDesc>,
    },
    /// `Optional[T]`.
    Optional {
        /// The non-`None` member.
        inner_type: Box<TypeDesc>,
    },
    /// `Literal[...]`.
    Literal {
        /// Literal members.
        #[serde(default)]
        values: Vec<LiteralValue>,
    },
    /// `Callable[[...], R]`.
    Callable {
        /// Parameter types, when the arity is fixed.
        #[serde(default)]
        parameters: Vec<TypeDesc>,
        /// Return type.
        #[serde(default)]
        return_type: Option<Box<TypeDesc>>,
        /// True for `Callable[..., R]` and bare `Callable`.
        #[serde(default)]
        variadic: bool,
    },
    /// A `TypeVar`.
    Typevar {
        /// TypeVar name.
        name: String,
        /// Constraint types; empty for an unconstrained TypeVar.
        #[serde(default)]
        constraints: Vec<TypeDesc>,
    },
    /// A class reference.
    Class {
        /// Class name.
        name: String,
        /// Defining module, when known.
        #[serde(default)]
        module: Option<String>,
    },
    /// An unrecognized generic (probe kept origin/args we do not model).
    Generic,
    /// Any tag this enum does not know.
    #[serde(other)]
    Other,
}

/// A docstring as the probe emits it: either raw text, or a structure the
/// probe already parsed with `docstring_parser`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Docstring {
    /// Raw, unparsed text.
    Raw(String),
    /// Probe-parsed docstring.
    Parsed(ParsedDocstring),
}

/// Probe-parsed docstring fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedDocstring {
    /// One-line summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Per-parameter descriptions, in signature order.
    #[serde(default)]
    pub params: Vec<DocParam>,
    /// Return description.
    #[serde(default)]
    pub returns: Option<DocReturn>,
    /// Raise clauses.
    #[serde(default)]
    pub raises: Vec<DocRaise>,
    /// Raw text, when the probe kept it alongside the parse.
    #[serde(default)]
    pub raw: Option<String>,
}

/// One documented parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct DocParam {
    /// Parameter name.
    #[serde(default)]
    pub name: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Documented type expression (source-language syntax).
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
}

/// Documented return value.
#[derive(Debug, Clone, Deserialize)]
pub struct DocReturn {
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Documented type expression.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
}

/// One documented raise clause.
#[derive(Debug, Clone, Deserialize)]
pub struct DocRaise {
    /// Exception type name.
    #[serde(default)]
    pub exception: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Manifest {
            library: "<unknown>".to_string(),
            reason: format!("failed to parse manifest JSON: {e}"),
        })
    }

    /// Validate the manifest structurally. Runs before anything is written,
    /// so a failure never leaves partial output for this library.
    pub fn validate(&self) -> Result<(), Error> {
        if self.module.trim().is_empty() {
            return Err(Error::Manifest {
                library: self.module.clone(),
                reason: "manifest `module` is empty".to_string(),
            });
        }

        for (ns, namespace) in &self.namespaces {
            for func in &namespace.functions {
                self.validate_function(ns, None, func)?;
            }
            for class in &namespace.classes {
                self.validate_class(ns, class)?;
            }
        }
        for func in &self.functions {
            self.validate_function("", None, func)?;
        }
        for class in &self.classes {
            self.validate_class("", class)?;
        }
        Ok(())
    }

    fn qualified(&self, ns: &str, name: &str) -> String {
        if ns.is_empty() {
            format!("{}.{name}", self.module)
        } else {
            format!("{}.{ns}.{name}", self.module)
        }
    }

    fn validate_function(
        &self,
        ns: &str,
        owner: Option<&str>,
        func: &FunctionDesc,
    ) -> Result<(), Error> {
        let symbol = match owner {
            Some(class) => format!("{}.{}", self.qualified(ns, class), func.name),
            None => self.qualified(ns, &func.name),
        };
        if func.name.trim().is_empty() {
            return Err(Error::Symbol {
                library: self.module.clone(),
                symbol,
                reason: "function descriptor has an empty name".to_string(),
            });
        }
        let mut seen = std::collections::BTreeSet::new();
        for param in &func.parameters {
            if param.name.trim().is_empty() {
                return Err(Error::Symbol {
                    library: self.module.clone(),
                    symbol,
                    reason: "parameter descriptor has an empty name".to_string(),
                });
            }
            if !seen.insert(param.name.as_str()) {
                return Err(Error::Symbol {
                    library: self.module.clone(),
                    symbol,
                    reason: format!("duplicate parameter `{}`", param.name),
                });
            }
        }
        Ok(())
    }

    fn validate_class(&self, ns: &str, class: &ClassDesc) -> Result<(), Error> {
        if class.name.trim().is_empty() {
            return Err(Error::Symbol {
                library: self.module.clone(),
                symbol: self.qualified(ns, "<class>"),
                reason: "class descriptor has an empty name".to_string(),
            });
        }
        for method in &class.methods {
            self.validate_function(ns, Some(&class.name), method)?;
        }
        for prop in &class.properties {
            if prop.name.trim().is_empty() {
                return Err(Error::Symbol {
                    library: self.module.clone(),
                    symbol: self.qualified(ns, &class.name),
                    reason: "property descriptor has an empty name".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Docstring {
    /// Raw text of the docstring, when any is available.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Docstring::Raw(text) => Some(text),
            Docstring::Parsed(parsed) => parsed.raw.as_deref(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced_manifest() {
        let json = r#"{
            "module": "geometry",
            "version": "2.1",
            "module_version": "1.4.0",
            "namespaces": {
                "": {
                    "functions": [
                        {
                            "name": "area",
                            "parameters": [
                                {"name": "shape", "kind": "positional_or_keyword", "required": true}
                            ],
                            "return_type": {"type": "float"}
                        }
                    ],
                    "classes": []
                },
                "shapes": {"functions": [], "classes": [{"name": "Point"}]}
            }
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.module, "geometry");
        assert_eq!(manifest.module_version.as_deref(), Some("1.4.0"));
        assert_eq!(manifest.namespaces.len(), 2);
        let root = &manifest.namespaces[""];
        assert_eq!(root.functions.len(), 1);
        assert_eq!(root.functions[0].parameters[0].kind, ParamKind::PositionalOrKeyword);
        assert!(root.functions[0].parameters[0].required);
        manifest.validate().unwrap();
    }

    #[test]
    fn test_parse_flat_manifest() {
        let json = r#"{
            "module": "mathutil",
            "version": "2.0",
            "functions": [{"name": "mean", "parameters": []}],
            "classes": []
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert!(manifest.namespaces.is_empty());
        assert_eq!(manifest.functions.len(), 1);
        manifest.validate().unwrap();
    }

    #[test]
    fn test_unknown_type_tag_is_other() {
        let json = r#"{"type": "coroutine"}"#;
        let desc: TypeDesc = serde_json::from_str(json).unwrap();
        assert!(matches!(desc, TypeDesc::Other));
    }

    #[test]
    fn test_nested_type_descriptor() {
        let json = r#"{
            "type": "dict",
            "key_type": {"type": "string"},
            "value_type": {"type": "list", "element_type": {"type": "int"}}
        }"#;
        let desc: TypeDesc = serde_json::from_str(json).unwrap();
        match desc {
            TypeDesc::Dict { key_type, value_type } => {
                assert!(matches!(key_type.as_deref(), Some(TypeDesc::String)));
                assert!(matches!(value_type.as_deref(), Some(TypeDesc::List { .. })));
            }
            other => panic!("expected dict, got {other:?}"),
        }
    }

    #[test]
    fn test_docstring_forms() {
        let raw: Docstring = serde_json::from_str(r#""Compute the mean.""#).unwrap();
        assert_eq!(raw.raw_text(), Some("Compute the mean."));

        let parsed: Docstring = serde_json::from_str(
            r#"{"summary": "Compute the mean.", "params": [{"name": "a", "description": "input"}]}"#,
        )
        .unwrap();
        match parsed {
            Docstring::Parsed(p) => {
                assert_eq!(p.summary.as_deref(), Some("Compute the mean."));
                assert_eq!(p.params.len(), 1);
            }
            Docstring::Raw(_) => panic!("expected parsed form"),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_parameters() {
        let json = r#"{
            "module": "m",
            "functions": [{
                "name": "f",
                "parameters": [
                    {"name": "a", "kind": "positional_or_keyword", "required": true},
                    {"name": "a", "kind": "keyword_only"}
                ]
            }]
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        let err = manifest.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("m.f"), "error should name the symbol: {msg}");
        assert!(msg.contains("duplicate parameter"));
    }

    #[test]
    fn test_validate_rejects_empty_function_name() {
        let json = r#"{"module": "m", "functions": [{"name": "  "}]}"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert!(manifest.validate().is_err());
    }
}
