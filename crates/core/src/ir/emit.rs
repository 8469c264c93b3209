//! TypeScript code emission via the `Emit` trait.
//!
//! Each AST node implements `Emit` for composable, purely mechanical string
//! building. All decisions (naming, typing, call plans) happen before this
//! layer.

use super::types::{
    ImportItem, TsConst, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsParam, TsPrimitive,
    TsProp, TsReexport, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::quote_if_needed;

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Primitives & literals
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Void => "void".to_string(),
            TsPrimitive::Unknown => "unknown".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

/// Emit a type, parenthesized when it would bind wrong in `ctx`.
fn emit_grouped(ty: &TsType, needs_parens: bool) -> String {
    let s = ty.emit();
    if needs_parens { format!("({s})") } else { s }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let parens = matches!(
                    **inner,
                    TsType::Union(_) | TsType::Intersection(_) | TsType::Function { .. }
                );
                format!("{}[]", emit_grouped(inner, parens))
            }
            TsType::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(Emit::emit).collect();
                format!("[{}]", parts.join(", "))
            }
            TsType::Union(types) => types
                .iter()
                .map(|t| emit_grouped(t, matches!(t, TsType::Function { .. })))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    emit_grouped(t, matches!(t, TsType::Union(_) | TsType::Function { .. }))
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Generic { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let parts: Vec<_> = args.iter().map(Emit::emit).collect();
                    format!("{}<{}>", name, parts.join(", "))
                }
            }
            TsType::Function { params, ret, variadic } => {
                if *variadic {
                    format!("(...args: unknown[]) => {}", ret.emit())
                } else {
                    let parts: Vec<_> = params
                        .iter()
                        .enumerate()
                        .map(|(i, ty)| format!("arg{}: {}", i, ty.emit()))
                        .collect();
                    format!("({}) => {}", parts.join(", "), ret.emit())
                }
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let ro = if self.readonly { "readonly " } else { "" };
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}{}: {}", ro, key, opt, self.ty.emit())
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{}: {}", self.name, opt, ty.emit()),
            None => format!("{}{}", self.name, opt),
        }
    }
}

// =============================================================================
// Type definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(doc) = &self.doc {
            output.push_str(doc);
            output.push('\n');
        }
        match &self.kind {
            TypeDefKind::Interface {
                extends,
                properties,
                index_signature,
            } => {
                let extends_str = if extends.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", extends.join(", "))
                };
                output.push_str(&format!("export interface {}{} {{\n", self.name, extends_str));
                for prop in properties {
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                if let Some(value_ty) = index_signature {
                    output.push_str(&format!("  [kwarg: string]: {};\n", value_ty.emit()));
                }
                output.push_str("}\n");
            }
            TypeDefKind::TypeAlias { ty } => {
                output.push_str(&format!("export type {} = {};\n", self.name, ty.emit()));
            }
        }
        output
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => {
                let args_str = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("{}({})", callee.emit(), args_str)
            }
            TsExpr::Member { object, prop } => {
                format!("{}.{}", object.emit(), prop)
            }
            TsExpr::Array(items) => {
                let items_str = items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("[{items_str}]")
            }
            TsExpr::Spread(expr) => format!("...{}", expr.emit()),
            TsExpr::Await(expr) => format!("await {}", expr.emit()),
            TsExpr::Cast { expr, ty } => {
                // `await` binds looser than `as`
                let inner = match **expr {
                    TsExpr::Await(_) => format!("({})", expr.emit()),
                    _ => expr.emit(),
                };
                format!("{} as {}", inner, ty.emit())
            }
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl TsStmt {
    /// Emit with the given indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::ConstDecl { pattern, init } => {
                format!("{}const {} = {};\n", prefix, pattern, init.emit())
            }
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{}return {};\n", prefix, e.emit()),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

// =============================================================================
// Constants & functions
// =============================================================================

impl Emit for TsConst {
    fn emit(&self) -> String {
        let ty_str = self
            .ty
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        format!("export const {}{} = {};\n", self.name, ty_str, self.value.emit())
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let mut output = String::new();

        if let Some(doc) = &self.doc {
            output.push_str(doc);
            output.push('\n');
        }

        let type_params_str = if self.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_params.join(", "))
        };

        let params_str = self.params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");

        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();

        let async_str = if self.is_async { "async " } else { "" };

        output.push_str(&format!(
            "export {}function {}{}({}){}",
            async_str, self.name, type_params_str, params_str, return_type_str
        ));
        if self.body.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(" {\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(1));
            }
            output.push_str("}\n");
        }

        output
    }
}

// =============================================================================
// Imports & re-exports
// =============================================================================

impl Emit for ImportItem {
    fn emit(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let items_str = self.items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
        let type_keyword = if self.type_only { "type " } else { "" };
        format!("import {}{{ {} }} from \"{}\";\n", type_keyword, items_str, self.from)
    }
}

impl Emit for TsReexport {
    fn emit(&self) -> String {
        format!("export * as {} from \"{}\";\n", self.alias, self.from)
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        if let Some(header) = &self.header {
            output.push_str(header);
            output.push('\n');
        }

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for constant in &self.consts {
            output.push_str(&constant.emit());
        }
        if !self.consts.is_empty() {
            output.push('\n');
        }

        for reexport in &self.reexports {
            output.push_str(&reexport.emit());
        }
        if !self.reexports.is_empty() {
            output.push('\n');
        }

        for type_def in &self.types {
            output.push_str(&type_def.emit());
            output.push('\n');
        }

        for func in &self.functions {
            output.push_str(&func.emit());
            output.push('\n');
        }

        // Exactly one trailing newline.
        while output.ends_with("\n\n") {
            output.pop();
        }
        output
    }
}

// =============================================================================
// Tests
// =============================================================================
