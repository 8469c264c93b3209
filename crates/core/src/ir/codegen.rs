//! Binding IR → per-file TypeScript AST assembly.
//!
//! Each planned file becomes one `TsModule`: runtime imports for exactly the
//! names the file uses, metadata constants the dispatcher can reconstruct
//! call targets from, options interfaces, and async wrapper functions that
//! funnel into the runtime dispatcher.

use std::collections::BTreeSet;

use crate::layout::{FileKind, PlannedFile};

use super::binding::{AttrBinding, ClassBinding, FunctionBinding, LibraryIR, ModuleIR};
use super::plan::{CallPlan, OptionField};
use super::typemap::{DATAFRAME, NDARRAY, PYHANDLE};
use super::types::{
    ImportItem, TsConst, TsExpr, TsImport, TsLiteral, TsModule, TsParam, TsPrimitive, TsProp,
    TsReexport, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{quote_if_needed, to_pascal_case};

/// First line of every generated file.
const HEADER: &str = "// Code generated by pyts. DO NOT EDIT.";

/// Runtime-dispatch functions, in import order.
const FN_INVOKE: &str = "invoke";
const FN_INSTANTIATE: &str = "instantiate";
const FN_INVOKE_METHOD: &str = "invokeMethod";
const FN_READ_ATTR: &str = "readAttr";

/// Runtime-provided type names a generated file may reference.
const RUNTIME_TYPES: &[&str] = &["CallOptions", PYHANDLE, NDARRAY, DATAFRAME];

/// Per-library inputs shared by every rendered file.
#[derive(Debug, Clone, Copy)]
pub struct CodegenContext<'a> {
    /// The normalized library.
    pub ir: &'a LibraryIR,
    /// Module specifier the runtime dispatcher is imported from.
    pub runtime_import: &'a str,
}

/// Render one planned file to its TypeScript AST.
pub fn render_file(ctx: &CodegenContext<'_>, file: &PlannedFile) -> TsModule {
    match &file.kind {
        FileKind::ModuleIndex { module, reexports } => {
            render_index(ctx, &ctx.ir.modules[*module], &file.py_path, reexports)
        }
        FileKind::Class { module, class } => {
            render_class(ctx, &ctx.ir.modules[*module].classes[*class], &file.py_path)
        }
        FileKind::GapIndex { reexports } => render_gap(ctx, &file.py_path, reexports),
    }
}

fn render_gap(ctx: &CodegenContext<'_>, py_path: &str, reexports: &[String]) -> TsModule {
    TsModule {
        header: Some(HEADER.to_string()),
        consts: metadata_consts(ctx, py_path),
        reexports: reexports
            .iter()
            .map(|name| TsReexport { alias: name.clone(), from: format!("./{name}") })
            .collect(),
        ..TsModule::default()
    }
}

fn render_index(
    ctx: &CodegenContext<'_>,
    module: &ModuleIR,
    py_path: &str,
    reexports: &[String],
) -> TsModule {
    let mut builder = FileBuilder::default();
    for func in &module.functions {
        builder.push_wrapper(func, CallTarget::Free);
    }

    let header = match &module.doc {
        Some(doc) => format!("{HEADER}\n{doc}"),
        None => HEADER.to_string(),
    };

    TsModule {
        header: Some(header),
        imports: builder.runtime_imports(ctx),
        consts: metadata_consts(ctx, py_path),
        reexports: reexports
            .iter()
            .map(|name| TsReexport { alias: name.clone(), from: format!("./{name}") })
            .collect(),
        types: builder.types,
        functions: builder.functions,
    }
}

fn render_class(ctx: &CodegenContext<'_>, class: &ClassBinding, py_path: &str) -> TsModule {
    let mut builder = FileBuilder::default();

    // branded handle alias: PyHandle & { readonly __pyClass: "m.Point" }
    builder.used_types.insert(PYHANDLE.to_string());
    builder.type_names.insert(class.name.clone());
    builder.types.push(TsTypeDef {
        name: class.name.clone(),
        kind: TypeDefKind::TypeAlias {
            ty: TsType::Intersection(vec![
                TsType::Ref(PYHANDLE.to_string()),
                TsType::Object(vec![TsProp {
                    name: "__pyClass".to_string(),
                    ty: TsType::Literal(TsLiteral::String(class.qualified.clone())),
                    optional: false,
                    readonly: true,
                }]),
            ]),
        },
        doc: Some(class.doc.clone()),
    });

    let ctor = FunctionBinding {
        ident: super::naming::CONSTRUCT.to_string(),
        source: class.source.clone(),
        qualified: class.qualified.clone(),
        plan: class.constructor.plan.clone(),
        ret: TsType::Ref(class.name.clone()),
        type_params: Vec::new(),
        doc: class.constructor.doc.clone(),
    };
    builder.push_wrapper(&ctor, CallTarget::Constructor);

    for method in &class.methods {
        builder.push_wrapper(method, CallTarget::Method { class_ty: &class.name });
    }
    for attr in &class.attrs {
        builder.push_attr(attr, &class.name);
    }

    TsModule {
        header: Some(HEADER.to_string()),
        imports: builder.runtime_imports(ctx),
        consts: metadata_consts(ctx, py_path),
        reexports: Vec::new(),
        types: builder.types,
        functions: builder.functions,
    }
}

fn metadata_consts(ctx: &CodegenContext<'_>, py_path: &str) -> Vec<TsConst> {
    vec![
        TsConst {
            name: "__pyModule".to_string(),
            ty: None,
            value: TsExpr::Literal(TsLiteral::String(py_path.to_string())),
        },
        TsConst {
            name: "__pyLibrary".to_string(),
            ty: None,
            value: TsExpr::Literal(TsLiteral::String(ctx.ir.library.clone())),
        },
        TsConst {
            name: "__pyVersion".to_string(),
            ty: Some(TsType::Union(vec![
                TsType::Primitive(TsPrimitive::String),
                TsType::Primitive(TsPrimitive::Null),
            ])),
            value: match &ctx.ir.version {
                Some(v) => TsExpr::Literal(TsLiteral::String(v.clone())),
                None => TsExpr::Literal(TsLiteral::Null),
            },
        },
    ]
}

/// What a wrapper dispatches to.
#[derive(Debug, Clone, Copy)]
enum CallTarget<'a> {
    /// Free function: `invoke(__pyModule, name, ...)`.
    Free,
    /// Constructor: `instantiate(__pyModule, className, ...)`.
    Constructor,
    /// Instance method: `invokeMethod(self, name, ...)`.
    Method {
        /// The branded self type.
        class_ty: &'a str,
    },
}

/// Accumulates a file's type definitions, functions, and runtime usage.
#[derive(Debug, Default)]
struct FileBuilder {
    types: Vec<TsTypeDef>,
    functions: Vec<super::types::TsFunction>,
    used_fns: BTreeSet<String>,
    used_types: BTreeSet<String>,
    /// Every type name already declared in this file, aliases included.
    type_names: BTreeSet<String>,
}

impl FileBuilder {
    /// Record runtime type names referenced by a signature type.
    fn note_refs(&mut self, ty: &TsType) {
        let mut refs = BTreeSet::new();
        ty.collect_refs(&mut refs);
        for name in refs {
            if RUNTIME_TYPES.contains(&name.as_str()) {
                self.used_types.insert(name);
            }
        }
    }

    /// Define the per-function options interface; returns its name, or
    /// `CallOptions` when the plan needs no dedicated interface.
    fn options_type(&mut self, func_ident: &str, plan: &CallPlan) -> String {
        self.used_types.insert("CallOptions".to_string());
        if plan.options.is_plain() {
            return "CallOptions".to_string();
        }
        let mut name = format!("{}Options", to_pascal_case(func_ident));
        while self.type_names.contains(&name) {
            name.push_str("Options");
        }
        self.type_names.insert(name.clone());

        let properties = plan
            .options
            .fields
            .iter()
            .map(|field| {
                self.note_refs(&field.ty);
                TsProp {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    optional: !field.required,
                    readonly: false,
                }
            })
            .collect();
        self.types.push(TsTypeDef {
            name: name.clone(),
            kind: TypeDefKind::Interface {
                extends: vec!["CallOptions".to_string()],
                properties,
                index_signature: plan
                    .options
                    .has_kwargs
                    .then(|| TsType::Primitive(TsPrimitive::Unknown)),
            },
            doc: None,
        });
        name
    }

    fn push_wrapper(&mut self, func: &FunctionBinding, target: CallTarget<'_>) {
        let plan = &func.plan;
        let options_ty = self.options_type(&func.ident, plan);

        let mut params = Vec::new();
        if let CallTarget::Method { class_ty } = target {
            params.push(TsParam {
                name: "self".to_string(),
                ty: Some(TsType::Ref(class_ty.to_string())),
                optional: false,
            });
        }
        for fixed in &plan.fixed {
            self.note_refs(&fixed.ty);
            params.push(TsParam {
                name: fixed.ident.clone(),
                ty: Some(fixed.ty.clone()),
                optional: false,
            });
        }
        // an optional param cannot precede a required one, so a required
        // options bag forces the extra channel to be explicit
        if plan.extra {
            params.push(TsParam {
                name: "extra".to_string(),
                ty: Some(TsType::Array(Box::new(TsType::unknown()))),
                optional: !plan.options.required,
            });
        }
        params.push(TsParam {
            name: "options".to_string(),
            ty: Some(TsType::Ref(options_ty)),
            optional: !plan.options.required,
        });

        self.note_refs(&func.ret);
        let dispatch = self.dispatch_expr(func, target);
        let body = wrapper_body(plan, dispatch, &func.ret);

        self.functions.push(super::types::TsFunction {
            name: func.ident.clone(),
            type_params: func.type_params.clone(),
            params,
            return_type: Some(TsType::promise(func.ret.clone())),
            body,
            is_async: true,
            doc: Some(func.doc.clone()),
        });
    }

    /// The dispatcher call, with placeholders for args/kwargs/flags filled
    /// in by [`wrapper_body`].
    fn dispatch_expr(&mut self, func: &FunctionBinding, target: CallTarget<'_>) -> DispatchCall {
        match target {
            CallTarget::Free => {
                self.used_fns.insert(FN_INVOKE.to_string());
                DispatchCall {
                    callee: FN_INVOKE,
                    leading: vec![
                        TsExpr::Ident("__pyModule".to_string()),
                        TsExpr::Literal(TsLiteral::String(func.source.clone())),
                    ],
                }
            }
            CallTarget::Constructor => {
                self.used_fns.insert(FN_INSTANTIATE.to_string());
                DispatchCall {
                    callee: FN_INSTANTIATE,
                    leading: vec![
                        TsExpr::Ident("__pyModule".to_string()),
                        TsExpr::Literal(TsLiteral::String(func.source.clone())),
                    ],
                }
            }
            CallTarget::Method { .. } => {
                self.used_fns.insert(FN_INVOKE_METHOD.to_string());
                DispatchCall {
                    callee: FN_INVOKE_METHOD,
                    leading: vec![
                        TsExpr::Ident("self".to_string()),
                        TsExpr::Literal(TsLiteral::String(func.source.clone())),
                    ],
                }
            }
        }
    }

    fn push_attr(&mut self, attr: &AttrBinding, class_ty: &str) {
        self.used_fns.insert(FN_READ_ATTR.to_string());
        self.used_types.insert("CallOptions".to_string());
        self.note_refs(&attr.ty);

        let call = TsExpr::Call {
            callee: Box::new(TsExpr::Ident(FN_READ_ATTR.to_string())),
            args: vec![
                TsExpr::Ident("self".to_string()),
                TsExpr::Literal(TsLiteral::String(attr.source.clone())),
                TsExpr::Raw("options ?? {}".to_string()),
            ],
        };
        let ret_expr = cast_await(call, &attr.ty);

        self.functions.push(super::types::TsFunction {
            name: attr.ident.clone(),
            type_params: Vec::new(),
            params: vec![
                TsParam {
                    name: "self".to_string(),
                    ty: Some(TsType::Ref(class_ty.to_string())),
                    optional: false,
                },
                TsParam {
                    name: "options".to_string(),
                    ty: Some(TsType::Ref("CallOptions".to_string())),
                    optional: true,
                },
            ],
            return_type: Some(TsType::promise(attr.ty.clone())),
            body: vec![TsStmt::Return(Some(ret_expr))],
            is_async: true,
            doc: Some(attr.doc.clone()),
        });
    }

    fn runtime_imports(&self, ctx: &CodegenContext<'_>) -> Vec<TsImport> {
        let mut imports = Vec::new();
        if !self.used_fns.is_empty() {
            imports.push(TsImport {
                items: self
                    .used_fns
                    .iter()
                    .map(|name| ImportItem { name: name.clone(), alias: None })
                    .collect(),
                from: ctx.runtime_import.to_string(),
                type_only: false,
            });
        }
        if !self.used_types.is_empty() {
            imports.push(TsImport {
                items: self
                    .used_types
                    .iter()
                    .map(|name| ImportItem { name: name.clone(), alias: None })
                    .collect(),
                from: ctx.runtime_import.to_string(),
                type_only: true,
            });
        }
        imports
    }
}

/// A dispatcher callee plus its target-identifying leading arguments.
struct DispatchCall {
    callee: &'static str,
    leading: Vec<TsExpr>,
}

/// Build the uniform wrapper body: destructure runtime flags (and renamed
/// kwargs) out of the options bag, assemble positional args, dispatch, cast.
fn wrapper_body(plan: &CallPlan, dispatch: DispatchCall, ret: &TsType) -> Vec<TsStmt> {
    let has_bag = !plan.options.is_plain();
    let renamed: Vec<&OptionField> =
        plan.options.fields.iter().filter(|f| f.name != f.source).collect();

    let mut pattern_parts = vec!["timeoutMs".to_string(), "idempotencyKey".to_string()];
    for field in &renamed {
        pattern_parts.push(field.name.clone());
    }
    if has_bag {
        pattern_parts.push("...kwargs".to_string());
    }
    let destructure = TsStmt::ConstDecl {
        pattern: format!("{{ {} }}", pattern_parts.join(", ")),
        init: TsExpr::Raw("options ?? {}".to_string()),
    };

    let mut arg_parts: Vec<String> = plan.fixed.iter().map(|f| f.ident.clone()).collect();
    if plan.extra {
        arg_parts.push("...(extra ?? [])".to_string());
    }
    let args = TsExpr::Raw(format!("[{}]", arg_parts.join(", ")));

    let kwargs = if !has_bag {
        TsExpr::Raw("{}".to_string())
    } else if renamed.is_empty() {
        TsExpr::Ident("kwargs".to_string())
    } else {
        // optional renamed fields are re-keyed only when present, so an
        // omitted field never reaches the dispatcher as an explicit kwarg
        let extra_entries: Vec<String> = renamed
            .iter()
            .map(|f| {
                let key = quote_if_needed(&f.source);
                if f.required {
                    format!("{key}: {}", f.name)
                } else {
                    format!("...({0} !== undefined ? {{ {key}: {0} }} : {{}})", f.name)
                }
            })
            .collect();
        TsExpr::Raw(format!("{{ ...kwargs, {} }}", extra_entries.join(", ")))
    };
    let flags = TsExpr::Raw("{ timeoutMs, idempotencyKey }".to_string());

    let mut call_args = dispatch.leading;
    call_args.extend([args, kwargs, flags]);
    let call = TsExpr::Call {
        callee: Box::new(TsExpr::Ident(dispatch.callee.to_string())),
        args: call_args,
    };

    vec![destructure, TsStmt::Return(Some(cast_await(call, ret)))]
}

/// `(await call) as T`, skipping the pointless cast when `T` is `unknown`.
fn cast_await(call: TsExpr, ret: &TsType) -> TsExpr {
    let awaited = TsExpr::Await(Box::new(call));
    if *ret == TsType::unknown() {
        awaited
    } else {
        TsExpr::Cast { expr: Box::new(awaited), ty: ret.clone() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::emit::Emit;
    use crate::ir::normalize::normalize;
    use crate::layout::plan_layout;
    use crate::manifest::Manifest;

    fn render_all(json: &str) -> Vec<(String, String)> {
        let manifest = Manifest::from_json(json).unwrap();
        let ir = normalize(&manifest);
        let plan = plan_layout(&ir, None);
        let ctx = CodegenContext { ir: &ir, runtime_import: "@pyts/runtime" };
        plan.files
            .iter()
            .map(|f| (f.rel_path.to_string_lossy().into_owned(), render_file(&ctx, f).emit()))
            .collect()
    }

    fn find<'a>(files: &'a [(String, String)], path: &str) -> &'a str {
        &files.iter().find(|(p, _)| p == path).unwrap().1
    }

    #[test]
    fn test_function_wrapper_shape() {
        let files = render_all(
            r#"{
                "module": "stats",
                "version": "2.0",
                "module_version": "1.4.0",
                "functions": [{
                    "name": "mean",
                    "parameters": [
                        {"name": "values", "kind": "positional_or_keyword", "required": true,
                         "type": {"type": "list", "element_type": {"type": "float"}}},
                        {"name": "axis", "kind": "positional_or_keyword", "required": false,
                         "type": {"type": "optional", "inner_type": {"type": "int"}}}
                    ],
                    "return_type": {"type": "float"}
                }]
            }"#,
        );
        let out = find(&files, "stats/index.ts");
        assert!(out.starts_with("// Code generated by pyts. DO NOT EDIT.\n"));
        assert!(out.contains("import { invoke } from \"@pyts/runtime\";"));
        assert!(out.contains("import type { CallOptions } from \"@pyts/runtime\";"));
        assert!(out.contains("export const __pyModule = \"stats\";"));
        assert!(out.contains("export const __pyLibrary = \"stats\";"));
        assert!(out.contains("export const __pyVersion: string | null = \"1.4.0\";"));
        assert!(out.contains("export interface MeanOptions extends CallOptions {"));
        assert!(out.contains("axis?: number | null;"));
        assert!(out.contains(
            "export async function mean(values: number[], options?: MeanOptions): Promise<number> {"
        ));
        assert!(out.contains("const { timeoutMs, idempotencyKey, ...kwargs } = options ?? {};"));
        assert!(out.contains(
            "return (await invoke(__pyModule, \"mean\", [values], kwargs, { timeoutMs, idempotencyKey })) as number;"
        ));
    }

    #[test]
    fn test_varargs_wrapper() {
        let files = render_all(
            r#"{
                "module": "util",
                "version": "2.0",
                "functions": [{
                    "name": "join_values",
                    "parameters": [
                        {"name": "sep", "kind": "positional_or_keyword", "required": true,
                         "type": {"type": "string"}},
                        {"name": "values", "kind": "var_positional", "required": false}
                    ],
                    "return_type": {"type": "string"}
                }]
            }"#,
        );
        let out = find(&files, "util/index.ts");
        assert!(out.contains(
            "export async function join_values(sep: string, extra?: unknown[], options?: CallOptions): Promise<string> {"
        ));
        assert!(out.contains("[sep, ...(extra ?? [])]"));
        // plain options: no dedicated interface, empty kwargs
        assert!(!out.contains("interface JoinValuesOptions"));
        assert!(out.contains("\"join_values\", [sep, ...(extra ?? [])], {}, { timeoutMs, idempotencyKey }"));
    }

    #[test]
    fn test_class_file_shape() {
        let files = render_all(
            r#"{
                "module": "geometry",
                "version": "2.1",
                "namespaces": {"": {"classes": [{
                    "name": "Point",
                    "methods": [
                        {"name": "__init__", "parameters": [
                            {"name": "self", "kind": "positional_or_keyword", "required": true},
                            {"name": "x", "kind": "positional_or_keyword", "required": true,
                             "type": {"type": "float"}},
                            {"name": "y", "kind": "positional_or_keyword", "required": true,
                             "type": {"type": "float"}}
                        ]},
                        {"name": "magnitude", "parameters": [
                            {"name": "self", "kind": "positional_or_keyword", "required": true}
                        ], "return_type": {"type": "float"}}
                    ],
                    "properties": [{"name": "x", "type": {"type": "float"}}]
                }]}}
            }"#,
        );
        let out = find(&files, "geometry/point.ts");
        assert!(out.contains(
            "export type Point = PyHandle & { readonly __pyClass: \"geometry.Point\" };"
        ));
        assert!(out.contains(
            "export async function construct(x: number, y: number, options?: CallOptions): Promise<Point> {"
        ));
        assert!(out.contains("instantiate(__pyModule, \"Point\", [x, y], {},"));
        assert!(out.contains(
            "export async function magnitude(self: Point, options?: CallOptions): Promise<number> {"
        ));
        assert!(out.contains("invokeMethod(self, \"magnitude\", [], {},"));
        assert!(out.contains(
            "export async function x(self: Point, options?: CallOptions): Promise<number> {"
        ));
        assert!(out.contains("return (await readAttr(self, \"x\", options ?? {})) as number;"));

        // the index re-exports the class file
        let index = find(&files, "geometry/index.ts");
        assert!(index.contains("export * as point from \"./point\";"));
    }

    #[test]
    fn test_required_keyword_only_options_required() {
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "open_thing",
                    "parameters": [
                        {"name": "mode", "kind": "keyword_only", "required": true,
                         "type": {"type": "string"}}
                    ]
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        assert!(out.contains("export interface OpenThingOptions extends CallOptions {"));
        assert!(out.contains("mode: string;"));
        // options bag is required, not optional
        assert!(out.contains("open_thing(options: OpenThingOptions): Promise<unknown> {"));
        // unknown return: no cast
        assert!(out.contains("return await invoke(__pyModule, \"open_thing\", [], kwargs,"));
    }

    #[test]
    fn test_var_keyword_index_signature() {
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "configure",
                    "parameters": [{"name": "kwargs", "kind": "var_keyword", "required": false}]
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        assert!(out.contains("export interface ConfigureOptions extends CallOptions {"));
        assert!(out.contains("[kwarg: string]: unknown;"));
    }

    #[test]
    fn test_renamed_kwarg_remapped() {
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "f",
                    "parameters": [{"name": "class", "kind": "keyword_only", "required": false}]
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        // reserved word gets a sanitized interface field but the original kwarg key
        assert!(out.contains("_class?: unknown;"));
        assert!(out.contains("const { timeoutMs, idempotencyKey, _class, ...kwargs } = options ?? {};"));
        // optional field: only re-keyed when the caller supplied it
        assert!(out.contains("{ ...kwargs, ...(_class !== undefined ? { class: _class } : {}) }"));
    }

    #[test]
    fn test_required_renamed_kwarg_rekeyed_directly() {
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "f",
                    "parameters": [{"name": "class", "kind": "keyword_only", "required": true}]
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        assert!(out.contains("_class: unknown;"));
        assert!(out.contains("{ ...kwargs, class: _class }"));
    }

    #[test]
    fn test_param_named_kwargs_renamed_past_rest_binding() {
        // an ordinary parameter named `kwargs` must not shadow the wrapper's
        // own `...kwargs` rest binding
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "f",
                    "parameters": [
                        {"name": "kwargs", "kind": "positional_or_keyword", "required": true},
                        {"name": "flag", "kind": "keyword_only", "required": false}
                    ]
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        assert!(out.contains("export async function f(kwargs_: unknown, options?: FOptions): Promise<unknown> {"));
        assert!(out.contains("const { timeoutMs, idempotencyKey, ...kwargs } = options ?? {};"));
        assert!(out.contains("invoke(__pyModule, \"f\", [kwargs_], kwargs,"));
    }

    #[test]
    fn test_method_param_named_self_renamed_past_receiver() {
        // receiver is `cls`, second parameter is literally `self`
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "namespaces": {"": {"classes": [{
                    "name": "Box",
                    "methods": [{"name": "compare", "parameters": [
                        {"name": "cls", "kind": "positional_or_keyword", "required": true},
                        {"name": "self", "kind": "positional_or_keyword", "required": true}
                    ]}]
                }]}}
            }"#,
        );
        let out = find(&files, "m/box.ts");
        assert!(out.contains(
            "export async function compare(self: Box, self_: unknown, options?: CallOptions): Promise<unknown> {"
        ));
        assert!(out.contains("invokeMethod(self, \"compare\", [self_], {},"));
    }

    #[test]
    fn test_options_interface_dodges_class_alias() {
        // a class whose constructor options would be named like the class itself
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "namespaces": {"": {"classes": [{
                    "name": "ConstructOptions",
                    "methods": [{"name": "__init__", "parameters": [
                        {"name": "self", "kind": "positional_or_keyword", "required": true},
                        {"name": "strict", "kind": "keyword_only", "required": false,
                         "type": {"type": "boolean"}}
                    ]}]
                }]}}
            }"#,
        );
        let out = find(&files, "m/construct_options.ts");
        assert!(out.contains("export type ConstructOptions = PyHandle &"));
        assert!(out.contains("export interface ConstructOptionsOptions extends CallOptions {"));
        assert!(out.contains("construct(options?: ConstructOptionsOptions): Promise<ConstructOptions> {"));
    }

    #[test]
    fn test_ndarray_override_imported() {
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "zeros",
                    "parameters": [],
                    "return_type": {"type": "class", "name": "ndarray", "module": "numpy"}
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        assert!(out.contains("import type { CallOptions, NdArray } from \"@pyts/runtime\";"));
        assert!(out.contains("Promise<NdArray>"));
    }

    #[test]
    fn test_type_params_emitted() {
        let files = render_all(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "first",
                    "parameters": [{
                        "name": "items", "kind": "positional_or_keyword", "required": true,
                        "type": {"type": "list", "element_type": {"type": "typevar", "name": "T"}}
                    }],
                    "return_type": {"type": "typevar", "name": "T"}
                }]
            }"#,
        );
        let out = find(&files, "m/index.ts");
        assert!(out.contains("export async function first<T>(items: T[], options?: CallOptions): Promise<T> {"));
        assert!(out.contains(")) as T;"));
    }
}
