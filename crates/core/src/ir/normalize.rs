//! Manifest → binding IR lowering.
//!
//! Everything order-sensitive is pinned here: namespaces come from a sorted
//! map, symbols are processed sorted by source name, and name resolution is
//! purely a function of that order. Identical manifests lower to identical
//! IR.

use std::collections::BTreeSet;

use tracing::debug;

use crate::manifest::{ClassDesc, FunctionDesc, Manifest, ParameterDesc, PropertyDesc};

use super::binding::{
    AttrBinding, ClassBinding, ConstructorBinding, FunctionBinding, LibraryIR, ModuleIR,
};
use super::docstring::render_doc;
use super::naming::NameScope;
use super::plan::{CallPlan, plan_call};
use super::typemap::{collect_type_params, map_type};
use super::types::TsType;
use super::utils::sanitize_identifier;

/// Lower a validated manifest into the binding IR.
pub fn normalize(manifest: &Manifest) -> LibraryIR {
    let mut modules = Vec::new();

    // v2.0 flat layout is the root namespace of the v2.1 layout
    let flat_root = (manifest.namespaces.is_empty()
        && (!manifest.functions.is_empty() || !manifest.classes.is_empty()))
    .then(|| ("", manifest.docstring.as_ref(), &manifest.functions, &manifest.classes));
    let namespaced = manifest.namespaces.iter().map(|(ns, symbols)| {
        let doc = if ns.is_empty() {
            symbols.docstring.as_ref().or(manifest.docstring.as_ref())
        } else {
            symbols.docstring.as_ref()
        };
        (ns.as_str(), doc, &symbols.functions, &symbols.classes)
    });

    for (ns, doc, functions, classes) in flat_root.into_iter().chain(namespaced) {
        let namespace: Vec<String> = ns.split('.').filter(|s| !s.is_empty()).map(String::from).collect();
        let py_path = if namespace.is_empty() {
            manifest.module.clone()
        } else {
            format!("{}.{}", manifest.module, namespace.join("."))
        };

        let mut module = normalize_namespace(&py_path, namespace, functions, classes);
        module.doc = doc.map(|d| render_doc(Some(d), &py_path));
        debug!(
            module = %module.py_path,
            functions = module.functions.len(),
            classes = module.classes.len(),
            "normalized namespace"
        );
        modules.push(module);
    }

    modules.sort_by(|a, b| a.namespace.cmp(&b.namespace));
    LibraryIR {
        library: manifest.module.clone(),
        version: manifest.module_version.clone(),
        modules,
    }
}

fn normalize_namespace(
    py_path: &str,
    namespace: Vec<String>,
    functions: &[FunctionDesc],
    classes: &[ClassDesc],
) -> ModuleIR {
    let mut scope = NameScope::new();
    let mut bindings = Vec::new();

    let mut sorted_fns: Vec<&FunctionDesc> =
        functions.iter().filter(|f| !is_private(&f.name)).collect();
    sorted_fns.sort_by(|a, b| a.name.cmp(&b.name));
    for func in sorted_fns {
        let ident = scope.function(&func.name);
        bindings.push(lower_function(func, ident, py_path, &func.parameters));
    }

    let mut sorted_classes: Vec<&ClassDesc> =
        classes.iter().filter(|c| !is_private(&c.name)).collect();
    sorted_classes.sort_by(|a, b| a.name.cmp(&b.name));
    let classes = sorted_classes
        .into_iter()
        .map(|class| lower_class(class, py_path))
        .collect();

    ModuleIR {
        namespace,
        py_path: py_path.to_string(),
        doc: None,
        functions: bindings,
        classes,
    }
}

fn lower_class(class: &ClassDesc, py_path: &str) -> ClassBinding {
    let qualified = format!("{py_path}.{}", class.name);
    let mut scope = NameScope::for_class();

    let mut constructor = None;
    let mut sorted_methods: Vec<&FunctionDesc> = class
        .methods
        .iter()
        .filter(|m| m.name == "__init__" || !is_private(&m.name))
        .collect();
    sorted_methods.sort_by(|a, b| a.name.cmp(&b.name));

    let mut methods = Vec::new();
    for method in sorted_methods {
        let params = drop_receiver(&method.parameters);
        if method.name == "__init__" {
            constructor = Some(ConstructorBinding {
                plan: plan_call(params),
                doc: render_doc(method.docstring.as_ref(), &qualified),
            });
        } else {
            let ident = scope.method(&method.name);
            methods.push(lower_function(method, ident, &qualified, params));
        }
    }

    let mut sorted_attrs: Vec<&PropertyDesc> =
        class.properties.iter().filter(|p| !is_private(&p.name)).collect();
    sorted_attrs.sort_by(|a, b| a.name.cmp(&b.name));
    let attrs = sorted_attrs
        .into_iter()
        .map(|attr| AttrBinding {
            ident: scope.attr(&attr.name),
            source: attr.name.clone(),
            ty: attr.ty.as_ref().map_or_else(TsType::unknown, map_type),
            doc: render_doc(attr.docstring.as_ref(), &format!("{qualified}.{}", attr.name)),
        })
        .collect();

    ClassBinding {
        name: sanitize_identifier(&class.name),
        source: class.name.clone(),
        doc: render_doc(class.docstring.as_ref(), &qualified),
        constructor: constructor.unwrap_or_else(|| ConstructorBinding {
            plan: plan_call(&[]),
            doc: format!("/** Binding for `{qualified}`. */"),
        }),
        qualified,
        methods,
        attrs,
    }
}

fn lower_function(
    func: &FunctionDesc,
    ident: String,
    parent_path: &str,
    params: &[ParameterDesc],
) -> FunctionBinding {
    let qualified = format!("{parent_path}.{}", func.name);
    let plan: CallPlan = plan_call(params);

    let mut type_params = BTreeSet::new();
    for param in params {
        if let Some(ty) = &param.ty {
            collect_type_params(ty, &mut type_params);
        }
    }
    if let Some(ret) = &func.return_type {
        collect_type_params(ret, &mut type_params);
    }

    FunctionBinding {
        ident,
        source: func.name.clone(),
        doc: render_doc(func.docstring.as_ref(), &qualified),
        qualified,
        plan,
        ret: func.return_type.as_ref().map_or_else(TsType::unknown, map_type),
        type_params: type_params.into_iter().collect(),
    }
}

/// Strip a leading `self`/`cls` receiver from a method parameter list.
fn drop_receiver(params: &[ParameterDesc]) -> &[ParameterDesc] {
    match params.first() {
        Some(first) if first.name == "self" || first.name == "cls" => &params[1..],
        _ => params,
    }
}

/// Leading-underscore symbols are private; dunders other than `__init__`
/// have no call surface worth wrapping.
fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> Manifest {
        Manifest::from_json(json).unwrap()
    }

    #[test]
    fn test_flat_manifest_becomes_root_module() {
        let m = manifest(
            r#"{
                "module": "stats",
                "version": "2.0",
                "functions": [{"name": "mean", "parameters": []}],
                "classes": []
            }"#,
        );
        let ir = normalize(&m);
        assert_eq!(ir.library, "stats");
        assert_eq!(ir.modules.len(), 1);
        assert!(ir.modules[0].namespace.is_empty());
        assert_eq!(ir.modules[0].py_path, "stats");
        assert_eq!(ir.modules[0].functions[0].ident, "mean");
        assert_eq!(ir.modules[0].functions[0].qualified, "stats.mean");
    }

    #[test]
    fn test_namespaces_sorted_and_pathed() {
        let m = manifest(
            r#"{
                "module": "mylib",
                "version": "2.1",
                "namespaces": {
                    "util.text": {"functions": [{"name": "join"}]},
                    "": {"functions": [{"name": "top"}]}
                }
            }"#,
        );
        let ir = normalize(&m);
        assert_eq!(ir.modules.len(), 2);
        assert_eq!(ir.modules[0].py_path, "mylib");
        assert_eq!(ir.modules[1].py_path, "mylib.util.text");
        assert_eq!(ir.modules[1].namespace, vec!["util", "text"]);
    }

    #[test]
    fn test_init_becomes_constructor_and_self_dropped() {
        let m = manifest(
            r#"{
                "module": "geometry",
                "version": "2.1",
                "namespaces": {
                    "": {"classes": [{
                        "name": "Point",
                        "methods": [
                            {"name": "__init__", "parameters": [
                                {"name": "self", "kind": "positional_or_keyword", "required": true},
                                {"name": "x", "kind": "positional_or_keyword", "required": true,
                                 "type": {"type": "float"}}
                            ]},
                            {"name": "magnitude", "parameters": [
                                {"name": "self", "kind": "positional_or_keyword", "required": true}
                            ], "return_type": {"type": "float"}},
                            {"name": "__repr__", "parameters": []}
                        ],
                        "properties": [{"name": "x", "type": {"type": "float"}}]
                    }]}
                }
            }"#,
        );
        let ir = normalize(&m);
        let class = &ir.modules[0].classes[0];
        assert_eq!(class.name, "Point");
        assert_eq!(class.qualified, "geometry.Point");
        // __init__ lowered to the constructor, self stripped
        assert_eq!(class.constructor.plan.fixed.len(), 1);
        assert_eq!(class.constructor.plan.fixed[0].ident, "x");
        // __repr__ skipped, magnitude kept with zero caller params
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].ident, "magnitude");
        assert!(class.methods[0].plan.fixed.is_empty());
        assert_eq!(class.attrs[0].ident, "x");
    }

    #[test]
    fn test_class_without_init_gets_empty_constructor() {
        let m = manifest(
            r#"{
                "module": "m",
                "version": "2.1",
                "namespaces": {"": {"classes": [{"name": "EmptyClass"}]}}
            }"#,
        );
        let ir = normalize(&m);
        let class = &ir.modules[0].classes[0];
        assert!(class.constructor.plan.fixed.is_empty());
        assert!(class.constructor.plan.options.is_plain());
        assert_eq!(class.constructor.doc, "/** Binding for `m.EmptyClass`. */");
    }

    #[test]
    fn test_method_attr_collision_resolved() {
        let m = manifest(
            r#"{
                "module": "m",
                "version": "2.1",
                "namespaces": {"": {"classes": [{
                    "name": "Robot",
                    "methods": [{"name": "pos", "parameters": [
                        {"name": "self", "kind": "positional_or_keyword", "required": true}
                    ]}],
                    "properties": [{"name": "POS"}]
                }]}}
            }"#,
        );
        let ir = normalize(&m);
        let class = &ir.modules[0].classes[0];
        assert_eq!(class.methods[0].ident, "pos");
        assert_eq!(class.attrs[0].ident, "pos_attr");
        assert_eq!(class.attrs[0].source, "POS");
    }

    #[test]
    fn test_private_symbols_skipped() {
        let m = manifest(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{"name": "_hidden"}, {"name": "visible"}]
            }"#,
        );
        let ir = normalize(&m);
        assert_eq!(ir.modules[0].functions.len(), 1);
        assert_eq!(ir.modules[0].functions[0].ident, "visible");
    }

    #[test]
    fn test_type_params_collected_from_signature() {
        let m = manifest(
            r#"{
                "module": "m",
                "version": "2.0",
                "functions": [{
                    "name": "first",
                    "parameters": [{
                        "name": "items", "kind": "positional_or_keyword", "required": true,
                        "type": {"type": "list", "element_type": {
                            "type": "typevar", "name": "T"
                        }}
                    }],
                    "return_type": {"type": "typevar", "name": "T"}
                }]
            }"#,
        );
        let ir = normalize(&m);
        assert_eq!(ir.modules[0].functions[0].type_params, vec!["T".to_string()]);
    }
}
