//! Deterministic file layout planning.
//!
//! Each namespace becomes a nested directory with an `index.ts`; each class
//! becomes a sibling file next to its namespace index. Ancestor directories
//! that carry no symbols of their own still get a re-export-only index, so
//! the tree is navigable with no gaps. All naming decisions are resolved
//! here, before any rendering happens, so files can be rendered and written
//! in parallel.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::debug;

use crate::ir::binding::LibraryIR;
use crate::ir::utils::{sanitize_identifier, to_snake_case};

/// The planned output tree.
#[derive(Debug)]
pub struct LayoutPlan {
    /// Planned files, sorted by relative path.
    pub files: Vec<PlannedFile>,
}

/// One output file: where it goes and what it renders from.
#[derive(Debug)]
pub struct PlannedFile {
    /// Path relative to the destination root.
    pub rel_path: PathBuf,
    /// Fully dotted source module path for the `__pyModule` constant.
    pub py_path: String,
    /// What the file contains.
    pub kind: FileKind,
}

/// File content selector, referencing the IR by index.
#[derive(Debug)]
pub enum FileKind {
    /// `index.ts` for a namespace that carries symbols.
    ModuleIndex {
        /// Index into `LibraryIR::modules`.
        module: usize,
        /// Names re-exported from child directories and class files.
        reexports: Vec<String>,
    },
    /// Sibling file for one class.
    Class {
        /// Index into `LibraryIR::modules`.
        module: usize,
        /// Index into that module's `classes`.
        class: usize,
    },
    /// Re-export-only `index.ts` for an ancestor with no direct symbols.
    GapIndex {
        /// Names re-exported from child directories.
        reexports: Vec<String>,
    },
}

/// Plan the output tree for a library.
///
/// `strip_prefix` removes a leading dotted prefix from the library module
/// path before it turns into directories, so `mylib` bindings can land at
/// the destination root instead of under `mylib/`.
pub fn plan_layout(ir: &LibraryIR, strip_prefix: Option<&str>) -> LayoutPlan {
    let (stripped, lib_segments) = split_library(&ir.library, strip_prefix);

    // directory of every module
    let mut module_dirs: BTreeMap<Vec<String>, usize> = BTreeMap::new();
    for (idx, module) in ir.modules.iter().enumerate() {
        let mut dir = lib_segments.clone();
        dir.extend(module.namespace.iter().cloned());
        module_dirs.insert(dir, idx);
    }

    // every directory that must exist, including symbol-less ancestors
    let mut all_dirs: BTreeSet<Vec<String>> = module_dirs.keys().cloned().collect();
    for dir in module_dirs.keys() {
        for len in 0..dir.len() {
            all_dirs.insert(dir[..len].to_vec());
        }
    }

    let mut files = Vec::new();
    for dir in &all_dirs {
        let children: Vec<String> = all_dirs
            .iter()
            .filter(|d| d.len() == dir.len() + 1 && d.starts_with(dir))
            .filter_map(|d| d.last().cloned())
            .collect();

        // the synthetic root above `<lib>/` corresponds to no source module
        // and must not claim the library's own path
        let py_path = {
            let mut dotted = stripped.clone();
            dotted.extend(dir.iter().cloned());
            dotted.join(".")
        };

        match module_dirs.get(dir) {
            Some(&module_idx) => {
                let module = &ir.modules[module_idx];

                // class file stems, deconflicted against child dirs and the index
                let mut taken: BTreeSet<String> = children.iter().cloned().collect();
                taken.insert("index".to_string());
                let mut stems = Vec::new();
                for class in &module.classes {
                    let mut stem = sanitize_identifier(&to_snake_case(&class.source));
                    while taken.contains(&stem) {
                        stem.push_str("_cls");
                    }
                    taken.insert(stem.clone());
                    stems.push(stem);
                }

                for (class_idx, stem) in stems.iter().enumerate() {
                    files.push(PlannedFile {
                        rel_path: file_path(dir, &format!("{stem}.ts")),
                        py_path: py_path.clone(),
                        kind: FileKind::Class { module: module_idx, class: class_idx },
                    });
                }

                let mut reexports: Vec<String> = children.iter().cloned().chain(stems).collect();
                reexports.sort();
                files.push(PlannedFile {
                    rel_path: file_path(dir, "index.ts"),
                    py_path,
                    kind: FileKind::ModuleIndex { module: module_idx, reexports },
                });
            }
            None => {
                files.push(PlannedFile {
                    rel_path: file_path(dir, "index.ts"),
                    py_path,
                    kind: FileKind::GapIndex { reexports: children },
                });
            }
        }
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    debug!(files = files.len(), "planned output layout");
    LayoutPlan { files }
}

/// Split the library module path into the stripped prefix and the segments
/// that become directories.
fn split_library(library: &str, strip_prefix: Option<&str>) -> (Vec<String>, Vec<String>) {
    let segments: Vec<String> = library.split('.').map(String::from).collect();
    let Some(prefix) = strip_prefix.filter(|p| !p.is_empty()) else {
        return (Vec::new(), segments);
    };
    let prefix_segments: Vec<String> = prefix.split('.').map(String::from).collect();
    if segments.starts_with(&prefix_segments) {
        let rest = segments[prefix_segments.len()..].to_vec();
        (prefix_segments, rest)
    } else {
        (Vec::new(), segments)
    }
}

fn file_path(dir: &[String], name: &str) -> PathBuf {
    let mut path: PathBuf = dir.iter().collect();
    path.push(name);
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::binding::ModuleIR;
    use crate::ir::normalize::normalize;
    use crate::manifest::Manifest;

    fn ir(json: &str) -> LibraryIR {
        normalize(&Manifest::from_json(json).unwrap())
    }

    fn paths(plan: &LayoutPlan) -> Vec<String> {
        plan.files.iter().map(|f| f.rel_path.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_nested_namespace_directories() {
        let ir = ir(
            r#"{
                "module": "mylib",
                "version": "2.1",
                "namespaces": {
                    "": {"functions": [{"name": "top"}]},
                    "util.text": {"functions": [{"name": "join"}]}
                }
            }"#,
        );
        let plan = plan_layout(&ir, None);
        assert_eq!(
            paths(&plan),
            vec!["index.ts", "mylib/index.ts", "mylib/util/index.ts", "mylib/util/text/index.ts"]
        );
        // the root above mylib/ maps to no source module, unlike mylib itself
        assert_eq!(plan.files[0].py_path, "");
        assert_eq!(plan.files[1].py_path, "mylib");
        // mylib.util carries no symbols: gap index re-exporting its child
        let gap = &plan.files[2];
        assert_eq!(gap.py_path, "mylib.util");
        match &gap.kind {
            FileKind::GapIndex { reexports } => assert_eq!(reexports, &vec!["text".to_string()]),
            other => panic!("expected gap index, got {other:?}"),
        }
    }

    #[test]
    fn test_strip_prefix_moves_root() {
        let ir = ir(
            r#"{
                "module": "mylib",
                "version": "2.1",
                "namespaces": {"geometry": {"functions": [{"name": "area"}]}}
            }"#,
        );
        let plan = plan_layout(&ir, Some("mylib"));
        assert_eq!(paths(&plan), vec!["geometry/index.ts", "index.ts"]);
        // the python path keeps the stripped prefix
        assert_eq!(plan.files[0].py_path, "mylib.geometry");
        assert_eq!(plan.files[1].py_path, "mylib");
    }

    #[test]
    fn test_class_sibling_files_and_dedup() {
        let ir = ir(
            r#"{
                "module": "mylib",
                "version": "2.1",
                "namespaces": {
                    "": {"classes": [{"name": "Index"}, {"name": "Text"}]},
                    "text": {"functions": [{"name": "join"}]}
                }
            }"#,
        );
        let plan = plan_layout(&ir, Some("mylib"));
        let got = paths(&plan);
        // `Index` collides with index.ts, `Text` with the text/ directory
        assert!(got.contains(&"index_cls.ts".to_string()));
        assert!(got.contains(&"text_cls.ts".to_string()));
        assert!(got.contains(&"text/index.ts".to_string()));

        let root_index = plan
            .files
            .iter()
            .find(|f| f.rel_path.to_string_lossy() == "index.ts")
            .unwrap();
        match &root_index.kind {
            FileKind::ModuleIndex { reexports, .. } => {
                assert_eq!(
                    reexports,
                    &vec!["index_cls".to_string(), "text".to_string(), "text_cls".to_string()]
                );
            }
            other => panic!("expected module index, got {other:?}"),
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let json = r#"{
            "module": "mylib",
            "version": "2.1",
            "namespaces": {
                "a": {"functions": [{"name": "f"}]},
                "b.c": {"classes": [{"name": "D"}]}
            }
        }"#;
        let a = paths(&plan_layout(&ir(json), None));
        let b = paths(&plan_layout(&ir(json), None));
        assert_eq!(a, b);
    }

    #[test]
    fn test_module_without_namespace_is_root() {
        let lib = LibraryIR {
            library: "solo".to_string(),
            version: None,
            modules: vec![ModuleIR {
                namespace: vec![],
                py_path: "solo".to_string(),
                doc: None,
                functions: vec![],
                classes: vec![],
            }],
        };
        let plan = plan_layout(&lib, Some("solo"));
        assert_eq!(paths(&plan), vec!["index.ts"]);
        assert_eq!(plan.files[0].py_path, "solo");
    }
}
