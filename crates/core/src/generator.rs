//! End-to-end generation: manifest JSON in, TypeScript tree out.
//!
//! The pipeline is parse → validate → normalize → layout → render/write.
//! Everything up to layout is pure; rendering and writing fan out over the
//! planned files with rayon since every file targets a distinct path.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::ir::codegen::{CodegenContext, render_file};
use crate::ir::emit::Emit;
use crate::ir::normalize::normalize;
use crate::layout::plan_layout;
use crate::manifest::Manifest;
use crate::writer::write_if_changed;

/// Generation settings.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Destination root for the generated tree.
    pub out_dir: PathBuf,
    /// Module specifier the generated code imports the runtime dispatcher
    /// from.
    pub runtime_import: String,
    /// Optional dotted prefix stripped from the library module path before
    /// it becomes directories.
    pub strip_prefix: Option<String>,
}

impl GenerateConfig {
    /// Config with defaults for everything but the destination.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            runtime_import: "@pyts/runtime".to_string(),
            strip_prefix: None,
        }
    }
}

/// What a generation run did.
#[derive(Debug)]
pub struct GenerateReport {
    /// Files written because they were new or had changed.
    pub written: usize,
    /// Files skipped because they were already up to date.
    pub unchanged: usize,
    /// All planned file paths, relative to the destination root.
    pub files: Vec<PathBuf>,
}

/// Generate TypeScript bindings from a probe manifest.
pub fn generate(manifest_json: &str, config: &GenerateConfig) -> Result<GenerateReport, Error> {
    let manifest = Manifest::from_json(manifest_json)?;
    manifest.validate()?;
    if let Some(version) = manifest.version.as_deref() {
        if version != "2.0" && version != "2.1" {
            warn!(version, "unrecognized manifest version, proceeding anyway");
        }
    }

    let ir = normalize(&manifest);
    let plan = plan_layout(&ir, config.strip_prefix.as_deref());
    debug!(
        library = %ir.library,
        modules = ir.modules.len(),
        files = plan.files.len(),
        "planned generation"
    );

    let ctx = CodegenContext { ir: &ir, runtime_import: &config.runtime_import };
    let outcomes: Vec<(PathBuf, bool)> = plan
        .files
        .par_iter()
        .map(|file| {
            let content = render_file(&ctx, file).emit();
            check_balanced(&file.rel_path, &content)?;
            let wrote = write_if_changed(&config.out_dir.join(&file.rel_path), &content)?;
            Ok((file.rel_path.clone(), wrote))
        })
        .collect::<Result<_, Error>>()?;

    let written = outcomes.iter().filter(|(_, wrote)| *wrote).count();
    let report = GenerateReport {
        written,
        unchanged: outcomes.len() - written,
        files: outcomes.into_iter().map(|(path, _)| path).collect(),
    };
    info!(
        library = %ir.library,
        written = report.written,
        unchanged = report.unchanged,
        "generation complete"
    );
    Ok(report)
}

/// Sanity-check rendered output: brackets, braces, and parens must balance
/// outside string literals and comments. A failure here is a generator
/// defect, never an input problem.
fn check_balanced(path: &Path, content: &str) -> Result<(), Error> {
    let internal = |reason: String| Error::Internal { path: path.to_path_buf(), reason };

    let mut stack = Vec::new();
    let mut chars = content.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        match c {
            '/' => match chars.peek() {
                Some((_, '/')) => {
                    for (_, c) in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some((_, '*')) => {
                    chars.next();
                    let mut prev = '\0';
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            closed = true;
                            break;
                        }
                        prev = c;
                    }
                    if !closed {
                        return Err(internal("unterminated block comment".to_string()));
                    }
                }
                _ => {}
            },
            '"' | '\'' | '`' => {
                let quote = c;
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '\\' {
                        chars.next();
                    } else if c == quote {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(internal(format!("unterminated {quote} string")));
                }
            }
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return Err(internal(format!("unbalanced `{c}` at byte {pos}")));
                }
            }
            _ => {}
        }
    }
    if let Some(open) = stack.pop() {
        return Err(internal(format!("unclosed `{open}`")));
    }
    Ok(())
}
