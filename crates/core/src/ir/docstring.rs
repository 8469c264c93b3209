//! Docstring parsing and TSDoc rendering.
//!
//! Source docstrings arrive either raw or pre-parsed by the probe. Raw text
//! is classified into one of four dialects by its markers:
//!
//! - numpydoc: section headers underlined with dashes (`Parameters\n----------`)
//! - Google: `Args:` / `Returns:` / `Raises:` headers
//! - Sphinx: `:param name:` field lists
//! - Epytext: `@param name:` fields
//!
//! Anything else passes through verbatim (first line as summary). Parsing
//! never fails; malformed or absent input falls back to a one-line
//! `Binding for ...` comment so every generated symbol carries a doc block.

use crate::manifest::{Docstring, ParsedDocstring};

/// Parsed, dialect-independent docstring content.
#[derive(Debug, Default)]
struct DocModel {
    summary: Option<String>,
    description: Vec<String>,
    params: Vec<(String, String)>,
    returns: Option<String>,
    raises: Vec<(String, String)>,
    /// Example blocks, verbatim lines with `>>>` prompts.
    examples: Vec<Vec<String>>,
}

impl DocModel {
    fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_empty()
            && self.params.is_empty()
            && self.returns.is_none()
            && self.raises.is_empty()
            && self.examples.is_empty()
    }
}

/// Render a TSDoc block for a symbol. `qualified` is the fully dotted source
/// name, used for the fallback comment.
pub fn render_doc(doc: Option<&Docstring>, qualified: &str) -> String {
    let model = match doc {
        Some(Docstring::Raw(text)) => parse_raw(text),
        Some(Docstring::Parsed(parsed)) => {
            let model = from_parsed(parsed);
            // a probe parse that kept only the raw text still gets rendered
            match (model.is_empty(), parsed.raw.as_deref()) {
                (true, Some(raw)) => parse_raw(raw),
                _ => model,
            }
        }
        None => DocModel::default(),
    };
    if model.is_empty() {
        return format!("/** Binding for `{qualified}`. */");
    }
    render(&model)
}

fn from_parsed(parsed: &ParsedDocstring) -> DocModel {
    let mut model = DocModel {
        summary: parsed.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
        ..DocModel::default()
    };
    if let Some(desc) = &parsed.description {
        let lines: Vec<String> = desc.lines().map(String::from).collect();
        let (body, examples) = split_examples(&lines);
        model.description = body;
        model.examples = examples;
    }
    for p in &parsed.params {
        if let Some(name) = p.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let desc = p.description.as_deref().unwrap_or("").trim().to_string();
            model.params.push((name.to_string(), desc));
        }
    }
    model.returns = parsed
        .returns
        .as_ref()
        .and_then(|r| r.description.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    for r in &parsed.raises {
        let exc = r.exception.as_deref().unwrap_or("Exception").trim().to_string();
        let desc = r.description.as_deref().unwrap_or("").trim().to_string();
        model.raises.push((exc, desc));
    }
    model
}

// =============================================================================
// Dialect detection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Numpydoc,
    Google,
    Sphinx,
    Epytext,
    Plain,
}

const NUMPY_SECTIONS: &[&str] = &[
    "Parameters", "Returns", "Raises", "Examples", "Yields", "Notes", "See Also", "Attributes",
    "Other Parameters", "Warns", "References",
];

const GOOGLE_SECTIONS: &[&str] =
    &["Args:", "Arguments:", "Returns:", "Raises:", "Yields:", "Example:", "Examples:", "Note:"];

fn detect(text: &str) -> Dialect {
    let lines: Vec<&str> = text.lines().collect();
    for window in lines.windows(2) {
        let header = window[0].trim();
        let underline = window[1].trim();
        if NUMPY_SECTIONS.contains(&header)
            && !underline.is_empty()
            && underline.chars().all(|c| c == '-')
        {
            return Dialect::Numpydoc;
        }
    }
    if lines.iter().any(|l| GOOGLE_SECTIONS.contains(&l.trim())) {
        return Dialect::Google;
    }
    if text.contains(":param ")
        || text.contains(":type ")
        || text.contains(":returns:")
        || text.contains(":return:")
        || text.contains(":raises ")
    {
        return Dialect::Sphinx;
    }
    if lines.iter().any(|l| {
        let t = l.trim();
        t.starts_with("@param ") || t.starts_with("@return") || t.starts_with("@raise")
    }) {
        return Dialect::Epytext;
    }
    Dialect::Plain
}

fn parse_raw(text: &str) -> DocModel {
    let text = text.trim_end();
    if text.trim().is_empty() {
        return DocModel::default();
    }
    match detect(text) {
        Dialect::Numpydoc => parse_numpydoc(text),
        Dialect::Google => parse_google(text),
        Dialect::Sphinx => parse_fields(text, FieldSyntax::Sphinx),
        Dialect::Epytext => parse_fields(text, FieldSyntax::Epytext),
        Dialect::Plain => parse_plain(text),
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Split body lines into description text and `>>>` example blocks. An
/// example block starts at a `>>>` line and runs to the next blank line.
fn split_examples(lines: &[String]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut body = Vec::new();
    let mut examples = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim_start().starts_with(">>>") {
            let mut block = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() {
                block.push(lines[i].trim().to_string());
                i += 1;
            }
            examples.push(block);
        } else {
            body.push(lines[i].clone());
            i += 1;
        }
    }
    // trim leading/trailing blank description lines
    while body.first().is_some_and(|l| l.trim().is_empty()) {
        body.remove(0);
    }
    while body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }
    (body, examples)
}

/// Consume leading body text: first non-empty line becomes the summary, the
/// rest (with `>>>` blocks pulled out) the description.
fn take_body(lines: &[String], model: &mut DocModel) {
    let mut rest = lines.to_vec();
    while rest.first().is_some_and(|l| l.trim().is_empty()) {
        rest.remove(0);
    }
    if rest.is_empty() {
        return;
    }
    model.summary = Some(rest.remove(0).trim().to_string());
    let rest: Vec<String> = rest.iter().map(|l| l.trim().to_string()).collect();
    let (body, examples) = split_examples(&rest);
    model.description = body;
    model.examples.extend(examples);
}

fn parse_plain(text: &str) -> DocModel {
    let mut model = DocModel::default();
    let lines: Vec<String> = text.lines().map(String::from).collect();
    take_body(&lines, &mut model);
    model
}

// =============================================================================
// numpydoc
// =============================================================================

fn parse_numpydoc(text: &str) -> DocModel {
    let lines: Vec<String> = text.lines().map(String::from).collect();
    let mut model = DocModel::default();

    // section start indices: header line followed by a dash underline
    let mut sections: Vec<(usize, String)> = Vec::new();
    for i in 0..lines.len().saturating_sub(1) {
        let header = lines[i].trim();
        let underline = lines[i + 1].trim();
        if NUMPY_SECTIONS.contains(&header)
            && !underline.is_empty()
            && underline.chars().all(|c| c == '-')
        {
            sections.push((i, header.to_string()));
        }
    }

    let body_end = sections.first().map_or(lines.len(), |(i, _)| *i);
    take_body(&lines[..body_end], &mut model);

    for (idx, (start, name)) in sections.iter().enumerate() {
        let end = sections.get(idx + 1).map_or(lines.len(), |(i, _)| *i);
        let content = &lines[start + 2..end];
        match name.as_str() {
            "Parameters" | "Other Parameters" | "Attributes" => {
                for (entry_name, desc) in parse_numpy_entries(content) {
                    // strip a trailing " : type" annotation from the name
                    let clean = entry_name.split(" : ").next().unwrap_or(&entry_name).trim();
                    model.params.push((clean.to_string(), desc));
                }
            }
            "Returns" | "Yields" => {
                let entries = parse_numpy_entries(content);
                let text = entries
                    .iter()
                    .map(|(name, desc)| if desc.is_empty() { name.clone() } else { desc.clone() })
                    .collect::<Vec<_>>()
                    .join(" ");
                if !text.trim().is_empty() {
                    model.returns = Some(text.trim().to_string());
                }
            }
            "Raises" | "Warns" => {
                for (exc, desc) in parse_numpy_entries(content) {
                    model.raises.push((exc, desc));
                }
            }
            "Examples" => {
                let content: Vec<String> = content.iter().map(|l| l.trim().to_string()).collect();
                let (extra_desc, examples) = split_examples(&content);
                model.examples.extend(examples);
                model.description.extend(extra_desc);
            }
            _ => {
                for line in content {
                    let t = line.trim();
                    if !t.is_empty() {
                        model.description.push(t.to_string());
                    }
                }
            }
        }
    }
    model
}

/// Parse `name\n    description` entries from a numpydoc section body.
fn parse_numpy_entries(content: &[String]) -> Vec<(String, String)> {
    let base = content
        .iter()
        .find(|l| !l.trim().is_empty())
        .map_or(0, |l| indent_of(l));
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();
    for line in content {
        if line.trim().is_empty() {
            continue;
        }
        if indent_of(line) <= base {
            entries.push((line.trim().to_string(), Vec::new()));
        } else if let Some(last) = entries.last_mut() {
            last.1.push(line.trim().to_string());
        }
    }
    entries.into_iter().map(|(name, desc)| (name, desc.join(" "))).collect()
}

// =============================================================================
// Google style
// =============================================================================

fn parse_google(text: &str) -> DocModel {
    let lines: Vec<String> = text.lines().map(String::from).collect();
    let mut model = DocModel::default();

    let first_section = lines
        .iter()
        .position(|l| GOOGLE_SECTIONS.contains(&l.trim()))
        .unwrap_or(lines.len());
    take_body(&lines[..first_section], &mut model);

    let mut i = first_section;
    while i < lines.len() {
        let header = lines[i].trim().to_string();
        i += 1;
        let mut content = Vec::new();
        while i < lines.len() && !GOOGLE_SECTIONS.contains(&lines[i].trim()) {
            content.push(lines[i].clone());
            i += 1;
        }
        match header.as_str() {
            "Args:" | "Arguments:" => {
                for (name, desc) in parse_google_entries(&content) {
                    // strip a parenthesized type: `axis (int, optional)`
                    let clean = name.split(" (").next().unwrap_or(&name).trim();
                    model.params.push((clean.to_string(), desc));
                }
            }
            "Returns:" | "Yields:" => {
                let text =
                    content.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect::<Vec<_>>();
                if !text.is_empty() {
                    model.returns = Some(text.join(" "));
                }
            }
            "Raises:" => {
                for (exc, desc) in parse_google_entries(&content) {
                    model.raises.push((exc, desc));
                }
            }
            "Example:" | "Examples:" => {
                let content: Vec<String> = content.iter().map(|l| l.trim().to_string()).collect();
                let (extra_desc, examples) = split_examples(&content);
                model.examples.extend(examples);
                model.description.extend(extra_desc);
            }
            _ => {
                for line in &content {
                    let t = line.trim();
                    if !t.is_empty() {
                        model.description.push(t.to_string());
                    }
                }
            }
        }
    }
    model
}

/// Parse `name: description` entries with indented continuations from a
/// Google-style section body.
fn parse_google_entries(content: &[String]) -> Vec<(String, String)> {
    let base = content
        .iter()
        .find(|l| !l.trim().is_empty())
        .map_or(0, |l| indent_of(l));
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();
    for line in content {
        if line.trim().is_empty() {
            continue;
        }
        let t = line.trim();
        if indent_of(line) <= base {
            match t.split_once(':') {
                Some((name, desc)) => {
                    entries.push((name.trim().to_string(), vec![desc.trim().to_string()]));
                }
                None => entries.push((t.to_string(), Vec::new())),
            }
        } else if let Some(last) = entries.last_mut() {
            last.1.push(t.to_string());
        }
    }
    entries
        .into_iter()
        .map(|(name, desc)| {
            let joined = desc.iter().filter(|d| !d.is_empty()).cloned().collect::<Vec<_>>().join(" ");
            (name, joined)
        })
        .collect()
}

// =============================================================================
// Sphinx & Epytext field lists
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSyntax {
    /// `:param name: desc`
    Sphinx,
    /// `@param name: desc`
    Epytext,
}

fn parse_fields(text: &str, syntax: FieldSyntax) -> DocModel {
    let lines: Vec<String> = text.lines().map(String::from).collect();
    let mut model = DocModel::default();

    let is_field_start = |line: &str| -> bool {
        let t = line.trim_start();
        match syntax {
            FieldSyntax::Sphinx => t.starts_with(':') && t[1..].contains(':'),
            FieldSyntax::Epytext => t.starts_with('@') && t.contains(':'),
        }
    };

    let first_field = lines.iter().position(|l| is_field_start(l)).unwrap_or(lines.len());
    take_body(&lines[..first_field], &mut model);

    let mut i = first_field;
    while i < lines.len() {
        if !is_field_start(&lines[i]) {
            i += 1;
            continue;
        }
        let t = lines[i].trim_start();
        let (tag, rest) = match syntax {
            FieldSyntax::Sphinx => {
                // `:param values: the values` -> tag "param values", rest of line
                let inner = &t[1..];
                match inner.split_once(':') {
                    Some((tag, rest)) => (tag.trim().to_string(), rest.trim().to_string()),
                    None => (inner.trim().to_string(), String::new()),
                }
            }
            FieldSyntax::Epytext => {
                let inner = &t[1..];
                match inner.split_once(':') {
                    Some((tag, rest)) => (tag.trim().to_string(), rest.trim().to_string()),
                    None => (inner.trim().to_string(), String::new()),
                }
            }
        };
        // gather indented continuation lines
        let mut desc_parts = vec![rest];
        i += 1;
        while i < lines.len() && !is_field_start(&lines[i]) && !lines[i].trim().is_empty() {
            desc_parts.push(lines[i].trim().to_string());
            i += 1;
        }
        let desc = desc_parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");

        let mut words = tag.split_whitespace();
        match words.next() {
            Some("param" | "arg" | "argument" | "key" | "keyword") => {
                // last word is the name; Sphinx allows `:param str sep:`
                if let Some(name) = words.next_back() {
                    model.params.push((name.to_string(), desc));
                }
            }
            Some("return" | "returns") => {
                if !desc.is_empty() {
                    model.returns = Some(desc);
                }
            }
            Some("raise" | "raises" | "except" | "exception") => {
                let exc = words.next().unwrap_or("Exception").to_string();
                model.raises.push((exc, desc));
            }
            // type annotations and anything unrecognized are dropped
            _ => {}
        }
    }
    model
}

// =============================================================================
// Rendering
// =============================================================================

/// Rewrite reST math markup to TeX delimiters and neutralize `*/`.
fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    // inline :math:`...`
    while let Some(start) = rest.find(":math:`") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 7..];
        match after.find('`') {
            Some(end) => {
                out.push('$');
                out.push_str(&after[..end]);
                out.push('$');
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    // block directive on a single line
    if let Some(stripped) = out.trim_start().strip_prefix(".. math::") {
        let expr = stripped.trim();
        if !expr.is_empty() {
            out = format!("${expr}$");
        }
    }
    out.replace("*/", "*\\/")
}

fn render(model: &DocModel) -> String {
    let mut lines: Vec<String> = vec!["/**".to_string()];
    let mut push = |text: &str| {
        if text.is_empty() {
            lines.push(" *".to_string());
        } else {
            lines.push(format!(" * {text}"));
        }
    };

    let mut need_blank = false;
    if let Some(summary) = &model.summary {
        push(&clean_text(summary));
        need_blank = true;
    }
    if !model.description.is_empty() {
        if need_blank {
            push("");
        }
        for line in &model.description {
            push(&clean_text(line));
        }
        need_blank = true;
    }
    if !model.params.is_empty() {
        if need_blank {
            push("");
        }
        push("Parameters:");
        for (name, desc) in &model.params {
            if desc.is_empty() {
                push(&format!("- {name}"));
            } else {
                push(&clean_text(&format!("- {name} — {desc}")));
            }
        }
        need_blank = true;
    }
    if let Some(returns) = &model.returns {
        if need_blank {
            push("");
        }
        push(&clean_text(&format!("Returns: {returns}")));
        need_blank = true;
    }
    if !model.raises.is_empty() {
        if need_blank {
            push("");
        }
        push("Raises:");
        for (exc, desc) in &model.raises {
            if desc.is_empty() {
                push(&format!("- {exc}"));
            } else {
                push(&clean_text(&format!("- {exc} — {desc}")));
            }
        }
        need_blank = true;
    }
    for example in &model.examples {
        if need_blank {
            push("");
        }
        push("@example");
        for line in example {
            let rewritten = if let Some(rest) = line.strip_prefix(">>>") {
                format!(">{rest}")
            } else {
                line.clone()
            };
            push(&clean_text(&rewritten));
        }
        need_blank = true;
    }

    lines.push(" */".to_string());
    lines.join("\n")
}
