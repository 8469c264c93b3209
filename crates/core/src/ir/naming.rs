//! Deterministic identifier resolution for generated modules and classes.
//!
//! Each class (and each module's function scope) is one flat namespace. The
//! constructor identifier is reserved before anything else, then symbols are
//! claimed in a caller-fixed order (normalization sorts by source name), so
//! identical IR always yields identical identifiers. Collisions are resolved
//! by appending a role suffix, repeatedly until the name is free; no symbol
//! is ever dropped and no counter or iteration order leaks into output.

use std::collections::BTreeSet;

use super::utils::{sanitize_identifier, to_snake_case};

/// Canonical constructor identifier on every class module.
pub const CONSTRUCT: &str = "construct";

/// A flat identifier scope.
#[derive(Debug, Default)]
pub struct NameScope {
    taken: BTreeSet<String>,
}

impl NameScope {
    /// Empty scope, for module-level functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope for a class module, with [`CONSTRUCT`] already reserved.
    pub fn for_class() -> Self {
        let mut scope = Self::new();
        scope.taken.insert(CONSTRUCT.to_string());
        scope
    }

    /// Claim an identifier derived from `base`, appending `suffix` as many
    /// times as needed to avoid collisions.
    fn claim(&mut self, base: String, suffix: &str) -> String {
        let mut candidate = base;
        while self.taken.contains(&candidate) {
            candidate.push_str(suffix);
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Resolve a method identifier: sanitized source name, `_method` on
    /// collision.
    pub fn method(&mut self, source: &str) -> String {
        self.claim(sanitize_identifier(source), "_method")
    }

    /// Resolve an attribute-accessor identifier: lower snake_case of the
    /// source name, `_attr` on collision. The runtime call keeps the
    /// original attribute name regardless of what the accessor is called.
    pub fn attr(&mut self, source: &str) -> String {
        self.claim(sanitize_identifier(&to_snake_case(source)), "_attr")
    }

    /// Resolve a module-level function identifier: sanitized source name,
    /// `_fn` on collision.
    pub fn function(&mut self, source: &str) -> String {
        self.claim(sanitize_identifier(source), "_fn")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_method_keeps_source_name() {
        let mut scope = NameScope::for_class();
        assert_eq!(scope.method("magnitude"), "magnitude");
        assert_eq!(scope.method("translate"), "translate");
    }

    #[test]
    fn test_method_colliding_with_construct() {
        let mut scope = NameScope::for_class();
        assert_eq!(scope.method("construct"), "construct_method");
    }

    #[test]
    fn test_attr_snake_cased_and_deconflicted() {
        // method `pos` resolved first, then attribute `POS`
        let mut scope = NameScope::for_class();
        assert_eq!(scope.method("pos"), "pos");
        assert_eq!(scope.attr("POS"), "pos_attr");
    }

    #[test]
    fn test_suffix_appended_until_free() {
        let mut scope = NameScope::for_class();
        assert_eq!(scope.attr("get"), "get");
        assert_eq!(scope.attr("GET"), "get_attr");
        assert_eq!(scope.attr("Get"), "get_attr_attr");
    }

    #[test]
    fn test_function_scope() {
        let mut scope = NameScope::new();
        assert_eq!(scope.function("mean"), "mean");
        assert_eq!(scope.function("mean"), "mean_fn");
        assert_eq!(scope.function("class"), "_class");
    }

    #[test]
    fn test_deterministic_across_runs() {
        let names = || {
            let mut scope = NameScope::for_class();
            vec![scope.method("a"), scope.method("a"), scope.attr("A")]
        };
        assert_eq!(names(), names());
        assert_eq!(names(), vec!["a", "a_method", "a_attr"]);
    }
}
