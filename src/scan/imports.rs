//! Textual import extraction.
//!
//! Matches `from "<ref>"` / `from '<ref>'` clauses. This is deliberately
//! approximate: no aliases, no package resolution, no index-file fallback.
//! A parser-based extractor can replace this module without touching the
//! store contract.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{NodePath, PathNormalizer};

static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"from\s+['"](.+?)['"]"#).unwrap_or_else(|e| panic!("invalid import pattern: {e}"))
});

/// Raw references of every `from` clause, in source order.
pub fn extract(content: &str) -> Vec<&str> {
    FROM_CLAUSE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Project-local references only: `./x`, `../x` and `/x`.
/// Package imports (`react`, `@scope/pkg`) are not graph edges.
pub fn is_project_reference(reference: &str) -> bool {
    reference.starts_with('.') || reference.starts_with('/')
}

/// Extract and resolve the dependencies of `importer` to node identities.
///
/// Duplicates collapse; order follows first appearance.
pub fn dependencies(
    normalizer: &PathNormalizer,
    importer: &NodePath,
    content: &str,
) -> Vec<NodePath> {
    let mut deps: Vec<NodePath> = Vec::new();
    for reference in extract(content) {
        if !is_project_reference(reference) {
            continue;
        }
        let target = normalizer.resolve_import(importer, reference);
        if !deps.contains(&target) {
            deps.push(target);
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_extract_both_quote_styles() {
        let code = r#"
            import { Foo } from "./components";
            import bar from './bar';
            export * from "../utils";
        "#;
        assert_eq!(extract(code), vec!["./components", "./bar", "../utils"]);
    }

    #[test]
    fn test_package_imports_filtered() {
        assert!(is_project_reference("./a"));
        assert!(is_project_reference("../a"));
        assert!(is_project_reference("/abs/a"));
        assert!(!is_project_reference("react"));
        assert!(!is_project_reference("@scope/pkg"));
    }

    #[test]
    fn test_unmatched_syntax_yields_nothing() {
        let code = r#"
            const fs = require('fs');
            import "./side-effect";
            from "unterminated
        "#;
        assert!(extract(code).is_empty());
    }

    #[test]
    fn test_dependencies_resolved_and_deduplicated() {
        let n = PathNormalizer::new("/proj/src", "ts");
        let importer = n.normalize("lib/a.ts");
        let code = r#"
            import { b } from "./b";
            import { b2 } from "./b.ts";
            import { c } from "../c";
            import React from "react";
        "#;
        let deps = dependencies(&n, &importer, code);
        let got: Vec<&Path> = deps.iter().map(|p| p.as_path()).collect();
        assert_eq!(got, vec![Path::new("/proj/src/lib/b.ts"), Path::new("/proj/src/c.ts")]);
    }
}
