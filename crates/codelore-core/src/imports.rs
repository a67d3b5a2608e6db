//! Regex-based import extraction.
//!
//! Best-effort and heuristic: module paths are mapped to file paths by
//! convention, relative JS imports are skipped, and unknown extensions
//! yield nothing. Good enough to tell the model which neighbors matter.

use std::sync::OnceLock;

use regex::Regex;

fn py_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:from|import)\s+([A-Za-z0-9_.]+)").expect("valid regex"))
}

fn js_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:import[^\n]*?from\s+['"]([^'"]+)['"]|require\(\s*['"]([^'"]+)['"]\s*\))"#)
            .expect("valid regex")
    })
}

fn java_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*import\s+([A-Za-z0-9_.]+)\s*;").expect("valid regex"))
}

fn rust_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:pub\s+)?(?:use\s+crate::([A-Za-z0-9_]+)|mod\s+([A-Za-z0-9_]+)\s*;)")
            .expect("valid regex")
    })
}

/// Extract imported files from source text, as repo-relative paths.
///
/// Supported: Python, JavaScript/TypeScript, Java, Rust. Order follows the
/// source; duplicates are dropped.
pub fn extract_imports(file_content: &str, file_path: &str) -> Vec<String> {
    let ext = file_path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();

    let mut imports = Vec::new();
    let mut push = |item: String| {
        if !imports.contains(&item) {
            imports.push(item);
        }
    };

    match ext.as_str() {
        "py" => {
            for line in file_content.lines() {
                if let Some(caps) = py_import().captures(line) {
                    push(format!("{}.py", caps[1].replace('.', "/")));
                }
            }
        }
        "js" | "ts" | "jsx" | "tsx" => {
            for caps in js_import().captures_iter(file_content) {
                let imported = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
                if let Some(imported) = imported {
                    // Relative imports are resolved by co-change analysis
                    // instead; only keep package names.
                    if !imported.is_empty() && !imported.starts_with('.') {
                        push(imported.to_string());
                    }
                }
            }
        }
        "java" => {
            for line in file_content.lines() {
                if let Some(caps) = java_import().captures(line) {
                    push(format!("{}.java", caps[1].replace('.', "/")));
                }
            }
        }
        "rs" => {
            for line in file_content.lines() {
                if let Some(caps) = rust_import().captures(line) {
                    if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
                        push(format!("{}.rs", m.as_str()));
                    }
                }
            }
        }
        _ => {}
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_python_imports() {
        let content = "import os\nfrom app.models import User\nx = 1\n";
        let imports = extract_imports(content, "service.py");
        assert_eq!(imports, vec!["os.py", "app/models.py"]);
    }

    #[test]
    fn test_javascript_imports_skip_relative() {
        let content = r#"
import React from 'react';
import { helper } from './utils';
const fs = require('fs');
"#;
        let imports = extract_imports(content, "app.tsx");
        assert_eq!(imports, vec!["react", "fs"]);
    }

    #[test]
    fn test_java_imports() {
        let content = "package com.example;\nimport com.example.util.Strings;\n";
        let imports = extract_imports(content, "Main.java");
        assert_eq!(imports, vec!["com/example/util/Strings.java"]);
    }

    #[test]
    fn test_rust_imports() {
        let content = "pub mod lexer;\nuse crate::ast::Node;\nuse std::fmt;\n";
        let imports = extract_imports(content, "parser.rs");
        assert_eq!(imports, vec!["lexer.rs", "ast.rs"]);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let content = "import os\nimport os\n";
        assert_eq!(extract_imports(content, "a.py"), vec!["os.py"]);
    }

    #[test]
    fn test_unknown_extension_yields_nothing() {
        assert!(extract_imports("import os", "notes.txt").is_empty());
        assert!(extract_imports("import os", "Makefile").is_empty());
    }
}
