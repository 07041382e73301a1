//! Per-file extraction: one AST walk collecting dependency edges,
//! exported symbol names, and line counts.
//!
//! Extraction returns plain owned data so it can run on blocking worker
//! threads and be merged after the join barrier; the arena-backed AST
//! never leaves the worker.

use deadwood_compiler::SourceFile;
use deadwood_core::{DynamicUsage, EdgeKind};
use deadwood_patterns::PatternDetector;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPatternKind, CallExpression, Class, Declaration, ExportAllDeclaration,
    ExportDefaultDeclaration, ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::PathBuf;
use tracing::warn;

/// An unresolved import observed in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImport {
    pub specifier: String,
    pub kind: EdgeKind,
}

/// Everything the engine needs from one source file.
#[derive(Debug)]
pub struct FileExtract {
    pub path: PathBuf,

    /// Imports in source order. Empty when the parse failed.
    pub imports: Vec<RawImport>,

    /// Exported identifiers plus top-level class names, used by the
    /// scorer for symbol matching against dynamic usage.
    pub symbols: Vec<String>,

    /// Non-empty, non-comment lines.
    pub lines_of_code: usize,

    /// Empty file, or comments only.
    pub is_empty: bool,

    /// The file could not be parsed; it is downgraded to "unknown".
    pub parse_failed: bool,
}

/// Parse and walk a single file. Never fails: a parse error downgrades
/// the file instead. The detector's regex pass runs on the raw text
/// either way; the AST pass only on a successful parse.
pub fn extract_file(file: &SourceFile, detector: &PatternDetector) -> (FileExtract, DynamicUsage) {
    let mut usage = DynamicUsage::default();
    detector.scan_text(&file.path, &file.text, &mut usage);

    let lines_of_code = count_lines_of_code(&file.text);
    let mut extract = FileExtract {
        path: file.path.clone(),
        imports: Vec::new(),
        symbols: Vec::new(),
        lines_of_code,
        is_empty: lines_of_code == 0,
        parse_failed: false,
    };

    let source_type = SourceType::from_path(&file.path).unwrap_or_default();
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &file.text, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        warn!(
            path = %file.path.display(),
            errors = ret.errors.len(),
            "parse failed; file downgraded to unknown"
        );
        extract.parse_failed = true;
        return (extract, usage);
    }

    detector.scan_program(&file.path, &ret.program, &mut usage);

    let mut visitor = ImportVisitor {
        imports: Vec::new(),
        symbols: Vec::new(),
    };
    visitor.visit_program(&ret.program);

    extract.imports = visitor.imports;
    extract.symbols = visitor.symbols;
    (extract, usage)
}

struct ImportVisitor {
    imports: Vec<RawImport>,
    symbols: Vec<String>,
}

impl ImportVisitor {
    fn push_import(&mut self, specifier: &str, kind: EdgeKind) {
        self.imports.push(RawImport {
            specifier: specifier.to_string(),
            kind,
        });
    }

    fn push_symbol(&mut self, name: &str) {
        if !self.symbols.iter().any(|s| s == name) {
            self.symbols.push(name.to_string());
        }
    }

    fn collect_declaration_names(&mut self, declaration: &Declaration<'_>) {
        match declaration {
            Declaration::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    self.push_symbol(id.name.as_str());
                }
            }
            Declaration::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    self.push_symbol(id.name.as_str());
                }
            }
            Declaration::VariableDeclaration(vars) => {
                for declarator in &vars.declarations {
                    if let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind {
                        self.push_symbol(id.name.as_str());
                    }
                }
            }
            _ => {}
        }
    }
}

impl<'a> Visit<'a> for ImportVisitor {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        // Covers named, default, namespace and side-effect imports.
        let kind = if decl.import_kind.is_type() {
            EdgeKind::TypeImport
        } else {
            EdgeKind::Import
        };
        self.push_import(decl.source.value.as_str(), kind);
        walk::walk_import_declaration(self, decl);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            // `export ... from` re-export
            let kind = if decl.export_kind.is_type() {
                EdgeKind::TypeImport
            } else {
                EdgeKind::Import
            };
            self.push_import(source.value.as_str(), kind);
        }
        if let Some(declaration) = &decl.declaration {
            self.collect_declaration_names(declaration);
        }
        for specifier in &decl.specifiers {
            self.push_symbol(specifier.exported.name().as_str());
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        let kind = if decl.export_kind.is_type() {
            EdgeKind::TypeImport
        } else {
            EdgeKind::Import
        };
        self.push_import(decl.source.value.as_str(), kind);
        walk::walk_export_all_declaration(self, decl);
    }

    fn visit_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'a>) {
        match &decl.declaration {
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    self.push_symbol(id.name.as_str());
                }
            }
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    self.push_symbol(id.name.as_str());
                }
            }
            ExportDefaultDeclarationKind::Identifier(ident) => {
                self.push_symbol(ident.name.as_str());
            }
            _ => {}
        }
        walk::walk_export_default_declaration(self, decl);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name == "require" {
                if let Some(Expression::StringLiteral(lit)) =
                    call.arguments.first().and_then(|a| a.as_expression())
                {
                    self.push_import(lit.value.as_str(), EdgeKind::Require);
                }
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.push_import(lit.value.as_str(), EdgeKind::DynamicImport);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_class(&mut self, class: &Class<'a>) {
        if let Some(id) = &class.id {
            self.push_symbol(id.name.as_str());
        }
        walk::walk_class(self, class);
    }
}

/// Count non-empty, non-comment lines. Line and block comments are
/// recognized; string contents are not inspected, which matches how the
/// original tool counted.
pub fn count_lines_of_code(text: &str) -> usize {
    let mut in_block = false;
    let mut count = 0;

    for line in text.lines() {
        let mut has_code = false;
        let mut rest = line.trim();

        while !rest.is_empty() {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        in_block = false;
                        rest = rest[end + 2..].trim_start();
                    }
                    None => rest = "",
                }
            } else if rest.starts_with("//") {
                rest = "";
            } else if rest.starts_with("/*") {
                in_block = true;
                rest = &rest[2..];
            } else {
                has_code = true;
                let next_line_comment = rest.find("//");
                let next_block_comment = rest.find("/*");
                match (next_line_comment, next_block_comment) {
                    (Some(a), Some(b)) => rest = &rest[a.min(b)..],
                    (Some(a), None) => rest = &rest[a..],
                    (None, Some(b)) => rest = &rest[b..],
                    (None, None) => rest = "",
                }
            }
        }

        if has_code {
            count += 1;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadwood_config::DynamicPatterns;
    use deadwood_core::FileClass;

    fn extract_source(name: &str, source: &str) -> FileExtract {
        let file = SourceFile {
            path: PathBuf::from(name),
            text: source.to_string(),
            class: FileClass::Ts,
        };
        let detector = PatternDetector::new(&DynamicPatterns::default());
        extract_file(&file, &detector).0
    }

    #[test]
    fn test_static_imports() {
        let extract = extract_source(
            "index.ts",
            r#"
            import { UserService } from './UserService';
            import Default from './Default';
            import * as ns from './namespace';
            import './side-effect';
            "#,
        );

        assert_eq!(extract.imports.len(), 4);
        assert!(extract
            .imports
            .iter()
            .all(|i| i.kind == EdgeKind::Import));
        assert_eq!(extract.imports[3].specifier, "./side-effect");
    }

    #[test]
    fn test_type_only_imports() {
        let extract = extract_source(
            "index.ts",
            r#"
            import type { User } from './types';
            import { EmailService } from './EmailService';
            "#,
        );

        assert_eq!(extract.imports[0].kind, EdgeKind::TypeImport);
        assert_eq!(extract.imports[1].kind, EdgeKind::Import);
    }

    #[test]
    fn test_reexports_and_export_all() {
        let extract = extract_source(
            "barrel.ts",
            r#"
            export { a } from './a';
            export * from './b';
            export type { T } from './types';
            "#,
        );

        assert_eq!(extract.imports.len(), 3);
        assert_eq!(extract.imports[0].kind, EdgeKind::Import);
        assert_eq!(extract.imports[1].kind, EdgeKind::Import);
        assert_eq!(extract.imports[2].kind, EdgeKind::TypeImport);
    }

    #[test]
    fn test_require_and_dynamic_import() {
        let extract = extract_source(
            "index.ts",
            r#"
            const legacy = require('./legacy');
            async function load() { return import('./lazy'); }
            "#,
        );

        assert_eq!(extract.imports[0].kind, EdgeKind::Require);
        assert_eq!(extract.imports[0].specifier, "./legacy");
        assert_eq!(extract.imports[1].kind, EdgeKind::DynamicImport);
        assert_eq!(extract.imports[1].specifier, "./lazy");
    }

    #[test]
    fn test_non_literal_dynamic_import_is_skipped() {
        let extract = extract_source("index.ts", "const m = import(modulePath);");
        assert!(extract.imports.is_empty());
    }

    #[test]
    fn test_exported_symbols() {
        let extract = extract_source(
            "UserService.ts",
            r#"
            export class UserService {}
            export function helper() {}
            export const LIMIT = 10;
            class Internal {}
            export default UserService;
            "#,
        );

        assert!(extract.symbols.contains(&"UserService".to_string()));
        assert!(extract.symbols.contains(&"helper".to_string()));
        assert!(extract.symbols.contains(&"LIMIT".to_string()));
        assert!(extract.symbols.contains(&"Internal".to_string()));
    }

    #[test]
    fn test_default_exported_class_name() {
        let extract = extract_source("App.ts", "export default class App {}");
        assert!(extract.symbols.contains(&"App".to_string()));
    }

    #[test]
    fn test_parse_failure_downgrades_file() {
        let extract = extract_source("broken.ts", "import { from ;;; ???");
        assert!(extract.parse_failed);
        assert!(extract.imports.is_empty());
    }

    #[test]
    fn test_loc_counts_skip_comments_and_blanks() {
        let source = "\n// comment\n/* block\n   still block */\nconst a = 1; // trailing\n\nconst b = 2;\n";
        assert_eq!(count_lines_of_code(source), 2);
    }

    #[test]
    fn test_loc_counts_code_before_block_comment() {
        assert_eq!(count_lines_of_code("const a = 1; /* note */"), 1);
        assert_eq!(count_lines_of_code("/* only */ const b = 2;"), 1);
    }

    #[test]
    fn test_empty_file_detection() {
        let extract = extract_source("empty.ts", "// nothing here\n\n/* at all */\n");
        assert!(extract.is_empty);
        assert_eq!(extract.lines_of_code, 0);
    }
}
