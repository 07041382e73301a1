//! Dynamic-usage extraction.
//!
//! Two passes per source file feed the [`DynamicUsage`] map:
//!
//! 1. A *regex pass* over the raw text. This catches registrations that
//!    hide inside strings or otherwise never surface as call expressions.
//! 2. An *AST pass* over the parsed program: container/bus method calls
//!    recognized by receiver name, `import()` expressions, and DI
//!    decorators.
//!
//! Per-node failures never abort detection; an invalid user pattern is
//! logged, skipped and counted as a warning.

use crate::constants::{MAX_REGEX_LENGTH, REGEX_DFA_SIZE_LIMIT, REGEX_SIZE_LIMIT};
use deadwood_config::DynamicPatterns;
use deadwood_core::{DynamicUsage, Error};
use oxc_ast::ast::{CallExpression, Decorator, Expression, ImportExpression, Program};
use oxc_ast_visit::{walk, Visit};
use regex::{Regex, RegexBuilder};
use std::path::Path;
use tracing::warn;

/// Decorators that register the decorated class under a string name.
const DI_DECORATORS: &[&str] = &["Injectable", "Service", "Component", "Repository"];

/// Compile a regex with size limits to prevent ReDoS from user patterns.
fn compile_regex_safe(pattern: &str) -> Result<Regex, Error> {
    if pattern.len() > MAX_REGEX_LENGTH {
        return Err(Error::Pattern(format!(
            "pattern exceeds maximum length of {MAX_REGEX_LENGTH} characters"
        )));
    }

    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| Error::Pattern(e.to_string()))
}

struct CompiledCustom {
    name: String,
    regex: Regex,
    symbol_group: usize,
}

/// Compiled pattern set for one analysis run.
pub struct PatternDetector {
    service_container: Vec<Regex>,
    command_bus: Vec<Regex>,
    dynamic_imports: Vec<Regex>,
    custom: Vec<CompiledCustom>,
    decorators: Vec<String>,
    warnings: usize,
}

impl PatternDetector {
    pub fn new(config: &DynamicPatterns) -> Self {
        let service_container = vec![
            Regex::new(r#"(?i)container\.(?:register(?:singleton)?|resolve|get)\s*\(\s*['"`]([^'"`]+)['"`]"#)
                .expect("static regex"),
            Regex::new(r#"\.bind\s*\(\s*['"`]([^'"`]+)['"`]\s*\)\s*\.to\s*\("#)
                .expect("static regex"),
        ];
        let command_bus = vec![
            Regex::new(r#"(?i)commandbus\.(?:register(?:command|handler)?|handle)\s*\(\s*['"`]([^'"`]+)['"`]"#)
                .expect("static regex"),
            Regex::new(r#"\.when\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#).expect("static regex"),
        ];
        let dynamic_imports = vec![
            Regex::new(r#"\bimport\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#).expect("static regex"),
            Regex::new(r#"\brequire\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#).expect("static regex"),
            Regex::new(r#"__import\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#).expect("static regex"),
        ];

        let mut warnings = 0;
        let mut custom = Vec::new();
        for pattern in &config.custom_patterns {
            match compile_regex_safe(&pattern.regex) {
                Ok(regex) => custom.push(CompiledCustom {
                    name: pattern.name.clone(),
                    regex,
                    symbol_group: pattern.symbol_group,
                }),
                Err(err) => {
                    warn!(pattern = %pattern.name, error = %err, "skipping custom pattern");
                    warnings += 1;
                }
            }
        }

        let mut decorators: Vec<String> =
            DI_DECORATORS.iter().map(|d| (*d).to_string()).collect();
        decorators.extend(config.decorators.iter().cloned());

        Self {
            service_container,
            command_bus,
            dynamic_imports,
            custom,
            decorators,
            warnings,
        }
    }

    /// Warnings accumulated while compiling user patterns.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Regex pass over the raw source text.
    pub fn scan_text(&self, file: &Path, text: &str, usage: &mut DynamicUsage) {
        for regex in &self.service_container {
            for caps in regex.captures_iter(text) {
                if let Some(symbol) = caps.get(1) {
                    usage.record_service_container(symbol.as_str(), file);
                }
            }
        }
        for regex in &self.command_bus {
            for caps in regex.captures_iter(text) {
                if let Some(symbol) = caps.get(1) {
                    usage.record_command_bus(symbol.as_str(), file);
                }
            }
        }
        for regex in &self.dynamic_imports {
            for caps in regex.captures_iter(text) {
                if let Some(specifier) = caps.get(1) {
                    usage.record_dynamic_import(specifier.as_str(), file);
                }
            }
        }
        for custom in &self.custom {
            for caps in custom.regex.captures_iter(text) {
                match caps.get(custom.symbol_group) {
                    Some(symbol) => usage.record_custom(symbol.as_str(), file),
                    None => warn!(
                        pattern = %custom.name,
                        group = custom.symbol_group,
                        "capture group missing in match"
                    ),
                }
            }
        }
    }

    /// AST pass over a parsed program.
    pub fn scan_program<'a>(&self, file: &Path, program: &Program<'a>, usage: &mut DynamicUsage) {
        let mut visitor = UsageVisitor {
            detector: self,
            file,
            usage,
        };
        visitor.visit_program(program);
    }

    fn is_di_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|d| d == name)
    }
}

struct UsageVisitor<'d> {
    detector: &'d PatternDetector,
    file: &'d Path,
    usage: &'d mut DynamicUsage,
}

impl<'a> Visit<'a> for UsageVisitor<'_> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::StaticMemberExpression(member) = &call.callee {
            if let Expression::Identifier(object) = &member.object {
                let receiver = object.name.as_str().to_ascii_lowercase();
                let method = member.property.name.as_str();

                if receiver.contains("container")
                    && matches!(method, "register" | "resolve" | "get")
                {
                    if let Some(symbol) = first_string_argument(call) {
                        self.usage.record_service_container(symbol, self.file);
                    }
                } else if receiver.contains("commandbus")
                    && matches!(method, "register" | "handle" | "send")
                {
                    if let Some(symbol) = first_string_argument(call) {
                        self.usage.record_command_bus(symbol, self.file);
                    }
                }
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.usage.record_dynamic_import(lit.value.as_str(), self.file);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_decorator(&mut self, decorator: &Decorator<'a>) {
        if let Expression::CallExpression(call) = &decorator.expression {
            if let Expression::Identifier(ident) = &call.callee {
                if self.detector.is_di_decorator(ident.name.as_str()) {
                    if let Some(symbol) = first_string_argument(call) {
                        self.usage.record_service_container(symbol, self.file);
                    }
                }
            }
        }
        walk::walk_decorator(self, decorator);
    }
}

fn first_string_argument<'a>(call: &CallExpression<'a>) -> Option<&'a str> {
    match call.arguments.first()?.as_expression()? {
        Expression::StringLiteral(lit) => Some(lit.value.as_str()),
        _ => None,
    }
}
