#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_span::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{Module, NodeId, NodeKind};
use crate::normalize::BindingTarget;
use crate::visitor::{walk, VisitAction, Visitor};

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_MALFORMED_ARGUMENT: &str = "L-ERR-DIRECTIVE-001";
pub const ERR_MISSING_CONTEXT: &str = "L-ERR-DIRECTIVE-002";
pub const ERR_PATTERN_TARGET: &str = "L-ERR-PATTERN-001";
pub const ERR_VALUE_SHAPE: &str = "L-ERR-PATTERN-002";
pub const ERR_READ_ONLY_BINDING: &str = "L-ERR-BINDING-001";
pub const ERR_RESIDUAL_REFERENCE: &str = "L-ERR-BINDING-002";
pub const ERR_PARSE: &str = "L-ERR-SYNTAX-001";
pub const ERR_UNSUPPORTED_SYNTAX: &str = "L-ERR-SYNTAX-002";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_MALFORMED_ARGUMENT => "Directives only accept a bare identifier argument.",
        ERR_MISSING_CONTEXT => {
            "Accessor directives are only valid as the value of an object property."
        }
        ERR_PATTERN_TARGET => "Destructuring labels only bind plain identifiers.",
        ERR_VALUE_SHAPE => "Destructuring labels only accept object and array patterns.",
        ERR_READ_ONLY_BINDING => "Lazily destructured bindings are read-only.",
        ERR_RESIDUAL_REFERENCE => {
            "Every reference to a rewritten binding is replaced by an accessor call."
        }
        ERR_PARSE => "Input modules are syntactically valid.",
        ERR_UNSUPPORTED_SYNTAX => "Only the supported JavaScript subset reaches the rewriter.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure raised by a rewrite pass. Any error aborts the whole module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("`{directive}` expects an identifier argument, found {found}")]
    MalformedArgument {
        directive: &'static str,
        found: String,
        span: Span,
    },

    #[error("{context} requires an enclosing {expected}, found {found}")]
    MissingEnclosingContext {
        context: String,
        expected: &'static str,
        found: String,
        span: Span,
    },

    #[error("unsupported destructuring target: {found}")]
    UnsupportedPatternTarget { found: String, span: Span },

    #[error("unexpected {found}, expected {expected}")]
    UnsupportedValueShape {
        found: String,
        expected: &'static str,
        span: Span,
    },

    #[error("`{name}` is a lazily destructured binding and cannot be assigned")]
    ReadOnlyBinding { name: String, span: Span },

    #[error("`{name}` is still referenced after rewriting")]
    ResidualReference { name: String, span: Span },

    #[error("unsupported syntax: {found}")]
    UnsupportedSyntax { found: String, span: Span },

    #[error("{message}")]
    Parse { message: String, span: Span },
}

impl TransformError {
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::MalformedArgument { .. } => ERR_MALFORMED_ARGUMENT,
            TransformError::MissingEnclosingContext { .. } => ERR_MISSING_CONTEXT,
            TransformError::UnsupportedPatternTarget { .. } => ERR_PATTERN_TARGET,
            TransformError::UnsupportedValueShape { .. } => ERR_VALUE_SHAPE,
            TransformError::ReadOnlyBinding { .. } => ERR_READ_ONLY_BINDING,
            TransformError::ResidualReference { .. } => ERR_RESIDUAL_REFERENCE,
            TransformError::UnsupportedSyntax { .. } => ERR_UNSUPPORTED_SYNTAX,
            TransformError::Parse { .. } => ERR_PARSE,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TransformError::MalformedArgument { span, .. }
            | TransformError::MissingEnclosingContext { span, .. }
            | TransformError::UnsupportedPatternTarget { span, .. }
            | TransformError::UnsupportedValueShape { span, .. }
            | TransformError::ReadOnlyBinding { span, .. }
            | TransformError::ResidualReference { span, .. }
            | TransformError::UnsupportedSyntax { span, .. }
            | TransformError::Parse { span, .. } => *span,
        }
    }

    fn hints(&self) -> Vec<String> {
        match self {
            TransformError::MalformedArgument { directive, .. } => {
                vec![format!("Pass the signal name directly, e.g. `{}(count)`.", directive)]
            }
            TransformError::MissingEnclosingContext { .. } => {
                vec!["Use the directive as a property value: `{ value: $property(count) }`.".into()]
            }
            TransformError::UnsupportedPatternTarget { .. } => {
                vec!["Destructure into a local name and assign the member afterwards.".into()]
            }
            TransformError::ReadOnlyBinding { name, .. } => {
                vec![format!("Copy `{}` into a new local before mutating it.", name)]
            }
            _ => vec![],
        }
    }

    pub fn to_compiler_error(&self, file: &str, source: &str) -> CompilerError {
        let (line, column) = line_column(source, self.span().start);
        let mut error = CompilerError::with_details(
            self.code(),
            &self.to_string(),
            file,
            line,
            column,
            source_line(source, line),
            self.hints(),
        );
        if let TransformError::Parse { .. } | TransformError::UnsupportedSyntax { .. } = self {
            error.error_type = "SYNTAX_ERROR".to_string();
        }
        error
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub error_type: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(code, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        code: &str,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        CompilerError {
            code: code.to_string(),
            error_type: "TRANSFORM_ERROR".to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{} [{}] {}",
            self.file, self.line, self.column, self.code, self.message
        )
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let mut end = (offset as usize).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);
    let column = before[line_start..].chars().count() as u32 + 1;
    (line, column)
}

fn source_line(source: &str, line: u32) -> Option<String> {
    source
        .lines()
        .nth(line.saturating_sub(1) as usize)
        .map(|text| text.trim_end().to_string())
        .filter(|text| !text.is_empty())
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESIDUAL REFERENCE CHECK
// ═══════════════════════════════════════════════════════════════════════════════

struct ResidualCheck {
    target: BindingTarget,
}

impl Visitor for ResidualCheck {
    fn enter(&mut self, module: &mut Module, node: NodeId) -> Result<VisitAction, TransformError> {
        if self.target.is_shadowed(module, node) {
            return Ok(VisitAction::Skip);
        }
        match module.tree.kind(node) {
            NodeKind::Identifier { name } if name == self.target.name() => {
                Err(TransformError::ResidualReference {
                    name: name.clone(),
                    span: module.tree.span(node),
                })
            }
            _ => Ok(VisitAction::Continue),
        }
    }
}

/// Fails if a bare read of `name` bound at `scope_owner` survived rewriting.
pub fn verify_eliminated(
    module: &mut Module,
    scope_owner: NodeId,
    name: &str,
) -> Result<(), TransformError> {
    let mut check = ResidualCheck {
        target: BindingTarget::new(module, scope_owner, name),
    };
    walk(&mut check, module, scope_owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_span::Span;

    #[test]
    fn line_column_counts_from_one() {
        let source = "let a = 1;\nlet bé = $get(1);\n";
        assert_eq!(line_column(source, 0), (1, 1));
        assert_eq!(line_column(source, 4), (1, 5));
        let offset = source.find("$get").unwrap() as u32;
        assert_eq!(line_column(source, offset), (2, 10));
        assert_eq!(line_column(source, 10_000), (3, 1));
    }

    #[test]
    fn compiler_error_carries_code_position_and_context() {
        let source = "const a = 1;\nconst b = $get(1);";
        let start = source.find("1)").unwrap() as u32;
        let error = TransformError::MalformedArgument {
            directive: "$get",
            found: "NumericLiteral".to_string(),
            span: Span::new(start, start + 1),
        };
        let report = error.to_compiler_error("App.jsx", source);
        assert_eq!(report.code, ERR_MALFORMED_ARGUMENT);
        assert_eq!(report.error_type, "TRANSFORM_ERROR");
        assert_eq!(report.line, 2);
        assert_eq!(report.column, 16);
        assert_eq!(report.context.as_deref(), Some("const b = $get(1);"));
        assert_eq!(
            report.message,
            "`$get` expects an identifier argument, found NumericLiteral"
        );
        assert_eq!(report.hints.len(), 1);
        assert_eq!(
            report.to_string(),
            "App.jsx:2:16 [L-ERR-DIRECTIVE-001] `$get` expects an identifier argument, found NumericLiteral"
        );
    }

    #[test]
    fn syntax_errors_are_typed_separately() {
        let error = TransformError::Parse {
            message: "Unexpected token".to_string(),
            span: Span::new(0, 0),
        };
        let report = error.to_compiler_error("a.js", "}");
        assert_eq!(report.code, ERR_PARSE);
        assert_eq!(report.error_type, "SYNTAX_ERROR");
        assert_eq!(report.guarantee, "Input modules are syntactically valid.");
    }
}
