//! Label Driver
//!
//! Finds `$signal(...)` and `$destructure(...)` declarators and expands each
//! one in document order:
//!
//! ```js
//! let count = $signal(0);          // let [_count, _setCount] = _createSignal(0);
//! const { a } = $destructure(p);   // const _prop = () => p.a, _other = p;
//! ```
//!
//! Signals go through the deref rewriter, destructuring through the pattern
//! flattener. With `verify` set, every expanded binding is checked for
//! surviving bare reads afterwards.

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{Module, NodeId, NodeKind, Tree};
use crate::codegen::print;
use crate::deref::deref_signal;
use crate::destructure::destructure_variable;
use crate::hooks::{HookResolver, ImportHooks, DEFAULT_HOOK_SOURCE};
use crate::parse::{calls_any, lower_program, parse_program, source_type};
use crate::validate::{verify_eliminated, CompilerError, TransformError};
use crate::visitor::{walk, VisitAction, Visitor};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS & OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    pub filename: String,
    /// Module the runtime helpers are imported from.
    pub hook_source: String,
    pub typescript: bool,
    /// Fail when a bare read of an expanded binding survives.
    pub verify: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            filename: "input.js".to_string(),
            hook_source: DEFAULT_HOOK_SOURCE.to_string(),
            typescript: false,
            verify: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub code: String,
    pub changed: bool,
    pub labels: u32,
}

impl TransformOutput {
    fn unchanged(source: &str) -> Self {
        Self {
            code: source.to_string(),
            changed: false,
            labels: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub filename: String,
    pub code: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LABEL DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

pub const SIGNAL_LABEL: &str = "$signal";
pub const DESTRUCTURE_LABEL: &str = "$destructure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Signal,
    Destructure,
}

impl Label {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SIGNAL_LABEL => Some(Label::Signal),
            DESTRUCTURE_LABEL => Some(Label::Destructure),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Signal => SIGNAL_LABEL,
            Label::Destructure => DESTRUCTURE_LABEL,
        }
    }
}

/// A label call sitting in a declarator initializer.
#[derive(Debug, Clone, Copy)]
struct LabelSite {
    label: Label,
    declarator: NodeId,
    call: NodeId,
}

#[derive(Default)]
struct LabelCollector {
    sites: Vec<LabelSite>,
}

impl Visitor for LabelCollector {
    fn enter(&mut self, module: &mut Module, node: NodeId) -> Result<VisitAction, TransformError> {
        let tree = &module.tree;
        let NodeKind::CallExpression { callee, .. } = tree.kind(node) else {
            return Ok(VisitAction::Continue);
        };
        let NodeKind::Identifier { name } = tree.kind(*callee) else {
            return Ok(VisitAction::Continue);
        };
        let Some(label) = Label::from_name(name) else {
            return Ok(VisitAction::Continue);
        };
        // A local function that happens to carry the label's name.
        if module.scopes.has_binding(module.scope_of(node), name) {
            return Ok(VisitAction::Continue);
        }

        match tree.parent(node) {
            Some(declarator)
                if matches!(
                    tree.kind(declarator),
                    NodeKind::VariableDeclarator { init: Some(init), .. } if *init == node
                ) =>
            {
                self.sites.push(LabelSite {
                    label,
                    declarator,
                    call: node,
                });
                Ok(VisitAction::Continue)
            }
            parent => Err(TransformError::MissingEnclosingContext {
                context: format!("`{}`", label.as_str()),
                expected: "variable declarator initializer",
                found: parent
                    .map_or("nothing", |parent| tree.kind(parent).type_name())
                    .to_string(),
                span: tree.span(node),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPANSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Expands every label in `module`, returning how many were found.
pub fn expand_labels(
    module: &mut Module,
    hooks: &mut dyn HookResolver,
    verify: bool,
) -> Result<usize, TransformError> {
    let mut collector = LabelCollector::default();
    let root = module.root();
    walk(&mut collector, module, root)?;

    for site in &collector.sites {
        match site.label {
            Label::Signal => expand_signal(module, hooks, site, verify)?,
            Label::Destructure => expand_destructure(module, hooks, site, verify)?,
        }
    }
    Ok(collector.sites.len())
}

fn expand_signal(
    module: &mut Module,
    hooks: &mut dyn HookResolver,
    site: &LabelSite,
    verify: bool,
) -> Result<(), TransformError> {
    let id = declarator_id(&module.tree, site.declarator)?;
    let name = match module.tree.kind(id) {
        NodeKind::BindingIdentifier { name } => name.clone(),
        other => {
            return Err(TransformError::UnsupportedValueShape {
                found: other.type_name().to_string(),
                expected: "Identifier",
                span: module.tree.span(id),
            })
        }
    };
    let scope_owner = declaring_scope_owner(module, site.declarator, &name);

    let read = module.generate_uid_at(site.declarator, &name);
    let write = module.generate_uid_at(site.declarator, &format!("set{}", capitalize(&name)));
    let create = hooks.hook_identifier(module, "createSignal")?;

    let arguments = match module.tree.kind(site.call) {
        NodeKind::CallExpression { arguments, .. } => arguments.clone(),
        _ => vec![],
    };
    let callee = module.tree.identifier(&create);
    module.tree.replace(
        site.call,
        NodeKind::CallExpression {
            callee,
            arguments,
            optional: false,
        },
    );
    let read_id = module.tree.binding_identifier(&read);
    let write_id = module.tree.binding_identifier(&write);
    module.tree.replace(
        id,
        NodeKind::ArrayPattern {
            elements: vec![Some(read_id), Some(write_id)],
            rest: None,
        },
    );

    deref_signal(module, scope_owner, &name, &read, &write)?;
    if verify {
        verify_eliminated(module, scope_owner, &name)?;
    }
    Ok(())
}

fn expand_destructure(
    module: &mut Module,
    hooks: &mut dyn HookResolver,
    site: &LabelSite,
    verify: bool,
) -> Result<(), TransformError> {
    let pattern = declarator_id(&module.tree, site.declarator)?;
    match module.tree.kind(pattern) {
        NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. } => {}
        other => {
            return Err(TransformError::UnsupportedValueShape {
                found: other.type_name().to_string(),
                expected: "ObjectPattern or ArrayPattern",
                span: module.tree.span(pattern),
            })
        }
    }
    let source = match module.tree.kind(site.call) {
        NodeKind::CallExpression { arguments, .. } => arguments.first().copied(),
        _ => None,
    }
    .ok_or_else(|| TransformError::MalformedArgument {
        directive: DESTRUCTURE_LABEL,
        found: "no argument".to_string(),
        span: module.tree.span(site.call),
    })?;

    let mut names = Vec::new();
    bound_names(&module.tree, pattern, &mut names);
    let scope_owner = module.scope_owner(site.declarator);

    destructure_variable(hooks, module, site.declarator, source, pattern, true)?;
    if verify {
        for name in &names {
            verify_eliminated(module, scope_owner, name)?;
        }
    }
    Ok(())
}

fn declarator_id(tree: &Tree, declarator: NodeId) -> Result<NodeId, TransformError> {
    match tree.kind(declarator) {
        NodeKind::VariableDeclarator { id, .. } => Ok(*id),
        other => Err(TransformError::MissingEnclosingContext {
            context: "label".to_string(),
            expected: "variable declarator",
            found: other.type_name().to_string(),
            span: tree.span(declarator),
        }),
    }
}

/// Owner of the nearest scope, from `node` outwards, that declares `name`.
fn declaring_scope_owner(module: &Module, node: NodeId, name: &str) -> NodeId {
    let mut scope = module.scope_of(node);
    while !module.scopes.owns_binding(scope, name) {
        match module.scopes.parent(scope) {
            Some(parent) => scope = parent,
            None => break,
        }
    }
    module.scopes.owner(scope)
}

/// Names bound by a pattern, in source order. Defaults and computed keys are
/// expressions and contribute nothing.
fn bound_names(tree: &Tree, pattern: NodeId, names: &mut Vec<String>) {
    match tree.kind(pattern) {
        NodeKind::BindingIdentifier { name } => names.push(name.clone()),
        NodeKind::ObjectPattern { properties, rest } => {
            for property in properties {
                if let NodeKind::BindingProperty { value, .. } = tree.kind(*property) {
                    bound_names(tree, *value, names);
                }
            }
            if let Some(rest) = rest {
                bound_names(tree, *rest, names);
            }
        }
        NodeKind::ArrayPattern { elements, rest } => {
            for element in elements.iter().flatten() {
                bound_names(tree, *element, names);
            }
            if let Some(rest) = rest {
                bound_names(tree, *rest, names);
            }
        }
        NodeKind::AssignmentPattern { left, .. } => bound_names(tree, *left, names),
        NodeKind::RestElement { argument } => bound_names(tree, *argument, names),
        _ => {}
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn transform_source(
    source: &str,
    options: &TransformOptions,
) -> Result<TransformOutput, TransformError> {
    let allocator = Allocator::default();
    let jsx = !options.typescript || options.filename.ends_with(".tsx");
    let program = parse_program(&allocator, source, source_type(options.typescript, jsx))?;
    if !calls_any(&program, &|name: &str| Label::from_name(name).is_some()) {
        debug!(file = %options.filename, "no labels, passing through");
        return Ok(TransformOutput::unchanged(source));
    }

    let mut module = lower_program(&program)?;
    let mut hooks = ImportHooks::new(&options.hook_source);
    let labels = expand_labels(&mut module, &mut hooks, options.verify)?;
    if labels == 0 {
        return Ok(TransformOutput::unchanged(source));
    }
    debug!(file = %options.filename, labels, nodes = module.tree.len(), "expanded labels");

    Ok(TransformOutput {
        code: print(&module.tree, module.root()),
        changed: true,
        labels: labels as u32,
    })
}

/// Transforms one module, reporting failures against `options.filename`.
pub fn transform_module(
    source: &str,
    options: &TransformOptions,
) -> Result<TransformOutput, CompilerError> {
    transform_source(source, options)
        .map_err(|error| error.to_compiler_error(&options.filename, source))
}

/// Transforms independent modules in parallel. Results keep the input order.
pub fn transform_batch(
    files: &[SourceFile],
    options: &TransformOptions,
) -> Vec<Result<TransformOutput, CompilerError>> {
    files
        .par_iter()
        .map(|file| {
            let options = TransformOptions {
                filename: file.filename.clone(),
                ..options.clone()
            };
            transform_module(&file.code, &options)
        })
        .collect()
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_labels_native(code: String, options_json: Option<String>) -> napi::Result<String> {
    let options: TransformOptions = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?,
        None => TransformOptions::default(),
    };
    let res = match transform_module(&code, &options) {
        Ok(output) => serde_json::json!({
            "code": output.code,
            "changed": output.changed,
            "labels": output.labels,
            "errors": [],
        }),
        Err(error) => serde_json::json!({
            "code": code,
            "changed": false,
            "labels": 0,
            "errors": [error],
        }),
    };
    serde_json::to_string(&res)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
