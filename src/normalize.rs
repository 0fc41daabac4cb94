//! Binding normalization.
//!
//! Substitutes every bare read of one binding inside a scope with either a
//! call to an accessor (`name` → `_prop()`) or a plain rename
//! (`rest` → `_other`). Nested scopes that declare their own binding of the
//! same name are left untouched.

use tracing::trace;

use crate::ast::{Module, NodeId, NodeKind, Tree};
use crate::scope::ScopeId;
use crate::validate::TransformError;
use crate::visitor::{walk, VisitAction, Visitor};

/// A binding identified by the scope it was declared in.
#[derive(Debug, Clone)]
pub struct BindingTarget {
    scope: ScopeId,
    name: String,
}

impl BindingTarget {
    pub fn new(module: &Module, scope_owner: NodeId, name: &str) -> Self {
        Self {
            scope: module.scope_of(scope_owner),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// `node` sits in a different scope that declares its own `name`.
    pub fn is_shadowed(&self, module: &Module, node: NodeId) -> bool {
        let scope = module.scope_of(node);
        scope != self.scope && module.scopes.owns_binding(scope, &self.name)
    }

    pub fn is_reference(&self, module: &Module, node: NodeId) -> bool {
        matches!(module.tree.kind(node), NodeKind::Identifier { name } if *name == self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// `name` → `replacement()`
    Invoke(String),
    /// `name` → `replacement`
    Reference(String),
}

impl Substitution {
    fn build(&self, tree: &mut Tree) -> NodeKind {
        match self {
            Substitution::Invoke(callee) => NodeKind::CallExpression {
                callee: tree.identifier(callee),
                arguments: vec![],
                optional: false,
            },
            Substitution::Reference(name) => NodeKind::Identifier { name: name.clone() },
        }
    }
}

pub struct BindingNormalizer {
    target: BindingTarget,
    substitution: Substitution,
}

impl BindingNormalizer {
    pub fn new(module: &Module, scope_owner: NodeId, substitution: Substitution, name: &str) -> Self {
        Self {
            target: BindingTarget::new(module, scope_owner, name),
            substitution,
        }
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }
}

impl Visitor for BindingNormalizer {
    fn enter(&mut self, module: &mut Module, node: NodeId) -> Result<VisitAction, TransformError> {
        if self.target.is_shadowed(module, node) {
            return Ok(VisitAction::Skip);
        }
        if !self.target.is_reference(module, node) {
            return Ok(VisitAction::Continue);
        }
        if let Substitution::Invoke(_) = self.substitution {
            if is_write_target(&module.tree, node) {
                return Err(TransformError::ReadOnlyBinding {
                    name: self.target.name.clone(),
                    span: module.tree.span(node),
                });
            }
        }
        let replacement = self.substitution.build(&mut module.tree);
        trace!(name = %self.target.name, node = ?node, "normalized binding reference");
        module.tree.replace(node, replacement);
        Ok(VisitAction::Skip)
    }
}

/// `node` is written by an assignment, an update or a for-in/of head, either
/// directly or as a leaf of a destructuring target.
fn is_write_target(tree: &Tree, node: NodeId) -> bool {
    let mut target = node;
    while let Some(parent) = tree.parent(target) {
        let written = match tree.kind(parent) {
            NodeKind::AssignmentExpression { left, .. } => return *left == target,
            NodeKind::UpdateExpression { argument, .. } => return *argument == target,
            NodeKind::ForInStatement { left, .. } | NodeKind::ForOfStatement { left, .. } => {
                return *left == target
            }
            NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::RestElement { .. } => true,
            NodeKind::BindingProperty { value, .. } => *value == target,
            NodeKind::AssignmentPattern { left, .. } => *left == target,
            _ => false,
        };
        if !written {
            return false;
        }
        target = parent;
    }
    false
}

/// Rewrites bare reads of `name` bound at `scope_owner`.
pub fn normalize_bindings(
    module: &mut Module,
    scope_owner: NodeId,
    substitution: Substitution,
    name: &str,
) -> Result<(), TransformError> {
    let mut normalizer = BindingNormalizer::new(module, scope_owner, substitution, name);
    walk(&mut normalizer, module, scope_owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print;
    use crate::parse::parse_module;
    use pretty_assertions::assert_eq;

    fn normalize(source: &str, substitution: Substitution, name: &str) -> Result<String, TransformError> {
        let mut module = parse_module(source, false)?;
        let root = module.root();
        normalize_bindings(&mut module, root, substitution, name)?;
        Ok(print(&module.tree, root))
    }

    #[test]
    fn invoke_replaces_reads_in_nested_scopes() {
        let output = normalize(
            "log(a, a.b, { a });\nfunction f() { return a; }",
            Substitution::Invoke("_prop".into()),
            "a",
        )
        .unwrap();
        assert_eq!(
            output,
            "log(_prop(), _prop().b, { a: _prop() });\nfunction f() {\n  return _prop();\n}\n"
        );
    }

    #[test]
    fn shadowing_scopes_are_skipped() {
        let output = normalize(
            "log(a);\nfunction f(a) { return a; }\nconst g = () => { let a = 1; return a; };",
            Substitution::Reference("_other".into()),
            "a",
        )
        .unwrap();
        assert_eq!(
            output,
            "log(_other);\nfunction f(a) {\n  return a;\n}\nconst g = () => {\n  let a = 1;\n  return a;\n};\n"
        );
    }

    #[test]
    fn member_property_names_are_not_references() {
        let output = normalize("x.a; x[a];", Substitution::Reference("_a".into()), "a").unwrap();
        assert_eq!(output, "x.a;\nx[_a];\n");
    }

    #[test]
    fn writes_through_an_accessor_are_rejected() {
        let err = normalize("a = 1;", Substitution::Invoke("_prop".into()), "a").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { ref name, .. } if name == "a"));

        let err = normalize("a++;", Substitution::Invoke("_prop".into()), "a").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { .. }));

        let err = normalize("[a, b] = pair;", Substitution::Invoke("_prop".into()), "a").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { .. }));

        let err = normalize("({ x: { a = 1 } } = o);", Substitution::Invoke("_prop".into()), "a")
            .unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { .. }));

        let err = normalize("for (a of xs) {}", Substitution::Invoke("_prop".into()), "a").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { .. }));
    }

    #[test]
    fn defaults_inside_write_targets_are_reads() {
        let output = normalize(
            "[b = a] = pair;",
            Substitution::Invoke("_prop".into()),
            "a",
        )
        .unwrap();
        assert_eq!(output, "[b = _prop()] = pair;\n");
    }

    #[test]
    fn renames_may_be_written() {
        let output = normalize("a = {};", Substitution::Reference("_other".into()), "a").unwrap();
        assert_eq!(output, "_other = {};\n");
    }
}
