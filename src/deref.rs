//! Signal dereferencing.
//!
//! Given a signal binding `name` with a read accessor and a write accessor,
//! rewrites every use inside the binding's scope:
//!
//! | source                    | output                                       |
//! |---------------------------|----------------------------------------------|
//! | `name`                    | `read()`                                     |
//! | `$refSignal(name)`        | `[read, write]`                              |
//! | `$get(name)`              | `read()`                                     |
//! | `$set(name)`              | `write`                                      |
//! | `{ k: $getter(name) }`    | `{ get k() { return read(); } }`             |
//! | `{ k: $setter(name) }`    | `{ set k(_value) { return write(() => _value); } }` |
//! | `{ k: $property(name) }`  | getter followed by setter                    |
//! | `name = e`                | `write(() => e)`                             |
//! | `name op= e`              | `write(_current => _current op e)`           |
//! | `++name` / `--name`       | `write(_current => _current ± 1)`            |
//! | `name++` / `name--`       | IIFE reading, writing and returning the old value |
//!
//! Directives naming a different binding are left alone for the pass that owns
//! that binding.

use oxc_syntax::operator::{AssignmentOperator, BinaryOperator, UpdateOperator};
use tracing::{debug, trace};

use crate::ast::{
    DeclarationKind, FunctionFlags, MethodKind, Module, NodeId, NodeKind, PropertyKey,
};
use crate::normalize::{BindingNormalizer, BindingTarget, Substitution};
use crate::validate::TransformError;
use crate::visitor::{walk, VisitAction, Visitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    RefSignal,
    Get,
    Set,
    Getter,
    Setter,
    Property,
}

impl Directive {
    pub const ALL: [Directive; 6] = [
        Directive::RefSignal,
        Directive::Get,
        Directive::Set,
        Directive::Getter,
        Directive::Setter,
        Directive::Property,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|directive| directive.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Directive::RefSignal => "$refSignal",
            Directive::Get => "$get",
            Directive::Set => "$set",
            Directive::Getter => "$getter",
            Directive::Setter => "$setter",
            Directive::Property => "$property",
        }
    }

    /// Accessor directives rewrite the object property around them.
    fn needs_property(self) -> bool {
        matches!(
            self,
            Directive::Getter | Directive::Setter | Directive::Property
        )
    }
}

enum Site {
    Directive(Directive),
    Update {
        operator: UpdateOperator,
        prefix: bool,
    },
    Assignment {
        operator: AssignmentOperator,
        right: NodeId,
    },
    Other,
}

pub struct DerefRewriter {
    target: BindingTarget,
    read: String,
    write: String,
    bindings: BindingNormalizer,
}

impl DerefRewriter {
    pub fn new(module: &Module, scope_owner: NodeId, name: &str, read: &str, write: &str) -> Self {
        Self {
            target: BindingTarget::new(module, scope_owner, name),
            read: read.to_string(),
            write: write.to_string(),
            bindings: BindingNormalizer::new(
                module,
                scope_owner,
                Substitution::Invoke(read.to_string()),
                name,
            ),
        }
    }

    fn classify(&self, module: &Module, node: NodeId) -> Site {
        match module.tree.kind(node) {
            NodeKind::CallExpression { callee, .. } => match module.tree.kind(*callee) {
                NodeKind::Identifier { name } => {
                    Directive::from_name(name).map_or(Site::Other, Site::Directive)
                }
                _ => Site::Other,
            },
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } if self.target.is_reference(module, *argument) => Site::Update {
                operator: *operator,
                prefix: *prefix,
            },
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } if self.target.is_reference(module, *left) => Site::Assignment {
                operator: *operator,
                right: *right,
            },
            _ => Site::Other,
        }
    }

    fn rewrite_directive(
        &mut self,
        module: &mut Module,
        call: NodeId,
        directive: Directive,
    ) -> Result<VisitAction, TransformError> {
        let property = if directive.needs_property() {
            Some(enclosing_property(module, call, directive)?)
        } else {
            None
        };
        if directive_argument(module, call, directive)? != self.target.name() {
            return Ok(VisitAction::Continue);
        }
        trace!(directive = directive.as_str(), node = ?call, "rewriting directive");

        match (directive, property) {
            (Directive::RefSignal, _) => {
                let read = module.tree.identifier(&self.read);
                let write = module.tree.identifier(&self.write);
                module.tree.replace(
                    call,
                    NodeKind::ArrayExpression {
                        elements: vec![Some(read), Some(write)],
                    },
                );
            }
            (Directive::Get, _) => {
                let callee = module.tree.identifier(&self.read);
                module.tree.replace(
                    call,
                    NodeKind::CallExpression {
                        callee,
                        arguments: vec![],
                        optional: false,
                    },
                );
            }
            (Directive::Set, _) => {
                module.tree.replace(
                    call,
                    NodeKind::Identifier {
                        name: self.write.clone(),
                    },
                );
            }
            (Directive::Getter, Some((property, key))) => {
                let getter = self.getter(module, key);
                module.tree.replace(property, getter);
            }
            (Directive::Setter, Some((property, key))) => {
                let setter = self.setter(module, call, key);
                module.tree.replace(property, setter);
            }
            (Directive::Property, Some((property, key))) => {
                let setter_key = match &key {
                    PropertyKey::Computed(expr) => {
                        PropertyKey::Computed(module.tree.clone_subtree(*expr))
                    }
                    other => other.clone(),
                };
                let getter = self.getter(module, key);
                let setter = self.setter(module, call, setter_key);
                let setter = module.tree.alloc(setter, module.tree.span(property));
                module.tree.replace(property, getter);
                module.tree.insert_after(property, setter)?;
            }
            (_, None) => {}
        }
        Ok(VisitAction::Skip)
    }

    /// `get key() { return read(); }`
    fn getter(&self, module: &mut Module, key: PropertyKey) -> NodeKind {
        let tree = &mut module.tree;
        let read = tree.call_named(&self.read, vec![]);
        let ret = tree.return_statement(Some(read));
        let body = tree.block(vec![ret]);
        NodeKind::ObjectMethod {
            kind: MethodKind::Get,
            key,
            params: vec![],
            body,
            flags: FunctionFlags::default(),
        }
    }

    /// `set key(_value) { return write(() => _value); }`
    fn setter(&self, module: &mut Module, call: NodeId, key: PropertyKey) -> NodeKind {
        let value = module.generate_uid_at(call, "value");
        let tree = &mut module.tree;
        let param = tree.binding_identifier(&value);
        let next = tree.identifier(&value);
        let thunk = tree.arrow_expression(vec![], next);
        let write = tree.call_named(&self.write, vec![thunk]);
        let ret = tree.return_statement(Some(write));
        let body = tree.block(vec![ret]);
        NodeKind::ObjectMethod {
            kind: MethodKind::Set,
            key,
            params: vec![param],
            body,
            flags: FunctionFlags::default(),
        }
    }

    fn rewrite_update(
        &mut self,
        module: &mut Module,
        node: NodeId,
        operator: UpdateOperator,
        prefix: bool,
    ) -> Result<VisitAction, TransformError> {
        let current = module.generate_uid_at(node, "current");
        let op = match operator {
            UpdateOperator::Increment => BinaryOperator::Addition,
            UpdateOperator::Decrement => BinaryOperator::Subtraction,
        };
        let tree = &mut module.tree;
        let replacement = if prefix {
            // write(_current => _current ± 1)
            let param = tree.binding_identifier(&current);
            let left = tree.identifier(&current);
            let one = tree.number_literal(1.0);
            let next = tree.binary(op, left, one);
            let updater = tree.arrow_expression(vec![param], next);
            NodeKind::CallExpression {
                callee: tree.identifier(&self.write),
                arguments: vec![updater],
                optional: false,
            }
        } else {
            // (() => { const _current = read(); write(() => _current ± 1); return _current; })()
            let id = tree.binding_identifier(&current);
            let old = tree.call_named(&self.read, vec![]);
            let declarator = tree.variable_declarator(id, Some(old));
            let declaration = tree.variable_declaration(DeclarationKind::Const, vec![declarator]);
            let left = tree.identifier(&current);
            let one = tree.number_literal(1.0);
            let next = tree.binary(op, left, one);
            let thunk = tree.arrow_expression(vec![], next);
            let write = tree.call_named(&self.write, vec![thunk]);
            let stmt = tree.expression_statement(write);
            let result = tree.identifier(&current);
            let ret = tree.return_statement(Some(result));
            let closure = tree.arrow_block(vec![], vec![declaration, stmt, ret]);
            NodeKind::CallExpression {
                callee: closure,
                arguments: vec![],
                optional: false,
            }
        };
        module.tree.replace(node, replacement);
        Ok(VisitAction::Skip)
    }

    fn rewrite_assignment(
        &mut self,
        module: &mut Module,
        node: NodeId,
        operator: AssignmentOperator,
        right: NodeId,
    ) -> Result<VisitAction, TransformError> {
        // Uses of the signal inside the right-hand side are rewritten in place
        // before the expression moves under the new closure.
        walk(self, module, right)?;

        let updater = if operator == AssignmentOperator::Assign {
            module.tree.arrow_expression(vec![], right)
        } else {
            let current = module.generate_uid_at(node, "current");
            let tree = &mut module.tree;
            let param = tree.binding_identifier(&current);
            let left = tree.identifier(&current);
            let next = match (operator.to_binary_operator(), operator.to_logical_operator()) {
                (Some(op), _) => tree.binary(op, left, right),
                (None, Some(op)) => tree.logical(op, left, right),
                (None, None) => {
                    return Err(TransformError::UnsupportedSyntax {
                        found: format!("assignment operator `{}`", operator.as_str()),
                        span: tree.span(node),
                    })
                }
            };
            tree.arrow_expression(vec![param], next)
        };
        let callee = module.tree.identifier(&self.write);
        module.tree.replace(
            node,
            NodeKind::CallExpression {
                callee,
                arguments: vec![updater],
                optional: false,
            },
        );
        Ok(VisitAction::Skip)
    }
}

impl Visitor for DerefRewriter {
    fn enter(&mut self, module: &mut Module, node: NodeId) -> Result<VisitAction, TransformError> {
        if self.target.is_shadowed(module, node) {
            return Ok(VisitAction::Skip);
        }
        match self.classify(module, node) {
            Site::Directive(directive) => self.rewrite_directive(module, node, directive),
            Site::Update { operator, prefix } => self.rewrite_update(module, node, operator, prefix),
            Site::Assignment { operator, right } => {
                self.rewrite_assignment(module, node, operator, right)
            }
            Site::Other => self.bindings.enter(module, node),
        }
    }
}

/// The object property whose value is the directive call, with its key.
fn enclosing_property(
    module: &Module,
    call: NodeId,
    directive: Directive,
) -> Result<(NodeId, PropertyKey), TransformError> {
    let missing = |found: &str| TransformError::MissingEnclosingContext {
        context: format!("`{}`", directive.as_str()),
        expected: "object property",
        found: found.to_string(),
        span: module.tree.span(call),
    };
    let parent = module.tree.parent(call).ok_or_else(|| missing("nothing"))?;
    match module.tree.kind(parent) {
        NodeKind::ObjectProperty { key, value, .. } if *value == call => Ok((parent, key.clone())),
        other => Err(missing(other.type_name())),
    }
}

fn directive_argument(
    module: &Module,
    call: NodeId,
    directive: Directive,
) -> Result<String, TransformError> {
    let malformed = |found: &str| TransformError::MalformedArgument {
        directive: directive.as_str(),
        found: found.to_string(),
        span: module.tree.span(call),
    };
    let NodeKind::CallExpression { arguments, .. } = module.tree.kind(call) else {
        return Err(malformed(module.tree.kind(call).type_name()));
    };
    let Some(first) = arguments.first() else {
        return Err(malformed("no argument"));
    };
    match module.tree.kind(*first) {
        NodeKind::Identifier { name } => Ok(name.clone()),
        other => Err(TransformError::MalformedArgument {
            directive: directive.as_str(),
            found: other.type_name().to_string(),
            span: module.tree.span(*first),
        }),
    }
}

/// Rewrites every use of the signal `name` bound at `scope_owner`.
pub fn deref_signal(
    module: &mut Module,
    scope_owner: NodeId,
    name: &str,
    read: &str,
    write: &str,
) -> Result<(), TransformError> {
    debug!(signal = name, read, write, "dereferencing signal");
    let mut rewriter = DerefRewriter::new(module, scope_owner, name, read, write);
    walk(&mut rewriter, module, scope_owner)
}
