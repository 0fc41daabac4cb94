//! Lazy destructuring.
//!
//! `let { a, b: { c }, ...rest } = $destructure(props)` becomes
//!
//! ```js
//! let _prop = () => props.a,
//!   _prop2 = () => props.b,
//!   _prop3 = () => _prop2().c,
//!   _other = _splitProps(props, ["a", "b"])[1],
//!   _other2 = _splitProps(_prop2(), ["c"])[1];
//! ```
//!
//! and every read of `a`, `c` or `rest` in the declaring scope is rewritten to
//! `_prop()`, `_prop3()` or `_other`. Each leaf re-reads its source on every
//! access; nothing is evaluated eagerly except the rest partition.

use oxc_syntax::operator::BinaryOperator;
use tracing::debug;

use crate::ast::{DeclarationKind, Module, NodeId, NodeKind, PropertyKey};
use crate::hooks::HookResolver;
use crate::normalize::{normalize_bindings, Substitution};
use crate::scope::is_identifier_name;
use crate::validate::TransformError;

/// Shape of one slot of a destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    Identifier(String),
    Nested(NodeId),
    Defaulted(Box<PatternElement>, NodeId),
    Rest(String),
}

const ELEMENT_SHAPES: &str = "Identifier, ObjectPattern, ArrayPattern or AssignmentPattern";

pub fn classify_element(module: &Module, element: NodeId) -> Result<PatternElement, TransformError> {
    let tree = &module.tree;
    match tree.kind(element) {
        NodeKind::BindingIdentifier { name } | NodeKind::Identifier { name } => {
            Ok(PatternElement::Identifier(name.clone()))
        }
        NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. } => {
            Ok(PatternElement::Nested(element))
        }
        NodeKind::AssignmentPattern { left, right } => Ok(PatternElement::Defaulted(
            Box::new(classify_element(module, *left)?),
            *right,
        )),
        NodeKind::RestElement { argument } => match tree.kind(*argument) {
            NodeKind::BindingIdentifier { name } | NodeKind::Identifier { name } => {
                Ok(PatternElement::Rest(name.clone()))
            }
            other => Err(TransformError::UnsupportedValueShape {
                found: other.type_name().to_string(),
                expected: "Identifier",
                span: tree.span(*argument),
            }),
        },
        NodeKind::MemberExpression { .. } => Err(TransformError::UnsupportedPatternTarget {
            found: "MemberExpression".to_string(),
            span: tree.span(element),
        }),
        other => Err(TransformError::UnsupportedValueShape {
            found: other.type_name().to_string(),
            expected: ELEMENT_SHAPES,
            span: tree.span(element),
        }),
    }
}

/// Flattens `pattern` (read from `source`) into lazy declarators around
/// `declarator`.
///
/// With `replace` the declarator itself becomes the rest binding; otherwise the
/// rest binding is inserted after it. Generated declarators land before
/// `declarator`, in pattern order.
pub fn destructure_variable(
    hooks: &mut dyn HookResolver,
    module: &mut Module,
    declarator: NodeId,
    source: NodeId,
    pattern: NodeId,
    replace: bool,
) -> Result<(), TransformError> {
    let other = module.generate_uid_at(declarator, "other");
    let scope_owner = module.scope_owner(declarator);
    let mut keys = Vec::new();

    let rest = match module.tree.kind(pattern).clone() {
        NodeKind::ObjectPattern {
            properties,
            rest: rest_element,
        } => {
            for property in properties {
                let NodeKind::BindingProperty { key, value, .. } = module.tree.kind(property).clone()
                else {
                    return Err(TransformError::UnsupportedValueShape {
                        found: module.tree.kind(property).type_name().to_string(),
                        expected: "BindingProperty",
                        span: module.tree.span(property),
                    });
                };
                let element = classify_element(module, value)?;
                let object = module.tree.clone_subtree(source);
                let access = match &key {
                    PropertyKey::Static(name) => {
                        keys.push(module.tree.string_literal(name));
                        if is_identifier_name(name) {
                            module.tree.member_static(object, name)
                        } else {
                            // "a-b" and 0 are only reachable through brackets
                            let property = module.tree.string_literal(name);
                            module.tree.member_computed(object, property)
                        }
                    }
                    PropertyKey::Computed(expr) => {
                        keys.push(module.tree.clone_subtree(*expr));
                        let property = module.tree.clone_subtree(*expr);
                        module.tree.member_computed(object, property)
                    }
                    PropertyKey::Private(name) => {
                        return Err(TransformError::UnsupportedValueShape {
                            found: format!("#{}", name),
                            expected: "static or computed key",
                            span: module.tree.span(property),
                        })
                    }
                };
                bind_element(hooks, module, declarator, scope_owner, access, element)?;
            }
            rest_element
        }
        NodeKind::ArrayPattern {
            elements,
            rest: rest_element,
        } => {
            for (index, element) in elements.into_iter().enumerate() {
                let Some(element) = element else { continue };
                let element = classify_element(module, element)?;
                keys.push(module.tree.number_literal(index as f64));
                let object = module.tree.clone_subtree(source);
                let property = module.tree.number_literal(index as f64);
                let access = module.tree.member_computed(object, property);
                bind_element(hooks, module, declarator, scope_owner, access, element)?;
            }
            rest_element
        }
        other => {
            return Err(TransformError::UnsupportedValueShape {
                found: other.type_name().to_string(),
                expected: "ObjectPattern or ArrayPattern",
                span: module.tree.span(pattern),
            })
        }
    };

    let rest_name = match rest {
        Some(rest) => match classify_element(module, rest)? {
            PatternElement::Rest(name) => Some(name),
            _ => {
                return Err(TransformError::UnsupportedValueShape {
                    found: module.tree.kind(rest).type_name().to_string(),
                    expected: "RestElement",
                    span: module.tree.span(rest),
                })
            }
        },
        None => None,
    };

    debug!(
        declarator = ?declarator,
        keys = keys.len(),
        rest = rest_name.is_some(),
        replace,
        "flattened destructuring pattern"
    );

    let init = if keys.is_empty() {
        module.tree.clone_subtree(source)
    } else {
        let helper = hooks.hook_identifier(module, "splitProps")?;
        let object = module.tree.clone_subtree(source);
        let key_list = module.tree.array(keys);
        let split = module.tree.call_named(&helper, vec![object, key_list]);
        let index = module.tree.number_literal(1.0);
        module.tree.member_computed(split, index)
    };
    let id = module.tree.binding_identifier(&other);
    if replace {
        module
            .tree
            .replace(declarator, NodeKind::VariableDeclarator { id, init: Some(init) });
    } else {
        let rest_declarator = module.tree.variable_declarator(id, Some(init));
        module.tree.insert_after(declarator, rest_declarator)?;
    }

    if let Some(name) = rest_name {
        normalize_bindings(module, scope_owner, Substitution::Reference(other), &name)?;
    }
    Ok(())
}

/// Emits `_prop = () => access` (or its defaulted form) before `declarator`
/// and binds the element to it.
fn bind_element(
    hooks: &mut dyn HookResolver,
    module: &mut Module,
    declarator: NodeId,
    scope_owner: NodeId,
    access: NodeId,
    element: PatternElement,
) -> Result<(), TransformError> {
    let prop = module.generate_uid_at(declarator, "prop");
    let (binding, default) = match element {
        PatternElement::Defaulted(inner, default) => (*inner, Some(default)),
        element => (element, None),
    };

    let getter = match default {
        // () => { const _value = access; return _value == null ? default : _value; }
        Some(default) => {
            let value = module.generate_uid_at(declarator, "value");
            let tree = &mut module.tree;
            let id = tree.binding_identifier(&value);
            let value_declarator = tree.variable_declarator(id, Some(access));
            let declaration = tree.variable_declaration(DeclarationKind::Const, vec![value_declarator]);
            let tested = tree.identifier(&value);
            let null = tree.null_literal();
            let test = tree.binary(BinaryOperator::Equality, tested, null);
            let fallback = tree.clone_subtree(default);
            let present = tree.identifier(&value);
            let choice = tree.conditional(test, fallback, present);
            let ret = tree.return_statement(Some(choice));
            tree.arrow_block(vec![], vec![declaration, ret])
        }
        None => module.tree.arrow_expression(vec![], access),
    };
    let id = module.tree.binding_identifier(&prop);
    let prop_declarator = module.tree.variable_declarator(id, Some(getter));
    module.tree.insert_before(declarator, prop_declarator)?;

    match binding {
        PatternElement::Identifier(name) => {
            normalize_bindings(module, scope_owner, Substitution::Invoke(prop), &name)
        }
        PatternElement::Nested(pattern) => {
            let lazy_source = module.tree.call_named(&prop, vec![]);
            destructure_variable(hooks, module, declarator, lazy_source, pattern, false)
        }
        PatternElement::Defaulted(..) | PatternElement::Rest(_) => {
            Err(TransformError::UnsupportedValueShape {
                found: "nested default or rest".to_string(),
                expected: ELEMENT_SHAPES,
                span: module.tree.span(access),
            })
        }
    }
}
