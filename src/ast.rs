//! Arena IR for the label passes.
//!
//! Every node lives in one `Vec` owned by [`Tree`] and is addressed by a
//! [`NodeId`]. Ids are stable for the lifetime of the tree:
//!
//! 1. `replace` overwrites a node in its slot, so the parent's reference stays valid.
//! 2. Sibling insertion only happens inside list-shaped children (program and block
//!    bodies, declarator lists, object members).
//! 3. A node has at most one parent. Reusing a subtree in a second place goes through
//!    `clone_subtree`.
//!
//! Parent links are kept up to date by `alloc`, `replace` and the insertion helpers.

use oxc_span::{Span, SPAN};
use oxc_syntax::operator::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};

use crate::scope::{ScopeId, ScopeTree};
use crate::validate::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    /// Class constructors only.
    Constructor,
}

/// `async` and `*` markers shared by every function-like node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionFlags {
    pub is_async: bool,
    pub generator: bool,
}

/// Key of an object member, class member or pattern property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// `a`, `"a"`, `1` as written in source.
    Static(String),
    /// `[expr]`
    Computed(NodeId),
    /// `#a`, class members only.
    Private(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Static(String),
    Computed(NodeId),
    Private(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    Named { imported: String, local: String },
    Default { local: String },
    Namespace { local: String },
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Named { local, .. }
            | ImportSpecifier::Default { local }
            | ImportSpecifier::Namespace { local } => local,
        }
    }
}

/// `local as exported` in an export list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },

    // ── statements ──────────────────────────────────────────────────────────
    VariableDeclaration {
        kind: DeclarationKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForInStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    ForOfStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
        is_await: bool,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        body: NodeId,
        test: NodeId,
    },
    BreakStatement {
        label: Option<String>,
    },
    ContinueStatement {
        label: Option<String>,
    },
    LabeledStatement {
        label: String,
        body: NodeId,
    },
    ThrowStatement {
        argument: NodeId,
    },
    TryStatement {
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    },
    CatchClause {
        param: Option<NodeId>,
        body: NodeId,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    SwitchCase {
        /// `None` for `default:`.
        test: Option<NodeId>,
        consequent: Vec<NodeId>,
    },
    DebuggerStatement,
    EmptyStatement,
    FunctionDeclaration {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        flags: FunctionFlags,
    },
    ClassDeclaration {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: Vec<NodeId>,
    },
    ImportDeclaration {
        specifiers: Vec<ImportSpecifier>,
        source: String,
    },
    ExportNamedDeclaration {
        declaration: NodeId,
    },
    /// `export { a, b as c }` and `export { a } from "m"`.
    ExportSpecifiers {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    ExportAllDeclaration {
        exported: Option<String>,
        source: String,
    },
    ExportDefaultDeclaration {
        declaration: NodeId,
    },

    // ── class members ───────────────────────────────────────────────────────
    ClassMethod {
        kind: MethodKind,
        key: PropertyKey,
        is_static: bool,
        params: Vec<NodeId>,
        body: NodeId,
        flags: FunctionFlags,
    },
    ClassProperty {
        key: PropertyKey,
        value: Option<NodeId>,
        is_static: bool,
        accessor: bool,
    },
    StaticBlock {
        body: Vec<NodeId>,
    },

    // ── expressions ─────────────────────────────────────────────────────────
    Identifier {
        name: String,
    },
    NumericLiteral {
        value: f64,
    },
    StringLiteral {
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    /// Kept as written, e.g. `/a+/gi`.
    RegExpLiteral {
        raw: String,
    },
    BigIntLiteral {
        raw: String,
    },
    ThisExpression,
    Super,
    /// `new.target`, `import.meta`
    MetaProperty {
        meta: String,
        property: String,
    },
    TemplateLiteral {
        quasis: Vec<String>,
        expressions: Vec<NodeId>,
    },
    TaggedTemplateExpression {
        tag: NodeId,
        quasi: NodeId,
    },
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    ObjectProperty {
        key: PropertyKey,
        value: NodeId,
        shorthand: bool,
    },
    ObjectMethod {
        kind: MethodKind,
        key: PropertyKey,
        params: Vec<NodeId>,
        body: NodeId,
        flags: FunctionFlags,
    },
    SpreadElement {
        argument: NodeId,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
        /// `callee?.(...)`
        optional: bool,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    ImportExpression {
        source: NodeId,
        options: Option<NodeId>,
    },
    MemberExpression {
        object: NodeId,
        property: MemberProperty,
        /// `object?.property`
        optional: bool,
    },
    /// Bounds an optional chain: `a?.b.c` is one chain, `(a?.b).c` is not.
    ChainExpression {
        expression: NodeId,
    },
    ArrowFunctionExpression {
        params: Vec<NodeId>,
        /// A `BlockStatement` unless `expression` is set.
        body: NodeId,
        expression: bool,
        is_async: bool,
    },
    FunctionExpression {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        flags: FunctionFlags,
    },
    ClassExpression {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: Vec<NodeId>,
    },
    UnaryExpression {
        operator: UnaryOperator,
        argument: NodeId,
    },
    UpdateExpression {
        operator: UpdateOperator,
        prefix: bool,
        argument: NodeId,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    /// `#field in object`
    PrivateInExpression {
        name: String,
        right: NodeId,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: NodeId,
        right: NodeId,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: NodeId,
        right: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    SequenceExpression {
        expressions: Vec<NodeId>,
    },
    AwaitExpression {
        argument: NodeId,
    },
    YieldExpression {
        argument: Option<NodeId>,
        delegate: bool,
    },

    // ── jsx ─────────────────────────────────────────────────────────────────
    JSXElement {
        /// Tag as written: `div`, `Foo.Bar`, `svg:path`.
        name: String,
        attributes: Vec<NodeId>,
        children: Vec<NodeId>,
        self_closing: bool,
    },
    JSXFragment {
        children: Vec<NodeId>,
    },
    JSXAttribute {
        name: String,
        value: Option<NodeId>,
    },
    JSXSpreadAttribute {
        argument: NodeId,
    },
    /// `{expr}`; `None` for an empty container.
    JSXExpressionContainer {
        expression: Option<NodeId>,
    },
    JSXSpreadChild {
        expression: NodeId,
    },
    /// Raw source of a text child or of a quoted attribute value.
    JSXText {
        raw: String,
    },

    // ── patterns ────────────────────────────────────────────────────────────
    BindingIdentifier {
        name: String,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
        rest: Option<NodeId>,
    },
    BindingProperty {
        key: PropertyKey,
        value: NodeId,
        shorthand: bool,
    },
    ArrayPattern {
        elements: Vec<Option<NodeId>>,
        rest: Option<NodeId>,
    },
    AssignmentPattern {
        left: NodeId,
        right: NodeId,
    },
    RestElement {
        argument: NodeId,
    },
}

fn push_key(out: &mut Vec<NodeId>, key: &PropertyKey) {
    if let PropertyKey::Computed(expr) = key {
        out.push(*expr);
    }
}

fn map_key<F: FnMut(NodeId) -> NodeId>(key: PropertyKey, f: &mut F) -> PropertyKey {
    match key {
        PropertyKey::Computed(expr) => PropertyKey::Computed(f(expr)),
        other => other,
    }
}

fn map_all<F: FnMut(NodeId) -> NodeId>(ids: Vec<NodeId>, f: &mut F) -> Vec<NodeId> {
    ids.into_iter().map(f).collect()
}

impl NodeKind {
    /// Child nodes in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Program { body }
            | NodeKind::BlockStatement { body }
            | NodeKind::StaticBlock { body } => out.extend(body.iter().copied()),
            NodeKind::VariableDeclaration { declarations, .. } => {
                out.extend(declarations.iter().copied())
            }
            NodeKind::VariableDeclarator { id, init } => {
                out.push(*id);
                out.extend(*init);
            }
            NodeKind::ExpressionStatement { expression } => out.push(*expression),
            NodeKind::ReturnStatement { argument }
            | NodeKind::YieldExpression { argument, .. } => out.extend(*argument),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.extend(*alternate);
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                out.extend(*init);
                out.extend(*test);
                out.extend(*update);
                out.push(*body);
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement {
                left, right, body, ..
            } => {
                out.push(*left);
                out.push(*right);
                out.push(*body);
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                out.push(*body);
                out.push(*test);
            }
            NodeKind::LabeledStatement { body, .. } => out.push(*body),
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                out.push(*block);
                out.extend(*handler);
                out.extend(*finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                out.extend(*param);
                out.push(*body);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                out.push(*discriminant);
                out.extend(cases.iter().copied());
            }
            NodeKind::SwitchCase { test, consequent } => {
                out.extend(*test);
                out.extend(consequent.iter().copied());
            }
            NodeKind::FunctionDeclaration {
                id, params, body, ..
            }
            | NodeKind::FunctionExpression {
                id, params, body, ..
            } => {
                out.extend(*id);
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeKind::ClassDeclaration {
                id,
                super_class,
                body,
            }
            | NodeKind::ClassExpression {
                id,
                super_class,
                body,
            } => {
                out.extend(*id);
                out.extend(*super_class);
                out.extend(body.iter().copied());
            }
            NodeKind::ExportNamedDeclaration { declaration }
            | NodeKind::ExportDefaultDeclaration { declaration } => out.push(*declaration),
            NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement
            | NodeKind::BreakStatement { .. }
            | NodeKind::ContinueStatement { .. }
            | NodeKind::ImportDeclaration { .. }
            | NodeKind::ExportSpecifiers { .. }
            | NodeKind::ExportAllDeclaration { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::NumericLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::RegExpLiteral { .. }
            | NodeKind::BigIntLiteral { .. }
            | NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::MetaProperty { .. }
            | NodeKind::JSXText { .. }
            | NodeKind::BindingIdentifier { .. } => {}
            NodeKind::TemplateLiteral { expressions, .. }
            | NodeKind::SequenceExpression { expressions } => {
                out.extend(expressions.iter().copied())
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                out.push(*tag);
                out.push(*quasi);
            }
            NodeKind::ArrayExpression { elements } => out.extend(elements.iter().flatten()),
            NodeKind::ObjectExpression { properties } => out.extend(properties.iter().copied()),
            NodeKind::ObjectProperty { key, value, .. }
            | NodeKind::BindingProperty { key, value, .. } => {
                push_key(&mut out, key);
                out.push(*value);
            }
            NodeKind::ObjectMethod {
                key, params, body, ..
            }
            | NodeKind::ClassMethod {
                key, params, body, ..
            } => {
                push_key(&mut out, key);
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeKind::ClassProperty { key, value, .. } => {
                push_key(&mut out, key);
                out.extend(*value);
            }
            NodeKind::SpreadElement { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. }
            | NodeKind::ThrowStatement { argument }
            | NodeKind::AwaitExpression { argument }
            | NodeKind::JSXSpreadAttribute { argument }
            | NodeKind::RestElement { argument } => out.push(*argument),
            NodeKind::ChainExpression { expression }
            | NodeKind::JSXSpreadChild { expression } => out.push(*expression),
            NodeKind::JSXExpressionContainer { expression } => out.extend(*expression),
            NodeKind::PrivateInExpression { right, .. } => out.push(*right),
            NodeKind::CallExpression {
                callee, arguments, ..
            }
            | NodeKind::NewExpression { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments.iter().copied());
            }
            NodeKind::ImportExpression { source, options } => {
                out.push(*source);
                out.extend(*options);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                out.push(*object);
                if let MemberProperty::Computed(expr) = property {
                    out.push(*expr);
                }
            }
            NodeKind::ArrowFunctionExpression { params, body, .. } => {
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::AssignmentPattern { left, right } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::JSXElement {
                attributes,
                children,
                ..
            } => {
                out.extend(attributes.iter().copied());
                out.extend(children.iter().copied());
            }
            NodeKind::JSXFragment { children } => out.extend(children.iter().copied()),
            NodeKind::JSXAttribute { value, .. } => out.extend(*value),
            NodeKind::ObjectPattern { properties, rest } => {
                out.extend(properties.iter().copied());
                out.extend(*rest);
            }
            NodeKind::ArrayPattern { elements, rest } => {
                out.extend(elements.iter().flatten());
                out.extend(*rest);
            }
        }
        out
    }

    /// Rebuilds the node with every child id passed through `f`, in the same
    /// order as [`NodeKind::children`].
    pub fn map_children<F: FnMut(NodeId) -> NodeId>(self, mut f: F) -> NodeKind {
        let f = &mut f;
        match self {
            NodeKind::Program { body } => NodeKind::Program {
                body: map_all(body, f),
            },
            NodeKind::BlockStatement { body } => NodeKind::BlockStatement {
                body: map_all(body, f),
            },
            NodeKind::StaticBlock { body } => NodeKind::StaticBlock {
                body: map_all(body, f),
            },
            NodeKind::VariableDeclaration { kind, declarations } => {
                NodeKind::VariableDeclaration {
                    kind,
                    declarations: map_all(declarations, f),
                }
            }
            NodeKind::VariableDeclarator { id, init } => NodeKind::VariableDeclarator {
                id: f(id),
                init: init.map(&mut *f),
            },
            NodeKind::ExpressionStatement { expression } => NodeKind::ExpressionStatement {
                expression: f(expression),
            },
            NodeKind::ReturnStatement { argument } => NodeKind::ReturnStatement {
                argument: argument.map(&mut *f),
            },
            NodeKind::YieldExpression { argument, delegate } => NodeKind::YieldExpression {
                argument: argument.map(&mut *f),
                delegate,
            },
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => NodeKind::IfStatement {
                test: f(test),
                consequent: f(consequent),
                alternate: alternate.map(&mut *f),
            },
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => NodeKind::ForStatement {
                init: init.map(&mut *f),
                test: test.map(&mut *f),
                update: update.map(&mut *f),
                body: f(body),
            },
            NodeKind::ForInStatement { left, right, body } => NodeKind::ForInStatement {
                left: f(left),
                right: f(right),
                body: f(body),
            },
            NodeKind::ForOfStatement {
                left,
                right,
                body,
                is_await,
            } => NodeKind::ForOfStatement {
                left: f(left),
                right: f(right),
                body: f(body),
                is_await,
            },
            NodeKind::WhileStatement { test, body } => NodeKind::WhileStatement {
                test: f(test),
                body: f(body),
            },
            NodeKind::DoWhileStatement { body, test } => NodeKind::DoWhileStatement {
                body: f(body),
                test: f(test),
            },
            NodeKind::LabeledStatement { label, body } => NodeKind::LabeledStatement {
                label,
                body: f(body),
            },
            NodeKind::ThrowStatement { argument } => NodeKind::ThrowStatement {
                argument: f(argument),
            },
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => NodeKind::TryStatement {
                block: f(block),
                handler: handler.map(&mut *f),
                finalizer: finalizer.map(&mut *f),
            },
            NodeKind::CatchClause { param, body } => NodeKind::CatchClause {
                param: param.map(&mut *f),
                body: f(body),
            },
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => NodeKind::SwitchStatement {
                discriminant: f(discriminant),
                cases: map_all(cases, f),
            },
            NodeKind::SwitchCase { test, consequent } => NodeKind::SwitchCase {
                test: test.map(&mut *f),
                consequent: map_all(consequent, f),
            },
            NodeKind::FunctionDeclaration {
                id,
                params,
                body,
                flags,
            } => NodeKind::FunctionDeclaration {
                id: id.map(&mut *f),
                params: map_all(params, f),
                body: f(body),
                flags,
            },
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                flags,
            } => NodeKind::FunctionExpression {
                id: id.map(&mut *f),
                params: map_all(params, f),
                body: f(body),
                flags,
            },
            NodeKind::ClassDeclaration {
                id,
                super_class,
                body,
            } => NodeKind::ClassDeclaration {
                id: id.map(&mut *f),
                super_class: super_class.map(&mut *f),
                body: map_all(body, f),
            },
            NodeKind::ClassExpression {
                id,
                super_class,
                body,
            } => NodeKind::ClassExpression {
                id: id.map(&mut *f),
                super_class: super_class.map(&mut *f),
                body: map_all(body, f),
            },
            NodeKind::ExportNamedDeclaration { declaration } => {
                NodeKind::ExportNamedDeclaration {
                    declaration: f(declaration),
                }
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                NodeKind::ExportDefaultDeclaration {
                    declaration: f(declaration),
                }
            }
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => NodeKind::TemplateLiteral {
                quasis,
                expressions: map_all(expressions, f),
            },
            NodeKind::SequenceExpression { expressions } => NodeKind::SequenceExpression {
                expressions: map_all(expressions, f),
            },
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                NodeKind::TaggedTemplateExpression {
                    tag: f(tag),
                    quasi: f(quasi),
                }
            }
            NodeKind::ArrayExpression { elements } => NodeKind::ArrayExpression {
                elements: elements
                    .into_iter()
                    .map(|element| element.map(&mut *f))
                    .collect(),
            },
            NodeKind::ObjectExpression { properties } => NodeKind::ObjectExpression {
                properties: map_all(properties, f),
            },
            NodeKind::ObjectProperty {
                key,
                value,
                shorthand,
            } => {
                let key = map_key(key, f);
                NodeKind::ObjectProperty {
                    key,
                    value: f(value),
                    shorthand,
                }
            }
            NodeKind::BindingProperty {
                key,
                value,
                shorthand,
            } => {
                let key = map_key(key, f);
                NodeKind::BindingProperty {
                    key,
                    value: f(value),
                    shorthand,
                }
            }
            NodeKind::ObjectMethod {
                kind,
                key,
                params,
                body,
                flags,
            } => {
                let key = map_key(key, f);
                NodeKind::ObjectMethod {
                    kind,
                    key,
                    params: map_all(params, f),
                    body: f(body),
                    flags,
                }
            }
            NodeKind::ClassMethod {
                kind,
                key,
                is_static,
                params,
                body,
                flags,
            } => {
                let key = map_key(key, f);
                NodeKind::ClassMethod {
                    kind,
                    key,
                    is_static,
                    params: map_all(params, f),
                    body: f(body),
                    flags,
                }
            }
            NodeKind::ClassProperty {
                key,
                value,
                is_static,
                accessor,
            } => {
                let key = map_key(key, f);
                NodeKind::ClassProperty {
                    key,
                    value: value.map(&mut *f),
                    is_static,
                    accessor,
                }
            }
            NodeKind::SpreadElement { argument } => NodeKind::SpreadElement {
                argument: f(argument),
            },
            NodeKind::UnaryExpression { operator, argument } => NodeKind::UnaryExpression {
                operator,
                argument: f(argument),
            },
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => NodeKind::UpdateExpression {
                operator,
                prefix,
                argument: f(argument),
            },
            NodeKind::AwaitExpression { argument } => NodeKind::AwaitExpression {
                argument: f(argument),
            },
            NodeKind::RestElement { argument } => NodeKind::RestElement {
                argument: f(argument),
            },
            NodeKind::JSXSpreadAttribute { argument } => NodeKind::JSXSpreadAttribute {
                argument: f(argument),
            },
            NodeKind::ChainExpression { expression } => NodeKind::ChainExpression {
                expression: f(expression),
            },
            NodeKind::JSXSpreadChild { expression } => NodeKind::JSXSpreadChild {
                expression: f(expression),
            },
            NodeKind::JSXExpressionContainer { expression } => {
                NodeKind::JSXExpressionContainer {
                    expression: expression.map(&mut *f),
                }
            }
            NodeKind::PrivateInExpression { name, right } => NodeKind::PrivateInExpression {
                name,
                right: f(right),
            },
            NodeKind::CallExpression {
                callee,
                arguments,
                optional,
            } => NodeKind::CallExpression {
                callee: f(callee),
                arguments: map_all(arguments, f),
                optional,
            },
            NodeKind::NewExpression { callee, arguments } => NodeKind::NewExpression {
                callee: f(callee),
                arguments: map_all(arguments, f),
            },
            NodeKind::ImportExpression { source, options } => NodeKind::ImportExpression {
                source: f(source),
                options: options.map(&mut *f),
            },
            NodeKind::MemberExpression {
                object,
                property,
                optional,
            } => {
                let object = f(object);
                let property = match property {
                    MemberProperty::Computed(expr) => MemberProperty::Computed(f(expr)),
                    other => other,
                };
                NodeKind::MemberExpression {
                    object,
                    property,
                    optional,
                }
            }
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression,
                is_async,
            } => NodeKind::ArrowFunctionExpression {
                params: map_all(params, f),
                body: f(body),
                expression,
                is_async,
            },
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => NodeKind::BinaryExpression {
                operator,
                left: f(left),
                right: f(right),
            },
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => NodeKind::LogicalExpression {
                operator,
                left: f(left),
                right: f(right),
            },
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => NodeKind::AssignmentExpression {
                operator,
                left: f(left),
                right: f(right),
            },
            NodeKind::AssignmentPattern { left, right } => NodeKind::AssignmentPattern {
                left: f(left),
                right: f(right),
            },
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => NodeKind::ConditionalExpression {
                test: f(test),
                consequent: f(consequent),
                alternate: f(alternate),
            },
            NodeKind::JSXElement {
                name,
                attributes,
                children,
                self_closing,
            } => NodeKind::JSXElement {
                name,
                attributes: map_all(attributes, f),
                children: map_all(children, f),
                self_closing,
            },
            NodeKind::JSXFragment { children } => NodeKind::JSXFragment {
                children: map_all(children, f),
            },
            NodeKind::JSXAttribute { name, value } => NodeKind::JSXAttribute {
                name,
                value: value.map(&mut *f),
            },
            NodeKind::ObjectPattern { properties, rest } => NodeKind::ObjectPattern {
                properties: map_all(properties, f),
                rest: rest.map(&mut *f),
            },
            NodeKind::ArrayPattern { elements, rest } => NodeKind::ArrayPattern {
                elements: elements
                    .into_iter()
                    .map(|element| element.map(&mut *f))
                    .collect(),
                rest: rest.map(&mut *f),
            },
            leaf @ (NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement
            | NodeKind::BreakStatement { .. }
            | NodeKind::ContinueStatement { .. }
            | NodeKind::ImportDeclaration { .. }
            | NodeKind::ExportSpecifiers { .. }
            | NodeKind::ExportAllDeclaration { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::NumericLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::RegExpLiteral { .. }
            | NodeKind::BigIntLiteral { .. }
            | NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::MetaProperty { .. }
            | NodeKind::JSXText { .. }
            | NodeKind::BindingIdentifier { .. }) => leaf,
        }
    }

    /// The list that holds `child` as a sibling-insertable element, with its position.
    fn sibling_list_mut(&mut self, child: NodeId) -> Option<(&mut Vec<NodeId>, usize)> {
        let list = match self {
            NodeKind::Program { body }
            | NodeKind::BlockStatement { body }
            | NodeKind::StaticBlock { body }
            | NodeKind::ClassDeclaration { body, .. }
            | NodeKind::ClassExpression { body, .. } => body,
            NodeKind::SwitchCase { consequent, .. } => consequent,
            NodeKind::VariableDeclaration { declarations, .. } => declarations,
            NodeKind::ObjectExpression { properties }
            | NodeKind::ObjectPattern { properties, .. } => properties,
            NodeKind::SequenceExpression { expressions } => expressions,
            _ => return None,
        };
        let position = list.iter().position(|&id| id == child)?;
        Some((list, position))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
            NodeKind::ExportSpecifiers { .. } => "ExportNamedDeclaration",
            NodeKind::ExportAllDeclaration { .. } => "ExportAllDeclaration",
            NodeKind::ExportDefaultDeclaration { .. } => "ExportDefaultDeclaration",
            NodeKind::ClassMethod { .. } => "ClassMethod",
            NodeKind::ClassProperty { .. } => "ClassProperty",
            NodeKind::StaticBlock { .. } => "StaticBlock",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::NumericLiteral { .. } => "NumericLiteral",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::RegExpLiteral { .. } => "RegExpLiteral",
            NodeKind::BigIntLiteral { .. } => "BigIntLiteral",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::Super => "Super",
            NodeKind::MetaProperty { .. } => "MetaProperty",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::ObjectProperty { .. } => "ObjectProperty",
            NodeKind::ObjectMethod { .. } => "ObjectMethod",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::ImportExpression { .. } => "ImportExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::ChainExpression { .. } => "ChainExpression",
            NodeKind::ArrowFunctionExpression { .. } => "ArrowFunctionExpression",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::ClassExpression { .. } => "ClassExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::PrivateInExpression { .. } => "PrivateInExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::AwaitExpression { .. } => "AwaitExpression",
            NodeKind::YieldExpression { .. } => "YieldExpression",
            NodeKind::JSXElement { .. } => "JSXElement",
            NodeKind::JSXFragment { .. } => "JSXFragment",
            NodeKind::JSXAttribute { .. } => "JSXAttribute",
            NodeKind::JSXSpreadAttribute { .. } => "JSXSpreadAttribute",
            NodeKind::JSXExpressionContainer { .. } => "JSXExpressionContainer",
            NodeKind::JSXSpreadChild { .. } => "JSXSpreadChild",
            NodeKind::JSXText { .. } => "JSXText",
            NodeKind::BindingIdentifier { .. } => "BindingIdentifier",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::BindingProperty { .. } => "BindingProperty",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::RestElement { .. } => "RestElement",
        }
    }

    /// Nodes that open a function scope.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::ArrowFunctionExpression { .. }
                | NodeKind::ObjectMethod { .. }
                | NodeKind::ClassMethod { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let children = kind.children();
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Overwrites the node in place. The id, span and parent link are kept; the new
    /// children are re-parented to `id`.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) {
        let children = kind.children();
        self.nodes[id.index()].kind = kind;
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
    }

    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TransformError> {
        self.insert_sibling(anchor, node, 0)
    }

    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TransformError> {
        self.insert_sibling(anchor, node, 1)
    }

    fn insert_sibling(
        &mut self,
        anchor: NodeId,
        node: NodeId,
        offset: usize,
    ) -> Result<(), TransformError> {
        let detached = || TransformError::MissingEnclosingContext {
            context: "sibling insertion".to_string(),
            expected: "statement, declarator or member list",
            found: "nothing".to_string(),
            span: SPAN,
        };
        let parent = self.parent(anchor).ok_or_else(detached)?;
        let found = self.kind(parent).type_name();
        let span = self.span(anchor);
        let (list, position) = self.nodes[parent.index()]
            .kind
            .sibling_list_mut(anchor)
            .ok_or_else(|| TransformError::MissingEnclosingContext {
                context: "sibling insertion".to_string(),
                expected: "statement, declarator or member list",
                found: found.to_string(),
                span,
            })?;
        list.insert(position + offset, node);
        self.nodes[node.index()].parent = Some(parent);
        Ok(())
    }

    /// Inserts `statement` as the first statement of a program or block.
    pub fn prepend_statement(
        &mut self,
        container: NodeId,
        statement: NodeId,
    ) -> Result<(), TransformError> {
        let found = self.kind(container).type_name();
        let span = self.span(container);
        match &mut self.nodes[container.index()].kind {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => {
                body.insert(0, statement)
            }
            _ => {
                return Err(TransformError::MissingEnclosingContext {
                    context: "statement insertion".to_string(),
                    expected: "Program or BlockStatement",
                    found: found.to_string(),
                    span,
                })
            }
        }
        self.nodes[statement.index()].parent = Some(container);
        Ok(())
    }

    /// Deep copy of the subtree rooted at `id`. The copy is detached until it is
    /// placed under a parent.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        let span = self.span(id);
        let cloned = kind.map_children(|child| self.clone_subtree(child));
        self.alloc(cloned, span)
    }

    // ── builders ────────────────────────────────────────────────────────────
    // Synthesized nodes carry an empty span.

    pub fn identifier(&mut self, name: &str) -> NodeId {
        self.alloc(
            NodeKind::Identifier {
                name: name.to_string(),
            },
            SPAN,
        )
    }

    pub fn binding_identifier(&mut self, name: &str) -> NodeId {
        self.alloc(
            NodeKind::BindingIdentifier {
                name: name.to_string(),
            },
            SPAN,
        )
    }

    pub fn string_literal(&mut self, value: &str) -> NodeId {
        self.alloc(
            NodeKind::StringLiteral {
                value: value.to_string(),
            },
            SPAN,
        )
    }

    pub fn number_literal(&mut self, value: f64) -> NodeId {
        self.alloc(NodeKind::NumericLiteral { value }, SPAN)
    }

    pub fn null_literal(&mut self) -> NodeId {
        self.alloc(NodeKind::NullLiteral, SPAN)
    }

    pub fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::CallExpression {
                callee,
                arguments,
                optional: false,
            },
            SPAN,
        )
    }

    /// `name(...arguments)`
    pub fn call_named(&mut self, name: &str, arguments: Vec<NodeId>) -> NodeId {
        let callee = self.identifier(name);
        self.call(callee, arguments)
    }

    pub fn member_static(&mut self, object: NodeId, property: &str) -> NodeId {
        self.alloc(
            NodeKind::MemberExpression {
                object,
                property: MemberProperty::Static(property.to_string()),
                optional: false,
            },
            SPAN,
        )
    }

    pub fn member_computed(&mut self, object: NodeId, property: NodeId) -> NodeId {
        self.alloc(
            NodeKind::MemberExpression {
                object,
                property: MemberProperty::Computed(property),
                optional: false,
            },
            SPAN,
        )
    }

    pub fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::ArrayExpression {
                elements: elements.into_iter().map(Some).collect(),
            },
            SPAN,
        )
    }

    pub fn binary(&mut self, operator: BinaryOperator, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            },
            SPAN,
        )
    }

    pub fn logical(&mut self, operator: LogicalOperator, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            },
            SPAN,
        )
    }

    pub fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.alloc(
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            },
            SPAN,
        )
    }

    /// `(params) => body`
    pub fn arrow_expression(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.alloc(
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression: true,
                is_async: false,
            },
            SPAN,
        )
    }

    /// `(params) => { statements }`
    pub fn arrow_block(&mut self, params: Vec<NodeId>, statements: Vec<NodeId>) -> NodeId {
        let body = self.block(statements);
        self.alloc(
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression: false,
                is_async: false,
            },
            SPAN,
        )
    }

    pub fn block(&mut self, body: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::BlockStatement { body }, SPAN)
    }

    pub fn return_statement(&mut self, argument: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::ReturnStatement { argument }, SPAN)
    }

    pub fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.alloc(NodeKind::ExpressionStatement { expression }, SPAN)
    }

    pub fn variable_declarator(&mut self, id: NodeId, init: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::VariableDeclarator { id, init }, SPAN)
    }

    pub fn variable_declaration(
        &mut self,
        kind: DeclarationKind,
        declarations: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(NodeKind::VariableDeclaration { kind, declarations }, SPAN)
    }
}

/// A lowered module: the node arena plus the scope tree computed over it.
#[derive(Debug, Clone)]
pub struct Module {
    pub tree: Tree,
    pub scopes: ScopeTree,
    root: NodeId,
}

impl Module {
    pub fn new(tree: Tree, root: NodeId) -> Self {
        let scopes = ScopeTree::analyze(&tree, root);
        Self { tree, scopes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn scope_of(&self, node: NodeId) -> ScopeId {
        self.scopes.scope_of(&self.tree, node)
    }

    /// The node owning the scope that `node` belongs to.
    pub fn scope_owner(&self, node: NodeId) -> NodeId {
        self.scopes.owner(self.scope_of(node))
    }

    /// Fresh identifier name, declared in the scope of `node`.
    pub fn generate_uid_at(&mut self, node: NodeId, hint: &str) -> String {
        let scope = self.scope_of(node);
        self.scopes.generate_uid(scope, hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration_with(tree: &mut Tree, names: &[&str]) -> (NodeId, Vec<NodeId>) {
        let declarators: Vec<NodeId> = names
            .iter()
            .map(|name| {
                let id = tree.binding_identifier(name);
                tree.variable_declarator(id, None)
            })
            .collect();
        let declaration = tree.variable_declaration(DeclarationKind::Let, declarators.clone());
        (declaration, declarators)
    }

    fn declarator_names(tree: &Tree, declaration: NodeId) -> Vec<String> {
        tree.children(declaration)
            .into_iter()
            .map(|declarator| match tree.kind(tree.children(declarator)[0]) {
                NodeKind::BindingIdentifier { name } => name.clone(),
                other => panic!("unexpected {}", other.type_name()),
            })
            .collect()
    }

    #[test]
    fn alloc_links_children_to_parent() {
        let mut tree = Tree::new();
        let callee = tree.identifier("f");
        let arg = tree.number_literal(1.0);
        let call = tree.call(callee, vec![arg]);
        assert_eq!(tree.parent(callee), Some(call));
        assert_eq!(tree.parent(arg), Some(call));
        assert_eq!(tree.children(call), vec![callee, arg]);
    }

    #[test]
    fn replace_keeps_id_and_reparents() {
        let mut tree = Tree::new();
        let target = tree.identifier("x");
        let stmt = tree.expression_statement(target);
        let read = tree.identifier("_x");
        tree.replace(
            target,
            NodeKind::CallExpression {
                callee: read,
                arguments: vec![],
                optional: false,
            },
        );
        assert_eq!(tree.parent(target), Some(stmt));
        assert_eq!(tree.parent(read), Some(target));
        assert_eq!(tree.kind(target).type_name(), "CallExpression");
    }

    #[test]
    fn sibling_insertion_preserves_order() {
        let mut tree = Tree::new();
        let (declaration, declarators) = declaration_with(&mut tree, &["b"]);
        let a_id = tree.binding_identifier("a");
        let a = tree.variable_declarator(a_id, None);
        let c_id = tree.binding_identifier("c");
        let c = tree.variable_declarator(c_id, None);
        tree.insert_before(declarators[0], a).unwrap();
        tree.insert_after(declarators[0], c).unwrap();
        assert_eq!(declarator_names(&tree, declaration), vec!["a", "b", "c"]);
        assert_eq!(tree.parent(a), Some(declaration));
        assert_eq!(tree.parent(c), Some(declaration));
    }

    #[test]
    fn insertion_requires_a_list_parent() {
        let mut tree = Tree::new();
        let value = tree.identifier("x");
        let _stmt = tree.expression_statement(value);
        let other = tree.identifier("y");
        let err = tree.insert_after(value, other).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingEnclosingContext { ref found, .. } if found == "ExpressionStatement"
        ));

        let detached = tree.identifier("z");
        assert!(tree.insert_before(detached, other).is_err());
    }

    #[test]
    fn clone_subtree_is_deep() {
        let mut tree = Tree::new();
        let object = tree.identifier("props");
        let key = tree.string_literal("a");
        let access = tree.member_computed(object, key);
        let copy = tree.clone_subtree(access);
        assert_ne!(copy, access);
        assert_eq!(tree.parent(copy), None);
        let copied_children = tree.children(copy);
        assert_eq!(copied_children.len(), 2);
        assert!(copied_children.iter().all(|child| tree.parent(*child) == Some(copy)));
        assert!(!copied_children.contains(&object));
        assert_eq!(tree.kind(copied_children[0]), tree.kind(object));
    }
}
