//! Lexical scopes over the arena IR.
//!
//! Scope owners are the program, every function-like node (declarations,
//! expressions, arrows, object and class methods, static blocks), classes,
//! loop heads, switch statements, catch clauses and every block that is not
//! itself a function or catch body. `var` and function parameters bind in the
//! nearest function scope, `let`/`const`/function/class declarations in the
//! nearest scope.
//!
//! Fresh names come from [`ScopeTree::generate_uid`], which follows the usual
//! `_hint`, `_hint2`, `_hint3` progression and never hands out a name that is
//! bound in the scope chain, referenced anywhere in the module or already
//! generated.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::ast::{DeclarationKind, NodeId, NodeKind, Tree};

lazy_static! {
    static ref NON_IDENTIFIER_RUN: Regex = Regex::new(r"[^A-Za-z0-9_$]+").unwrap();
    static ref LEADING_NOISE: Regex = Regex::new(r"^[0-9_]+").unwrap();
    static ref TRAILING_DIGITS: Regex = Regex::new(r"[0-9]+$").unwrap();
    static ref IDENTIFIER_NAME: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub owner: NodeId,
    bindings: HashSet<String>,
    uid_counters: HashMap<String, u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    by_owner: HashMap<NodeId, ScopeId>,
    /// Every identifier spelled anywhere in the module, plus every generated name.
    names: HashSet<String>,
}

impl ScopeTree {
    pub fn analyze(tree: &Tree, root: NodeId) -> Self {
        let mut scopes = ScopeTree::default();
        let program = scopes.push_scope(ScopeKind::Program, None, root);
        scopes.collect(tree, root, program, program);
        scopes
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.index()].kind
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn owner(&self, scope: ScopeId) -> NodeId {
        self.scopes[scope.index()].owner
    }

    /// Scope a node belongs to: the one owned by the node itself or by its
    /// nearest owning ancestor. Detached nodes fall back to the program scope.
    pub fn scope_of(&self, tree: &Tree, node: NodeId) -> ScopeId {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(scope) = self.by_owner.get(&id) {
                return *scope;
            }
            current = tree.parent(id);
        }
        self.root()
    }

    /// Binding declared directly in `scope`, ignoring ancestors.
    pub fn owns_binding(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.index()].bindings.contains(name)
    }

    pub fn has_binding(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.owns_binding(id, name) {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn declare(&mut self, scope: ScopeId, name: &str) {
        self.scopes[scope.index()].bindings.insert(name.to_string());
        self.names.insert(name.to_string());
    }

    pub fn bindings(&self, scope: ScopeId) -> impl Iterator<Item = &str> {
        self.scopes[scope.index()].bindings.iter().map(String::as_str)
    }

    /// Reserves and declares a fresh name in `scope` derived from `hint`.
    pub fn generate_uid(&mut self, scope: ScopeId, hint: &str) -> String {
        let base = sanitize_hint(hint);
        let mut attempt = self.scopes[scope.index()]
            .uid_counters
            .get(&base)
            .copied()
            .unwrap_or(0);
        loop {
            attempt += 1;
            let candidate = uid_candidate(&base, attempt);
            if !self.is_taken(scope, &candidate) {
                self.scopes[scope.index()]
                    .uid_counters
                    .insert(base, attempt);
                self.declare(scope, &candidate);
                return candidate;
            }
        }
    }

    fn is_taken(&self, scope: ScopeId, name: &str) -> bool {
        self.names.contains(name) || self.has_binding(scope, name)
    }

    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, owner: NodeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            owner,
            bindings: HashSet::new(),
            uid_counters: HashMap::new(),
        });
        self.by_owner.insert(owner, id);
        id
    }

    fn collect(&mut self, tree: &Tree, node: NodeId, scope: ScopeId, hoist: ScopeId) {
        let (scope, hoist) = match tree.kind(node) {
            NodeKind::Identifier { name } | NodeKind::BindingIdentifier { name } => {
                self.names.insert(name.clone());
                (scope, hoist)
            }
            NodeKind::VariableDeclaration { kind, declarations } => {
                let target = if *kind == DeclarationKind::Var {
                    hoist
                } else {
                    scope
                };
                for declarator in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = tree.kind(*declarator) {
                        self.declare_pattern(tree, *id, target);
                    }
                }
                (scope, hoist)
            }
            NodeKind::ImportDeclaration { specifiers, .. } => {
                for specifier in specifiers {
                    self.declare(scope, specifier.local());
                }
                (scope, hoist)
            }
            NodeKind::FunctionDeclaration { id, params, .. } => {
                if let Some(NodeKind::BindingIdentifier { name }) = id.map(|id| tree.kind(id)) {
                    self.declare(scope, name);
                }
                let function = self.push_scope(ScopeKind::Function, Some(scope), node);
                for param in params {
                    self.declare_pattern(tree, *param, function);
                }
                (function, function)
            }
            NodeKind::FunctionExpression { id, params, .. } => {
                let function = self.push_scope(ScopeKind::Function, Some(scope), node);
                if let Some(NodeKind::BindingIdentifier { name }) = id.map(|id| tree.kind(id)) {
                    self.declare(function, name);
                }
                for param in params {
                    self.declare_pattern(tree, *param, function);
                }
                (function, function)
            }
            NodeKind::ArrowFunctionExpression { params, .. }
            | NodeKind::ObjectMethod { params, .. }
            | NodeKind::ClassMethod { params, .. } => {
                let function = self.push_scope(ScopeKind::Function, Some(scope), node);
                for param in params {
                    self.declare_pattern(tree, *param, function);
                }
                (function, function)
            }
            NodeKind::StaticBlock { .. } => {
                let function = self.push_scope(ScopeKind::Function, Some(scope), node);
                (function, function)
            }
            NodeKind::ClassDeclaration { id, .. } => {
                if let Some(NodeKind::BindingIdentifier { name }) = id.map(|id| tree.kind(id)) {
                    self.declare(scope, name);
                }
                (self.push_scope(ScopeKind::Block, Some(scope), node), hoist)
            }
            NodeKind::ClassExpression { id, .. } => {
                let class = self.push_scope(ScopeKind::Block, Some(scope), node);
                if let Some(NodeKind::BindingIdentifier { name }) = id.map(|id| tree.kind(id)) {
                    self.declare(class, name);
                }
                (class, hoist)
            }
            NodeKind::ForStatement { .. }
            | NodeKind::ForInStatement { .. }
            | NodeKind::ForOfStatement { .. }
            | NodeKind::SwitchStatement { .. } => {
                (self.push_scope(ScopeKind::Block, Some(scope), node), hoist)
            }
            NodeKind::CatchClause { param, .. } => {
                let catch = self.push_scope(ScopeKind::Block, Some(scope), node);
                if let Some(param) = param {
                    self.declare_pattern(tree, *param, catch);
                }
                (catch, hoist)
            }
            NodeKind::BlockStatement { .. } => {
                // function and catch bodies share the scope of their owner
                let is_owned_body = tree.parent(node).is_some_and(|parent| {
                    let parent = tree.kind(parent);
                    parent.is_function_like() || matches!(parent, NodeKind::CatchClause { .. })
                });
                if is_owned_body {
                    (scope, hoist)
                } else {
                    (self.push_scope(ScopeKind::Block, Some(scope), node), hoist)
                }
            }
            NodeKind::JSXElement { name, .. } => {
                if let Some(head) = name.split(['.', ':']).next() {
                    self.names.insert(head.to_string());
                }
                (scope, hoist)
            }
            _ => (scope, hoist),
        };
        for child in tree.children(node) {
            self.collect(tree, child, scope, hoist);
        }
    }

    fn declare_pattern(&mut self, tree: &Tree, pattern: NodeId, scope: ScopeId) {
        match tree.kind(pattern) {
            NodeKind::BindingIdentifier { name } => self.declare(scope, name),
            NodeKind::ObjectPattern { properties, rest } => {
                for property in properties {
                    if let NodeKind::BindingProperty { value, .. } = tree.kind(*property) {
                        self.declare_pattern(tree, *value, scope);
                    }
                }
                if let Some(rest) = rest {
                    self.declare_pattern(tree, *rest, scope);
                }
            }
            NodeKind::ArrayPattern { elements, rest } => {
                for element in elements.iter().flatten() {
                    self.declare_pattern(tree, *element, scope);
                }
                if let Some(rest) = rest {
                    self.declare_pattern(tree, *rest, scope);
                }
            }
            NodeKind::AssignmentPattern { left, .. } => self.declare_pattern(tree, *left, scope),
            NodeKind::RestElement { argument } => self.declare_pattern(tree, *argument, scope),
            _ => {}
        }
    }
}

/// Turns an arbitrary hint into the stem of a generated name: non-identifier
/// runs camel-case the following word, leading digits/underscores and trailing
/// digits are dropped.
pub fn sanitize_hint(hint: &str) -> String {
    let mut stem = String::new();
    for (index, word) in NON_IDENTIFIER_RUN
        .split(hint)
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        if index == 0 || stem.is_empty() {
            stem.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            stem.extend(first.to_uppercase());
            stem.push_str(chars.as_str());
        }
    }
    let stem = LEADING_NOISE.replace(&stem, "");
    let stem = TRAILING_DIGITS.replace(&stem, "");
    if stem.is_empty() {
        "temp".to_string()
    } else {
        stem.into_owned()
    }
}

/// Name produced on the `attempt`-th try for a sanitized stem.
pub fn uid_candidate(stem: &str, attempt: u32) -> String {
    if attempt > 1 {
        format!("_{}{}", stem, attempt)
    } else {
        format!("_{}", stem)
    }
}

pub fn is_identifier_name(name: &str) -> bool {
    IDENTIFIER_NAME.is_match(name)
}
