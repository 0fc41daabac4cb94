//! Codegen module
//!
//! Prints the arena IR back to JavaScript. Output is deterministic: two-space
//! indentation, double-quoted strings, one statement per line and a trailing
//! newline. Parentheses are emitted only where operator precedence or
//! statement-position rules require them.

use crate::ast::{
    DeclarationKind, ExportSpecifier, FunctionFlags, ImportSpecifier, MemberProperty, MethodKind,
    NodeId, NodeKind, PropertyKey, Tree,
};
use crate::scope::is_identifier_name;

// ═══════════════════════════════════════════════════════════════════════════════
// PRECEDENCE
// ═══════════════════════════════════════════════════════════════════════════════

const PREC_SEQUENCE: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_NULLISH: u8 = 4;
const PREC_AND: u8 = 5;
const PREC_RELATIONAL: u8 = 10;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 16;
const PREC_CALL: u8 = 17;
const PREC_MEMBER: u8 = 18;
const PREC_PRIMARY: u8 = 19;

fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "|" => 6,
        "^" => 7,
        "&" => 8,
        "==" | "!=" | "===" | "!==" => 9,
        "<" | ">" | "<=" | ">=" | "in" | "instanceof" => PREC_RELATIONAL,
        "<<" | ">>" | ">>>" => 11,
        "+" | "-" => 12,
        "*" | "/" | "%" => 13,
        "**" => 14,
        _ => 12,
    }
}

fn precedence(tree: &Tree, id: NodeId) -> u8 {
    match tree.kind(id) {
        NodeKind::SequenceExpression { .. } => PREC_SEQUENCE,
        NodeKind::AssignmentExpression { .. }
        | NodeKind::ArrowFunctionExpression { .. }
        | NodeKind::YieldExpression { .. } => PREC_ASSIGN,
        NodeKind::ConditionalExpression { .. } => PREC_CONDITIONAL,
        NodeKind::LogicalExpression { operator, .. } => {
            if operator.as_str() == "&&" {
                PREC_AND
            } else {
                PREC_NULLISH
            }
        }
        NodeKind::BinaryExpression { operator, .. } => binary_precedence(operator.as_str()),
        NodeKind::PrivateInExpression { .. } => PREC_RELATIONAL,
        NodeKind::UnaryExpression { .. } | NodeKind::AwaitExpression { .. } => PREC_UNARY,
        NodeKind::UpdateExpression { prefix, .. } => {
            if *prefix {
                PREC_UNARY
            } else {
                PREC_POSTFIX
            }
        }
        NodeKind::CallExpression { .. }
        | NodeKind::NewExpression { .. }
        | NodeKind::ImportExpression { .. }
        | NodeKind::TaggedTemplateExpression { .. } => PREC_CALL,
        NodeKind::MemberExpression { .. } => PREC_MEMBER,
        NodeKind::ChainExpression { expression } => precedence(tree, *expression),
        _ => PREC_PRIMARY,
    }
}

/// The node whose text starts the printed expression.
fn leftmost(tree: &Tree, mut id: NodeId) -> NodeId {
    loop {
        id = match tree.kind(id) {
            NodeKind::CallExpression { callee, .. } => *callee,
            NodeKind::MemberExpression { object, .. } => *object,
            NodeKind::TaggedTemplateExpression { tag, .. } => *tag,
            NodeKind::ChainExpression { expression } => *expression,
            NodeKind::BinaryExpression { left, .. }
            | NodeKind::LogicalExpression { left, .. }
            | NodeKind::AssignmentExpression { left, .. } => *left,
            NodeKind::ConditionalExpression { test, .. } => *test,
            NodeKind::UpdateExpression {
                prefix: false,
                argument,
                ..
            } => *argument,
            NodeKind::SequenceExpression { expressions } => match expressions.first() {
                Some(first) => *first,
                None => return id,
            },
            _ => return id,
        };
    }
}

fn starts_with_brace(tree: &Tree, id: NodeId) -> bool {
    matches!(
        tree.kind(leftmost(tree, id)),
        NodeKind::ObjectExpression { .. } | NodeKind::ObjectPattern { .. }
    )
}

/// `function`, `class` and `{` cannot open an expression statement.
fn starts_like_declaration(tree: &Tree, id: NodeId) -> bool {
    starts_with_brace(tree, id)
        || matches!(
            tree.kind(leftmost(tree, id)),
            NodeKind::FunctionExpression { .. } | NodeKind::ClassExpression { .. }
        )
}

fn starts_with_sign(tree: &Tree, id: NodeId, sign: char) -> bool {
    match tree.kind(id) {
        NodeKind::UnaryExpression { operator, .. } => operator.as_str().starts_with(sign),
        NodeKind::UpdateExpression {
            operator,
            prefix: true,
            ..
        } => operator.as_str().starts_with(sign),
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LITERALS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_canonical_number(key: &str) -> bool {
    key.parse::<f64>()
        .map(|value| format_number(value) == key)
        .unwrap_or(false)
}

fn module_name(name: &str) -> String {
    if is_identifier_name(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRINTER
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print(tree: &Tree, root: NodeId) -> String {
    let mut printer = Printer::new(tree);
    printer.program(root);
    printer.out
}

struct Printer<'t> {
    tree: &'t Tree,
    out: String,
    indent: usize,
}

impl<'t> Printer<'t> {
    fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            out: String::new(),
            indent: 0,
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn program(&mut self, root: NodeId) {
        let tree = self.tree;
        match tree.kind(root) {
            NodeKind::Program { body } => {
                for stmt in body {
                    self.statement(*stmt);
                    self.out.push('\n');
                }
            }
            _ => {
                self.statement(root);
                self.out.push('\n');
            }
        }
    }

    fn block(&mut self, body: &[NodeId]) {
        if body.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.indent += 1;
        for stmt in body {
            self.newline();
            self.statement(*stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    /// `kind a = 1, b` without the terminator. Statement position puts each
    /// extra declarator on its own line; loop heads keep them inline.
    fn declaration(&mut self, kind: DeclarationKind, declarations: &[NodeId], inline: bool) {
        self.out.push_str(kind.as_str());
        self.out.push(' ');
        let multiline = !inline && declarations.len() > 1;
        if multiline {
            self.indent += 1;
        }
        for (index, declarator) in declarations.iter().enumerate() {
            if index > 0 {
                self.out.push(',');
                if multiline {
                    self.newline();
                } else {
                    self.out.push(' ');
                }
            }
            self.statement(*declarator);
        }
        if multiline {
            self.indent -= 1;
        }
    }

    /// Init of a `for` head, or the left side of `for-in`/`for-of`.
    fn loop_head(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::VariableDeclaration { kind, declarations } => {
                self.declaration(*kind, declarations, true)
            }
            _ => self.expr(id, PREC_ASSIGN),
        }
    }

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Program { .. } => self.program(id),
            NodeKind::VariableDeclaration { kind, declarations } => {
                self.declaration(*kind, declarations, false);
                self.out.push(';');
            }
            NodeKind::VariableDeclarator { id, init } => {
                self.expr(*id, 0);
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(*init, PREC_ASSIGN);
                }
            }
            NodeKind::ExpressionStatement { expression } => {
                let wrap = starts_like_declaration(tree, *expression);
                if wrap {
                    self.out.push('(');
                }
                self.expr(*expression, 0);
                if wrap {
                    self.out.push(')');
                }
                self.out.push(';');
            }
            NodeKind::ReturnStatement { argument } => {
                self.out.push_str("return");
                if let Some(argument) = argument {
                    self.out.push(' ');
                    self.expr(*argument, 0);
                }
                self.out.push(';');
            }
            NodeKind::BlockStatement { body } => self.block(body),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.out.push_str("if (");
                self.expr(*test, 0);
                self.out.push_str(") ");
                self.statement(*consequent);
                if let Some(alternate) = alternate {
                    self.out.push_str(" else ");
                    self.statement(*alternate);
                }
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.out.push_str("for (");
                if let Some(init) = init {
                    self.loop_head(*init);
                }
                self.out.push(';');
                if let Some(test) = test {
                    self.out.push(' ');
                    self.expr(*test, 0);
                }
                self.out.push(';');
                if let Some(update) = update {
                    self.out.push(' ');
                    self.expr(*update, 0);
                }
                self.out.push_str(") ");
                self.statement(*body);
            }
            NodeKind::ForInStatement { left, right, body } => {
                self.out.push_str("for (");
                self.loop_head(*left);
                self.out.push_str(" in ");
                self.expr(*right, 0);
                self.out.push_str(") ");
                self.statement(*body);
            }
            NodeKind::ForOfStatement {
                left,
                right,
                body,
                is_await,
            } => {
                self.out
                    .push_str(if *is_await { "for await (" } else { "for (" });
                self.loop_head(*left);
                self.out.push_str(" of ");
                self.expr(*right, PREC_ASSIGN);
                self.out.push_str(") ");
                self.statement(*body);
            }
            NodeKind::WhileStatement { test, body } => {
                self.out.push_str("while (");
                self.expr(*test, 0);
                self.out.push_str(") ");
                self.statement(*body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                self.out.push_str("do ");
                self.statement(*body);
                self.out.push_str(" while (");
                self.expr(*test, 0);
                self.out.push_str(");");
            }
            NodeKind::BreakStatement { label } => self.jump("break", label.as_deref()),
            NodeKind::ContinueStatement { label } => self.jump("continue", label.as_deref()),
            NodeKind::LabeledStatement { label, body } => {
                self.out.push_str(label);
                self.out.push_str(": ");
                self.statement(*body);
            }
            NodeKind::ThrowStatement { argument } => {
                self.out.push_str("throw ");
                self.expr(*argument, 0);
                self.out.push(';');
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                self.out.push_str("try ");
                self.statement(*block);
                if let Some(handler) = handler {
                    self.out.push(' ');
                    self.statement(*handler);
                }
                if let Some(finalizer) = finalizer {
                    self.out.push_str(" finally ");
                    self.statement(*finalizer);
                }
            }
            NodeKind::CatchClause { param, body } => {
                self.out.push_str("catch ");
                if let Some(param) = param {
                    self.out.push('(');
                    self.expr(*param, 0);
                    self.out.push_str(") ");
                }
                self.statement(*body);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.out.push_str("switch (");
                self.expr(*discriminant, 0);
                self.out.push_str(") ");
                self.block(cases);
            }
            NodeKind::SwitchCase { test, consequent } => {
                match test {
                    Some(test) => {
                        self.out.push_str("case ");
                        self.expr(*test, 0);
                        self.out.push(':');
                    }
                    None => self.out.push_str("default:"),
                }
                self.indent += 1;
                for stmt in consequent {
                    self.newline();
                    self.statement(*stmt);
                }
                self.indent -= 1;
            }
            NodeKind::DebuggerStatement => self.out.push_str("debugger;"),
            NodeKind::EmptyStatement => self.out.push(';'),
            NodeKind::FunctionDeclaration {
                id,
                params,
                body,
                flags,
            } => self.function(*id, params, *body, *flags),
            NodeKind::ClassDeclaration {
                id,
                super_class,
                body,
            } => self.class(*id, *super_class, body),
            NodeKind::ImportDeclaration { specifiers, source } => {
                self.import(specifiers, source)
            }
            NodeKind::ExportNamedDeclaration { declaration } => {
                self.out.push_str("export ");
                self.statement(*declaration);
            }
            NodeKind::ExportSpecifiers { specifiers, source } => {
                self.export_list(specifiers, source.as_deref())
            }
            NodeKind::ExportAllDeclaration { exported, source } => {
                self.out.push_str("export *");
                if let Some(exported) = exported {
                    self.out.push_str(" as ");
                    self.out.push_str(&module_name(exported));
                }
                self.out.push_str(" from ");
                self.out.push_str(&quote(source));
                self.out.push(';');
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                self.out.push_str("export default ");
                match tree.kind(*declaration) {
                    NodeKind::FunctionDeclaration { .. } | NodeKind::ClassDeclaration { .. } => {
                        self.statement(*declaration)
                    }
                    _ => {
                        let wrap = starts_like_declaration(tree, *declaration)
                            && !matches!(
                                tree.kind(*declaration),
                                NodeKind::FunctionExpression { .. }
                                    | NodeKind::ClassExpression { .. }
                            );
                        if wrap {
                            self.out.push('(');
                        }
                        self.expr(*declaration, PREC_ASSIGN);
                        if wrap {
                            self.out.push(')');
                        }
                        self.out.push(';');
                    }
                }
            }
            NodeKind::ClassMethod { .. }
            | NodeKind::ClassProperty { .. }
            | NodeKind::StaticBlock { .. } => self.class_member(id),
            _ => self.expr(id, 0),
        }
    }

    fn jump(&mut self, keyword: &str, label: Option<&str>) {
        self.out.push_str(keyword);
        if let Some(label) = label {
            self.out.push(' ');
            self.out.push_str(label);
        }
        self.out.push(';');
    }

    fn import(&mut self, specifiers: &[ImportSpecifier], source: &str) {
        let mut parts = Vec::new();
        let mut named = Vec::new();
        for specifier in specifiers {
            match specifier {
                ImportSpecifier::Default { local } => parts.push(local.clone()),
                ImportSpecifier::Namespace { local } => parts.push(format!("* as {}", local)),
                ImportSpecifier::Named { imported, local } if imported == local => {
                    named.push(local.clone())
                }
                ImportSpecifier::Named { imported, local } => {
                    named.push(format!("{} as {}", module_name(imported), local))
                }
            }
        }
        if !named.is_empty() {
            parts.push(format!("{{ {} }}", named.join(", ")));
        }
        self.out.push_str("import ");
        if !parts.is_empty() {
            self.out.push_str(&parts.join(", "));
            self.out.push_str(" from ");
        }
        self.out.push_str(&quote(source));
        self.out.push(';');
    }

    fn export_list(&mut self, specifiers: &[ExportSpecifier], source: Option<&str>) {
        let names: Vec<String> = specifiers
            .iter()
            .map(|specifier| {
                if specifier.local == specifier.exported {
                    module_name(&specifier.local)
                } else {
                    format!(
                        "{} as {}",
                        module_name(&specifier.local),
                        module_name(&specifier.exported)
                    )
                }
            })
            .collect();
        if names.is_empty() {
            self.out.push_str("export {}");
        } else {
            self.out.push_str(&format!("export {{ {} }}", names.join(", ")));
        }
        if let Some(source) = source {
            self.out.push_str(" from ");
            self.out.push_str(&quote(source));
        }
        self.out.push(';');
    }

    fn function(&mut self, id: Option<NodeId>, params: &[NodeId], body: NodeId, flags: FunctionFlags) {
        if flags.is_async {
            self.out.push_str("async ");
        }
        self.out.push_str("function");
        if flags.generator {
            self.out.push('*');
        }
        if let Some(id) = id {
            self.out.push(' ');
            self.expr(id, 0);
        }
        self.params(params);
        self.out.push(' ');
        self.statement(body);
    }

    fn class(&mut self, id: Option<NodeId>, super_class: Option<NodeId>, body: &[NodeId]) {
        self.out.push_str("class");
        if let Some(id) = id {
            self.out.push(' ');
            self.expr(id, 0);
        }
        if let Some(super_class) = super_class {
            self.out.push_str(" extends ");
            self.expr(super_class, PREC_CALL);
        }
        self.out.push(' ');
        self.block(body);
    }

    fn class_member(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::ClassMethod {
                kind,
                key,
                is_static,
                params,
                body,
                flags,
            } => {
                if *is_static {
                    self.out.push_str("static ");
                }
                self.method(*kind, key, params, *body, *flags);
            }
            NodeKind::ClassProperty {
                key,
                value,
                is_static,
                accessor,
            } => {
                if *is_static {
                    self.out.push_str("static ");
                }
                if *accessor {
                    self.out.push_str("accessor ");
                }
                self.property_key(key);
                if let Some(value) = value {
                    self.out.push_str(" = ");
                    self.expr(*value, PREC_ASSIGN);
                }
                self.out.push(';');
            }
            NodeKind::StaticBlock { body } => {
                self.out.push_str("static ");
                self.block(body);
            }
            _ => self.statement(id),
        }
    }

    fn method(
        &mut self,
        kind: MethodKind,
        key: &PropertyKey,
        params: &[NodeId],
        body: NodeId,
        flags: FunctionFlags,
    ) {
        if flags.is_async {
            self.out.push_str("async ");
        }
        if flags.generator {
            self.out.push('*');
        }
        match kind {
            MethodKind::Get => self.out.push_str("get "),
            MethodKind::Set => self.out.push_str("set "),
            MethodKind::Method | MethodKind::Constructor => {}
        }
        self.property_key(key);
        self.params(params);
        self.out.push(' ');
        self.statement(body);
    }

    fn params(&mut self, params: &[NodeId]) {
        self.out.push('(');
        self.list(params);
        self.out.push(')');
    }

    fn list(&mut self, items: &[NodeId]) {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.expr(*item, PREC_ASSIGN);
        }
    }

    fn property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Static(name) if is_identifier_name(name) || is_canonical_number(name) => {
                self.out.push_str(name)
            }
            PropertyKey::Static(name) => self.out.push_str(&quote(name)),
            PropertyKey::Computed(expr) => {
                self.out.push('[');
                self.expr(*expr, PREC_ASSIGN);
                self.out.push(']');
            }
            PropertyKey::Private(name) => {
                self.out.push('#');
                self.out.push_str(name);
            }
        }
    }

    fn expr(&mut self, id: NodeId, min: u8) {
        let wrap = precedence(self.tree, id) < min;
        if wrap {
            self.out.push('(');
        }
        self.expr_inner(id);
        if wrap {
            self.out.push(')');
        }
    }

    /// Object, callee or tag position. A finished optional chain keeps its
    /// parentheses so `(a?.b).c` does not become `a?.b.c`.
    fn head(&mut self, id: NodeId, min: u8) {
        if let NodeKind::ChainExpression { .. } = self.tree.kind(id) {
            self.out.push('(');
            self.expr(id, 0);
            self.out.push(')');
        } else {
            self.expr(id, min);
        }
    }

    /// Operand of a logical expression; `??` never mixes with `||`/`&&`
    /// without parentheses.
    fn logical_operand(&mut self, operand: NodeId, min: u8, parent: &str) {
        let mixes = match self.tree.kind(operand) {
            NodeKind::LogicalExpression { operator, .. } => {
                (parent == "??") != (operator.as_str() == "??")
            }
            _ => false,
        };
        if mixes {
            self.out.push('(');
            self.expr(operand, 0);
            self.out.push(')');
        } else {
            self.expr(operand, min);
        }
    }

    fn expr_inner(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Identifier { name } | NodeKind::BindingIdentifier { name } => {
                self.out.push_str(name)
            }
            NodeKind::NumericLiteral { value } => self.out.push_str(&format_number(*value)),
            NodeKind::StringLiteral { value } => self.out.push_str(&quote(value)),
            NodeKind::BooleanLiteral { value } => {
                self.out.push_str(if *value { "true" } else { "false" })
            }
            NodeKind::NullLiteral => self.out.push_str("null"),
            NodeKind::RegExpLiteral { raw } | NodeKind::BigIntLiteral { raw } => {
                self.out.push_str(raw)
            }
            NodeKind::ThisExpression => self.out.push_str("this"),
            NodeKind::Super => self.out.push_str("super"),
            NodeKind::MetaProperty { meta, property } => {
                self.out.push_str(meta);
                self.out.push('.');
                self.out.push_str(property);
            }
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => {
                self.out.push('`');
                for (index, quasi) in quasis.iter().enumerate() {
                    self.out.push_str(quasi);
                    if let Some(expr) = expressions.get(index) {
                        self.out.push_str("${");
                        self.expr(*expr, 0);
                        self.out.push('}');
                    }
                }
                self.out.push('`');
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                self.head(*tag, PREC_CALL);
                self.expr(*quasi, 0);
            }
            NodeKind::ArrayExpression { elements } => self.array(elements, None),
            NodeKind::ArrayPattern { elements, rest } => self.array(elements, *rest),
            NodeKind::ObjectExpression { properties } => {
                let multiline = properties
                    .iter()
                    .any(|member| matches!(tree.kind(*member), NodeKind::ObjectMethod { .. }));
                self.object(properties, None, multiline)
            }
            NodeKind::ObjectPattern { properties, rest } => self.object(properties, *rest, false),
            NodeKind::ObjectProperty {
                key,
                value,
                shorthand,
            } => {
                let is_shorthand = *shorthand
                    && matches!((key, tree.kind(*value)),
                        (PropertyKey::Static(key), NodeKind::Identifier { name }) if key == name);
                if is_shorthand {
                    self.expr(*value, 0);
                } else {
                    self.property_key(key);
                    self.out.push_str(": ");
                    self.expr(*value, PREC_ASSIGN);
                }
            }
            NodeKind::BindingProperty {
                key,
                value,
                shorthand,
            } => {
                let binds_key = |node: NodeId| match (key, tree.kind(node)) {
                    (PropertyKey::Static(key), NodeKind::BindingIdentifier { name })
                    | (PropertyKey::Static(key), NodeKind::Identifier { name }) => key == name,
                    _ => false,
                };
                let is_shorthand = *shorthand
                    && match tree.kind(*value) {
                        NodeKind::AssignmentPattern { left, .. } => binds_key(*left),
                        _ => binds_key(*value),
                    };
                if !is_shorthand {
                    self.property_key(key);
                    self.out.push_str(": ");
                }
                self.expr(*value, PREC_ASSIGN);
            }
            NodeKind::ObjectMethod {
                kind,
                key,
                params,
                body,
                flags,
            } => self.method(*kind, key, params, *body, *flags),
            NodeKind::SpreadElement { argument } | NodeKind::RestElement { argument } => {
                self.out.push_str("...");
                self.expr(*argument, PREC_ASSIGN);
            }
            NodeKind::CallExpression {
                callee,
                arguments,
                optional,
            } => {
                self.head(*callee, PREC_CALL);
                if *optional {
                    self.out.push_str("?.");
                }
                self.params(arguments);
            }
            NodeKind::NewExpression { callee, arguments } => {
                self.out.push_str("new ");
                self.head(*callee, PREC_MEMBER);
                self.params(arguments);
            }
            NodeKind::ImportExpression { source, options } => {
                self.out.push_str("import(");
                self.expr(*source, PREC_ASSIGN);
                if let Some(options) = options {
                    self.out.push_str(", ");
                    self.expr(*options, PREC_ASSIGN);
                }
                self.out.push(')');
            }
            NodeKind::MemberExpression {
                object,
                property,
                optional,
            } => {
                if let NodeKind::NumericLiteral { .. } = tree.kind(*object) {
                    self.out.push('(');
                    self.expr(*object, 0);
                    self.out.push(')');
                } else {
                    self.head(*object, PREC_CALL);
                }
                if *optional {
                    self.out.push_str("?.");
                }
                match property {
                    MemberProperty::Static(name) if is_identifier_name(name) => {
                        if !*optional {
                            self.out.push('.');
                        }
                        self.out.push_str(name);
                    }
                    MemberProperty::Static(name) => {
                        self.out.push('[');
                        self.out.push_str(&quote(name));
                        self.out.push(']');
                    }
                    MemberProperty::Computed(expr) => {
                        self.out.push('[');
                        self.expr(*expr, 0);
                        self.out.push(']');
                    }
                    MemberProperty::Private(name) => {
                        if !*optional {
                            self.out.push('.');
                        }
                        self.out.push('#');
                        self.out.push_str(name);
                    }
                }
            }
            NodeKind::ChainExpression { expression } => self.expr_inner(*expression),
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression,
                is_async,
            } => {
                if *is_async {
                    self.out.push_str("async ");
                }
                match params.as_slice() {
                    [single] if matches!(tree.kind(*single), NodeKind::BindingIdentifier { .. }) => {
                        self.expr(*single, 0)
                    }
                    _ => self.params(params),
                }
                self.out.push_str(" => ");
                if !*expression {
                    self.statement(*body);
                } else if starts_with_brace(tree, *body) {
                    self.out.push('(');
                    self.expr(*body, 0);
                    self.out.push(')');
                } else {
                    self.expr(*body, PREC_ASSIGN);
                }
            }
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                flags,
            } => self.function(*id, params, *body, *flags),
            NodeKind::ClassExpression {
                id,
                super_class,
                body,
            } => self.class(*id, *super_class, body),
            NodeKind::UnaryExpression { operator, argument } => {
                let op = operator.as_str();
                self.out.push_str(op);
                let needs_space = op.chars().all(|c| c.is_ascii_alphabetic())
                    || op
                        .chars()
                        .next()
                        .is_some_and(|sign| starts_with_sign(tree, *argument, sign));
                if needs_space {
                    self.out.push(' ');
                }
                self.expr(*argument, PREC_UNARY);
            }
            NodeKind::AwaitExpression { argument } => {
                self.out.push_str("await ");
                self.expr(*argument, PREC_UNARY);
            }
            NodeKind::YieldExpression { argument, delegate } => {
                self.out.push_str(if *delegate { "yield*" } else { "yield" });
                if let Some(argument) = argument {
                    self.out.push(' ');
                    self.expr(*argument, PREC_ASSIGN);
                }
            }
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => {
                if *prefix {
                    self.out.push_str(operator.as_str());
                    self.expr(*argument, PREC_UNARY);
                } else {
                    self.expr(*argument, PREC_POSTFIX);
                    self.out.push_str(operator.as_str());
                }
            }
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let op = operator.as_str();
                let prec = binary_precedence(op);
                let (left_min, right_min) = if op == "**" {
                    (PREC_POSTFIX, prec)
                } else {
                    (prec, prec + 1)
                };
                self.expr(*left, left_min);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.expr(*right, right_min);
            }
            NodeKind::PrivateInExpression { name, right } => {
                self.out.push('#');
                self.out.push_str(name);
                self.out.push_str(" in ");
                self.expr(*right, PREC_RELATIONAL + 1);
            }
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let op = operator.as_str();
                let prec = precedence(tree, id);
                self.logical_operand(*left, prec, op);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.logical_operand(*right, prec + 1, op);
            }
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                self.expr(*left, PREC_MEMBER);
                self.out.push(' ');
                self.out.push_str(operator.as_str());
                self.out.push(' ');
                self.expr(*right, PREC_ASSIGN);
            }
            NodeKind::AssignmentPattern { left, right } => {
                self.expr(*left, 0);
                self.out.push_str(" = ");
                self.expr(*right, PREC_ASSIGN);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                self.expr(*test, PREC_NULLISH);
                self.out.push_str(" ? ");
                self.expr(*consequent, PREC_ASSIGN);
                self.out.push_str(" : ");
                self.expr(*alternate, PREC_ASSIGN);
            }
            NodeKind::SequenceExpression { expressions } => self.list(expressions),
            NodeKind::JSXElement {
                name,
                attributes,
                children,
                self_closing,
            } => {
                self.out.push('<');
                self.out.push_str(name);
                for attribute in attributes {
                    self.out.push(' ');
                    self.expr_inner(*attribute);
                }
                if *self_closing {
                    self.out.push_str(" />");
                } else {
                    self.out.push('>');
                    self.jsx_children(children);
                    self.out.push_str("</");
                    self.out.push_str(name);
                    self.out.push('>');
                }
            }
            NodeKind::JSXFragment { children } => {
                self.out.push_str("<>");
                self.jsx_children(children);
                self.out.push_str("</>");
            }
            NodeKind::JSXAttribute { name, value } => {
                self.out.push_str(name);
                if let Some(value) = value {
                    self.out.push('=');
                    self.expr_inner(*value);
                }
            }
            NodeKind::JSXSpreadAttribute { argument } => {
                self.out.push_str("{...");
                self.expr(*argument, PREC_ASSIGN);
                self.out.push('}');
            }
            NodeKind::JSXExpressionContainer { expression } => {
                self.out.push('{');
                if let Some(expression) = expression {
                    self.expr(*expression, 0);
                }
                self.out.push('}');
            }
            NodeKind::JSXSpreadChild { expression } => {
                self.out.push_str("{...");
                self.expr(*expression, PREC_ASSIGN);
                self.out.push('}');
            }
            NodeKind::JSXText { raw } => self.out.push_str(raw),
            _ => self.statement(id),
        }
    }

    fn jsx_children(&mut self, children: &[NodeId]) {
        for child in children {
            self.expr_inner(*child);
        }
    }

    fn array(&mut self, elements: &[Option<NodeId>], rest: Option<NodeId>) {
        self.out.push('[');
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            if let Some(element) = element {
                self.expr(*element, PREC_ASSIGN);
            }
        }
        match rest {
            Some(rest) => {
                if !elements.is_empty() {
                    self.out.push_str(", ");
                }
                self.expr(rest, PREC_ASSIGN);
            }
            None => {
                if let Some(None) = elements.last() {
                    self.out.push(',');
                }
            }
        }
        self.out.push(']');
    }

    fn object(&mut self, members: &[NodeId], rest: Option<NodeId>, multiline: bool) {
        let all: Vec<NodeId> = members.iter().copied().chain(rest).collect();
        if all.is_empty() {
            self.out.push_str("{}");
            return;
        }
        if multiline {
            self.out.push('{');
            self.indent += 1;
            for (index, member) in all.iter().enumerate() {
                if index > 0 {
                    self.out.push(',');
                }
                self.newline();
                self.expr(*member, PREC_ASSIGN);
            }
            self.indent -= 1;
            self.newline();
            self.out.push('}');
        } else {
            self.out.push_str("{ ");
            self.list(&all);
            self.out.push_str(" }");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_module;
    use pretty_assertions::assert_eq;

    fn reprint(source: &str) -> String {
        let module = parse_module(source, false).unwrap();
        print(&module.tree, module.root())
    }

    #[test]
    fn parenthesizes_by_precedence() {
        assert_eq!(reprint("(a + b) * c;"), "(a + b) * c;\n");
        assert_eq!(reprint("a - (b - c);"), "a - (b - c);\n");
        assert_eq!(reprint("a - b - c;"), "a - b - c;\n");
        assert_eq!(reprint("(-a) ** b;"), "(-a) ** b;\n");
        assert_eq!(reprint("(a ?? b) || c;"), "(a ?? b) || c;\n");
        assert_eq!(reprint("x = a ? b : (c, d);"), "x = a ? b : (c, d);\n");
        assert_eq!(reprint("(a, b);"), "a, b;\n");
        assert_eq!(reprint("x = -(-a);"), "x = - -a;\n");
        assert_eq!(reprint("new Foo(a).b;"), "new Foo(a).b;\n");
        assert_eq!(reprint("(f || g)();"), "(f || g)();\n");
        assert_eq!(reprint("async function f() { (await a).b; }"), "async function f() {\n  (await a).b;\n}\n");
    }

    #[test]
    fn prints_functions_and_blocks() {
        assert_eq!(
            reprint("function f(a, b) { if (a) { return b; } else return; }"),
            "function f(a, b) {\n  if (a) {\n    return b;\n  } else return;\n}\n"
        );
        assert_eq!(reprint("const f = () => ({ a: 1 });"), "const f = () => ({ a: 1 });\n");
        assert_eq!(reprint("const g = (x) => x * 2;"), "const g = x => x * 2;\n");
        assert_eq!(
            reprint("(() => { return 1; })();"),
            "(() => {\n  return 1;\n})();\n"
        );
        assert_eq!(reprint("const h = async (x) => x;"), "const h = async x => x;\n");
        assert_eq!(
            reprint("async function* gen(...rest) { yield* rest; yield; }"),
            "async function* gen(...rest) {\n  yield* rest;\n  yield;\n}\n"
        );
    }

    #[test]
    fn prints_objects_and_patterns() {
        assert_eq!(
            reprint("const o = { get a() { return 1; }, b, \"c-d\": 2, [k]: 3 };"),
            "const o = {\n  get a() {\n    return 1;\n  },\n  b,\n  \"c-d\": 2,\n  [k]: 3\n};\n"
        );
        assert_eq!(reprint("let { a, b: c = 1, ...rest } = o;"), "let { a, b: c = 1, ...rest } = o;\n");
        assert_eq!(reprint("let { a = 1 } = o;"), "let { a = 1 } = o;\n");
        assert_eq!(reprint("let [, x, ...y] = o;"), "let [, x, ...y] = o;\n");
        assert_eq!(reprint("[, a, ,];"), "[, a, ,];\n");
        assert_eq!(reprint("({});"), "({});\n");
        assert_eq!(reprint("({ a, b: c } = o);"), "({ a, b: c } = o);\n");
    }

    #[test]
    fn prints_literals() {
        assert_eq!(reprint("f(\"a\\\"b\", 'c', 1.5, 10, true, null);"), "f(\"a\\\"b\", \"c\", 1.5, 10, true, null);\n");
        assert_eq!(reprint("`a${b}c`;"), "`a${b}c`;\n");
        assert_eq!(reprint("/a+b/gi.test(s);"), "/a+b/gi.test(s);\n");
        assert_eq!(reprint("x = 10n;"), "x = 10n;\n");
        assert_eq!(reprint("tag`a${b}`;"), "tag`a${b}`;\n");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.25), "0.25");
    }

    #[test]
    fn prints_imports_and_multi_declarators() {
        assert_eq!(
            reprint("import a, { b, c as d } from 'm';\nimport * as ns from \"n\";\nexport const x = 1, y = 2;"),
            "import a, { b, c as d } from \"m\";\nimport * as ns from \"n\";\nexport const x = 1,\n  y = 2;\n"
        );
        assert_eq!(
            reprint("export { a as b, c };\nexport { d } from 'm';\nexport * as ns from 'n';\nexport default class {}"),
            "export { a as b, c };\nexport { d } from \"m\";\nexport * as ns from \"n\";\nexport default class {}\n"
        );
    }

    #[test]
    fn prints_loops_and_control_flow() {
        assert_eq!(
            reprint("for (let i = 0, j = 1; i < 3; i++) {}"),
            "for (let i = 0, j = 1; i < 3; i++) {}\n"
        );
        assert_eq!(reprint("for (;;) break;"), "for (;;) break;\n");
        assert_eq!(reprint("for (const k in o) f(k);"), "for (const k in o) f(k);\n");
        assert_eq!(reprint("for (x of xs) f(x);"), "for (x of xs) f(x);\n");
        assert_eq!(reprint("while (a) a--;"), "while (a) a--;\n");
        assert_eq!(reprint("do { a++; } while (a < 3);"), "do {\n  a++;\n} while (a < 3);\n");
        assert_eq!(
            reprint("outer: for (;;) { continue outer; }"),
            "outer: for (;;) {\n  continue outer;\n}\n"
        );
        assert_eq!(
            reprint("try { f(); } catch (e) { throw e; } finally { g(); }"),
            "try {\n  f();\n} catch (e) {\n  throw e;\n} finally {\n  g();\n}\n"
        );
        assert_eq!(reprint("try {} catch {}"), "try {} catch {}\n");
        assert_eq!(
            reprint("switch (x) { case 1: f(); break; default: g(); }"),
            "switch (x) {\n  case 1:\n    f();\n    break;\n  default:\n    g();\n}\n"
        );
    }

    #[test]
    fn prints_classes() {
        assert_eq!(
            reprint("class A extends B { static #n = 1; x; constructor(a) { super(a); } get v() { return this.#n; } static { init(); } async *m() {} }"),
            "class A extends B {\n  static #n = 1;\n  x;\n  constructor(a) {\n    super(a);\n  }\n  get v() {\n    return this.#n;\n  }\n  static {\n    init();\n  }\n  async *m() {}\n}\n"
        );
        assert_eq!(reprint("(class {});"), "(class {});\n");
    }

    #[test]
    fn optional_chains_keep_their_boundary() {
        assert_eq!(reprint("a?.b.c;"), "a?.b.c;\n");
        assert_eq!(reprint("a?.[k]?.(x);"), "a?.[k]?.(x);\n");
        assert_eq!(reprint("(a?.b).c;"), "(a?.b).c;\n");
    }

    #[test]
    fn static_member_names_that_are_not_identifiers_use_brackets() {
        let mut tree = Tree::default();
        let object = tree.identifier("p");
        let member = tree.member_static(object, "a-b");
        assert_eq!(print(&tree, member), "p[\"a-b\"]\n");
    }

    #[test]
    fn prints_jsx() {
        assert_eq!(
            reprint("const v = <div class=\"a\" {...rest}>hi {name}<br /></div>;"),
            "const v = <div class=\"a\" {...rest}>hi {name}<br /></div>;\n"
        );
        assert_eq!(reprint("const f = <>{a}</>;"), "const f = <>{a}</>;\n");
    }
}
