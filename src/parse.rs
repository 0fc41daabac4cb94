//! Parse Module
//!
//! Parses a source module with oxc and lowers it into the arena IR.
//! TypeScript expression wrappers (`as`, `!`, `satisfies`, `<T>x`) are erased
//! and type-only or ambient declarations are dropped. TypeScript constructs
//! that carry runtime semantics of their own (enums, namespaces, parameter
//! properties, decorators) are rejected with `UnsupportedSyntax` instead of
//! being silently lost.

use oxc_allocator::Allocator;
use oxc_ast::ast as js;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use crate::ast::{
    DeclarationKind, ExportSpecifier, FunctionFlags, ImportSpecifier, MemberProperty, MethodKind,
    Module, NodeId, NodeKind, PropertyKey, Tree,
};
use crate::validate::TransformError;

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Module source type. `<T>x` assertions and JSX cannot share a grammar, so
/// TypeScript only turns JSX on for `.tsx` inputs.
pub fn source_type(typescript: bool, jsx: bool) -> SourceType {
    SourceType::default()
        .with_module(true)
        .with_typescript(typescript)
        .with_jsx(jsx)
}

pub fn parse_program<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    source_type: SourceType,
) -> Result<js::Program<'a>, TransformError> {
    let ret = Parser::new(allocator, source, source_type).parse();
    if let Some(error) = ret.errors.first() {
        let span = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| Span::new(label.offset() as u32, (label.offset() + label.len()) as u32))
            .unwrap_or_default();
        return Err(TransformError::Parse {
            message: error.to_string(),
            span,
        });
    }
    Ok(ret.program)
}

/// Lowers a parsed program and runs scope analysis over the result.
pub fn lower_program(program: &js::Program<'_>) -> Result<Module, TransformError> {
    let mut lowering = Lowering {
        tree: Tree::new(),
        source: program.source_text,
    };
    let mut body = lowering.lower_directives(&program.directives);
    body.extend(lowering.lower_statements(&program.body)?);
    let root = lowering
        .tree
        .alloc(NodeKind::Program { body }, program.span);
    Ok(Module::new(lowering.tree, root))
}

pub fn parse_module(source: &str, typescript: bool) -> Result<Module, TransformError> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, source, source_type(typescript, !typescript))?;
    lower_program(&program)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LABEL SCAN
// ═══════════════════════════════════════════════════════════════════════════════

struct CalleeScanner<'p> {
    is_label: &'p dyn Fn(&str) -> bool,
    found: bool,
}

impl<'a> Visit<'a> for CalleeScanner<'_> {
    fn visit_call_expression(&mut self, call: &js::CallExpression<'a>) {
        if self.found {
            return;
        }
        if let js::Expression::Identifier(callee) = &call.callee {
            if (self.is_label)(callee.name.as_str()) {
                self.found = true;
                return;
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// True when any call in the program has a bare callee accepted by `is_label`.
pub fn calls_any(program: &js::Program<'_>, is_label: &dyn Fn(&str) -> bool) -> bool {
    let mut scanner = CalleeScanner {
        is_label,
        found: false,
    };
    scanner.visit_program(program);
    scanner.found
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOWERING
// ═══════════════════════════════════════════════════════════════════════════════

fn unsupported(found: &str, span: Span) -> TransformError {
    TransformError::UnsupportedSyntax {
        found: found.to_string(),
        span,
    }
}

struct Lowering<'s> {
    tree: Tree,
    /// Regex, bigint and JSX text are carried over as written.
    source: &'s str,
}

/// Pieces shared by every function-like node.
struct FunctionParts {
    params: Vec<NodeId>,
    body: NodeId,
    flags: FunctionFlags,
}

/// Pieces shared by class declarations and expressions.
struct ClassParts {
    id: Option<NodeId>,
    super_class: Option<NodeId>,
    body: Vec<NodeId>,
}

impl<'s> Lowering<'s> {
    fn raw(&self, span: Span) -> String {
        span.source_text(self.source).to_string()
    }

    fn lower_directives(&mut self, directives: &[js::Directive<'_>]) -> Vec<NodeId> {
        directives
            .iter()
            .map(|directive| {
                let expression = self.tree.alloc(
                    NodeKind::StringLiteral {
                        value: directive.directive.to_string(),
                    },
                    directive.expression.span,
                );
                self.tree
                    .alloc(NodeKind::ExpressionStatement { expression }, directive.span)
            })
            .collect()
    }

    fn lower_statements(
        &mut self,
        statements: &[js::Statement<'_>],
    ) -> Result<Vec<NodeId>, TransformError> {
        let mut out = Vec::with_capacity(statements.len());
        for stmt in statements {
            if let Some(id) = self.lower_statement(stmt)? {
                out.push(id);
            }
        }
        Ok(out)
    }

    /// `None` for statements that only exist at the type level.
    fn lower_statement(
        &mut self,
        stmt: &js::Statement<'_>,
    ) -> Result<Option<NodeId>, TransformError> {
        if let Some(decl) = stmt.as_declaration() {
            return self.lower_declaration(decl);
        }
        let kind = match stmt {
            js::Statement::ExpressionStatement(expr_stmt) => NodeKind::ExpressionStatement {
                expression: self.lower_expression(&expr_stmt.expression)?,
            },
            js::Statement::ReturnStatement(ret) => NodeKind::ReturnStatement {
                argument: self.lower_optional(ret.argument.as_ref())?,
            },
            js::Statement::BlockStatement(block) => return self.lower_block(block).map(Some),
            js::Statement::IfStatement(if_stmt) => {
                let test = self.lower_expression(&if_stmt.test)?;
                let consequent = self.lower_nested_statement(&if_stmt.consequent)?;
                let alternate = match &if_stmt.alternate {
                    Some(alternate) => Some(self.lower_nested_statement(alternate)?),
                    None => None,
                };
                NodeKind::IfStatement {
                    test,
                    consequent,
                    alternate,
                }
            }
            js::Statement::ForStatement(for_stmt) => {
                let init = match &for_stmt.init {
                    Some(js::ForStatementInit::VariableDeclaration(decl)) => {
                        Some(self.lower_variable_declaration(decl)?)
                    }
                    Some(other) => match other.as_expression() {
                        Some(expr) => Some(self.lower_expression(expr)?),
                        None => return Err(unsupported("for initializer", other.span())),
                    },
                    None => None,
                };
                NodeKind::ForStatement {
                    init,
                    test: self.lower_optional(for_stmt.test.as_ref())?,
                    update: self.lower_optional(for_stmt.update.as_ref())?,
                    body: self.lower_nested_statement(&for_stmt.body)?,
                }
            }
            js::Statement::ForInStatement(for_in) => NodeKind::ForInStatement {
                left: self.lower_for_left(&for_in.left)?,
                right: self.lower_expression(&for_in.right)?,
                body: self.lower_nested_statement(&for_in.body)?,
            },
            js::Statement::ForOfStatement(for_of) => NodeKind::ForOfStatement {
                left: self.lower_for_left(&for_of.left)?,
                right: self.lower_expression(&for_of.right)?,
                body: self.lower_nested_statement(&for_of.body)?,
                is_await: for_of.r#await,
            },
            js::Statement::WhileStatement(while_stmt) => NodeKind::WhileStatement {
                test: self.lower_expression(&while_stmt.test)?,
                body: self.lower_nested_statement(&while_stmt.body)?,
            },
            js::Statement::DoWhileStatement(do_while) => NodeKind::DoWhileStatement {
                body: self.lower_nested_statement(&do_while.body)?,
                test: self.lower_expression(&do_while.test)?,
            },
            js::Statement::BreakStatement(stmt) => NodeKind::BreakStatement {
                label: stmt.label.as_ref().map(|label| label.name.to_string()),
            },
            js::Statement::ContinueStatement(stmt) => NodeKind::ContinueStatement {
                label: stmt.label.as_ref().map(|label| label.name.to_string()),
            },
            js::Statement::LabeledStatement(labeled) => NodeKind::LabeledStatement {
                label: labeled.label.name.to_string(),
                body: self.lower_nested_statement(&labeled.body)?,
            },
            js::Statement::ThrowStatement(throw) => NodeKind::ThrowStatement {
                argument: self.lower_expression(&throw.argument)?,
            },
            js::Statement::TryStatement(try_stmt) => {
                let block = self.lower_block(&try_stmt.block)?;
                let handler = match &try_stmt.handler {
                    Some(handler) => {
                        let param = match &handler.param {
                            Some(param) => Some(self.lower_binding(&param.pattern)?),
                            None => None,
                        };
                        let body = self.lower_block(&handler.body)?;
                        Some(
                            self.tree
                                .alloc(NodeKind::CatchClause { param, body }, handler.span),
                        )
                    }
                    None => None,
                };
                let finalizer = match &try_stmt.finalizer {
                    Some(finalizer) => Some(self.lower_block(finalizer)?),
                    None => None,
                };
                NodeKind::TryStatement {
                    block,
                    handler,
                    finalizer,
                }
            }
            js::Statement::SwitchStatement(switch) => {
                let discriminant = self.lower_expression(&switch.discriminant)?;
                let mut cases = Vec::with_capacity(switch.cases.len());
                for case in &switch.cases {
                    let test = self.lower_optional(case.test.as_ref())?;
                    let consequent = self.lower_statements(&case.consequent)?;
                    cases.push(
                        self.tree
                            .alloc(NodeKind::SwitchCase { test, consequent }, case.span),
                    );
                }
                NodeKind::SwitchStatement {
                    discriminant,
                    cases,
                }
            }
            js::Statement::DebuggerStatement(_) => NodeKind::DebuggerStatement,
            js::Statement::EmptyStatement(_) => NodeKind::EmptyStatement,
            js::Statement::ImportDeclaration(decl) => match self.lower_import(decl)? {
                Some(kind) => kind,
                None => return Ok(None),
            },
            js::Statement::ExportNamedDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    return Ok(None);
                }
                if let Some(declaration) = &decl.declaration {
                    return Ok(self.lower_declaration(declaration)?.map(|declaration| {
                        self.tree
                            .alloc(NodeKind::ExportNamedDeclaration { declaration }, decl.span)
                    }));
                }
                let specifiers: Vec<ExportSpecifier> = decl
                    .specifiers
                    .iter()
                    .filter(|specifier| !specifier.export_kind.is_type())
                    .map(|specifier| ExportSpecifier {
                        local: module_export_name(&specifier.local),
                        exported: module_export_name(&specifier.exported),
                    })
                    .collect();
                if specifiers.is_empty() && !decl.specifiers.is_empty() {
                    return Ok(None);
                }
                NodeKind::ExportSpecifiers {
                    specifiers,
                    source: decl.source.as_ref().map(|source| source.value.to_string()),
                }
            }
            js::Statement::ExportAllDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    return Ok(None);
                }
                NodeKind::ExportAllDeclaration {
                    exported: decl.exported.as_ref().map(module_export_name),
                    source: decl.source.value.to_string(),
                }
            }
            js::Statement::ExportDefaultDeclaration(decl) => {
                let inner = match &decl.declaration {
                    js::ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        if func.is_typescript_syntax() {
                            return Ok(None);
                        }
                        self.lower_function_declaration(func)?
                    }
                    js::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        let parts = self.lower_class(class)?;
                        self.tree.alloc(
                            NodeKind::ClassDeclaration {
                                id: parts.id,
                                super_class: parts.super_class,
                                body: parts.body,
                            },
                            class.span,
                        )
                    }
                    js::ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                        return Ok(None)
                    }
                    other => match other.as_expression() {
                        Some(expr) => self.lower_expression(expr)?,
                        None => return Err(unsupported("default export", decl.span)),
                    },
                };
                NodeKind::ExportDefaultDeclaration { declaration: inner }
            }
            js::Statement::TSNamespaceExportDeclaration(_) => return Ok(None),
            other => return Err(unsupported("statement", other.span())),
        };
        Ok(Some(self.tree.alloc(kind, stmt.span())))
    }

    /// `None` for ambient and type-only declarations.
    fn lower_declaration(
        &mut self,
        decl: &js::Declaration<'_>,
    ) -> Result<Option<NodeId>, TransformError> {
        match decl {
            js::Declaration::VariableDeclaration(var) => {
                if var.declare {
                    return Ok(None);
                }
                self.lower_variable_declaration(var).map(Some)
            }
            js::Declaration::FunctionDeclaration(func) => {
                if func.is_typescript_syntax() {
                    return Ok(None);
                }
                self.lower_function_declaration(func).map(Some)
            }
            js::Declaration::ClassDeclaration(class) => {
                if class.declare {
                    return Ok(None);
                }
                let parts = self.lower_class(class)?;
                Ok(Some(self.tree.alloc(
                    NodeKind::ClassDeclaration {
                        id: parts.id,
                        super_class: parts.super_class,
                        body: parts.body,
                    },
                    class.span,
                )))
            }
            js::Declaration::TSTypeAliasDeclaration(_)
            | js::Declaration::TSInterfaceDeclaration(_)
            | js::Declaration::TSGlobalDeclaration(_) => Ok(None),
            js::Declaration::TSEnumDeclaration(decl) if decl.declare => Ok(None),
            js::Declaration::TSModuleDeclaration(decl) if decl.declare => Ok(None),
            js::Declaration::TSEnumDeclaration(decl) => Err(unsupported("enum", decl.span)),
            js::Declaration::TSModuleDeclaration(decl) => {
                Err(unsupported("namespace", decl.span))
            }
            js::Declaration::TSImportEqualsDeclaration(decl) => {
                Err(unsupported("import equals declaration", decl.span))
            }
        }
    }

    fn lower_nested_statement(&mut self, stmt: &js::Statement<'_>) -> Result<NodeId, TransformError> {
        match self.lower_statement(stmt)? {
            Some(id) => Ok(id),
            None => Ok(self.tree.alloc(NodeKind::EmptyStatement, stmt.span())),
        }
    }

    fn lower_block(&mut self, block: &js::BlockStatement<'_>) -> Result<NodeId, TransformError> {
        let body = self.lower_statements(&block.body)?;
        Ok(self.tree.alloc(NodeKind::BlockStatement { body }, block.span))
    }

    fn lower_optional(
        &mut self,
        expr: Option<&js::Expression<'_>>,
    ) -> Result<Option<NodeId>, TransformError> {
        match expr {
            Some(expr) => Ok(Some(self.lower_expression(expr)?)),
            None => Ok(None),
        }
    }

    fn lower_for_left(&mut self, left: &js::ForStatementLeft<'_>) -> Result<NodeId, TransformError> {
        match left {
            js::ForStatementLeft::VariableDeclaration(decl) => self.lower_variable_declaration(decl),
            other => match other.as_assignment_target() {
                Some(target) => self.lower_assignment_target(target),
                None => Err(unsupported("for-in/of target", other.span())),
            },
        }
    }

    fn lower_import(
        &mut self,
        decl: &js::ImportDeclaration<'_>,
    ) -> Result<Option<NodeKind>, TransformError> {
        if decl.import_kind.is_type() {
            return Ok(None);
        }
        if decl.phase.is_some() {
            return Err(unsupported("import phase", decl.span));
        }
        let mut specifiers = Vec::new();
        if let Some(list) = &decl.specifiers {
            for specifier in list {
                specifiers.push(match specifier {
                    js::ImportDeclarationSpecifier::ImportSpecifier(specifier) => {
                        if specifier.import_kind.is_type() {
                            continue;
                        }
                        ImportSpecifier::Named {
                            imported: module_export_name(&specifier.imported),
                            local: specifier.local.name.to_string(),
                        }
                    }
                    js::ImportDeclarationSpecifier::ImportDefaultSpecifier(specifier) => {
                        ImportSpecifier::Default {
                            local: specifier.local.name.to_string(),
                        }
                    }
                    js::ImportDeclarationSpecifier::ImportNamespaceSpecifier(specifier) => {
                        ImportSpecifier::Namespace {
                            local: specifier.local.name.to_string(),
                        }
                    }
                });
            }
            // only type specifiers: the import is elided like `import type`
            if specifiers.is_empty() && !list.is_empty() {
                return Ok(None);
            }
        }
        Ok(Some(NodeKind::ImportDeclaration {
            specifiers,
            source: decl.source.value.to_string(),
        }))
    }

    fn lower_variable_declaration(
        &mut self,
        decl: &js::VariableDeclaration<'_>,
    ) -> Result<NodeId, TransformError> {
        let kind = match decl.kind {
            js::VariableDeclarationKind::Var => DeclarationKind::Var,
            js::VariableDeclarationKind::Let => DeclarationKind::Let,
            js::VariableDeclarationKind::Const => DeclarationKind::Const,
            _ => return Err(unsupported("using declaration", decl.span)),
        };
        let mut declarations = Vec::with_capacity(decl.declarations.len());
        for declarator in &decl.declarations {
            let id = self.lower_binding(&declarator.id)?;
            let init = self.lower_optional(declarator.init.as_ref())?;
            declarations.push(
                self.tree
                    .alloc(NodeKind::VariableDeclarator { id, init }, declarator.span),
            );
        }
        Ok(self.tree.alloc(
            NodeKind::VariableDeclaration { kind, declarations },
            decl.span,
        ))
    }

    fn lower_function_declaration(
        &mut self,
        func: &js::Function<'_>,
    ) -> Result<NodeId, TransformError> {
        let id = self.lower_function_name(func);
        let parts = self.lower_function_parts(func)?;
        Ok(self.tree.alloc(
            NodeKind::FunctionDeclaration {
                id,
                params: parts.params,
                body: parts.body,
                flags: parts.flags,
            },
            func.span,
        ))
    }

    fn lower_function_name(&mut self, func: &js::Function<'_>) -> Option<NodeId> {
        func.id.as_ref().map(|id| {
            self.tree.alloc(
                NodeKind::BindingIdentifier {
                    name: id.name.to_string(),
                },
                id.span,
            )
        })
    }

    fn lower_function_parts(&mut self, func: &js::Function<'_>) -> Result<FunctionParts, TransformError> {
        let params = self.lower_params(&func.params)?;
        let body = match &func.body {
            Some(body) => self.lower_function_body(body)?,
            None => return Err(unsupported("function without body", func.span)),
        };
        Ok(FunctionParts {
            params,
            body,
            flags: FunctionFlags {
                is_async: func.r#async,
                generator: func.generator,
            },
        })
    }

    fn lower_function_body(&mut self, body: &js::FunctionBody<'_>) -> Result<NodeId, TransformError> {
        let mut statements = self.lower_directives(&body.directives);
        statements.extend(self.lower_statements(&body.statements)?);
        Ok(self
            .tree
            .alloc(NodeKind::BlockStatement { body: statements }, body.span))
    }

    fn lower_params(
        &mut self,
        params: &js::FormalParameters<'_>,
    ) -> Result<Vec<NodeId>, TransformError> {
        let mut out = Vec::with_capacity(params.items.len() + 1);
        for param in &params.items {
            if !param.decorators.is_empty() {
                return Err(unsupported("decorator", param.span));
            }
            if param.accessibility.is_some() || param.readonly || param.r#override {
                return Err(unsupported("parameter property", param.span));
            }
            let mut id = self.lower_binding(&param.pattern)?;
            if let Some(initializer) = &param.initializer {
                let right = self.lower_expression(initializer)?;
                id = self
                    .tree
                    .alloc(NodeKind::AssignmentPattern { left: id, right }, param.span);
            }
            out.push(id);
        }
        if let Some(rest) = &params.rest {
            let argument = self.lower_binding(&rest.rest.argument)?;
            out.push(
                self.tree
                    .alloc(NodeKind::RestElement { argument }, rest.span),
            );
        }
        Ok(out)
    }

    // ── classes ─────────────────────────────────────────────────────────────

    fn lower_class(&mut self, class: &js::Class<'_>) -> Result<ClassParts, TransformError> {
        if let Some(decorator) = class.decorators.first() {
            return Err(unsupported("decorator", decorator.span));
        }
        let id = class.id.as_ref().map(|id| {
            self.tree.alloc(
                NodeKind::BindingIdentifier {
                    name: id.name.to_string(),
                },
                id.span,
            )
        });
        let super_class = self.lower_optional(class.super_class.as_ref())?;
        let mut body = Vec::with_capacity(class.body.body.len());
        for element in &class.body.body {
            if let Some(member) = self.lower_class_element(element)? {
                body.push(member);
            }
        }
        Ok(ClassParts {
            id,
            super_class,
            body,
        })
    }

    /// `None` for members that only exist at the type level.
    fn lower_class_element(
        &mut self,
        element: &js::ClassElement<'_>,
    ) -> Result<Option<NodeId>, TransformError> {
        let kind = match element {
            js::ClassElement::StaticBlock(block) => NodeKind::StaticBlock {
                body: self.lower_statements(&block.body)?,
            },
            js::ClassElement::MethodDefinition(method) => {
                // abstract members and overload signatures
                if method.r#type == js::MethodDefinitionType::TSAbstractMethodDefinition
                    || method.value.body.is_none()
                {
                    return Ok(None);
                }
                if let Some(decorator) = method.decorators.first() {
                    return Err(unsupported("decorator", decorator.span));
                }
                let key = self.lower_property_key(&method.key, method.computed)?;
                let parts = self.lower_function_parts(&method.value)?;
                NodeKind::ClassMethod {
                    kind: match method.kind {
                        js::MethodDefinitionKind::Constructor => MethodKind::Constructor,
                        js::MethodDefinitionKind::Method => MethodKind::Method,
                        js::MethodDefinitionKind::Get => MethodKind::Get,
                        js::MethodDefinitionKind::Set => MethodKind::Set,
                    },
                    key,
                    is_static: method.r#static,
                    params: parts.params,
                    body: parts.body,
                    flags: parts.flags,
                }
            }
            js::ClassElement::PropertyDefinition(prop) => {
                if prop.declare
                    || prop.r#type == js::PropertyDefinitionType::TSAbstractPropertyDefinition
                {
                    return Ok(None);
                }
                if let Some(decorator) = prop.decorators.first() {
                    return Err(unsupported("decorator", decorator.span));
                }
                NodeKind::ClassProperty {
                    key: self.lower_property_key(&prop.key, prop.computed)?,
                    value: self.lower_optional(prop.value.as_ref())?,
                    is_static: prop.r#static,
                    accessor: false,
                }
            }
            js::ClassElement::AccessorProperty(prop) => {
                if prop.r#type.is_abstract() {
                    return Ok(None);
                }
                if let Some(decorator) = prop.decorators.first() {
                    return Err(unsupported("decorator", decorator.span));
                }
                NodeKind::ClassProperty {
                    key: self.lower_property_key(&prop.key, prop.computed)?,
                    value: self.lower_optional(prop.value.as_ref())?,
                    is_static: prop.r#static,
                    accessor: true,
                }
            }
            js::ClassElement::TSIndexSignature(_) => return Ok(None),
        };
        Ok(Some(self.tree.alloc(kind, element.span())))
    }

    // ── patterns ────────────────────────────────────────────────────────────

    fn lower_binding(&mut self, pattern: &js::BindingPattern<'_>) -> Result<NodeId, TransformError> {
        match pattern {
            js::BindingPattern::BindingIdentifier(id) => Ok(self.tree.alloc(
                NodeKind::BindingIdentifier {
                    name: id.name.to_string(),
                },
                id.span,
            )),
            js::BindingPattern::ObjectPattern(obj) => {
                let mut properties = Vec::with_capacity(obj.properties.len());
                for prop in &obj.properties {
                    let key = self.lower_property_key(&prop.key, prop.computed)?;
                    let value = self.lower_binding(&prop.value)?;
                    properties.push(self.tree.alloc(
                        NodeKind::BindingProperty {
                            key,
                            value,
                            shorthand: prop.shorthand,
                        },
                        prop.span,
                    ));
                }
                let rest = match &obj.rest {
                    Some(rest) => {
                        let argument = self.lower_binding(&rest.argument)?;
                        Some(
                            self.tree
                                .alloc(NodeKind::RestElement { argument }, rest.span),
                        )
                    }
                    None => None,
                };
                Ok(self
                    .tree
                    .alloc(NodeKind::ObjectPattern { properties, rest }, obj.span))
            }
            js::BindingPattern::ArrayPattern(arr) => {
                let mut elements = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    elements.push(match element {
                        Some(element) => Some(self.lower_binding(element)?),
                        None => None,
                    });
                }
                let rest = match &arr.rest {
                    Some(rest) => {
                        let argument = self.lower_binding(&rest.argument)?;
                        Some(
                            self.tree
                                .alloc(NodeKind::RestElement { argument }, rest.span),
                        )
                    }
                    None => None,
                };
                Ok(self
                    .tree
                    .alloc(NodeKind::ArrayPattern { elements, rest }, arr.span))
            }
            js::BindingPattern::AssignmentPattern(assign) => {
                let left = self.lower_binding(&assign.left)?;
                let right = self.lower_expression(&assign.right)?;
                Ok(self
                    .tree
                    .alloc(NodeKind::AssignmentPattern { left, right }, assign.span))
            }
        }
    }

    fn lower_property_key(
        &mut self,
        key: &js::PropertyKey<'_>,
        computed: bool,
    ) -> Result<PropertyKey, TransformError> {
        if computed {
            return match key.as_expression() {
                Some(expr) => Ok(PropertyKey::Computed(self.lower_expression(expr)?)),
                None => Err(unsupported("computed key", key.span())),
            };
        }
        match key {
            js::PropertyKey::StaticIdentifier(id) => Ok(PropertyKey::Static(id.name.to_string())),
            js::PropertyKey::PrivateIdentifier(id) => Ok(PropertyKey::Private(id.name.to_string())),
            other => match other.as_expression() {
                Some(js::Expression::StringLiteral(lit)) => {
                    Ok(PropertyKey::Static(lit.value.to_string()))
                }
                Some(js::Expression::NumericLiteral(lit)) => {
                    Ok(PropertyKey::Static(crate::codegen::format_number(lit.value)))
                }
                _ => Err(unsupported("property key", other.span())),
            },
        }
    }

    // ── expressions ─────────────────────────────────────────────────────────

    fn lower_expression(&mut self, expr: &js::Expression<'_>) -> Result<NodeId, TransformError> {
        let kind = match expr {
            js::Expression::Identifier(id) => NodeKind::Identifier {
                name: id.name.to_string(),
            },
            js::Expression::NumericLiteral(lit) => NodeKind::NumericLiteral { value: lit.value },
            js::Expression::StringLiteral(lit) => NodeKind::StringLiteral {
                value: lit.value.to_string(),
            },
            js::Expression::BooleanLiteral(lit) => NodeKind::BooleanLiteral { value: lit.value },
            js::Expression::NullLiteral(_) => NodeKind::NullLiteral,
            js::Expression::RegExpLiteral(lit) => NodeKind::RegExpLiteral {
                raw: self.raw(lit.span),
            },
            js::Expression::BigIntLiteral(lit) => NodeKind::BigIntLiteral {
                raw: self.raw(lit.span),
            },
            js::Expression::ThisExpression(_) => NodeKind::ThisExpression,
            js::Expression::Super(_) => NodeKind::Super,
            js::Expression::MetaProperty(meta) => NodeKind::MetaProperty {
                meta: meta.meta.name.to_string(),
                property: meta.property.name.to_string(),
            },
            js::Expression::TemplateLiteral(tpl) => return self.lower_template(tpl),
            js::Expression::TaggedTemplateExpression(tagged) => {
                NodeKind::TaggedTemplateExpression {
                    tag: self.lower_expression(&tagged.tag)?,
                    quasi: self.lower_template(&tagged.quasi)?,
                }
            }
            js::Expression::ArrayExpression(arr) => {
                let mut elements = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    elements.push(match element {
                        js::ArrayExpressionElement::Elision(_) => None,
                        js::ArrayExpressionElement::SpreadElement(spread) => {
                            Some(self.lower_spread(spread)?)
                        }
                        other => match other.as_expression() {
                            Some(inner) => Some(self.lower_expression(inner)?),
                            None => return Err(unsupported("array element", arr.span)),
                        },
                    });
                }
                NodeKind::ArrayExpression { elements }
            }
            js::Expression::ObjectExpression(obj) => {
                let mut properties = Vec::with_capacity(obj.properties.len());
                for prop in &obj.properties {
                    properties.push(match prop {
                        js::ObjectPropertyKind::ObjectProperty(prop) => {
                            self.lower_object_property(prop)?
                        }
                        js::ObjectPropertyKind::SpreadProperty(spread) => {
                            self.lower_spread(spread)?
                        }
                    });
                }
                NodeKind::ObjectExpression { properties }
            }
            js::Expression::CallExpression(call) => return self.lower_call(call),
            js::Expression::NewExpression(new_expr) => NodeKind::NewExpression {
                callee: self.lower_expression(&new_expr.callee)?,
                arguments: self.lower_arguments(&new_expr.arguments)?,
            },
            js::Expression::ImportExpression(import) => {
                if import.phase.is_some() {
                    return Err(unsupported("import phase", import.span));
                }
                NodeKind::ImportExpression {
                    source: self.lower_expression(&import.source)?,
                    options: self.lower_optional(import.options.as_ref())?,
                }
            }
            js::Expression::StaticMemberExpression(member) => {
                return self.lower_static_member(member)
            }
            js::Expression::ComputedMemberExpression(member) => {
                return self.lower_computed_member(member)
            }
            js::Expression::PrivateFieldExpression(member) => {
                return self.lower_private_member(member)
            }
            js::Expression::ChainExpression(chain) => {
                let expression = match &chain.expression {
                    js::ChainElement::CallExpression(call) => self.lower_call(call)?,
                    js::ChainElement::TSNonNullExpression(ts) => {
                        self.lower_expression(&ts.expression)?
                    }
                    other => match other.as_member_expression() {
                        Some(member) => self.lower_member(member)?,
                        None => return Err(unsupported("optional chain", chain.span)),
                    },
                };
                NodeKind::ChainExpression { expression }
            }
            js::Expression::ArrowFunctionExpression(arrow) => {
                let params = self.lower_params(&arrow.params)?;
                if arrow.expression {
                    let body = match arrow.body.statements.first() {
                        Some(js::Statement::ExpressionStatement(stmt)) => {
                            self.lower_expression(&stmt.expression)?
                        }
                        _ => return Err(unsupported("arrow body", arrow.span)),
                    };
                    NodeKind::ArrowFunctionExpression {
                        params,
                        body,
                        expression: true,
                        is_async: arrow.r#async,
                    }
                } else {
                    NodeKind::ArrowFunctionExpression {
                        params,
                        body: self.lower_function_body(&arrow.body)?,
                        expression: false,
                        is_async: arrow.r#async,
                    }
                }
            }
            js::Expression::FunctionExpression(func) => {
                let id = self.lower_function_name(func);
                let parts = self.lower_function_parts(func)?;
                NodeKind::FunctionExpression {
                    id,
                    params: parts.params,
                    body: parts.body,
                    flags: parts.flags,
                }
            }
            js::Expression::ClassExpression(class) => {
                let parts = self.lower_class(class)?;
                NodeKind::ClassExpression {
                    id: parts.id,
                    super_class: parts.super_class,
                    body: parts.body,
                }
            }
            js::Expression::UnaryExpression(unary) => NodeKind::UnaryExpression {
                operator: unary.operator,
                argument: self.lower_expression(&unary.argument)?,
            },
            js::Expression::UpdateExpression(update) => NodeKind::UpdateExpression {
                operator: update.operator,
                prefix: update.prefix,
                argument: self.lower_simple_target(&update.argument)?,
            },
            js::Expression::BinaryExpression(binary) => NodeKind::BinaryExpression {
                operator: binary.operator,
                left: self.lower_expression(&binary.left)?,
                right: self.lower_expression(&binary.right)?,
            },
            js::Expression::PrivateInExpression(private_in) => NodeKind::PrivateInExpression {
                name: private_in.left.name.to_string(),
                right: self.lower_expression(&private_in.right)?,
            },
            js::Expression::LogicalExpression(logical) => NodeKind::LogicalExpression {
                operator: logical.operator,
                left: self.lower_expression(&logical.left)?,
                right: self.lower_expression(&logical.right)?,
            },
            js::Expression::AssignmentExpression(assign) => NodeKind::AssignmentExpression {
                operator: assign.operator,
                left: self.lower_assignment_target(&assign.left)?,
                right: self.lower_expression(&assign.right)?,
            },
            js::Expression::ConditionalExpression(cond) => NodeKind::ConditionalExpression {
                test: self.lower_expression(&cond.test)?,
                consequent: self.lower_expression(&cond.consequent)?,
                alternate: self.lower_expression(&cond.alternate)?,
            },
            js::Expression::SequenceExpression(seq) => {
                let mut expressions = Vec::with_capacity(seq.expressions.len());
                for inner in &seq.expressions {
                    expressions.push(self.lower_expression(inner)?);
                }
                NodeKind::SequenceExpression { expressions }
            }
            js::Expression::AwaitExpression(await_expr) => NodeKind::AwaitExpression {
                argument: self.lower_expression(&await_expr.argument)?,
            },
            js::Expression::YieldExpression(yield_expr) => NodeKind::YieldExpression {
                argument: self.lower_optional(yield_expr.argument.as_ref())?,
                delegate: yield_expr.delegate,
            },
            js::Expression::JSXElement(element) => return self.lower_jsx_element(element),
            js::Expression::JSXFragment(fragment) => return self.lower_jsx_fragment(fragment),
            js::Expression::ParenthesizedExpression(paren) => {
                return self.lower_expression(&paren.expression)
            }
            js::Expression::TSAsExpression(ts) => return self.lower_expression(&ts.expression),
            js::Expression::TSSatisfiesExpression(ts) => {
                return self.lower_expression(&ts.expression)
            }
            js::Expression::TSNonNullExpression(ts) => {
                return self.lower_expression(&ts.expression)
            }
            js::Expression::TSTypeAssertion(ts) => return self.lower_expression(&ts.expression),
            js::Expression::TSInstantiationExpression(ts) => {
                return self.lower_expression(&ts.expression)
            }
            other => return Err(unsupported("expression", other.span())),
        };
        Ok(self.tree.alloc(kind, expr.span()))
    }

    fn lower_template(&mut self, tpl: &js::TemplateLiteral<'_>) -> Result<NodeId, TransformError> {
        let quasis = tpl
            .quasis
            .iter()
            .map(|quasi| quasi.value.raw.to_string())
            .collect();
        let mut expressions = Vec::with_capacity(tpl.expressions.len());
        for inner in &tpl.expressions {
            expressions.push(self.lower_expression(inner)?);
        }
        Ok(self.tree.alloc(
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            },
            tpl.span,
        ))
    }

    fn lower_spread(&mut self, spread: &js::SpreadElement<'_>) -> Result<NodeId, TransformError> {
        let argument = self.lower_expression(&spread.argument)?;
        Ok(self
            .tree
            .alloc(NodeKind::SpreadElement { argument }, spread.span))
    }

    fn lower_arguments(
        &mut self,
        arguments: &[js::Argument<'_>],
    ) -> Result<Vec<NodeId>, TransformError> {
        let mut out = Vec::with_capacity(arguments.len());
        for argument in arguments {
            out.push(match argument {
                js::Argument::SpreadElement(spread) => self.lower_spread(spread)?,
                other => match other.as_expression() {
                    Some(expr) => self.lower_expression(expr)?,
                    None => return Err(unsupported("call argument", other.span())),
                },
            });
        }
        Ok(out)
    }

    fn lower_call(&mut self, call: &js::CallExpression<'_>) -> Result<NodeId, TransformError> {
        let callee = self.lower_expression(&call.callee)?;
        let arguments = self.lower_arguments(&call.arguments)?;
        Ok(self.tree.alloc(
            NodeKind::CallExpression {
                callee,
                arguments,
                optional: call.optional,
            },
            call.span,
        ))
    }

    fn lower_object_property(
        &mut self,
        prop: &js::ObjectProperty<'_>,
    ) -> Result<NodeId, TransformError> {
        let key = self.lower_property_key(&prop.key, prop.computed)?;
        let kind = match prop.kind {
            js::PropertyKind::Init if !prop.method => NodeKind::ObjectProperty {
                key,
                value: self.lower_expression(&prop.value)?,
                shorthand: prop.shorthand,
            },
            kind => {
                let js::Expression::FunctionExpression(func) = &prop.value else {
                    return Err(unsupported("object method", prop.span));
                };
                let parts = self.lower_function_parts(func)?;
                let kind = match kind {
                    js::PropertyKind::Get => MethodKind::Get,
                    js::PropertyKind::Set => MethodKind::Set,
                    js::PropertyKind::Init => MethodKind::Method,
                };
                NodeKind::ObjectMethod {
                    kind,
                    key,
                    params: parts.params,
                    body: parts.body,
                    flags: parts.flags,
                }
            }
        };
        Ok(self.tree.alloc(kind, prop.span))
    }

    fn lower_member(&mut self, member: &js::MemberExpression<'_>) -> Result<NodeId, TransformError> {
        match member {
            js::MemberExpression::StaticMemberExpression(member) => self.lower_static_member(member),
            js::MemberExpression::ComputedMemberExpression(member) => {
                self.lower_computed_member(member)
            }
            js::MemberExpression::PrivateFieldExpression(member) => {
                self.lower_private_member(member)
            }
        }
    }

    fn lower_static_member(
        &mut self,
        member: &js::StaticMemberExpression<'_>,
    ) -> Result<NodeId, TransformError> {
        let object = self.lower_expression(&member.object)?;
        Ok(self.tree.alloc(
            NodeKind::MemberExpression {
                object,
                property: MemberProperty::Static(member.property.name.to_string()),
                optional: member.optional,
            },
            member.span,
        ))
    }

    fn lower_computed_member(
        &mut self,
        member: &js::ComputedMemberExpression<'_>,
    ) -> Result<NodeId, TransformError> {
        let object = self.lower_expression(&member.object)?;
        let property = self.lower_expression(&member.expression)?;
        Ok(self.tree.alloc(
            NodeKind::MemberExpression {
                object,
                property: MemberProperty::Computed(property),
                optional: member.optional,
            },
            member.span,
        ))
    }

    fn lower_private_member(
        &mut self,
        member: &js::PrivateFieldExpression<'_>,
    ) -> Result<NodeId, TransformError> {
        let object = self.lower_expression(&member.object)?;
        Ok(self.tree.alloc(
            NodeKind::MemberExpression {
                object,
                property: MemberProperty::Private(member.field.name.to_string()),
                optional: member.optional,
            },
            member.span,
        ))
    }

    // ── assignment targets ──────────────────────────────────────────────────

    /// Destructuring targets lower to the pattern nodes with `Identifier` leaves,
    /// since they write existing bindings rather than declare new ones.
    fn lower_assignment_target(
        &mut self,
        target: &js::AssignmentTarget<'_>,
    ) -> Result<NodeId, TransformError> {
        match target {
            js::AssignmentTarget::ArrayAssignmentTarget(arr) => {
                let mut elements = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    elements.push(match element {
                        Some(element) => Some(self.lower_target_maybe_default(element)?),
                        None => None,
                    });
                }
                let rest = match &arr.rest {
                    Some(rest) => Some(self.lower_target_rest(rest)?),
                    None => None,
                };
                Ok(self
                    .tree
                    .alloc(NodeKind::ArrayPattern { elements, rest }, arr.span))
            }
            js::AssignmentTarget::ObjectAssignmentTarget(obj) => {
                let mut properties = Vec::with_capacity(obj.properties.len());
                for prop in &obj.properties {
                    properties.push(match prop {
                        js::AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(prop) => {
                            let name = prop.binding.name.to_string();
                            let mut value = self.tree.alloc(
                                NodeKind::Identifier { name: name.clone() },
                                prop.binding.span,
                            );
                            if let Some(init) = &prop.init {
                                let right = self.lower_expression(init)?;
                                value = self.tree.alloc(
                                    NodeKind::AssignmentPattern { left: value, right },
                                    prop.span,
                                );
                            }
                            self.tree.alloc(
                                NodeKind::BindingProperty {
                                    key: PropertyKey::Static(name),
                                    value,
                                    shorthand: true,
                                },
                                prop.span,
                            )
                        }
                        js::AssignmentTargetProperty::AssignmentTargetPropertyProperty(prop) => {
                            let key = self.lower_property_key(&prop.name, prop.computed)?;
                            let value = self.lower_target_maybe_default(&prop.binding)?;
                            self.tree.alloc(
                                NodeKind::BindingProperty {
                                    key,
                                    value,
                                    shorthand: false,
                                },
                                prop.span,
                            )
                        }
                    });
                }
                let rest = match &obj.rest {
                    Some(rest) => Some(self.lower_target_rest(rest)?),
                    None => None,
                };
                Ok(self
                    .tree
                    .alloc(NodeKind::ObjectPattern { properties, rest }, obj.span))
            }
            other => match other.as_simple_assignment_target() {
                Some(simple) => self.lower_simple_target(simple),
                None => Err(unsupported("assignment target", other.span())),
            },
        }
    }

    fn lower_target_maybe_default(
        &mut self,
        target: &js::AssignmentTargetMaybeDefault<'_>,
    ) -> Result<NodeId, TransformError> {
        match target {
            js::AssignmentTargetMaybeDefault::AssignmentTargetWithDefault(with_default) => {
                let left = self.lower_assignment_target(&with_default.binding)?;
                let right = self.lower_expression(&with_default.init)?;
                Ok(self.tree.alloc(
                    NodeKind::AssignmentPattern { left, right },
                    with_default.span,
                ))
            }
            other => match other.as_assignment_target() {
                Some(target) => self.lower_assignment_target(target),
                None => Err(unsupported("assignment target", other.span())),
            },
        }
    }

    fn lower_target_rest(
        &mut self,
        rest: &js::AssignmentTargetRest<'_>,
    ) -> Result<NodeId, TransformError> {
        let argument = self.lower_assignment_target(&rest.target)?;
        Ok(self
            .tree
            .alloc(NodeKind::RestElement { argument }, rest.span))
    }

    fn lower_simple_target(
        &mut self,
        target: &js::SimpleAssignmentTarget<'_>,
    ) -> Result<NodeId, TransformError> {
        match target {
            js::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => Ok(self.tree.alloc(
                NodeKind::Identifier {
                    name: id.name.to_string(),
                },
                id.span,
            )),
            js::SimpleAssignmentTarget::TSAsExpression(ts) => self.lower_expression(&ts.expression),
            js::SimpleAssignmentTarget::TSSatisfiesExpression(ts) => {
                self.lower_expression(&ts.expression)
            }
            js::SimpleAssignmentTarget::TSNonNullExpression(ts) => {
                self.lower_expression(&ts.expression)
            }
            js::SimpleAssignmentTarget::TSTypeAssertion(ts) => self.lower_expression(&ts.expression),
            other => match other.as_member_expression() {
                Some(member) => self.lower_member(member),
                None => Err(unsupported("assignment target", other.span())),
            },
        }
    }

    // ── jsx ─────────────────────────────────────────────────────────────────

    fn lower_jsx_element(&mut self, element: &js::JSXElement<'_>) -> Result<NodeId, TransformError> {
        let opening = &element.opening_element;
        let mut attributes = Vec::with_capacity(opening.attributes.len());
        for item in &opening.attributes {
            attributes.push(match item {
                js::JSXAttributeItem::Attribute(attr) => {
                    let value = match &attr.value {
                        None => None,
                        Some(js::JSXAttributeValue::StringLiteral(lit)) => {
                            let raw = self.raw(lit.span);
                            Some(self.tree.alloc(NodeKind::JSXText { raw }, lit.span))
                        }
                        Some(js::JSXAttributeValue::ExpressionContainer(container)) => {
                            Some(self.lower_jsx_container(container)?)
                        }
                        Some(js::JSXAttributeValue::Element(inner)) => {
                            Some(self.lower_jsx_element(inner)?)
                        }
                        Some(js::JSXAttributeValue::Fragment(inner)) => {
                            Some(self.lower_jsx_fragment(inner)?)
                        }
                    };
                    let name = self.raw(attr.name.span());
                    self.tree
                        .alloc(NodeKind::JSXAttribute { name, value }, attr.span)
                }
                js::JSXAttributeItem::SpreadAttribute(spread) => {
                    let argument = self.lower_expression(&spread.argument)?;
                    self.tree
                        .alloc(NodeKind::JSXSpreadAttribute { argument }, spread.span)
                }
            });
        }
        let children = self.lower_jsx_children(&element.children)?;
        let name = self.raw(opening.name.span());
        Ok(self.tree.alloc(
            NodeKind::JSXElement {
                name,
                attributes,
                children,
                self_closing: element.closing_element.is_none(),
            },
            element.span,
        ))
    }

    fn lower_jsx_fragment(
        &mut self,
        fragment: &js::JSXFragment<'_>,
    ) -> Result<NodeId, TransformError> {
        let children = self.lower_jsx_children(&fragment.children)?;
        Ok(self
            .tree
            .alloc(NodeKind::JSXFragment { children }, fragment.span))
    }

    fn lower_jsx_children(
        &mut self,
        children: &[js::JSXChild<'_>],
    ) -> Result<Vec<NodeId>, TransformError> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            out.push(match child {
                js::JSXChild::Text(text) => {
                    let raw = self.raw(text.span);
                    self.tree.alloc(NodeKind::JSXText { raw }, text.span)
                }
                js::JSXChild::Element(element) => self.lower_jsx_element(element)?,
                js::JSXChild::Fragment(fragment) => self.lower_jsx_fragment(fragment)?,
                js::JSXChild::ExpressionContainer(container) => {
                    self.lower_jsx_container(container)?
                }
                js::JSXChild::Spread(spread) => {
                    let expression = self.lower_expression(&spread.expression)?;
                    self.tree
                        .alloc(NodeKind::JSXSpreadChild { expression }, spread.span)
                }
            });
        }
        Ok(out)
    }

    fn lower_jsx_container(
        &mut self,
        container: &js::JSXExpressionContainer<'_>,
    ) -> Result<NodeId, TransformError> {
        let expression = match &container.expression {
            js::JSXExpression::EmptyExpression(_) => None,
            other => match other.as_expression() {
                Some(expr) => Some(self.lower_expression(expr)?),
                None => return Err(unsupported("jsx expression", container.span)),
            },
        };
        Ok(self
            .tree
            .alloc(NodeKind::JSXExpressionContainer { expression }, container.span))
    }
}

fn module_export_name(name: &js::ModuleExportName<'_>) -> String {
    match name {
        js::ModuleExportName::IdentifierName(id) => id.name.to_string(),
        js::ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        js::ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_statement(module: &Module) -> NodeId {
        module.tree.children(module.root())[0]
    }

    fn statement_kinds(module: &Module) -> Vec<&'static str> {
        module
            .tree
            .children(module.root())
            .into_iter()
            .map(|stmt| module.tree.kind(stmt).type_name())
            .collect()
    }

    #[test]
    fn lowers_declarations_with_patterns() {
        let module = parse_module("const { a, b: [c, , d = 1], ...rest } = props;", false).unwrap();
        let declaration = first_statement(&module);
        assert!(matches!(
            module.tree.kind(declaration),
            NodeKind::VariableDeclaration { kind: DeclarationKind::Const, .. }
        ));
        let declarator = module.tree.children(declaration)[0];
        let pattern = module.tree.children(declarator)[0];
        let NodeKind::ObjectPattern { properties, rest } = module.tree.kind(pattern) else {
            panic!("expected object pattern");
        };
        assert_eq!(properties.len(), 2);
        assert!(rest.is_some());
        let NodeKind::BindingProperty { key, value, .. } = module.tree.kind(properties[1]) else {
            panic!("expected binding property");
        };
        assert_eq!(key, &PropertyKey::Static("b".to_string()));
        let NodeKind::ArrayPattern { elements, .. } = module.tree.kind(*value) else {
            panic!("expected array pattern");
        };
        assert_eq!(elements.len(), 3);
        assert!(elements[1].is_none());
        assert_eq!(
            module.tree.kind(elements[2].unwrap()).type_name(),
            "AssignmentPattern"
        );
    }

    #[test]
    fn typescript_wrappers_are_erased() {
        let module = parse_module(
            "type Props = { a: number };\nconst a = (value as number)!;\ndeclare const b: number;",
            true,
        )
        .unwrap();
        let body = module.tree.children(module.root());
        assert_eq!(body.len(), 1);
        let declarator = module.tree.children(body[0])[0];
        let init = module.tree.children(declarator)[1];
        assert_eq!(
            module.tree.kind(init),
            &NodeKind::Identifier {
                name: "value".to_string()
            }
        );
    }

    #[test]
    fn unsupported_syntax_is_reported_with_span() {
        let err = parse_module("enum E { A }", true).unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedSyntax { .. }));
        assert_eq!(err.span().start, 0);

        let err = parse_module("class A { constructor(private x) {} }", true).unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedSyntax { .. }));
    }

    #[test]
    fn parse_errors_are_surfaced() {
        let err = parse_module("let = ;", false).unwrap_err();
        assert!(matches!(err, TransformError::Parse { .. }));
    }

    #[test]
    fn parse_errors_point_at_the_offending_token() {
        let err = parse_module("const a = 1;\nconst b = ;", false).unwrap_err();
        assert!(matches!(err, TransformError::Parse { .. }));
        assert_eq!(err.span().start, 23);
    }

    #[test]
    fn lowers_control_flow() {
        let module = parse_module(
            "for (let i = 0; i < 3; i++) {}\n\
             for (const k in o) {}\n\
             for (x of xs) {}\n\
             while (a) break;\n\
             do { continue; } while (b);\n\
             outer: for (;;) {}\n\
             try { f(); } catch (e) {} finally {}\n\
             switch (v) { case 1: f(); default: }\n\
             throw err;\n\
             debugger;",
            false,
        )
        .unwrap();
        assert_eq!(
            statement_kinds(&module),
            vec![
                "ForStatement",
                "ForInStatement",
                "ForOfStatement",
                "WhileStatement",
                "DoWhileStatement",
                "LabeledStatement",
                "TryStatement",
                "SwitchStatement",
                "ThrowStatement",
                "DebuggerStatement",
            ]
        );
    }

    #[test]
    fn lowers_classes_and_async_functions() {
        let module = parse_module(
            "class A extends B { static #n = 1; get v() { return this.#n; } static { init(); } }\n\
             async function* gen(a = 1, ...rest) { yield* rest; await a; }",
            false,
        )
        .unwrap();
        let body = module.tree.children(module.root());
        let NodeKind::ClassDeclaration {
            super_class,
            body: members,
            ..
        } = module.tree.kind(body[0])
        else {
            panic!("expected class declaration");
        };
        assert!(super_class.is_some());
        let members: Vec<&str> = members
            .iter()
            .map(|&member| module.tree.kind(member).type_name())
            .collect();
        assert_eq!(members, vec!["ClassProperty", "ClassMethod", "StaticBlock"]);

        let NodeKind::FunctionDeclaration { params, flags, .. } = module.tree.kind(body[1]) else {
            panic!("expected function declaration");
        };
        assert!(flags.is_async && flags.generator);
        let params: Vec<&str> = params
            .iter()
            .map(|&param| module.tree.kind(param).type_name())
            .collect();
        assert_eq!(params, vec!["AssignmentPattern", "RestElement"]);
    }

    #[test]
    fn optional_chains_keep_their_boundary() {
        let module = parse_module("a?.b.c();", false).unwrap();
        let stmt = first_statement(&module);
        let chain = module.tree.children(stmt)[0];
        let NodeKind::ChainExpression { expression } = module.tree.kind(chain) else {
            panic!("expected chain expression");
        };
        let NodeKind::CallExpression {
            callee, optional, ..
        } = module.tree.kind(*expression)
        else {
            panic!("expected call");
        };
        assert!(!optional);
        let NodeKind::MemberExpression { object, .. } = module.tree.kind(*callee) else {
            panic!("expected member");
        };
        assert!(matches!(
            module.tree.kind(*object),
            NodeKind::MemberExpression { optional: true, .. }
        ));
    }

    #[test]
    fn literals_keep_their_source_text() {
        let module = parse_module("f(/a+b/gi, 10n);", false).unwrap();
        let call = module.tree.children(first_statement(&module))[0];
        let arguments = &module.tree.children(call)[1..];
        assert_eq!(
            module.tree.kind(arguments[0]),
            &NodeKind::RegExpLiteral {
                raw: "/a+b/gi".to_string()
            }
        );
        assert_eq!(
            module.tree.kind(arguments[1]),
            &NodeKind::BigIntLiteral {
                raw: "10n".to_string()
            }
        );
    }

    #[test]
    fn type_only_module_syntax_is_dropped() {
        let module = parse_module(
            "import type { A } from \"a\";\nimport { type B } from \"b\";\nexport type { A };\nexport { c };",
            true,
        )
        .unwrap();
        assert_eq!(statement_kinds(&module), vec!["ExportNamedDeclaration"]);
    }

    #[test]
    fn object_members_keep_their_kind() {
        let module = parse_module(
            "const o = { a, b: 1, get c() { return 1; }, m(x) { return x; }, ...r };",
            false,
        )
        .unwrap();
        let declarator = module.tree.children(first_statement(&module))[0];
        let object = module.tree.children(declarator)[1];
        let kinds: Vec<&str> = module
            .tree
            .children(object)
            .into_iter()
            .map(|member| module.tree.kind(member).type_name())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "ObjectProperty",
                "ObjectProperty",
                "ObjectMethod",
                "ObjectMethod",
                "SpreadElement"
            ]
        );
    }

    #[test]
    fn callee_scan_finds_nested_calls() {
        let allocator = Allocator::default();
        let program = parse_program(
            &allocator,
            "function f() { return g(() => $get(x)); }",
            source_type(false, true),
        )
        .unwrap();
        assert!(calls_any(&program, &|name: &str| name == "$get"));
        assert!(!calls_any(&program, &|name: &str| name == "$set"));
    }
}
