use std::sync::Arc;

use log::{debug, trace};

use crate::{
    common::{span::Span, ty::Ty},
    compiler::syntax::Diagnostics,
    construct::{
        bound::{BoundExpression, BoundStatement},
        operator::{BinaryOperator, Conversion, UnaryOperator},
        scope::{Scope, ScopeStack},
        symbol::VariableSymbol,
        token::{SyntaxKind, SyntaxToken},
        tree::{CompilationUnit, ExpressionSyntax, SeparatedList, StatementSyntax},
    },
};

/// Everything binding a single submission produced.
/// Snapshots chain through `previous`, oldest last,
/// so later submissions can see the variables of earlier ones.
#[derive(Debug)]
pub struct BoundGlobalScope {
    pub previous: Option<Arc<BoundGlobalScope>>,
    /// Includes the diagnostics of every previous snapshot, oldest first.
    pub diagnostics: Diagnostics,
    pub variables: Vec<VariableSymbol>,
    pub statement: Arc<BoundStatement>,
}

/// Resolves names and types in a syntax tree,
/// producing a bound tree.
/// Like the parser, the binder reports problems and keeps going:
/// anything that fails to bind becomes a [`BoundExpression::Error`],
/// which absorbs any further diagnostics about it.
#[derive(Debug)]
pub struct Binder {
    scopes: ScopeStack,
    diagnostics: Diagnostics,
}

impl Binder {
    pub fn new(scopes: ScopeStack) -> Binder {
        Binder {
            scopes,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn bind_global_scope(
        previous: Option<Arc<BoundGlobalScope>>,
        unit: &CompilationUnit,
    ) -> BoundGlobalScope {
        let mut binder = Binder::new(Binder::parent_scopes(previous.as_deref()));
        binder.scopes.enter_scope();

        let statement = binder.bind_statement(&unit.statement);
        let variables = binder.scopes.local_scope().declared_variables();
        debug!(
            "Bound {} global(s) with {} diagnostic(s)",
            variables.len(),
            binder.diagnostics.len(),
        );

        let mut diagnostics = previous
            .as_ref()
            .map(|p| p.diagnostics.clone())
            .unwrap_or_default();
        diagnostics.extend(binder.diagnostics);

        BoundGlobalScope {
            previous,
            diagnostics,
            variables,
            statement,
        }
    }

    /// Rebuilds the scopes of all previous submissions:
    /// builtins outermost, then one scope per submission, oldest first.
    fn parent_scopes(mut previous: Option<&BoundGlobalScope>) -> ScopeStack {
        let mut chain = vec![];
        while let Some(global) = previous {
            chain.push(global);
            previous = global.previous.as_deref();
        }

        let mut scopes = ScopeStack::new(Scope::builtins());
        for global in chain.into_iter().rev() {
            scopes.enter_scope();
            for variable in global.variables.iter() {
                scopes.try_declare_variable(variable.clone());
            }
        }

        trace!("Replayed {} previous submission(s)", scopes.depth());
        scopes
    }

    // Statements

    pub fn bind_statement(&mut self, syntax: &StatementSyntax) -> Arc<BoundStatement> {
        let statement = match syntax {
            StatementSyntax::Block { statements, .. } => self.bind_block_statement(statements),
            StatementSyntax::VariableDeclaration { keyword, identifier, initializer, .. } => {
                self.bind_variable_declaration(keyword, identifier, initializer)
            },
            StatementSyntax::If { condition, then_statement, else_clause, .. } => {
                BoundStatement::If {
                    condition: self.bind_condition(condition, Ty::Boolean),
                    then_statement: self.bind_statement(then_statement),
                    else_statement: else_clause
                        .as_ref()
                        .map(|clause| self.bind_statement(&clause.statement)),
                }
            },
            StatementSyntax::While { condition, body, .. } => BoundStatement::While {
                condition: self.bind_condition(condition, Ty::Boolean),
                body: self.bind_statement(body),
            },
            StatementSyntax::DoWhile { body, condition, .. } => {
                // body first, so diagnostics stay in source order
                let body = self.bind_statement(body);
                BoundStatement::DoWhile {
                    body,
                    condition: self.bind_condition(condition, Ty::Boolean),
                }
            },
            StatementSyntax::For { identifier, lower_bound, upper_bound, body, .. } => {
                self.bind_for_statement(identifier, lower_bound, upper_bound, body)
            },
            StatementSyntax::Expression { expression } => {
                BoundStatement::Expression(self.bind_expression(expression, true))
            },
        };

        Arc::new(statement)
    }

    fn bind_block_statement(&mut self, statements: &[StatementSyntax]) -> BoundStatement {
        self.scopes.enter_scope();
        let statements = statements
            .iter()
            .map(|statement| self.bind_statement(statement))
            .collect();
        self.scopes.exit_scope();

        BoundStatement::Block(statements)
    }

    fn bind_variable_declaration(
        &mut self,
        keyword: &SyntaxToken,
        identifier: &SyntaxToken,
        initializer: &ExpressionSyntax,
    ) -> BoundStatement {
        let read_only = keyword.kind == SyntaxKind::LetKeyword;
        let initializer = self.bind_expression(initializer, false);
        let variable = self.declare_variable(identifier, read_only, initializer.ty());

        BoundStatement::VariableDeclaration { variable, initializer }
    }

    fn bind_for_statement(
        &mut self,
        identifier: &SyntaxToken,
        lower_bound: &ExpressionSyntax,
        upper_bound: &ExpressionSyntax,
        body: &StatementSyntax,
    ) -> BoundStatement {
        let lower_bound = self.bind_condition(lower_bound, Ty::Integer);
        let upper_bound = self.bind_condition(upper_bound, Ty::Integer);

        self.scopes.enter_scope();
        let variable = self.declare_variable(identifier, true, Ty::Integer);
        let body = self.bind_statement(body);
        self.scopes.exit_scope();

        BoundStatement::For { variable, lower_bound, upper_bound, body }
    }

    /// Declares a variable in the innermost scope.
    /// A redeclaration is reported, but the symbol is still returned
    /// so the rest of the statement binds against something.
    fn declare_variable(
        &mut self,
        identifier: &SyntaxToken,
        read_only: bool,
        ty: Ty,
    ) -> VariableSymbol {
        let name = match identifier.text.as_str() {
            // fabricated by the parser, already reported
            "" => "?",
            name => name,
        };

        let variable = VariableSymbol::new(name, read_only, ty);
        if !identifier.text.is_empty() && !self.scopes.try_declare_variable(variable.clone()) {
            self.diagnostics.report_variable_already_declared(identifier.span(), name);
        }
        variable
    }

    // Expressions

    /// Binds an expression that must convert to `ty`,
    /// such as the condition of an `if`.
    fn bind_condition(&mut self, syntax: &ExpressionSyntax, ty: Ty) -> Arc<BoundExpression> {
        let expression = self.bind_expression(syntax, false);
        self.convert(syntax.span(), expression, ty, false)
    }

    /// Binds an expression.
    /// Only expression statements may have no value at all,
    /// `can_be_void` should be `false` everywhere else.
    pub fn bind_expression(
        &mut self,
        syntax: &ExpressionSyntax,
        can_be_void: bool,
    ) -> Arc<BoundExpression> {
        let expression = self.bind_expression_internal(syntax);

        if !can_be_void && expression.ty() == Ty::Void {
            self.diagnostics.report_expression_must_have_value(syntax.span());
            return Arc::new(BoundExpression::Error);
        }

        expression
    }

    fn bind_expression_internal(&mut self, syntax: &ExpressionSyntax) -> Arc<BoundExpression> {
        match syntax {
            ExpressionSyntax::Literal { value, .. } => {
                Arc::new(BoundExpression::Literal(value.clone()))
            },
            ExpressionSyntax::Name { identifier } => self.bind_name_expression(identifier),
            ExpressionSyntax::Assignment { identifier, equals, expression } => {
                self.bind_assignment_expression(identifier, equals, expression)
            },
            ExpressionSyntax::Unary { operator, operand } => {
                self.bind_unary_expression(operator, operand)
            },
            ExpressionSyntax::Binary { left, operator, right } => {
                self.bind_binary_expression(left, operator, right)
            },
            ExpressionSyntax::Parenthesized { expression, .. } => {
                self.bind_expression(expression, false)
            },
            ExpressionSyntax::Call { identifier, arguments, .. } => {
                self.bind_call_expression(syntax.span(), identifier, arguments)
            },
        }
    }

    fn bind_name_expression(&mut self, identifier: &SyntaxToken) -> Arc<BoundExpression> {
        let name = identifier.text.as_str();

        // fabricated by the parser, already reported
        if name.is_empty() {
            return Arc::new(BoundExpression::Error);
        }

        match self.scopes.lookup_variable(name) {
            Some(variable) => Arc::new(BoundExpression::Variable(variable)),
            None => {
                self.diagnostics.report_undefined_name(identifier.span(), name);
                Arc::new(BoundExpression::Error)
            },
        }
    }

    fn bind_assignment_expression(
        &mut self,
        identifier: &SyntaxToken,
        equals: &SyntaxToken,
        syntax: &ExpressionSyntax,
    ) -> Arc<BoundExpression> {
        let name = identifier.text.as_str();
        let expression = self.bind_expression(syntax, false);

        let variable = match self.scopes.lookup_variable(name) {
            Some(variable) => variable,
            None => {
                self.diagnostics.report_undefined_name(identifier.span(), name);
                return Arc::new(BoundExpression::Error);
            },
        };

        if variable.is_read_only() {
            self.diagnostics.report_cannot_assign(equals.span(), name);
        }

        let expression = self.convert(syntax.span(), expression, variable.ty(), false);
        Arc::new(BoundExpression::Assignment { variable, expression })
    }

    fn bind_unary_expression(
        &mut self,
        operator: &SyntaxToken,
        operand: &ExpressionSyntax,
    ) -> Arc<BoundExpression> {
        let operand = self.bind_expression(operand, false);
        if operand.ty() == Ty::Error {
            return Arc::new(BoundExpression::Error);
        }

        match UnaryOperator::bind(operator.kind, operand.ty()) {
            Some(operator) => Arc::new(BoundExpression::Unary { operator, operand }),
            None => {
                self.diagnostics.report_undefined_unary_operator(
                    operator.span(),
                    &operator.text,
                    operand.ty(),
                );
                Arc::new(BoundExpression::Error)
            },
        }
    }

    fn bind_binary_expression(
        &mut self,
        left: &ExpressionSyntax,
        operator: &SyntaxToken,
        right: &ExpressionSyntax,
    ) -> Arc<BoundExpression> {
        let left = self.bind_expression(left, false);
        let right = self.bind_expression(right, false);
        if left.ty() == Ty::Error || right.ty() == Ty::Error {
            return Arc::new(BoundExpression::Error);
        }

        match BinaryOperator::bind(operator.kind, left.ty(), right.ty()) {
            Some(operator) => Arc::new(BoundExpression::Binary { left, operator, right }),
            None => {
                self.diagnostics.report_undefined_binary_operator(
                    operator.span(),
                    &operator.text,
                    left.ty(),
                    right.ty(),
                );
                Arc::new(BoundExpression::Error)
            },
        }
    }

    fn bind_call_expression(
        &mut self,
        span: Span,
        identifier: &SyntaxToken,
        arguments: &SeparatedList<ExpressionSyntax>,
    ) -> Arc<BoundExpression> {
        let name = identifier.text.as_str();

        // `int(x)` and friends are casts, not calls
        if let (Some(ty), [argument]) = (Ty::lookup(name), arguments.items.as_slice()) {
            let expression = self.bind_expression(argument, false);
            return self.convert(argument.span(), expression, ty, true);
        }

        let bound: Vec<_> = arguments
            .iter()
            .map(|argument| self.bind_expression(argument, false))
            .collect();

        let function = match self.scopes.lookup_function(name) {
            Some(function) => function,
            None => {
                self.diagnostics.report_undefined_function(identifier.span(), name);
                return Arc::new(BoundExpression::Error);
            },
        };

        if bound.len() != function.parameters.len() {
            self.diagnostics.report_wrong_argument_count(
                span,
                function.name,
                function.parameters.len(),
                bound.len(),
            );
            return Arc::new(BoundExpression::Error);
        }

        let mismatch = bound
            .iter()
            .zip(arguments.iter())
            .zip(function.parameters.iter())
            .find(|((argument, _), parameter)| {
                argument.ty() != Ty::Error && argument.ty() != parameter.ty
            });

        if let Some(((argument, syntax), parameter)) = mismatch {
            self.diagnostics.report_wrong_argument_type(
                syntax.span(),
                parameter.name,
                parameter.ty,
                argument.ty(),
            );
            return Arc::new(BoundExpression::Error);
        }

        if bound.iter().any(|argument| argument.ty() == Ty::Error) {
            return Arc::new(BoundExpression::Error);
        }

        Arc::new(BoundExpression::Call { function, arguments: bound })
    }

    /// Converts `expression` to `ty`, reporting at `span` if it can't be.
    /// Conversions that may fail at runtime are only allowed if `explicit`;
    /// elsewhere the types must match exactly.
    fn convert(
        &mut self,
        span: Span,
        expression: Arc<BoundExpression>,
        ty: Ty,
        explicit: bool,
    ) -> Arc<BoundExpression> {
        let from = expression.ty();
        if from == Ty::Error || ty == Ty::Error {
            return Arc::new(BoundExpression::Error);
        }

        match Conversion::classify(from, ty) {
            Conversion::Identity => expression,
            Conversion::Explicit if explicit => {
                Arc::new(BoundExpression::Conversion { ty, expression })
            },
            _ => {
                self.diagnostics.report_cannot_convert(span, from, ty);
                Arc::new(BoundExpression::Error)
            },
        }
    }
}
