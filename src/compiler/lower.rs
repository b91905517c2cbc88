use std::sync::Arc;

use log::trace;

use crate::{
    common::{data::Data, ty::Ty},
    compiler::rewrite::BoundTreeRewriter,
    construct::{
        bound::{BoundExpression, BoundStatement},
        operator::{BinaryOperator, BinaryOperatorKind},
        symbol::{LabelSymbol, VariableSymbol},
        token::SyntaxKind,
    },
};

/// Rewrites structured control flow into labels and gotos,
/// then flattens the result into a single block.
/// The evaluator only ever sees the output of this pass.
#[derive(Debug, Default)]
pub struct Lowerer {
    label_count: usize,
}

impl Lowerer {
    pub fn new() -> Lowerer {
        Lowerer::default()
    }

    /// Lowers a bound statement into a flat block
    /// containing no nested blocks and no structured control flow.
    pub fn lower(statement: &Arc<BoundStatement>) -> Arc<BoundStatement> {
        let mut lowerer = Lowerer::new();
        let lowered = lowerer.rewrite_statement(statement);
        trace!("Lowered using {} label(s)", lowerer.label_count);
        flatten(lowered)
    }

    fn generate_label(&mut self) -> LabelSymbol {
        self.label_count += 1;
        LabelSymbol(self.label_count)
    }

    /// Lowers a freshly built block,
    /// which may still contain structured statements.
    fn relower(&mut self, statements: Vec<BoundStatement>) -> Arc<BoundStatement> {
        let block = Arc::new(BoundStatement::Block(
            statements.into_iter().map(Arc::new).collect(),
        ));
        self.rewrite_statement(&block)
    }
}

impl BoundTreeRewriter for Lowerer {
    /// ```plain
    /// if <condition>         gotoFalse <condition> end
    ///     <then>       -->   <then>
    ///                        end:
    /// ```
    /// and with an else clause:
    /// ```plain
    /// if <condition>         gotoFalse <condition> else
    ///     <then>             <then>
    /// else             -->   goto end
    ///     <else>             else:
    ///                        <else>
    ///                        end:
    /// ```
    fn rewrite_if_statement(
        &mut self,
        _node: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
        then_statement: &Arc<BoundStatement>,
        else_statement: Option<&Arc<BoundStatement>>,
    ) -> Arc<BoundStatement> {
        let statements = match else_statement {
            None => {
                let end = self.generate_label();
                vec![
                    BoundStatement::ConditionalGoto {
                        label: end,
                        condition: Arc::clone(condition),
                        jump_if_true: false,
                    },
                    BoundStatement::clone(then_statement),
                    BoundStatement::Label(end),
                ]
            },
            Some(else_statement) => {
                let otherwise = self.generate_label();
                let end = self.generate_label();
                vec![
                    BoundStatement::ConditionalGoto {
                        label: otherwise,
                        condition: Arc::clone(condition),
                        jump_if_true: false,
                    },
                    BoundStatement::clone(then_statement),
                    BoundStatement::Goto(end),
                    BoundStatement::Label(otherwise),
                    BoundStatement::clone(else_statement),
                    BoundStatement::Label(end),
                ]
            },
        };

        self.relower(statements)
    }

    /// ```plain
    /// while <condition>      goto check
    ///     <body>             continue:
    ///                  -->   <body>
    ///                        check:
    ///                        gotoTrue <condition> continue
    ///                        end:
    /// ```
    fn rewrite_while_statement(
        &mut self,
        _node: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
        body: &Arc<BoundStatement>,
    ) -> Arc<BoundStatement> {
        let r#continue = self.generate_label();
        let check = self.generate_label();
        let end = self.generate_label();

        self.relower(vec![
            BoundStatement::Goto(check),
            BoundStatement::Label(r#continue),
            BoundStatement::clone(body),
            BoundStatement::Label(check),
            BoundStatement::ConditionalGoto {
                label: r#continue,
                condition: Arc::clone(condition),
                jump_if_true: true,
            },
            BoundStatement::Label(end),
        ])
    }

    /// ```plain
    /// do                     continue:
    ///     <body>       -->   <body>
    /// while <condition>      gotoTrue <condition> continue
    /// ```
    fn rewrite_do_while_statement(
        &mut self,
        _node: &Arc<BoundStatement>,
        body: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
    ) -> Arc<BoundStatement> {
        let r#continue = self.generate_label();

        self.relower(vec![
            BoundStatement::Label(r#continue),
            BoundStatement::clone(body),
            BoundStatement::ConditionalGoto {
                label: r#continue,
                condition: Arc::clone(condition),
                jump_if_true: true,
            },
        ])
    }

    /// ```plain
    /// for <var> = <lower> to <upper>       {
    ///     <body>                               var <var> = <lower>
    ///                                          while <var> <= <upper>
    ///                                  -->     {
    ///                                              <body>
    ///                                              <var> = <var> + 1
    ///                                          }
    ///                                      }
    /// ```
    /// The upper bound is evaluated again on every iteration.
    fn rewrite_for_statement(
        &mut self,
        _node: &Arc<BoundStatement>,
        variable: &VariableSymbol,
        lower_bound: &Arc<BoundExpression>,
        upper_bound: &Arc<BoundExpression>,
        body: &Arc<BoundStatement>,
    ) -> Arc<BoundStatement> {
        let reference = Arc::new(BoundExpression::Variable(variable.clone()));
        let condition = Arc::new(BoundExpression::Binary {
            left: Arc::clone(&reference),
            operator: BinaryOperator::new(
                SyntaxKind::LessOrEqualsToken,
                BinaryOperatorKind::LessOrEquals,
                Ty::Integer,
                Ty::Boolean,
            ),
            right: Arc::clone(upper_bound),
        });
        let increment = Arc::new(BoundStatement::Expression(Arc::new(
            BoundExpression::Assignment {
                variable: variable.clone(),
                expression: Arc::new(BoundExpression::Binary {
                    left: reference,
                    operator: BinaryOperator::new(
                        SyntaxKind::PlusToken,
                        BinaryOperatorKind::Addition,
                        Ty::Integer,
                        Ty::Integer,
                    ),
                    right: Arc::new(BoundExpression::Literal(Data::Integer(1))),
                }),
            },
        )));

        self.relower(vec![
            BoundStatement::VariableDeclaration {
                variable: variable.clone(),
                initializer: Arc::clone(lower_bound),
            },
            BoundStatement::While {
                condition,
                body: Arc::new(BoundStatement::Block(vec![Arc::clone(body), increment])),
            },
        ])
    }
}

/// Inlines every nested block, depth first, into one flat block.
/// A block that is already flat is returned as is.
fn flatten(statement: Arc<BoundStatement>) -> Arc<BoundStatement> {
    if let BoundStatement::Block(statements) = statement.as_ref() {
        let nested = statements
            .iter()
            .any(|s| matches!(s.as_ref(), BoundStatement::Block(_)));
        if !nested {
            return statement;
        }
    }

    let mut flat = vec![];
    let mut stack = vec![statement];

    while let Some(current) = stack.pop() {
        match current.as_ref() {
            BoundStatement::Block(statements) => {
                stack.extend(statements.iter().rev().cloned());
            },
            _ => flat.push(current),
        }
    }

    Arc::new(BoundStatement::Block(flat))
}
