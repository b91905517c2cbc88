use std::sync::Arc;

use crate::{
    common::ty::Ty,
    construct::{
        bound::{BoundExpression, BoundStatement},
        operator::{BinaryOperator, UnaryOperator},
        symbol::{FunctionSymbol, LabelSymbol, VariableSymbol},
    },
};

fn same<T>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b)
}

fn all_same<T>(a: &[Arc<T>], b: &[Arc<T>]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| same(a, b))
}

/// Walks a bound tree, rebuilding it bottom up.
///
/// Every method defaults to rewriting the children of its node
/// and handing back the original node if none of them changed,
/// so a rewrite only allocates along the paths it actually touches.
/// Implementors override the methods for the nodes they care about.
///
/// Each `rewrite_*` method takes the node being rewritten,
/// along with its already destructured fields.
pub trait BoundTreeRewriter {
    fn rewrite_statement(&mut self, node: &Arc<BoundStatement>) -> Arc<BoundStatement> {
        match node.as_ref() {
            BoundStatement::Block(statements) => self.rewrite_block_statement(node, statements),
            BoundStatement::VariableDeclaration { variable, initializer } => {
                self.rewrite_variable_declaration(node, variable, initializer)
            },
            BoundStatement::If { condition, then_statement, else_statement } => {
                self.rewrite_if_statement(node, condition, then_statement, else_statement.as_ref())
            },
            BoundStatement::While { condition, body } => {
                self.rewrite_while_statement(node, condition, body)
            },
            BoundStatement::DoWhile { body, condition } => {
                self.rewrite_do_while_statement(node, body, condition)
            },
            BoundStatement::For { variable, lower_bound, upper_bound, body } => {
                self.rewrite_for_statement(node, variable, lower_bound, upper_bound, body)
            },
            BoundStatement::Label(label) => self.rewrite_label_statement(node, *label),
            BoundStatement::Goto(label) => self.rewrite_goto_statement(node, *label),
            BoundStatement::ConditionalGoto { label, condition, jump_if_true } => {
                self.rewrite_conditional_goto_statement(node, *label, condition, *jump_if_true)
            },
            BoundStatement::Expression(expression) => {
                self.rewrite_expression_statement(node, expression)
            },
        }
    }

    fn rewrite_block_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        statements: &[Arc<BoundStatement>],
    ) -> Arc<BoundStatement> {
        let rewritten: Vec<_> = statements
            .iter()
            .map(|statement| self.rewrite_statement(statement))
            .collect();

        if all_same(statements, &rewritten) {
            return Arc::clone(node);
        }
        Arc::new(BoundStatement::Block(rewritten))
    }

    fn rewrite_variable_declaration(
        &mut self,
        node: &Arc<BoundStatement>,
        variable: &VariableSymbol,
        initializer: &Arc<BoundExpression>,
    ) -> Arc<BoundStatement> {
        let rewritten = self.rewrite_expression(initializer);
        if same(initializer, &rewritten) {
            return Arc::clone(node);
        }

        Arc::new(BoundStatement::VariableDeclaration {
            variable: variable.clone(),
            initializer: rewritten,
        })
    }

    fn rewrite_if_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
        then_statement: &Arc<BoundStatement>,
        else_statement: Option<&Arc<BoundStatement>>,
    ) -> Arc<BoundStatement> {
        let new_condition = self.rewrite_expression(condition);
        let new_then = self.rewrite_statement(then_statement);
        let new_else = else_statement.map(|statement| self.rewrite_statement(statement));

        let else_same = match (else_statement, &new_else) {
            (Some(old), Some(new)) => same(old, new),
            _ => true,
        };
        if same(condition, &new_condition) && same(then_statement, &new_then) && else_same {
            return Arc::clone(node);
        }

        Arc::new(BoundStatement::If {
            condition: new_condition,
            then_statement: new_then,
            else_statement: new_else,
        })
    }

    fn rewrite_while_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
        body: &Arc<BoundStatement>,
    ) -> Arc<BoundStatement> {
        let new_condition = self.rewrite_expression(condition);
        let new_body = self.rewrite_statement(body);
        if same(condition, &new_condition) && same(body, &new_body) {
            return Arc::clone(node);
        }

        Arc::new(BoundStatement::While { condition: new_condition, body: new_body })
    }

    fn rewrite_do_while_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        body: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
    ) -> Arc<BoundStatement> {
        let new_body = self.rewrite_statement(body);
        let new_condition = self.rewrite_expression(condition);
        if same(body, &new_body) && same(condition, &new_condition) {
            return Arc::clone(node);
        }

        Arc::new(BoundStatement::DoWhile { body: new_body, condition: new_condition })
    }

    fn rewrite_for_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        variable: &VariableSymbol,
        lower_bound: &Arc<BoundExpression>,
        upper_bound: &Arc<BoundExpression>,
        body: &Arc<BoundStatement>,
    ) -> Arc<BoundStatement> {
        let new_lower = self.rewrite_expression(lower_bound);
        let new_upper = self.rewrite_expression(upper_bound);
        let new_body = self.rewrite_statement(body);
        if same(lower_bound, &new_lower) && same(upper_bound, &new_upper) && same(body, &new_body)
        {
            return Arc::clone(node);
        }

        Arc::new(BoundStatement::For {
            variable: variable.clone(),
            lower_bound: new_lower,
            upper_bound: new_upper,
            body: new_body,
        })
    }

    fn rewrite_label_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        _label: LabelSymbol,
    ) -> Arc<BoundStatement> {
        Arc::clone(node)
    }

    fn rewrite_goto_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        _label: LabelSymbol,
    ) -> Arc<BoundStatement> {
        Arc::clone(node)
    }

    fn rewrite_conditional_goto_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        label: LabelSymbol,
        condition: &Arc<BoundExpression>,
        jump_if_true: bool,
    ) -> Arc<BoundStatement> {
        let new_condition = self.rewrite_expression(condition);
        if same(condition, &new_condition) {
            return Arc::clone(node);
        }

        Arc::new(BoundStatement::ConditionalGoto {
            label,
            condition: new_condition,
            jump_if_true,
        })
    }

    fn rewrite_expression_statement(
        &mut self,
        node: &Arc<BoundStatement>,
        expression: &Arc<BoundExpression>,
    ) -> Arc<BoundStatement> {
        let rewritten = self.rewrite_expression(expression);
        if same(expression, &rewritten) {
            return Arc::clone(node);
        }
        Arc::new(BoundStatement::Expression(rewritten))
    }

    fn rewrite_expression(&mut self, node: &Arc<BoundExpression>) -> Arc<BoundExpression> {
        match node.as_ref() {
            BoundExpression::Error
            | BoundExpression::Literal(_)
            | BoundExpression::Variable(_) => Arc::clone(node),
            BoundExpression::Assignment { variable, expression } => {
                self.rewrite_assignment_expression(node, variable, expression)
            },
            BoundExpression::Unary { operator, operand } => {
                self.rewrite_unary_expression(node, *operator, operand)
            },
            BoundExpression::Binary { left, operator, right } => {
                self.rewrite_binary_expression(node, left, *operator, right)
            },
            BoundExpression::Call { function, arguments } => {
                self.rewrite_call_expression(node, *function, arguments)
            },
            BoundExpression::Conversion { ty, expression } => {
                self.rewrite_conversion_expression(node, *ty, expression)
            },
        }
    }

    fn rewrite_assignment_expression(
        &mut self,
        node: &Arc<BoundExpression>,
        variable: &VariableSymbol,
        expression: &Arc<BoundExpression>,
    ) -> Arc<BoundExpression> {
        let rewritten = self.rewrite_expression(expression);
        if same(expression, &rewritten) {
            return Arc::clone(node);
        }

        Arc::new(BoundExpression::Assignment {
            variable: variable.clone(),
            expression: rewritten,
        })
    }

    fn rewrite_unary_expression(
        &mut self,
        node: &Arc<BoundExpression>,
        operator: UnaryOperator,
        operand: &Arc<BoundExpression>,
    ) -> Arc<BoundExpression> {
        let rewritten = self.rewrite_expression(operand);
        if same(operand, &rewritten) {
            return Arc::clone(node);
        }
        Arc::new(BoundExpression::Unary { operator, operand: rewritten })
    }

    fn rewrite_binary_expression(
        &mut self,
        node: &Arc<BoundExpression>,
        left: &Arc<BoundExpression>,
        operator: BinaryOperator,
        right: &Arc<BoundExpression>,
    ) -> Arc<BoundExpression> {
        let new_left = self.rewrite_expression(left);
        let new_right = self.rewrite_expression(right);
        if same(left, &new_left) && same(right, &new_right) {
            return Arc::clone(node);
        }

        Arc::new(BoundExpression::Binary { left: new_left, operator, right: new_right })
    }

    fn rewrite_call_expression(
        &mut self,
        node: &Arc<BoundExpression>,
        function: &'static FunctionSymbol,
        arguments: &[Arc<BoundExpression>],
    ) -> Arc<BoundExpression> {
        let rewritten: Vec<_> = arguments
            .iter()
            .map(|argument| self.rewrite_expression(argument))
            .collect();

        if all_same(arguments, &rewritten) {
            return Arc::clone(node);
        }
        Arc::new(BoundExpression::Call { function, arguments: rewritten })
    }

    fn rewrite_conversion_expression(
        &mut self,
        node: &Arc<BoundExpression>,
        ty: Ty,
        expression: &Arc<BoundExpression>,
    ) -> Arc<BoundExpression> {
        let rewritten = self.rewrite_expression(expression);
        if same(expression, &rewritten) {
            return Arc::clone(node);
        }
        Arc::new(BoundExpression::Conversion { ty, expression: rewritten })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{common::data::Data, construct::symbol::PRINT};

    /// Does nothing but recurse.
    struct Identity;
    impl BoundTreeRewriter for Identity {}

    /// Replaces every `1` with a `2`.
    struct Twos;
    impl BoundTreeRewriter for Twos {
        fn rewrite_expression(&mut self, node: &Arc<BoundExpression>) -> Arc<BoundExpression> {
            match node.as_ref() {
                BoundExpression::Literal(Data::Integer(1)) => {
                    Arc::new(BoundExpression::Literal(Data::Integer(2)))
                },
                BoundExpression::Conversion { ty, expression } => {
                    self.rewrite_conversion_expression(node, *ty, expression)
                },
                _ => Arc::clone(node),
            }
        }
    }

    fn sample() -> Arc<BoundStatement> {
        let x = VariableSymbol::new("x", false, Ty::Integer);
        let one = Arc::new(BoundExpression::Literal(Data::Integer(1)));
        let print = Arc::new(BoundExpression::Call {
            function: &PRINT,
            arguments: vec![Arc::new(BoundExpression::Literal(Data::from("hi")))],
        });

        Arc::new(BoundStatement::Block(vec![
            Arc::new(BoundStatement::VariableDeclaration {
                variable: x,
                initializer: Arc::new(BoundExpression::Conversion {
                    ty: Ty::Integer,
                    expression: one,
                }),
            }),
            Arc::new(BoundStatement::While {
                condition: Arc::new(BoundExpression::Literal(Data::Boolean(false))),
                body: Arc::new(BoundStatement::Expression(print)),
            }),
        ]))
    }

    #[test]
    fn unchanged_trees_are_shared() {
        let tree = sample();
        let rewritten = Identity.rewrite_statement(&tree);
        assert!(Arc::ptr_eq(&tree, &rewritten));
    }

    #[test]
    fn only_changed_paths_are_rebuilt() {
        let tree = sample();
        let rewritten = Twos.rewrite_statement(&tree);
        assert!(!Arc::ptr_eq(&tree, &rewritten));

        let (BoundStatement::Block(old), BoundStatement::Block(new)) =
            (tree.as_ref(), rewritten.as_ref())
        else {
            panic!("expected blocks");
        };

        // the declaration held the `1`, the loop didn't
        assert!(!Arc::ptr_eq(&old[0], &new[0]));
        assert!(Arc::ptr_eq(&old[1], &new[1]));

        match new[0].as_ref() {
            BoundStatement::VariableDeclaration { initializer, .. } => match initializer.as_ref() {
                BoundExpression::Conversion { expression, .. } => {
                    assert_eq!(expression.as_ref(), &BoundExpression::Literal(Data::Integer(2)));
                },
                other => panic!("unexpected expression {:?}", other),
            },
            other => panic!("unexpected statement {:?}", other),
        }
    }
}
