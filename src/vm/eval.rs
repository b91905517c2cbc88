use std::{collections::HashMap, slice, sync::Arc};

use log::{debug, trace};

use crate::{
    common::{data::Data, ty::Ty},
    construct::{
        bound::{BoundExpression, BoundStatement},
        operator::{BinaryOperator, BinaryOperatorKind, UnaryOperator, UnaryOperatorKind},
        symbol::LabelSymbol,
    },
    vm::{host::{self, Host}, trace::Trace, Variables},
};

/// Runs a lowered program.
///
/// The program is a flat list of statements,
/// so rather than walking it recursively,
/// the evaluator steps through it with an instruction pointer,
/// which gotos move around.
#[derive(Debug)]
pub struct Evaluator<'a> {
    statements: &'a [Arc<BoundStatement>],
    labels: HashMap<LabelSymbol, usize>,
    variables: &'a mut Variables,
    host: &'a mut dyn Host,
    ip: usize,
    last_value: Option<Data>,
}

impl<'a> Evaluator<'a> {
    /// Prepares a lowered program for evaluation.
    /// Anything that isn't a block is treated as a block of one.
    pub fn new(
        root: &'a Arc<BoundStatement>,
        variables: &'a mut Variables,
        host: &'a mut dyn Host,
    ) -> Evaluator<'a> {
        let statements = match root.as_ref() {
            BoundStatement::Block(statements) => statements.as_slice(),
            _ => slice::from_ref(root),
        };

        let labels = statements
            .iter()
            .enumerate()
            .filter_map(|(index, statement)| match statement.as_ref() {
                BoundStatement::Label(label) => Some((*label, index)),
                _ => None,
            })
            .collect();

        Evaluator {
            statements,
            labels,
            variables,
            host,
            ip: 0,
            last_value: None,
        }
    }

    /// Runs the program to completion,
    /// returning the value of the last expression statement executed.
    pub fn evaluate(mut self) -> Result<Option<Data>, Trace> {
        debug!(
            "Evaluating {} statement(s), {} label(s)",
            self.statements.len(),
            self.labels.len(),
        );

        let statements = self.statements;
        while let Some(statement) = statements.get(self.ip) {
            self.step(statement)?;
        }

        trace!("Evaluated to {:?}", self.last_value);
        Ok(self.last_value)
    }

    fn jump(&mut self, label: LabelSymbol) -> Result<(), Trace> {
        self.ip = *self.labels.get(&label).ok_or(Trace::UndefinedLabel(label))?;
        Ok(())
    }

    fn step(&mut self, statement: &BoundStatement) -> Result<(), Trace> {
        match statement {
            BoundStatement::VariableDeclaration { variable, initializer } => {
                let value = self.value(initializer)?;
                self.variables.insert(variable.clone(), value);
            },
            BoundStatement::Expression(expression) => {
                self.last_value = self.evaluate_expression(expression)?;
            },
            BoundStatement::Label(_) => (),
            BoundStatement::Goto(label) => return self.jump(*label),
            BoundStatement::ConditionalGoto { label, condition, jump_if_true } => {
                let condition = match self.value(condition)? {
                    Data::Boolean(b) => b,
                    _ => return Err(Trace::InvalidOperands),
                };
                if condition == *jump_if_true {
                    return self.jump(*label);
                }
            },
            structured => return Err(Trace::Unlowered(structured.name())),
        }

        self.ip += 1;
        Ok(())
    }

    /// Evaluates an expression that must produce a value.
    fn value(&mut self, expression: &BoundExpression) -> Result<Data, Trace> {
        self.evaluate_expression(expression)?
            .ok_or(Trace::MissingValue)
    }

    fn evaluate_expression(&mut self, expression: &BoundExpression) -> Result<Option<Data>, Trace> {
        let data = match expression {
            BoundExpression::Literal(data) => data.clone(),
            BoundExpression::Variable(variable) => self
                .variables
                .get(variable)
                .cloned()
                .ok_or_else(|| Trace::Unassigned(variable.name().to_string()))?,
            BoundExpression::Assignment { variable, expression } => {
                let value = self.value(expression)?;
                self.variables.insert(variable.clone(), value.clone());
                value
            },
            BoundExpression::Unary { operator, operand } => {
                let operand = self.value(operand)?;
                unary(operator, operand)?
            },
            BoundExpression::Binary { left, operator, right } => {
                // both sides are always evaluated, there is no short-circuiting
                let left = self.value(left)?;
                let right = self.value(right)?;
                binary(operator, left, right)?
            },
            BoundExpression::Call { function, arguments } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| self.value(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                return host::call(&mut *self.host, *function, &arguments);
            },
            BoundExpression::Conversion { ty, expression } => {
                let value = self.value(expression)?;
                convert(value, *ty)?
            },
            BoundExpression::Error => return Err(Trace::Unlowered("ErrorExpression")),
        };

        Ok(Some(data))
    }
}

fn unary(operator: &UnaryOperator, operand: Data) -> Result<Data, Trace> {
    use UnaryOperatorKind::*;

    let result = match (operator.kind, operand) {
        (Identity, Data::Integer(n)) => Data::Integer(n),
        (Negation, Data::Integer(n)) => Data::Integer(n.wrapping_neg()),
        (OnesComplement, Data::Integer(n)) => Data::Integer(!n),
        (LogicalNegation, Data::Boolean(b)) => Data::Boolean(!b),
        _ => return Err(Trace::InvalidOperands),
    };

    Ok(result)
}

fn binary(operator: &BinaryOperator, left: Data, right: Data) -> Result<Data, Trace> {
    use BinaryOperatorKind::*;

    let result = match (operator.kind, left, right) {
        (Addition, Data::Integer(l), Data::Integer(r)) => Data::Integer(l.wrapping_add(r)),
        (Addition, Data::String(l), Data::String(r)) => Data::String(l + &r),
        (Subtraction, Data::Integer(l), Data::Integer(r)) => Data::Integer(l.wrapping_sub(r)),
        (Multiplication, Data::Integer(l), Data::Integer(r)) => Data::Integer(l.wrapping_mul(r)),
        (Division, Data::Integer(_), Data::Integer(0)) => return Err(Trace::DivisionByZero),
        (Division, Data::Integer(l), Data::Integer(r)) => Data::Integer(l.wrapping_div(r)),

        (BitwiseAnd, Data::Integer(l), Data::Integer(r)) => Data::Integer(l & r),
        (BitwiseOr, Data::Integer(l), Data::Integer(r)) => Data::Integer(l | r),
        (BitwiseXor, Data::Integer(l), Data::Integer(r)) => Data::Integer(l ^ r),
        (BitwiseAnd | LogicalAnd, Data::Boolean(l), Data::Boolean(r)) => Data::Boolean(l & r),
        (BitwiseOr | LogicalOr, Data::Boolean(l), Data::Boolean(r)) => Data::Boolean(l | r),
        (BitwiseXor, Data::Boolean(l), Data::Boolean(r)) => Data::Boolean(l ^ r),

        (Equals, l, r) if l.ty() == r.ty() => Data::Boolean(l == r),
        (NotEquals, l, r) if l.ty() == r.ty() => Data::Boolean(l != r),
        (Less, Data::Integer(l), Data::Integer(r)) => Data::Boolean(l < r),
        (LessOrEquals, Data::Integer(l), Data::Integer(r)) => Data::Boolean(l <= r),
        (Greater, Data::Integer(l), Data::Integer(r)) => Data::Boolean(l > r),
        (GreaterOrEquals, Data::Integer(l), Data::Integer(r)) => Data::Boolean(l >= r),

        _ => return Err(Trace::InvalidOperands),
    };

    Ok(result)
}

/// Explicit conversions, which fail if a string doesn't hold the target type.
fn convert(value: Data, ty: Ty) -> Result<Data, Trace> {
    let invalid = |value: &str| Trace::InvalidConversion { value: value.to_string(), ty };

    let result = match (value, ty) {
        (value, ty) if value.ty() == ty => value,
        (value @ (Data::Integer(_) | Data::Boolean(_)), Ty::String) => {
            Data::String(value.to_string())
        },
        (Data::String(s), Ty::Integer) => {
            Data::Integer(s.trim().parse().map_err(|_| invalid(&s))?)
        },
        (Data::String(s), Ty::Boolean) => match s.trim().to_lowercase().as_str() {
            "true" => Data::Boolean(true),
            "false" => Data::Boolean(false),
            _ => return Err(invalid(&s)),
        },
        (value, _) => return Err(invalid(&value.to_string())),
    };

    Ok(result)
}
