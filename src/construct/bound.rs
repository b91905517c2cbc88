use std::{
    io::{self, Write},
    sync::Arc,
};

use crate::{
    common::{data::Data, ty::Ty},
    construct::{
        operator::{BinaryOperator, UnaryOperator},
        symbol::{FunctionSymbol, LabelSymbol, VariableSymbol},
    },
};

/// A type checked expression.
/// Children are shared, so a rewrite that leaves a subtree alone
/// can hand back the very same allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpression {
    /// Stands in for anything that failed to bind.
    Error,
    Literal(Data),
    Variable(VariableSymbol),
    Assignment {
        variable: VariableSymbol,
        expression: Arc<BoundExpression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Arc<BoundExpression>,
    },
    Binary {
        left: Arc<BoundExpression>,
        operator: BinaryOperator,
        right: Arc<BoundExpression>,
    },
    Call {
        function: &'static FunctionSymbol,
        arguments: Vec<Arc<BoundExpression>>,
    },
    Conversion {
        ty: Ty,
        expression: Arc<BoundExpression>,
    },
}

impl BoundExpression {
    pub fn ty(&self) -> Ty {
        match self {
            BoundExpression::Error => Ty::Error,
            BoundExpression::Literal(data) => data.ty(),
            BoundExpression::Variable(variable) => variable.ty(),
            BoundExpression::Assignment { variable, .. } => variable.ty(),
            BoundExpression::Unary { operator, .. } => operator.result,
            BoundExpression::Binary { operator, .. } => operator.result,
            BoundExpression::Call { function, .. } => function.ty,
            BoundExpression::Conversion { ty, .. } => *ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundStatement {
    Block(Vec<Arc<BoundStatement>>),
    VariableDeclaration {
        variable: VariableSymbol,
        initializer: Arc<BoundExpression>,
    },
    If {
        condition: Arc<BoundExpression>,
        then_statement: Arc<BoundStatement>,
        else_statement: Option<Arc<BoundStatement>>,
    },
    While {
        condition: Arc<BoundExpression>,
        body: Arc<BoundStatement>,
    },
    DoWhile {
        body: Arc<BoundStatement>,
        condition: Arc<BoundExpression>,
    },
    For {
        variable: VariableSymbol,
        lower_bound: Arc<BoundExpression>,
        upper_bound: Arc<BoundExpression>,
        body: Arc<BoundStatement>,
    },

    // Only produced by lowering
    Label(LabelSymbol),
    Goto(LabelSymbol),
    ConditionalGoto {
        label: LabelSymbol,
        condition: Arc<BoundExpression>,
        jump_if_true: bool,
    },

    Expression(Arc<BoundExpression>),
}

impl BoundStatement {
    pub fn name(&self) -> &'static str {
        match self {
            BoundStatement::Block(_) => "BlockStatement",
            BoundStatement::VariableDeclaration { .. } => "VariableDeclaration",
            BoundStatement::If { .. } => "IfStatement",
            BoundStatement::While { .. } => "WhileStatement",
            BoundStatement::DoWhile { .. } => "DoWhileStatement",
            BoundStatement::For { .. } => "ForStatement",
            BoundStatement::Label(_) => "LabelStatement",
            BoundStatement::Goto(_) => "GotoStatement",
            BoundStatement::ConditionalGoto { .. } => "ConditionalGotoStatement",
            BoundStatement::Expression(_) => "ExpressionStatement",
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        BoundNode::Statement(self).pretty_print(writer, "", true)
    }
}

/// A borrowed view over any bound node, used to walk the tree when printing.
#[derive(Debug, Clone, Copy)]
pub enum BoundNode<'a> {
    Statement(&'a BoundStatement),
    Expression(&'a BoundExpression),
}

impl<'a> BoundNode<'a> {
    fn statement(statement: &'a Arc<BoundStatement>) -> Self {
        BoundNode::Statement(statement.as_ref())
    }

    fn expression(expression: &'a Arc<BoundExpression>) -> Self {
        BoundNode::Expression(expression.as_ref())
    }

    pub fn children(&self) -> Vec<BoundNode<'a>> {
        match *self {
            BoundNode::Statement(statement) => match statement {
                BoundStatement::Block(statements) => {
                    statements.iter().map(BoundNode::statement).collect()
                },
                BoundStatement::VariableDeclaration { initializer, .. } => {
                    vec![BoundNode::expression(initializer)]
                },
                BoundStatement::If { condition, then_statement, else_statement } => {
                    let mut children = vec![
                        BoundNode::expression(condition),
                        BoundNode::statement(then_statement),
                    ];
                    children.extend(else_statement.iter().map(BoundNode::statement));
                    children
                },
                BoundStatement::While { condition, body } => {
                    vec![BoundNode::expression(condition), BoundNode::statement(body)]
                },
                BoundStatement::DoWhile { body, condition } => {
                    vec![BoundNode::statement(body), BoundNode::expression(condition)]
                },
                BoundStatement::For { lower_bound, upper_bound, body, .. } => vec![
                    BoundNode::expression(lower_bound),
                    BoundNode::expression(upper_bound),
                    BoundNode::statement(body),
                ],
                BoundStatement::Label(_) | BoundStatement::Goto(_) => vec![],
                BoundStatement::ConditionalGoto { condition, .. } => {
                    vec![BoundNode::expression(condition)]
                },
                BoundStatement::Expression(expression) => {
                    vec![BoundNode::expression(expression)]
                },
            },
            BoundNode::Expression(expression) => match expression {
                BoundExpression::Error
                | BoundExpression::Literal(_)
                | BoundExpression::Variable(_) => vec![],
                BoundExpression::Assignment { expression, .. }
                | BoundExpression::Conversion { expression, .. } => {
                    vec![BoundNode::expression(expression)]
                },
                BoundExpression::Unary { operand, .. } => vec![BoundNode::expression(operand)],
                BoundExpression::Binary { left, right, .. } => {
                    vec![BoundNode::expression(left), BoundNode::expression(right)]
                },
                BoundExpression::Call { arguments, .. } => {
                    arguments.iter().map(BoundNode::expression).collect()
                },
            },
        }
    }

    /// One line describing the node itself, without its children.
    fn header(&self) -> String {
        match *self {
            BoundNode::Statement(statement) => match statement {
                BoundStatement::VariableDeclaration { variable, .. } => format!(
                    "{} {}{}: {}",
                    statement.name(),
                    if variable.is_read_only() { "let " } else { "var " },
                    variable,
                    variable.ty(),
                ),
                BoundStatement::For { variable, .. } => {
                    format!("{} {}", statement.name(), variable)
                },
                BoundStatement::Label(label) | BoundStatement::Goto(label) => {
                    format!("{} {}", statement.name(), label)
                },
                BoundStatement::ConditionalGoto { label, jump_if_true, .. } => format!(
                    "{} {} {}",
                    statement.name(),
                    label,
                    if *jump_if_true { "if true" } else { "if false" },
                ),
                _ => statement.name().to_string(),
            },
            BoundNode::Expression(expression) => {
                let ty = expression.ty();
                match expression {
                    BoundExpression::Error => format!("ErrorExpression {}", ty),
                    BoundExpression::Literal(data) => {
                        format!("LiteralExpression {} {:?}", ty, data)
                    },
                    BoundExpression::Variable(variable) => {
                        format!("VariableExpression {} {}", ty, variable)
                    },
                    BoundExpression::Assignment { variable, .. } => {
                        format!("AssignmentExpression {} {}", ty, variable)
                    },
                    BoundExpression::Unary { operator, .. } => {
                        format!("UnaryExpression {} {}", ty, operator)
                    },
                    BoundExpression::Binary { operator, .. } => {
                        format!("BinaryExpression {} {}", ty, operator)
                    },
                    BoundExpression::Call { function, .. } => {
                        format!("CallExpression {} {}", ty, function)
                    },
                    BoundExpression::Conversion { .. } => {
                        format!("ConversionExpression {}", ty)
                    },
                }
            },
        }
    }

    fn pretty_print<W: Write>(
        &self,
        writer: &mut W,
        indent: &str,
        is_last: bool,
    ) -> io::Result<()> {
        let marker = if is_last { "└──" } else { "├──" };
        writeln!(writer, "{}{}{}", indent, marker, self.header())?;

        let indent = format!("{}{}", indent, if is_last { "    " } else { "│   " });
        let children = self.children();
        for (index, child) in children.iter().enumerate() {
            child.pretty_print(writer, &indent, index + 1 == children.len())?;
        }

        Ok(())
    }
}
