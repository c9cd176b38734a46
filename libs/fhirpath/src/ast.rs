//! Abstract Syntax Tree (AST) representation
//!
//! The AST is the direct result of parsing. Names are still strings:
//! functions and constants are resolved when the tree is lowered to HIR
//! (see [`crate::compiler`]).

use rust_decimal::Decimal;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    String(String),
    /// Number without a decimal point
    Integer(i64),
    /// Number with a decimal point, or an integer too large for `i64`
    Decimal(Decimal),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Boolean(b) => Value::boolean(*b),
            Literal::String(s) => Value::string(s.as_str()),
            Literal::Integer(i) => Value::integer(*i),
            Literal::Decimal(d) => Value::decimal(*d),
        }
    }
}

/// Binary operators, shared with HIR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Literal(Literal),

    /// `%name`; `position` is where the `%` stands
    Constant { name: String, position: usize },

    /// `$this`
    This,

    /// Member access by name, either at the start of a path or after a dot
    Member { name: String },

    Function {
        name: String,
        args: Vec<AstNode>,
        position: usize,
    },

    /// `target.invocation`, where the invocation is a member, function or `$this`
    Invoke {
        target: Box<AstNode>,
        invocation: Box<AstNode>,
    },

    Binary {
        op: BinaryOperator,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },

    /// Prefix `-`
    Negate(Box<AstNode>),

    /// Parenthesized expression
    Group(Box<AstNode>),
}

impl AstNode {
    pub(crate) fn binary(op: BinaryOperator, left: AstNode, right: AstNode) -> Self {
        AstNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Dotted name of a type specifier such as `Quantity` or `FHIR.Quantity`,
    /// or `None` when the node is not a plain identifier path.
    pub fn as_qualified_identifier(&self) -> Option<String> {
        match self {
            AstNode::Member { name } => Some(name.clone()),
            AstNode::Invoke { target, invocation } => {
                let head = target.as_qualified_identifier()?;
                let tail = invocation.as_qualified_identifier()?;
                Some(format!("{}.{}", head, tail))
            }
            _ => None,
        }
    }
}
