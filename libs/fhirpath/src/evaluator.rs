//! Tree-walking evaluator over HIR
//!
//! Every node evaluates to a [`Collection`]. Navigation distributes over the
//! items of its input and flattens the results in encounter order.

mod functions;
mod navigation;
mod operations;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::Result;
use crate::hir::{BinaryOperator, HirNode};
use crate::value::{Collection, Value};

pub(crate) struct Evaluator<'a> {
    engine: &'a Engine,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    pub(crate) fn engine(&self) -> &Engine {
        self.engine
    }

    pub(crate) fn evaluate(&self, node: &HirNode, ctx: &Context) -> Result<Collection> {
        match node {
            HirNode::Literal(value) => Ok(Collection::singleton(value.clone())),
            HirNode::This => Ok(ctx.this.clone()),
            HirNode::Resource => Ok(Collection::singleton(ctx.resource.clone())),
            HirNode::Path { base, name } => match base {
                Some(base) => {
                    let input = self.evaluate(base, ctx)?;
                    Ok(navigation::navigate(&input, name))
                }
                None => Ok(navigation::navigate_from_focus(ctx, name)),
            },
            HirNode::Function {
                base,
                function,
                args,
            } => {
                let input = match base {
                    Some(base) => self.evaluate(base, ctx)?,
                    None => ctx.this.clone(),
                };
                functions::execute_function(self, *function, input, args, ctx)
            }
            HirNode::Binary { op, left, right } => self.evaluate_binary(*op, left, right, ctx),
            HirNode::Negate(inner) => operations::negate(&self.evaluate(inner, ctx)?),
        }
    }

    fn evaluate_binary(
        &self,
        op: BinaryOperator,
        left: &HirNode,
        right: &HirNode,
        ctx: &Context,
    ) -> Result<Collection> {
        let left = self.evaluate(left, ctx)?;

        match op {
            BinaryOperator::And | BinaryOperator::Or => {
                let l = left.to_boolean(op.symbol())?;
                // false and _ = false, true or _ = true
                let decided = match op {
                    BinaryOperator::And => l == Some(false),
                    _ => l == Some(true),
                };
                if decided {
                    return Ok(Collection::singleton(Value::boolean(op == BinaryOperator::Or)));
                }
                let r = self.evaluate(right, ctx)?.to_boolean(op.symbol())?;
                Ok(operations::three_valued(op, l, r))
            }
            _ => {
                let right = self.evaluate(right, ctx)?;
                operations::execute_binary_op(op, &left, &right, self.engine.options())
            }
        }
    }
}
