use crate::ast::{Ast, BinOp, UnOp, Var};
use crate::functions::{NativeFn, power};

/// Concrete values for the two bound variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bindings {
    pub index: i64,
    pub total: i64,
}

impl Bindings {
    pub fn new(index: i64, total: i64) -> Self {
        Self { index, total }
    }
}

/// Reference evaluator: walks the tree directly.
///
/// Never fails. Domain errors and division by zero surface as NaN or
/// infinities following IEEE-754.
pub fn evaluate(ast: &Ast, bindings: Bindings) -> f64 {
    walk(ast, bindings.index as f64, bindings.total as f64)
}

fn walk(ast: &Ast, index: f64, total: f64) -> f64 {
    match ast {
        Ast::Literal(v) => *v,
        Ast::Variable(Var::Index) => index,
        Ast::Variable(Var::Total) => total,
        Ast::Unary { op, operand } => {
            let v = walk(operand, index, total);
            match op {
                UnOp::Neg => -v,
                UnOp::Plus => v,
            }
        }
        Ast::Binary { op, lhs, rhs } => {
            let a = walk(lhs, index, total);
            let b = walk(rhs, index, total);
            apply_binary(*op, a, b)
        }
        Ast::Call { func, args, .. } => match (func, args.as_slice()) {
            (NativeFn::Unary(f), [a]) => f(walk(a, index, total)),
            (NativeFn::Binary(f), [a, b]) => f(walk(a, index, total), walk(b, index, total)),
            (NativeFn::Ternary(f), [a, b, c]) => f(
                walk(a, index, total),
                walk(b, index, total),
                walk(c, index, total),
            ),
            // The parser enforces arity; a hand-built tree with the wrong
            // argument count has no meaningful value.
            _ => f64::NAN,
        },
    }
}

#[inline]
pub(crate) fn apply_binary(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Pow => power(a, b),
    }
}
