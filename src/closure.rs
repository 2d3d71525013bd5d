use crate::ast::{Ast, BinOp, UnOp, Var};
use crate::functions::{NativeFn, power};

/// Evaluator built from nested closures: `(index, total) -> value`, with the
/// variables already widened to f64.
pub(crate) type ClosureFn = Box<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Lowers a tree into closures once, so repeated evaluation skips the
/// per-node match of the tree walker.
pub(crate) fn compile(ast: &Ast) -> ClosureFn {
    match ast {
        Ast::Literal(v) => {
            let v = *v;
            Box::new(move |_, _| v)
        }
        Ast::Variable(Var::Index) => Box::new(|index, _| index),
        Ast::Variable(Var::Total) => Box::new(|_, total| total),
        Ast::Unary { op: UnOp::Plus, operand } => compile(operand),
        Ast::Unary { op: UnOp::Neg, operand } => {
            let x = compile(operand);
            Box::new(move |i, t| -x(i, t))
        }
        Ast::Binary { op, lhs, rhs } => {
            let a = compile(lhs);
            let b = compile(rhs);
            match op {
                BinOp::Add => Box::new(move |i, t| a(i, t) + b(i, t)),
                BinOp::Sub => Box::new(move |i, t| a(i, t) - b(i, t)),
                BinOp::Mul => Box::new(move |i, t| a(i, t) * b(i, t)),
                BinOp::Div => Box::new(move |i, t| a(i, t) / b(i, t)),
                BinOp::Pow => Box::new(move |i, t| power(a(i, t), b(i, t))),
            }
        }
        Ast::Call { func, args, .. } => match (*func, args.as_slice()) {
            (NativeFn::Unary(f), [a]) => {
                let a = compile(a);
                Box::new(move |i, t| f(a(i, t)))
            }
            (NativeFn::Binary(f), [a, b]) => {
                let a = compile(a);
                let b = compile(b);
                Box::new(move |i, t| f(a(i, t), b(i, t)))
            }
            (NativeFn::Ternary(f), [a, b, c]) => {
                let a = compile(a);
                let b = compile(b);
                let c = compile(c);
                Box::new(move |i, t| f(a(i, t), b(i, t), c(i, t)))
            }
            _ => Box::new(|_, _| f64::NAN),
        },
    }
}
