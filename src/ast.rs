use crate::functions::NativeFn;

/// The two bound variables an expression may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Var {
    /// Current sweep position.
    Index,
    /// Caller-supplied total/count.
    Total,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,
    Plus,
}

/// Parsed expression tree. All values are f64; variables are widened from
/// their integer bindings at evaluation time.
///
/// Calls carry the resolved native function, so evaluating or compiling a
/// tree never needs the function table again.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// Numeric literal or named constant (e.g. `2.5`, `pi`)
    Literal(f64),
    /// Bound variable reference (e.g. `index`, `total`)
    Variable(Var),
    /// `lhs op rhs`
    Binary {
        op: BinOp,
        lhs: Box<Ast>,
        rhs: Box<Ast>,
    },
    /// `-x` / `+x`
    Unary { op: UnOp, operand: Box<Ast> },
    /// `name(args..)`; `args.len()` always matches `func.arity()`.
    Call {
        name: String,
        func: NativeFn,
        args: Vec<Ast>,
    },
}

impl Ast {
    /// Constant-zero tree produced for blank rows.
    pub fn zero() -> Ast {
        Ast::Literal(0.0)
    }

    pub(crate) fn binary(op: BinOp, lhs: Ast, rhs: Ast) -> Ast {
        Ast::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub(crate) fn unary(op: UnOp, operand: Ast) -> Ast {
        Ast::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}
