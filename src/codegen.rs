use crate::ast::{Ast, BinOp, UnOp, Var};
use crate::error::EngineError;
use crate::functions::power;
use cranelift::prelude::*;
use cranelift_jit::JITModule;
use cranelift_module::{Linkage, Module};

/// Import symbol of the function behind the `^` operator.
pub(crate) const POW_SYMBOL: &str = "pow#op";

pub(crate) fn symbol_for(name: &str, arity: usize) -> String {
    format!("{}#{}", name, arity)
}

/// Every native symbol a tree calls, paired with its address, for
/// registration on the JIT builder.
pub(crate) fn collect_symbols(ast: &Ast) -> Vec<(String, *const u8)> {
    fn walk(node: &Ast, out: &mut Vec<(String, *const u8)>) {
        match node {
            Ast::Literal(_) | Ast::Variable(_) => {}
            Ast::Unary { operand, .. } => walk(operand, out),
            Ast::Binary { op, lhs, rhs } => {
                if *op == BinOp::Pow && !out.iter().any(|(s, _)| s == POW_SYMBOL) {
                    let f: extern "C" fn(f64, f64) -> f64 = power;
                    out.push((POW_SYMBOL.to_string(), f as *const u8));
                }
                walk(lhs, out);
                walk(rhs, out);
            }
            Ast::Call { name, func, args } => {
                let sym = symbol_for(name, func.arity());
                if !out.iter().any(|(s, _)| *s == sym) {
                    out.push((sym, func.addr()));
                }
                for a in args {
                    walk(a, out);
                }
            }
        }
    }
    let mut out = Vec::new();
    walk(ast, &mut out);
    out
}

/// SSA values of the two bound variables, already converted to f64.
pub(crate) struct Params {
    pub(crate) index: Value,
    pub(crate) total: Value,
}

pub(crate) fn codegen_expr(
    module: &mut JITModule,
    builder: &mut FunctionBuilder,
    params: &Params,
    ast: &Ast,
) -> Result<Value, EngineError> {
    match ast {
        Ast::Literal(v) => Ok(builder.ins().f64const(*v)),
        Ast::Variable(Var::Index) => Ok(params.index),
        Ast::Variable(Var::Total) => Ok(params.total),
        Ast::Unary { op, operand } => {
            let v = codegen_expr(module, builder, params, operand)?;
            match op {
                UnOp::Neg => Ok(builder.ins().fneg(v)),
                UnOp::Plus => Ok(v),
            }
        }
        Ast::Binary { op, lhs, rhs } => {
            let va = codegen_expr(module, builder, params, lhs)?;
            let vb = codegen_expr(module, builder, params, rhs)?;
            match op {
                BinOp::Add => Ok(builder.ins().fadd(va, vb)),
                BinOp::Sub => Ok(builder.ins().fsub(va, vb)),
                BinOp::Mul => Ok(builder.ins().fmul(va, vb)),
                BinOp::Div => Ok(builder.ins().fdiv(va, vb)),
                BinOp::Pow => call_native(module, builder, POW_SYMBOL, &[va, vb]),
            }
        }
        Ast::Call { name, func, args } => {
            if args.len() != func.arity() {
                return Err(EngineError::Internal(format!(
                    "call to {} with {} argument(s), expected {}",
                    name,
                    args.len(),
                    func.arity()
                )));
            }
            let mut argv: Vec<Value> = Vec::with_capacity(args.len());
            for a in args {
                argv.push(codegen_expr(module, builder, params, a)?);
            }
            call_native(module, builder, &symbol_for(name, func.arity()), &argv)
        }
    }
}

fn call_native(
    module: &mut JITModule,
    builder: &mut FunctionBuilder,
    sym: &str,
    argv: &[Value],
) -> Result<Value, EngineError> {
    // External function signature (f64,..) -> f64
    let mut ext_sig = module.make_signature();
    for _ in argv {
        ext_sig.params.push(AbiParam::new(types::F64));
    }
    ext_sig.returns.push(AbiParam::new(types::F64));
    let callee_id = module
        .declare_function(sym, Linkage::Import, &ext_sig)
        .map_err(|e| EngineError::Internal(e.to_string()))?;
    let callee_ref = module.declare_func_in_func(callee_id, builder.func);
    let call = builder.ins().call(callee_ref, argv);
    Ok(builder.inst_results(call)[0])
}
