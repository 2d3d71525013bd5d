use crate::ast::Ast;
use crate::codegen::{Params, codegen_expr, collect_symbols};
use crate::error::EngineError;
use cranelift::codegen::isa::OwnedTargetIsa;
use cranelift::codegen::settings;
use cranelift::prelude::*;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{Linkage, Module};
use cranelift_native as native;
use log::debug;

pub(crate) type JitFn = unsafe extern "C" fn(i64, i64) -> f64;

const ENTRY_SYMBOL: &str = "levelcurve_expr";

/// Holds the host ISA; every compiled tree gets its own JIT module so that
/// its code memory lives exactly as long as the evaluator using it.
pub(crate) struct JitCompiler {
    isa: OwnedTargetIsa,
}

impl JitCompiler {
    pub(crate) fn new() -> Result<Self, EngineError> {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("opt_level", "speed")
            .map_err(|e| EngineError::Internal(format!("settings error: {}", e)))?;
        let isa_builder = native::builder().map_err(|e| EngineError::Internal(e.to_string()))?;
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| EngineError::Internal(e.to_string()))?;
        Ok(Self { isa })
    }

    pub(crate) fn compile(&self, ast: &Ast) -> Result<NativeCode, EngineError> {
        let mut jb = JITBuilder::with_isa(self.isa.clone(), cranelift_module::default_libcall_names());
        for (sym, addr) in collect_symbols(ast) {
            jb.symbol(sym, addr);
        }
        let mut module = JITModule::new(jb);
        match build_and_finalize(&mut module, ast) {
            Ok(code) => {
                // SAFETY: the entry was declared as (i64, i64) -> f64 with the
                // default (C) calling convention of the host ISA.
                let entry: JitFn = unsafe { std::mem::transmute(code) };
                Ok(NativeCode {
                    module: Some(module),
                    entry,
                })
            }
            Err(e) => {
                // SAFETY: nothing from this module escaped.
                unsafe { module.free_memory() };
                Err(e)
            }
        }
    }
}

fn build_and_finalize(module: &mut JITModule, ast: &Ast) -> Result<*const u8, EngineError> {
    let mut sig = module.make_signature();
    sig.params.push(AbiParam::new(types::I64));
    sig.params.push(AbiParam::new(types::I64));
    sig.returns.push(AbiParam::new(types::F64));
    let func_id = module
        .declare_function(ENTRY_SYMBOL, Linkage::Local, &sig)
        .map_err(|e| EngineError::Internal(e.to_string()))?;

    let mut ctx = module.make_context();
    ctx.func.signature = sig;
    let mut fb_ctx = FunctionBuilderContext::new();
    {
        let mut builder = FunctionBuilder::new(&mut ctx.func, &mut fb_ctx);
        let block = builder.create_block();
        builder.append_block_params_for_function_params(block);
        builder.switch_to_block(block);
        builder.seal_block(block);

        let raw_index = builder.block_params(block)[0];
        let raw_total = builder.block_params(block)[1];
        // Integer bindings are widened once at entry, matching `as f64`.
        let params = Params {
            index: builder.ins().fcvt_from_sint(types::F64, raw_index),
            total: builder.ins().fcvt_from_sint(types::F64, raw_total),
        };

        let val = codegen_expr(module, &mut builder, &params, ast)?;
        builder.ins().return_(&[val]);
        builder.finalize();
    }
    debug!("JIT code\n{}", ctx.func.display());

    module
        .define_function(func_id, &mut ctx)
        .map_err(|e| EngineError::Internal(e.to_string()))?;
    module.clear_context(&mut ctx);
    module
        .finalize_definitions()
        .map_err(|e| EngineError::Internal(e.to_string()))?;

    Ok(module.get_finalized_function(func_id))
}

/// Machine code for one expression together with the module that owns it.
pub(crate) struct NativeCode {
    module: Option<JITModule>,
    entry: JitFn,
}

impl NativeCode {
    #[inline]
    pub(crate) fn call(&self, index: i64, total: i64) -> f64 {
        // SAFETY: `entry` points into `module`, which is only freed on drop.
        unsafe { (self.entry)(index, total) }
    }
}

// SAFETY: after finalization the module is never touched except to free it
// in Drop, and the generated code is a pure function of its arguments.
unsafe impl Send for NativeCode {}
unsafe impl Sync for NativeCode {}

impl Drop for NativeCode {
    fn drop(&mut self) {
        if let Some(module) = self.module.take() {
            // SAFETY: we hold the only reference to `entry`.
            unsafe { module.free_memory() };
        }
    }
}
