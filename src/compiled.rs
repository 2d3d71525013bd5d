use crate::ast::Ast;
use crate::closure::{self, ClosureFn};
#[cfg(feature = "jit")]
use crate::jit::{JitCompiler, NativeCode};
#[cfg(feature = "jit")]
use log::warn;
use std::fmt;

/// Which code generator produced a [`CompiledEvaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Native code via cranelift.
    #[cfg(feature = "jit")]
    Jit,
    /// Nested closures; portable and needs no code memory.
    Closure,
}

#[cfg(feature = "jit")]
impl Default for Backend {
    fn default() -> Self {
        Backend::Jit
    }
}

#[cfg(not(feature = "jit"))]
impl Default for Backend {
    fn default() -> Self {
        Backend::Closure
    }
}

enum Code {
    #[cfg(feature = "jit")]
    Native(NativeCode),
    Closure(ClosureFn),
}

/// An executable form of one expression: a pure function of
/// `(index, total)`.
///
/// Safe to share across threads and to call any number of times. Dropping
/// the last handle releases its code; clearing a cache never does.
pub struct CompiledEvaluator {
    code: Code,
}

impl CompiledEvaluator {
    #[cfg(feature = "jit")]
    pub(crate) fn native(code: NativeCode) -> Self {
        Self {
            code: Code::Native(code),
        }
    }

    pub(crate) fn closure(ast: &Ast) -> Self {
        Self {
            code: Code::Closure(closure::compile(ast)),
        }
    }

    #[inline]
    pub fn eval(&self, index: i64, total: i64) -> f64 {
        match &self.code {
            #[cfg(feature = "jit")]
            Code::Native(code) => code.call(index, total),
            Code::Closure(f) => f(index as f64, total as f64),
        }
    }

    pub fn backend(&self) -> Backend {
        match &self.code {
            #[cfg(feature = "jit")]
            Code::Native(_) => Backend::Jit,
            Code::Closure(_) => Backend::Closure,
        }
    }
}

impl fmt::Debug for CompiledEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledEvaluator")
            .field("backend", &self.backend())
            .finish()
    }
}

/// Turns trees into [`CompiledEvaluator`]s using the configured backend.
///
/// Compilation cannot fail from the caller's point of view: if the JIT is
/// unavailable or rejects a tree, the closure backend is used instead.
pub(crate) struct Compiler {
    #[cfg(feature = "jit")]
    jit: Option<JitCompiler>,
}

impl Compiler {
    pub(crate) fn new(backend: Backend) -> Self {
        match backend {
            #[cfg(feature = "jit")]
            Backend::Jit => match JitCompiler::new() {
                Ok(jit) => Self { jit: Some(jit) },
                Err(e) => {
                    warn!("JIT unavailable, falling back to closures: {}", e);
                    Self { jit: None }
                }
            },
            Backend::Closure => Self {
                #[cfg(feature = "jit")]
                jit: None,
            },
        }
    }

    pub(crate) fn compile(&self, ast: &Ast) -> CompiledEvaluator {
        self.compile_native(ast)
            .unwrap_or_else(|| CompiledEvaluator::closure(ast))
    }

    #[cfg(feature = "jit")]
    fn compile_native(&self, ast: &Ast) -> Option<CompiledEvaluator> {
        let jit = self.jit.as_ref()?;
        match jit.compile(ast) {
            Ok(code) => Some(CompiledEvaluator::native(code)),
            Err(e) => {
                warn!("JIT compilation failed, using closures: {}", e);
                None
            }
        }
    }

    #[cfg(not(feature = "jit"))]
    fn compile_native(&self, _ast: &Ast) -> Option<CompiledEvaluator> {
        None
    }
}
