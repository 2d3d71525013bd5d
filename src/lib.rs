mod ast;
mod cache;
mod closure;
#[cfg(feature = "jit")]
mod codegen;
mod compiled;
mod engine;
mod error;
mod eval;
mod functions;
#[cfg(feature = "jit")]
mod jit;
mod lexer;
mod parser;
mod registry;
mod series;
mod session;

pub use ast::{Ast, BinOp, UnOp, Var};
pub use cache::{AstCache, CacheStats, EvaluatorCache, normalize};
pub use compiled::{Backend, CompiledEvaluator};
pub use engine::{Engine, EngineConfig};
pub use error::{EngineError, ParseError};
pub use eval::{Bindings, evaluate};
pub use functions::{Fn1, Fn2, Fn3, FunctionTable, NativeFn};
pub use registry::FnMeta;
pub use series::{DEFAULT_POINT_CAP, Points, RowError, Sweep, SweepError, SweepRange, evaluate_series};
pub use session::{Curve, Session, SessionError, rows_from_text};

// Re-export inventory and the #[function] macro for user crates
pub use inventory;
pub use levelcurve_macros::function;
