use crate::ast::Ast;
use crate::compiled::{CompiledEvaluator, Compiler};
use crate::engine::EngineConfig;
use crate::error::ParseError;
use crate::parser::Parser;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::{
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    atomic::{AtomicUsize, Ordering},
};

// A panic while holding a cache lock cannot leave a half-built entry behind
// (values are inserted whole), so poisoned locks are simply re-entered.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Cache key for an expression: surrounding whitespace is insignificant,
/// inner whitespace is not.
pub fn normalize(text: &str) -> &str {
    text.trim()
}

/// Parsed trees keyed by normalized expression text.
///
/// Failed parses are not stored, so a corrected expression is parsed again.
/// Clearing only drops the cache's references; trees already handed out stay
/// valid.
#[derive(Debug, Default)]
pub struct AstCache {
    entries: RwLock<HashMap<String, Arc<Ast>>>,
    parses: AtomicUsize,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&self, text: &str, config: &EngineConfig) -> Result<Arc<Ast>, ParseError> {
        let key = normalize(text);
        if let Some(ast) = read(&self.entries).get(key) {
            trace!("ast cache hit: {:?}", key);
            return Ok(ast.clone());
        }
        debug!("ast cache miss: {:?}", key);
        self.parses.fetch_add(1, Ordering::Relaxed);
        let ast = Arc::new(Parser::new(key, config)?.parse()?);
        // Two threads may race here; both trees are equivalent, keep the first.
        let mut entries = write(&self.entries);
        Ok(entries.entry(key.to_string()).or_insert(ast).clone())
    }

    pub fn get(&self, text: &str) -> Option<Arc<Ast>> {
        read(&self.entries).get(normalize(text)).cloned()
    }

    pub fn clear(&self) {
        write(&self.entries).clear();
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of parses performed (cache misses), including failed ones.
    pub fn parses(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }
}

/// Compiled evaluators keyed by normalized expression text.
///
/// Kept separate from [`AstCache`] so either tier can be dropped on its own,
/// e.g. recompiling without reparsing.
#[derive(Debug, Default)]
pub struct EvaluatorCache {
    entries: RwLock<HashMap<String, Arc<CompiledEvaluator>>>,
    compilations: AtomicUsize,
}

impl EvaluatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the evaluator for `text`, compiling `ast` on a miss. `ast`
    /// must be the tree parsed from `text`.
    pub(crate) fn get_or_compile(
        &self,
        text: &str,
        ast: &Ast,
        compiler: &Compiler,
    ) -> Arc<CompiledEvaluator> {
        let key = normalize(text);
        if let Some(ev) = read(&self.entries).get(key) {
            trace!("evaluator cache hit: {:?}", key);
            return ev.clone();
        }
        debug!("evaluator cache miss: {:?}", key);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        let ev = Arc::new(compiler.compile(ast));
        let mut entries = write(&self.entries);
        entries.entry(key.to_string()).or_insert(ev).clone()
    }

    pub fn get(&self, text: &str) -> Option<Arc<CompiledEvaluator>> {
        read(&self.entries).get(normalize(text)).cloned()
    }

    pub fn clear(&self) {
        write(&self.entries).clear();
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}

/// Snapshot of both cache tiers. `parses` and `compilations` count work done
/// since the engine was created and are not reset by clearing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub asts: usize,
    pub evaluators: usize,
    pub parses: usize,
    pub compilations: usize,
}
