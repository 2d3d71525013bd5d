use crate::ast::{Ast, Var};
use crate::cache::{AstCache, CacheStats, EvaluatorCache};
use crate::compiled::{Backend, CompiledEvaluator, Compiler};
use crate::error::ParseError;
use crate::functions::FunctionTable;
use crate::parser::Parser;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// The formula language an [`Engine`] accepts and how it compiles it.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub functions: FunctionTable,
    pub index_names: Vec<String>,
    pub total_names: Vec<String>,
    pub constants: HashMap<String, f64>,
    pub backend: Backend,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            functions: FunctionTable::standard(),
            index_names: vec!["index".into(), "i".into(), "level".into()],
            total_names: vec!["total".into(), "n".into()],
            constants: HashMap::from([
                ("pi".to_string(), std::f64::consts::PI),
                ("e".to_string(), std::f64::consts::E),
            ]),
            backend: Backend::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    /// Replaces the identifiers bound to the sweep index.
    pub fn with_index_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the identifiers bound to the total.
    pub fn with_total_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.total_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constant(mut self, name: &str, value: f64) -> Self {
        self.constants.insert(name.to_string(), value);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub(crate) fn variable(&self, name: &str) -> Option<Var> {
        if self.index_names.iter().any(|n| n == name) {
            Some(Var::Index)
        } else if self.total_names.iter().any(|n| n == name) {
            Some(Var::Total)
        } else {
            None
        }
    }

    pub(crate) fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }
}

/// Expression engine for one host session: owns the formula language, the
/// parsed-tree cache and the compiled-evaluator cache.
///
/// All methods take `&self`; an engine can be shared between threads that
/// run independent sweeps.
pub struct Engine {
    config: EngineConfig,
    compiler: Compiler,
    asts: AstCache,
    evaluators: EvaluatorCache,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        debug!(
            "engine created: {} functions, backend {:?}",
            config.functions.len(),
            config.backend
        );
        Self {
            compiler: Compiler::new(config.backend),
            config,
            asts: AstCache::new(),
            evaluators: EvaluatorCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses without consulting or filling the cache. Blank text parses to
    /// the constant zero.
    pub fn parse(&self, text: &str) -> Result<Ast, ParseError> {
        Parser::new(text.trim(), &self.config)?.parse()
    }

    pub fn get_or_parse(&self, text: &str) -> Result<Arc<Ast>, ParseError> {
        self.asts.get_or_parse(text, &self.config)
    }

    /// Compiled evaluator for `text`, taking its tree from the parse cache.
    pub fn get_or_compile(&self, text: &str) -> Result<Arc<CompiledEvaluator>, ParseError> {
        let ast = self.get_or_parse(text)?;
        Ok(self.evaluators.get_or_compile(text, &ast, &self.compiler))
    }

    /// Resolves `text` through both cache tiers.
    pub fn evaluator(&self, text: &str) -> Result<Arc<CompiledEvaluator>, ParseError> {
        if let Some(ev) = self.evaluators.get(text) {
            return Ok(ev);
        }
        self.get_or_compile(text)
    }

    pub fn evaluate(&self, text: &str, index: i64, total: i64) -> Result<f64, ParseError> {
        Ok(self.evaluator(text)?.eval(index, total))
    }

    /// Clears both cache tiers. Evaluators and trees already held by callers
    /// remain usable; a sweep in flight keeps using the entries it resolved.
    pub fn reset(&self) {
        debug!("resetting expression caches");
        self.asts.clear();
        self.evaluators.clear();
    }

    pub fn clear_asts(&self) {
        self.asts.clear();
    }

    pub fn clear_evaluators(&self) {
        self.evaluators.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            asts: self.asts.len(),
            evaluators: self.evaluators.len(),
            parses: self.asts.parses(),
            compilations: self.evaluators.compilations(),
        }
    }
}
