use crate::engine::Engine;
use crate::series::{SweepError, SweepRange, evaluate_series};
use log::debug;
use thiserror::Error;

/// A named, evaluated curve as handed to a renderer. Non-finite values are
/// kept as they are.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub name: String,
    pub points: Vec<(i64, f64)>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("curve name is empty")]
    EmptyName,
    #[error("no expression rows")]
    NoRows,
    #[error(transparent)]
    Sweep(#[from] SweepError),
}

/// The set of curves a user has plotted, plus the engine that evaluates
/// them. Discarding all curves also resets the engine caches.
#[derive(Default)]
pub struct Session {
    engine: Engine,
    curves: Vec<Curve>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            curves: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Evaluates `rows` over `range` into the curve called `name`.
    ///
    /// An existing curve with that name is replaced in place; otherwise the
    /// curve is appended. Returns `Ok(None)` and leaves every curve untouched
    /// when `range.to < range.from`.
    pub fn plot<S: AsRef<str>>(
        &mut self,
        name: &str,
        rows: &[S],
        range: SweepRange,
    ) -> Result<Option<&Curve>, SessionError> {
        if name.trim().is_empty() {
            return Err(SessionError::EmptyName);
        }
        if rows.is_empty() {
            return Err(SessionError::NoRows);
        }
        if range.to < range.from {
            return Ok(None);
        }
        let points: Vec<(i64, f64)> = evaluate_series(&self.engine, rows, range)?.collect();
        debug!("plotted {:?}: {} point(s)", name, points.len());
        let pos = match self.curves.iter().position(|c| c.name == name) {
            Some(pos) => {
                self.curves[pos].points = points;
                pos
            }
            None => {
                self.curves.push(Curve {
                    name: name.to_string(),
                    points,
                });
                self.curves.len() - 1
            }
        };
        Ok(Some(&self.curves[pos]))
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn curve(&self, name: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Curve> {
        let pos = self.curves.iter().position(|c| c.name == name)?;
        Some(self.curves.remove(pos))
    }

    /// Drops every curve and clears both expression caches.
    pub fn reset(&mut self) {
        self.curves.clear();
        self.engine.reset();
    }
}

/// Splits pasted text into rows, one per line, trimming each. Trailing blank
/// lines are dropped; blank lines in between are kept (they evaluate to 0).
pub fn rows_from_text(text: &str) -> Vec<String> {
    let mut rows: Vec<String> = text.lines().map(|l| l.trim().to_string()).collect();
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows
}
