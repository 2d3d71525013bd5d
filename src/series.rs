use crate::compiled::CompiledEvaluator;
use crate::engine::Engine;
use crate::error::ParseError;
use std::iter::FusedIterator;
use std::sync::Arc;
use thiserror::Error;

/// Hard limit on points beyond `from` computed by one sweep.
pub const DEFAULT_POINT_CAP: i64 = 10_000;

/// Inclusive index range of a sweep plus the `total` binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepRange {
    pub from: i64,
    pub to: i64,
    pub total: i64,
    pub cap: i64,
}

impl SweepRange {
    pub fn new(from: i64, to: i64, total: i64) -> Self {
        Self {
            from,
            to,
            total,
            cap: DEFAULT_POINT_CAP,
        }
    }

    pub fn with_cap(mut self, cap: i64) -> Self {
        self.cap = cap;
        self
    }

    /// Last index that will be evaluated: `min(to, from + cap)`, or `None`
    /// when the range is empty (`to < from`, or a negative cap).
    pub fn last(&self) -> Option<i64> {
        if self.to < self.from || self.cap < 0 {
            return None;
        }
        Some(self.to.min(self.from.saturating_add(self.cap)))
    }

    /// Number of points the sweep produces.
    pub fn len(&self) -> u64 {
        match self.last() {
            Some(last) => last.abs_diff(self.from) + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last().is_none()
    }
}

/// A row whose expression failed to parse.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("row {row} ({text:?}): {error}")]
pub struct RowError {
    /// Zero-based position of the row in the input.
    pub row: usize,
    pub text: String,
    #[source]
    pub error: ParseError,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("sweep aborted: {} malformed row(s)", .0.len())]
    MalformedRows(Vec<RowError>),
}

/// Rows resolved to compiled evaluators, ready to be swept any number of
/// times.
///
/// Malformed rows are reported through [`Sweep::errors`] and contribute
/// nothing; the remaining rows are still evaluated.
#[derive(Clone, Debug)]
pub struct Sweep {
    evaluators: Arc<[Arc<CompiledEvaluator>]>,
    errors: Vec<RowError>,
}

impl Sweep {
    pub fn prepare<I, S>(engine: &Engine, rows: I) -> Sweep
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut evaluators = Vec::new();
        let mut errors = Vec::new();
        for (row, text) in rows.into_iter().enumerate() {
            let text = text.as_ref();
            match engine.evaluator(text) {
                Ok(ev) => evaluators.push(ev),
                Err(error) => errors.push(RowError {
                    row,
                    text: text.to_string(),
                    error,
                }),
            }
        }
        Sweep {
            evaluators: evaluators.into(),
            errors,
        }
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of well-formed rows.
    pub fn rows(&self) -> usize {
        self.evaluators.len()
    }

    /// Fails with every row error if any row is malformed.
    pub fn strict(self) -> Result<Sweep, SweepError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(SweepError::MalformedRows(self.errors))
        }
    }

    /// Lazily evaluates the rows over `range`. Each call starts over.
    pub fn points(&self, range: SweepRange) -> Points {
        Points {
            evaluators: self.evaluators.clone(),
            next: range.from,
            last: range.last(),
            total: range.total,
        }
    }

    /// Sum of every row at one index.
    pub fn value_at(&self, index: i64, total: i64) -> f64 {
        sum_rows(&self.evaluators, index, total)
    }
}

fn sum_rows(evaluators: &[Arc<CompiledEvaluator>], index: i64, total: i64) -> f64 {
    let mut acc = 0.0;
    for ev in evaluators {
        acc += ev.eval(index, total);
    }
    acc
}

/// `(index, value)` pairs in ascending index order. Cloning restarts from the
/// clone's current position.
#[derive(Clone, Debug)]
pub struct Points {
    evaluators: Arc<[Arc<CompiledEvaluator>]>,
    next: i64,
    /// `None` once exhausted.
    last: Option<i64>,
    total: i64,
}

impl Iterator for Points {
    type Item = (i64, f64);

    fn next(&mut self) -> Option<(i64, f64)> {
        let last = self.last?;
        let index = self.next;
        if index >= last {
            self.last = None;
        } else {
            self.next += 1;
        }
        Some((index, sum_rows(&self.evaluators, index, self.total)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.last {
            Some(last) => {
                let n = last.abs_diff(self.next).saturating_add(1);
                match usize::try_from(n) {
                    Ok(n) => (n, Some(n)),
                    Err(_) => (usize::MAX, None),
                }
            }
            None => (0, Some(0)),
        }
    }
}

// Sweep lengths are bounded by `cap + 1` and fit in a 64-bit `usize`.
impl ExactSizeIterator for Points {}

impl FusedIterator for Points {}

/// Strict sweep: every row must parse.
///
/// Produces `min(to, from + cap) - from + 1` points, or none when
/// `to < from`.
pub fn evaluate_series<I, S>(engine: &Engine, rows: I, range: SweepRange) -> Result<Points, SweepError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Sweep::prepare(engine, rows).strict()?.points(range))
}
