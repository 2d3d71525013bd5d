use crate::error::EngineError;
use crate::registry;
use log::debug;
use std::collections::HashMap;

pub type Fn1 = extern "C" fn(f64) -> f64;
pub type Fn2 = extern "C" fn(f64, f64) -> f64;
pub type Fn3 = extern "C" fn(f64, f64, f64) -> f64;

/// A native function callable from expressions.
///
/// Functions use the C ABI so compiled code can call them directly; the
/// reference evaluator calls the very same pointers, which keeps every
/// backend bit-for-bit consistent.
#[derive(Clone, Copy, Debug)]
pub enum NativeFn {
    Unary(Fn1),
    Binary(Fn2),
    Ternary(Fn3),
}

impl NativeFn {
    pub fn arity(&self) -> usize {
        match self {
            NativeFn::Unary(_) => 1,
            NativeFn::Binary(_) => 2,
            NativeFn::Ternary(_) => 3,
        }
    }

    #[cfg(feature = "jit")]
    pub(crate) fn addr(&self) -> *const u8 {
        match self {
            NativeFn::Unary(f) => *f as *const u8,
            NativeFn::Binary(f) => *f as *const u8,
            NativeFn::Ternary(f) => *f as *const u8,
        }
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeFn::Unary(a), NativeFn::Unary(b)) => std::ptr::fn_addr_eq(*a, *b),
            (NativeFn::Binary(a), NativeFn::Binary(b)) => std::ptr::fn_addr_eq(*a, *b),
            (NativeFn::Ternary(a), NativeFn::Ternary(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

/// The set of functions an expression may call, keyed by name.
///
/// Each name has exactly one arity; the parser rejects calls whose argument
/// count differs.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    funcs: HashMap<String, NativeFn>,
}

impl FunctionTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Math functions available to every engine built with the default config.
    pub fn standard() -> Self {
        let mut t = Self::empty();
        let unary: [(&str, Fn1); 21] = [
            ("sqrt", std_sqrt),
            ("cbrt", std_cbrt),
            ("exp", std_exp),
            ("ln", std_ln),
            ("log", std_ln),
            ("log2", std_log2),
            ("log10", std_log10),
            ("sin", std_sin),
            ("cos", std_cos),
            ("tan", std_tan),
            ("asin", std_asin),
            ("acos", std_acos),
            ("atan", std_atan),
            ("sinh", std_sinh),
            ("cosh", std_cosh),
            ("tanh", std_tanh),
            ("abs", std_abs),
            ("floor", std_floor),
            ("ceil", std_ceil),
            ("round", std_round),
            ("trunc", std_trunc),
        ];
        for (name, f) in unary {
            t.funcs.insert(name.to_string(), NativeFn::Unary(f));
        }
        t.funcs.insert("sign".into(), NativeFn::Unary(std_sign));
        let binary: [(&str, Fn2); 6] = [
            ("min", std_min),
            ("max", std_max),
            ("pow", power),
            ("atan2", std_atan2),
            ("hypot", std_hypot),
            ("mod", std_mod),
        ];
        for (name, f) in binary {
            t.funcs.insert(name.to_string(), NativeFn::Binary(f));
        }
        t.funcs.insert("clamp".into(), NativeFn::Ternary(std_clamp));
        t
    }

    /// Adds every function declared with `#[levelcurve::function]`.
    pub fn with_registered(mut self) -> Result<Self, EngineError> {
        for meta in registry::registered() {
            debug!("registering {} from {}", meta.name, meta.mod_path);
            self.register(meta.name, meta.func)?;
        }
        Ok(self)
    }

    pub fn register(&mut self, name: &str, f: NativeFn) -> Result<(), EngineError> {
        if self.funcs.contains_key(name) {
            return Err(EngineError::FunctionExists {
                name: name.to_string(),
            });
        }
        self.funcs.insert(name.to_string(), f);
        Ok(())
    }

    pub fn register_unary(&mut self, name: &str, f: Fn1) -> Result<(), EngineError> {
        self.register(name, NativeFn::Unary(f))
    }

    pub fn register_binary(&mut self, name: &str, f: Fn2) -> Result<(), EngineError> {
        self.register(name, NativeFn::Binary(f))
    }

    pub fn register_ternary(&mut self, name: &str, f: Fn3) -> Result<(), EngineError> {
        self.register(name, NativeFn::Ternary(f))
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.funcs.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

/// Real power used by the `^` operator: a negative base with a fractional
/// exponent yields NaN.
pub(crate) extern "C" fn power(base: f64, exp: f64) -> f64 {
    base.powf(exp)
}

extern "C" fn std_sqrt(x: f64) -> f64 {
    x.sqrt()
}
extern "C" fn std_cbrt(x: f64) -> f64 {
    x.cbrt()
}
extern "C" fn std_exp(x: f64) -> f64 {
    x.exp()
}
extern "C" fn std_ln(x: f64) -> f64 {
    x.ln()
}
extern "C" fn std_log2(x: f64) -> f64 {
    x.log2()
}
extern "C" fn std_log10(x: f64) -> f64 {
    x.log10()
}
extern "C" fn std_sin(x: f64) -> f64 {
    x.sin()
}
extern "C" fn std_cos(x: f64) -> f64 {
    x.cos()
}
extern "C" fn std_tan(x: f64) -> f64 {
    x.tan()
}
extern "C" fn std_asin(x: f64) -> f64 {
    x.asin()
}
extern "C" fn std_acos(x: f64) -> f64 {
    x.acos()
}
extern "C" fn std_atan(x: f64) -> f64 {
    x.atan()
}
extern "C" fn std_sinh(x: f64) -> f64 {
    x.sinh()
}
extern "C" fn std_cosh(x: f64) -> f64 {
    x.cosh()
}
extern "C" fn std_tanh(x: f64) -> f64 {
    x.tanh()
}
extern "C" fn std_abs(x: f64) -> f64 {
    x.abs()
}
extern "C" fn std_floor(x: f64) -> f64 {
    x.floor()
}
extern "C" fn std_ceil(x: f64) -> f64 {
    x.ceil()
}
extern "C" fn std_round(x: f64) -> f64 {
    x.round()
}
extern "C" fn std_trunc(x: f64) -> f64 {
    x.trunc()
}

// signum() maps zero to one; expressions expect sign(0) == 0.
extern "C" fn std_sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x
    }
}

// f64::min/max drop a NaN operand; here NaN propagates like every other op.
extern "C" fn std_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}

extern "C" fn std_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

extern "C" fn std_atan2(y: f64, x: f64) -> f64 {
    y.atan2(x)
}

extern "C" fn std_hypot(a: f64, b: f64) -> f64 {
    a.hypot(b)
}

extern "C" fn std_mod(a: f64, b: f64) -> f64 {
    a % b
}

// f64::clamp panics on inverted or NaN bounds, which must not happen inside a sweep.
extern "C" fn std_clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() || lo.is_nan() || hi.is_nan() || lo > hi {
        f64::NAN
    } else if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}
