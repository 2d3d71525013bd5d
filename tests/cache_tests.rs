use levelcurve::{CacheStats, Engine, ParseError};
use std::sync::Arc;

#[test]
fn second_lookup_does_not_parse() {
    let eng = Engine::new();
    let a = eng.get_or_parse("index * 2 + total").unwrap();
    assert_eq!(eng.stats().parses, 1);
    let b = eng.get_or_parse("index * 2 + total").unwrap();
    assert_eq!(eng.stats().parses, 1);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn surrounding_whitespace_shares_an_entry() {
    let eng = Engine::new();
    let a = eng.get_or_parse("index + 1").unwrap();
    let b = eng.get_or_parse("  index + 1\t").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(eng.stats().asts, 1);
}

#[test]
fn inner_whitespace_is_a_distinct_key() {
    let eng = Engine::new();
    eng.get_or_parse("index+1").unwrap();
    eng.get_or_parse("index + 1").unwrap();
    assert_eq!(eng.stats().asts, 2);
    assert_eq!(eng.stats().parses, 2);
}

#[test]
fn evaluator_is_compiled_once() {
    let eng = Engine::new();
    for i in 0..100 {
        assert_eq!(eng.evaluate("index * index", i, 0).unwrap(), (i * i) as f64);
    }
    assert_eq!(
        eng.stats(),
        CacheStats {
            asts: 1,
            evaluators: 1,
            parses: 1,
            compilations: 1,
        }
    );
}

#[test]
fn failed_parse_is_not_cached() {
    let eng = Engine::new();
    assert!(eng.get_or_parse("1 +").is_err());
    assert!(eng.get_or_parse("1 +").is_err());
    // Both attempts parsed; nothing was stored.
    assert_eq!(eng.stats().parses, 2);
    assert_eq!(eng.stats().asts, 0);
}

#[test]
fn corrected_expression_is_retried() {
    let eng = Engine::new();
    assert!(matches!(
        eng.evaluate("sqrt(index", 4, 0),
        Err(ParseError::UnbalancedParens { pos: 4 })
    ));
    assert_eq!(eng.evaluate("sqrt(index)", 4, 0).unwrap(), 2.0);
}

#[test]
fn reset_forces_fresh_parse_with_same_result() {
    let eng = Engine::new();
    let before = eng.evaluate("total - index ^ 2", 3, 20).unwrap();
    assert_eq!(eng.stats().parses, 1);

    eng.reset();
    assert_eq!(eng.stats().asts, 0);
    assert_eq!(eng.stats().evaluators, 0);

    let after = eng.evaluate("total - index ^ 2", 3, 20).unwrap();
    assert_eq!(eng.stats().parses, 2);
    assert_eq!(eng.stats().compilations, 2);
    assert_eq!(before.to_bits(), after.to_bits());
}

#[test]
fn held_handles_survive_reset() {
    let eng = Engine::new();
    let ast = eng.get_or_parse("index + total").unwrap();
    let ev = eng.evaluator("index + total").unwrap();
    eng.reset();
    assert_eq!(ev.eval(2, 3), 5.0);
    assert_eq!(levelcurve::evaluate(&ast, levelcurve::Bindings::new(2, 3)), 5.0);
    drop(eng);
    // The evaluator owns its code independently of the engine.
    assert_eq!(ev.eval(10, 1), 11.0);
}

#[test]
fn tiers_clear_independently() {
    let eng = Engine::new();
    eng.evaluate("index * 3", 1, 0).unwrap();

    // Recompile without reparsing.
    eng.clear_evaluators();
    assert_eq!(eng.evaluate("index * 3", 2, 0).unwrap(), 6.0);
    assert_eq!(eng.stats().parses, 1);
    assert_eq!(eng.stats().compilations, 2);

    // A cached evaluator is used even when its tree was evicted.
    eng.clear_asts();
    assert_eq!(eng.evaluate("index * 3", 3, 0).unwrap(), 9.0);
    assert_eq!(eng.stats().parses, 1);
    assert_eq!(eng.stats().asts, 0);
}

#[test]
fn cached_tree_matches_fresh_parse() {
    let eng = Engine::new();
    let src = "max(index, total / 2) - log(index + 1) * 3";
    let cached = eng.get_or_parse(src).unwrap();
    let fresh = eng.parse(src).unwrap();
    assert_eq!(*cached, fresh);
}

#[test]
fn compile_tier_uses_the_tree_for_its_own_text() {
    let eng = Engine::new();
    let src = "index * 2 - total";
    let ev = eng.get_or_compile(src).unwrap();
    assert_eq!(eng.stats().parses, 1);
    assert!(Arc::ptr_eq(&ev, &eng.evaluator(src).unwrap()));

    let fresh = eng.parse(src).unwrap();
    for (index, total) in [(0, 0), (3, 1), (-4, 10)] {
        let expected = levelcurve::evaluate(&fresh, levelcurve::Bindings::new(index, total));
        assert_eq!(eng.evaluate(src, index, total).unwrap(), expected);
    }

    assert!(matches!(
        eng.get_or_compile("index *").unwrap_err(),
        ParseError::UnexpectedToken { .. }
    ));
    assert_eq!(eng.stats().evaluators, 1);
}

#[test]
fn config_is_exposed_unchanged() {
    let eng = Engine::with_config(
        levelcurve::EngineConfig::default()
            .with_index_names(["x"])
            .with_constant("tau", std::f64::consts::TAU),
    );
    assert_eq!(eng.config().index_names, ["x"]);
    assert_eq!(eng.config().constants.get("tau"), Some(&std::f64::consts::TAU));
    assert_eq!(eng.evaluate("x + tau", 1, 0).unwrap(), 1.0 + std::f64::consts::TAU);
}
