use levelcurve::{Ast, Backend, Engine, EngineConfig, ParseError};

#[test]
fn blank_text_is_constant_zero() {
    let eng = Engine::new();
    assert_eq!(eng.parse("").unwrap(), Ast::Literal(0.0));
    assert_eq!(eng.parse("   \t ").unwrap(), Ast::Literal(0.0));
    assert_eq!(eng.evaluate("", 5, 9).unwrap(), 0.0);
}

#[test]
fn dangling_operator_is_unexpected_end() {
    let eng = Engine::new();
    match eng.parse("1 +").unwrap_err() {
        ParseError::UnexpectedToken { found, pos } => {
            assert_eq!(found, "end of input");
            assert_eq!(pos, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unclosed_paren_reports_opening_position() {
    let eng = Engine::new();
    assert_eq!(
        eng.parse("2 * (1 + 2").unwrap_err(),
        ParseError::UnbalancedParens { pos: 4 }
    );
    assert_eq!(
        eng.parse("min(1, (2").unwrap_err(),
        ParseError::UnbalancedParens { pos: 7 }
    );
    assert_eq!(
        eng.parse("(1 +").unwrap_err(),
        ParseError::UnbalancedParens { pos: 0 }
    );
}

#[test]
fn stray_closing_paren_reports_its_position() {
    let eng = Engine::new();
    assert_eq!(
        eng.parse("1 + 2)").unwrap_err(),
        ParseError::UnbalancedParens { pos: 5 }
    );
    assert_eq!(
        eng.parse("(1))").unwrap_err(),
        ParseError::UnbalancedParens { pos: 3 }
    );
}

#[test]
fn unknown_function() {
    let eng = Engine::new();
    assert_eq!(
        eng.parse("1 + no_such_fn(1)").unwrap_err(),
        ParseError::UnknownFunction {
            name: "no_such_fn".into(),
            pos: 4
        }
    );
}

#[test]
fn arity_mismatch() {
    let eng = Engine::new();
    match eng.parse("sqrt(1, 2)").unwrap_err() {
        ParseError::ArityMismatch {
            name,
            expected,
            found,
            pos,
        } => {
            assert_eq!(name, "sqrt");
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
            assert_eq!(pos, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(
        eng.parse("max()").unwrap_err(),
        ParseError::ArityMismatch { found: 0, expected: 2, .. }
    ));
}

#[test]
fn unknown_identifier_is_unexpected_token() {
    let eng = Engine::new();
    // Positions are relative to the trimmed text.
    match eng.parse("  1 + x").unwrap_err() {
        ParseError::UnexpectedToken { found, pos } => {
            assert_eq!(found, "identifier 'x'");
            assert_eq!(pos, 4);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn function_name_without_call_is_rejected() {
    let eng = Engine::new();
    assert!(matches!(
        eng.parse("sqrt + 1").unwrap_err(),
        ParseError::UnexpectedToken { pos: 0, .. }
    ));
}

#[test]
fn bad_characters_and_numbers() {
    let eng = Engine::new();
    assert_eq!(eng.parse("2 $ 3").unwrap_err().position(), 2);
    assert!(matches!(
        eng.parse("1e").unwrap_err(),
        ParseError::UnexpectedToken { pos: 0, .. }
    ));
    assert!(matches!(
        eng.parse("2 3").unwrap_err(),
        ParseError::UnexpectedToken { pos: 2, .. }
    ));
}

#[test]
fn error_messages_name_the_problem() {
    let eng = Engine::new();
    let msg = eng.parse("foo(1)").unwrap_err().to_string();
    assert_eq!(msg, "unknown function 'foo' at position 0");
    let msg = eng.parse("(1").unwrap_err().to_string();
    assert_eq!(msg, "unbalanced parenthesis at position 0");
}

fn assert_too_deep(err: ParseError, at: usize) {
    match err {
        ParseError::UnexpectedToken { found, pos } => {
            assert_eq!(found, "expression nested too deeply");
            assert_eq!(pos, at);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn deep_nesting_is_rejected() {
    let eng = Engine::new();
    let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    assert_too_deep(eng.parse(&parens).unwrap_err(), 256);
    assert!(eng.evaluate(&parens, 0, 0).is_err());

    let negations = format!("{}1", "-".repeat(100_000));
    assert_too_deep(eng.parse(&negations).unwrap_err(), 256);

    let powers = format!("2{}", "^1".repeat(10_000));
    assert!(eng.parse(&powers).is_err());

    let calls = format!("{}index{}", "abs(".repeat(5_000), ")".repeat(5_000));
    assert!(eng.parse(&calls).is_err());
}

#[test]
fn long_operator_chains_are_bounded() {
    let eng = Engine::new();
    // A left-deep sum grows one level per operator; the 256th '+' crosses the limit.
    let sum = format!("1{}", "+1".repeat(100_000));
    assert_too_deep(eng.parse(&sum).unwrap_err(), 511);

    let fits = format!("1{}", "+1".repeat(255));
    assert_eq!(eng.evaluate(&fits, 0, 0).unwrap(), 256.0);
}

#[test]
fn nesting_below_the_limit_still_parses() {
    let eng = Engine::with_config(EngineConfig::default().with_backend(Backend::Closure));
    let parens = format!("{}index{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(eng.evaluate(&parens, 7, 0).unwrap(), 7.0);
    let negations = format!("{}1", "-".repeat(200));
    assert_eq!(eng.evaluate(&negations, 0, 0).unwrap(), 1.0);
}
