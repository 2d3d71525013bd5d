use levelcurve::{Engine, Session, SessionError, SweepRange, rows_from_text};

#[test]
fn plot_adds_named_curve() {
    let mut session = Session::new();
    let curve = session
        .plot("linear", &["index", "1"], SweepRange::new(0, 3, 0))
        .unwrap()
        .unwrap();
    assert_eq!(curve.name, "linear");
    assert_eq!(curve.points, vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)]);
    assert_eq!(session.curves().len(), 1);
}

#[test]
fn replotting_a_name_replaces_in_place() {
    let mut session = Session::new();
    session.plot("a", &["1"], SweepRange::new(0, 1, 0)).unwrap();
    session.plot("b", &["2"], SweepRange::new(0, 1, 0)).unwrap();
    session.plot("a", &["total"], SweepRange::new(5, 6, 9)).unwrap();

    let names: Vec<_> = session.curves().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(session.curve("a").unwrap().points, vec![(5, 9.0), (6, 9.0)]);
}

#[test]
fn invalid_input_is_rejected() {
    let mut session = Session::new();
    let rows: [&str; 0] = [];
    assert!(matches!(
        session.plot("x", &rows, SweepRange::new(0, 1, 0)),
        Err(SessionError::NoRows)
    ));
    assert!(matches!(
        session.plot("  ", &["1"], SweepRange::new(0, 1, 0)),
        Err(SessionError::EmptyName)
    ));
    assert!(matches!(
        session.plot("x", &["1 +"], SweepRange::new(0, 1, 0)),
        Err(SessionError::Sweep(_))
    ));
    assert!(session.curves().is_empty());
}

#[test]
fn inverted_range_does_nothing() {
    let mut session = Session::new();
    session.plot("a", &["1"], SweepRange::new(0, 2, 0)).unwrap();
    let out = session.plot("a", &["2"], SweepRange::new(3, 2, 0)).unwrap();
    assert!(out.is_none());
    assert_eq!(session.curve("a").unwrap().points.len(), 3);
}

#[test]
fn reset_drops_curves_and_caches() {
    let mut session = Session::with_engine(Engine::new());
    session.plot("a", &["index"], SweepRange::new(0, 5, 0)).unwrap();
    assert_eq!(session.engine().stats().asts, 1);

    session.reset();
    assert!(session.curves().is_empty());
    assert_eq!(session.engine().stats().asts, 0);
    assert_eq!(session.engine().stats().evaluators, 0);

    session.plot("a", &["index"], SweepRange::new(0, 5, 0)).unwrap();
    assert_eq!(session.engine().stats().parses, 2);
}

#[test]
fn remove_curve() {
    let mut session = Session::new();
    session.plot("a", &["1"], SweepRange::new(0, 0, 0)).unwrap();
    assert_eq!(session.remove("a").unwrap().points, vec![(0, 1.0)]);
    assert!(session.remove("a").is_none());
}

#[test]
fn pasted_rows_are_trimmed() {
    let rows = rows_from_text("  index * 2 \r\n\n total\n\n");
    assert_eq!(rows, ["index * 2", "", "total"]);
    assert!(rows_from_text("").is_empty());

    let mut session = Session::new();
    let curve = session.plot("p", &rows, SweepRange::new(1, 1, 5)).unwrap().unwrap();
    assert_eq!(curve.points, vec![(1, 7.0)]);
}
