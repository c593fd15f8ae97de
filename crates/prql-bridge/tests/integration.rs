//! Black-box integration tests for prql-bridge
//!
//! These run the real compiler through each stage and through `compile`.

use prql_bridge::{
    CompileResult, Configuration, MessageKind, compile, compiler_version, generate_sql,
    parse_to_pl, pl_to_prql, resolve_to_rq, targets,
};

const ALBUMS: &str = "from albums | select {album_id, title} | take 3";

fn staged(query: &str, config: Option<&Configuration>) -> CompileResult {
    let pl = parse_to_pl(query);
    let Some(pl) = pl.output() else { return pl };
    let rq = resolve_to_rq(pl);
    let Some(rq) = rq.output() else { return rq };
    generate_sql(rq, config)
}

fn sql(result: &CompileResult) -> &str {
    match result.output() {
        Some(sql) => sql,
        None => panic!("expected SQL, got {:?}", result.messages()),
    }
}

// ============ Compile ============

#[test]
fn compile_with_defaults() {
    let res = compile(ALBUMS, None);
    assert!(res.messages().is_empty(), "{:?}", res.messages());

    let out = sql(&res);
    assert!(out.contains("album_id"));
    assert!(out.contains("title"));
    assert!(out.contains("LIMIT"));
    assert!(out.contains('\n'), "default output is formatted");
    assert!(out.contains("-- Generated by"));
}

#[test]
fn compile_for_mssql_unformatted() {
    let config = Configuration::default()
        .no_format()
        .no_signature()
        .with_target("sql.mssql");
    let res = compile(ALBUMS, Some(&config));
    assert!(res.messages().is_empty(), "{:?}", res.messages());

    let out = sql(&res);
    assert!(out.contains("TOP") || out.contains("FETCH"), "{out}");
    assert!(!out.contains("LIMIT"), "{out}");
    assert!(!out.contains("Generated by"), "{out}");
    assert!(!out.trim_end().contains('\n'), "{out}");
}

#[test]
fn compile_reports_unknown_column() {
    let res = compile("from album | select {album_id} | select {title}", None);
    assert_eq!(res.output(), None);
    let error = res.first_error().expect("resolution error");
    assert_eq!(error.kind, MessageKind::Error);
    assert!(error.span.is_some());
    assert!(error.location.is_some());
    assert!(error.display.is_some());
}

#[test]
fn compile_passes_unused_binding_through() {
    let query = "let a = (from album)";
    let res = compile(query, None);
    let direct = prqlc::compile(query, &prqlc::Options::default());

    assert_eq!(res.output().is_some(), direct.is_ok());
    if let Ok(direct) = direct {
        assert_eq!(res.output(), Some(direct.as_str()));
    }
}

#[test]
fn compile_parse_error_locates_source() {
    let res = compile("from albums | select {album_id,", None);
    assert_eq!(res.output(), None);
    let error = res.first_error().expect("parse error");
    let location = error.location.expect("location");
    assert_eq!(location.start_line, 0);
    let display = error.display.as_deref().expect("display");
    assert!(display.contains("from albums"), "{display}");
    assert!(!display.contains('\u{1b}'));
}

#[test]
fn compile_rejects_unknown_target() {
    let config = Configuration::default().with_target("sql.nonsense");
    let res = compile(ALBUMS, Some(&config));
    assert_eq!(res.output(), None);
    assert!(res.first_error().unwrap().reason.contains("sql.nonsense"));
}

#[test]
fn blank_target_means_any() {
    let config = Configuration::default().with_target("");
    assert_eq!(compile(ALBUMS, Some(&config)), compile(ALBUMS, None));
}

#[test]
fn target_header_is_honoured_under_any() {
    let query = "prql target:sql.mssql\nfrom albums | take 3";
    let res = compile(query, Some(&Configuration::default().no_format()));
    assert!(!sql(&res).contains("LIMIT"));
}

// ============ Stages ============

#[test]
fn stages_match_compile() {
    let config = Configuration::default().no_signature();
    for query in [
        ALBUMS,
        "from t | filter x > 1 | sort {-y} | take 10",
        "from a | join b (==id) | select {a.x, b.y}",
        "from t | group k (aggregate {n = count this})",
    ] {
        assert_eq!(
            staged(query, Some(&config)),
            compile(query, Some(&config)),
            "{query}"
        );
    }
}

#[test]
fn stage_errors_match_compile_errors() {
    let query = "from album | select {album_id} | select {title}";
    let reasons = |res: CompileResult| -> Vec<(MessageKind, String)> {
        res.messages()
            .iter()
            .map(|m| (m.kind, m.reason.clone()))
            .collect()
    };

    let staged = staged(query, None);
    assert_eq!(staged.output(), None);
    // only compile has the source to annotate against
    assert!(staged.messages().iter().all(|m| m.display.is_none()));
    assert_eq!(reasons(staged), reasons(compile(query, None)));
}

#[test]
fn parse_to_pl_produces_json() {
    let res = parse_to_pl(ALBUMS);
    let pl: serde_json::Value = serde_json::from_str(sql(&res)).expect("PL is JSON");
    assert!(pl.is_object());
}

#[test]
fn resolve_rejects_malformed_pl() {
    let res = resolve_to_rq("this is not PL");
    assert_eq!(res.output(), None);
    assert_eq!(res.messages_len(), 1);

    let error = &res.messages()[0];
    assert_eq!(error.kind, MessageKind::Error);
    assert!(error.span.is_none());
    assert!(error.location.is_none());
    assert!(error.reason.starts_with("invalid PL interchange"));
}

#[test]
fn generate_rejects_malformed_rq() {
    let pl = parse_to_pl(ALBUMS);
    // valid PL is not valid RQ
    let res = generate_sql(sql(&pl), None);
    assert_eq!(res.output(), None);
    assert_eq!(res.messages_len(), 1);
    assert!(res.messages()[0].span.is_none());
}

#[test]
fn generate_same_rq_for_two_targets() {
    let rq = resolve_to_rq(sql(&parse_to_pl(ALBUMS)));
    let rq = sql(&rq);

    let any = generate_sql(rq, Some(&Configuration::default().no_format()));
    let mssql = generate_sql(
        rq,
        Some(&Configuration::default().no_format().with_target("sql.mssql")),
    );
    assert_ne!(sql(&any), sql(&mssql));
}

#[test]
fn empty_input_is_an_error_not_a_crash() {
    for res in [resolve_to_rq(""), generate_sql("", None), pl_to_prql("")] {
        assert_eq!(res.output(), None);
        assert_eq!(res.messages_len(), 1);
    }
}

// ============ Formatting ============

#[test]
fn pl_to_prql_regenerates_source() {
    let pl = parse_to_pl(ALBUMS);
    let source = pl_to_prql(sql(&pl));
    let source = sql(&source);
    assert!(source.contains("from albums"), "{source}");

    // the regenerated source compiles to the same SQL
    assert_eq!(compile(source, None), compile(ALBUMS, None));
}

// ============ Introspection ============

#[test]
fn targets_lists_dialects() {
    let names = targets();
    assert_eq!(names[0], "sql.any");
    assert!(names.iter().all(|t| t.starts_with("sql.")));
    for name in &names {
        let config = Configuration::default().with_target(name.as_str());
        assert!(compile(ALBUMS, Some(&config)).is_success(), "{name}");
    }
}

#[test]
fn version_matches_core() {
    assert_eq!(compiler_version(), prqlc::compiler_version().to_string());
}

// ============ Determinism ============

#[test]
fn repeated_failures_are_identical() {
    let query = "from album | select {album_id} | select {title} | filter nope > 1";
    let first = compile(query, None);
    for _ in 0..5 {
        assert_eq!(compile(query, None), first);
    }
}

#[test]
fn concurrent_calls_are_independent() {
    let config = Configuration::default().no_format().with_target("sql.mssql");
    let expected_ok = compile(ALBUMS, Some(&config));
    let expected_err = compile("from album | select {album_id} | select {title}", None);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let config = &config;
                s.spawn(move || {
                    if i % 2 == 0 {
                        compile(ALBUMS, Some(config))
                    } else {
                        compile("from album | select {album_id} | select {title}", None)
                    }
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let res = handle.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(res, expected_ok);
            } else {
                assert_eq!(res, expected_err);
            }
        }
    });
}
