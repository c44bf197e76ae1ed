//! Brace groups and `\start`/`\stop` command groups.

use ctxt::testing::{assert_ast, parse_clean, parse_outcome, reconstruct};
use ctxt::DiagnosticKind;
use rstest::rstest;

#[rstest]
#[case("{a}")]
#[case("{a\\egroup")]
#[case("\\bgroup a}")]
#[case("\\bgroup a\\egroup")]
fn test_brace_group_spellings_may_mismatch(#[case] source: &str) {
    let doc = parse_clean(source);
    assert_ast(&doc).main_count(1).main(0, |item| {
        item.assert_brace_group().closed().item_count(1);
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_nested_brace_groups() {
    let source = "{a {b} c}";
    let doc = parse_clean(source);
    assert_ast(&doc).main(0, |item| {
        item.assert_brace_group()
            .item_count(3)
            .item(0, |inner| {
                inner.assert_text().text("a ");
            })
            .item(1, |inner| {
                inner.assert_brace_group().closed().item_count(1);
            })
            .item(2, |inner| {
                inner.assert_text().text(" c");
            });
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_unterminated_brace_group_closes_at_end_of_input() {
    let source = "{abc";
    let outcome = parse_outcome(source);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(matches!(
        outcome.diagnostics[0].kind,
        DiagnosticKind::UnterminatedBraceGroup
    ));
    assert_eq!(outcome.diagnostics[0].span, 0..4);
    assert_ast(&outcome.document).main(0, |item| {
        item.assert_brace_group().unclosed().item_count(1);
    });
}

#[test]
fn test_stray_closing_brace_is_text() {
    let source = "a } b";
    let doc = parse_clean(source);
    assert_ast(&doc).main_count(1).main(0, |item| {
        item.assert_text().text("a } b");
    });
}

#[test]
fn test_stray_egroup_is_a_command() {
    let source = "a \\egroup b";
    let doc = parse_clean(source);
    assert_ast(&doc).main_count(3).main(1, |item| {
        item.assert_command().name("\\egroup");
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_command_group_with_matching_stop() {
    let source = "\\startsection Title \\stopsection";
    let doc = parse_clean(source);
    assert_ast(&doc).main_count(1).main(0, |item| {
        item.assert_command_group()
            .name("section")
            .closed()
            .item_count(1)
            .item(0, |inner| {
                inner.assert_text().text(" Title ");
            });
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_command_groups_nest_by_name() {
    let source = "\\startouter a \\startinner b \\stopinner c \\stopouter";
    let doc = parse_clean(source);
    assert_ast(&doc).main(0, |item| {
        item.assert_command_group()
            .name("outer")
            .closed()
            .item_count(3)
            .item(1, |inner| {
                inner.assert_command_group().name("inner").closed();
            });
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_foreign_stop_inside_group_degrades_to_command() {
    let source = "\\startA \\stopB \\stopA";
    let doc = parse_clean(source);
    assert_ast(&doc).main(0, |item| {
        item.assert_command_group()
            .name("A")
            .closed()
            .item_count(3)
            .item(1, |inner| {
                inner.assert_command().name("\\stopB");
            });
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_unterminated_command_group_reports_its_name() {
    let source = "\\startsection Title";
    let outcome = parse_outcome(source);
    assert_eq!(outcome.diagnostics.len(), 1);
    match &outcome.diagnostics[0].kind {
        DiagnosticKind::UnterminatedCommandGroup { name } => {
            assert_eq!(name, "\\startsection")
        }
        other => panic!("unexpected diagnostic: {:?}", other),
    }
    assert_ast(&outcome.document).main(0, |item| {
        item.assert_command_group().name("section").unclosed();
    });
}

#[test]
fn test_bare_start_pairs_with_bare_stop() {
    let source = "\\start body \\stop";
    let doc = parse_clean(source);
    assert_ast(&doc).main_count(1).main(0, |item| {
        item.assert_command_group().name("").closed();
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_group_may_hold_full_content() {
    let source = "{text $m$ % c\n\\cmd}";
    let doc = parse_clean(source);
    assert_ast(&doc).main(0, |item| {
        // text, math, space, comment, newline, command
        item.assert_brace_group().closed().item_count(6);
    });
    assert_eq!(reconstruct(&doc, source), source);
}
