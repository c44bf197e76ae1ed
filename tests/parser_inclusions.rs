//! Injected-language regions and the one hard error.

use ctxt::testing::{assert_ast, parse_clean, reconstruct};
use ctxt::{parse, ParseError, SubLanguage};
use rstest::rstest;

#[test]
fn test_lua_inclusion_body_is_verbatim() {
    let source = "\\startluacode print(\"x\") \\stopluacode";
    let doc = parse_clean(source);
    assert_ast(&doc).main_count(1).main(0, |item| {
        item.assert_inclusion()
            .language(SubLanguage::Lua)
            .delimiters("\\startluacode", "\\stopluacode")
            .body(" print(\"x\") ");
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[rstest]
#[case("MPcode", SubLanguage::Metapost)]
#[case("useMPgraphic", SubLanguage::Metapost)]
#[case("tikzpicture", SubLanguage::Tikz)]
#[case("HTML", SubLanguage::Html)]
#[case("CSS", SubLanguage::Css)]
#[case("typing", SubLanguage::PlainTyping)]
#[case("LUA", SubLanguage::Lua)]
#[case("TEX", SubLanguage::Tex)]
#[case("XML", SubLanguage::Xml)]
#[case("PARSEDXML", SubLanguage::ParsedXml)]
fn test_inclusion_families(#[case] name: &str, #[case] language: SubLanguage) {
    let source = format!("\\start{name} body \\stop{name}");
    let doc = parse_clean(&source);
    assert_ast(&doc).main_count(1).main(0, |item| {
        item.assert_inclusion().language(language).body(" body ");
    });
}

#[test]
fn test_body_ignores_markup_syntax() {
    // Braces, brackets, dollars and comments are inert inside the body.
    let source = "\\startMPcode draw { $ % ] unit \\stopMPcode";
    let doc = parse_clean(source);
    assert_ast(&doc).main(0, |item| {
        item.assert_inclusion().body(" draw { $ % ] unit ");
    });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_percent_in_body_does_not_hide_the_stop() {
    // MetaPost comments start with %; the stop delimiter after one must
    // still be found, and content after the inclusion must survive.
    let source = "\\startMPcode draw; % note \\stopMPcode tail";
    let doc = parse_clean(source);
    assert_ast(&doc)
        .main_count(2)
        .main(0, |item| {
            item.assert_inclusion().body(" draw; % note ");
        })
        .main(1, |item| {
            item.assert_text().text(" tail");
        });
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_stop_name_must_end_at_a_word_boundary() {
    // `\stopMPcode` must not satisfy the shorter `\stopMP`.
    let err = parse("\\startMP x \\stopMPcode").unwrap_err();
    assert!(matches!(
        err,
        ParseError::InclusionDelimiterMismatch { .. }
    ));
}

#[test]
fn test_unknown_start_name_is_a_command_group() {
    let source = "\\startMPextra x \\stopMPextra";
    let doc = parse_clean(source);
    assert_ast(&doc).main(0, |item| {
        item.assert_command_group().name("MPextra").closed();
    });
}

#[test]
fn test_wrong_stop_delimiter_is_a_hard_error() {
    let err = parse("\\startluacode print \\stopMPcode").unwrap_err();
    match err {
        ParseError::InclusionDelimiterMismatch {
            expected,
            found,
            at,
        } => {
            assert_eq!(expected, "\\stopluacode");
            assert_eq!(found, "\\stopMPcode");
            assert_eq!(at, 20);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_backslash_inside_body_is_a_hard_error() {
    let err = parse("\\startluacode a\\b \\stopluacode").unwrap_err();
    assert!(matches!(
        err,
        ParseError::InclusionDelimiterMismatch { at: 15, .. }
    ));
}

#[test]
fn test_body_without_any_backslash_is_a_hard_error() {
    let err = parse("\\startluacode print(1)").unwrap_err();
    match err {
        ParseError::UnterminatedInclusion { expected, at } => {
            assert_eq!(expected, "\\stopluacode");
            assert_eq!(at, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_inclusion_error_surfaces_from_nested_content() {
    let err = parse("{\\startluacode broken").unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedInclusion { .. }));
}

#[test]
fn test_inclusion_inside_document_body() {
    let source = "\\starttext\n\\startluacode x = 1 \\stopluacode\n\\stoptext";
    let doc = parse_clean(source);
    assert_ast(&doc)
        .has_preamble("\\starttext")
        .main_count(3)
        .main(1, |item| {
            item.assert_inclusion().language(SubLanguage::Lua);
        })
        .has_postamble("\\stoptext");
    assert_eq!(reconstruct(&doc, source), source);
}

#[test]
fn test_error_display_names_the_delimiters() {
    let err = parse("\\startCSS body { } \\stopHTML").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("\\stopCSS"), "message: {}", message);
    assert!(message.contains("\\stopHTML"), "message: {}", message);
}
