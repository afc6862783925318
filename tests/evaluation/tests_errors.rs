//! Diagnostics: codes, offsets, expected sets and messages.

use fieldexpr::{Driver, ErrorCode, EvalError, TextSize};
use rstest::rstest;

use crate::helpers::assertions::{assert_close, scalars};
use crate::helpers::fixtures::standard_database;

fn fail(expression: &str) -> EvalError {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    match driver.parse(expression) {
        Ok(value) => panic!("{} evaluated to {:?}", expression, value),
        Err(err) => err,
    }
}

#[rstest]
#[case("p $ q", ErrorCode::E0101, 2)]
#[case("max(p, q) # 2", ErrorCode::E0101, 10)]
#[case("rand(99999999999999999999999)", ErrorCode::E0104, 5)]
#[case("(p + q", ErrorCode::E0203, 6)]
#[case("mag((U)", ErrorCode::E0203, 7)]
#[case("p q", ErrorCode::E0208, 2)]
#[case("(p) (q)", ErrorCode::E0208, 4)]
#[case("p + ", ErrorCode::E0406, 4)]
#[case("*p", ErrorCode::E0406, 0)]
#[case("", ErrorCode::E0406, 0)]
#[case("p > ? 1 : 0", ErrorCode::E0406, 4)]
#[case("(p q", ErrorCode::E0902, 3)]
#[case("p > 1 ? q", ErrorCode::E0902, 9)]
#[case("max(p q)", ErrorCode::E0902, 6)]
fn test_error_codes_and_offsets(
    #[case] expression: &str,
    #[case] code: ErrorCode,
    #[case] offset: u32,
) {
    let err = fail(expression);
    let syntax = err
        .syntax_error()
        .unwrap_or_else(|| panic!("{}: expected a syntax error, got {:?}", expression, err));
    assert_eq!(syntax.code, code, "{}: {}", expression, syntax);
    assert_eq!(syntax.offset(), TextSize::from(offset), "{}: {}", expression, syntax);
}

#[test]
fn test_lexical_errors_are_their_own_variant() {
    assert!(matches!(fail("p $ q"), EvalError::Lexical(_)));
    assert!(matches!(fail("p q"), EvalError::Syntax(_)));
}

#[test]
fn test_display_lists_expected_tokens() {
    let err = fail("p q");
    let shown = err.to_string();
    assert!(shown.starts_with("syntax error: E0208 at 2: unexpected q, found 'q', expecting one of {"));
    assert!(shown.ends_with(", end of input}"));
    let expected = &err.syntax_error().unwrap().expected;
    for token in ["'+'", "'*'", "'<'", "'=='"] {
        assert!(expected.iter().any(|e| e == token), "{} missing from {:?}", token, expected);
    }
    assert!(!expected.iter().any(|e| e == "'?'" || e == "'.'"));
}

#[test]
fn test_trailing_input_lists_continuations_of_kind() {
    let err = fail("p > q r");
    let expected = &err.syntax_error().unwrap().expected;
    assert!(expected.iter().any(|e| e == "'?'"));
    assert!(expected.iter().any(|e| e == "'||'"));
    assert!(!expected.iter().any(|e| e == "'+'"));

    let err = fail("U V");
    let expected = &err.syntax_error().unwrap().expected;
    assert!(expected.iter().any(|e| e == "'.'"));
    assert!(expected.iter().any(|e| e == "'^'"));
    assert_eq!(expected.last().map(String::as_str), Some("end of input"));
}

#[test]
fn test_unclosed_parenthesis_hint() {
    let err = fail("2*(p + q");
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0203);
    assert_eq!(syntax.hint.as_deref(), Some("parenthesis opened at 2"));
    assert!(syntax.format().ends_with("\n  hint: parenthesis opened at 2"));
    assert_eq!(syntax.expected, vec!["')'".to_string()]);
}

#[test]
fn test_missing_operand_lists_operand_starts() {
    let err = fail("p * )");
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0406);
    assert_eq!(syntax.found, ")");
    assert!(syntax.expected.iter().any(|e| e == "identifier"));
    assert!(syntax.expected.iter().any(|e| e == "'('"));
}

#[test]
fn test_type_error_lists_legal_operators() {
    let err = fail("U + tau");
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0403);
    assert_eq!(syntax.found, "+");
    assert!(!syntax.expected.is_empty());
}

#[test]
fn test_prefix_parse_stops_at_first_unusable_token() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver.parse_prefix("p + 1 ; trailing words").unwrap();
    assert_close(&scalars(value), &[2.0, 3.0, 4.0]);
    assert_eq!(driver.end_offset(), 5);

    driver.parse_prefix("mag(U) q").unwrap();
    assert_eq!(driver.end_offset(), 6);

    // a lexical error still fails a prefix parse
    assert!(matches!(driver.parse_prefix("p $"), Err(EvalError::Lexical(_))));
}

#[test]
fn test_errors_leave_no_result() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver.parse("p").unwrap();
    let err = driver.parse("p +").unwrap_err();
    assert_eq!(err.syntax_error().map(|e| e.code), Some(ErrorCode::E0406));
    assert!(driver.result().is_none());
    assert_eq!(driver.result_type(), None);
}
