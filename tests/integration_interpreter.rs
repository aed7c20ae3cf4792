//! Integration tests for the CJSON interpreter
//!
//! Covers value syntax, separators, comments, string literals and the error
//! messages with their reported positions.

use bigdecimal::BigDecimal;
use octofhir_cjson::{
    CjsonMap, CjsonValue, ErrorKind, EvaluationError, FunctionCall, Position, SimpleEnvironment,
    dump, eval, eval_as_list, eval_as_map,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use std::str::FromStr;

fn single(text: &str) -> CjsonValue {
    eval(text, &mut SimpleEnvironment, false, None)
        .unwrap_or_else(|e| panic!("evaluating {text:?} failed:\n{e}"))
}

fn map(text: &str) -> CjsonMap {
    eval_as_map(text, &mut SimpleEnvironment, false, None)
        .unwrap_or_else(|e| panic!("evaluating {text:?} failed:\n{e}"))
}

fn list(text: &str) -> Vec<CjsonValue> {
    eval_as_list(text, &mut SimpleEnvironment, false, None)
        .unwrap_or_else(|e| panic!("evaluating {text:?} failed:\n{e}"))
}

fn dec(s: &str) -> CjsonValue {
    CjsonValue::Decimal(Decimal::from_str(s).unwrap())
}

fn big(s: &str) -> CjsonValue {
    CjsonValue::BigDecimal(BigDecimal::from_str(s).unwrap())
}

fn s(value: &str) -> CjsonValue {
    CjsonValue::string(value)
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Single,
    Map,
    List,
}

fn eval_err(text: &str, mode: Mode) -> EvaluationError {
    let env = &mut SimpleEnvironment;
    let result = match mode {
        Mode::Single => eval(text, env, false, None).map(|_| ()),
        Mode::Map => eval_as_map(text, env, false, None).map(|_| ()),
        Mode::List => eval_as_list(text, env, false, None).map(|_| ()),
    };
    match result {
        Ok(()) => panic!("evaluating {text:?} should have failed"),
        Err(err) => err,
    }
}

#[test]
fn test_map_keeps_source_order() {
    let result = map("a: 1, b: [2, 3]");
    let keys: Vec<&str> = result.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(result["a"], CjsonValue::Integer(1));
    assert_eq!(
        result["b"],
        CjsonValue::List(vec![CjsonValue::Integer(2), CjsonValue::Integer(3)])
    );
}

#[test]
fn test_bare_key_means_true() {
    let result = map("flag, other: 2");
    assert_eq!(result["flag"], CjsonValue::Boolean(true));
    assert_eq!(result["other"], CjsonValue::Integer(2));
}

#[test]
fn test_line_continuation_in_string() {
    assert_eq!(single("\"line1\\\n   line2\""), s("line1line2"));
    assert_eq!(single("\"a\\  \r\n\tb\""), s("ab"));
    // Only the first line break is swallowed
    assert_eq!(single("\"a\\\n\n  b\""), s("a\n  b"));
}

#[test]
fn test_empty_inputs() {
    assert_eq!(map(""), CjsonMap::new());
    assert_eq!(map("  // nothing here\n"), CjsonMap::new());
    assert_eq!(list(" /* empty */ "), Vec::<CjsonValue>::new());
    assert_eq!(single("{}"), CjsonValue::Map(CjsonMap::new()));
    assert_eq!(single("[ ]"), CjsonValue::List(vec![]));

    let err = eval_err("  // just a comment", Mode::Single);
    assert_eq!(err.message(), "The text is empty.");
}

#[test]
fn test_trailing_commas_and_line_breaks() {
    assert_eq!(list("1, 2,").len(), 2);
    assert_eq!(single("[1, 2,]"), single("[1, 2]"));
    assert_eq!(map("a: 1,\nb: 2,\n").len(), 2);

    let result = map("a: 1\nb: 2 // second\nc: 3");
    assert_eq!(result.len(), 3);
    assert_eq!(result["c"], CjsonValue::Integer(3));
    assert_eq!(single("[\n  x\n  y\n]"), CjsonValue::List(vec![s("x"), s("y")]));
}

#[test]
fn test_byte_order_mark_is_whitespace() {
    let result = map("\u{feff}a: 1");
    assert_eq!(result["a"], CjsonValue::Integer(1));
}

#[rstest]
#[case(r#""tab\there""#, "tab\there")]
#[case(r#""q\"q""#, "q\"q")]
#[case(r#"'it\'s'"#, "it's")]
#[case(r#""\{\/\\""#, "{/\\")]
#[case(r#""\l\g\a""#, "<>&")]
#[case(r#""\b\f\r\n""#, "\u{8}\u{c}\r\n")]
#[case(r#""\x41""#, "A")]
#[case(r#""\x4g""#, "\u{4}g")]
#[case(r#""\u0041BC""#, "ABC")]
#[case(r#""\u00e9t\u00E9""#, "\u{e9}t\u{e9}")]
#[case(r#"'say "hi"'"#, "say \"hi\"")]
#[case(r#"r"C:\dir\new""#, "C:\\dir\\new")]
#[case(r#"r'a "b" c'"#, "a \"b\" c")]
fn test_string_literals(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(single(text), s(expected));
}

#[rstest]
#[case("42", CjsonValue::Integer(42))]
#[case("-3", CjsonValue::Integer(-3))]
#[case("+3", CjsonValue::Integer(3))]
#[case("1.25", dec("1.25"))]
#[case("3000000000", dec("3000000000"))]
#[case("6.02e3", dec("6020"))]
#[case("123456789012345678901234567890123", big("123456789012345678901234567890123"))]
#[case("1e100", big("1e100"))]
#[case("-0.00000000000000000000000000001", big("-1e-29"))]
#[case("true", CjsonValue::Boolean(true))]
#[case("false", CjsonValue::Boolean(false))]
#[case("null", CjsonValue::Null)]
#[case("hello", s("hello"))]
#[case("v1.2.3", s("v1.2.3"))]
#[case("john@example.com", s("john@example.com"))]
#[case("$HOME", s("$HOME"))]
#[case("\u{e1}rv\u{ed}zt\u{171}r\u{151}", s("\u{e1}rv\u{ed}zt\u{171}r\u{151}"))]
fn test_unquoted_values(#[case] text: &str, #[case] expected: CjsonValue) {
    assert_eq!(single(text), expected);
}

#[test]
fn test_force_string_values() {
    let result = eval_as_map("a: 1, b: true, c: null, d: [2.5]", &mut SimpleEnvironment, true, None)
        .unwrap();
    assert_eq!(result["a"], s("1"));
    assert_eq!(result["b"], s("true"));
    assert_eq!(result["c"], s("null"));
    assert_eq!(result["d"], CjsonValue::List(vec![s("2.5")]));
}

#[test]
fn test_keys_are_never_converted() {
    let result = map("1: one, true: yes, null: 0");
    let keys: Vec<&str> = result.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["1", "true", "null"]);
    assert_eq!(map("\"quoted key\": 1")["quoted key"], CjsonValue::Integer(1));
}

#[test]
fn test_nested_structures() {
    let result = single("{server: {host: localhost, ports: [80, 443]}, tags: [[a], {b: c}]}");
    let server = result.as_map().unwrap()["server"].as_map().unwrap();
    assert_eq!(server["host"], s("localhost"));
    assert_eq!(server["ports"].as_list().unwrap().len(), 2);
    assert_eq!(
        result.to_string(),
        r#"{"server":{"host":"localhost", "ports":[80, 443]}, "tags":[["a"], {"b":"c"}]}"#
    );
}

#[test]
fn test_map_merging() {
    let result = map("a: 1, {b: 2, c: 3}, d: 4");
    let keys: Vec<&str> = result.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c", "d"]);

    // Later entries win
    let result = map("a: 1, {a: 2}");
    assert_eq!(result["a"], CjsonValue::Integer(2));
    let result = map("{a: 2}, a: 1");
    assert_eq!(result["a"], CjsonValue::Integer(1));
}

#[test]
fn test_unresolved_function_calls() {
    assert_eq!(
        single("f(1, x)"),
        CjsonValue::FunctionCall(FunctionCall::new(
            "f",
            vec![CjsonValue::Integer(1), s("x")]
        ))
    );
    assert_eq!(single("g ()"), CjsonValue::FunctionCall(FunctionCall::new("g", vec![])));
    assert_eq!(single("h(\n  a\n  b\n)").to_string(), r#"h("a", "b")"#);
}

#[rstest]
#[case::extra_characters("1 2", Mode::Single, "Extra character(s) after the expression.", 2)]
#[case::unexpected_character(")", Mode::Single, "Unexpected character.", 0)]
#[case::no_separator("1, 2 3", Mode::List, "No separator was used before the item. Items in listings should be separated with comma (,) or line-break. Keys and values in maps should be separated with colon (:).", 5)]
#[case::missing_list_item("[1,,2]", Mode::Single, "List item is missing before the comma.", 3)]
#[case::missing_pair("a: 1,, b: 2", Mode::Map, "Key-value pair is missing before the comma.", 5)]
#[case::leading_comma(", a", Mode::Map, "Key-value pair is missing before the comma.", 0)]
#[case::semicolon("a: 1; b: 2", Mode::Map, "Semicolon (;) was unexpected here. If you want to separate items in a listing then use comma (,) instead.", 4)]
#[case::equals("a = 1", Mode::Map, "Equals sign (=) was unexpected here. If you want to associate a key with a value then use colon (:) instead.", 2)]
#[case::colon_in_list("[1: 2]", Mode::Single, "Colon (:) shouldn't be used here. This is a list, and not a map.", 2)]
#[case::second_colon("a: 1: 2", Mode::Map, "Colon (:) shouldn't be used here. Colon is for separating the key from the value, and the value was already given previously.", 4)]
#[case::stray_character("[1#]", Mode::Single, "Character '#' shouldn't occur here.", 2)]
#[case::block_comment_is_not_a_line_break("[1 /*\n*/ 2]", Mode::Single, "No separator was used before the item. Items in listings should be separated with comma (,) or line-break. Keys and values in maps should be separated with colon (:).", 9)]
#[case::unclosed_comment("a: 1 /* x", Mode::Map, "Comment was not closed with \"*/\".", 5)]
#[case::unclosed_list("a: [1, 2", Mode::Map, "Reached the end of the text, but the list was not closed with ']'.", 3)]
#[case::unclosed_map("{a: 1", Mode::Single, "Reached the end of the text, but the map was not closed with '}'.", 0)]
#[case::unclosed_string("'abc", Mode::Single, "The closing \"apostrophe-quote\" of the string is missing.", 0)]
#[case::unclosed_raw_string("x: r\"abc", Mode::Map, "The closing \"quotation mark\" of the string is missing.", 3)]
#[case::invalid_escape("\"a\\qb\"", Mode::Single, "Invalid escape sequence \\q in the string literal.", 2)]
#[case::invalid_hex_escape("\"\\xZ\"", Mode::Single, "Invalid hexadecimal UNICODE escape in the string literal.", 1)]
#[case::lone_surrogate_escape("\"\\uD800\"", Mode::Single, "Invalid hexadecimal UNICODE escape in the string literal. U+D800 is a surrogate code point, which can't stand alone.", 1)]
#[case::continuation_without_line_break("\"a\\ b\"", Mode::Single, "Invalid usage of escape sequence \\white-space. This escape sequence can be used only before line-break.", 2)]
#[case::key_without_value("a:", Mode::Map, "The key must be followed by a value because colon was used.", 0)]
fn test_syntax_errors(
    #[case] text: &str,
    #[case] mode: Mode,
    #[case] message: &str,
    #[case] position: usize,
) {
    let err = eval_err(text, mode);
    assert_eq!(err.kind(), Some(ErrorKind::Syntax), "{err}");
    assert_eq!(err.message(), message);
    assert_eq!(err.position(), Some(position));
}

#[test]
fn test_lone_surrogate_is_reported_at_the_backslash() {
    let err = eval_err("\"\\uDFFF and more\"", Mode::Single);
    assert_eq!(err.line_column(), Some(Position::new(1, 2)));
    assert!(err.message().contains("U+DFFF is a surrogate code point"), "{err}");
}

#[test]
fn test_plus_operator_hint() {
    let err = eval_err("a: 1 + b: 2", Mode::Map);
    assert!(err.message().starts_with("The + operator is not supported."));
    assert_eq!(err.position(), Some(5));
}

#[rstest]
#[case("[1]: 2", "The key must be a String, but it is a(n) list.")]
#[case("{a: 1}: 2", "The key must be a String, but it is a(n) map.")]
#[case("[1], a: 2", "This expression should be either a string or a map, but it is a(n) list.")]
fn test_key_type_errors(#[case] text: &str, #[case] message: &str) {
    let err = eval_err(text, Mode::Map);
    assert_eq!(err.kind(), Some(ErrorKind::Semantic));
    assert_eq!(err.message(), message);
    assert_eq!(err.position(), Some(0));
}

#[test]
fn test_rendered_error_message() {
    let err = eval_as_map("a: 1\nb: ]", &mut SimpleEnvironment, false, Some("x.cjson")).unwrap_err();
    assert_eq!(err.line_column(), Some(Position::new(2, 4)));
    assert_eq!(
        err.to_string(),
        "CJSON syntax error: Unexpected character.\n\
         Error location: line 2, column 4 in x.cjson:\n\
         b: ]\n   ^"
    );
}

#[test]
fn test_unclosed_literals_point_at_their_start() {
    let err = eval_err("\"abc\\", Mode::Single);
    assert_eq!(err.position(), Some(0));

    let err = eval_as_list("[1", &mut SimpleEnvironment, false, None).unwrap_err();
    assert_eq!(err.line_column(), Some(Position::new(1, 1)));
}

#[test]
fn test_evaluation_is_repeatable() {
    let text = "name: demo\nitems: [1, 2.5, 'x', {k: v}]\nflag";
    assert_eq!(map(text), map(text));
}

#[test]
fn test_dump_evaluates_to_equal_tree() {
    let text = "name: \"a \\\"quoted\\\" \\\\ name\", items: [1, -2.5, true, null, [], {}], \
                nested: {deep: {deeper: [x, y]}}";
    let original = CjsonValue::Map(map(text));

    let multi_line = dump(&original);
    assert_eq!(single(&multi_line), original);

    let single_line = original.to_string();
    assert_eq!(single(&single_line), original);
}
