//! Value dump and JSON output of evaluated documents

use octofhir_cjson::{
    CjsonValue, FunctionRegistry, SimpleEnvironment, dump, dump_single_line, eval, eval_as_map,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const CONFIG: &str = r#"
// Service configuration
name: "demo service"
debug
limits: {
    connections: 100
    ratio: 0.75
}
hosts: [alpha, 'beta', r"gamma\1"]
"#;

#[test]
fn test_multi_line_dump_of_document() {
    let map = eval_as_map(CONFIG, &mut SimpleEnvironment, false, None).unwrap();
    let expected = concat!(
        "{\n",
        "    \"name\": \"demo service\"\n",
        "    \"debug\": true\n",
        "    \"limits\": {\n",
        "        \"connections\": 100\n",
        "        \"ratio\": 0.75\n",
        "    }\n",
        "    \"hosts\": [\n",
        "        \"alpha\"\n",
        "        \"beta\"\n",
        "        \"gamma\\\\1\"\n",
        "    ]\n",
        "}"
    );
    assert_eq!(dump(&CjsonValue::Map(map)), expected);
}

#[test]
fn test_single_line_dump_matches_display() {
    let value = eval("{a: [1, {b: null}], c: 'x'}", &mut SimpleEnvironment, false, None).unwrap();
    let expected = r#"{"a":[1, {"b":null}], "c":"x"}"#;
    assert_eq!(dump_single_line(&value), expected);
    assert_eq!(value.to_string(), expected);
}

#[test]
fn test_dump_of_unresolved_call() {
    let value = eval("include(\"base.cjson\", [1])", &mut SimpleEnvironment, false, None).unwrap();
    assert_eq!(dump(&value), r#"include("base.cjson", [1])"#);
}

#[test]
fn test_json_output() {
    let map = eval_as_map(CONFIG, &mut SimpleEnvironment, false, None).unwrap();
    let json = serde_json::to_value(CjsonValue::Map(map)).unwrap();
    assert_eq!(
        json,
        json!({
            "name": "demo service",
            "debug": true,
            "limits": {"connections": 100, "ratio": 0.75},
            "hosts": ["alpha", "beta", "gamma\\1"],
        })
    );
}

#[test]
fn test_json_output_of_resolved_functions() {
    let mut registry = FunctionRegistry::with_standard_functions();
    registry.set_variable("env", "prod");
    let map = eval_as_map(
        "url: concat('https://', getCustomVariable(env), '.example.com')",
        &mut registry,
        false,
        None,
    )
    .unwrap();
    let json = serde_json::to_string(&CjsonValue::Map(map)).unwrap();
    assert_eq!(json, r#"{"url":"https://prod.example.com"}"#);
}

#[test]
fn test_json_output_keeps_every_digit() {
    let map = eval_as_map(
        "price: 12345678901234567890.123456789
id: 123456789012345678901234567890123",
        &mut SimpleEnvironment,
        false,
        None,
    )
    .unwrap();
    let json = serde_json::to_string(&CjsonValue::Map(map)).unwrap();
    assert_eq!(
        json,
        r#"{"price":12345678901234567890.123456789,"id":123456789012345678901234567890123}"#
    );
}

#[test]
fn test_dump_of_huge_numbers_evaluates_back() {
    let value = eval(
        "[1e100, 0.00000000000000000000000000001, -9e-40]",
        &mut SimpleEnvironment,
        false,
        None,
    )
    .unwrap();
    assert_eq!(dump_single_line(&value), "[1e100, 1e-29, -9e-40]");
    let again = eval(&dump(&value), &mut SimpleEnvironment, false, None).unwrap();
    assert_eq!(again, value);
    assert!(
        again
            .as_list()
            .unwrap()
            .iter()
            .all(|item| matches!(item, CjsonValue::BigDecimal(_)))
    );
}
