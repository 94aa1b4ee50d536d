use payload_paths_core::{
    extract_subsection, FieldDescriptor, PayloadError, PayloadResult, SubsectionExtractor,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const JSON: Option<&str> = Some("application/json");
const XML: Option<&str> = Some("application/xml");

fn extract(path: &str, payload: &str, descriptors: &[FieldDescriptor]) -> PayloadResult<Value> {
    let bytes = extract_subsection(payload.as_bytes(), JSON, path, descriptors)?;
    Ok(serde_json::from_slice(&bytes).expect("extracted subsection is valid JSON"))
}

#[test]
fn test_map_subsection_of_map() {
    let extracted = extract("a.b", r#"{"a":{"b":{"c":5}}}"#, &[]).unwrap();
    assert_eq!(extracted, json!({"c": 5}));
}

#[test]
fn test_single_element_array_subsection() {
    let extracted = extract("a.[]", r#"{"a":[{"b":5}]}"#, &[]).unwrap();
    assert_eq!(extracted, json!({"b": 5}));
}

#[test]
fn test_multi_element_array_subsection() {
    let extracted = extract("a", r#"{"a":[{"b":5},{"b":4}]}"#, &[]).unwrap();
    let keys: Vec<&String> = extracted.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["b"]);
}

#[test]
fn test_map_subsection_from_single_element_array() {
    let extracted = extract("a.[].b", r#"{"a":[{"b":{"c":5}}]}"#, &[]).unwrap();
    assert_eq!(extracted, json!({"c": 5}));
}

#[test]
fn test_common_structure_from_multi_element_array() {
    let extracted = extract("a.[].b", r#"{"a":[{"b":{"c":5}},{"b":{"c":6}}]}"#, &[]).unwrap();
    let keys: Vec<&String> = extracted.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["c"]);
}

#[test]
fn test_varying_structure_from_multi_element_array() {
    let err = extract("a.[].b", r#"{"a":[{"b":{"c":5}},{"b":{"c":6, "d": 7}}]}"#, &[])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The following non-optional uncommon paths were found: [a.[].b.d]"
    );
    assert_eq!(err.paths(), vec!["a.[].b.d"]);
}

#[test]
fn test_varying_structure_from_inconsistent_map() {
    let err = extract("*.d", r#"{"a":{"b":1},"c":{"d":{"e":1,"f":2}}}"#, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The following non-optional uncommon paths were found: [*.d, *.d.e, *.d.f]"
    );
}

#[test]
fn test_inconsistent_map_where_all_subsection_fields_are_optional() {
    let err = extract(
        "*.d",
        r#"{"a":{"b":1},"c":{"d":{"e":1,"f":2}}}"#,
        &[
            FieldDescriptor::new("e").optional(),
            FieldDescriptor::new("f").optional(),
        ],
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The following non-optional uncommon paths were found: [*.d]"
    );
}

#[test]
fn test_varying_structure_due_to_optional_field() {
    let extracted = extract(
        "a.[].b",
        r#"{"a":[{"b":{"c":5}},{"b":{"c":6, "d": 7}}]}"#,
        &[FieldDescriptor::new("d").optional()],
    )
    .unwrap();
    assert_eq!(extracted, json!({"c": 5}));
}

#[test]
fn test_varying_structure_due_to_optional_parent_field() {
    let extracted = extract(
        "a.[].b",
        r#"{"a":[{"b":{"c":5}},{"b":{"c":6, "d": { "e": 7}}}]}"#,
        &[FieldDescriptor::new("d").optional()],
    )
    .unwrap();
    assert_eq!(extracted, json!({"c": 5}));
}

#[test]
fn test_optional_field_with_differing_types_is_tolerated() {
    let extracted = extract(
        "a.[].b",
        r#"{"a":[{"b":{"c":5,"d":"x"}},{"b":{"c":6,"d":7}}]}"#,
        &[FieldDescriptor::new("d").optional()],
    )
    .unwrap();
    assert_eq!(extracted, json!({"c": 5, "d": "x"}));
}

#[test]
fn test_nested_divergence_below_merge_point() {
    let err = extract(
        "a",
        r#"{"a":[{"b":{"c":{"x":1}}},{"b":{"c":{"x":1,"y":2}}}]}"#,
        &[],
    )
    .unwrap_err();
    assert_eq!(err.paths(), vec!["a.b.c.y"]);
}

#[test]
fn test_pretty_printed_input_gives_pretty_output() {
    let payload = serde_json::to_vec_pretty(&json!({"a": {"b": {"c": 1}}})).unwrap();
    let extracted = SubsectionExtractor::new("a.b")
        .unwrap()
        .extract(&payload, JSON)
        .unwrap();
    let expected = serde_json::to_vec_pretty(&json!({"c": 1})).unwrap();
    assert_eq!(
        String::from_utf8(extracted).unwrap(),
        String::from_utf8(expected).unwrap()
    );
}

#[test]
fn test_compact_input_gives_compact_output() {
    let payload = serde_json::to_vec(&json!({"a": {"b": {"c": 1}}})).unwrap();
    let extracted = SubsectionExtractor::new("a.b")
        .unwrap()
        .extract(&payload, JSON)
        .unwrap();
    assert_eq!(String::from_utf8(extracted).unwrap(), r#"{"c":1}"#);
}

#[test]
fn test_four_space_indent_is_kept() {
    let payload = "{\n    \"a\": {\n        \"b\": [\n            1\n        ]\n    }\n}";
    let extracted = SubsectionExtractor::new("a")
        .unwrap()
        .extract(payload.as_bytes(), JSON)
        .unwrap();
    assert_eq!(
        String::from_utf8(extracted).unwrap(),
        "{\n    \"b\": [\n        1\n    ]\n}"
    );
}

#[test]
fn test_non_existent_subsection() {
    let err = extract("a.c", r#"{"a":{"b":{"c":5}}}"#, &[]).unwrap_err();
    assert_eq!(err, PayloadError::PathNotFound("a.c".into()));
    assert_eq!(err.to_string(), "a.c does not identify a section of the payload");
}

#[test]
fn test_empty_array_subsection() {
    let err = extract("a", r#"{"a":[]}"#, &[]).unwrap_err();
    assert_eq!(err.to_string(), "a identifies an empty section of the payload");
}

#[test]
fn test_empty_array_subsection_with_trailing_brace() {
    let err = extract("a", r#"{"a":[]}}"#, &[]).unwrap_err();
    assert_eq!(err, PayloadError::EmptySection("a".into()));
}

#[test]
fn test_wide_numbers_are_kept_exactly() {
    let section = r#"{"b":123456789012345678901234567890,"c":3.14159265358979323846264338327950288}"#;
    let payload = format!(r#"{{"a":{section}}}"#);
    let bytes = SubsectionExtractor::new("a")
        .unwrap()
        .extract(payload.as_bytes(), JSON)
        .unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), section);
}

#[test]
fn test_unparsable_payload() {
    let err = extract("a", r#"{"a":"#, &[]).unwrap_err();
    assert!(matches!(err, PayloadError::UnparsablePayload { .. }));
}

#[test]
fn test_xml_subsection() {
    let payload = r#"<order id="7"><item sku="a"><qty>1</qty></item><item sku="b"><qty>2</qty></item></order>"#;
    let extracted = SubsectionExtractor::new("order.item")
        .unwrap()
        .extract(payload.as_bytes(), XML)
        .unwrap();
    assert_eq!(
        String::from_utf8(extracted).unwrap(),
        r#"<item sku="a"><qty>1</qty></item>"#
    );
}

#[test]
fn test_xml_attribute_subsection() {
    let payload = r#"<order id="7"><qty>1</qty></order>"#;
    let extracted = SubsectionExtractor::new("order.@id")
        .unwrap()
        .extract(payload.as_bytes(), XML)
        .unwrap();
    assert_eq!(String::from_utf8(extracted).unwrap(), "7");
}

#[test]
fn test_xml_text_subsection() {
    let payload = r#"<x unit="kg">12</x>"#;
    let extracted = SubsectionExtractor::new("x.#text")
        .unwrap()
        .extract(payload.as_bytes(), XML)
        .unwrap();
    assert_eq!(String::from_utf8(extracted).unwrap(), "12");
}

#[test]
fn test_xml_uncommon_elements() {
    let payload = "<order><item><qty>1</qty></item><item><qty>2</qty><note>gift</note></item></order>";
    let err = SubsectionExtractor::new("order.item")
        .unwrap()
        .extract(payload.as_bytes(), XML)
        .unwrap_err();
    assert_eq!(err.paths(), vec!["order.item.note"]);
}

#[test]
fn test_xml_pretty_output() {
    let payload = "<a>\n  <b>\n    <c>1</c>\n  </b>\n</a>\n";
    let extracted = SubsectionExtractor::new("a.b")
        .unwrap()
        .extract(payload.as_bytes(), None)
        .unwrap();
    assert_eq!(String::from_utf8(extracted).unwrap(), "<b>\n  <c>1</c>\n</b>");
}
