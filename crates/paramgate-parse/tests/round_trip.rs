//! Integration test: values serialized in each wire style parse back to
//! the values a client meant to send.

use std::collections::BTreeMap;

use paramgate_core::{ParamMap, ParameterLocation, ParameterStyle};
use paramgate_parse::{ParserInference, SplitterArrayParser, StringValueParser, ValueParser};
use paramgate_schema::SchemaRepository;

use proptest::prelude::*;
use serde_json::{json, Value};

fn int_array_schema() -> Value {
    json!({"type": "array", "items": {"type": "integer"}})
}

fn parse_at(
    location: ParameterLocation,
    style: ParameterStyle,
    explode: bool,
    schema: &Value,
    params: &ParamMap,
) -> Option<Value> {
    let repo = SchemaRepository::new();
    let parser = ParserInference::new(&repo)
        .parameter_parser("v", location, style, explode, schema)
        .unwrap();
    parser.parse_parameter(params).unwrap()
}

fn parse_query(style: ParameterStyle, explode: bool, schema: &Value, params: &ParamMap) -> Option<Value> {
    parse_at(ParameterLocation::Query, style, explode, schema, params)
}

fn parse_path(style: ParameterStyle, explode: bool, schema: &Value, raw: String) -> Option<Value> {
    let params: ParamMap = [("v", raw)].into_iter().collect();
    parse_at(ParameterLocation::Path, style, explode, schema, &params)
}

fn joined<T: ToString>(items: &[T], delimiter: &str) -> String {
    items.iter().map(T::to_string).collect::<Vec<_>>().join(delimiter)
}

fn join_entries(entries: &BTreeMap<String, String>, pair: &str, delimiter: &str) -> String {
    entries
        .iter()
        .map(|(k, v)| format!("{k}{pair}{v}"))
        .collect::<Vec<_>>()
        .join(delimiter)
}

fn integer_map_schema() -> Value {
    json!({"type": "object", "additionalProperties": {"type": "integer"}})
}

proptest! {
    /// Integer arrays joined with any collection delimiter split back.
    #[test]
    fn delimited_integer_arrays(
        items in prop::collection::vec(any::<i64>(), 1..8),
        delimiter in prop::sample::select(vec![",", " ", "|"]),
    ) {
        let joined = items.iter().map(i64::to_string).collect::<Vec<_>>().join(delimiter);
        let parser = SplitterArrayParser::new(delimiter, paramgate_parse::PrimitiveParser::Integer.into());
        prop_assert_eq!(parser.parse(joined.as_str()).unwrap(), json!(items));
    }

    /// Query arrays in every non-exploded style carry the same items.
    #[test]
    fn query_array_styles(items in prop::collection::vec(-1000i64..1000, 1..6)) {
        let schema = int_array_schema();
        let cases = [
            (ParameterStyle::Form, ","),
            (ParameterStyle::SpaceDelimited, " "),
            (ParameterStyle::PipeDelimited, "|"),
        ];
        for (style, delimiter) in cases {
            let joined = items.iter().map(i64::to_string).collect::<Vec<_>>().join(delimiter);
            let params: ParamMap = [("v", joined)].into_iter().collect();
            prop_assert_eq!(parse_query(style, false, &schema, &params), Some(json!(items)));
        }
    }

    /// `k,v` pairs of string properties come back as the same object.
    #[test]
    fn pairs_object(entries in prop::collection::btree_map("[a-z]{1,5}", "[a-z0-9]{1,5}", 1..5)) {
        let schema = json!({"type": "object"});
        let serialized = entries
            .iter()
            .flat_map(|(k, v)| [k.as_str(), v.as_str()])
            .collect::<Vec<_>>()
            .join(",");
        let params: ParamMap = [("v", serialized)].into_iter().collect();
        prop_assert_eq!(parse_query(ParameterStyle::Form, false, &schema, &params), Some(json!(entries)));
    }

    /// Any string survives the pass-through parser untouched.
    #[test]
    fn string_passthrough(raw in ".*") {
        prop_assert_eq!(StringValueParser::string().parse(raw.as_str()).unwrap(), Value::String(raw.clone()));
    }
}

#[test]
fn test_exploded_form_array_from_query_string() {
    let params = ParamMap::from_urlencoded("v=1&other=x&v=2");
    assert_eq!(
        parse_query(ParameterStyle::Form, true, &int_array_schema(), &params),
        Some(json!([1, 2]))
    );
}

fn object_entries() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,5}", "[a-z0-9]{1,5}", 1..5)
}

proptest! {
    /// String arrays keep empty items, including a lone empty item.
    #[test]
    fn string_arrays_keep_empty_items(items in prop::collection::vec("[a-z]{0,4}", 1..5)) {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        let cases = [
            (ParameterStyle::Form, ","),
            (ParameterStyle::PipeDelimited, "|"),
        ];
        for (style, delimiter) in cases {
            let params: ParamMap = [("v", joined(&items, delimiter))].into_iter().collect();
            prop_assert_eq!(parse_query(style, false, &schema, &params), Some(json!(items)));
        }
        prop_assert_eq!(
            parse_path(ParameterStyle::Simple, false, &schema, joined(&items, ",")),
            Some(json!(items))
        );
    }

    /// Repeated query values of typed items come back in order.
    #[test]
    fn exploded_typed_arrays(
        numbers in prop::collection::vec(any::<i64>(), 1..6),
        flags in prop::collection::vec(any::<bool>(), 1..6),
    ) {
        let mut params = ParamMap::new();
        for n in &numbers {
            params.append("v", n.to_string());
        }
        prop_assert_eq!(
            parse_query(ParameterStyle::Form, true, &int_array_schema(), &params),
            Some(json!(numbers))
        );

        let mut params = ParamMap::new();
        for f in &flags {
            params.append("v", f.to_string());
        }
        let schema = json!({"type": "array", "items": {"type": "boolean"}});
        prop_assert_eq!(parse_query(ParameterStyle::Form, true, &schema, &params), Some(json!(flags)));
    }

    /// Label and matrix arrays, exploded or not.
    #[test]
    fn label_and_matrix_arrays(items in prop::collection::vec(-1000i64..1000, 1..6)) {
        let schema = int_array_schema();
        let expected = Some(json!(items));
        let cases = [
            (ParameterStyle::Label, false, format!(".{}", joined(&items, ","))),
            (ParameterStyle::Label, true, format!(".{}", joined(&items, "."))),
            (ParameterStyle::Matrix, false, format!(";v={}", joined(&items, ","))),
            (ParameterStyle::Matrix, true, format!(";v={}", joined(&items, ";v="))),
        ];
        for (style, explode, raw) in cases {
            prop_assert_eq!(parse_path(style, explode, &schema, raw), expected.clone());
        }
    }

    /// `name[key]=value` query keys of integer properties.
    #[test]
    fn deep_objects(entries in prop::collection::btree_map("[a-z]{1,5}", any::<i32>(), 1..5)) {
        let params: ParamMap = entries
            .iter()
            .map(|(k, v)| (format!("v[{k}]"), v.to_string()))
            .collect();
        prop_assert_eq!(
            parse_query(ParameterStyle::DeepObject, true, &integer_map_schema(), &params),
            Some(json!(entries))
        );
    }

    /// Object properties spread over top-level query keys.
    #[test]
    fn exploded_form_objects(entries in prop::collection::btree_map("[a-z]{1,5}", any::<i32>(), 1..5)) {
        let params: ParamMap = entries.iter().map(|(k, v)| (k.as_str(), v.to_string())).collect();
        prop_assert_eq!(
            parse_query(ParameterStyle::Form, true, &integer_map_schema(), &params),
            Some(json!(entries))
        );
    }

    /// Simple, label and matrix objects in `k,v` and `k=v` forms.
    #[test]
    fn path_objects(entries in object_entries()) {
        let schema = json!({"type": "object"});
        let expected = Some(json!(entries));
        let cases = [
            (ParameterStyle::Simple, false, join_entries(&entries, ",", ",")),
            (ParameterStyle::Simple, true, join_entries(&entries, "=", ",")),
            (ParameterStyle::Label, false, format!(".{}", join_entries(&entries, ",", ","))),
            (ParameterStyle::Label, true, format!(".{}", join_entries(&entries, "=", "."))),
            (ParameterStyle::Matrix, false, format!(";v={}", join_entries(&entries, ",", ","))),
            (ParameterStyle::Matrix, true, format!(";{}", join_entries(&entries, "=", ";"))),
        ];
        for (style, explode, raw) in cases {
            prop_assert_eq!(parse_path(style, explode, &schema, raw), expected.clone());
        }
    }
}

