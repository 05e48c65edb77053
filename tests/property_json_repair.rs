//! Property: JSON already well-formed needs no repair pass and round-trips
//! through `json_repair::extract` unchanged.

use proptest::prelude::*;
use serde_json::Value;
use taskwing_core::services::json_repair;

fn arb_json_value(depth: u32) -> BoxedStrategy<Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];

    if depth == 0 {
        return leaf.boxed();
    }

    prop_oneof![
        2 => leaf,
        1 => proptest::collection::vec(arb_json_value(depth - 1), 0..4).prop_map(Value::Array),
        1 => proptest::collection::vec(("[a-zA-Z][a-zA-Z0-9]{0,8}", arb_json_value(depth - 1)), 0..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect())),
    ]
    .boxed()
}

proptest! {
    /// Serializing any generated JSON value and feeding it straight back
    /// through the repair pipeline returns the same value: a well-formed
    /// payload is recognized on the first parse attempt, no repair pass
    /// changes it.
    #[test]
    fn already_valid_json_round_trips(value in arb_json_value(3)) {
        let raw = serde_json::to_string_pretty(&value).unwrap();
        let extracted: Value = json_repair::extract(&raw)
            .unwrap_or_else(|e| panic!("already-valid JSON failed to parse: {e}"));
        prop_assert_eq!(extracted, value);
    }

    /// The same payload, embedded as an object field inside surrounding
    /// prose (no markdown fence), still round-trips: brace-locating finds
    /// the object and discards the prose on either side.
    #[test]
    fn valid_json_embedded_in_prose_round_trips(value in arb_json_value(2)) {
        let wrapped_value = serde_json::json!({ "value": value });
        let raw = serde_json::to_string(&wrapped_value).unwrap();
        let embedded = format!("Sure, here is the result: {raw} hope that helps!");
        let extracted: Value = json_repair::extract(&embedded)
            .unwrap_or_else(|e| panic!("embedded JSON failed to parse: {e}"));
        prop_assert_eq!(extracted, wrapped_value);
    }
}
