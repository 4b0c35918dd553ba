//! Commonly used selectors, in their data-model form.

use selstore_codec::Value;

fn recursive(sequence: Value) -> Value {
    Value::text_map([(
        "R",
        Value::text_map([
            ("l", Value::text_map([("none", Value::empty_map())])),
            (":>", sequence),
        ]),
    )])
}

fn explore_all_to_edge() -> Value {
    Value::text_map([(
        "a",
        Value::text_map([(">", Value::text_map([("@", Value::empty_map())]))]),
    )])
}

/// Matches only the node it starts at.
pub fn match_point() -> Value {
    Value::text_map([(".", Value::empty_map())])
}

/// Explores every reachable node without matching any.
///
/// `{"R":{"l":{"none":{}},":>":{"a":{">":{"@":{}}}}}}`
pub fn explore_all_recursively() -> Value {
    recursive(explore_all_to_edge())
}

/// Explores and matches every reachable node.
///
/// `{"R":{"l":{"none":{}},":>":{"|":[{".":{}},{"a":{">":{"@":{}}}}]}}}`
pub fn match_all_recursively() -> Value {
    recursive(Value::text_map([(
        "|",
        Value::Array(vec![match_point(), explore_all_to_edge()]),
    )]))
}

/// Explores a single named field, then applies `next`.
pub fn explore_field(field: &str, next: Value) -> Value {
    Value::text_map([(
        "f",
        Value::text_map([(
            "f>",
            Value::text_map([(field.to_string(), next)]),
        )]),
    )])
}
