//! Property tests over parsing and rendering.

use proptest::prelude::*;
use serde_json::json;
use stencil::Engine;

proptest! {
    /// Text without tag markers passes through byte-exact.
    #[test]
    fn literal_text_is_identity(text in "[a-zA-Z0-9 .,!\n]{0,60}") {
        let engine = Engine::parse(&text).unwrap();
        prop_assert_eq!(engine.render_to_string(&json!({})).unwrap(), text.clone());
        prop_assert_eq!(engine.placeholder_text(), text);
    }

    /// A single expression renders its bound value wherever it sits.
    #[test]
    fn expression_renders_bound_value(
        key in "[a-z]{1,8}",
        value in "[a-zA-Z0-9]{0,12}",
        prefix in "[a-z ]{0,20}",
        suffix in "[a-z ]{0,20}",
    ) {
        let template = format!("{prefix}{{{{{key}}}}}{suffix}");
        let engine = Engine::parse(&template).unwrap();
        let mut root = serde_json::Map::new();
        root.insert(key, serde_json::Value::String(value.clone()));
        let rendered = engine
            .render_to_string(&serde_json::Value::Object(root))
            .unwrap();
        prop_assert_eq!(rendered, format!("{prefix}{value}{suffix}"));
    }

    /// Rendering the same parsed engine twice gives the same output.
    #[test]
    fn rerender_is_deterministic(
        items in prop::collection::vec("[a-z]{0,6}", 0..8),
        flag in any::<bool>(),
    ) {
        let engine = Engine::parse(
            "{% if flag %}on {% endif %}{% for v in items %}<{{v}}>{% endfor %}",
        )
        .unwrap();
        let data = json!({
            "items": items,
            "flag": if flag { "1" } else { "" },
        });
        let first = engine.render_to_string(&data).unwrap();
        let second = engine.render_to_string(&data).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Loop output is the body stamped once per element, in order.
    #[test]
    fn loop_stamps_in_order(items in prop::collection::vec("[a-z]{0,6}", 0..8)) {
        let engine = Engine::parse("{% for v in items %}<{{v}}>{% endfor %}").unwrap();
        let rendered = engine.render_to_string(&json!({"items": items})).unwrap();
        let expected: String = items.iter().map(|v| format!("<{v}>")).collect();
        prop_assert_eq!(rendered, expected);
    }
}
