use payload_capture_privacy::{process_json, FieldRules, JsonPath};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const ORDER: &str = r#"{
  "customer": {"id": "c-9", "email": "c9@example.com", "cards": [{"pan": "4111"}, {"pan": "5500"}]},
  "lines": [{"sku": "A", "qty": 2}, {"sku": "B", "qty": 1}],
  "note": null
}"#;

#[test]
fn redaction_applied_twice_equals_once() {
    let redact = strings(&["$.customer.email", "$.customer.cards[*].pan", "$..qty"]);
    let rules = FieldRules {
        redact: &redact,
        ..FieldRules::default()
    };
    let once = process_json(ORDER, &rules).unwrap();
    let twice = process_json(&once.body, &rules).unwrap();
    assert_eq!(once, twice);

    let parsed: Value = serde_json::from_str(&once.body).unwrap();
    assert_eq!(parsed["customer"]["cards"], json!([{"pan": ""}, {"pan": ""}]));
    assert_eq!(parsed["lines"][0], json!({"sku": "A", "qty": ""}));
    assert_eq!(parsed["customer"]["id"], json!("c-9"));
}

#[test]
fn redacted_output_keeps_key_order() {
    let redact = strings(&["$.customer.email"]);
    let rules = FieldRules {
        redact: &redact,
        ..FieldRules::default()
    };
    let out = process_json(ORDER, &rules).unwrap();
    let customer = out.body.find("\"customer\"").unwrap();
    let lines = out.body.find("\"lines\"").unwrap();
    let note = out.body.find("\"note\"").unwrap();
    assert!(customer < lines && lines < note);
}

#[test]
fn bad_paths_do_not_stop_other_paths() {
    let extract = strings(&["$.lines[?(@.qty)]", "$.lines[*].sku", "$.note", "$.absent.deep"]);
    let rules = FieldRules {
        extract: &extract,
        user_id: Some("$.customer.id"),
        ..FieldRules::default()
    };
    let out = process_json(ORDER, &rules).unwrap();
    assert_eq!(out.body, ORDER);
    assert_eq!(out.attributes.get("sku").map(String::as_str), Some("A,B"));
    assert_eq!(out.attributes.get("note").map(String::as_str), Some("null"));
    assert!(!out.attributes.contains_key("deep"));
    assert_eq!(
        out.attributes
            .get(payload_capture_types::attributes::USER_ID)
            .map(String::as_str),
        Some("c-9")
    );
}

#[test]
fn paths_display_as_written() {
    let path = JsonPath::parse("customer.cards[0].pan").unwrap();
    assert_eq!(path.to_string(), "customer.cards[0].pan");
    let document: Value = serde_json::from_str(ORDER).unwrap();
    assert_eq!(path.select(&document), vec![&json!("4111")]);
}
