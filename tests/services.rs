// ABOUTME: Property tests for service extraction from compose files.
// ABOUTME: Checks ordering, the catch-all entry, and leniency on arbitrary input.

use bosun::compose::{ALL_SERVICES, extract_services};
use proptest::prelude::*;

/// Generates a list of distinct service names in a random order.
fn arb_service_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_-]{0,15}", 1..8).prop_map(|names| {
        let mut seen = std::collections::HashSet::new();
        names
            .into_iter()
            .filter(|n| n != "null" && seen.insert(n.clone()))
            .collect()
    })
}

fn compose_text(names: &[String]) -> String {
    let mut text = String::from("services:\n");
    for name in names {
        text.push_str(&format!("  {name}:\n    image: busybox\n"));
    }
    text
}

proptest! {
    #[test]
    fn arbitrary_text_never_fails_and_ends_with_catch_all(text in ".*") {
        let services = extract_services(&text);
        prop_assert_eq!(services.last().as_str(), ALL_SERVICES);
    }

    #[test]
    fn declared_services_keep_declaration_order(names in arb_service_names()) {
        let services: Vec<String> = extract_services(&compose_text(&names)).into();

        let mut expected = names.clone();
        expected.push(ALL_SERVICES.to_string());
        prop_assert_eq!(services, expected);
    }

    #[test]
    fn extraction_is_deterministic(names in arb_service_names()) {
        let text = compose_text(&names);
        prop_assert_eq!(extract_services(&text), extract_services(&text));
    }
}

#[test]
fn empty_text_yields_catch_all_only() {
    let services: Vec<String> = extract_services("").into();
    assert_eq!(services, vec![ALL_SERVICES]);
}

#[test]
fn malformed_text_yields_catch_all_only() {
    let services: Vec<String> = extract_services("services: [unclosed").into();
    assert_eq!(services, vec![ALL_SERVICES]);
}

#[test]
fn text_without_services_section_yields_catch_all_only() {
    let services: Vec<String> = extract_services("volumes:\n  data:\n").into();
    assert_eq!(services, vec![ALL_SERVICES]);
}

#[test]
fn bare_service_keys_are_listed() {
    let services: Vec<String> = extract_services("services:\n  web:\n  db:\n").into();
    assert_eq!(services, vec!["web", "db", ALL_SERVICES]);
}

#[test]
fn three_services_in_declaration_order() {
    let text = r#"
services:
  c:
    image: redis
  a:
    image: nginx
  b:
    image: postgres
"#;
    let services: Vec<String> = extract_services(text).into();
    assert_eq!(services, vec!["c", "a", "b", ALL_SERVICES]);
}
