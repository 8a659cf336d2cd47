/// Tuple transformer tests
///
/// Projection, nesting and duplicate-target behaviour of headers and the
/// transformer.
/// Run with: cargo test --test transform_tests
use relmap::{
    AttributeHeader, AttributeOptions, HeaderOptions, Key, RomError, Transformer, Tuple, Value,
    transform,
};

fn raw_user() -> Tuple {
    Tuple::new()
        .with("user_id", 1)
        .with("user_name", "Jane")
        .with("password_hash", "secret")
        .with("created_at", "2024-01-01")
}

#[test]
fn test_output_keys_are_exactly_the_header_targets() {
    let header = AttributeHeader::build(HeaderOptions::new().prefix("user").symbolize_keys(true), |h| {
        h.attribute("id");
        h.attribute("name");
        h.wrap_with("meta", HeaderOptions::new().no_prefix(), |w| {
            w.attribute("created_at");
        });
    })
    .unwrap();

    let mapped = transform(&header, &raw_user());
    let mut keys: Vec<&Key> = mapped.keys().collect();
    let mut targets = header.target_keys();
    keys.sort();
    targets.sort();
    assert_eq!(keys, targets);
    assert!(mapped.fetch("password_hash").is_none());
    assert!(mapped.fetch("user_id").is_none());
}

#[test]
fn test_sibling_wraps_are_independent() {
    let header = AttributeHeader::build(HeaderOptions::new().symbolize_keys(true), |h| {
        h.wrap("w1", |w| {
            w.attribute_with("x", AttributeOptions::new().source("a"));
        });
        h.wrap("w2", |w| {
            w.attribute_with("y", AttributeOptions::new().source("a"));
            w.attribute_with("z", AttributeOptions::new().source("b"));
        });
    })
    .unwrap();

    let mapped = transform(&header, &Tuple::new().with("a", 1).with("b", 2));
    assert_eq!(
        mapped,
        Tuple::new()
            .with(Key::sym("w1"), Tuple::new().with(Key::sym("x"), 1))
            .with(
                Key::sym("w2"),
                Tuple::new().with(Key::sym("y"), 1).with(Key::sym("z"), 2)
            )
    );
}

#[test]
fn test_missing_source_keys_become_null() {
    let header = AttributeHeader::build(HeaderOptions::new(), |h| {
        h.attribute("id");
        h.wrap("contact", |w| {
            w.attribute("email");
        });
    })
    .unwrap();

    let mapped = transform(&header, &Tuple::new());
    assert_eq!(mapped.fetch("id"), Some(&Value::Null));
    assert_eq!(
        mapped.fetch("contact"),
        Some(&Value::Tuple(Tuple::new().with("email", Value::Null)))
    );
}

#[test]
fn test_duplicate_targets_are_rejected() {
    let err = AttributeHeader::build(HeaderOptions::new().symbolize_keys(true), |h| {
        h.attribute("id");
        h.attribute_with(Key::sym("id"), AttributeOptions::new().source("user_id"));
    })
    .unwrap_err();
    assert!(matches!(err, RomError::DuplicateAttribute(_)));
}

#[test]
fn test_string_and_symbol_source_keys_are_both_read() {
    let header = AttributeHeader::identity(["id"]).unwrap();
    let from_symbol = transform(&header, &Tuple::new().with(Key::sym("id"), 5));
    assert_eq!(from_symbol, Tuple::new().with("id", 5));
}

#[test]
fn test_transformer_maps_many_lazily() {
    let header = AttributeHeader::identity(["n"]).unwrap();
    let transformer = Transformer::new(header);
    let raw = (0..3).map(|n| Tuple::new().with("n", n).with("skip", true));

    let mapped: Vec<Tuple> = transformer.map_all(raw).collect();
    assert_eq!(mapped.len(), 3);
    assert!(mapped.iter().all(|t| t.len() == 1));
    assert_eq!(mapped[2].fetch("n"), Some(&Value::Integer(2)));
}
