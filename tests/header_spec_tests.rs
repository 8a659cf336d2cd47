/// Header spec tests
///
/// The JSON header declaration against the closure DSL.
/// Run with: cargo test --test header_spec_tests
use relmap::{AttributeHeader, HeaderOptions, HeaderSpec, Key, Mapper, RomError, Tuple};

const USERS: &str = r#"{
    "symbolize_keys": true,
    "inherit_header": false,
    "prefix": "user",
    "attributes": [
        {"kind": "attribute", "name": ":id"},
        {"kind": "wrap", "name": ":details", "prefix": "first", "attributes": [
            {"kind": "attribute", "name": ":name"}
        ]},
        {"kind": "wrap", "name": ":contact", "prefix": false, "attributes": [
            {"kind": "attribute", "name": ":email"}
        ]}
    ]
}"#;

#[test]
fn test_json_and_dsl_build_the_same_header() {
    let from_json = AttributeHeader::from_spec(&HeaderSpec::from_json(USERS).unwrap()).unwrap();
    let from_dsl = AttributeHeader::build(
        HeaderOptions::new().symbolize_keys(true).inherit_header(false).prefix("user"),
        |h| {
            h.attribute(Key::sym("id"));
            h.wrap_with(Key::sym("details"), HeaderOptions::new().prefix("first"), |w| {
                w.attribute(Key::sym("name"));
            });
            h.wrap_with(Key::sym("contact"), HeaderOptions::new().no_prefix(), |w| {
                w.attribute(Key::sym("email"));
            });
        },
    )
    .unwrap();

    assert_eq!(from_json, from_dsl);
}

#[test]
fn test_json_spec_maps_like_the_dsl() {
    let header = AttributeHeader::from_spec(&HeaderSpec::from_json(USERS).unwrap()).unwrap();
    let mapper = Mapper::new("users", header);

    let loaded = mapper.load(
        &Tuple::new()
            .with("user_id", 123)
            .with("first_name", "Jane")
            .with("email", "jane@doe.org"),
    );
    assert_eq!(
        loaded.into_tuple(),
        Tuple::new()
            .with(Key::sym("id"), 123)
            .with(Key::sym("details"), Tuple::new().with(Key::sym("name"), "Jane"))
            .with(Key::sym("contact"), Tuple::new().with(Key::sym("email"), "jane@doe.org"))
    );
}

#[test]
fn test_spec_round_trips_through_json() {
    let spec = HeaderSpec::from_json(USERS).unwrap();
    let again = HeaderSpec::from_json(&spec.to_json().unwrap()).unwrap();
    assert_eq!(spec, again);
}

#[test]
fn test_malformed_spec_is_invalid_header() {
    let err = HeaderSpec::from_json(r#"{"attributes": [{"kind": "explode", "name": "x"}]}"#).unwrap_err();
    assert!(matches!(err, RomError::InvalidHeader(_)));
}

#[test]
fn test_duplicate_in_json_spec() {
    let spec = HeaderSpec::from_json(
        r#"{"symbolize_keys": true, "attributes": [
            {"kind": "attribute", "name": "id"},
            {"kind": "attribute", "name": ":id", "from": "user_id"}
        ]}"#,
    )
    .unwrap();
    assert!(matches!(
        AttributeHeader::from_spec(&spec),
        Err(RomError::DuplicateAttribute(_))
    ));
}
