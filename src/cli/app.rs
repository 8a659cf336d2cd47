use anyhow::{Context, Result, anyhow};
use relmap::core::Tuple;
use relmap::header::{AttributeHeader, HeaderSpec};
use relmap::mapper::{Loaded, Mapper, ModelStrategy};
use serde_json::{Value as JsonValue, json};
use std::fs;
use std::path::Path;

fn read_header(path: &Path) -> Result<AttributeHeader> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read header spec '{}'", path.display()))?;
    let spec = HeaderSpec::from_json(&raw)
        .with_context(|| format!("Invalid header spec in '{}'", path.display()))?;
    AttributeHeader::from_spec(&spec)
        .with_context(|| format!("Failed to build header from '{}'", path.display()))
}

fn read_tuples(path: &Path) -> Result<Vec<Tuple>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tuples '{}'", path.display()))?;
    let json: JsonValue = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in '{}'", path.display()))?;

    let items = json
        .as_array()
        .ok_or_else(|| anyhow!("Expected a JSON array of objects in '{}'", path.display()))?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_object()
                .map(Tuple::from_json_object)
                .ok_or_else(|| anyhow!("Element {} of '{}' is not an object", idx, path.display()))
        })
        .collect()
}

fn loaded_to_json(loaded: &Loaded) -> JsonValue {
    match loaded {
        Loaded::Tuple(tuple) => tuple.to_json(),
        Loaded::Model(model) => json!({
            "model": model.name(),
            "attributes": model.attributes().to_json(),
        }),
    }
}

/// Map every tuple of `tuples` through the header in `header` and render
/// the result as a JSON array.
pub fn map_tuples(header: &Path, tuples: &Path, model: Option<&str>, pretty: bool) -> Result<String> {
    let header = read_header(header)?;
    let strategy = model.map(|name| ModelStrategy::named(name)).unwrap_or_default();
    let mapper = Mapper::new("cli", header).with_model(strategy);

    let mapped: Vec<JsonValue> = read_tuples(tuples)?
        .iter()
        .map(|tuple| loaded_to_json(&mapper.load(tuple)))
        .collect();
    let output = JsonValue::Array(mapped);

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(rendered)
}

/// Build the header and render its attribute tree.
pub fn check_header(header: &Path) -> Result<String> {
    let header = read_header(header)?;
    Ok(format!("{}", header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const HEADER: &str = r#"{
        "symbolize_keys": true,
        "attributes": [
            {"kind": "attribute", "name": "id", "from": "user_id"},
            {"kind": "wrap", "name": "contact", "prefix": "contact", "attributes": [
                {"kind": "attribute", "name": "email"}
            ]}
        ]
    }"#;

    #[test]
    fn test_map_tuples() {
        let header = file(HEADER);
        let tuples = file(r#"[{"user_id": 1, "contact_email": "jane@doe.org", "ignored": true}]"#);

        let output = map_tuples(header.path(), tuples.path(), None, false).unwrap();
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"id": 1, "contact": {"email": "jane@doe.org"}}]));
    }

    #[test]
    fn test_map_tuples_with_model() {
        let header = file(HEADER);
        let tuples = file(r#"[{"user_id": 2}]"#);

        let output = map_tuples(header.path(), tuples.path(), Some("User"), true).unwrap();
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["model"], json!("User"));
        assert_eq!(parsed[0]["attributes"]["contact"]["email"], JsonValue::Null);
    }

    #[test]
    fn test_map_rejects_non_array() {
        let header = file(HEADER);
        let tuples = file(r#"{"user_id": 1}"#);
        assert!(map_tuples(header.path(), tuples.path(), None, false).is_err());
    }

    #[test]
    fn test_check_reports_duplicates() {
        let header = file(
            r#"{"attributes": [
                {"kind": "attribute", "name": "id"},
                {"kind": "attribute", "name": "id"}
            ]}"#,
        );
        let err = check_header(header.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate"));
    }

    #[test]
    fn test_check_prints_tree() {
        let header = file(HEADER);
        let tree = check_header(header.path()).unwrap();
        assert!(tree.contains("contact"));
    }
}
