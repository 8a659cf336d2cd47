use std::collections::HashSet;
use crate::core::{Key, Result, RomError};
use super::spec::{AttributeDirective, AttributeOptions, Prefix};
use super::{AttributeHeader, AttributeKind, AttributeSpec, ResolvedOptions};

/// Resolve one block of directives under already resolved block options.
pub(super) fn resolve(
    directives: &[AttributeDirective],
    options: ResolvedOptions,
) -> Result<AttributeHeader> {
    // Excludes match by name, whatever the key type.
    let excluded: HashSet<&str> = directives
        .iter()
        .filter(|d| d.is_exclude())
        .map(|d| d.name().name())
        .collect();

    let mut attributes = Vec::with_capacity(directives.len());
    let mut seen: HashSet<Key> = HashSet::new();

    for directive in directives {
        if !directive.is_exclude() && excluded.contains(directive.name().name()) {
            continue;
        }

        let attribute = match directive {
            AttributeDirective::Attribute { name, options: attr } => {
                resolve_scalar(name, attr, &options)?
            }
            AttributeDirective::Wrap {
                name,
                options: block,
                attributes: nested,
            } => {
                check_name(name)?;
                let nested_options = options.nested(block);
                let target = target_key(name, nested_options.symbolize_keys);
                let header = resolve(nested, nested_options)?;
                AttributeSpec::group(AttributeKind::Wrap, name.clone(), target, header)
            }
            AttributeDirective::Unwrap {
                name,
                options: block,
                attributes: nested,
            } => {
                check_name(name)?;
                let header = resolve(nested, options.nested(block))?;
                AttributeSpec::group(AttributeKind::Unwrap, name.clone(), name.clone(), header)
            }
            AttributeDirective::Exclude { .. } => continue,
        };

        let written: Vec<Key> = match (attribute.kind(), attribute.header()) {
            (AttributeKind::Unwrap, Some(nested)) => {
                nested.target_keys().into_iter().cloned().collect()
            }
            _ => vec![attribute.target_key().clone()],
        };
        for key in written {
            if !seen.insert(key.clone()) {
                return Err(RomError::DuplicateAttribute(key.to_string()));
            }
        }

        attributes.push(attribute);
    }

    Ok(AttributeHeader::from_parts(attributes, options))
}

fn resolve_scalar(
    name: &Key,
    attr: &AttributeOptions,
    block: &ResolvedOptions,
) -> Result<AttributeSpec> {
    check_name(name)?;

    let source_key = match &attr.from {
        Some(from) if from.is_empty() => {
            return Err(RomError::InvalidHeader(format!(
                "attribute {} has an empty source key",
                name
            )));
        }
        Some(from) => from.clone(),
        None => {
            let prefix = match &attr.prefix {
                Some(Prefix::Disabled) => None,
                Some(Prefix::Name(prefix)) => Some(prefix.as_str()),
                None => block.prefix.as_deref(),
            };
            compose_source(prefix, name.name())?
        }
    };

    let symbolize = attr.symbolize_keys.unwrap_or(block.symbolize_keys);
    Ok(AttributeSpec::scalar(
        name.clone(),
        source_key,
        target_key(name, symbolize),
    ))
}

fn compose_source(prefix: Option<&str>, name: &str) -> Result<String> {
    match prefix {
        Some("") => Err(RomError::InvalidHeader(format!(
            "empty prefix for attribute '{}'",
            name
        ))),
        Some(prefix) => Ok(format!("{}_{}", prefix, name)),
        None => Ok(name.to_string()),
    }
}

fn target_key(name: &Key, symbolize: bool) -> Key {
    if symbolize {
        name.to_symbol()
    } else {
        name.clone()
    }
}

fn check_name(name: &Key) -> Result<()> {
    if name.name().is_empty() {
        return Err(RomError::InvalidHeader("attribute name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderOptions;

    #[test]
    fn test_unwrap_target_is_its_name() {
        let directives = vec![AttributeDirective::Unwrap {
            name: Key::str("address"),
            options: HeaderOptions::default(),
            attributes: vec![AttributeDirective::Attribute {
                name: Key::str("city"),
                options: AttributeOptions::default(),
            }],
        }];
        let header = resolve(&directives, ResolvedOptions::default()).unwrap();
        let unwrap = &header.attributes()[0];
        assert_eq!(unwrap.kind(), AttributeKind::Unwrap);
        assert_eq!(unwrap.source_key(), "address");
        assert_eq!(header.target_keys(), vec![&Key::str("city")]);
    }

    #[test]
    fn test_exclude_matches_symbol_keys_by_name() {
        let directives = vec![
            AttributeDirective::Attribute {
                name: Key::sym("id"),
                options: AttributeOptions::default(),
            },
            AttributeDirective::Attribute {
                name: Key::str("name"),
                options: AttributeOptions::default(),
            },
            AttributeDirective::Exclude { name: Key::str("id") },
        ];
        let header = resolve(&directives, ResolvedOptions::default()).unwrap();
        assert_eq!(header.target_keys(), vec![&Key::str("name")]);
    }

    #[test]
    fn test_wrap_key_follows_its_own_options() {
        let directives = vec![AttributeDirective::Wrap {
            name: Key::str("address"),
            options: HeaderOptions::new().symbolize_keys(true),
            attributes: vec![AttributeDirective::Attribute {
                name: Key::str("city"),
                options: AttributeOptions::default(),
            }],
        }];
        let header = resolve(&directives, ResolvedOptions::default()).unwrap();
        let wrap = &header.attributes()[0];
        assert_eq!(wrap.target_key(), &Key::sym("address"));
        assert_eq!(
            wrap.header().unwrap().target_keys(),
            vec![&Key::sym("city")]
        );
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let directives = vec![AttributeDirective::Attribute {
            name: Key::str("id"),
            options: AttributeOptions::new().prefix(""),
        }];
        let err = resolve(&directives, ResolvedOptions::default()).unwrap_err();
        assert!(matches!(err, RomError::InvalidHeader(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let directives = vec![AttributeDirective::Wrap {
            name: Key::str(""),
            options: HeaderOptions::default(),
            attributes: vec![],
        }];
        assert!(resolve(&directives, ResolvedOptions::default()).is_err());
    }
}
