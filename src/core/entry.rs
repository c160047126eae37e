//! Entry and export declarations.
//!
//! `entries` and `exports` in addon.json share one shape: either a
//! sequence of sources, or a mapping of group name to a source or a
//! sequence of sources.

use std::collections::BTreeMap;

use serde_json::Value;

/// Group name a bare sequence declaration is bundled under.
pub const DEFAULT_GROUP: &str = "main";

/// Export group whose sources are spread into every other group.
pub const WILDCARD_GROUP: &str = "*";

/// Validated groups: name -> ordered sources.
pub type EntryGroups = BTreeMap<String, Vec<String>>;

/// Check whether a raw `entries`/`exports` declaration has anything to build.
///
/// True for a non-empty sequence of strings, or a non-empty mapping whose
/// values are strings or sequences of strings. Everything else, including
/// `{}` and `[]`, is false.
pub fn is_valid_entry_point(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_string),
        Value::Object(map) => !map.is_empty() && map.values().all(is_source_list),
        _ => false,
    }
}

fn is_source_list(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Convert a declaration into groups, or `None` when it is not valid.
pub fn entry_groups(value: &Value) -> Option<EntryGroups> {
    if !is_valid_entry_point(value) {
        return None;
    }

    let mut groups = EntryGroups::new();
    match value {
        Value::Array(items) => {
            groups.insert(DEFAULT_GROUP.to_string(), strings(items));
        }
        Value::Object(map) => {
            for (name, sources) in map {
                let sources = match sources {
                    Value::String(source) => vec![source.clone()],
                    Value::Array(items) => strings(items),
                    _ => continue,
                };
                groups.insert(name.clone(), sources);
            }
        }
        _ => return None,
    }
    Some(groups)
}

/// Prepend the wildcard group's sources to every other group.
///
/// The wildcard group itself never appears in the result.
pub fn spread_wildcard(mut groups: EntryGroups) -> EntryGroups {
    let Some(shared) = groups.remove(WILDCARD_GROUP) else {
        return groups;
    };

    groups
        .into_iter()
        .map(|(name, sources)| {
            let mut merged = shared.clone();
            merged.extend(sources);
            (name, merged)
        })
        .collect()
}

/// Output folder of an entry: the key with a leading `bootstrap-` removed.
///
/// Bootstrap entries belong to the same section as their plain
/// counterpart and only differ in load strategy.
pub fn output_folder(entry_key: &str) -> &str {
    entry_key.strip_prefix("bootstrap-").unwrap_or(entry_key)
}
