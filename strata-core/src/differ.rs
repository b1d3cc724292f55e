//! Differ - Compare declared or imported attributes with current state
//!
//! Used to decide whether an update is needed and to verify that an imported
//! resource reads back the same attributes as the one that was created.

use std::collections::HashMap;

use crate::resource::Value;
use crate::schema::{AttributeType, ResourceSchema};

/// Find attributes whose value differs between desired and current
///
/// Keys listed in `ignore` and internal keys (starting with `_`) are skipped.
/// The result is sorted.
pub fn changed_attributes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
    ignore: &[&str],
) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, desired_value) in desired {
        if key.starts_with('_') || ignore.contains(&key.as_str()) {
            continue;
        }

        match current.get(key) {
            Some(current_value) if current_value == desired_value => {}
            _ => changed.push(key.clone()),
        }
    }

    changed.sort();
    changed
}

/// Find declared attributes that differ from current, reading the schema
///
/// Nested blocks are compared field by field: computed fields are skipped,
/// and only fields present in the desired block count, so values the API
/// fills in (e.g., a plan's effective date) never show up as changes.
/// Plain maps such as `tags` are still compared whole. Keys listed in
/// `ignore` and internal keys are skipped. The result is sorted.
pub fn changed_declared_attributes(
    schema: &ResourceSchema,
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
    ignore: &[&str],
) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, desired_value) in desired {
        if key.starts_with('_') || ignore.contains(&key.as_str()) {
            continue;
        }
        let same = match (schema.get(key), current.get(key)) {
            (Some(attr), _) if attr.computed => true,
            (Some(attr), Some(current_value)) => {
                declared_match(&attr.attr_type, desired_value, current_value)
            }
            (None, Some(current_value)) => current_value == desired_value,
            (_, None) => false,
        };
        if !same {
            changed.push(key.clone());
        }
    }

    changed.sort();
    changed
}

fn declared_match(attr_type: &AttributeType, desired: &Value, current: &Value) -> bool {
    match (attr_type, desired, current) {
        (AttributeType::List(inner), Value::List(d), Value::List(c)) => {
            d.len() == c.len() && d.iter().zip(c).all(|(d, c)| declared_match(inner, d, c))
        }
        (AttributeType::Struct { fields, .. }, Value::Map(d), Value::Map(c)) => {
            d.iter().all(|(key, d)| {
                let field = fields.iter().find(|f| &f.name == key);
                match (field, c.get(key)) {
                    (Some(f), _) if f.computed => true,
                    (Some(f), Some(c)) => declared_match(&f.attr_type, d, c),
                    (None, Some(c)) => c == d,
                    (_, None) => false,
                }
            })
        }
        _ => desired == current,
    }
}

/// Changed attributes that the schema marks as force-new
pub fn requires_replacement(schema: &ResourceSchema, changed: &[String]) -> Vec<String> {
    let force_new = schema.force_new_attributes();
    changed
        .iter()
        .filter(|name| force_new.contains(&name.as_str()))
        .cloned()
        .collect()
}
