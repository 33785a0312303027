use super::{FieldRules, Rule, Violations};
use serde_json::Value;

/// Evaluates every field's rules against `payload` and collects the failures.
///
/// Non-object payloads have no fields; every field is treated as absent.
pub fn evaluate(table: &[FieldRules], payload: &Value) -> Violations {
    let mut violations = Violations::default();

    for field_rules in table {
        let value = field(payload, field_rules.field);
        let failed = field_rules
            .rules
            .iter()
            .find(|rule| !satisfies(rule, value, payload));

        if let Some(rule) = failed {
            violations.insert(field_rules.field, rule.tag());
        }
    }

    violations
}

fn field<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    payload.as_object().and_then(|obj| obj.get(name))
}

/// Null, missing, empty strings and empty arrays count as absent.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn satisfies(rule: &Rule, value: Option<&Value>, payload: &Value) -> bool {
    match rule {
        Rule::Required => is_present(value),
        Rule::RequiredWith(other) => !is_present(field(payload, other)) || is_present(value),
        Rule::EqField(other) => {
            value.unwrap_or(&Value::Null) == field(payload, other).unwrap_or(&Value::Null)
        }
        _ if !is_present(value) => true,
        Rule::Min(bound) => magnitude(value).map_or(true, |m| m >= *bound as f64),
        Rule::Max(bound) => magnitude(value).map_or(true, |m| m <= *bound as f64),
        Rule::PrintAscii => value
            .and_then(Value::as_str)
            .map_or(true, |s| s.chars().all(|c| (' '..='~').contains(&c))),
        Rule::Email => value.and_then(Value::as_str).map_or(true, is_email),
    }
}

fn magnitude(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Shape check only: `local@label.label`, no whitespace, no empty labels.
pub fn is_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() || local.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
