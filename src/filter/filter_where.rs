use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::error::FilterError;
use super::filter::Filter;
use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterWhere;

impl FilterWhere {
    /// Render each condition as a `column=op.value` query pair
    pub fn generate(conditions: &[FilterWhereInfo]) -> Result<Vec<(String, String)>, FilterError> {
        conditions
            .iter()
            .map(|c| {
                Filter::validate_column(&c.column)?;
                let value = Self::render_value(&c.data).ok_or_else(|| FilterError::InvalidOperatorData {
                    column: c.column.clone(),
                    reason: "value must be a string, number or boolean".to_string(),
                })?;
                Ok((c.column.clone(), format!("{}.{}", c.operator.to_rest(), value)))
            })
            .collect()
    }

    /// True when the row satisfies every condition; absent columns never match
    pub fn matches(conditions: &[FilterWhereInfo], row: &Value) -> bool {
        conditions.iter().all(|c| match row.get(&c.column) {
            Some(actual) if !actual.is_null() => Self::evaluate(c.operator, actual, &c.data),
            _ => false,
        })
    }

    fn evaluate(op: FilterOp, actual: &Value, expected: &Value) -> bool {
        match op {
            FilterOp::Eq => Self::render_value(actual) == Self::render_value(expected),
            FilterOp::Neq => Self::render_value(actual) != Self::render_value(expected),
            FilterOp::Gt => compare_values(actual, expected) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(compare_values(actual, expected), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => compare_values(actual, expected) == Some(Ordering::Less),
            FilterOp::Lte => matches!(compare_values(actual, expected), Some(Ordering::Less | Ordering::Equal)),
        }
    }

    fn render_value(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Order two scalar JSON values: timestamps chronologically, numbers
/// numerically, anything else as text.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(tx), Some(ty)) => Some(tx.cmp(&ty)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(column: &str, operator: FilterOp, data: Value) -> FilterWhereInfo {
        FilterWhereInfo { column: column.to_string(), operator, data }
    }

    #[test]
    fn equality_is_case_sensitive() {
        let row = json!({"language": "en"});
        assert!(FilterWhere::matches(&[cond("language", FilterOp::Eq, json!("en"))], &row));
        assert!(!FilterWhere::matches(&[cond("language", FilterOp::Eq, json!("EN"))], &row));
    }

    #[test]
    fn timestamps_compare_across_offsets() {
        let row = json!({"expires_at": "2026-11-14T10:00:00+02:00"});
        // 08:00 UTC on the row versus 08:00:01 UTC in the filter
        let later = cond("expires_at", FilterOp::Gt, json!("2026-11-14T08:00:01Z"));
        let earlier = cond("expires_at", FilterOp::Gt, json!("2026-11-14T07:59:59Z"));
        assert!(!FilterWhere::matches(&[later], &row));
        assert!(FilterWhere::matches(&[earlier], &row));
    }

    #[test]
    fn gt_is_strict() {
        let row = json!({"expires_at": "2026-11-14T08:00:00Z"});
        let same = cond("expires_at", FilterOp::Gt, json!("2026-11-14T08:00:00Z"));
        assert!(!FilterWhere::matches(&[same], &row));
    }

    #[test]
    fn missing_or_null_columns_never_match() {
        let row = json!({"language": null});
        assert!(!FilterWhere::matches(&[cond("language", FilterOp::Eq, json!("en"))], &row));
        assert!(!FilterWhere::matches(&[cond("title", FilterOp::Neq, json!("x"))], &row));
    }

    #[test]
    fn numeric_ids_match_string_parameters() {
        let row = json!({"id": 42});
        assert!(FilterWhere::matches(&[cond("id", FilterOp::Eq, json!("42"))], &row));
    }

    #[test]
    fn generate_rejects_structured_values() {
        let err = FilterWhere::generate(&[cond("language", FilterOp::Eq, json!(["en"]))]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData { .. }));
    }
}
