use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection};

/// Row filter plus ordering for a single table-store query.
///
/// The same value renders to REST query parameters for the hosted store and
/// evaluates directly against JSON rows for the in-memory backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_op(mut self, column: impl Into<String>, operator: FilterOp, data: impl Into<Value>) -> Self {
        self.where_data.push(FilterWhereInfo {
            column: column.into(),
            operator,
            data: data.into(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, data: impl Into<Value>) -> Self {
        self.where_op(column, FilterOp::Eq, data)
    }

    pub fn gt(self, column: impl Into<String>, data: impl Into<Value>) -> Self {
        self.where_op(column, FilterOp::Gt, data)
    }

    pub fn order(mut self, column: impl Into<String>, sort: SortDirection) -> Self {
        self.order_data.push(FilterOrderInfo { column: column.into(), sort });
        self
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.where_data
    }

    pub fn ordering(&self) -> &[FilterOrderInfo] {
        &self.order_data
    }

    /// Query-string pairs in the store's REST dialect (`col=op.value`, `order=col.dir`)
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, FilterError> {
        let mut pairs = FilterWhere::generate(&self.where_data)?;
        if let Some(order) = FilterOrder::generate(&self.order_data)? {
            pairs.push(order);
        }
        Ok(pairs)
    }

    pub fn matches(&self, row: &Value) -> bool {
        FilterWhere::matches(&self.where_data, row)
    }

    /// Keep matching rows and sort them by the requested ordering
    pub fn apply(&self, rows: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut out: Vec<Value> = rows.into_iter().filter(|row| self.matches(row)).collect();
        FilterOrder::sort(&self.order_data, &mut out);
        out
    }

    pub fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidTableName(name.to_string()));
        }
        Ok(())
    }

    pub(crate) fn validate_column(name: &str) -> Result<(), FilterError> {
        if Self::is_identifier(name) {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(name.to_string()))
        }
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_room_listing_query() {
        let filter = Filter::new()
            .eq("language", "en")
            .gt("expires_at", "2026-10-17T12:00:00+00:00")
            .order("created_at", SortDirection::Desc);

        let pairs = filter.to_query_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("language".to_string(), "eq.en".to_string()),
                ("expires_at".to_string(), "gt.2026-10-17T12:00:00+00:00".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_bad_column_names() {
        let filter = Filter::new().eq("language; drop", "en");
        assert_eq!(
            filter.to_query_pairs(),
            Err(FilterError::InvalidColumn("language; drop".to_string()))
        );
    }

    #[test]
    fn validates_table_names() {
        assert!(Filter::validate_table_name("publications").is_ok());
        assert!(Filter::validate_table_name("").is_err());
        assert!(Filter::validate_table_name("pubs/../users").is_err());
    }

    #[test]
    fn apply_filters_and_sorts() {
        let rows = vec![
            json!({"id": 1, "language": "en", "created_at": "2026-10-01T00:00:00Z"}),
            json!({"id": 2, "language": "es", "created_at": "2026-10-02T00:00:00Z"}),
            json!({"id": 3, "language": "en", "created_at": "2026-10-03T00:00:00Z"}),
        ];
        let filter = Filter::new()
            .eq("language", "en")
            .order("created_at", SortDirection::Desc);

        let ids: Vec<i64> = filter
            .apply(rows)
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
