use std::cmp::Ordering;

use serde_json::Value;

use super::error::FilterError;
use super::filter::Filter;
use super::filter_where::compare_values;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Render `order=col.dir[,col.dir]`, or nothing when unordered
    pub fn generate(infos: &[FilterOrderInfo]) -> Result<Option<(String, String)>, FilterError> {
        if infos.is_empty() {
            return Ok(None);
        }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            Filter::validate_column(&info.column)?;
            parts.push(format!("{}.{}", info.column, info.sort.to_rest()));
        }
        Ok(Some(("order".to_string(), parts.join(","))))
    }

    /// Stable sort; rows lacking a sort column go last in either direction
    pub fn sort(infos: &[FilterOrderInfo], rows: &mut [Value]) {
        if infos.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            for info in infos {
                let ordering = match (a.get(&info.column), b.get(&info.column)) {
                    (Some(x), Some(y)) if !x.is_null() && !y.is_null() => {
                        let ord = compare_values(x, y).unwrap_or(Ordering::Equal);
                        match info.sort {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    }
                    (Some(x), _) if !x.is_null() => Ordering::Less,
                    (_, Some(y)) if !y.is_null() => Ordering::Greater,
                    _ => Ordering::Equal,
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}
