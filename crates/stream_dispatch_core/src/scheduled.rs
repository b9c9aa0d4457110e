//! Query contract for the periodic sweep over recently pending items.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::attributes::{AttributeMap, AttributeValue};

pub const TIMESTAMP_INDEX: &str = "TimestampIndex";
pub const PENDING_PARTITION: &str = "PENDING";
pub const PENDING_WINDOW_MS: i64 = 5 * 60 * 1000;

pub const PARTITION_PLACEHOLDER: &str = ":bKey";
pub const TIMESTAMP_PLACEHOLDER: &str = ":timestamp";
const TIMESTAMP_NAME_ALIAS: &str = "#ts";

/// A key-condition query against a secondary index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub table_name: String,
    pub index_name: String,
    pub key_condition_expression: String,
    pub expression_attribute_names: BTreeMap<String, String>,
    pub expression_attribute_values: AttributeMap,
}

impl IndexQuery {
    pub fn bound_value(&self, placeholder: &str) -> Option<&AttributeValue> {
        self.expression_attribute_values.get(placeholder)
    }
}

/// Lower bound (epoch milliseconds) of the pending window ending at `now`.
pub fn pending_window_start_ms(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis() - PENDING_WINDOW_MS
}

/// Builds the query for `PENDING` items whose `timestamp` falls inside the
/// window ending at `now`.
pub fn pending_items_query(table_name: &str, now: DateTime<Utc>) -> IndexQuery {
    let expression_attribute_names =
        BTreeMap::from([(TIMESTAMP_NAME_ALIAS.to_string(), "timestamp".to_string())]);
    let expression_attribute_values = AttributeMap::from([
        (
            PARTITION_PLACEHOLDER.to_string(),
            AttributeValue::S(PENDING_PARTITION.to_string()),
        ),
        (
            TIMESTAMP_PLACEHOLDER.to_string(),
            AttributeValue::N(pending_window_start_ms(now).to_string()),
        ),
    ]);

    IndexQuery {
        table_name: table_name.to_string(),
        index_name: TIMESTAMP_INDEX.to_string(),
        key_condition_expression: format!(
            "blockchainKey = {PARTITION_PLACEHOLDER} AND {TIMESTAMP_NAME_ALIAS} >= {TIMESTAMP_PLACEHOLDER}"
        ),
        expression_attribute_names,
        expression_attribute_values,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn window_is_five_minutes_before_now() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_300_000)
            .single()
            .expect("valid instant");
        assert_eq!(pending_window_start_ms(now), 1_700_000_000_000);
    }

    #[test]
    fn query_targets_pending_partition_on_timestamp_index() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_300_000)
            .single()
            .expect("valid instant");

        let query = pending_items_query("ledger-items", now);

        assert_eq!(query.table_name, "ledger-items");
        assert_eq!(query.index_name, "TimestampIndex");
        assert_eq!(
            query.key_condition_expression,
            "blockchainKey = :bKey AND #ts >= :timestamp"
        );
        assert_eq!(
            query.expression_attribute_names.get("#ts").map(String::as_str),
            Some("timestamp")
        );
        assert_eq!(
            query.bound_value(PARTITION_PLACEHOLDER),
            Some(&AttributeValue::S("PENDING".to_string()))
        );
        assert_eq!(
            query.bound_value(TIMESTAMP_PLACEHOLDER),
            Some(&AttributeValue::N("1700000000000".to_string()))
        );
    }
}
