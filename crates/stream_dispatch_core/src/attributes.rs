//! DynamoDB attribute values in their JSON wire encoding, and the boundary
//! that converts them to and from plain JSON items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Attribute map as it appears in stream images and query bindings.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Plain key/value form of a stored item.
pub type Item = Map<String, Value>;

/// A single DynamoDB attribute value, tagged by its wire type descriptor.
///
/// Binary variants carry the base64 text found on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "B")]
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    M(AttributeMap),
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    #[serde(rename = "BS")]
    Bs(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("attribute `{attribute}` holds an invalid number: {value:?}")]
    InvalidNumber { attribute: String, value: String },
}

/// Converts a wire attribute map into a plain item.
pub fn unmarshall(attributes: &AttributeMap) -> Result<Item, AttributeError> {
    let mut item = Item::new();
    for (name, value) in attributes {
        item.insert(name.clone(), attribute_to_value(name, value)?);
    }
    Ok(item)
}

/// Converts a plain item into a wire attribute map.
pub fn marshall(item: &Item) -> AttributeMap {
    item.iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

pub fn attribute_to_value(name: &str, attribute: &AttributeValue) -> Result<Value, AttributeError> {
    let value = match attribute {
        AttributeValue::S(text) | AttributeValue::B(text) => Value::String(text.clone()),
        AttributeValue::N(text) => parse_number(name, text)?,
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::M(map) => Value::Object(unmarshall(map)?),
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(|value| attribute_to_value(name, value))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Ss(values) | AttributeValue::Bs(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|text| parse_number(name, text))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(value)
}

pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(marshall(map)),
    }
}

fn parse_number(name: &str, text: &str) -> Result<Value, AttributeError> {
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Value::from(value));
    }
    if let Ok(value) = text.parse::<u64>() {
        return Ok(Value::from(value));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| AttributeError::InvalidNumber {
            attribute: name.to_string(),
            value: text.to_string(),
        })
}
