use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue as SdkAttributeValue;
use base64::{engine::general_purpose, Engine as _};
use stream_dispatch_core::attributes::{unmarshall, AttributeMap, AttributeValue, Item};
use stream_dispatch_core::scheduled::IndexQuery;
use tracing::debug;

use crate::adapters::item_store::ItemStore;
use crate::error::StoreError;

type SdkItem = HashMap<String, SdkAttributeValue>;

#[derive(Clone)]
pub struct DynamoItemStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoItemStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ItemStore for DynamoItemStore {
    async fn query(&self, query: &IndexQuery) -> Result<Vec<Item>, StoreError> {
        let mut bindings = HashMap::with_capacity(query.expression_attribute_values.len());
        for (placeholder, value) in &query.expression_attribute_values {
            let encoded = to_sdk_attribute(value).map_err(|message| StoreError::Binding {
                placeholder: placeholder.clone(),
                message,
            })?;
            bindings.insert(placeholder.clone(), encoded);
        }
        let names: HashMap<String, String> = query
            .expression_attribute_names
            .iter()
            .map(|(alias, name)| (alias.clone(), name.clone()))
            .collect();

        let mut items = Vec::new();
        let mut start_key: Option<SdkItem> = None;
        let mut page = 0usize;
        loop {
            let output = self
                .client
                .query()
                .table_name(&query.table_name)
                .index_name(&query.index_name)
                .key_condition_expression(&query.key_condition_expression)
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(bindings.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|error| StoreError::Query {
                    table: query.table_name.clone(),
                    index: query.index_name.clone(),
                    message: DisplayErrorContext(&error).to_string(),
                })?;

            let page_items = output.items.unwrap_or_default();
            debug!(page, item_count = page_items.len(), "received query page");
            for sdk_item in &page_items {
                items.push(unmarshall(&from_sdk_item(sdk_item)?)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => {
                    start_key = Some(key);
                    page += 1;
                }
                _ => break,
            }
        }

        Ok(items)
    }
}

fn to_sdk_attribute(value: &AttributeValue) -> Result<SdkAttributeValue, String> {
    let encoded = match value {
        AttributeValue::S(text) => SdkAttributeValue::S(text.clone()),
        AttributeValue::N(text) => SdkAttributeValue::N(text.clone()),
        AttributeValue::B(text) => SdkAttributeValue::B(decode_blob(text)?),
        AttributeValue::Bool(flag) => SdkAttributeValue::Bool(*flag),
        AttributeValue::Null(flag) => SdkAttributeValue::Null(*flag),
        AttributeValue::M(map) => SdkAttributeValue::M(
            map.iter()
                .map(|(name, value)| {
                    Ok::<_, String>((name.clone(), to_sdk_attribute(value)?))
                })
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::L(values) => SdkAttributeValue::L(
            values
                .iter()
                .map(to_sdk_attribute)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Ss(values) => SdkAttributeValue::Ss(values.clone()),
        AttributeValue::Ns(values) => SdkAttributeValue::Ns(values.clone()),
        AttributeValue::Bs(values) => SdkAttributeValue::Bs(
            values
                .iter()
                .map(|text| decode_blob(text))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(encoded)
}

fn decode_blob(text: &str) -> Result<Blob, String> {
    general_purpose::STANDARD
        .decode(text)
        .map(Blob::new)
        .map_err(|error| format!("invalid base64 binary: {error}"))
}

fn encode_blob(blob: &Blob) -> String {
    general_purpose::STANDARD.encode(blob.as_ref())
}

fn from_sdk_item(item: &SdkItem) -> Result<AttributeMap, StoreError> {
    item.iter()
        .map(|(name, value)| {
            Ok::<_, StoreError>((name.clone(), from_sdk_attribute(name, value)?))
        })
        .collect()
}

fn from_sdk_attribute(name: &str, value: &SdkAttributeValue) -> Result<AttributeValue, StoreError> {
    let decoded = match value {
        SdkAttributeValue::S(text) => AttributeValue::S(text.clone()),
        SdkAttributeValue::N(text) => AttributeValue::N(text.clone()),
        SdkAttributeValue::B(blob) => AttributeValue::B(encode_blob(blob)),
        SdkAttributeValue::Bool(flag) => AttributeValue::Bool(*flag),
        SdkAttributeValue::Null(flag) => AttributeValue::Null(*flag),
        SdkAttributeValue::M(map) => AttributeValue::M(from_sdk_item(map)?),
        SdkAttributeValue::L(values) => AttributeValue::L(
            values
                .iter()
                .map(|value| from_sdk_attribute(name, value))
                .collect::<Result<_, _>>()?,
        ),
        SdkAttributeValue::Ss(values) => AttributeValue::Ss(values.clone()),
        SdkAttributeValue::Ns(values) => AttributeValue::Ns(values.clone()),
        SdkAttributeValue::Bs(values) => {
            AttributeValue::Bs(values.iter().map(encode_blob).collect())
        }
        _ => {
            return Err(StoreError::UnsupportedAttribute {
                attribute: name.to_string(),
            })
        }
    };
    Ok(decoded)
}
