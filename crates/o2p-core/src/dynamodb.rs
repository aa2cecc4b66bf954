//! DynamoDB backend on top of the AWS SDK.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue as SdkValue, ReturnValue};

use o2p_model::{AttributeValue, Item, KEY_ATTRIBUTE, ModelError};

use crate::backend::RecordBackend;
use crate::config::StoreConfig;
use crate::error::BackendError;
use crate::update::UpdatePlan;

/// Record backend storing items in DynamoDB tables keyed by the string `id`.
#[derive(Debug, Clone)]
pub struct DynamoDbBackend {
    client: Client,
}

impl DynamoDbBackend {
    /// Wrap an already configured client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration, applying the
    /// configured region and endpoint override.
    pub async fn from_config(config: &StoreConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.dynamodb_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self::new(Client::from_conf(builder.build()))
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl RecordBackend for DynamoDbBackend {
    async fn put(&self, table: &str, item: Item) -> Result<(), BackendError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_sdk(item)))
            .send()
            .await
            .map_err(|e| sdk_failure("PutItem", table, e))?;
        Ok(())
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<Item>, BackendError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(KEY_ATTRIBUTE, SdkValue::S(id.to_owned()))
            .send()
            .await
            .map_err(|e| sdk_failure("GetItem", table, e))?;
        output.item.map(item_from_sdk).transpose()
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        plan: &UpdatePlan,
    ) -> Result<Item, BackendError> {
        let values = plan
            .values
            .iter()
            .map(|(k, v)| (k.clone(), value_to_sdk(v.clone())))
            .collect();
        let output = self
            .client
            .update_item()
            .table_name(table)
            .key(KEY_ATTRIBUTE, SdkValue::S(id.to_owned()))
            .update_expression(&plan.expression)
            .set_expression_attribute_names(Some(plan.names.clone()))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| sdk_failure("UpdateItem", table, e))?;
        output
            .attributes
            .map_or_else(|| Ok(Item::new()), item_from_sdk)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        self.client
            .delete_item()
            .table_name(table)
            .key(KEY_ATTRIBUTE, SdkValue::S(id.to_owned()))
            .send()
            .await
            .map_err(|e| sdk_failure("DeleteItem", table, e))?;
        Ok(())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, BackendError> {
        let mut items = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| sdk_failure("Scan", table, e))?;
            for item in output.items.unwrap_or_default() {
                items.push(item_from_sdk(item)?);
            }
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }
        Ok(items)
    }
}

fn sdk_failure<E>(operation: &str, table: &str, err: SdkError<E>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if err.as_service_error().and_then(ProvideErrorMetadata::code)
        == Some("ResourceNotFoundException")
    {
        return BackendError::TableNotFound {
            table: table.to_owned(),
        };
    }
    BackendError::service(
        format!("DynamoDB {operation} failed: {}", DisplayErrorContext(&err)),
        err,
    )
}

fn item_to_sdk(item: Item) -> HashMap<String, SdkValue> {
    item.into_iter()
        .map(|(k, v)| (k, value_to_sdk(v)))
        .collect()
}

fn value_to_sdk(value: AttributeValue) -> SdkValue {
    match value {
        AttributeValue::S(s) => SdkValue::S(s),
        AttributeValue::N(n) => SdkValue::N(n),
        AttributeValue::Bool(b) => SdkValue::Bool(b),
        AttributeValue::Null => SdkValue::Null(true),
        AttributeValue::L(list) => SdkValue::L(list.into_iter().map(value_to_sdk).collect()),
        AttributeValue::M(map) => SdkValue::M(item_to_sdk(map)),
    }
}

fn item_from_sdk(item: HashMap<String, SdkValue>) -> Result<Item, BackendError> {
    item.into_iter()
        .map(|(k, v)| {
            let value = value_from_sdk(&k, v)?;
            Ok((k, value))
        })
        .collect()
}

/// String and number sets become lists; binary types are rejected.
fn value_from_sdk(attribute: &str, value: SdkValue) -> Result<AttributeValue, BackendError> {
    let value = match value {
        SdkValue::S(s) => AttributeValue::S(s),
        SdkValue::N(n) => AttributeValue::N(n),
        SdkValue::Bool(b) => AttributeValue::Bool(b),
        SdkValue::Null(_) => AttributeValue::Null,
        SdkValue::Ss(set) => AttributeValue::L(set.into_iter().map(AttributeValue::S).collect()),
        SdkValue::Ns(set) => AttributeValue::L(set.into_iter().map(AttributeValue::N).collect()),
        SdkValue::L(list) => AttributeValue::L(
            list.into_iter()
                .map(|v| value_from_sdk(attribute, v))
                .collect::<Result<_, _>>()?,
        ),
        SdkValue::M(map) => AttributeValue::M(item_from_sdk(map)?),
        other => {
            let actual = match other {
                SdkValue::B(_) => "B",
                SdkValue::Bs(_) => "BS",
                _ => "unknown",
            };
            return Err(BackendError::MalformedItem(ModelError::UnsupportedType {
                attribute: attribute.to_owned(),
                actual,
            }));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;

    use super::*;

    #[test]
    fn test_should_convert_values_to_sdk() {
        let value = AttributeValue::M(HashMap::from([
            ("name".to_owned(), AttributeValue::from("Henrietta")),
            ("eggs".to_owned(), AttributeValue::from(3)),
            ("gone".to_owned(), AttributeValue::Null),
            (
                "tags".to_owned(),
                AttributeValue::L(vec![AttributeValue::from(true)]),
            ),
        ]));
        let SdkValue::M(map) = value_to_sdk(value) else {
            panic!("expected M");
        };
        assert_eq!(map["name"], SdkValue::S("Henrietta".to_owned()));
        assert_eq!(map["eggs"], SdkValue::N("3".to_owned()));
        assert_eq!(map["gone"], SdkValue::Null(true));
        assert_eq!(map["tags"], SdkValue::L(vec![SdkValue::Bool(true)]));
    }

    #[test]
    fn test_should_convert_sets_from_sdk_to_lists() {
        let item = HashMap::from([
            ("id".to_owned(), SdkValue::S("c1".to_owned())),
            (
                "colors".to_owned(),
                SdkValue::Ss(vec!["red".to_owned(), "brown".to_owned()]),
            ),
            ("weights".to_owned(), SdkValue::Ns(vec!["1.5".to_owned()])),
        ]);
        let item = item_from_sdk(item).unwrap();
        assert_eq!(
            item["colors"],
            AttributeValue::L(vec![AttributeValue::from("red"), AttributeValue::from("brown")])
        );
        assert_eq!(
            item["weights"],
            AttributeValue::L(vec![AttributeValue::N("1.5".to_owned())])
        );
    }

    #[test]
    fn test_should_reject_binary_attributes() {
        let item = HashMap::from([("photo".to_owned(), SdkValue::B(Blob::new(vec![1, 2])))]);
        let err = item_from_sdk(item).unwrap_err();
        assert!(matches!(
            err,
            BackendError::MalformedItem(ModelError::UnsupportedType { ref attribute, actual: "B" })
                if attribute == "photo"
        ));
    }
}
