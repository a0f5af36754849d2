//! DynamoDB Table
//!
//! Maps the [`KvTable`] operations onto `GetItem`, `PutItem`, `Scan` and
//! `DeleteItem` against a single table whose partition key is `id`.
//!
//! | Attribute | Type   | Description                  |
//! |-----------|--------|------------------------------|
//! | `id`      | String | Partition key                |
//! | `doc`     | String | The row as a JSON document   |
//!
//! Native DynamoDB TTL is not configured; cache expiry is enforced by the
//! cache layer on read.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_json::Value;

use super::table::{KvTable, TableError};

const KEY_ATTR: &str = "id";
const DOC_ATTR: &str = "doc";

// == DynamoDB Table ==
/// [`KvTable`] backed by an Amazon DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoDbTable {
    client: Client,
    table_name: String,
}

impl DynamoDbTable {
    /// Creates a table handle around a pre-built client.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a table handle from a shared AWS SDK configuration.
    pub fn from_sdk_config(config: &aws_config::SdkConfig, table_name: impl Into<String>) -> Self {
        Self::new(Client::new(config), table_name)
    }
}

/// Decodes the `doc` attribute of an item.
fn decode_doc(
    id: &str,
    item: &std::collections::HashMap<String, AttributeValue>,
) -> Result<Value, TableError> {
    let doc = item
        .get(DOC_ATTR)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| TableError::malformed(id, "missing or invalid doc attribute"))?;
    serde_json::from_str(doc).map_err(|e| TableError::malformed(id, e))
}

#[async_trait]
impl KvTable for DynamoDbTable {
    async fn get(&self, id: &str) -> Result<Option<Value>, TableError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTR, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| TableError::backend(id, e))?;

        match output.item() {
            Some(item) => decode_doc(id, item).map(Some),
            None => Ok(None),
        }
    }

    async fn put(&self, id: &str, item: Value) -> Result<(), TableError> {
        let doc = serde_json::to_string(&item).map_err(|e| TableError::malformed(id, e))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item(KEY_ATTR, AttributeValue::S(id.to_string()))
            .item(DOC_ATTR, AttributeValue::S(doc))
            .send()
            .await
            .map_err(|e| TableError::backend(id, e))?;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<(String, Value)>, TableError> {
        let mut rows = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| TableError::backend(&self.table_name, e))?;

            for item in output.items() {
                let Some(id) = item.get(KEY_ATTR).and_then(|v| v.as_s().ok()) else {
                    continue;
                };
                rows.push((id.clone(), decode_doc(id, item)?));
            }

            match output.last_evaluated_key() {
                Some(last_key) if !last_key.is_empty() => {
                    exclusive_start_key = Some(last_key.clone());
                }
                _ => break,
            }
        }

        Ok(rows)
    }

    async fn delete(&self, id: &str) -> Result<bool, TableError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(KEY_ATTR, AttributeValue::S(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| TableError::backend(id, e))?;

        Ok(output.attributes().is_some_and(|attrs| !attrs.is_empty()))
    }
}
