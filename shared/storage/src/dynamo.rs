//! Helpers shared by the `DynamoDB` repositories

use std::collections::HashMap;

use aws_sdk_dynamodb::{
    error::SdkError,
    operation::{
        query::QueryError,
        scan::ScanError,
        update_item::{UpdateItemError, UpdateItemOutput},
    },
    types::{AttributeValue, Select},
    Client as DynamoDbClient,
};

/// A raw `DynamoDB` item
pub type Item = HashMap<String, AttributeValue>;

/// Number value used by `ADD` expressions
pub fn number(value: i64) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Single-element string set used by `ADD`/`DELETE` expressions
pub fn string_set(value: &str) -> AttributeValue {
    AttributeValue::Ss(vec![value.to_string()])
}

/// Collapses the result of a conditional update into "was the item modified".
///
/// A failed condition means the update was skipped, which is reported as `Ok(false)`.
pub fn modified<E>(result: Result<UpdateItemOutput, SdkError<UpdateItemError>>) -> Result<bool, E>
where
    E: From<SdkError<UpdateItemError>>,
{
    match result {
        Ok(_) => Ok(true),
        Err(SdkError::ServiceError(ref svc)) if svc.err().is_conditional_check_failed_exception() => {
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// Reads every item of a table, following `LastEvaluatedKey` until the scan is exhausted
pub async fn scan_all<E>(client: &DynamoDbClient, table_name: &str) -> Result<Vec<Item>, E>
where
    E: From<SdkError<ScanError>>,
{
    let mut items = Vec::new();
    let mut start_key = None;

    loop {
        let response = client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(start_key)
            .send()
            .await?;

        items.extend(response.items.unwrap_or_default());

        match response.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(items)
}

/// Counts the items of a table with a paginated `COUNT` scan
pub async fn count_all<E>(client: &DynamoDbClient, table_name: &str) -> Result<usize, E>
where
    E: From<SdkError<ScanError>>,
{
    let mut total = 0_usize;
    let mut start_key = None;

    loop {
        let response = client
            .scan()
            .table_name(table_name)
            .select(Select::Count)
            .set_exclusive_start_key(start_key)
            .send()
            .await?;

        total += usize::try_from(response.count).unwrap_or_default();

        match response.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(total)
}

/// Queries a global secondary index for every item whose `attribute` equals `value`
pub async fn query_index<E>(
    client: &DynamoDbClient,
    table_name: &str,
    index_name: &str,
    attribute: &str,
    value: &str,
) -> Result<Vec<Item>, E>
where
    E: From<SdkError<QueryError>>,
{
    let mut items = Vec::new();
    let mut start_key = None;

    loop {
        let response = client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .key_condition_expression("#attr = :value")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", AttributeValue::S(value.to_string()))
            .set_exclusive_start_key(start_key)
            .send()
            .await?;

        items.extend(response.items.unwrap_or_default());

        match response.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(items)
}
