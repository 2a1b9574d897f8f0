use crate::error::{AppError, Result};
use crate::models::{zip_key, Property};
use crate::search::{IndexSchema, QueryPlan};
use crate::state::{AggregateRow, PropertyStore, READY_KEY};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Value};

/// Redis-backed property store using the RedisJSON and RediSearch modules
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect and verify the server answers
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            AppError::Configuration(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Redis: {}", e)))?;

        // Test connection
        let mut test_conn = connection.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut test_conn)
            .await
            .map_err(|e| AppError::Store(format!("Redis connection test failed: {}", e)))?;

        tracing::info!(url = %redis_url, "Connected to Redis");

        Ok(Self { connection })
    }

    fn serialize_property(property: &Property) -> Result<String> {
        serde_json::to_string(property).map_err(|e| {
            AppError::Serialization(format!("Failed to serialize property {}: {}", property.id, e))
        })
    }
}

/// Render a reply value as text; nested arrays have no text form
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Data(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Status(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Okay => Some("OK".to_string()),
        Value::Nil | Value::Bulk(_) => None,
    }
}

/// Parse an `FT.AGGREGATE` reply: `[total, [k1, v1, k2, v2, ...], ...]`
pub(crate) fn parse_aggregate_reply(reply: Value) -> Result<Vec<AggregateRow>> {
    let items = match reply {
        Value::Bulk(items) => items,
        other => {
            return Err(AppError::Store(format!(
                "Unexpected FT.AGGREGATE reply: {:?}",
                other
            )))
        }
    };

    items
        .into_iter()
        .skip(1)
        .map(|item| match item {
            Value::Bulk(pairs) => {
                let mut row = AggregateRow::new();
                for pair in pairs.chunks(2) {
                    if let [name, value] = pair {
                        if let (Some(name), Some(value)) = (value_to_string(name), value_to_string(value)) {
                            row.insert(name, value);
                        }
                    }
                }
                Ok(row)
            }
            other => Err(AppError::Store(format!(
                "Unexpected FT.AGGREGATE row: {:?}",
                other
            ))),
        })
        .collect()
}

#[async_trait]
impl PropertyStore for RedisStore {
    async fn is_load_complete(&self) -> Result<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(READY_KEY).await?;
        Ok(exists)
    }

    async fn mark_load_complete(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set(READY_KEY, "true").await?;
        Ok(())
    }

    async fn put_zip(&self, zip: &str, coords: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set(zip_key(zip), coords)
            .await
            .map_err(|e| AppError::Store(format!("Failed to save zip {}: {}", zip, e)))?;
        Ok(())
    }

    async fn get_zip(&self, zip: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn
            .get(zip_key(zip))
            .await
            .map_err(|e| AppError::Store(format!("Failed to get zip {}: {}", zip, e)))?;
        Ok(value)
    }

    async fn put_property(&self, property: &Property) -> Result<()> {
        let value = Self::serialize_property(property)?;
        let mut conn = self.connection.clone();

        redis::cmd("JSON.SET")
            .arg(property.key())
            .arg("$")
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| {
                AppError::Store(format!("Failed to save property {}: {}", property.id, e))
            })?;

        tracing::trace!(key = %property.key(), "Property saved to Redis");
        Ok(())
    }

    async fn drop_index(&self, name: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("FT.DROPINDEX")
            .arg(name)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn create_index(&self, schema: &IndexSchema) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("FT.CREATE")
            .arg(schema.create_args())
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| {
                AppError::Store(format!("Failed to create index {}: {}", schema.name, e))
            })?;
        Ok(())
    }

    async fn aggregate(&self, index: &str, plan: &QueryPlan) -> Result<Vec<AggregateRow>> {
        let args = plan.to_args(index);
        tracing::debug!(index = %index, query = %plan.base.to_query_string(), "FT.AGGREGATE");

        let mut conn = self.connection.clone();
        let reply: Value = redis::cmd("FT.AGGREGATE")
            .arg(args)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Store(format!("Aggregation on {} failed: {}", index, e)))?;

        parse_aggregate_reply(reply)
    }
}
