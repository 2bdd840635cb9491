//! Redis client shared by the code store and the rate limiter
//!
//! Connecting retries with exponential backoff. Individual operations never
//! retry; each call is bounded by the caller's context and the configured
//! response timeout.

use std::time::Duration;

use cg_core::context::{Interrupted, RequestContext};
use redis::{aio::MultiplexedConnection, Client, FromRedisValue, RedisError, ScriptInvocation};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

/// Base delay between connect attempts
const CONNECT_RETRY_DELAY_MS: u64 = 100;

/// Upper bound of the connect backoff
const CONNECT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Redis client over a single multiplexed connection
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to Redis, retrying with exponential backoff
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.connect_retries.max(1);
        let connect_timeout = Duration::from_secs(config.connection_timeout);
        let mut attempts = 0;
        let mut delay = CONNECT_RETRY_DELAY_MS;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result =
                tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection())
                    .await;

            let err = match result {
                Ok(Ok(connection)) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Config(format!(
                    "Redis connect timed out after {}s",
                    config.connection_timeout
                )),
            };

            if attempts >= max_attempts {
                error!(
                    "Failed to connect to Redis after {} attempts: {}",
                    attempts, err
                );
                return Err(err);
            }

            warn!(
                "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                attempts, max_attempts, err, delay
            );
            sleep(Duration::from_millis(delay)).await;
            delay = (delay * 2).min(CONNECT_RETRY_MAX_DELAY_MS);
        }
    }

    /// Apply the configured key prefix
    pub fn key(&self, key: &str) -> String {
        self.config.prefixed(key)
    }

    /// Per-operation response timeout
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.config.response_timeout)
    }

    /// A handle on the shared multiplexed connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Run a prepared Lua script invocation once.
    ///
    /// The call is bounded by `ctx` and by the response timeout, whichever
    /// ends first. Redis failures are converted with `map_err`.
    pub async fn invoke<T, E, F>(
        &self,
        ctx: &RequestContext,
        invocation: &ScriptInvocation<'_>,
        map_err: F,
    ) -> Result<T, E>
    where
        T: FromRedisValue + Send,
        E: From<Interrupted>,
        F: FnOnce(RedisError) -> E + Send,
    {
        let call_ctx = ctx.child_with_timeout(self.response_timeout());
        let mut conn = self.connection.clone();
        call_ctx
            .run(async move { invocation.invoke_async(&mut conn).await.map_err(map_err) })
            .await
    }

    /// Check the connection with a PING
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");
        let mut conn = self.connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// Hide credentials embedded in a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
