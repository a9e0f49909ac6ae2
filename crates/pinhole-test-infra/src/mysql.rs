use std::time::Duration;

use crate::{Result, TestInfraError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Settings for a throwaway MySQL container and the pool opened against it.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "8.4".to_string(), setter(into))]
    image_tag: String,
    #[builder(default = "pinhole".to_string(), setter(into))]
    database: String,
    #[builder(default = "pinhole".to_string(), setter(into))]
    user: String,
    #[builder(default = "pinhole".to_string(), setter(into))]
    password: String,
    /// MySQL logs "ready" before it accepts TCP clients, so the first
    /// connections may be refused.
    #[builder(default = 20)]
    connect_attempts: u32,
    #[builder(default = Duration::from_millis(500))]
    connect_backoff: Duration,
    #[builder(default = 5)]
    max_connections: u32,
}

/// A running MySQL server holding one empty database.
///
/// Dropping it removes the container.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.image_tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.user.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        Ok(Self { container, config })
    }

    /// sqlx connection string for the test database.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        let MysqlConfig {
            user,
            password,
            database,
            ..
        } = &self.config;

        Ok(format!("mysql://{user}:{password}@{host}:{port}/{database}"))
    }

    /// Opens a pool, retrying while the server is still coming up.
    pub async fn connect(&self) -> Result<MySqlPool> {
        let url = self.database_url().await?;
        let attempts = self.config.connect_attempts.max(1);

        let mut attempt = 1;
        loop {
            let result = MySqlPoolOptions::new()
                .max_connections(self.config.max_connections)
                .connect(&url)
                .await;

            match result {
                Ok(pool) => return Ok(pool),
                Err(source) if attempt >= attempts => {
                    return Err(TestInfraError::Connect { attempts, source });
                }
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(self.config.connect_backoff).await;
                }
            }
        }
    }
}
