use log::debug;
use mongodb::{Client, options::ClientOptions};

use monga_core::{
    error::{MongaError, MongaResult},
    retry::RetryPolicy,
};

use crate::collection::Collection;

/// A database handle producing [`Collection`]s.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    name: String,
    retry: RetryPolicy,
}

impl Database {
    pub fn new(client: Client, name: String) -> Self {
        Self {
            client,
            name,
            retry: RetryPolicy::default(),
        }
    }

    pub fn builder(dsn: &str, name: &str) -> DatabaseBuilder {
        DatabaseBuilder::new(dsn, name)
    }

    /// Connects with default settings.
    ///
    /// # Arguments
    ///
    /// * `dsn` - A `mongodb://` or `mongodb+srv://` connection string.
    /// * `name` - The database name.
    pub async fn connect(dsn: &str, name: &str) -> MongaResult<Self> {
        DatabaseBuilder::new(dsn, name).build().await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns a collection handle. Collections are created lazily by the
    /// server on first write.
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(
            self.client.database(&self.name).collection(name),
            self.retry,
        )
    }

    pub async fn list_collections(&self) -> MongaResult<Vec<String>> {
        self.client
            .database(&self.name)
            .list_collection_names()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    pub async fn has_collection(&self, name: &str) -> MongaResult<bool> {
        Ok(self
            .list_collections()
            .await?
            .iter()
            .any(|collection| collection == name))
    }

    pub async fn drop(&self) -> MongaResult<()> {
        debug!("drop of database {}", self.name);

        self.client
            .database(&self.name)
            .drop()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(())
    }

    pub async fn shutdown(self) -> MongaResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct DatabaseBuilder {
    dsn: String,
    name: String,
    max_retries: u32,
}

impl DatabaseBuilder {
    pub fn new(dsn: &str, name: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            name: name.to_string(),
            max_retries: RetryPolicy::default().max_retries(),
        }
    }

    /// Retry budget handed to every collection of the database.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn build(self) -> MongaResult<Database> {
        let client = Client::with_options(
            ClientOptions::parse(&self.dsn)
                .await
                .map_err(|e| MongaError::Initialization(e.to_string()))?,
        )
        .map_err(|e| MongaError::Initialization(e.to_string()))?;

        debug!("connected to database {}", self.name);

        Ok(Database {
            client,
            name: self.name,
            retry: RetryPolicy::new(self.max_retries),
        })
    }
}
