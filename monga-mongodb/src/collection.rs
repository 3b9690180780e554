use async_trait::async_trait;
use bson::{Bson, Document, de::deserialize_from_bson};
use futures::TryStreamExt;
use log::debug;
use mongodb::{Collection as MongoCollection, IndexModel, options::IndexOptions};

use monga_core::{
    error::{MongaError, MongaResult},
    options::QueryOptions,
    query::{Aggregation, Find, IndexSpec, IndexTarget, Indexes, Remove, Update, Where, WhereClause},
    retry::RetryPolicy,
};

use crate::query::{
    delete_options, find_one_options, find_options, index_name, insert_options, is_not_primary,
    update_options,
};

/// A collection executing monga builders.
///
/// Reads run once. Writes (`insert`, `update`, `remove`) are retried under the
/// collection's [`RetryPolicy`] when the server reports that the contacted node
/// is no longer the primary.
#[derive(Debug, Clone)]
pub struct Collection {
    inner: MongoCollection<Document>,
    retry: RetryPolicy,
}

impl Collection {
    pub fn new(inner: MongoCollection<Document>, retry: RetryPolicy) -> Self {
        Self { inner, retry }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// The underlying driver collection.
    pub fn inner(&self) -> &MongoCollection<Document> {
        &self.inner
    }

    pub fn max_retries(&self) -> u32 {
        self.retry.max_retries()
    }

    /// Sets how many times a failed write is retried after a failover.
    pub fn set_max_retries(&mut self, max_retries: u32) -> &mut Self {
        self.retry = RetryPolicy::new(max_retries);
        self
    }

    /// Runs a find query. A query flagged with `one(true)` yields at most one
    /// document.
    pub async fn find(&self, query: &Find) -> MongaResult<Vec<Document>> {
        debug!("find on {}", self.name());

        self.inner
            .find(query.get_where())
            .with_options(find_options(query))
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    pub async fn find_one(&self, query: &Find) -> MongaResult<Option<Document>> {
        debug!("find_one on {}", self.name());

        self.inner
            .find_one(query.get_where())
            .with_options(find_one_options(query))
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    /// Counts the documents matching `query`.
    pub async fn count(&self, query: &Where) -> MongaResult<u64> {
        debug!("count on {}", self.name());

        self.inner
            .count_documents(query.get_where())
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    /// Distinct values of `key` among the documents matching `query`.
    pub async fn distinct(&self, key: &str, query: &Where) -> MongaResult<Vec<Bson>> {
        debug!("distinct {key} on {}", self.name());

        self.inner
            .distinct(key, query.get_where())
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    pub async fn aggregate(&self, aggregation: &Aggregation) -> MongaResult<Vec<Document>> {
        debug!("aggregate on {}", self.name());

        self.inner
            .aggregate(aggregation.get_pipeline())
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    /// Inserts documents, returning their `_id` values in insertion order.
    pub async fn insert(&self, documents: Vec<Document>) -> MongaResult<Vec<Bson>> {
        self.insert_with(documents, &Where::new()).await
    }

    /// Inserts documents using the write options of `options`.
    pub async fn insert_with<Q: QueryOptions>(&self, documents: Vec<Document>, options: &Q) -> MongaResult<Vec<Bson>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        debug!("insert of {} documents into {}", documents.len(), self.name());

        let collection = &self.inner;
        let documents = &documents;
        let insert = insert_options(options.options());

        let result = self
            .retry
            .run(is_not_primary, move || {
                let insert = insert.clone();
                async move { collection.insert_many(documents).with_options(insert).await }
            })
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        let mut ids = result.inserted_ids.into_iter().collect::<Vec<_>>();
        ids.sort_by_key(|(index, _)| *index);

        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    /// Applies an update query, returning the number of modified documents.
    pub async fn update(&self, query: &Update) -> MongaResult<u64> {
        let update = query.get_update();
        if update.is_empty() {
            return Err(MongaError::InvalidArgument("update document is empty".into()));
        }

        debug!("update on {}", self.name());

        let collection = &self.inner;
        let filter = &query.get_where();
        let update = &update;
        let multiple = query.is_multiple();
        let options = update_options(query.options(), query.is_upsert());

        let result = self
            .retry
            .run(is_not_primary, move || {
                let options = options.clone();
                async move {
                    if multiple {
                        collection
                            .update_many(filter.clone(), update.clone())
                            .with_options(options)
                            .await
                    } else {
                        collection
                            .update_one(filter.clone(), update.clone())
                            .with_options(options)
                            .await
                    }
                }
            })
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(result.modified_count)
    }

    /// Applies a remove query, returning the number of deleted documents.
    pub async fn remove(&self, query: &Remove) -> MongaResult<u64> {
        debug!("remove on {}", self.name());

        let collection = &self.inner;
        let filter = &query.get_where();
        let just_one = query.is_just_one();
        let options = delete_options(query.options());

        let result = self
            .retry
            .run(is_not_primary, move || {
                let options = options.clone();
                async move {
                    if just_one {
                        collection.delete_one(filter.clone()).with_options(options).await
                    } else {
                        collection.delete_many(filter.clone()).with_options(options).await
                    }
                }
            })
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(result.deleted_count)
    }

    /// Removes every document while keeping the collection and its indexes.
    pub async fn truncate(&self) -> MongaResult<u64> {
        self.remove(&Remove::new()).await
    }

    pub async fn drop(&self) -> MongaResult<()> {
        debug!("drop of {}", self.name());

        self.inner
            .drop()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(())
    }

    pub async fn list_indexes(&self) -> MongaResult<Vec<IndexModel>> {
        self.inner
            .list_indexes()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?
            .try_collect::<Vec<IndexModel>>()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))
    }

    /// Index helper for this collection.
    pub fn indexes(&self) -> Indexes<'_, Collection> {
        Indexes::new(self)
    }
}

#[async_trait]
impl IndexTarget for Collection {
    async fn create_index(&self, keys: Document, options: Document) -> MongaResult<()> {
        let options: IndexOptions = deserialize_from_bson(Bson::Document(options))
            .map_err(|e| MongaError::InvalidArgument(format!("invalid index options: {e}")))?;

        debug!("create_index {keys} on {}", self.name());

        self.inner
            .create_index(IndexModel::builder().keys(keys).options(options).build())
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn drop_index(&self, index: IndexSpec) -> MongaResult<()> {
        let name = match index {
            IndexSpec::Name(name) => name,
            IndexSpec::Keys(keys) => index_name(&keys),
        };

        debug!("drop_index {name} on {}", self.name());

        self.inner
            .drop_index(name)
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn drop_indexes(&self) -> MongaResult<()> {
        debug!("drop_indexes on {}", self.name());

        self.inner
            .drop_indexes()
            .await
            .map_err(|e| MongaError::Backend(e.to_string()))?;

        Ok(())
    }
}
