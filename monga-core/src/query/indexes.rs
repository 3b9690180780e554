//! Index management.
//!
//! [`Indexes`] normalizes the shorthand direction tokens (`"asc"`, `"desc"`,
//! `"geo"`) of an index key document before handing it to an [`IndexTarget`],
//! usually a collection.

use async_trait::async_trait;
use bson::{Bson, Document, doc};

use crate::error::MongaResult;

/// Identifies an index to drop.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSpec {
    /// The index name, e.g. `"email_1"`.
    Name(String),
    /// The index key document, e.g. `{ "email": 1 }`.
    Keys(Document),
}

impl From<&str> for IndexSpec {
    fn from(name: &str) -> Self {
        IndexSpec::Name(name.to_string())
    }
}

impl From<String> for IndexSpec {
    fn from(name: String) -> Self {
        IndexSpec::Name(name)
    }
}

impl From<Document> for IndexSpec {
    fn from(keys: Document) -> Self {
        IndexSpec::Keys(keys)
    }
}

/// A store able to create and drop indexes.
#[async_trait]
pub trait IndexTarget: Send + Sync {
    /// Creates (or ensures) an index.
    ///
    /// # Arguments
    ///
    /// * `keys` - The normalized index key document.
    /// * `options` - Index options such as `unique` or `name`.
    async fn create_index(&self, keys: Document, options: Document) -> MongaResult<()>;

    /// Drops a single index.
    async fn drop_index(&self, index: IndexSpec) -> MongaResult<()>;

    /// Drops every index except the one on `_id`.
    async fn drop_indexes(&self) -> MongaResult<()>;
}

/// Index helper bound to a target.
pub struct Indexes<'t, T: IndexTarget + ?Sized> {
    target: &'t T,
}

impl<'t, T: IndexTarget + ?Sized> Indexes<'t, T> {
    pub fn new(target: &'t T) -> Self {
        Indexes { target }
    }

    pub fn target(&self) -> &'t T {
        self.target
    }

    /// Replaces `"asc"` with `1`, `"desc"` with `-1` and `"geo"` with `"2d"`.
    pub fn prepare_index(index: Document) -> Document {
        index
            .into_iter()
            .map(|(field, value)| {
                let value = match value {
                    Bson::String(token) if token == "asc" => Bson::Int32(1),
                    Bson::String(token) if token == "desc" => Bson::Int32(-1),
                    Bson::String(token) if token == "geo" => Bson::String("2d".to_string()),
                    other => other,
                };
                (field, value)
            })
            .collect()
    }

    pub async fn create(&self, index: Document, options: Document) -> MongaResult<&Self> {
        self.target
            .create_index(Self::prepare_index(index), options)
            .await?;

        Ok(self)
    }

    /// Creates a `2d` geospatial index on `field`.
    pub async fn geo(&self, field: &str, options: Document) -> MongaResult<&Self> {
        self.create(doc! { field: "2d" }, options).await
    }

    /// Drops each index in turn, stopping at the first failure.
    pub async fn drop<I>(&self, indexes: I) -> MongaResult<&Self>
    where
        I: IntoIterator,
        I::Item: Into<IndexSpec>,
    {
        for index in indexes {
            let index = match index.into() {
                IndexSpec::Keys(keys) => IndexSpec::Keys(Self::prepare_index(keys)),
                name => name,
            };
            self.target.drop_index(index).await?;
        }

        Ok(self)
    }

    pub async fn drop_all(&self) -> MongaResult<&Self> {
        self.target.drop_indexes().await?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::MongaError;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(Document, Document),
        Drop(IndexSpec),
        DropAll,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
        fail_drops: bool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IndexTarget for Recorder {
        async fn create_index(&self, keys: Document, options: Document) -> MongaResult<()> {
            self.calls.lock().unwrap().push(Call::Create(keys, options));
            Ok(())
        }

        async fn drop_index(&self, index: IndexSpec) -> MongaResult<()> {
            if self.fail_drops {
                return Err(MongaError::Backend("index not found".into()));
            }
            self.calls.lock().unwrap().push(Call::Drop(index));
            Ok(())
        }

        async fn drop_indexes(&self) -> MongaResult<()> {
            self.calls.lock().unwrap().push(Call::DropAll);
            Ok(())
        }
    }

    #[test]
    fn test_prepare_index() {
        let prepared = Indexes::<Recorder>::prepare_index(doc! {
            "a": "asc",
            "b": "desc",
            "c": "geo",
            "d": -1,
            "e": "text",
        });

        assert_eq!(prepared, doc! { "a": 1, "b": -1, "c": "2d", "d": -1, "e": "text" });
    }

    #[tokio::test]
    async fn test_create_and_geo() {
        let recorder = Recorder::default();
        let indexes = Indexes::new(&recorder);

        indexes
            .create(doc! { "email": "asc" }, doc! { "unique": true })
            .await
            .unwrap();
        indexes.geo("location", Document::new()).await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Create(doc! { "email": 1 }, doc! { "unique": true }),
                Call::Create(doc! { "location": "2d" }, Document::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_drop_normalizes_keys() {
        let recorder = Recorder::default();
        let indexes = Indexes::new(&recorder);

        indexes
            .drop([IndexSpec::from("email_1"), IndexSpec::from(doc! { "name": "desc" })])
            .await
            .unwrap();
        indexes.drop_all().await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Drop(IndexSpec::Name("email_1".into())),
                Call::Drop(IndexSpec::Keys(doc! { "name": -1 })),
                Call::DropAll,
            ]
        );
    }

    #[tokio::test]
    async fn test_drop_propagates_errors() {
        let recorder = Recorder {
            fail_drops: true,
            ..Recorder::default()
        };

        let indexes = Indexes::new(&recorder);
        let result = indexes.drop(["missing_1"]).await;
        assert!(matches!(result, Err(MongaError::Backend(_))));
    }
}
