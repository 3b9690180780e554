//! Aggregation pipeline assembly.
//!
//! Every stage method appends exactly one `{"$stage": body}` document, in call
//! order. Stages are never merged or reordered.
//!
//! ```ignore
//! let mut aggregation = Aggregation::new();
//! aggregation
//!     .filter_with(|filter| {
//!         filter.and_where("status", "active");
//!     })
//!     .group_with(|group| {
//!         group.by("category").sum("total", 1);
//!     })
//!     .limit(10);
//! ```

use bson::{Bson, Document};

use crate::{
    input::Input,
    query::{
        computer::{Group, Projection},
        where_clause::Where,
    },
};

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pipeline: Vec<Document>,
}

impl Aggregation {
    pub fn new() -> Self {
        Aggregation::default()
    }

    fn stage(&mut self, name: &str, body: impl Into<Bson>) -> &mut Self {
        let mut stage = Document::new();
        stage.insert(name, body);
        self.pipeline.push(stage);
        self
    }

    /// Appends a `$project` stage from a document or a [`Projection`].
    pub fn project<'a>(&mut self, projection: impl Into<Input<'a, Projection>>) -> &mut Self {
        let projection: Input<'a, Projection> = projection.into();
        self.stage("$project", projection.resolve())
    }

    pub fn project_with<F: FnOnce(&mut Projection)>(&mut self, callback: F) -> &mut Self {
        self.project(Input::callback(callback))
    }

    /// Appends a `$group` stage from a document or a [`Group`].
    pub fn group<'a>(&mut self, group: impl Into<Input<'a, Group>>) -> &mut Self {
        let group: Input<'a, Group> = group.into();
        self.stage("$group", group.resolve())
    }

    pub fn group_with<F: FnOnce(&mut Group)>(&mut self, callback: F) -> &mut Self {
        self.group(Input::callback(callback))
    }

    /// Appends an `$unwind` stage for `field`.
    pub fn unwind(&mut self, field: &str) -> &mut Self {
        self.stage("$unwind", format!("${}", field.trim_start_matches('$')))
    }

    pub fn skip(&mut self, amount: i64) -> &mut Self {
        self.stage("$skip", amount)
    }

    pub fn limit(&mut self, amount: i64) -> &mut Self {
        self.stage("$limit", amount)
    }

    /// Appends a `$match` stage from a document or a [`Where`].
    pub fn filter<'a>(&mut self, filter: impl Into<Input<'a, Where>>) -> &mut Self {
        let filter: Input<'a, Where> = filter.into();
        self.stage("$match", filter.resolve())
    }

    pub fn filter_with<F: FnOnce(&mut Where)>(&mut self, callback: F) -> &mut Self {
        self.filter(Input::callback(callback))
    }

    /// Appends a raw stage document.
    pub fn pipe(&mut self, operation: Document) -> &mut Self {
        self.pipeline.push(operation);
        self
    }

    pub fn get_pipeline(&self) -> Vec<Document> {
        self.pipeline.clone()
    }

    /// Replaces the whole pipeline.
    pub fn set_pipeline(&mut self, pipeline: Vec<Document>) -> &mut Self {
        self.pipeline = pipeline;
        self
    }
}
