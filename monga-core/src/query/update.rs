//! Update queries: a filter plus a modifier document.
//!
//! Every modifier call records `field -> (operator, value)`. A field holds one
//! modifier at a time; calling another modifier for the same field replaces
//! the previous one while keeping the field's position. [`Update::get_update`]
//! groups the recorded fields by operator.

use bson::{Bson, Document};
use indexmap::IndexMap;

use crate::{
    options::{Options, OptionsPatch, QueryOptions},
    query::{filter::FilterTree, where_clause::WhereClause},
};

/// Update modifier operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Set,
    Unset,
    Rename,
    Push,
    PushAll,
    Pull,
    PullAll,
    AddToSet,
    Pop,
    Inc,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Set => "$set",
            Modifier::Unset => "$unset",
            Modifier::Rename => "$rename",
            Modifier::Push => "$push",
            Modifier::PushAll => "$pushAll",
            Modifier::Pull => "$pull",
            Modifier::PullAll => "$pullAll",
            Modifier::AddToSet => "$addToSet",
            Modifier::Pop => "$pop",
            Modifier::Inc => "$inc",
        }
    }
}

fn list<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Bson {
    Bson::Array(values.into_iter().map(Into::into).collect())
}

/// An update query.
///
/// ```ignore
/// let mut query = Update::new();
/// query
///     .and_where("name", "John")
///     .set("active", true)
///     .increment("logins", 1)
///     .upsert(true);
///
/// assert_eq!(
///     query.get_update(),
///     doc! { "$set": { "active": true }, "$inc": { "logins": 1 } },
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Update {
    filter: FilterTree,
    options: Options,
    update: IndexMap<String, (Modifier, Bson)>,
    upsert: bool,
    multiple: bool,
    atomic: bool,
}

impl Default for Update {
    fn default() -> Self {
        Update {
            filter: FilterTree::default(),
            options: Options::default(),
            update: IndexMap::new(),
            upsert: false,
            multiple: true,
            atomic: false,
        }
    }
}

impl Update {
    pub fn new() -> Self {
        Update::default()
    }

    fn modify(&mut self, modifier: Modifier, field: impl Into<String>, value: Bson) -> &mut Self {
        self.update.insert(field.into(), (modifier, value));
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self {
        self.modify(Modifier::Set, field, value.into())
    }

    /// Sets several fields, in document order.
    pub fn set_many(&mut self, fields: Document) -> &mut Self {
        for (field, value) in fields {
            self.modify(Modifier::Set, field, value);
        }
        self
    }

    /// Unsets a field.
    pub fn remove(&mut self, field: impl Into<String>) -> &mut Self {
        self.modify(Modifier::Unset, field, Bson::Int32(1))
    }

    pub fn remove_many<S: Into<String>>(&mut self, fields: impl IntoIterator<Item = S>) -> &mut Self {
        for field in fields {
            self.remove(field);
        }
        self
    }

    pub fn rename(&mut self, field: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.modify(Modifier::Rename, field, Bson::String(to.into()))
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self {
        self.modify(Modifier::Push, field, value.into())
    }

    pub fn push_all<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self {
        self.modify(Modifier::PushAll, field, list(values))
    }

    pub fn pull(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self {
        self.modify(Modifier::Pull, field, value.into())
    }

    /// Pulls the elements matching `{operator: value}`, e.g. `("$gt", 5)`.
    pub fn pull_with(&mut self, field: impl Into<String>, operator: &str, value: impl Into<Bson>) -> &mut Self {
        let mut condition = Document::new();
        condition.insert(operator, value);
        self.modify(Modifier::Pull, field, Bson::Document(condition))
    }

    pub fn pull_all<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self {
        self.modify(Modifier::PullAll, field, list(values))
    }

    /// Adds a value to a set. Scalars are wrapped into a one-element array;
    /// arrays and documents (such as `{"$each": [...]}`) pass through.
    pub fn add_to_set(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self {
        let value = match value.into() {
            value @ (Bson::Array(_) | Bson::Document(_)) => value,
            scalar => Bson::Array(vec![scalar]),
        };
        self.modify(Modifier::AddToSet, field, value)
    }

    /// Removes the last element of an array.
    pub fn pop(&mut self, field: impl Into<String>) -> &mut Self {
        self.modify(Modifier::Pop, field, Bson::Int32(1))
    }

    /// Removes the first element of an array.
    pub fn unshift(&mut self, field: impl Into<String>) -> &mut Self {
        self.modify(Modifier::Pop, field, Bson::Int32(-1))
    }

    pub fn increment(&mut self, field: impl Into<String>, by: impl Into<Bson>) -> &mut Self {
        self.modify(Modifier::Inc, field, by.into())
    }

    /// Updates only the first matching document.
    pub fn single(&mut self, single: bool) -> &mut Self {
        self.multiple = !single;
        self
    }

    pub fn multiple(&mut self, multiple: bool) -> &mut Self {
        self.multiple = multiple;
        self
    }

    pub fn upsert(&mut self, upsert: bool) -> &mut Self {
        self.upsert = upsert;
        self
    }

    /// Appends the `$atomic` isolation marker to the update document.
    pub fn atomic(&mut self, atomic: bool) -> &mut Self {
        self.atomic = atomic;
        self
    }

    pub fn is_upsert(&self) -> bool {
        self.upsert
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// The modifier document grouped by operator, in first-seen order.
    pub fn get_update(&self) -> Document {
        let mut grouped: IndexMap<Modifier, Document> = IndexMap::new();
        for (field, (modifier, value)) in &self.update {
            grouped
                .entry(*modifier)
                .or_default()
                .insert(field.clone(), value.clone());
        }

        let mut update = Document::new();
        for (modifier, fields) in grouped {
            update.insert(modifier.as_str(), fields);
        }
        if self.atomic {
            update.insert("$atomic", 1);
        }

        update
    }
}

impl WhereClause for Update {
    fn filter_tree(&self) -> &FilterTree {
        &self.filter
    }

    fn filter_tree_mut(&mut self) -> &mut FilterTree {
        &mut self.filter
    }
}

impl QueryOptions for Update {
    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn apply_options(&mut self, patch: &OptionsPatch) {
        self.options.apply(patch);
        if let Some(upsert) = patch.upsert {
            self.upsert = upsert;
        }
        if let Some(multiple) = patch.multiple {
            self.multiple = multiple;
        }
        if let Some(atomic) = patch.atomic {
            self.atomic = atomic;
        }
    }

    fn get_options(&self) -> Document {
        let mut options = self.options.to_document();
        options.insert("upsert", self.upsert);
        options.insert("multiple", self.multiple);
        options
    }
}
