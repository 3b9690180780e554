//! Read queries: a filter plus result shaping directives.

use bson::{Bson, Document};

use crate::{
    options::{Options, QueryOptions},
    query::{filter::FilterTree, where_clause::WhereClause},
};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    pub fn value(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl From<i32> for SortDirection {
    fn from(direction: i32) -> Self {
        if direction < 0 { SortDirection::Desc } else { SortDirection::Asc }
    }
}

/// `"asc"` sorts ascending, any other string descending.
impl From<&str> for SortDirection {
    fn from(direction: &str) -> Self {
        if direction == "asc" { SortDirection::Asc } else { SortDirection::Desc }
    }
}

/// A cursor directive to apply after the find call, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum PostFindAction {
    Sort(Document),
    Skip(u64),
    Limit(i64),
}

impl PostFindAction {
    pub fn name(&self) -> &'static str {
        match self {
            PostFindAction::Sort(_) => "sort",
            PostFindAction::Skip(_) => "skip",
            PostFindAction::Limit(_) => "limit",
        }
    }

    /// The directive's argument as a BSON value. Skips beyond `i64::MAX`
    /// saturate, since no collection can hold that many documents.
    pub fn argument(&self) -> Bson {
        match self {
            PostFindAction::Sort(sort) => Bson::Document(sort.clone()),
            PostFindAction::Skip(skip) => Bson::Int64(i64::try_from(*skip).unwrap_or(i64::MAX)),
            PostFindAction::Limit(limit) => Bson::Int64(*limit),
        }
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => false,
        Bson::Boolean(value) => *value,
        Bson::Int32(value) => *value != 0,
        Bson::Int64(value) => *value != 0,
        Bson::Double(value) => *value != 0.0,
        Bson::String(value) => !value.is_empty() && value != "0",
        Bson::Array(items) => !items.is_empty(),
        Bson::Document(document) => !document.is_empty(),
        _ => true,
    }
}

/// A find query.
///
/// ```ignore
/// let mut query = Find::new();
/// query
///     .and_where("active", true)
///     .order_by("name", "asc")
///     .skip(20)
///     .limit(10)
///     .select(["name", "email"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Find {
    filter: FilterTree,
    options: Options,
    sort: Document,
    skip: Option<u64>,
    limit: Option<i64>,
    fields: Document,
    find_one: bool,
}

impl Find {
    pub fn new() -> Self {
        Find::default()
    }

    /// Adds a sort key. Re-ordering an already sorted field replaces its
    /// direction in place.
    ///
    /// # Arguments
    ///
    /// * `field` - The field to sort on.
    /// * `direction` - `1`/`-1` or `"asc"`/`"desc"`.
    pub fn order_by(&mut self, field: impl Into<String>, direction: impl Into<SortDirection>) -> &mut Self {
        self.sort.insert(field.into(), direction.into().value());
        self
    }

    pub fn skip(&mut self, amount: u64) -> &mut Self {
        self.skip = Some(amount);
        self
    }

    pub fn limit(&mut self, amount: i64) -> &mut Self {
        self.limit = Some(amount);
        self
    }

    /// Includes fields in the result documents.
    pub fn select<S: Into<String>>(&mut self, fields: impl IntoIterator<Item = S>) -> &mut Self {
        for field in fields {
            self.fields.insert(field.into(), 1);
        }
        self
    }

    /// Excludes fields from the result documents.
    pub fn exclude<S: Into<String>>(&mut self, fields: impl IntoIterator<Item = S>) -> &mut Self {
        for field in fields {
            self.fields.insert(field.into(), -1);
        }
        self
    }

    /// Merges a projection map: truthy values include the field, falsy values
    /// exclude it.
    pub fn fields(&mut self, fields: Document) -> &mut Self {
        for (field, value) in fields {
            self.fields.insert(field, if truthy(&value) { 1 } else { -1 });
        }
        self
    }

    pub fn get_fields(&self) -> Document {
        self.fields.clone()
    }

    /// Requests a single document instead of a list.
    pub fn one(&mut self, one: bool) -> &mut Self {
        self.find_one = one;
        self
    }

    pub fn multiple(&mut self, multiple: bool) -> &mut Self {
        self.find_one = !multiple;
        self
    }

    pub fn get_find_one(&self) -> bool {
        self.find_one
    }

    /// Cursor directives in the order sort, skip, limit. Directives that were
    /// never set are omitted.
    pub fn get_post_find_actions(&self) -> Vec<PostFindAction> {
        let mut actions = Vec::new();

        if !self.sort.is_empty() {
            actions.push(PostFindAction::Sort(self.sort.clone()));
        }
        if let Some(skip) = self.skip {
            actions.push(PostFindAction::Skip(skip));
        }
        if let Some(limit) = self.limit {
            actions.push(PostFindAction::Limit(limit));
        }

        actions
    }
}

impl WhereClause for Find {
    fn filter_tree(&self) -> &FilterTree {
        &self.filter
    }

    fn filter_tree_mut(&mut self) -> &mut FilterTree {
        &mut self.filter
    }
}

impl QueryOptions for Find {
    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }
}
