//! Fluent construction of filter documents.
//!
//! [`WhereClause`] carries every predicate method and is implemented by all
//! builders that filter documents (`Where`, `Find`, `Update`, `Remove`). Each
//! predicate kind has an AND form (`where_*`, merged into the open branch) and
//! an OR form (`or_where_*`, opening a new branch).
//!
//! ```ignore
//! use monga::prelude::*;
//!
//! let mut query = Where::new();
//! query
//!     .and_where("name", "John")
//!     .where_gt("age", 18)
//!     .or_where_nested(|nested| {
//!         nested.and_where("role", "admin");
//!     });
//!
//! assert_eq!(
//!     query.get_where(),
//!     doc! { "$or": [{ "name": "John", "age": { "$gt": 18 } }, { "role": "admin" }] },
//! );
//! ```

use bson::{Bson, Document, doc};

use crate::{
    error::{MongaError, MongaResult},
    input::{Compile, Input},
    options::{Options, QueryOptions},
    query::filter::{Chain, FilterTree},
    value::{IntoIdentifier, Regex},
};

/// Flags applied by [`WhereClause::where_like`].
pub const DEFAULT_LIKE_FLAGS: &str = "imxsu";

const TYPE_CODES: [(&str, i32); 22] = [
    ("DOUBLE", 1),
    ("STRING", 2),
    ("OBJECT", 3),
    ("ARRAY", 4),
    ("BINARY", 5),
    ("ID", 8),
    ("BOOL", 8),
    ("BOOLEAN", 8),
    ("DATE", 9),
    ("NULL", 10),
    ("REGEX", 11),
    ("JAVASCRIPT", 13),
    ("CODE", 13),
    ("SYMBOL", 14),
    ("JAVASCRIPT_SCOPE", 15),
    ("CODE_SCOPE", 15),
    ("INT32", 16),
    ("TS", 17),
    ("TIMESTAMP", 17),
    ("INT64", 18),
    ("MIN", -1),
    ("MAX", 127),
];

/// Resolves a symbolic type name (case-insensitive) to its BSON type code.
///
/// Numeric strings are passed through unresolved.
pub fn resolve_type(type_name: &str) -> MongaResult<i32> {
    if let Ok(code) = type_name.trim().parse::<i32>() {
        return Ok(code);
    }

    let upper = type_name.to_ascii_uppercase();
    TYPE_CODES
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, code)| *code)
        .ok_or_else(|| MongaError::InvalidArgument(format!("type \"{upper}\" could not be resolved")))
}

/// Translates a SQL `LIKE` pattern into an anchored regex pattern.
///
/// Regex metacharacters are escaped, a leading `%` drops the `^` anchor and a
/// trailing `%` drops the `$` anchor.
pub fn like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        if "\\.+*?[^]$(){}=!<>|:-#/".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    let mut value = match escaped.strip_prefix('%') {
        Some(rest) => rest.to_string(),
        None => format!("^{escaped}"),
    };

    match value.strip_suffix('%') {
        Some(rest) => value = rest.to_string(),
        None => value.push('$'),
    }

    value
}

fn list<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Bson {
    Bson::Array(values.into_iter().map(Into::into).collect())
}

fn operator(name: &str, value: impl Into<Bson>) -> Bson {
    let mut statement = Document::new();
    statement.insert(name, value);
    Bson::Document(statement)
}

fn range(min: impl Into<Bson>, max: impl Into<Bson>) -> Bson {
    let mut statement = Document::new();
    statement.insert("$gt", min);
    statement.insert("$lt", max);
    Bson::Document(statement)
}

fn within(shape: impl Into<Bson>) -> Document {
    let mut statement = Document::new();
    statement.insert("$within", shape);
    statement
}

fn with_options(mut operator: Document, options: Document) -> Bson {
    for (key, value) in options {
        if !operator.contains_key(&key) {
            operator.insert(key, value);
        }
    }
    Bson::Document(operator)
}

/// Predicate methods shared by every filtering builder.
pub trait WhereClause {
    fn filter_tree(&self) -> &FilterTree;

    fn filter_tree_mut(&mut self) -> &mut FilterTree;

    /// Routes a predicate to the branch selected by `chain`.
    fn push_where(&mut self, chain: Chain, field: impl Into<String>, statement: Bson) -> &mut Self
    where
        Self: Sized,
    {
        self.filter_tree_mut().push_predicate(chain, field, statement);
        self
    }

    /// Resolves a sub-clause and embeds it under `chain`.
    fn push_clause<'a>(&mut self, chain: Chain, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        let clause: Input<'a, Where> = clause.into();
        let statement = clause.resolve();
        self.filter_tree_mut().push_nested(chain, statement);
        self
    }

    /// Wraps a sub-clause in a one-element list under a list pseudo-field.
    fn push_list_clause<'a>(
        &mut self,
        chain: Chain,
        operator: &str,
        clause: impl Into<Input<'a, Where>>,
    ) -> &mut Self
    where
        Self: Sized,
    {
        let clause: Input<'a, Where> = clause.into();
        let statement = clause.resolve();
        if statement.is_empty() {
            return self;
        }
        self.push_where(chain, operator, Bson::Array(vec![Bson::Document(statement)]))
    }

    /// Adds a field-equals predicate to the current AND-branch.
    fn and_where(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, value.into())
    }

    /// Adds a field-equals predicate as a new OR-branch.
    fn or_where(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, value.into())
    }

    /// Adds every `field: value` pair of `fields` to the current AND-branch.
    fn where_fields(&mut self, fields: Document) -> &mut Self
    where
        Self: Sized,
    {
        for (field, value) in fields {
            self.push_where(Chain::And, field, value);
        }
        self
    }

    /// Adds every `field: value` pair of `fields` as its own OR-branch.
    fn or_where_fields(&mut self, fields: Document) -> &mut Self
    where
        Self: Sized,
    {
        for (field, value) in fields {
            self.push_where(Chain::Or, field, value);
        }
        self
    }

    /// Embeds a sub-filter (document or configured [`Where`]) in the current
    /// AND-branch.
    fn where_clause<'a>(&mut self, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_clause(Chain::And, clause)
    }

    /// Adds a sub-filter as a new OR-branch.
    fn or_where_clause<'a>(&mut self, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_clause(Chain::Or, clause)
    }

    /// Builds a grouped sub-filter with `callback` and embeds it in the current
    /// AND-branch. A callback adding nothing leaves the builder unchanged.
    fn where_nested<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Where),
        Self: Sized,
    {
        self.push_clause(Chain::And, Input::callback(callback))
    }

    /// Builds a grouped sub-filter with `callback` and adds it as a new
    /// OR-branch.
    fn or_where_nested<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Where),
        Self: Sized,
    {
        self.push_clause(Chain::Or, Input::callback(callback))
    }

    fn where_not(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$ne", value))
    }

    fn or_where_not(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$ne", value))
    }

    fn where_in<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$in", list(values)))
    }

    fn or_where_in<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$in", list(values)))
    }

    fn where_not_in<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$nin", list(values)))
    }

    fn or_where_not_in<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$nin", list(values)))
    }

    fn where_all<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$all", list(values)))
    }

    fn or_where_all<V: Into<Bson>>(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$all", list(values)))
    }

    fn where_exists(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$exists", true))
    }

    fn or_where_exists(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$exists", true))
    }

    fn where_not_exists(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$exists", false))
    }

    fn or_where_not_exists(&mut self, field: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$exists", false))
    }

    fn where_lt(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$lt", value))
    }

    fn or_where_lt(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$lt", value))
    }

    fn where_lte(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$lte", value))
    }

    fn or_where_lte(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$lte", value))
    }

    fn where_gt(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$gt", value))
    }

    fn or_where_gt(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$gt", value))
    }

    fn where_gte(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$gte", value))
    }

    fn or_where_gte(&mut self, field: impl Into<String>, value: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$gte", value))
    }

    /// Exclusive range: `min < field < max`.
    fn where_between(&mut self, field: impl Into<String>, min: impl Into<Bson>, max: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, range(min, max))
    }

    fn or_where_between(&mut self, field: impl Into<String>, min: impl Into<Bson>, max: impl Into<Bson>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, range(min, max))
    }

    fn where_size(&mut self, field: impl Into<String>, size: i32) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$size", size))
    }

    fn or_where_size(&mut self, field: impl Into<String>, size: i32) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$size", size))
    }

    /// Matches on the stored BSON type, given by name (`"string"`, `"int64"`, ...)
    /// or as a numeric string. Unknown names are an argument error.
    fn where_type(&mut self, field: impl Into<String>, type_name: &str) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let code = resolve_type(type_name)?;
        Ok(self.where_type_code(field, code))
    }

    fn or_where_type(&mut self, field: impl Into<String>, type_name: &str) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let code = resolve_type(type_name)?;
        Ok(self.or_where_type_code(field, code))
    }

    fn where_type_code(&mut self, field: impl Into<String>, code: i32) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, operator("$type", code))
    }

    fn or_where_type_code(&mut self, field: impl Into<String>, code: i32) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, operator("$type", code))
    }

    /// Geospatial proximity. Keys of `options` (e.g. `$maxDistance`) are added
    /// next to `$near`.
    fn where_near(&mut self, field: impl Into<String>, lon: f64, lat: f64, options: Document) -> &mut Self
    where
        Self: Sized,
    {
        let statement = with_options(doc! { "$near": [lon, lat] }, options);
        self.push_where(Chain::And, field, statement)
    }

    fn or_where_near(&mut self, field: impl Into<String>, lon: f64, lat: f64, options: Document) -> &mut Self
    where
        Self: Sized,
    {
        let statement = with_options(doc! { "$near": [lon, lat] }, options);
        self.push_where(Chain::Or, field, statement)
    }

    fn where_within(&mut self, field: impl Into<String>, shape: impl Into<Bson>, options: Document) -> &mut Self
    where
        Self: Sized,
    {
        let statement = with_options(within(shape), options);
        self.push_where(Chain::And, field, statement)
    }

    fn or_where_within(&mut self, field: impl Into<String>, shape: impl Into<Bson>, options: Document) -> &mut Self
    where
        Self: Sized,
    {
        let statement = with_options(within(shape), options);
        self.push_where(Chain::Or, field, statement)
    }

    fn where_regex(&mut self, field: impl Into<String>, regex: Regex) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::And, field, regex.into())
    }

    fn or_where_regex(&mut self, field: impl Into<String>, regex: Regex) -> &mut Self
    where
        Self: Sized,
    {
        self.push_where(Chain::Or, field, regex.into())
    }

    /// SQL style pattern match: `%` at either end is a wildcard, everything
    /// else matches literally. Fails on a nul byte in the pattern.
    fn where_like(&mut self, field: impl Into<String>, pattern: &str) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        self.where_like_with_flags(field, pattern, DEFAULT_LIKE_FLAGS)
    }

    fn where_like_with_flags(
        &mut self,
        field: impl Into<String>,
        pattern: &str,
        flags: &str,
    ) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let regex = Regex::new(like_pattern(pattern), flags)?;
        Ok(self.where_regex(field, regex))
    }

    fn or_where_like(&mut self, field: impl Into<String>, pattern: &str) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        self.or_where_like_with_flags(field, pattern, DEFAULT_LIKE_FLAGS)
    }

    fn or_where_like_with_flags(
        &mut self,
        field: impl Into<String>,
        pattern: &str,
        flags: &str,
    ) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let regex = Regex::new(like_pattern(pattern), flags)?;
        Ok(self.or_where_regex(field, regex))
    }

    /// Matches `_id`, coercing hex strings into object ids.
    fn where_id(&mut self, id: impl IntoIdentifier) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        self.where_id_field("_id", id)
    }

    fn where_id_field(&mut self, field: impl Into<String>, id: impl IntoIdentifier) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let id = id.into_identifier()?;
        Ok(self.push_where(Chain::And, field, Bson::ObjectId(id)))
    }

    fn or_where_id(&mut self, id: impl IntoIdentifier) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        self.or_where_id_field("_id", id)
    }

    fn or_where_id_field(&mut self, field: impl Into<String>, id: impl IntoIdentifier) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let id = id.into_identifier()?;
        Ok(self.push_where(Chain::Or, field, Bson::ObjectId(id)))
    }

    /// Excludes documents matching `clause`. Repeated calls on the same branch
    /// extend a single `$nor` list.
    fn nor_where<'a>(&mut self, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_list_clause(Chain::And, "$nor", clause)
    }

    fn nor_where_with<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Where),
        Self: Sized,
    {
        self.push_list_clause(Chain::And, "$nor", Input::callback(callback))
    }

    fn or_nor_where<'a>(&mut self, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_list_clause(Chain::Or, "$nor", clause)
    }

    fn or_nor_where_with<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Where),
        Self: Sized,
    {
        self.push_list_clause(Chain::Or, "$nor", Input::callback(callback))
    }

    /// Negates `clause`. Repeated calls on the same branch extend a single
    /// `$not` list.
    fn not_where<'a>(&mut self, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_list_clause(Chain::And, "$not", clause)
    }

    fn not_where_with<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Where),
        Self: Sized,
    {
        self.push_list_clause(Chain::And, "$not", Input::callback(callback))
    }

    fn or_not_where<'a>(&mut self, clause: impl Into<Input<'a, Where>>) -> &mut Self
    where
        Self: Sized,
    {
        self.push_list_clause(Chain::Or, "$not", clause)
    }

    fn or_not_where_with<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Where),
        Self: Sized,
    {
        self.push_list_clause(Chain::Or, "$not", Input::callback(callback))
    }

    /// The serialized filter, empty when nothing was added.
    fn get_where(&self) -> Document {
        self.filter_tree().to_document()
    }

    /// Replaces the filter with a pre-built document. Further predicates chain
    /// onto it; an empty document clears the filter.
    fn set_where(&mut self, filter: Document) -> &mut Self
    where
        Self: Sized,
    {
        *self.filter_tree_mut() = FilterTree::from_document(filter);
        self
    }
}

/// A standalone filter builder.
///
/// Used for `$match` stages, counts and as the sub-builder handed to nested
/// clause callbacks.
#[derive(Debug, Clone, Default)]
pub struct Where {
    filter: FilterTree,
    options: Options,
}

impl Where {
    pub fn new() -> Self {
        Where::default()
    }
}

impl WhereClause for Where {
    fn filter_tree(&self) -> &FilterTree {
        &self.filter
    }

    fn filter_tree_mut(&mut self) -> &mut FilterTree {
        &mut self.filter
    }
}

impl QueryOptions for Where {
    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }
}

impl Compile for Where {
    fn compile(&self) -> Document {
        self.get_where()
    }
}

impl From<Where> for Input<'_, Where> {
    fn from(builder: Where) -> Self {
        Input::Builder(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where() {
        let mut query = Where::new();
        query.and_where("name", "John");

        assert_eq!(query.filter_tree().branch_count(), 1);
        assert_eq!(query.get_where(), doc! { "name": "John" });
    }

    #[test]
    fn test_set_where_then_clear() {
        let mut query = Where::new();
        query.set_where(doc! { "name": "John" });
        assert_eq!(query.get_where(), doc! { "name": "John" });

        query.set_where(Document::new());
        assert!(query.filter_tree().is_empty());
        assert_eq!(query.get_where(), Document::new());
    }

    #[test]
    fn test_set_where_allows_chaining() {
        let mut query = Where::new();
        query.set_where(doc! { "name": "John" }).and_where("age", 30);
        assert_eq!(query.get_where(), doc! { "name": "John", "age": 30 });
    }

    #[test]
    fn test_where_not() {
        let mut query = Where::new();
        query.where_not("name", "John");
        assert_eq!(query.get_where(), doc! { "name": { "$ne": "John" } });
    }

    #[test]
    fn test_where_between() {
        let mut query = Where::new();
        query.where_between("age", 10, 15);
        assert_eq!(query.get_where(), doc! { "age": { "$gt": 10, "$lt": 15 } });
    }

    #[test]
    fn test_membership_predicates() {
        let mut query = Where::new();
        query
            .where_in("a", [1, 2])
            .where_not_in("b", ["x"])
            .where_all("c", vec![true]);

        assert_eq!(
            query.get_where(),
            doc! {
                "a": { "$in": [1, 2] },
                "b": { "$nin": ["x"] },
                "c": { "$all": [true] },
            }
        );
    }

    #[test]
    fn test_existence_and_comparison() {
        let mut query = Where::new();
        query
            .where_exists("a")
            .where_not_exists("b")
            .where_lt("c", 1)
            .where_lte("d", 2)
            .where_gt("e", 3)
            .where_gte("f", 4)
            .where_size("g", 5);

        assert_eq!(
            query.get_where(),
            doc! {
                "a": { "$exists": true },
                "b": { "$exists": false },
                "c": { "$lt": 1 },
                "d": { "$lte": 2 },
                "e": { "$gt": 3 },
                "f": { "$gte": 4 },
                "g": { "$size": 5 },
            }
        );
    }

    #[test]
    fn test_or_variants_open_branches() {
        let mut query = Where::new();
        query
            .or_where("a", 1)
            .or_where_not("b", 2)
            .or_where_in("c", [3])
            .or_where_exists("d");

        assert_eq!(query.filter_tree().branch_count(), 4);
        assert_eq!(
            query.get_where(),
            doc! { "$or": [
                { "a": 1 },
                { "b": { "$ne": 2 } },
                { "c": { "$in": [3] } },
                { "d": { "$exists": true } },
            ] }
        );
    }

    fn regex_value(pattern: &str, flags: &str) -> Bson {
        Regex::new(pattern, flags).unwrap().into()
    }

    #[test]
    fn test_where_like_anchors() {
        let like = |pattern: &str| {
            let mut query = Where::new();
            query.where_like("name", pattern).unwrap();
            query.get_where()
        };

        assert_eq!(like("%value"), doc! { "name": regex_value("value$", "imsux") });
        assert_eq!(like("value%"), doc! { "name": regex_value("^value", "imsux") });
        assert_eq!(like("value"), doc! { "name": regex_value("^value$", "imsux") });
        assert_eq!(like("%value%"), doc! { "name": regex_value("value", "imsux") });
    }

    #[test]
    fn test_where_like_rejects_nul_bytes() {
        let mut query = Where::new();
        assert!(query.where_like("name", "a\0b").err().unwrap().is_argument_error());
        assert!(query.filter_tree().is_empty());
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("a.b*c"), "^a\\.b\\*c$");
        assert_eq!(like_pattern("%50%"), "50");
        assert_eq!(like_pattern("1+1%"), "^1\\+1");
    }

    #[test]
    fn test_where_like_with_flags() {
        let mut query = Where::new();
        query.or_where_like_with_flags("name", "jo%", "i").unwrap();
        assert_eq!(query.get_where(), doc! { "name": regex_value("^jo", "i") });
    }

    #[test]
    fn test_where_type() {
        let mut query = Where::new();
        query.where_type("name", "string").unwrap();
        assert_eq!(query.get_where(), doc! { "name": { "$type": 2 } });
    }

    #[test]
    fn test_where_type_unknown_name() {
        let mut query = Where::new();
        let err = query.where_type("name", "bogus").err().unwrap();
        assert!(err.is_argument_error());
        assert!(query.filter_tree().is_empty());
    }

    #[test]
    fn test_resolve_type() {
        assert_eq!(resolve_type("STRING").unwrap(), 2);
        assert_eq!(resolve_type("Boolean").unwrap(), 8);
        assert_eq!(resolve_type("code_scope").unwrap(), 15);
        assert_eq!(resolve_type("min").unwrap(), -1);
        assert_eq!(resolve_type("max").unwrap(), 127);
        assert_eq!(resolve_type("7").unwrap(), 7);
        assert!(resolve_type("varchar").is_err());
    }

    #[test]
    fn test_where_id_coerces_strings() {
        let mut query = Where::new();
        query.where_id("4af9f23d8ead0e1d32000000").unwrap();

        let expected = crate::value::id("4af9f23d8ead0e1d32000000").unwrap();
        assert_eq!(query.get_where(), doc! { "_id": expected });
    }

    #[test]
    fn test_where_id_rejects_malformed() {
        let mut query = Where::new();
        assert!(query.where_id_field("parent", "xyz").is_err());
    }

    #[test]
    fn test_where_near_and_within() {
        let mut query = Where::new();
        query
            .where_near("loc", 1.5, 2.5, doc! { "$maxDistance": 10 })
            .or_where_within("area", doc! { "$box": [[0, 0], [1, 1]] }, Document::new());

        assert_eq!(
            query.get_where(),
            doc! { "$or": [
                { "loc": { "$near": [1.5, 2.5], "$maxDistance": 10 } },
                { "area": { "$within": { "$box": [[0, 0], [1, 1]] } } },
            ] }
        );
    }

    #[test]
    fn test_where_regex() {
        let mut query = Where::new();
        query.where_regex("name", crate::value::regex("/^jo/i").unwrap());
        assert_eq!(query.get_where(), doc! { "name": regex_value("^jo", "i") });
    }

    #[test]
    fn test_regex_values_inside_membership_lists() {
        let mut query = Where::new();
        query.where_in("name", [Bson::from(crate::value::regex("/^jo/i").unwrap()), Bson::from("ann")]);

        assert_eq!(
            query.get_where(),
            doc! { "name": { "$in": [regex_value("^jo", "i"), "ann"] } }
        );
    }

    #[test]
    fn test_nested_callback() {
        let mut query = Where::new();
        query.and_where("status", "active").where_nested(|nested| {
            nested.and_where("a", 1).or_where("b", 2);
        });

        assert_eq!(
            query.get_where(),
            doc! { "$and": [
                { "status": "active" },
                { "$or": [{ "a": 1 }, { "b": 2 }] },
            ] }
        );
    }

    #[test]
    fn test_or_nested_callback_becomes_branch() {
        let mut query = Where::new();
        query.and_where("a", 1).or_where_nested(|nested| {
            nested.and_where("b", 2).and_where("c", 3);
        });

        assert_eq!(
            query.get_where(),
            doc! { "$or": [{ "a": 1 }, { "b": 2, "c": 3 }] }
        );
    }

    #[test]
    fn test_empty_nested_callback_is_noop() {
        let mut query = Where::new();
        query.and_where("a", 1);
        let before = query.get_where();

        query.where_nested(|_| {}).or_where_nested(|_| {});
        assert_eq!(query.get_where(), before);
        assert_eq!(query.filter_tree().branch_count(), 1);
    }

    #[test]
    fn test_where_clause_accepts_builders() {
        let mut inner = Where::new();
        inner.and_where("a", 1).or_where("b", 2);

        let mut query = Where::new();
        query.where_clause(inner).and_where("c", 3);

        assert_eq!(
            query.get_where(),
            doc! { "$or": [{ "a": 1 }, { "b": 2 }], "c": 3 }
        );
    }

    #[test]
    fn test_where_fields() {
        let mut query = Where::new();
        query.where_fields(doc! { "a": 1, "b": 2 });
        assert_eq!(query.get_where(), doc! { "a": 1, "b": 2 });

        let mut query = Where::new();
        query.or_where_fields(doc! { "a": 1, "b": 2 });
        assert_eq!(query.get_where(), doc! { "$or": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn test_nor_where_merges_by_append() {
        let mut query = Where::new();
        query
            .nor_where_with(|w| {
                w.and_where("a", 1);
            })
            .nor_where(doc! { "b": 2 });

        assert_eq!(query.get_where(), doc! { "$nor": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn test_not_where_merges_by_append() {
        let mut query = Where::new();
        query.not_where(doc! { "a": 1 }).not_where(doc! { "b": 2 });
        assert_eq!(query.get_where(), doc! { "$not": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn test_or_nor_where_opens_branch() {
        let mut query = Where::new();
        query.and_where("a", 1).or_nor_where(doc! { "b": 2 });
        assert_eq!(
            query.get_where(),
            doc! { "$or": [{ "a": 1 }, { "$nor": [{ "b": 2 }] }] }
        );
    }

    #[test]
    fn test_empty_nor_clause_is_noop() {
        let mut query = Where::new();
        query.nor_where_with(|_| {}).not_where(Document::new());
        assert!(query.filter_tree().is_empty());
    }

    #[test]
    fn test_nor_clause_from_raw_value() {
        let mut query = Where::new();
        let clause = Input::<Where>::try_from(Bson::Document(doc! { "a": 1 })).unwrap();
        query.nor_where(clause);
        assert_eq!(query.get_where(), doc! { "$nor": [{ "a": 1 }] });

        assert!(Input::<Where>::try_from(Bson::Int32(1)).is_err());
    }
}
