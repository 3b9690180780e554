//! A fluent query builder for MongoDB style document databases.
//!
//! This crate is the core of the monga project and provides:
//!
//! - **Filter building** ([`query`]) - `Where`, `Find`, `Update` and `Remove` builders compiling
//!   chained predicate calls into filter, projection and modifier documents
//! - **Aggregation** ([`query`]) - pipeline assembly with `Group` and `Projection` stage builders
//! - **Index management** ([`query::indexes`]) - index creation and removal against any index target
//! - **Query options** ([`options`]) - acknowledgement, fsync and timeout options shared by the builders
//! - **Value helpers** ([`value`]) - identifiers, regexes, binary data, dates and code values
//! - **Write retries** ([`retry`]) - the bounded retry policy used around write operations
//! - **Error handling** ([`error`]) - error and result types
//!
//! The builders perform no I/O; they produce `bson` documents for a driver to execute.
//!
//! # Example
//!
//! ```ignore
//! use monga_core::query::{Find, WhereClause};
//! use bson::doc;
//!
//! let mut query = Find::new();
//! query
//!     .and_where("name", "John")
//!     .or_where("name", "Jane")
//!     .order_by("age", "desc")
//!     .limit(10);
//!
//! assert_eq!(
//!     query.get_where(),
//!     doc! { "$or": [{ "name": "John" }, { "name": "Jane" }] },
//! );
//! ```

#[allow(unused_extern_crates)]
extern crate self as monga_core;

pub mod error;
pub mod input;
pub mod options;
pub mod query;
pub mod retry;
pub mod value;
