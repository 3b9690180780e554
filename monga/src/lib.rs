//! Main monga crate providing a fluent query builder for MongoDB documents.
//!
//! This crate is the primary entry point for users of monga. It re-exports the
//! builders from `monga-core` and, behind the `mongodb` feature, the driver
//! layer executing them.
//!
//! # Features
//!
//! - **Chainable filters** - Build `$and`/`$or` filter trees from plain method calls
//! - **Updates** - Compose `$set`, `$inc`, `$push`, ... modifier documents
//! - **Aggregation** - Assemble pipelines with typed `$group` and `$project` builders
//! - **Indexes** - Create and drop indexes with shorthand direction tokens
//!
//! # Quick Start
//!
//! ```ignore
//! use monga::prelude::*;
//!
//! let mut query = Find::new();
//! query
//!     .and_where("name", "John")
//!     .where_between("age", 18, 65)
//!     .or_where_nested(|nested| {
//!         nested.where_exists("email");
//!     })
//!     .order_by("name", "asc")
//!     .limit(10);
//!
//! let filter = query.get_where();
//! let actions = query.get_post_find_actions();
//! ```
//!
//! # Updates
//!
//! ```ignore
//! use monga::prelude::*;
//!
//! let mut update = Update::new();
//! update
//!     .where_id("4af9f23d8ead0e1d32000000")?
//!     .set("name", "Jane")
//!     .increment("logins", 1)
//!     .add_to_set("roles", "editor");
//!
//! assert_eq!(
//!     update.get_update(),
//!     doc! {
//!         "$set": { "name": "Jane" },
//!         "$inc": { "logins": 1 },
//!         "$addToSet": { "roles": ["editor"] },
//!     },
//! );
//! ```
//!
//! # Aggregation
//!
//! ```ignore
//! use monga::prelude::*;
//!
//! let mut aggregation = Aggregation::new();
//! aggregation
//!     .filter_with(|filter| {
//!         filter.where_exists("category");
//!     })
//!     .group_with(|group| {
//!         group.by("category").sum("total", "price");
//!     })
//!     .limit(5);
//!
//! let pipeline = aggregation.get_pipeline();
//! ```
//!
//! # Backends
//!
//! - [`mongodb`] - MongoDB execution layer (requires `mongodb` feature)

pub mod prelude;

pub use monga_core::{error, input, options, query, retry, value};

// Re-export BSON types for convenience
pub use bson;

/// MongoDB execution layer.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use monga_mongodb::{Collection, Database, DatabaseBuilder};
}
