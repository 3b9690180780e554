//! Query construction for document stores.
//!
//! Every builder is a short-lived value: configure it with chained calls, then
//! read its documents with the terminal getters (`get_where`, `get_update`,
//! `get_pipeline`, ...) or hand it to a collection for execution.
//!
//! # Filters
//!
//! The [`WhereClause`] trait holds the predicate methods. [`Where`], [`Find`],
//! [`Update`] and [`Remove`] all implement it:
//!
//! ```ignore
//! use monga_core::query::{Update, WhereClause};
//!
//! let mut query = Update::new();
//! query
//!     .where_in("status", ["new", "pending"])
//!     .where_lt("attempts", 3)
//!     .increment("attempts", 1);
//! ```
//!
//! - Comparison: `where_lt`, `where_lte`, `where_gt`, `where_gte`, `where_between`, `where_not`
//! - Membership: `where_in`, `where_not_in`, `where_all`, `where_size`
//! - Existence and type: `where_exists`, `where_not_exists`, `where_type`
//! - Pattern: `where_regex`, `where_like`
//! - Geospatial: `where_near`, `where_within`
//! - Grouping: `where_nested`, `where_clause`, `nor_where`, `not_where`
//!
//! Each method has an `or_` twin starting a new alternative.

pub mod aggregation;
pub mod computer;
pub mod filter;
pub mod find;
pub mod indexes;
pub mod remove;
pub mod update;
pub mod where_clause;

pub use aggregation::Aggregation;
pub use computer::{Computer, Group, Projection};
pub use filter::{Chain, FilterTree};
pub use find::{Find, PostFindAction, SortDirection};
pub use indexes::{IndexSpec, IndexTarget, Indexes};
pub use remove::Remove;
pub use update::{Modifier, Update};
pub use where_clause::{DEFAULT_LIKE_FLAGS, Where, WhereClause, like_pattern, resolve_type};
