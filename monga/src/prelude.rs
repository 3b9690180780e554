//! Convenient re-exports of commonly used types from monga.
//!
//! Import this prelude module to quickly access the builders and the traits
//! carrying their chainable methods:
//!
//! ```ignore
//! use monga::prelude::*;
//! ```
//!
//! This provides access to:
//! - The query builders and their shared traits
//! - Aggregation and index helpers
//! - Option, value and error types

pub use monga_core::{
    query::{
        Aggregation, Computer, Find, Group, IndexSpec, IndexTarget, Indexes, Modifier, PostFindAction,
        Projection, Remove, SortDirection, Update, Where, WhereClause,
    },
    options::{Options, QueryOptions, default_timeout, set_default_timeout},
    input::{Compile, Input},
    value::{IntoIdentifier, Regex},
    retry::RetryPolicy,
    error::{MongaError, MongaResult},
};

pub use bson::{Bson, Document, doc, oid::ObjectId};
