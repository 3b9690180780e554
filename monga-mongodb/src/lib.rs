//! MongoDB execution layer for monga.
//!
//! This crate runs the builders of `monga-core` against a MongoDB deployment
//! through the official async driver.
//!
//! To use it, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! monga = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Builder execution** - `Find`, `Update`, `Remove` and `Aggregation` builders run as driver calls
//! - **Failover retries** - writes are retried when the primary steps down
//! - **Indexing** - collections implement `IndexTarget` for the `Indexes` helper
//!
//! # Example
//!
//! ```ignore
//! use monga::{prelude::*, mongodb::Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let database = Database::builder("mongodb://localhost:27017", "my_database")
//!         .max_retries(2)
//!         .build()
//!         .await?;
//!
//!     let users = database.collection("users");
//!
//!     let mut query = Find::new();
//!     query.and_where("active", true).limit(10);
//!
//!     let documents = users.find(&query).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as monga_mongodb;

pub mod collection;
pub mod database;
mod query;

pub use collection::Collection;
pub use database::{Database, DatabaseBuilder};
