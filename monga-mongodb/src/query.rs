//! Translation of builder state into MongoDB driver options.
//!
//! The builders in `monga-core` describe a query as plain documents. This
//! module maps the parts the driver expects as typed options (projection,
//! cursor directives, write concern) and classifies driver failures for the
//! retry policy.

use bson::{Bson, Document};
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{Acknowledgment, DeleteOptions, FindOneOptions, FindOptions, InsertManyOptions, UpdateOptions, WriteConcern},
};

use monga_core::{
    options::{Options, QueryOptions},
    query::{Find, PostFindAction},
    retry::is_not_primary_code,
};

/// Converts a builder projection for the server, which expects `0` rather
/// than `-1` for excluded fields. An empty projection selects everything.
pub(crate) fn server_projection(fields: Document) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }

    Some(
        fields
            .into_iter()
            .map(|(field, value)| match value {
                Bson::Int32(-1) => (field, Bson::Int32(0)),
                other => (field, other),
            })
            .collect(),
    )
}

/// Write concern for a builder's option set. Unacknowledged option sets keep
/// the collection's default write concern.
pub(crate) fn write_concern(options: &Options) -> Option<WriteConcern> {
    if !options.safe && !options.fsync {
        return None;
    }

    let mut concern = WriteConcern::default();
    concern.w = Some(Acknowledgment::Nodes(1));
    concern.w_timeout = Some(options.effective_timeout());
    if options.fsync {
        concern.journal = Some(true);
    }

    Some(concern)
}

pub(crate) fn find_options(query: &Find) -> FindOptions {
    let mut options = FindOptions::default();

    options.projection = server_projection(query.get_fields());
    options.max_time = Some(query.options().effective_timeout());

    for action in query.get_post_find_actions() {
        match action {
            PostFindAction::Sort(sort) => options.sort = Some(sort),
            PostFindAction::Skip(skip) => options.skip = Some(skip),
            PostFindAction::Limit(limit) => options.limit = Some(limit),
        }
    }

    if query.get_find_one() {
        options.limit = Some(1);
    }

    options
}

pub(crate) fn find_one_options(query: &Find) -> FindOneOptions {
    let mut options = FindOneOptions::default();

    options.projection = server_projection(query.get_fields());
    options.max_time = Some(query.options().effective_timeout());

    for action in query.get_post_find_actions() {
        match action {
            PostFindAction::Sort(sort) => options.sort = Some(sort),
            PostFindAction::Skip(skip) => options.skip = Some(skip),
            PostFindAction::Limit(_) => {}
        }
    }

    options
}

pub(crate) fn insert_options(options: &Options) -> InsertManyOptions {
    let mut insert = InsertManyOptions::default();
    insert.write_concern = write_concern(options);
    insert
}

pub(crate) fn update_options(options: &Options, upsert: bool) -> UpdateOptions {
    let mut update = UpdateOptions::default();
    update.upsert = Some(upsert);
    update.write_concern = write_concern(options);
    update
}

pub(crate) fn delete_options(options: &Options) -> DeleteOptions {
    let mut delete = DeleteOptions::default();
    delete.write_concern = write_concern(options);
    delete
}

/// The name the server assigns to an index created without an explicit
/// name: `field_direction` pairs joined with `_`.
pub(crate) fn index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, value)| {
            let value = match value {
                Bson::String(token) => token.clone(),
                Bson::Int32(direction) => direction.to_string(),
                Bson::Int64(direction) => direction.to_string(),
                Bson::Double(direction) => (*direction as i64).to_string(),
                other => other.to_string(),
            };
            format!("{field}_{value}")
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// `true` for failures raised because the contacted node is not the primary.
pub(crate) fn is_not_primary(error: &MongoError) -> bool {
    let code = match error.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => Some(concern.code),
        _ => None,
    };

    code.is_some_and(is_not_primary_code)
}
