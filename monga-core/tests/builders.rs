use std::time::Duration;

use bson::doc;

use monga_core::{
    options::{QueryOptions, default_timeout, set_default_timeout},
    query::{Aggregation, Computer, Find, PostFindAction, Remove, Update, Where, WhereClause},
    value,
};

#[test]
fn test_find_full_query() {
    let mut query = Find::new();
    query
        .and_where("status", "active")
        .where_gte("age", 18)
        .or_where_nested(|nested| {
            nested.and_where("role", "admin");
        })
        .order_by("name", "asc")
        .skip(10)
        .limit(5)
        .select(["name", "age"]);

    assert_eq!(
        query.get_where(),
        doc! { "$or": [
            { "status": "active", "age": { "$gte": 18 } },
            { "role": "admin" },
        ] }
    );
    assert_eq!(
        query.get_post_find_actions(),
        vec![
            PostFindAction::Sort(doc! { "name": 1 }),
            PostFindAction::Skip(10),
            PostFindAction::Limit(5),
        ]
    );
    assert_eq!(query.get_fields(), doc! { "name": 1, "age": 1 });
}

#[test]
fn test_update_with_filter_and_options() {
    let mut query = Update::new();
    query
        .where_id("4af9f23d8ead0e1d32000000")
        .unwrap()
        .set("name", "John")
        .increment("visits", 1)
        .upsert(true)
        .safe(true);

    let id = value::id("4af9f23d8ead0e1d32000000").unwrap();
    assert_eq!(query.get_where(), doc! { "_id": id });
    assert_eq!(
        query.get_update(),
        doc! { "$set": { "name": "John" }, "$inc": { "visits": 1 } }
    );

    let options = query.get_options();
    assert_eq!(options.get_i32("w").unwrap(), 1);
    assert!(options.get_bool("upsert").unwrap());
    assert!(options.get_bool("multiple").unwrap());
}

#[test]
fn test_remove_options() {
    let mut query = Remove::new();
    query.where_not_exists("deleted_at").single(true).fsync(true);

    let options = query.get_options();
    assert!(options.get_bool("justOne").unwrap());
    assert!(options.get_bool("fsync").unwrap());
    assert_eq!(query.get_where(), doc! { "deleted_at": { "$exists": false } });
}

#[test]
fn test_aggregation_pipeline() {
    let mut aggregation = Aggregation::new();
    aggregation
        .filter_with(|filter| {
            filter.where_in("status", ["a", "b"]);
        })
        .unwind("items")
        .group_with(|group| {
            group.by("status").sum("count", 1).push("items", "items");
        })
        .limit(1)
        .skip(1);

    assert_eq!(
        aggregation.get_pipeline(),
        vec![
            doc! { "$match": { "status": { "$in": ["a", "b"] } } },
            doc! { "$unwind": "$items" },
            doc! { "$group": {
                "_id": "$status",
                "count": { "$sum": 1 },
                "items": { "$push": "$items" },
            } },
            doc! { "$limit": 1_i64 },
            doc! { "$skip": 1_i64 },
        ]
    );
}

#[test]
fn test_where_type_errors_are_argument_errors() {
    let mut query = Where::new();
    assert!(query.where_type("name", "bogus").unwrap_err().is_argument_error());
    query.where_type("name", "string").unwrap();
    assert_eq!(query.get_where(), doc! { "name": { "$type": 2 } });
}

#[test]
fn test_default_timeout_applies_to_builders() {
    assert_eq!(default_timeout(), Duration::from_secs(30));

    let query = Where::new();
    assert_eq!(query.get_options().get_i64("timeout").unwrap(), 30_000);

    set_default_timeout(Duration::from_millis(1_500));
    assert_eq!(query.get_options().get_i64("timeout").unwrap(), 1_500);

    let mut explicit = Where::new();
    explicit.timeout(Duration::from_millis(10));
    assert_eq!(explicit.get_options().get_i64("timeout").unwrap(), 10);
}

#[test]
fn test_embedded_single_child_groups_are_flattened() {
    let mut query = Where::new();
    query.and_where("x", 1).where_clause(doc! { "$or": [{ "a": 1 }] });
    assert_eq!(query.get_where(), doc! { "$and": [{ "x": 1 }, { "a": 1 }] });

    let mut query = Where::new();
    query.where_clause(doc! { "$and": [{ "a": 1 }] });
    assert_eq!(query.get_where(), doc! { "a": 1 });
}

#[test]
fn test_regex_values_survive_updates() {
    let pattern = value::regex("/^jo/i").unwrap();

    let mut update = Update::new();
    update.set("pattern", pattern.clone()).push("patterns", pattern.clone());

    assert_eq!(
        update.get_update(),
        doc! { "$set": { "pattern": pattern.clone() }, "$push": { "patterns": pattern } }
    );
}
