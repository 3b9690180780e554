use monga::prelude::*;

#[test]
fn test_prelude_builders() {
    let mut query = Find::new();
    query
        .and_where("name", "John")
        .where_like("email", "%@example.com")
        .unwrap()
        .order_by("name", "asc");

    let email = Regex::new("@example\\.com$", "imsux").unwrap();
    assert_eq!(
        query.get_where(),
        doc! { "name": "John", "email": email }
    );

    let mut update = Update::new();
    update.add_to_set("roles", "editor").set("name", "Jane");
    assert_eq!(
        update.get_update(),
        doc! { "$addToSet": { "roles": ["editor"] }, "$set": { "name": "Jane" } }
    );
}

#[test]
fn test_prelude_values() {
    let id = ObjectId::new();
    let mut query = Where::new();
    query.where_id(id).unwrap();
    assert_eq!(query.get_where(), doc! { "_id": id });

    let regex = monga::value::regex("/^a/i").unwrap();
    let mut update = Update::new();
    update.set("pattern", regex.clone());
    assert_eq!(update.get_update(), doc! { "$set": { "pattern": regex } });
    assert!(matches!(
        update.get_update().get_document("$set").unwrap().get("pattern"),
        Some(Bson::RegularExpression(_))
    ));
}
