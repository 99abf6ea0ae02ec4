mod common;

use common::{engine, model};
use facetfilter::collection::{Collection, CollectionFilter, FindOptions, SortKey};
use facetfilter::Predicate;
use serde_json::{json, Value};

fn catalog() -> CollectionFilter<Collection> {
    CollectionFilter::new(Collection::from_values(vec![
        json!({ "_id": "a", "name": "Walnut desk", "qty": 2, "category": "office",
                "price": 420, "added": "2024-02-10T09:30:00Z" }),
        json!({ "_id": "b", "name": "Desk lamp", "qty": 14, "category": "lighting",
                "price": 35, "added": "2024-03-01T18:00:00Z" }),
        json!({ "_id": "c", "name": "Floor lamp", "qty": 5, "category": "lighting",
                "price": 120, "added": "2024-03-02T00:00:00Z" }),
        json!({ "_id": "d", "name": "Bookshelf", "qty": 0, "category": "storage",
                "price": 260, "added": "2023-12-24T12:00:00Z" }),
        json!("not a document"),
    ]))
}

fn shop_model() -> facetfilter::RawModel {
    model(json!([
        { "key": "name" },
        { "key": "qty", "type": "number" },
        { "key": "category", "type": "enum", "options": { "data": [
            { "value": "office" }, { "value": "lighting", "enabled": true }, { "value": "storage" }
        ] } },
        { "key": "price", "type": "range", "options": { "min": 0, "max": 500, "value": 150, "allowTypeChange": true } },
        { "key": "added", "type": "date", "options": {
            "start": "2024-03-01", "end": "2024-03-01", "type": "between", "allowTypeChange": true
        } }
    ]))
}

fn ids(found: &[&Value]) -> Vec<String> {
    found
        .iter()
        .filter_map(|doc| doc["_id"].as_str().map(String::from))
        .collect()
}

#[test]
fn test_no_filters_returns_every_document() {
    let (engine, _) = engine(shop_model());
    let catalog = catalog();
    assert_eq!(catalog.source().len(), 4);
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_panels_narrow_results() {
    let (mut engine, _) = engine(shop_model());
    let catalog = catalog();

    engine.set_field_enabled("category", true).unwrap();
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["b", "c"]);

    engine.set_field_enabled("price", true).unwrap();
    engine.set_range_value("price", 100).unwrap();
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["b"]);

    assert!(engine.set_field_sub_type("price", "min").unwrap());
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["c"]);
}

#[test]
fn test_date_window_is_day_aligned() {
    let (mut engine, _) = engine(shop_model());
    let catalog = catalog();
    engine.set_field_enabled("added", true).unwrap();

    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["b"]);

    engine
        .set_date_values("added", "2024-03-01", "2024-03-02")
        .unwrap();
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["b", "c"]);

    assert!(engine.set_field_sub_type("added", "before").unwrap());
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["a", "b", "d"]);
}

#[test]
fn test_free_text_matches_names_and_quantities() {
    let (mut engine, clock) = engine(shop_model());
    let catalog = catalog();

    engine.set_text_filter("LAMP");
    clock.advance_ms(250);
    engine.poll();
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["b", "c"]);

    engine.set_text_filter("5");
    engine.flush_text_filter();
    let found = catalog.find(&Predicate::All, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["c"]);
}

#[test]
fn test_selector_and_paging_combine_with_engine() {
    let (mut engine, _) = engine(shop_model());
    let catalog = catalog();
    engine.set_field_enabled("category", true).unwrap();
    engine.set_enum_option("category", "storage", true).unwrap();

    let in_stock = Predicate::gte("qty", 1);
    let found = catalog.find(&in_stock, &FindOptions::default(), &engine);
    assert_eq!(ids(&found), vec!["b", "c"]);
    assert_eq!(catalog.count(&Predicate::All, &engine), 3);

    let cheapest_first = FindOptions::default().sorted(SortKey::ascending("price"));
    let found = catalog.find(&Predicate::All, &cheapest_first, &engine);
    assert_eq!(ids(&found), vec!["b", "c", "d"]);

    let newest = FindOptions::default()
        .sorted(SortKey::descending("added"))
        .limit(1);
    let found = catalog.find(&Predicate::All, &newest, &engine);
    assert_eq!(ids(&found), vec!["c"]);

    let second_page = cheapest_first.skip(2).limit(2);
    let found = catalog.find(&Predicate::All, &second_page, &engine);
    assert_eq!(ids(&found), vec!["d"]);
}
