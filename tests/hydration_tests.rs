mod common;

use common::CatalogFixture;
use field_catalog::field::curation::link_foreign_key;
use field_catalog::field::hydration::{attach_targets, attach_values, hydrate};
use field_catalog::testing::StoreOp;
use field_catalog::{BaseType, HydratedField, MetadataStore, NewField};
use serde_json::json;

fn wrap(fields: Vec<field_catalog::Field>) -> Vec<HydratedField> {
    fields.into_iter().map(HydratedField::from).collect()
}

#[test]
fn test_attach_values_on_empty_input_issues_no_query() {
    let fixture = CatalogFixture::new("orders", None);
    let hydrated = attach_values(&fixture.store, Vec::new()).unwrap();
    assert!(hydrated.is_empty());
    assert_eq!(fixture.store.count(StoreOp::SelectFieldValues), 0);
}

#[test]
fn test_attach_values_uses_one_query_and_keeps_order() {
    let fixture = CatalogFixture::new("orders", None);
    let status = fixture.create_named("status", BaseType::CharField);
    let amount = fixture.create_named("amount", BaseType::DecimalField);
    let gender = fixture.create_named("gender", BaseType::CharField);

    let db_ops = fixture.store.inner();
    db_ops
        .insert_field_values(status.id, vec![json!("open"), json!("closed")], Vec::new())
        .unwrap();
    db_ops
        .insert_field_values(gender.id, vec![json!("f"), json!("m")], vec!["Female".into(), "Male".into()])
        .unwrap();

    let hydrated = attach_values(
        &fixture.store,
        wrap(vec![gender.clone(), amount.clone(), status.clone(), gender.clone()]),
    )
    .unwrap();

    assert_eq!(fixture.store.count(StoreOp::SelectFieldValues), 1);
    let ids: Vec<u64> = hydrated.iter().map(|h| h.field.id).collect();
    assert_eq!(ids, vec![gender.id, amount.id, status.id, gender.id]);

    assert_eq!(hydrated[0].values.len(), 1);
    assert_eq!(hydrated[0].values[0].human_readable_values, vec!["Female", "Male"]);
    assert!(hydrated[1].values.is_empty());
    assert_eq!(hydrated[2].values[0].values, vec![json!("open"), json!("closed")]);
    assert_eq!(hydrated[3].values, hydrated[0].values);
}

#[test]
fn test_attach_targets_resolves_fk_fields_in_one_query() {
    let fixture = CatalogFixture::new("orders", None);
    let customer_id = fixture.create_named("customer_id", BaseType::IntegerField);
    let product_id = fixture.create_named("product_id", BaseType::IntegerField);
    let target_a = fixture.create_named("id", BaseType::IntegerField);
    let target_b = fixture.create_named("sku", BaseType::CharField);
    let note = fixture.create_named("note", BaseType::TextField);

    let customer_id = link_foreign_key(&fixture.store, customer_id.id, target_a.id).unwrap();
    let product_id = link_foreign_key(&fixture.store, product_id.id, target_b.id).unwrap();
    fixture.store.reset();

    let hydrated = attach_targets(
        &fixture.store,
        wrap(vec![customer_id, note, product_id]),
    )
    .unwrap();

    assert_eq!(fixture.store.count(StoreOp::SelectFieldsByIds), 1);
    assert_eq!(fixture.store.count(StoreOp::SelectField), 0);
    assert_eq!(hydrated[0].target.as_ref().map(|t| t.id), Some(target_a.id));
    assert_eq!(hydrated[1].target, None);
    assert_eq!(hydrated[2].target.as_ref().map(|t| t.id), Some(target_b.id));
}

#[test]
fn test_attach_targets_without_fk_fields_issues_no_query() {
    let fixture = CatalogFixture::new("orders", None);
    let note = fixture.create_named("note", BaseType::TextField);

    // A stale target on a field that is no longer an fk is ignored.
    let stale = fixture
        .store
        .inner()
        .insert_field(NewField::new(fixture.table.id, "owner", BaseType::IntegerField).with_fk_target(note.id))
        .unwrap();
    let stale = fixture.store.inner().select_field(stale).unwrap().unwrap();

    let hydrated = attach_targets(&fixture.store, wrap(vec![note, stale])).unwrap();
    assert_eq!(fixture.store.count(StoreOp::SelectFieldsByIds), 0);
    assert!(hydrated.iter().all(|h| h.target.is_none()));
}

#[test]
fn test_missing_target_yields_none() {
    let fixture = CatalogFixture::new("orders", None);
    let fk = fixture.create_named("customer_id", BaseType::IntegerField);
    let target = fixture.create_named("uid", BaseType::IntegerField);
    let fk = link_foreign_key(&fixture.store, fk.id, target.id).unwrap();
    field_catalog::field::lifecycle::delete_field(&fixture.store, target.id).unwrap();

    let hydrated = hydrate(&fixture.store, vec![fk]).unwrap();
    assert_eq!(hydrated.len(), 1);
    assert_eq!(hydrated[0].target, None);
    assert!(hydrated[0].values.is_empty());
}
