mod common;

use common::CatalogFixture;
use field_catalog::field::curation::{apply_edit, link_foreign_key};
use field_catalog::testing::StoreOp;
use field_catalog::{BaseType, CatalogError, FieldEdit, FieldUpdate, MetadataStore, SpecialType, VisibilityType};

#[test]
fn test_edit_writes_only_changed_attributes() {
    let fixture = CatalogFixture::new("people", None);
    let name = fixture.create_named("name", BaseType::CharField);

    let edited = apply_edit(
        &fixture.store,
        name.id,
        &FieldEdit {
            display_name: Some("Full Name".to_string()),
            special_type: Some(Some(SpecialType::Name)),
            visibility_type: Some(VisibilityType::DetailsOnly),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(edited.display_name, "Full Name");
    assert_eq!(edited.visibility_type, VisibilityType::DetailsOnly);
    assert_eq!(
        fixture.store.updates(),
        vec![(
            name.id,
            FieldUpdate {
                display_name: Some("Full Name".to_string()),
                visibility_type: Some(VisibilityType::DetailsOnly),
                ..Default::default()
            }
        )]
    );
}

#[test]
fn test_edit_without_changes_issues_no_write() {
    let fixture = CatalogFixture::new("people", None);
    let name = fixture.create_named("name", BaseType::CharField);

    let unchanged = apply_edit(
        &fixture.store,
        name.id,
        &FieldEdit {
            display_name: Some(name.display_name.clone()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(unchanged, name);
    assert_eq!(fixture.store.count(StoreOp::UpdateField), 0);
}

#[test]
fn test_edit_rejections() {
    let fixture = CatalogFixture::new("people", None);
    let name = fixture.create_named("name", BaseType::CharField);
    let other = fixture.create_named("city", BaseType::CharField);

    let retire = FieldEdit {
        visibility_type: Some(VisibilityType::Retired),
        ..Default::default()
    };
    assert!(apply_edit(&fixture.store, name.id, &retire).unwrap_err().is_validation());

    let bad_type = FieldEdit {
        special_type: Some(Some(SpecialType::TimestampMilliseconds)),
        ..Default::default()
    };
    assert!(apply_edit(&fixture.store, name.id, &bad_type).unwrap_err().is_validation());

    let target_without_fk = FieldEdit {
        fk_target_field_id: Some(Some(other.id)),
        ..Default::default()
    };
    assert!(apply_edit(&fixture.store, name.id, &target_without_fk)
        .unwrap_err()
        .is_validation());

    let self_target = FieldEdit {
        special_type: Some(Some(SpecialType::Fk)),
        fk_target_field_id: Some(Some(name.id)),
        ..Default::default()
    };
    assert!(apply_edit(&fixture.store, name.id, &self_target).unwrap_err().is_validation());

    let missing_target = FieldEdit {
        special_type: Some(Some(SpecialType::Fk)),
        fk_target_field_id: Some(Some(other.id + 1_000)),
        ..Default::default()
    };
    assert!(matches!(
        apply_edit(&fixture.store, name.id, &missing_target),
        Err(CatalogError::NotFound(_))
    ));

    let empty_name = FieldEdit {
        display_name: Some(String::new()),
        ..Default::default()
    };
    assert!(apply_edit(&fixture.store, name.id, &empty_name).unwrap_err().is_validation());

    assert!(matches!(
        apply_edit(&fixture.store, other.id + 1_000, &FieldEdit::default()),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(fixture.store.count(StoreOp::UpdateField), 0);
}

#[test]
fn test_edit_can_set_fk_with_target() {
    let fixture = CatalogFixture::new("orders", None);
    let owner = fixture.create_named("owner", BaseType::IntegerField);
    let target = fixture.create_named("id", BaseType::IntegerField);

    let edited = apply_edit(
        &fixture.store,
        owner.id,
        &FieldEdit {
            special_type: Some(Some(SpecialType::Fk)),
            fk_target_field_id: Some(Some(target.id)),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(edited.fk_target(), Some(target.id));
    let stored = fixture.store.select_field(owner.id).unwrap().unwrap();
    assert_eq!(stored.fk_target(), Some(target.id));
}

#[test]
fn test_link_foreign_key() {
    let fixture = CatalogFixture::new("orders", None);
    let customer_id = fixture.create_named("customer_id", BaseType::IntegerField);
    let target = fixture.create_named("id", BaseType::IntegerField);

    assert!(link_foreign_key(&fixture.store, customer_id.id, customer_id.id)
        .unwrap_err()
        .is_validation());
    assert!(matches!(
        link_foreign_key(&fixture.store, customer_id.id, target.id + 1_000),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(fixture.store.count(StoreOp::UpdateField), 0);

    let linked = link_foreign_key(&fixture.store, customer_id.id, target.id).unwrap();
    assert_eq!(linked.special_type, Some(SpecialType::Fk));
    assert_eq!(linked.fk_target(), Some(target.id));
    assert_eq!(fixture.store.count(StoreOp::UpdateField), 1);

    let again = link_foreign_key(&fixture.store, customer_id.id, target.id).unwrap();
    assert_eq!(again.fk_target(), Some(target.id));
    assert_eq!(fixture.store.count(StoreOp::UpdateField), 1);
}

#[test]
fn test_mutual_foreign_keys_are_allowed() {
    let fixture = CatalogFixture::new("pairs", None);
    let left = fixture.create_named("left_ref", BaseType::IntegerField);
    let right = fixture.create_named("right_ref", BaseType::IntegerField);

    link_foreign_key(&fixture.store, left.id, right.id).unwrap();
    link_foreign_key(&fixture.store, right.id, left.id).unwrap();

    let left = fixture.store.select_field(left.id).unwrap().unwrap();
    assert_eq!(left.fk_target(), Some(right.id));
}
