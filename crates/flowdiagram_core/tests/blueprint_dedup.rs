use flowdiagram_core::{
    BlueprintRepository, Diagram, Gateway, GatewayRegistry, RepoError, Workflow,
};
use serde_json::{json, Value};
use uuid::Uuid;

fn sample_spec() -> Value {
    json!({
        "name": "Example Workflow",
        "description": "blueprint used by dedup tests",
        "nodes": [
            {"id": "1", "type": "Start", "next": "2"},
            {"id": "2", "type": "Finish", "next": null}
        ],
        "lanes": [{"id": "1", "name": "anyone", "rule": ["fn", ["&", "args"], true]}],
        "environment": {}
    })
}

fn blueprint_rows(registry: &GatewayRegistry) -> i64 {
    registry.blueprints().count().unwrap()
}

#[test]
fn saving_identical_spec_twice_returns_same_record() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let first = service.save_blueprint(&sample_spec()).unwrap();
    let second = service.save_blueprint(&sample_spec()).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first, second);
    assert_eq!(blueprint_rows(&registry), 1);
}

#[test]
fn key_order_does_not_defeat_dedup() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let first = service
        .save_blueprint(&json!({"name": "flow", "nodes": [{"id": "1", "type": "Start"}]}))
        .unwrap();
    let second = service
        .save_blueprint(&json!({"nodes": [{"type": "Start", "id": "1"}], "name": "flow"}))
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(blueprint_rows(&registry), 1);
}

#[test]
fn different_specs_create_distinct_rows() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let first = service.save_blueprint(&sample_spec()).unwrap();
    let mut changed = sample_spec();
    changed["name"] = json!("Another Workflow");
    let second = service.save_blueprint(&changed).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(blueprint_rows(&registry), 2);
}

#[test]
fn dedup_hit_does_not_touch_existing_row() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let first = service.save_blueprint(&sample_spec()).unwrap();
    registry
        .connection()
        .execute(
            "UPDATE blueprint SET updated_at = 42 WHERE id = ?1;",
            [first.id.to_string()],
        )
        .unwrap();

    let again = service.save_blueprint(&sample_spec()).unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.updated_at, 42);
}

#[test]
fn saved_spec_round_trips_as_json_value() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let saved = service.save_blueprint(&sample_spec()).unwrap();
    let loaded = service.get_blueprint_by_id(saved.id).unwrap().unwrap();

    assert_eq!(loaded.blueprint_spec, sample_spec());
}

#[test]
fn update_blueprint_bypasses_dedup() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let original = service.save_blueprint(&sample_spec()).unwrap();
    let other = service.save_blueprint(&json!({"name": "other"})).unwrap();
    registry
        .connection()
        .execute(
            "UPDATE blueprint SET created_at = 1 WHERE id = ?1;",
            [original.id.to_string()],
        )
        .unwrap();

    let rewritten = service.update_blueprint(other.id, &sample_spec()).unwrap();
    assert_eq!(rewritten.id, other.id);
    assert_eq!(rewritten.blueprint_spec, sample_spec());
    assert_eq!(blueprint_rows(&registry), 2);

    // The oldest row with matching content stays the dedup target.
    let resolved = service.save_blueprint(&sample_spec()).unwrap();
    assert_eq!(resolved.id, original.id);
}

#[test]
fn update_missing_blueprint_returns_not_found() {
    let registry = GatewayRegistry::in_memory().unwrap();

    let id = Uuid::new_v4();
    let err = registry
        .blueprint_service()
        .update_blueprint(id, &sample_spec())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn find_by_spec_returns_none_for_unknown_content() {
    let registry = GatewayRegistry::in_memory().unwrap();

    assert!(registry
        .blueprints()
        .find_by_spec(&sample_spec())
        .unwrap()
        .is_none());
}

#[test]
fn referenced_blueprint_cannot_be_deleted_until_dependents_are_gone() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let blueprint = service.save_blueprint(&sample_spec()).unwrap();
    let workflow = Workflow::new(Uuid::new_v4(), "Workflow Example", 1, blueprint.id, None);
    registry.workflows().create(&workflow).unwrap();
    let mut diagram = Diagram::new("Test", Some(Uuid::new_v4()), "<xml/>");
    diagram.blueprint_id = Some(blueprint.id);
    registry.diagrams().create(&diagram).unwrap();

    let err = service.delete_blueprint(blueprint.id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    registry.workflows().delete(workflow.id).unwrap();
    registry.diagrams().delete(diagram.id).unwrap();
    service.delete_blueprint(blueprint.id).unwrap();
    assert!(service.get_blueprint_by_id(blueprint.id).unwrap().is_none());
}

#[test]
fn delete_blueprints_batch_empties_table() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.blueprint_service();

    let first = service.save_blueprint(&sample_spec()).unwrap();
    let second = service.save_blueprint(&json!({"name": "second"})).unwrap();

    service
        .delete_blueprints_batch(&[first.id, second.id, Uuid::new_v4()])
        .unwrap();
    assert!(service.get_all_blueprints().unwrap().is_empty());
}
