use flowdiagram_core::{
    DefaultDiagramFilter, Diagram, EntityId, Gateway, GatewayRegistry, Server, WorkflowDeployment,
};
use serde_json::{json, Value};
use uuid::Uuid;

fn blueprint_spec() -> Value {
    json!({
        "name": "Example Workflow",
        "nodes": [
            {"id": "1", "type": "Start", "next": "2"},
            {"id": "2", "type": "Finish", "next": null}
        ]
    })
}

fn deployment(workflow_id: EntityId, server_id: Option<EntityId>) -> WorkflowDeployment {
    WorkflowDeployment {
        id: workflow_id,
        name: "Workflow Example".to_string(),
        version: 1,
        server_id,
        blueprint_spec: blueprint_spec(),
    }
}

fn stamp(registry: &GatewayRegistry, id: EntityId, updated_at: i64) {
    registry
        .connection()
        .execute(
            "UPDATE diagram SET updated_at = ?1 WHERE id = ?2;",
            rusqlite::params![updated_at, id.to_string()],
        )
        .unwrap();
}

#[test]
fn save_with_workflow_binds_blueprint_and_workflow() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let server = registry
        .server_service()
        .save_server(&Server::new("http://localhost:3000"))
        .unwrap();
    let service = registry.diagram_service();
    let workflow_id = Uuid::new_v4();

    let diagram = Diagram::new("Test", Some(Uuid::new_v4()), "<mxGraphModel/>");
    let saved = service
        .save_diagram_with_workflow(&diagram, &deployment(workflow_id, Some(server.id)))
        .unwrap();

    assert_eq!(saved.id, diagram.id);
    assert_eq!(saved.workflow_id, Some(workflow_id));
    let blueprint_id = saved.blueprint_id.unwrap();
    let blueprint = registry
        .blueprint_service()
        .get_blueprint_by_id(blueprint_id)
        .unwrap()
        .unwrap();
    assert_eq!(blueprint.blueprint_spec, blueprint_spec());

    let workflow = registry.workflows().get(workflow_id).unwrap().unwrap();
    assert_eq!(workflow.blueprint_id, blueprint_id);
    assert_eq!(workflow.server_id, Some(server.id));
}

#[test]
fn repeated_deployment_reuses_blueprint_and_workflow() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.diagram_service();
    let workflow_id = Uuid::new_v4();
    let user = Uuid::new_v4();

    let first = service
        .save_diagram_with_workflow(
            &Diagram::new("First", Some(user), "<xml/>"),
            &deployment(workflow_id, None),
        )
        .unwrap();
    let second = service
        .save_diagram_with_workflow(
            &Diagram::new("Second", Some(user), "<xml/>"),
            &deployment(workflow_id, None),
        )
        .unwrap();

    assert_eq!(first.blueprint_id, second.blueprint_id);
    let counts = registry.table_counts().unwrap();
    assert_eq!(counts.blueprints, 1);
    assert_eq!(counts.workflows, 1);
    assert_eq!(counts.diagrams, 2);
    assert_eq!(service.get_diagrams_by_workflow_id(workflow_id).unwrap().len(), 2);
}

#[test]
fn public_diagram_saved_without_owner() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.diagram_service();

    let mut diagram = Diagram::new("Test", None, "<xml/>");
    diagram.is_public = true;
    let saved = service
        .save_diagram_with_workflow(&diagram, &deployment(Uuid::new_v4(), None))
        .unwrap();

    assert!(saved.user_id.is_none());
    assert!(saved.workflow_id.is_some());
    assert_eq!(
        service.get_latest_public_diagram().unwrap().map(|d| d.id),
        Some(saved.id)
    );
}

#[test]
fn default_resolution_prefers_flagged_diagram() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.diagram_service();
    let user = Uuid::new_v4();
    let workflow_id = Uuid::new_v4();

    let mut flagged = Diagram::new("Default", Some(user), "<xml/>");
    flagged.user_default = true;
    let flagged = service
        .save_diagram_with_workflow(&flagged, &deployment(workflow_id, None))
        .unwrap();
    let newer = service
        .save_diagram_with_workflow(
            &Diagram::new("Newer", Some(user), "<xml/>"),
            &deployment(workflow_id, None),
        )
        .unwrap();
    stamp(&registry, flagged.id, 1_000);
    stamp(&registry, newer.id, 2_000);

    let filter = DefaultDiagramFilter {
        workflow_id: Some(workflow_id),
    };
    let resolved = service.get_default_diagram(user, &filter).unwrap().unwrap();
    assert_eq!(resolved.id, flagged.id);
    assert_eq!(resolved.workflow_id, Some(workflow_id));
}

#[test]
fn default_resolution_falls_back_to_latest_owned_then_public() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.diagram_service();
    let user = Uuid::new_v4();
    let workflow_id = Uuid::new_v4();
    let filter = DefaultDiagramFilter {
        workflow_id: Some(workflow_id),
    };

    assert!(service.get_default_diagram(user, &filter).unwrap().is_none());

    let mut public = Diagram::new("Public", None, "<xml/>");
    public.is_public = true;
    let public = service
        .save_diagram_with_workflow(&public, &deployment(workflow_id, None))
        .unwrap();
    stamp(&registry, public.id, 9_000);
    assert_eq!(
        service.get_default_diagram(user, &filter).unwrap().map(|d| d.id),
        Some(public.id)
    );

    let older = service
        .save_diagram_with_workflow(
            &Diagram::new("Older", Some(user), "<xml/>"),
            &deployment(workflow_id, None),
        )
        .unwrap();
    let latest = service
        .save_diagram_with_workflow(
            &Diagram::new("Latest", Some(user), "<xml/>"),
            &deployment(workflow_id, None),
        )
        .unwrap();
    stamp(&registry, older.id, 1_000);
    stamp(&registry, latest.id, 2_000);

    assert_eq!(
        service.get_default_diagram(user, &filter).unwrap().map(|d| d.id),
        Some(latest.id)
    );
}

#[test]
fn default_resolution_without_filter_uses_owned_then_public() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.diagram_service();
    let user = Uuid::new_v4();
    let unfiltered = DefaultDiagramFilter::default();

    let mut public = Diagram::new("Public", None, "<xml/>");
    public.is_public = true;
    let public = service.save_diagram(&public).unwrap();
    assert_eq!(
        service.get_default_diagram(user, &unfiltered).unwrap().map(|d| d.id),
        Some(public.id)
    );

    let owned = service
        .save_diagram(&Diagram::new("Mine", Some(user), "<xml/>"))
        .unwrap();
    assert_eq!(
        service.get_default_diagram(user, &unfiltered).unwrap().map(|d| d.id),
        Some(owned.id)
    );
}

#[test]
fn batch_reads_and_deletes_go_through_the_service() {
    let registry = GatewayRegistry::in_memory().unwrap();
    let service = registry.diagram_service();
    let user = Uuid::new_v4();

    let first = service.save_diagram(&Diagram::new("A", Some(user), "<a/>")).unwrap();
    let second = service.save_diagram(&Diagram::new("B", Some(user), "<b/>")).unwrap();

    assert_eq!(
        service
            .get_diagrams_batch(&[first.id, second.id, Uuid::new_v4()])
            .unwrap()
            .len(),
        2
    );
    assert_eq!(service.get_diagrams_by_user_id(user).unwrap().len(), 2);

    service.delete_diagram(first.id).unwrap();
    assert!(service.get_diagram_by_id(first.id).unwrap().is_none());

    service.delete_diagrams_batch(&[second.id]).unwrap();
    assert!(service.get_all_diagrams().unwrap().is_empty());
}
