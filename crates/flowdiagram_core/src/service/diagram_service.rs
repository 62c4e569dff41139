//! Diagram use-case service.
//!
//! # Responsibility
//! - Expose diagram save/fetch/delete entry points to callers.
//! - Compose blueprint dedup and workflow registration for diagrams that
//!   arrive together with their workflow deployment.
//! - Resolve the diagram a user should open by default.
//!
//! # Invariants
//! - Saves and updates that set `user_default` leave exactly one default
//!   in the (`user_id`, `blueprint_id`) scope.

use crate::model::blueprint::Blueprint;
use crate::model::diagram::{DefaultDiagramFilter, DefaultScope, Diagram, DiagramPatch};
use crate::model::workflow::Workflow;
use crate::model::{EntityId, UserId};
use crate::repo::blueprint_repo::BlueprintRepository;
use crate::repo::diagram_repo::DiagramRepository;
use crate::repo::gateway::RepoResult;
use crate::repo::workflow_repo::WorkflowRepository;
use log::debug;
use serde_json::Value;

/// Workflow shipped together with a diagram save.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDeployment {
    pub id: EntityId,
    pub name: String,
    pub version: i64,
    pub server_id: Option<EntityId>,
    pub blueprint_spec: Value,
}

/// Diagram service facade over diagram, blueprint and workflow gateways.
pub struct DiagramService<D, B, W>
where
    D: DiagramRepository,
    B: BlueprintRepository,
    W: WorkflowRepository,
{
    diagrams: D,
    blueprints: B,
    workflows: W,
}

impl<D, B, W> DiagramService<D, B, W>
where
    D: DiagramRepository,
    B: BlueprintRepository,
    W: WorkflowRepository,
{
    pub fn new(diagrams: D, blueprints: B, workflows: W) -> Self {
        Self {
            diagrams,
            blueprints,
            workflows,
        }
    }

    /// Creates or updates `diagram` by ID.
    ///
    /// When the saved row is flagged `user_default`, every sibling in its
    /// scope is cleared. A diagram saved without the flag leaves existing
    /// defaults untouched.
    pub fn save_diagram(&self, diagram: &Diagram) -> RepoResult<Diagram> {
        debug!(
            "event=diagram_save module=service status=start diagram_id={} user_default={}",
            diagram.id, diagram.user_default
        );
        self.diagrams.save_diagram(diagram)
    }

    /// Saves `diagram` bound to the blueprint of `deployment`.
    ///
    /// The blueprint spec goes through content dedup, the workflow is saved
    /// by ID against the resulting blueprint, and the diagram is saved last.
    /// Each step commits on its own.
    pub fn save_diagram_with_workflow(
        &self,
        diagram: &Diagram,
        deployment: &WorkflowDeployment,
    ) -> RepoResult<Diagram> {
        debug!(
            "event=diagram_save_with_workflow module=service status=start diagram_id={} workflow_id={}",
            diagram.id, deployment.id
        );
        let blueprint: Blueprint = self.blueprints.save_blueprint(&deployment.blueprint_spec)?;
        self.workflows.save(&Workflow::new(
            deployment.id,
            deployment.name.as_str(),
            deployment.version,
            blueprint.id,
            deployment.server_id,
        ))?;

        let mut bound = diagram.clone();
        bound.blueprint_id = Some(blueprint.id);
        self.diagrams.save_diagram(&bound)
    }

    pub fn get_all_diagrams(&self) -> RepoResult<Vec<Diagram>> {
        debug!("event=diagram_list module=service status=start");
        self.diagrams.get_all()
    }

    pub fn get_diagram_by_id(&self, id: EntityId) -> RepoResult<Option<Diagram>> {
        debug!("event=diagram_get module=service status=start diagram_id={id}");
        self.diagrams.get(id)
    }

    pub fn get_diagrams_batch(&self, ids: &[EntityId]) -> RepoResult<Vec<Diagram>> {
        debug!(
            "event=diagram_get_batch module=service status=start count={}",
            ids.len()
        );
        self.diagrams.get_batch(ids)
    }

    pub fn get_diagrams_by_user_id(&self, user_id: UserId) -> RepoResult<Vec<Diagram>> {
        debug!("event=diagram_list_by_user module=service status=start user_id={user_id}");
        self.diagrams.get_by_user_id(user_id)
    }

    pub fn get_diagrams_by_workflow_id(&self, workflow_id: EntityId) -> RepoResult<Vec<Diagram>> {
        debug!(
            "event=diagram_list_by_workflow module=service status=start workflow_id={workflow_id}"
        );
        self.diagrams.get_by_workflow_id(workflow_id)
    }

    pub fn get_latest_diagram_by_workflow_id(
        &self,
        workflow_id: EntityId,
    ) -> RepoResult<Option<Diagram>> {
        debug!(
            "event=diagram_latest_by_workflow module=service status=start workflow_id={workflow_id}"
        );
        self.diagrams.get_latest_by_workflow_id(workflow_id)
    }

    /// Diagrams of `workflow_id` visible to `user_id`: owned or public.
    pub fn get_diagrams_for_user_and_workflow(
        &self,
        user_id: UserId,
        workflow_id: EntityId,
    ) -> RepoResult<Vec<Diagram>> {
        debug!(
            "event=diagram_list_visible module=service status=start user_id={user_id} workflow_id={workflow_id}"
        );
        self.diagrams.get_by_user_and_workflow(user_id, workflow_id)
    }

    pub fn get_diagrams_by_blueprints_batch(
        &self,
        blueprint_ids: &[EntityId],
    ) -> RepoResult<Vec<Diagram>> {
        debug!(
            "event=diagram_list_by_blueprints module=service status=start count={}",
            blueprint_ids.len()
        );
        self.diagrams.get_by_blueprint_ids(blueprint_ids)
    }

    pub fn get_latest_public_diagram(&self) -> RepoResult<Option<Diagram>> {
        debug!("event=diagram_latest_public module=service status=start");
        self.diagrams.get_latest_public()
    }

    /// Resolves the diagram `user_id` should open.
    ///
    /// Falls back, in order, from the flagged default to the user's most
    /// recently updated own diagram, then to the most recently updated
    /// public diagram. With `filter.workflow_id` set, every step stays
    /// within that workflow.
    pub fn get_default_diagram(
        &self,
        user_id: UserId,
        filter: &DefaultDiagramFilter,
    ) -> RepoResult<Option<Diagram>> {
        debug!("event=diagram_default module=service status=start user_id={user_id}");
        if let Some(flagged) = self.diagrams.get_default_diagram(user_id, filter)? {
            return Ok(Some(flagged));
        }

        match filter.workflow_id {
            Some(workflow_id) => {
                let visible = self
                    .diagrams
                    .get_by_user_and_workflow(user_id, workflow_id)?;
                let owned = latest(visible.iter().filter(|d| d.user_id == Some(user_id)));
                Ok(owned
                    .or_else(|| latest(visible.iter().filter(|d| d.is_public)))
                    .cloned())
            }
            None => match self.diagrams.get_by_user_id(user_id)?.into_iter().next() {
                Some(owned) => Ok(Some(owned)),
                None => self.diagrams.get_latest_public(),
            },
        }
    }

    /// Partially updates `id`; a row left default clears its siblings.
    pub fn update_diagram(&self, id: EntityId, patch: &DiagramPatch) -> RepoResult<Diagram> {
        debug!("event=diagram_update module=service status=start diagram_id={id}");
        self.diagrams.update_diagram(id, patch)
    }

    /// Makes `id` the single default of its (`user_id`, `blueprint_id`) scope.
    pub fn set_as_default(&self, id: EntityId) -> RepoResult<Diagram> {
        debug!("event=diagram_set_default module=service status=start diagram_id={id}");
        self.diagrams.set_default(id)
    }

    /// Clears defaults in `scope`, sparing `scope.except_id`.
    pub fn unset_default(&self, scope: &DefaultScope) -> RepoResult<usize> {
        debug!("event=diagram_unset_default module=service status=start");
        self.diagrams.unset_default(scope)
    }

    pub fn delete_diagram(&self, id: EntityId) -> RepoResult<()> {
        debug!("event=diagram_delete module=service status=start diagram_id={id}");
        self.diagrams.delete(id)
    }

    pub fn delete_diagrams_batch(&self, ids: &[EntityId]) -> RepoResult<()> {
        debug!(
            "event=diagram_delete_batch module=service status=start count={}",
            ids.len()
        );
        self.diagrams.delete_batch(ids)
    }
}

fn latest<'a>(diagrams: impl Iterator<Item = &'a Diagram>) -> Option<&'a Diagram> {
    diagrams.max_by(|left, right| {
        left.updated_at
            .cmp(&right.updated_at)
            .then_with(|| right.id.cmp(&left.id))
    })
}
