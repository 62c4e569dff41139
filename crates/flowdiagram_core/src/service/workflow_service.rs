//! Workflow use-case service.

use crate::model::workflow::{Workflow, WorkflowPatch};
use crate::model::EntityId;
use crate::repo::gateway::RepoResult;
use crate::repo::workflow_repo::WorkflowRepository;
use log::debug;

pub struct WorkflowService<W: WorkflowRepository> {
    repo: W,
}

impl<W: WorkflowRepository> WorkflowService<W> {
    pub fn new(repo: W) -> Self {
        Self { repo }
    }

    /// Creates or updates the workflow by ID.
    pub fn save_workflow(&self, workflow: &Workflow) -> RepoResult<Workflow> {
        debug!(
            "event=workflow_save module=service status=start workflow_id={}",
            workflow.id
        );
        self.repo.save(workflow)
    }

    pub fn get_workflow_by_id(&self, id: EntityId) -> RepoResult<Option<Workflow>> {
        debug!("event=workflow_get module=service status=start workflow_id={id}");
        self.repo.get(id)
    }

    pub fn get_workflows_by_server(&self, server_id: EntityId) -> RepoResult<Vec<Workflow>> {
        debug!("event=workflow_list_by_server module=service status=start server_id={server_id}");
        self.repo.get_by_server(server_id)
    }

    pub fn update_workflow(&self, id: EntityId, patch: &WorkflowPatch) -> RepoResult<Workflow> {
        debug!("event=workflow_update module=service status=start workflow_id={id}");
        self.repo.update(id, patch)
    }

    pub fn delete_workflow(&self, id: EntityId) -> RepoResult<()> {
        debug!("event=workflow_delete module=service status=start workflow_id={id}");
        self.repo.delete(id)
    }

    pub fn delete_workflows_by_server(&self, server_id: EntityId) -> RepoResult<usize> {
        debug!(
            "event=workflow_delete_by_server module=service status=start server_id={server_id}"
        );
        self.repo.delete_by_server(server_id)
    }
}
