//! Blueprint use-case service.
//!
//! # Invariants
//! - `save_blueprint` never creates a second row for content already stored.
//! - `update_blueprint` rewrites in place and bypasses dedup.

use crate::model::blueprint::Blueprint;
use crate::model::EntityId;
use crate::repo::blueprint_repo::BlueprintRepository;
use crate::repo::gateway::RepoResult;
use log::debug;
use serde_json::Value;

pub struct BlueprintService<B: BlueprintRepository> {
    repo: B,
}

impl<B: BlueprintRepository> BlueprintService<B> {
    pub fn new(repo: B) -> Self {
        Self { repo }
    }

    /// Returns the stored blueprint for `spec`, creating it when new.
    pub fn save_blueprint(&self, spec: &Value) -> RepoResult<Blueprint> {
        debug!("event=blueprint_save module=service status=start");
        self.repo.save_blueprint(spec)
    }

    pub fn get_blueprint_by_id(&self, id: EntityId) -> RepoResult<Option<Blueprint>> {
        debug!("event=blueprint_get module=service status=start blueprint_id={id}");
        self.repo.get(id)
    }

    pub fn get_blueprints_batch(&self, ids: &[EntityId]) -> RepoResult<Vec<Blueprint>> {
        debug!(
            "event=blueprint_get_batch module=service status=start count={}",
            ids.len()
        );
        self.repo.get_batch(ids)
    }

    pub fn get_all_blueprints(&self) -> RepoResult<Vec<Blueprint>> {
        debug!("event=blueprint_list module=service status=start");
        self.repo.get_all()
    }

    pub fn update_blueprint(&self, id: EntityId, spec: &Value) -> RepoResult<Blueprint> {
        debug!("event=blueprint_update module=service status=start blueprint_id={id}");
        self.repo.update_blueprint_spec(id, spec)
    }

    /// Fails with a storage error while diagrams or workflows still reference `id`.
    pub fn delete_blueprint(&self, id: EntityId) -> RepoResult<()> {
        debug!("event=blueprint_delete module=service status=start blueprint_id={id}");
        self.repo.delete(id)
    }

    pub fn delete_blueprints_batch(&self, ids: &[EntityId]) -> RepoResult<()> {
        debug!(
            "event=blueprint_delete_batch module=service status=start count={}",
            ids.len()
        );
        self.repo.delete_batch(ids)
    }
}
