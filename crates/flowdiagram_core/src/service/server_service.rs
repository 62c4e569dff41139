//! Server use-case service.

use crate::model::server::{Server, ServerPatch};
use crate::model::EntityId;
use crate::repo::gateway::RepoResult;
use crate::repo::server_repo::ServerRepository;
use log::debug;

pub struct ServerService<S: ServerRepository> {
    repo: S,
}

impl<S: ServerRepository> ServerService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Creates or updates the server by ID.
    pub fn save_server(&self, server: &Server) -> RepoResult<Server> {
        debug!(
            "event=server_save module=service status=start server_id={}",
            server.id
        );
        self.repo.save(server)
    }

    pub fn get_server_by_id(&self, id: EntityId) -> RepoResult<Option<Server>> {
        debug!("event=server_get module=service status=start server_id={id}");
        self.repo.get(id)
    }

    pub fn get_server_by_url(&self, url: &str) -> RepoResult<Option<Server>> {
        debug!("event=server_get_by_url module=service status=start");
        self.repo.get_by_url(url)
    }

    pub fn get_all_servers(&self) -> RepoResult<Vec<Server>> {
        debug!("event=server_list module=service status=start");
        self.repo.get_all()
    }

    pub fn update_server(&self, id: EntityId, patch: &ServerPatch) -> RepoResult<Server> {
        debug!("event=server_update module=service status=start server_id={id}");
        self.repo.update(id, patch)
    }

    /// Fails with a storage error while workflows still reference `id`.
    pub fn delete_server(&self, id: EntityId) -> RepoResult<()> {
        debug!("event=server_delete module=service status=start server_id={id}");
        self.repo.delete(id)
    }
}
