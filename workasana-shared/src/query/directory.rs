/// Name and id lookups used by the task filter and the reports
///
/// [`Directory`] is implemented for [`PgPool`]; tests provide an in-memory
/// implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{project::Project, tag::Tag, team::Team, user::User, NamedRef};

#[async_trait]
pub trait Directory: Send + Sync {
    /// Id of the team named exactly `name`
    async fn team_id(&self, name: &str) -> Result<Option<Uuid>, sqlx::Error>;

    /// Id of the project named exactly `name`
    async fn project_id(&self, name: &str) -> Result<Option<Uuid>, sqlx::Error>;

    /// Ids of every user whose name is in `names`
    async fn user_ids(&self, names: &[String]) -> Result<Vec<Uuid>, sqlx::Error>;

    /// Ids of every tag whose name is in `names`
    async fn tag_ids(&self, names: &[String]) -> Result<Vec<Uuid>, sqlx::Error>;

    /// Names of the teams in `ids`; missing ids are absent from the map
    async fn team_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, sqlx::Error>;

    /// Names of the projects in `ids`; missing ids are absent from the map
    async fn project_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, sqlx::Error>;
}

fn into_name_map(refs: Vec<NamedRef>) -> HashMap<Uuid, String> {
    refs.into_iter().map(|r| (r.id, r.name)).collect()
}

#[async_trait]
impl Directory for PgPool {
    async fn team_id(&self, name: &str) -> Result<Option<Uuid>, sqlx::Error> {
        Team::id_by_name(self, name).await
    }

    async fn project_id(&self, name: &str) -> Result<Option<Uuid>, sqlx::Error> {
        Project::id_by_name(self, name).await
    }

    async fn user_ids(&self, names: &[String]) -> Result<Vec<Uuid>, sqlx::Error> {
        User::ids_by_names(self, names).await
    }

    async fn tag_ids(&self, names: &[String]) -> Result<Vec<Uuid>, sqlx::Error> {
        Tag::ids_by_names(self, names).await
    }

    async fn team_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, sqlx::Error> {
        Ok(into_name_map(Team::names_by_ids(self, ids).await?))
    }

    async fn project_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, sqlx::Error> {
        Ok(into_name_map(Project::names_by_ids(self, ids).await?))
    }
}
