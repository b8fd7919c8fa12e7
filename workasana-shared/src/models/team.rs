/// Team model and database operations
///
/// A team's `members` list is ordered: the creator always comes first.
/// Only current members may update a team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dedup_ids,
    user::{User, UserList},
    NamedRef, UserRef,
};

const TEAM_COLUMNS: &str = "id, name, description, created_by, members, created_at, updated_at";

const DETAILS_SELECT: &str = r#"
    SELECT tm.id, tm.name, tm.description, tm.created_at, tm.updated_at,
           COALESCE((
               SELECT json_agg(json_build_object('id', u.id, 'name', u.name, 'email', u.email)
                               ORDER BY array_position(tm.members, u.id))
               FROM users u
               WHERE u.id = ANY(tm.members)
           ), '[]'::json) AS members
    FROM teams tm
"#;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// User who created the team; always the first member
    pub created_by: Uuid,

    /// Member user ids, creator first
    pub members: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,

    /// Full member list as produced by [`member_list`]
    pub members: Vec<Uuid>,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,

    /// Replacement members; the creator is put back in front if missing
    pub members: Option<Vec<Uuid>>,
}

/// A team with its members populated
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetails {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TeamDetailsRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    members: Json<Vec<UserRef>>,
}

impl From<TeamDetailsRow> for TeamDetails {
    fn from(row: TeamDetailsRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            members: row.members.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Member list for a new team: the creator followed by `others`, without duplicates
pub fn member_list(creator: Uuid, others: &[Uuid]) -> Vec<Uuid> {
    dedup_ids(std::iter::once(creator).chain(others.iter().copied()))
}

impl Team {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }

    /// Creates a team and records it in the creator's team list
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the name is taken.
    pub async fn create(pool: &PgPool, data: CreateTeam) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO teams (name, description, created_by, members) VALUES ($1, $2, $3, $4) RETURNING {}",
            TEAM_COLUMNS
        );
        let team = sqlx::query_as::<_, Team>(&sql)
            .bind(data.name.trim())
            .bind(data.description)
            .bind(data.created_by)
            .bind(&data.members)
            .fetch_one(&mut *tx)
            .await?;

        User::append_to_list(&mut *tx, data.created_by, UserList::Teams, team.id).await?;

        tx.commit().await?;

        tracing::info!(team_id = %team.id, members = team.members.len(), "Created team");

        Ok(team)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM teams WHERE id = $1", TEAM_COLUMNS);

        sqlx::query_as::<_, Team>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Id of the team with exactly this name
    pub async fn id_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM teams WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Id and name for each of `ids` that exists
    pub async fn names_by_ids<'e, E>(executor: E, ids: &[Uuid]) -> Result<Vec<NamedRef>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, NamedRef>("SELECT id, name FROM teams WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// Every team with members populated, oldest first
    pub async fn list_details(pool: &PgPool) -> Result<Vec<TeamDetails>, sqlx::Error> {
        let sql = format!("{} ORDER BY tm.created_at, tm.id", DETAILS_SELECT);

        let rows = sqlx::query_as::<_, TeamDetailsRow>(&sql).fetch_all(pool).await?;

        Ok(rows.into_iter().map(TeamDetails::from).collect())
    }

    pub async fn find_details(pool: &PgPool, id: Uuid) -> Result<Option<TeamDetails>, sqlx::Error> {
        let sql = format!("{} WHERE tm.id = $1", DETAILS_SELECT);

        let row = sqlx::query_as::<_, TeamDetailsRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TeamDetails::from))
    }

    /// Populated teams for `ids`, in the order given
    pub async fn find_details_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<TeamDetails>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} WHERE tm.id = ANY($1) ORDER BY array_position($1, tm.id)",
            DETAILS_SELECT
        );

        let rows = sqlx::query_as::<_, TeamDetailsRow>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TeamDetails::from).collect())
    }

    /// Applies a partial update, returning `None` if the team doesn't exist
    ///
    /// A replacement member list always keeps the creator as its first entry.
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateTeam) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE teams SET updated_at = NOW()");

        if let Some(name) = data.name {
            query.push(", name = ").push_bind(name.trim().to_string());
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(members) = data.members {
            query
                .push(", members = array_prepend(created_by, array_remove(")
                .push_bind(members)
                .push("::uuid[], created_by))");
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(TEAM_COLUMNS);

        query.build_query_as::<Team>().fetch_optional(pool).await
    }
}
