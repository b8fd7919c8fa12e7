/// API route handlers
///
/// Handlers are grouped by resource:
///
/// - `health`: Health check endpoint
/// - `users`: signup, login, token refresh, user listing and profile
/// - `tasks`: task CRUD and name-based task queries
/// - `projects`: project CRUD with cascading delete
/// - `teams`: team creation, listing and updates
/// - `tags`: tag creation and listing
/// - `reports`: pending work, last-week completions, closed-task grouping

pub mod health;
pub mod projects;
pub mod reports;
pub mod tags;
pub mod tasks;
pub mod teams;
pub mod users;

use sqlx::PgPool;
use uuid::Uuid;
use validator::ValidationError;
use workasana_shared::models::{tag::Tag, user::User};

use crate::error::{ApiError, ApiResult};

/// Rejects names that are empty or only whitespace
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Fails with 404 unless every id in `ids` belongs to an existing user
///
/// `ids` must be free of duplicates.
pub(crate) async fn ensure_users_exist(db: &PgPool, ids: &[Uuid]) -> ApiResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let found = User::count_existing(db, ids).await?;
    if found != ids.len() as i64 {
        return Err(ApiError::NotFound(
            "One or more users do not exist".to_string(),
        ));
    }

    Ok(())
}

/// Fails with 404 unless every id in `ids` belongs to an existing tag
///
/// `ids` must be free of duplicates.
pub(crate) async fn ensure_tags_exist(db: &PgPool, ids: &[Uuid]) -> ApiResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let found = Tag::count_existing(db, ids).await?;
    if found != ids.len() as i64 {
        return Err(ApiError::NotFound(
            "One or more tags do not exist".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Platform").is_ok());
        assert!(not_blank("  Platform ").is_ok());

        for value in ["", "   ", "\t\n"] {
            let err = not_blank(value).unwrap_err();
            assert_eq!(err.code, "blank");
        }
    }
}
