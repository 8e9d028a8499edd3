//! Repository for the `milestones` table.

use sqlx::PgPool;

use qualityhub_core::milestone::STATUS_PLANNED;
use qualityhub_core::types::{DbId, Timestamp};

use crate::models::milestone::{CreateMilestone, Milestone, UpdateMilestone};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, description, status, due_date, completed_at, \
                       deleted_at, created_at, updated_at";

pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Insert a milestone. `completed_at` is resolved by the caller from the status.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateMilestone,
        completed_at: Option<Timestamp>,
    ) -> Result<Milestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO milestones (project_id, name, description, status, due_date, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.as_deref().unwrap_or(STATUS_PLANNED))
            .bind(input.due_date)
            .bind(completed_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM milestones
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's milestones by due date, undated last.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Milestone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM milestones
             WHERE project_id = $1 AND deleted_at IS NULL
             ORDER BY due_date ASC NULLS LAST, created_at ASC"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a milestone. `completed_at` is always written as given.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateMilestone,
        completed_at: Option<Timestamp>,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                due_date = COALESCE($6, due_date),
                completed_at = $7
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.due_date)
            .bind(completed_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE milestones SET deleted_at = NOW()
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
