//! Job store: persistence of users, jobs and their timelines.
//!
//! Every job query is scoped by `user_id`; a job owned by someone else reads as absent.
//! Timeline rows are written in the same transaction as the job change they record.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::jobs::models::{
    JobDetail, JobFilter, JobPage, JobRow, JobStats, JobStatus, JobTimelineRow, JobUpdate,
    NewJob, PageMeta, StatusCount, UserRow,
};

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error>;

    async fn update_cv(&self, user_id: Uuid, cv_text: &str) -> Result<(), sqlx::Error>;

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error>;

    async fn get_job_detail(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<JobDetail>, sqlx::Error>;

    async fn list_jobs(&self, user_id: Uuid, filter: &JobFilter) -> Result<JobPage, sqlx::Error>;

    async fn create_job(&self, user_id: Uuid, job: NewJob) -> Result<JobRow, sqlx::Error>;

    async fn update_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        update: JobUpdate,
    ) -> Result<Option<JobRow>, sqlx::Error>;

    async fn update_status(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        status: JobStatus,
        note: Option<String>,
    ) -> Result<Option<JobRow>, sqlx::Error>;

    /// Returns `false` when no job matched.
    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn stats(&self, user_id: Uuid) -> Result<JobStats, sqlx::Error>;

    async fn update_match_score(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        score: f64,
    ) -> Result<(), sqlx::Error>;
}

/// Default note for a status change without a caller-supplied note.
pub fn status_change_note(from: &str, to: JobStatus) -> String {
    format!("Status changed from {from} to {to}")
}

const UPDATE_MATCH_SCORE_SQL: &str =
    "UPDATE jobs SET match_score = $1, updated_at = now() WHERE id = $2 AND user_id = $3";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `WHERE` clause shared by the list and count queries.
fn push_job_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, filter: &JobFilter) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(search) = filter.search_term() {
        let pattern = format!("%{search}%");
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(platform) = filter.platform_tag() {
        qb.push(" AND platform = ").push_bind(platform.to_string());
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_cv(&self, user_id: Uuid, cv_text: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET cv_text = $1, updated_at = now() WHERE id = $2")
            .bind(cv_text)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND user_id = $2")
            .bind(job_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_job_detail(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<JobDetail>, sqlx::Error> {
        let Some(job) = self.get_job(user_id, job_id).await? else {
            return Ok(None);
        };

        let timelines = sqlx::query_as::<_, JobTimelineRow>(
            "SELECT * FROM job_timelines WHERE job_id = $1 ORDER BY happened_at, created_at",
        )
        .bind(job.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(JobDetail { job, timelines }))
    }

    async fn list_jobs(&self, user_id: Uuid, filter: &JobFilter) -> Result<JobPage, sqlx::Error> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        push_job_filters(&mut count, user_id, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM jobs");
        push_job_filters(&mut select, user_id, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit())
            .push(" OFFSET ")
            .push_bind(filter.offset());
        let data = select
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(JobPage {
            data,
            meta: PageMeta::new(total, filter),
        })
    }

    async fn create_job(&self, user_id: Uuid, job: NewJob) -> Result<JobRow, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (user_id, title, company, url, platform, status, description, requirements,
                 salary_min, salary_max, notes, deadline, applied_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.url)
        .bind(&job.platform)
        .bind(JobStatus::Applied.as_str())
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.notes)
        .bind(job.deadline)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO job_timelines (job_id, stage, note, happened_at) VALUES ($1, $2, $3, now())",
        )
        .bind(row.id)
        .bind(JobStatus::Applied.as_str())
        .bind("Application submitted")
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Created job {} for user {user_id}", row.id);
        Ok(row)
    }

    async fn update_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        update: JobUpdate,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET
                title = COALESCE($3, title),
                company = COALESCE($4, company),
                url = COALESCE($5, url),
                platform = COALESCE($6, platform),
                description = COALESCE($7, description),
                requirements = COALESCE($8, requirements),
                salary_min = COALESCE($9, salary_min),
                salary_max = COALESCE($10, salary_max),
                notes = COALESCE($11, notes),
                deadline = COALESCE($12, deadline),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .bind(update.title)
        .bind(update.company)
        .bind(update.url)
        .bind(update.platform)
        .bind(update.description)
        .bind(update.requirements)
        .bind(update.salary_min)
        .bind(update.salary_max)
        .bind(update.notes)
        .bind(update.deadline)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_status(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        status: JobStatus,
        note: Option<String>,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT status FROM jobs WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, JobRow>(
            "UPDATE jobs SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

        let note = note
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| status_change_note(&previous, status));
        sqlx::query(
            "INSERT INTO job_timelines (job_id, stage, note, happened_at) VALUES ($1, $2, $3, now())",
        )
        .bind(job_id)
        .bind(status.as_str())
        .bind(note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Job {job_id} moved from {previous} to {status}");
        Ok(Some(row))
    }

    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 AND user_id = $2")
                .bind(job_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM job_timelines WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn stats(&self, user_id: Uuid) -> Result<JobStats, sqlx::Error> {
        let data = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM jobs WHERE user_id = $1 GROUP BY status ORDER BY status",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let total = data.iter().map(|s| s.count).sum();
        Ok(JobStats { data, total })
    }

    async fn update_match_score(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        score: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(UPDATE_MATCH_SCORE_SQL)
            .bind(score)
            .bind(job_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
