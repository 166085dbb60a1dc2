//! Test doubles for the service seams plus a local HTTP server helper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::embeddings::{Embedder, EmbeddingError, EmbeddingVector};
use crate::identity::IdentityResolver;
use crate::jobs::models::{
    JobDetail, JobFilter, JobPage, JobRow, JobStats, JobStatus, JobTimelineRow, JobUpdate,
    NewJob, PageMeta, StatusCount, UserRow,
};
use crate::jobs::store::{status_change_note, JobStore};
use crate::llm_client::{ChatGateway, LlmError};
use crate::scrape::{JobScraper, ScrapeError, ScrapedRecord};
use crate::state::AppState;

pub const TEST_TOKEN: &str = "test-session-token";

pub const GAP_ANALYSIS_REPLY: &str = r#"{
  "match_percentage": 62,
  "strengths": ["Strong Go background", "Payments domain experience", "SQL performance tuning"],
  "gaps": ["No Kubernetes in production", "No gRPC services shipped"],
  "suggestion": "Ship a small gRPC service on a managed Kubernetes cluster before applying.",
  "verdict": "Apply, but treat it as a long shot until the infrastructure gap closes."
}"#;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub struct FakeGateway {
    reply: Option<String>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl FakeGateway {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Every call fails with a 503 from the provider.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(system, user)` of the most recent call.
    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((system.to_string(), user.to_string()));
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmError::Api {
                status: 503,
                body: "service unavailable".to_string(),
            }),
        }
    }
}

enum EmbedBehavior {
    Constant(EmbeddingVector),
    Failing,
    ByLength,
}

pub struct FakeEmbedder {
    behavior: EmbedBehavior,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn constant(vector: EmbeddingVector) -> Self {
        Self::with(EmbedBehavior::Constant(vector))
    }

    pub fn failing() -> Self {
        Self::with(EmbedBehavior::Failing)
    }

    /// A vector of ones, one entry per input char.
    pub fn by_length() -> Self {
        Self::with(EmbedBehavior::ByLength)
    }

    fn with(behavior: EmbedBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            EmbedBehavior::Constant(vector) => Ok(vector.clone()),
            EmbedBehavior::Failing => Err(EmbeddingError::Api {
                status: 503,
                body: "model is loading".to_string(),
            }),
            EmbedBehavior::ByLength => Ok(vec![1.0; text.chars().count()]),
        }
    }
}

pub struct FakeScraper {
    record: Option<ScrapedRecord>,
    error: Mutex<Option<ScrapeError>>,
    calls: AtomicUsize,
}

impl FakeScraper {
    pub fn returning(record: ScrapedRecord) -> Self {
        Self {
            record: Some(record),
            error: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails the first call with `error`; later calls fail with a 500 status.
    pub fn failing(error: ScrapeError) -> Self {
        Self {
            record: None,
            error: Mutex::new(Some(error)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobScraper for FakeScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedRecord, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(record) = &self.record {
            return Ok(record.clone());
        }
        Err(self.error.lock().unwrap().take().unwrap_or(ScrapeError::Status {
            status: 500,
            url: url.to_string(),
        }))
    }
}

#[derive(Default)]
struct MemoryData {
    user: Option<UserRow>,
    jobs: Vec<JobRow>,
    timelines: Vec<JobTimelineRow>,
    clock: i64,
}

impl MemoryData {
    /// Strictly increasing timestamps so "newest first" ordering is deterministic.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default() + Duration::seconds(self.clock)
    }

    fn push_timeline(&mut self, job_id: Uuid, stage: &str, note: &str) {
        let at = self.tick();
        self.timelines.push(JobTimelineRow {
            id: Uuid::new_v4(),
            job_id,
            stage: stage.to_string(),
            note: note.to_string(),
            happened_at: at,
            created_at: at,
        });
    }

    fn owned_job(&mut self, user_id: Uuid, job_id: Uuid) -> Option<&mut JobRow> {
        self.jobs
            .iter_mut()
            .find(|job| job.id == job_id && job.user_id == user_id)
    }
}

/// In-memory store holding a single authenticated user reachable through [`TEST_TOKEN`].
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn with_user(cv_text: Option<&str>) -> Arc<Self> {
        let store = Self::default();
        {
            let mut data = store.data.lock().unwrap();
            let now = data.tick();
            data.user = Some(UserRow {
                id: Uuid::new_v4(),
                external_id: "ext-tester".to_string(),
                email: "tester@example.com".to_string(),
                name: None,
                cv_text: cv_text.map(str::to_string),
                created_at: now,
                updated_at: now,
            });
        }
        Arc::new(store)
    }

    pub fn user_id(&self) -> Uuid {
        self.data.lock().unwrap().user.as_ref().map(|u| u.id).unwrap_or_default()
    }

    pub fn set_cv(&self, cv_text: &str) {
        if let Some(user) = self.data.lock().unwrap().user.as_mut() {
            user.cv_text = Some(cv_text.to_string());
        }
    }

    pub fn insert_job(&self, title: &str, company: &str, requirements: &str) -> JobRow {
        self.insert_job_for(self.user_id(), title, company, requirements)
    }

    /// A job owned by some other user.
    pub fn insert_foreign_job(&self, title: &str, company: &str) -> JobRow {
        self.insert_job_for(Uuid::new_v4(), title, company, "")
    }

    fn insert_job_for(&self, user_id: Uuid, title: &str, company: &str, requirements: &str) -> JobRow {
        let mut data = self.data.lock().unwrap();
        let now = data.tick();
        let job = JobRow {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            company: company.to_string(),
            url: String::new(),
            platform: String::new(),
            status: JobStatus::Applied.to_string(),
            description: String::new(),
            requirements: requirements.to_string(),
            salary_min: None,
            salary_max: None,
            match_score: None,
            notes: String::new(),
            applied_at: now,
            deadline: None,
            created_at: now,
            updated_at: now,
        };
        data.jobs.push(job.clone());
        data.push_timeline(job.id, "applied", "Application submitted");
        job
    }

    pub fn match_score(&self, job_id: Uuid) -> Option<f64> {
        let data = self.data.lock().unwrap();
        data.jobs
            .iter()
            .find(|job| job.id == job_id)
            .and_then(|job| job.match_score)
    }

    pub fn timeline_notes(&self, job_id: Uuid) -> Vec<String> {
        let data = self.data.lock().unwrap();
        data.timelines
            .iter()
            .filter(|t| t.job_id == job_id)
            .map(|t| t.note.clone())
            .collect()
    }
}

fn matches_filter(job: &JobRow, filter: &JobFilter) -> bool {
    if let Some(search) = filter.search_term() {
        let needle = search.to_lowercase();
        if !job.title.to_lowercase().contains(&needle)
            && !job.company.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if job.status != status.as_str() {
            return false;
        }
    }
    if let Some(platform) = filter.platform_tag() {
        if job.platform != platform {
            return false;
        }
    }
    true
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
        let data = self.data.lock().unwrap();
        Ok(data.user.clone().filter(|u| u.id == user_id))
    }

    async fn update_cv(&self, user_id: Uuid, cv_text: &str) -> Result<(), sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        if let Some(user) = data.user.as_mut().filter(|u| u.id == user_id) {
            user.cv_text = Some(cv_text.to_string());
        }
        Ok(())
    }

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        Ok(data.owned_job(user_id, job_id).cloned())
    }

    async fn get_job_detail(
        &self,
        user_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<JobDetail>, sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        let Some(job) = data.owned_job(user_id, job_id).cloned() else {
            return Ok(None);
        };
        let timelines = data
            .timelines
            .iter()
            .filter(|t| t.job_id == job_id)
            .cloned()
            .collect();
        Ok(Some(JobDetail { job, timelines }))
    }

    async fn list_jobs(&self, user_id: Uuid, filter: &JobFilter) -> Result<JobPage, sqlx::Error> {
        let data = self.data.lock().unwrap();
        let mut matching: Vec<JobRow> = data
            .jobs
            .iter()
            .filter(|job| job.user_id == user_id && matches_filter(job, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect();
        Ok(JobPage {
            data: page,
            meta: PageMeta::new(total, filter),
        })
    }

    async fn create_job(&self, user_id: Uuid, job: NewJob) -> Result<JobRow, sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        let now = data.tick();
        let row = JobRow {
            id: Uuid::new_v4(),
            user_id,
            title: job.title,
            company: job.company,
            url: job.url,
            platform: job.platform,
            status: JobStatus::Applied.to_string(),
            description: job.description,
            requirements: job.requirements,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            match_score: None,
            notes: job.notes,
            applied_at: now,
            deadline: job.deadline,
            created_at: now,
            updated_at: now,
        };
        data.jobs.push(row.clone());
        data.push_timeline(row.id, "applied", "Application submitted");
        Ok(row)
    }

    async fn update_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        update: JobUpdate,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        let now = data.tick();
        let Some(job) = data.owned_job(user_id, job_id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            job.title = title;
        }
        if let Some(company) = update.company {
            job.company = company;
        }
        if let Some(url) = update.url {
            job.url = url;
        }
        if let Some(platform) = update.platform {
            job.platform = platform;
        }
        if let Some(description) = update.description {
            job.description = description;
        }
        if let Some(requirements) = update.requirements {
            job.requirements = requirements;
        }
        job.salary_min = update.salary_min.or(job.salary_min);
        job.salary_max = update.salary_max.or(job.salary_max);
        if let Some(notes) = update.notes {
            job.notes = notes;
        }
        job.deadline = update.deadline.or(job.deadline);
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn update_status(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        status: JobStatus,
        note: Option<String>,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        let Some(job) = data.owned_job(user_id, job_id) else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut job.status, status.to_string());
        let row = job.clone();

        let note = note
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| status_change_note(&previous, status));
        data.push_timeline(job_id, status.as_str(), &note);
        Ok(Some(row))
    }

    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        if data.owned_job(user_id, job_id).is_none() {
            return Ok(false);
        }
        data.timelines.retain(|t| t.job_id != job_id);
        data.jobs.retain(|job| job.id != job_id);
        Ok(true)
    }

    async fn stats(&self, user_id: Uuid) -> Result<JobStats, sqlx::Error> {
        let data = self.data.lock().unwrap();
        let mut counts: Vec<StatusCount> = Vec::new();
        for job in data.jobs.iter().filter(|job| job.user_id == user_id) {
            match counts.iter_mut().find(|c| c.status == job.status) {
                Some(entry) => entry.count += 1,
                None => counts.push(StatusCount {
                    status: job.status.clone(),
                    count: 1,
                }),
            }
        }
        counts.sort_by(|a, b| a.status.cmp(&b.status));
        let total = counts.iter().map(|c| c.count).sum();
        Ok(JobStats {
            data: counts,
            total,
        })
    }

    async fn update_match_score(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        score: f64,
    ) -> Result<(), sqlx::Error> {
        let mut data = self.data.lock().unwrap();
        if let Some(job) = data.owned_job(user_id, job_id) {
            job.match_score = Some(score);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn resolve(&self, token: &str) -> Result<Option<UserRow>, sqlx::Error> {
        if token != TEST_TOKEN {
            return Ok(None);
        }
        Ok(self.data.lock().unwrap().user.clone())
    }
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    test_state_with(
        store,
        Arc::new(FakeGateway::replying(GAP_ANALYSIS_REPLY)),
        Arc::new(FakeEmbedder::constant(vec![1.0, 0.0])),
        Arc::new(FakeScraper::returning(ScrapedRecord::default())),
    )
}

pub fn test_state_with(
    store: Arc<MemoryStore>,
    llm: Arc<FakeGateway>,
    embedder: Arc<FakeEmbedder>,
    scraper: Arc<FakeScraper>,
) -> AppState {
    AppState {
        store: store.clone(),
        identity: store,
        llm,
        embedder,
        scraper,
    }
}
