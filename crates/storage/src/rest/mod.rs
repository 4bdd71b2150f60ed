//! Hosted backend reached through its auto-generated REST interface.
//!
//! Filters use the `column=op.value` query dialect (`eq.`, `in.(..)`), and
//! every request carries the project API key plus the signed-in user's bearer
//! token when there is one.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use lessons_core::model::{
    Lesson, LessonId, Profile, Role, UserId, Video, VideoId, WatchProgress,
};
use reqwest::header::{CONTENT_RANGE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::repository::{
    LessonOrder, LessonRepository, ProfileRepository, Storage, StorageError, VideoRepository,
    WatchProgressRepository,
};

mod rows;

use rows::{
    LessonPatch, LessonRow, OrderIndexRow, ProfileRow, ProgressRow, ProgressUpsert, VideoRow,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RestInitError {
    #[error("backend url is required")]
    MissingUrl,

    #[error("backend api key is required")]
    MissingApiKey,

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

/// Where the hosted project lives and the public key it hands to clients.
#[derive(Clone)]
pub struct RestConfig {
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RestConfig {
    /// # Errors
    ///
    /// Returns `RestInitError` for a blank or non-http(s) url or a blank key.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, RestInitError> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(RestInitError::MissingUrl);
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(RestInitError::MissingApiKey);
        }
        let parsed = Url::parse(base_url).map_err(|e| RestInitError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RestInitError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: parsed,
            api_key: api_key.to_owned(),
        })
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `{base}/{path}` with exactly one slash in between.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Shared slot for the signed-in user's access token.
///
/// The identity provider fills it on sign-in and clears it on sign-out; the
/// repository reads it for every request.
#[derive(Clone, Default)]
pub struct BearerToken(Arc<RwLock<Option<String>>>);

impl BearerToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn set(&self, token: Option<String>) -> Result<(), StorageError> {
        let mut guard = self
            .0
            .write()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = token;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn get(&self) -> Result<Option<String>, StorageError> {
        self.0
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

#[derive(Clone)]
pub struct RestRepository {
    client: Client,
    config: RestConfig,
    token: BearerToken,
}

impl RestRepository {
    #[must_use]
    pub fn new(config: RestConfig, token: BearerToken) -> Self {
        Self {
            client: Client::new(),
            config,
            token,
        }
    }

    fn request(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<RequestBuilder, StorageError> {
        let bearer = self
            .token
            .get()?
            .unwrap_or_else(|| self.config.api_key.clone());
        Ok(self
            .client
            .request(method, self.config.endpoint(&format!("rest/v1/{table}")))
            .query(query)
            .header("apikey", &self.config.api_key)
            .bearer_auth(bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StorageError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(status_error(status, message))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Vec<T>, StorageError> {
        self.send(builder)
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn count(&self, table: &str, query: &[(&str, String)]) -> Result<u32, StorageError> {
        let builder = self
            .request(Method::HEAD, table, query)?
            .header("Prefer", "count=exact");
        let response = self.send(builder).await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value: &HeaderValue| value.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| StorageError::Serialization("missing exact count".into()))
    }

    async fn insert<T: serde::Serialize + Sync>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), StorageError> {
        let builder = self
            .request(Method::POST, table, &[])?
            .header("Prefer", "return=minimal")
            .json(row);
        self.send(builder).await?;
        Ok(())
    }

    /// Deletes by id and reports `NotFound` when no row came back.
    async fn delete_by_id(&self, table: &str, id: String) -> Result<(), StorageError> {
        let builder = self
            .request(Method::DELETE, table, &[("id", eq(id)), select("id")])?
            .header("Prefer", "return=representation");
        let deleted: Vec<serde_json::Value> = self.fetch(builder).await?;
        if deleted.is_empty() {
            return Err(StorageError::NotFound);
        }
        debug!(table, rows = deleted.len(), "deleted");
        Ok(())
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn select(columns: &str) -> (&'static str, String) {
    ("select", columns.to_owned())
}

fn order_param(order: LessonOrder) -> (&'static str, String) {
    let value = match order {
        LessonOrder::Newest => "created_at.desc",
        LessonOrder::Curriculum => "order_index.asc,created_at.desc",
    };
    ("order", value.to_owned())
}

fn in_list<T: std::fmt::Display>(values: &[T]) -> String {
    let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("in.({})", joined.join(","))
}

fn status_error(status: StatusCode, message: String) -> StorageError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized,
        StatusCode::NOT_FOUND => StorageError::NotFound,
        StatusCode::CONFLICT => StorageError::Conflict,
        other => StorageError::Rejected {
            status: other.as_u16(),
            message,
        },
    }
}

/// Total from a `Content-Range` header such as `0-4/5` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u32> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[async_trait]
impl ProfileRepository for RestRepository {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.insert("profiles", &ProfileRow::from(profile)).await
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StorageError> {
        let builder = self.request(Method::GET, "profiles", &[select("*"), ("id", eq(id))])?;
        let rows: Vec<ProfileRow> = self.fetch(builder).await?;
        Ok(rows.into_iter().next().map(Profile::from))
    }

    async fn count_profiles_by_role(&self, role: Role) -> Result<u32, StorageError> {
        self.count("profiles", &[select("id"), ("role", eq(role))])
            .await
    }
}

#[async_trait]
impl LessonRepository for RestRepository {
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        self.insert("lessons", &LessonRow::from(lesson)).await
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let builder = self
            .request(
                Method::PATCH,
                "lessons",
                &[("id", eq(lesson.id())), select("id")],
            )?
            .header("Prefer", "return=representation")
            .json(&LessonPatch::from(lesson));
        let updated: Vec<serde_json::Value> = self.fetch(builder).await?;
        if updated.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let builder = self.request(Method::GET, "lessons", &[select("*"), ("id", eq(id))])?;
        let rows: Vec<LessonRow> = self.fetch(builder).await?;
        rows.into_iter().next().map(Lesson::try_from).transpose()
    }

    async fn list_published_lessons(
        &self,
        order: LessonOrder,
        limit: Option<u32>,
    ) -> Result<Vec<Lesson>, StorageError> {
        let mut query = vec![
            select("*"),
            ("is_published", eq(true)),
            order_param(order),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let builder = self.request(Method::GET, "lessons", &query)?;
        let rows: Vec<LessonRow> = self.fetch(builder).await?;
        rows.into_iter().map(Lesson::try_from).collect()
    }

    async fn list_lessons_by_teacher(
        &self,
        teacher_id: UserId,
    ) -> Result<Vec<Lesson>, StorageError> {
        let builder = self.request(
            Method::GET,
            "lessons",
            &[
                select("*"),
                ("teacher_id", eq(teacher_id)),
                order_param(LessonOrder::Newest),
            ],
        )?;
        let rows: Vec<LessonRow> = self.fetch(builder).await?;
        rows.into_iter().map(Lesson::try_from).collect()
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        self.delete_by_id("lessons", id.to_string()).await
    }
}

#[async_trait]
impl VideoRepository for RestRepository {
    async fn insert_video(&self, video: &Video) -> Result<(), StorageError> {
        self.insert("videos", &VideoRow::from(video)).await
    }

    async fn get_video(&self, id: VideoId) -> Result<Option<Video>, StorageError> {
        let builder = self.request(Method::GET, "videos", &[select("*"), ("id", eq(id))])?;
        let rows: Vec<VideoRow> = self.fetch(builder).await?;
        rows.into_iter().next().map(Video::try_from).transpose()
    }

    async fn list_videos_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Vec<Video>, StorageError> {
        let builder = self.request(
            Method::GET,
            "videos",
            &[
                select("*"),
                ("lesson_id", eq(lesson_id)),
                ("order", "order_index.asc".to_owned()),
            ],
        )?;
        let rows: Vec<VideoRow> = self.fetch(builder).await?;
        rows.into_iter().map(Video::try_from).collect()
    }

    async fn count_videos_for_lesson(&self, lesson_id: LessonId) -> Result<u32, StorageError> {
        self.count("videos", &[select("id"), ("lesson_id", eq(lesson_id))])
            .await
    }

    async fn next_video_order_index(&self, lesson_id: LessonId) -> Result<i32, StorageError> {
        let builder = self.request(
            Method::GET,
            "videos",
            &[
                select("order_index"),
                ("lesson_id", eq(lesson_id)),
                ("order", "order_index.desc".to_owned()),
                ("limit", "1".to_owned()),
            ],
        )?;
        let rows: Vec<OrderIndexRow> = self.fetch(builder).await?;
        Ok(rows.first().map_or(0, |r| r.order_index + 1))
    }

    async fn delete_video(&self, id: VideoId) -> Result<(), StorageError> {
        self.delete_by_id("videos", id.to_string()).await
    }
}

#[async_trait]
impl WatchProgressRepository for RestRepository {
    async fn upsert_progress(
        &self,
        progress: &WatchProgress,
    ) -> Result<WatchProgress, StorageError> {
        let builder = self
            .request(
                Method::POST,
                "watch_progress",
                &[("on_conflict", "user_id,video_id".to_owned())],
            )?
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&ProgressUpsert::from(progress));
        let rows: Vec<ProgressRow> = self.fetch(builder).await?;
        rows.into_iter()
            .next()
            .map(WatchProgress::from)
            .ok_or_else(|| StorageError::Serialization("upsert returned no row".into()))
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, StorageError> {
        let builder = self.request(
            Method::GET,
            "watch_progress",
            &[
                select("*"),
                ("user_id", eq(user_id)),
                ("video_id", eq(video_id)),
            ],
        )?;
        let rows: Vec<ProgressRow> = self.fetch(builder).await?;
        Ok(rows.into_iter().next().map(WatchProgress::from))
    }

    async fn list_progress_for_videos(
        &self,
        user_id: UserId,
        video_ids: &[VideoId],
    ) -> Result<Vec<WatchProgress>, StorageError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }
        let builder = self.request(
            Method::GET,
            "watch_progress",
            &[
                select("*"),
                ("user_id", eq(user_id)),
                ("video_id", in_list(video_ids)),
            ],
        )?;
        let rows: Vec<ProgressRow> = self.fetch(builder).await?;
        Ok(rows.into_iter().map(WatchProgress::from).collect())
    }
}

impl Storage {
    /// Build a `Storage` backed by the hosted REST interface.
    #[must_use]
    pub fn rest(config: RestConfig, token: BearerToken) -> Self {
        Self::from_backend(RestRepository::new(config, token))
    }
}
