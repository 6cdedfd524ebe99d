use chrono::{DateTime, Utc};
use common::api::{
    DashboardStatsBody, EnqueueBody, ErrorBody, ExistingPostBody, HealthBody, PostBody,
    PostStatusBody, ProviderStatusBody, ProviderTestBody, TaskStatusBody, ThemeBody,
    ThemeStatusBody,
};
use common::status::{PostStatus, PostType};
use common::topic::Topic;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// Fields accepted by `PATCH /themes/{id}/`.
#[derive(Debug, Default, Serialize)]
pub struct ThemePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body of `POST /themes/{id}/generate_post/`.
#[derive(Debug, Serialize)]
pub struct GeneratePost {
    pub topic: String,
    pub post_type: PostType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_data: Option<Topic>,
}

impl GeneratePost {
    pub fn new(topic: impl Into<String>, post_type: PostType) -> Self {
        Self {
            topic: topic.into(),
            post_type,
            topic_data: None,
        }
    }
}

/// Fields accepted by `PATCH /posts/{id}/`. Double options distinguish
/// clearing a field (`Some(None)`) from leaving it alone (`None`).
#[derive(Debug, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotional_post: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// Filters accepted by `GET /posts/`.
#[derive(Debug, Default, Serialize)]
pub struct PostFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_type: Option<PostType>,
}

/// What a `generate_post` request actually did.
#[derive(Debug)]
pub enum GeneratePostOutcome {
    /// A generation task was queued (202).
    Enqueued(EnqueueBody),
    /// A post for this (theme, type, topic) already exists; nothing was
    /// queued (200).
    Existing(ExistingPostBody),
}

/// Typed wrapper over the REST API. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct PostPilotClient {
    http: reqwest::Client,
    base_url: String,
}

impl PostPilotClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`; the
    /// `/api` prefix is added here.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    // Themes

    pub async fn list_themes(&self, active: Option<bool>) -> Result<Vec<ThemeBody>> {
        let mut request = self.http.get(self.url("/themes/"));
        if let Some(active) = active {
            request = request.query(&[("active", active)]);
        }
        decode(request.send().await?).await
    }

    pub async fn create_theme(&self, title: &str) -> Result<ThemeBody> {
        self.request_json(Method::POST, "/themes/", &serde_json::json!({"title": title}))
            .await
    }

    pub async fn get_theme(&self, id: i32) -> Result<ThemeBody> {
        self.get(&format!("/themes/{id}/")).await
    }

    pub async fn update_theme(&self, id: i32, patch: &ThemePatch) -> Result<ThemeBody> {
        self.request_json(Method::PATCH, &format!("/themes/{id}/"), patch)
            .await
    }

    /// Soft delete; the theme's posts survive.
    pub async fn delete_theme(&self, id: i32) -> Result<()> {
        self.delete(&format!("/themes/{id}/")).await
    }

    pub async fn generate_topics(&self, id: i32) -> Result<EnqueueBody> {
        self.post_empty(&format!("/themes/{id}/generate_topics/")).await
    }

    pub async fn generate_post(&self, id: i32, req: &GeneratePost) -> Result<GeneratePostOutcome> {
        let response = self
            .http
            .post(self.url(&format!("/themes/{id}/generate_post/")))
            .json(req)
            .send()
            .await?;

        // 200 means the post already existed and nothing was queued.
        if response.status() == StatusCode::OK {
            let existing: ExistingPostBody = decode(response).await?;
            return Ok(GeneratePostOutcome::Existing(existing));
        }
        let enqueued: EnqueueBody = decode(response).await?;
        Ok(GeneratePostOutcome::Enqueued(enqueued))
    }

    pub async fn theme_posts(&self, id: i32) -> Result<Vec<PostBody>> {
        self.get(&format!("/themes/{id}/posts/")).await
    }

    pub async fn theme_status(&self, id: i32) -> Result<ThemeStatusBody> {
        self.get(&format!("/themes/{id}/status/")).await
    }

    // Posts

    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostBody>> {
        let request = self.http.get(self.url("/posts/")).query(filter);
        decode(request.send().await?).await
    }

    pub async fn get_post(&self, id: i32) -> Result<PostBody> {
        self.get(&format!("/posts/{id}/")).await
    }

    pub async fn update_post(&self, id: i32, patch: &PostPatch) -> Result<PostBody> {
        self.request_json(Method::PATCH, &format!("/posts/{id}/"), patch)
            .await
    }

    pub async fn delete_post(&self, id: i32) -> Result<()> {
        self.delete(&format!("/posts/{id}/")).await
    }

    pub async fn improve_post(&self, id: i32) -> Result<EnqueueBody> {
        self.post_empty(&format!("/posts/{id}/improve/")).await
    }

    /// Articles only; simple posts are rejected with a validation error.
    pub async fn regenerate_image_prompt(&self, id: i32) -> Result<EnqueueBody> {
        self.post_empty(&format!("/posts/{id}/regenerate_image_prompt/"))
            .await
    }

    pub async fn publish_post(&self, id: i32) -> Result<PostBody> {
        self.post_empty(&format!("/posts/{id}/publish/")).await
    }

    pub async fn post_status(&self, id: i32) -> Result<PostStatusBody> {
        self.get(&format!("/posts/{id}/status/")).await
    }

    // Tasks

    /// Status read; unknown ids come back with state NOT_FOUND rather
    /// than an error.
    pub async fn check_task(&self, task_id: &str) -> Result<TaskStatusBody> {
        let request = self
            .http
            .get(self.url("/tasks/check/"))
            .query(&[("task_id", task_id)]);
        decode(request.send().await?).await
    }

    pub async fn ping(&self, echo: Option<&str>) -> Result<EnqueueBody> {
        match echo {
            Some(echo) => {
                self.request_json(Method::POST, "/tasks/ping/", &serde_json::json!({"echo": echo}))
                    .await
            }
            None => self.post_empty("/tasks/ping/").await,
        }
    }

    // Providers

    pub async fn list_providers(&self) -> Result<Vec<ProviderStatusBody>> {
        self.get("/providers/").await
    }

    pub async fn test_provider(&self, name: &str) -> Result<ProviderTestBody> {
        self.post_empty(&format!("/providers/{name}/test/")).await
    }

    // Dashboard and health

    pub async fn dashboard_stats(&self) -> Result<DashboardStatsBody> {
        self.get("/dashboard/stats/").await
    }

    pub async fn health(&self) -> Result<HealthBody> {
        self.get("/health/").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.http.get(self.url(path)).send().await?).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.http.post(self.url(path)).send().await?).await
    }

    async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(api_error(response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(response.json::<T>().await?)
}

/// Map a non-2xx response to `ClientError::Api`, tolerating bodies that
/// are not the structured error shape.
async fn api_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    match response.json::<ErrorBody>().await {
        Ok(body) => ClientError::Api {
            status,
            code: body.code,
            message: body.message,
        },
        Err(_) => ClientError::Api {
            status,
            code: "INTERNAL_ERROR".into(),
            message: format!("unexpected response with status {status}"),
        },
    }
}
