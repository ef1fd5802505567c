//! Gateway client: the one place outbound HTTP happens.

pub mod params;
pub mod types;

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{multipart, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::session::Session;

use params::{AuthorsQuery, GrowthInterval, PostsQuery, QueryPairs, TrendsQuery};
use types::*;

/// Configured HTTP client with bearer injection and one method per backend
/// operation.
///
/// Clones share the connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self, ClientError> {
        Self::with_timeout(&config.base_url, config.timeout(), session)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration, session: Session) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid base URL '{}': {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid path '{}': {}", path, e)))
    }

    /// Pre-send hook: every request is built here so the current token is
    /// attached when one exists.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.session.get() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::InvalidRequest("token is not a valid header value".into()))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    /// Send once, map non-2xx to `ClientError::Server`, decode the body
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ClientError::from_response(status.as_u16(), &body);
            tracing::debug!("Request failed: {}", err);
            return Err(err);
        }

        serde_json::from_str(&body).map_err(ClientError::from)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &QueryPairs) -> Result<T, ClientError> {
        let builder = self.request(Method::GET, path)?.query(query);
        self.send(builder).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send(builder).await
    }

    // Authentication

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.post("/api/login", &LoginRequest { username, password }).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        roles: &str,
    ) -> Result<MessageResponse, ClientError> {
        let body = RegisterRequest {
            username,
            email,
            password,
            roles,
        };
        self.post("/api/register", &body).await
    }

    // Hashtags

    pub async fn active_hashtags(&self) -> Result<Vec<Hashtag>, ClientError> {
        self.get("/api/hashtags", &QueryPairs::new()).await
    }

    pub async fn add_hashtag(&self, title: &str) -> Result<MessageResponse, ClientError> {
        let title = title.trim().trim_start_matches('#');
        if title.is_empty() {
            return Err(ClientError::InvalidRequest("hashtag must not be empty".into()));
        }

        let body = HashtagRequest {
            hashtag: title.to_lowercase(),
        };
        self.post("/api/hashtag", &body).await
    }

    pub async fn deactivate_hashtag(&self, id: &str) -> Result<MessageResponse, ClientError> {
        let path = format!("/api/hashtags/{}/deactivate", encode_segment(id));
        let builder = self.request(Method::PATCH, &path)?;
        self.send(builder).await
    }

    pub async fn hashtag_trend(&self, title: &str) -> Result<HashtagTrend, ClientError> {
        let path = format!("/api/hashtags/{}/trends", encode_segment(title.trim_start_matches('#')));
        self.get(&path, &QueryPairs::new()).await
    }

    // Reports

    pub async fn top_posts(&self, query: &PostsQuery) -> Result<Vec<ReportPost>, ClientError> {
        self.get("/api/posts", &query.to_query()).await
    }

    pub async fn top_authors(&self, query: &AuthorsQuery) -> Result<Vec<Author>, ClientError> {
        self.get("/api/authors", &query.to_query()).await
    }

    pub async fn stats(&self) -> Result<Stats, ClientError> {
        self.get("/api/stats", &QueryPairs::new()).await
    }

    pub async fn platform_growth(&self, interval: GrowthInterval) -> Result<PlatformGrowth, ClientError> {
        let query = vec![("interval", interval.label().to_string())];
        self.get("/api/stats/growth", &query).await
    }

    // Trends

    pub async fn post_trends(&self, query: &TrendsQuery) -> Result<Paged<PostTrend>, ClientError> {
        self.get("/api/post-trends", &query.to_query()).await
    }

    pub async fn author_trends(&self, query: &TrendsQuery) -> Result<Paged<AuthorTrend>, ClientError> {
        self.get("/api/author-trends", &query.to_query()).await
    }

    pub async fn hashtag_trends(&self, query: &TrendsQuery) -> Result<Paged<HashtagTrend>, ClientError> {
        self.get("/api/hashtag-trends", &query.to_query()).await
    }

    pub async fn related_hashtags(&self, query: &TrendsQuery) -> Result<RelatedHashtags, ClientError> {
        self.get("/api/related-hashtags", &query.to_query()).await
    }

    // Search

    /// Multipart search by free text, an image, or both
    pub async fn multimodal_search(
        &self,
        query: Option<&str>,
        image: Option<&Path>,
    ) -> Result<Vec<SearchMatch>, ClientError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        if query.is_none() && image.is_none() {
            return Err(ClientError::InvalidRequest(
                "Please enter a search query or select an image".into(),
            ));
        }

        let mut form = multipart::Form::new();
        if let Some(text) = query {
            form = form.text("query", text.to_string());
        }
        if let Some(path) = image {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| ClientError::InvalidRequest(format!("cannot read {}: {}", path.display(), e)))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let part = multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(image_mime(path))
                .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
            form = form.part("image", part);
        }

        // multipart sets its own boundary content type, replacing the JSON default
        let builder = self.request(Method::POST, "/api/search/multimodal")?.multipart(form);
        self.send(builder).await
    }
}

fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(encode_segment("summer vibes"), "summer%20vibes");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = ApiClient::with_timeout("not a url", Duration::from_secs(1), Session::in_memory());
        assert!(matches!(err, Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn request_without_token_has_no_authorization() {
        let client = ApiClient::with_timeout("http://localhost:8000", Duration::from_secs(1), Session::in_memory()).unwrap();
        let request = client.request(Method::GET, "/api/stats").unwrap().build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(request.url().as_str(), "http://localhost:8000/api/stats");
    }

    #[test]
    fn request_with_token_carries_bearer() {
        let session = Session::in_memory();
        session.set("abc.def.ghi").unwrap();
        let client = ApiClient::with_timeout("http://localhost:8000", Duration::from_secs(1), session).unwrap();
        let request = client.request(Method::GET, "/api/hashtags").unwrap().build().unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc.def.ghi")
        );
    }

    #[tokio::test]
    async fn search_without_input_is_rejected_locally() {
        let client = ApiClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(1), Session::in_memory()).unwrap();
        let err = client.multimodal_search(Some("   "), None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
