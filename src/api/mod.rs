//! HTTP helpers for the JSON backend with consistent timeouts and error
//! handling. Auth clients use these helpers so request setup, bearer headers
//! and error extraction live in one place. Tokens are attached here but never
//! logged.

pub mod config;
pub mod errors;

pub use config::ApiConfig;
pub use errors::{ApiError, Suspension};

use crate::APP_USER_AGENT;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use ulid::Ulid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Thin wrapper around a `reqwest::Client` bound to one backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Builds a client with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be initialized.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to initialize HTTP client: {err}")))?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetches JSON, optionally authenticated with a bearer token.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = send(self.request(Method::GET, path, bearer)).await?;
        handle_json_response(response).await
    }

    /// Issues a GET and ignores the response body on success.
    pub async fn get_empty(&self, path: &str, bearer: Option<&str>) -> Result<(), ApiError> {
        let response = send(self.request(Method::GET, path, bearer)).await?;
        handle_empty_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let builder = with_json_body(self.request(Method::POST, path, bearer), body)?;
        let response = send(builder).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and expects no meaningful response body.
    pub async fn post_json_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let builder = with_json_body(self.request(Method::POST, path, bearer), body)?;
        let response = send(builder).await?;
        handle_empty_response(response).await
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let url = self.config.endpoint(path);
        let request_id = Ulid::new().to_string();
        debug!(%method, %url, %request_id, authenticated = bearer.is_some(), "api request");

        let builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id);

        match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn with_json_body<B: Serialize + ?Sized>(
    builder: RequestBuilder,
    body: &B,
) -> Result<RequestBuilder, ApiError> {
    let payload = serde_json::to_string(body)
        .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;
    Ok(builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(payload))
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    builder.send().await.map_err(map_request_error)
}

/// Maps transport errors into `ApiError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with the server message.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }
}

/// Handles responses whose body is not needed.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }
}
