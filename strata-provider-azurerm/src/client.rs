//! Thin Azure Resource Manager client
//!
//! Sends JSON requests to `{endpoint}{resource_id}?api-version=...` and waits
//! for long-running operations to settle. Credentials, retries and paging are
//! handled outside this crate.

use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, HeaderMap, LOCATION};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::config::AzureConfig;
use crate::error::{AzureError, AzureResult};

const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";

/// Azure Resource Manager client
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    config: AzureConfig,
}

impl ArmClient {
    /// Create a client from a validated configuration
    pub fn new(config: AzureConfig) -> AzureResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("strata-provider-azurerm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn subscription_id(&self) -> &str {
        &self.config.subscription_id
    }

    pub fn config(&self) -> &AzureConfig {
        &self.config
    }

    /// GET a resource and decode its body
    pub async fn get<T: DeserializeOwned>(&self, id: &str, api_version: &str) -> AzureResult<T> {
        let response = self.send(Method::GET, id, api_version, None).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a resource, mapping 404 to `None`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
    ) -> AzureResult<Option<T>> {
        match self.get(id, api_version).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.was_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// PUT (create or replace) a resource and wait for it to settle
    pub async fn put<B: Serialize>(&self, id: &str, api_version: &str, body: &B) -> AzureResult<()> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, id, api_version, Some(body)).await?;
        self.wait_for_operation(response).await
    }

    /// PATCH a resource and wait for it to settle
    pub async fn patch<B: Serialize>(
        &self,
        id: &str,
        api_version: &str,
        body: &B,
    ) -> AzureResult<()> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PATCH, id, api_version, Some(body)).await?;
        self.wait_for_operation(response).await
    }

    /// DELETE a resource and wait for it to go away
    ///
    /// Deleting something that is already gone is not an error.
    pub async fn delete(&self, id: &str, api_version: &str) -> AzureResult<()> {
        match self.send(Method::DELETE, id, api_version, None).await {
            Ok(response) => self.wait_for_operation(response).await,
            Err(e) if e.was_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn url(&self, id: &str, api_version: &str) -> String {
        format!(
            "{}{}?api-version={}",
            self.config.base_url(),
            id,
            api_version
        )
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.config.access_token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        id: &str,
        api_version: &str,
        body: Option<Json>,
    ) -> AzureResult<Response> {
        let url = self.url(id, api_version);
        debug!("{} {}", method, url);

        let mut builder = self.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = builder.send().await?;
        check_status(&method, &url, response).await
    }

    /// Wait for a long-running operation announced by a 201/202 response
    async fn wait_for_operation(&self, response: Response) -> AzureResult<()> {
        let status = response.status();
        if status != StatusCode::CREATED && status != StatusCode::ACCEPTED {
            return Ok(());
        }

        match operation_url(response.headers()) {
            Some(OperationUrl::AsyncOperation(url)) => self.poll_async_operation(&url).await,
            Some(OperationUrl::Location(url)) => self.poll_location(&url).await,
            None => Ok(()),
        }
    }

    /// Poll an `Azure-AsyncOperation` URL until its status is terminal
    async fn poll_async_operation(&self, url: &str) -> AzureResult<()> {
        for _ in 0..self.config.max_poll_attempts {
            debug!("GET {}", url);
            let response = self.request(Method::GET, url).send().await?;
            let response = check_status(&Method::GET, url, response).await?;
            let body: OperationStatus = serde_json::from_str(&response.text().await?)?;

            match body.status.as_str() {
                "Succeeded" => return Ok(()),
                "Failed" | "Canceled" => {
                    let message = body
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "Unknown error".to_string());
                    warn!("operation {} ended with {}: {}", url, body.status, message);
                    return Err(AzureError::OperationFailed {
                        status: body.status,
                        message,
                    });
                }
                _ => tokio::time::sleep(self.config.poll_interval).await,
            }
        }

        Err(AzureError::OperationTimedOut {
            attempts: self.config.max_poll_attempts,
        })
    }

    /// Poll a `Location` URL until it stops answering 202
    async fn poll_location(&self, url: &str) -> AzureResult<()> {
        for _ in 0..self.config.max_poll_attempts {
            debug!("GET {}", url);
            let response = self.request(Method::GET, url).send().await?;
            let response = check_status(&Method::GET, url, response).await?;
            if response.status() != StatusCode::ACCEPTED {
                return Ok(());
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(AzureError::OperationTimedOut {
            attempts: self.config.max_poll_attempts,
        })
    }
}

enum OperationUrl {
    AsyncOperation(String),
    Location(String),
}

fn operation_url(headers: &HeaderMap) -> Option<OperationUrl> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    header(ASYNC_OPERATION_HEADER)
        .map(OperationUrl::AsyncOperation)
        .or_else(|| header(LOCATION.as_str()).map(OperationUrl::Location))
}

/// Turn a non-success response into `AzureError::Api`
async fn check_status(method: &Method, url: &str, response: Response) -> AzureResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => (parsed.error.code, parsed.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        ),
    };

    Err(AzureError::Api {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        code,
        message,
    })
}

#[derive(Debug, serde::Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, serde::Deserialize)]
struct OperationStatus {
    status: String,
    error: Option<ErrorDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::matchers::{contains, request, url_decoded};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use serde_json::json;
    use std::time::Duration;

    const RG: &str = "/subscriptions/sub/resourceGroups/rg1";

    fn client(server: &Server) -> ArmClient {
        let config = AzureConfig::default()
            .with_subscription("sub")
            .with_endpoint(server.url_str(""))
            .with_access_token("secret")
            .with_poll_interval(Duration::from_millis(1));
        ArmClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_api_version_and_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("GET", RG),
                request::query(url_decoded(contains(("api-version", "2021-04-01")))),
                request::headers(contains(("authorization", "Bearer secret"))),
            ])
            .respond_with(json_encoded(json!({"name": "rg1", "location": "westeurope"}))),
        );

        let body: Json = client(&server).get(RG, "2021-04-01").await.unwrap();
        assert_eq!(body["location"], "westeurope");
    }

    #[tokio::test]
    async fn test_get_optional_maps_not_found() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", RG)).respond_with(
                status_code(404).body(
                    r#"{"error":{"code":"ResourceGroupNotFound","message":"Resource group 'rg1' could not be found."}}"#,
                ),
            ),
        );

        let body: Option<Json> = client(&server).get_optional(RG, "2021-04-01").await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_api_error_carries_code_and_message() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("PUT", RG)).respond_with(
                status_code(409)
                    .body(r#"{"error":{"code":"Conflict","message":"busy"}}"#),
            ),
        );

        let err = client(&server)
            .put(RG, "2021-04-01", &json!({"location": "westeurope"}))
            .await
            .unwrap_err();
        match err {
            AzureError::Api {
                status,
                code,
                message,
                ..
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "Conflict");
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_put_waits_for_async_operation() {
        let server = Server::run();
        let operation = server.url_str("/operations/op1");
        server.expect(
            Expectation::matching(request::method_path("PUT", RG)).respond_with(
                status_code(201)
                    .append_header(ASYNC_OPERATION_HEADER, operation.clone())
                    .body("{}"),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/operations/op1"))
                .respond_with(json_encoded(json!({"status": "Succeeded"}))),
        );

        client(&server)
            .put(RG, "2021-04-01", &json!({"location": "westeurope"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_put_polls_location_until_done() {
        let server = Server::run();
        let operation = server.url_str("/operations/op3");
        server.expect(
            Expectation::matching(request::method_path("PUT", RG)).respond_with(
                status_code(202).append_header("Location", operation.clone()),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/operations/op3"))
                .times(2)
                .respond_with(httptest::cycle![
                    status_code(202),
                    status_code(200).body("{}"),
                ]),
        );

        client(&server)
            .put(RG, "2021-04-01", &json!({"location": "westeurope"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_location_polling_gives_up() {
        let server = Server::run();
        let operation = server.url_str("/operations/op4");
        server.expect(
            Expectation::matching(request::method_path("DELETE", RG)).respond_with(
                status_code(202).append_header("Location", operation.clone()),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/operations/op4"))
                .times(3)
                .respond_with(status_code(202)),
        );

        let mut config = AzureConfig::default()
            .with_subscription("sub")
            .with_endpoint(server.url_str(""))
            .with_poll_interval(Duration::from_millis(1));
        config.max_poll_attempts = 3;
        let err = ArmClient::new(config)
            .unwrap()
            .delete(RG, "2021-04-01")
            .await
            .unwrap_err();
        assert!(matches!(err, AzureError::OperationTimedOut { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_failed_async_operation_is_an_error() {
        let server = Server::run();
        let operation = server.url_str("/operations/op2");
        server.expect(
            Expectation::matching(request::method_path("DELETE", RG)).respond_with(
                status_code(202).append_header(ASYNC_OPERATION_HEADER, operation.clone()),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/operations/op2")).respond_with(
                json_encoded(json!({
                    "status": "Failed",
                    "error": {"code": "InternalError", "message": "boom"}
                })),
            ),
        );

        let err = client(&server).delete(RG, "2021-04-01").await.unwrap_err();
        assert!(matches!(err, AzureError::OperationFailed { .. }));
        assert!(err.to_string().contains("InternalError: boom"));
    }

    #[tokio::test]
    async fn test_delete_of_missing_resource_succeeds() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("DELETE", RG))
                .respond_with(status_code(404)),
        );

        client(&server).delete(RG, "2021-04-01").await.unwrap();
    }
}
