//! Base for generated resource wrappers.

use serde::de::DeserializeOwned;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::options::RequestOptions;
use crate::pagination::{PagePromise, Pagination};
use crate::response::ApiResponse;

/// A handle resource wrappers build on.
///
/// Wrappers hold one of these and forward to the verb helpers with their own
/// paths and typed bodies.
///
/// ## Examples
///
/// ```rust,ignore
/// use courier::pagination::NumberedPage;
/// use courier::{ApiResource, ApiResponse, ApiError, PagePromise, RequestOptions};
/// use serde_json::{json, Value};
///
/// struct AuthRules(ApiResource);
///
/// impl AuthRules {
///     async fn retrieve(&self, token: &str) -> Result<ApiResponse<Value>, ApiError> {
///         self.0.get(&format!("/auth_rules/{token}"), RequestOptions::new()).await
///     }
///
///     fn list(&self) -> PagePromise<NumberedPage<Value>> {
///         self.0.get_api_list("/auth_rules", RequestOptions::new())
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiResource {
    client: ApiClient,
}

impl ApiResource {
    /// Binds a resource to a client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// See [`ApiClient::get`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.client.get(path, options).await
    }

    /// See [`ApiClient::post`].
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.client.post(path, options).await
    }

    /// See [`ApiClient::put`].
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.client.put(path, options).await
    }

    /// See [`ApiClient::patch`].
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.client.patch(path, options).await
    }

    /// See [`ApiClient::delete`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.client.delete(path, options).await
    }

    /// See [`ApiClient::get_api_list`].
    pub fn get_api_list<P: Pagination>(&self, path: &str, options: RequestOptions) -> PagePromise<P> {
        self.client.get_api_list(path, options)
    }
}

impl From<ApiClient> for ApiResource {
    fn from(client: ApiClient) -> Self {
        Self::new(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resource_forwards_to_client() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/auth_rules/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resource = ApiResource::from(ApiClient::new(mock_server.uri()).unwrap());
        assert_eq!(resource.client().base_url(), mock_server.uri());

        let deleted = resource
            .delete::<Value>("/auth_rules/r1", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(deleted["deleted"], true);
    }
}
