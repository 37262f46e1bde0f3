// Identity provider adapter over the auth backend's REST surface

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

use backend_domain::ports::IdentityProvider;
use backend_domain::{AuthenticatedUser, Role, RuntimeConfig};

pub struct HttpIdentityProvider {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct VerifiedTokenResponse {
    uid: String,
    email: String,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Deserialize)]
struct UserResponse {
    uid: String,
}

#[derive(Deserialize)]
struct CustomTokenResponse {
    token: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            http,
            base_url: config.identity_base_url.trim_end_matches('/').to_string(),
            api_key: config.identity_api_key.clone(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, bearer: &str) -> Result<Option<AuthenticatedUser>> {
        let response = self
            .authorized(self.http.post(format!("{}/v1/tokens:verify", self.base_url)))
            .json(&json!({ "token": bearer }))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::NOT_FOUND
        {
            return Ok(None);
        }
        let verified: VerifiedTokenResponse = response.error_for_status()?.json().await?;
        let roles = verified
            .roles
            .iter()
            .filter_map(|role| Role::parse(role))
            .collect();
        Ok(Some(AuthenticatedUser {
            uid: verified.uid,
            email: verified.email,
            roles,
        }))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<String>> {
        let response = self
            .authorized(
                self.http
                    .get(format!("{}/v1/users/by-email/{}", self.base_url, email)),
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let user: UserResponse = response.error_for_status()?.json().await?;
        Ok(Some(user.uid))
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String> {
        let response = self
            .authorized(self.http.post(format!("{}/v1/users", self.base_url)))
            .json(&json!({
                "email": email,
                "password": password,
                "display_name": display_name,
            }))
            .send()
            .await?
            .error_for_status()?;
        let user: UserResponse = response.json().await?;
        Ok(user.uid)
    }

    async fn create_custom_token(&self, uid: &str) -> Result<String> {
        let response = self
            .authorized(
                self.http
                    .post(format!("{}/v1/users/{}/custom-token", self.base_url, uid)),
            )
            .send()
            .await?
            .error_for_status()?;
        let custom: CustomTokenResponse = response.json().await?;
        Ok(custom.token)
    }
}
