//! Typed wrapper over the `/auth/*` endpoints

use reqwest::Method;
use serde_json::json;

use td_core::auth::{LoginData, LoginPayload, RefreshPayload, RegisterData, User};
use td_core::wire::{ApiResponse, UserPayload};

use crate::http::ApiClient;
use crate::Result;

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/register`
    pub async fn register(&self, data: &RegisterData) -> Result<LoginPayload> {
        let response: ApiResponse<LoginPayload> = self
            .client
            .send(
                self.client
                    .request(Method::POST, "/auth/register", None)
                    .json(data),
            )
            .await?;
        Ok(response.data)
    }

    /// `POST /auth/login`
    pub async fn login(&self, data: &LoginData) -> Result<LoginPayload> {
        let response: ApiResponse<LoginPayload> = self
            .client
            .send(
                self.client
                    .request(Method::POST, "/auth/login", None)
                    .json(data),
            )
            .await?;
        Ok(response.data)
    }

    /// `POST /auth/logout`
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.client
            .send_empty(self.client.request(Method::POST, "/auth/logout", Some(token)))
            .await
    }

    /// `POST /auth/refresh`
    ///
    /// The refresh endpoint authenticates with the refresh token in the body
    /// and the device id in the `X-Device-ID` header, not a bearer token.
    pub async fn refresh(&self, refresh_token: &str, device_id: &str) -> Result<RefreshPayload> {
        self.client
            .send(
                self.client
                    .request(Method::POST, "/auth/refresh", None)
                    .header("X-Device-ID", device_id)
                    .json(&json!({ "refreshToken": refresh_token })),
            )
            .await
    }

    /// `GET /auth/profile`
    pub async fn profile(&self, token: &str) -> Result<User> {
        let response: ApiResponse<UserPayload> = self
            .client
            .send(self.client.request(Method::GET, "/auth/profile", Some(token)))
            .await?;
        Ok(response.data.user)
    }
}
