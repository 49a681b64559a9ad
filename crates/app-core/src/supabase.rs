//! A thin client for the Supabase auth (GoTrue) REST API.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoTrueError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Auth server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse auth server response")]
    ResponseParse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: GoTrueUser,
}

#[derive(Deserialize, Default)]
struct GoTrueErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Clone)]
pub struct GoTrueClient {
    http: Client,
    base_url: Url,
    anon_key: String,
}

impl GoTrueClient {
    /// `project_url` is the Supabase project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(project_url: &str, anon_key: String) -> Result<Self, GoTrueError> {
        let base_url = Url::parse(project_url)?.join("auth/v1/")?;
        Ok(Self { http: Client::new(), base_url, anon_key })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GoTrueError> {
        Ok(self.base_url.join(path)?)
    }

    async fn rejection(response: reqwest::Response) -> GoTrueError {
        let status = response.status().as_u16();
        let body = response.json::<GoTrueErrorBody>().await.unwrap_or_default();
        GoTrueError::Rejected { status, message: body.into_message() }
    }

    /// Fetches the user behind an access token.
    ///
    /// Returns `Ok(None)` when the server does not recognise the token.
    pub async fn get_user(&self, access_token: &str) -> Result<Option<GoTrueUser>, GoTrueError> {
        let response = self
            .http
            .get(self.endpoint("user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user = response.json::<GoTrueUser>().await.map_err(|_| GoTrueError::ResponseParse)?;
                Ok(Some(user))
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::rejection(response).await),
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<GoTrueSession, GoTrueError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response.json::<GoTrueSession>().await.map_err(|_| GoTrueError::ResponseParse)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), GoTrueError> {
        let response = self
            .http
            .post(self.endpoint("logout")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An already revoked session is as good as signed out.
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::rejection(response).await),
        }
    }

    /// Builds the URL that starts an OAuth sign-in with the given provider.
    pub fn authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> Result<String, GoTrueError> {
        let mut url = self.endpoint("authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            if let Some(redirect_to) = redirect_to {
                query.append_pair("redirect_to", redirect_to);
            }
        }
        Ok(url.to_string())
    }
}
