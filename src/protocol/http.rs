use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;

use super::types::{
    Challenge, ChallengeRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    SessionResponse,
};
use super::ProtocolError;

/// Client view of the portal's authentication endpoints. The reqwest
/// implementation below is the production one; tests substitute an
/// in-memory certificate authority.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn request_challenge(&self, req: &ChallengeRequest) -> Result<Challenge, ProtocolError>;
    async fn submit_login(&self, req: &LoginRequest) -> Result<LoginResponse, ProtocolError>;
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ProtocolError>;
    async fn verify_session(&self, token: &str) -> Result<SessionResponse, ProtocolError>;
}

pub struct HttpApi {
    http: reqwest::Client,
    base: String,
    // Ancillary locale hints are computed once per client, lazily; owned
    // here rather than living in a module-level singleton.
    hints: OnceCell<Vec<(&'static str, String)>>,
}

impl HttpApi {
    pub fn new(base: &str) -> Result<Self, ProtocolError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProtocolError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            hints: OnceCell::new(),
        })
    }

    async fn hint_headers(&self) -> &[(&'static str, String)] {
        self.hints
            .get_or_init(|| async {
                let mut hints = Vec::new();
                if let Ok(tz) = std::env::var("TZ") {
                    hints.push(("x-client-timezone", tz));
                }
                if let Ok(locale) = std::env::var("LANG") {
                    hints.push(("x-client-locale", locale));
                }
                hints
            })
            .await
    }

    async fn finish<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ProtocolError> {
        let status = resp.status();
        if !status.is_success() {
            // Surface the server's message verbatim.
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(ProtocolError::Rejected(message));
        }
        resp.json::<R>()
            .await
            .map_err(|e| ProtocolError::Network(e.to_string()))
    }

    async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ProtocolError> {
        let mut req = self.http.post(format!("{}/{path}", self.base)).json(body);
        for (name, value) in self.hint_headers().await {
            req = req.header(*name, value.as_str());
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ProtocolError::Network(e.to_string()))?;
        Self::finish(resp).await
    }
}

impl AuthApi for HttpApi {
    async fn request_challenge(&self, req: &ChallengeRequest) -> Result<Challenge, ProtocolError> {
        self.post_json("certificate-challenge", req).await
    }

    async fn submit_login(&self, req: &LoginRequest) -> Result<LoginResponse, ProtocolError> {
        self.post_json("certificate-login", req).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ProtocolError> {
        self.post_json("register", req).await
    }

    async fn verify_session(&self, token: &str) -> Result<SessionResponse, ProtocolError> {
        let resp = self
            .http
            .get(format!("{}/verify-session", self.base))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProtocolError::Network(e.to_string()))?;
        Self::finish(resp).await
    }
}
