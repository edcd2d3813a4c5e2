//! Session Synchronizer: after a successful login the server's session view
//! is authoritative; the local token is reconciled against it.

use crate::protocol::types::SessionResponse;
use crate::protocol::{AuthApi, ProtocolError};

pub struct SessionHandle {
    token: Option<String>,
}

impl SessionHandle {
    pub fn authenticated(token: String) -> Self {
        Self { token: Some(token) }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Fetch the server's view of this session. A failed verification
    /// clears the local token; the server's message passes through.
    pub async fn synchronize<A: AuthApi>(
        &mut self,
        api: &A,
    ) -> Result<SessionResponse, ProtocolError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ProtocolError::Rejected("no active session".to_string()))?;
        match api.verify_session(token).await {
            Ok(view) => Ok(view),
            Err(e) => {
                tracing::warn!(error = %e, "session verification failed; clearing local token");
                self.token = None;
                Err(e)
            }
        }
    }
}
