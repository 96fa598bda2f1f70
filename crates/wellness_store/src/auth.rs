//! Firebase Auth email/password sign-in.

use crate::{IdentityProvider, StoreError};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// A signed-in user: the Firebase `localId` plus the ID token Firestore
/// requests are authorised with.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub id_token: SecretString,
}

impl Session {
    pub fn new(user_id: impl Into<String>, id_token: SecretString) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            id_token,
        }
    }
}

impl IdentityProvider for Session {
    fn current_user_id(&self) -> Option<String> {
        Some(self.user_id.clone()).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Identity Toolkit REST API.
#[derive(Clone, Debug)]
pub struct FirebaseAuth {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl FirebaseAuth {
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Exchange email and password for a [`Session`].
    ///
    /// Any rejection by the service (wrong password, unknown user, disabled
    /// account) surfaces as [`StoreError::Auth`] carrying Firebase's error code.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, StoreError> {
        let url = format!("{}/v1/accounts:signInWithPassword", self.base_url);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(256).collect());
            tracing::debug!(status = status.as_u16(), %message, "sign-in rejected");
            return Err(StoreError::Auth(message));
        }

        let signed_in: SignInResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        tracing::info!(user_id = %signed_in.local_id, "signed in");
        Ok(Session {
            user_id: signed_in.local_id,
            email: signed_in.email,
            id_token: SecretString::new(signed_in.id_token.into()),
        })
    }
}
