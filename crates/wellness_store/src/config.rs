use crate::StoreError;
use secrecy::SecretString;

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// How the process obtains a signed-in user.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// Sign in through Firebase Auth with email and password.
    Password {
        email: String,
        password: SecretString,
    },
    /// Use an already issued ID token for a known user.
    Token {
        user_id: String,
        id_token: SecretString,
    },
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub project_id: String,
    pub api_key: Option<SecretString>,
    pub firestore_base_url: String,
    pub auth_base_url: String,
    pub credentials: Credentials,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration through `get`, so tests never touch the process
    /// environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut lookup = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let project_id = lookup("WELLNESS_FIREBASE_PROJECT_ID")
            .ok_or_else(|| StoreError::Config("WELLNESS_FIREBASE_PROJECT_ID missing".into()))?;
        let api_key = lookup("WELLNESS_FIREBASE_API_KEY").map(|k| SecretString::new(k.into()));
        let firestore_base_url = lookup("WELLNESS_FIRESTORE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.into());
        let auth_base_url =
            lookup("WELLNESS_AUTH_BASE_URL").unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.into());

        let credentials = match (lookup("WELLNESS_EMAIL"), lookup("WELLNESS_PASSWORD")) {
            (Some(email), Some(password)) => {
                if api_key.is_none() {
                    return Err(StoreError::Config(
                        "WELLNESS_FIREBASE_API_KEY is required for password sign-in".into(),
                    ));
                }
                Credentials::Password {
                    email,
                    password: SecretString::new(password.into()),
                }
            }
            _ => {
                let user_id = lookup("WELLNESS_USER_ID").ok_or_else(|| {
                    StoreError::Config(
                        "either WELLNESS_EMAIL/WELLNESS_PASSWORD or WELLNESS_USER_ID/WELLNESS_ID_TOKEN must be set"
                            .into(),
                    )
                })?;
                let id_token = lookup("WELLNESS_ID_TOKEN")
                    .ok_or_else(|| StoreError::Config("WELLNESS_ID_TOKEN missing".into()))?;
                Credentials::Token {
                    user_id,
                    id_token: SecretString::new(id_token.into()),
                }
            }
        };

        Ok(Self {
            project_id,
            api_key,
            firestore_base_url,
            auth_base_url,
            credentials,
        })
    }
}
