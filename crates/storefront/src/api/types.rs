//! Request and response bodies of the backend REST API.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use unishop_core::{AccessToken, Email, UserId};

use crate::models::UserProfile;

// Built right before sending; the password is exposed only here.
#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(super) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailRequest<'a> {
    pub email: &'a str,
}

/// `{user, access_token}` returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: AccessToken,
}

/// Registration outcome.
///
/// Backends either sign the new user in directly (`user` and
/// `access_token`) or only acknowledge the account (`user_id`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub access_token: Option<AccessToken>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RegisterResponse {
    /// The session to establish, if the backend signed the user in.
    #[must_use]
    pub fn into_auth(self) -> Option<AuthResponse> {
        match (self.user, self.access_token) {
            (Some(user), Some(access_token)) if !access_token.is_empty() => {
                Some(AuthResponse { user, access_token })
            }
            _ => None,
        }
    }
}

/// Partial profile update sent to `PUT /users/{id}`. Unset fields are
/// left alone by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "expose_opt")]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

#[allow(clippy::ref_option)]
fn expose_opt<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

impl ProfileUpdate {
    /// Whether nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.profile_image.is_none()
    }

    /// Apply the non-secret fields to a locally held profile.
    pub fn apply_to(&self, user: &mut UserProfile) {
        if let Some(username) = &self.username {
            user.username.clone_from(username);
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(image) = &self.profile_image {
            user.profile_image.clone_from(image);
        }
    }
}

/// Response of `PUT /users/{id}`. Some backends echo the updated user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /auth/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Plain `{message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body. The backend uses `error`, some endpoints `message`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(super) fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}
