//! Account service.
//!
//! Ties the backend API to the local [`Session`]: sign in, sign up, sign
//! out, profile edits, profile pictures, account deletion and password
//! reset requests.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use unishop_core::{AccessToken, Email};

use crate::api::{ApiClient, AuthResponse, ProfileUpdate};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::UserProfile;
use crate::session::Session;
use crate::validation::FieldErrors;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Shown when the backend acknowledges a reset request without a message.
const DEFAULT_RESET_MESSAGE: &str = "Password reset email sent";

/// Sign-up form as entered by the shopper.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub repeat_password: SecretString,
}

impl RegistrationForm {
    /// Check every field, reporting one message per offending field.
    ///
    /// # Errors
    ///
    /// Returns the collected [`FieldErrors`] if any field is invalid.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.username.trim().is_empty() {
            errors.insert("username", "Username is required");
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.insert("email", e.to_string());
                None
            }
        };

        if let Some(message) = password_problem(&self.password) {
            errors.insert("password", message);
        }

        if self.password.expose_secret() != self.repeat_password.expose_secret() {
            errors.insert("repeatPassword", "Passwords do not match");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

fn password_problem(password: &SecretString) -> Option<&'static str> {
    let password = password.expose_secret();
    if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        Some("Password must be at least 8 characters")
    } else {
        None
    }
}

/// Account service.
///
/// Borrows the API client and the session it signs in and out of.
pub struct AuthService<'a> {
    api: &'a ApiClient,
    session: &'a mut Session,
}

impl<'a> AuthService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a mut Session) -> Self {
        Self { api, session }
    }

    /// The session this service operates on.
    #[must_use]
    pub const fn session(&self) -> &Session {
        self.session
    }

    // =========================================================================
    // Sign in / sign up
    // =========================================================================

    /// Sign in with email and password and establish the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed,
    /// `AuthError::Validation` if the password is blank, or
    /// `AuthError::Api` if the backend rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<&UserProfile, AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert("password", "Password is required");
            return Err(AuthError::Validation(errors));
        }

        let auth = self.api.login(&email, password).await?;
        self.sign_in(auth)
    }

    /// Create an account and sign in to it.
    ///
    /// When the backend only acknowledges the new account, a regular login
    /// with the same credentials follows.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with one message per invalid field,
    /// or `AuthError::Api` if the backend refuses the account.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&mut self, form: &RegistrationForm) -> Result<&UserProfile, AuthError> {
        let email = form.validate().map_err(AuthError::Validation)?;

        let response = self
            .api
            .register(form.username.trim(), &email, &form.password)
            .await?;

        let auth = match response.into_auth() {
            Some(auth) => auth,
            None => {
                tracing::debug!("Registration acknowledged without a token, signing in");
                self.api.login(&email, &form.password).await?
            }
        };
        self.sign_in(auth)
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the stored session cannot be removed.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.session.clear()?;
        clear_sentry_user();
        tracing::info!("Signed out");
        Ok(())
    }

    fn sign_in(&mut self, auth: AuthResponse) -> Result<&UserProfile, AuthError> {
        if auth.access_token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        set_sentry_user(&auth.user.id, Some(auth.user.email.as_str()));
        self.session.establish(auth.user, auth.access_token)?;
        self.session.user().ok_or(AuthError::NotAuthenticated)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update profile fields on the backend and in the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without a session,
    /// `AuthError::EmptyUpdate` or `AuthError::Validation` for bad input,
    /// or `AuthError::Api` if the backend rejects the update.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<&UserProfile, AuthError> {
        let (mut user, token) = self.current()?;
        if update.is_empty() {
            return Err(AuthError::EmptyUpdate);
        }
        validate_update(&update).map_err(AuthError::Validation)?;

        let response = self.api.update_user(&token, user.id, &update).await?;
        match response.user {
            Some(updated) => user = updated,
            None => update.apply_to(&mut user),
        }

        tracing::info!(user_id = %user.id, "Profile updated");
        self.session.update_user(user)?;
        self.session.user().ok_or(AuthError::NotAuthenticated)
    }

    /// Upload a new profile picture and point the profile at it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without a session, or
    /// `AuthError::Api` if the upload fails.
    #[instrument(skip(self, bytes))]
    pub async fn upload_profile_image(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&UserProfile, AuthError> {
        let (mut user, token) = self.current()?;

        let uploaded = self.api.upload_profile_image(&token, file_name, bytes).await?;
        user.profile_image = uploaded.url;

        self.session.update_user(user)?;
        self.session.user().ok_or(AuthError::NotAuthenticated)
    }

    /// Delete the account and sign out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without a session, or
    /// `AuthError::Api` if the backend refuses. The session is kept when
    /// deletion fails.
    #[instrument(skip(self))]
    pub async fn delete_account(&mut self) -> Result<(), AuthError> {
        let (user, token) = self.current()?;
        self.api.delete_user(&token, user.id).await?;
        tracing::info!(user_id = %user.id, "Account deleted");
        self.logout()
    }

    /// Ask the backend to email a password reset link.
    ///
    /// Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed, or
    /// `AuthError::Api` if the backend refuses.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<String, AuthError> {
        let email = Email::parse(email)?;
        let response = self.api.request_password_reset(&email).await?;
        Ok(response
            .message
            .unwrap_or_else(|| DEFAULT_RESET_MESSAGE.to_string()))
    }

    /// Owned copies of the signed-in user and token.
    fn current(&self) -> Result<(UserProfile, AccessToken), AuthError> {
        self.session
            .credentials()
            .map(|(user, token)| (user.clone(), token.clone()))
            .ok_or(AuthError::NotAuthenticated)
    }
}

fn validate_update(update: &ProfileUpdate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if update
        .username
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        errors.insert("username", "Username is required");
    }
    if let Some(message) = update.password.as_ref().and_then(password_problem) {
        errors.insert("password", message);
    }
    errors.into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn form(username: &str, email: &str, password: &str, repeat: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_string(),
            email: email.to_string(),
            password: SecretString::from(password),
            repeat_password: SecretString::from(repeat),
        }
    }

    #[test]
    fn test_valid_registration() {
        let email = form("andy", " andy@unishop.com ", "s3cure-pass", "s3cure-pass")
            .validate()
            .unwrap();
        assert_eq!(email.as_str(), "andy@unishop.com");
    }

    #[test]
    fn test_blank_registration_reports_each_field() {
        let errors = form("  ", "", "", "").validate().unwrap_err();
        assert_eq!(errors.get("username"), Some("Username is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.get("repeatPassword"), None);
    }

    #[test]
    fn test_registration_field_rules() {
        let errors = form("andy", "andy@", "short", "shorter").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is invalid"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(errors.get("repeatPassword"), Some("Passwords do not match"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_update_validation() {
        let update = ProfileUpdate {
            username: Some(" ".to_string()),
            password: Some(SecretString::from("1234")),
            ..ProfileUpdate::default()
        };
        let errors = validate_update(&update).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    fn offline_api() -> ApiClient {
        // Nothing listens here; these tests fail before any request is sent.
        let url = url::Url::parse("http://127.0.0.1:9").unwrap();
        ApiClient::new(&url, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_profile_operations_require_session() {
        let api = offline_api();
        let mut session = Session::load(Arc::new(MemoryStore::new()));
        let mut auth = AuthService::new(&api, &mut session);

        let update = ProfileUpdate {
            username: Some("andy".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(matches!(
            auth.update_profile(update).await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            auth.upload_profile_image("me.png", vec![1, 2, 3]).await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(auth.delete_account().await, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_login_checks_input_before_calling_backend() {
        let api = offline_api();
        let mut session = Session::load(Arc::new(MemoryStore::new()));
        let mut auth = AuthService::new(&api, &mut session);

        assert!(matches!(
            auth.login("not-an-email", &SecretString::from("whatever1")).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.login("andy@unishop.com", &SecretString::from("")).await,
            Err(AuthError::Validation(_))
        ));
        assert!(!auth.session().is_authenticated());
    }
}
