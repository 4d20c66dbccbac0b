//! User profile as returned by the backend and kept in the session.

use serde::{Deserialize, Serialize};

use unishop_core::{Email, UserId, UserRole};

/// Image used when the backend has no profile picture for a user.
pub const DEFAULT_PROFILE_IMAGE: &str = "default.jpg";

/// A signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user ID.
    pub id: UserId,
    /// Display name, unique per store.
    pub username: String,
    /// Login email address.
    pub email: Email,
    /// URL or file name of the profile picture.
    #[serde(default = "default_profile_image")]
    pub profile_image: String,
    /// Role assigned by the backend.
    #[serde(default)]
    pub role: UserRole,
}

fn default_profile_image() -> String {
    DEFAULT_PROFILE_IMAGE.to_string()
}
