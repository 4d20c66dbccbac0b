//! Storage keys for persisted storefront state.

/// Keys used in the [`crate::store::KeyValueStore`].
pub mod keys {
    /// Key for the ordered list of cart line items.
    pub const CART: &str = "cart";

    /// Key for the signed-in user's profile.
    pub const USER: &str = "user";

    /// Key for the bearer token issued at login.
    pub const TOKEN: &str = "token";
}
