// Directory trait for the reference proximity service
use crate::domain::candidate::Profession;
use crate::domain::position::Position;
use async_trait::async_trait;

/// A registered user as the reference service knows them. The access token
/// stands in for the external authentication collaborator: opaque on the
/// client, resolved to a user here.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub token: String,
    pub username: String,
    pub fullname: String,
    pub profile_img: Option<String>,
    pub profession: Option<Profession>,
    /// Non-public users only appear in queries with `include_non_public`.
    pub public: bool,
    /// Whether the user opted into sharing exact coordinates with peers.
    pub share_exact_position: bool,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a bearer token to its user, if registered.
    async fn find_by_token(&self, token: &str) -> Option<UserRecord>;

    /// Record the latest reported position for a user.
    async fn record_position(&self, username: &str, position: Position, time_ms: i64);

    /// All users with a known position, paired with that position.
    async fn located_users(&self) -> Vec<(UserRecord, Position)>;
}
