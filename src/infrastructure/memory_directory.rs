// In-memory user directory for the reference service
use crate::application::user_directory::{UserDirectory, UserRecord};
use crate::domain::candidate::Profession;
use crate::domain::position::Position;
use crate::infrastructure::config::UserEntry;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct LiveLocation {
    position: Position,
    time_ms: i64,
}

/// Directory seeded from config at startup. Live locations are kept only in
/// memory; the original system persisted them behind its ORM, which is out of
/// scope here.
pub struct InMemoryDirectory {
    users: Vec<UserRecord>,
    by_token: HashMap<String, usize>,
    locations: RwLock<HashMap<String, LiveLocation>>,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        let by_token = users
            .iter()
            .enumerate()
            .map(|(i, u)| (u.token.clone(), i))
            .collect();
        Self {
            users,
            by_token,
            locations: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_entries(entries: Vec<UserEntry>) -> Self {
        let users = entries
            .into_iter()
            .map(|e| UserRecord {
                token: e.token,
                username: e.username,
                fullname: e.fullname,
                profile_img: e.profile_img,
                profession: e.profession.map(|name| Profession { name }),
                public: e.public,
                share_exact_position: e.share_exact_position,
            })
            .collect();
        Self::new(users)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_token(&self, token: &str) -> Option<UserRecord> {
        self.by_token.get(token).map(|&i| self.users[i].clone())
    }

    async fn record_position(&self, username: &str, position: Position, time_ms: i64) {
        let mut locations = self.locations.write().await;
        // Reports can land out of order; keep the freshest fix.
        if let Some(existing) = locations.get(username) {
            if existing.time_ms > time_ms {
                return;
            }
        }
        locations.insert(username.to_string(), LiveLocation { position, time_ms });
    }

    async fn located_users(&self) -> Vec<(UserRecord, Position)> {
        let locations = self.locations.read().await;
        self.users
            .iter()
            .filter_map(|u| {
                locations
                    .get(&u.username)
                    .map(|loc| (u.clone(), loc.position))
            })
            .collect()
    }
}
