//! Users, including the authenticated one

use dashmap::DashMap;
use gateway_core::{Snowflake, User, UserStore};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct UserCache {
    current: RwLock<Option<User>>,
    users: DashMap<Snowflake, User>,
}

impl UserCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserStore for UserCache {
    fn set_current(&self, user: User) {
        self.users.insert(user.id, user.clone());
        *self.current.write() = Some(user);
    }

    fn current(&self) -> Option<User> {
        self.current.read().clone()
    }

    fn upsert(&self, user: User) {
        let mut current = self.current.write();
        if current.as_ref().is_some_and(|c| c.id == user.id) {
            *current = Some(user.clone());
        }
        self.users.insert(user.id, user);
    }

    fn get(&self, id: Snowflake) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    fn clear(&self) {
        *self.current.write() = None;
        self.users.clear();
    }
}
