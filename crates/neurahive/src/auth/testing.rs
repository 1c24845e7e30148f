//! In-memory credential store for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{CredentialStore, Role, RoleSet};
use crate::user::User;

#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Mutex<HashMap<i64, User>>,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn add(&self, email: &str, roles: &[Role], enabled: bool) -> i64 {
        self.add_with_hash(email, "", roles, enabled)
    }

    pub fn add_with_hash(&self, email: &str, hash: &str, roles: &[Role], enabled: bool) -> i64 {
        let mut users = self.users.lock().unwrap();
        let id = users.len() as i64 + 1;
        users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                name: email.split('@').next().unwrap_or_default().to_string(),
                password_hash: hash.to_string(),
                role: RoleSet::from(roles),
                enabled,
                created_at: "2024-01-01 00:00:00".to_string(),
                updated_at: "2024-01-01 00:00:00".to_string(),
                last_login_at: None,
            },
        );
        id
    }

    pub fn set_enabled(&self, id: i64, enabled: bool) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.enabled = enabled;
        }
    }

    pub fn set_roles(&self, id: i64, roles: &[Role]) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.role = RoleSet::from(roles);
        }
    }

    pub fn last_login(&self, id: i64) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|u| u.last_login_at.clone())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn record_login(&self, id: i64) -> Result<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.last_login_at = Some("now".to_string());
        }
        Ok(())
    }
}
