//! Registered users. Account management lives outside this service; the catalog only
//! needs to look users up and to resolve the bearer token of the current request.
use crate::config::UserConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub nick_name: String,
    /// Upstream person ID of the user's hero.
    pub external_id: u64,
    pub role: Role,
}

impl User {
    /// Whether this user may read the data of `user_id`.
    pub fn can_view(&self, user_id: u64) -> bool {
        self.role == Role::Admin || self.id == user_id
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum UserError {
    #[error("user {0} not found")]
    NotFound(u64),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, user_id: u64) -> Result<User, UserError>;
    async fn get_all(&self) -> Vec<User>;
    async fn find_by_token(&self, token: &str) -> Option<User>;
}

/// Users provisioned from configuration, held in memory.
pub struct StaticUserRepository {
    users: Vec<User>,
    by_token: HashMap<String, usize>,
}

impl StaticUserRepository {
    pub fn new(users: &[UserConfig]) -> Self {
        let mut by_token = HashMap::with_capacity(users.len());
        let users = users
            .iter()
            .enumerate()
            .map(|(index, user)| {
                by_token.insert(user.api_token.trim().to_string(), index);
                User {
                    id: user.id,
                    email: user.email.clone(),
                    nick_name: user.nick_name.clone(),
                    external_id: user.external_id,
                    role: user.role,
                }
            })
            .collect();

        StaticUserRepository { users, by_token }
    }
}

#[async_trait]
impl UserRepository for StaticUserRepository {
    async fn get_by_id(&self, user_id: u64) -> Result<User, UserError> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or(UserError::NotFound(user_id))
    }

    async fn get_all(&self) -> Vec<User> {
        self.users.clone()
    }

    async fn find_by_token(&self, token: &str) -> Option<User> {
        self.by_token
            .get(token)
            .map(|index| self.users[*index].clone())
    }
}

#[cfg(test)]
pub(crate) fn test_users() -> Vec<UserConfig> {
    vec![
        UserConfig {
            id: 1,
            email: "luke@example.com".into(),
            nick_name: "farmboy".into(),
            external_id: 1,
            role: Role::User,
            api_token: "luke-token".into(),
        },
        UserConfig {
            id: 2,
            email: "leia@example.com".into(),
            nick_name: "princess".into(),
            external_id: 5,
            role: Role::User,
            api_token: "leia-token".into(),
        },
        UserConfig {
            id: 3,
            email: "admin@example.com".into(),
            nick_name: "admiral".into(),
            external_id: 10,
            role: Role::Admin,
            api_token: "admin-token".into(),
        },
    ]
}
