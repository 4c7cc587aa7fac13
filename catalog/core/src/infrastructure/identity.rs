// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::repository::RepositoryError;
use crate::domain::user::{IdentityProvider, Role, UserId};

/// Role directory held in memory.
///
/// Unknown users resolve to [`Role::Visitor`], the role with no privileges.
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    roles: Arc<RwLock<HashMap<UserId, Role>>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: impl IntoIterator<Item = (UserId, Role)>) -> Self {
        Self {
            roles: Arc::new(RwLock::new(roles.into_iter().collect())),
        }
    }

    pub async fn assign(&self, user_id: UserId, role: Role) {
        self.roles.write().await.insert(user_id, role);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn role_of(&self, user_id: UserId) -> Result<Role, RepositoryError> {
        Ok(self
            .roles
            .read()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }
}
