use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    calendar::Range,
    error::{AppError, Result},
    models::{
        user::{AccountChanges, Credentials, NewUser, User},
        water::WaterIntake,
    },
    repositories::{
        user::UserRepository, water::WaterRepository, whitelist::SessionWhitelist,
    },
};

/// Process-local storage used when no database is configured.
///
/// Mirrors the constraints of the PostgreSQL schema: unique emails, one record
/// per user and instant, ids assigned from 1.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_user_id: i32,
    users: BTreeMap<i32, User>,
    intakes: BTreeMap<(i32, DateTime<Utc>), i32>,
    whitelist: Vec<(i32, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn user_mut(&mut self, user_id: i32) -> Result<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("user not found to update".to_string()))
    }
}

fn intake_not_found() -> AppError {
    AppError::NotFound("no water consumption found at this timestamp".to_string())
}

fn intake_conflict() -> AppError {
    AppError::Conflict("a consumption already exists at this timestamp".to_string())
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&user.email, None) {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        inner.last_user_id += 1;
        let stored = User {
            id: inner.last_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            nickname: user.nickname,
            phone: user.phone,
            email: user.email,
            sex: user.sex,
            birth_date: user.birth_date,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<Credentials>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| Credentials {
                id: u.id,
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn update_account(&self, user_id: i32, changes: AccountChanges) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;
        user.first_name = changes.first_name;
        user.last_name = changes.last_name;
        user.nickname = changes.nickname;
        user.sex = changes.sex;
        user.birth_date = changes.birth_date;
        Ok(())
    }

    async fn update_phone(&self, user_id: i32, phone: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.user_mut(user_id)?.phone = phone.to_string();
        Ok(())
    }

    async fn update_email(&self, user_id: i32, email: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(email, Some(user_id)) {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        inner.user_mut(user_id)?.email = email.to_string();
        Ok(())
    }

    async fn update_password(&self, user_id: i32, password_hash: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.user_mut(user_id)?.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl WaterRepository for MemoryStore {
    async fn create_intake(&self, intake: &WaterIntake) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&intake.user_id) {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        let key = (intake.user_id, intake.consumed_at);
        if inner.intakes.contains_key(&key) {
            return Err(intake_conflict());
        }
        inner.intakes.insert(key, intake.amount);
        Ok(())
    }

    async fn find_intake(
        &self,
        user_id: i32,
        consumed_at: DateTime<Utc>,
    ) -> Result<Option<WaterIntake>> {
        let inner = self.inner.read().await;
        Ok(inner
            .intakes
            .get(&(user_id, consumed_at))
            .map(|&amount| WaterIntake {
                user_id,
                consumed_at,
                amount,
            }))
    }

    async fn update_intake(
        &self,
        user_id: i32,
        consumed_at: DateTime<Utc>,
        new_consumed_at: DateTime<Utc>,
        amount: i32,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.intakes.contains_key(&(user_id, consumed_at)) {
            return Err(intake_not_found());
        }
        if new_consumed_at != consumed_at && inner.intakes.contains_key(&(user_id, new_consumed_at))
        {
            return Err(intake_conflict());
        }
        inner.intakes.remove(&(user_id, consumed_at));
        inner.intakes.insert((user_id, new_consumed_at), amount);
        Ok(())
    }

    async fn delete_intake(&self, user_id: i32, consumed_at: DateTime<Utc>) -> Result<()> {
        self.inner
            .write()
            .await
            .intakes
            .remove(&(user_id, consumed_at))
            .map(|_| ())
            .ok_or_else(intake_not_found)
    }

    async fn list_intakes(&self, user_id: i32, range: Range) -> Result<Vec<WaterIntake>> {
        let inner = self.inner.read().await;
        Ok(inner
            .intakes
            .range((user_id, range.start)..(user_id, range.end))
            .map(|(&(user_id, consumed_at), &amount)| WaterIntake {
                user_id,
                consumed_at,
                amount,
            })
            .collect())
    }
}

#[async_trait]
impl SessionWhitelist for MemoryStore {
    async fn store(&self, user_id: i32, token: &str) -> Result<()> {
        self.inner
            .write()
            .await
            .whitelist
            .push((user_id, token.to_string()));
        Ok(())
    }

    async fn revoke(&self, user_id: i32, token: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.whitelist.len();
        inner
            .whitelist
            .retain(|(id, stored)| !(*id == user_id && stored == token));
        if inner.whitelist.len() == before {
            return Err(AppError::NotFound(
                "no whitelisted token for this user".to_string(),
            ));
        }
        Ok(())
    }

    async fn lookup(&self, token: &str) -> Result<i32> {
        self.inner
            .read()
            .await
            .whitelist
            .iter()
            .find(|(_, stored)| stored == token)
            .map(|(id, _)| *id)
            .ok_or_else(|| AppError::NotFound("token is not whitelisted".to_string()))
    }
}
