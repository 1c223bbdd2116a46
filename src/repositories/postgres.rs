use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

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

/// PostgreSQL storage. Each call takes one pooled connection and returns it
/// when the call ends.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// Turns a unique violation into `Conflict`, anything else into `Database`.
fn unique_violation(e: tokio_postgres::Error, message: &str) -> AppError {
    if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(e)
    }
}

fn expect_one_row(affected: u64, message: &str) -> Result<()> {
    if affected == 0 {
        return Err(AppError::NotFound(message.to_string()));
    }
    Ok(())
}

const USER_NOT_FOUND: &str = "user not found to update";
const INTAKE_NOT_FOUND: &str = "no water consumption found at this timestamp";

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO usuarios
                    (nome, sobrenome, apelido, celular, email, sexo, data_nascimento, senha)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING matricula, nome, sobrenome, apelido, celular, email, sexo,
                          data_nascimento, senha, data_criacao
                "#,
            )
            .await?;
        let row = client
            .query_one(
                &statement,
                &[
                    &user.first_name,
                    &user.last_name,
                    &user.nickname,
                    &user.phone,
                    &user.email,
                    &user.sex,
                    &user.birth_date,
                    &user.password_hash,
                ],
            )
            .await
            .map_err(|e| unique_violation(e, "email already registered"))?;
        Ok(User::from(&row))
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<Credentials>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("SELECT matricula, senha FROM usuarios WHERE email = $1")
            .await?;
        let row = client.query_opt(&statement, &[&email]).await?;
        Ok(row.map(|r| Credentials {
            id: r.get("matricula"),
            password_hash: r.get("senha"),
        }))
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT matricula, nome, sobrenome, apelido, celular, email, sexo,
                       data_nascimento, senha, data_criacao
                FROM usuarios
                WHERE matricula = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&statement, &[&user_id]).await?;
        Ok(row.as_ref().map(User::from))
    }

    async fn update_account(&self, user_id: i32, changes: AccountChanges) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                UPDATE usuarios
                SET nome = $1, sobrenome = $2, apelido = $3, sexo = $4, data_nascimento = $5
                WHERE matricula = $6
                "#,
            )
            .await?;
        let affected = client
            .execute(
                &statement,
                &[
                    &changes.first_name,
                    &changes.last_name,
                    &changes.nickname,
                    &changes.sex,
                    &changes.birth_date,
                    &user_id,
                ],
            )
            .await?;
        expect_one_row(affected, USER_NOT_FOUND)
    }

    async fn update_phone(&self, user_id: i32, phone: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("UPDATE usuarios SET celular = $1 WHERE matricula = $2")
            .await?;
        let affected = client.execute(&statement, &[&phone, &user_id]).await?;
        expect_one_row(affected, USER_NOT_FOUND)
    }

    async fn update_email(&self, user_id: i32, email: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("UPDATE usuarios SET email = $1 WHERE matricula = $2")
            .await?;
        let affected = client
            .execute(&statement, &[&email, &user_id])
            .await
            .map_err(|e| unique_violation(e, "email already registered"))?;
        expect_one_row(affected, USER_NOT_FOUND)
    }

    async fn update_password(&self, user_id: i32, password_hash: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("UPDATE usuarios SET senha = $1 WHERE matricula = $2")
            .await?;
        let affected = client
            .execute(&statement, &[&password_hash, &user_id])
            .await?;
        expect_one_row(affected, USER_NOT_FOUND)
    }
}

#[async_trait]
impl WaterRepository for PgStore {
    async fn create_intake(&self, intake: &WaterIntake) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO historico_de_agua (usuario_matricula, data_consumo, quantidade)
                VALUES ($1, $2, $3)
                "#,
            )
            .await?;
        client
            .execute(
                &statement,
                &[&intake.user_id, &intake.consumed_at, &intake.amount],
            )
            .await
            .map_err(|e| unique_violation(e, "a consumption already exists at this timestamp"))?;
        Ok(())
    }

    async fn find_intake(
        &self,
        user_id: i32,
        consumed_at: DateTime<Utc>,
    ) -> Result<Option<WaterIntake>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT usuario_matricula, data_consumo, quantidade
                FROM historico_de_agua
                WHERE usuario_matricula = $1 AND data_consumo = $2
                "#,
            )
            .await?;
        let row = client
            .query_opt(&statement, &[&user_id, &consumed_at])
            .await?;
        Ok(row.as_ref().map(WaterIntake::from))
    }

    async fn update_intake(
        &self,
        user_id: i32,
        consumed_at: DateTime<Utc>,
        new_consumed_at: DateTime<Utc>,
        amount: i32,
    ) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                UPDATE historico_de_agua
                SET data_consumo = $1, quantidade = $2
                WHERE usuario_matricula = $3 AND data_consumo = $4
                "#,
            )
            .await?;
        let affected = client
            .execute(&statement, &[&new_consumed_at, &amount, &user_id, &consumed_at])
            .await
            .map_err(|e| unique_violation(e, "a consumption already exists at this timestamp"))?;
        expect_one_row(affected, INTAKE_NOT_FOUND)
    }

    async fn delete_intake(&self, user_id: i32, consumed_at: DateTime<Utc>) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                "DELETE FROM historico_de_agua WHERE usuario_matricula = $1 AND data_consumo = $2",
            )
            .await?;
        let affected = client
            .execute(&statement, &[&user_id, &consumed_at])
            .await?;
        expect_one_row(affected, INTAKE_NOT_FOUND)
    }

    async fn list_intakes(&self, user_id: i32, range: Range) -> Result<Vec<WaterIntake>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT usuario_matricula, data_consumo, quantidade
                FROM historico_de_agua
                WHERE usuario_matricula = $1 AND data_consumo >= $2 AND data_consumo < $3
                ORDER BY data_consumo ASC
                "#,
            )
            .await?;
        let rows = client
            .query(&statement, &[&user_id, &range.start, &range.end])
            .await?;
        Ok(rows.iter().map(WaterIntake::from).collect())
    }
}

#[async_trait]
impl SessionWhitelist for PgStore {
    async fn store(&self, user_id: i32, token: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("INSERT INTO lista_branca (usuario_matricula, token) VALUES ($1, $2)")
            .await?;
        client.execute(&statement, &[&user_id, &token]).await?;
        Ok(())
    }

    async fn revoke(&self, user_id: i32, token: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("DELETE FROM lista_branca WHERE usuario_matricula = $1 AND token = $2")
            .await?;
        let affected = client.execute(&statement, &[&user_id, &token]).await?;
        expect_one_row(affected, "no whitelisted token for this user")
    }

    async fn lookup(&self, token: &str) -> Result<i32> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("SELECT usuario_matricula FROM lista_branca WHERE token = $1 LIMIT 1")
            .await?;
        client
            .query_opt(&statement, &[&token])
            .await?
            .map(|row| row.get("usuario_matricula"))
            .ok_or_else(|| AppError::NotFound("token is not whitelisted".to_string()))
    }
}
