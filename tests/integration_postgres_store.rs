//! Runs against a live PostgreSQL instance:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use std::time::{SystemTime, UNIX_EPOCH};

use agua_api::{
    calendar,
    db,
    error::AppError,
    models::{user::NewUser, water::WaterIntake},
    repositories::{
        postgres::PgStore, user::UserRepository, water::WaterRepository,
        whitelist::SessionWhitelist,
    },
};
use chrono::{DateTime, NaiveDate, Utc};

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&url).unwrap();
    db::ensure_schema(&pool).await.unwrap();
    PgStore::new(pool)
}

fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}@example.com", prefix, nanos)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Rita".into(),
        last_name: "Lima".into(),
        nickname: "Rita".into(),
        phone: "41988887777".into(),
        email: email.into(),
        sex: "F".into(),
        birth_date: NaiveDate::from_ymd_opt(1992, 7, 20).unwrap(),
        password_hash: "hash".into(),
    }
}

fn at(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
}

#[tokio::test]
#[ignore]
async fn test_users_and_unique_email() {
    let store = store().await;
    let email = unique_email("rita");

    let user = store.create_user(new_user(&email)).await.unwrap();
    assert!(user.id > 0);
    assert_eq!(user.birth_date, NaiveDate::from_ymd_opt(1992, 7, 20).unwrap());

    assert!(matches!(
        store.create_user(new_user(&email)).await,
        Err(AppError::Conflict(_))
    ));

    let credentials = store.find_credentials_by_email(&email).await.unwrap().unwrap();
    assert_eq!(credentials.id, user.id);

    store.update_phone(user.id, "41911112222").await.unwrap();
    let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.phone, "41911112222");

    assert!(matches!(
        store.update_password(-1, "hash").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_intake_move_and_range_query() {
    let store = store().await;
    let user_id = store.create_user(new_user(&unique_email("agua"))).await.unwrap().id;

    for (instant, amount) in [
        ("2024-05-16T23:59:59Z", 100),
        ("2024-05-17T00:00:00Z", 200),
        ("2024-05-17T12:00:00Z", 300),
        ("2024-05-18T00:00:00Z", 400),
    ] {
        store
            .create_intake(&WaterIntake { user_id, consumed_at: at(instant), amount })
            .await
            .unwrap();
    }

    assert!(matches!(
        store
            .update_intake(user_id, at("2024-05-17T12:00:00Z"), at("2024-05-17T00:00:00Z"), 1)
            .await,
        Err(AppError::Conflict(_))
    ));

    store
        .update_intake(user_id, at("2024-05-17T12:00:00Z"), at("2024-05-17T18:30:00Z"), 350)
        .await
        .unwrap();
    assert!(store.find_intake(user_id, at("2024-05-17T12:00:00Z")).await.unwrap().is_none());

    let day = calendar::day_range(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()).unwrap();
    let amounts: Vec<i32> = store
        .list_intakes(user_id, day)
        .await
        .unwrap()
        .into_iter()
        .map(|intake| intake.amount)
        .collect();
    assert_eq!(amounts, vec![200, 350]);

    store.delete_intake(user_id, at("2024-05-18T00:00:00Z")).await.unwrap();
    assert!(matches!(
        store.delete_intake(user_id, at("2024-05-18T00:00:00Z")).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_whitelist_revoke_counts_rows() {
    let store = store().await;
    let user_id = store.create_user(new_user(&unique_email("sessao"))).await.unwrap().id;
    let token = format!("token-{}", unique_email("t"));

    store.store(user_id, &token).await.unwrap();
    assert_eq!(store.lookup(&token).await.unwrap(), user_id);

    assert!(matches!(
        store.revoke(user_id + 1, &token).await,
        Err(AppError::NotFound(_))
    ));

    store.revoke(user_id, &token).await.unwrap();
    assert!(matches!(store.lookup(&token).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        store.revoke(user_id, &token).await,
        Err(AppError::NotFound(_))
    ));
}
