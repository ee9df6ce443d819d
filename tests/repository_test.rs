//! Repository tests against an in-memory SQLite database.

mod common;

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

use common::{setup_db, wg_key};
use wg_provisioner::domain::{
    ConfigFilter, ConfigInsert, PaymentFilter, PaymentInsert, PaymentMethod, PaymentStatus,
    PaymentUpdate, UserFilter, UserInsert, UserUpdate,
};
use wg_provisioner::errors::AppError;
use wg_provisioner::infra::repositories::entities::UserEntity;
use wg_provisioner::infra::repositories::{CrudRepository, Direction, Fields, SqlRepository};
use wg_provisioner::infra::{
    ConfigRepository, Payload, PaymentRepository, UnitOfWork, UserRepository,
};

async fn count_users(conn: &DatabaseConnection) -> usize {
    UserRepository::<DatabaseConnection>::new(conn)
        .get_all(UserFilter::default())
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_insert_and_get_one_round_trip() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    let created = users.insert(UserInsert::new(1001)).await.unwrap();
    assert_eq!(created.telegram_id, 1001);
    assert!(!created.is_active);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = users
        .get_one(UserFilter::by_telegram_id(1001))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_missing_field_fails_input_validation_without_writing() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    let error = users
        .insert(Payload::raw(json!({ "is_active": true })))
        .await
        .unwrap_err();

    match error {
        AppError::Validation(error) => {
            assert_eq!(error.method, "insert");
            assert_eq!(error.direction, Direction::Input);
            assert_eq!(error.errors[0].field, "telegram_id");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(count_users(conn).await, 0);
}

#[tokio::test]
async fn test_raw_and_schema_inputs_are_equivalent() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    let raw = users
        .insert(Payload::raw(json!({ "telegram_id": 7, "is_active": true })))
        .await
        .unwrap();
    let typed = users
        .get_one(UserFilter {
            telegram_id: Some(7),
            is_active: Some(true),
            ..UserFilter::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw, typed);

    let unknown = users.get_one(Payload::raw(json!({ "email": "x" }))).await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_insert_or_ignore_skips_duplicates() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    let first = users.insert_or_ignore(UserInsert::new(55)).await.unwrap();
    assert!(first.is_some());

    let second = users.insert_or_ignore(UserInsert::new(55)).await.unwrap();
    assert!(second.is_none());
    assert_eq!(count_users(conn).await, 1);
}

#[tokio::test]
async fn test_plain_insert_of_duplicate_is_a_store_error() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    users.insert(UserInsert::new(56)).await.unwrap();
    let duplicate = users.insert(UserInsert::new(56)).await;

    assert!(matches!(duplicate, Err(AppError::Database(_))));
}

#[tokio::test]
async fn test_update_changes_fields_and_touches_updated_at() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    let created = users.insert(UserInsert::new(77)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let updated = users
        .update(UserFilter::by_id(created.id), UserUpdate::active(true))
        .await
        .unwrap()
        .unwrap();

    assert!(updated.is_active);
    assert_eq!(updated.telegram_id, 77);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_update_and_delete_without_match_return_none() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);

    let updated = users
        .update(UserFilter::by_telegram_id(404), UserUpdate::active(true))
        .await
        .unwrap();
    assert!(updated.is_none());

    let deleted = users.delete(UserFilter::by_telegram_id(404)).await.unwrap();
    assert!(deleted.is_none());
}

#[tokio::test]
async fn test_get_all_applies_every_filter() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);
    let payments = PaymentRepository::<DatabaseConnection>::new(conn);

    let user = users.insert(UserInsert::new(9)).await.unwrap();
    for (method, amount) in [
        (PaymentMethod::Card, "250.50"),
        (PaymentMethod::Sbp, "100.25"),
        (PaymentMethod::Card, "75.75"),
    ] {
        payments
            .insert(PaymentInsert {
                user_id: user.id,
                status: PaymentStatus::Unpaid,
                payment_method: method,
                amount: Decimal::from_str(amount).unwrap(),
            })
            .await
            .unwrap();
    }

    let all = payments.get_all(PaymentFilter::by_user(user.id)).await.unwrap();
    assert_eq!(all.len(), 3);

    let cards = payments
        .get_all(PaymentFilter {
            user_id: Some(user.id),
            payment_method: Some(PaymentMethod::Card),
            ..PaymentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards
        .iter()
        .any(|p| p.amount == Decimal::from_str("250.50").unwrap()));

    let none = payments
        .get_all(PaymentFilter {
            status: Some(PaymentStatus::Paid),
            ..PaymentFilter::default()
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_payment_status_update() {
    let db = setup_db().await;
    let conn = db.connection();
    let user = UserRepository::<DatabaseConnection>::new(conn)
        .insert(UserInsert::new(10))
        .await
        .unwrap();
    let payments = PaymentRepository::<DatabaseConnection>::new(conn);

    let payment = payments
        .insert(PaymentInsert {
            user_id: user.id,
            status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::Bitcoin,
            amount: Decimal::from_str("0.5").unwrap(),
        })
        .await
        .unwrap();

    let paid = payments
        .update(
            PaymentFilter::by_id(payment.id),
            PaymentUpdate::status(PaymentStatus::Paid),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(paid.status, PaymentStatus::Paid);
    assert_eq!(paid.payment_method, PaymentMethod::Bitcoin);
}

#[tokio::test]
async fn test_deleting_user_cascades() {
    let db = setup_db().await;
    let conn = db.connection();
    let users = UserRepository::<DatabaseConnection>::new(conn);
    let configs = ConfigRepository::<DatabaseConnection>::new(conn);

    let user = users.insert(UserInsert::new(31)).await.unwrap();
    configs
        .insert(ConfigInsert {
            user_id: user.id,
            private_key: wg_key('a'),
            public_key: wg_key('b'),
            ip_address: "10.0.0.2/32".to_string(),
        })
        .await
        .unwrap();

    let deleted = users.delete(UserFilter::by_id(user.id)).await.unwrap();
    assert_eq!(deleted.map(|u| u.id), Some(user.id));

    let left = configs.get_all(ConfigFilter::by_user(user.id)).await.unwrap();
    assert!(left.is_empty());
}

#[tokio::test]
async fn test_invalid_config_never_reaches_the_store() {
    let db = setup_db().await;
    let conn = db.connection();
    let user = UserRepository::<DatabaseConnection>::new(conn)
        .insert(UserInsert::new(32))
        .await
        .unwrap();
    let configs = ConfigRepository::<DatabaseConnection>::new(conn);

    let secret = "short-secret";
    let error = configs
        .insert(ConfigInsert {
            user_id: user.id,
            private_key: secret.to_string(),
            public_key: wg_key('c'),
            ip_address: "10.0.0.3/24".to_string(),
        })
        .await
        .unwrap_err();

    let rendered = error.to_string();
    assert!(rendered.starts_with("Validation failed in insert (input):"));
    assert!(rendered.contains("ip_address"));
    assert!(!rendered.contains(secret));

    let stored = configs.get_all(ConfigFilter::by_user(user.id)).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_config_addresses_are_unique_across_notations() {
    let db = setup_db().await;
    let conn = db.connection();
    let user = UserRepository::<DatabaseConnection>::new(conn)
        .insert(UserInsert::new(33))
        .await
        .unwrap();
    let configs = ConfigRepository::<DatabaseConnection>::new(conn);
    let config = |ip: &str, seed: char| ConfigInsert {
        user_id: user.id,
        private_key: wg_key(seed),
        public_key: wg_key(seed),
        ip_address: ip.to_string(),
    };

    let stored = configs.insert(config("10.0.0.7", 'a')).await.unwrap();
    assert_eq!(stored.ip_address, "10.0.0.7/32");

    let ignored = configs
        .insert_or_ignore(config("10.0.0.7/32", 'b'))
        .await
        .unwrap();
    assert!(ignored.is_none());

    let duplicate = configs.insert(config("10.0.0.7", 'c')).await;
    assert!(matches!(duplicate, Err(AppError::Database(_))));

    let found = configs
        .get_one(ConfigFilter {
            ip_address: Some("10.0.0.7".to_string()),
            ..ConfigFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(found.map(|c| c.id), Some(stored.id));
}

#[tokio::test]
async fn test_untyped_repository_uses_column_names() {
    let db = setup_db().await;
    let conn = db.connection();
    let txn = conn.begin().await.unwrap();

    {
        let users = SqlRepository::<UserEntity, _>::new(&txn);

        let mut data = Fields::new();
        data.insert("telegram_id".into(), json!(500));
        data.insert("is_active".into(), json!(true));
        let row = users.insert(data).await.unwrap();
        assert_eq!(row.telegram_id, 500);

        let mut bogus = Fields::new();
        bogus.insert("nickname".into(), json!("x"));
        assert!(matches!(
            users.get_one(bogus).await,
            Err(AppError::Database(_))
        ));
    }

    txn.rollback().await.unwrap();
    assert_eq!(count_users(conn).await, 0);
}

#[tokio::test]
async fn test_repositories_from_unit_of_work_share_the_transaction() {
    let db = setup_db().await;

    let mut uow = UnitOfWork::begin(db.connection()).await.unwrap();
    let user = uow.users().unwrap().insert(UserInsert::new(88)).await.unwrap();
    let seen = uow
        .users()
        .unwrap()
        .get_one(UserFilter::by_id(user.id))
        .await
        .unwrap();
    assert!(seen.is_some());
    uow.commit().await.unwrap();
    uow.close().await.unwrap();

    assert_eq!(count_users(db.connection()).await, 1);
}
