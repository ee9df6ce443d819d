//! Service behaviour over a real (in-memory) store.

mod common;

use std::str::FromStr;

use rust_decimal::Decimal;

use common::{setup_db, wg_key};
use wg_provisioner::domain::{PaymentMethod, PaymentStatus};
use wg_provisioner::errors::ServiceError;
use wg_provisioner::infra::{Cache, Database};
use wg_provisioner::services::{
    ConfigService, PaymentService, ServiceContainer, Services, UserService,
};

async fn services() -> (Database, Services) {
    let db = setup_db().await;
    let services = Services::from_connection(db.get_connection(), Cache::disabled());
    (db, services)
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let (_db, services) = services().await;
    let users = services.users();

    let first = users.register(42).await.unwrap();
    let second = users.register(42).await.unwrap();

    assert_eq!(first, second);
    assert!(!first.is_active);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let (_db, services) = services().await;

    assert_eq!(
        services.users().get_user(999).await.unwrap_err(),
        ServiceError::NotFound
    );
    assert_eq!(
        services.users().remove_user(999).await.unwrap_err(),
        ServiceError::NotFound
    );
}

#[tokio::test]
async fn test_activation_is_visible_to_readers() {
    let (_db, services) = services().await;
    let users = services.users();

    users.register(43).await.unwrap();
    let activated = users.set_active(43, true).await.unwrap();
    assert!(activated.is_active);

    let fetched = users.get_user(43).await.unwrap();
    assert!(fetched.is_active);
}

#[tokio::test]
async fn test_payment_can_be_settled_once() {
    let (_db, services) = services().await;
    services.users().register(44).await.unwrap();
    let payments = services.payments();

    let payment = payments
        .create_payment(44, PaymentMethod::TelegramStars, Decimal::from_str("250.50").unwrap())
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Unpaid);

    let paid = payments.mark_paid(payment.id).await.unwrap();
    assert_eq!(paid.status, PaymentStatus::Paid);

    assert_eq!(
        payments.mark_paid(payment.id).await.unwrap_err(),
        ServiceError::DataConflict
    );
    assert_eq!(payments.list_payments(44).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_payment_for_unknown_user_is_not_found() {
    let (_db, services) = services().await;

    let result = services
        .payments()
        .create_payment(45, PaymentMethod::Card, Decimal::from_str("10.00").unwrap())
        .await;

    assert_eq!(result.unwrap_err(), ServiceError::NotFound);
}

#[tokio::test]
async fn test_config_requires_active_user_and_free_address() {
    let (_db, services) = services().await;
    let configs = services.configs();
    services.users().register(46).await.unwrap();

    let forbidden = configs
        .issue_config(46, wg_key('a'), wg_key('b'), "10.8.0.2/32".to_string())
        .await;
    assert_eq!(forbidden.unwrap_err(), ServiceError::Forbidden);

    services.users().set_active(46, true).await.unwrap();
    let config = configs
        .issue_config(46, wg_key('a'), wg_key('b'), "10.8.0.2/32".to_string())
        .await
        .unwrap();
    assert_eq!(config.ip_address, "10.8.0.2/32");

    let conflict = configs
        .issue_config(46, wg_key('c'), wg_key('d'), "10.8.0.2/32".to_string())
        .await;
    assert_eq!(conflict.unwrap_err(), ServiceError::DataConflict);

    let revoked = configs.revoke_config(config.id).await.unwrap();
    assert_eq!(revoked.id, config.id);
    assert!(configs.list_configs(46).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_an_internal_error() {
    let (_db, services) = services().await;
    services.users().register(47).await.unwrap();
    services.users().set_active(47, true).await.unwrap();

    let result = services
        .configs()
        .issue_config(47, "too-short".to_string(), wg_key('e'), "10.8.0.3/32".to_string())
        .await;

    assert_eq!(result.unwrap_err(), ServiceError::Internal);
}

#[tokio::test]
async fn test_removing_user_drops_its_records() {
    let (_db, services) = services().await;
    services.users().register(48).await.unwrap();
    services
        .payments()
        .create_payment(48, PaymentMethod::Sbp, Decimal::from_str("99.50").unwrap())
        .await
        .unwrap();

    services.users().remove_user(48).await.unwrap();

    assert_eq!(
        services.payments().list_payments(48).await.unwrap_err(),
        ServiceError::NotFound
    );
}

#[tokio::test]
async fn test_same_address_in_either_notation_conflicts() {
    let (_db, services) = services().await;
    let configs = services.configs();
    services.users().register(49).await.unwrap();
    services.users().set_active(49, true).await.unwrap();

    let config = configs
        .issue_config(49, wg_key('f'), wg_key('g'), "10.8.0.9".to_string())
        .await
        .unwrap();
    assert_eq!(config.ip_address, "10.8.0.9/32");

    let again = configs
        .issue_config(49, wg_key('h'), wg_key('i'), "10.8.0.9/32".to_string())
        .await;
    assert_eq!(again.unwrap_err(), ServiceError::DataConflict);
    assert_eq!(configs.list_configs(49).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_settling_unknown_payment_is_not_found() {
    let (_db, services) = services().await;

    assert_eq!(
        services.payments().mark_paid(12345).await.unwrap_err(),
        ServiceError::NotFound
    );
}
