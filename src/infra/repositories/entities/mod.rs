//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain schemas.

pub mod payment;
pub mod user;
pub mod wireguard_config;

pub use payment::Entity as PaymentEntity;
pub use user::Entity as UserEntity;
pub use wireguard_config::Entity as ConfigEntity;
