//! Domain layer - schema sets crossing the repository boundary
//!
//! Each entity has four shapes:
//! - **Model**: what callers receive back (always validated)
//! - **Insert**: what a new row needs
//! - **Filter**: exact-equality conditions, every field optional
//! - **Update**: the fields that may change after creation

pub mod payment;
pub mod user;
pub mod wireguard;

pub use payment::{
    PaymentFilter, PaymentInsert, PaymentMethod, PaymentModel, PaymentStatus, PaymentUpdate,
};
pub use user::{TelegramId, UserFilter, UserInsert, UserModel, UserUpdate};
pub use wireguard::{ConfigFilter, ConfigInsert, ConfigModel, ConfigUpdate};
