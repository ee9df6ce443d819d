//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate typed repositories through units of work. Each
//! service is an `async_trait` behind which the concrete implementation
//! runs every operation through the error boundary.

pub mod container;
pub mod error_boundary;
mod config_service;
mod payment_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use config_service::{ConfigManager, ConfigService};
pub use payment_service::{PaymentManager, PaymentService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use config_service::MockConfigService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_service::MockPaymentService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
