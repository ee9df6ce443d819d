//! User schemas.
//!
//! `telegram_id` is immutable after creation, so [`UserUpdate`] only carries
//! the active flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Persisted user as seen by callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserModel {
    pub id: i32,
    #[validate(range(min = 1))]
    pub telegram_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserInsert {
    #[validate(range(min = 1, message = "telegram_id must be positive"))]
    pub telegram_id: i64,
    #[serde(default)]
    pub is_active: bool,
}

impl UserInsert {
    /// New inactive user
    pub fn new(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            is_active: false,
        }
    }
}

/// Exact-match filter over users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub telegram_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn by_id(id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_telegram_id(telegram_id: i64) -> Self {
        Self {
            telegram_id: Some(telegram_id),
            ..Self::default()
        }
    }
}

/// Mutable user fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
        }
    }
}

/// Registration request and response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TelegramId {
    /// Telegram account identifier
    #[validate(range(min = 1, message = "telegram_id must be positive"))]
    #[schema(example = 123456789)]
    pub telegram_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_defaults_to_inactive() {
        let insert: UserInsert = serde_json::from_value(json!({ "telegram_id": 42 })).unwrap();
        assert_eq!(insert, UserInsert::new(42));
    }

    #[test]
    fn test_insert_rejects_unknown_fields() {
        let result =
            serde_json::from_value::<UserInsert>(json!({ "telegram_id": 42, "id": 7 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_cannot_touch_telegram_id() {
        let result = serde_json::from_value::<UserUpdate>(json!({ "telegram_id": 42 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_serializes_only_set_fields() {
        let value = serde_json::to_value(UserFilter::by_telegram_id(9)).unwrap();
        assert_eq!(value, json!({ "telegram_id": 9 }));
    }

    #[test]
    fn test_non_positive_telegram_id_is_invalid() {
        assert!(UserInsert::new(0).validate().is_err());
        assert!(TelegramId { telegram_id: -5 }.validate().is_err());
    }
}
