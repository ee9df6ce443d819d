//! WireGuard peer configuration schemas.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// `a.b.c.d/len` for any parseable IPv4 address with an optional prefix.
///
/// A bare address gets `/32`. Host bits are not checked here.
pub fn canonical_ipv4_network(value: &str) -> Option<String> {
    let value = value.trim();
    let (address, prefix) = value.split_once('/').unwrap_or((value, "32"));

    let address: Ipv4Addr = address.parse().ok()?;
    let prefix: u32 = prefix.parse().ok()?;
    (prefix <= 32).then(|| format!("{}/{}", address, prefix))
}

/// Checks `a.b.c.d/len` notation with no host bits set beyond the prefix.
pub fn validate_ipv4_network(value: &str) -> Result<(), ValidationError> {
    let invalid = || {
        let mut error = ValidationError::new("ipv4_network");
        error.message = Some(Cow::from("must be an IPv4 network in CIDR notation"));
        error
    };

    let canonical = canonical_ipv4_network(value).ok_or_else(invalid)?;
    let (address, prefix) = canonical.split_once('/').ok_or_else(invalid)?;
    let address: Ipv4Addr = address.parse().map_err(|_| invalid())?;
    let prefix: u32 = prefix.parse().map_err(|_| invalid())?;

    let host_mask = u32::MAX.checked_shr(prefix).unwrap_or(0);
    if u32::from(address) & host_mask != 0 {
        return Err(invalid());
    }

    Ok(())
}

/// Serde adapters that store every network in canonical notation, so
/// `10.8.0.2` and `10.8.0.2/32` bind to the same value. Unparseable input is
/// passed through untouched and left to [`validate_ipv4_network`].
mod network {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::canonical_ipv4_network;

    fn canonical(value: &str) -> String {
        canonical_ipv4_network(value).unwrap_or_else(|| value.to_string())
    }

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&canonical(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(canonical(&raw))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::canonical;

        pub fn serialize<S: Serializer>(
            value: &Option<String>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&canonical(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<String>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            Ok(raw.map(|value| canonical(&value)))
        }
    }
}

/// Persisted peer configuration
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConfigModel {
    pub id: i32,
    pub user_id: i32,
    #[validate(length(equal = 44))]
    pub private_key: String,
    #[validate(length(equal = 44))]
    pub public_key: String,
    #[validate(custom(function = "validate_ipv4_network"))]
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ConfigModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigModel")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .field("ip_address", &self.ip_address)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Fields accepted when issuing a configuration
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ConfigInsert {
    pub user_id: i32,
    #[validate(length(equal = 44))]
    pub private_key: String,
    #[validate(length(equal = 44))]
    pub public_key: String,
    #[serde(with = "network")]
    #[validate(custom(function = "validate_ipv4_network"))]
    pub ip_address: String,
}

impl std::fmt::Debug for ConfigInsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigInsert")
            .field("user_id", &self.user_id)
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .field("ip_address", &self.ip_address)
            .finish()
    }
}

/// Exact-match filter over configurations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 44))]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "network::option")]
    #[validate(custom(function = "validate_ipv4_network"))]
    pub ip_address: Option<String>,
}

impl ConfigFilter {
    pub fn by_id(id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}

/// Mutable configuration fields (key rotation, address change)
#[derive(Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 44))]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 44))]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "network::option")]
    #[validate(custom(function = "validate_ipv4_network"))]
    pub ip_address: Option<String>,
}

impl std::fmt::Debug for ConfigUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigUpdate")
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key)
            .field("ip_address", &self.ip_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WIREGUARD_KEY_LENGTH;

    const KEY: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";

    #[test]
    fn test_ipv4_network_validation() {
        assert!(validate_ipv4_network("10.8.0.0/24").is_ok());
        assert!(validate_ipv4_network("10.8.0.2/32").is_ok());
        assert!(validate_ipv4_network("10.8.0.2").is_ok());
        assert!(validate_ipv4_network("10.8.0.2/24").is_err());
        assert!(validate_ipv4_network("10.8.0.0/33").is_err());
        assert!(validate_ipv4_network("fd00::/64").is_err());
        assert!(validate_ipv4_network("not-an-ip").is_err());
    }

    #[test]
    fn test_bare_address_is_stored_with_host_prefix() {
        assert_eq!(canonical_ipv4_network("10.8.0.2").as_deref(), Some("10.8.0.2/32"));
        assert_eq!(canonical_ipv4_network(" 10.8.0.0/24 ").as_deref(), Some("10.8.0.0/24"));
        assert_eq!(canonical_ipv4_network("10.8.0.0/40"), None);

        let insert: ConfigInsert = serde_json::from_value(serde_json::json!({
            "user_id": 1,
            "private_key": KEY,
            "public_key": KEY,
            "ip_address": "10.8.0.2"
        }))
        .unwrap();
        assert_eq!(insert.ip_address, "10.8.0.2/32");

        let filter = ConfigFilter {
            ip_address: Some("10.8.0.3".to_string()),
            ..ConfigFilter::default()
        };
        assert_eq!(
            serde_json::to_value(filter).unwrap(),
            serde_json::json!({ "ip_address": "10.8.0.3/32" })
        );
    }

    #[test]
    fn test_key_length_is_enforced() {
        assert_eq!(KEY.len() as u64, WIREGUARD_KEY_LENGTH);

        let insert = ConfigInsert {
            user_id: 1,
            private_key: KEY.to_string(),
            public_key: "short".to_string(),
            ip_address: "10.8.0.2/32".to_string(),
        };
        let errors = insert.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("public_key"));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let insert = ConfigInsert {
            user_id: 1,
            private_key: KEY.to_string(),
            public_key: KEY.to_string().replace('y', "z"),
            ip_address: "10.8.0.2/32".to_string(),
        };
        assert!(!format!("{:?}", insert).contains(KEY));
    }
}
