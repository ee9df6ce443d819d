//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Environment file read before the process environment (process wins)
pub const ENV_FILE_PATH: &str = "env/.env";

/// Mode value that clears old log files on start
pub const MODE_TEST: &str = "TEST";

// =============================================================================
// Database
// =============================================================================

/// Default database user (for development)
pub const DEFAULT_DB_USER: &str = "postgres";

/// Default database host (for development)
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default database port
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default database name
pub const DEFAULT_DB_NAME: &str = "wg_provisioner";

/// Default connection pool size
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Cache (Redis)
// =============================================================================

/// Default cache TTL in seconds (1 hour)
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

/// Upper bound for a single cache round trip
pub const DEFAULT_CACHE_TIMEOUT_MS: u64 = 500;

/// Prefix of every cached operation result
pub const CACHE_PREFIX: &str = "cache";

/// Maximum cache key length
pub const CACHE_KEY_MAX_LEN: usize = 200;

// =============================================================================
// Logging
// =============================================================================

/// Default log directory
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log file name inside the log directory
pub const LOG_FILE_NAME: &str = "service.log";

/// Default log level when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Validation
// =============================================================================

/// Length of a base64-encoded 256-bit WireGuard key
pub const WIREGUARD_KEY_LENGTH: u64 = 44;

/// Marker for masked values in error payloads
pub const MASKED_VALUE: &str = "***MASKED***";

/// Keys whose values never appear in rendered errors (substring match)
pub const SENSITIVE_KEY_MARKERS: &[&str] = &["password", "private_key"];
