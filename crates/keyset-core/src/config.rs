//! Pagination engine configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_WINDOW;

// Configuration constants
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
const MIN_PAGE_SIZE: u32 = 1;
const MAX_PAGE_SIZE: u32 = 1000;

/// Settings shared by every request a [`Paginator`] serves.
///
/// ## Example
///
/// ```rust
/// use keyset_core::KeysetConfig;
///
/// let config = KeysetConfig::default()
///     .with_max_page_size(50)
///     .with_strict_ordering(true);
/// assert_eq!(config.max_page_size, 50);
/// ```
///
/// [`Paginator`]: crate::Paginator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
#[must_use = "configurations must be used to create a paginator"]
pub struct KeysetConfig {
    /// Largest page a single request may return (1-1000)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "keyset-max-page-size",
            env = "KEYSET_MAX_PAGE_SIZE",
            default_value = "100"
        )
    )]
    pub max_page_size: u32,

    /// Reject ordering entries that cannot be classified instead of dropping them
    #[cfg_attr(
        feature = "config",
        arg(long = "keyset-strict-ordering", env = "KEYSET_STRICT_ORDERING")
    )]
    pub strict_ordering: bool,

    /// Append the primary key when the declared ordering does not end with it
    #[cfg_attr(
        feature = "config",
        arg(
            long = "keyset-append-tie-breaker",
            env = "KEYSET_APPEND_TIE_BREAKER",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    pub append_tie_breaker: bool,

    /// Reject cursors issued under a different ordering
    #[cfg_attr(
        feature = "config",
        arg(
            long = "keyset-verify-fingerprint",
            env = "KEYSET_VERIFY_FINGERPRINT",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    pub verify_fingerprint: bool,
}

impl Default for KeysetConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            strict_ordering: false,
            append_tie_breaker: true,
            verify_fingerprint: true,
        }
    }
}

impl KeysetConfig {
    /// Sets the largest page a single request may return.
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Enables or disables rejecting unclassifiable ordering entries.
    pub fn with_strict_ordering(mut self, strict: bool) -> Self {
        self.strict_ordering = strict;
        self
    }

    /// Enables or disables appending the primary key as tie-breaker.
    pub fn with_append_tie_breaker(mut self, append: bool) -> Self {
        self.append_tie_breaker = append;
        self
    }

    /// Enables or disables the cursor ordering fingerprint check.
    pub fn with_verify_fingerprint(mut self, verify: bool) -> Self {
        self.verify_fingerprint = verify;
        self
    }

    /// Clamps out-of-range values into their valid ranges.
    pub fn validate(mut self) -> Self {
        let clamped = self.max_page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        if clamped != self.max_page_size {
            tracing::warn!(
                target: TRACING_TARGET_WINDOW,
                requested = self.max_page_size,
                clamped,
                "Max page size out of range"
            );
            self.max_page_size = clamped;
        }
        self
    }
}
