//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where a LineItemId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(CategoryId);
define_id!(PersonalizationId);
define_id!(OptionId);
define_id!(PromotionId);
define_id!(LineItemId);
define_id!(OrderId);
define_id!(TableId);

impl OrderId {
    /// Short human-readable reference used in outbound messages.
    ///
    /// Six base-36 characters from an FNV-1a hash of the whole id, so ids that
    /// share a suffix still get different numbers. Stable across releases.
    pub fn short_ref(&self) -> String {
        const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        const LEN: u32 = 6;

        let mut n = fnv1a(self.0.as_bytes()) % 36_u64.pow(LEN);
        let mut out = [b'0'; LEN as usize];
        for slot in out.iter_mut().rev() {
            *slot = ALPHABET[(n % 36) as usize];
            n /= 36;
        }
        out.iter().map(|&b| b as char).collect()
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Generate a unique ID from a timestamp and a process-wide counter.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    format!("{:x}{:04x}", timestamp, counter & 0xffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation_is_unique() {
        let id1 = LineItemId::generate();
        let id2 = LineItemId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_from_string() {
        let id: ProductId = "prod-456".into();
        assert_eq!(id.as_str(), "prod-456");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OptionId::new("opt-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"opt-1\"");
    }

    #[test]
    fn test_order_short_ref() {
        assert_eq!(OrderId::new("18c2f0a9b3d1e7").short_ref(), "DCF2W1");
        assert_eq!(OrderId::new("ab").short_ref(), "30USMI");
        assert_eq!(OrderId::new("").short_ref().len(), 6);
    }

    #[test]
    fn test_order_short_ref_ignores_shared_suffix() {
        // Ids from separate runs end in the same counter digits.
        let a = OrderId::new("18c2f0a9b3000001");
        let b = OrderId::new("18c2f0a9c4000001");
        assert_ne!(a.short_ref(), b.short_ref());
    }

    #[test]
    fn test_order_numbers_distinct_across_runs() {
        // First order of 1000 separate runs: same counter, nearby timestamps.
        let numbers: std::collections::HashSet<String> = (0..1000_u64)
            .map(|i| {
                let timestamp = 0x18c2_f0a9_b3d1_e700_u64 + i * 7919;
                OrderId::new(format!("{:x}{:04x}", timestamp, 1)).short_ref()
            })
            .collect();
        assert_eq!(numbers.len(), 1000);
    }
}
