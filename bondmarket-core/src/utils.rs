//! # Utility Functions
//!
//! Identifiers, hashing, fixed-point amount formatting and time helpers shared
//! by every component.

use crate::{error::Result, MarketError, UNIT, UNIT_DECIMALS};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Whether every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Deterministically derive a value from a human-readable label.
            pub fn from_label(label: &str) -> Self {
                let digest = sha256_bytes(&[label.as_bytes()]);
                let mut out = [0u8; $len];
                out.copy_from_slice(&digest[..$len]);
                Self(out)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = MarketError;

            fn from_str(s: &str) -> Result<Self> {
                let raw = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(raw)?;
                let array: [u8; $len] = bytes.try_into().map_err(|b: Vec<u8>| {
                    MarketError::Other(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $len,
                        b.len()
                    ))
                })?;
                Ok(Self(array))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// 20-byte account address. Traders, markets, adapters and the fee router
    /// all hold collateral under an address.
    Address,
    20
);

hex_id!(
    /// 32-byte caller-chosen salt that makes market addresses unique per factory.
    MarketKey,
    32
);

/// Hash a list of byte slices with SHA256
pub fn sha256_bytes(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Derive the address of a market from its factory, variant and key.
///
/// Two factories never collide for the same key because the factory address
/// and variant tag are part of the preimage.
pub fn derive_market_address(factory: &Address, variant_tag: &str, key: &MarketKey) -> Address {
    let digest = sha256_bytes(&[
        b"bondmarket/market",
        factory.as_bytes(),
        variant_tag.as_bytes(),
        key.as_bytes(),
    ]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[..20]);
    Address(out)
}

/// Render a fixed-point amount with trailing zeros trimmed (`20200000` -> `"20.2"`).
pub fn format_amount(amount: u128) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = UNIT_DECIMALS as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse a decimal string into fixed-point units. Extra precision is rejected.
pub fn parse_amount(text: &str) -> Result<u128> {
    let text = text.trim();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(MarketError::Other(format!("Invalid amount: {text:?}")));
    }
    if frac.len() > UNIT_DECIMALS as usize {
        return Err(MarketError::Other(format!(
            "Amount {text} has more than {UNIT_DECIMALS} decimals"
        )));
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| MarketError::Other(format!("Invalid amount: {text}")))?
    };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = UNIT_DECIMALS as usize);
        padded
            .parse()
            .map_err(|_| MarketError::Other(format!("Invalid amount: {text}")))?
    };
    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or(MarketError::Overflow("amount parsing"))
}

/// Current Unix time in seconds
pub fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Format timestamp as human-readable string
pub fn format_timestamp(timestamp: u64) -> String {
    use chrono::DateTime;
    let dt = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse a timestamp given as Unix seconds or RFC 3339 (`2025-01-01T00:00:00Z`).
pub fn parse_timestamp(timestamp_str: &str) -> Result<u64> {
    let text = timestamp_str.trim();
    if let Ok(seconds) = text.parse::<u64>() {
        return Ok(seconds);
    }
    chrono::DateTime::parse_from_rfc3339(text)
        .ok()
        .and_then(|dt| u64::try_from(dt.timestamp()).ok())
        .ok_or_else(|| MarketError::Other(format!("Invalid timestamp: {timestamp_str}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_and_parse() {
        let addr = Address::from_label("alice");
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(text[2..].parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_wrong_length() {
        assert!("0xabcd".parse::<Address>().is_err());
        assert!("not-hex".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_as_string() {
        let addr = Address::from_label("bob");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_label("x").is_zero());
    }

    #[test]
    fn test_market_address_depends_on_factory_and_key() {
        let f1 = Address::from_label("factory-1");
        let f2 = Address::from_label("factory-2");
        let k1 = MarketKey::from_label("btc-100k");
        let k2 = MarketKey::from_label("eth-10k");

        let a = derive_market_address(&f1, "binary", &k1);
        assert_eq!(a, derive_market_address(&f1, "binary", &k1));
        assert_ne!(a, derive_market_address(&f2, "binary", &k1));
        assert_ne!(a, derive_market_address(&f1, "binary", &k2));
        assert_ne!(a, derive_market_address(&f1, "scalar", &k1));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(20_200_000), "20.2");
        assert_eq!(format_amount(100 * UNIT), "100");
        assert_eq!(format_amount(1), "0.000001");
        assert_eq!(format_amount(0), "0");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("20.2").unwrap(), 20_200_000);
        assert_eq!(parse_amount("100").unwrap(), 100 * UNIT);
        assert_eq!(parse_amount(".5").unwrap(), UNIT / 2);
        assert!(parse_amount("1.0000001").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1735689600), "2025-01-01 00:00:00 UTC");
        assert_eq!(parse_timestamp("1735689600").unwrap(), 1735689600);
        assert_eq!(parse_timestamp("2025-01-01T00:00:00Z").unwrap(), 1735689600);
        assert!(parse_timestamp("soon").is_err());
    }
}
