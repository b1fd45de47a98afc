//! Order status enumeration.
//!
//! # Design
//!
//! The backend emits status strings with inconsistent casing (`"pending"`,
//! `"PENDING"`, padded whitespace), so every string entering the engine is
//! normalized (uppercase + trim) before comparison. A string that still
//! does not match the closed enumeration becomes [`OrderStatus::Unknown`]
//! carrying the original text: unknown statuses are surfaced and logged,
//! never silently collapsed into a default.
//!
//! `COMPLETED` is a terminal alias of `DELIVERED`: the kitchen flow finishes
//! orders with a complete call while customer tracking expects `DELIVERED`.
//! The engine treats them as the same terminal stage (same forward index).

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// All statuses an order can report, plus `Unknown` for unrecognized wire
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    /// Handed over to the customer. **Terminal.**
    Delivered,
    /// Terminal alias of [`Delivered`][`OrderStatus::Delivered`] used by the
    /// kitchen flow.
    Completed,
    /// Cancelled by either side. **Terminal.**
    Cancelled,
    /// Unrecognized wire string, preserved verbatim for diagnosis.
    Unknown(String),
}

impl OrderStatus {
    /// Normalize a raw wire string into a status.
    ///
    /// Unrecognized values are logged at warn and preserved as `Unknown`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "CONFIRMED" => Self::Confirmed,
            "PREPARING" => Self::Preparing,
            "READY" => Self::Ready,
            "DELIVERED" => Self::Delivered,
            "COMPLETED" => Self::Completed,
            "CANCELLED" => Self::Cancelled,
            _ => {
                warn!(status = raw, "unrecognized order status from backend");
                Self::Unknown(raw.to_string())
            }
        }
    }

    /// Canonical wire spelling. `Unknown` echoes the original text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Completed | Self::Cancelled)
    }

    /// Position on the forward path `PENDING → CONFIRMED → PREPARING →
    /// READY → DELIVERED`. `Completed` shares `Delivered`'s index;
    /// `Cancelled` and `Unknown` are off the path.
    pub fn forward_index(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::Delivered | Self::Completed => Some(4),
            Self::Cancelled | Self::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = OrderStatus;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an order status string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(OrderStatus::normalize(v))
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(OrderStatus::normalize(" preparing "), OrderStatus::Preparing);
        assert_eq!(OrderStatus::normalize("PENDING"), OrderStatus::Pending);
        assert_eq!(OrderStatus::normalize("cancelled"), OrderStatus::Cancelled);
    }

    #[test]
    fn unrecognized_string_is_preserved_not_defaulted() {
        let s = OrderStatus::normalize("REFUNDED");
        assert_eq!(s, OrderStatus::Unknown("REFUNDED".to_string()));
        assert_eq!(s.as_str(), "REFUNDED");
        assert!(!s.is_terminal());
        assert_eq!(s.forward_index(), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn completed_aliases_delivered_on_the_forward_path() {
        assert_eq!(
            OrderStatus::Completed.forward_index(),
            OrderStatus::Delivered.forward_index()
        );
    }

    #[test]
    fn serde_round_trip_canonical_and_unknown() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");

        let back: OrderStatus = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(back, OrderStatus::Ready);

        let odd: OrderStatus = serde_json::from_str("\"ON_HOLD\"").unwrap();
        assert_eq!(serde_json::to_string(&odd).unwrap(), "\"ON_HOLD\"");
    }
}
