//! Integer-paise money representation.
//!
//! # Design invariant
//!
//! All amounts inside the engine are `i64` integer paise (1 rupee =
//! 100 paise). The backend wire carries fractional rupees as JSON numbers;
//! `f64` appears **only** at the (de)serialization boundary:
//!
//! | Direction           | Function            |
//! |---------------------|---------------------|
//! | internal → wire     | [`paise_to_rupees`] |
//! | wire → internal     | [`rupees_to_paise`] |
//!
//! No other code path should produce or consume `f64` amounts.

/// Scale factor: 1 rupee = 100 paise.
pub const PAISE_PER_RUPEE: i64 = 100;

/// Errors returned by [`rupees_to_paise`] when the wire value is not
/// representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Input was `NaN` or infinite; a broken upstream must not propagate
    /// into the internal `i64` representation.
    NotFinite,
    /// Input would overflow `i64` after scaling by [`PAISE_PER_RUPEE`].
    OutOfRange,
}

impl std::fmt::Display for MoneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoneyError::NotFinite => write!(f, "rupees_to_paise: non-finite input (NaN or Inf)"),
            MoneyError::OutOfRange => {
                write!(f, "rupees_to_paise: amount out of i64 range after scaling")
            }
        }
    }
}

impl std::error::Error for MoneyError {}

/// Convert integer paise to `f64` rupees for wire serialization.
pub fn paise_to_rupees(paise: i64) -> f64 {
    paise as f64 / PAISE_PER_RUPEE as f64
}

/// Convert an `f64` rupee amount received on the wire into integer paise,
/// rounding to the nearest paisa.
///
/// # Errors
/// [`MoneyError::NotFinite`] for `NaN`/infinite input; [`MoneyError::OutOfRange`]
/// if the scaled amount would overflow `i64`. Both fire in all build profiles.
pub fn rupees_to_paise(rupees: f64) -> Result<i64, MoneyError> {
    if !rupees.is_finite() {
        return Err(MoneyError::NotFinite);
    }
    let scaled = rupees * PAISE_PER_RUPEE as f64;
    // Rust f64→i64 casts saturate; reject out-of-range explicitly instead.
    if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
        return Err(MoneyError::OutOfRange);
    }
    Ok(scaled.round() as i64)
}

/// serde adapter: an `i64` paise field carried as fractional rupees on the
/// wire. Used via `#[serde(with = "paise_as_rupees")]`.
pub(crate) mod paise_as_rupees {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(paise: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::paise_to_rupees(*paise))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let rupees = f64::deserialize(deserializer)?;
        super::rupees_to_paise(rupees).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_whole_rupees() {
        let paise = 120 * PAISE_PER_RUPEE;
        assert_eq!(rupees_to_paise(paise_to_rupees(paise)).unwrap(), paise);
    }

    #[test]
    fn round_trip_fractional_amount() {
        // Rs 99.50, a typical menu total with half-rupee pricing
        let paise = 9_950_i64;
        assert_eq!(rupees_to_paise(paise_to_rupees(paise)).unwrap(), paise);
    }

    #[test]
    fn rounds_to_nearest_paisa() {
        assert_eq!(rupees_to_paise(0.005).unwrap(), 1);
        assert_eq!(rupees_to_paise(10.004).unwrap(), 1_000);
    }

    #[test]
    fn nan_and_inf_are_rejected() {
        assert_eq!(rupees_to_paise(f64::NAN), Err(MoneyError::NotFinite));
        assert_eq!(rupees_to_paise(f64::INFINITY), Err(MoneyError::NotFinite));
        assert_eq!(rupees_to_paise(f64::NEG_INFINITY), Err(MoneyError::NotFinite));
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(rupees_to_paise(f64::MAX), Err(MoneyError::OutOfRange));
    }
}
