//! # Token Amounts
//!
//! Two value types keep scaled integers and display decimals apart:
//!
//! - `Planck`: the on-chain integer amount (smallest indivisible unit).
//!   All summation happens here.
//! - `DisplayAmount`: an exact fixed-point decimal produced only at the
//!   presentation boundary via `Planck::to_display_units`.
//!
//! No floating point is involved anywhere, so summing thousands of
//! nominator stakes cannot drift.

use primitive_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::AmountError;

/// Largest decimal scale accepted for display conversion.
///
/// Substrate chains use 10-18 decimals; anything above this is a
/// misconfigured network rather than a real token.
pub const MAX_UNITS: u8 = 38;

// =============================================================================
// PLANCK
// =============================================================================

/// An on-chain balance in planck (scaled integer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Planck(U256);

impl Planck {
    /// Zero planck.
    pub const ZERO: Planck = Planck(U256([0; 4]));

    /// Wrap a raw `U256`.
    #[must_use]
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// The inner integer.
    #[must_use]
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Saturating addition. Balances never wrap.
    #[must_use]
    pub fn saturating_add(self, other: Planck) -> Planck {
        Planck(self.0.saturating_add(other.0))
    }

    /// Convert to display units with `units` decimals.
    ///
    /// Called only at presentation boundaries, never mid-computation.
    pub fn to_display_units(self, units: u8) -> Result<DisplayAmount, AmountError> {
        DisplayAmount::new(self, units)
    }
}

impl From<u64> for Planck {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Planck {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Planck {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl std::iter::Sum for Planck {
    fn sum<I: Iterator<Item = Planck>>(iter: I) -> Self {
        iter.fold(Planck::ZERO, Planck::saturating_add)
    }
}

impl fmt::Display for Planck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Planck {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            U256::from_str_radix(hex, 16)
                .map_err(|_| AmountError::InvalidPlanck(s.to_string()))?
        } else {
            U256::from_dec_str(trimmed).map_err(|_| AmountError::InvalidPlanck(s.to_string()))?
        };
        Ok(Self(parsed))
    }
}

impl Serialize for Planck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Planck {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PlanckVisitor;

        impl<'de> Visitor<'de> for PlanckVisitor {
            type Value = Planck;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer, decimal string or 0x-prefixed hex string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Planck, E> {
                Ok(Planck::from(v))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Planck, E> {
                Ok(Planck::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Planck, E> {
                u64::try_from(v)
                    .map(Planck::from)
                    .map_err(|_| E::custom(format!("negative balance: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Planck, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PlanckVisitor)
    }
}

// =============================================================================
// DISPLAY AMOUNT
// =============================================================================

/// An exact decimal amount in display units (e.g. DOT rather than planck).
///
/// Stored as the planck mantissa plus its decimal scale. Equality and
/// ordering compare the represented value, so `2` with 10 decimals equals
/// `2` with 12 decimals.
#[derive(Debug, Clone, Copy)]
pub struct DisplayAmount {
    mantissa: U256,
    units: u8,
}

impl DisplayAmount {
    /// Create a display amount from planck and a decimal scale.
    pub fn new(planck: Planck, units: u8) -> Result<Self, AmountError> {
        if units > MAX_UNITS {
            return Err(AmountError::UnitsOutOfRange { units, max: MAX_UNITS });
        }
        Ok(Self {
            mantissa: planck.as_u256(),
            units,
        })
    }

    /// Zero in any scale.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            mantissa: U256::zero(),
            units: 0,
        }
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Decimal scale of this amount.
    #[must_use]
    pub fn units(&self) -> u8 {
        self.units
    }

    /// The amount back in planck at its own scale.
    #[must_use]
    pub fn to_planck(&self) -> Planck {
        Planck(self.mantissa)
    }

    /// Mantissa rescaled to `units` decimals. Saturates on overflow.
    fn rescaled(&self, units: u8) -> U256 {
        let shift = usize::from(units.saturating_sub(self.units));
        self.mantissa.saturating_mul(U256::exp10(shift))
    }
}

impl Default for DisplayAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for DisplayAmount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DisplayAmount {}

impl PartialOrd for DisplayAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DisplayAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.units.max(other.units);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divisor = U256::exp10(usize::from(self.units));
        let whole = self.mantissa / divisor;
        let frac = self.mantissa % divisor;

        if frac.is_zero() {
            return write!(f, "{whole}");
        }

        let digits = format!("{:0>width$}", frac.to_string(), width = usize::from(self.units));
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for DisplayAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AmountError::InvalidDecimal(s.to_string());
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let frac = frac.trim_end_matches('0');
        let units = u8::try_from(frac.len()).map_err(|_| invalid())?;
        if units > MAX_UNITS {
            return Err(AmountError::UnitsOutOfRange { units, max: MAX_UNITS });
        }

        let digits = format!("{}{}", if whole.is_empty() { "0" } else { whole }, frac);
        let mantissa = U256::from_dec_str(&digits).map_err(|_| invalid())?;
        Ok(Self { mantissa, units })
    }
}

impl Serialize for DisplayAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DisplayAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
