//! Cart line quantity.

use serde::{Deserialize, Serialize};

/// Quantity of a cart line, always within [`Quantity::MIN`]..=[`Quantity::MAX`].
///
/// Every constructor clamps, including deserialization, so a hand-edited or
/// stale stored cart can never carry a quantity of zero or fifty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity a line can hold.
    pub const MIN: u8 = 1;
    /// Largest quantity a line can hold.
    pub const MAX: u8 = 10;

    /// A single unit.
    pub const ONE: Self = Self(Self::MIN);

    /// Clamp an arbitrary requested quantity into the allowed range.
    #[must_use]
    pub fn clamped(requested: i64) -> Self {
        let clamped = requested.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Self(u8::try_from(clamped).unwrap_or(Self::MAX))
    }

    /// One more unit, capped at [`Quantity::MAX`].
    #[must_use]
    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX))
    }

    /// The quantity as a plain number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether another unit can still be added.
    #[must_use]
    pub const fn is_max(self) -> bool {
        self.0 >= Self::MAX
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<i64> for Quantity {
    fn from(requested: i64) -> Self {
        Self::clamped(requested)
    }
}

impl From<Quantity> for u8 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_bounds() {
        assert_eq!(Quantity::clamped(-5).get(), 1);
        assert_eq!(Quantity::clamped(0).get(), 1);
        assert_eq!(Quantity::clamped(4).get(), 4);
        assert_eq!(Quantity::clamped(11).get(), 10);
        assert_eq!(Quantity::clamped(i64::MAX).get(), 10);
    }

    #[test]
    fn test_incremented_caps_at_max() {
        assert_eq!(Quantity::ONE.incremented().get(), 2);
        let max = Quantity::clamped(10);
        assert!(max.is_max());
        assert_eq!(max.incremented(), max);
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_values() {
        let q: Quantity = serde_json::from_str("0").unwrap();
        assert_eq!(q.get(), 1);
        let q: Quantity = serde_json::from_str("99").unwrap();
        assert_eq!(q.get(), 10);
        assert_eq!(serde_json::to_string(&Quantity::clamped(3)).unwrap(), "3");
    }
}
