//! Review rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A review's rating.
///
/// The `reviews.rating` column is a plain `INT` with no `CHECK` constraint,
/// so any integer is accepted here too. Storefronts conventionally use 1-5;
/// [`Rating::is_conventional`] reports whether a value falls in that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    /// Lowest conventional star rating.
    pub const MIN_CONVENTIONAL: i32 = 1;
    /// Highest conventional star rating.
    pub const MAX_CONVENTIONAL: i32 = 5;

    /// Wrap a raw rating value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Whether the rating lies in the conventional 1-5 star range.
    #[must_use]
    pub const fn is_conventional(&self) -> bool {
        self.0 >= Self::MIN_CONVENTIONAL && self.0 <= Self::MAX_CONVENTIONAL
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Rating {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_integer_is_accepted() {
        assert_eq!(Rating::new(11).value(), 11);
        assert_eq!(Rating::from(-2).value(), -2);
    }

    #[test]
    fn test_conventional_range() {
        assert!(Rating::new(1).is_conventional());
        assert!(Rating::new(5).is_conventional());
        assert!(!Rating::new(0).is_conventional());
        assert!(!Rating::new(6).is_conventional());
    }
}
