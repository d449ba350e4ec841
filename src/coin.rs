use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A monetary amount of Scroogecoin.
///
/// The amount is signed so that a malformed transaction carrying a negative output
/// is representable and can be rejected by validation, instead of being impossible
/// to construct in the first place.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Coin(i64);

impl Coin {
    pub const fn new(amount: i64) -> Self {
        Coin(amount)
    }

    pub fn zero() -> Self {
        Self::new(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` if the result would wrap.
    /// Validation sums always go through this rather than the plain operator.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl Add for Coin {
    type Output = Coin;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Coin {
    type Output = Coin;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum<Coin> for Coin {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut sum = Self::zero();
        for el in iter {
            sum = sum.add(el);
        }
        sum
    }
}

impl From<i64> for Coin {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} SCR", self.0)
    }
}
