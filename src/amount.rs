use std::fmt;
use std::iter::Sum;

/// Fixed-point money with 2 decimal places, stored as a count of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 100;

    pub const ZERO: Amount = Amount(0);

    /// Round a float to the nearest cent, half away from zero.
    ///
    /// This is the only place where floats enter the ledger, so every split
    /// strategy shares the same `round(x * 100) / 100` rule.
    /// Returns `None` for NaN, infinities and values whose cents do not fit in an `i64`.
    pub fn from_float(value: f64) -> Option<Self> {
        let scaled = (value * Self::SCALE as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Amount(scaled as i64))
    }

    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `self * numerator / denominator`, rounded to the nearest cent (half away from zero).
    ///
    /// Returns `None` when the denominator is not positive.
    pub fn mul_ratio(self, numerator: i64, denominator: i64) -> Option<Self> {
        if denominator <= 0 {
            return None;
        }
        let scaled = self.0 as i128 * numerator as i128;
        let den = denominator as i128;
        let quotient = scaled / den;
        let remainder = scaled % den;
        let rounded = if remainder.abs() * 2 >= den {
            quotient + scaled.signum()
        } else {
            quotient
        };
        i64::try_from(rounded).ok().map(Amount)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Sum of `amounts`, or `None` on overflow.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let frac = abs % Self::SCALE as u64;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, amount| acc + amount)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_preserves_value() {
        assert_eq!(Amount::from_cents(12345), Amount(12345));
        assert_eq!(Amount::from_cents(12345).cents(), 12345);
    }

    #[test]
    fn from_float_converts_correctly() {
        assert_eq!(Amount::from_float(100.0), Some(Amount::from_cents(10_000)));
        assert_eq!(Amount::from_float(1.5), Some(Amount::from_cents(150)));
        assert_eq!(Amount::from_float(0.01), Some(Amount::from_cents(1)));
    }

    #[test]
    fn from_float_rounds_half_away_from_zero() {
        assert_eq!(Amount::from_float(1.234), Some(Amount::from_cents(123)));
        assert_eq!(Amount::from_float(1.236), Some(Amount::from_cents(124)));
        assert_eq!(Amount::from_float(0.125), Some(Amount::from_cents(13)));
        assert_eq!(Amount::from_float(-0.125), Some(Amount::from_cents(-13)));
    }

    #[test]
    fn from_float_handles_negative() {
        assert_eq!(Amount::from_float(-50.25), Some(Amount::from_cents(-5025)));
    }

    #[test]
    fn from_float_rejects_non_finite() {
        assert_eq!(Amount::from_float(f64::NAN), None);
        assert_eq!(Amount::from_float(f64::INFINITY), None);
        assert_eq!(Amount::from_float(f64::NEG_INFINITY), None);
    }

    #[test]
    fn from_float_rejects_values_beyond_cents_range() {
        // 1e17 is 1e19 cents, past i64::MAX
        assert_eq!(Amount::from_float(1e17), None);
        assert_eq!(Amount::from_float(-1e17), None);
        assert_eq!(
            Amount::from_float(1e16),
            Some(Amount::from_cents(1_000_000_000_000_000_000))
        );
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let max = Amount::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Amount::from_cents(1)), None);
        assert_eq!(Amount::from_cents(i64::MIN).checked_sub(Amount::from_cents(1)), None);
        assert_eq!(
            Amount::from_cents(5).checked_sub(Amount::from_cents(7)),
            Some(Amount::from_cents(-2))
        );
        assert_eq!(Amount::checked_sum([max, Amount::from_cents(1)]), None);
        assert_eq!(
            Amount::checked_sum([Amount::from_cents(1), Amount::from_cents(2)]),
            Some(Amount::from_cents(3))
        );
    }

    #[test]
    fn display_formats_positive() {
        assert_eq!(Amount::from_cents(10_000).to_string(), "100.00");
        assert_eq!(Amount::from_cents(150).to_string(), "1.50");
        assert_eq!(Amount::from_cents(1).to_string(), "0.01");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn display_formats_negative() {
        assert_eq!(Amount::from_cents(-5025).to_string(), "-50.25");
        assert_eq!(Amount::from_cents(-1).to_string(), "-0.01");
        assert_eq!(
            Amount::from_cents(i64::MIN).to_string(),
            "-92233720368547758.08"
        );
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Amount::default(), Amount::ZERO);
        assert!(Amount::default().is_zero());
    }

    #[test]
    fn mul_ratio_rounds_to_nearest_cent() {
        // 100.00 / 3 = 33.333..
        assert_eq!(
            Amount::from_cents(10_000).mul_ratio(1, 3),
            Some(Amount::from_cents(3333))
        );
        // 200.00 / 3 = 66.666..
        assert_eq!(
            Amount::from_cents(20_000).mul_ratio(1, 3),
            Some(Amount::from_cents(6667))
        );
        // 0.05 / 2 = 0.025 -> 0.03
        assert_eq!(
            Amount::from_cents(5).mul_ratio(1, 2),
            Some(Amount::from_cents(3))
        );
        assert_eq!(
            Amount::from_cents(-5).mul_ratio(1, 2),
            Some(Amount::from_cents(-3))
        );
    }

    #[test]
    fn mul_ratio_rejects_non_positive_denominator() {
        assert_eq!(Amount::from_cents(100).mul_ratio(1, 0), None);
        assert_eq!(Amount::from_cents(100).mul_ratio(1, -2), None);
    }

    #[test]
    fn arithmetic() {
        let a = Amount::from_cents(100);
        let b = Amount::from_cents(50);
        assert_eq!(a + b, Amount::from_cents(150));
        assert_eq!(a - b, Amount::from_cents(50));
        assert_eq!(-a, Amount::from_cents(-100));

        let mut c = a;
        c += b;
        assert_eq!(c, Amount::from_cents(150));
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn sum_of_amounts() {
        let amounts = [Amount::from_cents(1), Amount::from_cents(2), Amount::from_cents(3)];
        assert_eq!(amounts.iter().sum::<Amount>(), Amount::from_cents(6));
        assert_eq!(amounts.into_iter().sum::<Amount>(), Amount::from_cents(6));
    }
}
