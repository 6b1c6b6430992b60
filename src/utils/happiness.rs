use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;

/// Happiness of the companion. Always stays within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Happiness(f64);

impl Display for Happiness {
    /// Rendered like a meter, so the fractional part is cut off: 79.9 is shown as `79%`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0.trunc())
    }
}

impl Happiness {
    pub const MIN: Happiness = Happiness(0.);
    pub const MAX: Happiness = Happiness(100.);

    pub fn new_opt(value: f64) -> Option<Happiness> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Some(Happiness(value))
        } else {
            None
        }
    }

    /// Brings any value into range. NaN counts as empty.
    pub fn clamped(value: f64) -> Happiness {
        if value.is_nan() {
            Self::MIN
        } else {
            Happiness(value.clamp(Self::MIN.0, Self::MAX.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Happiness {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_end_matches('%');
        let v = s.parse::<f64>()?;
        Happiness::new_opt(v).ok_or_else(|| anyhow!("Happiness must be between 0 and 100, got {s}"))
    }
}

impl Deref for Happiness {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Happiness;

    #[test]
    fn parses_plain_and_percent_values() {
        assert_eq!("90".parse::<Happiness>().unwrap().value(), 90.);
        assert_eq!("12.5%".parse::<Happiness>().unwrap().value(), 12.5);
        assert!("101".parse::<Happiness>().is_err());
        assert!("-1%".parse::<Happiness>().is_err());
        assert!("happy".parse::<Happiness>().is_err());
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Happiness::clamped(140.), Happiness::MAX);
        assert_eq!(Happiness::clamped(-3.), Happiness::MIN);
        assert_eq!(Happiness::clamped(f64::NAN), Happiness::MIN);
        assert_eq!(*Happiness::clamped(42.25), 42.25);
    }

    #[test]
    fn displays_truncated_percentage() {
        assert_eq!(Happiness::clamped(79.9).to_string(), "79%");
        assert_eq!(Happiness::MAX.to_string(), "100%");
        assert_eq!(Happiness::MIN.to_string(), "0%");
    }
}
