//! `an+b` arguments of the structural pseudo-classes.

use core::fmt;

/// Parsed `an+b` formula: `step` is `a`, `offset` is `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnPlusB {
    pub step: i32,
    pub offset: i32,
}

impl AnPlusB {
    pub const FIRST: Self = Self::new(0, 1);

    pub const fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// Parse `odd`, `even`, `B`, `An`, `An+B`, `An-B`, `n`, `-n+B`, ...
    ///
    /// Whitespace is allowed around the sign of `B` only.
    pub fn parse(arg: &str) -> Option<Self> {
        let arg = arg.trim().to_ascii_lowercase();
        match arg.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }
        let Some((step_part, offset_part)) = arg.split_once('n') else {
            return parse_signed(&arg).map(|offset| Self::new(0, offset));
        };
        let step = match step_part {
            "" | "+" => 1,
            "-" => -1,
            digits => parse_signed(digits)?,
        };
        let offset_part = offset_part.trim_start();
        let offset = if offset_part.is_empty() {
            0
        } else {
            let mut chars = offset_part.chars();
            let sign = chars.next();
            let digits = chars.as_str().trim_start();
            if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            let magnitude: i32 = digits.parse().ok()?;
            match sign {
                Some('+') => magnitude,
                Some('-') => magnitude.checked_neg()?,
                _ => return None,
            }
        };
        Some(Self::new(step, offset))
    }

    /// Whether 1-based `position` equals `step * k + offset` for some `k >= 0`.
    pub fn matches(self, position: usize) -> bool {
        let position = i64::try_from(position).unwrap_or(i64::MAX);
        let step = i64::from(self.step);
        let diff = position - i64::from(self.offset);
        if step == 0 {
            return diff == 0;
        }
        diff % step == 0 && diff / step >= 0
    }
}

/// Optional sign followed by ASCII digits, nothing else.
fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for AnPlusB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.step, self.offset) {
            (0, offset) => write!(f, "{offset}"),
            (step, 0) => write!(f, "{step}n"),
            (step, offset) if offset > 0 => write!(f, "{step}n+{offset}"),
            (step, offset) => write!(f, "{step}n{offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matching(formula: AnPlusB) -> Vec<usize> {
        (1..=10).filter(|position| formula.matches(*position)).collect()
    }

    /// Test keyword and numeric forms.
    ///
    /// # Panics
    /// Panics if a form parses to the wrong coefficients.
    #[test]
    fn parse_forms() {
        assert_eq!(AnPlusB::parse("odd"), Some(AnPlusB::new(2, 1)));
        assert_eq!(AnPlusB::parse(" EVEN "), Some(AnPlusB::new(2, 0)));
        assert_eq!(AnPlusB::parse("3"), Some(AnPlusB::new(0, 3)));
        assert_eq!(AnPlusB::parse("+4"), Some(AnPlusB::new(0, 4)));
        assert_eq!(AnPlusB::parse("n"), Some(AnPlusB::new(1, 0)));
        assert_eq!(AnPlusB::parse("-n+3"), Some(AnPlusB::new(-1, 3)));
        assert_eq!(AnPlusB::parse("+n"), Some(AnPlusB::new(1, 0)));
        assert_eq!(AnPlusB::parse("2n+1"), Some(AnPlusB::new(2, 1)));
        assert_eq!(AnPlusB::parse("3n - 2"), Some(AnPlusB::new(3, -2)));
        assert_eq!(AnPlusB::parse("-2n+ 6"), Some(AnPlusB::new(-2, 6)));
    }

    /// Test malformed arguments.
    ///
    /// # Panics
    /// Panics if a malformed argument is accepted.
    #[test]
    fn parse_rejects() {
        for bad in ["", "foo", "2n+", "n-", "2 n", "2n+x", "++1", "1.5", "2n*1", "n+-1"] {
            assert_eq!(AnPlusB::parse(bad), None, "{bad:?}");
        }
    }

    /// Test the `k >= 0` rule for positive, negative and zero steps.
    ///
    /// # Panics
    /// Panics if the matched positions differ.
    #[test]
    fn matching_positions() {
        assert_eq!(matching(AnPlusB::new(2, 1)), [1, 3, 5, 7, 9]);
        assert_eq!(matching(AnPlusB::new(2, 0)), [2, 4, 6, 8, 10]);
        assert_eq!(matching(AnPlusB::new(0, 3)), [3]);
        assert_eq!(matching(AnPlusB::new(-1, 3)), [1, 2, 3]);
        assert_eq!(matching(AnPlusB::new(3, -2)), [1, 4, 7, 10]);
        assert_eq!(matching(AnPlusB::new(1, 8)), [8, 9, 10]);
        assert!(matching(AnPlusB::new(0, 0)).is_empty());
    }

    /// Test the canonical rendering.
    ///
    /// # Panics
    /// Panics if the rendering differs.
    #[test]
    fn display() {
        assert_eq!(AnPlusB::new(2, 1).to_string(), "2n+1");
        assert_eq!(AnPlusB::new(-1, 0).to_string(), "-1n");
        assert_eq!(AnPlusB::new(3, -2).to_string(), "3n-2");
        assert_eq!(AnPlusB::new(0, 5).to_string(), "5");
    }
}
