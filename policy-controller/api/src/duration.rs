use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr, time};

/// A signed duration, written the way policy documents write them (e.g. `"1m30s"`, `"250ms"`).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Duration {
    duration: time::Duration,
    is_negative: bool,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("invalid unit: {}", EXPECTED_UNITS)]
    InvalidUnit,

    #[error("missing a unit: {}", EXPECTED_UNITS)]
    NoUnit,

    #[error("invalid floating-point number: {}", .0)]
    NotANumber(#[from] std::num::ParseFloatError),

    #[error("segment is negative or too large")]
    OutOfRange,
}

const EXPECTED_UNITS: &str = "expected one of 'ns', 'us', '\u{00b5}s', 'ms', 's', 'm', or 'h'";

// === impl Duration ===

impl Duration {
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            duration: time::Duration::from_secs(secs),
            is_negative: false,
        }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self {
            duration: time::Duration::from_millis(millis),
            is_negative: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.is_negative
    }

    /// Returns the unsigned duration, or `None` if this duration is negative.
    pub fn to_std(&self) -> Option<time::Duration> {
        if self.is_negative {
            return None;
        }
        Some(self.duration)
    }
}

impl From<time::Duration> for Duration {
    fn from(duration: time::Duration) -> Self {
        Self {
            duration,
            is_negative: false,
        }
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write;
        if self.is_negative {
            f.write_char('-')?;
        }
        fmt::Debug::fmt(&self.duration, f)
    }
}

impl FromStr for Duration {
    type Err = ParseError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        fn unit(val: f64, unit: &str) -> Result<time::Duration, ParseError> {
            const MINUTE: time::Duration = time::Duration::from_secs(60);
            let base = match unit {
                "ns" => time::Duration::from_nanos(1),
                // U+00B5 is the "micro sign" while U+03BC is "Greek letter mu"
                "us" | "\u{00b5}s" | "\u{03bc}s" => time::Duration::from_micros(1),
                "ms" => time::Duration::from_millis(1),
                "s" => time::Duration::from_secs(1),
                "m" => MINUTE,
                "h" => MINUTE * 60,
                _ => return Err(ParseError::InvalidUnit),
            };
            // Only the whole duration may carry a sign.
            time::Duration::try_from_secs_f64(val * base.as_secs_f64())
                .map_err(|_| ParseError::OutOfRange)
        }

        let is_negative = s.starts_with('-');
        s = s.trim_start_matches('+').trim_start_matches('-');

        let mut total = time::Duration::ZERO;
        while !s.is_empty() {
            let Some(unit_start) = s.find(|c: char| c.is_alphabetic()) else {
                if s == "0" {
                    break;
                }
                return Err(ParseError::NoUnit);
            };
            let (val, rest) = s.split_at(unit_start);
            let val = val.parse::<f64>()?;
            let (u, rest) = match rest.find(|c: char| !c.is_alphabetic()) {
                Some(end) => rest.split_at(end),
                None => (rest, ""),
            };
            total = total
                .checked_add(unit(val, u)?)
                .ok_or(ParseError::OutOfRange)?;
            s = rest;
        }

        Ok(Self {
            duration: total,
            is_negative,
        })
    }
}

impl Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = Duration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration such as \"1m30s\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_durations() {
        const MINUTE: time::Duration = time::Duration::from_secs(60);
        let cases: &[(&str, Duration)] = &[
            ("0", time::Duration::ZERO.into()),
            ("5s", Duration::from_secs(5)),
            ("+5s", Duration::from_secs(5)),
            ("250ms", Duration::from_millis(250)),
            (".5s", Duration::from_millis(500)),
            ("1.004s", Duration::from_millis(1004)),
            ("12µs", time::Duration::from_micros(12).into()),
            ("12μs", time::Duration::from_micros(12).into()),
            ("15m", (15 * MINUTE).into()),
            ("3h30m", (210 * MINUTE).into()),
            ("10.5s4m", (4 * MINUTE + time::Duration::from_millis(10_500)).into()),
        ];
        for (input, expected) in cases {
            let parsed = dbg!(input).parse::<Duration>().unwrap();
            assert_eq!(&dbg!(parsed), expected);
        }
    }

    #[test]
    fn negative_durations_have_no_std_form() {
        let d = "-2m3.4s".parse::<Duration>().unwrap();
        assert!(d.is_negative());
        assert_eq!(d.to_std(), None);
        assert_eq!(
            Duration::from_secs(3).to_std(),
            Some(time::Duration::from_secs(3))
        );
    }

    #[test]
    fn rejects_malformed_durations() {
        assert_eq!("5".parse::<Duration>(), Err(ParseError::NoUnit));
        assert_eq!("5y".parse::<Duration>(), Err(ParseError::InvalidUnit));
        assert!(matches!(
            "s".parse::<Duration>(),
            Err(ParseError::NotANumber(_))
        ));
    }

    #[test]
    fn rejects_unrepresentable_durations() {
        assert_eq!("1s-2s".parse::<Duration>(), Err(ParseError::OutOfRange));
        assert_eq!(
            "99999999999999999999999h".parse::<Duration>(),
            Err(ParseError::OutOfRange)
        );
        let max = format!("{}s", u64::MAX);
        assert_eq!(
            format!("{max}{max}").parse::<Duration>(),
            Err(ParseError::OutOfRange)
        );

        // Rejections surface as deserialization errors rather than panics.
        assert!(serde_json::from_str::<Duration>("\"1s-2s\"").is_err());
    }

    #[test]
    fn serializes_as_a_string() {
        let d: Duration = serde_json::from_str("\"1m30s\"").unwrap();
        assert_eq!(d, Duration::from_secs(90));
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"90s\"");
    }
}
