// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A signed span of time with nanosecond resolution.
///
/// The range is roughly plus or minus 10,000 years. When both components are
/// non-zero they share the same sign.
///
/// On the JSON wire a duration is a string of seconds, with optional
/// fractional digits, followed by `s`. For example, 3 seconds and 1
/// microsecond is `"3.000001s"`.
///
/// # Examples
/// ```
/// # use aiplatform_wkt::{Duration, DurationError};
/// let d = Duration::try_from("12.34s")?;
/// assert_eq!(d.seconds(), 12);
/// assert_eq!(d.nanos(), 340_000_000);
/// assert_eq!(d, Duration::new(12, 340_000_000)?);
/// # Ok::<(), DurationError>(())
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd, prost::Message)]
pub struct Duration {
    #[prost(int64, tag = "1")]
    seconds: i64,
    #[prost(int32, tag = "2")]
    nanos: i32,
}

/// Failures creating or parsing a [Duration].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DurationError {
    #[error("seconds and/or nanoseconds out of range")]
    OutOfRange,

    #[error("if seconds and nanoseconds are not zero, they must have the same sign")]
    MismatchedSigns,

    /// The string is not a valid duration.
    #[error("cannot deserialize the duration: {0}")]
    Deserialize(#[source] BoxedError),
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

impl Duration {
    /// The largest value for [seconds][Duration::seconds].
    pub const MAX_SECONDS: i64 = 315_576_000_000;

    /// The smallest value for [seconds][Duration::seconds].
    pub const MIN_SECONDS: i64 = -Self::MAX_SECONDS;

    /// The largest value for [nanos][Duration::nanos].
    pub const MAX_NANOS: i32 = NANOS_PER_SECOND - 1;

    /// The smallest value for [nanos][Duration::nanos].
    pub const MIN_NANOS: i32 = -Self::MAX_NANOS;

    /// Validates the components, see [clamp()][Duration::clamp] for a
    /// normalizing alternative.
    pub fn new(seconds: i64, nanos: i32) -> Result<Self, DurationError> {
        let in_range = (Self::MIN_SECONDS..=Self::MAX_SECONDS).contains(&seconds)
            && (Self::MIN_NANOS..=Self::MAX_NANOS).contains(&nanos);
        if !in_range {
            return Err(DurationError::OutOfRange);
        }
        if seconds.signum() * (nanos.signum() as i64) < 0 {
            return Err(DurationError::MismatchedSigns);
        }
        Ok(Self { seconds, nanos })
    }

    /// Normalizes the components, carrying whole seconds out of `nanos` and
    /// saturating at the range limits.
    pub fn clamp(seconds: i64, nanos: i32) -> Self {
        let ns = NANOS_PER_SECOND as i128;
        let max = Self::MAX_SECONDS as i128 * ns;
        let total = (seconds as i128 * ns + nanos as i128).clamp(-max, max);
        // Truncating division keeps both parts on the same side of zero.
        Self {
            seconds: (total / ns) as i64,
            nanos: (total % ns) as i32,
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }
}

impl crate::message::Message for Duration {
    fn typename() -> &'static str {
        "type.googleapis.com/google.protobuf.Duration"
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.seconds < 0 || self.nanos < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}", self.seconds.unsigned_abs())?;
        if self.nanos != 0 {
            let fraction = format!("{:09}", self.nanos.unsigned_abs());
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        f.write_str("s")
    }
}

/// Formats the duration as on the JSON wire.
///
/// # Example
/// ```
/// # use aiplatform_wkt::Duration;
/// let d = Duration::clamp(12, 340_000_000);
/// assert_eq!(String::from(d), "12.34s");
/// ```
impl From<Duration> for String {
    fn from(duration: Duration) -> String {
        duration.to_string()
    }
}

fn bad_input<E: Into<BoxedError>>(e: E) -> DurationError {
    DurationError::Deserialize(e.into())
}

impl TryFrom<&str> for Duration {
    type Error = DurationError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let unsigned = value
            .strip_suffix('s')
            .ok_or_else(|| bad_input("missing trailing 's'"))?;
        let (negative, unsigned) = match unsigned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, unsigned),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if fraction.len() > 9 {
            return Err(bad_input("more than 9 fractional digits"));
        }
        let seconds = match whole {
            "" => 0,
            w => w.parse::<i64>().map_err(bad_input)?,
        };
        let nanos = match fraction {
            "" => 0,
            f => format!("{f:0<9}").parse::<i32>().map_err(bad_input)?,
        };
        if negative {
            Duration::new(-seconds, -nanos)
        } else {
            Duration::new(seconds, nanos)
        }
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = DurationError;

    fn try_from(value: std::time::Duration) -> Result<Self, Self::Error> {
        let seconds = i64::try_from(value.as_secs()).map_err(|_| DurationError::OutOfRange)?;
        // `subsec_nanos()` is always below 10^9.
        Self::new(seconds, value.subsec_nanos() as i32)
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = DurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        match (u64::try_from(value.seconds), u32::try_from(value.nanos)) {
            (Ok(seconds), Ok(nanos)) => Ok(std::time::Duration::new(seconds, nanos)),
            _ => Err(DurationError::OutOfRange),
        }
    }
}

impl serde::ser::Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::de::Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
        Duration::try_from(value.as_ref()).map_err(serde::de::Error::custom)
    }
}
