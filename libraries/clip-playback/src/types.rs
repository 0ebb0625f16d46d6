//! Core types for the playback controller

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default progress sampling cadence (100ms)
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest accepted sampling cadence
///
/// Anything below (including zero) is clamped up so a misconfigured
/// player cannot flood the UI thread with ticks.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Longest accepted sampling cadence
pub const MAX_SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

/// Media resource locator
///
/// Thin newtype over a parsed URI. Equality is URI equality, which is what
/// the controller uses to decide whether a resource change requires a reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource(Url);

impl Resource {
    /// Parse a resource locator (`https://...`, `file:///...`, ...)
    pub fn parse(input: &str) -> Result<Self> {
        Url::parse(input)
            .map(Self)
            .map_err(|source| PlaybackError::InvalidResource {
                input: input.to_string(),
                source,
            })
    }

    /// Build a `file://` locator from an absolute path
    pub fn from_file_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Url::from_file_path(path)
            .map(Self)
            .map_err(|()| PlaybackError::InvalidFilePath(path.to_path_buf()))
    }

    /// Borrow the underlying URI
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Serialized form of the URI
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Url> for Resource {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl FromStr for Resource {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress sampling cadence, always within
/// [`MIN_SAMPLE_INTERVAL`, `MAX_SAMPLE_INTERVAL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleInterval(Duration);

impl SampleInterval {
    /// Create a sampling cadence, clamping out-of-range values
    pub fn new(interval: Duration) -> Self {
        let clamped = interval.clamp(MIN_SAMPLE_INTERVAL, MAX_SAMPLE_INTERVAL);
        if clamped != interval {
            tracing::warn!(
                "Sample interval {:?} out of range, clamped to {:?}",
                interval,
                clamped
            );
        }
        Self(clamped)
    }

    /// Create a sampling cadence from fractional seconds
    ///
    /// NaN, zero and negative values map to the minimum; infinity maps to
    /// the maximum.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_nan() || secs <= 0.0 {
            tracing::warn!(
                "Sample interval {}s is not positive, clamped to {:?}",
                secs,
                MIN_SAMPLE_INTERVAL
            );
            return Self(MIN_SAMPLE_INTERVAL);
        }
        match Duration::try_from_secs_f64(secs) {
            Ok(interval) => Self::new(interval),
            Err(_) => {
                tracing::warn!(
                    "Sample interval {}s is too large, clamped to {:?}",
                    secs,
                    MAX_SAMPLE_INTERVAL
                );
                Self(MAX_SAMPLE_INTERVAL)
            }
        }
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for SampleInterval {
    fn default() -> Self {
        Self(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl From<Duration> for SampleInterval {
    fn from(interval: Duration) -> Self {
        Self::new(interval)
    }
}

/// Serializable player configuration
///
/// The data-only subset of [`PlayerOptions`](crate::PlayerOptions): callbacks
/// and the progress sink are attached in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Resource locator (required in practice, empty by default)
    pub resource: String,

    /// Progress sampling cadence in milliseconds (default: 100)
    pub sample_interval_ms: u64,

    /// Restart from the beginning on end of media (default: false)
    #[serde(rename = "loop")]
    pub loop_playback: bool,
}

impl PlayerConfig {
    /// Decode a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parsed resource locator
    pub fn resource(&self) -> Result<Resource> {
        Resource::parse(&self.resource)
    }

    /// Clamped sampling cadence
    pub fn sample_interval(&self) -> SampleInterval {
        SampleInterval::new(Duration::from_millis(self.sample_interval_ms))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            resource: String::new(),
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
            loop_playback: false,
        }
    }
}
