//! Hardware capability keys.
//!
//! # Responsibility
//! - Identify one hardware generation as a `(major, minor)` pair.
//! - Provide the total order used to sort multi-version kernel tables.
//!
//! # Invariants
//! - Ordering compares `major` first, then `minor`.
//! - Keys are plain values; nothing mutates a key after table insertion.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Compute capability of a device generation, e.g. `7.5`.
///
/// Field order matters: the derived `Ord` is lexicographic over
/// `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComputeCapability {
    pub major: i32,
    pub minor: i32,
}

impl ComputeCapability {
    /// Sentinel key for single-buffer tables.
    ///
    /// Lower than every real hardware generation, so a text stored under it
    /// always becomes the table default.
    pub const MINIMUM: Self = Self::new(1, 0);

    pub const fn new(major: i32, minor: i32) -> Self {
        Self { major, minor }
    }
}

impl From<(i32, i32)> for ComputeCapability {
    fn from((major, minor): (i32, i32)) -> Self {
        Self::new(major, minor)
    }
}

impl Display for ComputeCapability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ComputeCapability {
    type Err = CapabilityParseError;

    /// Accepts `"<major>.<minor>"` and the target form `"sm_<major><minor>"`.
    ///
    /// Dotted components may carry a leading `-`, so every displayed key
    /// parses back to itself. The target form is digits only.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CapabilityParseError::Empty);
        }

        if let Some(digits) = trimmed.strip_prefix("sm_") {
            // Last digit is the minor version: sm_75 -> 7.5, sm_100 -> 10.0.
            if digits.len() < 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(CapabilityParseError::Malformed(trimmed.to_string()));
            }
            let (major, minor) = digits.split_at(digits.len() - 1);
            return Ok(Self::new(
                parse_component(major, trimmed)?,
                parse_component(minor, trimmed)?,
            ));
        }

        let Some((major, minor)) = trimmed.split_once('.') else {
            return Err(CapabilityParseError::Malformed(trimmed.to_string()));
        };
        Ok(Self::new(
            parse_component(major, trimmed)?,
            parse_component(minor, trimmed)?,
        ))
    }
}

fn parse_component(component: &str, whole: &str) -> Result<i32, CapabilityParseError> {
    let digits = component.strip_prefix('-').unwrap_or(component);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CapabilityParseError::Malformed(whole.to_string()));
    }
    component
        .parse::<i32>()
        .map_err(|_| CapabilityParseError::OutOfRange(whole.to_string()))
}

/// Capability string parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityParseError {
    Empty,
    Malformed(String),
    OutOfRange(String),
}

impl Display for CapabilityParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "compute capability must not be empty"),
            Self::Malformed(value) => write!(
                f,
                "compute capability is malformed: {value}; expected `major.minor` or `sm_XY`"
            ),
            Self::OutOfRange(value) => write!(f, "compute capability is out of range: {value}"),
        }
    }
}

impl Error for CapabilityParseError {}
