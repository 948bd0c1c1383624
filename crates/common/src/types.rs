use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or only whitespace.
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },

    /// The route identifier does not follow `ORIGIN-DESTINATION-TYPE-NNN`.
    #[error(
        "Invalid route id '{0}': expected ORIGIN-DESTINATION-TYPE-NNN (e.g. MAD01-BCN02-FRG-001)"
    )]
    InvalidRouteFormat(String),
}

/// Canonical storage key for a natural identifier.
///
/// Trims surrounding whitespace and upper-cases the rest. Returns `None` for
/// an empty key.
pub fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

macro_rules! natural_key {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parses and canonicalises the identifier.
            pub fn parse(raw: &str) -> Result<Self, IdError> {
                normalize_key(raw)
                    .map(Self)
                    .ok_or(IdError::Empty { kind: $kind })
            }

            /// Returns the canonical identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

natural_key!(
    /// Unique identifier of a shipment.
    TrackingCode,
    "Tracking code"
);

natural_key!(
    /// Unique identifier of a logistics center.
    CenterId,
    "Center id"
);

/// Service class encoded in the third segment of a route identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    /// `STD`
    Standard,
    /// `FRG`
    Fragile,
    /// `EXP`
    Express,
}

impl RouteType {
    /// Returns the three-letter code used in route identifiers.
    pub fn code(&self) -> &'static str {
        match self {
            RouteType::Standard => "STD",
            RouteType::Fragile => "FRG",
            RouteType::Express => "EXP",
        }
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

fn route_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z]{3,4}\d{2}-[A-Z]{3,4}\d{2}-(STD|FRG|EXP)-\d{3}$")
            .expect("valid route id regex")
    })
}

/// Unique identifier of a route, e.g. `MAD16-BCN03-STD-001`.
///
/// The format is an external contract: origin and destination codes of 3-4
/// letters plus 2 digits, a service type (`STD`, `FRG` or `EXP`) and a
/// three digit sequence. Matching happens after trimming and upper-casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteId(String);

impl RouteId {
    /// Parses, canonicalises and validates a route identifier.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let canonical = normalize_key(raw).ok_or(IdError::Empty { kind: "Route id" })?;
        if !route_id_pattern().is_match(&canonical) {
            return Err(IdError::InvalidRouteFormat(raw.trim().to_string()));
        }
        Ok(Self(canonical))
    }

    /// Returns the canonical identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segment(&self, index: usize) -> &str {
        // A validated id always has exactly four segments.
        self.0.split('-').nth(index).unwrap_or_default()
    }

    /// Origin code segment (`MAD16` in `MAD16-BCN03-STD-001`).
    pub fn origin_code(&self) -> &str {
        self.segment(0)
    }

    /// Destination code segment (`BCN03` in `MAD16-BCN03-STD-001`).
    pub fn destination_code(&self) -> &str {
        self.segment(1)
    }

    /// Service type segment.
    pub fn route_type(&self) -> RouteType {
        match self.segment(2) {
            "FRG" => RouteType::Fragile,
            "EXP" => RouteType::Express,
            _ => RouteType::Standard,
        }
    }

    /// Sequence number segment.
    pub fn sequence(&self) -> u16 {
        self.segment(3).parse().unwrap_or_default()
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RouteId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RouteId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RouteId> for String {
    fn from(id: RouteId) -> Self {
        id.0
    }
}

impl AsRef<str> for RouteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
