// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lookup Types
//!
//! Identity lookup modes and reception capabilities.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{GatewayError, GatewayResult};

/// How to look up a gateway ID.
///
/// Exactly one contact detail is used per lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupMode {
    /// Phone number in E.164 format without the leading `+`.
    Phone(String),
    /// HMAC-SHA256 hash of an E.164 phone number, hex encoded.
    PhoneHash(String),
    /// Lowercase email address.
    Email(String),
    /// HMAC-SHA256 hash of a lowercased, trimmed email address, hex encoded.
    EmailHash(String),
}

impl LookupMode {
    /// All mode names, as used in the lookup URL.
    pub const NAMES: [&'static str; 4] = ["phone", "phone_hash", "email", "email_hash"];

    /// Creates a mode from its name and value.
    pub fn from_name(name: &str, value: impl Into<String>) -> GatewayResult<Self> {
        let value = value.into();
        match name {
            "phone" => Ok(LookupMode::Phone(value)),
            "phone_hash" => Ok(LookupMode::PhoneHash(value)),
            "email" => Ok(LookupMode::Email(value)),
            "email_hash" => Ok(LookupMode::EmailHash(value)),
            other => Err(GatewayError::InvalidLookup(format!(
                "unknown mode selected: {}",
                other
            ))),
        }
    }

    /// Creates a mode from dynamic `(name, value)` pairs.
    ///
    /// Fails unless there is exactly one pair with a known name. Unknown
    /// names are reported before the count is checked.
    pub fn from_pairs<I, K, V>(pairs: I) -> GatewayResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();

        let unknown: Vec<&str> = pairs
            .iter()
            .map(|(name, _)| name.as_ref())
            .filter(|name| !Self::NAMES.contains(name))
            .collect();
        if !unknown.is_empty() {
            return Err(GatewayError::InvalidLookup(format!(
                "unknown mode selected: {}",
                unknown.join(", ")
            )));
        }

        if pairs.len() != 1 {
            return Err(GatewayError::InvalidLookup(format!(
                "use exactly one of the lookup modes ({}), got {}",
                Self::NAMES.join(", "),
                pairs.len()
            )));
        }

        let mut pairs = pairs.into_iter();
        match pairs.next() {
            Some((name, value)) => Self::from_name(name.as_ref(), value),
            None => Err(GatewayError::InvalidLookup("no lookup mode given".into())),
        }
    }

    /// Mode name as used in the lookup URL.
    pub fn name(&self) -> &'static str {
        match self {
            LookupMode::Phone(_) => "phone",
            LookupMode::PhoneHash(_) => "phone_hash",
            LookupMode::Email(_) => "email",
            LookupMode::EmailHash(_) => "email_hash",
        }
    }

    /// The contact detail being looked up.
    pub fn value(&self) -> &str {
        match self {
            LookupMode::Phone(v)
            | LookupMode::PhoneHash(v)
            | LookupMode::Email(v)
            | LookupMode::EmailHash(v) => v,
        }
    }
}

/// A message type an identity can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceptionCapability {
    Text,
    Image,
    Video,
    Audio,
    File,
}

impl ReceptionCapability {
    /// Wire name of the capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceptionCapability::Text => "text",
            ReceptionCapability::Image => "image",
            ReceptionCapability::Video => "video",
            ReceptionCapability::Audio => "audio",
            ReceptionCapability::File => "file",
        }
    }
}

impl fmt::Display for ReceptionCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceptionCapability {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReceptionCapability::Text),
            "image" => Ok(ReceptionCapability::Image),
            "video" => Ok(ReceptionCapability::Video),
            "audio" => Ok(ReceptionCapability::Audio),
            "file" => Ok(ReceptionCapability::File),
            other => Err(GatewayError::InvalidCapability(other.to_string())),
        }
    }
}

/// Parses a comma-separated capability list such as `text,image,file`.
pub fn parse_capabilities(body: &str) -> GatewayResult<HashSet<ReceptionCapability>> {
    body.split(',').map(|token| token.trim().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            LookupMode::from_name("email", "echoecho@example.com").unwrap(),
            LookupMode::Email("echoecho@example.com".into())
        );
        assert!(matches!(
            LookupMode::from_name("fax", "123"),
            Err(GatewayError::InvalidLookup(_))
        ));
    }

    #[test]
    fn test_from_pairs_exactly_one() {
        let mode = LookupMode::from_pairs([("phone", "44123456789")]).unwrap();
        assert_eq!(mode, LookupMode::Phone("44123456789".into()));
        assert_eq!(mode.name(), "phone");
        assert_eq!(mode.value(), "44123456789");
    }

    #[test]
    fn test_from_pairs_rejects_none() {
        let pairs: Vec<(&str, &str)> = Vec::new();
        assert!(matches!(
            LookupMode::from_pairs(pairs),
            Err(GatewayError::InvalidLookup(_))
        ));
    }

    #[test]
    fn test_from_pairs_rejects_several() {
        let result = LookupMode::from_pairs([("phone", "44123456789"), ("email", "a@b.c")]);
        assert!(matches!(result, Err(GatewayError::InvalidLookup(_))));
    }

    #[test]
    fn test_from_pairs_reports_unknown_first() {
        let err = LookupMode::from_pairs([("phone", "1"), ("fax", "2")]).unwrap_err();
        assert!(err.to_string().contains("unknown mode selected: fax"));
    }

    #[test]
    fn test_parse_capabilities() {
        let caps = parse_capabilities("text,image,file").unwrap();
        let expected: HashSet<_> = [
            ReceptionCapability::Text,
            ReceptionCapability::Image,
            ReceptionCapability::File,
        ]
        .into_iter()
        .collect();
        assert_eq!(caps, expected);
    }

    #[test]
    fn test_parse_capabilities_trims_and_deduplicates() {
        let caps = parse_capabilities(" text , text,audio\n").unwrap();
        assert_eq!(caps.len(), 2);
        assert!(caps.contains(&ReceptionCapability::Audio));
    }

    #[test]
    fn test_parse_capabilities_rejects_unknown() {
        let err = parse_capabilities("text,bogus").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCapability(token) if token == "bogus"));
    }
}
