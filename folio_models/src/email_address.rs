use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress(pub lettre::Address);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddressWithName(pub lettre::message::Mailbox);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl EmailAddressWithName {
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn email(&self) -> &str {
        self.0.email.as_ref()
    }
}

impl From<EmailAddress> for EmailAddressWithName {
    fn from(value: EmailAddress) -> Self {
        Self(lettre::message::Mailbox::new(None, value.0))
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for EmailAddressWithName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EmailAddress {
    type Err = <lettre::Address as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl FromStr for EmailAddressWithName {
    type Err = <lettre::message::Mailbox as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address() {
        let address = "jo@example.com".parse::<EmailAddress>().unwrap();
        assert_eq!(address.as_str(), "jo@example.com");
    }

    #[test]
    fn reject_invalid_address() {
        for input in ["", "jo", "jo@", "@example.com", "jo example@example.com"] {
            assert!(input.parse::<EmailAddress>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn mailbox_with_name() {
        let mailbox = "Portfolio Contact <contact@example.com>"
            .parse::<EmailAddressWithName>()
            .unwrap();
        assert_eq!(mailbox.name(), Some("Portfolio Contact"));
        assert_eq!(mailbox.email(), "contact@example.com");
    }

    #[test]
    fn address_into_mailbox() {
        let mailbox: EmailAddressWithName = "jo@example.com"
            .parse::<EmailAddress>()
            .unwrap()
            .into();
        assert_eq!(mailbox.name(), None);
        assert_eq!(mailbox.to_string(), "jo@example.com");
    }
}
