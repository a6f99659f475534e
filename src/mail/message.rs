use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::User;
use gantry_core::{GantryError, GantryResult};

/// A display name plus address pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub name: String,
    pub address: String,
}

impl EmailAddress {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// The user's mailing address, `None` when the account has no
    /// address at all.
    pub fn from_user(user: &User) -> Option<Self> {
        user.preferred_email()
            .map(|address| Self::new(&user.username, address))
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} <{}>", self.name, self.address)
        }
    }
}

/// A rendered notification ready for a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<EmailAddress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<EmailAddress>,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    pub fn builder(from: EmailAddress) -> MessageBuilder {
        MessageBuilder {
            from,
            to: Vec::new(),
            cc: Vec::new(),
            reply_to: Vec::new(),
            subject: String::new(),
            body: String::new(),
        }
    }
}

/// Builds a message, refusing to produce one without recipients or a
/// subject.
pub struct MessageBuilder {
    from: EmailAddress,
    to: Vec<EmailAddress>,
    cc: Vec<EmailAddress>,
    reply_to: Vec<EmailAddress>,
    subject: String,
    body: String,
}

impl MessageBuilder {
    pub fn to(mut self, address: EmailAddress) -> Self {
        self.to.push(address);
        self
    }

    pub fn to_all(mut self, addresses: impl IntoIterator<Item = EmailAddress>) -> Self {
        self.to.extend(addresses);
        self
    }

    pub fn cc(mut self, address: EmailAddress) -> Self {
        self.cc.push(address);
        self
    }

    pub fn reply_to(mut self, address: EmailAddress) -> Self {
        self.reply_to.push(address);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> GantryResult<MailMessage> {
        if self.to.is_empty() {
            return Err(GantryError::Mail("message has no recipients".to_string()));
        }
        if self.subject.trim().is_empty() {
            return Err(GantryError::Mail("message has no subject".to_string()));
        }
        Ok(MailMessage {
            from: self.from,
            to: self.to,
            cc: self.cc,
            reply_to: self.reply_to,
            subject: self.subject,
            body: self.body,
        })
    }
}
