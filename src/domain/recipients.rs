use super::EmailAddress;

/// How an outgoing email is addressed.
///
/// `Batched` recipients are delivered blind, so no subscriber can see the
/// address of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    Single(EmailAddress),
    Batched(Vec<EmailAddress>),
}

impl Recipients {
    /// Pick the addressing mode for a set of recipients, `None` if it is empty
    pub fn select(mut emails: Vec<EmailAddress>) -> Option<Self> {
        match emails.len() {
            0 => None,
            1 => emails.pop().map(Self::Single),
            _ => Some(Self::Batched(emails)),
        }
    }

    /// Number of addresses the message will reach
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batched(emails) => emails.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
