//! Correlation identifiers linking a step's request, response and assertion
//! log lines.

use std::fmt;

use uuid::Uuid;

/// Identifier shared by every log line and report of one step execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self { Self(Uuid::new_v4()) }

    /// Return the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for CorrelationId {
    fn default() -> Self { Self::new() }
}

impl From<Uuid> for CorrelationId {
    fn from(value: Uuid) -> Self { Self(value) }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::CorrelationId;

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }

    #[test]
    fn displays_as_hyphenated_uuid() {
        let id = CorrelationId::from(Uuid::nil());
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }
}
