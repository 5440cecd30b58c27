use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a repository by the hosting service.
///
/// Used internally as the join key between a record and its language
/// result; never part of the serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryId(u64);

impl RepositoryId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RepositoryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_id_roundtrips_value() {
        let id = RepositoryId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(RepositoryId::from(42), id);
    }

    #[test]
    fn test_repository_id_display() {
        assert_eq!(RepositoryId::new(1296269).to_string(), "1296269");
    }
}
