use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string().to_lowercase())
}

#[derive(
    Debug,
    Hash,
    Clone,
    Default,
    Serialize,
    Deserialize,
    Eq,
    PartialEq,
    PartialOrd,
    Ord,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct BatchId(pub String);

impl BatchId {
    pub fn new() -> Self {
        Self(generate_id("batch"))
    }

    pub fn from(value: String) -> Self {
        Self(value)
    }

    pub fn is_valid(&self) -> bool {
        self.0.starts_with("batch_")
    }
}

#[derive(
    Debug,
    Hash,
    Clone,
    Default,
    Serialize,
    Deserialize,
    Eq,
    PartialEq,
    PartialOrd,
    Ord,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct RecipientId(pub String);

impl RecipientId {
    /// Recipient ids normally arrive with the source list. This generator
    /// covers lists without a stable id column.
    pub fn new() -> Self {
        Self(generate_id("rcpt"))
    }

    pub fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchId, RecipientId};

    #[test]
    fn test_id_prefixes() {
        assert!(BatchId::new().is_valid());
        assert!(RecipientId::new().0.starts_with("rcpt_"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn test_transparent_serde() {
        let id = BatchId::from("batch_test".to_string());
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            r#""batch_test""#
        );
    }
}
