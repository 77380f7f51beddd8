use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{BatchId, RecipientId};

/// One call target. The source list may carry arbitrary extra columns;
/// they are captured in `extra` and passed through to the call payload
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub recipient_id: RecipientId,
    pub name: String,
    pub phone: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// The row upserted into the call-data store for every attempted call.
/// All other columns of that table are populated by out-of-band processes
/// and stay untouched here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CallRecord {
    pub recipient_id: RecipientId,
    pub batch_id: BatchId,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Recipient;

    #[test]
    fn test_extra_columns_are_captured() {
        let raw = json!({
            "recipient_id": "rcpt_1",
            "name": "Jordan Lee",
            "phone": "+15550100",
            "company": "Acme",
            "account_balance": 42.5,
        });

        let recipient: Recipient = serde_json::from_value(raw).unwrap();
        assert_eq!(recipient.extra.len(), 2);
        assert_eq!(recipient.extra["company"], json!("Acme"));
        assert_eq!(recipient.extra["account_balance"], json!(42.5));
    }

    #[test]
    fn test_extra_columns_round_trip() {
        let raw = json!({
            "recipient_id": "rcpt_1",
            "name": "Jordan Lee",
            "phone": "+15550100",
            "language": "ms",
        });

        let recipient: Recipient =
            serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&recipient).unwrap(), raw);
    }
}
