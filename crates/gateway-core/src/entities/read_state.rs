//! Read markers

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Last message the user has read in a channel.
///
/// Ready names the channel `id`; `MESSAGE_ACK` names it `channel_id`. Both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadState {
    #[serde(alias = "id")]
    pub channel_id: Snowflake,
    #[serde(default, alias = "message_id")]
    pub last_message_id: Option<Snowflake>,
    #[serde(default)]
    pub mention_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_both_shapes() {
        let from_ready: ReadState =
            serde_json::from_str(r#"{"id":"10","last_message_id":"99","mention_count":2}"#)
                .unwrap();
        let from_ack: ReadState =
            serde_json::from_str(r#"{"channel_id":"10","message_id":"99"}"#).unwrap();

        assert_eq!(from_ready.channel_id, from_ack.channel_id);
        assert_eq!(from_ready.last_message_id, from_ack.last_message_id);
        assert_eq!(from_ack.mention_count, 0);
    }
}
