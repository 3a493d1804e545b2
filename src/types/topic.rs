//! Real-time channel topics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PolyclinicId;
use crate::error::QueueError;

const DISPLAY: &str = "display";
const POLYCLINIC_PREFIX: &str = "polyclinic:";

/// Logical channel scoping which connections receive a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Topic {
    /// Every display board
    Display,
    /// Counter views of one polyclinic
    Polyclinic(PolyclinicId),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Display => f.write_str(DISPLAY),
            Topic::Polyclinic(id) => write!(f, "{}{}", POLYCLINIC_PREFIX, id),
        }
    }
}

impl FromStr for Topic {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == DISPLAY {
            return Ok(Topic::Display);
        }
        s.strip_prefix(POLYCLINIC_PREFIX)
            .and_then(|id| id.parse().ok())
            .map(Topic::Polyclinic)
            .ok_or_else(|| QueueError::InvalidTopic(s.to_string()))
    }
}

impl TryFrom<String> for Topic {
    type Error = QueueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_parse() {
        assert_eq!("display".parse::<Topic>().unwrap(), Topic::Display);
        assert_eq!("polyclinic:7".parse::<Topic>().unwrap(), Topic::Polyclinic(7));
    }

    #[test]
    fn test_topic_parse_rejects_garbage() {
        assert!("polyclinic:".parse::<Topic>().is_err());
        assert!("polyclinic:abc".parse::<Topic>().is_err());
        assert!("lobby".parse::<Topic>().is_err());
    }

    #[test]
    fn test_topic_serializes_as_string() {
        let json = serde_json::to_string(&Topic::Polyclinic(3)).unwrap();
        assert_eq!(json, "\"polyclinic:3\"");
        let back: Topic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Topic::Polyclinic(3));
    }
}
