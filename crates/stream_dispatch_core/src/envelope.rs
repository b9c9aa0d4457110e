//! Event envelope classification and the change-record model.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::attributes::{unmarshall, AttributeError, AttributeMap, Item};

/// `source` marker carried by EventBridge scheduler events.
pub const SCHEDULER_SOURCE: &str = "aws.events";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed change batch: {0}")]
    MalformedBatch(#[source] serde_json::Error),
    #[error("{kind} record is missing its {image}")]
    MissingImage {
        kind: MutationKind,
        image: &'static str,
    },
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Top-level event received by the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Scheduled,
    ChangeBatch(ChangeBatch),
}

impl Envelope {
    /// Classifies a raw event. Anything that is not a scheduler event must
    /// carry a `Records` array.
    pub fn classify(event: Value) -> Result<Self, EnvelopeError> {
        if is_scheduled_event(&event) {
            return Ok(Self::Scheduled);
        }
        serde_json::from_value(event)
            .map(Self::ChangeBatch)
            .map_err(EnvelopeError::MalformedBatch)
    }
}

pub fn is_scheduled_event(event: &Value) -> bool {
    event
        .get("source")
        .and_then(Value::as_str)
        .map(|source| source == SCHEDULER_SOURCE)
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(rename = "Records")]
    pub records: Vec<StreamRecord>,
}

/// One stream record as delivered by DynamoDB Streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub dynamodb: StreamImages,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<AttributeMap>,
}

impl StreamRecord {
    /// Decodes both images into plain items without interpreting the event
    /// name.
    pub fn decode(&self) -> Result<DecodedRecord, EnvelopeError> {
        Ok(DecodedRecord {
            event_name: self.event_name.clone(),
            before: self.dynamodb.old_image.as_ref().map(unmarshall).transpose()?,
            after: self.dynamodb.new_image.as_ref().map(unmarshall).transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub event_name: Option<String>,
    pub before: Option<Item>,
    pub after: Option<Item>,
}

impl DecodedRecord {
    pub fn kind(&self) -> Option<MutationKind> {
        self.event_name.as_deref().and_then(MutationKind::parse)
    }

    /// Returns `Ok(None)` for event names outside the known mutation kinds.
    pub fn into_change(self) -> Result<Option<ChangeRecord>, EnvelopeError> {
        let Some(kind) = self.kind() else {
            return Ok(None);
        };
        let change = match kind {
            MutationKind::Insert => ChangeRecord::Insert {
                after: require(kind, self.after, "new image")?,
            },
            MutationKind::Modify => ChangeRecord::Modify {
                before: self.before,
                after: require(kind, self.after, "new image")?,
            },
            MutationKind::Remove => ChangeRecord::Remove {
                before: require(kind, self.before, "old image")?,
            },
        };
        Ok(Some(change))
    }
}

fn require(
    kind: MutationKind,
    image: Option<Item>,
    label: &'static str,
) -> Result<Item, EnvelopeError> {
    image.ok_or(EnvelopeError::MissingImage { kind, image: label })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Insert,
    Modify,
    Remove,
}

impl MutationKind {
    pub fn parse(event_name: &str) -> Option<Self> {
        match event_name {
            "INSERT" => Some(Self::Insert),
            "MODIFY" => Some(Self::Modify),
            "REMOVE" => Some(Self::Remove),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Modify => "MODIFY",
            Self::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized mutation with the snapshots its kind carries. The old image
/// of a MODIFY is absent when the stream only records new images.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    Insert { after: Item },
    Modify { before: Option<Item>, after: Item },
    Remove { before: Item },
}

impl ChangeRecord {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Insert { .. } => MutationKind::Insert,
            Self::Modify { .. } => MutationKind::Modify,
            Self::Remove { .. } => MutationKind::Remove,
        }
    }
}
