//! Core data types shared across the assistant API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message in the assistant transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role that produced the message.
    pub role: Role,
    /// Message content.
    pub content: String,
    /// Timestamp for the message.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Speaker role for a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Position of the assistant conversation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the initial request description.
    Initial,
    /// Collecting clarification answers.
    Clarifying,
    /// Waiting on the external generator.
    Generating,
    /// Document delivered; inert until a manual reset.
    Completed,
}

impl Stage {
    /// Return the stage as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Clarifying => "clarifying",
            Stage::Generating => "generating",
            Stage::Completed => "completed",
        }
    }
}

/// Fixed catalogue of document categories.
///
/// Shared between the clarification-question catalogue and any document
/// selector in the presentation layer; treated as a configuration
/// constant, never discovered dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocType {
    /// Scaffolding rental contract.
    ScaffoldRental,
    /// Labor contract.
    LaborContract,
    /// Delivery note.
    DeliveryNote,
    /// Return note.
    ReturnNote,
    /// Financial claim.
    FinancialClaim,
    /// Price quote.
    PriceQuote,
    /// Official letter.
    OfficialLetter,
}

impl DocType {
    /// All catalogue entries, in selector order.
    pub const ALL: [DocType; 7] = [
        DocType::ScaffoldRental,
        DocType::LaborContract,
        DocType::DeliveryNote,
        DocType::ReturnNote,
        DocType::FinancialClaim,
        DocType::PriceQuote,
        DocType::OfficialLetter,
    ];

    /// Return the Arabic category label.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::ScaffoldRental => "عقد إيجار سقالات",
            DocType::LaborContract => "عقد عمل",
            DocType::DeliveryNote => "سند تسليم",
            DocType::ReturnNote => "سند إرجاع",
            DocType::FinancialClaim => "مطالبة مالية",
            DocType::PriceQuote => "عرض سعر",
            DocType::OfficialLetter => "خطاب رسمي",
        }
    }

    /// Parse a category label, returning None for unknown labels.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocType, Role, Stage};
    use pretty_assertions::assert_eq;

    #[test]
    fn doc_type_labels_round_trip() {
        for doc_type in DocType::ALL {
            assert_eq!(DocType::parse(doc_type.as_str()), Some(doc_type));
        }
        assert_eq!(DocType::parse("فاتورة مجهولة"), None);
    }

    #[test]
    fn role_and_stage_format_as_lowercase() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(Stage::Initial.as_str(), "initial");
        assert_eq!(Stage::Completed.as_str(), "completed");
    }
}
