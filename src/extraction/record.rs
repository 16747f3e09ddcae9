//! Extraction output types

use super::rule::{FieldValue, HotelField};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat hotel record; the stable output artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRecord {
    /// Hotel name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Street address
    pub location: String,
    /// Numeric rating, 0 when absent
    pub rating: f64,
    /// Contact line
    pub contact: String,
    /// Review count text
    pub reviews: String,
    /// Property amenities block
    pub property_amenities: String,
    /// Room features block
    pub room_features: String,
}

impl HotelRecord {
    /// Store a value; fails when the value kind does not fit the field
    pub fn set(&mut self, field: HotelField, value: FieldValue) -> Result<(), String> {
        match (field, value) {
            (HotelField::Rating, FieldValue::Number(n)) => {
                self.rating = n;
                Ok(())
            }
            (HotelField::Rating, FieldValue::Text(text)) => Err(format!(
                "{} expects a number, got text '{}'",
                field, text
            )),
            (_, FieldValue::Number(n)) => Err(format!("{} expects text, got number {}", field, n)),
            (_, FieldValue::Text(text)) => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = text;
                }
                Ok(())
            }
        }
    }

    /// Current value of a field
    pub fn get(&self, field: HotelField) -> FieldValue {
        match field {
            HotelField::Rating => FieldValue::Number(self.rating),
            HotelField::Name => FieldValue::Text(self.name.clone()),
            HotelField::Description => FieldValue::Text(self.description.clone()),
            HotelField::Location => FieldValue::Text(self.location.clone()),
            HotelField::Contact => FieldValue::Text(self.contact.clone()),
            HotelField::Reviews => FieldValue::Text(self.reviews.clone()),
            HotelField::PropertyAmenities => FieldValue::Text(self.property_amenities.clone()),
            HotelField::RoomFeatures => FieldValue::Text(self.room_features.clone()),
        }
    }

    /// Whether every field is still at its zero value
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn text_slot(&mut self, field: HotelField) -> Option<&mut String> {
        match field {
            HotelField::Name => Some(&mut self.name),
            HotelField::Description => Some(&mut self.description),
            HotelField::Location => Some(&mut self.location),
            HotelField::Contact => Some(&mut self.contact),
            HotelField::Reviews => Some(&mut self.reviews),
            HotelField::PropertyAmenities => Some(&mut self.property_amenities),
            HotelField::RoomFeatures => Some(&mut self.room_features),
            HotelField::Rating => None,
        }
    }
}

/// Why a single rule failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FailureCause {
    /// No element (or not enough elements) matched
    #[error("no matching element")]
    NotFound,

    /// The wait for the element, its text or an action hit the deadline
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// Element text could not be turned into the field value
    #[error("transform failed: {0}")]
    TransformFailed(String),

    /// Click or typing could not be delivered
    #[error("action failed: {0}")]
    ActionFailed(String),
}

impl FailureCause {
    /// Whether this cause ends the run when raised by a required rule.
    /// Transform failures never do: the element existed.
    pub fn aborts_required(&self) -> bool {
        !matches!(self, FailureCause::TransformFailed(_))
    }
}

/// A failure recorded against one rule
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{field} ({selector}): {cause}")]
pub struct FieldError {
    /// Field key or action name
    pub field: String,
    /// Selector of the failing rule
    pub selector: String,
    /// What went wrong
    pub cause: FailureCause,
}

impl FieldError {
    /// Create a new field error
    pub fn new<F: Into<String>, S: Into<String>>(field: F, selector: S, cause: FailureCause) -> Self {
        Self {
            field: field.into(),
            selector: selector.into(),
            cause,
        }
    }
}

/// Lifecycle of one extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    /// Not started
    Pending,
    /// Evaluating rules
    Running,
    /// Every rule was evaluated
    Completed,
    /// A required rule's element was missing
    Aborted,
}

/// Record plus diagnostics of one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Fields gathered so far
    pub record: HotelRecord,
    /// Failures in rule order
    pub errors: Vec<FieldError>,
    /// Terminal state of the run
    pub status: RunStatus,
    /// Wall time of the run in milliseconds
    pub duration_ms: u64,
}

impl ExtractionResult {
    /// The error that aborted the run, if any
    pub fn terminal_error(&self) -> Option<&FieldError> {
        match self.status {
            RunStatus::Aborted => self.errors.last(),
            _ => None,
        }
    }

    /// Completed without a single failure
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed && self.errors.is_empty()
    }

    /// Completed, but some optional fields failed
    pub fn is_partial(&self) -> bool {
        self.status == RunStatus::Completed && !self.errors.is_empty()
    }

    /// Errors recorded against a given field key
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }
}
