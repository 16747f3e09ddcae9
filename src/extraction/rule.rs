//! Declarative extraction rules
//!
//! A [`RuleSet`] is an ordered list of [`ActionRule`]s (typing into a search
//! box, clicking a result) followed by an ordered list of [`ExtractionRule`]s
//! that each populate one [`HotelField`]. Rule tables can be built in code or
//! loaded from JSON.

use crate::error::{Result, RuleError};
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument};

/// Placeholder substituted by [`RuleSet::with_query`]
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// The fields of a [`HotelRecord`](super::HotelRecord)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HotelField {
    /// Hotel name
    Name,
    /// Free-text description
    Description,
    /// Street address
    Location,
    /// Numeric rating
    Rating,
    /// Phone number or other contact line
    Contact,
    /// Review count text
    Reviews,
    /// Property amenities block
    PropertyAmenities,
    /// Room features block
    RoomFeatures,
}

impl HotelField {
    /// All fields, in output order
    pub const ALL: [HotelField; 8] = [
        HotelField::Name,
        HotelField::Description,
        HotelField::Location,
        HotelField::Rating,
        HotelField::Contact,
        HotelField::Reviews,
        HotelField::PropertyAmenities,
        HotelField::RoomFeatures,
    ];

    /// JSON key of this field in the output record
    pub fn key(self) -> &'static str {
        match self {
            HotelField::Name => "name",
            HotelField::Description => "description",
            HotelField::Location => "location",
            HotelField::Rating => "rating",
            HotelField::Contact => "contact",
            HotelField::Reviews => "reviews",
            HotelField::PropertyAmenities => "propertyAmenities",
            HotelField::RoomFeatures => "roomFeatures",
        }
    }

    /// Whether the field holds a number rather than text
    pub fn is_numeric(self) -> bool {
        matches!(self, HotelField::Rating)
    }
}

impl fmt::Display for HotelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A value produced for a field, before it is stored on the record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text content
    Text(String),
    /// Parsed number
    Number(f64),
}

/// Signature of a caller-supplied transform
pub type TransformFn = Arc<dyn Fn(&str) -> std::result::Result<FieldValue, String> + Send + Sync>;

/// Post-processing applied to an element's text
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transform {
    /// Trim and parse the whole text as a finite number
    Number,
    /// Parse the first number in the text ("1,234 reviews" -> 1234)
    FirstNumber,
    /// Trim surrounding whitespace
    Trim,
    /// Caller-supplied closure
    #[serde(skip)]
    Custom(TransformFn),
}

impl Transform {
    /// Wrap a closure as a transform
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<FieldValue, String> + Send + Sync + 'static,
    {
        Transform::Custom(Arc::new(f))
    }

    /// Apply the transform to raw element text
    pub fn apply(&self, text: &str) -> std::result::Result<FieldValue, String> {
        match self {
            Transform::Number => parse_finite(text.trim()),
            Transform::FirstNumber => {
                let re = first_number_pattern()
                    .as_ref()
                    .map_err(|e| e.to_string())?;
                let found = re
                    .find(text)
                    .ok_or_else(|| format!("no number in '{}'", text.trim()))?;
                parse_finite(&found.as_str().replace(',', ""))
            }
            Transform::Trim => Ok(FieldValue::Text(text.trim().to_string())),
            Transform::Custom(f) => f(text),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Number => f.write_str("Number"),
            Transform::FirstNumber => f.write_str("FirstNumber"),
            Transform::Trim => f.write_str("Trim"),
            Transform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn parse_finite(text: &str) -> std::result::Result<FieldValue, String> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(FieldValue::Number(n)),
        Ok(_) => Err(format!("'{}' is not a finite number", text)),
        Err(e) => Err(format!("'{}' is not a number: {}", text, e)),
    }
}

fn first_number_pattern() -> &'static std::result::Result<Regex, regex::Error> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?"))
}

/// Rule populating one record field from one element
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRule {
    /// Target field
    pub field: HotelField,
    /// CSS selector
    pub selector: String,
    /// Abort the run when the element cannot be found
    #[serde(default)]
    pub required: bool,
    /// Which match to read when the selector yields several
    #[serde(default)]
    pub element_index: usize,
    /// Optional post-processing of the element text
    #[serde(default)]
    pub transform: Option<Transform>,
}

impl ExtractionRule {
    /// Optional rule reading the first match as text
    pub fn new<S: Into<String>>(field: HotelField, selector: S) -> Self {
        Self {
            field,
            selector: selector.into(),
            required: false,
            element_index: 0,
            transform: None,
        }
    }

    /// Mark the rule as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Read the `index`-th match instead of the first
    pub fn index(mut self, index: usize) -> Self {
        self.element_index = index;
        self
    }

    /// Set the transform
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// Interaction performed by an [`ActionRule`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum ActionKind {
    /// Focus the element and type text into it
    Type(String),
    /// Click the element
    Click,
}

/// Rule that interacts with the page before extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRule {
    /// Label used in error reports
    pub name: String,
    /// CSS selector
    pub selector: String,
    /// Which match to act on when the selector yields several
    #[serde(default)]
    pub element_index: usize,
    /// What to do with the element
    pub action: ActionKind,
    /// Abort the run when the action cannot be delivered (default: true)
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl ActionRule {
    /// Required rule typing `text` into the first match
    pub fn type_text<N: Into<String>, S: Into<String>, T: Into<String>>(
        name: N,
        selector: S,
        text: T,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            element_index: 0,
            action: ActionKind::Type(text.into()),
            required: true,
        }
    }

    /// Required rule clicking the first match
    pub fn click<N: Into<String>, S: Into<String>>(name: N, selector: S) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            element_index: 0,
            action: ActionKind::Click,
            required: true,
        }
    }

    /// Act on the `index`-th match instead of the first
    pub fn index(mut self, index: usize) -> Self {
        self.element_index = index;
        self
    }

    /// Let the run continue when this action fails
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Ordered actions followed by ordered field rules
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Interactions, executed first
    #[serde(default)]
    pub actions: Vec<ActionRule>,
    /// Field extraction rules
    pub fields: Vec<ExtractionRule>,
}

impl RuleSet {
    /// Rule set with field rules only
    pub fn new(fields: Vec<ExtractionRule>) -> Self {
        Self {
            actions: Vec::new(),
            fields,
        }
    }

    /// Append an action rule
    pub fn with_action(mut self, action: ActionRule) -> Self {
        self.actions.push(action);
        self
    }

    /// Parse a JSON rule table
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load a JSON rule table from disk
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let rules = Self::from_json_str(&json)?;
        debug!(
            "Loaded {} actions and {} field rules",
            rules.actions.len(),
            rules.fields.len()
        );
        Ok(rules)
    }

    /// Substitute `{query}` in every typed text
    pub fn with_query(mut self, query: &str) -> Self {
        for action in &mut self.actions {
            if let ActionKind::Type(text) = &mut action.action {
                *text = text.replace(QUERY_PLACEHOLDER, query);
            }
        }
        self
    }

    /// Check that the table is usable
    pub fn validate(&self) -> std::result::Result<(), RuleError> {
        if self.fields.is_empty() {
            return Err(RuleError::NoFieldRules);
        }
        let selectors = self
            .actions
            .iter()
            .map(|a| (a.name.clone(), a.selector.as_str()))
            .chain(
                self.fields
                    .iter()
                    .map(|r| (r.field.key().to_string(), r.selector.as_str())),
            );
        for (rule, selector) in selectors {
            if selector.trim().is_empty() {
                return Err(RuleError::EmptySelector(rule));
            }
            if let Err(e) = Selector::parse(selector) {
                return Err(RuleError::InvalidSelector {
                    rule,
                    selector: selector.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_match_serde() {
        for field in HotelField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn test_only_rating_is_numeric() {
        let numeric: Vec<_> = HotelField::ALL
            .into_iter()
            .filter(|f| f.is_numeric())
            .collect();
        assert_eq!(numeric, vec![HotelField::Rating]);
    }

    #[test]
    fn test_number_transform() {
        assert_eq!(Transform::Number.apply(" 4.5 "), Ok(FieldValue::Number(4.5)));
        assert!(Transform::Number.apply("N/A").is_err());
        assert!(Transform::Number.apply("NaN").is_err());
        assert!(Transform::Number.apply("").is_err());
    }

    #[test]
    fn test_first_number_transform() {
        assert_eq!(
            Transform::FirstNumber.apply("1,234 reviews"),
            Ok(FieldValue::Number(1234.0))
        );
        assert_eq!(
            Transform::FirstNumber.apply("Rated 4.5 of 5"),
            Ok(FieldValue::Number(4.5))
        );
        assert!(Transform::FirstNumber.apply("no reviews yet").is_err());
    }

    #[test]
    fn test_trim_and_custom_transform() {
        assert_eq!(
            Transform::Trim.apply("\n  The Hay-Adams \t"),
            Ok(FieldValue::Text("The Hay-Adams".to_string()))
        );
        let upper = Transform::custom(|s| Ok(FieldValue::Text(s.to_uppercase())));
        assert_eq!(upper.apply("dc"), Ok(FieldValue::Text("DC".to_string())));
        assert_eq!(format!("{:?}", upper), "Custom(..)");
    }

    #[test]
    fn test_rule_builder() {
        let rule = ExtractionRule::new(HotelField::Rating, "span.rating")
            .required()
            .index(2)
            .transform(Transform::Number);
        assert!(rule.required);
        assert_eq!(rule.element_index, 2);
        assert!(matches!(rule.transform, Some(Transform::Number)));
    }

    #[test]
    fn test_rule_set_from_json() {
        let json = r#"{
            "actions": [
                {"name": "search", "selector": "input[type=\"search\"]", "elementIndex": 1,
                 "action": {"kind": "type", "text": "{query}"}},
                {"name": "open", "selector": "div.result", "action": {"kind": "click"}, "required": false}
            ],
            "fields": [
                {"field": "name", "selector": "h1.title", "required": true},
                {"field": "rating", "selector": "span.rating", "transform": "number"},
                {"field": "roomFeatures", "selector": "div.block", "elementIndex": 1}
            ]
        }"#;

        let rules = RuleSet::from_json_str(json).unwrap().with_query("The Hay-Adams");
        assert_eq!(rules.actions.len(), 2);
        assert_eq!(rules.actions[0].element_index, 1);
        assert!(rules.actions[0].required);
        assert_eq!(
            rules.actions[0].action,
            ActionKind::Type("The Hay-Adams".to_string())
        );
        assert_eq!(rules.actions[1].action, ActionKind::Click);
        assert!(!rules.actions[1].required);

        assert_eq!(rules.fields.len(), 3);
        assert!(rules.fields[0].required);
        assert!(!rules.fields[1].required);
        assert!(matches!(rules.fields[1].transform, Some(Transform::Number)));
        assert_eq!(rules.fields[2].field, HotelField::RoomFeatures);
        assert_eq!(rules.fields[2].element_index, 1);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        assert_eq!(RuleSet::default().validate(), Err(RuleError::NoFieldRules));

        let empty = RuleSet::new(vec![ExtractionRule::new(HotelField::Name, "  ")]);
        assert_eq!(
            empty.validate(),
            Err(RuleError::EmptySelector("name".to_string()))
        );

        let broken = RuleSet::new(vec![ExtractionRule::new(HotelField::Name, "h1")])
            .with_action(ActionRule::click("open", "div[class="));
        assert!(matches!(
            broken.validate(),
            Err(RuleError::InvalidSelector { rule, .. }) if rule == "open"
        ));
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let json = r#"{"fields": [{"field": "price", "selector": "span"}]}"#;
        assert!(RuleSet::from_json_str(json).is_err());
    }
}
