//! Built-in rule table for TripAdvisor hotel pages
//!
//! Searches for a hotel from the home page, opens the first suggestion and
//! reads the detail page. The class selectors track TripAdvisor's generated
//! markup and go stale whenever the site is redeployed; pass a JSON table
//! with `--rules` to override them without a rebuild.

use crate::extraction::{ActionRule, ExtractionRule, HotelField, RuleSet, Transform};

/// Site root the search starts from
pub const BASE_URL: &str = "https://www.tripadvisor.com";

/// Hotel searched for when no query is given
pub const DEFAULT_QUERY: &str = "The Hay-Adams";

/// The home page can render two search inputs; the second one is used.
/// Sites showing a single input need `--search-index 0`.
pub const DEFAULT_SEARCH_INDEX: usize = 1;

/// Search input
pub const SEARCH_INPUT: &str = r#"input[type="search"]"#;
/// First entry of the suggestion dropdown
pub const SEARCH_RESULT: &str = r#"div[class="EtzER"]"#;
/// Hotel name heading
pub const NAME: &str = r#"h1[class="QdLfr b d Pn"]"#;
/// About section
pub const DESCRIPTION: &str = r#"div[class="fIrGe _T"]"#;
/// Review count
pub const REVIEWS: &str = r#"span[class="qqniT"]"#;
/// Phone number
pub const CONTACT: &str = r#"span[class="zNXea NXOxh NjUDn"]"#;
/// Street address
pub const LOCATION: &str = r#"span[class="fHvkI PTrfg"]"#;
/// Bubble rating
pub const RATING: &str = r#"span[class="IHSLZ P"]"#;
/// Amenity blocks; property amenities first, room features second
pub const AMENITY_BLOCKS: &str = r#"div[class="OsCbb K"]"#;

/// Rule table searching for `query` with the default search input
pub fn rules(query: &str) -> RuleSet {
    rules_with_search_index(query, DEFAULT_SEARCH_INDEX)
}

/// Rule table searching for `query` with the `search_index`-th search input
pub fn rules_with_search_index(query: &str, search_index: usize) -> RuleSet {
    RuleSet {
        actions: vec![
            ActionRule::type_text("search", SEARCH_INPUT, query).index(search_index),
            ActionRule::click("open_result", SEARCH_RESULT),
        ],
        fields: vec![
            ExtractionRule::new(HotelField::Name, NAME).required(),
            ExtractionRule::new(HotelField::Description, DESCRIPTION),
            ExtractionRule::new(HotelField::Reviews, REVIEWS),
            ExtractionRule::new(HotelField::Contact, CONTACT),
            ExtractionRule::new(HotelField::Location, LOCATION),
            ExtractionRule::new(HotelField::Rating, RATING).transform(Transform::Number),
            ExtractionRule::new(HotelField::PropertyAmenities, AMENITY_BLOCKS),
            ExtractionRule::new(HotelField::RoomFeatures, AMENITY_BLOCKS).index(1),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ActionKind;

    #[test]
    fn test_builtin_rules_are_valid() {
        assert!(rules(DEFAULT_QUERY).validate().is_ok());
    }

    #[test]
    fn test_every_field_has_a_rule() {
        let table = rules(DEFAULT_QUERY);
        for field in HotelField::ALL {
            assert!(
                table.fields.iter().any(|r| r.field == field),
                "no rule for {}",
                field
            );
        }
    }

    #[test]
    fn test_search_action_types_query() {
        let table = rules_with_search_index("Willard", 0);
        assert_eq!(table.actions[0].element_index, 0);
        assert_eq!(
            table.actions[0].action,
            ActionKind::Type("Willard".to_string())
        );
        assert!(table.actions.iter().all(|a| a.required));
    }

    #[test]
    fn test_only_name_is_required() {
        let required: Vec<_> = rules(DEFAULT_QUERY)
            .fields
            .iter()
            .filter(|r| r.required)
            .map(|r| r.field)
            .collect();
        assert_eq!(required, vec![HotelField::Name]);
    }
}
