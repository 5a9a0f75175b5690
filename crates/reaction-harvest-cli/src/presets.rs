//! Built-in site presets.
//!
//! The harvest core carries no selectors of its own; these are the values
//! used when the configuration file does not override them.

use reaction_harvest::{FieldLocator, FieldLocators, HarvestConfig, ListSelectors, Timing};

/// Profile photo in the global navigation bar, only rendered when signed in.
pub const LINKEDIN_LOGGED_IN: &str = "img.global-nav__me-photo";

/// Reactions dialog of a LinkedIn post.
pub fn linkedin_reactions() -> HarvestConfig {
    HarvestConfig {
        selectors: ListSelectors {
            trigger: "button.social-details-social-counts__count-value".to_string(),
            container: "div.artdeco-modal__content".to_string(),
            list: "div.social-details-reactors-tab-body ul".to_string(),
            item: "li.social-details-reactors-tab-body-list-item".to_string(),
        },
        fields: FieldLocators {
            user_name: FieldLocator::text(
                ".artdeco-entity-lockup__title span[aria-hidden='true']",
            ),
            current_role: FieldLocator::text(".artdeco-entity-lockup__caption"),
            profile_link: FieldLocator::attribute("a", "href"),
            reaction_type: FieldLocator::attribute(
                "img.reactions-icon",
                "data-test-reactions-icon-type",
            ),
        },
        timing: Timing::default(),
    }
}
