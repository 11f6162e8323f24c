//! Filter policy: decides which interaction targets are audit-worthy.

use crate::config::FilterConfig;
use clicktrail_dom::Element;
use std::fmt;

/// Attribute that opts an element out of auditing.
pub const OPT_OUT_ATTRIBUTE: &str = "data-no-audit";

const INTERACTIVE_TAGS: &[&str] = &["button", "a", "input", "select", "textarea", "form"];
const INTERACTIVE_ROLES: &[&str] = &["button", "link", "menuitem", "tab"];

/// Outcome of the filter policy, naming the rule that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Track,
    SkipTag,
    SkipClass,
    SkipId,
    OptOut,
    NotInTagAllowList,
    NotInClassAllowList,
    NotInteractive,
}

impl FilterDecision {
    /// Whether the element should be tracked.
    pub fn is_track(self) -> bool {
        matches!(self, Self::Track)
    }
}

impl fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Track => "track",
            Self::SkipTag => "skip_tag",
            Self::SkipClass => "skip_class",
            Self::SkipId => "skip_id",
            Self::OptOut => "opt_out",
            Self::NotInTagAllowList => "not_in_tag_allow_list",
            Self::NotInClassAllowList => "not_in_class_allow_list",
            Self::NotInteractive => "not_interactive",
        })
    }
}

/// Apply the policy rules in order; the first matching rule decides.
pub fn evaluate(element: &Element, config: &FilterConfig) -> FilterDecision {
    let tag = element.tag_name();

    if config.skip_tags.contains(tag) {
        return FilterDecision::SkipTag;
    }
    if element.classes().iter().any(|c| config.skip_classes.contains(c)) {
        return FilterDecision::SkipClass;
    }
    if element.id().is_some_and(|id| config.skip_ids.contains(id)) {
        return FilterDecision::SkipId;
    }
    if element.has_attribute(OPT_OUT_ATTRIBUTE) {
        return FilterDecision::OptOut;
    }
    if let Some(allowed) = &config.track_only_tags {
        if !allowed.contains(tag) {
            return FilterDecision::NotInTagAllowList;
        }
    }
    if let Some(allowed) = &config.track_only_classes {
        if !element.classes().iter().any(|c| allowed.contains(c)) {
            return FilterDecision::NotInClassAllowList;
        }
    }
    if is_interactive(element) {
        FilterDecision::Track
    } else {
        FilterDecision::NotInteractive
    }
}

/// Convenience wrapper over [`evaluate`].
pub fn should_track(element: &Element, config: &FilterConfig) -> bool {
    evaluate(element, config).is_track()
}

/// Interactive tag, role, or class affordance.
pub fn is_interactive(element: &Element) -> bool {
    if INTERACTIVE_TAGS.contains(&element.tag_name()) {
        return true;
    }
    if let Some(role) = element.attribute("role") {
        if INTERACTIVE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    element
        .classes()
        .iter()
        .any(|c| c == "clickable" || c.contains("btn") || c.contains("button"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use test_case::test_case;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test_case(Element::new("button"), FilterDecision::Track; "button")]
    #[test_case(Element::new("A").with_attr("href", "/x"), FilterDecision::Track; "upper case anchor")]
    #[test_case(Element::new("div").with_attr("role", "tab"), FilterDecision::Track; "role tab")]
    #[test_case(Element::new("span").with_class("clickable"), FilterDecision::Track; "clickable class")]
    #[test_case(Element::new("div").with_class("nav-btn"), FilterDecision::Track; "btn substring")]
    #[test_case(Element::new("div").with_class("text"), FilterDecision::NotInteractive; "plain div")]
    #[test_case(Element::new("body"), FilterDecision::SkipTag; "body")]
    #[test_case(Element::new("button").with_class("btn no-audit"), FilterDecision::SkipClass; "skip class")]
    #[test_case(Element::new("button").with_attr(OPT_OUT_ATTRIBUTE, ""), FilterDecision::OptOut; "opt out")]
    fn test_default_policy(element: Element, expected: FilterDecision) {
        assert_eq!(evaluate(&element, &FilterConfig::default()), expected);
    }

    #[test]
    fn test_skip_id() {
        let config = FilterConfig {
            skip_ids: set(&["promo"]),
            ..Default::default()
        };
        let el = Element::new("button").with_id("promo");
        assert_eq!(evaluate(&el, &config), FilterDecision::SkipId);
        assert!(should_track(&Element::new("button").with_id("buy"), &config));
    }

    #[test]
    fn test_allow_lists() {
        let config = FilterConfig {
            track_only_tags: Some(set(&["button"])),
            track_only_classes: Some(set(&["primary"])),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&Element::new("a"), &config),
            FilterDecision::NotInTagAllowList
        );
        assert_eq!(
            evaluate(&Element::new("button").with_class("secondary"), &config),
            FilterDecision::NotInClassAllowList
        );
        assert!(should_track(&Element::new("button").with_class("primary"), &config));
    }

    #[test]
    fn test_class_comparison_is_exact() {
        let config = FilterConfig {
            skip_classes: set(&["No-Audit"]),
            ..Default::default()
        };
        assert!(should_track(&Element::new("button").with_class("no-audit"), &config));
    }

    fn element_strategy() -> impl Strategy<Value = Element> {
        (
            prop::sample::select(vec!["button", "a", "div", "span", "input", "body", "script"]),
            prop::collection::vec(
                prop::sample::select(vec!["btn", "no-audit", "primary", "clickable", "text"]),
                0..3,
            ),
            prop::option::of(prop::sample::select(vec!["buy", "promo", "nav"])),
            prop::option::of(prop::sample::select(vec!["button", "link", "presentation"])),
            any::<bool>(),
        )
            .prop_map(|(tag, classes, id, role, opt_out)| {
                let mut el = Element::new(tag).with_class(classes.join(" "));
                if let Some(id) = id {
                    el = el.with_id(id);
                }
                if let Some(role) = role {
                    el = el.with_attr("role", role);
                }
                if opt_out {
                    el = el.with_attr(OPT_OUT_ATTRIBUTE, "true");
                }
                el
            })
    }

    proptest! {
        #[test]
        fn prop_policy_is_deterministic(el in element_strategy()) {
            let config = FilterConfig::default();
            prop_assert_eq!(evaluate(&el, &config), evaluate(&el, &config));
        }

        #[test]
        fn prop_exclusion_beats_allow_lists(el in element_strategy()) {
            let tag = el.tag_name().to_string();
            let mut classes: BTreeSet<String> = el.classes().iter().cloned().collect();
            classes.insert("btn".into());
            let config = FilterConfig {
                skip_classes: set(&["no-audit"]),
                track_only_tags: Some(set(&[tag.as_str()])),
                track_only_classes: Some(classes),
                ..Default::default()
            };
            let excluded = config.skip_tags.contains(&tag)
                || el.has_class("no-audit")
                || el.has_attribute(OPT_OUT_ATTRIBUTE);
            if excluded {
                prop_assert!(!should_track(&el, &config));
            }
        }
    }
}
