//! Allow-list HTML sanitization of mention content.

use std::collections::{HashMap, HashSet};

use ammonia::Builder as AmmoniaBuilder;
use mentions_core::HtmlPolicy;

/// Tags whose content is dropped along with the tag unless the policy allows them.
const CLEAN_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// Build a sanitizer that keeps only what `policy` names.
pub fn build_sanitizer(policy: &HtmlPolicy) -> AmmoniaBuilder<'_> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&str> = policy.tags.iter().map(String::as_str).collect();
    let attributes: HashMap<&str, HashSet<&str>> = policy
        .attributes
        .iter()
        .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
        .collect();
    let clean_content: HashSet<&str> = CLEAN_CONTENT_TAGS.into_iter().filter(|t| !tags.contains(t)).collect();

    builder.tags(tags);
    builder.tag_attributes(attributes);
    builder.clean_content_tags(clean_content);
    builder.generic_attributes(HashSet::new());
    builder.link_rel(None);

    builder
}
