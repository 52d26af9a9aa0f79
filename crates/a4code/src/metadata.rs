//! Link metadata supplied by the host, and the card markup built from it.

use std::collections::HashMap;

use crate::url::{escape_text, sanitize_url};

/// Preview data for an external link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub title: String,
    pub description: String,
    /// Preview image. Only `http`/`https` images are shown.
    pub image_url: String,
}

impl LinkMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image_url: String::new(),
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Tooltip text: `title - description`, or whichever half is present.
    pub fn tooltip(&self) -> String {
        match (self.title.is_empty(), self.description.is_empty()) {
            (_, true) => self.title.clone(),
            (true, false) => self.description.clone(),
            (false, false) => format!("{} - {}", self.title, self.description),
        }
    }
}

/// Looks up preview data for a link target.
pub trait LinkMetadataProvider {
    fn metadata(&self, url: &str) -> Option<LinkMetadata>;
}

impl<F> LinkMetadataProvider for F
where
    F: Fn(&str) -> Option<LinkMetadata>,
{
    fn metadata(&self, url: &str) -> Option<LinkMetadata> {
        self(url)
    }
}

impl LinkMetadataProvider for HashMap<String, LinkMetadata> {
    fn metadata(&self, url: &str) -> Option<LinkMetadata> {
        self.get(url).cloned()
    }
}

pub(crate) const CARD_CLOSE: &str = "</div></div></a></div>";

fn card_image(meta: &LinkMetadata) -> String {
    if meta.image_url.is_empty() {
        return String::new();
    }
    match sanitize_url(&meta.image_url) {
        (safe, true) => format!(r#"<img src="{safe}" class="external-link-image" />"#),
        _ => String::new(),
    }
}

/// Opens a card up to the title element. The caller writes the title and
/// closes with [`CARD_CLOSE`].
pub(crate) fn card_open(safe_href: &str, meta: &LinkMetadata) -> String {
    format!(
        r#"<div class="external-link-card"><a href="{safe_href}" target="_blank" class="external-link-card-inner">{}<div class="external-link-content"><div class="external-link-title">"#,
        card_image(meta)
    )
}

/// A complete card titled from the metadata, falling back to the raw URL.
pub(crate) fn full_card(safe_href: &str, raw_url: &str, meta: &LinkMetadata) -> String {
    let title = if meta.title.is_empty() {
        raw_url
    } else {
        &meta.title
    };
    format!(
        r#"{}{}</div><div class="external-link-description">{}</div></div></a></div>"#,
        card_open(safe_href, meta),
        escape_text(title),
        escape_text(&meta.description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_card_markup() {
        let meta = LinkMetadata::new("Example Title", "Example Description")
            .with_image("http://example.com/image.jpg");
        assert_eq!(
            full_card("http://example.com/card", "http://example.com/card", &meta),
            concat!(
                r#"<div class="external-link-card"><a href="http://example.com/card" target="_blank" class="external-link-card-inner">"#,
                r#"<img src="http://example.com/image.jpg" class="external-link-image" />"#,
                r#"<div class="external-link-content"><div class="external-link-title">Example Title</div>"#,
                r#"<div class="external-link-description">Example Description</div></div></a></div>"#,
            )
        );
    }

    #[test]
    fn unsafe_card_images_are_dropped() {
        let meta = LinkMetadata::new("", "d").with_image("javascript:x");
        let card = full_card("http://x", "http://x", &meta);
        assert!(!card.contains("<img"));
        assert!(card.contains(r#"<div class="external-link-title">http://x</div>"#));
    }

    #[test]
    fn tooltip_joins_present_parts() {
        assert_eq!(LinkMetadata::new("T", "D").tooltip(), "T - D");
        assert_eq!(LinkMetadata::new("T", "").tooltip(), "T");
        assert_eq!(LinkMetadata::new("", "D").tooltip(), "D");
    }

    #[test]
    fn closures_and_maps_provide_metadata() {
        let closure = |url: &str| (url == "a").then(|| LinkMetadata::new("A", ""));
        assert_eq!(closure.metadata("a").unwrap().title, "A");
        assert!(closure.metadata("b").is_none());

        let map = HashMap::from([("a".to_string(), LinkMetadata::new("A", ""))]);
        assert_eq!(map.metadata("a").unwrap().title, "A");
    }
}
