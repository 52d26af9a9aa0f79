//! Host hooks for link and image rendering in the single-pass converter.

use crate::metadata::{CARD_CLOSE, LinkMetadataProvider, card_open, full_card};
use crate::url::{escape_text, sanitize_url};

/// HTML produced for one link by a [`LinkProvider`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRender {
    /// Written as soon as the link target is read.
    pub open: String,
    /// Written when the link's `]` is reached.
    pub close: String,
    /// `open` is the whole rendering; an immediately closed link has its `]`
    /// (and, for a block link, the line break after it) consumed.
    pub consume_immediate: bool,
}

impl LinkRender {
    /// Rendering that wraps the link label.
    pub fn wrap(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
            consume_immediate: false,
        }
    }

    /// Rendering that stands for the whole link.
    pub fn complete(html: impl Into<String>) -> Self {
        Self {
            open: html.into(),
            close: String::new(),
            consume_immediate: true,
        }
    }
}

/// Custom link rendering for [`A4code2Html`](super::A4code2Html).
///
/// `url` is the raw, unsanitized target; implementations are responsible for
/// validating and escaping it.
pub trait LinkProvider {
    fn render_link(&self, url: &str, is_block: bool, is_immediate_close: bool) -> LinkRender;

    /// Rewrites an image (`"img"`) target. The default keeps it unchanged.
    fn map_image_url(&self, _tag: &str, value: &str) -> String {
        value.to_string()
    }
}

/// Renders links with previews from a [`LinkMetadataProvider`]:
///
/// | link                           | with metadata          | without          |
/// |--------------------------------|------------------------|------------------|
/// | own line, no label             | full card              | anchor with URL  |
/// | own line, labelled             | card titled by label   | anchor           |
/// | inline, no label               | anchor with title      | anchor with URL  |
/// | inline, labelled               | anchor                 | anchor           |
///
/// Targets that are not http(s) degrade to their escaped text.
#[derive(Debug, Clone, Default)]
pub struct MetadataLinkProvider<P> {
    metadata: P,
}

impl<P: LinkMetadataProvider> MetadataLinkProvider<P> {
    pub fn new(metadata: P) -> Self {
        Self { metadata }
    }
}

impl<P: LinkMetadataProvider> LinkProvider for MetadataLinkProvider<P> {
    fn render_link(&self, url: &str, is_block: bool, is_immediate_close: bool) -> LinkRender {
        let (safe, ok) = sanitize_url(url);
        if !ok {
            return LinkRender::wrap(safe, "");
        }
        let meta = self.metadata.metadata(url);
        match meta {
            Some(meta) if is_block && is_immediate_close => LinkRender::complete(full_card(&safe, url, &meta)),
            Some(meta) if is_block => LinkRender::wrap(card_open(&safe, &meta), CARD_CLOSE),
            meta if is_immediate_close => {
                let text = meta
                    .map(|m| m.title)
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| url.to_string());
                LinkRender::wrap(
                    format!(r#"<a href="{safe}" target="_blank">{}"#, escape_text(&text)),
                    "</a>",
                )
            }
            _ => LinkRender::wrap(format!(r#"<a href="{safe}" target="_blank">"#), "</a>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::LinkMetadata;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn provider() -> MetadataLinkProvider<impl LinkMetadataProvider> {
        MetadataLinkProvider::new(|url: &str| {
            (url == "http://example.com/card").then(|| LinkMetadata::new("Example Title", "Example Description"))
        })
    }

    #[test]
    fn unsafe_targets_degrade_to_text() {
        assert_eq!(
            provider().render_link("javascript:alert(1)", true, true),
            LinkRender::wrap("javascript:alert(1)", "")
        );
    }

    #[test]
    fn block_immediate_link_with_metadata_is_a_complete_card() {
        let render = provider().render_link("http://example.com/card", true, true);
        assert!(render.consume_immediate);
        assert!(render.open.starts_with(r#"<div class="external-link-card">"#));
        assert!(render.open.ends_with("</div></a></div>"));
        assert_eq!(render.close, "");
    }

    #[test]
    fn labelled_block_link_with_metadata_opens_a_card() {
        let render = provider().render_link("http://example.com/card", true, false);
        assert!(!render.consume_immediate);
        assert!(render.open.ends_with(r#"<div class="external-link-title">"#));
        assert_eq!(render.close, CARD_CLOSE);
    }

    #[rstest]
    #[case("http://example.com/card", false, true, r#"<a href="http://example.com/card" target="_blank">Example Title"#)]
    #[case("http://example.com/none", false, true, r#"<a href="http://example.com/none" target="_blank">http://example.com/none"#)]
    #[case("http://example.com/none", true, true, r#"<a href="http://example.com/none" target="_blank">http://example.com/none"#)]
    #[case("http://example.com/card", false, false, r#"<a href="http://example.com/card" target="_blank">"#)]
    fn anchors(#[case] url: &str, #[case] block: bool, #[case] immediate: bool, #[case] open: &str) {
        assert_eq!(provider().render_link(url, block, immediate), LinkRender::wrap(open, "</a>"));
    }

    #[test]
    fn image_targets_pass_through_by_default() {
        assert_eq!(provider().map_image_url("img", "a.png"), "a.png");
    }
}
