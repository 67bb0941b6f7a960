//! HTML metadata extraction

use scraper::{Html, Selector};

use super::PageMetadata;

/// Extract metadata from an HTML document
///
/// Title: `og:title`, falling back to `<title>`.
/// Description: `meta[name=description]`, falling back to `og:description`.
/// Preview image: `og:image`.
pub fn parse_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let meta_content = |css: &str| -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .find(|content| !content.is_empty())
    };

    let title = meta_content("meta[property='og:title']")
        .or_else(|| {
            let selector = Selector::parse("title").ok()?;
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|title| !title.is_empty())
        })
        .unwrap_or_default();

    let description = meta_content("meta[name='description']")
        .or_else(|| meta_content("meta[property='og:description']"))
        .unwrap_or_default();

    PageMetadata {
        title,
        description,
        preview_image_url: meta_content("meta[property='og:image']"),
    }
}
