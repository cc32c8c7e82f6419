//! Markdown structure analysis shared by the scorer and the composer.
//!
//! Counting is done on the parsed event stream, not with line regexes,
//! so headings inside code fences or images written in reference style
//! are handled correctly.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// H2/H3 heading tally for one document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingCounts {
    pub h2: usize,
    pub h3: usize,
}

pub fn heading_counts(body: &str) -> HeadingCounts {
    let mut counts = HeadingCounts { h2: 0, h3: 0 };
    for event in Parser::new(body) {
        if let Event::Start(Tag::Heading { level, .. }) = event {
            match level {
                HeadingLevel::H2 => counts.h2 += 1,
                HeadingLevel::H3 => counts.h3 += 1,
                _ => {}
            }
        }
    }
    counts
}

/// An image embedded in the body, with whatever alt text it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub alt: String,
    pub url: String,
}

pub fn inline_images(body: &str) -> Vec<InlineImage> {
    let mut images = Vec::new();
    let mut current: Option<InlineImage> = None;
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Image { dest_url, .. }) => {
                current = Some(InlineImage {
                    alt: String::new(),
                    url: dest_url.to_string(),
                });
            }
            // Alt text arrives as text events between start and end.
            Event::Text(text) => {
                if let Some(image) = current.as_mut() {
                    image.alt.push_str(&text);
                }
            }
            Event::End(TagEnd::Image) => {
                if let Some(image) = current.take() {
                    images.push(image);
                }
            }
            _ => {}
        }
    }
    images
}

/// Root-relative link destinations (`/posts/...`). Protocol-relative
/// `//host/...` URLs point off-site and do not count.
pub fn internal_links(body: &str) -> Vec<String> {
    Parser::new(body)
        .filter_map(|event| match event {
            Event::Start(Tag::Link { dest_url, .. })
                if dest_url.starts_with('/') && !dest_url.starts_with("//") =>
            {
                Some(dest_url.to_string())
            }
            _ => None,
        })
        .collect()
}

/// Case-insensitive, non-overlapping occurrence count of `keyword`.
pub fn count_keyword(body: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    let haystack = body.to_lowercase();
    let needle = keyword.to_lowercase();
    haystack.matches(needle.as_str()).count()
}

/// Insert standalone blocks (image embeds) into the body, spread
/// evenly across its H2 sections. Each block lands right after a
/// section heading. Bodies without H2 headings get the blocks
/// appended at the end.
pub fn insert_after_sections(body: &str, blocks: &[String]) -> String {
    if blocks.is_empty() {
        return body.to_string();
    }

    let mut paragraphs: Vec<String> = body.split("\n\n").map(str::to_string).collect();
    let heading_positions: Vec<usize> = paragraphs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.trim_start().starts_with("## "))
        .map(|(i, _)| i)
        .collect();

    if heading_positions.is_empty() {
        paragraphs.extend(blocks.iter().cloned());
        return paragraphs.join("\n\n");
    }

    let interval = (heading_positions.len() / blocks.len()).max(1);
    let mut inserted = 0;
    for (index, block) in blocks.iter().enumerate() {
        let slot = ((index + 1) * interval - 1).min(heading_positions.len() - 1);
        let position = (heading_positions[slot] + 1 + inserted).min(paragraphs.len());
        paragraphs.insert(position, block.clone());
        inserted += 1;
    }
    paragraphs.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // heading_counts tests
    // =========================================================================

    #[test]
    fn counts_h2_and_h3() {
        let body = "# Top\n\n## One\n\ntext\n\n## Two\n\n### Deep\n\n#### Deeper\n";
        let counts = heading_counts(body);
        assert_eq!(counts.h2, 2);
        assert_eq!(counts.h3, 1);
    }

    #[test]
    fn headings_inside_code_fences_do_not_count() {
        let body = "## Real\n\n```\n## not a heading\n### nor this\n```\n";
        let counts = heading_counts(body);
        assert_eq!(counts.h2, 1);
        assert_eq!(counts.h3, 0);
    }

    #[test]
    fn empty_body_has_no_headings() {
        assert_eq!(heading_counts(""), HeadingCounts { h2: 0, h3: 0 });
    }

    // =========================================================================
    // inline_images tests
    // =========================================================================

    #[test]
    fn finds_images_with_alt_text() {
        let body = "intro\n\n![a tidy desk](/assets/img/posts/desk.jpg)\n\nmore\n";
        let images = inline_images(body);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].alt, "a tidy desk");
        assert_eq!(images[0].url, "/assets/img/posts/desk.jpg");
    }

    #[test]
    fn empty_alt_text_is_preserved_as_empty() {
        let images = inline_images("![](/assets/img/x.jpg)\n");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].alt, "");
    }

    #[test]
    fn counts_multiple_images() {
        let body = "![one](/a.jpg)\n\n![two](/b.jpg)\n\n![three](https://cdn.test/c.jpg)\n";
        assert_eq!(inline_images(body).len(), 3);
    }

    // =========================================================================
    // internal_links tests
    // =========================================================================

    #[test]
    fn root_relative_links_count_as_internal() {
        let body = "See [this](/posts/other) and [that](https://example.test/ext) \
                    and [protocol-relative](//cdn.test/x).\n";
        assert_eq!(internal_links(body), vec!["/posts/other"]);
    }

    #[test]
    fn image_urls_are_not_links() {
        let body = "![alt](/assets/img/a.jpg)\n";
        assert!(internal_links(body).is_empty());
    }

    // =========================================================================
    // count_keyword tests
    // =========================================================================

    #[test]
    fn keyword_count_is_case_insensitive() {
        assert_eq!(count_keyword("AI tools and ai agents love aI", "ai"), 3);
    }

    #[test]
    fn empty_keyword_counts_zero() {
        assert_eq!(count_keyword("anything", ""), 0);
    }

    #[test]
    fn keyword_matches_inside_words() {
        // Substring matching on purpose: twice in "maintain", once in "chain".
        assert_eq!(count_keyword("maintain the chain", "ai"), 3);
    }

    // =========================================================================
    // insert_after_sections tests
    // =========================================================================

    fn body_with_sections(n: usize) -> String {
        let mut body = String::from("intro paragraph");
        for i in 1..=n {
            body.push_str(&format!("\n\n## Section {i}\n\nparagraph {i}"));
        }
        body
    }

    #[test]
    fn no_blocks_returns_body_unchanged() {
        let body = body_with_sections(3);
        assert_eq!(insert_after_sections(&body, &[]), body);
    }

    #[test]
    fn single_block_lands_after_a_heading() {
        let body = body_with_sections(2);
        let result = insert_after_sections(&body, &["![x](/x.jpg)".to_string()]);
        let paragraphs: Vec<&str> = result.split("\n\n").collect();
        let heading = paragraphs.iter().position(|p| *p == "## Section 2").unwrap();
        assert_eq!(paragraphs[heading + 1], "![x](/x.jpg)");
    }

    #[test]
    fn blocks_spread_across_sections() {
        let body = body_with_sections(4);
        let blocks = vec!["![a](/a.jpg)".to_string(), "![b](/b.jpg)".to_string()];
        let result = insert_after_sections(&body, &blocks);
        // Two blocks over four sections: one after section 2, one after 4.
        let paragraphs: Vec<&str> = result.split("\n\n").collect();
        let a = paragraphs.iter().position(|p| *p == "![a](/a.jpg)").unwrap();
        let b = paragraphs.iter().position(|p| *p == "![b](/b.jpg)").unwrap();
        assert!(paragraphs[a - 1].starts_with("## Section 2"));
        assert!(paragraphs[b - 1].starts_with("## Section 4"));
    }

    #[test]
    fn more_blocks_than_sections_all_land() {
        let body = body_with_sections(1);
        let blocks: Vec<String> = (0..3).map(|i| format!("![{i}](/{i}.jpg)")).collect();
        let result = insert_after_sections(&body, &blocks);
        for block in &blocks {
            assert!(result.contains(block.as_str()));
        }
    }

    #[test]
    fn body_without_headings_appends_blocks() {
        let result = insert_after_sections("just text", &["![x](/x.jpg)".to_string()]);
        assert_eq!(result, "just text\n\n![x](/x.jpg)");
    }
}
