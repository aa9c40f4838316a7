use scraper::Html;

/// Phrases that introduce credited people in a topic's first post.
pub const LEAD_IN_PHRASES: &[&str] = &["With ", "By ", "For ", "Created by "];

/// Mentions and hashtags collected from a topic body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub mentions: String,
    pub hashtags: String,
}

/// Scan the text fragments of rendered post HTML for mentions and hashtags.
///
/// Discourse renders linked handles and tags as separate elements, so each
/// text node is checked on its own. Both outputs start from the given seeds.
/// A fragment that matches several rules is appended once per rule.
#[must_use]
pub fn extract_mentions(html: &str, mentions_seed: &str, hashtags_seed: &str) -> Extracted {
    let document = Html::parse_fragment(html);
    let mut extracted = Extracted {
        mentions: mentions_seed.to_string(),
        hashtags: hashtags_seed.to_string(),
    };

    for fragment in document.root_element().text() {
        if LEAD_IN_PHRASES.iter().any(|p| fragment.contains(p)) {
            extracted.mentions.push_str(fragment);
        }
        if fragment.contains('@') {
            extracted.mentions.push_str(fragment);
        }
        if fragment.contains('#') {
            extracted.hashtags.push_str(fragment);
        }
    }

    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_in_handle_and_hashtag() {
        let html = "<p>With <a>Alice</a> and <a>@bob</a> #launch</p>";
        let extracted = extract_mentions(html, "", "");

        assert!(extracted.mentions.contains("With "));
        assert!(extracted.mentions.contains("@bob"));
        assert!(!extracted.mentions.contains("Alice"));
        assert!(extracted.hashtags.contains("#launch"));
    }

    #[test]
    fn test_seeds_are_prefixes() {
        let extracted = extract_mentions("<p><a>@dan</a></p>", "cc @forum ", "#news ");
        assert_eq!(extracted.mentions, "cc @forum @dan");
        assert_eq!(extracted.hashtags, "#news ");
    }

    #[test]
    fn test_fragment_matching_several_rules_repeats() {
        let extracted = extract_mentions("<p>By @erin #art</p>", "", "");
        assert_eq!(extracted.mentions, "By @erin #artBy @erin #art");
        assert_eq!(extracted.hashtags, "By @erin #art");
    }

    #[test]
    fn test_created_by_lead_in() {
        let extracted = extract_mentions("<p>Created by <a>Frank</a></p>", "", "");
        assert_eq!(extracted.mentions, "Created by ");
    }

    #[test]
    fn test_lead_ins_are_case_sensitive() {
        let extracted = extract_mentions("<p>written with love by me</p>", "", "");
        assert_eq!(extracted.mentions, "");
    }

    #[test]
    fn test_markup_is_ignored() {
        let html = r##"<a href="https://example.com/#anchor" title="@nobody">plain</a>"##;
        assert_eq!(extract_mentions(html, "", ""), Extracted::default());
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let extracted = extract_mentions("<p>For <b>@gina <i unclosed #tag", "", "");
        assert!(extracted.mentions.contains("For "));
        assert!(extracted.mentions.contains("@gina"));
    }

    #[test]
    fn test_empty_body_returns_seeds() {
        let extracted = extract_mentions("", "m", "h");
        assert_eq!(extracted.mentions, "m");
        assert_eq!(extracted.hashtags, "h");
    }
}
