//! Page classification use case - page kind detection and poster extraction

use scraper::{Html, Selector};
use std::collections::BTreeSet;

use crate::model::{PageKind, PageSnapshot, PosterId};

/// Marker string distinguishing community page layouts from profile pages.
/// Matched against the raw document, tolerating markup drift across mirrors.
const COMMUNITY_MARKER: &str = "Community";

/// Classifies fetched pages and extracts poster usernames.
///
/// Classification never fails: documents that parse to nothing yield an
/// empty snapshot, which downstream treats as "no new posters".
pub struct PageClassifier {
    timeline_item: Selector,
    username_link: Selector,
    author_name: Selector,
}

impl PageClassifier {
    pub fn new() -> Self {
        Self {
            timeline_item: Selector::parse("div.timeline-item").expect("Valid selector"),
            username_link: Selector::parse("a.username").expect("Valid selector"),
            author_name: Selector::parse("bdi").expect("Valid selector"),
        }
    }

    /// Classify a document and extract the distinct poster usernames from
    /// its newest `limit` posts.
    pub fn classify(&self, content: &str, limit: usize) -> PageSnapshot {
        let kind = if content.contains(COMMUNITY_MARKER) {
            PageKind::Community
        } else {
            PageKind::User
        };

        let document = Html::parse_document(content);
        let mut posters = BTreeSet::new();

        for item in document.select(&self.timeline_item).take(limit) {
            let Some(link) = item.select(&self.username_link).next() else {
                continue;
            };
            let Some(name) = link.select(&self.author_name).next() else {
                continue;
            };
            let raw: String = name.text().collect();
            if let Ok(poster) = PosterId::parse(&raw) {
                posters.insert(poster);
            }
        }

        PageSnapshot { kind, posters }
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline_entry(author: &str) -> String {
        format!(
            "<div class=\"timeline-item\"><div class=\"tweet-header\">\
             <a class=\"username\" href=\"/{author}\" title=\"@{author}\">\
             <bdi>@{author}</bdi></a></div>\
             <div class=\"tweet-content\">hello</div></div>"
        )
    }

    fn page(entries: &[&str], community: bool) -> String {
        let mut html = String::from("<html><head><title>timeline</title></head><body>");
        if community {
            html.push_str("<div class=\"community-note\">Community</div>");
        }
        for author in entries {
            html.push_str(&timeline_entry(author));
        }
        html.push_str("</body></html>");
        html
    }

    #[test]
    fn test_classify_extracts_normalized_posters() {
        let classifier = PageClassifier::new();
        let snapshot = classifier.classify(&page(&["Alice", "Bob_2"], false), 20);

        let names: Vec<&str> = snapshot.posters.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob_2"]);
        assert_eq!(snapshot.kind, PageKind::User);
    }

    #[test]
    fn test_classify_detects_community_pages() {
        let classifier = PageClassifier::new();
        let snapshot = classifier.classify(&page(&["alice"], true), 20);
        assert_eq!(snapshot.kind, PageKind::Community);
    }

    #[test]
    fn test_classify_honors_post_limit() {
        let classifier = PageClassifier::new();
        let snapshot = classifier.classify(&page(&["first", "second", "third"], false), 2);

        let names: Vec<&str> = snapshot.posters.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_classify_collapses_duplicate_posters() {
        let classifier = PageClassifier::new();
        let snapshot = classifier.classify(&page(&["alice", "ALICE", "alice"], false), 20);
        assert_eq!(snapshot.posters.len(), 1);
    }

    #[test]
    fn test_classify_skips_items_without_author() {
        let broken = "<div class=\"timeline-item\">\
                      <a class=\"username\" href=\"/x\">no bdi here</a></div>";
        let html = format!(
            "<html><body>{}{}</body></html>",
            timeline_entry("alice"),
            broken
        );

        let classifier = PageClassifier::new();
        let snapshot = classifier.classify(&html, 20);
        assert_eq!(snapshot.posters.len(), 1);
    }

    #[test]
    fn test_classify_survives_malformed_documents() {
        let classifier = PageClassifier::new();
        let snapshot = classifier.classify("{<<< not really html", 20);
        assert!(snapshot.posters.is_empty());
        assert_eq!(snapshot.kind, PageKind::User);
    }

    #[test]
    fn test_classify_empty_document_is_empty_user_page() {
        let classifier = PageClassifier::new();
        let snapshot = classifier.classify("", 20);
        assert!(snapshot.posters.is_empty());
        assert_eq!(snapshot.kind, PageKind::User);
    }
}
