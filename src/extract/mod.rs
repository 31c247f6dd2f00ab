//! Page extraction
//!
//! Turns rendered page content into raw field tuples for search cards
//! and review cards. Missing or malformed fields surface as `None`,
//! never as a failure; the record types normalize them. All knowledge of
//! the target site's markup is confined to this module.

use scraper::{ElementRef, Html, Selector};

/// Raw fields of one listing card on a search results page
#[derive(Debug, Clone, Default)]
pub struct RawSearchCard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dates: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
}

/// Raw fields of one review card on a listing detail page
#[derive(Debug, Clone, Default)]
pub struct RawReviewCard {
    pub name: Option<String>,
    pub stars: u32,
    pub review: Option<String>,
}

/// Extracts structured card data from rendered page content
pub trait Extractor: Send + Sync {
    /// All listing cards on a search results page
    fn search_cards(&self, html: &str) -> Vec<RawSearchCard>;

    /// All review cards on a listing detail page
    fn review_cards(&self, html: &str) -> Vec<RawReviewCard>;

    /// Up to `cap` pagination link hrefs from a search results page, in
    /// presentation order
    fn pagination_links(&self, html: &str, cap: usize) -> Vec<String>;
}

// Selector set for the target site's markup
const SEARCH_CARD: &str = "[data-testid='card-container']";
const CARD_NAME: &str = "[data-testid='listing-card-title']";
const CARD_DESCRIPTION: &str = "[data-testid='listing-card-subtitle']";
const CARD_DATES: &str = "[data-testid='listing-card-dates']";
const CARD_PRICE: &str = "[data-testid='price-row'] span";
const CARD_LINK: &str = "a[href]";
const PAGINATION_LINK: &str = "nav[aria-label='Search results pagination'] a[href]";
const REVIEW_CARD: &str = "[data-review-id]";
const REVIEW_NAME: &str = "h3";
const REVIEW_STAR: &str = "svg";
const REVIEW_TEXT: &str = "span";

/// Inline fill color that marks a star indicator as "filled"
const FILLED_STAR_FILL: &str = "rgb(255, 180, 0)";

/// Scraper-backed extractor for the target site
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    fn search_cards(&self, html: &str) -> Vec<RawSearchCard> {
        let document = Html::parse_document(html);
        let mut cards = Vec::new();

        if let Ok(card_selector) = Selector::parse(SEARCH_CARD) {
            for card in document.select(&card_selector) {
                cards.push(RawSearchCard {
                    name: select_text(&card, CARD_NAME),
                    description: select_text(&card, CARD_DESCRIPTION),
                    dates: select_text(&card, CARD_DATES),
                    price: select_text(&card, CARD_PRICE),
                    url: select_href(&card, CARD_LINK),
                });
            }
        }

        cards
    }

    fn review_cards(&self, html: &str) -> Vec<RawReviewCard> {
        let document = Html::parse_document(html);
        let mut cards = Vec::new();

        if let Ok(card_selector) = Selector::parse(REVIEW_CARD) {
            for card in document.select(&card_selector) {
                cards.push(RawReviewCard {
                    name: select_text(&card, REVIEW_NAME),
                    stars: count_filled_stars(&card),
                    review: select_last_text(&card, REVIEW_TEXT),
                });
            }
        }

        cards
    }

    fn pagination_links(&self, html: &str, cap: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        if let Ok(link_selector) = Selector::parse(PAGINATION_LINK) {
            for element in document.select(&link_selector) {
                if let Some(href) = element.value().attr("href") {
                    let href = href.trim().to_string();
                    if !href.is_empty() && !links.contains(&href) {
                        links.push(href);
                    }
                }
                if links.len() >= cap {
                    break;
                }
            }
        }

        links
    }
}

/// Collected, trimmed text of the first element matching `selector`
/// under `root`; `None` when absent or empty
fn select_text(root: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    root.select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Like [`select_text`] but takes the last match; used for review bodies,
/// which sit in the final text span of a card
fn select_last_text(root: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    root.select(&selector)
        .last()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First matching href under `root`
fn select_href(root: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    root.select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Counts star indicators whose rendered fill matches the filled state
fn count_filled_stars(card: &ElementRef) -> u32 {
    let Ok(star_selector) = Selector::parse(REVIEW_STAR) else {
        return 0;
    };
    card.select(&star_selector)
        .filter(|element| {
            element
                .value()
                .attr("style")
                .map(|style| style.contains(FILLED_STAR_FILL))
                .unwrap_or(false)
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_page(cards: &[(&str, &str)]) -> String {
        let body: String = cards
            .iter()
            .map(|(name, href)| {
                format!(
                    r#"<div data-testid="card-container">
                        <a href="{href}"></a>
                        <div data-testid="listing-card-title">{name}</div>
                        <div data-testid="listing-card-subtitle">A place</div>
                        <div data-testid="listing-card-dates">May 1 - 6</div>
                        <div data-testid="price-row"><span>$120</span></div>
                    </div>"#
                )
            })
            .collect();
        format!("<html><body>{body}</body></html>")
    }

    #[test]
    fn test_search_cards_extracted() {
        let html = search_page(&[("Ocean View", "/rooms/1"), ("Loft", "/rooms/2")]);
        let cards = HtmlExtractor::new().search_cards(&html);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name.as_deref(), Some("Ocean View"));
        assert_eq!(cards[0].url.as_deref(), Some("/rooms/1"));
        assert_eq!(cards[0].price.as_deref(), Some("$120"));
        assert_eq!(cards[1].name.as_deref(), Some("Loft"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let html = r#"<html><body>
            <div data-testid="card-container">
                <div data-testid="listing-card-title">Bare</div>
            </div>
        </body></html>"#;
        let cards = HtmlExtractor::new().search_cards(html);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Bare"));
        assert!(cards[0].description.is_none());
        assert!(cards[0].price.is_none());
        assert!(cards[0].url.is_none());
    }

    #[test]
    fn test_no_cards_on_unrelated_page() {
        let cards = HtmlExtractor::new().search_cards("<html><body><p>hi</p></body></html>");
        assert!(cards.is_empty());
    }

    #[test]
    fn test_review_cards_with_star_count() {
        let html = r#"<html><body>
            <div data-review-id="r1">
                <h3>Ana</h3>
                <svg style="fill: rgb(255, 180, 0);"></svg>
                <svg style="fill: rgb(255, 180, 0);"></svg>
                <svg style="fill: rgb(255, 180, 0);"></svg>
                <svg style="fill: rgb(216, 216, 216);"></svg>
                <svg style="fill: rgb(216, 216, 216);"></svg>
                <span>Stayed in May</span>
                <span>Lovely place, would return</span>
            </div>
        </body></html>"#;
        let cards = HtmlExtractor::new().review_cards(html);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Ana"));
        assert_eq!(cards[0].stars, 3);
        assert_eq!(cards[0].review.as_deref(), Some("Lovely place, would return"));
    }

    #[test]
    fn test_review_card_without_stars() {
        let html = r#"<html><body>
            <div data-review-id="r1"><h3>Bo</h3><span>Fine</span></div>
        </body></html>"#;
        let cards = HtmlExtractor::new().review_cards(html);

        assert_eq!(cards[0].stars, 0);
        assert_eq!(cards[0].review.as_deref(), Some("Fine"));
    }

    #[test]
    fn test_pagination_links_capped_and_ordered() {
        let html = r#"<html><body>
            <nav aria-label="Search results pagination">
                <a href="/s/x?page=2">2</a>
                <a href="/s/x?page=3">3</a>
                <a href="/s/x?page=4">4</a>
                <a href="/s/x?page=5">5</a>
            </nav>
        </body></html>"#;
        let links = HtmlExtractor::new().pagination_links(html, 3);

        assert_eq!(
            links,
            vec!["/s/x?page=2", "/s/x?page=3", "/s/x?page=4"]
        );
    }

    #[test]
    fn test_pagination_links_deduplicated() {
        let html = r#"<html><body>
            <nav aria-label="Search results pagination">
                <a href="/s/x?page=2">2</a>
                <a href="/s/x?page=2">2</a>
            </nav>
        </body></html>"#;
        let links = HtmlExtractor::new().pagination_links(html, 5);
        assert_eq!(links.len(), 1);
    }
}
