use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use super::{
    FIRST_IMAGE_TIMEOUT_MS, FilterComponent, MovieCard, SCROLL_SETTLE_MS, class_indicates,
    enabled_from, filter_titles, rating_index,
};
use crate::locator::{Locator, TextMatch};
use crate::page::{Page, PageLocator};
use crate::types::{ContentType, Section};

/// Scrolls the results container (or the document) to the bottom
const SCROLL_TO_BOTTOM_SCRIPT: &str = r#"
    const el = document.querySelector('[class*="scroll"]')
        || document.scrollingElement
        || document.body;
    el.scrollTop = el.scrollHeight;
    window.scrollTo(0, document.body.scrollHeight);
    return el.scrollTop;
"#;

/// Top navigation link for a section, matched by text or by href
pub fn nav_link(section: Section) -> Locator {
    let alternatives = match section {
        Section::Popular => vec![
            Locator::has_text("a", "Popular"),
            Locator::css(r#"[href*="popular"]"#),
        ],
        Section::Trend => vec![
            Locator::has_text("a", "Trend"),
            Locator::css(r#"[href*="trend"]"#),
        ],
        Section::Newest => vec![
            Locator::has_text("a", "Newest"),
            Locator::has_text("a", "New"),
            Locator::css(r#"[href*="new"]"#),
        ],
        Section::TopRated => vec![
            Locator::has_text("a", "Top"),
            Locator::has_text("a", "Top Rated"),
            Locator::css(r#"[href*="top"]"#),
        ],
    };
    Locator::any(alternatives).first()
}

pub fn search_input() -> Locator {
    Locator::css(
        r#"input[placeholder*="Search" i], input[placeholder*="SEARCH"], input[type="search"]"#,
    )
    .first()
}

pub fn type_toggle(content: ContentType) -> Locator {
    match content {
        ContentType::Movie => Locator::text("Movie").first(),
        ContentType::Tv => Locator::text("TV").first(),
    }
}

pub fn genre_dropdown() -> Locator {
    Locator::css(r#"select, [role="listbox"], [class*="dropdown"]"#).first()
}

fn year_inputs() -> Locator {
    Locator::css(r#"input[type="number"], input[placeholder*="year" i]"#)
}

pub fn rating_controls() -> Locator {
    Locator::css(r#"[role="radio"], [class*="star"], [class*="rating"]"#)
}

/// Poster images; one per card
pub fn poster_images() -> Locator {
    Locator::css("img")
}

/// Card containers, taken as the parent of each poster image
pub fn movie_cards() -> Locator {
    poster_images().parent()
}

pub fn title_texts() -> Locator {
    Locator::css(r#"p, h3, h4, [class*="title"]"#)
}

pub fn previous_page_button() -> Locator {
    Locator::any([
        Locator::css(r#"[aria-label*="Previous" i], [aria-label*="Prev" i]"#),
        Locator::text("Previous"),
        Locator::text("Prev"),
    ])
    .first()
}

pub fn next_page_button() -> Locator {
    Locator::any([
        Locator::css(r#"[aria-label*="Next" i]"#),
        Locator::text("Next"),
    ])
    .first()
}

pub fn page_number_button(number: u32) -> Locator {
    Locator::any([
        Locator::css(format!(r#"[aria-label="Page {}"]"#, number)),
        Locator::has_text("a", number.to_string()),
    ])
    .first()
}

/// Numbered paging controls currently rendered
pub fn page_numbers() -> Locator {
    Locator::any([
        Locator::css(r#"[aria-label^="Page "]"#),
        Locator::has_text_matching("a", TextMatch::regex(r"^\d+$", "")),
    ])
}

/// The discover screen: navigation, search, filters, results grid and
/// pagination
pub struct DiscoverPage<'p> {
    page: &'p Page,
}

impl<'p> DiscoverPage<'p> {
    pub fn new(page: &'p Page) -> Self {
        DiscoverPage { page }
    }

    pub fn page(&self) -> &'p Page {
        self.page
    }

    fn at(&self, locator: Locator) -> PageLocator<'p> {
        self.page.locator(locator)
    }

    /// Open `path` relative to the base URL and wait for content
    pub async fn goto(&self, path: &str) -> Result<()> {
        self.page.goto(path).await?;
        self.wait_for_content_load().await
    }

    /// Network idle, then a short wait for the first poster. A page with no
    /// images is not an error here.
    pub async fn wait_for_content_load(&self) -> Result<()> {
        self.page.wait_for_network_idle().await?;
        if let Err(e) = self
            .at(poster_images().first())
            .wait_for_visible(Duration::from_millis(FIRST_IMAGE_TIMEOUT_MS))
            .await
        {
            debug!("No visible poster after load: {:#}", e);
        }
        Ok(())
    }

    pub async fn navigate_to(&self, section: Section) -> Result<()> {
        info!("Navigating to section {:?}", section);
        self.at(nav_link(section)).click().await?;
        self.wait_for_content_load().await
    }

    pub async fn navigate_to_popular(&self) -> Result<()> {
        self.navigate_to(Section::Popular).await
    }

    pub async fn navigate_to_trend(&self) -> Result<()> {
        self.navigate_to(Section::Trend).await
    }

    pub async fn navigate_to_newest(&self) -> Result<()> {
        self.navigate_to(Section::Newest).await
    }

    pub async fn navigate_to_top_rated(&self) -> Result<()> {
        self.navigate_to(Section::TopRated).await
    }

    /// Whether the section's link is styled as the current one
    pub async fn is_nav_active(&self, section: Section) -> Result<bool> {
        let class = self.at(nav_link(section)).get_attribute("class").await?;
        Ok(class_indicates(
            class.as_deref(),
            &["active", "selected", "current"],
        ))
    }

    pub fn nav_link(&self, section: Section) -> PageLocator<'p> {
        self.at(nav_link(section))
    }

    pub fn search_input(&self) -> PageLocator<'p> {
        self.at(search_input())
    }

    /// Type `query`, submit with Enter and wait for results
    pub async fn search(&self, query: &str) -> Result<()> {
        let input = self.search_input();
        input.fill(query).await?;
        input.press_enter().await?;
        self.wait_for_content_load().await
    }

    pub async fn clear_search(&self) -> Result<()> {
        let input = self.search_input();
        input.clear().await?;
        input.press_enter().await?;
        self.wait_for_content_load().await
    }

    pub async fn get_search_value(&self) -> Result<String> {
        self.search_input().input_value().await
    }

    pub fn type_toggle(&self, content: ContentType) -> PageLocator<'p> {
        self.at(type_toggle(content))
    }

    pub async fn select_type(&self, content: ContentType) -> Result<()> {
        self.type_toggle(content).click().await?;
        self.wait_for_content_load().await
    }

    pub fn genre_dropdown(&self) -> PageLocator<'p> {
        self.at(genre_dropdown())
    }

    pub async fn select_genre(&self, genre: &str) -> Result<()> {
        select_genre_in(self.page, genre_dropdown(), genre).await?;
        self.wait_for_content_load().await
    }

    pub fn year_min_input(&self) -> PageLocator<'p> {
        self.at(year_inputs().first())
    }

    pub fn year_max_input(&self) -> PageLocator<'p> {
        self.at(year_inputs().nth(1))
    }

    pub async fn set_year_range(&self, min: i32, max: i32) -> Result<()> {
        self.year_min_input().fill(&min.to_string()).await?;
        self.year_max_input().fill(&max.to_string()).await?;
        self.wait_for_content_load().await
    }

    pub fn rating_controls(&self) -> PageLocator<'p> {
        self.at(rating_controls())
    }

    /// Click the `stars`-th rating control; values outside 1..=5 do nothing
    pub async fn set_rating(&self, stars: u32) -> Result<()> {
        let Some(index) = rating_index(stars) else {
            debug!("Ignoring rating {} outside 1..=5", stars);
            return Ok(());
        };
        self.rating_controls().nth(index).click().await?;
        self.wait_for_content_load().await
    }

    /// Number of poster images on the page
    pub async fn get_movie_card_count(&self) -> Result<usize> {
        self.at(poster_images()).count().await
    }

    pub async fn get_movie_titles(&self) -> Result<Vec<String>> {
        let texts = self.at(title_texts()).all_text_contents().await?;
        Ok(filter_titles(texts))
    }

    pub async fn has_content(&self) -> Result<bool> {
        Ok(self.get_movie_card_count().await? > 0)
    }

    pub async fn click_movie_card(&self, index: usize) -> Result<()> {
        self.at(poster_images().nth(index)).click().await
    }

    pub fn movie_card(&self, index: usize) -> MovieCard<'p> {
        MovieCard::new(self.at(movie_cards().nth(index)))
    }

    pub fn filters(&self) -> FilterComponent<'p> {
        FilterComponent::new(self.page)
    }

    pub async fn scroll_to_pagination(&self) -> Result<()> {
        self.page.evaluate(SCROLL_TO_BOTTOM_SCRIPT, vec![]).await?;
        self.page.wait_for_timeout(SCROLL_SETTLE_MS).await;
        Ok(())
    }

    pub fn next_page_button(&self) -> PageLocator<'p> {
        self.at(next_page_button())
    }

    pub fn previous_page_button(&self) -> PageLocator<'p> {
        self.at(previous_page_button())
    }

    pub async fn go_to_next_page(&self) -> Result<()> {
        self.scroll_to_pagination().await?;
        self.next_page_button().click().await?;
        self.wait_for_content_load().await
    }

    pub async fn go_to_previous_page(&self) -> Result<()> {
        self.scroll_to_pagination().await?;
        self.previous_page_button().click().await?;
        self.wait_for_content_load().await
    }

    pub async fn go_to_page(&self, number: u32) -> Result<()> {
        self.scroll_to_pagination().await?;
        self.at(page_number_button(number)).click().await?;
        self.wait_for_content_load().await
    }

    pub async fn page_number_count(&self) -> Result<usize> {
        self.at(page_numbers()).count().await
    }

    pub async fn is_next_page_enabled(&self) -> bool {
        control_enabled(self.next_page_button()).await
    }

    pub async fn is_previous_page_enabled(&self) -> bool {
        control_enabled(self.previous_page_button()).await
    }

    /// Path component of the current URL
    pub async fn get_current_path(&self) -> Result<String> {
        Ok(self.page.url().await?.path().to_string())
    }
}

async fn control_enabled(control: PageLocator<'_>) -> bool {
    if !control.is_visible().await {
        return false;
    }
    match control.get_attribute("aria-disabled").await {
        Ok(disabled) => enabled_from(true, disabled.as_deref()),
        Err(e) => {
            debug!("Reading aria-disabled on {} failed: {:#}", control.locator(), e);
            false
        }
    }
}

/// Pick `genre` from either a native `<select>` or a custom dropdown
pub(crate) async fn select_genre_in(page: &Page, dropdown: Locator, genre: &str) -> Result<()> {
    let control = page.locator(dropdown.clone());
    if control.tag_name().await? == "SELECT" {
        debug!("Selecting option {:?}", genre);
        control
            .within(Locator::has_text_matching("option", TextMatch::exact(genre)))
            .first()
            .click()
            .await
    } else {
        control.click().await?;
        page.locator(Locator::text(genre).first()).click().await
    }
}
