use anyhow::Result;
use tracing::debug;

use super::discover::select_genre_in;
use super::{FILTER_SETTLE_MS, class_indicates, current_year, rating_index, year_range_from};
use crate::locator::Locator;
use crate::page::{Page, PageLocator};
use crate::types::{ContentType, YearRange};

/// Native or ARIA listbox, without the looser `[class*="dropdown"]` match
pub fn genre_listbox() -> Locator {
    Locator::css(r#"select, [role="listbox"]"#).first()
}

fn number_inputs() -> Locator {
    Locator::css(r#"input[type="number"]"#)
}

pub fn star_controls() -> Locator {
    Locator::css(r#"[role="radio"], [class*="star"]"#)
}

/// The filter panel: content type, genre, year range and rating
pub struct FilterComponent<'p> {
    page: &'p Page,
}

impl<'p> FilterComponent<'p> {
    pub fn new(page: &'p Page) -> Self {
        FilterComponent { page }
    }

    fn at(&self, locator: Locator) -> PageLocator<'p> {
        self.page.locator(locator)
    }

    async fn wait_for_update(&self) -> Result<()> {
        self.page.wait_for_network_idle().await?;
        self.page.wait_for_timeout(FILTER_SETTLE_MS).await;
        Ok(())
    }

    fn toggle(&self, content: ContentType) -> PageLocator<'p> {
        self.at(super::discover::type_toggle(content))
    }

    pub async fn select_movies(&self) -> Result<()> {
        self.toggle(ContentType::Movie).click().await?;
        self.wait_for_update().await
    }

    pub async fn select_tv_shows(&self) -> Result<()> {
        self.toggle(ContentType::Tv).click().await?;
        self.wait_for_update().await
    }

    async fn is_selected(&self, content: ContentType) -> Result<bool> {
        let class = self.toggle(content).get_attribute("class").await?;
        Ok(class_indicates(class.as_deref(), &["active", "selected"]))
    }

    pub async fn is_movie_selected(&self) -> Result<bool> {
        self.is_selected(ContentType::Movie).await
    }

    pub async fn is_tv_selected(&self) -> Result<bool> {
        self.is_selected(ContentType::Tv).await
    }

    pub async fn select_genre(&self, genre: &str) -> Result<()> {
        select_genre_in(self.page, genre_listbox(), genre).await?;
        self.wait_for_update().await
    }

    /// Current value of the genre control, empty when unreadable
    pub async fn get_selected_genre(&self) -> String {
        match self.at(genre_listbox()).input_value().await {
            Ok(value) => value,
            Err(e) => {
                debug!("Reading selected genre failed: {:#}", e);
                String::new()
            }
        }
    }

    /// Trimmed option labels, empty when the control is missing
    pub async fn get_available_genres(&self) -> Vec<String> {
        let options = self.at(genre_listbox().locator(Locator::css("option")));
        match options.all_text_contents().await {
            Ok(texts) => texts.into_iter().map(|t| t.trim().to_string()).collect(),
            Err(e) => {
                debug!("Reading genre options failed: {:#}", e);
                Vec::new()
            }
        }
    }

    fn min_year_input(&self) -> PageLocator<'p> {
        self.at(number_inputs().first())
    }

    fn max_year_input(&self) -> PageLocator<'p> {
        self.at(number_inputs().nth(1))
    }

    pub async fn set_min_year(&self, year: i32) -> Result<()> {
        self.min_year_input().fill(&year.to_string()).await?;
        self.wait_for_update().await
    }

    pub async fn set_max_year(&self, year: i32) -> Result<()> {
        self.max_year_input().fill(&year.to_string()).await?;
        self.wait_for_update().await
    }

    pub async fn set_year_range(&self, min: i32, max: i32) -> Result<()> {
        self.min_year_input().fill(&min.to_string()).await?;
        self.max_year_input().fill(&max.to_string()).await?;
        self.wait_for_update().await
    }

    /// Year bounds as entered; missing or unparsable values fall back to
    /// 1900 and the current year
    pub async fn get_year_range(&self) -> YearRange {
        let min = self.min_year_input().input_value().await;
        let max = self.max_year_input().input_value().await;
        match (min, max) {
            (Ok(min), Ok(max)) => year_range_from(Some(&min), Some(&max)),
            _ => YearRange {
                min: super::MIN_YEAR,
                max: current_year(),
            },
        }
    }

    pub async fn set_rating(&self, stars: u32) -> Result<()> {
        let Some(index) = rating_index(stars) else {
            return Ok(());
        };
        self.at(star_controls().nth(index)).click().await?;
        self.wait_for_update().await
    }

    /// 1-based position of the first checked star among the first five, or 0
    pub async fn get_selected_rating(&self) -> u32 {
        let stars = self.at(star_controls());
        let available = stars.count().await.unwrap_or(0).min(5);
        for i in 0..available {
            match stars.nth(i).get_attribute("aria-checked").await {
                Ok(Some(checked)) if checked == "true" => return i as u32 + 1,
                Ok(_) => {}
                Err(e) => debug!("Reading star {} failed: {:#}", i + 1, e),
            }
        }
        0
    }
}
