use anyhow::Result;
use tracing::debug;

use crate::locator::Locator;
use crate::page::PageLocator;

/// One result card. Sub-element reads never fail; a missing part reads as
/// empty.
pub struct MovieCard<'p> {
    card: PageLocator<'p>,
}

impl<'p> MovieCard<'p> {
    pub fn new(card: PageLocator<'p>) -> Self {
        MovieCard { card }
    }

    pub fn locator(&self) -> &PageLocator<'p> {
        &self.card
    }

    fn image(&self) -> PageLocator<'p> {
        self.card.within(Locator::css("img")).first()
    }

    fn title(&self) -> PageLocator<'p> {
        self.card.within(Locator::css("p, h3, h4")).first()
    }

    /// Second text element of the card
    fn genre(&self) -> PageLocator<'p> {
        self.card.within(Locator::css("span, p")).nth(1)
    }

    async fn trimmed_text(part: PageLocator<'p>) -> String {
        match part.text_content().await {
            Ok(text) => text.unwrap_or_default().trim().to_string(),
            Err(e) => {
                debug!("No text for {}: {:#}", part.locator(), e);
                String::new()
            }
        }
    }

    pub async fn get_title(&self) -> String {
        Self::trimmed_text(self.title()).await
    }

    pub async fn get_genre(&self) -> String {
        Self::trimmed_text(self.genre()).await
    }

    pub async fn get_image_src(&self) -> String {
        match self.image().get_attribute("src").await {
            Ok(src) => src.unwrap_or_default(),
            Err(e) => {
                debug!("No poster src: {:#}", e);
                String::new()
            }
        }
    }

    pub async fn is_image_loaded(&self) -> bool {
        !self.get_image_src().await.is_empty()
    }

    pub async fn click(&self) -> Result<()> {
        self.card.click().await
    }

    pub async fn is_visible(&self) -> bool {
        self.card.is_visible().await
    }
}
