use super::{Scenario, ScenarioFuture, open_discover};
use crate::fixture::Fixture;
use crate::locator::{Locator, TextMatch};
use crate::types::Section;

const SUITE: &str = "navigation";

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "should load page with content", loads_with_content),
        Scenario::new(SUITE, "should display movie cards", displays_movie_cards),
        Scenario::new(SUITE, "should have navigation links visible", nav_links_visible),
        Scenario::new(SUITE, "should navigate to different sections", navigates_sections),
        Scenario::new(SUITE, "should display movie titles", displays_titles),
        Scenario::new(
            SUITE,
            "should keep content after choosing a section",
            section_keeps_content,
        ),
    ]
}

fn loads_with_content(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = &fx.discover_page();
        fx.logger().step("Check the grid", Some("at least one poster"));
        fx.expect_eventually("page has content", move || async move {
            discover.has_content().await.unwrap_or(false)
        })
        .await
    })
}

fn displays_movie_cards(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let count = fx.discover_page().get_movie_card_count().await?;
        fx.logger().info(&format!("Found {} movie cards", count));
        fx.expect(&format!("card count {} > 0", count), count > 0)
    })
}

fn nav_links_visible(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        for text in ["Popular", "Trend", "Top"] {
            let link = fx.page().locator(Locator::text(text).first());
            if link.is_visible().await {
                return fx.expect(&format!("navigation link '{}' visible", text), true);
            }
        }
        fx.logger().info("No navigation text visible");
        Ok(())
    })
}

fn navigates_sections(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = fx.discover_page();
        let start = fx.page().url().await?;
        fx.logger().debug(&format!("Initial URL: {}", start));

        let links = fx.page().locator(Locator::has_text_matching(
            "a",
            TextMatch::regex("Trend|Top|New", "i"),
        ));
        if links.count().await? == 0 {
            fx.logger().info("No section links found");
            return Ok(());
        }

        fx.logger()
            .step("Click the first section link", Some("content still loads"));
        links.first().click().await?;
        discover.wait_for_content_load().await?;
        let has_content = discover.has_content().await?;
        fx.expect("content after section change", has_content)
    })
}

fn displays_titles(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let titles = fx.discover_page().get_movie_titles().await?;
        fx.logger().info(&format!("Found {} titles", titles.len()));
        fx.expect("at least one title", !titles.is_empty())?;
        fx.expect(
            "titles are trimmed and shorter than 100 characters",
            titles
                .iter()
                .all(|t| !t.is_empty() && t.chars().count() < 100 && t.trim() == t),
        )
    })
}

fn section_keeps_content(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = fx.discover_page();
        if !discover.nav_link(Section::Trend).is_visible().await {
            return fx.skip("no Trend link");
        }
        fx.logger()
            .step("Navigate to Trend", Some("content still present"));
        discover.navigate_to_trend().await?;
        fx.logger()
            .info(&format!("Now at {}", discover.get_current_path().await?));
        let has_content = discover.has_content().await?;
        fx.expect("content in Trend section", has_content)
    })
}
