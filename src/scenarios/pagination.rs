use serde_json::json;

use super::{Scenario, ScenarioFuture, open_discover};
use crate::fixture::Fixture;
use crate::locator::{Locator, TextMatch};
use crate::pages::discover::next_page_button;

const SUITE: &str = "pagination";

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "should display content on first page", content_on_first_page),
        Scenario::new(
            SUITE,
            "should have pagination elements if multiple pages exist",
            pagination_elements,
        ),
        Scenario::new(SUITE, "should be able to scroll the page", scrolls),
        Scenario::new(SUITE, "should navigate to next page if available", next_page),
        Scenario::new(
            SUITE,
            "should maintain functionality across pages",
            across_pages,
        ),
    ]
}

fn content_on_first_page(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = fx.discover_page();
        fx.expect("content on first page", discover.has_content().await?)?;
        let count = discover.get_movie_card_count().await?;
        fx.expect(&format!("card count {} > 0", count), count > 0)
    })
}

fn pagination_elements(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        fx.discover_page().scroll_to_pagination().await?;

        let paging = fx
            .page()
            .locator(Locator::css(r#"[aria-label*="Next"], [aria-label*="Prev"]"#))
            .count()
            .await?;
        let numbers = fx
            .page()
            .locator(Locator::css(r#"a[aria-label*="Page"]"#))
            .count()
            .await?;
        fx.logger().info(&format!(
            "Pagination controls: {} next/prev, {} numbered",
            paging, numbers
        ));
        // Single-page results have no pagination at all
        fx.expect("pagination controls counted", true)
    })
}

fn scrolls(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let page = fx.page();
        let before = page.evaluate("return window.scrollY;", vec![]).await?;
        fx.logger().debug(&format!("Initial scroll {}", before));

        fx.logger().step("Scroll down 500px", None);
        page.evaluate("window.scrollTo(0, arguments[0]);", vec![json!(500)])
            .await?;
        page.wait_for_timeout(500).await;

        let after = page
            .evaluate("return window.scrollY;", vec![])
            .await?
            .as_f64()
            .unwrap_or(-1.0);
        fx.expect(&format!("scroll position {} >= 0", after), after >= 0.0)
    })
}

fn next_page(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = fx.discover_page();
        discover.scroll_to_pagination().await?;

        let next = fx.page().locator(next_page_button());
        if !next.is_visible().await {
            fx.logger().info("No next page control");
            return Ok(());
        }

        let before = discover.get_movie_titles().await?;
        fx.logger().debug(&format!("{} titles on first page", before.len()));
        fx.logger().step("Go to the next page", Some("content loads"));
        next.click().await?;
        discover.wait_for_content_load().await?;
        fx.expect("content on next page", discover.has_content().await?)
    })
}

fn across_pages(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = fx.discover_page();
        fx.expect("content before paging", discover.has_content().await?)?;
        discover.scroll_to_pagination().await?;

        let page_link = fx.page().locator(
            Locator::any([
                Locator::css(r#"a[aria-label*="Page"]"#),
                Locator::has_text_matching("a", TextMatch::regex("^[2-9]$", "")),
            ])
            .first(),
        );
        if page_link.is_visible().await {
            fx.logger().step("Open another page", Some("content loads"));
            page_link.click().await?;
            discover.wait_for_content_load().await?;
            fx.expect("content after paging", discover.has_content().await?)?;
        }
        Ok(())
    })
}
