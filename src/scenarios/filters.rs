use super::{Scenario, ScenarioFuture, open_discover};
use crate::fixture::Fixture;
use crate::locator::Locator;
use crate::types::ContentType;

const SUITE: &str = "filters";

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "should display content on page load", content_on_load),
        Scenario::new(SUITE, "should have filter elements on page", has_filter_elements),
        Scenario::new(SUITE, "should click on Movie filter if available", movie_filter),
        Scenario::new(SUITE, "should click on TV filter if available", tv_filter),
        Scenario::new(
            SUITE,
            "should maintain content after filter interactions",
            content_after_filters,
        ),
        Scenario::new(SUITE, "should list trimmed genre options", genres_trimmed),
        Scenario::new(SUITE, "should report a rating between 0 and 5", rating_in_range),
    ]
}

fn content_on_load(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let has_content = fx.discover_page().has_content().await?;
        fx.expect("content on page load", has_content)
    })
}

fn has_filter_elements(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let mut found = 0;
        for text in ["Movie", "TV", "Type", "Genre", "Year", "Rating"] {
            if fx.page().locator(Locator::text(text).first()).is_visible().await {
                fx.logger().debug(&format!("Filter text '{}' visible", text));
                found += 1;
            }
        }
        fx.expect(&format!("{} filter labels visible", found), found > 0)
    })
}

async fn click_type_filter(fx: &Fixture, content: ContentType) -> anyhow::Result<()> {
    open_discover(fx).await?;
    let discover = fx.discover_page();
    let toggle = discover.type_toggle(content);
    if !toggle.is_visible().await {
        return fx.skip(&format!("{:?} filter not available", content));
    }
    fx.logger()
        .step(&format!("Select {:?}", content), Some("content still present"));
    toggle.click().await?;
    discover.wait_for_content_load().await?;
    let has_content = discover.has_content().await?;
    fx.expect(&format!("content after {:?} filter", content), has_content)
}

fn movie_filter(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(click_type_filter(fx, ContentType::Movie))
}

fn tv_filter(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(click_type_filter(fx, ContentType::Tv))
}

fn content_after_filters(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let discover = fx.discover_page();
        let initial = discover.get_movie_card_count().await?;
        fx.expect(&format!("initial card count {} > 0", initial), initial > 0)?;

        let toggle = discover.type_toggle(ContentType::Movie);
        if toggle.is_visible().await {
            fx.logger().step("Click the Movie filter", Some("cards remain"));
            toggle.click().await?;
            fx.page().wait_for_timeout(1000).await;
            let after = discover.get_movie_card_count().await?;
            fx.expect(&format!("card count {} > 0 after filter", after), after > 0)?;
        }
        Ok(())
    })
}

fn genres_trimmed(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let genres = fx.filter_component().get_available_genres().await;
        fx.logger()
            .info(&format!("Available genres: {}", genres.join(", ")));
        fx.expect(
            "genre options carry no surrounding whitespace",
            genres.iter().all(|g| g.trim() == g),
        )
    })
}

fn rating_in_range(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        open_discover(fx).await?;
        let rating = fx.filter_component().get_selected_rating().await;
        fx.expect(&format!("selected rating {} within 0..=5", rating), rating <= 5)
    })
}
