// Page object tests against the local discover fixture

mod test_utils;

use pretty_assertions::assert_eq;
use serial_test::serial;
use test_server::{PAGE_SIZE, ensure_test_server};
use test_utils::{open_fixture, test_config};

use discover_e2e::types::Section;

#[tokio::test]
#[serial]
async fn test_content_and_titles() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "content and titles").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/").await.unwrap();

    assert!(discover.has_content().await.unwrap());
    assert_eq!(discover.get_movie_card_count().await.unwrap(), PAGE_SIZE);

    let titles = discover.get_movie_titles().await.unwrap();
    assert!(!titles.is_empty());
    assert!(titles.iter().all(|t| !t.is_empty() && t.chars().count() < 100));
    assert!(titles.iter().all(|t| t.trim() == t));

    let card = discover.movie_card(0);
    assert!(card.is_visible().await);
    assert_eq!(card.get_title().await, "Batman Begins");
    assert_eq!(card.get_genre().await, "Action");
    assert!(card.get_image_src().await.contains("/poster/1"));
    assert!(card.is_image_loaded().await);

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_search_round_trip() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "search round trip").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/").await.unwrap();

    discover.search("Batman").await.unwrap();
    assert_eq!(discover.get_search_value().await.unwrap(), "Batman");
    assert_eq!(discover.get_movie_card_count().await.unwrap(), 2);

    discover.search("Matrix").await.unwrap();
    discover.clear_search().await.unwrap();
    assert_eq!(discover.get_search_value().await.unwrap(), "");
    assert_eq!(discover.get_movie_card_count().await.unwrap(), PAGE_SIZE);

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_section_navigation_marks_link_active() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "section navigation").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/popular").await.unwrap();
    assert!(discover.is_nav_active(Section::Popular).await.unwrap());
    assert!(!discover.is_nav_active(Section::Trend).await.unwrap());

    discover.navigate_to_top_rated().await.unwrap();
    assert_eq!(discover.get_current_path().await.unwrap(), "/top-rated");
    assert!(discover.is_nav_active(Section::TopRated).await.unwrap());
    assert!(discover.has_content().await.unwrap());

    discover.navigate_to_trend().await.unwrap();
    assert_eq!(discover.get_current_path().await.unwrap(), "/trend");

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_pagination_controls() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "pagination controls").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/").await.unwrap();
    discover.scroll_to_pagination().await.unwrap();

    assert!(discover.is_next_page_enabled().await);
    assert!(!discover.is_previous_page_enabled().await);
    assert!(discover.page_number_count().await.unwrap() > 1);

    let first_title = discover.movie_card(0).get_title().await;
    discover.go_to_next_page().await.unwrap();
    assert!(discover.has_content().await.unwrap());
    assert!(discover.is_previous_page_enabled().await);
    assert_ne!(discover.movie_card(0).get_title().await, first_title);

    discover.go_to_previous_page().await.unwrap();
    assert_eq!(discover.movie_card(0).get_title().await, first_title);

    discover.go_to_page(3).await.unwrap();
    assert!(!discover.is_next_page_enabled().await);

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_empty_page_has_no_content() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "empty page").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/empty").await.unwrap();

    assert!(!discover.has_content().await.unwrap());
    assert_eq!(discover.get_movie_card_count().await.unwrap(), 0);
    // Controls that are not rendered read as disabled
    assert!(!discover.is_next_page_enabled().await);
    assert!(!discover.is_previous_page_enabled().await);
    assert_eq!(discover.movie_card(0).get_title().await, "");
    assert!(!discover.movie_card(0).is_visible().await);

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_missing_element_fails_after_action_timeout() {
    let server = ensure_test_server().await;
    let (mut config, _artifacts) = test_config(&server.base_url);
    config.timeouts.action = std::time::Duration::from_millis(600);
    let Some(fx) = open_fixture(&config, "missing element").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/empty").await.unwrap();

    let started = std::time::Instant::now();
    let err = discover.search("anything").await.unwrap_err();
    assert!(started.elapsed() >= std::time::Duration::from_millis(600));

    let classified = discover_e2e::DiscoverError::from(err);
    assert_eq!(classified.exit_code(), 2);
    assert!(classified.to_string().contains("placeholder"));

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_custom_dropdown_genre() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "custom dropdown").await else {
        return;
    };

    let discover = fx.discover_page();
    discover.goto("/dropdown").await.unwrap();
    discover.select_genre("Drama").await.unwrap();

    let selected = discover
        .genre_dropdown()
        .get_attribute("data-selected")
        .await
        .unwrap();
    assert_eq!(selected.as_deref(), Some("Drama"));

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}

#[tokio::test]
#[serial]
async fn test_network_idle_keeps_counting_past_timing_buffer() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    let Some(fx) = open_fixture(&config, "resource counting").await else {
        return;
    };

    let page = fx.page();
    fx.discover_page().goto("/").await.unwrap();
    let before = page
        .evaluate("return window.__discover_net.resources;", vec![])
        .await
        .unwrap()
        .as_u64()
        .unwrap();

    // More loads than the browser's default resource timing buffer holds
    page.evaluate(
        r#"
        for (let i = 0; i < 300; i++) {
            const img = document.createElement('img');
            img.src = '/poster/' + (i % 80 + 1) + '?burst=' + i;
            document.body.appendChild(img);
        }
        return null;
        "#,
        vec![],
    )
    .await
    .unwrap();
    page.wait_for_network_idle().await.unwrap();

    let after = page
        .evaluate("return window.__discover_net.resources;", vec![])
        .await
        .unwrap()
        .as_u64()
        .unwrap();
    assert!(after >= before + 300, "counted {} then {}", before, after);

    let buffered = page
        .evaluate(
            "return performance.getEntriesByType('resource').length;",
            vec![],
        )
        .await
        .unwrap()
        .as_u64()
        .unwrap();
    assert!(buffered < 250);

    fx.finish(discover_e2e::TestStatus::Passed, std::time::Duration::ZERO)
        .await;
}
