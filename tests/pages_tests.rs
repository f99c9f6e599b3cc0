mod common;

use axum::http::StatusCode;
use common::*;
use std::sync::Arc;
use storefront::{
    models::{Content, Product},
    views::{self, LoadState},
};

#[tokio::test]
async fn test_home_lists_active_products_and_stored_testimonials() {
    let mut quote = content(10, "home", "testimonials", Some("active"));
    quote.title = Some("Meera Iyer".to_string());
    quote.content = Some("Launched in a week.".to_string());

    let repo = Arc::new(MemoryRepository::with_rows(
        vec![
            product(1, "Starter Store", Some("active")),
            product(2, "Hidden Draft", Some("draft")),
        ],
        vec![quote],
    ));

    let res = send(app(repo), get("/")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Starter Store"));
    assert!(res.body.contains("$399"));
    assert!(!res.body.contains("Hidden Draft"));
    assert!(res.body.contains("Meera Iyer"));
    assert!(!res.body.contains("Rajesh Kumar"));
}

#[tokio::test]
async fn test_home_falls_back_when_store_is_unreachable() {
    let res = send(app(Arc::new(MemoryRepository::failing())), get("/")).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("We could not load our products"));
    assert!(res.body.contains("Rajesh Kumar"));
}

#[tokio::test]
async fn test_brochure_page_renders_its_active_sections() {
    let repo = Arc::new(MemoryRepository::with_rows(
        vec![],
        vec![
            content(1, "about", "story", Some("active")),
            content(2, "about", "team", Some("draft")),
            content(3, "services", "intro", Some("active")),
        ],
    ));

    let res = send(app(repo), get("/about")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"data-section="story""#));
    assert!(!res.body.contains(r#"data-section="team""#));
    assert!(!res.body.contains(r#"data-section="intro""#));
}

#[tokio::test]
async fn test_brochure_page_without_sections_shows_default_copy() {
    let res = send(app(Arc::new(MemoryRepository::default())), get("/contact")).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("within one business day"));
}

#[tokio::test]
async fn test_sign_in_keeps_only_same_site_redirects() {
    let res = send(
        app(Arc::new(MemoryRepository::default())),
        get("/sign-in?redirect_url=/admin/content"),
    )
    .await;
    assert!(res.body.contains("redirect_url=%2Fadmin%2Fcontent"));

    let res = send(
        app(Arc::new(MemoryRepository::default())),
        get("/sign-in?redirect_url=//evil.example.com"),
    )
    .await;
    assert!(!res.body.contains("evil.example.com"));
    assert!(res.body.contains("redirect_url=%2Fadmin\""));
}

#[tokio::test]
async fn test_sign_in_hand_off_encodes_redirect_with_query() {
    let res = send(
        app(Arc::new(MemoryRepository::default())),
        get("/sign-in?redirect_url=%2Fadmin%2Fcontent%3Fpage%3Dhome%26section%3Dhero"),
    )
    .await;

    assert!(res
        .body
        .contains("redirect_url=%2Fadmin%2Fcontent%3Fpage%3Dhome%26section%3Dhero"));
    assert!(!res.body.contains("&amp;section=hero"));
}

#[tokio::test]
async fn test_admin_forms_only_require_key_fields() {
    let res = send(
        app(Arc::new(MemoryRepository::default())),
        get_as("/admin/products", ADMIN_TOKEN),
    )
    .await;

    assert!(res.body.contains(r#"name="name" required"#));
    assert!(!res.body.contains(r#"name="category" required"#));
    // The form script leaves blank optional inputs out of the JSON body.
    assert!(res.body.contains("el.value === '' && !el.required"));
}

#[tokio::test]
async fn test_backoffice_pages_render_for_admin() {
    let repo = Arc::new(MemoryRepository::with_rows(
        vec![product(1, "Starter Store", Some("draft"))],
        vec![content(1, "home", "hero", Some("active"))],
    ));

    for (path, marker) in [
        ("/admin/products", "Starter Store"),
        ("/admin/content", "hero"),
        ("/admin/media", "Media"),
        ("/admin/settings", ADMIN_EMAIL),
        ("/admin/analytics", "Analytics"),
    ] {
        let res = send(app(repo.clone()), get_as(path, ADMIN_TOKEN)).await;
        assert_eq!(res.status, StatusCode::OK, "{}", path);
        assert!(res.body.contains(marker), "{} should mention {}", path, marker);
    }
}

#[tokio::test]
async fn test_backoffice_page_shows_notice_when_store_fails() {
    let res = send(
        app(Arc::new(MemoryRepository::failing())),
        get_as("/admin/products", ADMIN_TOKEN),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("We could not load"));
}

// --- Markup helpers ---

#[test]
fn test_escape_neutralizes_markup() {
    assert_eq!(
        views::escape(r#"<script>alert("x")</script> & 'y'"#),
        "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
    );
}

#[test]
fn test_format_price() {
    assert_eq!(views::format_price(Some(399.0)), "$399");
    assert_eq!(views::format_price(Some(12.5)), "$12.50");
    assert_eq!(views::format_price(None), "Contact us");
}

#[test]
fn test_stored_content_is_escaped_on_brochure_pages() {
    let sections = LoadState::Loaded(vec![Content {
        page: "about".to_string(),
        section: "story".to_string(),
        title: Some("<b>Bold</b>".to_string()),
        status: Some("active".to_string()),
        ..Default::default()
    }]);

    let html = views::content_page("Site", "About", &sections, "fallback");
    assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
    assert!(!html.contains("<b>Bold</b>"));
}

#[test]
fn test_empty_catalogue_message() {
    let html = views::home("Site", &LoadState::Loaded(Vec::<Product>::new()), &[]);
    assert!(html.contains("New websites are on their way"));
}
