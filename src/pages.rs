//! Page handlers. Public pages render from the active rows; back-office pages check the
//! admin allowlist themselves and render the denial view on mismatch.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::Session,
    models::{self, ContentFilter, DashboardStats},
    views::{self, AdminSection, LoadState, Testimonial},
};

const TESTIMONIAL_PAGE: &str = "home";
const TESTIMONIAL_SECTION: &str = "testimonials";

// --- Public pages ---

pub async fn home(State(state): State<AppState>) -> Html<String> {
    let products = LoadState::from_result(state.repo.list_products().await, "products")
        .map(models::active_products);

    let testimonials = match state.repo.list_content().await {
        Ok(content) => ContentFilter {
            page: Some(TESTIMONIAL_PAGE.to_string()),
            section: Some(TESTIMONIAL_SECTION.to_string()),
        }
        .apply(content)
        .iter()
        .map(Testimonial::from_content)
        .collect(),
        Err(e) => {
            tracing::error!(error = %e, "failed to load testimonials, using defaults");
            Testimonial::fallback()
        }
    };

    Html(views::home(&state.config.site_name, &products, &testimonials))
}

async fn brochure(state: &AppState, page: &str, title: &str, default_copy: &str) -> Html<String> {
    let filter = ContentFilter {
        page: Some(page.to_string()),
        section: None,
    };
    let sections = LoadState::from_result(state.repo.list_content().await, "page content")
        .map(|content| filter.apply(content));

    Html(views::content_page(
        &state.config.site_name,
        title,
        &sections,
        default_copy,
    ))
}

pub async fn about(State(state): State<AppState>) -> Html<String> {
    brochure(
        &state,
        "about",
        "About Us",
        "We build ready-made websites and AI solutions that start generating value from day one.",
    )
    .await
}

pub async fn services(State(state): State<AppState>) -> Html<String> {
    brochure(
        &state,
        "services",
        "Services",
        "Dropshipping stores, affiliate sites, AI chatbots and custom websites, delivered ready to run.",
    )
    .await
}

pub async fn contact(State(state): State<AppState>) -> Html<String> {
    brochure(
        &state,
        "contact",
        "Contact",
        "Tell us what you need and we will get back to you within one business day.",
    )
    .await
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInParams {
    pub redirect_url: Option<String>,
}

pub async fn sign_in(
    State(state): State<AppState>,
    Query(params): Query<SignInParams>,
) -> Html<String> {
    // Only same-site paths are accepted as the post-sign-in destination.
    let redirect = params
        .redirect_url
        .filter(|url| url.starts_with('/') && !url.starts_with("//"))
        .unwrap_or_else(|| "/admin".to_string());

    Html(views::sign_in(
        &state.config.site_name,
        &state.config.identity.sign_in_url,
        &redirect,
    ))
}

pub async fn login() -> Redirect {
    Redirect::to("/sign-in")
}

// --- Back-office pages ---

/// The page-level admin check: `Some(denial view)` when the session's email is not on
/// the allowlist.
fn deny_non_admin(state: &AppState, session: &Session) -> Option<Response> {
    let email = session.email.as_deref();
    if state.config.admin_emails.permits(email) {
        return None;
    }

    tracing::warn!(
        user_id = %session.user_id,
        email = ?email,
        "non-admin session shown the access denied view"
    );
    Some(Html(views::access_denied(&state.config.site_name, email)).into_response())
}

fn render_admin(state: &AppState, session: &Session, section: AdminSection, body: &str) -> Response {
    Html(views::admin_page(
        &state.config.site_name,
        section,
        session.email.as_deref().unwrap_or_default(),
        body,
    ))
    .into_response()
}

pub async fn dashboard(State(state): State<AppState>, session: Session) -> Response {
    if let Some(denied) = deny_non_admin(&state, &session) {
        return denied;
    }

    let stats = match (state.repo.list_products().await, state.repo.list_content().await) {
        (Ok(products), Ok(content)) => {
            LoadState::Loaded(DashboardStats::from_rows(&products, &content))
        }
        (Err(e), _) | (_, Err(e)) => LoadState::from_result(Err(e), "dashboard figures"),
    };

    render_admin(&state, &session, AdminSection::Dashboard, &views::dashboard(&stats))
}

pub async fn products(State(state): State<AppState>, session: Session) -> Response {
    if let Some(denied) = deny_non_admin(&state, &session) {
        return denied;
    }

    let products = LoadState::from_result(state.repo.list_products().await, "products");
    render_admin(
        &state,
        &session,
        AdminSection::Products,
        &views::admin_products(&products),
    )
}

pub async fn content(State(state): State<AppState>, session: Session) -> Response {
    if let Some(denied) = deny_non_admin(&state, &session) {
        return denied;
    }

    let content = LoadState::from_result(state.repo.list_content().await, "content");
    render_admin(
        &state,
        &session,
        AdminSection::Content,
        &views::admin_content(&content),
    )
}

pub async fn media(State(state): State<AppState>, session: Session) -> Response {
    if let Some(denied) = deny_non_admin(&state, &session) {
        return denied;
    }

    render_admin(&state, &session, AdminSection::Media, &views::admin_media())
}

pub async fn settings(State(state): State<AppState>, session: Session) -> Response {
    if let Some(denied) = deny_non_admin(&state, &session) {
        return denied;
    }

    let body = views::admin_settings(
        &state.config.site_name,
        state.config.admin_emails.emails(),
        &state.config.identity.sign_in_url,
    );
    render_admin(&state, &session, AdminSection::Settings, &body)
}

pub async fn analytics(State(state): State<AppState>, session: Session) -> Response {
    if let Some(denied) = deny_non_admin(&state, &session) {
        return denied;
    }

    let data = match (state.repo.list_products().await, state.repo.list_content().await) {
        (Ok(products), Ok(content)) => LoadState::Loaded((products, content)),
        (Err(e), _) | (_, Err(e)) => LoadState::from_result(Err(e), "analytics"),
    };

    render_admin(
        &state,
        &session,
        AdminSection::Analytics,
        &views::admin_analytics(&data),
    )
}
