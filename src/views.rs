//! Server-rendered HTML for the storefront and the back-office.
//!
//! Every dynamic value goes through [`escape`] before it reaches the markup.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::models::{Content, DashboardStats, Product};

const SITE_CSS: &str = include_str!("web/site.css");
const ADMIN_JS: &str = include_str!("web/admin.js");

/// LoadState
///
/// Outcome of the data fetch behind a rendered list. Rendering happens once the fetch
/// settled, so the only states a page can show are "loaded" and "failed".
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loaded(T),
    Failed,
}

impl<T> LoadState<T> {
    /// Converts a fetch result, logging the cause of a failure.
    pub fn from_result<E: Display>(result: Result<T, E>, what: &str) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(e) => {
                tracing::error!(error = %e, "failed to load {}", what);
                LoadState::Failed
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loaded(value) => LoadState::Loaded(f(value)),
            LoadState::Failed => LoadState::Failed,
        }
    }
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_default()
}

/// "$399" for whole amounts, "$12.50" otherwise.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.fract() == 0.0 => format!("${:.0}", p),
        Some(p) => format!("${:.2}", p),
        None => "Contact us".to_string(),
    }
}

fn failed_notice(what: &str) -> String {
    format!(
        r#"<p class="notice">We could not load {} right now. Please refresh the page to try again.</p>"#,
        escape(what)
    )
}

// --- Public site ---

/// Testimonial
///
/// A client quote shown on the home page.
#[derive(Debug, Clone, PartialEq)]
pub struct Testimonial {
    pub name: String,
    pub role: String,
    pub quote: String,
}

impl Testimonial {
    /// Testimonials are content rows on page "home", section "testimonials".
    pub fn from_content(item: &Content) -> Self {
        Self {
            name: item.title.clone().unwrap_or_else(|| "Anonymous".to_string()),
            role: "Client".to_string(),
            quote: item.content.clone().unwrap_or_default(),
        }
    }

    /// Shown when the content feed cannot be read.
    pub fn fallback() -> Vec<Self> {
        [
            (
                "Rajesh Kumar",
                "E-commerce Store Owner",
                "Bought a dropshipping store and was making sales within a week. The onboarding was smooth and support team is very responsive.",
            ),
            (
                "Priya Sharma",
                "Affiliate Marketer",
                "The affiliate website I purchased is perfectly optimized for conversions. Already earning commissions and ranking well on Google.",
            ),
            (
                "Arjun Patel",
                "SaaS Founder",
                "Got a custom landing page that converted 3x better than my old site. The AI chatbot integration is a game-changer for lead generation.",
            ),
        ]
        .into_iter()
        .map(|(name, role, quote)| Self {
            name: name.to_string(),
            role: role.to_string(),
            quote: quote.to_string(),
        })
        .collect()
    }
}

/// Wraps a public page body in the site chrome.
pub fn public_page(site_name: &str, title: &str, body: &str) -> String {
    let site = escape(site_name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {site}</title>
<style>{css}</style>
</head>
<body>
<header class="site-header">
  <a class="brand" href="/">{site}</a>
  <nav>
    <a href="/">Home</a>
    <a href="/services">Services</a>
    <a href="/about">About</a>
    <a href="/contact">Contact</a>
    <a href="/admin">Admin</a>
  </nav>
</header>
<main>
{body}
</main>
<footer class="site-footer">&copy; {site}. Ready-made websites and AI solutions.</footer>
</body>
</html>"#,
        title = escape(title),
        site = site,
        css = SITE_CSS,
        body = body,
    )
}

fn product_card(product: &Product) -> String {
    let image = product
        .image_url
        .as_deref()
        .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape(url), escape(&product.name)))
        .unwrap_or_default();
    let category = product
        .category
        .as_deref()
        .map(|c| format!(r#"<span class="tag">{}</span>"#, escape(c)))
        .unwrap_or_default();

    format!(
        r#"<article class="card">{image}{category}<h3>{name}</h3><p class="muted">{description}</p><p class="price">{price}</p><a href="/contact">Get started</a></article>"#,
        image = image,
        category = category,
        name = escape(&product.name),
        description = opt(&product.description),
        price = escape(&format_price(product.price)),
    )
}

fn testimonial_card(testimonial: &Testimonial) -> String {
    format!(
        r#"<blockquote class="card"><p>&quot;{quote}&quot;</p><footer><strong>{name}</strong><br><span class="muted">{role}</span></footer></blockquote>"#,
        quote = escape(&testimonial.quote),
        name = escape(&testimonial.name),
        role = escape(&testimonial.role),
    )
}

/// Storefront landing page: active products and testimonials.
pub fn home(
    site_name: &str,
    products: &LoadState<Vec<Product>>,
    testimonials: &[Testimonial],
) -> String {
    let catalogue = match products {
        LoadState::Loaded(items) if items.is_empty() => {
            r#"<p class="muted">New websites are on their way. Check back soon.</p>"#.to_string()
        }
        LoadState::Loaded(items) => format!(
            r#"<div class="grid">{}</div>"#,
            items.iter().map(product_card).collect::<String>()
        ),
        LoadState::Failed => failed_notice("our products"),
    };

    let quotes = testimonials.iter().map(testimonial_card).collect::<String>();

    let body = format!(
        r#"<section class="hero">
  <h1>Launch a website that earns from day one</h1>
  <p class="muted">Ready-made stores, affiliate sites and AI solutions, set up and handed over.</p>
</section>
<section id="pricing">
  <h2>Transparent Pricing</h2>
  {catalogue}
</section>
<section id="testimonials">
  <h2>What Our Clients Say</h2>
  <div class="grid">{quotes}</div>
</section>"#,
        catalogue = catalogue,
        quotes = quotes,
    );
    public_page(site_name, "Home", &body)
}

/// A brochure page assembled from its active content sections, or the default copy
/// when the page has none.
pub fn content_page(
    site_name: &str,
    title: &str,
    sections: &LoadState<Vec<Content>>,
    default_copy: &str,
) -> String {
    let rendered = match sections {
        LoadState::Loaded(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                let image = item
                    .image_url
                    .as_deref()
                    .map(|url| format!(r#"<img src="{}" alt="">"#, escape(url)))
                    .unwrap_or_default();
                format!(
                    r#"<section class="card" data-section="{section}">{image}<h2>{title}</h2><p>{content}</p></section>"#,
                    section = escape(&item.section),
                    image = image,
                    title = opt(&item.title),
                    content = opt(&item.content),
                )
            })
            .collect::<String>(),
        _ => format!(r#"<p>{}</p>"#, escape(default_copy)),
    };

    let body = format!(r#"<h1>{}</h1>{}"#, escape(title), rendered);
    public_page(site_name, title, &body)
}

/// Sign-in hand-off to the identity provider's hosted page.
pub fn sign_in(site_name: &str, sign_in_url: &str, redirect: &str) -> String {
    let target = if sign_in_url.contains('?') { '&' } else { '?' };
    let redirect: String = form_urlencoded::byte_serialize(redirect.as_bytes()).collect();
    let body = format!(
        r#"<section class="card" style="max-width:28rem;margin:4rem auto;text-align:center">
  <h1>Admin Login</h1>
  <p class="muted">Sign in with your administrator account to manage the site.</p>
  <p><a href="{url}{sep}redirect_url={redirect}"><button type="button">Continue to sign in</button></a></p>
</section>"#,
        url = escape(sign_in_url),
        sep = target,
        redirect = escape(&redirect),
    );
    public_page(site_name, "Sign in", &body)
}

// --- Back-office ---

/// Sections of the back-office navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Dashboard,
    Products,
    Content,
    Media,
    Analytics,
    Settings,
}

impl AdminSection {
    const ALL: [AdminSection; 6] = [
        AdminSection::Dashboard,
        AdminSection::Products,
        AdminSection::Content,
        AdminSection::Media,
        AdminSection::Analytics,
        AdminSection::Settings,
    ];

    fn href(self) -> &'static str {
        match self {
            AdminSection::Dashboard => "/admin",
            AdminSection::Products => "/admin/products",
            AdminSection::Content => "/admin/content",
            AdminSection::Media => "/admin/media",
            AdminSection::Analytics => "/admin/analytics",
            AdminSection::Settings => "/admin/settings",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AdminSection::Dashboard => "Dashboard",
            AdminSection::Products => "Products",
            AdminSection::Content => "Content",
            AdminSection::Media => "Media",
            AdminSection::Analytics => "Analytics",
            AdminSection::Settings => "Settings",
        }
    }
}

fn admin_document(site_name: &str, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {site} Admin</title>
<style>{css}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        site = escape(site_name),
        css = SITE_CSS,
        body = body,
    )
}

/// Wraps a back-office body in the sidebar layout.
pub fn admin_page(site_name: &str, active: AdminSection, email: &str, body: &str) -> String {
    let nav = AdminSection::ALL
        .iter()
        .map(|section| {
            let class = if *section == active { r#" class="active""# } else { "" };
            format!(r#"<a href="{}"{}>{}</a>"#, section.href(), class, section.label())
        })
        .collect::<String>();

    let layout = format!(
        r#"<div class="admin">
<aside>
  <a class="brand" href="/" style="color:#fff">{site}</a>
  <nav>{nav}</nav>
  <p class="muted" style="margin-top:2rem;font-size:.8rem">{email}</p>
</aside>
<div class="content">
{body}
</div>
</div>
<script>{js}</script>"#,
        site = escape(site_name),
        nav = nav,
        email = escape(email),
        body = body,
        js = ADMIN_JS,
    );
    admin_document(site_name, active.label(), &layout)
}

/// Shown to a signed-in user whose email is not on the admin allowlist.
pub fn access_denied(site_name: &str, email: Option<&str>) -> String {
    let body = format!(
        r#"<div class="denied">
  <h2>Access Denied</h2>
  <p>Only authorized administrators can access this dashboard.</p>
  <p class="muted">Email: {}</p>
</div>"#,
        escape(email.unwrap_or("unknown"))
    );
    admin_document(site_name, "Access Denied", &body)
}

pub fn dashboard(stats: &LoadState<DashboardStats>) -> String {
    let cards = match stats {
        LoadState::Loaded(stats) => {
            let tiles = [
                ("Total Products", stats.total_products),
                ("Active Products", stats.active_products),
                ("Content Pages", stats.content_pages),
                ("Content Sections", stats.content_sections),
            ];
            format!(
                r#"<div class="stats">{}</div>"#,
                tiles
                    .iter()
                    .map(|(label, value)| format!(
                        r#"<div class="card stat"><p class="muted">{}</p><p class="value">{}</p></div>"#,
                        label, value
                    ))
                    .collect::<String>()
            )
        }
        LoadState::Failed => failed_notice("the dashboard figures"),
    };

    format!(
        r#"<h1>Dashboard</h1>
<p class="muted">Welcome back! Here's what's happening with your website.</p>
{cards}
<div class="grid">
  <div class="card"><h3>Quick Actions</h3>
    <p><a href="/admin/products">+ Add New Product</a></p>
    <p><a href="/admin/content">+ Create Content</a></p>
  </div>
  <div class="card"><h3>Website Status</h3><p>Online</p></div>
</div>"#,
        cards = cards
    )
}

fn record_json<T: serde::Serialize>(record: &T) -> String {
    escape(&serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string()))
}

pub fn admin_products(products: &LoadState<Vec<Product>>) -> String {
    let table = match products {
        LoadState::Loaded(items) if items.is_empty() => {
            r#"<p class="muted">No products yet.</p>"#.to_string()
        }
        LoadState::Loaded(items) => {
            let rows = items
                .iter()
                .map(|p| {
                    format!(
                        r#"<tr><td>{name}</td><td>{category}</td><td>{price}</td><td>{status}</td><td><button type="button" class="secondary" data-action="edit" data-form="product-form" data-record="{record}">Edit</button> <button type="button" class="danger" data-action="delete" data-endpoint="/api/products/{id}">Delete</button></td></tr>"#,
                        name = escape(&p.name),
                        category = opt(&p.category),
                        price = escape(&format_price(p.price)),
                        status = opt(&p.status),
                        record = record_json(p),
                        id = p.id,
                    )
                })
                .collect::<String>();
            format!(
                r#"<table><thead><tr><th>Name</th><th>Category</th><th>Price</th><th>Status</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
                rows
            )
        }
        LoadState::Failed => failed_notice("the product list"),
    };

    format!(
        r#"<h1>Products</h1>
<p class="muted">Manage your products and inventory</p>
{table}
<form id="product-form" class="record card" data-collection="/api/products" data-endpoint="/api/products" data-method="POST" data-state="idle">
  <h2 class="form-title" data-create="Add Product" data-edit="Edit Product">Add Product</h2>
  <label>Name <input name="name" required></label>
  <label>Description <textarea name="description" rows="3"></textarea></label>
  <label>Price <input name="price" type="number" step="0.01" data-kind="number"></label>
  <label>Category <input name="category"></label>
  <label>Status <select name="status"><option value="active">active</option><option value="inactive">inactive</option></select></label>
  <label>Image URL <input id="product-image" name="image_url"></label>
  <label>Upload image <input type="file" accept="image/*" data-target="product-image"></label>
  <p class="form-status"></p>
  <div><button type="submit">Save</button> <button type="button" class="secondary" data-action="cancel">Cancel</button></div>
</form>"#,
        table = table
    )
}

pub fn admin_content(content: &LoadState<Vec<Content>>) -> String {
    let listing = match content {
        LoadState::Loaded(items) if items.is_empty() => {
            r#"<p class="muted">No content yet.</p>"#.to_string()
        }
        LoadState::Loaded(items) => {
            let mut by_page: BTreeMap<&str, Vec<&Content>> = BTreeMap::new();
            for item in items {
                by_page.entry(item.page.as_str()).or_default().push(item);
            }
            by_page
                .into_iter()
                .map(|(page, sections)| {
                    let rows = sections
                        .iter()
                        .map(|c| {
                            format!(
                                r#"<tr><td>{section}</td><td>{title}</td><td>{status}</td><td><button type="button" class="secondary" data-action="edit" data-form="content-form" data-record="{record}">Edit</button></td></tr>"#,
                                section = escape(&c.section),
                                title = opt(&c.title),
                                status = opt(&c.status),
                                record = record_json(*c),
                            )
                        })
                        .collect::<String>();
                    format!(
                        r#"<h2>{page}</h2><table><thead><tr><th>Section</th><th>Title</th><th>Status</th><th></th></tr></thead><tbody>{rows}</tbody></table>"#,
                        page = escape(page),
                        rows = rows
                    )
                })
                .collect::<String>()
        }
        LoadState::Failed => failed_notice("the page content"),
    };

    format!(
        r#"<h1>Content</h1>
<p class="muted">Manage the text and images shown on each page</p>
{listing}
<form id="content-form" class="record card" data-collection="/api/content" data-endpoint="/api/content" data-method="POST" data-state="idle">
  <h2 class="form-title" data-create="Add Content" data-edit="Edit Content">Add Content</h2>
  <label>Page <input name="page" required placeholder="home"></label>
  <label>Section <input name="section" required placeholder="hero"></label>
  <label>Title <input name="title"></label>
  <label>Content <textarea name="content" rows="5"></textarea></label>
  <label>Status <select name="status"><option value="active">active</option><option value="inactive">inactive</option></select></label>
  <label>Image URL <input id="content-image" name="image_url"></label>
  <label>Upload image <input type="file" accept="image/*" data-target="content-image"></label>
  <p class="form-status"></p>
  <div><button type="submit">Save</button> <button type="button" class="secondary" data-action="cancel">Cancel</button></div>
</form>"#,
        listing = listing
    )
}

pub fn admin_media() -> String {
    r#"<h1>Media Library</h1>
<p class="muted">Upload images for products and page content. PNG, JPG, GIF or WebP up to 10MB.</p>
<div class="card">
  <label>Choose file <input type="file" accept="image/png,image/jpeg,image/gif,image/webp" data-target="media-url"></label>
  <p>Public URL of the last upload:</p>
  <input id="media-url" readonly style="width:100%">
</div>"#
        .to_string()
}

pub fn admin_settings(site_name: &str, admins: &[String], sign_in_url: &str) -> String {
    let admin_list = admins
        .iter()
        .map(|email| format!("<li>{}</li>", escape(email)))
        .collect::<String>();

    format!(
        r#"<h1>Settings</h1>
<p class="muted">Settings are read from the server environment at startup.</p>
<div class="card"><h3>General</h3><p>Site name: <strong>{site}</strong></p></div>
<div class="card"><h3>Administrators</h3><ul>{admins}</ul></div>
<div class="card"><h3>Sign-in</h3><p>{sign_in}</p></div>"#,
        site = escape(site_name),
        admins = admin_list,
        sign_in = escape(sign_in_url),
    )
}

/// Breakdown of products by status and category, and of content sections by page.
pub fn admin_analytics(data: &LoadState<(Vec<Product>, Vec<Content>)>) -> String {
    let (products, content) = match data {
        LoadState::Loaded(pair) => pair,
        LoadState::Failed => {
            return format!("<h1>Analytics</h1>{}", failed_notice("the analytics"));
        }
    };

    fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for key in keys {
            *counts.entry(key).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(key, count)| format!("<tr><td>{}</td><td>{}</td></tr>", escape(key), count))
            .collect()
    }

    let by_status = tally(products.iter().map(|p| p.status.as_deref().unwrap_or("none")));
    let by_category = tally(
        products
            .iter()
            .map(|p| p.category.as_deref().unwrap_or("uncategorised")),
    );
    let by_page = tally(content.iter().map(|c| c.page.as_str()));

    format!(
        r#"<h1>Analytics</h1>
<div class="grid">
  <div class="card"><h3>Products by status</h3><table>{by_status}</table></div>
  <div class="card"><h3>Products by category</h3><table>{by_category}</table></div>
  <div class="card"><h3>Sections by page</h3><table>{by_page}</table></div>
</div>"#,
        by_status = by_status,
        by_category = by_category,
        by_page = by_page,
    )
}
