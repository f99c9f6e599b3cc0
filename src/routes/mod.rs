/// Router Module Index
///
/// Routes are grouped by who may reach them. The access gate in `crate::gate` enforces
/// the grouping from the request path, so the split here mirrors its pattern sets.

/// Storefront pages and the public read API. No session required.
pub mod public;

/// JSON admin API under `/api/products`, `/api/content` and `/api/upload`.
/// Session and allowlisted admin email required.
pub mod admin;

/// Back-office HTML pages under `/admin`. Session required; the pages render the
/// access-denied view for non-admin sessions.
pub mod backoffice;
