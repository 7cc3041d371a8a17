//! Cookie records, domain matching and set-request reconstruction.
//!
//! - [`is_cookie_domain_allowed`] - does a cookie domain fall under an allow-listed host
//! - [`CookieRecord`] - a cookie as the browser reports it and as snapshots store it
//! - [`SetCookieRequest`] - the browser call that recreates a stored cookie

mod domain;
mod record;
mod request;

pub use domain::{is_cookie_domain_allowed, normalize_cookie_domain};
pub use record::{CookieKey, CookieRecord, SameSite};
pub use request::{SetCookieRequest, build_origin_url};
