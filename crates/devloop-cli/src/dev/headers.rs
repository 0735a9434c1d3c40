//! Response headers applied to everything the dev server sends.
//!
//! COOP + COEP make the page cross-origin isolated, which browsers require
//! before a wasm module may use shared memory and threads.

use axum::http::header::{self, HeaderName};
use axum::http::HeaderValue;
use tower_http::set_header::SetResponseHeaderLayer;

pub(crate) const OPENER_POLICY: &str = "same-origin";
pub(crate) const EMBEDDER_POLICY: &str = "require-corp";
pub(crate) const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Create layer that adds Cross-Origin-Opener-Policy header.
pub(crate) fn opener_policy_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static(OPENER_POLICY),
    )
}

/// Create layer that adds Cross-Origin-Embedder-Policy header.
pub(crate) fn embedder_policy_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static(EMBEDDER_POLICY),
    )
}

/// Create layer that disables caching.
pub(crate) fn no_cache_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE))
}
