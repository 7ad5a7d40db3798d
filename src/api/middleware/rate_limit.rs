//! Per-IP rate limiting with `tower_governor`.
//!
//! Keys come from the socket peer address, so the server must be started
//! with `into_make_service_with_connect_info::<SocketAddr>()`.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

type PeerIpGovernor = GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// General limiter for redirects, link management and health checks.
///
/// 10 requests per second, burst of 100.
pub fn layer() -> PeerIpGovernor {
    build(10, 100)
}

/// Strict limiter for `/auth/*`, where each request may run a password hash.
///
/// 1 request per second, burst of 10.
pub fn auth_layer() -> PeerIpGovernor {
    build(1, 10)
}

fn build(per_second: u64, burst: u32) -> PeerIpGovernor {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
