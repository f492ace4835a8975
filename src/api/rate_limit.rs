use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{ApiError, AppState};

/// Peer address attached to every API request so handlers (contact intake)
/// can stamp submission metadata without re-deriving it.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

#[derive(Debug, Clone, Copy)]
struct WindowSlot {
    started: Instant,
    count: u32,
}

/// Process-local fixed-window counter keyed by client address. Good enough
/// for a single-instance deployment; a second instance gets its own counts.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<IpAddr, WindowSlot>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_seconds),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count a hit for `ip` and report whether it is still inside the
    /// window budget. Expired windows are evicted on every call so memory
    /// stays proportional to the number of currently active addresses.
    pub async fn try_acquire(&self, ip: Option<IpAddr>) -> bool {
        // Requests with no peer info share one bucket rather than bypassing
        // the limiter.
        let key = ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let now = Instant::now();

        let mut windows = self.windows.lock().await;
        windows.retain(|_, slot| now.duration_since(slot.started) < self.window);

        let slot = windows.entry(key).or_insert(WindowSlot {
            started: now,
            count: 0,
        });

        if now.duration_since(slot.started) >= self.window {
            slot.started = now;
            slot.count = 0;
        }

        slot.count += 1;
        slot.count <= self.max_requests
    }
}

fn peer_ip(request: &Request) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Global API throttle. Also the single place that stamps `ClientIp`.
pub async fn throttle_api(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = peer_ip(&request);
    request.extensions_mut().insert(ClientIp(ip));

    if !state.api_limiter.try_acquire(ip).await {
        return Err(ApiError::RateLimited(
            "Too many requests, please try again later".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Stricter throttle mounted on credential endpoints to blunt
/// credential-stuffing.
pub async fn throttle_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = peer_ip(&request);

    if !state.auth_limiter.try_acquire(ip).await {
        return Err(ApiError::RateLimited(
            "Too many authentication attempts, please try again later".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
