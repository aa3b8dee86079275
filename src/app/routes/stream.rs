// ==========================================
// 实时事件流 (SSE)
// ==========================================
// 每个连接一个订阅；连接断开时流被丢弃，订阅随之注销
// ==========================================

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};

use crate::app::state::AppState;

const KEEP_ALIVE_SECS: u64 = 15;

pub async fn stream(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.broadcaster.subscribe(state.config.stream_buffer);
    tracing::info!(
        subscriber = subscription.id(),
        total = state.broadcaster.subscriber_count(),
        "SSE 客户端已连接"
    );

    let events = stream::unfold(subscription, |mut sub| async move {
        let event = sub.recv().await?;
        let frame = Event::default()
            .event(event.kind.as_str())
            .data(event.payload.to_string());
        Some((Ok(frame), sub))
    });

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keepalive"),
    )
}
