//! `GET /stream/{symbol}`: Server-Sent Events backed by an aggregator subscription.
//!
//! One `price` event per delivered quote. The subscription is dropped with the
//! response stream, so a disconnecting client unsubscribes.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use copilot_core::{MarketDataAggregator, PricePoint, Subscription};
use futures_util::stream::{self, Stream};
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::AppState;

/// Receiver half of one subscription; unsubscribes on drop
struct PriceFeed {
    rx: mpsc::UnboundedReceiver<PricePoint>,
    subscription: Subscription,
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        debug!("Price stream for {} closed", self.subscription.symbol());
        self.subscription.unsubscribe();
    }
}

pub async fn stream_prices(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    Sse::new(price_events(&state.aggregator, &symbol)).keep_alive(KeepAlive::default())
}

pub fn price_events(
    aggregator: &MarketDataAggregator,
    symbol: &str,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = aggregator.subscribe(symbol, move |point: &PricePoint| {
        let _ = tx.send(point.clone());
    });

    stream::unfold(PriceFeed { rx, subscription }, |mut feed| async move {
        let point = feed.rx.recv().await?;
        let event = Event::default().event("price").json_data(&point);
        Some((event, feed))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::offline_state;
    use futures_util::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stream_emits_and_unsubscribes_on_drop() {
        let state = offline_state();
        let aggregator = state.aggregator.clone();

        let mut events = Box::pin(price_events(&aggregator, "NVDA"));
        assert_eq!(aggregator.subscriber_count("NVDA"), 1);

        let first = tokio::time::timeout(Duration::from_secs(5), events.next())
            .await
            .unwrap()
            .unwrap();
        assert!(first.is_ok());

        drop(events);
        assert_eq!(aggregator.subscriber_count("NVDA"), 0);
    }
}
