use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use url::Url;

use engine_logging::{engine_debug, engine_trace};

use crate::client::map_reqwest_error;
use crate::{SseDecoder, StreamSignal};

pub trait StreamSink: Send + Sync {
    fn emit(&self, signal: StreamSignal);
}

/// Follows one task's event stream until the server or the transport ends
/// it. Emits `Opened` once the response headers arrive, one `Message` per
/// complete event, and exactly one `Lost` at the end unless the caller aborts
/// the task first. Deciding whether a message was terminal is left to the
/// caller, which then aborts this future.
pub async fn relay_stream(client: &reqwest::Client, url: Url, sink: &dyn StreamSink) {
    engine_debug!("GET {} (event stream)", url);
    let response = match client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            sink.emit(StreamSignal::Lost(format!(
                "stream request failed: {}",
                map_reqwest_error(err)
            )));
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        sink.emit(StreamSignal::Lost(format!(
            "stream failed with status {status}: {body}"
        )));
        return;
    }
    sink.emit(StreamSignal::Opened);

    let mut decoder = SseDecoder::new();
    let mut bytes_stream = response.bytes_stream();
    while let Some(chunk_result) = bytes_stream.next().await {
        let chunk = match chunk_result {
            Ok(chunk) => chunk,
            Err(err) => {
                sink.emit(StreamSignal::Lost(format!(
                    "stream read failed: {}",
                    map_reqwest_error(err)
                )));
                return;
            }
        };
        for payload in decoder.feed(&chunk) {
            engine_trace!("stream event {}", payload);
            sink.emit(StreamSignal::Message(payload));
        }
    }

    if decoder.has_pending() {
        engine_debug!("dropping unterminated stream event at end of stream");
    }
    sink.emit(StreamSignal::Lost("stream closed by server".to_string()));
}
