// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for streamed chat completions.
//!
//! The OpenAI streaming protocol sends unnamed SSE events whose `data`
//! field is either a JSON [`ChatCompletionChunk`] or the literal `[DONE]`
//! sentinel terminating the stream.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};

use helpline_core::HelplineError;

use crate::types::ChatCompletionChunk;

/// Sentinel data value that terminates an OpenAI SSE stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Parses a reqwest streaming response into a stream of
/// [`ChatCompletionChunk`]s, ending at the `[DONE]` sentinel.
pub fn parse_chunk_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, HelplineError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream
        .map(|result| match result {
            Ok(event) => {
                if event.data.trim() == DONE_SENTINEL {
                    return None;
                }
                Some(
                    serde_json::from_str::<ChatCompletionChunk>(&event.data).map_err(|e| {
                        HelplineError::Provider {
                            message: format!("failed to parse stream chunk: {e}"),
                            source: Some(Box::new(e)),
                        }
                    }),
                )
            }
            Err(e) => Some(Err(HelplineError::Provider {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        })
        // The [DONE] sentinel maps to None; everything after it is cut off.
        .take_while(|item| futures::future::ready(item.is_some()))
        .filter_map(futures::future::ready);

    Box::pin(mapped)
}
