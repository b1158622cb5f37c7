//! Long-running video job orchestration: submit, poll, fetch.
//!
//! Steps run strictly in sequence for one request. Every step observes the
//! caller's [`CancellationToken`]; once it fires no further remote call is
//! issued and the flow ends with [`Error::Cancelled`].

use crate::ai::VideoGenerationService;
use crate::media::{MediaStore, ObjectUrl};
use crate::models::{GenerationRequest, Operation};
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

async fn cancellable<T>(
    cancel: &CancellationToken,
    step: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = step => result,
    }
}

/// One remote call; errors propagate unchanged.
pub async fn submit(
    service: &dyn VideoGenerationService,
    request: &GenerationRequest,
    cancel: &CancellationToken,
) -> Result<Operation> {
    cancellable(cancel, service.submit_video(request)).await
}

/// Refresh `operation` every `interval` until it reports done.
///
/// `on_wait` is called with the 1-based poll number before each refresh.
/// There is no iteration cap; a refresh error aborts the loop.
pub async fn poll_until_done<F>(
    service: &dyn VideoGenerationService,
    mut operation: Operation,
    interval: Duration,
    cancel: &CancellationToken,
    mut on_wait: F,
) -> Result<Operation>
where
    F: FnMut(u32) + Send,
{
    let mut polls = 0u32;
    while !operation.done {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Video job {} abandoned after {} polls", operation.name, polls);
                return Err(Error::Cancelled);
            }
            _ = tokio::time::sleep(interval) => {}
        }

        polls += 1;
        on_wait(polls);
        operation = cancellable(cancel, service.refresh_operation(&operation)).await?;
        debug!(
            "Video job {} poll {}: done={}",
            operation.name, polls, operation.done
        );
    }
    Ok(operation)
}

/// Download the finished video and register it as a local object URL.
pub async fn fetch_result(
    service: &dyn VideoGenerationService,
    media: &MediaStore,
    operation: &Operation,
    cancel: &CancellationToken,
) -> Result<ObjectUrl> {
    if !operation.done {
        return Err(Error::AiProvider(format!(
            "Video job {} is still running",
            operation.name
        )));
    }
    if let Some(error) = &operation.error {
        warn!("Video job {} failed remotely: {}", operation.name, error);
        return Err(Error::AiProvider(format!(
            "Video generation failed: {}",
            error
        )));
    }
    let uri = operation.result_uri.as_deref().ok_or_else(|| {
        Error::MissingResult("video generation finished without a download link".to_string())
    })?;

    let bytes = cancellable(cancel, service.download_video(uri)).await?;
    info!("Downloaded video for {} ({} bytes)", operation.name, bytes.len());
    Ok(media.create_object_url(bytes, VIDEO_MIME_TYPE))
}

/// Full submit → poll → fetch chain for one request.
pub async fn generate_video<F>(
    service: &dyn VideoGenerationService,
    media: &MediaStore,
    request: &GenerationRequest,
    interval: Duration,
    cancel: &CancellationToken,
    on_wait: F,
) -> Result<ObjectUrl>
where
    F: FnMut(u32) + Send,
{
    let operation = submit(service, request, cancel).await?;
    info!("Video job {} submitted", operation.name);
    let operation = poll_until_done(service, operation, interval, cancel, on_wait).await?;
    fetch_result(service, media, &operation, cancel).await
}
