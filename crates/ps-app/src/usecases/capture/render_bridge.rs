//! Hand-off of capture requests to the render thread.
//! 将捕获请求交给渲染线程。

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use ps_core::capture::{CaptureError, TextureLease};
use ps_core::ports::{ClockPort, FrameCapturePort};
use ps_core::PortraitImage;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type CaptureResult = Result<PortraitImage, CaptureError>;

struct PendingCaptureRequest {
    sequence: u64,
    texture: TextureLease,
    requested_at_ms: i64,
    completion: oneshot::Sender<CaptureResult>,
}

/// Completion of one capture request.
///
/// Resolves with [`CaptureError::Cancelled`] when the request is dropped
/// without being serviced. Dropping the ticket abandons the request; the
/// render thread then releases the texture without capturing it.
pub struct CaptureTicket {
    sequence: u64,
    rx: oneshot::Receiver<CaptureResult>,
}

impl CaptureTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Future for CaptureTicket {
    type Output = CaptureResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(CaptureError::Cancelled)))
    }
}

/// Single-slot mailbox between async callers and the render thread.
///
/// At most one request is pending. It is serviced by the first
/// [`service_pending`](Self::service_pending) call made at least the settle
/// delay after the request, so the game has finished drawing the portrait
/// into the texture.
pub struct RenderThreadBridge {
    pending: Mutex<Option<PendingCaptureRequest>>,
    capture: Arc<dyn FrameCapturePort>,
    clock: Arc<dyn ClockPort>,
    settle_delay_ms: i64,
    next_sequence: AtomicU64,
    shutdown: CancellationToken,
}

impl RenderThreadBridge {
    pub fn new(
        capture: Arc<dyn FrameCapturePort>,
        clock: Arc<dyn ClockPort>,
        settle_delay_ms: i64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pending: Mutex::new(None),
            capture,
            clock,
            settle_delay_ms,
            next_sequence: AtomicU64::new(1),
            shutdown,
        }
    }

    /// Queues a capture of `texture`. When another request is already pending
    /// the returned ticket resolves immediately with [`CaptureError::Busy`].
    pub fn request_capture(&self, texture: TextureLease) -> CaptureTicket {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let (completion, rx) = oneshot::channel();

        if self.shutdown.is_cancelled() {
            let _ = completion.send(Err(CaptureError::Cancelled));
            return CaptureTicket { sequence, rx };
        }

        let mut pending = self.pending.lock();
        if let Some(current) = pending.as_ref() {
            debug!(
                sequence,
                pending_sequence = current.sequence,
                "Capture already pending, rejecting request"
            );
            let _ = completion.send(Err(CaptureError::Busy));
            return CaptureTicket { sequence, rx };
        }

        debug!(sequence, texture = %texture.handle(), "Capture requested");
        *pending = Some(PendingCaptureRequest {
            sequence,
            texture,
            requested_at_ms: self.clock.now_ms(),
            completion,
        });
        CaptureTicket { sequence, rx }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Render-thread hook. Services the pending request once it has settled,
    /// or discards it if its caller went away. Returns whether a request was
    /// taken.
    pub fn service_pending(&self) -> bool {
        let request = {
            let mut pending = self.pending.lock();
            let Some(request) = pending.as_ref() else {
                return false;
            };
            let abandoned = request.completion.is_closed() || self.shutdown.is_cancelled();
            let settled = self.clock.now_ms() - request.requested_at_ms >= self.settle_delay_ms;
            if !abandoned && !settled {
                return false;
            }
            pending.take()
        };
        let Some(PendingCaptureRequest {
            sequence,
            texture,
            completion,
            ..
        }) = request
        else {
            return false;
        };

        if self.shutdown.is_cancelled() {
            texture.release();
            let _ = completion.send(Err(CaptureError::Cancelled));
            return true;
        }
        if completion.is_closed() {
            debug!(sequence, "Capture requester went away, releasing texture");
            texture.release();
            return true;
        }

        let result = self.capture.capture(texture.handle());
        texture.release();
        if let Err(err) = &result {
            warn!(sequence, error = %err, "Render-thread capture failed");
        }
        if completion.send(result).is_err() {
            debug!(sequence, "Capture finished after requester went away");
        }
        true
    }

    /// Completes any pending request with [`CaptureError::Cancelled`] and
    /// releases its texture.
    pub fn shutdown(&self) {
        let request = self.pending.lock().take();
        if let Some(request) = request {
            debug!(sequence = request.sequence, "Cancelling pending capture");
            request.texture.release();
            let _ = request.completion.send(Err(CaptureError::Cancelled));
        }
    }
}
