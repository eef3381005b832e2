use tracing::{info, warn};

use crate::models::Frame;
use crate::pipeline::{CounterSession, FrameReport};
use crate::source::FrameSource;

/// Why [`run`] stopped feeding frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    /// The source failed to produce a frame
    ReadFailure,
    /// The session refused a frame, e.g. after a size change
    FrameRejected,
    /// The per-frame callback failed
    OutputFailure,
}

/// Feed every frame of `source` through `session` until the stream ends or
/// something fails. Failures are logged and end the run; the session keeps
/// the state of the last accepted frame.
///
/// With `reset_every = Some(n)` the counter is reset after every `n` frames.
/// The reset is applied when the next frame arrives, so the total of the
/// final frame is never discarded.
pub fn run<S, F>(
    session: &mut CounterSession,
    source: &mut S,
    reset_every: Option<u64>,
    mut on_frame: F,
) -> StopReason
where
    S: FrameSource + ?Sized,
    F: FnMut(&Frame, &FrameReport) -> anyhow::Result<()>,
{
    let mut reset_pending = false;

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("End of stream");
                return StopReason::EndOfStream;
            }
            Err(e) => {
                warn!("Frame could not be read: {:#}", e);
                return StopReason::ReadFailure;
            }
        };

        if let Err(e) = session.check_frame(&frame) {
            warn!("Frame rejected: {}", e);
            return StopReason::FrameRejected;
        }
        if reset_pending {
            session.reset();
            reset_pending = false;
        }

        let report = match session.process_frame(&frame) {
            Ok(report) => report,
            Err(e) => {
                warn!("Frame rejected: {}", e);
                return StopReason::FrameRejected;
            }
        };
        if let Err(e) = on_frame(&frame, &report) {
            warn!("Frame output failed: {:#}", e);
            return StopReason::OutputFailure;
        }

        if let Some(every) = reset_every {
            if every > 0 && report.frame_index % every == 0 {
                reset_pending = true;
            }
        }
    }
}
