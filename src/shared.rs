use std::sync::{Arc, Mutex, RwLock};

use anyhow::anyhow;

use crate::detection::tracker::CounterSnapshot;
use crate::models::Frame;
use crate::pipeline::{CounterSession, FrameReport};

/// Thread-safe handle around a [`CounterSession`].
///
/// Ingestion goes through a mutex so only one frame is processed at a time.
/// After each frame (and after a reset) a snapshot is published behind a
/// separate lock, so readers of the current total never wait for a frame.
#[derive(Clone)]
pub struct SharedSession {
    session: Arc<Mutex<CounterSession>>,
    snapshot: Arc<RwLock<CounterSnapshot>>,
}

impl SharedSession {
    pub fn new(session: CounterSession) -> Self {
        let snapshot = session.snapshot();
        Self {
            session: Arc::new(Mutex::new(session)),
            snapshot: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub fn process_frame(&self, frame: &Frame) -> anyhow::Result<FrameReport> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Counter session lock poisoned"))?;
        let report = session.process_frame(frame)?;
        self.publish(session.snapshot())?;
        Ok(report)
    }

    pub fn reset(&self) -> anyhow::Result<()> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Counter session lock poisoned"))?;
        session.reset();
        self.publish(session.snapshot())
    }

    /// Counter state as of the last completed frame
    pub fn snapshot(&self) -> anyhow::Result<CounterSnapshot> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| anyhow!("Counter snapshot lock poisoned"))?;
        Ok(snapshot.clone())
    }

    pub fn total_count(&self) -> anyhow::Result<u64> {
        Ok(self.snapshot()?.total_count)
    }

    fn publish(&self, snapshot: CounterSnapshot) -> anyhow::Result<()> {
        let mut slot = self
            .snapshot
            .write()
            .map_err(|_| anyhow!("Counter snapshot lock poisoned"))?;
        *slot = snapshot;
        Ok(())
    }
}
