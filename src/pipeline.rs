//! Capture to tracking hand-off.
//!
//! Frames are queued on a bounded channel and consumed by one worker thread
//! that owns the [`Scene`]; the producer blocks (or drops frames with
//! [`Pipeline::try_submit`]) instead of spinning on a shared flag. Results
//! come back on an unbounded channel, so the worker never waits on the
//! consumer and a blocked `submit` always makes progress.

use crossbeam::channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use std::thread;

use crate::config::SortConfig;
use crate::error::Error;
use crate::scene::Scene;
use crate::track::TrackState;
use crate::Frame;

/// Tracking result for one submitted frame
#[derive(Debug)]
pub struct TrackedFrame {
    pub index: u64,
    pub timestamp: f32,
    pub result: Result<Vec<TrackState>, Error>,
}

pub struct Pipeline {
    frame_tx: Option<Sender<Frame>>,
    result_rx: Receiver<TrackedFrame>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Pipeline {
    /// Starts the tracking worker with room for `capacity` pending frames.
    pub fn spawn(config: SortConfig, capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidConfig(
                "pipeline capacity must be at least 1".into(),
            ));
        }

        let mut scene = Scene::new(config)?;
        let (frame_tx, frame_rx) = bounded::<Frame>(capacity);
        let (result_tx, result_rx) = unbounded::<TrackedFrame>();

        let worker = thread::Builder::new()
            .name("sortrack-worker".into())
            .spawn(move || {
                log::debug!("tracking worker started");

                while let Ok(frame) = frame_rx.recv() {
                    let result = scene.update(&frame.detections);

                    if let Err(err) = &result {
                        log::warn!("frame {} rejected: {}", frame.index, err);
                    }

                    let tracked = TrackedFrame {
                        index: frame.index,
                        timestamp: frame.timestamp,
                        result,
                    };

                    if result_tx.send(tracked).is_err() {
                        break;
                    }
                }

                log::debug!(
                    "tracking worker stopped after {} frames",
                    scene.frame_count()
                );
            })?;

        Ok(Self {
            frame_tx: Some(frame_tx),
            result_rx,
            worker: Some(worker),
        })
    }

    /// Queues a frame, blocking while the queue is full.
    pub fn submit(&self, frame: Frame) -> Result<(), Error> {
        let tx = self.frame_tx.as_ref().ok_or(Error::PipelineClosed)?;

        tx.send(frame).map_err(|_| Error::PipelineClosed)
    }

    /// Queues a frame without blocking. Returns `false` if the queue is full
    /// and the frame was dropped.
    pub fn try_submit(&self, frame: Frame) -> Result<bool, Error> {
        let tx = self.frame_tx.as_ref().ok_or(Error::PipelineClosed)?;

        match tx.try_send(frame) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(frame)) => {
                log::debug!("queue full, dropping frame {}", frame.index);
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::PipelineClosed),
        }
    }

    /// Next result in submission order, blocking until it is ready. Blocks
    /// forever on an idle pipeline; the worker only stops after `finish` or
    /// a panic, so `None` means the worker panicked.
    pub fn recv(&self) -> Option<TrackedFrame> {
        self.result_rx.recv().ok()
    }

    #[inline]
    pub fn try_recv(&self) -> Option<TrackedFrame> {
        self.result_rx.try_recv().ok()
    }

    /// Closes the input, waits for the queued frames to be tracked and
    /// returns the results not received yet.
    pub fn finish(mut self) -> Result<Vec<TrackedFrame>, Error> {
        self.shutdown()?;

        Ok(self.result_rx.try_iter().collect())
    }

    fn shutdown(&mut self) -> Result<(), Error> {
        self.frame_tx.take();

        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| Error::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::warn!("pipeline shutdown: {}", err);
        }
    }
}
