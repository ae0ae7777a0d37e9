//! Background tempo monitor
//!
//! Moves a [`TempoSession`] onto a dedicated worker thread. Producers push chunks into a
//! bounded channel and consumers read one result per chunk from a second bounded
//! channel; no state is shared between threads.
//!
//! # Example
//!
//! ```
//! use stratum_tempo::{spawn_monitor, AnalysisConfig, SampleBuffer};
//!
//! let monitor = spawn_monitor(AnalysisConfig::default(), 4)?;
//! monitor.submit(SampleBuffer::mono(vec![0.0; 44100], 44100)).unwrap();
//! let result = monitor.results().recv().unwrap();
//! assert!(result.unwrap().bpm.is_none());
//! let series = monitor.finish();
//! assert_eq!(series.len(), 1);
//! # Ok::<(), stratum_tempo::AnalysisError>(())
//! ```

use std::thread::{self, JoinHandle};

use flume::{Receiver, SendError, Sender, TrySendError};

use crate::analysis::result::{BpmEstimate, BpmSeries};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::sample_buffer::SampleBuffer;
use crate::session::TempoSession;

/// Result of one processed chunk
pub type ChunkResult = Result<BpmEstimate, AnalysisError>;

/// Handle to a running monitor
#[derive(Debug)]
pub struct Monitor {
    chunk_tx: Sender<SampleBuffer>,
    result_rx: Receiver<ChunkResult>,
    worker: JoinHandle<BpmSeries>,
}

/// Start a monitor thread
///
/// # Arguments
///
/// * `config` - Analysis configuration for the worker's session
/// * `capacity` - Bound of both the chunk queue and the result queue (> 0)
///
/// # Errors
///
/// - `InvalidConfig` if the configuration is invalid or `capacity` is 0
/// - `InvalidInput` if the worker thread cannot be spawned
pub fn spawn_monitor(config: AnalysisConfig, capacity: usize) -> Result<Monitor, AnalysisError> {
    if capacity == 0 {
        return Err(AnalysisError::InvalidConfig(
            "Monitor capacity must be > 0".to_string(),
        ));
    }
    let mut session = TempoSession::new(config)?;

    let (chunk_tx, chunk_rx) = flume::bounded::<SampleBuffer>(capacity);
    let (result_tx, result_rx) = flume::bounded::<ChunkResult>(capacity);

    let worker = thread::Builder::new()
        .name("tempo-monitor".to_string())
        .spawn(move || {
            for chunk in chunk_rx.iter() {
                let result = session.feed(&chunk);
                if result_tx.send(result).is_err() {
                    log::debug!("Monitor result receiver dropped, results discarded");
                }
            }
            session.close()
        })
        .map_err(|e| AnalysisError::InvalidInput(format!("Failed to spawn monitor: {}", e)))?;

    log::debug!("Monitor started (capacity {})", capacity);

    Ok(Monitor {
        chunk_tx,
        result_rx,
        worker,
    })
}

impl Monitor {
    /// Queue a chunk, blocking while the queue is full
    ///
    /// # Errors
    ///
    /// Returns the chunk if the worker has stopped
    pub fn submit(&self, chunk: SampleBuffer) -> Result<(), SendError<SampleBuffer>> {
        self.chunk_tx.send(chunk)
    }

    /// Queue a chunk without blocking
    ///
    /// # Errors
    ///
    /// Returns `TrySendError::Full` with the chunk when the queue is full, or
    /// `TrySendError::Disconnected` if the worker has stopped
    pub fn try_submit(&self, chunk: SampleBuffer) -> Result<(), TrySendError<SampleBuffer>> {
        self.chunk_tx.try_send(chunk)
    }

    /// Per-chunk results, in submission order
    pub fn results(&self) -> &Receiver<ChunkResult> {
        &self.result_rx
    }

    /// Chunks waiting to be processed
    pub fn pending(&self) -> usize {
        self.chunk_tx.len()
    }

    /// Stop accepting chunks, wait for the worker, and return the session series
    ///
    /// Queued chunks are still processed. Results not yet received are discarded; the
    /// returned series holds every estimate.
    pub fn finish(self) -> BpmSeries {
        let Monitor {
            chunk_tx,
            result_rx,
            worker,
        } = self;
        drop(chunk_tx);
        // Drain so a worker blocked on a full result queue can exit
        for _ in result_rx.iter() {}
        match worker.join() {
            Ok(series) => series,
            Err(_) => {
                log::warn!("Monitor worker panicked, series lost");
                BpmSeries::new()
            }
        }
    }
}
