//! Background workers for blocking service calls.
//!
//! The prediction request is the lifecycle's single suspension point. Running
//! it on a worker thread keeps the TUI loop drawing and reading keys while the
//! request is in flight; the result comes back over an `mpsc` channel.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::domain::{Payload, PredictionResponse};
use crate::ports::{PredictError, PredictionService, ServiceStatus};

/// Progress updates from a request worker.
#[derive(Debug, Clone)]
pub enum RequestProgress {
    /// Request handed to the transport
    Sending,
    /// Transport returned (successfully or not)
    Settled(Result<PredictionResponse, PredictError>),
}

/// What a non-blocking poll of a worker found.
#[derive(Debug)]
pub enum WorkerPoll<T> {
    Empty,
    Ready(T),
    /// The worker exited without sending anything more.
    Lost,
}

fn poll_channel<T>(rx: &Receiver<T>) -> WorkerPoll<T> {
    match rx.try_recv() {
        Ok(msg) => WorkerPoll::Ready(msg),
        Err(TryRecvError::Empty) => WorkerPoll::Empty,
        Err(TryRecvError::Disconnected) => WorkerPoll::Lost,
    }
}

/// Handle to a running request worker.
pub struct RequestWorkerHandle {
    progress_rx: Receiver<RequestProgress>,
    _handle: JoinHandle<()>,
}

impl RequestWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> WorkerPoll<RequestProgress> {
        poll_channel(&self.progress_rx)
    }
}

/// Spawns one thread per submission.
pub struct RequestWorker;

impl RequestWorker {
    /// Send `payload` on a background thread.
    pub fn spawn(service: Arc<dyn PredictionService>, payload: Payload) -> RequestWorkerHandle {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let _ = tx.send(RequestProgress::Sending);
            let result = service.predict(&payload);
            // The receiver is gone if the app quit mid-request; nothing to do.
            let _ = tx.send(RequestProgress::Settled(result));
        });

        RequestWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }
}

/// One-shot `GET /` probe.
pub struct HealthProbe {
    rx: Receiver<Result<ServiceStatus, PredictError>>,
}

impl HealthProbe {
    pub fn spawn(service: Arc<dyn PredictionService>) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(service.health());
        });
        Self { rx }
    }

    #[must_use]
    pub fn try_recv(&self) -> WorkerPoll<Result<ServiceStatus, PredictError>> {
        poll_channel(&self.rx)
    }
}
