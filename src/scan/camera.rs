use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};

use super::device::{select_device, CameraError, CameraProvider, CaptureDevice, DeviceSelector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Active,
}

/// Events emitted by an active session.
#[derive(Debug)]
pub enum ScanEvent {
    /// A frame decoded to a payload. The session tears itself down after
    /// emitting this; the UI is one ticket per session, not continuous scan.
    Payload(String),
    /// The device failed mid-session. The session is back in Idle.
    Failed(CameraError),
}

/// State shared with the decode task. The epoch identifies which started
/// session the state belongs to; `start` and `stop` bump it, so a decode
/// task outliving its session cannot clobber the state of a newer one.
struct Shared {
    state: SessionState,
    epoch: u64,
}

/// Owns at most one open capture device and guarantees it is released on
/// every exit path. The decode task owns the boxed device, so whichever way
/// the loop ends (payload emitted, stop signal, device fault, session drop)
/// the handle is dropped and released.
pub struct CameraSession {
    provider: Arc<dyn CameraProvider>,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::Sender<ScanEvent>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl CameraSession {
    pub fn new(provider: Arc<dyn CameraProvider>) -> (Self, mpsc::Receiver<ScanEvent>) {
        let (events, rx) = mpsc::channel(4);
        (
            Self {
                provider,
                shared: Arc::new(Mutex::new(Shared {
                    state: SessionState::Idle,
                    epoch: 0,
                })),
                events,
                shutdown: None,
            },
            rx,
        )
    }

    pub async fn state(&self) -> SessionState {
        self.shared.lock().await.state
    }

    /// Acquire a device and run the decode loop. Idempotent while Starting
    /// or Active, so a double tap cannot open a second device handle. Any
    /// failure lands back in Idle with a classified error.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        {
            let mut shared = self.shared.lock().await;
            if shared.state != SessionState::Idle {
                return Ok(());
            }
            shared.state = SessionState::Starting;
        }

        // Enumeration failure falls back to the generic constraint rather
        // than failing the whole start.
        let selector = match self.provider.enumerate().await {
            Ok(devices) => select_device(&devices),
            Err(err) => {
                warn!(error = %err, "device enumeration failed, using environment constraint");
                DeviceSelector::Environment
            }
        };

        let device = match self.provider.open(selector).await {
            Ok(device) => device,
            Err(err) => {
                self.shared.lock().await.state = SessionState::Idle;
                return Err(err);
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown = Some(shutdown_tx);

        let epoch = {
            let mut shared = self.shared.lock().await;
            shared.state = SessionState::Active;
            shared.epoch += 1;
            shared.epoch
        };

        tokio::spawn(decode_loop(
            device,
            self.events.clone(),
            shutdown_rx,
            Arc::clone(&self.shared),
            epoch,
        ));

        Ok(())
    }

    /// Release the device and return to Idle. No-op while Idle; never waits
    /// for an in-flight decode. Bumping the epoch here detaches the old
    /// decode task: its teardown write no longer matches and is discarded,
    /// so a quick restart cannot be flipped back to Idle by the stale task.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let mut shared = self.shared.lock().await;
        shared.state = SessionState::Idle;
        shared.epoch += 1;
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        // Teardown without an explicit stop() still signals the decode task,
        // which drops the device handle.
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn decode_loop(
    mut device: Box<dyn CaptureDevice>,
    events: mpsc::Sender<ScanEvent>,
    mut shutdown: oneshot::Receiver<()>,
    shared: Arc<Mutex<Shared>>,
    epoch: u64,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            frame = device.next_frame() => match frame {
                Ok(Some(payload)) => {
                    let _ = events.send(ScanEvent::Payload(payload)).await;
                    break;
                }
                Ok(None) => {
                    // No code in this frame; expected, keep looping.
                    debug!("frame without decodable code");
                }
                Err(err) => {
                    let _ = events.send(ScanEvent::Failed(err)).await;
                    break;
                }
            },
        }
    }

    // Only reset the state if this task still belongs to the current
    // session; a restarted session has already moved the epoch on.
    let mut shared = shared.lock().await;
    if shared.epoch == epoch {
        shared.state = SessionState::Idle;
    }
    // `device` is dropped here, releasing the capture handle.
}
