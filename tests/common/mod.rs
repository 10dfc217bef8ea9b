#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use gatecheck_api::auth::{generate_jwt, Claims};
use gatecheck_api::handlers::AppState;
use gatecheck_api::scan::{CameraError, CameraProvider, CaptureDevice, DeviceInfo, DeviceSelector};
use gatecheck_api::tickets::{InMemoryTicketRepository, Ticket, TicketStatus};
use gatecheck_api::verify::{AllowAll, VerificationController, VerifierAccess};

// ---- ticket fixtures -------------------------------------------------------

pub fn success_ticket(reference: &str, quantity: i32) -> Ticket {
    Ticket::new(reference, TicketStatus::Success, quantity)
}

pub fn used_ticket(reference: &str, verified_by: &str) -> Ticket {
    let mut ticket = Ticket::new(reference, TicketStatus::Used, 1);
    ticket.verified_at = Some(chrono::Utc::now());
    ticket.verified_by = Some(verified_by.to_string());
    ticket
}

// ---- controller / app wiring ----------------------------------------------

pub fn controller_with(repo: Arc<InMemoryTicketRepository>) -> VerificationController {
    let access = VerifierAccess::new(Arc::new(AllowAll), Duration::from_secs(60));
    VerificationController::new(repo, access)
}

pub fn state_with(repo: Arc<InMemoryTicketRepository>) -> AppState {
    AppState {
        controller: Arc::new(controller_with(repo)),
        db: None,
    }
}

pub fn bearer_token(operator: &str) -> String {
    let claims = Claims::new(operator.to_string(), "verify".to_string(), Uuid::new_v4());
    generate_jwt(claims).expect("failed to sign test token")
}

// ---- scripted camera stack -------------------------------------------------

pub type Frame = Result<Option<String>, CameraError>;

/// Scripted capture stack. Every `open` hands out a device that replays the
/// frame script and then parks forever; handle accounting makes leaks
/// observable.
pub struct ScriptedProvider {
    devices: Vec<DeviceInfo>,
    script: Vec<Frame>,
    fail_enumerate: bool,
    fail_open: Option<CameraError>,
    pub opened: AtomicUsize,
    pub open_handles: Arc<AtomicUsize>,
    pub last_selector: Mutex<Option<DeviceSelector>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Frame>) -> Self {
        Self {
            devices: Vec::new(),
            script,
            fail_enumerate: false,
            fail_open: None,
            opened: AtomicUsize::new(0),
            open_handles: Arc::new(AtomicUsize::new(0)),
            last_selector: Mutex::new(None),
        }
    }

    pub fn with_devices(mut self, devices: Vec<(&str, &str)>) -> Self {
        self.devices = devices
            .into_iter()
            .map(|(id, label)| DeviceInfo {
                id: id.to_string(),
                label: label.to_string(),
            })
            .collect();
        self
    }

    pub fn failing_enumerate(mut self) -> Self {
        self.fail_enumerate = true;
        self
    }

    pub fn failing_open(mut self, err: CameraError) -> Self {
        self.fail_open = Some(err);
        self
    }
}

#[async_trait]
impl CameraProvider for ScriptedProvider {
    async fn enumerate(&self) -> Result<Vec<DeviceInfo>, CameraError> {
        if self.fail_enumerate {
            return Err(CameraError::Device("enumeration unavailable".to_string()));
        }
        Ok(self.devices.clone())
    }

    async fn open(&self, selector: DeviceSelector) -> Result<Box<dyn CaptureDevice>, CameraError> {
        *self.last_selector.lock().await = Some(selector);

        if let Some(err) = &self.fail_open {
            return Err(err.clone());
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedDevice {
            script: self.script.clone().into(),
            handles: Arc::clone(&self.open_handles),
        }))
    }
}

pub struct ScriptedDevice {
    script: VecDeque<Frame>,
    handles: Arc<AtomicUsize>,
}

#[async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn next_frame(&mut self) -> Result<Option<String>, CameraError> {
        match self.script.pop_front() {
            Some(frame) => frame,
            // Script exhausted: behave like a camera pointed at nothing.
            None => std::future::pending().await,
        }
    }
}

impl Drop for ScriptedDevice {
    fn drop(&mut self) {
        self.handles.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Poll until all device handles are released; fails the test after one second.
pub async fn wait_for_release(handles: &Arc<AtomicUsize>) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while handles.load(Ordering::SeqCst) != 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "capture device handle was not released"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
