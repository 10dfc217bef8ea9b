use async_trait::async_trait;
use thiserror::Error;

/// Classified capture-device failures. Every variant leaves the session
/// manager back in Idle, so retrying `start()` is always safe.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No capture device available")]
    NoDevice,

    #[error("Capture device already in use")]
    DeviceInUse,

    #[error("Capture device failure: {0}")]
    Device(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    ById(String),
    /// Generic environment-facing constraint, used when no labelled rear
    /// camera can be identified or when enumeration itself fails.
    Environment,
}

/// An open capture device running its decode loop. `next_frame` resolves to
/// `Some(payload)` when a frame decodes to a code and `None` for frames
/// without one; per-frame misses are expected and never errors. Dropping the
/// device releases the underlying handle.
#[async_trait]
pub trait CaptureDevice: Send {
    async fn next_frame(&mut self) -> Result<Option<String>, CameraError>;
}

/// Platform capture stack: enumerate devices, open one. Production wires the
/// real hardware here; tests plug in scripted fakes.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    async fn enumerate(&self) -> Result<Vec<DeviceInfo>, CameraError>;
    async fn open(&self, selector: DeviceSelector) -> Result<Box<dyn CaptureDevice>, CameraError>;
}

const REAR_FACING_HINTS: [&str; 3] = ["back", "rear", "environment"];

/// Prefer a rear-facing camera by label heuristic; otherwise fall back to
/// the generic environment-facing constraint.
pub fn select_device(devices: &[DeviceInfo]) -> DeviceSelector {
    for device in devices {
        let label = device.label.to_lowercase();
        if REAR_FACING_HINTS.iter().any(|hint| label.contains(hint)) {
            return DeviceSelector::ById(device.id.clone());
        }
    }
    DeviceSelector::Environment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: &str, label: &str) -> DeviceInfo {
        DeviceInfo {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn prefers_rear_facing_labels() {
        let devices = vec![
            info("0", "FaceTime HD Camera"),
            info("1", "Back Ultra Wide Camera"),
        ];
        assert_eq!(select_device(&devices), DeviceSelector::ById("1".into()));

        let devices = vec![info("0", "camera2 0, facing ENVIRONMENT")];
        assert_eq!(select_device(&devices), DeviceSelector::ById("0".into()));
    }

    #[test]
    fn falls_back_to_environment_constraint() {
        let devices = vec![info("0", "FaceTime HD Camera"), info("1", "USB Webcam")];
        assert_eq!(select_device(&devices), DeviceSelector::Environment);
        assert_eq!(select_device(&[]), DeviceSelector::Environment);
    }
}
