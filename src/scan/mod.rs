pub mod camera;
pub mod device;
pub mod extractor;

pub use camera::{CameraSession, ScanEvent, SessionState};
pub use device::{CameraError, CameraProvider, CaptureDevice, DeviceInfo, DeviceSelector};
pub use extractor::{extract_reference, MalformedPayload};
