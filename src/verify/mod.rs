pub mod access;
pub mod controller;
pub mod outcome;

pub use access::{AllowAll, RoleSource, VerifierAccess};
pub use controller::VerificationController;
pub use outcome::{OutcomePresenter, ScanOutcome};
