mod admit;
mod stats;
mod verify;

pub use admit::admit_post;
pub use stats::stats_get;
pub use verify::verify_post;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::OperatorContext;

/// Gate every scan endpoint on the injected access capability. The token
/// proves identity; the capability decides whether this operator may verify.
pub(crate) async fn require_verifier(
    state: &AppState,
    operator: &OperatorContext,
) -> Result<(), ApiError> {
    let allowed = state.controller.authorize(&operator.operator).await?;
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Operator is not allowed to verify tickets",
        ))
    }
}
