use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::tickets::RepositoryError;

/// External role lookup. Who may verify tickets is owned by the auth
/// backend; this crate only asks.
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn can_verify(&self, operator: &str) -> Result<bool, RepositoryError>;
}

/// Role source for deployments where gate access is decided entirely at
/// token issuance: holding a valid operator token is the grant.
pub struct AllowAll;

#[async_trait]
impl RoleSource for AllowAll {
    async fn can_verify(&self, _operator: &str) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}

struct CachedGrant {
    allowed: bool,
    fetched_at: Instant,
}

/// Injected authorization capability with an explicit expiry policy. Each
/// controller owns its own instance, so grants never leak across sessions
/// or tests, and invalidation is a direct call instead of waiting out a
/// process-wide cache.
pub struct VerifierAccess {
    source: Arc<dyn RoleSource>,
    ttl: Duration,
    cache: Mutex<HashMap<String, CachedGrant>>,
}

impl VerifierAccess {
    pub fn new(source: Arc<dyn RoleSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn can_verify(&self, operator: &str) -> Result<bool, RepositoryError> {
        {
            let cache = self.cache.lock().await;
            if let Some(grant) = cache.get(operator) {
                if grant.fetched_at.elapsed() < self.ttl {
                    return Ok(grant.allowed);
                }
            }
        }

        let allowed = self.source.can_verify(operator).await?;
        self.cache.lock().await.insert(
            operator.to_string(),
            CachedGrant {
                allowed,
                fetched_at: Instant::now(),
            },
        );
        Ok(allowed)
    }

    /// Drop a cached grant so the next check hits the role source again.
    pub async fn invalidate(&self, operator: &str) {
        self.cache.lock().await.remove(operator);
    }
}
