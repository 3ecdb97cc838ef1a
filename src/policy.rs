//! Session policy enforcement.

use crate::{
    context::Clock,
    error::{AuthorizationError, SessionError},
    types::{decode_calls, SessionGrant},
};
use std::sync::Arc;
use tracing::debug;

/// The gate every session-key signature passes before any hashing or
/// signing happens.
///
/// Checks run in a fixed order: revocation, validity window, then the
/// destination whitelist against every call decoded from the operation's
/// calldata. The first failure wins.
#[derive(Clone, Debug)]
pub struct SessionPolicyGuard {
    clock: Arc<dyn Clock>,
}

impl SessionPolicyGuard {
    /// A guard reading time from the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Checks the grant against the operation's calldata at the current
    /// time.
    pub fn authorize(&self, call_data: &[u8], grant: &SessionGrant) -> Result<(), AuthorizationError> {
        Self::check_at(call_data, grant, self.clock.now())
    }

    /// Pure form of [`Self::authorize`] with an explicit timestamp.
    pub fn check_at(
        call_data: &[u8],
        grant: &SessionGrant,
        now: u64,
    ) -> Result<(), AuthorizationError> {
        if grant.revoked {
            debug!(session_key = %grant.session_key, "rejecting revoked session");
            return Err(SessionError::Revoked(grant.session_key).into());
        }

        if grant.valid_after != 0 && now < grant.valid_after {
            return Err(SessionError::NotYetValid {
                session_key: grant.session_key,
                valid_after: grant.valid_after,
                now,
            }
            .into());
        }

        if grant.valid_until != 0 && now > grant.valid_until {
            return Err(SessionError::Expired {
                session_key: grant.session_key,
                valid_until: grant.valid_until,
                now,
            }
            .into());
        }

        for call in decode_calls(call_data)? {
            if !grant.is_whitelisted(&call.to) {
                debug!(
                    session_key = %grant.session_key,
                    destination = %call.to,
                    "rejecting non-whitelisted destination"
                );
                return Err(SessionError::NotWhitelisted(call.to).into());
            }
        }

        Ok(())
    }
}
