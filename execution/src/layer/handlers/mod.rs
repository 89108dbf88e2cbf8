use super::*;
use crate::config::Role;
use plinko_types::plinko::{truncate_message, MAX_ERROR_MESSAGE_LENGTH};

pub(super) fn rejected(
    caller: &PublicKey,
    request: Option<RequestId>,
    err: &PlinkoError,
) -> Event {
    Event::PlinkoRejected {
        caller: caller.clone(),
        request,
        // Storage failures never reach here.
        error_code: err.code().unwrap_or_default(),
        message: truncate_message(&err.to_string(), MAX_ERROR_MESSAGE_LENGTH),
    }
}

impl<'a, S: State> Layer<'a, S> {
    fn require(&self, caller: &PublicKey, role: Role) -> Result<(), PlinkoError> {
        if !self.config.has_capability(caller, role) {
            return Err(PlinkoError::Unauthorized(role.name()));
        }
        Ok(())
    }
}

mod admin;
mod funds;
mod plinko;
