//! # API Module
//!
//! Fault-isolated entry points addressing images by `(idx_image, idx_chain)`.
//!
//! No function in this module returns an error or lets a panic escape. Parameter
//! changes are reported as `info` events, unsupported requests as `warn` events and
//! internal faults as `error` events; every event carries the `idx_image` and
//! `idx_chain` fields of the request. A failing query returns a neutral default.
//!
//! An index of `None` addresses the active chain or image.

pub mod hamiltonian;

use crate::engine::{EngineError, MutationOutcome, SpinImage, State};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};

/// Formats an optional index as the number or as `active`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexLabel(pub Option<usize>);

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(idx) => write!(f, "{}", idx),
            None => f.write_str("active"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

/// Runs `call` against the resolved image, converting errors and panics into logged
/// faults and `default`.
pub(crate) fn guarded<T, F>(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
    default: T,
    call: F,
) -> T
where
    F: FnOnce(&SpinImage) -> Result<T, EngineError>,
{
    let image_label = IndexLabel(idx_image);
    let chain_label = IndexLabel(idx_chain);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let image = state.resolve(idx_image, idx_chain)?;
        call(image.as_ref())
    }));
    match result {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            error!(
                idx_image = %image_label,
                idx_chain = %chain_label,
                "{}",
                e
            );
            default
        }
        Err(payload) => {
            error!(
                idx_image = %image_label,
                idx_chain = %chain_label,
                "Caught panic: {}",
                panic_message(payload.as_ref())
            );
            default
        }
    }
}

/// Logs the outcome of a mutation at the level matching its kind.
pub(crate) fn report(outcome: &MutationOutcome, idx_image: Option<usize>, idx_chain: Option<usize>) {
    let image_label = IndexLabel(idx_image);
    let chain_label = IndexLabel(idx_chain);
    match outcome {
        MutationOutcome::Applied { notice } => {
            info!(idx_image = %image_label, idx_chain = %chain_label, "{}", notice)
        }
        MutationOutcome::Unsupported { notice } => {
            warn!(idx_image = %image_label, idx_chain = %chain_label, "{}", notice)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_label_names_active_index() {
        assert_eq!(IndexLabel(Some(3)).to_string(), "3");
        assert_eq!(IndexLabel(None).to_string(), "active");
    }

    #[test]
    fn panic_message_extracts_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
