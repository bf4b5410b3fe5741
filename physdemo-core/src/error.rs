use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the simulation core.
///
/// Nothing here is allowed to escape a single runner: the presentation layer
/// reports `InvalidParameter` back to the user, `NumericInstability` is
/// downgraded to a snapshot warning, and `UnresolvableEvent` halts only the
/// runner that hit it.
#[derive(Debug, Error)]
pub enum SimError {
    /// A user-supplied value lies outside the parameter's physical domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The integrated state is non-finite or beyond the sanity bound.
    #[error("numeric instability: state magnitude {magnitude:e} out of bounds")]
    NumericInstability { magnitude: f64 },

    /// Detected events cannot be composed. Internal invariant violation.
    #[error("unresolvable event: {0}")]
    UnresolvableEvent(String),

    /// The runner stopped after a fatal error and refuses further ticks.
    #[error("runner halted: {0}")]
    Halted(String),

    /// Malformed scenario configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the user can fix by editing a value.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_names_the_parameter() {
        let e = SimError::invalid("mass1", "must be > 0");
        let msg = e.to_string();
        assert!(msg.contains("mass1"));
        assert!(msg.contains("must be > 0"));
        assert!(e.is_user_facing());
    }

    #[test]
    fn unresolvable_event_is_not_user_facing() {
        let e = SimError::UnresolvableEvent("overlap".into());
        assert!(!e.is_user_facing());
    }
}
