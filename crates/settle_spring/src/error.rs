use thiserror::Error;

/// Errors reported synchronously by [`SpringSettler`](crate::SpringSettler).
///
/// Both kinds are caller errors. The settler never retries or corrects them,
/// and a failed call leaves every channel exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettleError {
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("unknown channel {key}")]
    UnknownChannel { key: String },
}

impl SettleError {
    pub(crate) fn invalid(name: &'static str, value: f32, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    pub(crate) fn unknown<K: std::fmt::Debug>(key: &K) -> Self {
        Self::UnknownChannel {
            key: format!("{key:?}"),
        }
    }
}

/// Reject NaN and the infinities.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<f32, SettleError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SettleError::invalid(name, value, "must be finite"))
    }
}

/// Reject anything that is not a strictly positive finite number.
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<f32, SettleError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SettleError::invalid(
            name,
            value,
            "must be a strictly positive finite number",
        ))
    }
}
