/// Convenience result type used across Kawara.
pub type KawaraResult<T> = Result<T, KawaraError>;

/// Top-level error taxonomy used by evaluator APIs.
#[derive(thiserror::Error, Debug)]
pub enum KawaraError {
    /// Invalid user-provided show data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed keyframe tables (length mismatch, non-monotonic inputs).
    #[error("invalid keyframe spec: {0}")]
    InvalidKeyframeSpec(String),

    /// Errors while assembling the scene for a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KawaraError {
    /// Build a [`KawaraError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KawaraError::InvalidKeyframeSpec`] value.
    pub fn keyframe_spec(msg: impl Into<String>) -> Self {
        Self::InvalidKeyframeSpec(msg.into())
    }

    /// Build a [`KawaraError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`KawaraError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            KawaraError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            KawaraError::keyframe_spec("x")
                .to_string()
                .contains("invalid keyframe spec:")
        );
        assert!(
            KawaraError::evaluation("x")
                .to_string()
                .contains("evaluation error:")
        );
        assert!(
            KawaraError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = KawaraError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
