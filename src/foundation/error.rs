pub type EyelockResult<T> = Result<T, EyelockError>;

#[derive(thiserror::Error, Debug)]
pub enum EyelockError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("detection error: {0}")]
    Detection(String),

    #[error("alignment error: {0}")]
    Alignment(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EyelockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection(msg.into())
    }

    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            EyelockError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            EyelockError::detection("x")
                .to_string()
                .contains("detection error:")
        );
        assert!(
            EyelockError::alignment("x")
                .to_string()
                .contains("alignment error:")
        );
        assert!(
            EyelockError::encoding("x")
                .to_string()
                .contains("encoding error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = EyelockError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
