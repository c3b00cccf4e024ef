use cadence_core::{CadenceError, SongId};
use thiserror::Error;

/// Errors that can occur during reconciliation
#[derive(Error, Debug)]
pub enum SyncError {
    /// Directory enumeration failed; nothing was changed
    #[error("Cannot enumerate {dir}: {source}")]
    Enumeration {
        dir: String,
        #[source]
        source: CadenceError,
    },

    #[error("Song not found: {0}")]
    SongNotFound(SongId),

    #[error("Extraction pool failed: {0}")]
    Pool(String),

    #[error(transparent)]
    Core(#[from] CadenceError),
}

impl SyncError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::Enumeration {
                source: CadenceError::PermissionDenied(_),
                ..
            } | Self::Core(CadenceError::PermissionDenied(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_keeps_the_listing_error_kind() {
        let denied = SyncError::Enumeration {
            dir: "/music".into(),
            source: CadenceError::PermissionDenied("/music".into()),
        };
        assert!(denied.is_permission_denied());

        let io = SyncError::Enumeration {
            dir: "/music".into(),
            source: CadenceError::Other("walk task failed".into()),
        };
        assert!(!io.is_permission_denied());
        assert!(io.to_string().contains("walk task failed"));
    }
}
