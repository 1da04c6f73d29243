//! Error types for the NFS Operator

use thiserror::Error;

/// Result type alias using the operator's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Operator error types
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A managed resource was asked to reconcile without an owning Nfs
    #[error("the resource {0} does not have an owner")]
    MissingOwner(String),

    /// The owner reference could not be derived from the Nfs instance
    #[error("cannot set owner reference on {resource}: {reason}")]
    OwnerReference { resource: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True when the API server answered 404 for the requested object
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Kube(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// True when a create was rejected because the name is already taken
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Error::Kube(kube::Error::Api(resp)) if resp.code == 409 && resp.reason == "AlreadyExists"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> Error {
        Error::Kube(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} error", reason),
            reason: reason.to_string(),
            code,
        }))
    }

    #[test]
    fn test_not_found_classification() {
        assert!(api_error(404, "NotFound").is_not_found());
        assert!(!api_error(500, "InternalError").is_not_found());
        assert!(!Error::validation("bad").is_not_found());
    }

    #[test]
    fn test_already_exists_classification() {
        assert!(api_error(409, "AlreadyExists").is_already_exists());
        // 409 is also used for optimistic concurrency conflicts
        assert!(!api_error(409, "Conflict").is_already_exists());
        assert!(!api_error(404, "NotFound").is_already_exists());
    }

    #[test]
    fn test_owner_reference_message_names_resource() {
        let err = Error::OwnerReference {
            resource: "Service storage/nfs-provisioner".to_string(),
            reason: "owner has no name or uid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot set owner reference on Service storage/nfs-provisioner: owner has no name or uid"
        );
    }
}
