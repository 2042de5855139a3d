use serde::{Deserialize, Serialize};
use std::fmt;

/// RFC 6749 style error shared by every crate in the workspace.
///
/// Backend failures are reported as `server_error` so the protocol engine can
/// tell them apart from a lookup that simply found nothing (`Ok(None)`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OAuth2Error {
    pub error: String,
    pub error_description: Option<String>,
    pub error_uri: Option<String>,
}

impl OAuth2Error {
    pub fn new(error: &str, description: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            error_description: description.map(|s| s.to_string()),
            error_uri: None,
        }
    }

    pub fn server_error(description: &str) -> Self {
        Self::new("server_error", Some(description))
    }

    pub fn invalid_request(description: &str) -> Self {
        Self::new("invalid_request", Some(description))
    }

    /// True when the error came from the backing store rather than from the request.
    pub fn is_server_error(&self) -> bool {
        self.error == "server_error"
    }

    pub fn is_duplicate_key(&self) -> bool {
        self.error == "invalid_request" && self.error_description.as_deref() == Some("duplicate key")
    }
}

impl fmt::Display for OAuth2Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuth2Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_description() {
        let err = OAuth2Error::server_error("connection refused");
        assert_eq!(err.to_string(), "server_error: connection refused");
        assert!(err.is_server_error());
    }

    #[test]
    fn duplicate_key_is_detected() {
        assert!(OAuth2Error::invalid_request("duplicate key").is_duplicate_key());
        assert!(!OAuth2Error::invalid_request("missing client_id").is_duplicate_key());
    }
}
