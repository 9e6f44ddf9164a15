/// Where a gateway call broke down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The request never completed (DNS, connect, timeout, reset).
    Network,
    /// The service answered, but with a failure or an unusable body.
    Service,
}

/// Uniform failure reported by every gateway operation.
///
/// Stages only ever show `message`; `kind` and `status_code` exist for
/// logging and tests.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Network,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn service(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Service,
            message: message.into(),
            status_code,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind == GatewayErrorKind::Network
    }
}
