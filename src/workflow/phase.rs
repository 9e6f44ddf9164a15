use crate::gateway::GatewayError;

/// Lifecycle of one remote fetch owned by a stage.
///
/// `Idle -> Loading -> (Ready | Failed)`; `Ready` and `Failed` may be
/// re-triggered, `Loading` may not.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StagePhase<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> StagePhase<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Enter `Loading`. Returns false, leaving the phase untouched, when a
    /// call is already in flight.
    pub(crate) fn begin(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        *self = Self::Loading;
        true
    }

    pub(crate) fn settle(&mut self, result: Result<T, GatewayError>) {
        *self = match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err.message),
        };
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::Idle;
    }
}
