use super::requests::Mutation;

/// Outbound write path to the authoritative remote store.
///
/// The store stays authoritative: a rejected mutation is rolled back locally.
pub trait MutationGateway: Send + Sync {
    fn send(&self, mutation: &Mutation) -> Result<(), GatewayError>;
}

/// Error enumeration for remote write failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("remote store rejected {0}")]
    Rejected(String),
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}
