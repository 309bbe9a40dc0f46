//! Push token registry port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Subject};
use crate::domain::notification::PushToken;

#[async_trait]
pub trait PushTokenRepository: Send + Sync {
    /// Inserts or replaces by token value. Last writer wins.
    async fn upsert(&self, token: &PushToken) -> Result<(), DomainError>;

    /// Enabled tokens owned by the subject.
    async fn find_enabled(&self, owner: &Subject) -> Result<Vec<PushToken>, DomainError>;

    /// Marks a token disabled. Unknown tokens are not an error.
    async fn disable(&self, token: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_token_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PushTokenRepository) {}
    }
}
