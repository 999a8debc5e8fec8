use async_trait::async_trait;

#[async_trait]
pub trait WorkspaceTrustPort: Send + Sync {
    fn is_trusted(&self) -> bool;

    /// Asks the user to trust the workspace; returns the resulting trust.
    async fn request_trust(&self, message: &str) -> bool;
}
