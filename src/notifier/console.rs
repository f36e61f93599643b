use async_trait::async_trait;
use tracing::info;

use super::{Notifier, NotifyError};

/// Logs messages instead of sending them; used when no SMS account is configured
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, body: &str) -> Result<(), NotifyError> {
        info!("Message (not sent, no SMS account configured):\n{}", body);
        Ok(())
    }
}
