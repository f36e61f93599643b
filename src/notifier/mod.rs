pub mod console;
pub mod twilio;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::ListingRecord;

pub use console::ConsoleNotifier;
pub use twilio::{TwilioCredentials, TwilioNotifier};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("message request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("message rejected by provider ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a text message
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, body: &str) -> Result<(), NotifyError>;
}

/// Numbered list of listing URLs, or `None` when there is nothing to announce
pub fn compose_message(city: &str, records: &[ListingRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let mut body = format!("New listings in {city}:\n\n");
    for (i, record) in records.iter().enumerate() {
        body.push_str(&format!("{}. {} \n", i + 1, record.url));
    }
    Some(body)
}

/// Send one message for `records`. Returns whether anything was sent.
pub async fn notify<N>(notifier: &N, city: &str, records: &[ListingRecord]) -> Result<bool, NotifyError>
where
    N: Notifier + ?Sized,
{
    let Some(body) = compose_message(city, records) else {
        info!("No new listings in {}", city);
        return Ok(false);
    };

    info!("Texting {} listings for {}", records.len(), city);
    notifier.send(&body).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn send(&self, body: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    #[test]
    fn message_lists_urls_in_order() {
        let records = vec![
            ListingRecord::new(1, "https://x.test/a-1.html", 6000),
            ListingRecord::new(2, "https://x.test/b-2.html", 7000),
        ];

        let body = compose_message("valinhos-sp", &records).unwrap();

        assert_eq!(
            body,
            "New listings in valinhos-sp:\n\n1. https://x.test/a-1.html \n2. https://x.test/b-2.html \n"
        );
    }

    #[test]
    fn empty_batch_has_no_message() {
        assert_eq!(compose_message("x", &[]), None);
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let recorder = Recorder::default();

        let sent = notify(&recorder, "x", &[]).await.unwrap();

        assert!(!sent);
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_is_sent_as_one_message() {
        let recorder = Recorder::default();
        let records = vec![
            ListingRecord::new(1, "https://x.test/a-1.html", 6000),
            ListingRecord::new(2, "https://x.test/b-2.html", 7000),
        ];

        let sent = notify(&recorder, "x", &records).await.unwrap();

        assert!(sent);
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }
}
