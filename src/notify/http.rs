//! HTTP switch notifier.

use std::time::Duration;

use reqwest::Client;

use crate::notify::{NotifyError, SwitchNotifier};

/// POSTs to `{base_url}/switch/{receiver}`.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    base_url: String,
}

impl HttpNotifier {
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn switch_url(&self, receiver: &str) -> String {
        format!("{}/switch/{}", self.base_url, receiver)
    }
}

impl SwitchNotifier for HttpNotifier {
    async fn notify(&self, receiver: &str) -> Result<(), NotifyError> {
        let response = self.client.post(self.switch_url(receiver)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_url_strips_trailing_slash() {
        let n = HttpNotifier::new("http://gnuradio:8080/", Duration::from_secs(2)).unwrap();
        assert_eq!(n.switch_url("FM2"), "http://gnuradio:8080/switch/FM2");
    }
}
