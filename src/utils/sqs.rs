//! Minimal SQS client: long-poll receive and delete.

use anyhow::{Context as _, Result};
use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::{Credentials, Region};

use crate::config::Queue as QueueConfig;
use crate::modules::outages::{OutageQueue, QueueMessage};

pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
    wait_time_seconds: i32,
}

impl SqsQueue {
    pub async fn connect(config: &QueueConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "outage-bot",
        );
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        Self {
            client: aws_sdk_sqs::Client::new(&sdk_config),
            queue_url: config.url.clone(),
            wait_time_seconds: config.wait_time_seconds,
        }
    }
}

impl OutageQueue for SqsQueue {
    async fn receive(&self) -> Result<Vec<QueueMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(self.wait_time_seconds)
            .send()
            .await
            .context("ReceiveMessage failed")?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| {
                let Some(receipt_handle) = m.receipt_handle else {
                    log::warn!("Message {:?} has no receipt handle", m.message_id);
                    return None;
                };
                Some(QueueMessage {
                    body: m.body.unwrap_or_default(),
                    receipt_handle,
                })
            })
            .collect();
        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .context("DeleteMessage failed")?;
        Ok(())
    }
}
