// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed `Bus` implementation. The exchange is modeled as a
//! Redis pub/sub channel prefix: `publish(routing_key, ..)` issues a
//! `PUBLISH` to `{exchange}.{routing_key}`, and `subscribe(queue_name)`
//! subscribes to the same channel the matching source publishes on
//! (Redis pub/sub has no concept of a durable queue, so `queue_name`
//! doubles as the subscription channel name here).

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::warn;

use crate::{Bus, BrokerUrl, BusError, Exchange, Message, SUBSCRIBE_CHANNEL_CAPACITY};

pub struct RedisBus {
    client: redis::Client,
    manager: ConnectionManager,
    exchange: Exchange,
}

impl RedisBus {
    pub async fn connect(url: &BrokerUrl, exchange: Exchange) -> Result<Self, BusError> {
        let client = redis::Client::open(url.as_str())?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { client, manager, exchange })
    }

    fn channel(&self, routing_key: &str) -> String {
        format!("{}.{routing_key}", self.exchange.name())
    }
}

#[async_trait]
impl Bus for RedisBus {
    async fn publish(&self, routing_key: &str, message: Message) -> Result<(), BusError> {
        let mut manager = self.manager.clone();
        let channel = self.channel(routing_key);
        let _: () = manager.publish(channel, message.payload).await?;
        Ok(())
    }

    async fn subscribe(&self, queue_name: &str) -> Result<mpsc::Receiver<Message>, BusError> {
        let channel = self.channel(queue_name);
        let conn = self.client.get_async_connection().await?;
        let mut pubsub = conn.into_pubsub();
        pubsub.subscribe(&channel).await?;

        let (tx, rx) = mpsc::channel(SUBSCRIBE_CHANNEL_CAPACITY);
        let routing_key = queue_name.to_string();
        tokio::spawn(async move {
            use futures_util::StreamExt;
            let mut stream = pubsub.into_on_message();
            while let Some(msg) = stream.next().await {
                let payload: Vec<u8> = match msg.get_payload() {
                    Ok(p) => p,
                    Err(err) => {
                        warn!(%err, "dropping malformed bus payload");
                        continue;
                    }
                };
                if tx.send(Message::new(routing_key.clone(), payload)).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn ping(&self) -> Result<(), BusError> {
        let mut manager = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut manager).await?;
        Ok(())
    }

    async fn flush_db(&self) -> Result<(), BusError> {
        let mut manager = self.manager.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut manager).await?;
        Ok(())
    }
}
