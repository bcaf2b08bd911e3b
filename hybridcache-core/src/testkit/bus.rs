//! # In-Process Fake InvalidationBus
//!
//! Fan-out pub/sub over `tokio::sync::mpsc`, standing in for the real
//! transport `spec.md` §1 places out of scope. Real delivery, real
//! concurrency, no mocked coordinator behavior — same rationale as
//! `InMemoryStore`.

use std::sync::Mutex;

use async_trait::async_trait;
use hybridcache_common::{CacheError, CacheResult, InvalidationBus, Subscription};
use tokio::sync::mpsc;

struct Topic {
    senders: Vec<mpsc::UnboundedSender<Vec<u8>>>,
}

/// In-process invalidation bus: every subscriber of a topic receives every
/// message published to it, including (before self-filtering) its own.
pub struct InMemoryBus {
    topics: Mutex<std::collections::HashMap<String, Topic>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        InMemoryBus { topics: Mutex::new(std::collections::HashMap::new()) }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvalidationBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> CacheResult<()> {
        let mut topics = self.topics.lock().unwrap();
        if let Some(t) = topics.get_mut(topic) {
            t.senders.retain(|tx| tx.send(payload.clone()).is_ok());
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> CacheResult<Box<dyn Subscription>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut topics = self.topics.lock().unwrap();
        topics.entry(topic.to_string()).or_insert_with(|| Topic { senders: Vec::new() }).senders.push(tx);
        Ok(Box::new(InMemorySubscription { rx }))
    }
}

struct InMemorySubscription {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl Subscription for InMemorySubscription {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }
}

/// A bus whose `publish` always fails, for exercising `spec.md` §7's "Bus
/// publish failure is logged and swallowed" failure path.
pub struct FailingBus;

#[async_trait]
impl InvalidationBus for FailingBus {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> CacheResult<()> {
        Err(CacheError::BusUnavailable("fake bus always fails".to_string()))
    }

    async fn subscribe(&self, _topic: &str) -> CacheResult<Box<dyn Subscription>> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(Box::new(InMemorySubscription { rx }))
    }
}
