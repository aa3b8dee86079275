// ==========================================
// 刀具磨损追踪系统 - 实时事件广播
// ==========================================
// 订阅者注册表: Mutex<HashMap<id, Sender>>，唯一修改点
// 发布: 快照发送端后 try_send，不阻塞
// 通道满或已关闭的订阅者被移除；Subscription 析构时自动注销
// ==========================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::engine::{LiveEvent, LiveEventPublisher};

pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

type Registry = Mutex<HashMap<u64, mpsc::Sender<LiveEvent>>>;

// ==========================================
// EventBroadcaster
// ==========================================
#[derive(Default)]
pub struct EventBroadcaster {
    subscribers: Arc<Registry>,
    next_id: AtomicU64,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册订阅者
    pub fn subscribe(&self, buffer: usize) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(buffer.max(1));
        match self.subscribers.lock() {
            Ok(mut map) => {
                map.insert(id, tx);
            }
            Err(e) => tracing::error!("订阅者注册表锁已中毒: {}", e),
        }
        tracing::debug!(subscriber = id, "SSE 订阅者已连接");
        Subscription {
            id,
            rx,
            registry: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn remove(&self, ids: &[u64]) {
        if ids.is_empty() {
            return;
        }
        if let Ok(mut map) = self.subscribers.lock() {
            for id in ids {
                map.remove(id);
            }
        }
    }
}

impl LiveEventPublisher for EventBroadcaster {
    fn publish(&self, event: LiveEvent) -> usize {
        let snapshot: Vec<(u64, mpsc::Sender<LiveEvent>)> = match self.subscribers.lock() {
            Ok(map) => map.iter().map(|(id, tx)| (*id, tx.clone())).collect(),
            Err(e) => {
                tracing::error!("订阅者注册表锁已中毒: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for (id, tx) in snapshot {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = id, "SSE 订阅者积压，已断开");
                    dropped.push(id);
                }
                Err(TrySendError::Closed(_)) => dropped.push(id),
            }
        }
        self.remove(&dropped);

        tracing::debug!(event = %event.kind, delivered, "实时事件已广播");
        delivered
    }
}

// ==========================================
// Subscription - 单个订阅
// ==========================================
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<LiveEvent>,
    registry: Arc<Registry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn recv(&mut self) -> Option<LiveEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Ok(mut map) = self.registry.lock() {
            map.remove(&self.id);
        }
        tracing::debug!(subscriber = self.id, "SSE 订阅者已断开");
    }
}
