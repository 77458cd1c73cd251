//! Buffer management for transport implementations
//!
//! Pooled, reusable byte buffers for transports that do their own framing
//! (stdio's line-delimited reader, the HTTP adapter's body buffering). Buffers
//! are checked out of a fixed-size pool and returned automatically on drop,
//! which keeps steady-state throughput from re-allocating on every message.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;

use crate::protocol::transport::TransportError;

/// Configuration for a [`BufferManager`].
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Maximum size for a single message (default: 10MB).
    pub max_message_size: usize,
    /// Capacity for read buffers (default: 64KB).
    pub read_buffer_capacity: usize,
    /// Capacity for write buffers (default: 64KB).
    pub write_buffer_capacity: usize,
    /// Maximum number of buffers to pool per direction (default: 100).
    pub buffer_pool_size: usize,
    /// Timeout for acquiring a buffer from the pool (default: 30s).
    pub pool_timeout: Duration,
    /// Backpressure threshold in bytes (default: 1MB).
    pub backpressure_threshold: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_message_size: 10 * 1024 * 1024,
            read_buffer_capacity: 64 * 1024,
            write_buffer_capacity: 64 * 1024,
            buffer_pool_size: 100,
            pool_timeout: Duration::from_secs(30),
            backpressure_threshold: 1024 * 1024,
        }
    }
}

/// Pooled read/write buffer manager with backpressure control.
#[derive(Debug)]
pub struct BufferManager {
    config: BufferConfig,
    read_buffer_pool: BufferPool,
    write_buffer_pool: BufferPool,
    backpressure_semaphore: Arc<Semaphore>,
    metrics: BufferMetrics,
}

impl BufferManager {
    pub fn new(config: BufferConfig) -> Self {
        let read_pool = BufferPool::new(config.read_buffer_capacity, config.buffer_pool_size);
        let write_pool = BufferPool::new(config.write_buffer_capacity, config.buffer_pool_size);

        let backpressure_permits =
            config.backpressure_threshold / config.read_buffer_capacity.max(1);
        let backpressure_semaphore = Arc::new(Semaphore::new(backpressure_permits.max(1)));

        Self {
            config,
            read_buffer_pool: read_pool,
            write_buffer_pool: write_pool,
            backpressure_semaphore,
            metrics: BufferMetrics::new(),
        }
    }

    pub async fn acquire_read_buffer(&self) -> Result<PooledBuffer, TransportError> {
        self.metrics.record_buffer_acquisition_attempt();
        let _permit = timeout(
            self.config.pool_timeout,
            self.backpressure_semaphore.acquire(),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            message: format!("buffer pool timeout after {:?}", self.config.pool_timeout),
        })?
        .map_err(|_| TransportError::Connection {
            message: "buffer pool closed".to_string(),
        })?;

        let buffer = timeout(self.config.pool_timeout, self.read_buffer_pool.acquire())
            .await
            .map_err(|_| TransportError::Timeout {
                message: format!("buffer pool timeout after {:?}", self.config.pool_timeout),
            })?;

        self.metrics.record_buffer_acquisition_success();
        Ok(buffer)
    }

    pub async fn acquire_write_buffer(&self) -> Result<PooledBuffer, TransportError> {
        self.metrics.record_buffer_acquisition_attempt();
        let _permit = timeout(
            self.config.pool_timeout,
            self.backpressure_semaphore.acquire(),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            message: format!("buffer pool timeout after {:?}", self.config.pool_timeout),
        })?
        .map_err(|_| TransportError::Connection {
            message: "buffer pool closed".to_string(),
        })?;

        let buffer = timeout(self.config.pool_timeout, self.write_buffer_pool.acquire())
            .await
            .map_err(|_| TransportError::Timeout {
                message: format!("buffer pool timeout after {:?}", self.config.pool_timeout),
            })?;

        self.metrics.record_buffer_acquisition_success();
        Ok(buffer)
    }

    /// Validate a candidate message length against `max_message_size` (§4.2
    /// parse-error boundary: oversized messages never reach the JSON parser).
    pub fn validate_message_size(&self, size: usize) -> Result<(), TransportError> {
        if size > self.config.max_message_size {
            self.metrics.record_size_violation();
            return Err(TransportError::Protocol {
                message: format!(
                    "message size {} exceeds maximum {}",
                    size, self.config.max_message_size
                ),
            });
        }
        Ok(())
    }

    pub fn metrics(&self) -> BufferMetrics {
        self.metrics.clone()
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}

/// Reusable buffer pool backed by an unbounded mpsc channel acting as a stack.
#[derive(Debug)]
struct BufferPool {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
    buffer_capacity: usize,
    pool_metrics: PoolMetrics,
}

impl BufferPool {
    fn new(buffer_capacity: usize, pool_size: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        for _ in 0..pool_size {
            let _ = sender.send(Vec::with_capacity(buffer_capacity));
        }

        Self {
            sender,
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            buffer_capacity,
            pool_metrics: PoolMetrics::new(),
        }
    }

    async fn acquire(&self) -> PooledBuffer {
        let mut receiver = self.receiver.lock().await;
        if let Ok(mut buffer) = receiver.try_recv() {
            buffer.clear();
            buffer.reserve(self.buffer_capacity);
            self.pool_metrics.record_hit();
            PooledBuffer {
                buffer,
                return_sender: Some(self.sender.clone()),
                pool_metrics: self.pool_metrics.clone(),
            }
        } else {
            self.pool_metrics.record_miss();
            PooledBuffer {
                buffer: Vec::with_capacity(self.buffer_capacity),
                return_sender: Some(self.sender.clone()),
                pool_metrics: self.pool_metrics.clone(),
            }
        }
    }
}

/// A buffer checked out of a [`BufferManager`] pool. Returns itself to the
/// pool on drop instead of being deallocated.
#[derive(Debug)]
pub struct PooledBuffer {
    buffer: Vec<u8>,
    return_sender: Option<mpsc::UnboundedSender<Vec<u8>>>,
    pool_metrics: PoolMetrics,
}

impl PooledBuffer {
    pub fn as_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    pub fn as_ref(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(sender) = self.return_sender.take() {
            if sender.send(std::mem::take(&mut self.buffer)).is_ok() {
                self.pool_metrics.record_return();
            }
        }
    }
}

/// Pool-wide hit/miss/return counters, exposed for diagnostics.
#[derive(Debug, Clone)]
pub struct BufferMetrics {
    acquisitions_attempted: Arc<AtomicUsize>,
    acquisitions_successful: Arc<AtomicUsize>,
    size_violations: Arc<AtomicUsize>,
    total_bytes_processed: Arc<AtomicUsize>,
}

impl BufferMetrics {
    fn new() -> Self {
        Self {
            acquisitions_attempted: Arc::new(AtomicUsize::new(0)),
            acquisitions_successful: Arc::new(AtomicUsize::new(0)),
            size_violations: Arc::new(AtomicUsize::new(0)),
            total_bytes_processed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record_buffer_acquisition_attempt(&self) {
        self.acquisitions_attempted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_buffer_acquisition_success(&self) {
        self.acquisitions_successful
            .fetch_add(1, Ordering::Relaxed);
    }

    fn record_size_violation(&self) {
        self.size_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes_processed(&self, bytes: usize) {
        self.total_bytes_processed
            .fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn acquisition_success_rate(&self) -> f64 {
        let attempted = self.acquisitions_attempted.load(Ordering::Relaxed);
        let successful = self.acquisitions_successful.load(Ordering::Relaxed);
        if attempted == 0 {
            0.0
        } else {
            successful as f64 / attempted as f64
        }
    }

    pub fn total_bytes_processed(&self) -> usize {
        self.total_bytes_processed.load(Ordering::Relaxed)
    }

    pub fn size_violations(&self) -> usize {
        self.size_violations.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
struct PoolMetrics {
    hits: Arc<AtomicUsize>,
    misses: Arc<AtomicUsize>,
    returns: Arc<AtomicUsize>,
}

impl PoolMetrics {
    fn new() -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
            returns: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_return(&self) {
        self.returns.fetch_add(1, Ordering::Relaxed);
    }

    #[allow(dead_code)]
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffer_manager_creation() {
        let config = BufferConfig::default();
        let manager = BufferManager::new(config.clone());
        assert_eq!(manager.config().max_message_size, config.max_message_size);
    }

    #[tokio::test]
    async fn buffer_acquisition_and_return() {
        let manager = BufferManager::new(BufferConfig::default());
        let buffer = manager.acquire_read_buffer().await.unwrap();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.capacity() >= 64 * 1024);
        drop(buffer);

        let buffer2 = manager.acquire_read_buffer().await.unwrap();
        assert_eq!(buffer2.len(), 0);
    }

    #[tokio::test]
    async fn message_size_validation() {
        let manager = BufferManager::new(BufferConfig {
            max_message_size: 1024,
            ..Default::default()
        });
        assert!(manager.validate_message_size(1024).is_ok());
        let err = manager.validate_message_size(2048).unwrap_err();
        assert!(matches!(err, TransportError::Protocol { .. }));
    }

    #[tokio::test]
    async fn pooled_buffer_operations() {
        let manager = BufferManager::new(BufferConfig::default());
        let mut buffer = manager.acquire_read_buffer().await.unwrap();
        assert!(buffer.is_empty());
        buffer.extend_from_slice(b"Hello, World!");
        assert_eq!(buffer.len(), 13);
        assert_eq!(buffer.as_ref(), b"Hello, World!");
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn metrics_tracking() {
        let manager = BufferManager::new(BufferConfig::default());
        let _ = manager.validate_message_size(20 * 1024 * 1024);
        assert_eq!(manager.metrics().size_violations(), 1);
        manager.metrics().record_bytes_processed(1024);
        assert_eq!(manager.metrics().total_bytes_processed(), 1024);
    }
}
