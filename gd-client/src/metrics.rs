use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub requests_issued_total: u64,
    pub requests_superseded_total: u64,
    pub requests_cancelled_total: u64,
    pub responses_applied_total: u64,
    pub responses_empty_total: u64,
    pub responses_rejected_total: u64,
    pub responses_failed_total: u64,
    pub responses_malformed_total: u64,
    pub commands_applied_total: u64,
    pub commands_skipped_total: u64,
    pub push_messages_total: u64,
    pub push_suppressed_total: u64,
    pub push_connects_total: u64,
    pub push_disconnects_total: u64,
}

/// Counters shared by every component of one dashboard session.
pub struct SyncMetrics {
    started_at: Instant,
    requests_issued_total: AtomicU64,
    requests_superseded_total: AtomicU64,
    requests_cancelled_total: AtomicU64,
    responses_applied_total: AtomicU64,
    responses_empty_total: AtomicU64,
    responses_rejected_total: AtomicU64,
    responses_failed_total: AtomicU64,
    responses_malformed_total: AtomicU64,
    commands_applied_total: AtomicU64,
    commands_skipped_total: AtomicU64,
    push_messages_total: AtomicU64,
    push_suppressed_total: AtomicU64,
    push_connects_total: AtomicU64,
    push_disconnects_total: AtomicU64,
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            requests_issued_total: AtomicU64::new(0),
            requests_superseded_total: AtomicU64::new(0),
            requests_cancelled_total: AtomicU64::new(0),
            responses_applied_total: AtomicU64::new(0),
            responses_empty_total: AtomicU64::new(0),
            responses_rejected_total: AtomicU64::new(0),
            responses_failed_total: AtomicU64::new(0),
            responses_malformed_total: AtomicU64::new(0),
            commands_applied_total: AtomicU64::new(0),
            commands_skipped_total: AtomicU64::new(0),
            push_messages_total: AtomicU64::new(0),
            push_suppressed_total: AtomicU64::new(0),
            push_connects_total: AtomicU64::new(0),
            push_disconnects_total: AtomicU64::new(0),
        }
    }
}

impl SyncMetrics {
    pub fn record_request_issued(&self) {
        self.requests_issued_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_superseded(&self) {
        self.requests_superseded_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_requests_cancelled(&self, count: usize) {
        self.requests_cancelled_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_response_applied(&self) {
        self.responses_applied_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response_empty(&self) {
        self.responses_empty_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response_rejected(&self) {
        self.responses_rejected_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response_failed(&self) {
        self.responses_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response_malformed(&self) {
        self.responses_malformed_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_command_applied(&self) {
        self.commands_applied_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_command_skipped(&self) {
        self.commands_skipped_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_push_message(&self) {
        self.push_messages_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_push_suppressed(&self) {
        self.push_suppressed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_push_connect(&self) {
        self.push_connects_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_push_disconnect(&self) {
        self.push_disconnects_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            requests_issued_total: self.requests_issued_total.load(Ordering::Relaxed),
            requests_superseded_total: self.requests_superseded_total.load(Ordering::Relaxed),
            requests_cancelled_total: self.requests_cancelled_total.load(Ordering::Relaxed),
            responses_applied_total: self.responses_applied_total.load(Ordering::Relaxed),
            responses_empty_total: self.responses_empty_total.load(Ordering::Relaxed),
            responses_rejected_total: self.responses_rejected_total.load(Ordering::Relaxed),
            responses_failed_total: self.responses_failed_total.load(Ordering::Relaxed),
            responses_malformed_total: self.responses_malformed_total.load(Ordering::Relaxed),
            commands_applied_total: self.commands_applied_total.load(Ordering::Relaxed),
            commands_skipped_total: self.commands_skipped_total.load(Ordering::Relaxed),
            push_messages_total: self.push_messages_total.load(Ordering::Relaxed),
            push_suppressed_total: self.push_suppressed_total.load(Ordering::Relaxed),
            push_connects_total: self.push_connects_total.load(Ordering::Relaxed),
            push_disconnects_total: self.push_disconnects_total.load(Ordering::Relaxed),
        }
    }
}
