//! Decode Metrics
//!
//! Counters describing what the decoder has seen: transmissions, packets by kind,
//! bits consumed and failures.
//!
//! Uses atomic counters so a single collector can be shared by reference. There is
//! no global instance; whoever drives the decoder owns the collector and passes it in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for decode operations
#[derive(Debug)]
pub struct Metrics {
    /// Top-level transmissions decoded
    pub transmissions_total: AtomicU64,
    /// Packets decoded at any depth
    pub packets_total: AtomicU64,
    /// Literal packets decoded
    pub literal_packets: AtomicU64,
    /// Operator packets decoded
    pub operator_packets: AtomicU64,
    /// Bits consumed by top-level transmissions
    pub bits_consumed: AtomicU64,
    /// Trailing padding bits left unread after top-level transmissions
    pub padding_bits: AtomicU64,
    /// Transmissions rejected by the decoder
    pub decode_errors: AtomicU64,
    /// Packet trees evaluated
    pub evaluations_total: AtomicU64,
    /// Evaluations that failed
    pub evaluation_errors: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            transmissions_total: AtomicU64::new(0),
            packets_total: AtomicU64::new(0),
            literal_packets: AtomicU64::new(0),
            operator_packets: AtomicU64::new(0),
            bits_consumed: AtomicU64::new(0),
            padding_bits: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            evaluations_total: AtomicU64::new(0),
            evaluation_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record the packets of one successfully decoded tree
    pub fn packets_decoded(&self, literals: usize, operators: usize) {
        self.packets_total
            .fetch_add((literals + operators) as u64, Ordering::Relaxed);
        self.literal_packets
            .fetch_add(literals as u64, Ordering::Relaxed);
        self.operator_packets
            .fetch_add(operators as u64, Ordering::Relaxed);
    }

    /// Record a fully decoded transmission
    pub fn transmission_decoded(&self, bits_consumed: usize, padding_bits: usize) {
        self.transmissions_total.fetch_add(1, Ordering::Relaxed);
        self.bits_consumed
            .fetch_add(bits_consumed as u64, Ordering::Relaxed);
        self.padding_bits
            .fetch_add(padding_bits as u64, Ordering::Relaxed);
    }

    /// Record a rejected transmission
    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evaluation attempt and its outcome
    pub fn evaluation(&self, success: bool) {
        self.evaluations_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.evaluation_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transmissions_total: self.transmissions_total.load(Ordering::Relaxed),
            packets_total: self.packets_total.load(Ordering::Relaxed),
            literal_packets: self.literal_packets.load(Ordering::Relaxed),
            operator_packets: self.operator_packets.load(Ordering::Relaxed),
            bits_consumed: self.bits_consumed.load(Ordering::Relaxed),
            padding_bits: self.padding_bits.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            evaluations_total: self.evaluations_total.load(Ordering::Relaxed),
            evaluation_errors: self.evaluation_errors.load(Ordering::Relaxed),
            elapsed_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            transmissions_total = snapshot.transmissions_total,
            packets_total = snapshot.packets_total,
            literal_packets = snapshot.literal_packets,
            operator_packets = snapshot.operator_packets,
            bits_consumed = snapshot.bits_consumed,
            padding_bits = snapshot.padding_bits,
            decode_errors = snapshot.decode_errors,
            evaluations_total = snapshot.evaluations_total,
            evaluation_errors = snapshot.evaluation_errors,
            elapsed_ms = snapshot.elapsed_ms,
            "Decoder metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub transmissions_total: u64,
    pub packets_total: u64,
    pub literal_packets: u64,
    pub operator_packets: u64,
    pub bits_consumed: u64,
    pub padding_bits: u64,
    pub decode_errors: u64,
    pub evaluations_total: u64,
    pub evaluation_errors: u64,
    pub elapsed_ms: u64,
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
