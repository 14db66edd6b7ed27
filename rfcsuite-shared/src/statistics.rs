//! Counter snapshots and latency/jitter reduction.
//!
//! Additive counters combine field by field, so interval snapshots can be
//! folded in any order. Delay reducers keep a running minimum and maximum
//! and the last mean reported for every payload id.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Min/max/mean reducer for latency or jitter samples.
///
/// Raw samples are nanoseconds; everything stored and returned is
/// microseconds with three decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayReducer {
    check_value: bool,
    average: BTreeMap<u32, f64>,
    minimum: f64,
    maximum: f64,
}

impl DelayReducer {
    /// Reducer that drops implausible samples.
    pub fn latency() -> Self {
        Self {
            check_value: true,
            average: BTreeMap::new(),
            minimum: 0.0,
            maximum: 0.0,
        }
    }

    /// Reducer that keeps every sample.
    pub fn jitter() -> Self {
        Self {
            check_value: false,
            ..Self::latency()
        }
    }

    /// Nanoseconds to microseconds; rejected samples become zero.
    fn convert(&self, raw_ns: f64) -> f64 {
        let value = round_to(raw_ns / 1000.0, 3);
        if self.check_value && !(value > -(i64::MAX as f64)) {
            return 0.0;
        }
        value
    }

    pub fn record_minimum(&mut self, raw_ns: f64) {
        let value = self.convert(raw_ns);
        if value == 0.0 {
            return;
        }
        self.minimum = if self.minimum == 0.0 {
            value
        } else {
            value.min(self.minimum)
        };
    }

    pub fn record_maximum(&mut self, raw_ns: f64) {
        self.maximum = self.convert(raw_ns).max(self.maximum);
    }

    /// Replace the mean reported for `tpld_id`.
    pub fn set_average(&mut self, tpld_id: u32, raw_ns: f64) {
        let value = self.convert(raw_ns);
        if value != 0.0 {
            self.average.insert(tpld_id, value);
        }
    }

    /// Feed one hardware reading (min, max and mean) for a payload id.
    pub fn record(&mut self, tpld_id: u32, min_ns: f64, max_ns: f64, avg_ns: f64) {
        self.record_minimum(min_ns);
        self.record_maximum(max_ns);
        self.set_average(tpld_id, avg_ns);
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Mean of the per-id means; `0.0` before any id reported.
    pub fn average(&self) -> f64 {
        if self.average.is_empty() {
            return 0.0;
        }
        self.average.values().sum::<f64>() / self.average.len() as f64
    }

    /// Fold another reducer of the same kind into this one.
    pub fn merge(&mut self, other: &DelayReducer) {
        if other.minimum != 0.0 {
            self.minimum = if self.minimum == 0.0 {
                other.minimum
            } else {
                self.minimum.min(other.minimum)
            };
        }
        self.maximum = self.maximum.max(other.maximum);
        self.average
            .extend(other.average.iter().map(|(id, value)| (*id, *value)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxStream {
    pub tpld_id: u32,
    pub packet: u64,
    pub pps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RxTpldId {
    pub packet: u64,
    pub pps: u64,
}

/// Counters of one port (or a fold of several) over one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsData {
    pub tx_packet: u64,
    pub tx_bps_l1: u64,
    pub tx_bps_l2: u64,
    pub tx_pps: u64,
    pub rx_packet: u64,
    pub rx_bps_l1: u64,
    pub rx_bps_l2: u64,
    pub rx_pps: u64,
    pub loss: i64,
    /// Percent of transmitted packets lost. A port that sent nothing reports
    /// `-1.0`; a [`fold`](Self::fold) total reports `0.0`.
    pub loss_percent: f64,
    pub fcs: u64,
    /// Packets received without a payload id.
    pub flood: u64,
    /// Keyed by stream index on the port. When two snapshots disagree on a
    /// stream's payload id, the sum keeps the lower id.
    pub per_tx_stream: BTreeMap<u32, TxStream>,
    pub per_rx_tpld_id: BTreeMap<u32, RxTpldId>,
    pub latency: DelayReducer,
    pub jitter: DelayReducer,
}

impl Default for StatisticsData {
    fn default() -> Self {
        Self {
            tx_packet: 0,
            tx_bps_l1: 0,
            tx_bps_l2: 0,
            tx_pps: 0,
            rx_packet: 0,
            rx_bps_l1: 0,
            rx_bps_l2: 0,
            rx_pps: 0,
            loss: 0,
            loss_percent: 0.0,
            fcs: 0,
            flood: 0,
            per_tx_stream: BTreeMap::new(),
            per_rx_tpld_id: BTreeMap::new(),
            latency: DelayReducer::latency(),
            jitter: DelayReducer::jitter(),
        }
    }
}

impl StatisticsData {
    /// Recompute `loss_percent` from `loss` and `tx_packet`.
    pub fn update_loss_percent(&mut self) {
        self.loss_percent = if self.tx_packet == 0 {
            -1.0
        } else {
            round_to(self.loss as f64 * 100.0 / self.tx_packet as f64, 2)
        };
    }

    /// Sum port snapshots into one.
    ///
    /// Live snapshots carry the loss the hardware counted; final snapshots
    /// derive it from the transmitted and received totals.
    pub fn fold(snapshots: impl IntoIterator<Item = StatisticsData>, is_live: bool) -> Self {
        let mut total = snapshots
            .into_iter()
            .fold(StatisticsData::default(), |acc, s| acc + s);
        if !is_live {
            total.loss = total.tx_packet as i64 - total.rx_packet as i64;
        }
        total.update_loss_percent();
        if total.tx_packet == 0 {
            total.loss_percent = 0.0;
        }
        total
    }
}

impl AddAssign<&StatisticsData> for StatisticsData {
    fn add_assign(&mut self, other: &StatisticsData) {
        self.tx_packet += other.tx_packet;
        self.tx_bps_l1 += other.tx_bps_l1;
        self.tx_bps_l2 += other.tx_bps_l2;
        self.tx_pps += other.tx_pps;
        self.rx_packet += other.rx_packet;
        self.rx_bps_l1 += other.rx_bps_l1;
        self.rx_bps_l2 += other.rx_bps_l2;
        self.rx_pps += other.rx_pps;
        self.loss += other.loss;
        self.fcs += other.fcs;
        self.flood += other.flood;

        for (index, stream) in &other.per_tx_stream {
            let entry = self.per_tx_stream.entry(*index).or_insert(TxStream {
                tpld_id: stream.tpld_id,
                ..Default::default()
            });
            entry.tpld_id = entry.tpld_id.min(stream.tpld_id);
            entry.packet += stream.packet;
            entry.pps += stream.pps;
        }
        for (tpld_id, rx) in &other.per_rx_tpld_id {
            let entry = self.per_rx_tpld_id.entry(*tpld_id).or_default();
            entry.packet += rx.packet;
            entry.pps += rx.pps;
        }

        self.latency.merge(&other.latency);
        self.jitter.merge(&other.jitter);
        self.update_loss_percent();
    }
}

impl AddAssign for StatisticsData {
    fn add_assign(&mut self, other: StatisticsData) {
        *self += &other;
    }
}

impl Add for StatisticsData {
    type Output = StatisticsData;

    fn add(mut self, other: StatisticsData) -> StatisticsData {
        self += &other;
        self
    }
}

/// Statistics of one port shared between its collector and readers.
///
/// Every update takes the write lock once, so readers never observe half
/// of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedStatistics {
    inner: Arc<RwLock<StatisticsData>>,
}

impl SharedStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot.
    pub fn apply(&self, snapshot: StatisticsData) {
        *self.inner.write() = snapshot;
    }

    /// Add an interval delta to the stored snapshot.
    pub fn fold(&self, delta: &StatisticsData) {
        *self.inner.write() += delta;
    }

    pub fn snapshot(&self) -> StatisticsData {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn counters(tx: u64, rx: u64) -> StatisticsData {
        StatisticsData {
            tx_packet: tx,
            rx_packet: rx,
            ..Default::default()
        }
    }

    #[test]
    fn test_latency_samples_converted_to_microseconds() {
        let mut latency = DelayReducer::latency();
        latency.record(1, 500_000.0, 500_000.0, 500_000.0);
        latency.record(1, 250_000.0, 250_000.0, 250_000.0);

        assert_eq!(latency.minimum(), 250.0);
        assert_eq!(latency.maximum(), 500.0);
        assert_eq!(latency.average(), 250.0);
    }

    #[test]
    fn test_conversion_rounds_to_three_decimals() {
        let mut latency = DelayReducer::latency();
        latency.record_maximum(1_234_567.0);
        assert_eq!(latency.maximum(), 1234.567);
        latency.record_maximum(1_234_567_891.4);
        assert_eq!(latency.maximum(), 1_234_567.891);
    }

    #[test]
    fn test_zero_samples_do_not_touch_minimum() {
        let mut latency = DelayReducer::latency();
        latency.record_minimum(0.0);
        assert_eq!(latency.minimum(), 0.0);
        latency.record_minimum(3000.0);
        latency.record_minimum(0.0);
        assert_eq!(latency.minimum(), 3.0);
    }

    #[test]
    fn test_latency_filters_implausible_values_jitter_does_not() {
        let mut latency = DelayReducer::latency();
        let mut jitter = DelayReducer::jitter();
        latency.record_minimum(f64::MIN);
        jitter.record_minimum(f64::MIN);

        assert_eq!(latency.minimum(), 0.0);
        assert!(jitter.minimum() < 0.0);
    }

    #[test]
    fn test_average_over_identifiers() {
        let mut jitter = DelayReducer::jitter();
        assert_eq!(jitter.average(), 0.0);
        jitter.set_average(0, 1000.0);
        jitter.set_average(1, 3000.0);
        jitter.set_average(0, 2000.0);
        assert_eq!(jitter.average(), 2.5);
    }

    #[test]
    fn test_merge_reducers() {
        let mut a = DelayReducer::latency();
        a.record(0, 4000.0, 9000.0, 6000.0);
        let mut b = DelayReducer::latency();
        b.record(1, 2000.0, 5000.0, 3000.0);
        let empty = DelayReducer::latency();

        a.merge(&empty);
        assert_eq!(a.minimum(), 4.0);
        a.merge(&b);
        assert_eq!(a.minimum(), 2.0);
        assert_eq!(a.maximum(), 9.0);
        assert_eq!(a.average(), 4.5);
    }

    #[test]
    fn test_addition_is_commutative_for_counters() {
        let mut a = counters(100, 90);
        a.per_rx_tpld_id.insert(0, RxTpldId { packet: 90, pps: 9 });
        let mut b = counters(50, 50);
        b.per_rx_tpld_id.insert(0, RxTpldId { packet: 50, pps: 5 });
        b.per_rx_tpld_id.insert(1, RxTpldId { packet: 1, pps: 1 });

        let ab = a.clone() + b.clone();
        let ba = b + a;
        assert_eq!(ab, ba);
        assert_eq!(ab.tx_packet, 150);
        assert_eq!(ab.per_rx_tpld_id[&0], RxTpldId { packet: 140, pps: 14 });
        assert_eq!(ab.per_rx_tpld_id[&1].packet, 1);
    }

    #[test]
    fn test_fold_final_snapshot_derives_loss() {
        let total = StatisticsData::fold([counters(600, 597), counters(400, 400)], false);
        assert_eq!(total.loss, 3);
        assert_eq!(total.loss_percent, 0.3);

        let mut live = counters(100, 0);
        live.loss = 7;
        let total = StatisticsData::fold([live], true);
        assert_eq!(total.loss, 7);
        assert_eq!(total.loss_percent, 7.0);

        let idle = StatisticsData::fold(Vec::new(), false);
        assert_eq!(idle.loss_percent, 0.0);
        let idle = StatisticsData::fold([counters(0, 0), counters(0, 0)], true);
        assert_eq!(idle.loss_percent, 0.0);

        // a single idle port still flags that nothing was sent
        let mut port = counters(0, 0);
        port.update_loss_percent();
        assert_eq!(port.loss_percent, -1.0);
    }

    #[test]
    fn test_tx_stream_id_collision_is_order_independent() {
        let mut a = counters(10, 10);
        a.per_tx_stream.insert(0, TxStream { tpld_id: 7, packet: 10, pps: 1 });
        let mut b = counters(5, 5);
        b.per_tx_stream.insert(0, TxStream { tpld_id: 3, packet: 5, pps: 2 });

        let ab = a.clone() + b.clone();
        assert_eq!(ab, b + a);
        assert_eq!(ab.per_tx_stream[&0], TxStream { tpld_id: 3, packet: 15, pps: 3 });
    }

    #[test]
    fn test_shared_statistics_whole_updates() {
        let shared = SharedStatistics::new();
        let writer = shared.clone();
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                writer.fold(&counters(10, 10));
            }
        });
        for _ in 0..100 {
            let snap = shared.snapshot();
            assert_eq!(snap.tx_packet, snap.rx_packet);
        }
        handle.join().unwrap();
        assert_eq!(shared.snapshot().tx_packet, 1000);

        shared.apply(counters(1, 0));
        assert_eq!(shared.snapshot().tx_packet, 1);
    }
}
