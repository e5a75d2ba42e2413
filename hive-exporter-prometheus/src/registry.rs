//! Metric registry that holds the exported HiveOS gauges.
//!
//! Every metric kind is bound to its own [`Family`] handle when the registry is
//! built. Gauge values live in `AtomicU64` cells, so a scrape never observes a
//! half-written value; each family guards its series map with its own
//! `RwLock`, which the poll loop only takes for writing when a new series
//! appears.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use parking_lot::RwLock;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

use crate::poller::PollOutcome;

/// Gauge storing an `f64` in an atomic cell.
type F64Gauge = Gauge<f64, AtomicU64>;

/// Value of the `card` label for the rig-wide hashrate series.
pub const TOTAL_CARD: &str = "total";

/// Content type of [`MetricRegistry::render`] output.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Per-card metric kinds, all labelled `{rig, card}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardMetric {
    Hashrate,
    CoreTemp,
    MemTemp,
    JunctionTemp,
    Power,
    Fan,
}

impl CardMetric {
    pub const ALL: [CardMetric; 6] = [
        CardMetric::Hashrate,
        CardMetric::CoreTemp,
        CardMetric::MemTemp,
        CardMetric::JunctionTemp,
        CardMetric::Power,
        CardMetric::Fan,
    ];

    /// Metric name without the registry prefix.
    pub fn name(self) -> &'static str {
        match self {
            CardMetric::Hashrate => "hashrate",
            CardMetric::CoreTemp => "coretemp",
            CardMetric::MemTemp => "memtemp",
            CardMetric::JunctionTemp => "junctemp",
            CardMetric::Power => "power",
            CardMetric::Fan => "fan",
        }
    }

    /// HELP text.
    pub fn help(self) -> &'static str {
        match self {
            CardMetric::Hashrate => "Hashrate",
            CardMetric::CoreTemp => "GPU Core Temp",
            CardMetric::MemTemp => "GPU Memory Temperature",
            CardMetric::JunctionTemp => "GPU Junction Temperature",
            CardMetric::Power => "GPU Power Consumption",
            CardMetric::Fan => "GPU Fan Speed",
        }
    }
}

/// Case fan metric name without the registry prefix.
pub const CASE_FAN_NAME: &str = "casefan";
const CASE_FAN_HELP: &str = "Case Fan Speed";

/// Labels for per-card series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
pub struct CardLabels {
    pub rig: String,
    pub card: String,
}

/// Labels for case fan series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
pub struct FanLabels {
    pub rig: String,
    pub fan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
struct PollLabels {
    outcome: String,
}

/// One family handle per [`CardMetric`].
#[derive(Debug, Default)]
struct CardFamilies {
    hashrate: Family<CardLabels, F64Gauge>,
    core_temp: Family<CardLabels, F64Gauge>,
    mem_temp: Family<CardLabels, F64Gauge>,
    junction_temp: Family<CardLabels, F64Gauge>,
    power: Family<CardLabels, F64Gauge>,
    fan: Family<CardLabels, F64Gauge>,
}

impl CardFamilies {
    fn get(&self, metric: CardMetric) -> &Family<CardLabels, F64Gauge> {
        match metric {
            CardMetric::Hashrate => &self.hashrate,
            CardMetric::CoreTemp => &self.core_temp,
            CardMetric::MemTemp => &self.mem_temp,
            CardMetric::JunctionTemp => &self.junction_temp,
            CardMetric::Power => &self.power,
            CardMetric::Fan => &self.fan,
        }
    }
}

/// Poll loop statistics.
#[derive(Debug, Clone, Default)]
pub struct PollStats {
    /// Total loop iterations.
    pub polls: u64,
    /// Iterations that ended in a publish.
    pub published: u64,
    /// Iterations where the status file was missing.
    pub not_found: u64,
    /// Iterations where reading the status file failed.
    pub read_failures: u64,
    /// Iterations where the document could not be decoded.
    pub decode_errors: u64,
}

/// Thread-safe registry of the exported metrics.
#[derive(Debug)]
pub struct MetricRegistry {
    registry: Registry,
    cards: CardFamilies,
    case_fan: Family<FanLabels, F64Gauge>,
    polls: Family<PollLabels, Counter>,
    stats: RwLock<PollStats>,
}

/// Create a shareable registry handle.
pub type SharedRegistry = Arc<MetricRegistry>;

impl MetricRegistry {
    /// Create a registry whose metric names start with `{prefix}_`.
    ///
    /// An empty prefix exposes the bare names.
    pub fn new(prefix: &str) -> Self {
        let mut registry = if prefix.is_empty() {
            Registry::default()
        } else {
            Registry::with_prefix(prefix)
        };

        let cards = CardFamilies::default();
        let case_fan = Family::<FanLabels, F64Gauge>::default();
        let polls = Family::<PollLabels, Counter>::default();

        for metric in CardMetric::ALL {
            registry.register(metric.name(), metric.help(), cards.get(metric).clone());
        }
        registry.register(CASE_FAN_NAME, CASE_FAN_HELP, case_fan.clone());
        registry.register(
            "exporter_polls",
            "Status document polls by outcome",
            polls.clone(),
        );

        Self {
            registry,
            cards,
            case_fan,
            polls,
            stats: RwLock::new(PollStats::default()),
        }
    }

    /// Set a per-card gauge, creating the series on first use.
    pub(crate) fn set_card(&self, metric: CardMetric, rig: &str, card: &str, value: f64) {
        let labels = CardLabels {
            rig: escape_label_value(rig),
            card: card.to_string(),
        };
        self.cards.get(metric).get_or_create(&labels).set(value);
    }

    /// Set a case fan gauge, creating the series on first use.
    pub(crate) fn set_case_fan(&self, rig: &str, fan: &str, value: f64) {
        let labels = FanLabels {
            rig: escape_label_value(rig),
            fan: fan.to_string(),
        };
        self.case_fan.get_or_create(&labels).set(value);
    }

    /// Count one poll loop iteration.
    pub fn record_poll(&self, outcome: PollOutcome) {
        self.polls
            .get_or_create(&PollLabels {
                outcome: outcome.as_str().to_string(),
            })
            .inc();

        let mut stats = self.stats.write();
        stats.polls += 1;
        match outcome {
            PollOutcome::Published => stats.published += 1,
            PollOutcome::NotFound => stats.not_found += 1,
            PollOutcome::ReadFailure => stats.read_failures += 1,
            PollOutcome::DecodeError => stats.decode_errors += 1,
        }
    }

    /// Get poll loop statistics.
    pub fn stats(&self) -> PollStats {
        self.stats.read().clone()
    }

    /// Render the current state in OpenMetrics text format.
    pub fn render(&self) -> Result<String, fmt::Error> {
        let mut output = String::new();
        encode(&mut output, &self.registry)?;
        Ok(output)
    }
}

/// Escape special characters in label values.
///
/// The exposition encoder writes label values verbatim, so the rig id taken
/// from the status document must be escaped before it becomes a label.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new("hive")
    }
}
