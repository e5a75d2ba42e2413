//! Mapping from a HiveOS status snapshot to registry series.

use hive_common::StatusSnapshot;

use crate::registry::{CardMetric, MetricRegistry, TOTAL_CARD};

/// `total_khs` is reported in kH/s, the rig-wide series in H/s.
pub const KHS_TO_HS: f64 = 1e3;

/// Write every field present in `snapshot` to the registry.
///
/// Series for fields the snapshot does not carry are left untouched, so a
/// card without a memory sensor never gets a `memtemp` series and previously
/// published values keep their last reading.
///
/// Sensor arrays are walked up to the length of the core temperature array;
/// shorter arrays are skipped past their end. Per-card hashrates and case fans
/// follow their own array lengths.
pub fn publish(snapshot: &StatusSnapshot, registry: &MetricRegistry) {
    let rig = snapshot.rig_id.as_str();

    for (card, hashrate) in snapshot.hashrate.iter().enumerate() {
        registry.set_card(CardMetric::Hashrate, rig, &card.to_string(), *hashrate);
    }
    if let Some(total_khs) = snapshot.total_khs {
        registry.set_card(CardMetric::Hashrate, rig, TOTAL_CARD, total_khs * KHS_TO_HS);
    }

    let sensors = [
        (CardMetric::MemTemp, &snapshot.mem_temp),
        (CardMetric::JunctionTemp, &snapshot.junction_temp),
        (CardMetric::Power, &snapshot.power),
        (CardMetric::Fan, &snapshot.fan),
    ];

    for (index, core_temp) in snapshot.core_temp.iter().enumerate() {
        let card = index.to_string();
        registry.set_card(CardMetric::CoreTemp, rig, &card, *core_temp);

        for (metric, values) in &sensors {
            if let Some(value) = values.get(index) {
                registry.set_card(*metric, rig, &card, *value);
            }
        }
    }

    for (fan, speed) in snapshot.case_fan.iter().enumerate() {
        registry.set_case_fan(rig, &fan.to_string(), *speed);
    }
}
