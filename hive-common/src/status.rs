//! HiveOS status document model and decoder.
//!
//! The HiveOS agent periodically rewrites `last_stat.json` with the payload it
//! sends to the Hive API. Only the fields needed for per-GPU metrics are
//! modelled here; everything else in the document is ignored.

use serde::Deserialize;

use crate::error::Result;

/// Default location of the status document on a HiveOS rig.
pub const DEFAULT_STATUS_PATH: &str = "/run/hive/last_stat.json";

/// One point-in-time parse of the status document.
///
/// Per-device vectors are indexed by card ordinal. A field the agent did not
/// report (absent or `null`) is an empty vector, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    /// Rig identifier.
    pub rig_id: String,
    /// GPU core temperatures.
    pub core_temp: Vec<f64>,
    /// GPU memory temperatures (only on cards with a memory sensor).
    pub mem_temp: Vec<f64>,
    /// GPU junction (hotspot) temperatures.
    pub junction_temp: Vec<f64>,
    /// GPU fan speeds in percent.
    pub fan: Vec<f64>,
    /// GPU power draw in watts.
    pub power: Vec<f64>,
    /// Per-card hashrate as reported by the miner, in kH/s.
    pub hashrate: Vec<f64>,
    /// Aggregate rig hashrate in kH/s.
    pub total_khs: Option<f64>,
    /// Case fan speeds reported by the autofan controller.
    pub case_fan: Vec<f64>,
}

impl StatusSnapshot {
    /// Number of cards, as given by the core temperature array.
    pub fn card_count(&self) -> usize {
        self.core_temp.len()
    }
}

#[derive(Debug, Deserialize)]
struct StatusDocument {
    params: Params,
}

#[derive(Debug, Deserialize)]
struct Params {
    rig_id: String,
    #[serde(default)]
    temp: Option<Vec<f64>>,
    #[serde(default)]
    mtemp: Option<Vec<f64>>,
    #[serde(default)]
    jtemp: Option<Vec<f64>>,
    #[serde(default)]
    fan: Option<Vec<f64>>,
    #[serde(default)]
    power: Option<Vec<f64>>,
    #[serde(default)]
    total_khs: Option<f64>,
    #[serde(default)]
    miner_stats: Option<MinerStats>,
    #[serde(default)]
    mknet_autofan_stats: Option<AutofanStats>,
}

#[derive(Debug, Deserialize)]
struct MinerStats {
    #[serde(default)]
    khs: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct AutofanStats {
    #[serde(default)]
    casefan: Option<Vec<f64>>,
}

impl From<Params> for StatusSnapshot {
    fn from(params: Params) -> Self {
        Self {
            rig_id: params.rig_id,
            core_temp: params.temp.unwrap_or_default(),
            mem_temp: params.mtemp.unwrap_or_default(),
            junction_temp: params.jtemp.unwrap_or_default(),
            fan: params.fan.unwrap_or_default(),
            power: params.power.unwrap_or_default(),
            hashrate: params
                .miner_stats
                .and_then(|stats| stats.khs)
                .unwrap_or_default(),
            total_khs: params.total_khs,
            case_fan: params
                .mknet_autofan_stats
                .and_then(|stats| stats.casefan)
                .unwrap_or_default(),
        }
    }
}

/// Decode a raw status document into a snapshot.
///
/// Malformed JSON and well-formed JSON that lacks `params.rig_id` or carries
/// the wrong types both yield [`Error::Decode`](crate::Error::Decode).
pub fn decode(data: &[u8]) -> Result<StatusSnapshot> {
    let document: StatusDocument = serde_json::from_slice(data)?;
    Ok(document.params.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_decode_full_document() {
        let json = br#"{
            "method": "stats",
            "params": {
                "v": 1,
                "rig_id": "rig1",
                "temp": [60, 62],
                "mtemp": [80, 84],
                "jtemp": [70, 72],
                "fan": [50, 55],
                "power": [100, 110],
                "total_khs": 0.03,
                "miner_stats": { "status": "mining", "khs": [10.0, 20.0], "algo": "ethash" },
                "mknet_autofan_stats": { "casefan": [40, 45, 50] }
            }
        }"#;

        let snapshot = decode(json).unwrap();

        assert_eq!(snapshot.rig_id, "rig1");
        assert_eq!(snapshot.core_temp, vec![60.0, 62.0]);
        assert_eq!(snapshot.mem_temp, vec![80.0, 84.0]);
        assert_eq!(snapshot.junction_temp, vec![70.0, 72.0]);
        assert_eq!(snapshot.fan, vec![50.0, 55.0]);
        assert_eq!(snapshot.power, vec![100.0, 110.0]);
        assert_eq!(snapshot.hashrate, vec![10.0, 20.0]);
        assert_eq!(snapshot.total_khs, Some(0.03));
        assert_eq!(snapshot.case_fan, vec![40.0, 45.0, 50.0]);
        assert_eq!(snapshot.card_count(), 2);
    }

    #[test]
    fn test_decode_minimal_document() {
        let snapshot = decode(br#"{"params": {"rig_id": "rig2"}}"#).unwrap();

        assert_eq!(snapshot.rig_id, "rig2");
        assert!(snapshot.core_temp.is_empty());
        assert!(snapshot.hashrate.is_empty());
        assert!(snapshot.case_fan.is_empty());
        assert_eq!(snapshot.total_khs, None);
    }

    #[test]
    fn test_decode_null_arrays() {
        let json = br#"{"params": {
            "rig_id": "rig3",
            "temp": [55],
            "mtemp": null,
            "miner_stats": null,
            "mknet_autofan_stats": { "casefan": null }
        }}"#;

        let snapshot = decode(json).unwrap();

        assert_eq!(snapshot.core_temp, vec![55.0]);
        assert!(snapshot.mem_temp.is_empty());
        assert!(snapshot.hashrate.is_empty());
        assert!(snapshot.case_fan.is_empty());
    }

    #[test]
    fn test_decode_keeps_fractional_values() {
        let json = br#"{"params": {"rig_id": "r", "power": [101.75], "miner_stats": {"khs": [12345.678]}}}"#;

        let snapshot = decode(json).unwrap();

        assert_eq!(snapshot.power, vec![101.75]);
        assert_eq!(snapshot.hashrate, vec![12345.678]);
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode(b"{\"params\": {\"rig_id\": ").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn test_decode_missing_rig_id() {
        let err = decode(br#"{"params": {"temp": [60]}}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_missing_params() {
        let err = decode(br#"{"method": "stats"}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_wrong_type() {
        let err = decode(br#"{"params": {"rig_id": "r", "temp": "hot"}}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(decode(b""), Err(Error::Decode(_))));
    }
}
