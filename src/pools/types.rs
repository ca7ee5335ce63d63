/// Pool record types
///
/// `RawPool` mirrors one entry of the upstream feed exactly as sent (every
/// field optional, unknown fields ignored); `PoolRecord` is the normalized
/// domain type stored in snapshots.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// UPSTREAM WIRE FORMAT
// ============================================================================

/// One pool object from the yields feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPool {
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, rename = "tvlUsd")]
    pub tvl_usd: Option<f64>,
    #[serde(default, rename = "apyBase")]
    pub apy_base: Option<f64>,
    #[serde(default, rename = "apyReward")]
    pub apy_reward: Option<f64>,
}

// ============================================================================
// DOMAIN RECORD
// ============================================================================

/// Normalized pool entry
///
/// Serialized with the upstream field names so `/api/pools` returns the same
/// shape the feed uses. Text fields the feed omitted are held as `""` and
/// written back out as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoolRecord {
    #[serde(rename = "pool", with = "empty_as_null")]
    pub pool_id: String,
    #[serde(with = "empty_as_null")]
    pub chain: String,
    /// Join key for every query; empty when the feed omitted it
    #[serde(with = "empty_as_null")]
    pub project: String,
    #[serde(with = "empty_as_null")]
    pub symbol: String,
    #[serde(rename = "tvlUsd")]
    pub tvl_usd: f64,
    #[serde(rename = "apyBase")]
    pub base_yield_pct: Option<f64>,
    #[serde(rename = "apyReward")]
    pub reward_yield_pct: Option<f64>,
}

impl PoolRecord {
    /// Base plus reward yield, absent components counted as zero
    pub fn effective_yield_pct(&self) -> f64 {
        self.base_yield_pct.unwrap_or(0.0) + self.reward_yield_pct.unwrap_or(0.0)
    }

    pub fn has_project(&self) -> bool {
        !self.project.is_empty()
    }
}

mod empty_as_null {
    use super::*;

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_empty() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

impl From<RawPool> for PoolRecord {
    fn from(raw: RawPool) -> Self {
        Self {
            pool_id: raw.pool.unwrap_or_default(),
            chain: raw.chain.unwrap_or_default(),
            project: raw.project.unwrap_or_default(),
            symbol: raw.symbol.unwrap_or_default(),
            tvl_usd: raw.tvl_usd.unwrap_or(0.0),
            base_yield_pct: raw.apy_base,
            reward_yield_pct: raw.apy_reward,
        }
    }
}

// ============================================================================
// QUERY RESULT
// ============================================================================

/// A project paired with its effective yield (API shape: `{ "name", "apy" }`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolYield {
    pub name: String,
    pub apy: f64,
}

impl ProtocolYield {
    pub fn from_record(record: &PoolRecord) -> Self {
        Self {
            name: record.project.clone(),
            apy: record.effective_yield_pct(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_yield_sums_components() {
        let record = PoolRecord {
            project: "aave-v3".to_string(),
            base_yield_pct: Some(1.5),
            reward_yield_pct: Some(0.5),
            ..Default::default()
        };
        assert_eq!(record.effective_yield_pct(), 2.0);
    }

    #[test]
    fn test_effective_yield_treats_absent_as_zero() {
        let only_reward = PoolRecord {
            reward_yield_pct: Some(4.25),
            ..Default::default()
        };
        assert_eq!(only_reward.effective_yield_pct(), 4.25);
        assert_eq!(PoolRecord::default().effective_yield_pct(), 0.0);
    }

    #[test]
    fn test_raw_pool_ignores_unknown_fields_and_nulls() {
        let raw: RawPool = serde_json::from_str(
            r#"{"pool":"abc","chain":"Ethereum","project":"lido","symbol":"STETH",
                "tvlUsd":123.5,"apyBase":null,"stablecoin":false,"predictions":{}}"#,
        )
        .unwrap();
        let record = PoolRecord::from(raw);
        assert_eq!(record.pool_id, "abc");
        assert_eq!(record.project, "lido");
        assert_eq!(record.tvl_usd, 123.5);
        assert_eq!(record.base_yield_pct, None);
        assert_eq!(record.reward_yield_pct, None);
    }

    #[test]
    fn test_record_serializes_with_upstream_names() {
        let record = PoolRecord {
            pool_id: "p1".to_string(),
            project: "aave-v3".to_string(),
            base_yield_pct: Some(1.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pool"], "p1");
        assert_eq!(json["apyBase"], 1.0);
        assert!(json["apyReward"].is_null());
        assert!(json.get("tvlUsd").is_some());
    }

    #[test]
    fn test_missing_text_fields_serialize_as_null() {
        let raw: RawPool = serde_json::from_str(r#"{"pool":"p2","apyBase":3.0}"#).unwrap();
        let record = PoolRecord::from(raw);
        assert_eq!(record.project, "");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pool"], "p2");
        assert!(json["chain"].is_null());
        assert!(json["project"].is_null());
        assert!(json["symbol"].is_null());

        let back: PoolRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
