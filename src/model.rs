use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};
use std::fmt;

pub type Address = String;

/// A value coming from a loosely typed upstream field.
///
/// Operational columns mix numbers, strings and absent values depending on
/// which source answered for an address. Keeping the variant explicit lets
/// sorting and rendering decide what to do with each case instead of guessing
/// from the printed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    Number(Number),
    Text(String),
    #[default]
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Numeric view of the cell; text is accepted when it parses as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(x) => x.as_f64(),
            Cell::Text(x) => x.trim().parse().ok(),
            Cell::Missing => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Number(x) => Cell::Number(x),
            Value::String(x) => Cell::Text(x),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value.into())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(Cell::Number)
            .unwrap_or(Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(x) => write!(f, "{x}"),
            Cell::Text(x) => write!(f, "{x}"),
            Cell::Missing => write!(f, "N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Cell::from)
    }
}

/// Address-keyed dataset that keeps the document order of its entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T>(Vec<(Address, T)>);

impl<T> Keyed<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &T)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<T> FromIterator<(Address, T)> for Keyed<T> {
    fn from_iter<I: IntoIterator<Item = (Address, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, T: serde::de::DeserializeOwned> Deserialize<'de> for Keyed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| {
                T::deserialize(value)
                    .map(|x| (key.clone(), x))
                    .map_err(|e| D::Error::custom(format!("entry {key}: {e}")))
            })
            .collect()
    }
}

/// Expected annual reward rates for one operator. Absent or null rates are 0.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawReward {
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "MPOND", default)]
    pub mpond: f64,

    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "POND", default)]
    pub pond: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClusterInfo {
    #[serde(default)]
    pub network: Cell,

    #[serde(default)]
    pub relayers: Cell,

    #[serde(default)]
    pub latency_score: Cell,

    #[serde(default)]
    pub tickets: Cell,
}

pub type Rewards = Keyed<RawReward>;
pub type ClusterInfo = Keyed<RawClusterInfo>;
pub type OperatorNames = Keyed<String>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
    pub token_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Delegation {
    pub token: TokenRef,
    pub amount: String,
}

/// On-chain cluster registration as served by the subgraph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDelegation {
    pub id: Address,

    #[serde(default)]
    pub commission: Cell,

    #[serde(default)]
    pub total_delegations: Vec<Delegation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClusterPage {
    #[serde(default)]
    pub clusters: Vec<RawDelegation>,
}

/// One row of the final table; the address is the unique key.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorRecord {
    pub operator_name: String,
    pub network: Cell,
    pub address: Address,
    /// `staked_pond + staked_mpond * 1e6`, used to rank every stake column.
    pub total_staked_pond_equivalent: f64,
    pub staked_pond: f64,
    pub staked_mpond: f64,
    pub relayers: Cell,
    pub commission: Cell,
    pub latency_score: Cell,
    pub tickets: Cell,
    pub apr_mpond: f64,
    pub apr_pond: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keyed_keeps_document_order() {
        let names: OperatorNames = serde_json::from_value(json!({
            "0xC": "Charlie",
            "0xA": "Alpha",
            "0xB": "Bravo",
        }))
        .unwrap();

        let keys: Vec<_> = names.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["0xC", "0xA", "0xB"]);
    }

    #[test]
    fn cluster_info_fields_may_be_absent() {
        let info: ClusterInfo = serde_json::from_value(json!({
            "0xA": { "network": "mainnet", "tickets": 7 },
            "0xB": {},
        }))
        .unwrap();

        let (_, a) = info.iter().next().unwrap();
        assert_eq!(a.network, Cell::text("mainnet"));
        assert_eq!(a.tickets, Cell::from(7_i64));
        assert_eq!(a.relayers, Cell::Missing);
        assert_eq!(a.latency_score.to_string(), "N/A");
    }

    #[test]
    fn reward_rates_accept_numeric_strings() {
        let rewards: Rewards = serde_json::from_value(json!({
            "0xA": { "MPOND": "1.5", "POND": 3 },
            "0xB": { "POND": 2.25 },
        }))
        .unwrap();

        let rates: Vec<_> = rewards.iter().map(|(_, r)| (r.mpond, r.pond)).collect();
        assert_eq!(rates, vec![(1.5, 3.0), (0.0, 2.25)]);
    }

    #[test]
    fn null_reward_rates_default_to_zero() {
        let rewards: Rewards = serde_json::from_value(json!({
            "0xA": { "MPOND": null, "POND": 3 },
            "0xB": { "MPOND": 2, "POND": null },
        }))
        .unwrap();

        let rates: Vec<_> = rewards.iter().map(|(_, r)| (r.mpond, r.pond)).collect();
        assert_eq!(rates, vec![(0.0, 3.0), (2.0, 0.0)]);
    }

    #[test]
    fn cell_numeric_view() {
        assert_eq!(Cell::text("5").as_f64(), Some(5.0));
        assert_eq!(Cell::from(1.25).as_f64(), Some(1.25));
        assert_eq!(Cell::text("N/A").as_f64(), None);
        assert_eq!(Cell::Missing.as_f64(), None);
    }

    #[test]
    fn cluster_page_parses_delegations() {
        let page: ClusterPage = serde_json::from_value(json!({
            "clusters": [{
                "id": "0xA",
                "commission": "5",
                "totalDelegations": [
                    { "token": { "tokenId": "0x01" }, "amount": "1000" }
                ]
            }]
        }))
        .unwrap();

        let cluster = &page.clusters[0];
        assert_eq!(cluster.commission, Cell::text("5"));
        assert_eq!(cluster.total_delegations[0].token.token_id, "0x01");
        assert_eq!(cluster.total_delegations[0].amount, "1000");
    }
}
