use std::collections::HashMap;

use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::prelude::*;
use crate::units::{parse_amount, scale_amount, Token, MPOND_TO_POND};

pub const UNKNOWN_OPERATOR: &str = "Unknown";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Stake {
    pond: f64,
    mpond: f64,
}

impl Stake {
    fn total(&self) -> f64 {
        self.pond + self.mpond * MPOND_TO_POND
    }
}

/// Adds up the raw delegated amounts per recognized token, then scales them.
/// Every amount must parse, even those of tokens we don't track.
fn tally(delegation: &RawDelegation) -> Result<Stake, Error> {
    let mut pond = BigInt::default();
    let mut mpond = BigInt::default();

    for item in delegation.total_delegations.iter() {
        let amount = parse_amount(&item.amount).map_err(|_| {
            Error::parse(format!(
                "invalid delegation amount {:?} for cluster {}",
                item.amount, delegation.id
            ))
        })?;

        let Some(token) = Token::from_id(&item.token.token_id) else {
            trace!(cluster = %delegation.id, token = %item.token.token_id, "skipping unknown token");
            continue;
        };

        match token {
            Token::Pond => pond += amount,
            Token::MPond => mpond += amount,
        }
    }

    Ok(Stake {
        pond: scale_amount(&pond)?,
        mpond: scale_amount(&mpond)?,
    })
}

/// Joins every source into one record per rewarded address.
///
/// Only addresses present in `rewards` make it into the output, in the order
/// the rewards document lists them. Lookups in the other sources use the
/// address string verbatim.
pub fn reconcile(
    rewards: &Rewards,
    cluster_info: &ClusterInfo,
    operator_names: &OperatorNames,
    delegations: &[RawDelegation],
) -> Result<Vec<OperatorRecord>, Error> {
    let infos: HashMap<&str, _> = cluster_info.iter().map(|(k, v)| (k.as_str(), v)).collect();
    let names: HashMap<&str, _> = operator_names.iter().map(|(k, v)| (k.as_str(), v)).collect();
    let clusters: HashMap<&str, _> = delegations.iter().map(|x| (x.id.as_str(), x)).collect();

    let mut records = Vec::with_capacity(rewards.len());

    for (address, reward) in rewards.iter() {
        let info = infos.get(address.as_str()).copied().cloned().unwrap_or_default();

        let operator_name = names
            .get(address.as_str())
            .map(|x| x.to_string())
            .unwrap_or_else(|| UNKNOWN_OPERATOR.to_string());

        let (commission, stake) = match clusters.get(address.as_str()) {
            Some(cluster) => (cluster.commission.clone(), tally(cluster)?),
            None => (Cell::Missing, Stake::default()),
        };

        trace!(%address, pond = stake.pond, mpond = stake.mpond, "reconciled operator");

        records.push(OperatorRecord {
            operator_name,
            network: info.network,
            address: address.clone(),
            total_staked_pond_equivalent: stake.total(),
            staked_pond: stake.pond,
            staked_mpond: stake.mpond,
            relayers: info.relayers,
            commission,
            latency_score: info.latency_score,
            tickets: info.tickets,
            apr_mpond: reward.mpond,
            apr_pond: reward.pond,
        });
    }

    debug!(
        operators = records.len(),
        clusters = delegations.len(),
        "reconciled sources"
    );

    Ok(records)
}
