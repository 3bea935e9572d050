//! One fetch, reconcile, sort and render pass over the upstream sources.

use serde_json::json;
use tracing::{debug, info};

use crate::client::{fetch_graphql, fetch_json, Transport};
use crate::prelude::*;
use crate::reconcile::reconcile;
use crate::render::{render, OutputFormat};
use crate::resolver::resolve_graphql_endpoint;
use crate::sort::{sort_records, Order, SortColumn};

pub const REWARDS_URL: &str = "https://sk.arb1.marlin.org/getExpectedReward";

pub const CLUSTER_INFO_URL: &str = "https://sk.arb1.marlin.org/getClusterInfo";

pub const OPERATORS_URL: &str = "https://sk.arb1.marlin.org/getVerifiedOperators";

pub const CLUSTERS_QUERY: &str = r#"
query getCluster($pageSize: Int, $pageNo: Int) {
    clusters(where: {status: "REGISTERED"}, first: $pageSize, skip: $pageNo) {
        id
        commission
        totalDelegations {
            token {
                tokenId
            }
            amount
        }
    }
}
"#;

pub const PAGE_SIZE: u32 = 1000;

/// Sorting and output choices for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub column: SortColumn,
    pub order: Order,
    pub format: OutputFormat,
}

/// The raw documents as served by each source.
#[derive(Debug, Default, Clone)]
pub struct Sources {
    pub rewards: Rewards,
    pub cluster_info: ClusterInfo,
    pub operator_names: OperatorNames,
    pub clusters: Vec<RawDelegation>,
}

/// Fetches every source in order, stopping at the first failure.
pub fn fetch_sources(transport: &impl Transport) -> Result<Sources, Error> {
    let endpoint = resolve_graphql_endpoint(transport);

    let rewards: Rewards = fetch_json(transport, REWARDS_URL)?;
    let cluster_info: ClusterInfo = fetch_json(transport, CLUSTER_INFO_URL)?;
    let operator_names: OperatorNames = fetch_json(transport, OPERATORS_URL)?;

    let page: ClusterPage = fetch_graphql(
        transport,
        CLUSTERS_QUERY,
        json!({ "pageSize": PAGE_SIZE, "pageNo": 0 }),
        endpoint.as_str(),
    )?;

    debug!(
        rewards = rewards.len(),
        cluster_info = cluster_info.len(),
        operators = operator_names.len(),
        clusters = page.clusters.len(),
        "fetched sources"
    );

    Ok(Sources {
        rewards,
        cluster_info,
        operator_names,
        clusters: page.clusters,
    })
}

pub fn collect(transport: &impl Transport) -> Result<Vec<OperatorRecord>, Error> {
    let sources = fetch_sources(transport)?;

    reconcile(
        &sources.rewards,
        &sources.cluster_info,
        &sources.operator_names,
        &sources.clusters,
    )
}

/// Runs the whole pipeline and returns the rendered output.
pub fn run(transport: &impl Transport, view: &View) -> Result<String, Error> {
    let records = collect(transport)?;
    let records = sort_records(records, view.column, view.order)?;

    info!(
        operators = records.len(),
        column = view.column.index(),
        order = ?view.order,
        format = ?view.format,
        "rendering operators"
    );

    render(&records, view.format)
}
