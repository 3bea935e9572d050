use std::cmp::Ordering;

use clap::ValueEnum;
use serde::Deserialize;

use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

/// How a column's values compare against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Ranked by the composite POND-equivalent stake.
    Stake,
    Numeric,
    Text,
}

/// Table columns, numbered as exposed on the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Operator = 0,
    Network = 1,
    Address = 2,
    #[default]
    TotalStaked = 3,
    StakedPond = 4,
    StakedMpond = 5,
    Relayers = 6,
    Commission = 7,
    LatencyScore = 8,
    Tickets = 9,
    AprMpond = 10,
    AprPond = 11,
}

impl SortColumn {
    pub const ALL: [SortColumn; 12] = [
        SortColumn::Operator,
        SortColumn::Network,
        SortColumn::Address,
        SortColumn::TotalStaked,
        SortColumn::StakedPond,
        SortColumn::StakedMpond,
        SortColumn::Relayers,
        SortColumn::Commission,
        SortColumn::LatencyScore,
        SortColumn::Tickets,
        SortColumn::AprMpond,
        SortColumn::AprPond,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::TotalStaked | Self::StakedPond | Self::StakedMpond => ColumnKind::Stake,
            Self::Relayers
            | Self::Commission
            | Self::LatencyScore
            | Self::Tickets
            | Self::AprMpond
            | Self::AprPond => ColumnKind::Numeric,
            Self::Operator | Self::Network | Self::Address => ColumnKind::Text,
        }
    }
}

impl TryFrom<usize> for SortColumn {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value)
            .copied()
            .ok_or_else(|| Error::config(format!("column index {value} is out of range 0-11")))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // a column never mixes key kinds
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

fn numeric(record: &OperatorRecord, column: SortColumn, cell: &Cell) -> Result<SortKey, Error> {
    cell.as_f64().map(SortKey::Number).ok_or_else(|| {
        Error::parse(format!(
            "cannot sort operator {} by column {}: {cell:?} is not a number",
            record.address,
            column.index()
        ))
    })
}

fn sort_key(record: &OperatorRecord, column: SortColumn) -> Result<SortKey, Error> {
    let key = match column {
        SortColumn::TotalStaked | SortColumn::StakedPond | SortColumn::StakedMpond => {
            SortKey::Number(record.total_staked_pond_equivalent)
        }
        SortColumn::Relayers => numeric(record, column, &record.relayers)?,
        SortColumn::Commission => numeric(record, column, &record.commission)?,
        SortColumn::LatencyScore => numeric(record, column, &record.latency_score)?,
        SortColumn::Tickets => numeric(record, column, &record.tickets)?,
        SortColumn::AprMpond => SortKey::Number(record.apr_mpond),
        SortColumn::AprPond => SortKey::Number(record.apr_pond),
        SortColumn::Operator => SortKey::Text(record.operator_name.clone()),
        SortColumn::Network => SortKey::Text(record.network.to_string()),
        SortColumn::Address => SortKey::Text(record.address.clone()),
    };

    Ok(key)
}

/// Orders records by a column. Ties keep their incoming relative order in
/// either direction.
pub fn sort_records(
    records: Vec<OperatorRecord>,
    column: SortColumn,
    order: Order,
) -> Result<Vec<OperatorRecord>, Error> {
    let mut keyed = records
        .into_iter()
        .map(|x| sort_key(&x, column).map(|key| (key, x)))
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|(a, _), (b, _)| match order {
        Order::Asc => a.compare(b),
        Order::Desc => b.compare(a),
    });

    Ok(keyed.into_iter().map(|(_, x)| x).collect())
}
