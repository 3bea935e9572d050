use std::{cell::RefCell, collections::HashMap};

use serde_json::{json, Value};

use marlin_monitor::{
    client::Transport,
    monitor::{self, View, CLUSTER_INFO_URL, OPERATORS_URL, REWARDS_URL},
    prelude::*,
    render::{OutputFormat, HEADERS},
    resolver::{Endpoint, OPERATORS_PAGE_URL},
    sort::{Order, SortColumn},
    units::Token,
};

/// Serves canned documents; anything else is a connection failure.
#[derive(Default)]
struct Upstream {
    documents: HashMap<String, Value>,
    log: RefCell<Vec<String>>,
}

impl Upstream {
    fn serve(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    fn answer(&self, url: &str) -> Result<String, Error> {
        self.log.borrow_mut().push(url.to_string());

        self.documents
            .get(url)
            .map(|x| x.to_string())
            .ok_or_else(|| Error::transport(format!("connection to {url} refused")))
    }
}

impl Transport for Upstream {
    fn get(&self, url: &str) -> Result<String, Error> {
        self.answer(url)
    }

    fn post_json(&self, url: &str, _body: &Value) -> Result<String, Error> {
        self.answer(url)
    }
}

fn acme_upstream() -> Upstream {
    Upstream::default()
        .serve(REWARDS_URL, json!({"0xA": {"MPOND": 5, "POND": 10}}))
        .serve(
            CLUSTER_INFO_URL,
            json!({"0xA": {"network": "mainnet", "relayers": 2, "latencyScore": 1.1, "tickets": 3}}),
        )
        .serve(OPERATORS_URL, json!({"0xA": "Acme"}))
        .serve(
            Endpoint::fallback().as_str(),
            json!({"data": {"clusters": [{
                "id": "0xA",
                "commission": "5",
                "totalDelegations": [
                    {"token": {"tokenId": Token::POND_ID}, "amount": "2000000000000000000000"}
                ]
            }]}}),
        )
}

#[test]
fn acme_end_to_end() {
    let upstream = acme_upstream();

    let records = monitor::collect(&upstream).unwrap();
    assert_eq!(records.len(), 1);

    let acme = &records[0];
    assert_eq!(acme.operator_name, "Acme");
    assert_eq!(acme.staked_pond, 2000.0);
    assert_eq!(acme.staked_mpond, 0.0);
    assert_eq!(acme.total_staked_pond_equivalent, 2000.0);

    let output = monitor::run(&upstream, &View::default()).unwrap();

    let row = output
        .lines()
        .find(|x| x.contains("Acme"))
        .expect("acme row");

    let cells: Vec<_> = row.split('|').map(str::trim).collect();
    assert_eq!(cells[4], "2.00k POND");
    assert_eq!(cells[5], "2.00k POND");
    assert_eq!(cells[6], "0.000e+00 MPOND");
}

#[test]
fn scrape_failure_falls_back_and_run_continues() {
    let upstream = acme_upstream();

    monitor::run(&upstream, &View::default()).unwrap();

    let log = upstream.log.borrow();
    assert_eq!(log[0], OPERATORS_PAGE_URL);
    assert_eq!(log.last().unwrap(), Endpoint::fallback().as_str());
}

#[test]
fn sources_are_fetched_in_order() {
    let upstream = acme_upstream();

    monitor::fetch_sources(&upstream).unwrap();

    let log = upstream.log.borrow();
    assert_eq!(
        log[1..],
        [
            REWARDS_URL.to_string(),
            CLUSTER_INFO_URL.to_string(),
            OPERATORS_URL.to_string(),
            Endpoint::fallback().to_string(),
        ]
    );
}

#[test]
fn missing_source_aborts_the_run() {
    let upstream = Upstream::default()
        .serve(REWARDS_URL, json!({"0xA": {"MPOND": 5, "POND": 10}}))
        .serve(OPERATORS_URL, json!({"0xA": "Acme"}));

    let result = monitor::run(&upstream, &View::default());
    assert!(matches!(result, Err(Error::TransportError(_))));

    // nothing after the failed cluster info request
    assert_eq!(upstream.log.borrow().last().unwrap(), CLUSTER_INFO_URL);
}

#[test]
fn json_output_uses_header_keys() {
    let upstream = acme_upstream().serve(
        REWARDS_URL,
        json!({
            "0xA": {"MPOND": 5, "POND": 10},
            "0xB": {"MPOND": 1, "POND": 2},
        }),
    );

    let view = View {
        column: SortColumn::Address,
        order: Order::Asc,
        format: OutputFormat::Json,
    };

    let output = monitor::run(&upstream, &view).unwrap();
    let parsed: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&output).unwrap();

    assert_eq!(parsed.len(), 2);

    for object in parsed.iter() {
        let keys: Vec<_> = object.keys().map(|x| x.as_str()).collect();
        assert_eq!(keys, HEADERS.to_vec());
    }

    assert_eq!(parsed[0]["Operator"], "Acme");
    assert_eq!(parsed[1]["Operator"], "Unknown");
    assert_eq!(parsed[1]["Network"], "N/A");
    assert_eq!(parsed[1]["Fee (%)"], "N/A");
    assert_eq!(parsed[1]["Staked POND"], "0.00 POND");
}

#[test]
fn sorting_by_fee_with_unregistered_operator_fails() {
    let upstream = acme_upstream().serve(
        REWARDS_URL,
        json!({
            "0xA": {"MPOND": 5, "POND": 10},
            "0xB": {"MPOND": 1, "POND": 2},
        }),
    );

    let view = View {
        column: SortColumn::Commission,
        ..Default::default()
    };

    let result = monitor::run(&upstream, &view);
    assert!(matches!(result, Err(Error::ParseError(_))));
}
