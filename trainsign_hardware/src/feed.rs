//! JSON body of the arrivals API.
//!
//! `{"data":[{"N":[{"route":"L","time":"..."}],"S":[...]}]}`. Only the first
//! `data` entry is used. A missing direction is an empty direction. Records
//! without `route` get an empty route; records without `time` are kept and
//! skipped only once their route matches the active line.

use serde::Deserialize;
use trainsign_traits::{RawArrival, StopArrivals};

use crate::error::{HwError, Result};

#[derive(Debug, Deserialize)]
struct Body {
    data: Vec<StopEntry>,
}

#[derive(Debug, Deserialize)]
struct StopEntry {
    #[serde(rename = "N", default)]
    north: Vec<Record>,
    #[serde(rename = "S", default)]
    south: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

impl From<Record> for RawArrival {
    fn from(r: Record) -> Self {
        RawArrival {
            route: r.route.unwrap_or_default(),
            time: r.time,
        }
    }
}

pub fn parse_body(body: &str) -> Result<StopArrivals> {
    let parsed: Body =
        serde_json::from_str(body).map_err(|e| HwError::Malformed(e.to_string()))?;
    let entry = parsed
        .data
        .into_iter()
        .next()
        .ok_or_else(|| HwError::Malformed("empty data array".into()))?;
    Ok(StopArrivals {
        north: entry.north.into_iter().map(RawArrival::from).collect(),
        south: entry.south.into_iter().map(RawArrival::from).collect(),
    })
}
