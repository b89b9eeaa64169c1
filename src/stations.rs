//! Station identifiers and the column layout of the passenger files.

use serde::Serialize;
use std::fmt;

/// Stations of the sample network, in the order their count columns appear.
pub static STATIONS: &[&str] = &[
    "Amstel",
    "Amstelveenseweg",
    "Buikslotermeer",
    "Centraal",
    "Dam",
    "Evertsenstraat",
    "Floradorp",
    "Haarlemmermeerstation",
    "Hasseltweg",
    "Hendrikkade",
    "Leidseplein",
    "Lelylaan",
    "Muiderpoort",
    "Museumplein",
    "RAI",
    "SciencePark",
    "Sloterdijk",
    "Surinameplein",
    "UvA",
    "VU",
    "Waterlooplein",
    "Weesperplein",
    "Wibautstraat",
    "Zuid",
];

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Station(String);

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Station {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Destination columns expected after `TIME` and `FROM` in every row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StationLayout {
    columns: Vec<Station>,
}

impl StationLayout {
    pub fn new(columns: Vec<Station>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Station] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for StationLayout {
    fn default() -> Self {
        Self::new(STATIONS.iter().copied().map(Station::from).collect())
    }
}
