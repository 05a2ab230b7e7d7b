// Filter selection over joined records
use super::measurement::JoinedRecord;
use serde::Serialize;
use std::collections::BTreeSet;

const PREFERRED_YEARS: [i32; 2] = [2023, 2024];
const DEFAULT_YEAR_COUNT: usize = 2;
const DEFAULT_POLLUTANT_COUNT: usize = 2;
const DEFAULT_STATION_COUNT: usize = 3;

/// Active selection. A record passes only if it matches in every dimension,
/// so an empty dimension lets nothing through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    pub years: BTreeSet<i32>,
    pub pollutants: BTreeSet<String>,
    pub stations: BTreeSet<String>,
}

impl FilterSet {
    pub fn new<Y, P, S>(years: Y, pollutants: P, stations: S) -> Self
    where
        Y: IntoIterator<Item = i32>,
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            years: years.into_iter().collect(),
            pollutants: pollutants.into_iter().map(Into::into).collect(),
            stations: stations.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, record: &JoinedRecord) -> bool {
        self.years.contains(&record.year)
            && self.pollutants.contains(&record.pollutant_name)
            && self.stations.contains(&record.station_name)
    }

    pub fn apply(&self, records: &[JoinedRecord]) -> Vec<JoinedRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn has_empty_dimension(&self) -> bool {
        self.years.is_empty() || self.pollutants.is_empty() || self.stations.is_empty()
    }
}

/// Distinct values available for selection, ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub pollutants: Vec<String>,
    pub stations: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[JoinedRecord]) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let pollutants: BTreeSet<&str> = records.iter().map(|r| r.pollutant_name.as_str()).collect();
        let stations: BTreeSet<&str> = records.iter().map(|r| r.station_name.as_str()).collect();

        Self {
            years: years.into_iter().collect(),
            pollutants: pollutants.into_iter().map(str::to_string).collect(),
            stations: stations.into_iter().map(str::to_string).collect(),
        }
    }

    /// Initial selection: 2023 and 2024 when both exist (otherwise the first
    /// two years), the first two pollutants and the first three stations.
    pub fn default_selection(&self) -> FilterSet {
        let years: Vec<i32> = if PREFERRED_YEARS.iter().all(|y| self.years.contains(y)) {
            PREFERRED_YEARS.to_vec()
        } else {
            self.years.iter().copied().take(DEFAULT_YEAR_COUNT).collect()
        };

        FilterSet::new(
            years,
            self.pollutants.iter().take(DEFAULT_POLLUTANT_COUNT).cloned(),
            self.stations.iter().take(DEFAULT_STATION_COUNT).cloned(),
        )
    }
}
