// Aggregated views derived from filtered records
use super::geometry::ImpactZone;
use super::severity::SeverityTier;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One station on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    /// 1-based marker label, in station order
    pub number: usize,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_concentration: f64,
    pub exceedance_count: u64,
    pub tier: SeverityTier,
    pub zone_radius_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    #[serde(flatten)]
    pub summary: StationSummary,
    pub zone: ImpactZone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    pub pollutant_name: String,
    pub mean_concentration: f64,
    pub max_concentration: f64,
    pub measurement_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPollutantSummary {
    pub station_name: String,
    pub pollutant_name: String,
    pub mean_concentration: f64,
    pub max_concentration: f64,
    pub measurement_count: u64,
    pub exceedance_count: u64,
}

/// Mean concentration per station (rows) and pollutant (columns).
///
/// Pairs without measurements hold `0.0` in `values`; `measured` tells them
/// apart from a real mean of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotMatrix {
    pub stations: Vec<String>,
    pub pollutants: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub measured: Vec<Vec<bool>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub station_name: String,
    pub mean_concentration: f64,
    pub tier: SeverityTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub station_name: String,
    pub concentration: f64,
}

/// Daily means for one pollutant with its reference lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantTrend {
    pub pollutant_name: String,
    pub points: Vec<TimeSeriesPoint>,
    pub pdk_max: Option<f64>,
    pub mean_concentration: f64,
    pub max_concentration: f64,
    /// Percent of records over the PDK
    pub exceedance_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewStats {
    pub measurement_count: usize,
    pub station_count: usize,
    pub pollutant_count: usize,
    pub exceedance_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStats {
    pub center_lat: f64,
    pub center_lon: f64,
    pub min_concentration: f64,
    pub max_concentration: f64,
    pub mean_zone_radius_m: f64,
    pub max_zone_radius_m: f64,
    pub high_station_count: usize,
    pub exceedance_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantMean {
    pub pollutant_name: String,
    pub mean_concentration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInfo {
    pub record_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub top_pollutants: Vec<PollutantMean>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentMeasurement {
    pub timestamp: NaiveDateTime,
    pub station_name: String,
    pub pollutant_name: String,
    pub concentration: f64,
    pub unit: Option<String>,
    pub is_exceeded: bool,
}
