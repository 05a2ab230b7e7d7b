// Measurement domain models
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single sensor reading as stored in the `measurements` table
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub concentration: f64,
    pub is_exceeded: bool,
    pub station_id: i64,
    pub pollutant_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub station_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pollutant {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    /// Regulatory limit (PDK), mg/m³
    pub pdk_max: Option<f64>,
    pub unit: Option<String>,
}

/// Denormalized measurement + station + pollutant row.
///
/// `year`, `month` and `date` are always derived from `timestamp`; use
/// [`JoinedRecord::new`] or [`JoinedRecord::join`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub measurement_id: i64,
    pub timestamp: NaiveDateTime,
    pub concentration: f64,
    pub is_exceeded: bool,
    pub station_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub station_type: Option<String>,
    pub pollutant_name: String,
    pub pollutant_code: Option<String>,
    pub pdk_max: Option<f64>,
    pub unit: Option<String>,
    pub year: i32,
    pub month: u32,
    pub date: NaiveDate,
}

impl JoinedRecord {
    pub fn new(
        measurement_id: i64,
        timestamp: NaiveDateTime,
        concentration: f64,
        is_exceeded: bool,
        station_name: String,
        pollutant_name: String,
    ) -> Self {
        Self {
            measurement_id,
            timestamp,
            concentration,
            is_exceeded,
            station_name,
            latitude: None,
            longitude: None,
            station_type: None,
            pollutant_name,
            pollutant_code: None,
            pdk_max: None,
            unit: None,
            year: timestamp.year(),
            month: timestamp.month(),
            date: timestamp.date(),
        }
    }

    /// Join a measurement with its station and pollutant.
    ///
    /// Returns `None` when the measurement does not reference them.
    pub fn join(measurement: &Measurement, station: &Station, pollutant: &Pollutant) -> Option<Self> {
        if measurement.station_id != station.id || measurement.pollutant_id != pollutant.id {
            return None;
        }
        let record = Self::new(
            measurement.id,
            measurement.timestamp,
            measurement.concentration,
            measurement.is_exceeded,
            station.name.clone(),
            pollutant.name.clone(),
        )
        .with_station(station.latitude, station.longitude, station.station_type.clone())
        .with_pollutant(
            pollutant.code.clone(),
            pollutant.pdk_max,
            pollutant.unit.clone(),
        );
        Some(record)
    }

    pub fn with_station(
        mut self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        station_type: Option<String>,
    ) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self.station_type = station_type;
        self
    }

    pub fn with_pollutant(
        mut self,
        code: Option<String>,
        pdk_max: Option<f64>,
        unit: Option<String>,
    ) -> Self {
        self.pollutant_code = code;
        self.pdk_max = pdk_max;
        self.unit = unit;
        self
    }

    /// Station coordinates, if both are present and finite
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}
