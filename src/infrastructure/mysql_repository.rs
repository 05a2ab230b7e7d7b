// MySQL repository implementation
use crate::application::measurement_repository::{LoadError, MeasurementRepository};
use crate::domain::measurement::{JoinedRecord, Measurement, Pollutant, Station};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

// Integer columns go through CAST(.. AS SIGNED) and decimals are multiplied
// by a float literal, so DECIMAL/TINYINT schemas decode as i64/f64 on MySQL
// 5.7 as well as 8.x (CAST(.. AS DOUBLE) needs 8.0.17).
const JOINED_MEASUREMENTS_QUERY: &str = r#"
SELECT
    CAST(m.measurement_id AS SIGNED) AS measurement_id,
    CAST(m.station_id AS SIGNED) AS station_id,
    CAST(m.pollutant_id AS SIGNED) AS pollutant_id,
    m.datetime AS datetime,
    m.concentration * 1E0 AS concentration,
    CAST(m.is_exceeded AS SIGNED) AS is_exceeded,
    s.name AS station_name,
    s.latitude * 1E0 AS latitude,
    s.longitude * 1E0 AS longitude,
    s.type AS station_type,
    p.name AS pollutant_name,
    p.code AS pollutant_code,
    p.pdk_max * 1E0 AS pdk_max,
    p.unit AS unit
FROM measurements m
JOIN stations s ON m.station_id = s.station_id
JOIN pollutants p ON m.pollutant_id = p.pollutant_id
ORDER BY m.datetime DESC
"#;

#[derive(Debug, sqlx::FromRow)]
struct MeasurementRow {
    measurement_id: i64,
    station_id: i64,
    pollutant_id: i64,
    datetime: NaiveDateTime,
    concentration: Option<f64>,
    is_exceeded: Option<i64>,
    station_name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    station_type: Option<String>,
    pollutant_name: String,
    pollutant_code: Option<String>,
    pdk_max: Option<f64>,
    unit: Option<String>,
}

impl MeasurementRow {
    /// Rows without a concentration carry nothing to aggregate
    fn into_record(self) -> Option<JoinedRecord> {
        let measurement = Measurement {
            id: self.measurement_id,
            timestamp: self.datetime,
            concentration: self.concentration?,
            is_exceeded: self.is_exceeded.unwrap_or(0) != 0,
            station_id: self.station_id,
            pollutant_id: self.pollutant_id,
        };
        let station = Station {
            id: self.station_id,
            name: self.station_name,
            latitude: self.latitude,
            longitude: self.longitude,
            station_type: self.station_type,
        };
        let pollutant = Pollutant {
            id: self.pollutant_id,
            name: self.pollutant_name,
            code: self.pollutant_code,
            pdk_max: self.pdk_max,
            unit: self.unit,
        };
        JoinedRecord::join(&measurement, &station, &pollutant)
    }
}

#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Connections are opened on first use, so an unreachable database does
    /// not stop the service from starting.
    pub fn connect_lazy(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }
}

impl From<sqlx::Error> for LoadError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => LoadError::Connection(e.to_string()),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => LoadError::Decode(e.to_string()),
            _ => LoadError::Query(e.to_string()),
        }
    }
}

#[async_trait]
impl MeasurementRepository for MySqlRepository {
    async fn load_joined_records(&self) -> Result<Vec<JoinedRecord>, LoadError> {
        tracing::debug!("Executing joined measurements query");
        let rows: Vec<MeasurementRow> = sqlx::query_as(JOINED_MEASUREMENTS_QUERY)
            .fetch_all(&self.pool)
            .await?;

        let total = rows.len();
        let records: Vec<JoinedRecord> = rows
            .into_iter()
            .filter_map(MeasurementRow::into_record)
            .collect();

        if records.len() < total {
            tracing::warn!(
                skipped = total - records.len(),
                "Skipped measurements without a concentration"
            );
        }

        Ok(records)
    }
}
