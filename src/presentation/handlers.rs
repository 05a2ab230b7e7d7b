// HTTP request handlers
use crate::application::aggregation::station_summaries;
use crate::application::dashboard_service::FilterRequest;
use crate::application::export::{MAP_DATA_PREFIX, export_filename, map_data_csv, records_csv};
use crate::infrastructure::http_response::{accepts_brotli, csv_download_response, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use chrono::Local;
use std::sync::Arc;

/// Dashboard query string.
///
/// A filter key takes a comma-separated list (`years=2023,2024`) and may also
/// repeat (`stations=A&stations=B`); both forms accumulate. A missing key
/// keeps the default selection; a key with only empty values (`stations=`)
/// selects nothing in that dimension.
#[derive(Debug, Default, PartialEq)]
pub struct DashboardQuery {
    pub filters: FilterRequest,
    pub pollutant: Option<String>,
}

fn list_items(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

impl DashboardQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = DashboardQuery::default();

        for (key, value) in pairs {
            match key.as_str() {
                "years" => {
                    let years = query.filters.years.get_or_insert_with(Vec::new);
                    for item in list_items(&value) {
                        match item.parse::<i32>() {
                            Ok(year) => years.push(year),
                            Err(_) => tracing::warn!("Ignoring invalid year filter: {}", item),
                        }
                    }
                }
                "pollutants" => query
                    .filters
                    .pollutants
                    .get_or_insert_with(Vec::new)
                    .extend(list_items(&value).map(String::from)),
                "stations" => query
                    .filters
                    .stations
                    .get_or_insert_with(Vec::new)
                    .extend(list_items(&value).map(String::from)),
                "pollutant" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        query.pollutant = Some(value.to_string());
                    }
                }
                _ => tracing::debug!("Ignoring query parameter {}", key),
            }
        }

        query
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Available filter values and the default selection
pub async fn list_filters(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let catalog = state.dashboard_service.filter_catalog().await;
    match json_response(&catalog, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Full dashboard view for the requested filters
pub async fn get_dashboard(
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let query = DashboardQuery::from_pairs(pairs);
    let view = state
        .dashboard_service
        .get_dashboard(&query.filters, query.pollutant)
        .await;

    match json_response(&view, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Per-station summary table as CSV
pub async fn export_map_data(
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let query = DashboardQuery::from_pairs(pairs);
    let summaries = match state.dashboard_service.filtered_records(&query.filters).await {
        Ok(records) => station_summaries(&records),
        Err(e) => {
            // Return an empty file on error
            tracing::error!("Error exporting map data: {}", e);
            Vec::new()
        }
    };

    let filename = export_filename(MAP_DATA_PREFIX, Local::now().date_naive());
    match map_data_csv(&summaries) {
        Ok(csv) => match csv_download_response(csv, &filename) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            tracing::error!("Error writing map data CSV: {}", e);
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// All filtered records as CSV
pub async fn export_records(
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let query = DashboardQuery::from_pairs(pairs);
    let records = state
        .dashboard_service
        .filtered_records(&query.filters)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Error exporting records: {}", e);
            Vec::new()
        });

    let filename = export_filename(&state.export_prefix, Local::now().date_naive());
    match records_csv(&records) {
        Ok(csv) => match csv_download_response(csv, &filename) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            tracing::error!("Error writing records CSV: {}", e);
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
