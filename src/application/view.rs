// View composition - pure mapping from records and filters to a dashboard
use crate::application::aggregation;
use crate::domain::dashboard::{AnalysisView, DashboardView, DataStatus, MapView, Notice};
use crate::domain::filter::{FilterOptions, FilterSet};
use crate::domain::geometry::{DEFAULT_RING_POINTS, ImpactZone};
use crate::domain::measurement::JoinedRecord;
use crate::domain::severity::SeverityTier;
use crate::domain::summary::StationMarker;

const DEFAULT_RECENT_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    /// Pollutant for the time-series section; defaults to the first selected
    pub trend_pollutant: Option<String>,
    pub recent_limit: usize,
    pub ring_points: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            trend_pollutant: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
            ring_points: DEFAULT_RING_POINTS,
        }
    }
}

pub fn compute_view(
    records: &[JoinedRecord],
    filters: &FilterSet,
    options: &ViewOptions,
) -> DashboardView {
    let filter_options = FilterOptions::from_records(records);

    if records.is_empty() {
        return DashboardView {
            options: filter_options,
            ..DashboardView::empty(
                DataStatus::NoData,
                filters.clone(),
                Notice::warning("No measurements were loaded. Check the database connection."),
            )
        };
    }

    let filtered = filters.apply(records);
    let overview = aggregation::overview(&filtered);

    if filtered.is_empty() {
        tracing::debug!(?filters, "Filters matched no records");
        let notice = if filters.has_empty_dimension() {
            Notice::info("Select at least one year, pollutant and station to analyse the data.")
        } else {
            Notice::info("No data for the selected filters. Change the filter settings.")
        };
        return DashboardView {
            options: filter_options,
            overview,
            ..DashboardView::empty(DataStatus::EmptySelection, filters.clone(), notice)
        };
    }

    let mut notices = Vec::new();

    let map = build_map(&filtered, options.ring_points);
    if map.is_none() {
        notices.push(Notice::warning(
            "No stations with valid coordinates to show on the map.",
        ));
    }

    let analysis = build_analysis(&filtered, filters, options, &mut notices);

    DashboardView {
        status: DataStatus::Ready,
        options: filter_options,
        filters: filters.clone(),
        overview,
        sample: aggregation::sample_info(&filtered),
        map,
        analysis: Some(analysis),
        recent: aggregation::recent_measurements(&filtered, options.recent_limit),
        notices,
    }
}

fn build_map(filtered: &[JoinedRecord], ring_points: usize) -> Option<MapView> {
    let summaries = aggregation::station_summaries(filtered);
    let stats = aggregation::map_stats(&summaries)?;

    let markers = summaries
        .into_iter()
        .map(|summary| {
            let zone = ImpactZone::around(
                summary.latitude,
                summary.longitude,
                summary.mean_concentration,
                ring_points,
            );
            StationMarker { summary, zone }
        })
        .collect();

    Some(MapView {
        markers,
        stats,
        legend: SeverityTier::legend(),
    })
}

fn build_analysis(
    filtered: &[JoinedRecord],
    filters: &FilterSet,
    options: &ViewOptions,
    notices: &mut Vec<Notice>,
) -> AnalysisView {
    let trend_pollutant = options
        .trend_pollutant
        .clone()
        .or_else(|| filters.pollutants.iter().next().cloned());

    let trend = trend_pollutant.and_then(|pollutant| {
        let trend = aggregation::pollutant_trend(filtered, &pollutant);
        if trend.is_none() {
            notices.push(Notice::warning(format!(
                "No data for the selected pollutant {}",
                pollutant
            )));
        }
        trend
    });

    let station_pollutants = aggregation::station_pollutant_summaries(filtered);
    let heatmap = aggregation::pivot_means(&station_pollutants);

    AnalysisView {
        trend,
        yearly: aggregation::yearly_summaries(filtered),
        station_pollutants,
        heatmap,
        ranking: aggregation::station_ranking(filtered),
    }
}
