// Dashboard view model handed to the presentation layer
use super::filter::{FilterOptions, FilterSet};
use super::severity::TierStyle;
use super::summary::{
    MapStats, OverviewStats, PivotMatrix, PollutantTrend, RankingEntry, RecentMeasurement,
    SampleInfo, StationMarker, StationPollutantSummary, YearlySummary,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DataStatus {
    Ready,
    /// Filters matched no records
    EmptySelection,
    /// The data source answered with zero rows
    NoData,
    /// The data source could not be queried
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub markers: Vec<StationMarker>,
    pub stats: MapStats,
    pub legend: Vec<TierStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub trend: Option<PollutantTrend>,
    pub yearly: Vec<YearlySummary>,
    pub station_pollutants: Vec<StationPollutantSummary>,
    pub heatmap: PivotMatrix,
    pub ranking: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub status: DataStatus,
    pub options: FilterOptions,
    pub filters: FilterSet,
    pub overview: OverviewStats,
    pub sample: Option<SampleInfo>,
    pub map: Option<MapView>,
    pub analysis: Option<AnalysisView>,
    pub recent: Vec<RecentMeasurement>,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    /// A view with no sections, used when nothing could be loaded
    pub fn empty(status: DataStatus, filters: FilterSet, notice: Notice) -> Self {
        Self {
            status,
            options: FilterOptions::default(),
            filters,
            overview: OverviewStats::default(),
            sample: None,
            map: None,
            analysis: None,
            recent: Vec::new(),
            notices: vec![notice],
        }
    }
}
