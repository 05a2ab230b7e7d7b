// Dashboard service - Use case for building dashboard views
use crate::application::dataset_cache::{Clock, DatasetCache};
use crate::application::measurement_repository::{LoadError, MeasurementRepository};
use crate::application::view::{ViewOptions, compute_view};
use crate::domain::dashboard::{DashboardView, DataStatus, Notice};
use crate::domain::filter::{FilterOptions, FilterSet};
use crate::domain::measurement::JoinedRecord;
use chrono::Duration;
use std::sync::Arc;
use std::time::Instant;

/// Filter selection as requested by a client; `None` means "use the default"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub years: Option<Vec<i32>>,
    pub pollutants: Option<Vec<String>>,
    pub stations: Option<Vec<String>>,
}

impl FilterRequest {
    pub fn resolve(&self, options: &FilterOptions) -> FilterSet {
        let defaults = options.default_selection();
        FilterSet {
            years: match &self.years {
                Some(years) => years.iter().copied().collect(),
                None => defaults.years,
            },
            pollutants: match &self.pollutants {
                Some(pollutants) => pollutants.iter().cloned().collect(),
                None => defaults.pollutants,
            },
            stations: match &self.stations {
                Some(stations) => stations.iter().cloned().collect(),
                None => defaults.stations,
            },
        }
    }
}

/// Filter options together with the default selection
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FilterCatalog {
    pub options: FilterOptions,
    pub defaults: FilterSet,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn MeasurementRepository>,
    cache: Arc<DatasetCache<Vec<JoinedRecord>>>,
    recent_limit: usize,
    ring_points: usize,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn MeasurementRepository>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
        recent_limit: usize,
        ring_points: usize,
    ) -> Self {
        Self {
            repository,
            cache: Arc::new(DatasetCache::new(cache_ttl, clock)),
            recent_limit,
            ring_points,
        }
    }

    /// Loaded records, served from the cache while it is fresh
    pub async fn records(&self) -> Result<Arc<Vec<JoinedRecord>>, LoadError> {
        let repository = self.repository.clone();
        self.cache
            .get_or_load(|| async move {
                let start = Instant::now();
                let records = repository.load_joined_records().await?;
                tracing::info!(
                    rows = records.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Loaded measurement data"
                );
                Ok::<_, LoadError>(records)
            })
            .await
            .inspect_err(|e| tracing::error!("Error loading measurement data: {}", e))
    }

    pub async fn filter_catalog(&self) -> FilterCatalog {
        let options = match self.records().await {
            Ok(records) => FilterOptions::from_records(&records),
            Err(_) => FilterOptions::default(),
        };
        let defaults = options.default_selection();
        FilterCatalog { options, defaults }
    }

    pub async fn get_dashboard(
        &self,
        request: &FilterRequest,
        trend_pollutant: Option<String>,
    ) -> DashboardView {
        let records = match self.records().await {
            Ok(records) => records,
            Err(e) => {
                return DashboardView::empty(
                    DataStatus::Unavailable {
                        reason: e.to_string(),
                    },
                    FilterSet::default(),
                    Notice::warning(format!("Failed to load data: {}", e)),
                );
            }
        };

        let filters = request.resolve(&FilterOptions::from_records(&records));
        let options = ViewOptions {
            trend_pollutant,
            recent_limit: self.recent_limit,
            ring_points: self.ring_points,
        };

        let view = compute_view(&records, &filters, &options);
        if view.status != DataStatus::Ready {
            tracing::warn!(status = ?view.status, "Dashboard has nothing to show");
        }
        view
    }

    /// Records passing the requested filters, for export.
    pub async fn filtered_records(
        &self,
        request: &FilterRequest,
    ) -> Result<Vec<JoinedRecord>, LoadError> {
        let records = self.records().await?;
        let filters = request.resolve(&FilterOptions::from_records(&records));
        Ok(filters.apply(&records))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::dataset_cache::tests::ManualClock;
    use crate::application::view::tests::synthetic_records;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Repository returning a fixed result and counting loads
    pub struct StubRepository {
        result: fn() -> Result<Vec<JoinedRecord>, LoadError>,
        calls: AtomicUsize,
    }

    impl StubRepository {
        pub fn new(result: fn() -> Result<Vec<JoinedRecord>, LoadError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MeasurementRepository for StubRepository {
        async fn load_joined_records(&self) -> Result<Vec<JoinedRecord>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn service(repository: Arc<StubRepository>, clock: Arc<ManualClock>) -> DashboardService {
        DashboardService::new(repository, clock, Duration::seconds(3600), 15, 50)
    }

    #[tokio::test]
    async fn test_default_filters_applied() {
        let repository = StubRepository::new(|| Ok(synthetic_records()));
        let service = service(repository, Arc::new(ManualClock::new()));

        let view = service.get_dashboard(&FilterRequest::default(), None).await;
        assert_eq!(view.status, DataStatus::Ready);
        assert_eq!(view.filters.years.len(), 2);
        assert_eq!(view.filters.pollutants.len(), 2);
        assert_eq!(view.filters.stations.len(), 3);
        assert_eq!(view.overview.measurement_count, 24);
    }

    #[tokio::test]
    async fn test_explicit_empty_dimension() {
        let repository = StubRepository::new(|| Ok(synthetic_records()));
        let service = service(repository, Arc::new(ManualClock::new()));

        let request = FilterRequest {
            stations: Some(Vec::new()),
            ..FilterRequest::default()
        };
        let view = service.get_dashboard(&request, None).await;
        assert_eq!(view.status, DataStatus::EmptySelection);
        assert!(service.filtered_records(&request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_notice() {
        let repository = StubRepository::new(|| Err(LoadError::Connection("refused".into())));
        let service = service(repository.clone(), Arc::new(ManualClock::new()));

        let view = service.get_dashboard(&FilterRequest::default(), None).await;
        assert!(matches!(view.status, DataStatus::Unavailable { .. }));
        assert_eq!(view.notices.len(), 1);
        assert!(view.map.is_none());

        // not cached: the next request queries again
        let catalog = service.filter_catalog().await;
        assert!(catalog.options.years.is_empty());
        assert_eq!(repository.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_source_is_no_data() {
        let repository = StubRepository::new(|| Ok(Vec::new()));
        let service = service(repository, Arc::new(ManualClock::new()));

        let view = service.get_dashboard(&FilterRequest::default(), None).await;
        assert_eq!(view.status, DataStatus::NoData);
    }

    #[tokio::test]
    async fn test_load_cached_for_ttl() {
        let repository = StubRepository::new(|| Ok(synthetic_records()));
        let clock = Arc::new(ManualClock::new());
        let service = service(repository.clone(), clock.clone());

        service.get_dashboard(&FilterRequest::default(), None).await;
        service.filter_catalog().await;
        assert_eq!(repository.calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::seconds(3600));
        service.filter_catalog().await;
        assert_eq!(repository.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolve_request() {
        let options = FilterOptions::from_records(&synthetic_records());
        let request = FilterRequest {
            years: Some(vec![2024]),
            pollutants: None,
            stations: Some(vec!["Post 2".into()]),
        };
        let filters = request.resolve(&options);
        assert_eq!(filters, FilterSet::new([2024], ["NO2", "SO2"], ["Post 2"]));
    }
}
