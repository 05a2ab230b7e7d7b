// Application layer - Use cases over the measurement store
pub mod aggregation;
pub mod dashboard_service;
pub mod dataset_cache;
pub mod export;
pub mod measurement_repository;
pub mod view;
