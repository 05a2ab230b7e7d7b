// Domain layer - Air-quality records, classification and geometry
pub mod dashboard;
pub mod filter;
pub mod geometry;
pub mod measurement;
pub mod severity;
pub mod summary;
