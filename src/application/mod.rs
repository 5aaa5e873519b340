// Application layer - Feed contracts and dashboard use cases
pub mod dashboard_service;
pub mod sensor_feed;
pub mod streaming_service;
