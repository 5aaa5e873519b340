// Infrastructure layer - Platform adapters and HTTP plumbing
pub mod chunked_json;
pub mod config;
pub mod http_geolocation;
pub mod http_response;
pub mod sysfs_battery;
pub mod sysfs_network;
pub mod viewport;
