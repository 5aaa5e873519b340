// Domain layer - Sensor snapshots, rules and view models
pub mod battery;
pub mod dashboard;
pub mod location;
pub mod network;
pub mod observed;
pub mod panel;
pub mod recommendation;
