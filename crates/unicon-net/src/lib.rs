// HTTP layer: REST API client, health probing, and the connectivity monitor.

pub mod api;
pub mod health;
pub mod monitor;

mod error;

pub use api::ApiClient;
pub use error::NetError;
pub use health::probe;
pub use monitor::{spawn_monitor, MonitorCommand, MonitorConfig, MonitorNotification};
