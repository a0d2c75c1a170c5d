pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod languages;
pub mod routes;
pub mod store;
pub mod web_server;
pub mod widget;

pub fn create_timestamp() -> String {
    use chrono::{SecondsFormat, Utc};
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
