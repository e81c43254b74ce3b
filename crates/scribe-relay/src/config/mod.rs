mod logging_config;
#[allow(clippy::module_inception)]
mod config;
mod pages_config;
mod transport_config;

pub(crate) use {
    config::Config, logging_config::LoggingConfig, pages_config::PagesConfig,
    transport_config::TransportConfig,
};

pub(crate) const DEFAULT_START_URL: &str = "about:blank";
pub(crate) const DEFAULT_LOG_FILTER: &str = "scribe_relay=info,scribe_relay_core=info";

pub(crate) fn default_application_url() -> String {
    scribe_relay_core::APPLICATION_PAGE_URL.to_string()
}

pub(crate) fn default_start_url() -> String {
    DEFAULT_START_URL.to_string()
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
