#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub historical_data_path: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}
