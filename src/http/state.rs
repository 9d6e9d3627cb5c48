use crate::config::Config;
use crate::services::DocumentProducer;
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub producer: Arc<DocumentProducer>,
    pub start_time: SystemTime,
}

impl AppState {
    pub fn new(config: Arc<Config>, producer: DocumentProducer) -> Self {
        Self {
            config,
            producer: Arc::new(producer),
            start_time: SystemTime::now(),
        }
    }
}
