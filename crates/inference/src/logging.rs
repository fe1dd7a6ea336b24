use crate::config::ClassifierConfig;

pub fn setup_logging(config: &ClassifierConfig) {
    common::setup_logging(config.environment, &config.log_level);
}
