use std::path::PathBuf;

use serde::Deserialize;

use ratsel_core::bucket::TimeMS;
use ratsel_models::learn::agent::LearningSettings;
use ratsel_models::learn::reward::RewardSettings;
use ratsel_models::net::candidates::{AccessPoint, SelectionSettings};
use ratsel_models::net::profiles::{MessageProfile, RadioProfile};
use ratsel_models::net::quality::QualitySettings;
use ratsel_output::logger::LogSettings;
use ratsel_output::results::OutputSettings;

use crate::models::latency::LatencySettings;
use crate::models::message::MessageMixSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct BaseConfig {
    pub simulation_settings: SimSettings,
    pub field_settings: FieldSettings,
    pub log_settings: LogSettings,
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub quality_settings: QualitySettings,
    #[serde(default)]
    pub selection_settings: SelectionSettings,
    #[serde(default)]
    pub learning_settings: LearningSettings,
    #[serde(default)]
    pub reward_settings: RewardSettings,
    #[serde(default)]
    pub latency_settings: LatencySettings,
    #[serde(default)]
    pub message_mix: MessageMixSettings,
    pub radios: Vec<RadioProfile>,
    pub messages: Vec<MessageProfile>,
    pub access_points: Vec<AccessPoint>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimSettings {
    pub scenario: String,
    pub duration: TimeMS,
    pub step_size: TimeMS,
    pub seed: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FieldSettings {
    pub trace_file: String,
    #[serde(default)]
    pub nlos_fraction: f64,
}

pub struct BaseConfigReader {
    file_path: PathBuf,
}

impl BaseConfigReader {
    pub fn new(file_name: &str) -> Self {
        let file_path = PathBuf::from(file_name);
        Self { file_path }
    }

    pub fn parse(&self) -> Result<BaseConfig, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(&self.file_path)?;
        let config: BaseConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
