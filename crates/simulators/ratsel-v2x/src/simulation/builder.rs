use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;

use ratsel_core::agent::{NodeId, NodeKind, NodeOrder};
use ratsel_core::scheduler::TickScheduler;
use ratsel_input::mobility::{TraceMap, TraceReader};
use ratsel_models::dist::UnitSampler;
use ratsel_models::learn::agent::QLearner;
use ratsel_models::learn::reward::RewardCalculator;
use ratsel_models::net::candidates::CandidateEnumerator;
use ratsel_models::net::profiles::{MessageCatalog, RadioCatalog};
use ratsel_models::net::quality::LinkQuality;
use ratsel_output::logger::initiate_logger;
use ratsel_output::results::Results;

use crate::models::latency::LatencyModel;
use crate::models::message::MessageMix;
use crate::simulation::config::{BaseConfig, BaseConfigReader};
use crate::v2x::bucket::{BucketModels, RoadBucket};
use crate::v2x::device::{Vehicle, VehicleInfo};

pub type RatScheduler = TickScheduler<Vehicle, RoadBucket>;

pub struct SimulationBuilder {
    base_config: BaseConfig,
    config_path: PathBuf,
}

impl SimulationBuilder {
    pub fn new(base_config_file: &str) -> Self {
        if !Path::new(base_config_file).exists() {
            panic!("Configuration file is not found.");
        }
        let config_path = Path::new(base_config_file)
            .parent()
            .unwrap_or_else(|| panic!("Invalid directory for the configuration file"))
            .to_path_buf();
        let config_reader = BaseConfigReader::new(base_config_file);
        match config_reader.parse() {
            Ok(base_config) => Self {
                base_config,
                config_path,
            },
            Err(e) => panic!("Error while parsing the base configuration file: {}", e),
        }
    }

    pub fn build(&mut self) -> RatScheduler {
        initiate_logger(&self.config_path, &self.base_config.log_settings);
        info!(
            "Building scenario {}",
            self.base_config.simulation_settings.scenario
        );

        let traces = self.read_traces();
        let vehicles = self.build_vehicles(&traces);
        let bucket = self.build_bucket(traces);
        TickScheduler::builder()
            .bucket(bucket)
            .nodes(vehicles)
            .duration(self.base_config.simulation_settings.duration)
            .step_size(self.base_config.simulation_settings.step_size)
            .output_interval(self.base_config.output_settings.output_interval)
            .build()
    }

    fn read_traces(&self) -> TraceMap {
        let trace_file = self
            .config_path
            .join(&self.base_config.field_settings.trace_file);
        if !trace_file.exists() {
            panic!("Trace file {} is not found.", trace_file.display());
        }
        TraceReader::builder()
            .trace_file(trace_file)
            .build()
            .fetch_traces()
    }

    fn build_vehicles(&self, traces: &TraceMap) -> IndexMap<NodeId, Vehicle> {
        let mut vehicle_ids: Vec<NodeId> = traces
            .values()
            .flat_map(|states| states.keys().copied())
            .collect();
        vehicle_ids.sort();
        vehicle_ids.dedup();
        info!("Building {} vehicles from the trace", vehicle_ids.len());

        let mut vehicles = IndexMap::with_capacity(vehicle_ids.len());
        for (order, vehicle_id) in vehicle_ids.into_iter().enumerate() {
            let vehicle = Vehicle::builder()
                .vehicle_info(
                    VehicleInfo::builder()
                        .id(vehicle_id)
                        .kind(NodeKind::Vehicle)
                        .order(NodeOrder::from(order as u32))
                        .build(),
                )
                .learner(QLearner::with_settings(
                    self.base_config.learning_settings,
                ))
                .build();
            vehicles.insert(vehicle_id, vehicle);
        }
        vehicles
    }

    fn build_bucket(&self, traces: TraceMap) -> RoadBucket {
        let seed = self.base_config.simulation_settings.seed;
        let radio_catalog = RadioCatalog::with_profiles(self.base_config.radios.clone());
        let message_catalog = MessageCatalog::with_profiles(self.base_config.messages.clone());
        let quality = LinkQuality::with_settings(self.base_config.quality_settings);
        let enumerator = CandidateEnumerator::new(
            self.base_config.selection_settings,
            quality,
            radio_catalog.clone(),
        );
        let models = BucketModels::builder()
            .radio_catalog(radio_catalog)
            .message_catalog(message_catalog)
            .enumerator(enumerator)
            .latency(LatencyModel::with_settings(
                self.base_config.latency_settings,
                seed,
            ))
            .mix(MessageMix::with_settings(self.base_config.message_mix))
            .reward(RewardCalculator::with_settings(
                self.base_config.reward_settings,
            ))
            .results(Results::new(&self.base_config.output_settings))
            .mix_sampler(UnitSampler::new(seed.wrapping_add(1)))
            .loss_sampler(UnitSampler::new(seed.wrapping_add(2)))
            .decision_sampler(UnitSampler::new(seed.wrapping_add(3)))
            .sight_sampler(UnitSampler::new(seed.wrapping_add(4)))
            .build();
        RoadBucket::builder()
            .models(models)
            .infrastructure(self.base_config.access_points.clone())
            .traces(traces)
            .nlos_fraction(self.base_config.field_settings.nlos_fraction)
            .build()
    }
}
