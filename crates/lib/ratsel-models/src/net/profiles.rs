use std::fmt;

use hashbrown::HashMap;
use log::error;
use serde::Deserialize;

use ratsel_core::bucket::TimeMS;
use ratsel_core::metrics::Bytes;

/// A radio access technology. Each RAT pairs with one access-point kind: DSRC for
/// vehicle-to-vehicle links, WiFi for roadside units and LTE for the base station.
#[derive(Deserialize, Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RatType {
    Dsrc,
    Wifi,
    Lte,
}

impl RatType {
    pub const ALL: [RatType; 3] = [RatType::Dsrc, RatType::Wifi, RatType::Lte];
}

impl fmt::Display for RatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatType::Dsrc => write!(f, "DSRC"),
            RatType::Wifi => write!(f, "WiFi"),
            RatType::Lte => write!(f, "LTE"),
        }
    }
}

/// The kind of access point terminating a link.
#[derive(Deserialize, Debug, Hash, Copy, Clone, PartialEq, Eq)]
pub enum AccessKind {
    BaseStation,
    Rsu,
    Peer,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::BaseStation => write!(f, "BaseStation"),
            AccessKind::Rsu => write!(f, "RSU"),
            AccessKind::Peer => write!(f, "Peer"),
        }
    }
}

/// V2X message categories, in decreasing priority order.
#[derive(Deserialize, Debug, Hash, Copy, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Safety,
    BasicCam,
    Traffic,
    Infotainment,
}

impl MessageKind {
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Safety,
        MessageKind::BasicCam,
        MessageKind::Traffic,
        MessageKind::Infotainment,
    ];
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Safety => write!(f, "Safety"),
            MessageKind::BasicCam => write!(f, "BasicCam"),
            MessageKind::Traffic => write!(f, "Traffic"),
            MessageKind::Infotainment => write!(f, "Infotainment"),
        }
    }
}

/// Static parameters of one RAT. Immutable after the catalog is validated.
#[derive(Deserialize, Debug, Clone)]
pub struct RadioProfile {
    pub rat: RatType,
    pub latency_ms: f64,
    pub base_loss_rate: f64,
    pub range: f64,
    pub bandwidth_mbps: f64,
    pub min_snr_db: f64,
    pub tx_power_dbm: f64,
    pub frequency_mhz: f64,
    pub preferred_messages: Vec<MessageKind>,
}

impl RadioProfile {
    pub fn prefers(&self, message: MessageKind) -> bool {
        self.preferred_messages.contains(&message)
    }
}

/// Static parameters of one message category. Immutable after validation.
#[derive(Deserialize, Debug, Clone)]
pub struct MessageProfile {
    pub kind: MessageKind,
    pub priority: u8,
    pub weight: f64,
    pub send_interval: TimeMS,
    pub size_bytes: Bytes,
    pub latency_requirement_ms: f64,
    pub reliability_requirement: f64,
}

/// Per-RAT parameter table, validated once at startup. Lookups after validation are
/// infallible, so a missing entry is a fatal configuration error here and nowhere
/// else.
#[derive(Debug, Clone)]
pub struct RadioCatalog {
    profiles: HashMap<RatType, RadioProfile>,
}

impl RadioCatalog {
    pub fn with_profiles(profiles: Vec<RadioProfile>) -> Self {
        let mut table: HashMap<RatType, RadioProfile> = HashMap::new();
        for profile in profiles.into_iter() {
            if table.insert(profile.rat, profile.clone()).is_some() {
                error!("Duplicate radio profile for {}", profile.rat);
                panic!("Duplicate radio profile for {}", profile.rat);
            }
        }
        for rat in RatType::ALL.iter() {
            if !table.contains_key(rat) {
                error!("Missing radio profile for {}", rat);
                panic!("Missing radio profile for {}", rat);
            }
        }
        Self { profiles: table }
    }

    pub fn profile_of(&self, rat: RatType) -> &RadioProfile {
        self.profiles
            .get(&rat)
            .expect("catalog validated at startup")
    }
}

/// Per-message-kind parameter table, validated once at startup.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    profiles: HashMap<MessageKind, MessageProfile>,
}

impl MessageCatalog {
    pub fn with_profiles(profiles: Vec<MessageProfile>) -> Self {
        let mut table: HashMap<MessageKind, MessageProfile> = HashMap::new();
        for profile in profiles.into_iter() {
            if table.insert(profile.kind, profile.clone()).is_some() {
                error!("Duplicate message profile for {}", profile.kind);
                panic!("Duplicate message profile for {}", profile.kind);
            }
        }
        for kind in MessageKind::ALL.iter() {
            if !table.contains_key(kind) {
                error!("Missing message profile for {}", kind);
                panic!("Missing message profile for {}", kind);
            }
        }
        Self { profiles: table }
    }

    pub fn profile_of(&self, kind: MessageKind) -> &MessageProfile {
        self.profiles
            .get(&kind)
            .expect("catalog validated at startup")
    }
}
