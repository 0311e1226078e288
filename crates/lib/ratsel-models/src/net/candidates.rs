use serde::Deserialize;
use typed_builder::TypedBuilder;

use ratsel_core::agent::NodeId;

use crate::mobility::Point3;
use crate::net::profiles::{AccessKind, MessageProfile, RadioCatalog, RatType};
use crate::net::quality::LinkQuality;

/// A reachable link endpoint: a peer vehicle, an RSU or the base station.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AccessPoint {
    pub id: NodeId,
    pub kind: AccessKind,
    pub rat: RatType,
    pub position: Point3,
}

/// One scored link option for a pending transmission.
#[derive(TypedBuilder, Debug, Clone, Copy)]
pub struct Candidate {
    pub rat: RatType,
    pub access: AccessKind,
    pub target: NodeId,
    pub distance: f64,
    pub snr: f64,
    pub loss_rate: f64,
    pub score: f64,
    pub viable: bool,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct SelectionSettings {
    #[serde(default = "default_discovery_radius")]
    pub discovery_radius: f64,
    #[serde(default = "default_snr_slack")]
    pub snr_slack_db: f64,
    #[serde(default = "default_loss_slack")]
    pub loss_slack: f64,
}

fn default_discovery_radius() -> f64 {
    100.0
}

fn default_snr_slack() -> f64 {
    3.0
}

fn default_loss_slack() -> f64 {
    1.5
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            discovery_radius: default_discovery_radius(),
            snr_slack_db: default_snr_slack(),
            loss_slack: default_loss_slack(),
        }
    }
}

/// Builds the scored candidate list a sender can pick a link from. Infrastructure
/// access points plus peers inside the discovery radius, each evaluated through
/// the link-quality model against the RAT it serves.
#[derive(Debug, Clone)]
pub struct CandidateEnumerator {
    settings: SelectionSettings,
    quality: LinkQuality,
    catalog: RadioCatalog,
}

impl CandidateEnumerator {
    pub fn new(settings: SelectionSettings, quality: LinkQuality, catalog: RadioCatalog) -> Self {
        Self {
            settings,
            quality,
            catalog,
        }
    }

    /// All reachable candidates, scored and flagged for viability against the
    /// message's reliability requirement, sorted nearest-first. Infrastructure is
    /// always listed; only peers are subject to the discovery radius. Links beyond
    /// the RAT's range surface through a loss rate of 1.
    pub fn enumerate(
        &self,
        sender: Point3,
        access_points: &[AccessPoint],
        message: &MessageProfile,
        line_of_sight: bool,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(access_points.len());
        for point in access_points.iter() {
            let distance = sender.distance_to(&point.position);
            if point.kind == AccessKind::Peer && distance > self.settings.discovery_radius {
                continue;
            }
            let profile = self.catalog.profile_of(point.rat);
            let snr = self.quality.snr(
                distance,
                profile.tx_power_dbm,
                profile.frequency_mhz,
                line_of_sight,
            );
            let loss_rate = self.quality.loss_rate(snr, distance, profile);
            let snr_part = (snr / 30.0 * 100.0).min(100.0);
            let loss_part = (1.0 - loss_rate) * 100.0;
            let latency_part = (100.0 - profile.latency_ms).max(0.0);
            let bandwidth_part = (profile.bandwidth_mbps / 100.0 * 100.0).min(100.0);
            let score =
                0.4 * snr_part + 0.3 * loss_part + 0.2 * latency_part + 0.1 * bandwidth_part;
            let viable = snr >= profile.min_snr_db - self.settings.snr_slack_db
                && loss_rate <= self.settings.loss_slack * (1.0 - message.reliability_requirement);
            candidates.push(
                Candidate::builder()
                    .rat(point.rat)
                    .access(point.kind)
                    .target(point.id)
                    .distance(distance)
                    .snr(snr)
                    .loss_rate(loss_rate)
                    .score(score)
                    .viable(viable)
                    .build(),
            );
        }
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        candidates
    }

    /// The best viable candidate, or the best overall as a degraded fallback when
    /// nothing meets the message's requirements. None only when no access point is
    /// in range at all.
    pub fn shortlist(&self, candidates: &[Candidate]) -> Option<Candidate> {
        let best_viable = candidates
            .iter()
            .filter(|c| c.viable)
            .max_by(|a, b| a.score.total_cmp(&b.score));
        if let Some(candidate) = best_viable {
            return Some(*candidate);
        }
        candidates
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::profiles::tests::{test_message_profiles, test_radio_profiles};
    use crate::net::profiles::MessageKind;
    use crate::net::quality::QualitySettings;

    fn enumerator() -> CandidateEnumerator {
        CandidateEnumerator::new(
            SelectionSettings::default(),
            LinkQuality::with_settings(QualitySettings::default()),
            RadioCatalog::with_profiles(test_radio_profiles()),
        )
    }

    fn access_points() -> Vec<AccessPoint> {
        vec![
            AccessPoint {
                id: NodeId::from(101),
                kind: AccessKind::Peer,
                rat: RatType::Dsrc,
                position: Point3::new(15.0, 0.0, 0.0),
            },
            AccessPoint {
                id: NodeId::from(201),
                kind: AccessKind::Rsu,
                rat: RatType::Wifi,
                position: Point3::new(40.0, 0.0, 0.0),
            },
            AccessPoint {
                id: NodeId::from(301),
                kind: AccessKind::BaseStation,
                rat: RatType::Lte,
                position: Point3::new(90.0, 0.0, 0.0),
            },
        ]
    }

    fn safety_profile() -> MessageProfile {
        test_message_profiles()
            .into_iter()
            .find(|p| p.kind == MessageKind::Safety)
            .expect("safety profile")
    }

    #[test]
    fn discovery_radius_filters_peers_but_not_infrastructure() {
        let enumerator = enumerator();
        let sender = Point3::new(0.0, 0.0, 0.0);
        let mut points = access_points();
        points.push(AccessPoint {
            id: NodeId::from(102),
            kind: AccessKind::Peer,
            rat: RatType::Dsrc,
            position: Point3::new(140.0, 0.0, 0.0),
        });
        points.push(AccessPoint {
            id: NodeId::from(302),
            kind: AccessKind::BaseStation,
            rat: RatType::Lte,
            position: Point3::new(220.0, 0.0, 0.0),
        });
        let candidates = enumerator.enumerate(sender, &points, &safety_profile(), true);
        assert_eq!(candidates.len(), 4);
        assert!(candidates.iter().all(|c| c.target != NodeId::from(102)));
        let far_tower = candidates
            .iter()
            .find(|c| c.target == NodeId::from(302))
            .expect("base stations are always enumerated");
        assert_eq!(far_tower.loss_rate, 1.0);
        assert!(!far_tower.viable);
    }

    #[test]
    fn candidates_come_back_nearest_first() {
        let enumerator = enumerator();
        let sender = Point3::new(0.0, 0.0, 0.0);
        let mut points = access_points();
        points.reverse();
        let candidates = enumerator.enumerate(sender, &points, &safety_profile(), true);
        let distances: Vec<f64> = candidates.iter().map(|c| c.distance).collect();
        assert_eq!(distances, vec![15.0, 40.0, 90.0]);
    }

    #[test]
    fn shortlist_prefers_viable_over_higher_score() {
        let enumerator = enumerator();
        let viable_low = Candidate::builder()
            .rat(RatType::Lte)
            .access(AccessKind::BaseStation)
            .target(NodeId::from(301))
            .distance(90.0)
            .snr(8.0)
            .loss_rate(0.1)
            .score(40.0)
            .viable(true)
            .build();
        let hot_but_unviable = Candidate::builder()
            .rat(RatType::Dsrc)
            .access(AccessKind::Peer)
            .target(NodeId::from(101))
            .distance(45.0)
            .snr(2.0)
            .loss_rate(0.8)
            .score(70.0)
            .viable(false)
            .build();
        let picked = enumerator
            .shortlist(&[hot_but_unviable, viable_low])
            .expect("one candidate is viable");
        assert_eq!(picked.rat, RatType::Lte);
    }

    #[test]
    fn shortlist_falls_back_when_nothing_is_viable() {
        let enumerator = enumerator();
        let weak_a = Candidate::builder()
            .rat(RatType::Wifi)
            .access(AccessKind::Rsu)
            .target(NodeId::from(201))
            .distance(58.0)
            .snr(3.0)
            .loss_rate(0.5)
            .score(25.0)
            .viable(false)
            .build();
        let weak_b = Candidate::builder()
            .rat(RatType::Lte)
            .access(AccessKind::BaseStation)
            .target(NodeId::from(301))
            .distance(95.0)
            .snr(6.0)
            .loss_rate(0.3)
            .score(35.0)
            .viable(false)
            .build();
        let picked = enumerator.shortlist(&[weak_a, weak_b]).expect("fallback");
        assert_eq!(picked.rat, RatType::Lte);
    }

    #[test]
    fn empty_candidate_list_yields_none() {
        let enumerator = enumerator();
        assert!(enumerator.shortlist(&[]).is_none());
    }

    #[test]
    fn scores_stay_in_band() {
        let enumerator = enumerator();
        let sender = Point3::new(0.0, 0.0, 0.0);
        let candidates = enumerator.enumerate(sender, &access_points(), &safety_profile(), true);
        assert!(!candidates.is_empty());
        for candidate in candidates.iter() {
            assert!(candidate.score >= 0.0 && candidate.score <= 100.0);
        }
    }
}
