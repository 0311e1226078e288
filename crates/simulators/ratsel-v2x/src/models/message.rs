use log::error;
use serde::Deserialize;

use ratsel_models::dist::UnitSampler;
use ratsel_models::net::profiles::MessageKind;

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct MessageMixSettings {
    pub safety: f64,
    pub basic_cam: f64,
    pub traffic: f64,
    pub infotainment: f64,
}

impl Default for MessageMixSettings {
    fn default() -> Self {
        Self {
            safety: 0.05,
            basic_cam: 0.45,
            traffic: 0.30,
            infotainment: 0.20,
        }
    }
}

/// Categorical draw of the next message kind a vehicle generates. The shares must
/// form a probability distribution.
#[derive(Debug, Clone, Copy)]
pub struct MessageMix {
    settings: MessageMixSettings,
}

impl MessageMix {
    pub fn with_settings(settings: MessageMixSettings) -> Self {
        let total =
            settings.safety + settings.basic_cam + settings.traffic + settings.infotainment;
        if (total - 1.0).abs() > 1e-6 {
            error!("Message mix shares add up to {}", total);
            panic!("Message mix shares must add up to 1.0");
        }
        Self { settings }
    }

    pub fn sample(&self, sampler: &mut UnitSampler) -> MessageKind {
        let draw = sampler.sample();
        if draw < self.settings.safety {
            MessageKind::Safety
        } else if draw < self.settings.safety + self.settings.basic_cam {
            MessageKind::BasicCam
        } else if draw < self.settings.safety + self.settings.basic_cam + self.settings.traffic {
            MessageKind::Traffic
        } else {
            MessageKind::Infotainment
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    #[test]
    fn mix_roughly_follows_the_shares() {
        let mix = MessageMix::with_settings(MessageMixSettings::default());
        let mut sampler = UnitSampler::new(23);
        let mut counts: HashMap<MessageKind, u64> = HashMap::new();
        let draws = 10_000;
        for _ in 0..draws {
            *counts.entry(mix.sample(&mut sampler)).or_default() += 1;
        }
        let share = |kind: MessageKind| counts[&kind] as f64 / draws as f64;
        assert!((share(MessageKind::Safety) - 0.05).abs() < 0.02);
        assert!((share(MessageKind::BasicCam) - 0.45).abs() < 0.02);
        assert!((share(MessageKind::Traffic) - 0.30).abs() < 0.02);
        assert!((share(MessageKind::Infotainment) - 0.20).abs() < 0.02);
    }

    #[test]
    #[should_panic(expected = "add up to 1.0")]
    fn unbalanced_mix_is_fatal() {
        MessageMix::with_settings(MessageMixSettings {
            safety: 0.5,
            basic_cam: 0.5,
            traffic: 0.5,
            infotainment: 0.5,
        });
    }
}
