use serde::Deserialize;

use crate::net::profiles::RadioProfile;

/// Parameters of the link-quality model. Defaults match a suburban road scenario
/// with a -95 dBm noise floor.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct QualitySettings {
    #[serde(default = "default_noise_floor")]
    pub noise_floor_dbm: f64,
    #[serde(default = "default_los_exponent")]
    pub los_exponent: f64,
    #[serde(default = "default_nlos_exponent")]
    pub nlos_exponent: f64,
    #[serde(default = "default_exponent_blend")]
    pub exponent_blend: f64,
}

fn default_noise_floor() -> f64 {
    -95.0
}

fn default_los_exponent() -> f64 {
    2.0
}

fn default_nlos_exponent() -> f64 {
    3.5
}

fn default_exponent_blend() -> f64 {
    0.3
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            noise_floor_dbm: default_noise_floor(),
            los_exponent: default_los_exponent(),
            nlos_exponent: default_nlos_exponent(),
            exponent_blend: default_exponent_blend(),
        }
    }
}

/// Converts distance, transmit power and frequency into an SNR estimate and an
/// effective packet-loss rate for a link.
#[derive(Debug, Clone, Copy)]
pub struct LinkQuality {
    settings: QualitySettings,
}

impl LinkQuality {
    pub fn with_settings(settings: QualitySettings) -> Self {
        Self { settings }
    }

    /// SNR in dB for a link of the given length. Free-space path loss blended with
    /// an exponent-based path-loss term, referenced to 1 m. Clamped to be
    /// non-negative.
    pub fn snr(
        &self,
        distance: f64,
        tx_power_dbm: f64,
        frequency_mhz: f64,
        line_of_sight: bool,
    ) -> f64 {
        // log10 blows up below the 1 m reference distance.
        let distance = distance.max(1.0);
        let fspl = 20.0 * distance.log10() + 20.0 * frequency_mhz.log10() + 32.45;
        let exponent = if line_of_sight {
            self.settings.los_exponent
        } else {
            self.settings.nlos_exponent
        };
        let exponent_loss = 10.0 * exponent * distance.log10();
        let blended = fspl + (exponent_loss - fspl) * self.settings.exponent_blend;
        let received_dbm = tx_power_dbm - blended;
        let snr = received_dbm - self.settings.noise_floor_dbm;
        snr.max(0.0)
    }

    /// Effective packet-loss rate in [0, 1] for a link, as a tiered multiplier of
    /// the RAT's base loss rate keyed off the margin above its minimum SNR
    /// threshold. Distance beyond the RAT's range forces total loss.
    pub fn loss_rate(&self, snr: f64, distance: f64, profile: &RadioProfile) -> f64 {
        if distance > profile.range {
            return 1.0;
        }
        let base = profile.base_loss_rate;
        let margin = snr - profile.min_snr_db;
        let rate = if margin >= 10.0 {
            base * 0.1
        } else if margin >= 5.0 {
            base * 0.3
        } else if margin >= 0.0 {
            base
        } else if margin >= -5.0 {
            (base * 3.0).min(0.5)
        } else {
            (base * 10.0).min(0.8)
        };
        rate.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::profiles::tests::test_radio_profiles;
    use crate::net::profiles::RatType;

    #[test]
    fn snr_clamped_below_reference_distance() {
        let quality = LinkQuality::with_settings(QualitySettings::default());
        let at_zero = quality.snr(0.0, 23.0, 5900.0, true);
        let at_one = quality.snr(1.0, 23.0, 5900.0, true);
        assert_eq!(at_zero, at_one);
    }

    #[test]
    fn nlos_is_never_better_than_los() {
        let quality = LinkQuality::with_settings(QualitySettings::default());
        for distance in [5.0, 20.0, 80.0, 200.0] {
            let los = quality.snr(distance, 30.0, 2400.0, true);
            let nlos = quality.snr(distance, 30.0, 2400.0, false);
            assert!(nlos <= los, "NLOS beat LOS at {} m", distance);
        }
    }

    #[test]
    fn loss_tiers_follow_snr_margin() {
        let quality = LinkQuality::with_settings(QualitySettings::default());
        let profiles = test_radio_profiles();
        let wifi = profiles
            .iter()
            .find(|p| p.rat == RatType::Wifi)
            .expect("wifi profile");
        let base = wifi.base_loss_rate;
        let min = wifi.min_snr_db;
        assert_eq!(quality.loss_rate(min + 12.0, 10.0, wifi), base * 0.1);
        assert_eq!(quality.loss_rate(min + 7.0, 10.0, wifi), base * 0.3);
        assert_eq!(quality.loss_rate(min + 2.0, 10.0, wifi), base);
        assert_eq!(quality.loss_rate(min - 2.0, 10.0, wifi), (base * 3.0).min(0.5));
        assert_eq!(quality.loss_rate(min - 9.0, 10.0, wifi), (base * 10.0).min(0.8));
    }
}
