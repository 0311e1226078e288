use ratsel_models::dist::UnitSampler;
use ratsel_models::net::profiles::RadioProfile;
use ratsel_models::net::quality::{LinkQuality, QualitySettings};

fn parse_profile(input: &str) -> RadioProfile {
    toml::from_str::<RadioProfile>(input).expect("valid profile definition")
}

fn short_range_profile() -> RadioProfile {
    parse_profile(
        r#"
        rat = "Dsrc"
        latency_ms = 20.0
        base_loss_rate = 0.02
        range = 40.0
        bandwidth_mbps = 27.0
        min_snr_db = 0.0
        tx_power_dbm = 23.0
        frequency_mhz = 5900.0
        preferred_messages = ["Safety", "BasicCam"]
        "#,
    )
}

#[test]
fn out_of_range_link_loses_everything() {
    let quality = LinkQuality::with_settings(QualitySettings::default());
    let profile = short_range_profile();
    let snr = quality.snr(50.0, profile.tx_power_dbm, profile.frequency_mhz, true);
    assert_eq!(quality.loss_rate(snr, 50.0, &profile), 1.0);
}

#[test]
fn snr_decreases_with_distance() {
    let quality = LinkQuality::with_settings(QualitySettings::default());
    let mut sampler = UnitSampler::new(41);
    let mut distances: Vec<f64> = (0..200).map(|_| 1.0 + sampler.sample() * 499.0).collect();
    distances.sort_by(|a, b| a.total_cmp(b));
    let mut previous = f64::INFINITY;
    for distance in distances {
        let snr = quality.snr(distance, 30.0, 2400.0, true);
        assert!(snr <= previous, "SNR rose at {} m", distance);
        previous = snr;
    }
}

#[test]
fn snr_never_goes_negative() {
    let quality = LinkQuality::with_settings(QualitySettings::default());
    let snr = quality.snr(5000.0, 10.0, 5900.0, false);
    assert_eq!(snr, 0.0);
}

#[test]
fn comfortable_margin_scales_base_loss_down() {
    let quality = LinkQuality::with_settings(QualitySettings::default());
    let profile = short_range_profile();
    let snr = quality.snr(20.0, profile.tx_power_dbm, profile.frequency_mhz, true);
    assert!(snr >= 10.0, "expected a 10 dB margin, got {}", snr);
    let loss = quality.loss_rate(snr, 20.0, &profile);
    assert!((loss - 0.002).abs() < 1e-12);
}
