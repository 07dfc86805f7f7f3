use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn fade_in_follows_cubic_ease_out() {
    let t0 = Instant::now();
    let d = ms(800);
    assert_eq!(fade_in(t0, t0, d), 0.0);
    assert!((fade_in(t0 + ms(400), t0, d) - 0.875).abs() < 1e-9);
    assert_eq!(fade_in(t0 + ms(800), t0, d), 1.0);
    assert_eq!(fade_in(t0 + ms(5000), t0, d), 1.0);
    assert_eq!(fade_in(t0, t0, Duration::ZERO), 1.0);
}

#[test]
fn slide_fade_phases() {
    let sf = SlideFade::default();
    let t0 = Instant::now();
    let expires = t0 + Duration::from_secs(10);

    let entering = sf.sample(t0 + ms(200), t0, expires);
    assert_eq!(entering.height, 1.0);
    assert!(entering.opacity > 0.0 && entering.opacity < 1.0);

    assert_eq!(sf.sample(t0 + ms(5000), t0, expires), TransitionSample::IDLE);

    let exiting = sf.sample(expires - ms(200), t0, expires);
    assert!((exiting.height - 0.125).abs() < 1e-9);
    assert!((exiting.opacity - 0.0625).abs() < 1e-9);

    let gone = sf.sample(expires + ms(10), t0, expires);
    assert_eq!(gone.height, 0.0);
    assert_eq!(gone.opacity, 0.0);
}
