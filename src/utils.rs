use rand::Rng;
use std::time::Duration;

/// Longest single delay, in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Draw a delay uniformly from `[min_secs, max_secs]`
///
/// Bounds are clamped to `[0, MAX_DELAY_SECS]`; NaN counts as zero.
pub fn random_delay<R: Rng + ?Sized>(rng: &mut R, min_secs: f64, max_secs: f64) -> Duration {
    let clamp = |secs: f64| {
        if secs.is_nan() {
            0.0
        } else {
            secs.clamp(0.0, MAX_DELAY_SECS)
        }
    };
    let (min_secs, max_secs) = (clamp(min_secs), clamp(max_secs));

    if max_secs <= min_secs {
        return Duration::from_secs_f64(min_secs);
    }
    Duration::from_secs_f64(rng.gen_range(min_secs..=max_secs))
}

/// Sleep for a random delay drawn from `[min_secs, max_secs]`
pub async fn jittered_delay<R: Rng + ?Sized>(rng: &mut R, min_secs: f64, max_secs: f64) {
    let delay = random_delay(rng, min_secs, max_secs);
    if delay.is_zero() {
        return;
    }
    ::log::trace!("Waiting {:.2} seconds", delay.as_secs_f64());
    tokio::time::sleep(delay).await;
}

/// Convert a company name to a sanitized directory name
pub fn sanitize_filename(name: &str) -> String {
    let mut name = name.trim().replace(
        ['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'],
        "_",
    );
    if name.is_empty() || name == "." || name == ".." {
        name = "_".to_string();
    }

    // Limit filename length
    if name.len() > 100 {
        let mut end = 100;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}
