//! Decay-fit selection
//!
//! Neil Fraser's logarithmic backup scheme: derive an ideal schedule in which
//! each archived backup is roughly `decay` times older than its successor,
//! then pick the one backup whose removal leaves the remaining timestamps
//! closest to that schedule.
//!
//! See <https://neil.fraser.name/software/backup/>.

/// Pick the backup to drop from `timestamps` (seconds, oldest first)
///
/// Only interior positions are candidates: the oldest and newest backups are
/// never chosen, and neither is `exempt`. Returns `None` when no candidate is
/// left, which includes fewer than three backups.
pub fn select_victim(
    timestamps: &[i64],
    now: i64,
    interval_secs: u64,
    exempt: Option<usize>,
) -> Option<usize> {
    let n = timestamps.len();
    if n < 3 {
        return None;
    }
    debug_assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));

    let interval = interval_secs.max(1) as f64;
    let now = now as f64;
    let spans = (n - 1) as f64;
    let total = now - timestamps[0] as f64;

    // Slots the schedule would have had that no backup occupies.
    let missing = (total / interval - spans).max(0.0);
    let decay = (missing + 1.0).powf(1.0 / spans);

    let ideal: Vec<f64> = (0..n)
        .map(|i| {
            let m = (n - 1 - i) as f64;
            now - interval * (m + decay.powf(m) - 1.0)
        })
        .collect();

    // right[i]: error of backups i.. staying in their own slots.
    let mut right = vec![0.0; n + 1];
    for i in (0..n).rev() {
        right[i] = right[i + 1] + (timestamps[i] as f64 - ideal[i]).abs();
    }

    // left[i]: error of backups ..i shifted one slot newer.
    let mut left = vec![0.0; n];
    for i in 1..n {
        left[i] = left[i - 1] + (timestamps[i - 1] as f64 - ideal[i]).abs();
    }

    let mut best: Option<(usize, f64)> = None;
    for i in (1..n - 1).filter(|&i| Some(i) != exempt) {
        let error = left[i] + right[i + 1];
        match best {
            Some((_, lowest)) if error >= lowest => {}
            _ => best = Some((i, error)),
        }
    }
    best.map(|(i, _)| i)
}
