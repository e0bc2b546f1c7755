//! Top-track aggregation across listening-history windows
//!
//! Each track at zero-based position `i` of a window list of length `L`
//! contributes `(L - i) * weight` to its score. Contributions are summed per
//! track id, so a track ranked in several windows outscores one ranked in a
//! single window at the same position.

use std::collections::HashMap;

use tracing::debug;

use crate::calibration::CALIBRATION;
use crate::models::{AggregatedTrack, TimeWindow, WindowAppearance, WindowedTracks};

/// Merge the three window lists into a single ranking
///
/// The result holds each track id once, ordered by descending score. Ties keep
/// first-encounter order (recent window first, then medium, then long-term).
/// Empty windows contribute nothing; three empty windows yield an empty list.
pub fn aggregate(windows: &WindowedTracks) -> Vec<AggregatedTrack> {
    let mut merged: Vec<AggregatedTrack> = Vec::new();
    let mut index_by_id: HashMap<&str, usize> = HashMap::new();

    for window in TimeWindow::ALL {
        let tracks = windows.window(window);
        let len = tracks.len() as u64;

        for (position, track) in tracks.iter().enumerate() {
            let position_score = (len - position as u64) * window.weight();
            let appearance = WindowAppearance {
                window,
                rank: position + 1,
            };

            match index_by_id.get(track.id.as_str()) {
                Some(&idx) => {
                    let entry = &mut merged[idx];
                    entry.score += position_score;
                    entry.appearances.push(appearance);
                }
                None => {
                    index_by_id.insert(track.id.as_str(), merged.len());
                    merged.push(AggregatedTrack {
                        track: track.clone(),
                        score: position_score,
                        appearances: vec![appearance],
                    });
                }
            }
        }
    }

    // Stable sort: equal scores keep insertion order
    merged.sort_by(|a, b| b.score.cmp(&a.score));

    debug!(
        recent = windows.recent.len(),
        medium = windows.medium.len(),
        long_term = windows.long_term.len(),
        unique = merged.len(),
        "Aggregated top tracks"
    );

    merged
}

/// URIs to push to the ultimate playlist, capped at the per-request limit
pub fn playlist_uris(tracks: &[AggregatedTrack]) -> Vec<String> {
    tracks
        .iter()
        .take(CALIBRATION.playlist_uri_limit())
        .map(|t| t.track.uri.clone())
        .collect()
}
