//! Scores to scene intervals.
//!
//! A frame whose score meets the threshold is a boundary frame and closes the
//! scene it belongs to; the next scene starts on the following frame. Frames
//! after the last boundary form a trailing scene. The result always tiles
//! `0..L` exactly once.

use shotsplit_models::{FrameScores, SceneInterval, SceneList, Threshold};

/// Split a score sequence into contiguous scenes.
pub fn segment(scores: &FrameScores, threshold: Threshold) -> SceneList {
    let total = scores.len();
    let mut scenes = Vec::new();
    let mut start = 0;

    for (i, &score) in scores.iter().enumerate() {
        if threshold.is_boundary(score) {
            scenes.push(SceneInterval::new(start, i));
            start = i + 1;
        }
    }
    if start < total {
        scenes.push(SceneInterval::new(start, total - 1));
    }

    SceneList::new(scenes, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(v: f32) -> Threshold {
        Threshold::new(v).unwrap()
    }

    fn ranges(list: &SceneList) -> Vec<(usize, usize)> {
        list.iter().map(|s| (s.start_frame, s.end_frame)).collect()
    }

    #[test]
    fn test_two_cuts() {
        let scores = FrameScores::new(vec![0.1, 0.1, 0.9, 0.1, 0.1, 0.9, 0.1]);
        let scenes = segment(&scores, t(0.5));
        assert_eq!(ranges(&scenes), vec![(0, 2), (3, 5), (6, 6)]);
        assert_eq!(scenes.total_frames, 7);
    }

    #[test]
    fn test_no_boundary_is_one_scene() {
        let scores = FrameScores::new(vec![0.2, 0.99, 0.3, 0.0]);
        assert_eq!(ranges(&segment(&scores, t(1.0))), vec![(0, 3)]);
    }

    #[test]
    fn test_all_boundaries_are_single_frames() {
        let scores = FrameScores::new(vec![0.6, 0.7, 0.8]);
        assert_eq!(ranges(&segment(&scores, t(0.5))), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_score_equal_to_threshold_is_boundary() {
        let scores = FrameScores::new(vec![0.1, 0.5, 0.1]);
        assert_eq!(ranges(&segment(&scores, t(0.5))), vec![(0, 1), (2, 2)]);
    }

    #[test]
    fn test_boundary_on_last_frame_has_no_trailing_scene() {
        let scores = FrameScores::new(vec![0.1, 0.1, 0.9]);
        assert_eq!(ranges(&segment(&scores, t(0.5))), vec![(0, 2)]);
    }

    #[test]
    fn test_empty_input() {
        let scenes = segment(&FrameScores::new(vec![]), t(0.5));
        assert!(scenes.is_empty());
        assert_eq!(scenes.total_frames, 0);
    }

    #[test]
    fn test_coverage_and_determinism() {
        // Cheap deterministic pseudo-random scores.
        let mut state: u32 = 12345;
        let mut next = || {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            (state >> 8) as f32 / (1u32 << 24) as f32
        };

        for len in [1usize, 2, 17, 100, 257] {
            let scores = FrameScores::new((0..len).map(|_| next()).collect());
            for th in [0.05, 0.3, 0.5, 0.9, 1.0] {
                let a = segment(&scores, t(th));
                let b = segment(&scores, t(th));
                assert_eq!(a, b);
                assert!(a.covers_all_frames(), "len={len} th={th}");

                let boundaries = scores.iter().filter(|&&s| s >= th).count();
                let trailing = usize::from(scores[len - 1] < th);
                assert_eq!(a.len(), boundaries + trailing);
            }
        }
    }
}
