//! Follower chain resolver.
//!
//! Followers retrace the leader's recorded path. Each one is assigned a lag
//! of `slot * gap` world units, scaled into history arc-length units, and:
//!
//! 1. finds the history sample where that arc length is reached,
//! 2. rebuilds a velocity by blending samples from there toward the present
//!    until the leader's current speed is used up,
//! 3. has its spacing to the vehicle ahead corrected (snap when badly out of
//!    formation, nudge when slightly stretched).
//!
//! Arc-length indexing keeps spacing independent of frame rate: a fast leader
//! records long samples, a slow one short samples, and the lag distance stays
//! the same.

use glam::Vec2;

use crate::config::ConvoyConfig;
use crate::history::TrajectoryHistory;
use crate::kinematics::Kinematic;

/// How a follower's position was adjusted this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Within spacing, left in place.
    None,
    /// Pulled in by the excess beyond the gap.
    Soft,
    /// Teleported onto the path behind the vehicle ahead.
    Hard,
}

/// Outcome of resolving one chain for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainResolution {
    /// Followers that received a velocity and correction.
    pub resolved: usize,
    /// Followers left untouched because the history was too short.
    pub skipped: usize,
    pub soft_corrections: usize,
    pub hard_corrections: usize,
}

/// Index of the sample at which the accumulated arc length first exceeds
/// `target`, or `None` if the history is too short.
pub fn locate_start(history: &TrajectoryHistory, target: f32) -> Option<usize> {
    let mut sum = 0.0;
    for (index, sample) in history.iter().enumerate() {
        sum += sample.length();
        if sum > target {
            return Some(index);
        }
    }
    None
}

/// Blend samples from `start` toward the newest until `leader_speed` worth of
/// arc length is consumed; the last sample contributes only its remainder.
///
/// Samples are summed as if each spanned one unit of time, so the result's
/// magnitude approximates `leader_speed` along the path segment the follower
/// is currently on.
pub fn reconstruct_velocity(history: &TrajectoryHistory, start: usize, leader_speed: f32) -> Vec2 {
    let mut total = Vec2::ZERO;
    let mut end_delay = 0.0;
    for sample in history.iter().take(start + 1).rev() {
        let length = sample.length();
        if end_delay + length > leader_speed {
            let remainder = leader_speed - end_delay;
            total += sample * (remainder / length);
            break;
        }
        total += sample;
        end_delay += length;
    }
    total
}

/// Correct a follower's spacing relative to the vehicle ahead of it.
pub fn correct_spacing(position: Vec2, ahead: Kinematic, config: &ConvoyConfig) -> (Vec2, Correction) {
    let gap = config.follower_gap;
    let offset = position - ahead.position;
    let distance = offset.length();

    if distance >= config.hard_snap_distance() && ahead.velocity != Vec2::ZERO {
        let snapped = ahead.position - ahead.velocity.normalize() * gap;
        (snapped, Correction::Hard)
    } else if distance > gap {
        let pulled = position - offset * ((distance - gap) / distance);
        (pulled, Correction::Soft)
    } else {
        (position, Correction::None)
    }
}

/// Resolve every follower in `followers` (front first) behind `leader`.
///
/// Followers are updated in place. Once one follower lacks history, it and
/// everyone behind it keep last frame's state.
pub fn resolve_chain(
    history: &TrajectoryHistory,
    leader: Kinematic,
    followers: &mut [Kinematic],
    config: &ConvoyConfig,
) -> ChainResolution {
    let leader_speed = leader.speed();
    let count = followers.len();
    let mut resolution = ChainResolution::default();
    let mut ahead = leader;

    for (index, follower) in followers.iter_mut().enumerate() {
        let slot = index + 1;
        let Some(start) = locate_start(history, config.follower_target(slot)) else {
            resolution.skipped = count - index;
            break;
        };

        let velocity = reconstruct_velocity(history, start, leader_speed);
        let (position, correction) = correct_spacing(follower.position, ahead, config);
        match correction {
            Correction::Hard => resolution.hard_corrections += 1,
            Correction::Soft => resolution.soft_corrections += 1,
            Correction::None => {}
        }

        follower.position = position;
        follower.velocity = velocity;
        resolution.resolved += 1;
        ahead = *follower;
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn history_of(samples: &[Vec2]) -> TrajectoryHistory {
        // `samples` is given oldest first, as it would be recorded.
        let mut history = TrajectoryHistory::new(2000);
        for &s in samples {
            history.record(s);
        }
        history
    }

    #[test]
    fn locate_start_stops_once_target_is_exceeded() {
        let history = history_of(&[Vec2::new(2.0, 0.0); 10]);
        assert_eq!(locate_start(&history, 5.0), Some(2));
        assert_eq!(locate_start(&history, 19.9), Some(9));
        // Exactly reaching the target is not enough.
        assert_eq!(locate_start(&history, 20.0), None);
        assert_eq!(locate_start(&TrajectoryHistory::new(4), 1.0), None);
    }

    #[test]
    fn reconstruct_uses_fractional_remainder() {
        let history = history_of(&[Vec2::new(2.0, 0.0); 4]);
        let v = reconstruct_velocity(&history, 2, 3.0);
        assert!((v - Vec2::new(3.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn reconstruct_blends_across_a_turn() {
        // Leader drove up, then turned right.
        let mut samples = vec![Vec2::new(0.0, -2.0); 3];
        samples.extend([Vec2::new(2.0, 0.0); 3]);
        let history = history_of(&samples);
        let v = reconstruct_velocity(&history, 4, 5.0);
        assert!((v - Vec2::new(1.0, -4.0)).length() < 1e-6);
    }

    #[test]
    fn reconstruct_sums_everything_when_speed_is_not_reached() {
        let history = history_of(&[Vec2::new(1.0, 1.0); 3]);
        let v = reconstruct_velocity(&history, 1, 100.0);
        assert_eq!(v, Vec2::new(2.0, 2.0));
        assert_eq!(reconstruct_velocity(&history, 2, 0.0), Vec2::ZERO);
    }

    #[test]
    fn correct_spacing_policies() {
        let config = ConvoyConfig::default();
        let ahead = Kinematic::new(Vec2::ZERO, Vec2::new(10.0, 0.0));

        let (p, c) = correct_spacing(Vec2::new(100.0, 30.0), ahead, &config);
        assert_eq!(c, Correction::Hard);
        assert!((p - Vec2::new(-14.0, 0.0)).length() < 1e-5);

        let (p, c) = correct_spacing(Vec2::new(0.0, 14.3), ahead, &config);
        assert_eq!(c, Correction::Soft);
        assert!((p - Vec2::new(0.0, 14.0)).length() < 1e-5);

        let (p, c) = correct_spacing(Vec2::new(-10.0, 0.0), ahead, &config);
        assert_eq!(c, Correction::None);
        assert_eq!(p, Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn stationary_vehicle_ahead_only_gets_soft_pull() {
        let config = ConvoyConfig::default();
        let ahead = Kinematic::new(Vec2::ZERO, Vec2::ZERO);
        let (p, c) = correct_spacing(Vec2::new(40.0, 0.0), ahead, &config);
        assert_eq!(c, Correction::Soft);
        assert!((p - Vec2::new(14.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn short_history_leaves_followers_untouched() {
        let config = ConvoyConfig::default();
        // 5 * 60 = 300 arc units, well short of 14 * 64.
        let history = history_of(&[Vec2::new(60.0, 0.0); 5]);
        let leader = Kinematic::new(Vec2::new(5.0, 0.0), Vec2::new(60.0, 0.0));
        let before = [
            Kinematic::new(Vec2::new(-30.0, 7.0), Vec2::ZERO),
            Kinematic::new(Vec2::new(-60.0, 7.0), Vec2::ZERO),
        ];
        let mut followers = before;
        let resolution = resolve_chain(&history, leader, &mut followers, &config);
        assert_eq!(resolution.resolved, 0);
        assert_eq!(resolution.skipped, 2);
        assert_eq!(followers, before);
    }

    #[test]
    fn tail_is_skipped_while_front_resolves() {
        let config = ConvoyConfig::default();
        // 20 * 60 = 1200: enough for slot 1 (896), not for slot 2 (1792).
        let history = history_of(&[Vec2::new(60.0, 0.0); 20]);
        let leader = Kinematic::new(Vec2::ZERO, Vec2::new(60.0, 0.0));
        let tail = Kinematic::new(Vec2::new(-90.0, 3.0), Vec2::ZERO);
        let mut followers = [Kinematic::new(Vec2::new(-50.0, 0.0), Vec2::ZERO), tail];
        let resolution = resolve_chain(&history, leader, &mut followers, &config);
        assert_eq!(resolution.resolved, 1);
        assert_eq!(resolution.skipped, 1);
        assert_eq!(followers[1], tail);
        assert!((followers[0].velocity - Vec2::new(60.0, 0.0)).length() < 1e-4);
    }

    /// Drive a leader in a straight line and resolve the chain every frame,
    /// returning each follower's spacing error after every frame.
    fn run_straight(speed: f32, frames: usize, followers: &mut [Kinematic]) -> Vec<Vec<f32>> {
        let config = ConvoyConfig::default();
        let mut history = TrajectoryHistory::new(config.history_capacity);
        let mut leader = Kinematic::new(Vec2::ZERO, Vec2::new(speed, 0.0));
        let mut errors = Vec::new();
        for _ in 0..frames {
            history.record(leader.velocity);
            leader.position += leader.velocity * DT;
            resolve_chain(&history, leader, followers, &config);

            let mut ahead = leader.position;
            let frame: Vec<f32> = followers
                .iter()
                .map(|f| {
                    let error = (f.position.distance(ahead) - config.follower_gap).abs();
                    ahead = f.position;
                    error
                })
                .collect();
            errors.push(frame);
        }
        errors
    }

    #[test]
    fn fast_leader_snaps_followers_into_formation() {
        let mut followers = [
            Kinematic::new(Vec2::new(-40.0, 25.0), Vec2::ZERO),
            Kinematic::new(Vec2::new(10.0, -80.0), Vec2::ZERO),
        ];
        let errors = run_straight(60.0, 120, &mut followers);
        let last = errors.last().unwrap();
        assert!(last.iter().all(|&e| e < 1e-3), "errors {:?}", last);
        // The chain ends up strung out straight behind the leader.
        assert!(followers.iter().all(|f| f.position.y.abs() < 1e-3));
        assert!(followers[1].position.x < followers[0].position.x);
    }

    #[test]
    fn slow_leader_is_held_at_gap_by_soft_pulls() {
        let config = ConvoyConfig::default();
        let mut history = TrajectoryHistory::new(config.history_capacity);
        let mut leader = Kinematic::new(Vec2::ZERO, Vec2::new(12.0, 0.0));
        let mut followers = [Kinematic::new(Vec2::new(-14.0, 0.0), Vec2::ZERO)];

        let mut soft = 0;
        for _ in 0..300 {
            history.record(leader.velocity);
            leader.position += leader.velocity * DT;
            let r = resolve_chain(&history, leader, &mut followers, &config);
            soft += r.soft_corrections;
            let spacing = followers[0].position.distance(leader.position);
            if r.resolved == 1 {
                assert!(spacing <= config.hard_snap_distance());
            }
        }
        assert!(soft > 0);
        let spacing = followers[0].position.distance(leader.position);
        assert!((spacing - 14.0).abs() < 1e-3);
    }

    #[test]
    fn spacing_error_never_grows_once_resolved() {
        let mut followers = [Kinematic::new(Vec2::new(-3.0, 60.0), Vec2::ZERO)];
        let errors = run_straight(30.0, 240, &mut followers);
        let first_settled = errors.iter().position(|e| e[0] < 1e-3).unwrap();
        for frame in &errors[first_settled..] {
            assert!(frame[0] < 1e-3);
        }
    }
}
