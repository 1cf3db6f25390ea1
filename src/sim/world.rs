//! Streaming terrain window
//!
//! Keeps an ordered run of terrain samples around the vehicle and one static
//! collision edge per adjacent pair. New ground is appended ahead of the
//! vehicle and old ground is dropped behind it; since height is a pure function
//! of x, nothing has to be remembered about dropped ground.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{ColliderHandle, PhysicsWorld, SurfaceMaterial};
use super::terrain::TerrainProfile;
use crate::consts::MIN_SEGMENT_LENGTH;
use crate::tuning::StreamTuning;

/// One sample of the ground curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPoint {
    pub x: f32,
    pub y: f32,
}

impl TerrainPoint {
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Angle of the edge from `a` to `b` in radians
///
/// Edges shorter than `MIN_SEGMENT_LENGTH` read as flat.
pub fn edge_angle(a: TerrainPoint, b: TerrainPoint) -> f32 {
    let delta = b.as_vec2() - a.as_vec2();
    if delta.length() < MIN_SEGMENT_LENGTH {
        return 0.0;
    }
    delta.y.atan2(delta.x)
}

/// The active slice of ground
pub struct WorldStreamer {
    profile: TerrainProfile,
    surface: SurfaceMaterial,
    thickness: f32,
    step: f32,
    buffer_ahead: f32,
    buffer_behind: f32,
    /// x of the next sample to generate
    next_x: f32,
    points: VecDeque<TerrainPoint>,
    /// `segments[i]` joins `points[i]` and `points[i + 1]`
    segments: VecDeque<ColliderHandle>,
}

impl WorldStreamer {
    /// Create an empty window whose first sample lands at or behind
    /// `vehicle_x - buffer_behind`, snapped to the step grid
    pub fn new(
        tuning: &StreamTuning,
        profile: TerrainProfile,
        surface: SurfaceMaterial,
        thickness: f32,
        vehicle_x: f32,
    ) -> Self {
        let step = tuning.step;
        let next_x = ((vehicle_x - tuning.buffer_behind) / step).floor() * step;
        Self {
            profile,
            surface,
            thickness,
            step,
            buffer_ahead: tuning.buffer_ahead,
            buffer_behind: tuning.buffer_behind,
            next_x,
            points: VecDeque::new(),
            segments: VecDeque::new(),
        }
    }

    /// Append ground until it reaches `buffer_ahead` past the vehicle
    ///
    /// Returns the number of samples appended.
    pub fn extend(&mut self, vehicle_x: f32, physics: &mut PhysicsWorld) -> usize {
        let mut appended = 0;
        while self.points.len() < 2
            || self.last_x().is_some_and(|last| last - vehicle_x < self.buffer_ahead)
        {
            let point = TerrainPoint {
                x: self.next_x,
                y: self.profile.height(self.next_x),
            };
            if let Some(&prev) = self.points.back() {
                let handle = physics.add_static_segment(
                    prev.as_vec2(),
                    point.as_vec2(),
                    self.thickness,
                    self.surface,
                );
                self.segments.push_back(handle);
            }
            self.points.push_back(point);
            self.next_x += self.step;
            appended += 1;
        }
        if appended > 0 {
            log::debug!(
                "Terrain extended by {} points, window [{:.0}, {:.0}]",
                appended,
                self.first_x().unwrap_or_default(),
                self.last_x().unwrap_or_default()
            );
        }
        appended
    }

    /// Drop ground that lies more than `buffer_behind` behind the vehicle
    ///
    /// The first point only goes once the second one is also out of range,
    /// so the window always still reaches back past the threshold. At least
    /// two points always remain. Returns the number of samples removed.
    pub fn prune(&mut self, vehicle_x: f32, physics: &mut PhysicsWorld) -> usize {
        let threshold = vehicle_x - self.buffer_behind;
        let mut removed = 0;
        while self.points.len() > 2 && self.points[1].x < threshold {
            self.points.pop_front();
            if let Some(handle) = self.segments.pop_front() {
                physics.remove_collider(handle);
            }
            removed += 1;
        }
        removed
    }

    pub fn points(&self) -> &VecDeque<TerrainPoint> {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn first_x(&self) -> Option<f32> {
        self.points.front().map(|p| p.x)
    }

    pub fn last_x(&self) -> Option<f32> {
        self.points.back().map(|p| p.x)
    }

    pub fn next_x(&self) -> f32 {
        self.next_x
    }

    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    /// Slope of the active edge under `x` in radians (positive runs down-screen)
    ///
    /// Outside the window the nearest edge is used; an empty window is flat.
    pub fn slope_angle_at(&self, x: f32) -> f32 {
        if self.points.len() < 2 {
            return 0.0;
        }
        let index = self
            .points
            .partition_point(|p| p.x <= x)
            .clamp(1, self.points.len() - 1);
        edge_angle(self.points[index - 1], self.points[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn streamer(vehicle_x: f32) -> (WorldStreamer, PhysicsWorld) {
        let physics = PhysicsWorld::new(900.0, 30.0, SIM_DT);
        let streamer = WorldStreamer::new(
            &StreamTuning::default(),
            TerrainProfile::default(),
            SurfaceMaterial {
                friction: 1.0,
                restitution: 0.1,
            },
            4.0,
            vehicle_x,
        );
        (streamer, physics)
    }

    fn assert_window_covers(streamer: &WorldStreamer, vehicle_x: f32) {
        let tuning = StreamTuning::default();
        let first = streamer.first_x().expect("window not empty");
        let last = streamer.last_x().expect("window not empty");
        assert!(first <= vehicle_x - tuning.buffer_behind, "first={first}");
        assert!(last >= vehicle_x + tuning.buffer_ahead, "last={last}");
    }

    #[test]
    fn test_extend_covers_window() {
        let (mut streamer, mut physics) = streamer(200.0);
        let appended = streamer.extend(200.0, &mut physics);

        assert!(appended > 2);
        assert_window_covers(&streamer, 200.0);
        assert_eq!(streamer.segment_count(), streamer.points().len() - 1);
        assert_eq!(physics.collider_count(), streamer.segment_count());
    }

    #[test]
    fn test_points_are_ascending_and_on_curve() {
        let (mut streamer, mut physics) = streamer(0.0);
        streamer.extend(0.0, &mut physics);

        let profile = TerrainProfile::default();
        for pair in streamer.points().iter().collect::<Vec<_>>().windows(2) {
            assert!(pair[1].x > pair[0].x);
            assert_eq!(pair[1].x - pair[0].x, 30.0);
        }
        for point in streamer.points() {
            assert_eq!(point.y, profile.height(point.x));
        }
    }

    #[test]
    fn test_advance_prunes_behind_and_extends_ahead() {
        let (mut streamer, mut physics) = streamer(200.0);
        streamer.extend(200.0, &mut physics);

        for step in 1..=100 {
            let vehicle_x = 200.0 + step as f32 * 47.0;
            streamer.extend(vehicle_x, &mut physics);
            streamer.prune(vehicle_x, &mut physics);

            assert_window_covers(&streamer, vehicle_x);
            assert!(streamer.points()[1].x >= vehicle_x - 600.0);
            assert_eq!(streamer.segment_count(), streamer.points().len() - 1);
            assert_eq!(physics.collider_count(), streamer.segment_count());
        }
    }

    #[test]
    fn test_prune_keeps_two_points() {
        let (mut streamer, mut physics) = streamer(0.0);
        streamer.extend(0.0, &mut physics);

        streamer.prune(1.0e7, &mut physics);
        assert_eq!(streamer.points().len(), 2);
        assert_eq!(streamer.segment_count(), 1);
        assert_eq!(physics.collider_count(), 1);
    }

    #[test]
    fn test_regenerated_ground_is_identical() {
        let (mut first, mut physics) = streamer(1000.0);
        first.extend(1000.0, &mut physics);
        let before = *first
            .points()
            .iter()
            .find(|p| p.x == 990.0)
            .expect("sample on grid");

        // Move far away, then come back with a fresh window
        first.extend(50_000.0, &mut physics);
        first.prune(50_000.0, &mut physics);
        assert!(first.points().iter().all(|p| p.x != 990.0));

        let (mut second, mut physics) = streamer(1000.0);
        second.extend(1000.0, &mut physics);
        let after = *second
            .points()
            .iter()
            .find(|p| p.x == 990.0)
            .expect("sample on grid");
        assert_eq!(before, after);
    }

    #[test]
    fn test_backward_jump_keeps_generating_from_cursor() {
        let (mut streamer, mut physics) = streamer(5000.0);
        streamer.extend(5000.0, &mut physics);
        let cursor = streamer.next_x();

        // Nothing new is needed ahead, nothing behind is regenerated
        assert_eq!(streamer.extend(100.0, &mut physics), 0);
        assert_eq!(streamer.next_x(), cursor);

        streamer.extend(9000.0, &mut physics);
        assert!(streamer.last_x().expect("window") >= 9000.0 + 1800.0);
    }

    #[test]
    fn test_slope_angle_matches_edge() {
        let (mut streamer, mut physics) = streamer(0.0);
        streamer.extend(0.0, &mut physics);

        let profile = TerrainProfile::default();
        let a = TerrainPoint {
            x: 300.0,
            y: profile.height(300.0),
        };
        let b = TerrainPoint {
            x: 330.0,
            y: profile.height(330.0),
        };
        assert_eq!(streamer.slope_angle_at(315.0), edge_angle(a, b));
    }

    #[test]
    fn test_edge_angle_guards_degenerate_edges() {
        let p = TerrainPoint { x: 10.0, y: 10.0 };
        let angle = edge_angle(p, p);
        assert!(angle.is_finite());
        assert_eq!(angle, 0.0);
    }
}
