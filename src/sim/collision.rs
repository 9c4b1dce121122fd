//! Collision detection against the field bounds and pipe pairs
//!
//! Stateless: every check is recomputed from the current bird height and
//! obstacle stream.

use glam::Vec2;

use super::state::{CrashCause, Obstacle, ObstacleStream};
use crate::tuning::Tuning;

/// Axis-aligned box in field coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Hitbox {
    /// Full bounding box of the bird at height `y`
    pub fn bird(y: f32, tuning: &Tuning) -> Self {
        let min = Vec2::new(tuning.bird_x, y);
        Self {
            min,
            max: min + Vec2::splat(tuning.bird_size),
        }
    }

    /// Shrink every side by `amount`
    pub fn inset(self, amount: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    /// Strict overlap with the horizontal span `[left, right]`
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x > left && self.min.x < right
    }
}

/// Ground and ceiling
pub fn check_bounds(bird_y: f32, tuning: &Tuning) -> Option<CrashCause> {
    if bird_y + tuning.bird_size >= tuning.field_height {
        Some(CrashCause::Ground)
    } else if bird_y <= 0.0 {
        Some(CrashCause::Ceiling)
    } else {
        None
    }
}

/// Pipe pairs, using the forgiving inset hitbox. Stops at the first hit.
pub fn check_obstacles<'a>(
    bird_y: f32,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
    tuning: &Tuning,
) -> Option<CrashCause> {
    let hitbox = Hitbox::bird(bird_y, tuning).inset(tuning.hitbox_inset);

    obstacles
        .into_iter()
        .find(|pipe| {
            hitbox.overlaps_x(pipe.x, pipe.right(tuning))
                && (hitbox.min.y < pipe.top_height || hitbox.max.y > pipe.gap_bottom(tuning))
        })
        .map(|pipe| CrashCause::Obstacle { id: pipe.id })
}

/// Full collision test for one frame
pub fn check_collision(
    bird_y: f32,
    obstacles: &ObstacleStream,
    tuning: &Tuning,
) -> Option<CrashCause> {
    check_bounds(bird_y, tuning).or_else(|| check_obstacles(bird_y, obstacles.iter(), tuning))
}

/// Boolean form of [`check_collision`]
#[inline]
pub fn collides(bird_y: f32, obstacles: &ObstacleStream, tuning: &Tuning) -> bool {
    check_collision(bird_y, obstacles, tuning).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_with(pipes: &[Obstacle]) -> ObstacleStream {
        let mut stream = ObstacleStream::new();
        for pipe in pipes {
            stream.push(*pipe);
        }
        stream
    }

    fn pipe_at_bird(tuning: &Tuning, top_height: f32) -> Obstacle {
        Obstacle {
            id: 1,
            x: tuning.bird_x,
            top_height,
            passed: false,
        }
    }

    #[test]
    fn test_ceiling_and_ground() {
        let tuning = Tuning::default();
        let empty = ObstacleStream::new();

        assert_eq!(check_collision(-1.0, &empty, &tuning), Some(CrashCause::Ceiling));
        assert_eq!(check_collision(0.0, &empty, &tuning), Some(CrashCause::Ceiling));
        assert_eq!(
            check_collision(tuning.field_height - tuning.bird_size, &empty, &tuning),
            Some(CrashCause::Ground)
        );
        assert!(!collides(0.5, &empty, &tuning));
        assert!(!collides(
            tuning.field_height - tuning.bird_size - 0.5,
            &empty,
            &tuning
        ));
    }

    #[test]
    fn test_bird_inside_gap_survives() {
        let tuning = Tuning::default();
        let stream = stream_with(&[pipe_at_bird(&tuning, 100.0)]);

        // Inset box spans 154..176, gap spans 100..265
        assert!(!collides(150.0, &stream, &tuning));
    }

    #[test]
    fn test_bird_above_gap_hits_top_pipe() {
        let tuning = Tuning::default();
        let stream = stream_with(&[pipe_at_bird(&tuning, 100.0)]);

        assert_eq!(
            check_collision(50.0, &stream, &tuning),
            Some(CrashCause::Obstacle { id: 1 })
        );
    }

    #[test]
    fn test_bird_below_gap_hits_bottom_pipe() {
        let tuning = Tuning::default();
        let stream = stream_with(&[pipe_at_bird(&tuning, 100.0)]);

        // Inset bottom = y + 26 must exceed 265
        assert!(!collides(239.0, &stream, &tuning));
        assert!(collides(240.0, &stream, &tuning));
    }

    #[test]
    fn test_inset_forgives_edge_contact() {
        let tuning = Tuning::default();
        // Top pipe ends 2 units into the bird's full box, but not the inset box
        let stream = stream_with(&[pipe_at_bird(&tuning, 152.0)]);
        assert!(!collides(150.0, &stream, &tuning));

        let stream = stream_with(&[pipe_at_bird(&tuning, 155.0)]);
        assert!(collides(150.0, &stream, &tuning));
    }

    #[test]
    fn test_no_horizontal_overlap_no_hit() {
        let tuning = Tuning::default();
        let inset_right = tuning.bird_x + tuning.bird_size - tuning.hitbox_inset;
        let inset_left = tuning.bird_x + tuning.hitbox_inset;

        // Pipe starting exactly at the inset right edge does not overlap
        let ahead = Obstacle {
            id: 1,
            x: inset_right,
            top_height: 400.0,
            passed: false,
        };
        // Pipe ending exactly at the inset left edge does not overlap
        let behind = Obstacle {
            id: 2,
            x: inset_left - tuning.pipe_width,
            top_height: 400.0,
            passed: false,
        };
        assert_eq!(check_obstacles(150.0, [&ahead, &behind], &tuning), None);

        let touching = Obstacle {
            x: inset_right - 0.5,
            ..ahead
        };
        assert_eq!(
            check_obstacles(150.0, [&touching], &tuning),
            Some(CrashCause::Obstacle { id: 1 })
        );
    }

    #[test]
    fn test_first_hit_wins() {
        let tuning = Tuning::default();
        let first = Obstacle {
            id: 4,
            x: tuning.bird_x - 10.0,
            top_height: 400.0,
            passed: false,
        };
        let second = Obstacle {
            id: 5,
            x: tuning.bird_x,
            top_height: 400.0,
            passed: false,
        };
        let stream = stream_with(&[first, second]);
        assert_eq!(
            check_collision(150.0, &stream, &tuning),
            Some(CrashCause::Obstacle { id: 4 })
        );
    }

    #[test]
    fn test_hitbox_geometry() {
        let tuning = Tuning::default();
        let hitbox = Hitbox::bird(100.0, &tuning).inset(4.0);
        assert_eq!(hitbox.min, Vec2::new(54.0, 104.0));
        assert_eq!(hitbox.max, Vec2::new(76.0, 126.0));
    }
}
