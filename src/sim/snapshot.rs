//! Read-only render state published after each frame
//!
//! Renderers get an owned copy and never touch [`GameState`] directly.

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirdView {
    pub y: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub top_height: f32,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub bird: BirdView,
    pub obstacles: Vec<ObstacleView>,
    pub score: u32,
    pub high_score: u32,
    pub phase: GamePhase,
}

impl From<&GameState> for RenderSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            bird: BirdView {
                y: state.bird.y,
                rotation: state.bird.rotation,
            },
            obstacles: state
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    x: o.x,
                    top_height: o.top_height,
                })
                .collect(),
            score: state.score,
            high_score: state.high_score,
            phase: state.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Obstacle;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_is_detached_copy() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, 9, &tuning);
        state.obstacles.push(Obstacle {
            id: 3,
            x: 120.0,
            top_height: 80.0,
            passed: true,
        });

        let snapshot = RenderSnapshot::from(&state);
        state.obstacles.advance(10.0);
        state.bird.y = 0.0;

        assert_eq!(snapshot.bird.y, tuning.initial_bird_y);
        assert_eq!(
            snapshot.obstacles,
            vec![ObstacleView {
                id: 3,
                x: 120.0,
                top_height: 80.0
            }]
        );
        assert_eq!(snapshot.high_score, 9);
        assert_eq!(snapshot.phase, GamePhase::Idle);
    }

    #[test]
    fn test_snapshot_serializes() {
        let tuning = Tuning::default();
        let state = GameState::new(1, 0, &tuning);
        let json = serde_json::to_string(&RenderSnapshot::from(&state)).expect("serialize");
        assert!(json.contains("\"phase\":\"Idle\""));
        assert!(json.contains("\"obstacles\":[]"));
    }
}
