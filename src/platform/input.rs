//! Raw input to logical game actions
//!
//! The game has a single "activate" action (start or jump) plus the restart
//! button. Keyboard triggers must also suppress the browser's default
//! scrolling.

/// Logical action queued for the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Activate,
    Restart,
}

/// Result of mapping a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub action: InputAction,
    /// Call `preventDefault` so the page does not scroll
    pub prevent_default: bool,
}

/// Map a `KeyboardEvent.code` value
pub fn map_key(code: &str) -> Option<KeyOutcome> {
    match code {
        "Space" | "ArrowUp" => Some(KeyOutcome {
            action: InputAction::Activate,
            prevent_default: true,
        }),
        _ => None,
    }
}

/// Map a pointer event type (`mousedown`, `touchstart`)
pub fn map_pointer(event_type: &str) -> Option<InputAction> {
    match event_type {
        "mousedown" | "touchstart" => Some(InputAction::Activate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_keys_prevent_scrolling() {
        for code in ["Space", "ArrowUp"] {
            let outcome = map_key(code).expect("jump key");
            assert_eq!(outcome.action, InputAction::Activate);
            assert!(outcome.prevent_default);
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(map_key("ArrowDown"), None);
        assert_eq!(map_key("KeyW"), None);
        assert_eq!(map_key("Enter"), None);
    }

    #[test]
    fn test_pointer_events() {
        assert_eq!(map_pointer("mousedown"), Some(InputAction::Activate));
        assert_eq!(map_pointer("touchstart"), Some(InputAction::Activate));
        assert_eq!(map_pointer("mousemove"), None);
    }
}
