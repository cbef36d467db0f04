//! Pig physics: gravity, ground clamp, jump and double jump

use super::state::Pig;

/// Which jump a press produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Single,
    Double,
}

impl Pig {
    /// Integrate velocity and position, then clamp to the ground line.
    ///
    /// Returns true when the pig touched ground this step (landing or
    /// still standing).
    pub fn apply_gravity(&mut self, gravity: f32, ground_line: f32, dt: f32) -> bool {
        self.vy += gravity * dt;
        self.y += self.vy * dt;

        let floor = ground_line - self.h;
        if self.y >= floor {
            self.y = floor;
            self.vy = 0.0;
            self.on_ground = true;
            self.can_double_jump = false;
            self.double_jump_used = false;
            true
        } else {
            self.on_ground = false;
            self.peak_height = self.peak_height.max(floor - self.y);
            false
        }
    }

    /// Jump from the ground, or spend the one double jump while airborne
    pub fn jump(&mut self, jump_velocity: f32, double_jump_velocity: f32) -> Option<JumpKind> {
        if self.on_ground {
            self.vy = jump_velocity;
            self.on_ground = false;
            self.can_double_jump = true;
            self.double_jump_used = false;
            self.peak_height = 0.0;
            Some(JumpKind::Single)
        } else if self.can_double_jump && !self.double_jump_used {
            self.vy = double_jump_velocity;
            self.double_jump_used = true;
            Some(JumpKind::Double)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    const G: f32 = 1550.0;

    #[test]
    fn test_grounded_pig_stays_put() {
        let mut pig = Pig::default();
        assert!(pig.apply_gravity(G, GROUND_Y, SIM_DT));
        assert_eq!(pig.y, GROUND_Y - PIG_H);
        assert_eq!(pig.vy, 0.0);
    }

    #[test]
    fn test_jump_then_land() {
        let mut pig = Pig::default();
        assert_eq!(pig.jump(-540.0, -430.0), Some(JumpKind::Single));
        assert!(!pig.on_ground);

        let mut landed = false;
        for _ in 0..240 {
            if pig.apply_gravity(G, GROUND_Y, SIM_DT) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(pig.on_ground);
        assert!(!pig.can_double_jump);
        // Apex of v²/2g ≈ 94px
        assert!((pig.peak_height - 94.0).abs() < 5.0, "peak {}", pig.peak_height);
    }

    #[test]
    fn test_double_jump_only_once() {
        let mut pig = Pig::default();
        pig.jump(-540.0, -430.0);
        pig.apply_gravity(G, GROUND_Y, SIM_DT);
        assert_eq!(pig.jump(-540.0, -430.0), Some(JumpKind::Double));
        assert_eq!(pig.vy, -430.0);
        pig.apply_gravity(G, GROUND_Y, SIM_DT);
        assert_eq!(pig.jump(-540.0, -430.0), None);
    }

    #[test]
    fn test_no_double_jump_after_walking_off() {
        // Airborne without a grounded jump (e.g. fan launch): no double jump armed
        let mut pig = Pig::default();
        pig.vy = -700.0;
        pig.on_ground = false;
        assert_eq!(pig.jump(-540.0, -430.0), None);
    }

    #[test]
    fn test_lowered_ground_line() {
        let mut pig = Pig::default();
        pig.on_ground = false;
        pig.apply_gravity(G, GROUND_Y + 100.0, 0.05);
        // Falls toward the dropped ground but not through it
        assert!(pig.y > GROUND_Y - PIG_H);
        for _ in 0..200 {
            pig.apply_gravity(G, GROUND_Y + 100.0, SIM_DT);
        }
        assert_eq!(pig.y, GROUND_Y + 100.0 - PIG_H);
    }
}
