use crate::types::{ItemType, Position, ANIMATION_SETTLE_EPS, ANIMATION_STEP, ROBOT_CAPACITY};
use std::collections::VecDeque;

/// The warehouse robot: grid position, animated position (in cell units,
/// read by the presentation layer and by the executor's step gate),
/// battery level and FIFO inventory.
pub struct Robot {
    pub pos: Position,
    pub anim_x: f32,
    pub anim_y: f32,
    pub battery: f32,
    pub inventory: VecDeque<ItemType>,
}

impl Robot {
    pub fn new(start: Position) -> Self {
        Self {
            pos: start,
            anim_x: start.x as f32,
            anim_y: start.y as f32,
            battery: 100.0,
            inventory: VecDeque::new(),
        }
    }

    pub fn inventory_full(&self) -> bool {
        self.inventory.len() >= ROBOT_CAPACITY
    }

    /// Advances the animated position toward the grid position by one
    /// animation step per axis, clamping onto the target.
    pub fn step_animation(&mut self) {
        let tx = self.pos.x as f32;
        let ty = self.pos.y as f32;
        self.anim_x = step_toward(self.anim_x, tx);
        self.anim_y = step_toward(self.anim_y, ty);
    }

    /// True once the rendered position has caught up with the grid
    /// position. The executor and planner only act when this holds, so at
    /// most one grid-cell advance is ever pending.
    pub fn animation_settled(&self) -> bool {
        (self.anim_x - self.pos.x as f32).abs() <= ANIMATION_SETTLE_EPS
            && (self.anim_y - self.pos.y as f32).abs() <= ANIMATION_SETTLE_EPS
    }
}

fn step_toward(current: f32, target: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= ANIMATION_STEP {
        target
    } else if delta > 0.0 {
        current + ANIMATION_STEP
    } else {
        current - ANIMATION_STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_converges_and_settles() {
        let mut robot = Robot::new(Position::new(0, 0));
        assert!(robot.animation_settled());

        robot.pos = Position::new(1, 0);
        assert!(!robot.animation_settled());

        // One cell at 0.05 per tick settles within 20 ticks.
        for _ in 0..20 {
            robot.step_animation();
        }
        assert!(robot.animation_settled());
        assert_eq!(robot.anim_x, 1.0);
        assert_eq!(robot.anim_y, 0.0);
    }

    #[test]
    fn inventory_capacity() {
        let mut robot = Robot::new(Position::new(0, 0));
        assert!(!robot.inventory_full());
        for _ in 0..ROBOT_CAPACITY {
            robot.inventory.push_back(ItemType::A);
        }
        assert!(robot.inventory_full());
    }
}
