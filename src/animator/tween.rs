//! Linear interpolation of the turnout gauge, one step at a time.
//!
//! [`Tween`] knows nothing about time. The ticker in [`super::ProgressAnimator`] calls [`Tween::advance`]
//! once per step interval.

/// Values closer than this to the target count as having reached it
pub const CONVERGENCE_EPSILON: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// the gauge should now show this value, more steps follow
    Intermediate(f64),
    /// last step: the gauge lands exactly on the target
    Done(f64),
}

#[derive(Debug, Clone)]
pub struct Tween {
    start: f64,
    target: f64,
    step_value: f64,
    steps: u32,
    current_step: u32,
}

impl Tween {
    /// A tween from `start` to `target` in `steps` equal increments. Zero steps behaves like one.
    pub fn new(start: f64, target: f64, steps: u32) -> Self {
        let steps = steps.max(1);
        Self {
            start,
            target,
            step_value: (target - start) / steps as f64,
            steps,
            current_step: 0,
        }
    }

    pub fn advance(&mut self) -> Step {
        self.current_step += 1;
        let value = (self.start + self.step_value * self.current_step as f64).clamp(0.0, 100.0);

        if self.current_step >= self.steps || (value - self.target).abs() < CONVERGENCE_EPSILON {
            Step::Done(self.target)
        } else {
            Step::Intermediate(value)
        }
    }
}
