//! Pointer tracking with exponential easing and a decaying intensity.

/// Plain 2-component vector in container-relative space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const CENTER: Vec2 = Vec2 { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Flip `y` for GL's bottom-left origin.
    pub fn flip_y(self) -> Vec2 {
        Vec2::new(self.x, 1.0 - self.y)
    }
}

/// Raw pointer input, positions normalised to 0..1 with origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter(Vec2),
    Move(Vec2),
    Leave,
}

/// Which blending rate the tracker is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseFactor {
    Follow,
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub current: Vec2,
    pub target: Vec2,
    pub previous_target: Vec2,
    pub intensity: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            current: Vec2::CENTER,
            target: Vec2::CENTER,
            previous_target: Vec2::CENTER,
            intensity: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    state: PointerState,
    ease: EaseFactor,
    follow_ease: f32,
    settle_ease: f32,
    decay_step: f32,
}

impl PointerTracker {
    pub fn new(follow_ease: f32, settle_ease: f32, decay_step: f32) -> Self {
        Self {
            state: PointerState::default(),
            ease: EaseFactor::Follow,
            follow_ease,
            settle_ease,
            decay_step,
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn ease(&self) -> EaseFactor {
        self.ease
    }

    pub fn ease_value(&self) -> f32 {
        match self.ease {
            EaseFactor::Follow => self.follow_ease,
            EaseFactor::Settle => self.settle_ease,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter(at) => {
                self.state.current = at;
                self.state.target = at;
                self.ease = EaseFactor::Follow;
            }
            PointerEvent::Move(at) => {
                self.state.previous_target = self.state.target;
                self.state.target = at;
                self.state.intensity = 1.0;
                self.ease = EaseFactor::Follow;
            }
            PointerEvent::Leave => {
                self.ease = EaseFactor::Settle;
                // relaxes toward the last interior point, not the exit point
                self.state.target = self.state.previous_target;
            }
        }
    }

    /// Advance one animation tick.
    pub fn tick(&mut self) {
        let k = self.ease_value();
        let s = &mut self.state;
        s.current.x += (s.target.x - s.current.x) * k;
        s.current.y += (s.target.y - s.current.y) * k;
        s.intensity = (s.intensity - self.decay_step).max(0.0);
    }
}
