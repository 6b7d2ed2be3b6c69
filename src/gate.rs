//! Decides whether a frame callback should do any work.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    /// Surface is scrolled out of view.
    Hidden,
    /// Too soon after the last accepted frame.
    Throttled,
}

#[derive(Debug, Clone)]
pub struct FrameGate {
    interval_ms: Option<f64>,
    last_accepted: Option<f64>,
    visible: bool,
}

impl FrameGate {
    /// `target_fps` of `None` (or a non-positive value) leaves frames uncapped.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval_ms = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| 1000.0 / fps as f64);
        Self {
            interval_ms,
            last_accepted: None,
            visible: true,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn interval_ms(&self) -> Option<f64> {
        self.interval_ms
    }

    pub fn admit(&mut self, now_ms: f64) -> GateDecision {
        if !self.visible {
            return GateDecision::Hidden;
        }
        if let (Some(interval), Some(last)) = (self.interval_ms, self.last_accepted) {
            if now_ms - last < interval {
                return GateDecision::Throttled;
            }
        }
        self.last_accepted = Some(now_ms);
        GateDecision::Accept
    }

    /// Forget the last accepted frame so the next one is admitted.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_accepts_everything_visible() {
        let mut gate = FrameGate::new(None);
        assert_eq!(gate.admit(0.0), GateDecision::Accept);
        assert_eq!(gate.admit(0.1), GateDecision::Accept);
    }

    #[test]
    fn thirty_fps_skips_frames_under_33ms() {
        let mut gate = FrameGate::new(Some(30.0));
        assert_eq!(gate.admit(1000.0), GateDecision::Accept);
        assert_eq!(gate.admit(1016.0), GateDecision::Throttled);
        assert_eq!(gate.admit(1033.0), GateDecision::Throttled);
        assert_eq!(gate.admit(1034.0), GateDecision::Accept);
        // measured from the last accepted frame, not the last callback
        assert_eq!(gate.admit(1050.0), GateDecision::Throttled);
    }

    #[test]
    fn hidden_wins_over_throttle() {
        let mut gate = FrameGate::new(Some(30.0));
        gate.set_visible(false);
        assert_eq!(gate.admit(0.0), GateDecision::Hidden);
        gate.set_visible(true);
        assert_eq!(gate.admit(0.0), GateDecision::Accept);
    }

    #[test]
    fn zero_fps_is_uncapped() {
        assert_eq!(FrameGate::new(Some(0.0)).interval_ms(), None);
    }
}
