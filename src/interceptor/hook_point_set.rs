use crate::interceptor::InterceptionHookPoint;

/// One flag per hook point for the current pass of an attempt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HookPointSet {
    armed: [bool; InterceptionHookPoint::COUNT],
}

impl HookPointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, point: InterceptionHookPoint) {
        self.armed[point.index()] = true;
    }

    pub fn contains(&self, point: InterceptionHookPoint) -> bool {
        self.armed[point.index()]
    }

    pub fn clear(&mut self) {
        self.armed = [false; InterceptionHookPoint::COUNT];
    }

    pub fn is_empty(&self) -> bool {
        !self.armed.iter().any(|armed| *armed)
    }

    /// Armed points in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = InterceptionHookPoint> + '_ {
        InterceptionHookPoint::ALL
            .into_iter()
            .filter(|point| self.contains(*point))
    }
}
