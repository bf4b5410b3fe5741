//! Discrete events reported by the detectors.
//!
//! Events carry only what the resolver needs; they never own model state.

/// Coordinate an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Angle,
}

/// Qualitative contact state of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Moving,
    Resting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Two bodies met during the step. `relative_velocity` is `u_a - u_b`
    /// before the collision.
    Collision {
        a: usize,
        b: usize,
        relative_velocity: f64,
    },
    /// A body crossed the plane `axis = value`.
    BoundaryCross { body: usize, axis: Axis, value: f64 },
    /// A body switched contact state at coordinate `at`.
    ConstraintTransition {
        body: usize,
        from: Constraint,
        to: Constraint,
        at: f64,
    },
}

impl Event {
    /// Precedence class; collisions are physically prior to everything else.
    #[inline]
    fn order_key(&self) -> u8 {
        match self {
            Event::Collision { .. } => 0,
            Event::ConstraintTransition { .. } => 1,
            Event::BoundaryCross { .. } => 2,
        }
    }

    /// Bodies whose degrees of freedom this event corrects.
    pub fn bodies(&self) -> Vec<usize> {
        match *self {
            Event::Collision { a, b, .. } => vec![a, b],
            Event::BoundaryCross { body, .. } | Event::ConstraintTransition { body, .. } => {
                vec![body]
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Event::Collision { .. } => "collision",
            Event::BoundaryCross { .. } => "boundary",
            Event::ConstraintTransition { .. } => "constraint",
        }
    }
}

/// Put events into resolution order. Stable, so detector order is kept
/// within a class.
pub fn sort_by_precedence(events: &mut [Event]) {
    events.sort_by_key(Event::order_key);
}
