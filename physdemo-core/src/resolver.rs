//! Instantaneous state corrections for detected events.

use crate::engine::Model;
use crate::error::{Result, SimError};
use crate::event::Event;

/// Apply every event, in order, each against the state left by the previous
/// correction.
///
/// Fails with `UnresolvableEvent` before touching the state if the events
/// cannot be composed.
pub fn resolve(model: &mut Model, events: &[Event]) -> Result<()> {
    check_composable(events)?;

    let Model {
        system,
        state,
        time,
        ..
    } = model;
    let dynamics = system.dynamics_mut();
    for event in events {
        dynamics.resolve(state, event, *time)?;
        tracing::debug!(time = *time, event = ?event, "resolved event");
    }
    Ok(())
}

/// Reject event lists whose corrections overlap in a way order cannot fix.
pub fn check_composable(events: &[Event]) -> Result<()> {
    for (idx, event) in events.iter().enumerate() {
        let prior = &events[..idx];
        if prior.contains(event) {
            return Err(SimError::UnresolvableEvent(format!("duplicate event {event:?}")));
        }
        match *event {
            Event::Collision { a, b, .. } => {
                if a == b {
                    return Err(SimError::UnresolvableEvent(format!(
                        "body {a} cannot collide with itself"
                    )));
                }
                if let Some(p) = prior.iter().find(|p| p.bodies().iter().any(|x| *x == a || *x == b)) {
                    return Err(SimError::UnresolvableEvent(format!(
                        "collision {a}-{b} after {} event on a shared body",
                        p.label()
                    )));
                }
            }
            Event::BoundaryCross { body, axis, value } => {
                let opposing = prior.iter().any(|p| {
                    matches!(*p, Event::BoundaryCross { body: b, axis: ax, value: v }
                        if b == body && ax == axis && v != value)
                });
                if opposing {
                    return Err(SimError::UnresolvableEvent(format!(
                        "body {body} crossed two different {axis:?} boundaries in one step"
                    )));
                }
            }
            Event::ConstraintTransition { body, .. } => {
                let repeated = prior
                    .iter()
                    .any(|p| matches!(*p, Event::ConstraintTransition { body: b, .. } if b == body));
                if repeated {
                    return Err(SimError::UnresolvableEvent(format!(
                        "body {body} changed constraint twice in one step"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Post-collision velocities for two bodies on a line.
///
/// `e = 1` is perfectly elastic, `e = 0` perfectly inelastic. Momentum is
/// conserved for every `e`; kinetic energy only for `e = 1`.
pub fn collide(m1: f64, m2: f64, u1: f64, u2: f64, e: f64) -> (f64, f64) {
    let total = m1 + m2;
    if e == 1.0 {
        let v1 = ((m1 - m2) * u1 + 2.0 * m2 * u2) / total;
        let v2 = ((m2 - m1) * u2 + 2.0 * m1 * u1) / total;
        return (v1, v2);
    }
    let p = m1 * u1 + m2 * u2;
    let v1 = (p + m2 * e * (u2 - u1)) / total;
    let v2 = (p + m1 * e * (u1 - u2)) / total;
    (v1, v2)
}

/// Normal velocity after bouncing off a fixed boundary.
#[inline]
pub fn bounce(normal_velocity: f64, restitution: f64) -> f64 {
    -normal_velocity * restitution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Axis, Constraint};

    #[test]
    fn equal_masses_exchange_velocities() {
        let (v1, v2) = collide(1.5, 1.5, 2.0, -1.0, 1.0);
        assert!((v1 + 1.0).abs() < 1e-12);
        assert!((v2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn perfectly_inelastic_moves_together() {
        let (v1, v2) = collide(1.0, 3.0, 4.0, 0.0, 0.0);
        assert!((v1 - 1.0).abs() < 1e-12);
        assert!((v2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bounce_scales_by_restitution() {
        assert_eq!(bounce(-4.0, 1.0), 4.0);
        assert_eq!(bounce(-4.0, 0.5), 2.0);
    }

    #[test]
    fn collision_after_boundary_on_same_body_is_unresolvable() {
        let events = [
            Event::BoundaryCross {
                body: 0,
                axis: Axis::X,
                value: -5.0,
            },
            Event::Collision {
                a: 0,
                b: 1,
                relative_velocity: 1.0,
            },
        ];
        assert!(matches!(
            check_composable(&events),
            Err(SimError::UnresolvableEvent(_))
        ));
    }

    #[test]
    fn opposing_walls_for_one_body_are_unresolvable() {
        let events = [
            Event::BoundaryCross {
                body: 1,
                axis: Axis::X,
                value: -5.0,
            },
            Event::BoundaryCross {
                body: 1,
                axis: Axis::X,
                value: 5.0,
            },
        ];
        assert!(check_composable(&events).is_err());
    }

    #[test]
    fn collision_then_walls_composes() {
        let events = [
            Event::Collision {
                a: 0,
                b: 1,
                relative_velocity: 1.0,
            },
            Event::BoundaryCross {
                body: 1,
                axis: Axis::X,
                value: 5.0,
            },
            Event::ConstraintTransition {
                body: 0,
                from: Constraint::Moving,
                to: Constraint::Resting,
                at: 0.0,
            },
        ];
        assert!(check_composable(&events).is_ok());
    }
}
