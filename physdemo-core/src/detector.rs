use crate::engine::Model;
use crate::event::{sort_by_precedence, Event};

/// Events between `prev` and `next`, in resolution order.
///
/// Pure: reads the model's parameters, never writes them.
pub fn detect(prev: &[f64], next: &[f64], model: &Model) -> Vec<Event> {
    let mut events = model.dynamics().detect(prev, next, model.step_size);
    sort_by_precedence(&mut events);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimulationKind;

    #[test]
    fn mutual_collision_reported_before_wall() {
        let model = Model::new(SimulationKind::Collision1D);
        // Block 2 overlaps block 1 and sits in the right wall, all moving right/left.
        let prev = vec![4.0, 4.6, 3.0, 1.0];
        let next = vec![4.3, 4.76, 3.0, 1.0];
        let events = detect(&prev, &next, &model);
        assert!(events.len() >= 2, "{events:?}");
        assert!(matches!(events[0], Event::Collision { a: 0, b: 1, .. }));
        assert!(events[1..]
            .iter()
            .all(|e| matches!(e, Event::BoundaryCross { .. })));
    }

    #[test]
    fn detection_does_not_touch_model() {
        let model = Model::new(SimulationKind::Projectile);
        let before = model.parameters();
        let _ = detect(&[0.0, 0.1, 1.0, -1.0], &[0.05, -0.1, 1.0, -1.5], &model);
        assert_eq!(model.parameters(), before);
        assert_eq!(model.time, 0.0);
    }
}
