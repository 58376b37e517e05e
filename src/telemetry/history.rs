/// Maximum number of trailing positions kept per unit.
pub const HISTORY_CAPACITY: usize = 50;

pub type Position = [f64; 2];

/// Appends `point` and drops the oldest entries until the history fits.
pub fn append_position(history: &mut Vec<Position>, point: Position) {
    history.push(point);
    if history.len() > HISTORY_CAPACITY {
        let excess = history.len() - HISTORY_CAPACITY;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order() {
        let mut history = Vec::new();
        append_position(&mut history, [1.0, 2.0]);
        append_position(&mut history, [3.0, 4.0]);
        assert_eq!(history, vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn never_exceeds_capacity_and_drops_oldest_first() {
        let mut history = Vec::new();
        for i in 0..(HISTORY_CAPACITY + 17) {
            append_position(&mut history, [i as f64, -(i as f64)]);
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0], [17.0, -17.0]);
        assert_eq!(
            history[HISTORY_CAPACITY - 1],
            [(HISTORY_CAPACITY + 16) as f64, -((HISTORY_CAPACITY + 16) as f64)]
        );
    }

    #[test]
    fn trims_oversized_baseline() {
        let mut history: Vec<Position> = (0..60).map(|i| [i as f64, 0.0]).collect();
        append_position(&mut history, [99.0, 0.0]);
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0], [11.0, 0.0]);
        assert_eq!(history.last(), Some(&[99.0, 0.0]));
    }
}
