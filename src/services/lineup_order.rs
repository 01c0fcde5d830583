use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Slot numbers 1..=n for ids already in running order.
pub fn renumber(ordered_ids: &[Uuid]) -> Vec<(Uuid, i32)> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i32 + 1))
        .collect()
}

/// Swaps `id` with its neighbour. Returns `None` if `id` is not in the
/// lineup; moving past either end leaves the order unchanged.
pub fn move_entry(ordered_ids: &[Uuid], id: Uuid, direction: MoveDirection) -> Option<Vec<Uuid>> {
    let idx = ordered_ids.iter().position(|e| *e == id)?;
    let mut reordered = ordered_ids.to_vec();

    let swap_with = match direction {
        MoveDirection::Up if idx > 0 => Some(idx - 1),
        MoveDirection::Down if idx + 1 < reordered.len() => Some(idx + 1),
        _ => None,
    };
    if let Some(other) = swap_with {
        reordered.swap(idx, other);
    }

    Some(reordered)
}

/// The slot for a newly approved performer: one past the current last slot.
pub fn next_slot(current_max: i32) -> i32 {
    current_max.max(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_renumber_is_contiguous_from_one() {
        let lineup = ids(3);
        let slots = renumber(&lineup);
        assert_eq!(
            slots,
            vec![(lineup[0], 1), (lineup[1], 2), (lineup[2], 3)]
        );
        assert!(renumber(&[]).is_empty());
    }

    #[test]
    fn test_move_up_and_down() {
        let lineup = ids(3);

        let moved = move_entry(&lineup, lineup[2], MoveDirection::Up).unwrap();
        assert_eq!(moved, vec![lineup[0], lineup[2], lineup[1]]);

        let moved = move_entry(&lineup, lineup[0], MoveDirection::Down).unwrap();
        assert_eq!(moved, vec![lineup[1], lineup[0], lineup[2]]);
    }

    #[test]
    fn test_move_past_the_ends_is_a_no_op() {
        let lineup = ids(2);
        assert_eq!(
            move_entry(&lineup, lineup[0], MoveDirection::Up).unwrap(),
            lineup
        );
        assert_eq!(
            move_entry(&lineup, lineup[1], MoveDirection::Down).unwrap(),
            lineup
        );
    }

    #[test]
    fn test_move_unknown_entry() {
        assert!(move_entry(&ids(2), Uuid::new_v4(), MoveDirection::Up).is_none());
    }

    #[test]
    fn test_next_slot_follows_gaps() {
        assert_eq!(next_slot(0), 1);
        // A lineup of 1, 2, 5 appends at 6 rather than reusing 4.
        assert_eq!(next_slot(5), 6);
    }
}
