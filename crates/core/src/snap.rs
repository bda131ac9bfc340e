/// Index of the item boundary nearest to `offset`, ties toward the higher
/// index. `None` while the item width is not known.
pub fn nearest_index(offset: f64, item_width: f64) -> Option<i64> {
    if !item_width.is_finite() || item_width <= 0.0 || !offset.is_finite() {
        return None;
    }
    Some((offset / item_width + 0.5).floor() as i64)
}

/// The aligned offset a snap animates to.
pub fn snap_target(offset: f64, item_width: f64) -> Option<f64> {
    nearest_index(offset, item_width).map(|index| index as f64 * item_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_boundary() {
        assert_eq!(snap_target(449.0, 100.0), Some(400.0));
        assert_eq!(snap_target(451.0, 100.0), Some(500.0));
        assert_eq!(snap_target(400.0, 100.0), Some(400.0));
    }

    #[test]
    fn ties_go_up() {
        assert_eq!(nearest_index(450.0, 100.0), Some(5));
        assert_eq!(nearest_index(-50.0, 100.0), Some(0));
    }

    #[test]
    fn unmeasured_width_skips() {
        assert_eq!(snap_target(449.0, 0.0), None);
        assert_eq!(snap_target(449.0, -3.0), None);
    }
}
