//! Small numeric helpers shared by the editors.

/// Step `value` by one within `0..modulo`, wrapping at both ends.
#[inline]
pub fn wrap_step(value: u8, modulo: u8, up: bool) -> u8 {
    let m = modulo.max(1);
    let v = value % m;
    if up {
        if v + 1 >= m { 0 } else { v + 1 }
    } else if v == 0 {
        m - 1
    } else {
        v - 1
    }
}

/// Step `value` by `step` and clamp to `[0, max]`. Non-finite input maps to 0.
#[inline]
pub fn clamp_step(value: f32, step: f32, max: f32, up: bool) -> f32 {
    let base = if value.is_finite() { value } else { 0.0 };
    let next = if up { base + step } else { base - step };
    next.clamp(0.0, max.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_step_wraps_both_ways() {
        assert_eq!(wrap_step(23, 24, true), 0);
        assert_eq!(wrap_step(0, 24, false), 23);
        assert_eq!(wrap_step(59, 60, true), 0);
        assert_eq!(wrap_step(10, 60, false), 9);
    }

    #[test]
    fn clamp_step_never_leaves_range() {
        assert_eq!(clamp_step(0.0, 100.0, 9999.0, false), 0.0);
        assert_eq!(clamp_step(9950.0, 100.0, 9999.0, true), 9999.0);
        assert_eq!(clamp_step(f32::NAN, 10.0, 5000.0, true), 10.0);
    }
}
