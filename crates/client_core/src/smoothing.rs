//! Critically damped smoothing and angle helpers shared by the character and
//! camera integrators. Angles are in degrees.

/// Wrap `t` into `[0, length]`.
#[must_use]
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0.0, length)
}

/// Shortest signed difference `target - current`, in `(-180, 180]`.
#[must_use]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let d = repeat(target - current, 360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Critically damped spring towards `target`, reaching it in roughly
/// `smooth_time` seconds. `velocity` is carried between calls. A
/// non-positive `dt` leaves everything untouched.
#[must_use]
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let original_to = target;
    let max_change = max_speed * smooth_time;
    let change = (current - target).clamp(-max_change, max_change);
    let target = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // No overshoot past the original target.
    if (original_to - current > 0.0) == (output > original_to) {
        output = original_to;
        *velocity = 0.0;
    }
    output
}

/// `smooth_damp` along the shortest arc; the result stays continuous with
/// `current` (it is not wrapped).
#[must_use]
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, max_speed, dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn delta_angle_takes_short_way() {
        assert_abs_diff_eq!(delta_angle(350.0, 10.0), 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(delta_angle(10.0, 350.0), -20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(delta_angle(0.0, 180.0), 180.0, epsilon = 1e-4);
        assert_abs_diff_eq!(delta_angle(720.0, 5.0), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut v = 0.0;
        let mut x = 0.0;
        for _ in 0..200 {
            x = smooth_damp(x, 10.0, &mut v, 0.1, f32::INFINITY, 0.02);
            assert!(x <= 10.0 + 1e-5);
        }
        assert_abs_diff_eq!(x, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn smooth_damp_zero_dt_is_noop() {
        let mut v = 3.0;
        let x = smooth_damp(1.0, 5.0, &mut v, 0.1, f32::INFINITY, 0.0);
        assert_eq!(x, 1.0);
        assert_eq!(v, 3.0);
    }

    #[test]
    fn smooth_damp_angle_wraps_through_zero() {
        let mut v = 0.0;
        let mut a = 350.0;
        for _ in 0..100 {
            a = smooth_damp_angle(a, 10.0, &mut v, 0.1, f32::INFINITY, 0.02);
        }
        assert_abs_diff_eq!(a, 370.0, epsilon = 1e-2);
    }
}
