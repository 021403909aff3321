//! ADX: Average Directional Index (Wilder).
//!
//! 1. +DM / −DM and true range from consecutive bars
//! 2. Wilder-smooth all three
//! 3. +DI, −DI = 100 × smoothed DM / smoothed TR
//! 4. DX = 100 × |+DI − −DI| / (+DI + −DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! The first value appears at index `2 * period - 1`.

use common::Bar;

use super::ema::wilder;

pub fn adx(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    if n < 2 {
        return vec![f64::NAN; n];
    }

    let mut tr = vec![f64::NAN; n];
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let (cur, prev) = (&bars[i], &bars[i - 1]);
        let up = cur.high - prev.high;
        let down = prev.low - cur.low;
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
        tr[i] = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        if [cur.high, cur.low, prev.high, prev.low, prev.close]
            .iter()
            .any(|v| !v.is_finite())
        {
            plus_dm[i] = f64::NAN;
            minus_dm[i] = f64::NAN;
            tr[i] = f64::NAN;
        }
    }

    let smooth_tr = wilder(&tr, period);
    let smooth_plus = wilder(&plus_dm, period);
    let smooth_minus = wilder(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        let (t, p, m) = (smooth_tr[i], smooth_plus[i], smooth_minus[i]);
        if !(t.is_finite() && p.is_finite() && m.is_finite()) || t == 0.0 {
            continue;
        }
        let plus_di = 100.0 * p / t;
        let minus_di = 100.0 * m / t;
        let sum = plus_di + minus_di;
        dx[i] = if sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / sum
        };
    }

    wilder(&dx, period)
}
