//! Attack/decay/sustain/release amplitude envelope.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed ADSR shape shared by every voice in a pool.
///
/// Key-on ramps linearly from 0 to 1 over `attack`, then to `sustain` over
/// `decay`, and holds. Key-off ramps from whatever level was reached down
/// to 0 over `release`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adsr {
    pub attack: Duration,
    pub decay: Duration,
    pub sustain: f32,
    pub release: Duration,
}

impl Adsr {
    pub fn new(attack: Duration, decay: Duration, sustain: f32, release: Duration) -> Self {
        Self {
            attack,
            decay,
            sustain: sustain.clamp(0.0, 1.0),
            release,
        }
    }

    /// Level while the key is held, `t` after key-on.
    pub fn held_level(&self, t: Duration) -> f32 {
        if t < self.attack {
            return ramp(t, self.attack);
        }
        let t = t - self.attack;
        if t < self.decay {
            return 1.0 - (1.0 - self.sustain) * ramp(t, self.decay);
        }
        self.sustain
    }

    /// Level `t` after key-on, given the key-off time (relative to key-on)
    /// if the key has been released.
    pub fn level(&self, t: Duration, key_off: Option<Duration>) -> f32 {
        match key_off {
            Some(off) if t >= off => {
                let from = self.held_level(off);
                let since = t - off;
                if since >= self.release {
                    0.0
                } else {
                    from * (1.0 - ramp(since, self.release))
                }
            }
            _ => self.held_level(t),
        }
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 1.0, Duration::ZERO)
    }
}

/// Linear progress of `t` through `total`, 1.0 when `total` is zero.
fn ramp(t: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (t.as_secs_f64() / total.as_secs_f64()).min(1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_attack_decay_sustain() {
        let env = Adsr::new(ms(100), ms(100), 0.5, ms(100));
        assert!(approx(env.held_level(ms(0)), 0.0));
        assert!(approx(env.held_level(ms(50)), 0.5));
        assert!(approx(env.held_level(ms(100)), 1.0));
        assert!(approx(env.held_level(ms(150)), 0.75));
        assert!(approx(env.held_level(ms(200)), 0.5));
        assert!(approx(env.held_level(ms(5000)), 0.5));
    }

    #[test]
    fn test_release_from_sustain() {
        let env = Adsr::new(ms(10), ms(10), 0.8, ms(100));
        let off = Some(ms(500));
        assert!(approx(env.level(ms(400), off), 0.8));
        assert!(approx(env.level(ms(550), off), 0.4));
        assert!(approx(env.level(ms(600), off), 0.0));
        assert!(approx(env.level(ms(900), off), 0.0));
    }

    #[test]
    fn test_release_during_attack() {
        let env = Adsr::new(ms(100), ms(0), 1.0, ms(100));
        // Released at half level; release starts from there.
        let off = Some(ms(50));
        assert!(approx(env.level(ms(50), off), 0.5));
        assert!(approx(env.level(ms(100), off), 0.25));
    }

    #[test]
    fn test_zero_times() {
        let env = Adsr::default();
        assert!(approx(env.level(ms(0), None), 1.0));
        assert!(approx(env.level(ms(1), Some(ms(1))), 0.0));
    }

    #[test]
    fn test_sustain_clamped() {
        let env = Adsr::new(ms(1), ms(1), 3.0, ms(1));
        assert_eq!(env.sustain, 1.0);
    }
}
