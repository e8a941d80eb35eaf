//! RNG trait abstraction for damage rolls
//!
//! Lets the damage model work with any `rand::Rng`, including seeded
//! generators for deterministic tests.

/// Random number generator used for probabilistic damage
pub trait DamageRng {
    /// Generate random f64 in [0.0, 1.0)
    fn gen_f64(&mut self) -> f64;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f64) -> bool {
        self.gen_f64() < probability
    }
}

impl<T: ?Sized + rand::Rng> DamageRng for T {
    fn gen_f64(&mut self) -> f64 {
        rand::Rng::r#gen(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_damage_rng_range() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);
        for _ in 0..100 {
            let val = rng.gen_f64();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_check_probability_extremes() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);
        for _ in 0..100 {
            assert!(rng.check_probability(1.0));
            assert!(!rng.check_probability(0.0));
            assert!(!rng.check_probability(-0.5));
        }
    }

    #[test]
    fn test_damage_rng_deterministic() {
        let mut rng1 = Xoshiro256StarStar::seed_from_u64(42);
        let mut rng2 = Xoshiro256StarStar::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(rng1.gen_f64(), rng2.gen_f64());
        }
    }
}
