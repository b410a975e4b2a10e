pub mod rng;

pub use rng::{mix_seed, seeded_rng};
