use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::Category;

/// Fixed reduction tips per category.
pub fn tips_for(category: Category) -> &'static [&'static str; 3] {
    match category {
        Category::Transportation => &[
            "Use public transport or switch to electric vehicles.",
            "Carpool with friends or colleagues to save fuel and lower emissions.",
            "Consider biking or walking for short distances.",
        ],
        Category::Electricity => &[
            "Opt for energy-efficient appliances.",
            "Use renewable energy sources like solar or wind.",
            "Turn off lights and appliances when not in use.",
        ],
        Category::Diet => &[
            "Reduce meat consumption, opt for plant-based meals.",
            "Buy organic foods that are grown without synthetic pesticides.",
            "Minimize food waste by planning meals ahead.",
        ],
        Category::Waste => &[
            "Recycle and compost organic waste.",
            "Reduce single-use plastics and opt for reusable items.",
            "Properly dispose of hazardous materials to avoid pollution.",
        ],
    }
}

/// Uniformly pick one tip for `category` using the caller's generator.
pub fn pick_advice_for<R: Rng + ?Sized>(category: Category, rng: &mut R) -> &'static str {
    let tips = tips_for(category);
    tips[rng.gen_range(0..tips.len())]
}

/// Generator for advice selection. A fixed seed makes the picks reproducible.
pub fn advice_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::seed_from_u64(rand::random()),
    }
}
