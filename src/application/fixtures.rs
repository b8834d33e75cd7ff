//! Seeded synthetic survey data for tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::training::REQUIRED_COLUMNS;

const GENDERS: [&str; 4] = ["Female", "Male", "Other", "Prefer not to say"];
const STRESS: [&str; 4] = ["Low", "Moderate", "High", "Severe"];
const ACTIVITY: [&str; 3] = ["Low", "Moderate", "High"];
const YES_NO: [&str; 2] = ["Yes", "No"];
const TREATMENT: [&str; 4] = ["None", "Medication", "Therapy", "Both"];
const WORK: [&str; 4] = ["Employed", "Unemployed", "Student", "Retired"];

fn pick(rng: &mut ChaCha20Rng, values: &[&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

/// CSV text with `rows` respondents. A few sleep, activity and treatment
/// cells are left blank so imputation is exercised.
pub(crate) fn synthetic_csv(rows: usize, seed: u64) -> String {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut out = REQUIRED_COLUMNS.join(",");
    out.push('\n');

    for i in 0..rows {
        let depression: u32 = rng.gen_range(0..=27);
        let anxiety: u32 = rng.gen_range(0..=21);
        let sleep = if i % 17 == 5 {
            String::new()
        } else {
            format!("{:.1}", rng.gen_range(4.0..9.5))
        };
        let activity = if i % 13 == 4 { "" } else { pick(&mut rng, &ACTIVITY) };
        let treatment = if i % 11 == 3 { "" } else { pick(&mut rng, &TREATMENT) };

        let fields = [
            rng.gen_range(18..70u32).to_string(),
            pick(&mut rng, &GENDERS).to_string(),
            depression.to_string(),
            anxiety.to_string(),
            pick(&mut rng, &STRESS).to_string(),
            sleep,
            activity.to_string(),
            pick(&mut rng, &YES_NO).to_string(),
            pick(&mut rng, &YES_NO).to_string(),
            treatment.to_string(),
            rng.gen_range(0..365u32).to_string(),
            pick(&mut rng, &WORK).to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}
