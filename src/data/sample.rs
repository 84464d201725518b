use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::loader::SLOPE_PREFIX;
use super::model::{Measurement, Variant};

// ---------------------------------------------------------------------------
// Synthetic result files
// ---------------------------------------------------------------------------

/// Render a result file in the layout the loader expects.
pub fn render_result_file(field: &str, variant: Variant, run: usize, m: &Measurement) -> String {
    format!(
        "Point-to-point analysis for {field} ({variant}), run {run}\n\
         Cell size: 27 arcsec\n\
         Number of cells: 112\n\
         {SLOPE_PREFIX}{:.4} +- {:.4}\n\
         Pearson and Spearman R (statistic, p-value):\n\
         ({:.4}, 1.0e-08)\n\
         Pearson R bootstrap error {:.4}\n\
         ({:.4}, 1.0e-08)\n\
         Spearman R bootstrap error {:.4}\n",
        m.slope, m.slope_err, m.pearson, m.pearson_err, m.spearman, m.spearman_err,
    )
}

/// Write `runs` noisy result files per field and variant into `out_dir`.
///
/// Each field gets its own true slope; rudnick runs scatter a little more
/// than uv-subtracted ones.
pub fn write_sample_results(
    out_dir: &Path,
    fields: &[String],
    runs: usize,
    seed: u64,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut rng = SimpleRng::new(seed);
    let mut written = Vec::with_capacity(fields.len() * Variant::ALL.len() * runs);

    for (i, field) in fields.iter().enumerate() {
        let true_slope = 0.6 + 0.25 * i as f64;
        for variant in Variant::ALL {
            let scatter = match variant {
                Variant::Cb => 0.03,
                Variant::Rudnick => 0.05,
            };
            for run in 0..runs {
                let m = Measurement {
                    slope: rng.gauss(true_slope, scatter),
                    slope_err: 0.02 + rng.next_f64() * 0.04,
                    pearson: rng.gauss(0.8, 0.03).min(1.0),
                    pearson_err: 0.01 + rng.next_f64() * 0.02,
                    spearman: rng.gauss(0.78, 0.03).min(1.0),
                    spearman_err: 0.01 + rng.next_f64() * 0.02,
                };
                let path = out_dir.join(format!("{field}results_{}_{run}.txt", variant.tag()));
                fs::write(&path, render_result_file(field, variant, run, &m))?;
                written.push(path);
            }
        }
    }

    Ok(written)
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}
