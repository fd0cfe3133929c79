use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/////////////////////
// Enums | Helpers //
/////////////////////

/// Sidedness of a z-score test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestAlternative {
    /// Two sided test for the Z-score
    TwoSided,
    /// One-sided test for greater than
    Greater,
    /// One-sided test for lesser than
    Less,
}

/// Helper function to get the test alternative
///
/// ### Params
///
/// * `s` - String, type of test to run.
///
/// ### Returns
///
/// Option of the `TestAlternative`
pub fn get_test_alternative(s: &str) -> Option<TestAlternative> {
    match s.to_lowercase().as_str() {
        "greater" => Some(TestAlternative::Greater),
        "less" => Some(TestAlternative::Less),
        "twosided" => Some(TestAlternative::TwoSided),
        _ => None,
    }
}

///////////////
// Functions //
///////////////

/// Transform a Z-score into a p-value (assuming normality).
///
/// Far tails (|z| > 6) switch to a Mills-ratio approximation where the CDF
/// underflows.
///
/// ### Params
///
/// * `z` - The Z score to transform.
/// * `alternative` - Sidedness of the test.
///
/// ### Returns
///
/// The p-value.
pub fn z_to_pval(z: f64, alternative: TestAlternative) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    match alternative {
        TestAlternative::TwoSided => {
            let abs_z = z.abs();
            if abs_z > 6.0 {
                let pdf = normal.pdf(abs_z);
                let p = pdf / abs_z * (1.0 - 1.0 / (abs_z * abs_z));
                2.0 * p
            } else {
                2.0 * (1.0 - normal.cdf(abs_z))
            }
        }
        TestAlternative::Greater => {
            if z > 6.0 {
                let pdf = normal.pdf(z);
                pdf / z * (1.0 - 1.0 / (z * z))
            } else {
                1.0 - normal.cdf(z)
            }
        }
        TestAlternative::Less => {
            if z < -6.0 {
                let abs_z = z.abs();
                let pdf = normal.pdf(abs_z);
                pdf / abs_z * (1.0 - 1.0 / (abs_z * abs_z))
            } else {
                normal.cdf(z)
            }
        }
    }
}

/// Transform Z-scores into p-values (assuming normality).
///
/// ### Params
///
/// * `z_scores` - The Z scores to transform to p-values.
/// * `alternative` - Sidedness of the test.
///
/// ### Returns
///
/// The p-value vector based on the Z scores.
pub fn z_scores_to_pval(z_scores: &[f64], alternative: TestAlternative) -> Vec<f64> {
    z_scores.iter().map(|&z| z_to_pval(z, alternative)).collect()
}
