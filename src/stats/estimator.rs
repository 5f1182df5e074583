//! Token-volume and cost projection from the sampled diff corpus.
//!
//! The projection never needs exact token counts: it derives a
//! tokens-per-byte ratio from the bounded sample collected during the
//! harvest and scales the organisation's monthly diff volume by it. The
//! reference vocabulary is tiktoken's `o200k_base`, with `cl100k_base` as a
//! fallback; an unavailable encoder degrades to a zero projection rather
//! than failing the run.

use tiktoken_rs::CoreBPE;

use crate::harvest::sampler::DiffSample;

/// GPT-4o pricing, USD per million tokens.
pub const GPT_4O_USD_PER_MTOKEN: f64 = 5.0;

/// Claude Sonnet pricing, USD per million tokens.
pub const CLAUDE_SONNET_USD_PER_MTOKEN: f64 = 3.0;

/// Projected monthly token volume and its cost under both pricing models.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostProjection {
    /// Estimated tokens per month.
    pub avg_monthly_tokens: u64,
    /// Monthly cost at GPT-4o pricing, USD.
    pub gpt_4o_usd: f64,
    /// Monthly cost at Claude Sonnet pricing, USD.
    pub claude_sonnet_usd: f64,
}

/// Projects monthly token volume and cost from the sample and the monthly
/// diff-byte rate.
///
/// Returns the zero projection when the sample is empty, the monthly rate
/// is not positive, or tokenisation yields no tokens; none of these are
/// errors.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_arithmetic,
    reason = "token projection is an estimate; the rounded value is non-negative and far below u64::MAX"
)]
#[must_use]
pub fn project(sample: &DiffSample, avg_monthly_diff_chars: f64) -> CostProjection {
    if sample.is_empty() || avg_monthly_diff_chars <= 0.0 {
        return CostProjection::default();
    }

    let Some(tokens) = sample_token_count(sample.text()) else {
        tracing::warn!("reference tokeniser unavailable; reporting zero token volume");
        return CostProjection::default();
    };
    if tokens == 0 {
        return CostProjection::default();
    }

    let ratio = tokens as f64 / sample.text().len() as f64;
    let avg_monthly_tokens = (ratio * avg_monthly_diff_chars).round() as u64;
    let millions = avg_monthly_tokens as f64 / 1_000_000.0;

    CostProjection {
        avg_monthly_tokens,
        gpt_4o_usd: millions * GPT_4O_USD_PER_MTOKEN,
        claude_sonnet_usd: millions * CLAUDE_SONNET_USD_PER_MTOKEN,
    }
}

fn sample_token_count(text: &str) -> Option<usize> {
    let encoder: CoreBPE = tiktoken_rs::o200k_base()
        .or_else(|_| tiktoken_rs::cl100k_base())
        .ok()?;
    Some(encoder.encode_ordinary(text).len())
}

#[cfg(test)]
mod tests {
    use super::{CLAUDE_SONNET_USD_PER_MTOKEN, CostProjection, GPT_4O_USD_PER_MTOKEN, project};
    use crate::harvest::sampler::DiffSample;

    fn sample_of(text: &str) -> DiffSample {
        let mut sample = DiffSample::new(u64::try_from(text.len()).expect("test text fits"));
        sample.absorb(text);
        sample
    }

    #[test]
    fn empty_sample_projects_zero() {
        let sample = DiffSample::new(1000);
        assert_eq!(project(&sample, 50_000.0), CostProjection::default());
    }

    #[test]
    fn zero_monthly_rate_projects_zero() {
        let sample = sample_of("diff --git a/main.rs b/main.rs\n+fn main() {}\n");
        assert_eq!(project(&sample, 0.0), CostProjection::default());
    }

    #[test]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "test recomputes the documented linear models"
    )]
    fn projection_scales_the_sample_ratio_linearly() {
        let sample = sample_of("diff --git a/main.rs b/main.rs\n+fn main() { println!(\"hi\"); }\n");

        let projection = project(&sample, 2_000_000.0);

        assert!(projection.avg_monthly_tokens > 0);
        // Both models are plain multiplications over the same token volume.
        let millions = projection.avg_monthly_tokens as f64 / 1_000_000.0;
        assert!((projection.gpt_4o_usd - millions * GPT_4O_USD_PER_MTOKEN).abs() < 1e-9);
        assert!(
            (projection.claude_sonnet_usd - millions * CLAUDE_SONNET_USD_PER_MTOKEN).abs() < 1e-9
        );
        assert!(projection.gpt_4o_usd > projection.claude_sonnet_usd);
    }

    #[test]
    fn larger_monthly_volume_projects_more_tokens() {
        let sample = sample_of("diff --git a/main.rs b/main.rs\n+fn main() {}\n");

        let small = project(&sample, 100_000.0);
        let large = project(&sample, 1_000_000.0);

        assert!(large.avg_monthly_tokens > small.avg_monthly_tokens);
    }
}
