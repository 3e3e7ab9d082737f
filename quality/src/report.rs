//! Statistics over a re-scored result set

use serde::Serialize;
use stresstest_core::{round_to, QualityReport, QuestionResult};

/// Lower bound of the "excellent" bucket
pub const EXCELLENT: f64 = 0.8;
/// Lower bound of the "good" bucket
pub const GOOD: f64 = 0.6;
/// Lower bound of the "acceptable" bucket
pub const ACCEPTABLE: f64 = 0.4;

/// Spread of one metric across all scored answers, rounded to three decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Median, mean of the two middle values for even counts
    pub median: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Sample standard deviation, 0 for a single value
    pub stddev: f64,
}

impl MetricStats {
    /// Statistics of `values`, `None` when empty
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        let stddev = if values.len() > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            mean: round_to(mean, 3),
            median: round_to(median, 3),
            min: round_to(sorted[0], 3),
            max: round_to(sorted[sorted.len() - 1], 3),
            stddev: round_to(stddev, 3),
        })
    }
}

/// Per-metric statistics, keyed like the legacy report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsStatistics {
    /// Overall score
    pub overall_quality: MetricStats,
    /// Structure
    pub structure_score: MetricStats,
    /// Readability
    pub readability_score: MetricStats,
    /// Completeness
    pub completeness_score: MetricStats,
    /// Relevance
    pub relevance_score: MetricStats,
    /// Factual consistency
    pub factual_consistency: MetricStats,
    /// Fluency
    pub fluency_score: MetricStats,
    /// Coherence
    pub coherence_score: MetricStats,
}

/// Answer count per quality bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityDistribution {
    /// `>= 0.8`
    pub excellent: usize,
    /// `[0.6, 0.8)`
    pub good: usize,
    /// `[0.4, 0.6)`
    pub acceptable: usize,
    /// `< 0.4`
    pub poor: usize,
}

impl QualityDistribution {
    /// Bucket every score
    pub fn of(scores: &[f64]) -> Self {
        scores.iter().fold(Self::default(), |mut dist, &q| {
            match q {
                q if q >= EXCELLENT => dist.excellent += 1,
                q if q >= GOOD => dist.good += 1,
                q if q >= ACCEPTABLE => dist.acceptable += 1,
                _ => dist.poor += 1,
            }
            dist
        })
    }
}

/// Headline numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitySummary {
    /// Answers scored
    pub total_evaluated: usize,
    /// Mean overall score, three decimals
    pub avg_quality: f64,
    /// Bucket counts
    pub quality_distribution: QualityDistribution,
}

/// Latency and token cost relative to quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceQuality {
    /// Milliseconds spent per quality point, one decimal
    pub avg_time_per_quality_point: f64,
    /// Completion tokens per quality point, one decimal
    pub avg_tokens_per_quality_point: f64,
    /// Quality points per second of latency, three decimals
    pub quality_efficiency: f64,
}

/// Quality report over the scored answers of one artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    /// Headline numbers
    pub summary: QualitySummary,
    /// Per-metric statistics
    pub metrics_statistics: MetricsStatistics,
    /// Cost relative to quality
    pub performance_quality_analysis: PerformanceQuality,
}

/// Build the report from results carrying a quality report
///
/// Results without `quality_detail` are ignored. Returns `None` when no
/// result was scored.
pub fn dataset_report(results: &[QuestionResult]) -> Option<DatasetReport> {
    let scored: Vec<(&QuestionResult, &QualityReport)> = results
        .iter()
        .filter_map(|r| r.quality_detail.as_ref().map(|detail| (r, detail)))
        .collect();
    if scored.is_empty() {
        return None;
    }

    let column = |f: fn(&QualityReport) -> f64| -> Option<MetricStats> {
        let values: Vec<f64> = scored.iter().map(|(_, detail)| f(detail)).collect();
        MetricStats::of(&values)
    };

    let metrics_statistics = MetricsStatistics {
        overall_quality: column(|d| d.overall)?,
        structure_score: column(|d| d.structure)?,
        readability_score: column(|d| d.readability)?,
        completeness_score: column(|d| d.completeness)?,
        relevance_score: column(|d| d.relevance)?,
        factual_consistency: column(|d| d.factual_consistency)?,
        fluency_score: column(|d| d.fluency)?,
        coherence_score: column(|d| d.coherence)?,
    };

    let qualities: Vec<f64> = scored.iter().map(|(r, _)| r.quality).collect();
    let quality_sum: f64 = qualities.iter().sum();
    let time_sum: f64 = scored.iter().map(|(r, _)| r.elapsed_ms).sum();
    let token_sum: f64 = scored.iter().map(|(r, _)| f64::from(r.completion_tokens)).sum();

    let per_quality_point = |total: f64| {
        if quality_sum > 0.0 {
            round_to(total / quality_sum, 1)
        } else {
            0.0
        }
    };

    Some(DatasetReport {
        summary: QualitySummary {
            total_evaluated: scored.len(),
            avg_quality: round_to(quality_sum / scored.len() as f64, 3),
            quality_distribution: QualityDistribution::of(&qualities),
        },
        metrics_statistics,
        performance_quality_analysis: PerformanceQuality {
            avg_time_per_quality_point: per_quality_point(time_sum),
            avg_tokens_per_quality_point: per_quality_point(token_sum),
            quality_efficiency: if time_sum > 0.0 {
                round_to(quality_sum / (time_sum / 1000.0), 3)
            } else {
                0.0
            },
        },
    })
}
