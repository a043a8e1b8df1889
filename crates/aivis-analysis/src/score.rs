//! Composite visibility scoring.
//!
//! `visibility = 100 * (0.40 * mention_rate + 0.25 * position
//!                      + 0.20 * recommendation_rate + 0.15 * relative_sentiment)`
//!
//! Every component lies in `[0, 1]`, so the composite lies in `[0, 100]`.

use aivis_core::{BrandId, DetectedMention, EntityType, MetricSnapshot, Sentiment};
use chrono::{DateTime, Utc};

use crate::confidence::Confidence;

pub const WEIGHT_MENTION_RATE: f64 = 0.40;
pub const WEIGHT_POSITION: f64 = 0.25;
pub const WEIGHT_RECOMMENDATION: f64 = 0.20;
pub const WEIGHT_SENTIMENT: f64 = 0.15;

pub const POSITION_FIRST: f64 = 1.0;
pub const POSITION_SECOND: f64 = 0.7;
pub const POSITION_LATER: f64 = 0.4;

/// Sentiment mean assumed for a side with no mentions.
const NEUTRAL_SENTIMENT: f64 = 3.0;

/// Weight of one brand mention by its rank. Anything not ranked 1 or 2
/// weighs as "later".
#[must_use]
pub fn position_weight(rank: Option<u32>) -> f64 {
    match rank {
        Some(1) => POSITION_FIRST,
        Some(2) => POSITION_SECOND,
        _ => POSITION_LATER,
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    responses_with_brand: usize,
    responses_with_recommendation: usize,
    position_total: f64,
    brand_sentiment_total: f64,
    brand_mentions: usize,
    competitor_sentiment_total: f64,
    competitor_mentions: usize,
    positive: usize,
    neutral: usize,
    negative: usize,
}

impl Accumulator {
    fn add_response(&mut self, mentions: &[DetectedMention]) {
        let mut has_brand = false;
        let mut has_recommendation = false;

        for mention in mentions {
            let value = mention.sentiment.value();
            match mention.entity_type {
                EntityType::Brand => {
                    has_brand = true;
                    has_recommendation |= mention.is_recommendation;
                    self.brand_mentions += 1;
                    self.brand_sentiment_total += value;
                    self.position_total += position_weight(mention.position_rank);
                    match mention.sentiment {
                        Sentiment::Positive => self.positive += 1,
                        Sentiment::Neutral => self.neutral += 1,
                        Sentiment::Negative => self.negative += 1,
                    }
                }
                EntityType::Competitor => {
                    self.competitor_mentions += 1;
                    self.competitor_sentiment_total += value;
                }
            }
        }

        self.responses_with_brand += usize::from(has_brand);
        self.responses_with_recommendation += usize::from(has_recommendation);
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_or_neutral(total: f64, count: usize) -> f64 {
    if count == 0 {
        NEUTRAL_SENTIMENT
    } else {
        total / count as f64
    }
}

/// Build the snapshot for one run from the mentions of each of its responses.
///
/// With no responses the result is the all-zero snapshot with low confidence,
/// whatever `confidence` says.
#[must_use]
pub fn composite_score<'a>(
    brand_id: BrandId,
    responses: impl IntoIterator<Item = &'a [DetectedMention]>,
    snapshot_date: DateTime<Utc>,
    confidence: Confidence,
) -> MetricSnapshot {
    let mut acc = Accumulator::default();
    let mut response_count = 0usize;
    for mentions in responses {
        acc.add_response(mentions);
        response_count += 1;
    }

    if response_count == 0 {
        return MetricSnapshot::empty(brand_id, snapshot_date);
    }

    #[allow(clippy::cast_precision_loss)]
    let n = response_count as f64;
    #[allow(clippy::cast_precision_loss)]
    let mention_rate = acc.responses_with_brand as f64 / n;
    let position = (acc.position_total / n).clamp(0.0, 1.0);
    #[allow(clippy::cast_precision_loss)]
    let recommendation_rate = acc.responses_with_recommendation as f64 / n;

    let brand_mean = mean_or_neutral(acc.brand_sentiment_total, acc.brand_mentions);
    let competitor_mean =
        mean_or_neutral(acc.competitor_sentiment_total, acc.competitor_mentions);
    let relative_sentiment = ((brand_mean - competitor_mean + 4.0) / 8.0).clamp(0.0, 1.0);

    let visibility_score = (100.0
        * (WEIGHT_MENTION_RATE * mention_rate
            + WEIGHT_POSITION * position
            + WEIGHT_RECOMMENDATION * recommendation_rate
            + WEIGHT_SENTIMENT * relative_sentiment))
        .clamp(0.0, 100.0);

    tracing::info!(
        brand_id,
        visibility_score,
        mention_rate,
        position,
        recommendation_rate,
        relative_sentiment,
        responses = response_count,
        "computed composite score"
    );

    MetricSnapshot {
        brand_id,
        snapshot_date,
        normalized_mention_rate: mention_rate,
        weighted_position_score: position,
        recommendation_rate,
        relative_sentiment_index: relative_sentiment,
        visibility_score,
        citation_share: mention_rate * 100.0,
        confidence_score: confidence.score,
        confidence_level: confidence.level,
        mention_count: acc.brand_mentions,
        positive_count: acc.positive,
        neutral_count: acc.neutral,
        negative_count: acc.negative,
        response_count,
        category_avg_sentiment: competitor_mean,
    }
}

/// Quick 0-100 score for a single response, used when comparing models.
///
/// Zero without a brand mention. Otherwise 50, moved 25 either way by the
/// sentiment of the last brand mention, plus a bonus that shrinks with the
/// number of competitor mentions.
#[must_use]
pub fn response_score(mentions: &[DetectedMention]) -> u32 {
    let mut last_brand_sentiment = None;
    let mut competitors = 0i64;
    for mention in mentions {
        match mention.entity_type {
            EntityType::Brand => last_brand_sentiment = Some(mention.sentiment),
            EntityType::Competitor => competitors += 1,
        }
    }

    let Some(sentiment) = last_brand_sentiment else {
        return 0;
    };

    let mut score: i64 = 50;
    match sentiment {
        Sentiment::Positive => score += 25,
        Sentiment::Negative => score -= 25,
        Sentiment::Neutral => {}
    }
    score += 25 / (1 + competitors);
    u32::try_from(score.clamp(0, 100)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use aivis_core::ConfidenceLevel;

    use super::*;

    fn brand(rank: u32, sentiment: Sentiment, recommended: bool) -> DetectedMention {
        DetectedMention {
            entity_name: "Acme".to_string(),
            entity_type: EntityType::Brand,
            sentiment,
            context_snippet: String::new(),
            char_position: rank as usize * 10,
            is_recommendation: recommended,
            position_rank: Some(rank),
        }
    }

    fn competitor(sentiment: Sentiment) -> DetectedMention {
        DetectedMention {
            entity_name: "Globex".to_string(),
            entity_type: EntityType::Competitor,
            sentiment,
            context_snippet: String::new(),
            char_position: 500,
            is_recommendation: false,
            position_rank: None,
        }
    }

    fn score(responses: &[Vec<DetectedMention>]) -> MetricSnapshot {
        composite_score(
            1,
            responses.iter().map(Vec::as_slice),
            Utc::now(),
            Confidence::NEUTRAL,
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn weights_sum_to_one() {
        assert!(approx(
            WEIGHT_MENTION_RATE + WEIGHT_POSITION + WEIGHT_RECOMMENDATION + WEIGHT_SENTIMENT,
            1.0
        ));
    }

    #[test]
    fn no_responses_is_empty_low_snapshot() {
        let snap = score(&[]);
        assert_eq!(snap.response_count, 0);
        assert!(approx(snap.visibility_score, 0.0));
        assert_eq!(snap.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn scenario_scores_one_hundred() {
        let snap = score(&[vec![
            brand(1, Sentiment::Positive, true),
            competitor(Sentiment::Negative),
        ]]);
        assert!(approx(snap.normalized_mention_rate, 1.0));
        assert!(approx(snap.weighted_position_score, 1.0));
        assert!(approx(snap.recommendation_rate, 1.0));
        assert!(approx(snap.relative_sentiment_index, 1.0));
        assert!(approx(snap.visibility_score, 100.0));
        assert!(approx(snap.citation_share, 100.0));
        assert!(approx(snap.category_avg_sentiment, 1.0));
        assert_eq!(snap.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn position_average_is_clamped() {
        // 1.0 + 0.7 + 0.4 = 2.1 in a single response.
        let snap = score(&[vec![
            brand(1, Sentiment::Neutral, false),
            brand(2, Sentiment::Neutral, false),
            brand(3, Sentiment::Neutral, false),
        ]]);
        assert!(approx(snap.weighted_position_score, 1.0));
        assert_eq!(snap.mention_count, 3);
        assert_eq!(snap.neutral_count, 3);
    }

    #[test]
    fn rates_are_per_response() {
        let snap = score(&[
            vec![brand(1, Sentiment::Positive, true)],
            vec![competitor(Sentiment::Neutral)],
            vec![],
            vec![brand(1, Sentiment::Neutral, false)],
        ]);
        assert!(approx(snap.normalized_mention_rate, 0.5));
        assert!(approx(snap.recommendation_rate, 0.25));
        assert!(approx(snap.weighted_position_score, 0.5));
        assert_eq!(snap.response_count, 4);
    }

    #[test]
    fn missing_sides_default_to_neutral() {
        let snap = score(&[vec![]]);
        assert!(approx(snap.relative_sentiment_index, 0.5));
        assert!(approx(snap.category_avg_sentiment, 3.0));
        assert!(approx(snap.visibility_score, 7.5));
    }

    #[test]
    fn worst_case_sentiment_bottoms_out() {
        let snap = score(&[vec![
            brand(1, Sentiment::Negative, false),
            competitor(Sentiment::Positive),
        ]]);
        assert!(approx(snap.relative_sentiment_index, 0.0));
        assert_eq!(snap.negative_count, 1);
        assert!((0.0..=100.0).contains(&snap.visibility_score));
    }

    #[test]
    fn unranked_brand_mention_weighs_as_later() {
        assert!(approx(position_weight(None), POSITION_LATER));
        assert!(approx(position_weight(Some(7)), POSITION_LATER));
    }

    #[test]
    fn response_score_rules() {
        assert_eq!(response_score(&[]), 0);
        assert_eq!(response_score(&[competitor(Sentiment::Positive)]), 0);
        assert_eq!(response_score(&[brand(1, Sentiment::Positive, false)]), 100);
        assert_eq!(
            response_score(&[
                brand(1, Sentiment::Neutral, false),
                competitor(Sentiment::Neutral),
                competitor(Sentiment::Neutral),
            ]),
            58
        );
        assert_eq!(
            response_score(&[
                brand(1, Sentiment::Positive, false),
                brand(2, Sentiment::Negative, false),
                competitor(Sentiment::Neutral),
            ]),
            37
        );
    }
}
