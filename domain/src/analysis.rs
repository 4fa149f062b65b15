//! Deterministic text analysis engine.
//!
//! A pure function of the transcript text: no I/O, no clock, no randomness,
//! so the same transcript always produces byte-identical insights. Scoring
//! constants and vocabularies are fixed contract values; regression tests
//! below pin them against literal transcripts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terms counted toward the positive sentiment tally.
const POSITIVE_TERMS: &[&str] = &[
    "great",
    "excellent",
    "love",
    "excited",
    "amazing",
    "helpful",
    "confident",
    "progress",
];

/// Terms counted toward the negative tally, kept in sorted order so the
/// derived pain-point list is sorted without an extra pass.
const NEGATIVE_TERMS: &[&str] = &[
    "concern",
    "expensive",
    "frustrated",
    "issue",
    "problem",
    "risk",
    "slow",
];

/// Objections are intentionally the narrow fixed subset, not the full
/// negative vocabulary.
const OBJECTION_TERMS: &[&str] = &["expensive", "concern", "risk"];

/// Sentence fragments containing any of these become next-step items.
const NEXT_STEP_TRIGGERS: &[&str] = &["will", "next", "send", "schedule", "follow"];

/// Label -> keyword table for key moment detection (substring match on the
/// normalized transcript).
const KEY_MOMENT_CHECKS: &[(&str, &str)] = &[
    ("budget_discussion", "budget"),
    ("timeline_mention", "timeline"),
    ("decision_maker", "decision maker"),
    ("pricing_conversation", "price"),
    ("demo_request", "demo"),
    ("contract_discussion", "contract"),
];

const BANT_BUDGET: &[&str] = &["budget", "cost", "price"];
const BANT_AUTHORITY: &[&str] = &["decision maker", "vp", "director", "cfo"];
const BANT_NEED: &[&str] = &["problem", "need", "challenge", "pain"];
const BANT_TIMELINE: &[&str] = &["timeline", "quarter", "month", "deadline"];

const MAX_NEXT_STEPS: usize = 10;

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// How many leading words of the transcript form the executive summary.
    pub summary_word_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            summary_word_limit: 48,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Demo,
    Negotiation,
    Discovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    NextStepConfirmed,
    FollowUpNeeded,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BantStatus {
    Covered,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Hot,
    Warm,
    Nurture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStepOwner {
    Rep,
    Prospect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStepStatus {
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overview: String,
    pub call_type: CallType,
    pub outcome: CallOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub sentiment_score: i32,
    pub buying_intent_score: i32,
    pub closing_probability: i32,
    pub engagement_score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BantCoverage {
    pub budget: BantStatus,
    pub authority: BantStatus,
    pub need: BantStatus,
    pub timeline: BantStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub description: String,
    pub owner: NextStepOwner,
    pub status: NextStepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkCues {
    pub emotional_trigger: String,
    pub deal_risk_moment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitiveCues {
    pub competitive_pressure: String,
    pub recommended_posture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodologyInsights {
    pub framework_cues: FrameworkCues,
    pub competitive_cues: CompetitiveCues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripStep {
    pub day: u32,
    pub goal: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub subject: String,
    pub draft_body: String,
    pub negative_reverse_sell_line: String,
    pub objection_neutralizer_line: String,
    pub drip_sequence: Vec<DripStep>,
    pub referenced_moments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPayload {
    pub schema_version: String,
    pub crm_ready: bool,
    pub conversation_state: ConversationState,
}

/// The full insight record derived from one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInsights {
    pub executive_summary: ExecutiveSummary,
    pub scores: Scores,
    pub bant: BantCoverage,
    pub pain_points: Vec<String>,
    pub objections: Vec<String>,
    pub key_moments: Vec<String>,
    pub methodology_insights: MethodologyInsights,
    pub next_steps: Vec<NextStep>,
    pub follow_up: FollowUp,
    pub structured_payload: StructuredPayload,
}

/// Analyzes a transcript with the default options.
pub fn analyze(transcript: &str) -> CallInsights {
    analyze_with_options(transcript, &AnalysisOptions::default())
}

pub fn analyze_with_options(transcript: &str, options: &AnalysisOptions) -> CallInsights {
    let normalized = transcript.to_lowercase();
    let counts = term_counts(&normalized);

    let positive: i64 = POSITIVE_TERMS.iter().map(|t| count(&counts, t)).sum();
    let negative: i64 = NEGATIVE_TERMS.iter().map(|t| count(&counts, t)).sum();

    let sentiment = (5 + positive - negative).clamp(1, 10);
    let buying_intent = (count(&counts, "budget")
        + count(&counts, "timeline")
        + count(&counts, "decision")
        + count(&counts, "next")
        + 2)
    .clamp(1, 10);
    let closing_probability =
        (42 + positive * 8 - negative * 9 + buying_intent * 4).clamp(1, 100);
    let engagement = (sentiment + 1).clamp(1, 10);

    let summary = transcript
        .split_whitespace()
        .take(options.summary_word_limit)
        .collect::<Vec<_>>()
        .join(" ");

    let pain_points: Vec<String> = NEGATIVE_TERMS
        .iter()
        .filter(|term| counts.contains_key(**term))
        .map(|term| term.to_string())
        .collect();
    let objections: Vec<String> = OBJECTION_TERMS
        .iter()
        .filter(|term| counts.contains_key(**term))
        .map(|term| term.to_string())
        .collect();

    let conversation_state = conversation_state(closing_probability);

    CallInsights {
        executive_summary: ExecutiveSummary {
            overview: summary.clone(),
            call_type: infer_call_type(&normalized),
            outcome: infer_outcome(&normalized),
        },
        scores: Scores {
            sentiment_score: sentiment as i32,
            buying_intent_score: buying_intent as i32,
            closing_probability: closing_probability as i32,
            engagement_score: engagement as i32,
        },
        bant: extract_bant(&normalized),
        pain_points,
        objections,
        key_moments: key_moments(&normalized),
        methodology_insights: MethodologyInsights {
            framework_cues: detect_framework_cues(&normalized),
            competitive_cues: detect_competitive_cues(&normalized),
        },
        next_steps: extract_next_steps(transcript),
        follow_up: generate_follow_up(transcript, &summary),
        structured_payload: StructuredPayload {
            schema_version: "v1".to_string(),
            crm_ready: true,
            conversation_state,
        },
    }
}

/// Splits the transcript on sentence-ending periods and keeps fragments that
/// sound like commitments. The prospect owns a step phrased as "you will";
/// everything else defaults to the rep.
pub fn extract_next_steps(transcript: &str) -> Vec<NextStep> {
    transcript
        .split('.')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let lowered = line.to_lowercase();
            if !NEXT_STEP_TRIGGERS
                .iter()
                .any(|trigger| lowered.contains(trigger))
            {
                return None;
            }
            let owner = if lowered.contains("you will") {
                NextStepOwner::Prospect
            } else {
                NextStepOwner::Rep
            };
            Some(NextStep {
                description: line.to_string(),
                owner,
                status: NextStepStatus::Open,
            })
        })
        .take(MAX_NEXT_STEPS)
        .collect()
}

/// Tokenizes into runs of lowercase letters and apostrophes and tallies term
/// frequencies. Digits and punctuation split words, matching the scoring
/// contract.
fn term_counts(normalized: &str) -> HashMap<&str, i64> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for word in normalized
        .split(|c: char| !(c.is_ascii_lowercase() || c == '\''))
        .filter(|w| !w.is_empty())
    {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

fn count(counts: &HashMap<&str, i64>, term: &str) -> i64 {
    counts.get(term).copied().unwrap_or(0)
}

fn infer_call_type(normalized: &str) -> CallType {
    if normalized.contains("demo") {
        CallType::Demo
    } else if normalized.contains("proposal") || normalized.contains("pricing") {
        CallType::Negotiation
    } else {
        CallType::Discovery
    }
}

fn infer_outcome(normalized: &str) -> CallOutcome {
    if normalized.contains("next week") || normalized.contains("schedule") {
        CallOutcome::NextStepConfirmed
    } else if normalized.contains("follow up") {
        CallOutcome::FollowUpNeeded
    } else {
        CallOutcome::Open
    }
}

fn extract_bant(normalized: &str) -> BantCoverage {
    let status = |keywords: &[&str]| {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            BantStatus::Covered
        } else {
            BantStatus::Missing
        }
    };

    BantCoverage {
        budget: status(BANT_BUDGET),
        authority: status(BANT_AUTHORITY),
        need: status(BANT_NEED),
        timeline: status(BANT_TIMELINE),
    }
}

fn key_moments(normalized: &str) -> Vec<String> {
    KEY_MOMENT_CHECKS
        .iter()
        .filter(|(_, keyword)| normalized.contains(keyword))
        .map(|(label, _)| label.to_string())
        .collect()
}

fn detect_framework_cues(normalized: &str) -> FrameworkCues {
    FrameworkCues {
        emotional_trigger: if normalized.contains("urgent") {
            "urgency"
        } else {
            "confidence"
        }
        .to_string(),
        deal_risk_moment: if normalized.contains("expensive") {
            "pricing_pushback"
        } else {
            "none_detected"
        }
        .to_string(),
    }
}

fn detect_competitive_cues(normalized: &str) -> CompetitiveCues {
    let competitor_mentioned =
        normalized.contains("competitor") || normalized.contains("alternative");
    CompetitiveCues {
        competitive_pressure: if competitor_mentioned { "high" } else { "low" }.to_string(),
        recommended_posture: if competitor_mentioned {
            "differentiate_on_roi"
        } else {
            "consultative"
        }
        .to_string(),
    }
}

fn conversation_state(closing_probability: i64) -> ConversationState {
    if closing_probability >= 75 {
        ConversationState::Hot
    } else if closing_probability >= 50 {
        ConversationState::Warm
    } else {
        ConversationState::Nurture
    }
}

fn generate_follow_up(transcript: &str, summary: &str) -> FollowUp {
    let referenced_moments: Vec<String> = transcript
        .split('.')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(2)
        .map(str::to_string)
        .collect();

    let draft_body = format!(
        "Thanks again for the conversation today. \
         Key themes we aligned on: {summary}. \
         As a next step, I will send a tailored recommendation and timeline options. \
         If priorities shift, just reply and we can adapt quickly.\n\n\
         Unsubscribe: {{{{dynamic_unsubscribe_link}}}}"
    );

    FollowUp {
        subject: "Next steps from our sales strategy call".to_string(),
        draft_body,
        negative_reverse_sell_line:
            "If this is not the right quarter, we can pause and revisit later.".to_string(),
        objection_neutralizer_line:
            "If budget is tight, we can phase rollout to protect ROI early.".to_string(),
        drip_sequence: vec![
            DripStep {
                day: 2,
                goal: "share value recap".to_string(),
                message: "Quick recap of agreed priorities and expected outcomes.".to_string(),
            },
            DripStep {
                day: 5,
                goal: "reduce friction".to_string(),
                message: "Happy to adapt scope if internal bandwidth is constrained.".to_string(),
            },
        ],
        referenced_moments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_is_deterministic() {
        let transcript =
            "We love the demo. Budget is a concern, but there is real progress. I will follow up.";
        let first = analyze(transcript);
        let second = analyze(transcript);
        assert_eq!(first, second);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn scores_stay_inside_their_clamped_ranges() {
        let transcripts = [
            "",
            "hello",
            "issue issue issue concern concern problem frustrated expensive slow risk risk risk",
            "great great great excellent love excited amazing helpful confident progress progress",
            "budget budget budget timeline timeline decision decision next next next next",
        ];

        for transcript in transcripts {
            let insights = analyze(transcript);
            assert!((1..=10).contains(&insights.scores.sentiment_score));
            assert!((1..=10).contains(&insights.scores.buying_intent_score));
            assert!((1..=100).contains(&insights.scores.closing_probability));
            assert!((1..=10).contains(&insights.scores.engagement_score));
        }
    }

    #[test]
    fn budget_and_timeline_discussion_scores_as_expected() {
        let transcript = "Prospect discussed budget and timeline. I will send proposal next week.";
        let insights = analyze(transcript);

        // budget + timeline + next + 2
        assert_eq!(insights.scores.buying_intent_score, 5);
        assert!(insights.scores.buying_intent_score >= 4);
        assert_eq!(insights.scores.sentiment_score, 5);
        assert_eq!(insights.scores.engagement_score, 6);
        // 42 + 0*8 - 0*9 + 5*4
        assert_eq!(insights.scores.closing_probability, 62);
        assert_eq!(
            insights.structured_payload.conversation_state,
            ConversationState::Warm
        );

        assert_eq!(insights.executive_summary.call_type, CallType::Negotiation);
        assert_eq!(
            insights.executive_summary.outcome,
            CallOutcome::NextStepConfirmed
        );

        assert_eq!(insights.next_steps.len(), 1);
        assert_eq!(
            insights.next_steps[0].description,
            "I will send proposal next week"
        );
        assert_eq!(insights.next_steps[0].owner, NextStepOwner::Rep);
        assert_eq!(insights.next_steps[0].status, NextStepStatus::Open);

        assert_eq!(insights.bant.budget, BantStatus::Covered);
        assert_eq!(insights.bant.timeline, BantStatus::Covered);
        assert_eq!(insights.bant.authority, BantStatus::Missing);
        assert_eq!(insights.bant.need, BantStatus::Missing);

        assert_eq!(
            insights.key_moments,
            vec!["budget_discussion", "timeline_mention"]
        );
    }

    #[test]
    fn call_type_classification_prefers_demo_over_negotiation() {
        assert_eq!(
            analyze("They asked for a demo of the pricing page").executive_summary.call_type,
            CallType::Demo
        );
        assert_eq!(
            analyze("We walked through pricing").executive_summary.call_type,
            CallType::Negotiation
        );
        assert_eq!(
            analyze("Sent over the proposal").executive_summary.call_type,
            CallType::Negotiation
        );
        assert_eq!(
            analyze("Intro call, learned about their team")
                .executive_summary
                .call_type,
            CallType::Discovery
        );
    }

    #[test]
    fn outcome_classification_follows_the_fixed_phrases() {
        assert_eq!(
            analyze("Let's schedule a call").executive_summary.outcome,
            CallOutcome::NextStepConfirmed
        );
        assert_eq!(
            analyze("I need to follow up with their CFO")
                .executive_summary
                .outcome,
            CallOutcome::FollowUpNeeded
        );
        assert_eq!(
            analyze("No commitments made").executive_summary.outcome,
            CallOutcome::Open
        );
    }

    #[test]
    fn objections_are_the_narrow_subset_of_pain_points() {
        let transcript = "The rollout felt slow and expensive, a real problem and a risk.";
        let insights = analyze(transcript);

        assert_eq!(
            insights.pain_points,
            vec!["expensive", "problem", "risk", "slow"]
        );
        assert_eq!(insights.objections, vec!["expensive", "risk"]);
    }

    #[test]
    fn next_steps_attribute_you_will_to_the_prospect_and_cap_at_ten() {
        let insights = analyze("You will send the security questionnaire. I will schedule a demo.");
        assert_eq!(insights.next_steps.len(), 2);
        assert_eq!(insights.next_steps[0].owner, NextStepOwner::Prospect);
        assert_eq!(insights.next_steps[1].owner, NextStepOwner::Rep);

        let many = (0..25)
            .map(|i| format!("I will send item {i}"))
            .collect::<Vec<_>>()
            .join(". ");
        assert_eq!(analyze(&many).next_steps.len(), 10);
    }

    #[test]
    fn summary_takes_the_leading_words_of_the_original_transcript() {
        let words: Vec<String> = (0..60).map(|i| format!("word{i}")).collect();
        let transcript = words.join("  \n ");
        let insights = analyze(&transcript);

        let summary_words: Vec<&str> = insights.executive_summary.overview.split(' ').collect();
        assert_eq!(summary_words.len(), 48);
        assert_eq!(summary_words[0], "word0");
        assert_eq!(summary_words[47], "word47");

        let short = analyze("Only a few words here");
        assert_eq!(short.executive_summary.overview, "Only a few words here");
    }

    #[test]
    fn summary_word_limit_is_configurable() {
        let options = AnalysisOptions {
            summary_word_limit: 3,
        };
        let insights = analyze_with_options("one two three four five", &options);
        assert_eq!(insights.executive_summary.overview, "one two three");
    }

    #[test]
    fn framework_and_competitive_cues_follow_the_fixed_table() {
        let pressured = analyze("It feels urgent but expensive, and a competitor is cheaper.");
        assert_eq!(
            pressured.methodology_insights.framework_cues.emotional_trigger,
            "urgency"
        );
        assert_eq!(
            pressured.methodology_insights.framework_cues.deal_risk_moment,
            "pricing_pushback"
        );
        assert_eq!(
            pressured
                .methodology_insights
                .competitive_cues
                .competitive_pressure,
            "high"
        );
        assert_eq!(
            pressured
                .methodology_insights
                .competitive_cues
                .recommended_posture,
            "differentiate_on_roi"
        );

        let calm = analyze("A relaxed chat about goals");
        assert_eq!(
            calm.methodology_insights.framework_cues.emotional_trigger,
            "confidence"
        );
        assert_eq!(
            calm.methodology_insights.competitive_cues.competitive_pressure,
            "low"
        );
        assert_eq!(
            calm.methodology_insights.competitive_cues.recommended_posture,
            "consultative"
        );
    }

    #[test]
    fn follow_up_interpolates_the_summary_and_first_two_fragments() {
        let transcript = "We covered goals. Budget review is pending. Another point entirely.";
        let insights = analyze(transcript);

        assert!(insights
            .follow_up
            .draft_body
            .contains("Key themes we aligned on: We covered goals."));
        assert!(insights
            .follow_up
            .draft_body
            .ends_with("Unsubscribe: {{dynamic_unsubscribe_link}}"));
        assert_eq!(
            insights.follow_up.referenced_moments,
            vec!["We covered goals", "Budget review is pending"]
        );
        assert_eq!(insights.follow_up.drip_sequence.len(), 2);
        assert_eq!(insights.follow_up.drip_sequence[0].day, 2);
        assert_eq!(insights.follow_up.drip_sequence[1].day, 5);
    }

    #[test]
    fn conversation_state_thresholds_are_exact() {
        // closing = 42 + intent*4; intent floor is 2 with no signal words
        assert_eq!(
            analyze("hello").structured_payload.conversation_state,
            ConversationState::Warm
        );
        // strong negatives push closing below 50
        assert_eq!(
            analyze("issue problem risk").structured_payload.conversation_state,
            ConversationState::Nurture
        );
        // strong positives with intent push it to hot
        assert_eq!(
            analyze("great excellent love excited budget timeline decision next")
                .structured_payload
                .conversation_state,
            ConversationState::Hot
        );
    }

    #[test]
    fn apostrophes_stay_inside_tokens() {
        // "won't" must not split into "won" + "t"; neither half is a vocabulary
        // term, so sentiment stays neutral.
        let insights = analyze("We won't have an issue");
        assert_eq!(insights.scores.sentiment_score, 4);
        assert_eq!(insights.pain_points, vec!["issue"]);
    }

    #[test]
    fn structured_payload_envelope_is_fixed() {
        let insights = analyze("hello");
        assert_eq!(insights.structured_payload.schema_version, "v1");
        assert!(insights.structured_payload.crm_ready);
    }
}
