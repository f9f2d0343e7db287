use crate::inference::DistortionKind;

/// Emotion-aware reflective prompts. ORDER MATTERS: the feedback
/// generator emits the first key that is a substring of the period's top
/// emotion, so earlier entries shadow later ones.
pub const EMOTION_FEEDBACK: &[(&str, &str)] = &[
    (
        "shame",
        "This period appears to include self-critical thinking. Reflect on moments where you showed courage or growth.",
    ),
    (
        "guilt",
        "You may be holding yourself to very high standards. Consider how self-forgiveness might support your well-being.",
    ),
    (
        "anxiety",
        "This period reflects high worry. Journaling about what you can control may reduce unnecessary mental loops.",
    ),
    (
        "fear",
        "Take time to write out what you fear and where that fear comes from. Name fears to reduce their power.",
    ),
    (
        "sadness",
        "Consider exploring small moments of hope, joy or gratitude through your journaling practice.",
    ),
    (
        "hopelessness",
        "If things feel stuck, write about one small thing that moved forward this week.",
    ),
    (
        "joy",
        "This is a motivating emotional period—try to reflect on what enabled this mood and how you can sustain it.",
    ),
    (
        "hope",
        "Use hope as a foundation to set new intentions. Reflect on your strengths and what you’ve overcome.",
    ),
    (
        "gratitude",
        "It’s a good time to reflect on what nourishes you. Consider writing appreciation letters or gratitude entries.",
    ),
    (
        "relief",
        "Notice what changed that made you feel relief. Can you create more space for that?",
    ),
    (
        "confusion",
        "Try summarizing what you do know when things feel foggy. Self-clarity builds confidence.",
    ),
    (
        "connection",
        "Relationships nourish our sense of identity. Reflect on conversations or moments that built closeness.",
    ),
];

/// Emitted when no emotion key matches (or the period has no emotion).
pub const FALLBACK_REFLECTION: &str =
    "Reflect on how your emotions changed this period. Use journaling to deepen your understanding.";

/// Closed CBT prompt table; the exhaustive match means every detectable
/// kind has a prompt.
pub fn cbt_prompt(kind: DistortionKind) -> &'static str {
    match kind {
        DistortionKind::Catastrophizing => {
            "Try to list the evidence for and against your feared outcome. What is a more realistic possibility?"
        }
        DistortionKind::Overgeneralization => {
            "Can you think of times when this hasn't been true? What are the exceptions to the rule?"
        }
        DistortionKind::ShouldStatements => {
            "What would happen if you changed 'should' to 'prefer'? Are your standards flexible or absolute?"
        }
        DistortionKind::MindReading => {
            "Do you have evidence for what others think, or is it a guess? Could you ask instead of assuming?"
        }
        DistortionKind::FortuneTelling => {
            "What predictions are you making that feel inevitable? What's the likelihood they actually happen?"
        }
        DistortionKind::Personalization => {
            "Are there other factors at play beyond you? Are you holding yourself responsible for things outside your control?"
        }
    }
}
