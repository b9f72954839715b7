// ============================================================
// Layer 3 — QaResult Domain Type
// ============================================================
// The value returned by the QA engine for one question.
//
// Extractive Q&A never generates text: the answer is a SPAN
// of the context, so alongside the answer string we keep the
// byte range it was cut from.
//
// Example:
//   Context:  "The sky is blue."
//   Question: "What color is the sky?"
//   Result:   answer = "blue", score = 0.92, span = 11..15
//
// Reference: Devlin et al. (2019) - BERT paper
//            Rajpurkar et al. (2016) - SQuAD

use std::ops::Range;

/// One answer span with its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct QaResult {
    /// The substring of the context chosen as the answer
    pub answer: String,

    /// Confidence in [0, 1] — product of the start and end
    /// probabilities of the chosen span
    pub score: f32,

    /// Byte range of `answer` inside the context.
    /// Empty (0..0) when the backend does not report one.
    pub span: Range<usize>,
}

impl QaResult {
    pub fn new(answer: impl Into<String>, score: f32) -> Self {
        Self {
            answer: answer.into(),
            score,
            span:   0..0,
        }
    }

    /// Attach the byte span the answer came from
    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = span;
        self
    }

    /// True when the score reaches the threshold.
    /// The boundary itself counts as confident.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.score >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary_is_confident() {
        assert!(QaResult::new("blue", 0.30).is_confident(0.30));
    }

    #[test]
    fn test_below_threshold_is_not_confident() {
        assert!(!QaResult::new("blue", 0.2999).is_confident(0.30));
        assert!(!QaResult::new("blue", 0.15).is_confident(0.30));
    }

    #[test]
    fn test_with_span() {
        let r = QaResult::new("blue", 0.9).with_span(11..15);
        assert_eq!(r.span, 11..15);
    }
}
