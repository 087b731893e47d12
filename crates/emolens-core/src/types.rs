use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, in pixel coordinates of the frame
/// the detector ran on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// The closed set of emotion labels the classifier can produce.
///
/// Declared in lexicographic order of the lowercase label text;
/// [`EmotionScores::top`] relies on this order for its tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
    ];

    /// Lowercase label text, as written to the log.
    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
        }
    }

    fn index(self) -> usize {
        match self {
            EmotionLabel::Angry => 0,
            EmotionLabel::Disgust => 1,
            EmotionLabel::Fear => 2,
            EmotionLabel::Happy => 3,
            EmotionLabel::Neutral => 4,
            EmotionLabel::Sad => 5,
            EmotionLabel::Surprise => 6,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-label confidence map for one detected face. All values in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionScores {
    values: [f32; 7],
}

impl Default for EmotionScores {
    fn default() -> Self {
        Self { values: [0.0; 7] }
    }
}

impl EmotionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: EmotionLabel) -> f32 {
        self.values[label.index()]
    }

    pub fn set(&mut self, label: EmotionLabel, score: f32) {
        self.values[label.index()] = score;
    }

    /// Iterate labels and scores in declaration (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f32)> + '_ {
        EmotionLabel::ALL.iter().map(|&l| (l, self.values[l.index()]))
    }

    /// The label with the maximum confidence.
    ///
    /// Equal scores resolve to the lexicographically smallest label:
    /// the scan goes in declaration order and only a strictly greater
    /// score replaces the current best.
    pub fn top(&self) -> (EmotionLabel, f32) {
        let mut best = (EmotionLabel::Angry, self.values[0]);
        for (label, score) in self.iter().skip(1) {
            if score > best.1 {
                best = (label, score);
            }
        }
        best
    }
}

/// One face's bounding box plus its emotion-confidence map for a single
/// frame. Produced fresh per frame per detected face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub scores: EmotionScores,
}

impl Detection {
    /// The top emotion and its confidence, used for the label overlay
    /// and the log row.
    pub fn top_emotion(&self) -> (EmotionLabel, f32) {
        self.scores.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_declared_lexicographically() {
        let names: Vec<&str> = EmotionLabel::ALL.iter().map(|l| l.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(EmotionLabel::Happy.to_string(), "happy");
        assert_eq!(EmotionLabel::Surprise.to_string(), "surprise");
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut scores = EmotionScores::new();
        scores.set(EmotionLabel::Fear, 0.25);
        assert_eq!(scores.get(EmotionLabel::Fear), 0.25);
        assert_eq!(scores.get(EmotionLabel::Happy), 0.0);
    }

    #[test]
    fn test_top_picks_maximum() {
        let mut scores = EmotionScores::new();
        scores.set(EmotionLabel::Sad, 0.2);
        scores.set(EmotionLabel::Happy, 0.7);
        scores.set(EmotionLabel::Neutral, 0.1);
        assert_eq!(scores.top(), (EmotionLabel::Happy, 0.7));
    }

    #[test]
    fn test_top_tie_breaks_lexicographically() {
        let mut scores = EmotionScores::new();
        scores.set(EmotionLabel::Surprise, 0.5);
        scores.set(EmotionLabel::Sad, 0.5);
        assert_eq!(scores.top().0, EmotionLabel::Sad);

        scores.set(EmotionLabel::Angry, 0.5);
        assert_eq!(scores.top().0, EmotionLabel::Angry);
    }

    #[test]
    fn test_top_all_zero_is_first_label() {
        let scores = EmotionScores::new();
        assert_eq!(scores.top(), (EmotionLabel::Angry, 0.0));
    }

    #[test]
    fn test_detection_top_emotion() {
        let mut scores = EmotionScores::new();
        scores.set(EmotionLabel::Disgust, 0.9);
        let det = Detection {
            bbox: BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                confidence: 0.8,
            },
            scores,
        };
        assert_eq!(det.top_emotion(), (EmotionLabel::Disgust, 0.9));
    }
}
