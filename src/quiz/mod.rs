pub mod bank;
pub mod error;
pub mod evaluator;
pub mod exam;
pub mod sampler;
pub mod score;
pub mod session;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use error::{LoadError, QuizError};

/// Identifier of a question as it appears in the bank: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{}", n),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    #[serde(default)]
    pub question_number: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default, deserialize_with = "lenient_points")]
    pub points: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<QuestionOption>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub correct_answers: Vec<CorrectAnswer>,
    #[serde(default)]
    pub theme_name: String,
    #[serde(default)]
    pub chapter_number: String,
    #[serde(default)]
    pub chapter_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_urls: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub video_urls: Vec<String>,
    /// Downloaded copies of `image_urls`, relative to the media directory.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub local_image_paths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub local_video_paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSource<'a> {
    /// Path relative to the media directory.
    Local(&'a str),
    Url(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Media<'a> {
    pub kind: MediaKind,
    pub source: MediaSource<'a>,
}

impl Question {
    /// Questions without options expect a typed answer.
    pub fn is_free_text(&self) -> bool {
        self.options.is_empty()
    }

    pub fn correct_letters(&self) -> BTreeSet<&str> {
        self.correct_answers
            .iter()
            .map(|a| a.letter.as_str())
            .collect()
    }

    pub fn option(&self, letter: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.letter == letter)
    }

    /// Images first, then videos. Local copies replace the remote URLs of the
    /// same kind whenever there is at least one.
    pub fn media(&self) -> Vec<Media<'_>> {
        let mut media = Vec::new();
        for (kind, local, urls) in [
            (MediaKind::Image, &self.local_image_paths, &self.image_urls),
            (MediaKind::Video, &self.local_video_paths, &self.video_urls),
        ] {
            if local.is_empty() {
                media.extend(urls.iter().map(|url| Media {
                    kind,
                    source: MediaSource::Url(url),
                }));
            } else {
                media.extend(local.iter().map(|path| Media {
                    kind,
                    source: MediaSource::Local(path),
                }));
            }
        }
        media
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub letter: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectAnswer {
    // Free-text answers may be stored as bare numbers
    #[serde(deserialize_with = "text_or_number")]
    pub letter: String,
}

/// What the user handed in for a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Options(BTreeSet<String>),
    Text(String),
}

impl Submission {
    pub fn options<I, S>(letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Submission::Options(letters.into_iter().map(Into::into).collect())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Submission::Text(text.into())
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Submission::Options(letters) => {
                let letters = letters.iter().map(String::as_str).collect::<Vec<_>>();
                f.write_str(&letters.join(", "))
            }
            Submission::Text(text) => f.write_str(text),
        }
    }
}

/// One answered question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEvent {
    pub question_id: QuestionId,
    pub is_correct: bool,
}

impl AnswerEvent {
    pub fn new(question_id: QuestionId, is_correct: bool) -> Self {
        Self {
            question_id,
            is_correct,
        }
    }
}

fn lenient_points<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let points = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u32))
            .unwrap_or(0),
        Value::String(s) => parse_points(&s),
        _ => 0,
    };
    Ok(points)
}

/// Reads the leading digits of `raw`, so `"5 puan"` is worth 5. Anything else is 0.
pub fn parse_points(raw: &str) -> u32 {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    // only overflow can fail here
    digits.parse().unwrap_or(u32::MAX)
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn choice(id: i64, points: u32, letters: &[&str], correct: &[&str]) -> Question {
        Question {
            question_id: QuestionId::Number(id),
            question_number: format!("1.1.01-{:03}", id),
            question_text: format!("Soru {}", id),
            points,
            options: letters
                .iter()
                .map(|l| QuestionOption {
                    letter: l.to_string(),
                    text: format!("Seçenek {}", l),
                })
                .collect(),
            correct_answers: correct
                .iter()
                .map(|l| CorrectAnswer {
                    letter: l.to_string(),
                })
                .collect(),
            theme_name: "1.1. Genel".to_string(),
            chapter_number: "1.1.01 Bölüm".to_string(),
            chapter_name: "Temel".to_string(),
            image_urls: Vec::new(),
            video_urls: Vec::new(),
            local_image_paths: Vec::new(),
            local_video_paths: Vec::new(),
        }
    }

    pub fn free_text(id: i64, points: u32, answer: Option<&str>) -> Question {
        let mut question = choice(id, points, &[], &[]);
        question.correct_answers = answer
            .into_iter()
            .map(|a| CorrectAnswer {
                letter: a.to_string(),
            })
            .collect();
        question
    }

    /// `n` single-choice questions with ids `0..n`, correct option "a".
    pub fn pool(n: usize, points: u32) -> Vec<Question> {
        (0..n as i64)
            .map(|id| choice(id, points, &["a", "b", "c"], &["a"]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_accept_strings_and_numbers() {
        let json = r#"[
            {"question_id": 1, "points": "5"},
            {"question_id": 2, "points": 4},
            {"question_id": 3, "points": "3 puan"},
            {"question_id": 4, "points": "yok"},
            {"question_id": 5},
            {"question_id": 6, "points": null},
            {"question_id": 7, "points": 2.7}
        ]"#;
        let questions: Vec<Question> = serde_json::from_str(json).unwrap();
        let points = questions.iter().map(|q| q.points).collect::<Vec<_>>();
        assert_eq!(points, vec![5, 4, 3, 0, 0, 0, 2]);
    }

    #[test]
    fn question_ids_keep_their_json_type() {
        let json = r#"[{"question_id": 17}, {"question_id": "2.1.03-008"}]"#;
        let questions: Vec<Question> = serde_json::from_str(json).unwrap();
        assert_eq!(questions[0].question_id, QuestionId::Number(17));
        assert_eq!(questions[1].question_id, QuestionId::from("2.1.03-008"));
        assert_eq!(questions[1].question_id.to_string(), "2.1.03-008");
    }

    #[test]
    fn numeric_correct_answer_is_read_as_text() {
        let json = r#"{"question_id": 1, "options": null, "correct_answers": [{"letter": 120}]}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert!(question.is_free_text());
        assert_eq!(question.correct_answers[0].letter, "120");
    }

    #[test]
    fn option_question_exposes_correct_letters() {
        let question = fixtures::choice(1, 3, &["a", "b", "c"], &["c", "a"]);
        assert!(!question.is_free_text());
        assert_eq!(question.correct_letters().into_iter().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(question.option("b").map(|o| o.text.as_str()), Some("Seçenek b"));
        assert!(question.option("d").is_none());
    }

    #[test]
    fn local_media_is_preferred_per_kind() {
        let json = r#"{
            "question_id": 1,
            "image_urls": ["https://example.com/a.jpg"],
            "local_image_paths": ["media/images/a.jpg"],
            "video_urls": ["https://example.com/v.mp4"],
            "local_video_paths": null
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(
            question.media(),
            vec![
                Media {
                    kind: MediaKind::Image,
                    source: MediaSource::Local("media/images/a.jpg"),
                },
                Media {
                    kind: MediaKind::Video,
                    source: MediaSource::Url("https://example.com/v.mp4"),
                },
            ]
        );
    }

    #[test]
    fn question_without_media() {
        assert!(fixtures::choice(1, 2, &["a"], &["a"]).media().is_empty());
    }

    #[test]
    fn parse_points_reads_leading_digits() {
        assert_eq!(parse_points(" 10 "), 10);
        assert_eq!(parse_points("+2"), 2);
        assert_eq!(parse_points("99999999999"), u32::MAX);
        assert_eq!(parse_points("-3"), 0);
        assert_eq!(parse_points(""), 0);
    }
}
