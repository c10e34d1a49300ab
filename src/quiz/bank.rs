use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{LoadError, Question};

/// The full pool of questions, loaded once and only read afterwards.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: String,
    pub name: String,
}

impl Chapter {
    /// Title shown when a single chapter is studied, e.g. "Trafik İşaretleri (1.2.03)".
    pub fn title(&self) -> String {
        let number = self.number.replace(" Bölüm", "");
        format!("{} ({})", self.name, number.trim())
    }
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { questions })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Distinct theme names, ordered by the dotted number they start with.
    pub fn themes(&self) -> Vec<String> {
        let mut themes = self
            .questions
            .iter()
            .map(|q| q.theme_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        themes.sort_by_cached_key(|t| numeric_key(t));
        themes
    }

    /// Distinct chapters of `theme`, ordered by chapter number.
    ///
    /// Chapter names repeat across themes, so the number is what identifies a chapter.
    pub fn chapters(&self, theme: &str) -> Vec<Chapter> {
        let mut chapters: Vec<Chapter> = Vec::new();
        for question in self.questions.iter().filter(|q| q.theme_name == theme) {
            if !chapters.iter().any(|c| c.number == question.chapter_number) {
                chapters.push(Chapter {
                    number: question.chapter_number.clone(),
                    name: question.chapter_name.clone(),
                });
            }
        }
        chapters.sort_by_cached_key(|c| numeric_key(&c.number));
        chapters
    }

    /// Questions of `theme`, optionally narrowed to one chapter number, in bank order.
    pub fn questions_in(&self, theme: &str, chapter: Option<&str>) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.theme_name == theme)
            .filter(|q| chapter.map_or(true, |c| q.chapter_number == c))
            .cloned()
            .collect()
    }
}

/// Sort key made of the first run of dot-separated numbers in `label`.
/// Labels without numbers go last; ties fall back to the label itself.
fn numeric_key(label: &str) -> (bool, Vec<u32>, String) {
    let start = label.find(|c: char| c.is_ascii_digit());
    let numbers = start
        .map(|start| {
            label[start..]
                .split(|c: char| !c.is_ascii_digit() && c != '.')
                .next()
                .unwrap_or_default()
                .split('.')
                .filter(|part| !part.is_empty())
                .filter_map(|part| part.parse().ok())
                .collect::<Vec<u32>>()
        })
        .unwrap_or_default();
    (numbers.is_empty(), numbers, label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = r#"[
        {"question_id": 1, "points": "3", "theme_name": "2.1. Trafik İşaretleri",
         "chapter_number": "2.1.10 Bölüm", "chapter_name": "Yasaklayıcı İşaretler",
         "options": [{"letter": "a", "text": "Evet"}, {"letter": "b", "text": "Hayır"}],
         "correct_answers": [{"letter": "a"}]},
        {"question_id": 2, "points": 4, "theme_name": "1.1. Tehlike Bilgisi",
         "chapter_number": "1.1.02 Bölüm", "chapter_name": "Sürücü Davranışı",
         "options": [], "correct_answers": [{"letter": 50}]},
        {"question_id": 3, "points": "5", "theme_name": "2.1. Trafik İşaretleri",
         "chapter_number": "2.1.02 Bölüm", "chapter_name": "Tehlike Uyarı İşaretleri",
         "options": [{"letter": "a", "text": "x"}], "correct_answers": [{"letter": "a"}]},
        {"question_id": 4, "points": "2", "theme_name": "10.1. Araç Tekniği",
         "chapter_number": "10.1.01 Bölüm", "chapter_name": "Motor",
         "options": [{"letter": "a", "text": "x"}], "correct_answers": [{"letter": "a"}]},
        {"question_id": 5, "points": "2", "theme_name": "Diğer",
         "chapter_number": "", "chapter_name": "",
         "options": [{"letter": "a", "text": "x"}], "correct_answers": [{"letter": "a"}]},
        {"question_id": 6, "points": "1", "theme_name": "2.1. Trafik İşaretleri",
         "chapter_number": "2.1.02 Bölüm", "chapter_name": "Tehlike Uyarı İşaretleri",
         "options": [{"letter": "a", "text": "x"}], "correct_answers": [{"letter": "a"}]}
    ]"#;

    fn bank() -> QuestionBank {
        QuestionBank::from_reader(BANK.as_bytes()).unwrap()
    }

    #[test]
    fn loads_every_question() {
        assert_eq!(bank().len(), 6);
    }

    #[test]
    fn themes_are_sorted_numerically() {
        assert_eq!(
            bank().themes(),
            vec![
                "1.1. Tehlike Bilgisi",
                "2.1. Trafik İşaretleri",
                "10.1. Araç Tekniği",
                "Diğer"
            ]
        );
    }

    #[test]
    fn chapters_are_unique_and_sorted() {
        let chapters = bank().chapters("2.1. Trafik İşaretleri");
        let numbers = chapters.iter().map(|c| c.number.as_str()).collect::<Vec<_>>();
        assert_eq!(numbers, vec!["2.1.02 Bölüm", "2.1.10 Bölüm"]);
        assert_eq!(chapters[0].title(), "Tehlike Uyarı İşaretleri (2.1.02)");
    }

    #[test]
    fn filters_by_theme_and_chapter() {
        let bank = bank();
        let whole_theme = bank.questions_in("2.1. Trafik İşaretleri", None);
        assert_eq!(whole_theme.len(), 3);

        let chapter = bank.questions_in("2.1. Trafik İşaretleri", Some("2.1.02 Bölüm"));
        let ids = chapter
            .iter()
            .map(|q| q.question_id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["3", "6"]);

        assert!(bank.questions_in("Bilinmeyen Konu", None).is_empty());
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = QuestionBank::from_reader("[]".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn malformed_bank_is_rejected() {
        let err = QuestionBank::from_reader(r#"{"question_id": 1}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = QuestionBank::load("/nonexistent/data.json").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
