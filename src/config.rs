use std::path::PathBuf;

use crate::quiz::exam::EXAM_QUESTION_COUNT;

const DEFAULT_QUESTIONS_PATH: &str = "data.json";
const DEFAULT_MEDIA_DIR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub questions_path: PathBuf,
    pub exam_question_count: usize,
    /// Root that `local_image_paths` and `local_video_paths` are relative to.
    pub media_dir: PathBuf,
}

impl Config {
    /// Reads `QUESTIONS_PATH`, `EXAM_QUESTION_COUNT` and `MEDIA_DIR`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            var(key)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        let questions_path = path("QUESTIONS_PATH", DEFAULT_QUESTIONS_PATH);
        let media_dir = path("MEDIA_DIR", DEFAULT_MEDIA_DIR);

        let exam_question_count = match var("EXAM_QUESTION_COUNT") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(count) if count > 0 => count,
                _ => {
                    log::warn!(
                        "Ignoring EXAM_QUESTION_COUNT={:?}, using {}",
                        raw,
                        EXAM_QUESTION_COUNT
                    );
                    EXAM_QUESTION_COUNT
                }
            },
            None => EXAM_QUESTION_COUNT,
        };

        Self {
            questions_path,
            exam_question_count,
            media_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(
            config(&[]),
            Config {
                questions_path: PathBuf::from("data.json"),
                exam_question_count: 30,
                media_dir: PathBuf::from("."),
            }
        );
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("QUESTIONS_PATH", "/srv/ehliyet/questions.json"),
            ("EXAM_QUESTION_COUNT", " 20 "),
            ("MEDIA_DIR", "/srv/ehliyet"),
        ]);
        assert_eq!(config.questions_path, PathBuf::from("/srv/ehliyet/questions.json"));
        assert_eq!(config.exam_question_count, 20);
        assert_eq!(config.media_dir, PathBuf::from("/srv/ehliyet"));
    }

    #[test]
    fn invalid_count_falls_back() {
        assert_eq!(config(&[("EXAM_QUESTION_COUNT", "0")]).exam_question_count, 30);
        assert_eq!(config(&[("EXAM_QUESTION_COUNT", "otuz")]).exam_question_count, 30);
    }
}
