use std::collections::BTreeSet;

use super::{Question, QuizError, Submission};

/// Decides whether `submission` answers `question` correctly.
///
/// Option questions need the exact set of correct letters: a subset or a
/// superset is wrong. Free-text answers are compared after trimming and
/// lower-casing both sides.
pub fn check_answer(question: &Question, submission: &Submission) -> Result<bool, QuizError> {
    match (question.is_free_text(), submission) {
        (false, Submission::Options(selected)) => {
            let selected = selected.iter().map(String::as_str).collect::<BTreeSet<_>>();
            Ok(selected == question.correct_letters())
        }
        (true, Submission::Text(text)) => {
            let expected = question.correct_answers.first().ok_or_else(|| {
                QuizError::MissingCorrectAnswer {
                    question_id: question.question_id.clone(),
                }
            })?;
            Ok(normalize(text) == normalize(&expected.letter))
        }
        _ => Err(QuizError::SubmissionMismatch {
            question_id: question.question_id.clone(),
        }),
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Turns a chat message into a submission for `question`.
///
/// Option letters may be separated by spaces, commas or semicolons, or run
/// together ("ac"). Letters are matched case-insensitively and mapped onto the
/// question's own spelling. Returns `Ok(None)` for an empty message.
pub fn parse_submission(question: &Question, raw: &str) -> Result<Option<Submission>, QuizError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if question.is_free_text() {
        return Ok(Some(Submission::text(raw)));
    }

    let tokens = raw
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>();

    let mut selected = BTreeSet::new();
    for token in tokens {
        match find_letter(question, token) {
            Some(letter) => {
                selected.insert(letter);
            }
            // "ac" typed without separators
            None => {
                for c in token.chars() {
                    let letter = find_letter(question, &c.to_string()).ok_or_else(|| {
                        QuizError::UnknownOption {
                            question_id: question.question_id.clone(),
                            letter: token.to_string(),
                        }
                    })?;
                    selected.insert(letter);
                }
            }
        }
    }
    Ok(Some(Submission::Options(selected)))
}

fn find_letter(question: &Question, token: &str) -> Option<String> {
    let token = token.trim_end_matches(|c: char| c == ')' || c == '.').to_lowercase();
    question
        .options
        .iter()
        .find(|o| o.letter.to_lowercase() == token)
        .map(|o| o.letter.clone())
}
