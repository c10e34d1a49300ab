use thiserror::Error;

use super::QuestionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("question {question_id} is a free-text question without a correct answer")]
    MissingCorrectAnswer { question_id: QuestionId },
    #[error("answer history references unknown question {question_id}")]
    UnknownQuestion { question_id: QuestionId },
    #[error("submission kind does not match question {question_id}")]
    SubmissionMismatch { question_id: QuestionId },
    #[error("question {question_id} has no option '{letter}'")]
    UnknownOption {
        question_id: QuestionId,
        letter: String,
    },
    #[error("question {question_id} was already answered")]
    AlreadyAnswered { question_id: QuestionId },
}

impl QuizError {
    /// True when the question bank itself is broken, as opposed to bad user input.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            QuizError::MissingCorrectAnswer { .. } | QuizError::UnknownQuestion { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("question bank is empty")]
    Empty,
}
