use super::{AnswerEvent, Question, QuizError};

/// Questions drawn for one exam attempt.
pub const EXAM_QUESTION_COUNT: usize = 30;
/// Highest total of error points that still passes.
pub const MAX_ERROR_POINTS: u32 = 10;
/// Point value of the heaviest questions.
pub const FIVE_POINT_WEIGHT: u32 = 5;
/// Missing more five-point questions than this fails the exam outright.
pub const MAX_FIVE_POINT_ERRORS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamResult {
    pub passed: bool,
    pub total_error_points: u32,
    pub five_point_error_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    TooManyFivePointErrors,
    ErrorPointLimitExceeded,
}

impl ExamResult {
    pub fn failure_reason(&self) -> Option<FailureReason> {
        if self.five_point_error_count > MAX_FIVE_POINT_ERRORS {
            Some(FailureReason::TooManyFivePointErrors)
        } else if self.total_error_points > MAX_ERROR_POINTS {
            Some(FailureReason::ErrorPointLimitExceeded)
        } else {
            None
        }
    }

    /// Error points the candidate can still afford before failing on the sum.
    pub fn remaining_error_points(&self) -> u32 {
        MAX_ERROR_POINTS.saturating_sub(self.total_error_points)
    }
}

/// Scores an exam from its answer history.
///
/// Every wrong answer adds its question's points to the error total. The exam
/// is passed with at most 10 error points and fewer than two missed five-point
/// questions; both conditions are checked independently.
pub fn compute_exam_result(
    history: &[AnswerEvent],
    questions: &[Question],
) -> Result<ExamResult, QuizError> {
    let mut total_error_points: u32 = 0;
    let mut five_point_error_count = 0;

    for event in history.iter().filter(|e| !e.is_correct) {
        let question = questions
            .iter()
            .find(|q| q.question_id == event.question_id)
            .ok_or_else(|| QuizError::UnknownQuestion {
                question_id: event.question_id.clone(),
            })?;

        total_error_points = total_error_points.saturating_add(question.points);
        if question.points == FIVE_POINT_WEIGHT {
            five_point_error_count += 1;
        }
    }

    Ok(ExamResult {
        passed: total_error_points <= MAX_ERROR_POINTS
            && five_point_error_count <= MAX_FIVE_POINT_ERRORS,
        total_error_points,
        five_point_error_count,
    })
}
