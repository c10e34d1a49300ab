use super::{AnswerEvent, Question, QuizError};

/// Points earned by the correctly answered entries of `history`.
pub fn score(history: &[AnswerEvent], questions: &[Question]) -> Result<u32, QuizError> {
    history
        .iter()
        .filter(|event| event.is_correct)
        .try_fold(0u32, |acc, event| {
            let question = questions
                .iter()
                .find(|q| q.question_id == event.question_id)
                .ok_or_else(|| QuizError::UnknownQuestion {
                    question_id: event.question_id.clone(),
                })?;
            Ok(acc.saturating_add(question.points))
        })
}

pub fn max_points(questions: &[Question]) -> u32 {
    questions
        .iter()
        .fold(0, |acc: u32, q| acc.saturating_add(q.points))
}

/// `score` as a rounded percentage of `max_points`; an empty set counts as 0%.
pub fn completion_percentage(score: u32, max_points: u32) -> u32 {
    if max_points == 0 {
        return 0;
    }
    let (score, max_points) = (u64::from(score), u64::from(max_points));
    // round half up
    ((200 * score + max_points) / (2 * max_points)) as u32
}
