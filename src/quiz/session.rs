use std::collections::BTreeMap;

use super::evaluator::check_answer;
use super::exam::{compute_exam_result, ExamResult};
use super::score::{completion_percentage, max_points, score};
use super::{AnswerEvent, Question, QuizError, Submission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Every question of a theme or chapter, scored as a percentage.
    Study { title: String },
    /// A sampled set scored by the error-point rules.
    Exam,
}

/// The recorded answer to one question. Replaced, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub submission: Submission,
    pub is_correct: bool,
}

/// One pass through a question set.
#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    questions: Vec<Question>,
    index: usize,
    answers: BTreeMap<usize, AnsweredQuestion>,
}

impl Session {
    pub fn study(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self::new(
            Mode::Study {
                title: title.into(),
            },
            questions,
        )
    }

    pub fn exam(questions: Vec<Question>) -> Self {
        Self::new(Mode::Exam, questions)
    }

    fn new(mode: Mode, questions: Vec<Question>) -> Self {
        Self {
            mode,
            questions,
            index: 0,
            answers: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_exam(&self) -> bool {
        self.mode == Mode::Exam
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn current_answer(&self) -> Option<&AnsweredQuestion> {
        self.answers.get(&self.index)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Evaluates `submission` against the current question and records it.
    /// A session without questions records nothing and reports false.
    pub fn submit(&mut self, submission: Submission) -> Result<bool, QuizError> {
        let question = match self.questions.get(self.index) {
            Some(question) => question,
            None => return Ok(false),
        };
        if self.answers.contains_key(&self.index) {
            return Err(QuizError::AlreadyAnswered {
                question_id: question.question_id.clone(),
            });
        }

        let is_correct = check_answer(question, &submission)?;
        log::debug!(
            "question {} answered with '{}': correct={}",
            question.question_id,
            submission,
            is_correct
        );
        self.answers.insert(
            self.index,
            AnsweredQuestion {
                submission,
                is_correct,
            },
        );
        Ok(is_correct)
    }

    /// Moves to the next question. Returns false when already on the last one.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Forgets every answer and starts again from the first question.
    pub fn restart(&mut self) {
        self.index = 0;
        self.answers.clear();
    }

    /// Answer events in question order.
    pub fn history(&self) -> Vec<AnswerEvent> {
        self.answers
            .iter()
            .filter_map(|(index, answer)| {
                self.questions
                    .get(*index)
                    .map(|q| AnswerEvent::new(q.question_id.clone(), answer.is_correct))
            })
            .collect()
    }

    pub fn score(&self) -> Result<u32, QuizError> {
        score(&self.history(), &self.questions)
    }

    pub fn max_points(&self) -> u32 {
        max_points(&self.questions)
    }

    pub fn percentage(&self) -> Result<u32, QuizError> {
        Ok(completion_percentage(self.score()?, self.max_points()))
    }

    /// The pass/fail verdict; study sessions have none.
    pub fn exam_result(&self) -> Result<Option<ExamResult>, QuizError> {
        if !self.is_exam() {
            return Ok(None);
        }
        compute_exam_result(&self.history(), &self.questions).map(Some)
    }
}
