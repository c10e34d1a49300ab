use rand::seq::SliceRandom;
use rand::Rng;

use super::Question;

/// Draws `count` distinct questions from `pool` for one exam attempt.
///
/// Asking for more questions than the pool holds yields the whole pool in
/// shuffled order. The pool itself is left untouched.
pub fn sample(pool: &[Question], count: usize) -> Vec<Question> {
    sample_with(pool, count, &mut rand::thread_rng())
}

pub fn sample_with<R>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::quiz::{fixtures, QuestionId};

    fn ids(questions: &[Question]) -> Vec<QuestionId> {
        questions.iter().map(|q| q.question_id.clone()).collect()
    }

    #[test]
    fn exam_sample_has_thirty_distinct_questions_from_the_pool() {
        for pool_size in [30, 31, 45, 200] {
            let pool = fixtures::pool(pool_size, 3);
            let pool_ids = ids(&pool).into_iter().collect::<HashSet<_>>();

            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let exam = sample_with(&pool, 30, &mut rng);
                let exam_ids = ids(&exam).into_iter().collect::<HashSet<_>>();

                assert_eq!(exam.len(), 30);
                assert_eq!(exam_ids.len(), 30, "duplicates for seed {seed}");
                assert!(exam_ids.is_subset(&pool_ids));
            }
        }
    }

    #[test]
    fn over_request_is_clamped_to_the_pool() {
        let pool = fixtures::pool(5, 3);
        let exam = sample_with(&pool, 30, &mut StepRng::new(0, 1));

        assert_eq!(exam.len(), 5);
        let exam_ids = ids(&exam).into_iter().collect::<HashSet<_>>();
        assert_eq!(exam_ids.len(), 5);
    }

    #[test]
    fn empty_pool_gives_empty_sample() {
        assert!(sample(&[], 30).is_empty());
    }

    #[test]
    fn pool_is_not_reordered() {
        let pool = fixtures::pool(40, 2);
        let before = ids(&pool);
        let _ = sample(&pool, 30);
        assert_eq!(ids(&pool), before);
    }

    #[test]
    fn every_question_can_be_drawn() {
        let pool = fixtures::pool(40, 2);
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            seen.extend(ids(&sample_with(&pool, 30, &mut rng)));
        }
        assert_eq!(seen.len(), pool.len());
    }
}
