use crate::models::response::Response;

pub struct ScoringService;

impl ScoringService {
    /// Percentage of correct responses over the full question set, rounded
    /// half-up. Questions without a response count as incorrect; a question
    /// set of zero scores 0 rather than dividing by it.
    pub fn score(responses: &[Response], question_count: i64) -> i64 {
        if question_count <= 0 {
            return 0;
        }
        let correct = responses.iter().filter(|r| r.is_correct).count() as f64;
        ((correct / question_count as f64) * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn response(is_correct: bool) -> Response {
        let now = Utc::now();
        Response {
            id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
            question_id: Uuid::new_v4(),
            answer_value: "a".to_string(),
            is_correct,
            time_spent_seconds: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn three_of_four_is_75() {
        let responses = vec![response(true), response(true), response(true), response(false)];
        assert_eq!(ScoringService::score(&responses, 4), 75);
    }

    #[test]
    fn zero_questions_scores_zero() {
        assert_eq!(ScoringService::score(&[], 0), 0);
        assert_eq!(ScoringService::score(&[response(true)], 0), 0);
    }

    #[test]
    fn unanswered_questions_count_as_incorrect() {
        let responses = vec![response(true)];
        assert_eq!(ScoringService::score(&responses, 4), 25);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(ScoringService::score(&[response(true)], 8), 13); // 12.5
        assert_eq!(ScoringService::score(&[response(true)], 3), 33); // 33.33
        let two = vec![response(true), response(true)];
        assert_eq!(ScoringService::score(&two, 3), 67); // 66.67
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let responses = vec![response(true), response(false), response(true)];
        let first = ScoringService::score(&responses, 5);
        for _ in 0..10 {
            assert_eq!(ScoringService::score(&responses, 5), first);
        }
        assert_eq!(first, 40);
    }

    #[test]
    fn all_correct_is_100() {
        let responses: Vec<Response> = (0..6).map(|_| response(true)).collect();
        assert_eq!(ScoringService::score(&responses, 6), 100);
    }
}
