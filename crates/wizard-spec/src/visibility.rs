use crate::answers::Answers;
use crate::spec::question::Question;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// True when any skip condition of `question` holds against `answers`.
pub fn is_skipped(question: &Question, answers: &Answers) -> bool {
    question
        .skip_if
        .iter()
        .any(|condition| condition.holds(answers))
}

/// Questions that are not currently skipped, in their original order.
///
/// Recomputed from scratch on every call; nothing about the previous sequence
/// is remembered.
pub fn effective_sequence<'a>(questions: &'a [Question], answers: &Answers) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|question| !is_skipped(question, answers))
        .collect()
}

pub fn resolve_visibility(questions: &[Question], answers: &Answers) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for question in questions {
        map.insert(question.id.clone(), !is_skipped(question, answers));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Comparison, Expr};

    fn questions() -> Vec<Question> {
        vec![
            Question::new("age", "Age"),
            Question::new("university", "University")
                .skip_if(Expr::compare("age", Comparison::Le, 18.0)),
            Question::new("degree", "Degree").skip_if(Expr::empty("university")),
            Question::new("about", "About"),
        ]
    }

    fn ids(sequence: &[&Question]) -> Vec<String> {
        sequence.iter().map(|question| question.id.clone()).collect()
    }

    #[test]
    fn minors_skip_university_chain() {
        let questions = questions();
        let answers: Answers = [("age", "17"), ("university", ""), ("degree", ""), ("about", "")]
            .into_iter()
            .collect();
        assert_eq!(
            ids(&effective_sequence(&questions, &answers)),
            vec!["age", "about"]
        );
    }

    #[test]
    fn degree_appears_once_university_is_named() {
        let questions = questions();
        let mut answers: Answers = [("age", "30"), ("university", ""), ("degree", ""), ("about", "")]
            .into_iter()
            .collect();
        assert_eq!(
            ids(&effective_sequence(&questions, &answers)),
            vec!["age", "university", "about"]
        );

        answers.set("university", "MIT");
        assert_eq!(
            ids(&effective_sequence(&questions, &answers)),
            vec!["age", "university", "degree", "about"]
        );
    }

    #[test]
    fn visibility_map_covers_every_question() {
        let questions = questions();
        let answers: Answers = [("age", "12")].into_iter().collect();
        let map = resolve_visibility(&questions, &answers);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get("university"), Some(&false));
        assert_eq!(map.get("degree"), Some(&false));
        assert_eq!(map.get("about"), Some(&true));
    }
}
