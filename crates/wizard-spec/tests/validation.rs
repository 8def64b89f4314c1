use serde_json::{Value, json};

use wizard_spec::{
    Answers, Expr, FormSpec, Question, QuestionType, SpecError, ValidationRule,
    build_initial_values, build_validation_rules, lint, resolve_visibility, validate_all,
};

fn make_simple_form() -> FormSpec {
    FormSpec {
        id: "simple".into(),
        title: "Simple".into(),
        description: None,
        navigation: None,
        questions: vec![
            Question {
                id: "name".into(),
                kind: QuestionType::Text,
                title: "Name".into(),
                description: None,
                validation: Some(ValidationRule::required()),
                skip_if: vec![],
                initial_value: None,
            },
            Question {
                id: "nickname".into(),
                kind: QuestionType::Text,
                title: "Nickname".into(),
                description: None,
                validation: Some(ValidationRule::min_length(2)),
                skip_if: vec![Expr::empty("name")],
                initial_value: Some(Value::String("Bud".into())),
            },
        ],
    }
}

#[test]
fn initial_values_cover_every_question() {
    let spec = make_simple_form();
    let answers = build_initial_values(&spec.questions);
    assert_eq!(answers.get("name"), Some(&json!("")));
    assert_eq!(answers.get("nickname"), Some(&json!("Bud")));
}

#[test]
fn rules_are_skip_aware() {
    let spec = make_simple_form();
    let rules = build_validation_rules(&spec.questions);
    let mut answers = build_initial_values(&spec.questions);
    answers.set("nickname", "B");

    assert!(rules.check("nickname", &answers).is_none());
    answers.set("name", "Bob");
    let error = rules.check("nickname", &answers).expect("visible now");
    assert_eq!(error.message, "Must be at least 2 characters");
}

#[test]
fn validation_reports_missing() {
    let spec = make_simple_form();
    let answers = build_initial_values(&spec.questions);
    let errors = validate_all(&spec.questions, &answers);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].question_id, "name");
}

#[test]
fn visibility_follows_answers() {
    let spec = make_simple_form();
    let answers: Answers = [("name", "")].into_iter().collect();
    let visibility = resolve_visibility(&spec.questions, &answers);
    assert_eq!(visibility.get("nickname"), Some(&false));
}

#[test]
fn form_round_trips_through_json() {
    let spec = make_simple_form();
    let value = serde_json::to_value(&spec).expect("serialize");
    assert_eq!(value["questions"][0]["type"], "text");
    assert_eq!(value["questions"][1]["skip_if"][0]["op"], "empty");
    let back: FormSpec = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, spec);
}

#[test]
fn lint_flags_unknown_skip_reference() {
    let spec: FormSpec = serde_json::from_value(json!({
        "id": "typo",
        "title": "Typo",
        "questions": [
            { "id": "age", "type": "number", "title": "Age" },
            {
                "id": "school",
                "title": "School",
                "skip_if": [{ "op": "compare", "field": "agee", "cmp": "gt", "value": 18 }]
            }
        ]
    }))
    .expect("deserialize");
    let report = lint(&spec);
    assert_eq!(
        report.errors,
        vec![SpecError::UnknownReference {
            question_id: "school".into(),
            field: "agee".into()
        }]
    );
}
