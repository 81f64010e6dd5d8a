//! Question address codec, exercised the way the router uses it.

use paperquiz_core::{
    locator::QuestionAddress,
    store::SqliteQuestionStore,
    AnswerOption, OptionLabel, Paper, Question, QuestionLocator, QuizError,
};

#[test]
fn canonical_examples() {
    let loc = QuestionLocator::new("ns");
    assert_eq!(loc.to_address(2023, Some("i"), 15).unwrap(), "/ns/2023/I/15");

    let addr = loc.from_address("/ns/2023/I/15").unwrap();
    assert_eq!(addr.year(), 2023);
    assert_eq!(addr.paper(), Paper::I);
    assert_eq!(addr.number(), 15);
}

#[test]
fn invalid_parameters_are_reported_not_clamped() {
    let loc = QuestionLocator::new("ns");
    let err = loc.to_address(2011, Some("I"), 15).unwrap_err();
    assert!(matches!(err, QuizError::InvalidAddress { year: 2011, .. }));
    assert!(err.to_string().contains("Invalid parameters"));

    for (year, paper, number) in [
        (2026, Some("I"), 1),
        (2020, Some("III"), 1),
        (2020, Some(""), 1),
        (2020, None, 1),
        (2020, Some("I"), 21),
        (2020, Some("II"), 46),
        (2020, Some("I"), 0),
    ] {
        assert!(!QuestionLocator::is_valid(year, paper, number));
        assert!(loc.to_address(year, paper, number).is_err());
    }
}

#[test]
fn malformed_addresses_are_none() {
    let loc = QuestionLocator::new("ns");
    for addr in ["/ns/2023/I", "/ns/2023/I/15/extra", "/ns/2023/III/15", "/ns/2011/I/15"] {
        assert!(loc.from_address(addr).is_none(), "{addr}");
    }
}

#[test]
fn exhaustive_round_trip_over_the_domain() {
    let loc = QuestionLocator::new("ns");
    let all = loc.all_addresses();
    assert_eq!(all.len(), 910);
    for s in &all {
        let addr = loc.from_address(s).expect("canonical address must parse");
        assert_eq!(&loc.address_of(&addr), s);
    }
}

#[test]
fn address_resolves_to_stored_question() {
    let store = SqliteQuestionStore::in_memory_migrated().unwrap();
    let loc = QuestionLocator::new("ns");
    let address = QuestionAddress::new(2019, Paper::II, 33);
    store
        .insert_question(&Question {
            id:             "2019-II-33".into(),
            body:           "Which of the following is prime?".into(),
            options:        [
                AnswerOption::text("21"),
                AnswerOption::text("27"),
                AnswerOption::text("29"),
                AnswerOption::text("33"),
            ],
            correct_answer: OptionLabel::C,
            solution:       None,
            topic:          Some("Number Theory".into()),
            tag:            None,
            subject_area:   None,
            tags:           Vec::new(),
            address,
            active:         true,
        })
        .unwrap();

    let link = loc.to_address(2019, Some("ii"), 33).unwrap();
    let parsed = loc.from_address(&link).unwrap();
    let found = store.question_by_address(&parsed).unwrap().unwrap();
    assert_eq!(found.id, "2019-II-33");

    let missing = loc.from_address("/ns/2019/II/34").unwrap();
    assert!(store.question_by_address(&missing).unwrap().is_none());
}
