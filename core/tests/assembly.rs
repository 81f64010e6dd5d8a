//! Quiz assembly tests: size bound, lookup fallback order, failure modes.

use paperquiz_core::{
    assembly::PoolSource,
    rng::{FixedSequence, PcgRandom},
    store::{QuestionStore, SqliteQuestionStore},
    types::QuestionId,
    AnswerOption, OptionLabel, Question, QuizAssembler, QuizError, QuizResult,
};
use std::cell::RefCell;
use std::collections::HashSet;

// ── Test helpers ────────────────────────────────────────────────────────────

fn question(id: &str) -> Question {
    Question {
        id:             id.to_string(),
        body:           format!("Solve {id}"),
        options:        [
            AnswerOption::text("x = 1"),
            AnswerOption::text("x = 2"),
            AnswerOption::text("x = 3"),
            AnswerOption::text("x = 4"),
        ],
        correct_answer: OptionLabel::B,
        solution:       Some("Factorise.".into()),
        topic:          None,
        tag:            None,
        subject_area:   None,
        tags:           Vec::new(),
        address:        None,
        active:         true,
    }
}

fn ids(prefix: &str, n: usize) -> Vec<QuestionId> {
    (0..n).map(|i| format!("{prefix}-{i}")).collect()
}

/// Scripted store: fixed answers per lookup, records call order.
#[derive(Default)]
struct ScriptedStore {
    tag_index:    Vec<QuestionId>,
    subject_area: Vec<QuestionId>,
    free_tags:    Vec<QuestionId>,
    fail_on:      Option<&'static str>,
    fetch_none:   bool,
    fetch_skip:   Vec<QuestionId>,
    calls:        RefCell<Vec<&'static str>>,
}

impl ScriptedStore {
    fn step(&self, name: &'static str) -> QuizResult<()> {
        self.calls.borrow_mut().push(name);
        if self.fail_on == Some(name) {
            return Err(QuizError::Store(format!("{name}: permission denied")));
        }
        Ok(())
    }
}

impl QuestionStore for ScriptedStore {
    fn list_ids_by_tag_index(&self, _topic: &str, _tag: Option<&str>) -> QuizResult<Vec<QuestionId>> {
        self.step("tag_index")?;
        Ok(self.tag_index.clone())
    }

    fn list_ids_by_subject_area(&self, _topic: &str) -> QuizResult<Vec<QuestionId>> {
        self.step("subject_area")?;
        Ok(self.subject_area.clone())
    }

    fn list_ids_by_free_tags(&self, _topic: &str, _tag: Option<&str>) -> QuizResult<Vec<QuestionId>> {
        self.step("free_tags")?;
        Ok(self.free_tags.clone())
    }

    fn fetch_by_ids(&self, ids: &[QuestionId]) -> QuizResult<Vec<Question>> {
        self.step("fetch")?;
        if self.fetch_none {
            return Ok(Vec::new());
        }
        Ok(ids
            .iter()
            .filter(|id| !self.fetch_skip.contains(id))
            .map(|id| question(id))
            .collect())
    }
}

fn assembler(store: ScriptedStore) -> QuizAssembler<ScriptedStore, PcgRandom> {
    QuizAssembler::with_rng(store, PcgRandom::new(0x5EED))
}

// ── Size bound ──────────────────────────────────────────────────────────────

#[test]
fn large_pool_is_capped_at_ten() {
    let mut a = assembler(ScriptedStore { tag_index: ids("q", 37), ..Default::default() });
    let quiz = a.assemble("Algebra", None, None).unwrap();

    assert_eq!(quiz.len(), 10);
    let unique: HashSet<_> = quiz.question_ids.iter().collect();
    assert_eq!(unique.len(), 10, "sample must not repeat ids");
    assert!(quiz.question_ids.iter().all(|id| id.starts_with("q-")));
}

#[test]
fn small_pool_is_taken_whole_in_order() {
    let mut a = assembler(ScriptedStore { tag_index: ids("q", 6), ..Default::default() });
    let quiz = a.assemble("Algebra", None, None).unwrap();
    assert_eq!(quiz.question_ids, ids("q", 6));
}

#[test]
fn pool_of_exactly_ten_draws_nothing_for_selection() {
    let store = ScriptedStore { tag_index: ids("q", 10), ..Default::default() };
    let mut a = QuizAssembler::with_rng(store, FixedSequence::new(vec![0.0]));
    let selected = a.select(ids("q", 10));
    assert_eq!(selected, ids("q", 10));
}

#[test]
fn sampling_follows_the_injected_source() {
    let store = ScriptedStore::default();
    // All-zero draws rotate the pool left by one before truncation.
    let mut a = QuizAssembler::with_rng(store, FixedSequence::new(vec![0.0]));
    let selected = a.select(ids("q", 12));
    let mut expected = ids("q", 12)[1..].to_vec();
    expected.truncate(10);
    assert_eq!(selected, expected);
}

#[test]
fn duplicate_ids_from_the_index_are_collapsed() {
    let pool = vec!["q-1".to_string(), "q-2".into(), "q-1".into()];
    let mut a = assembler(ScriptedStore { tag_index: pool, ..Default::default() });
    let quiz = a.assemble("Algebra", None, None).unwrap();
    assert_eq!(quiz.question_ids, vec!["q-1", "q-2"]);
}

// ── Fallback order ──────────────────────────────────────────────────────────

#[test]
fn tag_index_hit_skips_fallbacks() {
    let a = assembler(ScriptedStore {
        tag_index:    ids("t", 2),
        subject_area: ids("s", 2),
        ..Default::default()
    });
    let (source, pool) = a.candidate_pool("Algebra", None).unwrap();
    assert_eq!(source, PoolSource::TagIndex);
    assert_eq!(pool, ids("t", 2));
    assert_eq!(*a.store().calls.borrow(), vec!["tag_index"]);
}

#[test]
fn falls_back_to_subject_area() {
    let mut a = assembler(ScriptedStore {
        subject_area: ids("s", 4),
        free_tags:    ids("f", 4),
        ..Default::default()
    });
    let quiz = a.assemble("Probability", None, None).unwrap();
    assert!(!quiz.is_empty());
    assert_eq!(quiz.question_ids, ids("s", 4));
    assert_eq!(*a.store().calls.borrow(), vec!["tag_index", "subject_area", "fetch"]);
}

#[test]
fn falls_back_to_free_tags_last() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut a = assembler(ScriptedStore { free_tags: ids("f", 3), ..Default::default() });
    let quiz = a.assemble("Vectors", Some("Dot Product"), None).unwrap();
    assert_eq!(quiz.question_ids, ids("f", 3));
    assert_eq!(
        *a.store().calls.borrow(),
        vec!["tag_index", "subject_area", "free_tags", "fetch"]
    );
}

#[test]
fn all_lookups_empty_is_a_named_failure() {
    let mut a = assembler(ScriptedStore::default());
    let err = a.assemble("Topology", Some("Knots"), None).unwrap_err();
    match &err {
        QuizError::NoEligibleQuestions { topic, tag } => {
            assert_eq!(topic, "Topology");
            assert_eq!(tag.as_deref(), Some("Knots"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Topology"));
    assert!(err.to_string().contains("Knots"));
}

// ── Failure propagation ─────────────────────────────────────────────────────

#[test]
fn store_errors_propagate_without_retry() {
    let mut a = assembler(ScriptedStore {
        subject_area: ids("s", 3),
        fail_on:      Some("tag_index"),
        ..Default::default()
    });
    let err = a.assemble("Algebra", None, None).unwrap_err();
    assert!(matches!(err, QuizError::Store(_)));
    assert_eq!(*a.store().calls.borrow(), vec!["tag_index"]);
}

#[test]
fn fetch_errors_propagate() {
    let mut a = assembler(ScriptedStore {
        tag_index: ids("q", 3),
        fail_on:   Some("fetch"),
        ..Default::default()
    });
    assert!(matches!(a.assemble("Algebra", None, None), Err(QuizError::Store(_))));
}

#[test]
fn empty_fetch_is_an_inconsistency() {
    let mut a = assembler(ScriptedStore {
        tag_index:  ids("q", 3),
        fetch_none: true,
        ..Default::default()
    });
    assert!(matches!(
        a.assemble("Algebra", None, None),
        Err(QuizError::EmptyFetch { requested: 3 })
    ));
}

#[test]
fn partial_fetch_keeps_the_selected_ids() {
    let mut a = assembler(ScriptedStore {
        tag_index:  ids("q", 4),
        fetch_skip: vec!["q-2".to_string()],
        ..Default::default()
    });
    let quiz = a.assemble("Algebra", None, None).unwrap();
    assert_eq!(quiz.question_ids, ids("q", 4));
    assert_eq!(quiz.len(), 3);
    assert!(quiz.question("q-2").is_none());
    assert_eq!(quiz.record().question_ids, ids("q", 4));
}

#[test]
fn empty_topic_is_invalid_input() {
    let mut a = assembler(ScriptedStore { tag_index: ids("q", 3), ..Default::default() });
    assert!(matches!(a.assemble("   ", None, None), Err(QuizError::InvalidInput(_))));
    assert!(a.store().calls.borrow().is_empty());
}

// ── End to end against SQLite ───────────────────────────────────────────────

#[test]
fn quadratic_equations_pool_of_three() {
    let store = SqliteQuestionStore::in_memory_migrated().unwrap();
    for id in ["quad-1", "quad-2", "quad-3"] {
        let mut q = question(id);
        q.topic = Some("Quadratic Equations".into());
        store.insert_question(&q).unwrap();
    }
    let mut other = question("lin-1");
    other.topic = Some("Linear Equations".into());
    store.insert_question(&other).unwrap();

    let mut a = QuizAssembler::with_rng(&store, PcgRandom::new(1));
    let quiz = a.assemble("Quadratic Equations", None, Some("student-1")).unwrap();

    assert_eq!(quiz.len(), 3);
    assert!(quiz.title.contains("Quadratic Equations"));
    assert!(quiz.title.contains('3'));
    for rq in &quiz.questions {
        let mut targets: Vec<_> = rq.label_mapping.pairs().map(|(_, t)| t).collect();
        targets.sort();
        assert_eq!(targets, OptionLabel::ALL.to_vec());
        assert_eq!(rq.original_correct_answer, OptionLabel::B);
        assert_eq!(rq.label_mapping.mapped(OptionLabel::B), rq.shifted_correct_answer);
    }
}

#[test]
fn sqlite_subject_area_fallback() {
    let store = SqliteQuestionStore::in_memory_migrated().unwrap();
    for id in ["p-1", "p-2"] {
        let mut q = question(id);
        q.subject_area = Some("Statistics and Probability".into());
        store.insert_question(&q).unwrap();
    }

    let mut a = QuizAssembler::with_rng(&store, PcgRandom::new(2));
    let (source, _) = a.candidate_pool("probability", None).unwrap();
    assert_eq!(source, PoolSource::SubjectArea);
    let quiz = a.assemble("probability", None, None).unwrap();
    assert_eq!(quiz.len(), 2);
}

#[test]
fn inactive_questions_are_never_eligible() {
    let store = SqliteQuestionStore::in_memory_migrated().unwrap();
    let mut q = question("old-1");
    q.topic = Some("Mechanics".into());
    q.active = false;
    store.insert_question(&q).unwrap();

    let mut a = QuizAssembler::with_rng(&store, PcgRandom::new(3));
    assert!(matches!(
        a.assemble("Mechanics", None, None),
        Err(QuizError::NoEligibleQuestions { .. })
    ));
}

#[test]
fn configured_target_bounds_the_quiz() {
    let store = ScriptedStore { tag_index: ids("q", 20), ..Default::default() };
    let config = paperquiz_core::config::QuizConfig {
        target_question_count: 5,
        ..Default::default()
    };
    let mut a = QuizAssembler::with_config(store, PcgRandom::new(4), &config);
    let quiz = a.assemble("Algebra", None, Some("v")).unwrap();
    assert_eq!(quiz.len(), 5);
    assert!(quiz.title.contains("(5 questions)"));
}
