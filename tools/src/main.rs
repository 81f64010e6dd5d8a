//! quiz-runner: headless driver for the quiz engine.
//!
//! Usage:
//!   quiz-runner --db quiz.db --load questions.json
//!   quiz-runner --db quiz.db --topic "Quadratic Equations" --viewer alice
//!   quiz-runner --db quiz.db --reopen <quiz_id> --viewer alice
//!   quiz-runner --db quiz.db --address /questions/2023/I/15

use anyhow::{Context, Result};
use paperquiz_core::{
    config::QuizConfig,
    rng::{PcgRandom, RandomSource, ThreadRandom},
    store::SqliteQuestionStore,
    Question, QuizAssembler,
};
use std::env;

#[derive(serde::Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag(&args, "--db").unwrap_or(":memory:");
    let config = match flag(&args, "--config") {
        Some(path) => QuizConfig::load(path)?,
        None => QuizConfig::default(),
    };

    let store = SqliteQuestionStore::open(db)?;
    store.migrate()?;

    if let Some(path) = flag(&args, "--load") {
        let imported = load_questions(&store, path)?;
        log::info!("imported {imported} questions from {path}");
        println!("imported {imported} questions");
    }

    if let Some(address) = flag(&args, "--address") {
        return resolve_address(&store, &config, address);
    }

    let rng: Box<dyn RandomSource> = match flag(&args, "--seed").map(str::parse::<u64>) {
        Some(seed) => Box::new(PcgRandom::new(seed.context("--seed must be an integer")?)),
        None => Box::new(ThreadRandom::new()),
    };
    let mut assembler = QuizAssembler::with_config(&store, rng, &config);
    let viewer = flag(&args, "--viewer");

    if let Some(quiz_id) = flag(&args, "--reopen") {
        let quiz = assembler.reopen(quiz_id, viewer)?;
        println!("{}", serde_json::to_string_pretty(&quiz)?);
        return Ok(());
    }

    if let Some(topic) = flag(&args, "--topic") {
        let quiz = assembler.assemble_and_save(topic, flag(&args, "--tag"), viewer)?;
        println!("{}", serde_json::to_string_pretty(&quiz)?);
    }

    Ok(())
}

fn load_questions(store: &SqliteQuestionStore, path: &str) -> Result<usize> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    let file: QuestionFile = serde_json::from_str(&content)?;
    for q in &file.questions {
        store
            .insert_question(q)
            .with_context(|| format!("question {}", q.id))?;
    }
    Ok(file.questions.len())
}

fn resolve_address(store: &SqliteQuestionStore, config: &QuizConfig, address: &str) -> Result<()> {
    let locator = config.locator();
    let Some(addr) = locator.from_address(address) else {
        anyhow::bail!("not a valid question address: {address}");
    };
    match store.question_by_address(&addr)? {
        Some(q) => println!("{}", serde_json::to_string_pretty(&q)?),
        None => println!("no question at {}", locator.address_of(&addr)),
    }
    Ok(())
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}
