//! Checks insertion, lookup, navigation and removal on a tree of even keys.
//!
//! Usage: `main [MAX_KEY] [LOG_LEVEL]`. Inserts `0, 2, .., MAX_KEY` (default 100000) into one
//! tree iteratively and into another recursively, then checks a fixed set of sample keys.
//! Timings live in `benches/insert_find.rs`.

use std::{env, error::Error, process::ExitCode};

use arena_avl::AvlTree;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

const DEFAULT_MAX_KEY: u32 = 100_000;

const SAMPLE_KEYS: [u32; 14] = [510, 512, 514, 508, 506, 210, 1000, 0, 2, 1600, 4, 7898, 500, 516];

type BoxResult<T> = Result<T, Box<dyn Error>>;

fn check(ok: bool, what: impl FnOnce() -> String) -> BoxResult<()> {
    if ok {
        Ok(())
    } else {
        Err(what().into())
    }
}

fn value_for(key: u32) -> String {
    format!("bruh {key}")
}

fn run(max_key: u32) -> BoxResult<()> {
    let mut iterative = AvlTree::new();
    let mut recursive = AvlTree::new();

    (0..=max_key)
        .step_by(2)
        .try_for_each(|key| iterative.insert(key, value_for(key)))?;
    info!(
        "height with {} entries: {}",
        iterative.len(),
        iterative.height()
    );

    (0..=max_key)
        .step_by(2)
        .try_for_each(|key| recursive.insert_recursive(key, value_for(key)))?;
    check(iterative.root() == recursive.root(), || {
        "iterative and recursive insertion disagree on the root".into()
    })?;

    // Samples need a successor in the tree.
    let samples: Vec<u32> = SAMPLE_KEYS
        .into_iter()
        .filter(|&key| key.checked_add(2).is_some_and(|succ| succ <= max_key))
        .collect();

    for key in &samples {
        check(iterative.find_key(key) == Some(key), || {
            format!("iterative find missed {key}")
        })?;
        check(iterative.find_key_recursive(key) == Some(key), || {
            format!("recursive find missed {key}")
        })?;
    }
    info!("found {} sample keys", samples.len());

    for &key in &samples {
        let expected = key.checked_sub(2).map(|pred| (pred, value_for(pred)));
        let found = iterative.predecessor(&key).map(|(k, v)| (*k, v.clone()));
        check(found == expected, || format!("wrong predecessor of {key}: {found:?}"))?;

        let expected = Some((key + 2, value_for(key + 2)));
        let found = iterative.successor(&key).map(|(k, v)| (*k, v.clone()));
        check(found == expected, || format!("wrong successor of {key}: {found:?}"))?;
    }

    let last = max_key - max_key % 2;
    check(
        iterative.maximum().map(|(k, _)| *k) == Some(last),
        || format!("maximum is not {last}"),
    )?;
    check(iterative.minimum().map(|(k, _)| *k) == Some(0), || {
        "minimum is not 0".into()
    })?;

    for &key in &samples {
        check(iterative.remove(&key) == Some(value_for(key)), || {
            format!("remove of {key} returned the wrong value")
        })?;
        check(iterative.find_key(&key).is_none(), || {
            format!("{key} still present after removal")
        })?;

        let mut prev = None;
        let mut ascending = true;
        iterative.inorder(|&k, _| {
            ascending &= prev.map_or(true, |p| p < k);
            prev = Some(k);
        });
        check(ascending, || format!("out of order after removing {key}"))?;
    }
    info!("removed {} sample keys, {} entries left", samples.len(), iterative.len());

    Ok(())
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);

    let max_key = match args.next().map(|arg| arg.parse::<u32>()) {
        None => DEFAULT_MAX_KEY,
        Some(Ok(max_key)) => max_key,
        Some(Err(err)) => {
            eprintln!("invalid MAX_KEY: {err}");
            return ExitCode::FAILURE;
        }
    };

    let level = match args.next().map(|arg| arg.parse::<LevelFilter>()) {
        None => LevelFilter::Info,
        Some(Ok(level)) => level,
        Some(Err(err)) => {
            eprintln!("invalid LOG_LEVEL: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("failed to initialize logging: {err}");
    }

    match run(max_key) {
        Ok(()) => {
            info!("all checks passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
