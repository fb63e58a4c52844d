//! Expected-file heuristics.
//!
//! Four heuristics run over the instruction text and their results are
//! unioned:
//!
//! 1. path-like tokens anywhere (`src/api.py`)
//! 2. explicit lists after `files:`, `create`, `generate` (`files: a.py, b.py`)
//! 3. tree or bullet notation (`- api.py`)
//! 4. emphasized markdown (`` `api.py` ``, `**api.py**`)

use crate::core::string::basename;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Extensions recognized when guessing expected files.
pub const EXPECTED_EXTENSIONS: &[&str] = &[
    "py", "txt", "json", "toml", "yaml", "yml", "cfg", "js", "ts", "html", "css",
];

fn ext_alternation() -> String {
    EXPECTED_EXTENSIONS.join("|")
}

static GENERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"([\w/\\]+\.(?:{}))\b", ext_alternation())).unwrap()
});

static LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:files?|create|generate)[:\s]+([^\n]+)").unwrap()
});

static TREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^\s*[\-\*]\s*([\w/\\]+\.(?:{}))\b",
        ext_alternation()
    ))
    .unwrap()
});

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"[`*]+([\w/\\]+\.(?:{}))[`*]+",
        ext_alternation()
    ))
    .unwrap()
});

fn has_expected_extension(item: &str) -> bool {
    EXPECTED_EXTENSIONS
        .iter()
        .any(|ext| item.len() > ext.len() + 1 && item.ends_with(&format!(".{}", ext)))
}

fn push_normalized(found: &mut BTreeSet<String>, path: &str) {
    found.insert(path.replace('\\', "/"));
}

/// Files an instruction asks for, sorted and de-duplicated.
pub fn expected_files(instruction: &str) -> Vec<String> {
    let mut found = BTreeSet::new();

    for re in [&*GENERAL, &*TREE, &*EMPHASIS] {
        for cap in re.captures_iter(instruction) {
            if let Some(m) = cap.get(1) {
                push_normalized(&mut found, m.as_str());
            }
        }
    }

    for cap in LIST.captures_iter(instruction) {
        let Some(list) = cap.get(1) else { continue };
        for item in list.as_str().split(',') {
            let item = item.trim();
            // Multi-word items are prose, not paths
            if !item.contains(char::is_whitespace) && has_expected_extension(item) {
                push_normalized(&mut found, item);
            }
        }
    }

    found.into_iter().collect()
}

/// Whether `expected` was produced, by full path, basename, or path suffix.
pub fn is_produced(expected: &str, written: &[String]) -> bool {
    let expected = expected.replace('\\', "/");
    let expected_base = basename(&expected);
    written.iter().any(|w| {
        let w = w.replace('\\', "/");
        w == expected || basename(&w) == expected_base || w.ends_with(expected_base)
    })
}

/// Expected files that no written path accounts for, in expected order.
pub fn missing_files(expected: &[String], written: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|e| !is_produced(e, written))
        .cloned()
        .collect()
}
