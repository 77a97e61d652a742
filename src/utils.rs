use regex::Regex;
use std::sync::LazyLock;

static NEWLINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\n+\s*").unwrap());
static SPACE_BEFORE_PERIOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\.").unwrap());

// Final answers come back with hard wraps and stray spacing before
// punctuation; flatten to one clean line.
pub fn normalize_answer(s: &str) -> String {
    let flat = NEWLINE_RUNS.replace_all(s, " ");
    let fixed = SPACE_BEFORE_PERIOD.replace_all(&flat, ".");
    fixed.trim().to_string()
}
