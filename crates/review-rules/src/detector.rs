//! Issue Detection
//!
//! Ordered, rule-based detection over submitted source text and an optional
//! execution outcome. Each rule is a pure function `(ctx) -> Option<Issue>`;
//! the rules for a mode are always evaluated in the same fixed sequence, so
//! detection order is stable and downstream tie-breaking ("first detected
//! wins") is deterministic.
//!
//! The rules are deliberately shallow text heuristics (keyword and pattern
//! matching, simple counting), not an AST analysis.

use regex::Regex;

use review_coach_core::{AnalysisMode, ExecutionOutcome};

use crate::models::Issue;

/// Lines longer than this trigger the long-line style rule
const MAX_LINE_LEN: usize = 100;

/// Bodies with at least this many lines must contain a comment marker
const MIN_COMMENTED_BODY_LINES: usize = 25;

/// Single-letter names that are conventional loop counters
const SHORT_NAME_ALLOWLIST: [char; 3] = ['i', 'j', 'k'];

/// Failure-text signatures that classify a crash as a memory access violation
const SEGFAULT_SIGNS: [&str; 4] = ["segmentation fault", "segfault", "sigsegv", "段错误"];

/// Failure-text signatures that classify a failed run as a timeout
const TIMEOUT_SIGNS: [&str; 3] = ["timed out", "timeout", "超时"];

/// Input to a single detection rule
pub struct RuleContext<'a> {
    /// The submitted source text
    pub code: &'a str,
    /// Execution result from the code-execution service, when available
    pub run_result: Option<&'a ExecutionOutcome>,
}

type RuleFn = fn(&RuleContext) -> Option<Issue>;

const SYNTAX_RULES: &[RuleFn] = &[
    check_compile_error,
    check_missing_main,
    check_stdio_header,
    check_unbalanced_braces,
    check_unbalanced_parens,
];

const STYLE_RULES: &[RuleFn] = &[
    check_long_line,
    check_tab_indent,
    check_short_identifier,
    check_missing_comments,
];

const LOGIC_RULES: &[RuleFn] = &[
    classify_run_failure,
    check_dead_loop,
    check_memory_leak,
    check_null_deref,
    check_off_by_one,
];

/// Run the ordered rule list for `mode` against the submission.
///
/// Pure and deterministic; blank input yields no issues.
pub fn detect(
    code: &str,
    mode: AnalysisMode,
    run_result: Option<&ExecutionOutcome>,
) -> Vec<Issue> {
    if code.trim().is_empty() {
        return Vec::new();
    }

    let ctx = RuleContext { code, run_result };
    let rules = match mode {
        AnalysisMode::Syntax => SYNTAX_RULES,
        AnalysisMode::Style => STYLE_RULES,
        AnalysisMode::Logic => LOGIC_RULES,
    };

    rules.iter().filter_map(|rule| rule(&ctx)).collect()
}

// ── Syntax rules ───────────────────────────────────────────────────────

fn check_compile_error(ctx: &RuleContext) -> Option<Issue> {
    let run = ctx.run_result.filter(|r| !r.success)?;
    let summary = run.failure_text().unwrap_or("no compiler output captured");
    Some(
        Issue::new("syntax_compile_error", 8, "Compilation basics")
            .with_tags(&["c-basics", "compiler"])
            .with_reason(format!("The submission failed to compile or run: {}", summary))
            .with_suggestion("Read the first compiler message, fix that line, then recompile.")
            .with_question("What is the compiler telling you about the first reported line?"),
    )
}

fn check_missing_main(ctx: &RuleContext) -> Option<Issue> {
    let main_fn = Regex::new(r"\bmain\s*\(").unwrap();
    if main_fn.is_match(ctx.code) {
        return None;
    }
    Some(
        Issue::new("syntax_missing_main", 7, "Program entry point")
            .with_tags(&["c-basics", "program-structure"])
            .with_reason("No main function was found, so the program has no entry point.")
            .with_suggestion("Define `int main(void)` and return an int status code.")
            .with_question("Where does execution start when a C program is launched?"),
    )
}

fn check_stdio_header(ctx: &RuleContext) -> Option<Issue> {
    let stdio_call = Regex::new(r"\b(?:printf|scanf|puts|gets|getchar|putchar)\s*\(").unwrap();
    if !stdio_call.is_match(ctx.code) || ctx.code.contains("stdio.h") {
        return None;
    }
    Some(
        Issue::new("syntax_stdio_header", 6, "Standard I/O headers")
            .with_tags(&["c-basics", "preprocessor"])
            .with_reason("Standard I/O functions are used but <stdio.h> is never included.")
            .with_suggestion("Add `#include <stdio.h>` before calling printf or scanf.")
            .with_question("Which header declares printf, and what happens without it?"),
    )
}

fn check_unbalanced_braces(ctx: &RuleContext) -> Option<Issue> {
    let open = ctx.code.matches('{').count();
    let close = ctx.code.matches('}').count();
    if open == close {
        return None;
    }
    Some(
        Issue::new("syntax_unbalanced_braces", 7, "Block structure")
            .with_tags(&["c-basics", "syntax"])
            .with_reason(format!(
                "Brace counts do not match: {} opening vs {} closing.",
                open, close
            ))
            .with_suggestion("Match every `{` with a `}`; consistent indentation makes this visible.")
            .with_question("Which block is missing its closing brace?"),
    )
}

fn check_unbalanced_parens(ctx: &RuleContext) -> Option<Issue> {
    let open = ctx.code.matches('(').count();
    let close = ctx.code.matches(')').count();
    if open == close {
        return None;
    }
    Some(
        Issue::new("syntax_unbalanced_parens", 6, "Expression grouping")
            .with_tags(&["c-basics", "syntax"])
            .with_reason(format!(
                "Parenthesis counts do not match: {} opening vs {} closing.",
                open, close
            ))
            .with_suggestion("Check call sites and conditions for a missing `(` or `)`.")
            .with_question("Which expression is missing a parenthesis?"),
    )
}

// ── Style rules ────────────────────────────────────────────────────────
// Each check emits at most one issue regardless of how many lines trigger it.

fn check_long_line(ctx: &RuleContext) -> Option<Issue> {
    let over = ctx
        .code
        .lines()
        .filter(|line| line.chars().count() > MAX_LINE_LEN)
        .count();
    if over == 0 {
        return None;
    }
    Some(
        Issue::new("style_long_line", 4, "Line length")
            .with_tags(&["style", "readability"])
            .with_reason(format!(
                "{} line(s) exceed {} characters.",
                over, MAX_LINE_LEN
            ))
            .with_suggestion("Break long expressions across lines or extract helper variables.")
            .with_question("How would you split the longest line without changing behavior?"),
    )
}

fn check_tab_indent(ctx: &RuleContext) -> Option<Issue> {
    let has_tab = ctx.code.lines().any(|line| line.starts_with('\t'));
    let has_space = ctx.code.lines().any(|line| line.starts_with(' '));
    if !(has_tab && has_space) {
        return None;
    }
    Some(
        Issue::new("style_tab_indent", 4, "Consistent indentation")
            .with_tags(&["style", "readability"])
            .with_reason("Tab-indented lines are mixed with space-indented lines.")
            .with_suggestion("Pick one indentation style and configure the editor to enforce it.")
            .with_question("What does this file look like with a different tab width?"),
    )
}

fn check_short_identifier(ctx: &RuleContext) -> Option<Issue> {
    let decl = Regex::new(
        r"\b(?:int|long|short|float|double|char|unsigned|signed|bool|size_t)[\s*]+([a-zA-Z])\b",
    )
    .unwrap();
    let offending: Vec<char> = decl
        .captures_iter(ctx.code)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().chars().next().unwrap_or_default())
        .filter(|c| !SHORT_NAME_ALLOWLIST.contains(c))
        .collect();
    if offending.is_empty() {
        return None;
    }
    Some(
        Issue::new("style_short_identifier", 5, "Descriptive naming")
            .with_tags(&["style", "naming"])
            .with_reason("Single-letter variable names are used outside conventional loop counters.")
            .with_suggestion("Name variables after what they hold, e.g. `total` instead of `t`.")
            .with_question("Could a reader guess what each variable stores from its name alone?"),
    )
}

fn check_missing_comments(ctx: &RuleContext) -> Option<Issue> {
    if ctx.code.lines().count() < MIN_COMMENTED_BODY_LINES
        || ctx.code.contains("//")
        || ctx.code.contains("/*")
    {
        return None;
    }
    Some(
        Issue::new("style_missing_comments", 4, "Code commenting")
            .with_tags(&["style", "documentation"])
            .with_reason(format!(
                "A body of {}+ lines contains no comments.",
                MIN_COMMENTED_BODY_LINES
            ))
            .with_suggestion("Add a short comment above each logical section of the code.")
            .with_question("Which part of this code would be hardest to re-read in a month?"),
    )
}

// ── Logic rules ────────────────────────────────────────────────────────

/// Classify a failed run by its failure text. Exactly one issue is emitted
/// for a failed run; the segfault signature is checked before the timeout
/// keywords so a crash report is never misfiled as a generic failure.
fn classify_run_failure(ctx: &RuleContext) -> Option<Issue> {
    let run = ctx.run_result.filter(|r| !r.success)?;
    let haystack = format!(
        "{} {} {}",
        run.error.as_deref().unwrap_or_default(),
        run.error_summary.as_deref().unwrap_or_default(),
        run.error_type.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    if SEGFAULT_SIGNS.iter().any(|sign| haystack.contains(sign)) {
        return Some(
            Issue::new("logic_pointer_safety", 9, "Pointer and memory safety")
                .with_tags(&["pointers", "memory"])
                .with_reason(format!(
                    "The run crashed with a memory access violation: {}",
                    run.failure_text().unwrap_or("no details")
                ))
                .with_suggestion("Check every pointer for NULL and every index against its bound before use.")
                .with_question("Which pointer or index could reach invalid memory here?"),
        );
    }

    if TIMEOUT_SIGNS.iter().any(|sign| haystack.contains(sign)) {
        return Some(
            Issue::new("logic_timeout", 8, "Loop termination")
                .with_tags(&["loops", "control-flow"])
                .with_reason(format!(
                    "The run timed out; a loop may not terminate: {}",
                    run.failure_text().unwrap_or("no details")
                ))
                .with_suggestion("Make sure every loop changes its condition variables toward exit.")
                .with_question("What guarantees that each loop in this program finishes?"),
        );
    }

    Some(
        Issue::new("logic_runtime_error", 7, "Runtime stability")
            .with_tags(&["runtime", "debugging"])
            .with_reason(format!(
                "The run failed at runtime: {}",
                run.failure_text().unwrap_or("no details")
            ))
            .with_suggestion("Reproduce with the failing input and narrow down the first bad state.")
            .with_question("What input state does this code assume but never check?"),
    )
}

fn check_dead_loop(ctx: &RuleContext) -> Option<Issue> {
    let always_true = Regex::new(r"while\s*\(\s*(?:1|true)\s*\)|for\s*\(\s*;\s*;").unwrap();
    let has_escape = ctx.code.contains("break")
        || ctx.code.contains("goto")
        || ctx.code.contains("exit(");
    if !always_true.is_match(ctx.code) || has_escape {
        return None;
    }
    Some(
        Issue::new("logic_dead_loop", 8, "Loop termination")
            .with_tags(&["loops", "control-flow"])
            .with_reason("An always-true loop has no break, goto or exit call.")
            .with_suggestion("Add a reachable exit condition or a break inside the loop body.")
            .with_question("Under what condition should this loop stop?"),
    )
}

fn check_memory_leak(ctx: &RuleContext) -> Option<Issue> {
    let allocates = Regex::new(r"\b(?:malloc|calloc|realloc)\s*\(")
        .unwrap()
        .is_match(ctx.code);
    if !allocates || ctx.code.contains("free(") {
        return None;
    }
    Some(
        Issue::new("logic_memory_leak", 7, "Dynamic memory management")
            .with_tags(&["memory", "pointers"])
            .with_reason("Heap memory is allocated but never freed.")
            .with_suggestion("Pair every malloc/calloc/realloc with a free on every exit path.")
            .with_question("Who owns each allocation, and where is it released?"),
    )
}

fn check_null_deref(ctx: &RuleContext) -> Option<Issue> {
    let deref = ctx.code.contains("->")
        || Regex::new(r"\*[A-Za-z_]\w*\s*=[^=]").unwrap().is_match(ctx.code)
        || Regex::new(r"=\s*\*[A-Za-z_]\w*").unwrap().is_match(ctx.code);
    let guarded = ctx.code.contains("NULL")
        || ctx.code.contains("nullptr")
        || Regex::new(r"if\s*\(\s*!?\s*[A-Za-z_]\w*\s*\)").unwrap().is_match(ctx.code);
    if !deref || guarded {
        return None;
    }
    Some(
        Issue::new("logic_null_deref", 8, "Pointer and memory safety")
            .with_tags(&["pointers", "memory"])
            .with_reason("A pointer is dereferenced without any nearby null check.")
            .with_suggestion("Guard dereferences with `if (p != NULL)` or establish non-null earlier.")
            .with_question("Can this pointer ever be NULL when it is dereferenced?"),
    )
}

fn check_off_by_one(ctx: &RuleContext) -> Option<Issue> {
    let inclusive_bound = Regex::new(r"for\s*\([^)]*<=[^)]*\)").unwrap();
    if !inclusive_bound.is_match(ctx.code) || !ctx.code.contains('[') {
        return None;
    }
    Some(
        Issue::new("logic_off_by_one", 6, "Array bounds")
            .with_tags(&["arrays", "loops"])
            .with_reason("A for loop uses an inclusive `<=` bound together with indexed array access.")
            .with_suggestion("For an array of length n, iterate with `< n`, not `<= n`.")
            .with_question("What index does the final iteration access, and is it valid?"),
    )
}
