//! `CURRENT.md`: what the agent is doing right now.
//!
//! Recognized sections:
//!
//! ```text
//! ## Current Task
//! Implement authentication service
//!
//! ## Focus
//! JWT middleware
//!
//! ## Next Steps
//! - Write unit tests
//! * Update documentation
//! ```
//!
//! Other sections are not mapped to a field but survive [`write_current`]. Repeated `Current Task`
//! or `Focus` sections overwrite each other; repeated `Next Steps` sections
//! accumulate.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{FileOp, Result, StackError};
use crate::section::{self, Section};
use crate::stack::{self, StackDir};

pub const TASK_SECTION: &str = "Current Task";
pub const FOCUS_SECTION: &str = "Focus";
pub const NEXT_STEPS_SECTION: &str = "Next Steps";

/// Parsed contents of `CURRENT.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentState {
    pub task: String,
    pub focus: String,
    pub next_steps: Vec<String>,
    /// Modification time of the backing file, or the read time when absent.
    pub last_modified: DateTime<Utc>,
}

impl CurrentState {
    /// An empty state stamped with `last_modified`.
    #[must_use]
    pub const fn empty(last_modified: DateTime<Utc>) -> Self {
        Self {
            task: String::new(),
            focus: String::new(),
            next_steps: Vec::new(),
            last_modified,
        }
    }

    /// Parse a `CURRENT.md` document.
    #[must_use]
    pub fn parse(text: &str, last_modified: DateTime<Utc>) -> Self {
        let mut state = Self::empty(last_modified);
        for section in section::split(text).sections {
            state.apply(&section);
        }
        state
    }

    fn apply(&mut self, section: &Section<'_>) {
        match section.name {
            TASK_SECTION => self.task = section.lines.join("\n"),
            FOCUS_SECTION => self.focus = section.lines.join("\n"),
            NEXT_STEPS_SECTION => self
                .next_steps
                .extend(section.lines.iter().filter_map(|line| parse_next_step(line))),
            other => trace!(section = other, "ignoring unrecognized CURRENT.md section"),
        }
    }

    /// Render back to the `CURRENT.md` convention.
    ///
    /// All three recognized sections are always emitted so the file keeps a
    /// stable shape even when fields are empty.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_into("")
    }

    /// Rewrite the recognized sections of `existing` with this state.
    ///
    /// The preamble and any other section are carried over unchanged.
    #[must_use]
    pub fn render_into(&self, existing: &str) -> String {
        let steps: Vec<String> = self.next_steps.iter().map(|s| format!("- {s}")).collect();
        let steps = steps.join("\n");
        section::rewrite(
            existing,
            &[
                (TASK_SECTION, self.task.as_str()),
                (FOCUS_SECTION, self.focus.as_str()),
                (NEXT_STEPS_SECTION, steps.as_str()),
            ],
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.task.is_empty() && self.focus.is_empty() && self.next_steps.is_empty()
    }
}

/// Extract a next-step entry from a bullet line.
///
/// The line is trimmed, then a leading `- ` or `* ` is stripped. Lines with
/// neither bullet yield `None` and are dropped.
#[must_use]
pub fn parse_next_step(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let step = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "));
    if step.is_none() {
        trace!(line = trimmed, "dropping non-bullet line in Next Steps");
    }
    step.map(str::to_string)
}

/// Read `CURRENT.md` from `workspace`.
///
/// A missing file yields an empty state stamped with the current time.
///
/// # Errors
///
/// Returns [`StackError::Io`] if the file exists but cannot be opened, stat'd
/// or read.
pub fn read_current(workspace: &Path) -> Result<CurrentState> {
    let path = StackDir::new(workspace).current_path();
    let Some(loaded) = stack::load(&path)? else {
        return Ok(CurrentState::empty(Utc::now()));
    };

    let modified = loaded
        .metadata
        .modified()
        .map_err(|e| StackError::io(FileOp::Stat, &path, e))?;

    Ok(CurrentState::parse(&loaded.text, DateTime::<Utc>::from(modified)))
}

/// Write `state` into `CURRENT.md` in `workspace`.
///
/// Only the `Current Task`, `Focus` and `Next Steps` sections are replaced;
/// other sections and the preamble stay as they are on disk. `last_modified`
/// is not persisted; the next read takes it from the file.
///
/// # Errors
///
/// Returns [`StackError::Io`] if the existing file cannot be read, the
/// directory cannot be created, or the file cannot be written.
pub fn write_current(workspace: &Path, state: &CurrentState) -> Result<()> {
    let dir = StackDir::new(workspace);
    let path = dir.current_path();
    let existing = stack::load(&path)?.map(|loaded| loaded.text).unwrap_or_default();
    stack::overwrite(&dir, &path, &state.render_into(&existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).single().expect("valid timestamp")
    }

    fn write_current_md(tmp: &TempDir, content: &str) {
        let dir = tmp.path().join(".cstack");
        fs::create_dir_all(&dir).expect("create .cstack");
        fs::write(dir.join("CURRENT.md"), content).expect("write CURRENT.md");
    }

    #[test]
    fn parses_complete_document() {
        let doc = "## Current Task\nImplement authentication service\n\n\
                   ## Focus\nBuilding JWT middleware and user session management\n\n\
                   ## Next Steps\n- Write unit tests\n- Add integration tests\n- Update documentation\n";
        let state = CurrentState::parse(doc, epoch());

        assert_eq!(state.task, "Implement authentication service");
        assert_eq!(
            state.focus,
            "Building JWT middleware and user session management"
        );
        assert_eq!(
            state.next_steps,
            vec!["Write unit tests", "Add integration tests", "Update documentation"]
        );
        assert_eq!(state.last_modified, epoch());
    }

    #[test]
    fn partial_document_leaves_missing_fields_empty() {
        let doc = "## Current Task\nFix bug in API handler\n\n## Next Steps\n- Debug issue\n- Deploy fix\n";
        let state = CurrentState::parse(doc, epoch());
        assert_eq!(state.task, "Fix bug in API handler");
        assert_eq!(state.focus, "");
        assert_eq!(state.next_steps, vec!["Debug issue", "Deploy fix"]);
    }

    #[test]
    fn multi_line_task_is_joined_without_blank_lines() {
        let doc = "## Current Task\nline one\n\n  line two\n## Focus\nf\n";
        let state = CurrentState::parse(doc, epoch());
        assert_eq!(state.task, "line one\n  line two");
    }

    #[test]
    fn next_steps_accept_both_bullets_and_skip_others() {
        let doc = "## Next Steps\n- dash\n  * star\n1. numbered\nplain\n-nospace\n- dup\n- dup\n";
        let state = CurrentState::parse(doc, epoch());
        assert_eq!(state.next_steps, vec!["dash", "star", "dup", "dup"]);
    }

    #[test]
    fn unknown_sections_and_preamble_are_dropped() {
        let doc = "# Current Context\nintro\n## Now\nsomething\n## Focus\nreal focus\n## Notes\nscratch\n";
        let state = CurrentState::parse(doc, epoch());
        assert_eq!(state.task, "");
        assert_eq!(state.focus, "real focus");
        assert!(state.next_steps.is_empty());
    }

    #[test]
    fn repeated_sections_follow_overwrite_and_accumulate_rules() {
        let doc = "## Focus\nfirst\n## Next Steps\n- a\n## Focus\nsecond\n## Next Steps\n- b\n";
        let state = CurrentState::parse(doc, epoch());
        assert_eq!(state.focus, "second");
        assert_eq!(state.next_steps, vec!["a", "b"]);
    }

    #[test]
    fn render_then_parse_reproduces_fields() {
        let state = CurrentState {
            task: "Ship v2".into(),
            focus: "migrations\n  and rollbacks".into(),
            next_steps: vec!["write plan".into(), "  indented step".into()],
            last_modified: epoch(),
        };
        let parsed = CurrentState::parse(&state.render(), epoch());
        assert_eq!(parsed, state);
    }

    #[test]
    fn render_of_empty_state_keeps_headers() {
        let rendered = CurrentState::empty(epoch()).render();
        assert_eq!(rendered, "## Current Task\n\n## Focus\n\n## Next Steps\n");
        assert!(CurrentState::parse(&rendered, epoch()).is_empty());
    }

    #[test]
    fn read_missing_file_returns_empty_state() {
        let tmp = TempDir::new().expect("tempdir");
        let before = Utc::now();
        let state = read_current(tmp.path()).expect("read");
        assert!(state.is_empty());
        assert!(state.last_modified >= before);
    }

    #[test]
    fn read_empty_file_returns_empty_state() {
        let tmp = TempDir::new().expect("tempdir");
        write_current_md(&tmp, "");
        let state = read_current(tmp.path()).expect("read");
        assert!(state.is_empty());
    }

    #[test]
    fn read_uses_file_modification_time() {
        let tmp = TempDir::new().expect("tempdir");
        write_current_md(&tmp, "## Current Task\nx\n");
        let path = tmp.path().join(".cstack/CURRENT.md");
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .expect("mtime");

        let state = read_current(tmp.path()).expect("read");
        assert_eq!(state.last_modified, DateTime::<Utc>::from(modified));
        assert_eq!(state.task, "x");
    }

    #[test]
    fn write_then_read_round_trips() {
        let tmp = TempDir::new().expect("tempdir");
        let mut state = CurrentState::empty(epoch());
        state.task = "Refactor parser".into();
        state.next_steps = vec!["split sections".into()];

        write_current(tmp.path(), &state).expect("write");
        let back = read_current(tmp.path()).expect("read");
        assert_eq!(back.task, state.task);
        assert_eq!(back.focus, "");
        assert_eq!(back.next_steps, state.next_steps);
    }

    #[test]
    fn write_keeps_preamble_and_other_sections() {
        let tmp = TempDir::new().expect("tempdir");
        write_current_md(
            &tmp,
            "# Current Context\n\n## Current Task\nold\n\n## Focus\n\n## Next Steps\n- a\n\n## Context\n- Project: cstack\n",
        );
        let mut state = read_current(tmp.path()).expect("read");
        state.task = "new".into();
        state.next_steps.push("b".into());
        write_current(tmp.path(), &state).expect("write");

        let on_disk = fs::read_to_string(tmp.path().join(".cstack/CURRENT.md")).expect("raw");
        assert_eq!(
            on_disk,
            "# Current Context\n\n## Current Task\nnew\n\n## Focus\n\n## Next Steps\n- a\n- b\n\n## Context\n- Project: cstack\n"
        );
    }

    #[test]
    fn read_directory_in_place_of_file_names_the_file() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir_all(tmp.path().join(".cstack/CURRENT.md")).expect("mkdir");
        let err = read_current(tmp.path()).expect_err("should fail");
        assert!(err.path().ends_with("CURRENT.md"), "got: {err}");
    }
}
