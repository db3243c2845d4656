//! `PLAN.md`: the task checklist and freeform notes.
//!
//! Only the `## Tasks` section is structured. Each task is one checkbox line:
//!
//! ```text
//! - [ ] pending        - [>] in progress
//! - [x] completed      - [!] blocked
//! ```
//!
//! Lines in `## Tasks` that carry no recognized checkbox are dropped. Every
//! other non-blank line in the document becomes part of the notes. Writing a
//! plan back replaces only the `## Tasks` section of the file.

use std::fmt::{self, Write as _};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::section::{self, HEADER_MARKER};
use crate::stack::{self, StackDir};

pub const TASKS_SECTION: &str = "Tasks";

/// Lifecycle status of a plan task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    /// All statuses in checkbox matching order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// Checkbox prefix including the trailing space, e.g. `- [x] `.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Pending => "- [ ] ",
            Self::InProgress => "- [>] ",
            Self::Completed => "- [x] ",
            Self::Blocked => "- [!] ",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task status '{got}': use pending, in_progress, completed, or blocked")]
pub struct ParseStatusError {
    pub got: String,
}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseStatusError { got: s.to_string() }),
        }
    }
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    pub status: TaskStatus,
}

impl Task {
    #[must_use]
    pub fn new(description: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            description: description.into(),
            status,
        }
    }

    /// The checkbox line for this task, without newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{}{}", self.status.marker(), self.description)
    }
}

/// Recognize a checkbox line.
///
/// The line is trimmed and matched against the four status prefixes; the
/// description is whatever follows the prefix, unmodified. Anything else is
/// `None`.
#[must_use]
pub fn parse_task_line(line: &str) -> Option<Task> {
    let trimmed = line.trim();
    let task = TaskStatus::ALL.iter().find_map(|&status| {
        trimmed
            .strip_prefix(status.marker())
            .map(|description| Task::new(description, status))
    });
    if task.is_none() {
        trace!(line = trimmed, "dropping unrecognized line in Tasks");
    }
    task
}

/// How non-task content is folded into notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Keep the `## Header` lines of non-task sections in the notes. Off by
    /// default: notes hold only the content lines.
    pub notes_headers: bool,
}

/// Parsed contents of `PLAN.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanState {
    pub tasks: Vec<Task>,
    pub notes: String,
}

impl PlanState {
    /// Parse with the default options (section headers left out of notes).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, PlanOptions::default())
    }

    #[must_use]
    pub fn parse_with(text: &str, options: PlanOptions) -> Self {
        let sections = section::split(text);
        let mut tasks = Vec::new();
        let mut notes: Vec<&str> = sections.preamble.clone();

        for section in &sections.sections {
            if section.name == TASKS_SECTION {
                tasks.extend(section.lines.iter().filter_map(|line| parse_task_line(line)));
                continue;
            }
            if options.notes_headers {
                notes.push(section.header);
            }
            notes.extend(section.lines.iter().copied());
        }

        Self {
            tasks,
            notes: notes.join("\n"),
        }
    }

    /// Render back to the `PLAN.md` convention.
    ///
    /// Notes lines that precede their first `## ` header go above `## Tasks`;
    /// the rest follow it. Parsing the output yields the same tasks and notes
    /// under either [`PlanOptions`] setting.
    #[must_use]
    pub fn render(&self) -> String {
        let (preamble, rest) = split_notes(&self.notes);
        let mut out = String::new();

        for line in &preamble {
            let _ = writeln!(out, "{line}");
        }
        if !preamble.is_empty() {
            out.push('\n');
        }

        let _ = writeln!(out, "{HEADER_MARKER}{TASKS_SECTION}");
        for task in &self.tasks {
            let _ = writeln!(out, "{}", task.to_line());
        }

        if !rest.is_empty() {
            out.push('\n');
            for line in &rest {
                let _ = writeln!(out, "{line}");
            }
        }
        out
    }

    /// Rewrite the `## Tasks` section of `existing` with this plan's tasks.
    ///
    /// Everything outside that section, headers included, is kept as it is,
    /// so `notes` is not consulted. An empty `existing` falls back to
    /// [`PlanState::render`].
    #[must_use]
    pub fn render_into(&self, existing: &str) -> String {
        if existing.trim().is_empty() {
            return self.render();
        }
        let tasks: Vec<String> = self.tasks.iter().map(Task::to_line).collect();
        section::rewrite(existing, &[(TASKS_SECTION, tasks.join("\n").as_str())])
    }

    /// Append a pending task and return it.
    pub fn add_task(&mut self, description: impl Into<String>) -> &Task {
        self.tasks.push(Task::new(description, TaskStatus::Pending));
        let last = self.tasks.len() - 1;
        &self.tasks[last]
    }

    /// Change the status of the task at `index` (0-based).
    ///
    /// Returns `None` when there is no such task.
    pub fn set_status(&mut self, index: usize, status: TaskStatus) -> Option<&Task> {
        let task = self.tasks.get_mut(index)?;
        task.status = status;
        Some(task)
    }

    /// First task currently in progress.
    #[must_use]
    pub fn active(&self) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|t| t.status == TaskStatus::InProgress)
    }

    /// Number of tasks with the given status.
    #[must_use]
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

/// Split notes at the first line that opens a section.
fn split_notes(notes: &str) -> (Vec<&str>, Vec<&str>) {
    let lines: Vec<&str> = notes.lines().filter(|l| !l.trim().is_empty()).collect();
    let at = lines
        .iter()
        .position(|l| l.starts_with(HEADER_MARKER))
        .unwrap_or(lines.len());
    let (head, tail) = lines.split_at(at);
    (head.to_vec(), tail.to_vec())
}

/// Read `PLAN.md` from `workspace` with the default [`PlanOptions`].
///
/// # Errors
///
/// Returns [`crate::StackError::Io`] if the file exists but cannot be read.
pub fn read_plan(workspace: &Path) -> Result<PlanState> {
    read_plan_with(workspace, PlanOptions::default())
}

/// Read `PLAN.md` from `workspace`. A missing file yields an empty plan.
///
/// # Errors
///
/// Returns [`crate::StackError::Io`] if the file exists but cannot be read.
pub fn read_plan_with(workspace: &Path, options: PlanOptions) -> Result<PlanState> {
    let path = StackDir::new(workspace).plan_path();
    Ok(stack::load(&path)?
        .map(|loaded| PlanState::parse_with(&loaded.text, options))
        .unwrap_or_default())
}

/// Write `plan` to `PLAN.md` in `workspace`.
///
/// An existing file keeps everything outside `## Tasks`; a missing or empty
/// one gets the full rendered plan, notes included.
///
/// # Errors
///
/// Returns [`crate::StackError::Io`] if the existing file cannot be read, the
/// directory cannot be created, or the file cannot be written.
pub fn write_plan(workspace: &Path, plan: &PlanState) -> Result<()> {
    let dir = StackDir::new(workspace);
    let path = dir.plan_path();
    let existing = stack::load(&path)?.map(|loaded| loaded.text).unwrap_or_default();
    stack::overwrite(&dir, &path, &plan.render_into(&existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADERS: PlanOptions = PlanOptions {
        notes_headers: true,
    };

    const ALL_STATUSES: &str = "## Tasks\n- [ ] A\n- [>] B\n- [x] C\n- [!] D\n\n## Notes\nhello\n";

    #[test]
    fn parses_all_four_statuses() {
        let plan = PlanState::parse(ALL_STATUSES);
        assert_eq!(
            plan.tasks,
            vec![
                Task::new("A", TaskStatus::Pending),
                Task::new("B", TaskStatus::InProgress),
                Task::new("C", TaskStatus::Completed),
                Task::new("D", TaskStatus::Blocked),
            ]
        );
        assert_eq!(plan.notes, "hello");
    }

    #[test]
    fn notes_keep_headers_when_enabled() {
        let plan = PlanState::parse_with(ALL_STATUSES, HEADERS);
        assert_eq!(plan.tasks.len(), 4);
        assert_eq!(plan.notes, "## Notes\nhello");
    }

    #[test]
    fn tasks_only() {
        let plan = PlanState::parse("## Tasks\n- [ ] Task 1\n- [ ] Task 2\n");
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.notes, "");
    }

    #[test]
    fn unrecognized_task_lines_are_dropped_not_noted() {
        let plan = PlanState::parse("## Tasks\n- [ ] keep\n- [?] odd\n_No tasks_\n- [X] caps\n");
        assert_eq!(plan.tasks, vec![Task::new("keep", TaskStatus::Pending)]);
        assert_eq!(plan.notes, "");
    }

    #[test]
    fn preamble_and_other_sections_become_notes_in_order() {
        let doc = "# Plan\n> Updated: today\n## Legend\nkey\n## Tasks\n- [x] done\n## Backlog\n### Bugs\nnone\n";
        let plan = PlanState::parse_with(doc, HEADERS);
        assert_eq!(
            plan.notes,
            "# Plan\n> Updated: today\n## Legend\nkey\n## Backlog\n### Bugs\nnone"
        );
        assert_eq!(
            PlanState::parse(doc).notes,
            "# Plan\n> Updated: today\nkey\n### Bugs\nnone"
        );
        assert_eq!(plan.tasks, vec![Task::new("done", TaskStatus::Completed)]);
    }

    #[test]
    fn task_description_keeps_inner_whitespace() {
        let task = parse_task_line("   - [>]   spaced  out   ").expect("task");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.description, "  spaced  out");
    }

    #[test]
    fn parse_task_line_rejects_near_misses() {
        for line in ["- []  x", "-[ ] x", "* [ ] x", "- [ ]x", "[x] x", ""] {
            assert!(parse_task_line(line).is_none(), "accepted {line:?}");
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert_eq!("In-Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        let err = "done".parse::<TaskStatus>().expect_err("should fail");
        assert_eq!(err.got, "done");
    }

    #[test]
    fn render_round_trips_under_both_policies() {
        let doc = "# Plan\nintro\n## Tasks\n- [ ] A\n- [!] B\n## Notes\nhello\n## Backlog\nlater\n";
        for notes_headers in [true, false] {
            let options = PlanOptions { notes_headers };
            let plan = PlanState::parse_with(doc, options);
            let again = PlanState::parse_with(&plan.render(), options);
            assert_eq!(again, plan, "notes_headers={notes_headers}");
        }
    }

    #[test]
    fn render_layout() {
        let plan = PlanState {
            tasks: vec![
                Task::new("A", TaskStatus::Pending),
                Task::new("B", TaskStatus::Completed),
            ],
            notes: "# Plan\n## Notes\nhello".into(),
        };
        assert_eq!(
            plan.render(),
            "# Plan\n\n## Tasks\n- [ ] A\n- [x] B\n\n## Notes\nhello\n"
        );
    }

    #[test]
    fn mutation_helpers() {
        let mut plan = PlanState::default();
        assert_eq!(plan.add_task("first").status, TaskStatus::Pending);
        plan.add_task("second");
        assert!(plan.active().is_none());

        let task = plan.set_status(1, TaskStatus::InProgress).expect("index 1");
        assert_eq!(task.description, "second");
        assert_eq!(plan.active().map(|t| t.description.as_str()), Some("second"));
        assert!(plan.set_status(7, TaskStatus::Blocked).is_none());
        assert_eq!(plan.count(TaskStatus::Pending), 1);
    }

    #[test]
    fn read_missing_plan_is_empty() {
        let tmp = TempDir::new().expect("tempdir");
        let plan = read_plan(tmp.path()).expect("read");
        assert!(plan.tasks.is_empty());
        assert_eq!(plan.notes, "");
    }

    #[test]
    fn write_then_read_plan() {
        let tmp = TempDir::new().expect("tempdir");
        let mut plan = PlanState::default();
        plan.add_task("write parser");
        plan.notes = "## Notes\nremember edge cases".into();

        write_plan(tmp.path(), &plan).expect("write");
        let on_disk = fs::read_to_string(tmp.path().join(".cstack/PLAN.md")).expect("read file");
        assert!(on_disk.contains("- [ ] write parser"));

        assert_eq!(read_plan_with(tmp.path(), HEADERS).expect("read"), plan);
    }

    #[test]
    fn write_replaces_only_the_tasks_section() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join(".cstack/PLAN.md");
        fs::create_dir_all(tmp.path().join(".cstack")).expect("mkdir");
        fs::write(
            &path,
            "# Plan\n## Tasks\n- [ ] A\n## Notes\nhello\n## Backlog\nlater\n",
        )
        .expect("seed");

        for notes_headers in [false, true] {
            let mut plan = read_plan_with(tmp.path(), PlanOptions { notes_headers }).expect("read");
            plan.add_task(format!("B{notes_headers}"));
            write_plan(tmp.path(), &plan).expect("write");
        }

        let on_disk = fs::read_to_string(&path).expect("read file");
        assert_eq!(
            on_disk,
            "# Plan\n## Tasks\n- [ ] A\n- [ ] Bfalse\n- [ ] Btrue\n\n## Notes\nhello\n## Backlog\nlater\n"
        );
    }

    #[test]
    fn write_appends_tasks_section_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir_all(tmp.path().join(".cstack")).expect("mkdir");
        fs::write(tmp.path().join(".cstack/PLAN.md"), "# Plan\n## Notes\nhello\n").expect("seed");

        let mut plan = read_plan(tmp.path()).expect("read");
        plan.add_task("first");
        write_plan(tmp.path(), &plan).expect("write");

        let on_disk = fs::read_to_string(tmp.path().join(".cstack/PLAN.md")).expect("read file");
        assert_eq!(on_disk, "# Plan\n## Notes\nhello\n\n## Tasks\n- [ ] first\n");
    }

    #[test]
    fn read_directory_in_place_of_file_names_the_file() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir_all(tmp.path().join(".cstack/PLAN.md")).expect("mkdir");
        let err = read_plan(tmp.path()).expect_err("should fail");
        assert!(err.path().ends_with("PLAN.md"), "got: {err}");
    }
}
