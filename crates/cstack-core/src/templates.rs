//! Seed content written by [`crate::init::init_stack`].
//!
//! Placeholders sit in italics or HTML comments so the parsers read them as
//! empty: no task, no focus, no next steps, no checklist entries.

pub const CURRENT: &str = "\
# Current Context

<!-- Rewritten on every checkpoint. Read this first after compaction. -->

## Current Task

## Focus

## Next Steps

## Context

- Project: _describe_
- Key files: _paths_
- Blockers: _none_
";

pub const PLAN: &str = "\
# Plan

## Legend
`- [ ]` pending | `- [>]` in progress | `- [x]` completed | `- [!]` blocked

## Tasks

<!-- One checkbox line per task. -->

## Notes

_No notes yet._

## Backlog

_Bugs, debt, and ideas. Promote to Tasks when ready._
";

pub const INBOX: &str = "# Inbox\n";

pub const OUTBOX: &str = "# Outbox\n";

pub const QUICKREF: &str = "\
# Quick Reference

## Commands

| Command | What it does |
|---------|--------------|
| cstack current | Show task, focus, next steps |
| cstack checkpoint --task T --step S | Rewrite CURRENT.md |
| cstack plan | Numbered task list |
| cstack plan add \"X\" | Add a pending task |
| cstack plan mark 1 in_progress | Change task #1's status |
| cstack send outbox --from me --type milestone \"done\" | Append a message |
| cstack read inbox | List messages |
| cstack clear inbox | Truncate a log |

## Task Format

`- [ ]` pending | `- [>]` in progress | `- [x]` completed | `- [!]` blocked

## Files

| File | Purpose |
|------|---------|
| CURRENT.md | Session state |
| PLAN.md | Task list + notes |
| INBOX.md | Messages to this agent |
| OUTBOX.md | Messages from this agent |

## On Compaction

1. Run `cstack checkpoint`
2. Read CURRENT.md
3. Continue from Next Steps
";
