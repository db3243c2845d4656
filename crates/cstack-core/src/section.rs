//! Line-oriented splitter for `## `-sectioned markdown.
//!
//! Both stack documents (`CURRENT.md` and `PLAN.md`) are read with the same
//! single pass:
//!
//! - A line beginning with `## ` closes the open section and opens a new one
//!   named by the rest of the line, taken exactly.
//! - Blank and whitespace-only lines are discarded.
//! - Any other line is buffered into the open section, or into the preamble
//!   when no header has been seen yet.
//!
//! What each section *means* is decided by the document modules.

/// Marker that opens a second-level section.
pub const HEADER_MARKER: &str = "## ";

/// Classification of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `## Name`; carries the name.
    Header(&'a str),
    /// Empty or whitespace-only.
    Blank,
    /// Anything else, untrimmed.
    Content(&'a str),
}

impl<'a> Line<'a> {
    #[must_use]
    pub fn classify(line: &'a str) -> Self {
        if let Some(name) = line.strip_prefix(HEADER_MARKER) {
            Self::Header(name)
        } else if line.trim().is_empty() {
            Self::Blank
        } else {
            Self::Content(line)
        }
    }
}

/// One `## ` section with its buffered content lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub name: &'a str,
    /// The header line exactly as it appeared in the input.
    pub header: &'a str,
    pub lines: Vec<&'a str>,
}

/// A document split into its preamble and sections, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Content lines before the first header.
    pub preamble: Vec<&'a str>,
    pub sections: Vec<Section<'a>>,
}

impl<'a> Sections<'a> {
    /// Sections whose name matches exactly, in order.
    pub fn named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Section<'a>> + 's {
        self.sections.iter().filter(move |s| s.name == name)
    }
}

/// Split `text` into sections.
#[must_use]
pub fn split(text: &str) -> Sections<'_> {
    let mut out = Sections::default();
    let mut open: Option<Section<'_>> = None;

    for raw in text.lines() {
        match Line::classify(raw) {
            Line::Header(name) => {
                if let Some(done) = open.take() {
                    out.sections.push(done);
                }
                open = Some(Section {
                    name,
                    header: raw,
                    lines: Vec::new(),
                });
            }
            Line::Blank => {}
            Line::Content(line) => match open.as_mut() {
                Some(section) => section.lines.push(line),
                None => out.preamble.push(line),
            },
        }
    }

    if let Some(done) = open {
        out.sections.push(done);
    }

    out
}

/// Replace the bodies of the named sections, keeping every other line of
/// `text` as it was.
///
/// The first section with a given name gets the new body and later sections
/// with that name are removed. Names missing from `text` are appended at the
/// end in the order given. A replaced section is followed by one blank line.
#[must_use]
pub fn rewrite(text: &str, bodies: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut written = vec![false; bodies.len()];
    let mut skipping = false;

    for raw in text.lines() {
        if let Line::Header(name) = Line::classify(raw) {
            skipping = false;
            if let Some(i) = bodies.iter().position(|(n, _)| *n == name) {
                skipping = true;
                if !written[i] {
                    written[i] = true;
                    push_section(&mut out, raw, bodies[i].1);
                }
                continue;
            }
        }
        if !skipping {
            out.push_str(raw);
            out.push('\n');
        }
    }

    for ((name, body), done) in bodies.iter().zip(written) {
        if done {
            continue;
        }
        if !out.is_empty() && !out.ends_with("\n\n") {
            out.push('\n');
        }
        push_section(&mut out, &format!("{HEADER_MARKER}{name}"), body);
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn push_section(out: &mut String, header: &str, body: &str) {
    out.push_str(header);
    out.push('\n');
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push('\n');
}
