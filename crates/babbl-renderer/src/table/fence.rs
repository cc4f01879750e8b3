//! Fenced code tracking for the line-based table scan.
//!
//! Pipes inside fenced code are content, so the table preprocessor must know
//! when it is between an opening and a closing fence.

/// An open code fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

/// Tracks fenced code state across lines.
///
/// A closing fence uses the same marker character as the opening one, is at
/// least as long, and carries nothing but trailing whitespace.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    /// Whether the last line fed to [`update`](Self::update) left a fence open.
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Drop an open fence, as when its container ends.
    pub(crate) fn reset(&mut self) {
        self.open = None;
    }

    /// Feed one line. Returns `true` if the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(trimmed) = strip_indent(line) else {
            return false;
        };

        match self.open {
            Some(open) => {
                let closes = fence_run(trimmed).is_some_and(|run| {
                    run.marker == open.marker
                        && run.len >= open.len
                        && trimmed[run.len..].trim().is_empty()
                });
                if closes {
                    self.open = None;
                }
                closes
            }
            None => {
                let Some(run) = fence_run(trimmed) else {
                    return false;
                };
                // Backtick fences cannot carry backticks in their info string.
                if run.marker == '`' && trimmed[run.len..].contains('`') {
                    return false;
                }
                self.open = Some(run);
                true
            }
        }
    }
}

/// Strip up to three columns of indentation; four or more is indented code.
fn strip_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() >= 4 || trimmed.starts_with('\t') {
        None
    } else {
        Some(trimmed)
    }
}

/// Leading run of three or more backticks or tildes.
fn fence_run(trimmed: &str) -> Option<Fence> {
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some(Fence { marker, len })
}
