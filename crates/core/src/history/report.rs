//! Text renderings of rosters and newcomer lists.

use super::stats::Newcomer;

/// Timestamp format of the newcomer CSV (UTC, sortable).
pub const CSV_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Render newcomers as `author;date` CSV with a header line.
pub fn newcomers_csv(newcomers: &[Newcomer]) -> String {
    let mut out = String::from("author;date\n");
    for n in newcomers {
        out.push_str(&n.author);
        out.push(';');
        out.push_str(&n.first_commit.format(CSV_DATE_FORMAT).to_string());
        out.push('\n');
    }
    out
}

/// Render consolidated groups as a roster: one person per line, aliases
/// joined by `;`. Aliases within a line and the lines themselves are sorted
/// so the output is stable across runs.
pub fn roster_lines(groups: &[Vec<String>]) -> Vec<String> {
    let mut lines: Vec<String> = groups
        .iter()
        .map(|group| {
            let mut aliases = group.clone();
            aliases.sort();
            aliases.join(";")
        })
        .collect();
    lines.sort();
    lines
}
