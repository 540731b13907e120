//! Markdown formatting helpers.

/// Render a markdown table. Pipes inside cells are escaped.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!(
        "|{}|",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));

    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

/// "1 peg" / "3 pegs".
pub fn pegs(count: i64) -> String {
    if count == 1 {
        "1 peg".to_string()
    } else {
        format!("{} pegs", count)
    }
}
