use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use colmatch_cli::script::StepOutcome;
use colmatch_model::{
    Candidate, CandidateStatus, MatcherWeight, OperationRecord, ValueBin, ValueMatchesPayload,
};

pub fn print_candidates(candidates: &[Candidate]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Matcher"),
        header_cell("Score"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for candidate in candidates {
        table.add_row(vec![
            Cell::new(&candidate.source_column)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&candidate.target_column),
            matcher_cell(candidate),
            Cell::new(format!("{:.3}", candidate.score)),
            status_cell(candidate.status),
        ]);
    }
    let accepted = candidates
        .iter()
        .filter(|c| c.status == CandidateStatus::Accepted)
        .count();
    println!("Candidates: {} ({accepted} accepted)", candidates.len());
    println!("{table}");
}

pub fn print_matchers(weights: &[MatcherWeight]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Matcher"), header_cell("Weight")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for weight in weights {
        table.add_row(vec![
            Cell::new(&weight.name),
            Cell::new(format!("{:.4}", weight.weight)),
        ]);
    }
    println!("Matcher weights:");
    println!("{table}");
}

pub fn print_failures(failures: &[String]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("Matcher failures:");
    for failure in failures {
        eprintln!("- {failure}");
    }
}

pub fn print_outcomes(outcomes: &[StepOutcome]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Operation"),
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Applied"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for outcome in outcomes {
        let (source, target) = match &outcome.candidate {
            Some(c) => (Cell::new(&c.source_column), Cell::new(&c.target_column)),
            None => (dim_cell("-"), dim_cell("-")),
        };
        let applied = if outcome.applied {
            Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            dim_cell("-")
        };
        table.add_row(vec![
            Cell::new(outcome.step),
            Cell::new(&outcome.operation),
            source,
            target,
            applied,
        ]);
    }
    println!("Review steps:");
    println!("{table}");
}

pub fn print_history(records: &[OperationRecord]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Operation"),
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Matcher"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(record.operation).add_attribute(Attribute::Bold),
            Cell::new(&record.candidate.source_column),
            Cell::new(&record.candidate.target_column),
            matcher_cell(&record.candidate),
        ]);
    }
    println!("History: {} operation(s)", records.len());
    println!("{table}");
}

pub fn print_unique_values(column: &str, values: &[String]) {
    println!("Unique values of {column}: {}", values.len());
    for value in values {
        println!("  {value}");
    }
}

pub fn print_value_bins(bins: &[ValueBin]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Value"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for bin in bins {
        let count = if bin.count == 0 {
            dim_cell(bin.count)
        } else {
            Cell::new(bin.count)
        };
        table.add_row(vec![Cell::new(&bin.value), count]);
    }
    println!("{table}");
}

pub fn print_value_matches(matches: &ValueMatchesPayload) {
    let mut table = Table::new();
    let mut header = vec![header_cell(&matches.source_column)];
    header.extend(matches.targets.iter().map(|t| header_cell(&t.target_column)));
    table.set_header(header);
    apply_table_style(&mut table);
    for (row, source_value) in matches.source_values.iter().enumerate() {
        let mut cells = vec![Cell::new(source_value)];
        for target in &matches.targets {
            cells.push(match target.target_values.get(row) {
                Some(value) if !value.is_empty() => Cell::new(value),
                _ => dim_cell("-"),
            });
        }
        table.add_row(cells);
    }
    println!("Value matches:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: CandidateStatus) -> Cell {
    match status {
        CandidateStatus::Accepted => Cell::new("accepted")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        CandidateStatus::Rejected => Cell::new("rejected").fg(Color::Red),
        CandidateStatus::Discarded => Cell::new("discarded").fg(Color::DarkGrey),
        CandidateStatus::Idle => dim_cell("idle"),
    }
}

fn matcher_cell(candidate: &Candidate) -> Cell {
    if candidate.is_easy() {
        Cell::new(&candidate.matcher).fg(Color::Cyan)
    } else {
        Cell::new(&candidate.matcher)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
