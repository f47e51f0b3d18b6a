//! Console tables for the record collections.

use colored::*;
use invscan_common::inventory::{FailureRecord, SuccessRecord};
use unicode_width::UnicodeWidthStr;

use crate::terminal::{colors, print};

const COLUMN_GAP: usize = 2;

pub fn success_table(records: &[SuccessRecord]) {
    let rows: Vec<[&str; 3]> = records.iter().map(SuccessRecord::cells).collect();
    render(&SuccessRecord::HEADERS, &rows, &[colors::TEXT_DEFAULT, colors::VERSION, colors::PRIMARY]);
}

pub fn failure_table(records: &[FailureRecord]) {
    let rows: Vec<[&str; 3]> = records.iter().map(FailureRecord::cells).collect();
    render(&FailureRecord::HEADERS, &rows, &[colors::FAILURE, colors::PRIMARY, colors::TEXT_DEFAULT]);
}

fn render<const N: usize>(headers: &[&str; N], rows: &[[&str; N]], palette: &[Color; N]) {
    let rows: Vec<[String; N]> = rows.iter().map(|row| (*row).map(single_line)).collect();
    let widths = column_widths(headers, &rows);

    let header_line: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{}", pad(h, w).color(colors::HEADER).bold()))
        .collect();
    print::print(&header_line.join(&" ".repeat(COLUMN_GAP)));

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    print::print(&format!("{}", rule.join(&" ".repeat(COLUMN_GAP)).color(colors::SEPARATOR)));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .zip(palette)
            .map(|((cell, w), color)| format!("{}", pad(cell, w).color(*color)))
            .collect();
        print::print(cells.join(&" ".repeat(COLUMN_GAP)).trim_end());
    }
}

fn column_widths<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> [usize; N] {
    let mut widths = (*headers).map(|h| UnicodeWidthStr::width(h));
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }
    widths
}

/// Multi-line exception messages would break the grid.
fn single_line(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(cell));
    format!("{cell}{}", " ".repeat(fill))
}
