use std::{cell::Cell, fmt::Display};

use crate::terminal::colors;
use colored::*;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;

thread_local! {
    pub static GLOBAL_KEY_WIDTH: Cell<usize> = const { Cell::new(0) }
}

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

/// Emits `msg` verbatim; the log formatter adds no glyph for this target.
pub fn print(msg: &str) {
    info!(target: "invscan::print", raw_msg = msg);
}

/// A centred section title, hidden from `-q` on.
pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let title = format!(" {} ", msg.to_uppercase());
    let rule = TOTAL_WIDTH.saturating_sub(title.chars().count());
    let left = "─".repeat(rule / 2).color(colors::SEPARATOR);
    let right = "─".repeat(rule - rule / 2).color(colors::SEPARATOR);

    print(&format!("{left}{}{right}", title.color(colors::HEADER).bold()));
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

/// Sets the key column width used by [`aligned_line`].
pub fn set_key_width(keys: &[&str]) {
    let width = keys.iter().map(|k| k.chars().count()).max().unwrap_or(0);
    GLOBAL_KEY_WIDTH.set(width);
}

/// `key ....: value`, with keys padded to the width from [`set_key_width`].
pub fn aligned_line(key: &str, value: impl Display) {
    let pad = GLOBAL_KEY_WIDTH.get().saturating_sub(key.chars().count()) + 1;
    let leader = format!("{}:", ".".repeat(pad)).color(colors::SEPARATOR);
    let value = value.to_string().color(colors::TEXT_DEFAULT);
    print(&format!("  {}{leader} {value}", key.color(colors::PRIMARY)));
}

/// One resolved host, numbered from 1 with the numbers right-aligned to `width`.
pub fn host_line(idx: usize, width: usize, host: &str) {
    print(&host_label(idx, width, host));
}

fn host_label(idx: usize, width: usize, host: &str) -> String {
    let number = format!("{:>width$}", idx + 1).color(colors::ACCENT);
    format!("  {number} {} {}", "│".color(colors::SEPARATOR), host.color(colors::PRIMARY))
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}

pub fn no_results(what: &str) {
    centerln(&format!("{}", format!("no {what}").red().bold()));
}
