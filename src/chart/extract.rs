// src/chart/extract.rs
//
// Token-stream interpretation for the three page shapes we read: the search
// form's dropdowns, the dilution/time result table, and footnote popups.
// One left-to-right pass each, no lookahead; the tokenizer lives in
// core::html.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::chart::Options;
use crate::core::html::Token;
use crate::core::url::resolve;

/// Trailing citation marker on footnote pages ("Note from ... [source]").
static CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)note.*\[.*\]$").unwrap());

/// Dropdown the stream is currently inside, if any.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Group {
    None,
    Film,
    Developer,
}

impl Group {
    fn from_tag(tag: &crate::core::html::Tag) -> Option<Group> {
        let classify = |v: &str| match v.to_ascii_lowercase().as_str() {
            "film" => Some(Group::Film),
            "developer" => Some(Group::Developer),
            _ => None,
        };
        tag.attr("name")
            .and_then(classify)
            .or_else(|| tag.attr("id").and_then(classify))
    }
}

/// Enumerate the film and developer dropdowns of the search form.
///
/// Only `option` values inside a recognized `select` count; the empty value
/// and the "searchbox" sentinel are form plumbing, not data. Duplicates are
/// the site's to make, not ours to clean up.
pub fn option_lists<I: Iterator<Item = Token>>(tokens: I) -> Options {
    let mut options = Options::default();
    let mut group = Group::None;

    for token in tokens {
        match token {
            Token::Start(tag) if tag.name == "option" && group != Group::None => {
                match tag.attr("value") {
                    Some(v) if !v.is_empty() && v != "searchbox" => {
                        let list = match group {
                            Group::Film => &mut options.stocks,
                            Group::Developer => &mut options.developers,
                            Group::None => unreachable!(),
                        };
                        list.push(v.to_string());
                    }
                    _ => {}
                }
            }
            Token::Start(tag) if tag.name == "select" => {
                // A select we don't recognize leaves the tracking alone.
                if let Some(g) = Group::from_tag(&tag) {
                    group = g;
                }
            }
            Token::End(name) if name == "select" => group = Group::None,
            _ => {}
        }
    }
    options
}

/// Nesting position inside the result table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TableState {
    Outside,
    InTable,
    InRow,
    InCell,
}

/// Collect raw cell rows from the dilution/time table.
///
/// Within a cell, a resolvable `href` wins over any text; otherwise the last
/// text run before the cell closes is kept. Hrefs are resolved against
/// `page` so the normalizer downstream gets absolute footnote URLs. A stream
/// that ends with an open row drops that row rather than emitting a stub.
pub fn table_rows<I: Iterator<Item = Token>>(tokens: I, page: &Url) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut state = TableState::Outside;
    let mut pending = String::new();
    let mut link_set = false;
    let mut width_hint = 0usize;

    for token in tokens {
        match token {
            Token::Start(tag) => match tag.name.as_str() {
                "table" => state = TableState::InTable,
                "tr" => {
                    rows.push(Vec::with_capacity(width_hint));
                    state = TableState::InRow;
                }
                "td" => {
                    if let Some(row) = rows.last_mut() {
                        row.push(String::new());
                        pending.clear();
                        link_set = false;
                        state = TableState::InCell;
                    }
                }
                "a" if state == TableState::InCell => {
                    if let Some(href) = tag.attr("href") {
                        match resolve(page, href) {
                            Ok(u) => {
                                if let Some(cell) =
                                    rows.last_mut().and_then(|r| r.last_mut())
                                {
                                    *cell = u.to_string();
                                    link_set = true;
                                }
                            }
                            Err(e) => log::debug!("skipping unresolvable link: {e}"),
                        }
                    }
                }
                _ => {}
            },
            Token::End(name) => match name.as_str() {
                "table" => state = TableState::Outside,
                "tr" => {
                    width_hint = rows.last().map(Vec::len).unwrap_or(0);
                    state = TableState::InTable;
                }
                "td" => {
                    if state == TableState::InCell {
                        if !link_set {
                            if let Some(cell) = rows.last_mut().and_then(|r| r.last_mut()) {
                                *cell = std::mem::take(&mut pending);
                            }
                        }
                        pending.clear();
                        link_set = false;
                        state = TableState::InRow;
                    }
                }
                _ => {}
            },
            Token::Text(text) => {
                if state == TableState::InCell {
                    pending = text;
                }
            }
        }
    }

    if matches!(state, TableState::InRow | TableState::InCell) {
        rows.pop();
    }
    rows
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NoteState {
    Outside,
    InTable,
    InRow,
}

/// Pull footnote lines out of a popup page.
///
/// Only the table carrying the annotation class counts; every row yields its
/// trimmed text, minus blanks and the trailing citation line. Absent table
/// means no notes, not an error.
pub fn note_lines<I: Iterator<Item = Token>>(tokens: I) -> Vec<String> {
    let mut lines = Vec::new();
    let mut state = NoteState::Outside;

    for token in tokens {
        match token {
            Token::Start(tag) => match tag.name.as_str() {
                "table" => {
                    state = match tag.attr("class") {
                        Some(c) if c.eq_ignore_ascii_case("notenote") => NoteState::InTable,
                        _ => NoteState::Outside,
                    };
                }
                "tr" if state == NoteState::InTable => state = NoteState::InRow,
                _ => {}
            },
            Token::End(name) => match name.as_str() {
                "table" => state = NoteState::Outside,
                "tr" if state == NoteState::InRow => state = NoteState::InTable,
                _ => {}
            },
            Token::Text(text) => {
                if state == NoteState::InRow {
                    let line = text.trim();
                    if !line.is_empty() && !CITATION.is_match(line) {
                        lines.push(line.to_string());
                    }
                }
            }
        }
    }
    lines
}
