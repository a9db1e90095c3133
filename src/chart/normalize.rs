// src/chart/normalize.rs
//
// Raw table rows -> validated Entry records. Best effort per row, strict per
// query: field-level garbage degrades to zero values, rows that can't hold
// the dilution invariant are dropped, and an empty result set means the
// developer doesn't exist on the chart.

use std::time::Duration;

use url::Url;

use crate::calc;
use crate::chart::{extract, Entry};
use crate::core::html::Tokenizer;
use crate::core::net::Fetch;
use crate::error::{Error, Result};

/// Data rows have exactly this many cells; anything else is a header or
/// layout row that leaked out of the table walk.
pub const FIELD_COUNT: usize = 9;

/// Developer families that publish letter-coded dilutions.
const LETTER_CODED: [&str; 2] = ["HC-110", "Ilfotec"];

pub fn entries(developer: &str, rows: Vec<Vec<String>>, fetch: &dyn Fetch) -> Result<Vec<Entry>> {
    let mut out = Vec::with_capacity(rows.len());

    for mut row in rows {
        if row.len() != FIELD_COUNT {
            continue;
        }

        let dilution = match dilution(developer, &row[2]) {
            Some(d) => d,
            None => {
                log::warn!(
                    "dropping row for {:?} ({}): unusable dilution {:?}",
                    row.first().map(String::as_str).unwrap_or(""),
                    developer,
                    row[2],
                );
                continue;
            }
        };

        let notes = if row[8].is_empty() { Vec::new() } else { notes(fetch, &row[8]) };

        let temperature = temperature(&row[7]);
        let time_sheet = minutes(&row[6]);
        let time_120 = minutes(&row[5]);
        let time_135 = minutes(&row[4]);
        let iso = std::mem::take(&mut row[3]);
        let developer = std::mem::take(&mut row[1]);
        let name = std::mem::take(&mut row[0]);

        out.push(Entry {
            name,
            developer,
            dilution,
            iso,
            time_135,
            time_120,
            time_sheet,
            temperature,
            notes,
        });
    }

    if out.is_empty() {
        return Err(Error::NoSuchDeveloper(developer.to_string()));
    }
    Ok(out)
}

/// Canonicalize a published dilution to "part+part".
///
/// "stock" means undiluted. HC-110 and Ilfotec tables use single letters for
/// fixed ratios. Whatever is left must parse as a two-part ratio; rows that
/// don't are dropped by the caller so the invariant holds for every Entry
/// that leaves this module.
pub fn dilution(developer: &str, raw: &str) -> Option<String> {
    if raw == "stock" {
        return Some("1+0".to_string());
    }

    let mut raw = raw;
    if LETTER_CODED.iter().any(|p| developer.starts_with(p)) {
        raw = match raw {
            "A" => "1+15",
            "B" => "1+31",
            "C" => "1+19",
            "D" => "1+39",
            "E" => "1+47",
            "F" => "1+79",
            "G" => "1+119",
            "H" => "1+63",
            "J" => "1+150",
            other => other,
        };
    }

    calc::scale_parts(raw).map(calc::scale_string)
}

/// Decimal minutes -> Duration; anything unparseable or unrepresentable
/// means "not applicable".
fn minutes(raw: &str) -> Duration {
    match raw.trim().parse::<f64>() {
        Ok(m) if m > 0.0 => {
            Duration::try_from_secs_f64(m * 60.0).unwrap_or(Duration::ZERO)
        }
        _ => Duration::ZERO,
    }
}

/// Degrees with an optional trailing unit letter; 0 when unparseable.
fn temperature(raw: &str) -> f64 {
    if raw.len() < 2 {
        return 0.0;
    }
    let trimmed = raw.strip_suffix(['c', 'C']).unwrap_or(raw);
    trimmed.trim().parse::<f64>().unwrap_or(0.0)
}

/// Secondary fetch for a row's footnote page. Failures cost the row its
/// notes, nothing more.
fn notes(fetch: &dyn Fetch, href: &str) -> Vec<String> {
    let url = match Url::parse(href) {
        Ok(u) => u,
        Err(e) => {
            log::debug!("bad footnote url {href:?}: {e}");
            return Vec::new();
        }
    };
    match fetch.get(&url) {
        Ok(body) => extract::note_lines(Tokenizer::new(&body)),
        Err(e) => {
            log::debug!("footnote fetch failed: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoFetch;

    impl Fetch for NoFetch {
        fn get(&self, url: &Url) -> Result<String> {
            panic!("unexpected fetch of {url}");
        }
    }

    fn raw_row(cells: [&str; FIELD_COUNT]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn oversized_time_degrades_the_field_not_the_query() {
        let row = raw_row(["TMax 400", "Kodak", "1+4", "400", "1e300", "8.5", "", "20C", ""]);
        let out = entries("Kodak", vec![row], &NoFetch).unwrap();
        assert_eq!(out[0].time_135, Duration::ZERO);
        assert_eq!(out[0].time_120, Duration::from_secs(510));
    }

    #[test]
    fn stock_maps_to_undiluted() {
        assert_eq!(dilution("Rodinal", "stock").as_deref(), Some("1+0"));
    }

    #[test]
    fn letter_codes_for_coded_families_only() {
        assert_eq!(dilution("HC-110", "B").as_deref(), Some("1+31"));
        assert_eq!(dilution("Ilfotec HC", "A").as_deref(), Some("1+15"));
        assert_eq!(dilution("Ilfotec HC", "J").as_deref(), Some("1+150"));
        // Same letter for an uncoded developer is just a bad dilution.
        assert_eq!(dilution("Rodinal", "B"), None);
        // "I" is not in the published letter table.
        assert_eq!(dilution("HC-110", "I"), None);
    }

    #[test]
    fn ratio_separators_canonicalized() {
        assert_eq!(dilution("Rodinal", "1+25").as_deref(), Some("1+25"));
        assert_eq!(dilution("Rodinal", "1:50").as_deref(), Some("1+50"));
        assert_eq!(dilution("Rodinal", "gibberish"), None);
    }

    #[test]
    fn minutes_parse_and_degrade() {
        assert_eq!(minutes("8.5"), Duration::from_secs(510));
        assert_eq!(minutes(""), Duration::ZERO);
        assert_eq!(minutes("n/a"), Duration::ZERO);
        assert_eq!(minutes("-3"), Duration::ZERO);
        // Absurd but parseable values degrade instead of blowing up.
        assert_eq!(minutes("1e300"), Duration::ZERO);
        assert_eq!(minutes("inf"), Duration::ZERO);
    }

    #[test]
    fn temperature_strips_unit() {
        assert_eq!(temperature("20C"), 20.0);
        assert_eq!(temperature("24.5c"), 24.5);
        assert_eq!(temperature("20"), 20.0);
        assert_eq!(temperature(""), 0.0);
        assert_eq!(temperature("C"), 0.0);
        assert_eq!(temperature("warm"), 0.0);
    }
}
