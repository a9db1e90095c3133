// src/cli.rs
//
// Subcommand surface over the library: chart lookups, volume math, aliases,
// the timer. Lookup names are matched through a "stripped" form (lowercase,
// no spaces/hyphens, trailing % dropped) because that is what the listings
// print and what fingers want to type.

use std::{collections::HashMap, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use directories::ProjectDirs;
use once_cell::unsync::OnceCell;

use crate::alias::{self, Alias};
use crate::calc::{self, Simple};
use crate::chart::{Entry, Options};
use crate::core::net::Http;
use crate::error::Error;
use crate::params::CHART_CACHE_SUBDIR;
use crate::store::Store;
use crate::timer;

#[derive(Parser)]
#[command(name = "devchart", version, about = "Massive Dev Chart lookups, dilution math and a darkroom timer")]
pub struct Cli {
    /// Cache directory (default: the user cache dir)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Config directory holding the alias file (default: the user config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Massive Dev Chart operations
    Mdc {
        #[command(subcommand)]
        command: Mdc,
    },
    /// Calculate developing volumes
    Calc {
        /// Developer name or one of your aliases (stored density = mixing by weight)
        developer: String,
        /// Dilution to mix, e.g. 1+31
        ratio: String,
        /// Total developing volume in ml
        volume: f64,
        /// Also print development times for this stock (supports *)
        stock: Option<String>,
        /// Only entries with this ISO
        iso: Option<String>,
    },
    /// Alias a developer, optionally storing its density
    Alias {
        alias: String,
        /// Use `mdc list developers` for a listing
        developer: String,
        /// Decimal or fraction, e.g. 0.7 or 300.5/1000
        density: Option<String>,
    },
    /// Run a developing timer
    Timer {
        /// Total development duration, e.g. 7m30s
        total: String,
        /// Initial agitation phase, e.g. 0:30
        initial: String,
        /// Normal agitation phases, e.g. 10s
        agitation: String,
        /// Interval between agitation phases, e.g. 30
        interval: String,
        /// Initial delay
        delay: Option<String>,
    },
}

#[derive(Subcommand)]
enum Mdc {
    /// List developers or film stocks
    List {
        #[command(subcommand)]
        what: ListWhat,
    },
    /// Development times for one developer
    Get {
        /// Use `mdc list developers` for a listing
        developer: String,
        /// Filter by stock name, * wildcards allowed
        stock: Option<String>,
        /// Filter by ISO
        iso: Option<String>,
    },
    /// Fetch every developer's table, effectively caching all data
    Getall,
}

#[derive(Subcommand)]
enum ListWhat {
    Developers,
    Stocks,
}

pub fn run() -> color_eyre::Result<()> {
    let cli = Cli::parse();
    let app = App::new(&cli)?;

    match cli.command {
        Command::Mdc { command } => match command {
            Mdc::List { what } => {
                let options = app.options()?;
                let list = match what {
                    ListWhat::Developers => &options.developers,
                    ListWhat::Stocks => &options.stocks,
                };
                for name in list {
                    println!("{}", strip(name));
                }
                Ok(())
            }
            Mdc::Get { developer, stock, iso } => {
                let developer = app.unstrip(&developer)?;
                let entries = app.filter_entries(
                    &developer,
                    stock.as_deref().unwrap_or(""),
                    iso.as_deref().unwrap_or(""),
                    "",
                )?;
                print_entries(&entries);
                Ok(())
            }
            Mdc::Getall => app.get_all(),
        },
        Command::Calc { developer, ratio, volume, stock, iso } => {
            app.calc(&developer, &ratio, volume, stock.as_deref(), iso.as_deref())
        }
        Command::Alias { alias, developer, density } => {
            app.add_alias(&alias, &developer, density.as_deref())
        }
        Command::Timer { total, initial, agitation, interval, delay } => {
            let parse = |raw: &str| {
                timer::parse_duration(raw).ok_or_else(|| eyre!("could not parse {raw:?}"))
            };
            let plan = timer::Plan {
                total: parse(&total)?,
                initial: parse(&initial)?,
                agitation: parse(&agitation)?,
                interval: parse(&interval)?,
                delay: delay.as_deref().map(parse).transpose()?.unwrap_or(Duration::ZERO),
            };
            plan.validate().map_err(|e| eyre!(e))?;
            timer::run(&plan).wrap_err("timer failed")
        }
    }
}

struct App {
    store: Store,
    http: Http,
    config_dir: PathBuf,
    options: OnceCell<Options>,
    // stripped name -> name as published, both dropdowns merged
    unstrip: OnceCell<HashMap<String, String>>,
}

impl App {
    fn new(cli: &Cli) -> color_eyre::Result<App> {
        let dirs = ProjectDirs::from("", "", "devchart");
        let cache_dir = match &cli.cache_dir {
            Some(d) => d.clone(),
            None => dirs
                .as_ref()
                .map(|d| d.cache_dir().to_path_buf())
                .ok_or_else(|| eyre!("no user cache directory; pass --cache-dir"))?,
        };
        let config_dir = match &cli.config_dir {
            Some(d) => d.clone(),
            None => dirs
                .as_ref()
                .map(|d| d.config_dir().to_path_buf())
                .ok_or_else(|| eyre!("no user config directory; pass --config-dir"))?,
        };

        Ok(App {
            store: Store::new(cache_dir.join(CHART_CACHE_SUBDIR)),
            http: Http::new().wrap_err("building http client")?,
            config_dir,
            options: OnceCell::new(),
            unstrip: OnceCell::new(),
        })
    }

    fn options(&self) -> color_eyre::Result<&Options> {
        self.options.get_or_try_init(|| {
            let (options, _) = self.store.options(&self.http)?;
            Ok(options)
        })
    }

    /// Stripped name back to the published one; unknown names pass through
    /// so exact published names keep working too.
    fn unstrip(&self, name: &str) -> color_eyre::Result<String> {
        let map = self.unstrip.get_or_try_init(|| -> color_eyre::Result<_> {
            let options = self.options()?;
            let mut map = HashMap::new();
            for name in options.developers.iter().chain(&options.stocks) {
                map.insert(strip(name), name.clone());
            }
            Ok(map)
        })?;
        Ok(map.get(name).cloned().unwrap_or_else(|| name.to_string()))
    }

    fn known_developer(&self, name: &str) -> color_eyre::Result<bool> {
        let options = self.options()?;
        let stripped = strip(name);
        Ok(options.developers.iter().any(|d| strip(d) == stripped))
    }

    /// Cached entries for `developer`, filtered by optional stock wildcard,
    /// ISO, and canonical ratio string. Empty filters match everything. The
    /// stock query is stripped here; callers pass it as typed or published.
    fn filter_entries(
        &self,
        developer: &str,
        stock: &str,
        iso: &str,
        ratio: &str,
    ) -> color_eyre::Result<Vec<Entry>> {
        let (entries, _) = self.store.entries(&self.http, developer)?;
        let stock_query = wc_parse(&strip(stock));

        Ok(entries
            .into_iter()
            .filter(|e| keep_entry(e, &stock_query, iso, ratio))
            .collect())
    }

    fn get_all(&self) -> color_eyre::Result<()> {
        let options = self.options()?.clone();
        for developer in &options.developers {
            match self.store.entries(&self.http, developer) {
                Ok((entries, _)) => {
                    println!("{}", strip(developer));
                    print_entries(&entries);
                    println!();
                }
                Err(Error::NoSuchDeveloper(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn calc(
        &self,
        developer: &str,
        ratio: &str,
        volume: f64,
        stock: Option<&str>,
        iso: Option<&str>,
    ) -> color_eyre::Result<()> {
        let aliases = alias::load(&self.config_dir)?;
        let found = aliases.iter().find(|a| a.alias == developer);

        let density = found.map(Alias::density).unwrap_or(0.0);
        let fraction = calc::scale_ratio(ratio)
            .ok_or_else(|| eyre!("invalid ratio {ratio:?}"))?;
        println!("{}", calc::mix(&Simple::new(density, fraction), volume));

        let Some(stock) = stock else { return Ok(()) };

        let mut chem = developer.to_string();
        if let Some(a) = found {
            if !a.developer.is_empty() {
                chem = a.developer.clone();
            }
        }
        let chem = self.unstrip(&chem)?;
        let canonical = calc::scale_parts(ratio)
            .map(calc::scale_string)
            .ok_or_else(|| eyre!("invalid ratio {ratio:?}"))?;

        let entries = self.filter_entries(&chem, stock, iso.unwrap_or(""), &canonical)?;
        print_entries(&entries);
        Ok(())
    }

    fn add_alias(
        &self,
        name: &str,
        developer: &str,
        density: Option<&str>,
    ) -> color_eyre::Result<()> {
        if !self.known_developer(developer)? {
            bail!("no such developer: {developer:?}");
        }
        let density = match density {
            Some(raw) => alias::parse_density(raw)?,
            None => [0.0, 0.0],
        };

        let mut aliases = alias::load(&self.config_dir)?;
        aliases.push(Alias {
            alias: name.to_string(),
            developer: developer.to_string(),
            density,
        });
        alias::save(&self.config_dir, &aliases)?;
        Ok(())
    }
}

/// Listing/typing form of a published name.
pub fn strip(name: &str) -> String {
    name.to_lowercase()
        .replace([' ', '-'], "")
        .trim_end_matches('%')
        .to_string()
}

/// Both name sides go through `strip` so published names with spaces or
/// hyphens stay matchable against what the listings print.
fn keep_entry(e: &Entry, stock_query: &[String], iso: &str, ratio: &str) -> bool {
    (iso.is_empty() || e.iso == iso)
        && (ratio.is_empty() || e.dilution == ratio)
        && wc_match(stock_query, &strip(&e.name))
}

fn wc_parse(query: &str) -> Vec<String> {
    query.to_lowercase().split('*').map(str::to_string).collect()
}

/// '*'-wildcard match; a query without wildcards must match exactly.
fn wc_match(query: &[String], target: &str) -> bool {
    let target = target.to_lowercase();
    if query.len() == 1 {
        return query[0].is_empty() || target == query[0];
    }
    let mut pos = 0;
    for (i, part) in query.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !target.starts_with(part.as_str()) {
                return false;
            }
            pos = part.len();
        } else if i == query.len() - 1 {
            return target[pos..].ends_with(part.as_str());
        } else {
            match target[pos..].find(part.as_str()) {
                Some(at) => pos += at + part.len(),
                None => return false,
            }
        }
    }
    true
}

fn fmt_duration(d: Duration) -> String {
    let mut s = d.as_secs();
    let mut out = String::new();
    if s >= 3600 {
        out.push_str(&format!("{}h", s / 3600));
        s %= 3600;
    }
    if s >= 60 {
        out.push_str(&format!("{}m", s / 60));
        s %= 60;
    }
    if s != 0 {
        out.push_str(&format!("{s}s"));
    }
    out
}

/// Listing order: developer, name, ISO (numeric first, in value order),
/// dilution, temperature. Must stay a total order; the chart publishes
/// non-numeric ISO fields and `sort_by` is allowed to panic on an
/// inconsistent comparator.
fn entry_order(a: &Entry, b: &Entry) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let iso = match (a.iso.parse::<u32>(), b.iso.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.iso.cmp(&b.iso),
    };
    a.developer
        .cmp(&b.developer)
        .then_with(|| a.name.cmp(&b.name))
        .then(iso)
        .then_with(|| a.dilution.cmp(&b.dilution))
        .then_with(|| a.temperature.total_cmp(&b.temperature))
}

fn print_entries(entries: &[Entry]) {
    let mut entries: Vec<&Entry> = entries.iter().collect();
    entries.sort_by(|a, b| entry_order(a, b));

    for e in entries {
        let mut times = Vec::with_capacity(3);
        if !e.time_135.is_zero() {
            times.push(format!("[135: {}]", fmt_duration(e.time_135)));
        }
        if !e.time_120.is_zero() {
            times.push(format!("[120: {}]", fmt_duration(e.time_120)));
        }
        if !e.time_sheet.is_zero() {
            times.push(format!("[sheet: {}]", fmt_duration(e.time_sheet)));
        }

        let mut notes = String::new();
        for n in &e.notes {
            notes.push_str("\n        ");
            notes.push_str(n);
        }

        println!(
            "{:>6}) {} {} {:.1}C {}{}",
            e.iso,
            strip(&e.name),
            e.dilution,
            e.temperature,
            times.join(" "),
            notes,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, iso: &str) -> Entry {
        Entry {
            name: name.to_string(),
            developer: "Kodak".to_string(),
            dilution: "1+4".to_string(),
            iso: iso.to_string(),
            time_135: Duration::ZERO,
            time_120: Duration::ZERO,
            time_sheet: Duration::ZERO,
            temperature: 20.0,
            notes: Vec::new(),
        }
    }

    #[test]
    fn published_stock_names_filter_after_strip() {
        let e = entry("TMax 400", "400");
        // As published, as typed, wildcarded.
        assert!(keep_entry(&e, &wc_parse(&strip("TMax 400")), "", ""));
        assert!(keep_entry(&e, &wc_parse(&strip("tmax400")), "", ""));
        assert!(keep_entry(&e, &wc_parse(&strip("tmax*")), "", ""));
        assert!(!keep_entry(&e, &wc_parse(&strip("FP4+")), "", ""));
        // Empty stock query defers to the other filters.
        assert!(keep_entry(&e, &wc_parse(""), "400", "1+4"));
        assert!(!keep_entry(&e, &wc_parse(""), "100", ""));
        assert!(!keep_entry(&e, &wc_parse(""), "", "1+9"));
    }

    #[test]
    fn listing_order_is_total_for_textual_isos() {
        use std::cmp::Ordering;

        let a = entry("TMax 400", "n/a");
        let b = entry("TMax 400", "various");
        assert_eq!(entry_order(&a, &b), entry_order(&b, &a).reverse());
        assert_eq!(entry_order(&a, &a), Ordering::Equal);
        // Numeric ISOs sort by value and ahead of textual ones.
        assert_eq!(entry_order(&entry("x", "50"), &entry("x", "400")), Ordering::Less);
        assert_eq!(entry_order(&entry("x", "400"), &entry("x", "n/a")), Ordering::Less);
    }

    #[test]
    fn strip_normalizes() {
        assert_eq!(strip("Ilfotec DD-X"), "ilfotecddx");
        assert_eq!(strip("Rodinal 1+25 50%"), "rodinal1+2550");
    }

    #[test]
    fn wildcard_matching() {
        let q = wc_parse("tmax*");
        assert!(wc_match(&q, "tmax400"));
        assert!(!wc_match(&q, "xtmax400"));

        let q = wc_parse("*400");
        assert!(wc_match(&q, "tmax400"));
        assert!(!wc_match(&q, "tmax100"));

        let q = wc_parse("t*400");
        assert!(wc_match(&q, "tmax400"));

        // No wildcard: exact only.
        let q = wc_parse("tmax400");
        assert!(wc_match(&q, "tmax400"));
        assert!(!wc_match(&q, "tmax4000"));

        // Empty query matches everything.
        let q = wc_parse("");
        assert!(wc_match(&q, "anything"));
    }

    #[test]
    fn durations_render_compact() {
        assert_eq!(fmt_duration(Duration::from_secs(510)), "8m30s");
        assert_eq!(fmt_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(fmt_duration(Duration::from_secs(3725)), "1h2m5s");
        assert_eq!(fmt_duration(Duration::ZERO), "");
    }
}
