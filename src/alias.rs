// src/alias.rs
//
// User aliases for developers, with an optional density for mixing by
// weight. Flat file in the config dir, one "alias developer num/den" triple
// per line, replaced wholesale with the same temp+rename pattern as the
// cache.

use std::{fs, io, path::Path};

use crate::error::{Error, Result};
use crate::file::write_atomic;
use crate::params::ALIAS_FILE;

#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub alias: String,
    pub developer: String,
    /// Density as the user gave it, numerator/denominator ([0, 0] = unset).
    pub density: [f64; 2],
}

impl Alias {
    pub fn density(&self) -> f64 {
        if self.density[1] == 0.0 {
            return 0.0;
        }
        self.density[0] / self.density[1]
    }
}

/// Parse "0.7" or "300.5/1000" into numerator/denominator.
pub fn parse_density(raw: &str) -> Result<[f64; 2]> {
    let invalid = || Error::Alias(format!("invalid decimal number: {raw:?}"));
    match raw.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse().map_err(|_| invalid())?;
            let den = den.trim().parse().map_err(|_| invalid())?;
            Ok([num, den])
        }
        None => {
            let num = raw.trim().parse().map_err(|_| invalid())?;
            Ok([num, 1.0])
        }
    }
}

pub fn load(config_dir: &Path) -> Result<Vec<Alias>> {
    let path = config_dir.join(ALIAS_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(Error::AliasFile { path, source }),
    };

    let mut aliases: Vec<Alias> = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(Error::Alias(format!("invalid line {line:?}")));
        }
        if aliases.iter().any(|a| a.alias == fields[0]) {
            return Err(Error::Alias(format!("duplicate alias {:?}", fields[0])));
        }
        aliases.push(Alias {
            alias: fields[0].to_string(),
            developer: fields[1].to_string(),
            density: parse_density(fields[2])?,
        });
    }
    Ok(aliases)
}

/// Replace the alias file. Later entries win over earlier ones with the
/// same alias; surviving entries keep their order.
pub fn save(config_dir: &Path, aliases: &[Alias]) -> Result<()> {
    let mut kept: Vec<&Alias> = Vec::with_capacity(aliases.len());
    for alias in aliases.iter().rev() {
        if !kept.iter().any(|k| k.alias == alias.alias) {
            kept.push(alias);
        }
    }
    kept.reverse();

    let mut out = String::new();
    for a in kept {
        out.push_str(&format!(
            "{} {} {}/{}\n",
            a.alias, a.developer, a.density[0], a.density[1]
        ));
    }

    let path = config_dir.join(ALIAS_FILE);
    fs::create_dir_all(config_dir).map_err(|source| Error::AliasFile {
        path: path.clone(),
        source,
    })?;
    write_atomic(&path, out.as_bytes()).map_err(|source| Error::AliasFile { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(alias: &str, dev: &str, density: [f64; 2]) -> Alias {
        Alias { alias: alias.into(), developer: dev.into(), density }
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let aliases = vec![
            a("adonal", "rodinal", [280.0, 200.0]),
            a("hc", "HC-110", [0.0, 0.0]),
        ];
        save(dir.path(), &aliases).unwrap();
        assert_eq!(load(dir.path()).unwrap(), aliases);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn save_keeps_last_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let aliases = vec![
            a("x", "rodinal", [0.0, 0.0]),
            a("y", "HC-110", [0.0, 0.0]),
            a("x", "d76", [1.0, 1.0]),
        ];
        save(dir.path(), &aliases).unwrap();
        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].developer, "HC-110");
        assert_eq!(loaded[1].developer, "d76");
        assert_eq!(loaded[1].density(), 1.0);
    }

    #[test]
    fn duplicate_lines_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ALIAS_FILE), "x a 1/2\nx b 1/2\n").unwrap();
        assert!(matches!(load(dir.path()), Err(Error::Alias(_))));
    }

    #[test]
    fn io_failures_name_the_alias_file() {
        let dir = tempfile::tempdir().unwrap();

        // Alias path occupied by a directory: unreadable, but present.
        fs::create_dir(dir.path().join(ALIAS_FILE)).unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(&err, Error::AliasFile { path, .. } if path.ends_with(ALIAS_FILE)));

        // Config dir path occupied by a file: nothing can be created below it.
        let blocked = dir.path().join("cfg");
        fs::write(&blocked, b"").unwrap();
        let err = save(&blocked, &[]).unwrap_err();
        assert!(matches!(err, Error::AliasFile { .. }));
    }

    #[test]
    fn densities() {
        assert_eq!(parse_density("0.7").unwrap(), [0.7, 1.0]);
        assert_eq!(parse_density("300.5/1000").unwrap(), [300.5, 1000.0]);
        assert!(parse_density("a/b").is_err());
        assert_eq!(a("x", "y", [280.0, 200.0]).density(), 1.4);
        assert_eq!(a("x", "y", [1.0, 0.0]).density(), 0.0);
    }
}
