// src/calc.rs
//
// Dilution arithmetic. A `Chem` knows its density and how much of a total
// volume it occupies; `mix` turns that into pourable amounts.

use std::fmt;

/// Capability needed to mix a working solution.
pub trait Chem {
    /// Grams per milliliter; 0 when unknown (weight output is suppressed).
    fn density(&self) -> f64;
    /// Milliliters of concentrate in `total` milliliters of solution.
    fn volume(&self, total: f64) -> f64;
}

/// Fixed density + fixed ratio, which covers every one-shot developer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simple {
    density: f64,
    ratio: f64,
}

impl Simple {
    pub fn new(density: f64, ratio: f64) -> Self {
        Simple { density, ratio }
    }
}

impl Chem for Simple {
    fn density(&self) -> f64 {
        self.density
    }

    fn volume(&self, total: f64) -> f64 {
        self.ratio * total
    }
}

/// Mixing instructions for one working solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mix {
    pub chem_volume: f64,
    pub chem_weight: f64,
    pub water_volume: f64,
}

impl fmt::Display for Mix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chem_weight == 0.0 && self.chem_volume != 0.0 {
            return write!(
                f,
                "{:.2}ml + {:.0}ml = {:.2}ml",
                self.chem_volume,
                self.water_volume,
                self.chem_volume + self.water_volume,
            );
        }
        write!(
            f,
            "{:.2}ml ({:.2}g) + {:.0}ml = {:.2}ml ({:.2}g)",
            self.chem_volume,
            self.chem_weight,
            self.water_volume,
            self.chem_volume + self.water_volume,
            self.chem_weight + self.water_volume,
        )
    }
}

pub fn mix(chem: &dyn Chem, total_volume: f64) -> Mix {
    let chem_volume = chem.volume(total_volume);
    Mix {
        chem_volume,
        chem_weight: chem_volume * chem.density(),
        water_volume: total_volume - chem_volume,
    }
}

/// Parse a two-part ratio written "a+b", "a:b" or "a/b". A single number is
/// one part chemical, zero parts water. None for anything else.
pub fn scale_parts(scale: &str) -> Option<[u32; 2]> {
    let mut parts = [0u32; 2];
    let mut n = 0;
    for field in scale.split(['+', ':', '/']).filter(|f| !f.is_empty()) {
        if n == 2 {
            return None;
        }
        parts[n] = field.trim().parse().ok()?;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(parts)
}

/// Fraction of the working solution that is concentrate: a / (a + b).
pub fn scale_ratio(scale: &str) -> Option<f64> {
    let [a, b] = scale_parts(scale)?;
    let total = a.checked_add(b)?;
    if total == 0 {
        return None;
    }
    Some(f64::from(a) / f64::from(total))
}

/// Canonical "a+b" form.
pub fn scale_string(parts: [u32; 2]) -> String {
    format!("{}+{}", parts[0], parts[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_accept_all_separators() {
        assert_eq!(scale_parts("1+31"), Some([1, 31]));
        assert_eq!(scale_parts("1:50"), Some([1, 50]));
        assert_eq!(scale_parts("1/9"), Some([1, 9]));
        assert_eq!(scale_parts("3"), Some([3, 0]));
        assert_eq!(scale_parts(""), None);
        assert_eq!(scale_parts("1+2+3"), None);
        assert_eq!(scale_parts("one+two"), None);
    }

    #[test]
    fn ratio_is_chem_over_total() {
        assert_eq!(scale_ratio("1+9"), Some(0.1));
        assert_eq!(scale_ratio("1+0"), Some(1.0));
        assert_eq!(scale_ratio("0+0"), None);
    }

    #[test]
    fn canonical_string_round_trips() {
        assert_eq!(scale_string(scale_parts("1:31").unwrap()), "1+31");
    }

    #[test]
    fn mix_splits_volume() {
        let m = mix(&Simple::new(0.0, 0.1), 500.0);
        assert_eq!(m.chem_volume, 50.0);
        assert_eq!(m.water_volume, 450.0);
        assert_eq!(m.chem_weight, 0.0);
        assert_eq!(m.to_string(), "50.00ml + 450ml = 500.00ml");
    }

    #[test]
    fn mix_with_density_reports_weight() {
        let m = mix(&Simple::new(1.4, 0.04), 500.0);
        assert!((m.chem_weight - 28.0).abs() < 1e-9);
        assert!(m.to_string().contains("(28.00g)"));
    }
}
