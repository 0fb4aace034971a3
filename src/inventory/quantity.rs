use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

/// A measurement unit as it appears in stock quantities and meal ingredients.
///
/// Only the units the conversion table knows get their own variant; anything
/// else ("eggs", "cloves", "slices") is carried as an opaque token that is
/// compatible only with itself. The empty token means a unitless count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Gram,
    Kilogram,
    Milligram,
    Millilitre,
    Litre,
    Tablespoon,
    Teaspoon,
    Cup,
    Pieces,
    Other(String),
}

/// Dimension a unit reduces to for conversion math. Opaque units are their
/// own dimension, keyed by token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Base {
    Mass,
    Volume,
    Opaque(String),
}

impl Unit {
    /// Resolve a lowercased unit token, collapsing known aliases onto their
    /// canonical form. Unknown tokens pass through unchanged.
    pub fn from_token(token: &str) -> Unit {
        match token {
            "g" | "gm" | "gms" | "gram" | "grams" => Unit::Gram,
            "kg" | "kgs" | "kilogram" => Unit::Kilogram,
            "mg" => Unit::Milligram,
            "ml" | "mls" => Unit::Millilitre,
            "l" | "liters" | "litre" => Unit::Litre,
            "tbsp" | "tablespoon" => Unit::Tablespoon,
            "tsp" | "teaspoon" => Unit::Teaspoon,
            "cup" => Unit::Cup,
            "pc" | "pcs" | "piece" | "pieces" => Unit::Pieces,
            other => Unit::Other(other.to_string()),
        }
    }

    /// Canonical lowercase token for display and storage.
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milligram => "mg",
            Unit::Millilitre => "ml",
            Unit::Litre => "l",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Cup => "cup",
            Unit::Pieces => "pcs",
            Unit::Other(token) => token,
        }
    }

    /// Base unit of the dimension family plus the factor to reach it.
    /// Mass reduces to grams, volume to millilitres; everything else is its
    /// own base with factor 1.
    fn base_and_factor(&self) -> (Base, f64) {
        match self {
            Unit::Kilogram => (Base::Mass, 1000.0),
            Unit::Gram => (Base::Mass, 1.0),
            Unit::Milligram => (Base::Mass, 0.001),
            Unit::Litre => (Base::Volume, 1000.0),
            Unit::Cup => (Base::Volume, 240.0),
            Unit::Tablespoon => (Base::Volume, 15.0),
            Unit::Teaspoon => (Base::Volume, 5.0),
            Unit::Millilitre => (Base::Volume, 1.0),
            other => (Base::Opaque(other.as_str().to_string()), 1.0),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert `amount` from one unit into another.
///
/// Identical units short-circuit, which is also what makes opaque units work.
/// Across the mass/volume boundary a 1 g = 1 ml density approximation is
/// applied so that recipe quantities mixing grams and millilitres still
/// reconcile. Any other cross-dimension pair is unconvertible and yields
/// `None`; callers must report that rather than drop the line.
pub fn convert(amount: f64, from: &Unit, to: &Unit) -> Option<f64> {
    if from == to {
        return Some(amount);
    }

    let (from_base, from_factor) = from.base_and_factor();
    let (to_base, to_factor) = to.base_and_factor();
    let in_base = amount * from_factor;

    if from_base == to_base {
        return Some(in_base / to_factor);
    }

    match (&from_base, &to_base) {
        // Density fallback: treat 1 g as 1 ml.
        (Base::Mass, Base::Volume) | (Base::Volume, Base::Mass) => Some(in_base / to_factor),
        _ => None,
    }
}

/// A parsed (amount, unit) pair. Stock rows store it serialized as a display
/// string, so `parse` and `Display` must round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub amount: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(amount: f64, unit: Unit) -> Quantity {
        Quantity { amount, unit }
    }

    /// Parse a free-form quantity string like "500g", "2 pcs" or "1.5kg".
    ///
    /// The input must start with a numeric literal; an optional run of
    /// letters after it becomes the unit token. Returns `None` for empty
    /// input or input with no leading numeral.
    pub fn parse(raw: &str) -> Option<Quantity> {
        lazy_static! {
            static ref QUANTITY_RE: Regex =
                Regex::new(r"^([\d\.]+)\s*([a-zA-Z]*)").expect("quantity regex");
        }

        let raw = raw.trim().to_lowercase();
        let caps = QUANTITY_RE.captures(&raw)?;
        let amount: f64 = caps[1].parse().ok()?;
        let unit = Unit::from_token(&caps[2]);
        Some(Quantity { amount, unit })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whole numbers render without a decimal point: "2 kg", not "2.0 kg".
        if self.amount.fract() == 0.0 && self.amount.abs() < i64::MAX as f64 {
            write!(f, "{}", self.amount as i64)?;
        } else {
            write!(f, "{}", self.amount)?;
        }
        if !self.unit.as_str().is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> Quantity {
        Quantity::parse(raw).unwrap_or_else(|| panic!("'{raw}' should parse"))
    }

    #[test]
    fn parses_amount_and_unit() {
        assert_eq!(parsed("500g"), Quantity::new(500.0, Unit::Gram));
        assert_eq!(parsed("2 pcs"), Quantity::new(2.0, Unit::Pieces));
        assert_eq!(parsed("1.5kg"), Quantity::new(1.5, Unit::Kilogram));
        assert_eq!(parsed("  250 ML "), Quantity::new(250.0, Unit::Millilitre));
    }

    #[test]
    fn parses_unitless_count() {
        let q = parsed("3");
        assert_eq!(q.amount, 3.0);
        assert_eq!(q.unit, Unit::Other(String::new()));
    }

    #[test]
    fn normalizes_unit_aliases() {
        for raw in ["10 gm", "10 gms", "10 gram", "10 grams"] {
            assert_eq!(parsed(raw).unit, Unit::Gram);
        }
        for raw in ["2 kgs", "2 kilogram"] {
            assert_eq!(parsed(raw).unit, Unit::Kilogram);
        }
        assert_eq!(parsed("5 mls").unit, Unit::Millilitre);
        for raw in ["1 liters", "1 litre"] {
            assert_eq!(parsed(raw).unit, Unit::Litre);
        }
        for raw in ["1 pc", "4 piece", "4 pieces"] {
            assert_eq!(parsed(raw).unit, Unit::Pieces);
        }
        assert_eq!(parsed("2 tablespoon").unit, Unit::Tablespoon);
        assert_eq!(parsed("1 teaspoon").unit, Unit::Teaspoon);
    }

    #[test]
    fn unknown_units_pass_through() {
        assert_eq!(parsed("12 eggs").unit, Unit::Other("eggs".into()));
        assert_eq!(parsed("3 cloves").unit, Unit::Other("cloves".into()));
        // Case folds before the token is kept.
        assert_eq!(parsed("2 Slices").unit, Unit::Other("slices".into()));
    }

    #[test]
    fn rejects_input_without_leading_numeral() {
        assert_eq!(Quantity::parse(""), None);
        assert_eq!(Quantity::parse("some"), None);
        assert_eq!(Quantity::parse("about 2 kg"), None);
        assert_eq!(Quantity::parse("g500"), None);
    }

    #[test]
    fn formats_whole_numbers_without_decimal_point() {
        assert_eq!(Quantity::new(2.0, Unit::Kilogram).to_string(), "2 kg");
        assert_eq!(Quantity::new(0.5, Unit::Kilogram).to_string(), "0.5 kg");
        assert_eq!(Quantity::new(300.0, Unit::Gram).to_string(), "300 g");
        // Unitless counts drop the trailing space entirely.
        assert_eq!(Quantity::new(3.0, Unit::Other(String::new())).to_string(), "3");
    }

    #[test]
    fn parse_format_round_trip() {
        let units = [
            Unit::Gram,
            Unit::Kilogram,
            Unit::Millilitre,
            Unit::Litre,
            Unit::Pieces,
            Unit::Tablespoon,
            Unit::Teaspoon,
        ];
        for amount in [0.5, 1.0, 2.5, 100.0] {
            for unit in &units {
                let q = Quantity::new(amount, unit.clone());
                assert_eq!(Quantity::parse(&q.to_string()), Some(q));
            }
        }
    }

    #[test]
    fn convert_is_identity_on_same_unit() {
        for unit in [Unit::Gram, Unit::Pieces, Unit::Other("eggs".into())] {
            assert_eq!(convert(7.5, &unit, &unit), Some(7.5));
        }
    }

    #[test]
    fn converts_within_dimension_families() {
        assert_eq!(convert(1000.0, &Unit::Gram, &Unit::Kilogram), Some(1.0));
        assert_eq!(convert(1.0, &Unit::Litre, &Unit::Millilitre), Some(1000.0));
        assert_eq!(convert(1.0, &Unit::Cup, &Unit::Tablespoon), Some(16.0));
        assert_eq!(convert(3.0, &Unit::Teaspoon, &Unit::Tablespoon), Some(1.0));
        assert_eq!(convert(250.0, &Unit::Milligram, &Unit::Gram), Some(0.25));
    }

    #[test]
    fn density_fallback_bridges_mass_and_volume() {
        for x in [1.0, 42.0, 999.5] {
            assert_eq!(convert(x, &Unit::Gram, &Unit::Millilitre), Some(x));
            assert_eq!(convert(x, &Unit::Millilitre, &Unit::Gram), Some(x));
        }
        // The fallback composes with in-family factors on both sides.
        assert_eq!(convert(1.0, &Unit::Kilogram, &Unit::Millilitre), Some(1000.0));
        assert_eq!(convert(1.0, &Unit::Cup, &Unit::Gram), Some(240.0));
    }

    #[test]
    fn incompatible_dimensions_do_not_convert() {
        assert_eq!(convert(5.0, &Unit::Gram, &Unit::Pieces), None);
        assert_eq!(convert(5.0, &Unit::Pieces, &Unit::Millilitre), None);
        assert_eq!(
            convert(2.0, &Unit::Other("eggs".into()), &Unit::Other("cloves".into())),
            None
        );
    }
}
