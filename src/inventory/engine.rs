//! Reconciliation engine: resolves free-text ingredient mentions against
//! stock rows and applies quantity deltas, for both restocking and meal
//! deduction. Every per-line problem degrades to a human-readable report
//! line; only storage errors propagate.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::inventory::quantity::{convert, Quantity};
use crate::meals::repo as meals_repo;
use crate::meals::repo_types::MealLog;
use crate::stock::repo as stock_repo;
use crate::stock::repo_types::StockRecord;

/// The user or shared kitchen a stock operation runs against. A kitchen id,
/// when present, always wins over the personal scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    User(Uuid),
    Kitchen(Uuid),
}

impl OwnerScope {
    pub fn resolve(user_id: Uuid, kitchen_id: Option<Uuid>) -> OwnerScope {
        match kitchen_id {
            Some(kitchen_id) => OwnerScope::Kitchen(kitchen_id),
            None => OwnerScope::User(user_id),
        }
    }
}

/// One consumed ingredient line as sent by clients. `qty` arrives as either
/// a string ("200g") or a bare number; both collapse to a string here. After
/// the meal is logged these pairs are display-only and never re-parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientUse {
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default, deserialize_with = "qty_as_string")]
    pub qty: Option<String>,
}

fn qty_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }))
}

/// Everything needed to log one meal and optionally deduct its ingredients.
#[derive(Debug)]
pub struct MealInput {
    pub user_id: Uuid,
    pub kitchen_id: Option<Uuid>,
    pub name: String,
    pub ingredients_used: Vec<IngredientUse>,
    pub confidence: i32,
    pub meal_type: String,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
    pub deduct_stock: bool,
    pub source: String,
}

/// Per-line failures during reconciliation. Their `Display` output is the
/// exact report line shown to the user; none of them aborts the batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineIssue {
    #[error("Item {0} not found in stock.")]
    NotFound(String),
    #[error("Unit mismatch for {item}: Stock has '{stock_unit}', used '{used_unit}'. Cannot convert.")]
    UnitMismatch {
        item: String,
        stock_unit: String,
        used_unit: String,
    },
    #[error("Could not parse stock quantity for {item} ('{raw}'). No deduction made.")]
    StockUnparseable { item: String, raw: String },
    #[error("Skipping deduction for {item}: Could not parse quantity {raw}")]
    UsedUnparseable { item: String, raw: String },
}

/// Outcome of deducting a parsed usage from one stock row.
#[derive(Debug, PartialEq)]
pub(crate) enum Applied {
    /// The row dropped to (near) zero and must be deleted.
    Depleted { used: Quantity },
    /// The row survives with a new quantity.
    Reduced { used: Quantity, remaining: Quantity },
}

impl Applied {
    pub(crate) fn report_line(&self, item: &str, used_raw: &str) -> String {
        match self {
            Applied::Depleted { used } => {
                format!("Used {item}: {used} (Original: {used_raw}). Stock depleted.")
            }
            Applied::Reduced { used, remaining } => {
                format!("Used {item}: {used} (Original: {used_raw}). Remaining: {remaining}")
            }
        }
    }
}

/// Guard against floating point near-zero remainders.
const DEPLETION_EPSILON: f64 = 0.001;

/// Decide what deducting `used` does to a stock row holding `stock_quantity`.
/// Pure; the caller applies the storage effect.
pub(crate) fn apply_usage(
    item: &str,
    stock_quantity: &str,
    used: &Quantity,
) -> Result<Applied, LineIssue> {
    let current = Quantity::parse(stock_quantity).ok_or_else(|| LineIssue::StockUnparseable {
        item: item.to_string(),
        raw: stock_quantity.to_string(),
    })?;

    let converted =
        convert(used.amount, &used.unit, &current.unit).ok_or_else(|| LineIssue::UnitMismatch {
            item: item.to_string(),
            stock_unit: current.unit.as_str().to_string(),
            used_unit: used.unit.as_str().to_string(),
        })?;

    let used_in_stock_unit = Quantity::new(converted, current.unit.clone());
    let remaining = current.amount - converted;
    if remaining <= DEPLETION_EPSILON {
        Ok(Applied::Depleted {
            used: used_in_stock_unit,
        })
    } else {
        Ok(Applied::Reduced {
            used: used_in_stock_unit,
            remaining: Quantity::new(remaining, current.unit),
        })
    }
}

/// Merge a freshly added quantity into an existing stock row's quantity
/// string, converting into the row's unit. `None` when the stored quantity
/// does not parse or the units are incommensurable; the caller then creates
/// a separate row instead of corrupting the existing one.
pub(crate) fn merge_quantities(stock_quantity: &str, added: &Quantity) -> Option<Quantity> {
    let current = Quantity::parse(stock_quantity)?;
    let converted = convert(added.amount, &added.unit, &current.unit)?;
    Some(Quantity::new(current.amount + converted, current.unit))
}

/// Second matching pass: accept the first record whose name is contained in
/// the candidate, so stock "Cheese" matches consumed "Mozzarella Cheese".
pub(crate) fn reverse_match<'a>(
    records: &'a [StockRecord],
    candidate: &str,
) -> Option<&'a StockRecord> {
    let candidate = candidate.to_lowercase();
    records
        .iter()
        .find(|record| candidate.contains(&record.item_name.to_lowercase()))
}

/// Two-pass fuzzy match of an ingredient mention against the scope's stock:
/// substring lookup in SQL first, then the reverse containment scan. Both
/// passes run against the same scope. Ties go to storage order; stock lists
/// are small enough that this is acceptable.
async fn find_match(
    tx: &mut Transaction<'_, Postgres>,
    scope: OwnerScope,
    candidate: &str,
) -> anyhow::Result<Option<StockRecord>> {
    if let Some(hit) = stock_repo::find_name_containing_tx(tx, scope, candidate).await? {
        return Ok(Some(hit));
    }
    let records = stock_repo::list_scope_tx(tx, scope).await?;
    Ok(reverse_match(&records, candidate).cloned())
}

/// Add stock for an item, merging into an existing row when the fuzzy match
/// finds one with a compatible unit. Returns a one-line confirmation; an
/// unparseable quantity returns a descriptive message instead of an error.
pub async fn add_stock(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    kitchen_id: Option<Uuid>,
    item_name: &str,
    quantity_text: &str,
    category: &str,
) -> anyhow::Result<String> {
    let Some(added) = Quantity::parse(quantity_text) else {
        return Ok(format!(
            "Could not parse quantity '{quantity_text}' for {item_name}. \
             Please interpret the quantity clearly (e.g. '2 kg', '500 g')."
        ));
    };

    let scope = OwnerScope::resolve(user_id, kitchen_id);

    if let Some(existing) = find_match(tx, scope, item_name).await? {
        if let Some(total) = merge_quantities(&existing.quantity, &added) {
            let quantity = total.to_string();
            stock_repo::update_quantity_tx(tx, existing.id, &quantity).await?;
            debug!(item = %existing.item_name, %quantity, "merged into existing stock");
            return Ok(format!(
                "Updated '{}' (Total: {quantity}).",
                existing.item_name
            ));
        }
        // Incommensurable with the stored quantity ("5 eggs" + "200 g"):
        // leave the matched row alone and fall through to a fresh one.
    }

    let quantity = added.to_string();
    stock_repo::insert_tx(
        tx,
        Some(user_id),
        kitchen_id,
        item_name,
        &quantity,
        category,
        "manual_chat",
        None,
    )
    .await?;
    Ok(format!("Added '{item_name}' (Total: {quantity})."))
}

/// Log a meal and, unless `deduct_stock` is off, walk its ingredient lines
/// deducting each from stock. The meal row is written first and survives any
/// combination of line failures; lines are processed in input order and a
/// failed line never blocks the ones after it.
pub async fn log_meal_and_deduct_stock(
    tx: &mut Transaction<'_, Postgres>,
    input: MealInput,
) -> anyhow::Result<(MealLog, Vec<String>)> {
    let meal = meals_repo::insert_tx(tx, &input).await?;
    let mut report = Vec::new();

    if !input.deduct_stock {
        report.push("Dining out: No stock deducted.".to_string());
        return Ok((meal, report));
    }

    let scope = OwnerScope::resolve(input.user_id, input.kitchen_id);

    for ingredient in &input.ingredients_used {
        let Some(item) = ingredient.item.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };
        let Some(used_raw) = ingredient.qty.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };

        let Some(used) = Quantity::parse(used_raw) else {
            debug!(item, qty = used_raw, "used quantity did not parse");
            report.push(
                LineIssue::UsedUnparseable {
                    item: item.to_string(),
                    raw: used_raw.to_string(),
                }
                .to_string(),
            );
            continue;
        };

        let Some(stock) = find_match(tx, scope, item).await? else {
            report.push(LineIssue::NotFound(item.to_string()).to_string());
            continue;
        };

        match apply_usage(item, &stock.quantity, &used) {
            Ok(outcome) => {
                match &outcome {
                    Applied::Depleted { .. } => stock_repo::delete_tx(tx, stock.id).await?,
                    Applied::Reduced { remaining, .. } => {
                        stock_repo::update_quantity_tx(tx, stock.id, &remaining.to_string())
                            .await?
                    }
                }
                report.push(outcome.report_line(item, used_raw));
            }
            Err(issue) => report.push(issue.to_string()),
        }
    }

    Ok((meal, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::quantity::Unit;
    use time::OffsetDateTime;

    fn record(name: &str, quantity: &str) -> StockRecord {
        StockRecord {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            kitchen_id: None,
            item_name: name.to_string(),
            quantity: quantity.to_string(),
            category: "other".to_string(),
            expiry_date: None,
            source: "manual".to_string(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn scope_prefers_kitchen_over_user() {
        let user = Uuid::new_v4();
        let kitchen = Uuid::new_v4();
        assert_eq!(
            OwnerScope::resolve(user, Some(kitchen)),
            OwnerScope::Kitchen(kitchen)
        );
        assert_eq!(OwnerScope::resolve(user, None), OwnerScope::User(user));
    }

    #[test]
    fn reverse_match_handles_plural_and_compound_names() {
        let records = vec![record("Cheese", "200 g"), record("Tomato", "500 g")];
        let hit = reverse_match(&records, "Mozzarella Cheese").expect("should match");
        assert_eq!(hit.item_name, "Cheese");
        let hit = reverse_match(&records, "Tomatoes").expect("should match");
        assert_eq!(hit.item_name, "Tomato");
        assert!(reverse_match(&records, "Basil").is_none());
    }

    #[test]
    fn reverse_match_is_case_insensitive() {
        let records = vec![record("TOMATO", "500 g")];
        assert!(reverse_match(&records, "cherry tomatoes").is_some());
    }

    #[test]
    fn deduction_leaves_remainder_in_stock_unit() {
        let used = Quantity::parse("200g").unwrap();
        let outcome = apply_usage("Tomatoes", "500g", &used).unwrap();
        assert_eq!(
            outcome,
            Applied::Reduced {
                used: Quantity::new(200.0, Unit::Gram),
                remaining: Quantity::new(300.0, Unit::Gram),
            }
        );
        assert_eq!(
            outcome.report_line("Tomatoes", "200g"),
            "Used Tomatoes: 200 g (Original: 200g). Remaining: 300 g"
        );
    }

    #[test]
    fn deduction_converts_into_the_stock_rows_unit() {
        let used = Quantity::parse("500 g").unwrap();
        let outcome = apply_usage("Flour", "2 kg", &used).unwrap();
        assert_eq!(
            outcome,
            Applied::Reduced {
                used: Quantity::new(0.5, Unit::Kilogram),
                remaining: Quantity::new(1.5, Unit::Kilogram),
            }
        );
    }

    #[test]
    fn deduction_applies_density_fallback() {
        // 1 cup = 240 ml deducted from a millilitre-denominated row.
        let used = Quantity::parse("1 cup").unwrap();
        let outcome = apply_usage("Milk", "1000 ml", &used).unwrap();
        assert_eq!(
            outcome,
            Applied::Reduced {
                used: Quantity::new(240.0, Unit::Millilitre),
                remaining: Quantity::new(760.0, Unit::Millilitre),
            }
        );
    }

    #[test]
    fn overdraw_depletes_instead_of_going_negative() {
        let used = Quantity::parse("150g").unwrap();
        let outcome = apply_usage("Butter", "100g", &used).unwrap();
        assert_eq!(
            outcome,
            Applied::Depleted {
                used: Quantity::new(150.0, Unit::Gram),
            }
        );
        assert_eq!(
            outcome.report_line("Butter", "150g"),
            "Used Butter: 150 g (Original: 150g). Stock depleted."
        );
    }

    #[test]
    fn exact_consumption_counts_as_depletion() {
        let used = Quantity::parse("100 g").unwrap();
        assert!(matches!(
            apply_usage("Butter", "100 g", &used),
            Ok(Applied::Depleted { .. })
        ));
    }

    #[test]
    fn unit_mismatch_is_reported_not_applied() {
        let used = Quantity::parse("2 pcs").unwrap();
        let issue = apply_usage("Eggs", "500 g", &used).unwrap_err();
        assert_eq!(
            issue.to_string(),
            "Unit mismatch for Eggs: Stock has 'g', used 'pcs'. Cannot convert."
        );
    }

    #[test]
    fn unparseable_stock_quantity_is_reported_not_applied() {
        let used = Quantity::parse("100 g").unwrap();
        let issue = apply_usage("Rice", "some", &used).unwrap_err();
        assert_eq!(
            issue.to_string(),
            "Could not parse stock quantity for Rice ('some'). No deduction made."
        );
    }

    #[test]
    fn merge_converts_then_sums() {
        let added = Quantity::parse("0.5 kg").unwrap();
        let total = merge_quantities("500 g", &added).unwrap();
        assert_eq!(total, Quantity::new(1000.0, Unit::Gram));
        assert_eq!(total.to_string(), "1000 g");
    }

    #[test]
    fn merge_refuses_incommensurable_units() {
        let added = Quantity::parse("200 g").unwrap();
        assert_eq!(merge_quantities("5 eggs", &added), None);
        assert_eq!(merge_quantities("not a quantity", &added), None);
    }

    #[test]
    fn skipped_lines_still_name_the_ingredient() {
        let issue = LineIssue::UsedUnparseable {
            item: "Rice".to_string(),
            raw: "some".to_string(),
        };
        assert_eq!(
            issue.to_string(),
            "Skipping deduction for Rice: Could not parse quantity some"
        );
        assert_eq!(
            LineIssue::NotFound("Basil".to_string()).to_string(),
            "Item Basil not found in stock."
        );
    }

    #[test]
    fn ingredient_qty_accepts_numbers_and_strings() {
        let parsed: Vec<IngredientUse> =
            serde_json::from_str(r#"[{"item":"Tomato","qty":"200g"},{"item":"Egg","qty":3}]"#)
                .unwrap();
        assert_eq!(parsed[0].qty.as_deref(), Some("200g"));
        assert_eq!(parsed[1].qty.as_deref(), Some("3"));
    }

    #[test]
    fn end_to_end_reverse_match_deduction() {
        // Stock carries "Tomato"; the meal used "Tomatoes". The forward pass
        // finds nothing ("Tomato" does not contain "Tomatoes"), the reverse
        // pass fires, and 200 g comes off the 500 g row.
        let records = vec![record("Tomato", "500g")];
        let stock = reverse_match(&records, "Tomatoes").expect("reverse pass should fire");

        let used = Quantity::parse("200g").unwrap();
        let outcome = apply_usage("Tomatoes", &stock.quantity, &used).unwrap();
        let Applied::Reduced { remaining, .. } = &outcome else {
            panic!("expected a surviving row");
        };
        assert_eq!(remaining.to_string(), "300 g");
        assert_eq!(
            outcome.report_line("Tomatoes", "200g"),
            "Used Tomatoes: 200 g (Original: 200g). Remaining: 300 g"
        );
    }
}
