//! Feed-cost calculator for egg production

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Ingredient, RatioTable};

/// Eggs per tray
pub const EGGS_PER_TRAY: u32 = 30;

/// Calculator input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedInputs {
    /// Unit price per ingredient; missing prices count as zero
    #[serde(default)]
    pub prices: BTreeMap<Ingredient, Decimal>,
    pub total_feed: Decimal,
    #[serde(default)]
    pub overhead: Decimal,
    pub total_eggs: u64,
}

/// Per-ingredient line of the breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient: Ingredient,
    pub share: Decimal,
    pub quantity: Decimal,
    pub cost: Decimal,
}

/// Calculator output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedCostBreakdown {
    pub lines: Vec<IngredientLine>,
    pub total_feed_cost: Decimal,
    pub overhead: Decimal,
    pub total_cost: Decimal,
    pub cost_per_egg: Decimal,
    pub cost_per_tray: Decimal,
}

impl FeedCostBreakdown {
    pub fn quantity(&self, ingredient: Ingredient) -> Option<Decimal> {
        self.lines.iter().find(|l| l.ingredient == ingredient).map(|l| l.quantity)
    }

    pub fn cost(&self, ingredient: Ingredient) -> Option<Decimal> {
        self.lines.iter().find(|l| l.ingredient == ingredient).map(|l| l.cost)
    }
}

/// Inputs the calculator refuses
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("Total feed must be greater than zero")]
    ZeroFeed,

    #[error("Total eggs must be greater than zero")]
    ZeroEggs,

    #[error("Feed cost is too large to calculate")]
    Overflow,
}

impl FeedError {
    pub fn field(&self) -> &'static str {
        match self {
            FeedError::ZeroFeed => "total_feed",
            FeedError::ZeroEggs => "total_eggs",
            FeedError::Overflow => "total_feed",
        }
    }
}

/// Split total feed by the ratio table and cost it out.
///
/// `qty = share * total_feed`, `cost = qty * price`, and the per-egg figure
/// includes overhead. Zero feed or zero eggs is rejected before any math,
/// and a result outside the `Decimal` range is [`FeedError::Overflow`].
pub fn calculate_feed_cost(ratios: &RatioTable, inputs: &FeedInputs) -> Result<FeedCostBreakdown, FeedError> {
    if inputs.total_feed.is_zero() {
        return Err(FeedError::ZeroFeed);
    }
    if inputs.total_eggs == 0 {
        return Err(FeedError::ZeroEggs);
    }

    let lines = ratios
        .iter()
        .map(|(ingredient, share)| {
            let quantity = share.checked_mul(inputs.total_feed).ok_or(FeedError::Overflow)?;
            let price = inputs.prices.get(&ingredient).copied().unwrap_or(Decimal::ZERO);
            Ok(IngredientLine {
                ingredient,
                share,
                quantity,
                cost: quantity.checked_mul(price).ok_or(FeedError::Overflow)?,
            })
        })
        .collect::<Result<Vec<_>, FeedError>>()?;

    let total_feed_cost = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.cost))
        .ok_or(FeedError::Overflow)?;
    let total_cost = total_feed_cost
        .checked_add(inputs.overhead)
        .ok_or(FeedError::Overflow)?;
    let cost_per_egg = total_cost
        .checked_div(Decimal::from(inputs.total_eggs))
        .ok_or(FeedError::Overflow)?;
    let cost_per_tray = cost_per_egg
        .checked_mul(Decimal::from(EGGS_PER_TRAY))
        .ok_or(FeedError::Overflow)?;

    Ok(FeedCostBreakdown {
        lines,
        total_feed_cost,
        overhead: inputs.overhead,
        total_cost,
        cost_per_egg,
        cost_per_tray,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scenario_ratios() -> RatioTable {
        let pct = BTreeMap::from([
            (Ingredient::Maize, 75),
            (Ingredient::OilCakes, 20),
            (Ingredient::Bran, 5),
            (Ingredient::Premix, 0),
            (Ingredient::Limestone, 0),
        ]);
        RatioTable::from_percentages(&pct)
    }

    fn scenario_inputs() -> FeedInputs {
        FeedInputs {
            prices: BTreeMap::from([
                (Ingredient::Maize, dec("1")),
                (Ingredient::OilCakes, dec("2")),
                (Ingredient::Bran, dec("1.5")),
                (Ingredient::Premix, dec("0")),
                (Ingredient::Limestone, dec("0")),
            ]),
            total_feed: dec("100"),
            overhead: dec("10"),
            total_eggs: 50,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let result = calculate_feed_cost(&scenario_ratios(), &scenario_inputs()).unwrap();

        assert_eq!(result.quantity(Ingredient::Maize), Some(dec("75")));
        assert_eq!(result.quantity(Ingredient::OilCakes), Some(dec("20")));
        assert_eq!(result.quantity(Ingredient::Bran), Some(dec("5")));
        assert_eq!(result.quantity(Ingredient::Premix), Some(Decimal::ZERO));
        assert_eq!(result.quantity(Ingredient::Limestone), Some(Decimal::ZERO));

        assert_eq!(result.cost(Ingredient::Maize), Some(dec("75")));
        assert_eq!(result.cost(Ingredient::OilCakes), Some(dec("40")));
        assert_eq!(result.cost(Ingredient::Bran), Some(dec("7.5")));

        assert_eq!(result.total_feed_cost, dec("122.5"));
        assert_eq!(result.total_cost, dec("132.5"));
        assert_eq!(result.cost_per_egg, dec("2.65"));
        assert_eq!(result.cost_per_tray, dec("79.5"));
    }

    #[test]
    fn test_missing_price_counts_as_zero() {
        let mut inputs = scenario_inputs();
        inputs.prices.remove(&Ingredient::OilCakes);
        let result = calculate_feed_cost(&scenario_ratios(), &inputs).unwrap();
        assert_eq!(result.cost(Ingredient::OilCakes), Some(Decimal::ZERO));
        assert_eq!(result.total_feed_cost, dec("82.5"));
    }

    #[test]
    fn test_zero_feed_rejected() {
        let mut inputs = scenario_inputs();
        inputs.total_feed = Decimal::ZERO;
        assert_eq!(calculate_feed_cost(&scenario_ratios(), &inputs), Err(FeedError::ZeroFeed));
    }

    #[test]
    fn test_zero_eggs_rejected() {
        let mut inputs = scenario_inputs();
        inputs.total_eggs = 0;
        let err = calculate_feed_cost(&scenario_ratios(), &inputs).unwrap_err();
        assert_eq!(err, FeedError::ZeroEggs);
        assert_eq!(err.field(), "total_eggs");
    }

    #[test]
    fn test_huge_inputs_overflow_instead_of_panicking() {
        let mut inputs = scenario_inputs();
        inputs.prices.insert(Ingredient::Maize, Decimal::from(10u64.pow(19)));
        inputs.total_feed = Decimal::from(10u64.pow(19));
        inputs.total_eggs = 1;

        let err = calculate_feed_cost(&scenario_ratios(), &inputs).unwrap_err();
        assert_eq!(err, FeedError::Overflow);
        assert_eq!(err.field(), "total_feed");
    }

    #[test]
    fn test_overhead_overflow_is_reported() {
        let mut inputs = scenario_inputs();
        inputs.overhead = Decimal::MAX;
        assert_eq!(calculate_feed_cost(&scenario_ratios(), &inputs), Err(FeedError::Overflow));
    }
}
