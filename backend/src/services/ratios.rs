//! Feed ratio table persistence and the feed-cost calculator

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use shared::{
    calculate_feed_cost, validate_ratio_percentages, FeedCostBreakdown, FeedInputs, Ingredient,
    RatioTable, RATIO_OVERRIDE_KEY,
};

use super::admin_gate::AdminGate;
use crate::error::AppResult;
use crate::store::SettingsStore;

#[derive(Clone)]
pub struct RatioService {
    settings: Arc<dyn SettingsStore>,
}

/// Ratio editor payload
#[derive(Debug, Clone, Serialize)]
pub struct RatioSettings {
    pub shares: RatioTable,
    pub percentages: BTreeMap<Ingredient, i64>,
    /// Whether an override is stored
    pub customized: bool,
}

impl RatioSettings {
    fn new(shares: RatioTable, customized: bool) -> Self {
        Self {
            percentages: shares.percentages(),
            shares,
            customized,
        }
    }
}

impl RatioService {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Current ratios, falling back to defaults key by key
    pub async fn load(&self) -> AppResult<RatioSettings> {
        let doc = self.settings.get_setting(RATIO_OVERRIDE_KEY).await?;
        Ok(match doc {
            Some(doc) => RatioSettings::new(RatioTable::from_overrides(&doc), true),
            None => RatioSettings::new(RatioTable::default(), false),
        })
    }

    /// Validate and store whole percentages. Nothing is stored on rejection.
    pub async fn save(
        &self,
        gate: &AdminGate,
        percentages: BTreeMap<Ingredient, i64>,
    ) -> AppResult<RatioSettings> {
        gate.require_authorized()?;
        validate_ratio_percentages(&percentages)?;

        let table = RatioTable::from_percentages(&percentages);
        self.settings
            .put_setting(RATIO_OVERRIDE_KEY, table.to_overrides())
            .await?;

        tracing::info!(?percentages, "Feed ratios saved");
        Ok(RatioSettings::new(table, true))
    }

    /// Drop the override so defaults apply again
    pub async fn reset(&self, gate: &AdminGate) -> AppResult<RatioSettings> {
        gate.require_authorized()?;
        self.settings.delete_setting(RATIO_OVERRIDE_KEY).await?;
        tracing::info!("Feed ratios reset to defaults");
        Ok(RatioSettings::new(RatioTable::default(), false))
    }

    /// Feed cost breakdown with the current ratios
    pub async fn calculate(&self, inputs: &FeedInputs) -> AppResult<FeedCostBreakdown> {
        let ratios = self.load().await?;
        Ok(calculate_feed_cost(&ratios.shares, inputs)?)
    }
}
