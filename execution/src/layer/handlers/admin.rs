use super::super::*;
use crate::config::Role;
use crate::query;
use plinko_types::plinko::{LightningMode, TableError};
use tracing::info;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_set_multipliers(
        &mut self,
        public: &PublicKey,
        risk: u8,
        rows: u8,
        values: &[u32],
    ) -> Result<Vec<Event>, PlinkoError> {
        self.require(public, Role::Admin)?;

        let mut table = query::get_multipliers(self).await?;
        table
            .set(risk, rows, values.to_vec())
            .map_err(|err| match err {
                TableError::InvalidRows { got } => PlinkoError::InvalidNumRows(got),
                TableError::InvalidRisk { got } => PlinkoError::InvalidRisk(got),
                other => PlinkoError::InvalidMultipliers(other),
            })?;
        self.insert(Key::Multipliers, Value::Multipliers(table))
            .await?;

        info!(risk, rows, buckets = values.len(), "multipliers updated");
        Ok(vec![Event::MultipliersUpdated {
            risk,
            rows,
            values: values.to_vec(),
        }])
    }

    pub(in crate::layer) async fn handle_set_lightning_mode(
        &mut self,
        public: &PublicKey,
        active: bool,
        fee: u64,
    ) -> Result<Vec<Event>, PlinkoError> {
        self.require(public, Role::Admin)?;

        let mode = LightningMode { active, fee };
        self.insert(Key::LightningMode, Value::LightningMode(mode))
            .await?;

        info!(active, fee, "lightning mode updated");
        Ok(vec![Event::LightningModeUpdated { mode }])
    }

    pub(in crate::layer) async fn handle_set_game_grant(
        &mut self,
        public: &PublicKey,
        granted: bool,
    ) -> Result<Vec<Event>, PlinkoError> {
        self.require(public, Role::Admin)?;

        self.insert(Key::GameGrant, Value::GameGrant(granted))
            .await?;

        info!(granted, "game grant updated");
        Ok(vec![Event::GameGrantUpdated { granted }])
    }
}
