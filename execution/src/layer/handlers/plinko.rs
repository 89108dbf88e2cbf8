use super::super::*;
use crate::config::Role;
use crate::ledger::{credit_wallet, debit_wallet, load_bankroll, BankrollLedger};
use crate::oracle::request_id;
use crate::plinko::{play_sequence, validate_play};
use crate::query;
use plinko_types::plinko::{Asset, PlayRequest, PlayStatus, RandomWord};
use tracing::info;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_play(
        &mut self,
        public: &PublicKey,
        nonce: u64,
        params: PlayParams,
    ) -> Result<Vec<Event>, PlinkoError> {
        let table = query::get_multipliers(self).await?;
        let available = self.available_balance(&params.asset).await?;
        let exposure = validate_play(&params, &table, available, self.config.max_exposure_bps)?;

        if query::pending_play(self, public).await?.is_some() {
            return Err(PlinkoError::AwaitingRandomness);
        }

        // Escrow every ball up front; unplayed balls come back on fulfillment.
        let escrow = params
            .wager
            .checked_mul(params.num_bets as u64)
            .ok_or(PlinkoError::ArithmeticOverflow)?;
        debit_wallet(self, public, &params.asset, escrow).await?;

        let lightning = query::lightning_mode(self).await?;
        let fee = lightning.charge();
        if fee > 0 {
            debit_wallet(self, public, &Asset::Native, fee).await?;
            let mut bankroll = load_bankroll(self, &Asset::Native).await?;
            bankroll.balance = bankroll
                .balance
                .checked_add(fee)
                .ok_or(PlinkoError::ArithmeticOverflow)?;
            self.insert(Key::Bankroll(Asset::Native), Value::Bankroll(bankroll))
                .await?;
        }

        self.reserve(&params.asset, exposure.worst_case).await?;

        let sequence = query::request_sequence(self).await?;
        let id = request_id(&self.namespace, public, nonce, sequence);
        self.insert(
            Key::RequestSequence,
            Value::RequestSequence(sequence.saturating_add(1)),
        )
        .await?;

        let request = PlayRequest {
            id,
            player: public.clone(),
            asset: params.asset,
            wager: params.wager,
            rows: params.rows,
            risk: params.risk,
            num_bets: params.num_bets,
            stop_gain: params.stop_gain,
            stop_loss: params.stop_loss,
            lightning: lightning.active,
            lightning_fee: fee,
            escrow,
            reserved: exposure.worst_case,
            created: self.view,
            status: PlayStatus::Pending,
        };
        self.insert(Key::PlayRequest(id), Value::PlayRequest(request))
            .await?;
        self.insert(Key::PendingPlay(public.clone()), Value::PendingPlay(id))
            .await?;

        debug!(
            ?id,
            player = ?public,
            wager = params.wager,
            num_bets = params.num_bets,
            reserved = exposure.worst_case,
            "play accepted"
        );

        Ok(vec![
            Event::PlayAccepted {
                id,
                player: public.clone(),
                wager: params.wager,
                asset: params.asset,
                rows: params.rows,
                risk: params.risk,
                num_bets: params.num_bets,
                stop_gain: params.stop_gain,
                stop_loss: params.stop_loss,
                lightning: lightning.active,
            },
            Event::RandomnessRequested {
                id,
                num_words: params.num_bets,
            },
        ])
    }

    async fn pending_request(&self, id: &RequestId) -> Result<PlayRequest, PlinkoError> {
        let request = query::play_request(self, id)
            .await?
            .ok_or(PlinkoError::RequestNotFound)?;
        if !request.is_pending() {
            return Err(PlinkoError::RequestNotPending);
        }
        Ok(request)
    }

    pub(in crate::layer) async fn handle_fulfill(
        &mut self,
        public: &PublicKey,
        id: &RequestId,
        words: &[RandomWord],
    ) -> Result<Vec<Event>, PlinkoError> {
        self.require(public, Role::Oracle)?;
        let mut request = self.pending_request(id).await?;

        let table = query::get_multipliers(self).await?;
        let sequence = play_sequence(&request, &table, words)?;

        self.release(&request.asset, request.reserved).await?;
        credit_wallet(self, &request.player, &request.asset, request.escrow).await?;
        self.settle(&request.asset, &request.player, sequence.net())
            .await?;

        request.status = PlayStatus::Fulfilled;
        self.insert(Key::PlayRequest(*id), Value::PlayRequest(request.clone()))
            .await?;
        self.delete(&Key::PendingPlay(request.player.clone()))
            .await?;

        info!(
            ?id,
            player = ?request.player,
            games = sequence.games_played(),
            total_wager = sequence.total_wager,
            total_payout = sequence.total_payout,
            "play settled"
        );

        Ok(vec![Event::PlayOutcome {
            id: *id,
            player: request.player,
            total_wager: sequence.total_wager,
            total_payout: sequence.total_payout,
            asset: request.asset,
            paths: sequence.paths(),
            lightning: sequence.lightning(),
            rows: request.rows,
            risk: request.risk,
            payouts: sequence.payouts(),
            games_played: sequence.games_played(),
        }])
    }

    pub(in crate::layer) async fn handle_refund(
        &mut self,
        public: &PublicKey,
        id: &RequestId,
    ) -> Result<Vec<Event>, PlinkoError> {
        let request = self.pending_request(id).await?;

        let admin = self.config.has_capability(public, Role::Admin);
        if !admin {
            if public != &request.player {
                return Err(PlinkoError::Unauthorized(Role::Admin.name()));
            }
            let available_at = request
                .created
                .saturating_add(self.config.refund_delay_views);
            if self.view < available_at {
                return Err(PlinkoError::RefundTooEarly { available_at });
            }
        }

        self.release(&request.asset, request.reserved).await?;
        credit_wallet(self, &request.player, &request.asset, request.escrow).await?;
        self.delete(&Key::PlayRequest(*id)).await?;
        self.delete(&Key::PendingPlay(request.player.clone()))
            .await?;

        info!(?id, player = ?request.player, admin, "play refunded");

        Ok(vec![Event::PlayRefunded {
            id: *id,
            player: request.player,
            asset: request.asset,
            amount: request.escrow,
        }])
    }
}
