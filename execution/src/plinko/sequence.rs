use super::path::{drop_ball, Path};
use crate::error::PlinkoError;
use plinko_types::plinko::{MultiplierTable, PlayRequest, RandomWord, MULTIPLIER_SCALE};

/// Result of a single ball within a play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BetOutcome {
    pub path: Path,
    pub multiplier: u32,
    /// `wager * multiplier / MULTIPLIER_SCALE`
    pub payout: u64,
    pub lightning: bool,
    /// Running `payouts - wagers` after this bet.
    pub net: i128,
}

/// Bets actually played for a request, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sequence {
    pub outcomes: Vec<BetOutcome>,
    pub total_wager: u64,
    pub total_payout: u64,
}

impl Sequence {
    pub fn games_played(&self) -> u32 {
        self.outcomes.len() as u32
    }

    /// Net result for the player (positive when the player is up).
    pub fn net(&self) -> i128 {
        self.total_payout as i128 - self.total_wager as i128
    }

    pub fn paths(&self) -> Vec<u16> {
        self.outcomes.iter().map(|o| o.path.bits).collect()
    }

    pub fn payouts(&self) -> Vec<u64> {
        self.outcomes.iter().map(|o| o.payout).collect()
    }

    pub fn lightning(&self) -> Vec<bool> {
        self.outcomes.iter().map(|o| o.lightning).collect()
    }
}

fn stop_reached(net: i128, stop_gain: u64, stop_loss: u64) -> bool {
    (stop_gain > 0 && net >= stop_gain as i128) || (stop_loss > 0 && net <= -(stop_loss as i128))
}

/// Replays the bets of a request against the oracle's words.
///
/// Word `i` drives bet `i`. Play stops early once the running net reaches `stop_gain` or falls
/// to `-stop_loss` (zero disables either limit); remaining words are ignored.
pub fn play_sequence(
    request: &PlayRequest,
    table: &MultiplierTable,
    words: &[RandomWord],
) -> Result<Sequence, PlinkoError> {
    if words.len() != request.num_bets as usize {
        return Err(PlinkoError::WordCountMismatch {
            expected: request.num_bets,
            got: words.len() as u32,
        });
    }
    let multipliers =
        table
            .get(request.risk, request.rows)
            .ok_or(PlinkoError::MultipliersNotConfigured {
                risk: request.risk,
                rows: request.rows,
            })?;

    let mut sequence = Sequence::default();
    let mut net: i128 = 0;
    for word in words {
        let path = drop_ball(word, request.rows);
        let multiplier = *multipliers.get(path.bucket as usize).ok_or(
            PlinkoError::MultipliersNotConfigured {
                risk: request.risk,
                rows: request.rows,
            },
        )?;
        let payout = u64::try_from(
            request.wager as u128 * multiplier as u128 / MULTIPLIER_SCALE as u128,
        )
        .map_err(|_| PlinkoError::ArithmeticOverflow)?;

        sequence.total_wager = sequence
            .total_wager
            .checked_add(request.wager)
            .ok_or(PlinkoError::ArithmeticOverflow)?;
        sequence.total_payout = sequence
            .total_payout
            .checked_add(payout)
            .ok_or(PlinkoError::ArithmeticOverflow)?;
        net += payout as i128 - request.wager as i128;
        sequence.outcomes.push(BetOutcome {
            path,
            multiplier,
            payout,
            lightning: request.lightning,
            net,
        });

        if stop_reached(net, request.stop_gain, request.stop_loss) {
            break;
        }
    }

    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, sha256::Sha256, Hasher, Signer};
    use commonware_math::algebra::Random;
    use plinko_types::plinko::{Asset, PlayStatus, NATIVE_UNIT, WORD_SIZE};
    use rand::{rngs::StdRng, SeedableRng};

    const WAGER: u64 = NATIVE_UNIT / 20;

    fn request(num_bets: u32, stop_gain: u64, stop_loss: u64) -> PlayRequest {
        let mut rng = StdRng::seed_from_u64(7);
        PlayRequest {
            id: Sha256::hash(b"sequence"),
            player: PrivateKey::random(&mut rng).public_key(),
            asset: Asset::Native,
            wager: WAGER,
            rows: 16,
            risk: 1,
            num_bets,
            stop_gain,
            stop_loss,
            lightning: false,
            lightning_fee: 0,
            escrow: WAGER * num_bets as u64,
            reserved: 0,
            created: 0,
            status: PlayStatus::Pending,
        }
    }

    fn word_with_low(low: u16) -> RandomWord {
        let mut bytes = [0xAB; WORD_SIZE];
        bytes[WORD_SIZE - 2..].copy_from_slice(&low.to_be_bytes());
        RandomWord(bytes)
    }

    #[test]
    fn test_plays_every_word_without_limits() {
        let words = vec![word_with_low(0x00FF); 5];
        let sequence = play_sequence(
            &request(5, 0, 0),
            &MultiplierTable::standard(),
            &words,
        )
        .unwrap();
        assert_eq!(sequence.games_played(), 5);
        // Bucket 8 of risk 1 / 16 rows pays 20 bps.
        assert!(sequence.outcomes.iter().all(|o| o.multiplier == 20));
        assert_eq!(sequence.total_payout, 5 * (WAGER * 20 / 10_000));
        assert_eq!(sequence.total_wager, 5 * WAGER);
        assert_eq!(sequence.net(), sequence.outcomes[4].net);
    }

    #[test]
    fn test_stop_gain_after_two() {
        // Two edge buckets (5.2x each) net 8.4 wagers.
        let words = vec![word_with_low(0xFFFF); 13];
        let sequence = play_sequence(
            &request(13, 8 * WAGER, 0),
            &MultiplierTable::standard(),
            &words,
        )
        .unwrap();
        assert_eq!(sequence.games_played(), 2);
        assert_eq!(sequence.outcomes[0].multiplier, 52_000);
        assert_eq!(sequence.total_payout, 2 * WAGER * 52_000 / 10_000);
        assert!(sequence.net() >= 8 * WAGER as i128);
    }

    #[test]
    fn test_stop_loss() {
        // Each center bucket loses 0.998 wagers; 2.5 wagers of loss is crossed on bet 3.
        let words = vec![word_with_low(0x00FF); 13];
        let sequence = play_sequence(
            &request(13, 0, 5 * WAGER / 2),
            &MultiplierTable::standard(),
            &words,
        )
        .unwrap();
        assert_eq!(sequence.games_played(), 3);
        assert!(sequence.net() <= -(5 * WAGER as i128 / 2));
    }

    #[test]
    fn test_word_count_mismatch() {
        let words = vec![word_with_low(0); 2];
        assert!(matches!(
            play_sequence(&request(3, 0, 0), &MultiplierTable::standard(), &words),
            Err(PlinkoError::WordCountMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_unconfigured_slot() {
        let words = vec![word_with_low(0); 1];
        assert!(matches!(
            play_sequence(&request(1, 0, 0), &MultiplierTable::new(), &words),
            Err(PlinkoError::MultipliersNotConfigured { .. })
        ));
    }
}
