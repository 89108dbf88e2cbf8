use super::*;
use commonware_codec::{Encode, EncodeSize, ReadExt, Write};
use commonware_cryptography::{ed25519::PrivateKey, sha256::Sha256, Hasher, Signer};
use commonware_math::algebra::Random;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_standard_table_shape() {
    let table = MultiplierTable::standard();
    for risk in 0..RISK_TIERS {
        for rows in MIN_ROWS..=MAX_ROWS {
            let values = table.get(risk, rows).expect("standard slot configured");
            assert_eq!(values.len(), rows as usize + 1);
            assert!(values.iter().all(|m| *m > 0));
            assert!(table.is_symmetric(risk, rows), "risk={risk} rows={rows}");
        }
    }
    assert_eq!(table.max_multiplier(1, 16), Some(52_000));
    assert_eq!(table.multiplier(2, 8, 4), Some(10));
}

#[test]
fn test_empty_table_is_unconfigured() {
    let table = MultiplierTable::new();
    assert!(!table.is_configured(0, 8));
    assert_eq!(table.max_multiplier(0, 8), None);
    assert_eq!(table.tiers().len(), RISK_TIERS as usize);
    assert!(table.tiers().iter().all(|tier| tier.len() == ROW_COUNTS));
}

#[test]
fn test_set_rejects_bad_slots() {
    let mut table = MultiplierTable::new();
    assert_eq!(
        table.set(0, 7, vec![1; 8]),
        Err(TableError::InvalidRows { got: 7 })
    );
    assert_eq!(
        table.set(3, 8, vec![1; 9]),
        Err(TableError::InvalidRisk { got: 3 })
    );
    assert_eq!(
        table.set(0, 8, vec![1; 8]),
        Err(TableError::InvalidLength {
            rows: 8,
            expected: 9,
            got: 8
        })
    );
    assert!(!table.is_configured(0, 8));
}

#[test]
fn test_asymmetric_rows_accepted() {
    let mut table = MultiplierTable::new();
    table.set(0, 8, (1..=9).collect()).unwrap();
    assert!(!table.is_symmetric(0, 8));
    assert_eq!(table.multiplier(0, 8, 8), Some(9));
    assert_eq!(table.multiplier(0, 8, 9), None);
}

#[test]
fn test_multiplier_table_codec() {
    let mut table = MultiplierTable::new();
    table.set(1, 12, vec![7; 13]).unwrap();
    let encoded = table.encode();
    assert_eq!(encoded.len(), table.encode_size());
    let decoded = MultiplierTable::read(&mut &encoded[..]).unwrap();
    assert_eq!(decoded, table);

    let standard = MultiplierTable::standard();
    let decoded = MultiplierTable::read(&mut standard.encode().as_ref()).unwrap();
    assert_eq!(decoded, standard);
}

#[test]
fn test_multiplier_table_rejects_wrong_length_on_decode() {
    // First slot (risk 0, rows 8) claims 3 entries.
    let mut buf = Vec::new();
    vec![1u32, 2, 3].write(&mut buf);
    for _ in 1..(RISK_TIERS as usize * ROW_COUNTS) {
        Vec::<u32>::new().write(&mut buf);
    }
    let err = MultiplierTable::read(&mut buf.as_slice()).unwrap_err();
    assert!(matches!(err, commonware_codec::Error::Invalid("MultiplierTable", _)));
}

#[test]
fn test_multiplier_table_nested_conversion() {
    let nested: Vec<Vec<Vec<u32>>> = MultiplierTable::standard().into();
    let parsed = MultiplierTable::try_from(nested).unwrap();
    assert_eq!(parsed, MultiplierTable::standard());

    let shape = vec![vec![Vec::<u32>::new(); ROW_COUNTS]; 2];
    assert!(matches!(
        MultiplierTable::try_from(shape),
        Err(TableError::InvalidShape { risks: 2, .. })
    ));

    let mut bad = vec![vec![Vec::<u32>::new(); ROW_COUNTS]; RISK_TIERS as usize];
    bad[0][0] = vec![1, 2];
    assert!(matches!(
        MultiplierTable::try_from(bad),
        Err(TableError::InvalidLength { rows: 8, .. })
    ));
}

#[test]
fn test_asset_roundtrip() {
    for asset in [Asset::Native, Asset::Token([0xAB; TOKEN_ADDRESS_LEN])] {
        let encoded = asset.encode();
        assert_eq!(encoded.len(), asset.encode_size());
        assert_eq!(Asset::read(&mut &encoded[..]).unwrap(), asset);
    }
    assert!(matches!(
        Asset::read(&mut [9u8].as_slice()),
        Err(commonware_codec::Error::InvalidEnum(9))
    ));
}

#[test]
fn test_random_word_low_bits() {
    let mut bytes = [0u8; WORD_SIZE];
    bytes[30] = 0xcf;
    bytes[31] = 0x6d;
    assert_eq!(RandomWord(bytes).low_u16(), 0xcf6d);
}

#[test]
fn test_lightning_mode_defaults() {
    let mode = LightningMode::default();
    assert!(!mode.active);
    assert_eq!(mode.fee, NATIVE_UNIT / 100);
    assert_eq!(mode.charge(), 0);
    let active = LightningMode {
        active: true,
        ..mode
    };
    assert_eq!(active.charge(), DEFAULT_LIGHTNING_FEE);
}

#[test]
fn test_bankroll_available() {
    let bankroll = Bankroll {
        balance: 100,
        reserved: 30,
    };
    assert_eq!(bankroll.available(), 70);
    let over = Bankroll {
        balance: 10,
        reserved: 30,
    };
    assert_eq!(over.available(), 0);
}

#[test]
fn test_play_request_roundtrip() {
    let mut rng = StdRng::seed_from_u64(1);
    let player = PrivateKey::random(&mut rng).public_key();
    let request = PlayRequest {
        id: Sha256::hash(b"request"),
        player,
        asset: Asset::Token([3; TOKEN_ADDRESS_LEN]),
        wager: 50_000_000,
        rows: 16,
        risk: 1,
        num_bets: 13,
        stop_gain: 1_000 * NATIVE_UNIT,
        stop_loss: 1_000 * NATIVE_UNIT,
        lightning: true,
        lightning_fee: DEFAULT_LIGHTNING_FEE,
        escrow: 650_000_000,
        reserved: 3_380_000_000,
        created: 42,
        status: PlayStatus::Pending,
    };
    let encoded = request.encode();
    assert_eq!(encoded.len(), request.encode_size());
    let decoded = PlayRequest::read(&mut &encoded[..]).unwrap();
    assert_eq!(decoded, request);
    assert!(decoded.is_pending());
}

proptest! {
    /// Any slot written with a well-formed row reads back exactly.
    #[test]
    fn prop_set_get_roundtrip(
        risk in 0u8..RISK_TIERS,
        rows in MIN_ROWS..=MAX_ROWS,
        seed in prop::collection::vec(1u32..=1_000_000, MAX_BUCKETS),
    ) {
        let mut table = MultiplierTable::standard();
        let values = seed[..rows as usize + 1].to_vec();
        table.set(risk, rows, values.clone()).unwrap();
        prop_assert_eq!(table.get(risk, rows), Some(values.as_slice()));
        prop_assert_eq!(
            &table.tiers()[risk as usize][(rows - MIN_ROWS) as usize],
            &values
        );
    }
}
