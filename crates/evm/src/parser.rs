//! Raw-log decoding. Origin contract is determined by address match, then
//! topic0 selects the event; decoding produces one variant of the closed
//! [`BurnEvent`] sum type, so the processor's dispatch is exhaustive by
//! construction. Addresses are normalized to lower-case hex and uint256
//! values to decimal strings (never floats: amounts go up to 2^256).

use alloy::{
    primitives::{Address, U256},
    rpc::types::Log,
    sol,
    sol_types::SolEvent,
};

use crate::error::ParserError;

sol! {
    #[derive(Debug)]
    contract XBurnMinter {
        event XENBurned(address indexed user, uint256 amount);
        event XBURNBurned(address indexed user, uint256 amount);
        event BurnNFTMinted(address indexed user, uint256 indexed tokenId, uint256 xenAmount, uint256 termDays);
        event XBURNClaimed(address indexed user, uint256 indexed tokenId, uint256 baseAmount, uint256 bonusAmount, uint256 totalAmount);
    }

    #[derive(Debug)]
    contract XBurnNFT {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        event LockBurned(uint256 indexed tokenId);
    }
}

pub const MINTER_EVENT_SIGNATURES: [&str; 4] = [
    XBurnMinter::XENBurned::SIGNATURE,
    XBurnMinter::XBURNBurned::SIGNATURE,
    XBurnMinter::BurnNFTMinted::SIGNATURE,
    XBurnMinter::XBURNClaimed::SIGNATURE,
];

pub const NFT_EVENT_SIGNATURES: [&str; 2] = [
    XBurnNFT::Transfer::SIGNATURE,
    XBurnNFT::LockBurned::SIGNATURE,
];

/// One decoded domain event. Everything the handlers touch is carried as
/// normalized strings; the handlers convert to column types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BurnEvent {
    XenBurned {
        user: String,
        amount: String,
        accumulated_amount: String,
        direct_burn_amount: String,
    },
    XburnBurned {
        user: String,
        amount: String,
    },
    LockCreated {
        user: String,
        token_id: String,
        xen_amount: String,
        term_days: i64,
    },
    LockClaimed {
        user: String,
        token_id: String,
        base_amount: String,
        bonus_amount: String,
        total_amount: String,
    },
    LockBurned {
        token_id: String,
    },
    Transferred {
        from: String,
        to: String,
        token_id: String,
    },
}

impl BurnEvent {
    /// Concrete type written back onto the raw event row.
    pub fn kind(&self) -> &'static str {
        match self {
            BurnEvent::XenBurned { .. } => "XENBurned",
            BurnEvent::XburnBurned { .. } => "XBURNBurned",
            BurnEvent::LockCreated { .. } => "BurnNFTMinted",
            BurnEvent::LockClaimed { .. } => "XBURNClaimed",
            BurnEvent::LockBurned { .. } => "LockBurned",
            BurnEvent::Transferred { .. } => "Transfer",
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventParser {
    minter: Address,
    nft: Address,
}

impl EventParser {
    pub fn new(minter: Address, nft: Address) -> Self {
        Self { minter, nft }
    }

    pub fn parse(&self, log: &Log) -> Result<BurnEvent, ParserError> {
        let address = log.address();
        let topic0 = *log.topic0().ok_or(ParserError::MissingTopic)?;

        if address == self.minter {
            match topic0 {
                XBurnMinter::XENBurned::SIGNATURE_HASH => {
                    let data = decode::<XBurnMinter::XENBurned>(log)?;
                    let (accumulated, direct) = split_burn_amount(data.amount);
                    Ok(BurnEvent::XenBurned {
                        user: lowercase_address(data.user),
                        amount: data.amount.to_string(),
                        accumulated_amount: accumulated.to_string(),
                        direct_burn_amount: direct.to_string(),
                    })
                }
                XBurnMinter::XBURNBurned::SIGNATURE_HASH => {
                    let data = decode::<XBurnMinter::XBURNBurned>(log)?;
                    Ok(BurnEvent::XburnBurned {
                        user: lowercase_address(data.user),
                        amount: data.amount.to_string(),
                    })
                }
                XBurnMinter::BurnNFTMinted::SIGNATURE_HASH => {
                    let data = decode::<XBurnMinter::BurnNFTMinted>(log)?;
                    let term_days = i64::try_from(data.termDays).map_err(|_| {
                        ParserError::NumberOverflow {
                            value: data.termDays.to_string(),
                        }
                    })?;
                    Ok(BurnEvent::LockCreated {
                        user: lowercase_address(data.user),
                        token_id: data.tokenId.to_string(),
                        xen_amount: data.xenAmount.to_string(),
                        term_days,
                    })
                }
                XBurnMinter::XBURNClaimed::SIGNATURE_HASH => {
                    let data = decode::<XBurnMinter::XBURNClaimed>(log)?;
                    Ok(BurnEvent::LockClaimed {
                        user: lowercase_address(data.user),
                        token_id: data.tokenId.to_string(),
                        base_amount: data.baseAmount.to_string(),
                        bonus_amount: data.bonusAmount.to_string(),
                        total_amount: data.totalAmount.to_string(),
                    })
                }
                signature => Err(ParserError::UnknownEvent { signature }),
            }
        } else if address == self.nft {
            match topic0 {
                XBurnNFT::Transfer::SIGNATURE_HASH => {
                    let data = decode::<XBurnNFT::Transfer>(log)?;
                    Ok(BurnEvent::Transferred {
                        from: lowercase_address(data.from),
                        to: lowercase_address(data.to),
                        token_id: data.tokenId.to_string(),
                    })
                }
                XBurnNFT::LockBurned::SIGNATURE_HASH => {
                    let data = decode::<XBurnNFT::LockBurned>(log)?;
                    Ok(BurnEvent::LockBurned {
                        token_id: data.tokenId.to_string(),
                    })
                }
                signature => Err(ParserError::UnknownEvent { signature }),
            }
        } else {
            Err(ParserError::UnknownAddress { address })
        }
    }
}

fn decode<T: SolEvent>(log: &Log) -> Result<T, ParserError> {
    let decoded = log.log_decode::<T>().map_err(|e| ParserError::DecodeError {
        event_type: T::SIGNATURE,
        source: Box::new(e),
    })?;
    Ok(decoded.inner.data)
}

pub fn lowercase_address(address: Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// 20% of a XEN burn accrues to the accumulation pool, the rest burns
/// directly. amount/5 == floor(amount*20/100), so the integer-division
/// remainder lands in the direct share.
pub fn split_burn_amount(amount: U256) -> (U256, U256) {
    let accumulated = amount / U256::from(5);
    let direct = amount - accumulated;
    (accumulated, direct)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256, Address, B256, LogData, U256};

    use super::*;

    const MINTER: Address = address!("0598dd8aCaBD947e2df48E1368779849D07f8483");
    const NFT: Address = address!("CB7d2A11d3271D2793E76C37Ad06ddEEb514C1fa");

    fn parser() -> EventParser {
        EventParser::new(MINTER, NFT)
    }

    fn make_log(address: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address,
                data: LogData::new_unchecked(topics, data.into()),
            },
            block_hash: None,
            block_number: Some(1_000),
            block_timestamp: None,
            transaction_hash: Some(b256!(
                "1111111111111111111111111111111111111111111111111111111111111111"
            )),
            transaction_index: Some(0),
            log_index: Some(3),
            removed: false,
        }
    }

    fn word(value: U256) -> B256 {
        B256::from(value.to_be_bytes::<32>())
    }

    #[test]
    fn decodes_xen_burned_with_amount_split() {
        let user = address!("00000000000000000000000000000000000000aB");
        let amount = U256::from(1_001u64);
        let log = make_log(
            MINTER,
            vec![XBurnMinter::XENBurned::SIGNATURE_HASH, user.into_word()],
            amount.to_be_bytes::<32>().to_vec(),
        );

        let event = parser().parse(&log).unwrap();
        assert_eq!(
            event,
            BurnEvent::XenBurned {
                user: "0x00000000000000000000000000000000000000ab".to_string(),
                amount: "1001".to_string(),
                accumulated_amount: "200".to_string(),
                direct_burn_amount: "801".to_string(),
            }
        );
        assert_eq!(event.kind(), "XENBurned");
    }

    #[test]
    fn decodes_mint_event() {
        let user = address!("1111111111111111111111111111111111111111");
        let token_id = U256::from(42u64);
        let mut data = U256::from(5_000u64).to_be_bytes::<32>().to_vec();
        data.extend_from_slice(&U256::from(7u64).to_be_bytes::<32>());

        let log = make_log(
            MINTER,
            vec![
                XBurnMinter::BurnNFTMinted::SIGNATURE_HASH,
                user.into_word(),
                word(token_id),
            ],
            data,
        );

        let event = parser().parse(&log).unwrap();
        assert_eq!(
            event,
            BurnEvent::LockCreated {
                user: "0x1111111111111111111111111111111111111111".to_string(),
                token_id: "42".to_string(),
                xen_amount: "5000".to_string(),
                term_days: 7,
            }
        );
    }

    #[test]
    fn decodes_claim_event() {
        let user = address!("2222222222222222222222222222222222222222");
        let token_id = U256::from(42u64);
        let mut data = U256::from(100u64).to_be_bytes::<32>().to_vec();
        data.extend_from_slice(&U256::from(10u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(110u64).to_be_bytes::<32>());

        let log = make_log(
            MINTER,
            vec![
                XBurnMinter::XBURNClaimed::SIGNATURE_HASH,
                user.into_word(),
                word(token_id),
            ],
            data,
        );

        let event = parser().parse(&log).unwrap();
        assert_eq!(
            event,
            BurnEvent::LockClaimed {
                user: "0x2222222222222222222222222222222222222222".to_string(),
                token_id: "42".to_string(),
                base_amount: "100".to_string(),
                bonus_amount: "10".to_string(),
                total_amount: "110".to_string(),
            }
        );
    }

    #[test]
    fn decodes_nft_transfer_and_lock_burned() {
        let from = address!("3333333333333333333333333333333333333333");
        let to = address!("4444444444444444444444444444444444444444");
        let token_id = U256::from(7u64);

        let transfer = make_log(
            NFT,
            vec![
                XBurnNFT::Transfer::SIGNATURE_HASH,
                from.into_word(),
                to.into_word(),
                word(token_id),
            ],
            Vec::new(),
        );
        assert_eq!(
            parser().parse(&transfer).unwrap(),
            BurnEvent::Transferred {
                from: "0x3333333333333333333333333333333333333333".to_string(),
                to: "0x4444444444444444444444444444444444444444".to_string(),
                token_id: "7".to_string(),
            }
        );

        let burned = make_log(
            NFT,
            vec![XBurnNFT::LockBurned::SIGNATURE_HASH, word(token_id)],
            Vec::new(),
        );
        assert_eq!(
            parser().parse(&burned).unwrap(),
            BurnEvent::LockBurned {
                token_id: "7".to_string(),
            }
        );
    }

    #[test]
    fn unknown_topic_and_address_are_rejected() {
        let stray_topic = b256!("deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef");
        let log = make_log(MINTER, vec![stray_topic], Vec::new());
        assert!(matches!(
            parser().parse(&log),
            Err(ParserError::UnknownEvent { .. })
        ));

        let other = address!("9999999999999999999999999999999999999999");
        let log = make_log(
            other,
            vec![XBurnMinter::XENBurned::SIGNATURE_HASH],
            Vec::new(),
        );
        assert!(matches!(
            parser().parse(&log),
            Err(ParserError::UnknownAddress { .. })
        ));
    }

    #[test]
    fn split_assigns_remainder_to_direct_share() {
        let cases = [
            (0u64, 0u64, 0u64),
            (3, 0, 3),
            (10, 2, 8),
            (1_001, 200, 801),
        ];
        for (amount, accumulated, direct) in cases {
            let (a, d) = split_burn_amount(U256::from(amount));
            assert_eq!(a, U256::from(accumulated), "amount {}", amount);
            assert_eq!(d, U256::from(direct), "amount {}", amount);
        }

        // Sum is preserved at the top of the range too.
        let (a, d) = split_burn_amount(U256::MAX);
        assert_eq!(a + d, U256::MAX);
    }
}
