//! In-memory chain used by unit tests.
//!
//! Answers the factory, pair and ERC20 calls the discovery engine makes and
//! records every transaction that reaches `send_transaction`.

use super::ChainClient;
use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair, IERC20};
use crate::error::{HarvestError, HarvestResult};
use crate::types::{SubmittedTx, TxRequest};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FACTORY: Address = Address::repeat_byte(0xfa);
pub const WRAPPED_NATIVE: Address = Address::repeat_byte(0xee);
pub const SENDER: Address = Address::repeat_byte(0x5e);

#[derive(Debug, Clone)]
pub struct MockPair {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub balance0: U256,
    pub balance1: U256,
    /// getReserves() reverts for this pair
    pub broken: bool,
}

impl MockPair {
    /// Pair of (other token, wrapped native) with `surplus_wei` extra native balance
    pub fn with_native_surplus(index: u8, surplus_wei: u128) -> Self {
        let reserve = U256::from(1_000_000_000_000_000_000u128);
        Self {
            address: Address::with_last_byte(index),
            token0: Address::repeat_byte(0x70),
            token1: WRAPPED_NATIVE,
            reserve0: reserve,
            reserve1: reserve,
            balance0: reserve,
            balance1: reserve + U256::from(surplus_wei),
            broken: false,
        }
    }

    pub fn balanced(index: u8) -> Self {
        Self::with_native_surplus(index, 0)
    }
}

pub struct MockChain {
    pub pairs: Vec<MockPair>,
    /// `None` makes gas price reads fail
    pub gas_price: Option<u128>,
    pub fail_enumeration: bool,
    /// `allPairs(i)` fails for this index only
    pub fail_pair_at: Option<usize>,
    pub fail_send: bool,
    pub signer: Option<Address>,
    pub sent: Mutex<Vec<TxRequest>>,
    pub reserve_reads: AtomicUsize,
    gas_price_reads: AtomicUsize,
}

impl MockChain {
    pub fn new(pairs: Vec<MockPair>) -> Self {
        Self {
            pairs,
            gas_price: Some(5_000_000_000),
            fail_enumeration: false,
            fail_pair_at: None,
            fail_send: false,
            signer: Some(SENDER),
            sent: Mutex::new(Vec::new()),
            reserve_reads: AtomicUsize::new(0),
            gas_price_reads: AtomicUsize::new(0),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn gas_price_reads(&self) -> usize {
        self.gas_price_reads.load(Ordering::SeqCst)
    }

    pub fn reserve_reads(&self) -> usize {
        self.reserve_reads.load(Ordering::SeqCst)
    }

    fn pair(&self, address: Address) -> Option<&MockPair> {
        self.pairs.iter().find(|p| p.address == address)
    }

    fn answer_factory(&self, data: &[u8]) -> HarvestResult<Vec<u8>> {
        if self.fail_enumeration {
            return Err(HarvestError::Provider("factory unavailable".to_string()));
        }
        if data.starts_with(&IUniswapV2Factory::allPairsLengthCall::SELECTOR) {
            return Ok(U256::from(self.pairs.len()).abi_encode());
        }
        if data.starts_with(&IUniswapV2Factory::allPairsCall::SELECTOR) {
            let call = IUniswapV2Factory::allPairsCall::abi_decode(data)
                .map_err(HarvestError::provider)?;
            let index: usize = call.index.to();
            if self.fail_pair_at == Some(index) {
                return Err(HarvestError::Provider("allPairs: header not found".to_string()));
            }
            return self
                .pairs
                .get(index)
                .map(|p| p.address.abi_encode())
                .ok_or_else(|| HarvestError::Provider("allPairs: index out of range".to_string()));
        }
        Err(HarvestError::Provider("unknown factory call".to_string()))
    }

    fn answer_pair(&self, pair: &MockPair, data: &[u8]) -> HarvestResult<Vec<u8>> {
        if data.starts_with(&IUniswapV2Pair::token0Call::SELECTOR) {
            return Ok(pair.token0.abi_encode());
        }
        if data.starts_with(&IUniswapV2Pair::token1Call::SELECTOR) {
            return Ok(pair.token1.abi_encode());
        }
        if data.starts_with(&IUniswapV2Pair::getReservesCall::SELECTOR) {
            self.reserve_reads.fetch_add(1, Ordering::SeqCst);
            if pair.broken {
                return Err(HarvestError::Provider("execution reverted".to_string()));
            }
            return Ok((pair.reserve0, pair.reserve1, U256::ZERO).abi_encode());
        }
        Err(HarvestError::Provider("unknown pair call".to_string()))
    }

    fn answer_token(&self, token: Address, data: &[u8]) -> HarvestResult<Vec<u8>> {
        if !data.starts_with(&IERC20::balanceOfCall::SELECTOR) {
            return Err(HarvestError::Provider("unknown token call".to_string()));
        }
        let call = IERC20::balanceOfCall::abi_decode(data).map_err(HarvestError::provider)?;
        let pair = self
            .pair(call.account)
            .ok_or_else(|| HarvestError::Provider("balanceOf: unknown holder".to_string()))?;
        let balance = if pair.token0 == token {
            pair.balance0
        } else if pair.token1 == token {
            pair.balance1
        } else {
            U256::ZERO
        };
        Ok(balance.abi_encode())
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_latest_block(&self) -> HarvestResult<u64> {
        Ok(1_000)
    }

    async fn get_balance(&self, _address: Address) -> HarvestResult<U256> {
        Ok(U256::ZERO)
    }

    async fn get_gas_price(&self) -> HarvestResult<u128> {
        self.gas_price_reads.fetch_add(1, Ordering::SeqCst);
        self.gas_price
            .ok_or_else(|| HarvestError::Provider("gas price unavailable".to_string()))
    }

    async fn call(&self, to: Address, data: Bytes) -> HarvestResult<Bytes> {
        let encoded = if to == FACTORY {
            self.answer_factory(&data)?
        } else if let Some(pair) = self.pair(to) {
            self.answer_pair(pair, &data)?
        } else {
            self.answer_token(to, &data)?
        };
        Ok(Bytes::from(encoded))
    }

    async fn send_transaction(&self, request: TxRequest) -> HarvestResult<SubmittedTx> {
        if self.fail_send {
            return Err(HarvestError::Provider("nonce too low".to_string()));
        }
        self.sent.lock().unwrap().push(request);
        Ok(SubmittedTx {
            hash: B256::repeat_byte(0xab),
            dry_run: false,
        })
    }

    fn sender(&self) -> Option<Address> {
        self.signer
    }
}
