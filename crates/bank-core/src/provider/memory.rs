//! An in-process ledger that answers like the deployed contract.
//!
//! Whitelisted symbols, per-account balances and ERC-20 allowances are kept
//! in memory. Every submission is recorded, including failed ones, and
//! faults can be injected to exercise rejection, revert and outage paths.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use chain_eth::abi::{self, AbiParam};
use chain_eth::erc20;
use chain_eth::ledger::{self, LedgerCall};
use chain_eth::symbol;
use tracing::debug;

use super::{CallRequest, ProviderError, TransactionRequest, WalletProvider};

/// A failure to inject. Faults persist until [`InMemoryLedger::clear_faults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The user declines the account-access prompt.
    DeclineAccounts,
    /// Every request fails as if the node were unreachable.
    Offline,
    /// The user declines to sign ERC-20 approvals.
    RejectApproval,
    /// ERC-20 approvals revert.
    RevertApproval,
    /// The user declines to sign transactions to the ledger.
    RejectLedgerTransaction,
    /// `getWhitelistedTokenAddress` for this symbol is unreachable.
    FailTokenLookup(String),
    /// `getTokenBalance` for this symbol is unreachable.
    FailBalanceQuery(String),
}

/// What a submitted transaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    /// Plain value transfer to the ledger.
    NativeTransfer,
    Approve { spender: Address, amount: U256 },
    Ledger(LedgerCall),
    Unknown,
}

/// One recorded `send_transaction` attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub kind: SubmissionKind,
    /// `None` when the attempt failed.
    pub hash: Option<B256>,
}

impl Submission {
    pub fn is_approve(&self) -> bool {
        matches!(self.kind, SubmissionKind::Approve { .. })
    }

    pub fn is_deposit(&self) -> bool {
        matches!(
            self.kind,
            SubmissionKind::NativeTransfer | SubmissionKind::Ledger(LedgerCall::DepositTokens { .. })
        )
    }

    pub fn is_withdraw(&self) -> bool {
        matches!(
            self.kind,
            SubmissionKind::Ledger(
                LedgerCall::WithdrawTokens { .. } | LedgerCall::WithdrawEther { .. }
            )
        )
    }
}

#[derive(Default)]
struct State {
    accounts: Vec<Address>,
    native_symbol: Option<String>,
    /// Whitelist in registration order.
    whitelist: Vec<(String, Address)>,
    balances: HashMap<(Address, String), U256>,
    allowances: HashMap<(Address, Address), U256>,
    faults: Vec<Fault>,
    calls: Vec<CallRequest>,
    submissions: Vec<Submission>,
    account_requests: usize,
    nonce: u64,
}

impl State {
    fn has(&self, fault: &Fault) -> bool {
        self.faults.contains(fault)
    }

    fn token_address(&self, symbol: &str) -> Option<Address> {
        self.whitelist
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, address)| *address)
    }

    fn is_token(&self, address: Address) -> bool {
        self.whitelist
            .iter()
            .any(|(s, a)| *a == address && Some(s) != self.native_symbol.as_ref())
    }

    fn balance(&self, account: Address, symbol: &str) -> U256 {
        self.balances
            .get(&(account, symbol.to_string()))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn credit(&mut self, account: Address, symbol: &str, amount: U256) -> Result<(), ProviderError> {
        let entry = self
            .balances
            .entry((account, symbol.to_string()))
            .or_insert(U256::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| ProviderError::Reverted("balance overflow".into()))?;
        Ok(())
    }

    fn debit(&mut self, account: Address, symbol: &str, amount: U256) -> Result<(), ProviderError> {
        let current = self.balance(account, symbol);
        if current < amount {
            return Err(ProviderError::Reverted("insufficient balance".into()));
        }
        self.balances
            .insert((account, symbol.to_string()), current - amount);
        Ok(())
    }

    fn native_symbol(&self) -> Result<String, ProviderError> {
        self.native_symbol
            .clone()
            .ok_or_else(|| ProviderError::Reverted("native currency not accepted".into()))
    }

    fn next_hash(&mut self) -> B256 {
        self.nonce += 1;
        keccak256(self.nonce.to_be_bytes())
    }
}

/// In-memory [`WalletProvider`] backed by a simulated ledger contract.
pub struct InMemoryLedger {
    ledger: Address,
    state: Mutex<State>,
}

impl InMemoryLedger {
    pub fn new(ledger: Address) -> Self {
        Self {
            ledger,
            state: Mutex::new(State::default()),
        }
    }

    /// Adds an account the wallet will expose on request.
    pub fn with_account(self, account: Address) -> Self {
        self.state().accounts.push(account);
        self
    }

    /// Whitelists the native currency under `symbol`.
    pub fn with_native(self, symbol: &str) -> Self {
        {
            let mut state = self.state();
            state.native_symbol = Some(symbol.to_string());
            let ledger = self.ledger;
            state.whitelist.push((symbol.to_string(), ledger));
        }
        self
    }

    /// Whitelists a token contract under `symbol`.
    pub fn with_token(self, symbol: &str, token: Address) -> Self {
        self.state().whitelist.push((symbol.to_string(), token));
        self
    }

    /// Sets an account's ledger balance, in smallest units.
    pub fn with_balance(self, account: Address, symbol: &str, amount: U256) -> Self {
        self.state()
            .balances
            .insert((account, symbol.to_string()), amount);
        self
    }

    pub fn inject(&self, fault: Fault) {
        self.state().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.state().faults.clear();
    }

    pub fn balance_of(&self, account: Address, symbol: &str) -> U256 {
        self.state().balance(account, symbol)
    }

    pub fn allowance(&self, owner: Address, token: Address) -> U256 {
        self.state()
            .allowances
            .get(&(owner, token))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Every view call received, in order.
    pub fn calls(&self) -> Vec<CallRequest> {
        self.state().calls.clone()
    }

    /// Every transaction attempt, in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    pub fn account_requests(&self) -> usize {
        self.state().account_requests
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, state: &State, request: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        if request.to != self.ledger {
            return Err(ProviderError::Reverted(format!(
                "no contract code at {}",
                request.to
            )));
        }
        let call = ledger::decode_call(&request.data)
            .map_err(|e| ProviderError::Reverted(e.to_string()))?
            .ok_or_else(|| ProviderError::Reverted("unrecognised selector".into()))?;

        match call {
            LedgerCall::GetWhitelistedSymbols => {
                let words = state
                    .whitelist
                    .iter()
                    .map(|(s, _)| symbol::encode_symbol(s))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
                Ok(abi::encode_bytes32_array(&words))
            }
            LedgerCall::GetWhitelistedTokenAddress { symbol } => {
                if state.has(&Fault::FailTokenLookup(symbol.clone())) {
                    return Err(ProviderError::Unavailable(format!(
                        "timeout looking up {symbol}"
                    )));
                }
                let address = state.token_address(&symbol).unwrap_or(Address::ZERO);
                Ok(abi::encode_word(&AbiParam::Address(address)))
            }
            LedgerCall::GetTokenBalance { symbol } => {
                if state.has(&Fault::FailBalanceQuery(symbol.clone())) {
                    return Err(ProviderError::Unavailable(format!(
                        "timeout reading {symbol} balance"
                    )));
                }
                let caller = request.from.unwrap_or(Address::ZERO);
                Ok(abi::encode_word(&AbiParam::Uint256(
                    state.balance(caller, &symbol),
                )))
            }
            // Simulated state changes return nothing.
            _ => Ok(Vec::new()),
        }
    }

    fn classify(&self, state: &State, tx: &TransactionRequest) -> SubmissionKind {
        if tx.to == self.ledger {
            if tx.data.is_empty() {
                return SubmissionKind::NativeTransfer;
            }
            return match ledger::decode_call(&tx.data) {
                Ok(Some(call)) => SubmissionKind::Ledger(call),
                _ => SubmissionKind::Unknown,
            };
        }
        if state.is_token(tx.to) {
            if let Ok(Some((spender, amount))) = erc20::decode_approve(&tx.data) {
                return SubmissionKind::Approve { spender, amount };
            }
        }
        SubmissionKind::Unknown
    }

    fn execute(
        &self,
        state: &mut State,
        tx: &TransactionRequest,
        kind: &SubmissionKind,
    ) -> Result<B256, ProviderError> {
        if !state.accounts.contains(&tx.from) {
            return Err(ProviderError::Rejected(format!(
                "account {} is not available",
                tx.from
            )));
        }

        match kind {
            SubmissionKind::Unknown => {
                return Err(ProviderError::Reverted("unrecognised transaction".into()))
            }
            SubmissionKind::Approve { .. } if state.has(&Fault::RejectApproval) => {
                return Err(ProviderError::Rejected("user denied approval".into()))
            }
            SubmissionKind::Approve { .. } if state.has(&Fault::RevertApproval) => {
                return Err(ProviderError::Reverted("approve failed".into()))
            }
            SubmissionKind::NativeTransfer | SubmissionKind::Ledger(_)
                if state.has(&Fault::RejectLedgerTransaction) =>
            {
                return Err(ProviderError::Rejected("user denied transaction".into()))
            }
            _ => {}
        }

        match kind {
            SubmissionKind::NativeTransfer => {
                let native = state.native_symbol()?;
                state.credit(tx.from, &native, tx.value)?;
            }
            SubmissionKind::Approve { spender, amount } => {
                if *spender != self.ledger {
                    debug!(%spender, "approval for a spender other than the ledger");
                }
                state.allowances.insert((tx.from, tx.to), *amount);
            }
            SubmissionKind::Ledger(LedgerCall::DepositTokens { amount, symbol }) => {
                let token = state
                    .token_address(symbol)
                    .ok_or_else(|| ProviderError::Reverted(format!("{symbol} is not whitelisted")))?;
                let allowance = state
                    .allowances
                    .get(&(tx.from, token))
                    .copied()
                    .unwrap_or(U256::ZERO);
                if allowance < *amount {
                    return Err(ProviderError::Reverted("insufficient allowance".into()));
                }
                state.allowances.insert((tx.from, token), allowance - *amount);
                state.credit(tx.from, symbol, *amount)?;
            }
            SubmissionKind::Ledger(LedgerCall::WithdrawTokens { amount, symbol }) => {
                state.debit(tx.from, symbol, *amount)?;
            }
            SubmissionKind::Ledger(LedgerCall::WithdrawEther { amount }) => {
                let native = state.native_symbol()?;
                state.debit(tx.from, &native, *amount)?;
            }
            SubmissionKind::Ledger(_) | SubmissionKind::Unknown => {}
        }

        Ok(state.next_hash())
    }
}

#[async_trait]
impl WalletProvider for InMemoryLedger {
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, ProviderError> {
        let mut state = self.state();
        state.calls.push(request.clone());
        if state.has(&Fault::Offline) {
            return Err(ProviderError::Unavailable("ledger node offline".into()));
        }
        self.answer(&state, &request)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut state = self.state();
        state.account_requests += 1;
        if state.has(&Fault::Offline) {
            return Err(ProviderError::Unavailable("ledger node offline".into()));
        }
        if state.has(&Fault::DeclineAccounts) {
            return Err(ProviderError::Rejected("user rejected the request".into()));
        }
        Ok(state.accounts.clone())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, ProviderError> {
        let mut state = self.state();
        let kind = self.classify(&state, &tx);

        let outcome = if state.has(&Fault::Offline) {
            Err(ProviderError::Unavailable("ledger node offline".into()))
        } else {
            self.execute(&mut state, &tx, &kind)
        };

        debug!(to = %tx.to, ?kind, ok = outcome.is_ok(), "in-memory submission");
        state.submissions.push(Submission {
            from: tx.from,
            to: tx.to,
            value: tx.value,
            kind,
            hash: outcome.as_ref().ok().copied(),
        });
        outcome
    }
}
