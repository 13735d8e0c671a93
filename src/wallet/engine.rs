//! Authorization and dispatch engine
//!
//! Every privileged entry point runs the same sequence: take the reentrancy
//! lock, check the caller against the owner, validate funds, forward exactly
//! one call through the host, then emit the audit event. Any failure returns
//! before the event is emitted, and the host discards the call's effects.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, info, warn};

use crate::abi::IERC20;

use super::error::WalletError;
use super::guard::ReentrancyLock;
use super::host::{ExternalCallRequest, WalletHost};
use super::types::{OwnerConfig, WalletEvent};

/// Single-owner custodial wallet engine
#[derive(Debug)]
pub struct WalletEngine {
    config: OwnerConfig,
    lock: ReentrancyLock,
}

impl WalletEngine {
    /// Create an engine controlled by `config.owner` for its whole lifetime
    pub fn new(config: OwnerConfig) -> Self {
        Self {
            config,
            lock: ReentrancyLock::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub fn config(&self) -> &OwnerConfig {
        &self.config
    }

    /// Check whether a privileged call is currently running
    pub fn is_busy(&self) -> bool {
        self.lock.is_entered()
    }

    /// Accept an inbound value transfer.
    ///
    /// Open to anyone. The host has already credited `amount` to the wallet.
    pub fn receive(&self, host: &dyn WalletHost, amount: U256) {
        debug!(
            "Deposit of {} wei from {} (balance now {} wei)",
            amount,
            host.caller(),
            host.self_balance()
        );
    }

    /// Send native currency from the wallet
    ///
    /// # Arguments
    /// * `recipient` - Destination account, may be the owner itself
    /// * `amount` - Amount in wei
    ///
    /// # Returns
    /// The emitted audit event
    pub fn transfer_native(
        &self,
        host: &mut dyn WalletHost,
        recipient: Address,
        amount: U256,
    ) -> Result<WalletEvent, WalletError> {
        let _guard = self.lock.enter()?;
        self.authorize(host.caller())?;

        if recipient == Address::ZERO {
            return Err(WalletError::ZeroAddress);
        }
        ensure_funds(host, amount)?;

        debug!("Transferring {} wei to {}", amount, recipient);

        host.invoke(ExternalCallRequest::value_transfer(recipient, amount))
            .map_err(|e| {
                warn!("Recipient {} refused {} wei: {}", recipient, amount, e);
                WalletError::TransferRejected {
                    recipient,
                    amount,
                    reason: e.revert_data(),
                }
            })?;

        let event = WalletEvent::NativeTransferred { recipient, amount };
        info!("Transfer complete: {} wei to {}", amount, recipient);
        host.emit(event.clone());
        Ok(event)
    }

    /// Move tokens held by the wallet through the token's `transfer`
    ///
    /// The wallet's token balance is not pre-checked; the token is expected to
    /// reject transfers it cannot cover.
    pub fn transfer_token(
        &self,
        host: &mut dyn WalletHost,
        token: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<WalletEvent, WalletError> {
        let _guard = self.lock.enter()?;
        self.authorize(host.caller())?;

        if token == Address::ZERO {
            return Err(WalletError::ZeroAddress);
        }

        debug!(
            "Forwarding transfer of {} units of {} to {}",
            amount, token, recipient
        );

        let payload = IERC20::transferCall {
            to: recipient,
            amount,
        }
        .abi_encode();

        let returned = host
            .invoke(ExternalCallRequest::new(token, U256::ZERO, payload.into()))
            .map_err(|e| {
                warn!("Token {} rejected transfer: {}", token, e);
                WalletError::ExternalCallFailed {
                    target: token,
                    reason: e.revert_data(),
                }
            })?;

        // Tokens that return nothing are taken at their word; an explicit
        // `false` (or garbage) is a failure.
        if !returned.is_empty() && !transfer_accepted(&returned) {
            warn!("Token {} returned failure for transfer", token);
            return Err(WalletError::ExternalCallFailed {
                target: token,
                reason: returned,
            });
        }

        let event = WalletEvent::TokenTransferred {
            token,
            recipient,
            amount,
        };
        info!(
            "Token transfer complete: {} units of {} to {}",
            amount, token, recipient
        );
        host.emit(event.clone());
        Ok(event)
    }

    /// Forward an arbitrary call with the wallet as sender
    ///
    /// No allow-list applies: the owner gate is the whole security boundary.
    ///
    /// # Returns
    /// Whatever `target` returned
    pub fn execute(
        &self,
        host: &mut dyn WalletHost,
        target: Address,
        value: U256,
        data: Bytes,
    ) -> Result<Bytes, WalletError> {
        let _guard = self.lock.enter()?;
        self.authorize(host.caller())?;
        ensure_funds(host, value)?;

        debug!(
            "Executing call to {} with {} wei and {} bytes of data",
            target,
            value,
            data.len()
        );

        let result = host
            .invoke(ExternalCallRequest::new(target, value, data.clone()))
            .map_err(|e| {
                warn!("Executed call to {} failed: {}", target, e);
                WalletError::ExternalCallFailed {
                    target,
                    reason: e.revert_data(),
                }
            })?;

        info!(
            "Executed call to {} ({} wei, {} bytes returned)",
            target,
            value,
            result.len()
        );
        host.emit(WalletEvent::ExecutedTransaction {
            target,
            value,
            data,
            result: result.clone(),
        });
        Ok(result)
    }

    fn authorize(&self, caller: Address) -> Result<(), WalletError> {
        if !self.config.is_owner(caller) {
            warn!("Rejected privileged call from non-owner {}", caller);
            return Err(WalletError::Unauthorized { caller });
        }
        Ok(())
    }
}

fn ensure_funds(host: &dyn WalletHost, required: U256) -> Result<(), WalletError> {
    let available = host.self_balance();
    if available < required {
        return Err(WalletError::InsufficientBalance {
            available,
            required,
        });
    }
    Ok(())
}

fn transfer_accepted(returned: &[u8]) -> bool {
    IERC20::transferCall::abi_decode_returns(returned, true)
        .map(|ret| ret._0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::host::{CallError, CallSink};
    use alloy_sol_types::SolValue;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const OWNER: Address = Address::repeat_byte(0x0a);
    const STRANGER: Address = Address::repeat_byte(0x0b);
    const RECIPIENT: Address = Address::repeat_byte(0x0c);
    const TOKEN: Address = Address::repeat_byte(0x0d);

    /// Host double that records forwarded calls and replays scripted outcomes
    struct RecordingHost {
        caller: Address,
        balance: U256,
        requests: Vec<ExternalCallRequest>,
        outcomes: VecDeque<Result<Bytes, CallError>>,
        events: Vec<WalletEvent>,
        reenter: Option<Rc<WalletEngine>>,
        nested: Vec<Result<WalletEvent, WalletError>>,
    }

    impl RecordingHost {
        fn new(caller: Address, balance: U256) -> Self {
            Self {
                caller,
                balance,
                requests: Vec::new(),
                outcomes: VecDeque::new(),
                events: Vec::new(),
                reenter: None,
                nested: Vec::new(),
            }
        }

        fn respond(mut self, outcome: Result<Bytes, CallError>) -> Self {
            self.outcomes.push_back(outcome);
            self
        }
    }

    impl CallSink for RecordingHost {
        fn invoke(&mut self, request: ExternalCallRequest) -> Result<Bytes, CallError> {
            self.requests.push(request.clone());

            if let Some(engine) = self.reenter.take() {
                let nested = engine.transfer_native(self, RECIPIENT, U256::from(1u64));
                self.nested.push(nested);
            }

            let outcome = self.outcomes.pop_front().unwrap_or(Ok(Bytes::new()));
            if outcome.is_ok() {
                self.balance -= request.value;
            }
            outcome
        }
    }

    impl WalletHost for RecordingHost {
        fn caller(&self) -> Address {
            self.caller
        }

        fn address(&self) -> Address {
            Address::repeat_byte(0xff)
        }

        fn self_balance(&self) -> U256 {
            self.balance
        }

        fn emit(&mut self, event: WalletEvent) {
            self.events.push(event);
        }
    }

    fn engine() -> WalletEngine {
        WalletEngine::new(OwnerConfig::new(OWNER))
    }

    #[test]
    fn test_non_owner_rejected_everywhere() {
        let engine = engine();
        let mut host = RecordingHost::new(STRANGER, U256::from(100u64));

        let expected = WalletError::Unauthorized { caller: STRANGER };
        assert_eq!(
            engine.transfer_native(&mut host, RECIPIENT, U256::from(1u64)),
            Err(expected.clone())
        );
        assert_eq!(
            engine.transfer_token(&mut host, TOKEN, RECIPIENT, U256::from(1u64)),
            Err(expected.clone())
        );
        assert_eq!(
            engine.execute(&mut host, TOKEN, U256::ZERO, Bytes::new()),
            Err(expected)
        );

        assert!(host.requests.is_empty());
        assert!(host.events.is_empty());
        assert_eq!(host.balance, U256::from(100u64));
        assert_eq!(engine.owner(), OWNER);
        assert!(!engine.is_busy());
    }

    #[test]
    fn test_transfer_native_forwards_value() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::from(100u64));

        let event = engine
            .transfer_native(&mut host, RECIPIENT, U256::from(40u64))
            .unwrap();

        assert_eq!(
            host.requests,
            vec![ExternalCallRequest::value_transfer(RECIPIENT, U256::from(40u64))]
        );
        assert_eq!(host.balance, U256::from(60u64));
        assert_eq!(
            event,
            WalletEvent::NativeTransferred {
                recipient: RECIPIENT,
                amount: U256::from(40u64)
            }
        );
        assert_eq!(host.events, vec![event]);
    }

    #[test]
    fn test_transfer_native_to_owner_allowed() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::from(10u64));

        assert!(engine
            .transfer_native(&mut host, OWNER, U256::from(10u64))
            .is_ok());
        assert_eq!(host.balance, U256::ZERO);
    }

    #[test]
    fn test_transfer_native_insufficient_balance() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::from(5u64));

        let result = engine.transfer_native(&mut host, RECIPIENT, U256::from(6u64));

        assert_eq!(
            result,
            Err(WalletError::InsufficientBalance {
                available: U256::from(5u64),
                required: U256::from(6u64),
            })
        );
        assert!(host.requests.is_empty());
        assert!(host.events.is_empty());
    }

    #[test]
    fn test_transfer_native_zero_recipient() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::from(5u64));

        assert_eq!(
            engine.transfer_native(&mut host, Address::ZERO, U256::from(1u64)),
            Err(WalletError::ZeroAddress)
        );
    }

    #[test]
    fn test_transfer_native_rejected_by_recipient() {
        let engine = engine();
        let reason = Bytes::from_static(b"no thanks");
        let mut host = RecordingHost::new(OWNER, U256::from(5u64)).respond(Err(
            CallError::Reverted {
                data: reason.clone(),
            },
        ));

        let result = engine.transfer_native(&mut host, RECIPIENT, U256::from(1u64));

        assert_eq!(
            result,
            Err(WalletError::TransferRejected {
                recipient: RECIPIENT,
                amount: U256::from(1u64),
                reason,
            })
        );
        assert_eq!(host.balance, U256::from(5u64));
        assert!(host.events.is_empty());
    }

    #[test]
    fn test_transfer_token_forwards_single_call() {
        let engine = engine();
        let mut host =
            RecordingHost::new(OWNER, U256::from(7u64)).respond(Ok(true.abi_encode().into()));

        engine
            .transfer_token(&mut host, TOKEN, RECIPIENT, U256::from(5u64))
            .unwrap();

        assert_eq!(host.requests.len(), 1);
        let request = &host.requests[0];
        assert_eq!(request.target, TOKEN);
        assert_eq!(request.value, U256::ZERO);

        let decoded = IERC20::transferCall::abi_decode(&request.payload, true).unwrap();
        assert_eq!(decoded.to, RECIPIENT);
        assert_eq!(decoded.amount, U256::from(5u64));

        assert_eq!(host.balance, U256::from(7u64));
        assert_eq!(
            host.events,
            vec![WalletEvent::TokenTransferred {
                token: TOKEN,
                recipient: RECIPIENT,
                amount: U256::from(5u64),
            }]
        );
    }

    #[test]
    fn test_transfer_token_accepts_empty_return() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::ZERO).respond(Ok(Bytes::new()));

        assert!(engine
            .transfer_token(&mut host, TOKEN, RECIPIENT, U256::from(1u64))
            .is_ok());
    }

    #[test]
    fn test_transfer_token_false_return_fails() {
        let engine = engine();
        let returned: Bytes = false.abi_encode().into();
        let mut host = RecordingHost::new(OWNER, U256::ZERO).respond(Ok(returned.clone()));

        let result = engine.transfer_token(&mut host, TOKEN, RECIPIENT, U256::from(1u64));

        assert_eq!(
            result,
            Err(WalletError::ExternalCallFailed {
                target: TOKEN,
                reason: returned,
            })
        );
        assert!(host.events.is_empty());
    }

    #[test]
    fn test_transfer_token_revert_surfaces_reason() {
        let engine = engine();
        let reason = Bytes::from_static(&[0xe4, 0x50, 0xd3, 0x8c]);
        let mut host = RecordingHost::new(OWNER, U256::from(3u64)).respond(Err(
            CallError::Reverted {
                data: reason.clone(),
            },
        ));

        let err = engine
            .transfer_token(&mut host, TOKEN, RECIPIENT, U256::from(1u64))
            .unwrap_err();

        assert_eq!(err.reason(), Some(&reason));
        assert_eq!(host.balance, U256::from(3u64));
        assert!(host.events.is_empty());
    }

    #[test]
    fn test_execute_returns_target_output() {
        let engine = engine();
        let output = Bytes::from_static(b"\x00\x01\x02");
        let mut host = RecordingHost::new(OWNER, U256::from(10u64)).respond(Ok(output.clone()));
        let data = Bytes::from_static(b"\xca\xfe");

        let result = engine
            .execute(&mut host, TOKEN, U256::from(4u64), data.clone())
            .unwrap();

        assert_eq!(result, output);
        assert_eq!(
            host.requests,
            vec![ExternalCallRequest::new(TOKEN, U256::from(4u64), data.clone())]
        );
        assert_eq!(host.balance, U256::from(6u64));
        assert_eq!(
            host.events,
            vec![WalletEvent::ExecutedTransaction {
                target: TOKEN,
                value: U256::from(4u64),
                data,
                result: output,
            }]
        );
    }

    #[test]
    fn test_execute_value_exceeds_balance() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::from(1u64));

        assert!(matches!(
            engine.execute(&mut host, TOKEN, U256::from(2u64), Bytes::new()),
            Err(WalletError::InsufficientBalance { .. })
        ));
        assert!(host.requests.is_empty());
    }

    #[test]
    fn test_execute_revert_emits_nothing() {
        let engine = engine();
        let reason = Bytes::from_static(b"no");
        let mut host = RecordingHost::new(OWNER, U256::from(10u64)).respond(Err(
            CallError::Reverted {
                data: reason.clone(),
            },
        ));

        let result = engine.execute(
            &mut host,
            TOKEN,
            U256::from(4u64),
            Bytes::from_static(b"\x01"),
        );

        assert_eq!(
            result,
            Err(WalletError::ExternalCallFailed {
                target: TOKEN,
                reason,
            })
        );
        assert_eq!(host.requests.len(), 1);
        assert_eq!(host.balance, U256::from(10u64));
        assert!(host.events.is_empty());
        assert!(!engine.is_busy());
    }

    #[test]
    fn test_execute_no_code_fails() {
        let engine = engine();
        let mut host = RecordingHost::new(OWNER, U256::ZERO)
            .respond(Err(CallError::NoCode { target: TOKEN }));

        let err = engine
            .execute(&mut host, TOKEN, U256::ZERO, Bytes::from_static(b"\x01"))
            .unwrap_err();

        assert_eq!(
            err,
            WalletError::ExternalCallFailed {
                target: TOKEN,
                reason: Bytes::new(),
            }
        );
    }

    #[test]
    fn test_reentrant_call_rejected() {
        let engine = Rc::new(engine());
        let mut host = RecordingHost::new(OWNER, U256::from(10u64));
        host.reenter = Some(Rc::clone(&engine));

        engine
            .execute(&mut host, TOKEN, U256::ZERO, Bytes::new())
            .unwrap();

        assert_eq!(host.nested, vec![Err(WalletError::ReentrancyRejected)]);
        // Only the outer call reached the sink.
        assert_eq!(host.requests.len(), 1);
        assert!(!engine.is_busy());

        // The lock is free again once the outer call returns.
        assert!(engine
            .transfer_native(&mut host, RECIPIENT, U256::from(1u64))
            .is_ok());
    }
}
