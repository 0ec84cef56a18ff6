/*!
 * Signal Operations
 * Identifier-level entry points over the resolver, mask and wait engine
 */

use super::mask::MaskController;
use super::resolver::{resolve, SignalId};
use super::wait::WaitEngine;
use crate::core::errors::SignalResult;
use crate::core::types::SignalNumber;
use crate::runtime::Interpreter;
use std::convert::Infallible;

/// Block one signal on the calling thread, returning its number
pub fn mask(signal: impl Into<SignalId>) -> SignalResult<SignalNumber> {
    let signal = resolve(signal)?;
    MaskController::block(signal)?;
    Ok(signal)
}

/// Dispatch every delivery of `signal` to `callback()`; returns only on error
pub fn wait<I: Interpreter>(
    interp: &mut I,
    signal: impl Into<SignalId>,
    callback: &I::Value,
) -> SignalResult<Infallible> {
    let signal = resolve(signal)?;
    WaitEngine::wait_loop(interp, signal, callback)
}

/// Without a callback, wait once and return the delivery's info value.
/// With one, dispatch every delivery's info to it; returns only on error.
pub fn waitinfo<I: Interpreter>(
    interp: &mut I,
    signal: impl Into<SignalId>,
    callback: Option<&I::Value>,
) -> SignalResult<I::Value> {
    let signal = resolve(signal)?;
    match callback {
        None => {
            let info = WaitEngine::wait_info_once(signal)?;
            Ok(interp.siginfo(info))
        }
        Some(callback) => match WaitEngine::wait_info_loop(interp, signal, callback)? {},
    }
}
