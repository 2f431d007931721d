//! Custom rule support
//!
//! Custom rules are user-supplied, possibly asynchronous checks attached to a
//! single attribute. They receive a [`ValueSlot`] holding the attribute's
//! working value and may replace that value; whatever the slot holds once all
//! rules have settled becomes the attribute's validated value.
//!
//! A custom rule reports:
//! - `Ok(true)`: passed
//! - `Ok(false)`: failed, recorded with the configured message or `""`
//! - `Err(e)`: failed, recorded with the configured message or `e.to_string()`
//!
//! # Example
//!
//! ```rust,ignore
//! use model_validator::custom::{FnCustomRule, SyncCustomRule};
//! use model_validator::Value;
//!
//! let upper = SyncCustomRule::new(|slot| {
//!     slot.update(|v| *v = Value::String(v.to_text().to_uppercase()));
//!     Ok(true)
//! });
//!
//! let remote = FnCustomRule::new(|slot| {
//!     Box::pin(async move {
//!         let name = slot.get().to_text();
//!         Ok(lookup(&name).await?)
//!     })
//! });
//! ```

use crate::types::Value;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Result of a custom rule
pub type CustomResult = anyhow::Result<bool>;

/// Boxed future returned by function-based custom rules
pub type CustomFuture = Pin<Box<dyn Future<Output = CustomResult> + Send>>;

// ============================================================================
// Value Slot
// ============================================================================

/// Shared single-slot handle to an attribute's working value.
///
/// The lock is only held inside the accessor methods, never across an await.
#[derive(Debug, Clone, Default)]
pub struct ValueSlot {
    inner: Arc<Mutex<Value>>,
}

impl ValueSlot {
    pub fn new(value: Value) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> Value {
        self.inner.lock().clone()
    }

    /// Replace the value, returning the previous one
    pub fn set(&self, value: impl Into<Value>) -> Value {
        std::mem::replace(&mut *self.inner.lock(), value.into())
    }

    /// Modify the value in place
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Take the current value out, leaving `Null`
    pub fn take(&self) -> Value {
        std::mem::take(&mut *self.inner.lock())
    }
}

// ============================================================================
// Custom Rule Trait
// ============================================================================

/// Trait for attribute-level custom rules
#[async_trait]
pub trait CustomRule: Send + Sync {
    /// Check (and optionally transform) the value held by `value`
    async fn check(&self, value: ValueSlot) -> CustomResult;
}

/// Type alias for shared custom rules
pub type BoxedCustomRule = Arc<dyn CustomRule>;

// ============================================================================
// Function-based Custom Rules
// ============================================================================

/// Custom rule from an async function returning a boxed future
pub struct FnCustomRule<F>
where
    F: Fn(ValueSlot) -> CustomFuture + Send + Sync,
{
    check_fn: F,
}

impl<F> FnCustomRule<F>
where
    F: Fn(ValueSlot) -> CustomFuture + Send + Sync,
{
    pub fn new(check_fn: F) -> Self {
        Self { check_fn }
    }
}

#[async_trait]
impl<F> CustomRule for FnCustomRule<F>
where
    F: Fn(ValueSlot) -> CustomFuture + Send + Sync,
{
    async fn check(&self, value: ValueSlot) -> CustomResult {
        (self.check_fn)(value).await
    }
}

/// Custom rule from a synchronous function
pub struct SyncCustomRule<F>
where
    F: Fn(&ValueSlot) -> CustomResult + Send + Sync,
{
    check_fn: F,
}

impl<F> SyncCustomRule<F>
where
    F: Fn(&ValueSlot) -> CustomResult + Send + Sync,
{
    pub fn new(check_fn: F) -> Self {
        Self { check_fn }
    }
}

#[async_trait]
impl<F> CustomRule for SyncCustomRule<F>
where
    F: Fn(&ValueSlot) -> CustomResult + Send + Sync,
{
    async fn check(&self, value: ValueSlot) -> CustomResult {
        (self.check_fn)(&value)
    }
}
