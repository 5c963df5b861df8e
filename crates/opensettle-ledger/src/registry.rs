//! The listing-identity registry, as consumed by the settlement core.
//!
//! The registry mints listings, authenticates callers, and burns listings
//! the core reports as exhausted. The core only ever calls one method on
//! it; everything else flows the other way, through the core's public
//! operations.

use opensettle_types::{ListingId, Result, SettleError};

/// Downstream sink for exhaustion signals.
///
/// Failure here is NOT rolled back into the financial transfer that
/// preceded it — by the time the signal fires, value and items have
/// already moved. The core surfaces the failure as a reconciliation
/// event instead.
pub trait ListingRegistry {
    /// Tell the registry the listing's lot sold out and should be burned.
    ///
    /// # Errors
    /// Whatever the registry's burn path reports; the core does not retry.
    fn signal_exhausted(&mut self, listing: ListingId) -> Result<()>;
}

/// In-memory registry that records burn signals. Supports one-shot
/// failure injection for exercising the reconciliation path.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    burned: Vec<ListingId>,
    fail_next: bool,
}

impl RecordingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listings burned so far, in signal order.
    #[must_use]
    pub fn burned(&self) -> &[ListingId] {
        &self.burned
    }

    /// Make the next `signal_exhausted` call fail.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

impl ListingRegistry for RecordingRegistry {
    fn signal_exhausted(&mut self, listing: ListingId) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(SettleError::Internal(format!(
                "injected burn failure for {listing}"
            )));
        }
        self.burned.push(listing);
        Ok(())
    }
}

/// Shared-handle forwarding, mirroring the `TokenLedger` impl.
impl<R: ListingRegistry> ListingRegistry for std::rc::Rc<std::cell::RefCell<R>> {
    fn signal_exhausted(&mut self, listing: ListingId) -> Result<()> {
        self.borrow_mut().signal_exhausted(listing)
    }
}
