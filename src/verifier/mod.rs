//! Verification orchestrator: initiate an STK push, poll until the payment is
//! confirmed or the attempt budget runs out, then report exactly once.
//!
//! Every call to [`PaymentVerifier::initiate_payment`] allocates a new generation.
//! A poll loop only acts while its generation is current, so a superseded or
//! cancelled attempt ends silently instead of invoking a callback.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::PaymentGateway;
use crate::config::PollConfig;
use crate::domain::{
    Amount, CheckoutRequestId, ConfirmationCode, InitiatePayment, RawPhoneNumber, ValidationError,
};

/// Reasons reported through the error callback; `Display` is the caller-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("Failed to initiate payment. Please try again.")]
    InitiationFailed,

    #[error("Payment verification timeout. Please try again or enter the code manually.")]
    VerificationTimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationState {
    Idle,
    Initiating,
    Polling,
    Confirmed,
    Failed,
    TimedOut,
}

impl VerificationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::TimedOut)
    }
}

/// How one call to [`PaymentVerifier::initiate_payment`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Confirmed,
    Failed,
    TimedOut,
    /// A newer attempt or [`PaymentVerifier::cancel`] took over; no callback was invoked.
    Superseded,
}

type SuccessFn = dyn Fn() + Send + Sync;
type ErrorFn = dyn Fn(&str) + Send + Sync;

/// Caller-supplied completion callbacks.
#[derive(Clone)]
pub struct Callbacks {
    on_success: Arc<SuccessFn>,
    on_error: Arc<ErrorFn>,
}

impl Callbacks {
    pub fn new(
        on_success: impl Fn() + Send + Sync + 'static,
        on_error: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_success: Arc::new(on_success),
            on_error: Arc::new(on_error),
        }
    }

    /// Manual fallback: validate a confirmation code from the payer's SMS and, if it
    /// is well-formed, complete through the same success callback as polling does.
    pub fn confirm_with_code(&self, code: &str) -> Result<ConfirmationCode, ValidationError> {
        let code = ConfirmationCode::parse(code)?;
        info!("payment confirmed with manual code");
        (self.on_success)();
        Ok(code)
    }

    fn success(&self) {
        (self.on_success)();
    }

    fn error(&self, reason: VerificationError) {
        (self.on_error)(&reason.to_string());
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Attempt {
    generation: u64,
    state: VerificationState,
    checkout_request_id: Option<CheckoutRequestId>,
}

struct Inner<G> {
    gateway: G,
    callbacks: Callbacks,
    config: PollConfig,
    attempt: Mutex<Attempt>,
    // Mirrors `Attempt::generation` so a sleeping poll loop wakes up on supersession.
    generation: watch::Sender<u64>,
    processing: watch::Sender<bool>,
}

/// Drives one payment verification at a time against a [`PaymentGateway`].
///
/// Cloning yields another handle to the same verifier; state is never shared
/// between independently constructed verifiers.
pub struct PaymentVerifier<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for PaymentVerifier<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: PaymentGateway> PaymentVerifier<G> {
    pub fn new(gateway: G, callbacks: Callbacks, config: PollConfig) -> Self {
        let (generation, _) = watch::channel(0);
        let (processing, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                gateway,
                callbacks,
                config,
                attempt: Mutex::new(Attempt {
                    generation: 0,
                    state: VerificationState::Idle,
                    checkout_request_id: None,
                }),
                generation,
                processing,
            }),
        }
    }

    /// `true` from the start of [`PaymentVerifier::initiate_payment`] until its attempt
    /// ends or is cancelled.
    pub fn is_processing(&self) -> bool {
        *self.inner.processing.borrow()
    }

    /// Subscribe to changes of [`PaymentVerifier::is_processing`].
    pub fn watch_processing(&self) -> watch::Receiver<bool> {
        self.inner.processing.subscribe()
    }

    pub fn state(&self) -> VerificationState {
        self.lock().state
    }

    /// Checkout id being polled right now, if any.
    pub fn checkout_request_id(&self) -> Option<CheckoutRequestId> {
        self.lock().checkout_request_id.clone()
    }

    /// Run one verification to completion.
    ///
    /// Supersedes any attempt still in flight. Invokes exactly one callback unless this
    /// attempt is itself superseded, in which case it invokes none.
    pub async fn initiate_payment(&self, phone_number: &str, amount: u64) -> Outcome {
        let generation = self.begin();

        let request = match build_request(phone_number, amount) {
            Ok(request) => request,
            Err(err) => {
                warn!(generation, error = %err, "payment request rejected before initiation");
                return self.finish(generation, VerificationState::Failed);
            }
        };

        info!(
            generation,
            phone = %request.phone_number().masked(),
            amount = request.amount().value(),
            "initiating payment"
        );

        let response = match self.inner.gateway.initiate(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    generation,
                    error = %err,
                    unavailable = err.is_unavailable(),
                    "payment initiation failed"
                );
                return self.finish(generation, VerificationState::Failed);
            }
        };

        let checkout_request_id = response.checkout_request_id;
        if !self.start_polling(generation, &checkout_request_id) {
            return Outcome::Superseded;
        }

        self.poll(generation, checkout_request_id).await
    }

    /// Run [`PaymentVerifier::initiate_payment`] on the tokio runtime.
    pub fn spawn_payment(&self, phone_number: impl Into<String>, amount: u64) -> JoinHandle<Outcome>
    where
        G: 'static,
    {
        let verifier = self.clone();
        let phone_number = phone_number.into();
        tokio::spawn(async move { verifier.initiate_payment(&phone_number, amount).await })
    }

    /// Abandon the current attempt without invoking any callback.
    pub fn cancel(&self) {
        let mut attempt = self.lock();
        attempt.generation += 1;
        if !attempt.state.is_terminal() {
            attempt.state = VerificationState::Idle;
        }
        attempt.checkout_request_id = None;
        self.inner.generation.send_replace(attempt.generation);
        self.inner.processing.send_replace(false);
        debug!(generation = attempt.generation, "verification cancelled");
    }

    async fn poll(&self, generation: u64, checkout_request_id: CheckoutRequestId) -> Outcome {
        let mut wake = self.inner.generation.subscribe();
        let budget = self.inner.config.attempt_budget;
        let mut attempts_made: u32 = 0;

        loop {
            if !self.is_current(generation) {
                debug!(generation, "poll loop superseded");
                return Outcome::Superseded;
            }
            if attempts_made >= budget {
                return self.finish(generation, VerificationState::TimedOut);
            }

            let status = self.inner.gateway.check_status(&checkout_request_id).await;
            if status.is_confirmed() {
                return self.finish(generation, VerificationState::Confirmed);
            }

            attempts_made += 1;
            debug!(
                generation,
                checkout_request_id = checkout_request_id.as_str(),
                attempts_made,
                budget,
                "payment still pending"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.inner.config.interval) => {}
                _ = wake.changed() => {}
            }
        }
    }

    fn begin(&self) -> u64 {
        let mut attempt = self.lock();
        attempt.generation += 1;
        attempt.state = VerificationState::Initiating;
        attempt.checkout_request_id = None;
        self.inner.generation.send_replace(attempt.generation);
        self.inner.processing.send_replace(true);
        debug!(generation = attempt.generation, "verification initiating");
        attempt.generation
    }

    fn start_polling(&self, generation: u64, checkout_request_id: &CheckoutRequestId) -> bool {
        let mut attempt = self.lock();
        if attempt.generation != generation {
            return false;
        }
        attempt.state = VerificationState::Polling;
        attempt.checkout_request_id = Some(checkout_request_id.clone());
        debug!(
            generation,
            checkout_request_id = checkout_request_id.as_str(),
            "verification polling"
        );
        true
    }

    /// Move to `terminal` and invoke the matching callback, unless superseded.
    fn finish(&self, generation: u64, terminal: VerificationState) -> Outcome {
        {
            let mut attempt = self.lock();
            if attempt.generation != generation {
                debug!(generation, "dropping result of superseded attempt");
                return Outcome::Superseded;
            }
            attempt.state = terminal;
            attempt.checkout_request_id = None;
            self.inner.processing.send_replace(false);
        }

        let callbacks = &self.inner.callbacks;
        match terminal {
            VerificationState::Confirmed => {
                info!(generation, "payment confirmed");
                callbacks.success();
                Outcome::Confirmed
            }
            VerificationState::TimedOut => {
                warn!(
                    generation,
                    budget = self.inner.config.attempt_budget,
                    "payment verification timed out"
                );
                callbacks.error(VerificationError::VerificationTimedOut);
                Outcome::TimedOut
            }
            _ => {
                callbacks.error(VerificationError::InitiationFailed);
                Outcome::Failed
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    fn lock(&self) -> MutexGuard<'_, Attempt> {
        self.inner
            .attempt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_request(phone_number: &str, amount: u64) -> Result<InitiatePayment, ValidationError> {
    Ok(InitiatePayment::new(
        RawPhoneNumber::new(phone_number)?,
        Amount::new(amount)?,
    ))
}
