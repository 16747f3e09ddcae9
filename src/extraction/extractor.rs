//! Rule-driven field extraction
//!
//! [`FieldExtractor::extract`] runs a [`RuleSet`] against a [`DomPage`]
//! strictly in order: every action rule first, then every field rule. Each
//! rule gets its own `timeout_per_field` budget. Failures are recorded on the
//! result; only a required rule whose element is missing (or whose action
//! cannot be delivered) stops the run.

use super::record::{ExtractionResult, FailureCause, FieldError, HotelRecord, RunStatus};
use super::rule::{ActionKind, ActionRule, ExtractionRule, FieldValue, RuleSet};
use crate::page::{millis, DomPage, LookupError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Accumulates state while a rule set is evaluated
struct Run {
    record: HotelRecord,
    errors: Vec<FieldError>,
    status: RunStatus,
    started: Instant,
}

impl Run {
    fn new() -> Self {
        Self {
            record: HotelRecord::default(),
            errors: Vec::new(),
            status: RunStatus::Pending,
            started: Instant::now(),
        }
    }

    fn transition(&mut self, next: RunStatus) {
        debug!("Extraction run {:?} -> {:?}", self.status, next);
        self.status = next;
    }

    /// Record a failure; returns true when the run must stop
    fn fail(&mut self, error: FieldError, required: bool) -> bool {
        let fatal = required && error.cause.aborts_required();
        if fatal {
            warn!("Required rule failed, aborting: {}", error);
        } else {
            warn!("Rule failed: {}", error);
        }
        self.errors.push(error);
        if fatal {
            self.transition(RunStatus::Aborted);
        }
        fatal
    }

    fn finish(mut self) -> ExtractionResult {
        if self.status == RunStatus::Running {
            self.transition(RunStatus::Completed);
        }
        let duration_ms = millis(self.started.elapsed());
        info!(
            "Extraction {:?} in {}ms with {} error(s)",
            self.status,
            duration_ms,
            self.errors.len()
        );
        ExtractionResult {
            record: self.record,
            errors: self.errors,
            status: self.status,
            duration_ms,
        }
    }
}

/// Applies rule tables to pages
pub struct FieldExtractor;

impl FieldExtractor {
    /// Evaluate `rules` against `page`.
    ///
    /// Never fails: inspect [`ExtractionResult::status`] and
    /// [`ExtractionResult::errors`] to tell success, partial and aborted runs
    /// apart.
    #[instrument(skip_all, fields(actions = rules.actions.len(), fields = rules.fields.len()))]
    pub async fn extract<P>(page: &P, rules: &RuleSet, timeout_per_field: Duration) -> ExtractionResult
    where
        P: DomPage + ?Sized,
    {
        let mut run = Run::new();
        run.transition(RunStatus::Running);

        for action in &rules.actions {
            if let Err(cause) = Self::perform(page, action, timeout_per_field).await {
                let error = FieldError::new(&action.name, &action.selector, cause);
                if run.fail(error, action.required) {
                    return run.finish();
                }
            }
        }

        for rule in &rules.fields {
            let outcome = Self::read_field(page, rule, timeout_per_field)
                .await
                .and_then(|value| {
                    run.record
                        .set(rule.field, value)
                        .map_err(FailureCause::TransformFailed)
                });

            match outcome {
                Ok(()) => debug!("Populated {}", rule.field),
                Err(cause) => {
                    let error = FieldError::new(rule.field.key(), &rule.selector, cause);
                    if run.fail(error, rule.required) {
                        return run.finish();
                    }
                }
            }
        }

        run.finish()
    }

    /// Locate, read and transform one field
    async fn read_field<P>(
        page: &P,
        rule: &ExtractionRule,
        timeout: Duration,
    ) -> Result<FieldValue, FailureCause>
    where
        P: DomPage + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        let element = page
            .find_element(&rule.selector, rule.element_index, timeout)
            .await
            .map_err(lookup_cause)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let text = match tokio::time::timeout(remaining, page.element_text(&element)).await {
            Err(_) => return Err(FailureCause::Timeout(millis(timeout))),
            // The element went away between lookup and read
            Ok(Err(e)) => {
                debug!("Reading {} failed: {}", rule.field, e);
                return Err(FailureCause::NotFound);
            }
            Ok(Ok(text)) => text,
        };

        match rule.transform {
            Some(ref transform) => transform.apply(&text).map_err(FailureCause::TransformFailed),
            None => Ok(FieldValue::Text(text)),
        }
    }

    /// Locate the target of an action rule and deliver the interaction
    async fn perform<P>(page: &P, action: &ActionRule, timeout: Duration) -> Result<(), FailureCause>
    where
        P: DomPage + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        let element = page
            .find_element(&action.selector, action.element_index, timeout)
            .await
            .map_err(lookup_cause)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let delivered = match action.action {
            ActionKind::Type(ref text) => {
                tokio::time::timeout(remaining, page.type_text(&element, text)).await
            }
            ActionKind::Click => tokio::time::timeout(remaining, page.click(&element)).await,
        };

        match delivered {
            Err(_) => Err(FailureCause::Timeout(millis(timeout))),
            Ok(Err(e)) => Err(FailureCause::ActionFailed(e.to_string())),
            Ok(Ok(())) => {
                debug!("Performed {}", action.name);
                Ok(())
            }
        }
    }
}

fn lookup_cause(err: LookupError) -> FailureCause {
    match err {
        LookupError::Timeout { timeout_ms, .. } => FailureCause::Timeout(timeout_ms),
        LookupError::NotFound { .. } => FailureCause::NotFound,
        LookupError::InvalidSelector { selector, reason } => {
            warn!("Selector '{}' could not be evaluated: {}", selector, reason);
            FailureCause::NotFound
        }
    }
}
