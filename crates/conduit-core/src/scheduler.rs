//! Expansion of requests, dates and ad accounts into ordered work items.
//!
//! Scheduling runs in two phases:
//!
//! 1. **Interleaving** pairs every request with the dates it needs, honouring
//!    the resume state: a request-id gate skips everything before the named
//!    request, and a date floor drops dates before the resume date for the
//!    first pair emitted in the pass only.
//! 2. **Fan-out** attaches ad accounts: an explicit account on the request
//!    wins, otherwise every known account gets its own item, otherwise a
//!    single item without account is produced.
//!
//! Both phases are pure: same inputs, same output, no shared state.

use chrono::NaiveDate;

use crate::accounts::extract_ad_accounts;
use crate::config::ConfigFile;
use crate::document::explicit_account_id;
use crate::error::AppError;
use crate::models::{AdAccount, Request, WorkItem};
use crate::requests::extract_requests;
use crate::resume::ResumeState;

/// A request paired with its date (`None` for dimensions), before fan-out.
pub type ScheduledPair<'a> = (&'a Request, Option<NaiveDate>);

/// Inputs of a scheduling pass, resolved from a configuration.
#[derive(Debug, Clone, Default)]
pub struct WorkScheduler {
    requests: Vec<Request>,
    dates: Vec<NaiveDate>,
    accounts: Vec<AdAccount>,
}

impl WorkScheduler {
    pub fn new(requests: Vec<Request>, dates: Vec<NaiveDate>, accounts: Vec<AdAccount>) -> Self {
        Self {
            requests,
            dates,
            accounts,
        }
    }

    /// Resolve the date range, requests and ad accounts of a configuration.
    pub fn from_config(config: &ConfigFile) -> Result<Self, AppError> {
        let dates = config.date_range()?.days();
        let requests = extract_requests(&config.connector_conf)?;
        let accounts = extract_ad_accounts(&config.connector_conf)?;
        Ok(Self::new(requests, dates, accounts))
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn accounts(&self) -> &[AdAccount] {
        &self.accounts
    }

    /// Work items left to execute after `resume`.
    pub fn schedule(&self, resume: &ResumeState) -> Result<Vec<WorkItem>, AppError> {
        schedule(&self.requests, &self.dates, &self.accounts, resume)
    }
}

/// Run both scheduling phases.
pub fn schedule(
    requests: &[Request],
    dates: &[NaiveDate],
    accounts: &[AdAccount],
    resume: &ResumeState,
) -> Result<Vec<WorkItem>, AppError> {
    let pairs = interleave(requests, dates, resume)?;
    let items = fan_out(&pairs, accounts);

    tracing::info!(
        pairs = pairs.len(),
        items = items.len(),
        resumed = !resume.is_empty(),
        "Work items scheduled"
    );
    Ok(items)
}

/// Resolve a loaded configuration and schedule it in one call.
pub fn plan_work(config: &ConfigFile, resume: &ResumeState) -> Result<Vec<WorkItem>, AppError> {
    WorkScheduler::from_config(config)?.schedule(resume)
}

/// Phase A: pair requests with dates, applying the resume filters.
pub fn interleave<'a>(
    requests: &'a [Request],
    dates: &[NaiveDate],
    resume: &ResumeState,
) -> Result<Vec<ScheduledPair<'a>>, AppError> {
    let date_floor = resume.date_filter()?;
    let mut gate = RequestGate::new(resume.request_filter());
    let mut pairs = Vec::new();

    match date_floor {
        Some(floor) => {
            // Dimensions are already done once a dated run has started.
            let mut floor = Some(floor);
            for request in requests.iter().filter(|r| !r.is_dimension()) {
                if !gate.admits(request) {
                    continue;
                }
                for &date in dates {
                    if floor.is_some_and(|f| date < f) {
                        continue;
                    }
                    floor = None;
                    pairs.push((request, Some(date)));
                }
            }
        }
        None => {
            for request in requests {
                if !gate.admits(request) {
                    continue;
                }
                if request.is_dimension() {
                    pairs.push((request, None));
                } else {
                    pairs.extend(dates.iter().map(|&date| (request, Some(date))));
                }
            }
        }
    }

    Ok(pairs)
}

/// Phase B: attach ad accounts to each pair.
pub fn fan_out(pairs: &[ScheduledPair<'_>], accounts: &[AdAccount]) -> Vec<WorkItem> {
    let known: Vec<(&str, &AdAccount)> = accounts
        .iter()
        .filter_map(|account| account.normalized_id().map(|id| (id, account)))
        .collect();

    let mut items = Vec::with_capacity(pairs.len() * known.len().max(1));
    for &(request, date) in pairs {
        let item = |ad_account_id: Option<&str>, ad_account: Option<&AdAccount>| WorkItem {
            request: request.clone(),
            date,
            ad_account_id: ad_account_id.map(str::to_string),
            ad_account: ad_account.cloned(),
        };

        if let Some(explicit) = explicit_account(request) {
            let resolved = known
                .iter()
                .find(|(id, _)| *id == explicit)
                .map(|(_, account)| *account);
            items.push(item(Some(explicit), resolved));
        } else if known.is_empty() {
            items.push(item(None, None));
        } else {
            items.extend(
                known
                    .iter()
                    .map(|&(id, account)| item(Some(id), Some(account))),
            );
        }
    }
    items
}

/// Account id set on the request itself: payload first, then descriptor.
pub fn explicit_account(request: &Request) -> Option<&str> {
    request
        .payload
        .as_ref()
        .and_then(|payload| payload.as_object())
        .and_then(explicit_account_id)
        .or_else(|| explicit_account_id(&request.descriptor.extra))
}

/// Skips requests until the resume request id is seen, then lets all through.
struct RequestGate<'r> {
    waiting_for: Option<&'r str>,
}

impl<'r> RequestGate<'r> {
    fn new(request_id: Option<&'r str>) -> Self {
        Self {
            waiting_for: request_id,
        }
    }

    fn admits(&mut self, request: &Request) -> bool {
        match self.waiting_for {
            Some(id) if id != request.id() => false,
            _ => {
                self.waiting_for = None;
                true
            }
        }
    }
}
