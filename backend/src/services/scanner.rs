//! Shortfall scanner
//!
//! Walks open work orders, compares each required item against the stock of
//! its source warehouse and collects the items that cannot be covered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use shared::{
    build_shortfall_row, group_shortfall_rows, resolve_source_warehouse, DocStatus,
    ExclusionPolicy, ShortfallReport, ShortfallRow, WorkOrderSummary,
};

use crate::error::{AppError, AppResult};
use crate::external::{DocStatusFilter, ErpClient, MaterialRequestFilter, WorkOrderFilter};

/// Hands out scan tickets per requester
///
/// Starting a scan invalidates every earlier ticket of the same requester.
/// Scans of other requesters are unaffected.
#[derive(Clone, Default)]
pub struct ScanSupervisor {
    requesters: Arc<Mutex<HashMap<String, Arc<AtomicU64>>>>,
}

/// Proof that a scan is still the latest one of its requester
#[derive(Clone)]
pub struct ScanTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl ScanSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new scan for `requester`, superseding its scan in flight
    pub fn begin(&self, requester: &str) -> ScanTicket {
        let current = {
            let mut requesters = self
                .requesters
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Requesters without a live ticket hold the only reference
            requesters.retain(|_, counter| Arc::strong_count(counter) > 1);
            Arc::clone(requesters.entry(requester.to_string()).or_default())
        };

        let generation = current.fetch_add(1, Ordering::SeqCst) + 1;
        ScanTicket {
            generation,
            current,
        }
    }

    /// Number of requesters with a scan ticket still alive
    pub fn active_requesters(&self) -> usize {
        self.requesters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|counter| Arc::strong_count(counter) > 1)
            .count()
    }
}

impl ScanTicket {
    /// Ticket that no other scan can supersede
    pub fn detached() -> Self {
        Self {
            generation: 0,
            current: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    pub fn ensure_current(&self) -> AppResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(AppError::ScanSuperseded)
        }
    }
}

/// Shortfall scanner over the ERP
#[derive(Clone)]
pub struct ShortfallScanner {
    erp: Arc<dyn ErpClient>,
    policy: ExclusionPolicy,
    max_concurrency: usize,
    supervisor: ScanSupervisor,
}

impl ShortfallScanner {
    pub fn new(erp: Arc<dyn ErpClient>, policy: ExclusionPolicy) -> Self {
        Self {
            erp,
            policy,
            max_concurrency: 1,
            supervisor: ScanSupervisor::new(),
        }
    }

    /// Evaluate up to `max_concurrency` work orders at once
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Share a supervisor so repeated scans of one requester supersede each other
    pub fn with_supervisor(mut self, supervisor: ScanSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Scan all open work orders for shortfalls
    ///
    /// Groups follow the ERP listing order regardless of concurrency. Any
    /// failed fetch fails the whole scan. The scan cannot be superseded.
    pub async fn scan(&self) -> AppResult<ShortfallReport> {
        self.scan_with_ticket(&ScanTicket::detached()).await
    }

    /// Scan on behalf of `requester`, abandoning the requester's older scan
    pub async fn scan_for(&self, requester: &str) -> AppResult<ShortfallReport> {
        let ticket = self.supervisor.begin(requester);
        self.scan_with_ticket(&ticket).await
    }

    /// Scan under a ticket obtained from the supervisor
    pub async fn scan_with_ticket(&self, ticket: &ScanTicket) -> AppResult<ShortfallReport> {
        let work_orders = self
            .erp
            .list_work_orders(&WorkOrderFilter::open_submitted())
            .await?;
        ticket.ensure_current()?;

        tracing::info!(
            work_orders = work_orders.len(),
            policy = ?self.policy,
            "Scanning work orders for shortfall"
        );

        let open: Vec<WorkOrderSummary> = work_orders
            .into_iter()
            .filter(|wo| !wo.status.is_completed())
            .collect();
        let per_work_order: Vec<Vec<ShortfallRow>> = stream::iter(open.into_iter().map(|wo| {
            let scanner = self.clone();
            let ticket = ticket.clone();
            async move { scanner.scan_work_order(&wo, &ticket).await }
        }))
        .buffered(self.max_concurrency)
        .try_collect()
        .await?;

        ticket.ensure_current()?;

        let rows: Vec<ShortfallRow> = per_work_order.into_iter().flatten().collect();
        tracing::info!(rows = rows.len(), "Shortfall scan finished");

        Ok(ShortfallReport {
            generated_at: Utc::now(),
            groups: group_shortfall_rows(rows),
        })
    }

    async fn scan_work_order(
        &self,
        summary: &WorkOrderSummary,
        ticket: &ScanTicket,
    ) -> AppResult<Vec<ShortfallRow>> {
        ticket.ensure_current()?;

        if self.has_linked_request(&summary.name).await? {
            tracing::debug!(work_order = %summary.name, "Skipping work order with linked request");
            return Ok(Vec::new());
        }

        let work_order = self.erp.get_work_order(&summary.name).await?;
        let mut rows = Vec::new();

        for item in &work_order.required_items {
            ticket.ensure_current()?;

            let Some(source_warehouse) = resolve_source_warehouse(item, &work_order) else {
                tracing::debug!(
                    work_order = %work_order.name,
                    item_code = %item.item_code,
                    "No source warehouse, item skipped"
                );
                continue;
            };

            let bin = self.erp.get_bin(&item.item_code, source_warehouse).await?;
            if let Some(row) = build_shortfall_row(&work_order, item, source_warehouse, bin) {
                rows.push(row);
            }
        }

        Ok(rows)
    }

    /// Whether a shortfall request matching the exclusion policy already exists
    async fn has_linked_request(&self, work_order: &str) -> AppResult<bool> {
        let filter = MaterialRequestFilter {
            work_order: Some(work_order.to_string()),
            docstatus: policy_filter(self.policy),
            newest_first: false,
            limit: Some(1),
        };

        let requests = self.erp.list_material_requests(&filter).await?;
        Ok(requests.iter().any(|mr| self.policy.excludes(mr.docstatus)))
    }
}

/// ERP-side docstatus condition equivalent to the policy
pub fn policy_filter(policy: ExclusionPolicy) -> DocStatusFilter {
    match policy {
        ExclusionPolicy::NonCancelled => DocStatusFilter::Not(DocStatus::Cancelled),
        ExclusionPolicy::DraftOnly => DocStatusFilter::Is(DocStatus::Draft),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let supervisor = ScanSupervisor::new();
        let first = supervisor.begin("desk-1");
        assert!(first.is_current());

        let second = supervisor.begin("desk-1");
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(matches!(first.ensure_current(), Err(AppError::ScanSuperseded)));
    }

    #[test]
    fn test_requesters_do_not_supersede_each_other() {
        let supervisor = ScanSupervisor::new();
        let first = supervisor.begin("desk-1");
        let other = supervisor.begin("desk-2");
        assert!(first.is_current());
        assert!(other.is_current());
    }

    #[test]
    fn test_cloned_supervisor_shares_generation() {
        let supervisor = ScanSupervisor::new();
        let ticket = supervisor.begin("desk-1");
        supervisor.clone().begin("desk-1");
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_detached_ticket_stays_current() {
        let supervisor = ScanSupervisor::new();
        let ticket = ScanTicket::detached();
        supervisor.begin("desk-1");
        assert!(ticket.is_current());
    }

    #[test]
    fn test_finished_requesters_are_dropped() {
        let supervisor = ScanSupervisor::new();
        let ticket = supervisor.begin("desk-1");
        assert_eq!(supervisor.active_requesters(), 1);

        drop(ticket);
        let _other = supervisor.begin("desk-2");
        assert_eq!(supervisor.active_requesters(), 1);
    }

    #[test]
    fn test_policy_filter() {
        assert_eq!(
            policy_filter(ExclusionPolicy::NonCancelled),
            DocStatusFilter::Not(DocStatus::Cancelled)
        );
        assert_eq!(
            policy_filter(ExclusionPolicy::DraftOnly),
            DocStatusFilter::Is(DocStatus::Draft)
        );
    }
}
