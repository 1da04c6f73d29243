//! Ordered groups of managed resources

use tracing::{info, Span};

use super::{Outcome, Reconcilable};
use crate::error::Result;

/// Names of the resources touched by one group reconciliation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Resources making up one logical subsystem, reconciled in declared order
pub struct ResourceGroup {
    name: &'static str,
    resources: Vec<Box<dyn Reconcilable>>,
    log: Span,
}

impl ResourceGroup {
    pub fn new(name: &'static str, resources: Vec<Box<dyn Reconcilable>>, log: Span) -> Self {
        Self {
            name,
            resources,
            log,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The reconcilable resources of the group, in reconcile order
    pub fn resources(&self) -> &[Box<dyn Reconcilable>] {
        &self.resources
    }

    /// Reconcile every resource in order.
    ///
    /// Stops at the first failure. Resources created before the failure are
    /// left in place; the next pass skips them.
    pub async fn reconcile(&mut self) -> Result<GroupReport> {
        let mut report = GroupReport::default();

        for resource in self.resources.iter_mut() {
            let name = resource.key().to_string();
            match resource.reconcile().await? {
                Outcome::Created(_) => report.created.push(name),
                Outcome::Skipped => report.skipped.push(name),
            }
        }

        if !report.skipped.is_empty() {
            info!(
                parent: &self.log,
                resources = %report.skipped.join(", "),
                "Skip reconcile: resources already exist"
            );
        }
        if !report.created.is_empty() {
            info!(
                parent: &self.log,
                resources = %report.created.join(", "),
                "Resources created"
            );
        }

        Ok(report)
    }
}
