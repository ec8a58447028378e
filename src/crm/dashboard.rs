//! Headline metrics for the dashboard

use crate::core::DataService;
use crate::core::error::Result;
use crate::entities::{Contact, Deal, Task};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_contacts: usize,
    /// Deals that are neither won nor lost
    pub active_deals: usize,
    /// Sum of the values of active deals
    pub pipeline_value: f64,
    pub pending_tasks: usize,
}

impl DashboardMetrics {
    pub fn compute(contacts: &[Contact], deals: &[Deal], tasks: &[Task]) -> Self {
        let active = deals.iter().filter(|deal| deal.is_active());

        Self {
            total_contacts: contacts.len(),
            active_deals: active.clone().count(),
            pipeline_value: active.map(|deal| deal.value).sum(),
            pending_tasks: tasks.iter().filter(|task| task.is_pending()).count(),
        }
    }

    /// Compute the metrics from a snapshot of each service
    pub async fn load(
        contacts: &dyn DataService<Contact>,
        deals: &dyn DataService<Deal>,
        tasks: &dyn DataService<Task>,
    ) -> Result<Self> {
        let contacts = contacts.list().await?;
        let deals = deals.list().await?;
        let tasks = tasks.list().await?;
        Ok(Self::compute(&contacts, &deals, &tasks))
    }
}
