//! Deal pipeline: per-stage summaries and stage transitions

use crate::core::DataService;
use crate::core::error::{EntityError, Result};
use crate::entities::{Deal, DealStage};
use indexmap::IndexMap;
use serde::Serialize;

/// One kanban column
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub stage: DealStage,
    pub name: &'static str,
    pub count: usize,
    pub total_value: f64,
    pub deals: Vec<Deal>,
}

impl PipelineStage {
    fn empty(stage: DealStage) -> Self {
        Self {
            stage,
            name: stage.display_name(),
            count: 0,
            total_value: 0.0,
            deals: Vec::new(),
        }
    }
}

/// Group deals by stage; every stage is present, in kanban order
pub fn summarize(deals: &[Deal]) -> Vec<PipelineStage> {
    let mut stages: IndexMap<DealStage, PipelineStage> = DealStage::ALL
        .iter()
        .map(|stage| (*stage, PipelineStage::empty(*stage)))
        .collect();

    for deal in deals {
        if let Some(column) = stages.get_mut(&deal.stage) {
            column.count += 1;
            column.total_value += deal.value;
            column.deals.push(deal.clone());
        }
    }

    stages.into_values().collect()
}

pub async fn pipeline(service: &dyn DataService<Deal>) -> Result<Vec<PipelineStage>> {
    let deals = service.list().await?;
    Ok(summarize(&deals))
}

pub async fn deals_in_stage(
    service: &dyn DataService<Deal>,
    stage: DealStage,
) -> Result<Vec<Deal>> {
    let deals = service.list().await?;
    Ok(deals.into_iter().filter(|deal| deal.stage == stage).collect())
}

/// Move a deal to another stage
pub async fn update_stage(
    service: &dyn DataService<Deal>,
    id: u64,
    stage: DealStage,
) -> Result<Deal> {
    let mut deal = service
        .get(id)
        .await?
        .ok_or_else(|| EntityError::not_found("deal", id))?;

    let previous = deal.stage;
    deal.stage = stage;
    let updated = service.update(id, deal).await?;

    tracing::debug!(entity = "deal", id, from = %previous, to = %stage, "Deal stage changed");
    Ok(updated)
}
