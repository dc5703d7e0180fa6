//! Purchase status transitions and carrier label actions.
//!
//! Each operation issues the backend calls and hands back the updated
//! purchase; callers put it into the [`crate::store::PurchaseStore`].

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::error::ApiError;
use crate::models::{PrintResult, Purchase, PurchaseStatus};
use crate::network::service::CrmApi;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelAction {
    Generate,
    Print,
}

impl LabelAction {
    /// Statuses a purchase must be in for the batch action
    pub fn accepts(&self, status: &PurchaseStatus) -> bool {
        match self {
            LabelAction::Generate => matches!(
                status,
                PurchaseStatus::Pago | PurchaseStatus::AguardandoEtiqueta
            ),
            LabelAction::Print => *status == PurchaseStatus::EtiquetaGerada,
        }
    }
}

impl fmt::Display for LabelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelAction::Generate => f.write_str("label generation"),
            LabelAction::Print => f.write_str("label printing"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No selected purchase is eligible for {0}")]
    NothingEligible(LabelAction),

    #[error("Purchase #{id} is already {status}")]
    AlreadyInStatus { id: u64, status: PurchaseStatus },

    #[error("Purchase #{id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: u64,
        from: PurchaseStatus,
        to: PurchaseStatus,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of generating the label of a single purchase
#[derive(Clone, Debug, PartialEq)]
pub enum LabelOutcome {
    Generated { purchase: Purchase, label_code: String },
    /// Status moved to "Aguardando Etiqueta" but the carrier has not issued a code yet
    MissingLabelCode { purchase: Purchase },
}

impl LabelOutcome {
    pub fn purchase(&self) -> &Purchase {
        match self {
            LabelOutcome::Generated { purchase, .. } => purchase,
            LabelOutcome::MissingLabelCode { purchase } => purchase,
        }
    }
}

/// Eligible subset of a selection, ready for one aggregate call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelPlan {
    pub purchase_ids: Vec<u64>,
    pub label_codes: Vec<String>,
}

fn check_transition(purchase: &Purchase, target: PurchaseStatus) -> Result<(), WorkflowError> {
    if purchase.status == target {
        return Err(WorkflowError::AlreadyInStatus {
            id: purchase.id,
            status: target,
        });
    }
    if !purchase.status.can_move_to(&target) {
        return Err(WorkflowError::InvalidTransition {
            id: purchase.id,
            from: purchase.status.clone(),
            to: target,
        });
    }
    Ok(())
}

pub async fn mark_as_paid<A: CrmApi + ?Sized>(
    api: &A,
    purchase: &Purchase,
) -> Result<Purchase, WorkflowError> {
    check_transition(purchase, PurchaseStatus::Pago)?;
    let updated = api.update_status(purchase.id, PurchaseStatus::Pago).await?;
    tracing::info!(id = purchase.id, "Purchase marked as paid");
    Ok(updated)
}

/// Cancel a purchase. Confirmation is the caller's job.
pub async fn cancel<A: CrmApi + ?Sized>(
    api: &A,
    purchase: &Purchase,
) -> Result<Purchase, WorkflowError> {
    check_transition(purchase, PurchaseStatus::Cancelado)?;
    let updated = api.update_status(purchase.id, PurchaseStatus::Cancelado).await?;
    tracing::info!(id = purchase.id, "Purchase cancelled");
    Ok(updated)
}

/// Move a purchase to "Aguardando Etiqueta" (if needed) and, when the carrier
/// already issued a label code, ask for the label to be generated.
pub async fn generate_label_for_one<A: CrmApi + ?Sized>(
    api: &A,
    purchase: &Purchase,
) -> Result<LabelOutcome, WorkflowError> {
    let updated = if purchase.status == PurchaseStatus::AguardandoEtiqueta {
        purchase.clone()
    } else {
        check_transition(purchase, PurchaseStatus::AguardandoEtiqueta)?;
        api.update_status(purchase.id, PurchaseStatus::AguardandoEtiqueta)
            .await?
    };

    // the status endpoint may answer without the freight sub-object
    let code = updated
        .label_code()
        .or_else(|| purchase.label_code())
        .map(str::to_string);

    match code {
        Some(label_code) => {
            api.generate_labels(std::slice::from_ref(&label_code)).await?;
            tracing::info!(id = purchase.id, label = %label_code, "Label generation requested");
            Ok(LabelOutcome::Generated {
                purchase: updated,
                label_code,
            })
        }
        None => {
            tracing::warn!(id = purchase.id, "Purchase has no label code yet");
            Ok(LabelOutcome::MissingLabelCode { purchase: updated })
        }
    }
}

/// Selected AND in an accepted status AND carrying a label code
pub fn plan_labels(
    purchases: &[Purchase],
    selected: &HashSet<u64>,
    action: LabelAction,
) -> Result<LabelPlan, WorkflowError> {
    let mut plan = LabelPlan::default();
    for purchase in purchases {
        if !selected.contains(&purchase.id) || !action.accepts(&purchase.status) {
            continue;
        }
        if let Some(code) = purchase.label_code() {
            plan.purchase_ids.push(purchase.id);
            if !plan.label_codes.iter().any(|c| c == code) {
                plan.label_codes.push(code.to_string());
            }
        }
    }
    if plan.label_codes.is_empty() {
        return Err(WorkflowError::NothingEligible(action));
    }
    Ok(plan)
}

pub fn plan_label_generation(
    purchases: &[Purchase],
    selected: &HashSet<u64>,
) -> Result<LabelPlan, WorkflowError> {
    plan_labels(purchases, selected, LabelAction::Generate)
}

pub fn plan_label_printing(
    purchases: &[Purchase],
    selected: &HashSet<u64>,
) -> Result<LabelPlan, WorkflowError> {
    plan_labels(purchases, selected, LabelAction::Print)
}

pub async fn generate_labels_batch<A: CrmApi + ?Sized>(
    api: &A,
    plan: &LabelPlan,
) -> Result<(), WorkflowError> {
    if plan.label_codes.is_empty() {
        return Err(WorkflowError::NothingEligible(LabelAction::Generate));
    }
    api.generate_labels(&plan.label_codes).await?;
    tracing::info!(count = plan.label_codes.len(), "Batch label generation requested");
    Ok(())
}

pub async fn print_labels_batch<A: CrmApi + ?Sized>(
    api: &A,
    plan: &LabelPlan,
) -> Result<PrintResult, WorkflowError> {
    if plan.label_codes.is_empty() {
        return Err(WorkflowError::NothingEligible(LabelAction::Print));
    }
    let result = api.print_labels(&plan.label_codes).await?;
    tracing::info!(count = plan.label_codes.len(), url = %result.url, "Label print URL received");
    Ok(result)
}

/// Ask the backend to pull tracking codes, then fetch the refreshed list
pub async fn refresh_tracking<A: CrmApi + ?Sized>(api: &A) -> Result<Vec<Purchase>, WorkflowError> {
    api.refresh_tracking().await?;
    Ok(api.list_purchases().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{purchase, Call, MockApi};

    fn selection(ids: &[u64]) -> HashSet<u64> {
        ids.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_mark_as_paid_updates_status() {
        let api = MockApi::with_purchases(vec![purchase(1, "Pendente", None, None)]);
        let current = purchase(1, "Pendente", None, None);

        let updated = mark_as_paid(&api, &current).await.unwrap();

        assert_eq!(updated.status, PurchaseStatus::Pago);
        assert_eq!(api.calls(), vec![Call::UpdateStatus(1, PurchaseStatus::Pago)]);
    }

    #[tokio::test]
    async fn test_mark_as_paid_twice_is_refused_without_call() {
        let api = MockApi::with_purchases(vec![purchase(1, "Pago", None, None)]);
        let err = mark_as_paid(&api, &purchase(1, "Pago", None, None)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyInStatus { id: 1, .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_sends_canonical_status() {
        let api = MockApi::with_purchases(vec![purchase(4, "Pago", None, None)]);
        let updated = cancel(&api, &purchase(4, "Pago", None, None)).await.unwrap();
        assert_eq!(updated.status, PurchaseStatus::Cancelado);
        assert_eq!(api.calls(), vec![Call::UpdateStatus(4, PurchaseStatus::Cancelado)]);
    }

    #[tokio::test]
    async fn test_cancel_delivered_purchase_is_invalid() {
        let api = MockApi::default();
        let err = cancel(&api, &purchase(4, "Entregue", None, None)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_status_failure_surfaces_api_error() {
        let api = MockApi::with_purchases(vec![purchase(1, "Pendente", None, None)]);
        api.fail_status_updates();
        let err = mark_as_paid(&api, &purchase(1, "Pendente", None, None)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Api(ApiError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_generate_label_for_one_moves_status_then_generates() {
        let paid = purchase(2, "Pago", None, Some("ME-2"));
        let api = MockApi::with_purchases(vec![paid.clone()]);

        let outcome = generate_label_for_one(&api, &paid).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                Call::UpdateStatus(2, PurchaseStatus::AguardandoEtiqueta),
                Call::GenerateLabels(vec!["ME-2".into()]),
            ]
        );
        match outcome {
            LabelOutcome::Generated { purchase, label_code } => {
                assert_eq!(purchase.status, PurchaseStatus::AguardandoEtiqueta);
                assert_eq!(label_code, "ME-2");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_label_for_one_without_code_only_moves_status() {
        let paid = purchase(3, "Pago", None, None);
        let api = MockApi::with_purchases(vec![paid.clone()]);

        let outcome = generate_label_for_one(&api, &paid).await.unwrap();

        assert!(matches!(outcome, LabelOutcome::MissingLabelCode { .. }));
        assert_eq!(outcome.purchase().status, PurchaseStatus::AguardandoEtiqueta);
        assert_eq!(api.calls(), vec![Call::UpdateStatus(3, PurchaseStatus::AguardandoEtiqueta)]);
    }

    #[tokio::test]
    async fn test_generate_label_for_one_skips_status_when_already_waiting() {
        let waiting = purchase(5, "Aguardando Etiqueta", None, Some("ME-5"));
        let api = MockApi::with_purchases(vec![waiting.clone()]);

        generate_label_for_one(&api, &waiting).await.unwrap();

        assert_eq!(api.calls(), vec![Call::GenerateLabels(vec!["ME-5".into()])]);
    }

    #[test]
    fn test_generation_plan_filters_selection_status_and_code() {
        let purchases = vec![
            purchase(1, "Pago", None, Some("ME-1")),
            purchase(2, "Pago", None, None),
            purchase(3, "Pendente", None, Some("ME-3")),
            purchase(4, "Aguardando Etiqueta", None, Some("ME-4")),
            purchase(5, "Pago", None, Some("ME-5")),
        ];
        let plan = plan_label_generation(&purchases, &selection(&[1, 2, 3, 4])).unwrap();
        assert_eq!(plan.purchase_ids, vec![1, 4]);
        assert_eq!(plan.label_codes, vec!["ME-1".to_string(), "ME-4".to_string()]);
    }

    #[test]
    fn test_print_plan_requires_generated_labels() {
        let purchases = vec![
            purchase(1, "Etiqueta PDF Gerada", None, Some("ME-1")),
            purchase(2, "Pago", None, Some("ME-2")),
        ];
        let plan = plan_label_printing(&purchases, &selection(&[1, 2])).unwrap();
        assert_eq!(plan.label_codes, vec!["ME-1".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_plan_issues_no_call() {
        let purchases = vec![purchase(1, "Pendente", None, Some("ME-1"))];
        let err = plan_label_generation(&purchases, &selection(&[1])).unwrap_err();
        assert!(matches!(err, WorkflowError::NothingEligible(LabelAction::Generate)));
        assert_eq!(err.to_string(), "No selected purchase is eligible for label generation");

        let api = MockApi::default();
        let err = print_labels_batch(&api, &LabelPlan::default()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NothingEligible(LabelAction::Print)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_calls_are_aggregate() {
        let api = MockApi::default();
        let plan = LabelPlan {
            purchase_ids: vec![1, 2],
            label_codes: vec!["ME-1".into(), "ME-2".into()],
        };
        generate_labels_batch(&api, &plan).await.unwrap();
        let printed = print_labels_batch(&api, &plan).await.unwrap();
        assert_eq!(printed.url, "https://example.test/labels.pdf");
        assert_eq!(
            api.calls(),
            vec![
                Call::GenerateLabels(vec!["ME-1".into(), "ME-2".into()]),
                Call::PrintLabels(vec!["ME-1".into(), "ME-2".into()]),
            ]
        );
    }

    #[tokio::test]
    async fn test_refresh_tracking_reloads_list() {
        let api = MockApi::with_purchases(vec![purchase(1, "Postado", None, None)]);
        let purchases = refresh_tracking(&api).await.unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(api.calls(), vec![Call::RefreshTracking, Call::ListPurchases]);
    }
}
