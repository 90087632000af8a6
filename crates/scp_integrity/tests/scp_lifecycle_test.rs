//! Tests for SCP create/update/delete and paginated reads.

mod test_utils;

use scp_core::{NewScp, NewTale, PageRequest, ScpDeletePolicy, ScpPatch};
use scp_database::StoreOperation;
use scp_error::ReferenceErrorKind;
use test_utils::{assert_consistent, refs, seed_scps, setup, writes};

#[tokio::test]
async fn test_create_scp_rejects_duplicate_key() {
    let (store, manager) = setup(ScpDeletePolicy::Tolerate);
    seed_scps(&manager, &["SCP-173"]).await;
    store.clear_calls();

    let err = manager
        .create_scp(NewScp::new("SCP-173", "Another Sculpture"))
        .await
        .unwrap_err();

    assert_eq!(
        err.reference_kind(),
        Some(&ReferenceErrorKind::ScpAlreadyExists("SCP-173".to_string()))
    );
    assert!(writes(&store).is_empty());
}

#[tokio::test]
async fn test_update_scp_merges_and_keeps_back_references() {
    let (_store, manager) = setup(ScpDeletePolicy::Tolerate);
    manager
        .create_scp(NewScp::new("SCP-049", "Plague Doctor").with_classification("Euclid"))
        .await
        .unwrap();
    let tale = manager
        .create_tale(NewTale::new("Cure").with_scp_refs(refs(&["SCP-049"])))
        .await
        .unwrap();

    let updated = manager
        .update_scp("SCP-049", ScpPatch::default().with_rating(4200))
        .await
        .unwrap();

    assert_eq!(updated.rating, Some(4200));
    assert_eq!(updated.classification.as_deref(), Some("Euclid"));
    assert!(updated.referencing_tale_ids.contains(&tale.id));
}

#[tokio::test]
async fn test_update_scp_errors() {
    let (store, manager) = setup(ScpDeletePolicy::Tolerate);
    seed_scps(&manager, &["SCP-999"]).await;
    store.clear_calls();

    let empty = manager
        .update_scp("SCP-999", ScpPatch::default())
        .await
        .unwrap_err();
    assert_eq!(empty.reference_kind(), Some(&ReferenceErrorKind::NoFieldsProvided));
    assert!(store.calls().is_empty());

    let missing = manager
        .update_scp("SCP-000", ScpPatch::default().with_title("Nothing"))
        .await
        .unwrap_err();
    assert_eq!(
        missing.reference_kind(),
        Some(&ReferenceErrorKind::ScpNotFound("SCP-000".to_string()))
    );
}

#[tokio::test]
async fn test_tolerate_policy_leaves_dangling_forward_reference() {
    let (_store, manager) = setup(ScpDeletePolicy::Tolerate);
    seed_scps(&manager, &["001"]).await;
    let tale = manager
        .create_tale(NewTale::new("Left behind").with_scp_refs(refs(&["001"])))
        .await
        .unwrap();

    manager.delete_scp("001").await.unwrap();

    assert_eq!(manager.get_tale(&tale.id).await.unwrap().scp_refs, refs(&["001"]));
    let report = manager.audit().await.unwrap();
    assert!(report.repaired_scps.is_empty());
    assert_eq!(report.dangling_references.len(), 1);
    assert_eq!(report.dangling_references[0].scp_id, "001");
    assert_eq!(report.dangling_references[0].tale_id, tale.id);
}

#[tokio::test]
async fn test_block_policy_refuses_referenced_scp() {
    let (store, manager) = setup(ScpDeletePolicy::Block);
    seed_scps(&manager, &["001", "002"]).await;
    manager
        .create_tale(NewTale::new("Anchor").with_scp_refs(refs(&["001"])))
        .await
        .unwrap();
    store.clear_calls();

    let err = manager.delete_scp("001").await.unwrap_err();
    assert_eq!(
        err.reference_kind(),
        Some(&ReferenceErrorKind::ScpStillReferenced {
            scp_id: "001".to_string(),
            tale_count: 1,
        })
    );
    assert!(writes(&store).is_empty());

    manager.delete_scp("002").await.unwrap();
    assert_consistent(&manager).await;
}

#[tokio::test]
async fn test_cascade_policy_strips_key_from_tales() {
    let (store, manager) = setup(ScpDeletePolicy::Cascade);
    seed_scps(&manager, &["001", "002"]).await;
    let tale = manager
        .create_tale(NewTale::new("Pair").with_scp_refs(refs(&["001", "002"])))
        .await
        .unwrap();
    store.clear_calls();

    let deleted = manager.delete_scp("001").await.unwrap();
    assert!(deleted.referencing_tale_ids.contains(&tale.id));

    let ops: Vec<_> = writes(&store).into_iter().map(|c| c.operation).collect();
    assert_eq!(
        ops,
        vec![StoreOperation::DeleteScp, StoreOperation::RemoveScpReference]
    );
    assert_eq!(manager.get_tale(&tale.id).await.unwrap().scp_refs, refs(&["002"]));
    assert_consistent(&manager).await;
}

#[tokio::test]
async fn test_delete_unknown_scp_is_not_found() {
    let (_store, manager) = setup(ScpDeletePolicy::Cascade);

    let err = manager.delete_scp("SCP-3000").await.unwrap_err();

    assert_eq!(
        err.reference_kind(),
        Some(&ReferenceErrorKind::ScpNotFound("SCP-3000".to_string()))
    );
}

#[tokio::test]
async fn test_recreated_scp_is_repaired_by_reconcile() {
    let (_store, manager) = setup(ScpDeletePolicy::Tolerate);
    seed_scps(&manager, &["001"]).await;
    let tale = manager
        .create_tale(NewTale::new("Return").with_scp_refs(refs(&["001"])))
        .await
        .unwrap();
    manager.delete_scp("001").await.unwrap();
    seed_scps(&manager, &["001"]).await;

    let report = manager.reconcile().await.unwrap();

    assert_eq!(report.repaired_scps, refs(&["001"]));
    assert!(manager.get_scp("001").await.unwrap().referencing_tale_ids.contains(&tale.id));
    assert_consistent(&manager).await;
}

#[tokio::test]
async fn test_list_scps_paginates_in_insertion_order() {
    let (_store, manager) = setup(ScpDeletePolicy::Tolerate);
    seed_scps(&manager, &["SCP-005", "SCP-001", "SCP-004", "SCP-002", "SCP-003"]).await;

    let page = manager.list_scps(PageRequest::new(2, 2)).await.unwrap();

    let keys: Vec<_> = page.data.iter().map(|s| s.scp_id.as_str()).collect();
    assert_eq!(keys, vec!["SCP-004", "SCP-002"]);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.page, 2);
}

#[tokio::test]
async fn test_list_tales_past_the_end_is_empty() {
    let (_store, manager) = setup(ScpDeletePolicy::Tolerate);
    manager.create_tale(NewTale::new("Only")).await.unwrap();

    let page = manager.list_tales(PageRequest::new(4, 10)).await.unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.pagination.total_pages, 1);
}
