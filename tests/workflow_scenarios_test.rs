// ABOUTME: End-to-end scenarios for the change workflow without the HTTP layer
// ABOUTME: Covers approve, cancel, revert, duplicates, batches, grouping, and search filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;

use anyhow::Result;
use changeflow::{
    changes::validation::validate_change,
    constants::defaults::UNKNOWN_USER,
    entities::EntityStore,
    errors::ErrorCode,
    models::{Change, ChangeOperation, ChangeState, ManagedEntity, TelemetryTwoProfile},
    pagination::PageRequest,
};
use common::{as_user, create_test_context, telemetry_two_profile};

fn filters(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[tokio::test]
async fn test_approve_create_moves_change_and_writes_entity() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;

    let change = workflow
        .propose_create(&as_user("alice"), telemetry_two_profile("p1", "p1"))
        .await?;
    assert_eq!(change.state, ChangeState::Pending);
    assert!(workflow.entities().load("p1").await?.is_none());

    let approved = workflow.approve(&as_user("bob"), &change.id).await?;

    assert_eq!(approved.change.id, change.id);
    assert_eq!(approved.approved_user, "bob");
    assert_eq!(approved.change.state, ChangeState::Approved);
    assert!(workflow.get_change(&change.id).await?.is_none());
    assert!(workflow.get_approved_change(&change.id).await?.is_some());

    let live = workflow.entities().load("p1").await?.expect("entity written");
    assert_eq!(live.name, "p1");
    assert_eq!(live, telemetry_two_profile("p1", "p1"));
    Ok(())
}

#[tokio::test]
async fn test_approve_unknown_change_is_not_found() {
    let context = create_test_context();

    let err = context
        .telemetry_two
        .approve(&as_user("bob"), "no-such-id")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(err.message, "Change with id: no-such-id does not exist");
}

#[tokio::test]
async fn test_approve_without_identity_uses_unknown_user() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let change = workflow
        .propose_create(&as_user(""), telemetry_two_profile("p1", "p1"))
        .await?;
    assert_eq!(change.author, UNKNOWN_USER);

    let approved = workflow.approve(&as_user(""), &change.id).await?;

    assert_eq!(approved.approved_user, UNKNOWN_USER);
    assert!(workflow.get_change(&change.id).await?.is_none());
    assert!(workflow.entities().load("p1").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_cancel_paths() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let existing = telemetry_two_profile("p1", "live");
    workflow.entities().save(&existing).await?;

    assert_eq!(workflow.cancel("").await.unwrap_err().code, ErrorCode::InvalidInput);
    assert_eq!(
        workflow.cancel("nonexistent").await.unwrap_err().code,
        ErrorCode::ResourceNotFound
    );

    let change = workflow.propose_delete(&as_user("alice"), "p1").await?;
    let cancelled = workflow.cancel(&change.id).await?;

    assert_eq!(cancelled.id, change.id);
    assert!(workflow.get_change(&change.id).await?.is_none());
    assert!(workflow.all_approved_changes().await?.is_empty());
    assert_eq!(workflow.entities().load("p1").await?, Some(existing));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_submission_conflicts() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;

    workflow
        .propose_create(&as_user("alice"), telemetry_two_profile("p1", "p1"))
        .await?;
    let err = workflow
        .propose_create(&as_user("bob"), telemetry_two_profile("p1", "p1"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(err.message, "The same change already exists");
    assert_eq!(workflow.all_changes().await?.len(), 1);

    workflow
        .propose_create(&as_user("bob"), telemetry_two_profile("p1", "other name"))
        .await?;
    assert_eq!(workflow.all_changes().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_revert_create_and_delete() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let reviewer = as_user("bob");

    let created = workflow
        .propose_create(&as_user("alice"), telemetry_two_profile("p1", "p1"))
        .await?;
    workflow.approve(&reviewer, &created.id).await?;
    let reverted = workflow.revert(&reviewer, &created.id).await?;

    assert_eq!(reverted.change.operation, Some(ChangeOperation::Create));
    assert!(workflow.entities().load("p1").await?.is_none());
    assert!(workflow.get_approved_change(&created.id).await?.is_none());

    let prior = telemetry_two_profile("p2", "keep me");
    workflow.entities().save(&prior).await?;
    let deleted = workflow.propose_delete(&as_user("alice"), "p2").await?;
    workflow.approve(&reviewer, &deleted.id).await?;
    assert!(workflow.entities().load("p2").await?.is_none());

    workflow.revert(&reviewer, &deleted.id).await?;
    assert_eq!(workflow.entities().load("p2").await?, Some(prior));
    assert!(workflow.all_approved_changes().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_revert_update_restores_previous_snapshot() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let original = telemetry_two_profile("p1", "before");
    workflow.entities().save(&original).await?;

    let update = workflow
        .propose_update(&as_user("alice"), telemetry_two_profile("p1", "after"))
        .await?;
    assert_eq!(update.old_entity.as_ref(), Some(&original));
    workflow.approve(&as_user("bob"), &update.id).await?;
    assert_eq!(workflow.entities().load("p1").await?.unwrap().name, "after");

    workflow.revert(&as_user("bob"), &update.id).await?;
    assert_eq!(workflow.entities().load("p1").await?, Some(original));
    Ok(())
}

#[tokio::test]
async fn test_revert_unknown_is_not_found() {
    let context = create_test_context();
    let err = context
        .telemetry_two
        .revert(&as_user("bob"), "missing")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_batch_approve_isolates_missing_id() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let author = as_user("alice");

    let first = workflow
        .propose_create(&author, telemetry_two_profile("p1", "one"))
        .await?;
    let second = workflow
        .propose_create(&author, telemetry_two_profile("p2", "two"))
        .await?;
    let ids = vec![first.id.clone(), "missing".to_owned(), second.id.clone()];

    let report = workflow.approve_changes(&as_user("bob"), &ids).await?;

    assert_eq!(report.processed, vec![first.id.clone(), second.id.clone()]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors.get("missing").map(String::as_str),
        Some("Change with id: missing does not exist")
    );
    assert!(workflow.entities().load("p1").await?.is_some());
    assert!(workflow.entities().load("p2").await?.is_some());
    assert!(workflow.get_approved_change(&first.id).await?.is_some());
    assert!(workflow.get_approved_change(&second.id).await?.is_some());

    let report = workflow
        .revert_changes(&as_user("bob"), &[first.id.clone(), "missing".to_owned()])
        .await?;
    assert_eq!(report.processed, vec![first.id]);
    assert!(workflow.entities().load("p1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_batch_with_only_failures_is_rejected() {
    let context = create_test_context();
    let err = context
        .telemetry_two
        .approve_changes(&as_user("bob"), &["a".to_owned(), "b".to_owned()])
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.message, "No change could be approved");
    assert!(err.context.details["errors"]["a"].is_string());
}

#[tokio::test]
async fn test_grouping_by_entity_id() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let author = as_user("alice");

    let base_a = telemetry_two_profile("entity-a", "a");
    for name in ["a1", "a2", "a3"] {
        let change = Change::update(base_a.clone(), telemetry_two_profile("entity-a", name), "alice");
        workflow.submit(&author, change).await?;
    }
    let base_b = telemetry_two_profile("entity-b", "b");
    for name in ["b1", "b2"] {
        let change = Change::update(base_b.clone(), telemetry_two_profile("entity-b", name), "alice");
        workflow.submit(&author, change).await?;
    }

    let grouped = workflow
        .grouped_changes(PageRequest::new(1, 10, 1000)?)
        .await?;
    assert_eq!(grouped.total, 2);
    assert_eq!(grouped.groups.len(), 2);
    assert_eq!(grouped.groups["entity-a"].len(), 3);
    assert_eq!(grouped.groups["entity-b"].len(), 2);

    let second_page = workflow
        .grouped_changes(PageRequest::new(2, 1, 1000)?)
        .await?;
    assert_eq!(second_page.total, 2);
    assert_eq!(
        second_page.groups.keys().collect::<Vec<_>>(),
        vec!["entity-b"]
    );

    let ids = workflow.changed_entity_ids().await?;
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["entity-a", "entity-b"]);
    Ok(())
}

#[tokio::test]
async fn test_author_filter_matches_substring() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;

    for (author, id) in [("alice", "p1"), ("bob", "p2"), ("khalid", "p3"), ("carol", "p4")] {
        workflow
            .propose_create(&as_user(author), telemetry_two_profile(id, id))
            .await?;
    }

    let matches = workflow
        .find_by_context_for_changes(&filters(&[("author", "ali")]))
        .await?;
    let mut authors: Vec<_> = matches.iter().map(|change| change.author.as_str()).collect();
    authors.sort_unstable();
    assert_eq!(authors, vec!["alice", "khalid"]);

    let everything = workflow.find_by_context_for_changes(&HashMap::new()).await?;
    assert_eq!(everything.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_approved_filter_by_author_and_entity() -> Result<()> {
    let context = create_test_context();
    let workflow = &context.telemetry_two;
    let reviewer = as_user("reviewer");

    for (author, id, name) in [
        ("alice", "p1", "alpha"),
        ("alice", "p2", "beta"),
        ("bob", "p3", "beta"),
    ] {
        let change = workflow
            .propose_create(&as_user(author), telemetry_two_profile(id, name))
            .await?;
        workflow.approve(&reviewer, &change.id).await?;
    }

    let matches = workflow
        .find_by_context_for_approved_changes("stb", &filters(&[("author", "ali"), ("entity", "BETA")]))
        .await?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].change.entity_id, "p2");

    let by_profile_name = workflow
        .find_by_context_for_approved_changes("stb", &filters(&[("profileName", "alp")]))
        .await?;
    assert_eq!(by_profile_name.len(), 1);

    let other_partition = workflow
        .find_by_context_for_approved_changes("xhome", &HashMap::new())
        .await?;
    assert!(other_partition.is_empty());
    Ok(())
}

#[test]
fn test_every_validator_rule_rejects() {
    let valid = Change::create(telemetry_two_profile("p1", "p1"), "alice");
    assert!(validate_change(Some(&valid)).is_ok());
    assert!(validate_change::<TelemetryTwoProfile>(None).is_err());

    let mut broken = Vec::new();
    let mut change = valid.clone();
    change.id = " ".to_owned();
    broken.push(change);
    let mut change = valid.clone();
    change.author = String::new();
    broken.push(change);
    let mut change = valid.clone();
    change.entity_id = String::new();
    broken.push(change);
    let mut change = valid.clone();
    change.operation = None;
    broken.push(change);
    let mut change = valid.clone();
    change.new_entity = Some(TelemetryTwoProfile::default());
    broken.push(change);
    let mut change = Change::delete(telemetry_two_profile("p1", "p1"), "alice");
    change.old_entity = None;
    broken.push(change);

    for change in &broken {
        let err = validate_change(Some(change)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput, "{change:?}");
    }
    assert!(TelemetryTwoProfile::default().is_empty());
}
