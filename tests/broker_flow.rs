//! End-to-end lifecycle against the filesystem-backed store: create grants,
//! list them back, revoke one, all with an already-provisioned (and stopped)
//! daemon directory.

use std::fs;

use gitcap::server::FlappDir;
use gitcap::{BrokerError, GrantKind, ListOutcome, RepositoryRef, ServiceRegistrar};

const PREFIX: &str = "pb://tub@example.net:12345/";

struct Fixture {
    _server_dir: tempfile::TempDir,
    _repo_dir: tempfile::TempDir,
    server: FlappDir,
    repo: RepositoryRef,
}

fn fixture() -> Fixture {
    let server_dir = tempfile::tempdir().unwrap();
    fs::write(server_dir.path().join("furl.prefix"), PREFIX).unwrap();
    let repo_dir = tempfile::tempdir().unwrap();
    let server = FlappDir::new(server_dir.path());
    let repo = RepositoryRef::resolve(repo_dir.path()).unwrap();
    Fixture { server, repo, _server_dir: server_dir, _repo_dir: repo_dir }
}

#[tokio::test]
async fn create_list_revoke_round_trip() {
    let fx = fixture();
    let registrar = ServiceRegistrar::new(&fx.server);

    assert_eq!(registrar.list().await.unwrap(), ListOutcome::NoneConfigured);

    let ro = registrar
        .create(GrantKind::ReadOnly, "for Alice", &fx.repo)
        .await
        .unwrap();
    let rw = registrar
        .create(GrantKind::ReadWrite, "for Bob", &fx.repo)
        .await
        .unwrap();
    assert!(ro.furl.starts_with(PREFIX));
    assert_ne!(ro.furl, rw.furl);

    let ListOutcome::Grants(entries) = registrar.list().await.unwrap() else {
        panic!("expected grants");
    };
    assert_eq!(entries.len(), 2);
    let alice = entries.iter().find(|e| e.furl == ro.furl).unwrap();
    let bob = entries.iter().find(|e| e.furl == rw.furl).unwrap();
    assert!(!alice.writable);
    assert_eq!(alice.comment.as_deref(), Some("for Alice"));
    assert!(bob.writable);
    assert_eq!(bob.comment.as_deref(), Some("for Bob"));
    // Sorted by base capability.
    let furls: Vec<_> = entries.iter().map(|e| e.furl.clone()).collect();
    let mut sorted = furls.clone();
    sorted.sort();
    assert_eq!(furls, sorted);

    // Revoking the read-write grant drops both of its records and leaves the
    // read-only grant alone. The daemon is stopped, so no restart happens.
    let revoked = registrar.revoke(&rw.furl).await.unwrap();
    assert!(!revoked.restarted);
    let ListOutcome::Grants(entries) = registrar.list().await.unwrap() else {
        panic!("expected grants");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].furl, ro.furl);

    // Revoking again: nothing matches, nothing changes.
    let err = registrar.revoke(&rw.furl).await.unwrap_err();
    assert!(matches!(err, BrokerError::NotFound(_)));
    assert!(matches!(registrar.list().await.unwrap(), ListOutcome::Grants(_)));
}

#[tokio::test]
async fn base_capability_revoke_catches_every_operation_record() {
    let fx = fixture();
    let registrar = ServiceRegistrar::new(&fx.server);

    let rw = registrar
        .create(GrantKind::ReadWrite, "", &fx.repo)
        .await
        .unwrap();

    // The base swissnum is a prefix of both operation swissnums, so a single
    // revoke of the base capability removes fetch and push together.
    registrar.revoke(&rw.furl).await.unwrap();
    assert_eq!(registrar.list().await.unwrap(), ListOutcome::NoneConfigured);
}

#[tokio::test]
async fn operation_capability_revoke_matches_only_that_record() {
    let fx = fixture();
    let registrar = ServiceRegistrar::new(&fx.server);

    let rw = registrar
        .create(GrantKind::ReadWrite, "", &fx.repo)
        .await
        .unwrap();

    // Prefix matching is taken at face value: the push operation swissnum is
    // not a prefix of the fetch one, so revoking the push capability leaves
    // the fetch record (and the listed grant) behind.
    let op_furl = format!("{}-push", rw.furl);
    registrar.revoke(&op_furl).await.unwrap();
    let ListOutcome::Grants(entries) = registrar.list().await.unwrap() else {
        panic!("expected grants");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].furl, rw.furl);
}
