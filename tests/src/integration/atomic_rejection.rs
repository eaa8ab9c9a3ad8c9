//! Peer-supplied batches are validated wholesale: one malformed entry
//! rejects the message, scores the peer, and leaves no partial state.

use super::support::Node;
use ec_02_commits_sync::{
    build_locator, process_get_commits, process_new_commits, PeerScoreBook, SyncConfig, SyncError,
};
use shared_types::{NodeId, Transaction};

#[test]
fn test_tampered_batch_is_rejected_wholesale() {
    let genesis = Node::test_genesis();
    let mut server = Node::new(genesis.clone());
    server.grow(6);

    let mut client = Node::new(genesis);
    let config = SyncConfig::default();
    let mut book = PeerScoreBook::new(config.ban_threshold);
    let peer = NodeId([0xAA; 32]);

    let locator = build_locator(client.chain.as_ref(), client.finalized_height());
    let serve = || {
        process_get_commits(
            server.chain.as_ref(),
            server.proc.repository(),
            server.proc.engine(),
            &server.cache,
            &locator,
            &config,
        )
        .unwrap()
    };

    // A man-in-the-middle slips a plain transfer into the second pair.
    let mut tampered = serve();
    let poisoned = tampered.data[1].header.hash();
    tampered.data[1]
        .commits
        .push(Transaction::transfer(vec![0xFF]));

    let err = process_new_commits(client.chain.as_ref(), &mut client.cache, &tampered).unwrap_err();
    assert_eq!(err, SyncError::InvalidCommitTransaction { block: poisoned });

    // Atomic: no header was accepted, no commits attached, and the peer
    // took the full penalty.
    assert_eq!(client.chain.height(), 0);
    assert!(client.cache.is_empty());
    book.record_error(peer, &err);
    assert!(book.is_banned(&peer));

    // The untampered batch from an honest peer still applies cleanly.
    let clean = serve();
    let accepted = clean.data.len() as u64;
    process_new_commits(client.chain.as_ref(), &mut client.cache, &clean).unwrap();
    assert_eq!(client.chain.height(), accepted);
    assert_eq!(client.cache.len(), accepted as usize);
}

#[test]
fn test_bad_header_stops_acceptance_at_the_offender() {
    let genesis = Node::test_genesis();
    let mut server = Node::new(genesis.clone());
    server.grow(6);

    let mut client = Node::new(genesis);
    let locator = build_locator(client.chain.as_ref(), client.finalized_height());
    let mut response = process_get_commits(
        server.chain.as_ref(),
        server.proc.repository(),
        server.proc.engine(),
        &server.cache,
        &locator,
        &SyncConfig::default(),
    )
    .unwrap();

    // Break the linkage of the third header.
    response.data[2].header.parent_hash = [0xBB; 32];
    let offender = response.data[2].header.hash();

    let err = process_new_commits(client.chain.as_ref(), &mut client.cache, &response).unwrap_err();
    assert_eq!(err.failing_block(), Some(offender));
    assert_eq!(err.penalty(), 100);

    // Commit validation passed, so headers before the offender are in;
    // everything at and after it is not.
    assert_eq!(client.chain.height(), 2);
}
