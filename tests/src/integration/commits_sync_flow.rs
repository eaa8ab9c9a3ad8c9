//! Header-first synchronization between two nodes: paged commits
//! transfer, state reconstruction, full-block completion, and trimming
//! equivalence.

use super::support::Node;
use ec_01_finality::InitStatus;
use ec_02_commits_sync::{
    build_locator, codec, process_get_commits, process_new_commits, NextStep, SyncConfig,
    SyncMessage,
};
use shared_types::ActiveChain;

#[test]
fn test_paged_header_first_sync_reconstructs_state() {
    let genesis = Node::test_genesis();
    let mut server = Node::new(genesis.clone());
    server.grow(13); // finalized checkpoint: height 4

    let mut client = Node::new(genesis);
    let config = SyncConfig {
        max_response_entries: 4,
        ..SyncConfig::default()
    };

    let mut rounds = 0;
    loop {
        rounds += 1;
        assert!(rounds < 20, "sync does not converge");

        let locator = build_locator(client.chain.as_ref(), client.finalized_height());
        let response = process_get_commits(
            server.chain.as_ref(),
            server.proc.repository(),
            server.proc.engine(),
            &server.cache,
            &locator,
            &config,
        )
        .unwrap();
        assert!(response.data.len() <= config.max_response_entries);

        // Ship the response through the wire codec.
        let bytes = codec::encode(&SyncMessage::Commits(response)).unwrap();
        let SyncMessage::Commits(received) =
            codec::decode(&bytes, config.max_message_bytes).unwrap()
        else {
            panic!("expected a COMMITS message");
        };

        let next = process_new_commits(client.chain.as_ref(), &mut client.cache, &received).unwrap();

        // Drive the state machine over the new headers in wire order.
        for pair in &received.data {
            let entry = client.chain.get(&pair.header.hash()).unwrap();
            assert!(client.proc.process_new_commits(&entry, &pair.commits));
        }

        if next == NextStep::EvaluateForkChoice {
            break;
        }
    }

    // The client holds the server's whole header chain, reconstructed
    // from commits alone.
    assert_eq!(client.chain.height(), 13);
    let client_tip = client.proc.repository().tip_state().unwrap().clone();
    assert_eq!(client_tip.init_status(), InitStatus::FromCommits);
    assert_eq!(client_tip.finalized_checkpoint(), Some(4));
    let server_tip = server.proc.repository().tip_state().unwrap();
    assert!(client_tip.agrees_with(server_tip));

    // Full blocks arrive later and complete every state; trimming fires
    // on the way exactly as it did on the server.
    for height in 1..=13 {
        let entry = client.chain.at_height(height).unwrap();
        let block = server
            .chain
            .read_block(&server.chain.at_height(height).unwrap())
            .unwrap();
        assert!(client.proc.process_new_tip(&entry, &block));
    }

    for height in 0..=13u64 {
        let server_entry = server.chain.at_height(height).unwrap();
        let client_entry = client.chain.at_height(height).unwrap();
        assert_eq!(server_entry.hash, client_entry.hash, "height {height}");

        let server_state = server.proc.repository().find(&server_entry.hash);
        let client_state = client.proc.repository().find(&client_entry.hash);
        assert_eq!(
            server_state.is_some(),
            client_state.is_some(),
            "trimming differs at height {height}"
        );
        if let (Some(server_state), Some(client_state)) = (server_state, client_state) {
            assert_eq!(server_state, client_state, "state differs at height {height}");
        }
    }
}

#[test]
fn test_snapshot_sync_completes_on_from_commits_parents() {
    let genesis = Node::test_genesis();
    let mut server = Node::new(genesis.clone());
    server.grow(7);

    // Header-first sync in one big page.
    let mut client = Node::new(genesis);
    let locator = build_locator(client.chain.as_ref(), client.finalized_height());
    let response = process_get_commits(
        server.chain.as_ref(),
        server.proc.repository(),
        server.proc.engine(),
        &server.cache,
        &locator,
        &SyncConfig::default(),
    )
    .unwrap();
    process_new_commits(client.chain.as_ref(), &mut client.cache, &response).unwrap();
    for pair in &response.data {
        let entry = client.chain.get(&pair.header.hash()).unwrap();
        assert!(client.proc.process_new_commits(&entry, &pair.commits));
    }

    // Complete the newest block first, from-commits parent and all, the
    // way snapshot sync lands a tip before backfilling bodies.
    let tip_entry = client.chain.at_height(4).unwrap();
    let tip_block = server
        .chain
        .read_block(&server.chain.at_height(4).unwrap())
        .unwrap();
    assert!(client.proc.process_new_tip(&tip_entry, &tip_block));
    let state = client
        .proc
        .repository()
        .find(&tip_entry.hash)
        .unwrap()
        .clone();
    assert_eq!(state.init_status(), InitStatus::Completed);

    // Its parent is still only derived from commits.
    let parent = client.chain.at_height(3).unwrap();
    assert_eq!(
        client
            .proc
            .repository()
            .find(&parent.hash)
            .unwrap()
            .init_status(),
        InitStatus::FromCommits
    );
}
