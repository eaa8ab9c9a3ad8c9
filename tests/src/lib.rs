//! # Integration Test Suite
//!
//! Cross-crate flows exercising the finalization state machine and the
//! commits sync protocol together, the way a node wires them up.

#[cfg(test)]
mod integration {
    mod support;

    mod atomic_rejection;
    mod commits_sync_flow;
}
