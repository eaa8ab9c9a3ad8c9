//! # ec-02-commits-sync
//!
//! Peer-to-peer synchronization of finalization commits.
//!
//! ## Overview
//!
//! Instead of transferring full blocks, peers exchange headers paired with
//! the finalization-commit transactions extracted from each block: enough
//! to reconstruct the finalization state of a chain before its bodies are
//! downloaded.
//!
//! ```text
//! requester                              server
//!    │  GETCOMMITS CommitsLocator          │
//!    │ ────────────────────────────────▶   │  resolve start/stop,
//!    │                                     │  walk the active chain
//!    │          COMMITS CommitsResponse    │
//!    │ ◀────────────────────────────────   │
//!    │  validate batch, accept headers,    │
//!    │  attach commits, drive the          │
//!    │  finalization state machine         │
//! ```
//!
//! The serving side is [`serve::process_get_commits`]; the receiving side
//! is [`receive::process_new_commits`]. Peer-supplied data is validated
//! wholesale before any header is accepted, and failures carry the first
//! offending block hash plus a misbehavior score for
//! [`domain::dos::PeerScoreBook`].

pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod receive;
pub mod serve;

pub use config::SyncConfig;
pub use domain::cache::CommitsCache;
pub use domain::dos::PeerScoreBook;
pub use domain::locator::build_locator;
pub use domain::messages::{
    CommitsLocator, CommitsResponse, HeaderAndCommits, ResponseStatus, SyncMessage,
};
pub use error::SyncError;
pub use receive::{process_new_commits, NextStep};
pub use serve::process_get_commits;
