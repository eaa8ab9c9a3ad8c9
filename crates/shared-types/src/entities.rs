//! # Core Chain Entities
//!
//! Block headers, blocks, and transactions, including the finalization-commit
//! transaction kinds the finalization layer extracts from block bodies.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A block height.
pub type Height = u64;

/// A 64-byte signature.
pub type Signature = [u8; 64];

/// A 32-byte public key identifying a validator.
pub type PublicKey = [u8; 32];

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

/// A peer identifier (alias for `NodeId` in peer contexts).
pub type PeerId = NodeId;

/// The header of a block containing metadata and root hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u16,
    /// Block height in the chain.
    pub height: Height,
    /// Hash of the parent block (creates the chain linkage).
    pub parent_hash: Hash,
    /// Merkle root of all transactions in the block.
    pub merkle_root: Hash,
    /// Unix timestamp when the block was proposed.
    pub timestamp: u64,
}

impl BlockHeader {
    /// Create a genesis header (height 0, zero parent).
    pub fn genesis(timestamp: u64) -> Self {
        Self {
            version: 1,
            height: 0,
            parent_hash: [0u8; 32],
            merkle_root: [0u8; 32],
            timestamp,
        }
    }

    /// Compute the block hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.merkle_root);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.finalize().into()
    }
}

/// Transaction kinds known to the node.
///
/// The finalization kinds (`Deposit` through `AdminCommand`) carry
/// vote/deposit data and are extractable from a block without the rest of
/// its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Plain value transfer.
    Transfer,
    /// Block reward.
    Coinbase,
    /// Validator stake deposit.
    Deposit,
    /// Finalization vote.
    Vote,
    /// Validator logout announcement.
    Logout,
    /// Stake withdrawal after logout.
    Withdraw,
    /// Slashing evidence.
    Slash,
    /// Permissioning command signed by the admin key set.
    AdminCommand,
}

impl TransactionKind {
    fn tag(self) -> u8 {
        match self {
            TransactionKind::Transfer => 0,
            TransactionKind::Coinbase => 1,
            TransactionKind::Deposit => 2,
            TransactionKind::Vote => 3,
            TransactionKind::Logout => 4,
            TransactionKind::Withdraw => 5,
            TransactionKind::Slash => 6,
            TransactionKind::AdminCommand => 7,
        }
    }
}

/// A transaction as carried in block bodies and sync messages.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Discriminates commit transactions from ordinary payments.
    pub kind: TransactionKind,
    /// Kind-specific payload (bincode-encoded for commit kinds).
    pub payload: Vec<u8>,
    /// Signature over the payload.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Transaction {
    /// Whether this transaction is a finalization commit, i.e. carries
    /// vote/deposit bookkeeping for the finalization layer.
    pub fn is_finality_commit(&self) -> bool {
        matches!(
            self.kind,
            TransactionKind::Deposit
                | TransactionKind::Vote
                | TransactionKind::Logout
                | TransactionKind::Withdraw
                | TransactionKind::Slash
                | TransactionKind::AdminCommand
        )
    }

    /// Compute the transaction hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update([self.kind.tag()]);
        hasher.update(&self.payload);
        hasher.update(self.signature);
        hasher.finalize().into()
    }

    /// Build a vote commit transaction.
    pub fn vote(payload: &VotePayload) -> Self {
        Self {
            kind: TransactionKind::Vote,
            payload: payload.encode(),
            signature: [0u8; 64],
        }
    }

    /// Build a deposit commit transaction.
    pub fn deposit(payload: &DepositPayload) -> Self {
        Self {
            kind: TransactionKind::Deposit,
            payload: payload.encode(),
            signature: [0u8; 64],
        }
    }

    /// Build a logout commit transaction.
    pub fn logout(payload: &ExitPayload) -> Self {
        Self {
            kind: TransactionKind::Logout,
            payload: payload.encode(),
            signature: [0u8; 64],
        }
    }

    /// Build a plain transfer (not a finalization commit).
    pub fn transfer(payload: Vec<u8>) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            payload,
            signature: [0u8; 64],
        }
    }

    /// Decode the payload as a vote, if this is a vote transaction.
    pub fn decode_vote(&self) -> Option<VotePayload> {
        if self.kind != TransactionKind::Vote {
            return None;
        }
        bincode::deserialize(&self.payload).ok()
    }

    /// Decode the payload as a deposit, if this is a deposit transaction.
    pub fn decode_deposit(&self) -> Option<DepositPayload> {
        if self.kind != TransactionKind::Deposit {
            return None;
        }
        bincode::deserialize(&self.payload).ok()
    }

    /// Decode the payload as a validator exit, for logout, withdraw and
    /// slash transactions.
    pub fn decode_exit(&self) -> Option<ExitPayload> {
        if !matches!(
            self.kind,
            TransactionKind::Logout | TransactionKind::Withdraw | TransactionKind::Slash
        ) {
            return None;
        }
        bincode::deserialize(&self.payload).ok()
    }
}

/// Payload of a finalization vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePayload {
    /// The voting validator.
    pub validator: PublicKey,
    /// Epoch of the checkpoint being voted for.
    pub target_epoch: u64,
    /// Hash of the checkpoint block being voted for.
    pub target_hash: Hash,
    /// Epoch of the most recent justified checkpoint the vote builds on.
    pub source_epoch: u64,
}

impl VotePayload {
    /// Serialize the payload for embedding in a transaction.
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("vote payload serialization cannot fail")
    }
}

/// Payload of a validator stake deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayload {
    /// The depositing validator.
    pub validator: PublicKey,
    /// Deposited stake in base units.
    pub amount: u64,
}

impl DepositPayload {
    /// Serialize the payload for embedding in a transaction.
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("deposit payload serialization cannot fail")
    }
}

/// Payload of a validator exit (logout, withdraw or slash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPayload {
    /// The exiting (or slashed) validator.
    pub validator: PublicKey,
}

impl ExitPayload {
    /// Serialize the payload for embedding in a transaction.
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("exit payload serialization cannot fail")
    }
}

/// A full block: header plus transaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// All transactions in this block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Extract the finalization-commit transactions from the body.
    pub fn extract_commits(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.is_finality_commit())
            .cloned()
            .collect()
    }
}

/// Compute the merkle root committed to by a block header.
pub fn compute_merkle_root(transactions: &[Transaction]) -> Hash {
    let mut hasher = Sha256::new();
    for tx in transactions {
        hasher.update(tx.hash());
    }
    hasher.finalize().into()
}
