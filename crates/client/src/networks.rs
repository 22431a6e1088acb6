//! Static metadata for the known Ethereum networks.

use crate::error::ClientError;
use std::fmt;

/// Consensus mechanism a network runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    ProofOfWork,
    ProofOfAuthority,
}

impl fmt::Display for Consensus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProofOfWork => "Proof of Work",
            Self::ProofOfAuthority => "Proof of Authority",
        })
    }
}

/// Metadata for a single known network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkData {
    pub id: u64,
    pub name: &'static str,
    pub consensus: Consensus,
    etherscan_prefix: &'static str,
}

/// The networks this client knows block explorers and names for.
static NETWORKS: [NetworkData; 4] = [
    NetworkData { id: 1, name: "Mainnet", consensus: Consensus::ProofOfWork, etherscan_prefix: "" },
    NetworkData {
        id: 3,
        name: "Ropsten",
        consensus: Consensus::ProofOfWork,
        etherscan_prefix: "ropsten.",
    },
    NetworkData {
        id: 4,
        name: "Rinkeby",
        consensus: Consensus::ProofOfAuthority,
        etherscan_prefix: "rinkeby.",
    },
    NetworkData {
        id: 42,
        name: "Kovan",
        consensus: Consensus::ProofOfAuthority,
        etherscan_prefix: "kovan.",
    },
];

/// Looks up the static metadata for `id`.
pub fn network_data(id: u64) -> Result<&'static NetworkData, ClientError> {
    NETWORKS.iter().find(|network| network.id == id).ok_or(ClientError::UnknownNetwork(id))
}

/// Human-readable name of network `id`.
pub fn network_name(id: u64) -> Result<&'static str, ClientError> {
    Ok(network_data(id)?.name)
}

/// Consensus mechanism of network `id`.
pub fn network_consensus(id: u64) -> Result<Consensus, ClientError> {
    Ok(network_data(id)?.consensus)
}

/// Kind of Etherscan resource a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    Transaction,
    Address,
    Token,
}

impl ExplorerKind {
    const fn path_segment(self) -> &'static str {
        match self {
            Self::Transaction => "tx",
            Self::Address => "address",
            Self::Token => "token",
        }
    }
}

/// Builds an Etherscan link for `data` on network `id`.
pub fn explorer_url(id: u64, kind: ExplorerKind, data: &str) -> Result<String, ClientError> {
    let network = network_data(id)?;
    Ok(format!(
        "https://{}etherscan.io/{}/{data}",
        network.etherscan_prefix,
        kind.path_segment()
    ))
}
