use thiserror::Error;

use crate::core::hamiltonian::HamiltonianError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Image {idx_image} not found in chain {idx_chain}")]
    ImageNotFound { idx_image: usize, idx_chain: usize },

    #[error("Chain {idx_chain} not found")]
    ChainNotFound { idx_chain: usize },

    #[error("Energy model error: {source}")]
    Hamiltonian {
        #[from]
        source: HamiltonianError,
    },

    #[error("{0} is not yet implemented")]
    NotImplemented(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
