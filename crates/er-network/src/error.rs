use thiserror::Error;

use er_core::{AccidentId, EdgeNodeId};

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no edge nodes configured")]
    NoEdgeNodes,

    #[error("edge node {0} already exists")]
    DuplicateEdgeNode(EdgeNodeId),

    #[error("accident {0} is already registered")]
    DuplicateAccident(AccidentId),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
