use thiserror::Error;

use er_core::CoreError;
use er_dispatch::DispatchError;
use er_network::NetworkError;

use crate::OracleError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("edge-node network error: {0}")]
    Network(#[from] NetworkError),

    #[error("ambulance fleet error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("traffic oracle error: {0}")]
    Oracle(#[from] OracleError),
}

pub type SimResult<T> = Result<T, SimError>;
