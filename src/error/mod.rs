//! Escrow relay error types.

mod escrow;
pub use escrow::EscrowError;

mod ledger;
pub use ledger::LedgerError;

mod storage;
pub use storage::StorageError;

use jsonrpsee::types::error::{ErrorObject, INTERNAL_ERROR_CODE, INVALID_PARAMS_CODE};

impl From<EscrowError> for ErrorObject<'static> {
    fn from(err: EscrowError) -> Self {
        let code = match &err {
            EscrowError::Ledger(_)
            | EscrowError::Storage(_)
            | EscrowError::SettlementFailed(_)
            | EscrowError::Internal(_) => INTERNAL_ERROR_CODE,
            _ => INVALID_PARAMS_CODE,
        };
        ErrorObject::owned(code, err.to_string(), Some(err.kind()))
    }
}
