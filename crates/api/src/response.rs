//! Response envelope shared by every `/api/v1` handler.

use serde::Serialize;

/// `{ "data": T }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
