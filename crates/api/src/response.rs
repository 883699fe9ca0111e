//! Response envelope for write endpoints.
//!
//! Catalog reads (`GET /assets...`) return the public catalog shapes
//! directly. Mutations wrap their result in `{ "data": ... }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
