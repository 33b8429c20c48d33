// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Service error codes carried in response and multi-op headers

use serde::{Deserialize, Serialize};
use std::fmt;

/// An error code as it appears on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const OK: ErrorCode = ErrorCode(0);

    // System and server-side errors
    pub const SYSTEM_ERROR: ErrorCode = ErrorCode(-1);
    pub const RUNTIME_INCONSISTENCY: ErrorCode = ErrorCode(-2);
    pub const DATA_INCONSISTENCY: ErrorCode = ErrorCode(-3);
    pub const CONNECTION_LOSS: ErrorCode = ErrorCode(-4);
    pub const MARSHALLING_ERROR: ErrorCode = ErrorCode(-5);
    pub const UNIMPLEMENTED: ErrorCode = ErrorCode(-6);
    pub const OPERATION_TIMEOUT: ErrorCode = ErrorCode(-7);
    pub const BAD_ARGUMENTS: ErrorCode = ErrorCode(-8);
    pub const INVALID_STATE: ErrorCode = ErrorCode(-9);

    // API errors
    pub const API_ERROR: ErrorCode = ErrorCode(-100);
    pub const NO_NODE: ErrorCode = ErrorCode(-101);
    pub const NO_AUTH: ErrorCode = ErrorCode(-102);
    pub const BAD_VERSION: ErrorCode = ErrorCode(-103);
    pub const NO_CHILDREN_FOR_EPHEMERALS: ErrorCode = ErrorCode(-108);
    pub const NODE_EXISTS: ErrorCode = ErrorCode(-110);
    pub const NOT_EMPTY: ErrorCode = ErrorCode(-111);
    pub const SESSION_EXPIRED: ErrorCode = ErrorCode(-112);
    pub const INVALID_CALLBACK: ErrorCode = ErrorCode(-113);
    pub const INVALID_ACL: ErrorCode = ErrorCode(-114);
    pub const AUTH_FAILED: ErrorCode = ErrorCode(-115);
    pub const CLOSING: ErrorCode = ErrorCode(-116);
    pub const NOTHING: ErrorCode = ErrorCode(-117);
    pub const SESSION_MOVED: ErrorCode = ErrorCode(-118);

    pub fn is_ok(self) -> bool {
        self == ErrorCode::OK
    }

    /// Human readable message, empty for [`ErrorCode::OK`]
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::OK => "",
            ErrorCode::SYSTEM_ERROR => "system error",
            ErrorCode::RUNTIME_INCONSISTENCY => "runtime inconsistency",
            ErrorCode::DATA_INCONSISTENCY => "data inconsistency",
            ErrorCode::CONNECTION_LOSS => "connection loss",
            ErrorCode::MARSHALLING_ERROR => "marshalling error",
            ErrorCode::UNIMPLEMENTED => "unimplemented",
            ErrorCode::OPERATION_TIMEOUT => "operation timeout",
            ErrorCode::BAD_ARGUMENTS => "bad arguments",
            ErrorCode::INVALID_STATE => "invalid state",
            ErrorCode::API_ERROR => "api error",
            ErrorCode::NO_NODE => "node does not exist",
            ErrorCode::NO_AUTH => "not authenticated",
            ErrorCode::BAD_VERSION => "version conflict",
            ErrorCode::NO_CHILDREN_FOR_EPHEMERALS => "ephemeral nodes may not have children",
            ErrorCode::NODE_EXISTS => "node already exists",
            ErrorCode::NOT_EMPTY => "node has children",
            ErrorCode::SESSION_EXPIRED => "session has been expired by the server",
            ErrorCode::INVALID_ACL => "invalid ACL specified",
            ErrorCode::AUTH_FAILED => "client authentication failed",
            ErrorCode::CLOSING => "zookeeper is closing",
            ErrorCode::NOTHING => "no server responses to process",
            ErrorCode::SESSION_MOVED => "session moved to another server, so operation is ignored",
            _ => "unknown error",
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "ok ({})", self.0)
        } else {
            write!(f, "{} ({})", self.message(), self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(ErrorCode::OK.message(), "");
        assert_eq!(ErrorCode::API_ERROR.message(), "api error");
        assert_eq!(ErrorCode(-101).message(), "node does not exist");
        assert_eq!(ErrorCode(9999).message(), "unknown error");
        // INVALID_CALLBACK has a name but no message of its own
        assert_eq!(ErrorCode::INVALID_CALLBACK.message(), "unknown error");
    }

    #[test]
    fn display_includes_code() {
        assert_eq!(ErrorCode::NODE_EXISTS.to_string(), "node already exists (-110)");
        assert_eq!(ErrorCode::OK.to_string(), "ok (0)");
    }
}
