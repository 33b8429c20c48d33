// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Operation catalog: opcode to request/response shapes

use serde::Serialize;
use std::fmt;

use crate::chain::{CHAIN_REQUEST, CHAIN_RESPONSE};
use crate::error::DecodeError;
use crate::records;
use crate::shape::Shape;

/// Operation codes understood by the observer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(i32)]
pub enum OpCode {
    Notify = 0,
    Create = 1,
    Delete = 2,
    Exists = 3,
    GetData = 4,
    SetData = 5,
    GetAcl = 6,
    SetAcl = 7,
    GetChildren = 8,
    Sync = 9,
    Ping = 11,
    GetChildren2 = 12,
    Check = 13,
    Multi = 14,
    Create2 = 15,
    Reconfig = 16,
    CheckWatches = 17,
    RemoveWatches = 18,
    CreateContainer = 19,
    DeleteContainer = 20,
    CreateTtl = 21,
    CreateSession = -10,
    CloseSession = -11,
    SetAuth = 100,
    SetWatches = 101,
    Sasl = 102,
    /// Marks a failed entry inside a multi-operation response
    Error = -1,
}

impl OpCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map a wire code to an opcode, `None` for codes outside the protocol
    pub fn from_code(code: i32) -> Option<OpCode> {
        let op = match code {
            0 => OpCode::Notify,
            1 => OpCode::Create,
            2 => OpCode::Delete,
            3 => OpCode::Exists,
            4 => OpCode::GetData,
            5 => OpCode::SetData,
            6 => OpCode::GetAcl,
            7 => OpCode::SetAcl,
            8 => OpCode::GetChildren,
            9 => OpCode::Sync,
            11 => OpCode::Ping,
            12 => OpCode::GetChildren2,
            13 => OpCode::Check,
            14 => OpCode::Multi,
            15 => OpCode::Create2,
            16 => OpCode::Reconfig,
            17 => OpCode::CheckWatches,
            18 => OpCode::RemoveWatches,
            19 => OpCode::CreateContainer,
            20 => OpCode::DeleteContainer,
            21 => OpCode::CreateTtl,
            -10 => OpCode::CreateSession,
            -11 => OpCode::CloseSession,
            100 => OpCode::SetAuth,
            101 => OpCode::SetWatches,
            102 => OpCode::Sasl,
            -1 => OpCode::Error,
            _ => return None,
        };
        Some(op)
    }

    /// Name used in log fields and metric labels
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Notify => "Notify",
            OpCode::Create => "Create",
            OpCode::Delete => "Delete",
            OpCode::Exists => "Exists",
            OpCode::GetData => "GetData",
            OpCode::SetData => "SetData",
            OpCode::GetAcl => "GetACL",
            OpCode::SetAcl => "SetACL",
            OpCode::GetChildren => "GetChildren",
            OpCode::Sync => "Sync",
            OpCode::Ping => "Ping",
            OpCode::GetChildren2 => "GetChildren2",
            OpCode::Check => "Check",
            OpCode::Multi => "Multi",
            OpCode::Create2 => "Create2",
            OpCode::Reconfig => "Reconfig",
            OpCode::CheckWatches => "CheckWatches",
            OpCode::RemoveWatches => "RemoveWatches",
            OpCode::CreateContainer => "CreateContainer",
            OpCode::DeleteContainer => "DeleteContainer",
            OpCode::CreateTtl => "CreateTTL",
            OpCode::CreateSession => "CreateSession",
            OpCode::CloseSession => "CloseSession",
            OpCode::SetAuth => "SetAuth",
            OpCode::SetWatches => "SetWatches",
            OpCode::Sasl => "Sasl",
            OpCode::Error => "Error",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the correlation engine treats an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Category {
    Normal,
    /// Keep-alive, never tracked
    Ping,
    /// Session establishment, framed without a request header
    Handshake,
    /// Request body carries a `watch` flag
    Watchable,
    /// Body is a multi-operation chain
    Chain,
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub op: OpCode,
    pub request: Shape,
    pub response: Shape,
    pub category: Category,
}

const fn entry(op: OpCode, request: Shape, response: Shape, category: Category) -> CatalogEntry {
    CatalogEntry {
        op,
        request,
        response,
        category,
    }
}

static CATALOG: [CatalogEntry; 25] = [
    entry(
        OpCode::Create,
        Shape::Record(&records::CREATE_REQUEST),
        Shape::Record(&records::CREATE_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::Delete,
        Shape::Record(&records::DELETE_REQUEST),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::Exists,
        Shape::Record(&records::EXISTS_REQUEST),
        Shape::Record(&records::EXISTS_RESPONSE),
        Category::Watchable,
    ),
    entry(
        OpCode::GetData,
        Shape::Record(&records::GET_DATA_REQUEST),
        Shape::Record(&records::GET_DATA_RESPONSE),
        Category::Watchable,
    ),
    entry(
        OpCode::SetData,
        Shape::Record(&records::SET_DATA_REQUEST),
        Shape::Record(&records::SET_DATA_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::GetAcl,
        Shape::Record(&records::GET_ACL_REQUEST),
        Shape::Record(&records::GET_ACL_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::SetAcl,
        Shape::Record(&records::SET_ACL_REQUEST),
        Shape::Record(&records::SET_ACL_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::GetChildren,
        Shape::Record(&records::GET_CHILDREN_REQUEST),
        Shape::Record(&records::GET_CHILDREN_RESPONSE),
        Category::Watchable,
    ),
    entry(
        OpCode::Sync,
        Shape::Record(&records::SYNC_REQUEST),
        Shape::Record(&records::SYNC_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::Ping,
        Shape::Record(&records::EMPTY),
        Shape::Record(&records::EMPTY),
        Category::Ping,
    ),
    entry(
        OpCode::GetChildren2,
        Shape::Record(&records::GET_CHILDREN2_REQUEST),
        Shape::Record(&records::GET_CHILDREN2_RESPONSE),
        Category::Watchable,
    ),
    entry(
        OpCode::Check,
        Shape::Record(&records::CHECK_VERSION_REQUEST),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::Multi,
        Shape::Custom(&CHAIN_REQUEST),
        Shape::Custom(&CHAIN_RESPONSE),
        Category::Chain,
    ),
    entry(
        OpCode::Create2,
        Shape::Record(&records::CREATE_REQUEST),
        Shape::Record(&records::CREATE2_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::Reconfig,
        Shape::Record(&records::RECONFIG_REQUEST),
        Shape::Record(&records::RECONFIG_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::CheckWatches,
        Shape::Record(&records::CHECK_WATCHES_REQUEST),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::RemoveWatches,
        Shape::Record(&records::REMOVE_WATCHES_REQUEST),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::CreateContainer,
        Shape::Record(&records::CREATE_REQUEST),
        Shape::Record(&records::CREATE2_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::DeleteContainer,
        Shape::Record(&records::DELETE_CONTAINER_REQUEST),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::CreateTtl,
        Shape::Record(&records::CREATE_TTL_REQUEST),
        Shape::Record(&records::CREATE2_RESPONSE),
        Category::Normal,
    ),
    entry(
        OpCode::CreateSession,
        Shape::Record(&records::CONNECT_REQUEST),
        Shape::Record(&records::CONNECT_RESPONSE),
        Category::Handshake,
    ),
    entry(
        OpCode::CloseSession,
        Shape::Record(&records::EMPTY),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::SetAuth,
        Shape::Record(&records::AUTH_PACKET),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::SetWatches,
        Shape::Record(&records::SET_WATCHES),
        Shape::Record(&records::EMPTY),
        Category::Normal,
    ),
    entry(
        OpCode::Sasl,
        Shape::Record(&records::SASL_REQUEST),
        Shape::Record(&records::SASL_RESPONSE),
        Category::Normal,
    ),
];

/// Look up the catalog entry for a wire opcode
pub fn lookup(code: i32) -> Result<&'static CatalogEntry, DecodeError> {
    CATALOG
        .iter()
        .find(|entry| entry.op.code() == code)
        .ok_or(DecodeError::UnknownOperation(code))
}

/// All catalog entries in opcode declaration order
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_round_trips_through_its_code() {
        for entry in entries() {
            assert_eq!(OpCode::from_code(entry.op.code()), Some(entry.op));
            assert_eq!(lookup(entry.op.code()).unwrap().op, entry.op);
        }
    }

    #[test]
    fn notify_and_error_are_not_catalogued() {
        assert_eq!(lookup(0).unwrap_err(), DecodeError::UnknownOperation(0));
        assert_eq!(lookup(-1).unwrap_err(), DecodeError::UnknownOperation(-1));
        assert_eq!(lookup(10).unwrap_err(), DecodeError::UnknownOperation(10));
        assert_eq!(OpCode::from_code(10), None);
    }

    #[test]
    fn categories() {
        assert_eq!(lookup(11).unwrap().category, Category::Ping);
        assert_eq!(lookup(-10).unwrap().category, Category::Handshake);
        assert_eq!(lookup(14).unwrap().category, Category::Chain);
        for code in [3, 4, 8, 12] {
            assert_eq!(lookup(code).unwrap().category, Category::Watchable);
        }
        assert_eq!(lookup(1).unwrap().category, Category::Normal);
    }

    #[test]
    fn watchable_requests_declare_a_watch_field() {
        for entry in entries().iter().filter(|e| e.category == Category::Watchable) {
            let Shape::Record(request) = entry.request else {
                panic!("{} request is not a record", entry.op);
            };
            assert!(request.field("watch").is_some(), "{}", entry.op);
        }
    }

    #[test]
    fn label_names_have_no_prefix() {
        assert_eq!(OpCode::GetData.name(), "GetData");
        assert_eq!(OpCode::CreateTtl.to_string(), "CreateTTL");
    }
}
