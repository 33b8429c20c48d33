// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Record layouts of the ZooKeeper wire protocol
//!
//! Field names follow the protocol's own record definitions so decoded
//! values read the same as the server's logs.

use crate::shape::{Field, RecordShape, Shape};

// Sequence element shapes
pub static TEXT_ELEMENT: Shape = Shape::Text;
pub static ACL_ELEMENT: Shape = Shape::Record(&ACL);

const fn field(name: &'static str, shape: Shape) -> Field {
    Field { name, shape }
}

/// Znode metadata returned alongside data-bearing responses (68 bytes)
pub static STAT: RecordShape = RecordShape {
    name: "Stat",
    fields: &[
        field("czxid", Shape::Long),
        field("mzxid", Shape::Long),
        field("ctime", Shape::Long),
        field("mtime", Shape::Long),
        field("version", Shape::Int),
        field("cversion", Shape::Int),
        field("aversion", Shape::Int),
        field("ephemeralOwner", Shape::Long),
        field("dataLength", Shape::Int),
        field("numChildren", Shape::Int),
        field("pzxid", Shape::Long),
    ],
};

pub static ACL: RecordShape = RecordShape {
    name: "ACL",
    fields: &[
        field("perms", Shape::Int),
        field("scheme", Shape::Text),
        field("id", Shape::Text),
    ],
};

pub static EMPTY: RecordShape = RecordShape {
    name: "Empty",
    fields: &[],
};

// Framing

pub static REQUEST_HEADER: RecordShape = RecordShape {
    name: "RequestHeader",
    fields: &[field("xid", Shape::Int), field("type", Shape::Int)],
};

pub static REPLY_HEADER: RecordShape = RecordShape {
    name: "ReplyHeader",
    fields: &[
        field("xid", Shape::Int),
        field("zxid", Shape::Long),
        field("err", Shape::Int),
    ],
};

pub static MULTI_HEADER: RecordShape = RecordShape {
    name: "MultiHeader",
    fields: &[
        field("type", Shape::Int),
        field("done", Shape::Bool),
        field("err", Shape::Int),
    ],
};

// Session establishment

pub static CONNECT_REQUEST: RecordShape = RecordShape {
    name: "ConnectRequest",
    fields: &[
        field("protocolVersion", Shape::Int),
        field("lastZxidSeen", Shape::Long),
        field("timeOut", Shape::Int),
        field("sessionId", Shape::Long),
        field("passwd", Shape::Bytes),
    ],
};

pub static CONNECT_RESPONSE: RecordShape = RecordShape {
    name: "ConnectResponse",
    fields: &[
        field("protocolVersion", Shape::Int),
        field("timeOut", Shape::Int),
        field("sessionId", Shape::Long),
        field("passwd", Shape::Bytes),
    ],
};

pub static WATCHER_EVENT: RecordShape = RecordShape {
    name: "WatcherEvent",
    fields: &[
        field("type", Shape::Int),
        field("state", Shape::Int),
        field("path", Shape::Text),
    ],
};

// Requests

static PATH_FIELDS: [Field; 1] = [field("path", Shape::Text)];
static PATH_WATCH_FIELDS: [Field; 2] = [field("path", Shape::Text), field("watch", Shape::Bool)];
static PATH_VERSION_FIELDS: [Field; 2] = [field("path", Shape::Text), field("version", Shape::Int)];
static PATH_WATCH_TYPE_FIELDS: [Field; 2] = [field("path", Shape::Text), field("type", Shape::Int)];

pub static CREATE_REQUEST: RecordShape = RecordShape {
    name: "CreateRequest",
    fields: &[
        field("path", Shape::Text),
        field("data", Shape::Bytes),
        field("acl", Shape::Seq(&ACL_ELEMENT)),
        field("flags", Shape::Int),
    ],
};

pub static CREATE_TTL_REQUEST: RecordShape = RecordShape {
    name: "CreateTTLRequest",
    fields: &[
        field("path", Shape::Text),
        field("data", Shape::Bytes),
        field("acl", Shape::Seq(&ACL_ELEMENT)),
        field("flags", Shape::Int),
        field("ttl", Shape::Long),
    ],
};

pub static DELETE_REQUEST: RecordShape = RecordShape {
    name: "DeleteRequest",
    fields: &PATH_VERSION_FIELDS,
};

pub static CHECK_VERSION_REQUEST: RecordShape = RecordShape {
    name: "CheckVersionRequest",
    fields: &PATH_VERSION_FIELDS,
};

pub static EXISTS_REQUEST: RecordShape = RecordShape {
    name: "ExistsRequest",
    fields: &PATH_WATCH_FIELDS,
};

pub static GET_DATA_REQUEST: RecordShape = RecordShape {
    name: "GetDataRequest",
    fields: &PATH_WATCH_FIELDS,
};

pub static GET_CHILDREN_REQUEST: RecordShape = RecordShape {
    name: "GetChildrenRequest",
    fields: &PATH_WATCH_FIELDS,
};

pub static GET_CHILDREN2_REQUEST: RecordShape = RecordShape {
    name: "GetChildren2Request",
    fields: &PATH_WATCH_FIELDS,
};

pub static GET_ACL_REQUEST: RecordShape = RecordShape {
    name: "GetACLRequest",
    fields: &PATH_FIELDS,
};

pub static SYNC_REQUEST: RecordShape = RecordShape {
    name: "SyncRequest",
    fields: &PATH_FIELDS,
};

pub static DELETE_CONTAINER_REQUEST: RecordShape = RecordShape {
    name: "DeleteContainerRequest",
    fields: &PATH_FIELDS,
};

pub static SET_DATA_REQUEST: RecordShape = RecordShape {
    name: "SetDataRequest",
    fields: &[
        field("path", Shape::Text),
        field("data", Shape::Bytes),
        field("version", Shape::Int),
    ],
};

pub static SET_ACL_REQUEST: RecordShape = RecordShape {
    name: "SetACLRequest",
    fields: &[
        field("path", Shape::Text),
        field("acl", Shape::Seq(&ACL_ELEMENT)),
        field("version", Shape::Int),
    ],
};

pub static SET_WATCHES: RecordShape = RecordShape {
    name: "SetWatches",
    fields: &[
        field("relativeZxid", Shape::Long),
        field("dataWatches", Shape::Seq(&TEXT_ELEMENT)),
        field("existWatches", Shape::Seq(&TEXT_ELEMENT)),
        field("childWatches", Shape::Seq(&TEXT_ELEMENT)),
    ],
};

pub static AUTH_PACKET: RecordShape = RecordShape {
    name: "AuthPacket",
    fields: &[
        field("type", Shape::Int),
        field("scheme", Shape::Text),
        field("auth", Shape::Bytes),
    ],
};

pub static SASL_REQUEST: RecordShape = RecordShape {
    name: "GetSASLRequest",
    fields: &[field("token", Shape::Bytes)],
};

pub static RECONFIG_REQUEST: RecordShape = RecordShape {
    name: "ReconfigRequest",
    fields: &[
        field("joiningServers", Shape::Text),
        field("leavingServers", Shape::Text),
        field("newMembers", Shape::Text),
        field("curConfigId", Shape::Long),
    ],
};

pub static CHECK_WATCHES_REQUEST: RecordShape = RecordShape {
    name: "CheckWatchesRequest",
    fields: &PATH_WATCH_TYPE_FIELDS,
};

pub static REMOVE_WATCHES_REQUEST: RecordShape = RecordShape {
    name: "RemoveWatchesRequest",
    fields: &PATH_WATCH_TYPE_FIELDS,
};

// Responses

pub static CREATE_RESPONSE: RecordShape = RecordShape {
    name: "CreateResponse",
    fields: &PATH_FIELDS,
};

pub static CREATE2_RESPONSE: RecordShape = RecordShape {
    name: "Create2Response",
    fields: &[
        field("path", Shape::Text),
        field("stat", Shape::Record(&STAT)),
    ],
};

static STAT_FIELDS: [Field; 1] = [field("stat", Shape::Record(&STAT))];

pub static EXISTS_RESPONSE: RecordShape = RecordShape {
    name: "ExistsResponse",
    fields: &STAT_FIELDS,
};

pub static SET_DATA_RESPONSE: RecordShape = RecordShape {
    name: "SetDataResponse",
    fields: &STAT_FIELDS,
};

pub static SET_ACL_RESPONSE: RecordShape = RecordShape {
    name: "SetACLResponse",
    fields: &STAT_FIELDS,
};

static DATA_STAT_FIELDS: [Field; 2] = [
    field("data", Shape::Bytes),
    field("stat", Shape::Record(&STAT)),
];

pub static GET_DATA_RESPONSE: RecordShape = RecordShape {
    name: "GetDataResponse",
    fields: &DATA_STAT_FIELDS,
};

pub static RECONFIG_RESPONSE: RecordShape = RecordShape {
    name: "ReconfigResponse",
    fields: &DATA_STAT_FIELDS,
};

pub static GET_ACL_RESPONSE: RecordShape = RecordShape {
    name: "GetACLResponse",
    fields: &[
        field("acl", Shape::Seq(&ACL_ELEMENT)),
        field("stat", Shape::Record(&STAT)),
    ],
};

pub static GET_CHILDREN_RESPONSE: RecordShape = RecordShape {
    name: "GetChildrenResponse",
    fields: &[field("children", Shape::Seq(&TEXT_ELEMENT))],
};

pub static GET_CHILDREN2_RESPONSE: RecordShape = RecordShape {
    name: "GetChildren2Response",
    fields: &[
        field("children", Shape::Seq(&TEXT_ELEMENT)),
        field("stat", Shape::Record(&STAT)),
    ],
};

pub static SYNC_RESPONSE: RecordShape = RecordShape {
    name: "SyncResponse",
    fields: &PATH_FIELDS,
};

pub static SASL_RESPONSE: RecordShape = RecordShape {
    name: "SetSASLResponse",
    fields: &[field("token", Shape::Bytes)],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_record_sizes() {
        assert_eq!(STAT.min_len(), 68);
        assert_eq!(MULTI_HEADER.min_len(), 9);
        assert_eq!(CONNECT_REQUEST.min_len(), 4 + 8 + 4 + 8 + 4);
        assert_eq!(EMPTY.min_len(), 0);
    }

    #[test]
    fn shared_field_lists_keep_distinct_names() {
        assert_eq!(EXISTS_REQUEST.name, "ExistsRequest");
        assert_eq!(GET_DATA_REQUEST.name, "GetDataRequest");
        assert!(GET_DATA_REQUEST.field("watch").is_some());
        assert!(SYNC_REQUEST.field("watch").is_none());
    }
}
