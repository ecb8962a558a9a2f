//! Postgres data type OIDs.
//!
//! The object IDs here are the builtin entries of `pg_type` a simple query
//! can produce in a `RowDescription`. They are stable across server versions.

/// Postgres object identifier.
pub type Oid = u32;

pub const BOOL: Oid = 16;
pub const BYTEA: Oid = 17;
pub const CHAR: Oid = 18;
pub const NAME: Oid = 19;
pub const INT8: Oid = 20;
pub const INT2: Oid = 21;
pub const INT2VECTOR: Oid = 22;
pub const INT4: Oid = 23;
pub const REGPROC: Oid = 24;
pub const TEXT: Oid = 25;
pub const OID: Oid = 26;
pub const TID: Oid = 27;
pub const XID: Oid = 28;
pub const CID: Oid = 29;
pub const OIDVECTOR: Oid = 30;
pub const JSON: Oid = 114;
pub const XML: Oid = 142;
pub const TIMESTAMPTZ: Oid = 1184;
pub const JSONB: Oid = 3802;

/// Resolve a data type OID to its type name.
///
/// Unmapped OIDs resolve to `"unknown"`.
pub const fn type_name(oid: Oid) -> &'static str {
    match oid {
        BOOL => "bool",
        BYTEA => "bytea",
        CHAR => "char",
        NAME => "name",
        INT8 => "int8",
        INT2 => "int2",
        INT2VECTOR => "int2vector",
        INT4 => "int4",
        REGPROC => "regproc",
        TEXT => "text",
        OID => "oid",
        TID => "tid",
        XID => "xid",
        CID => "cid",
        OIDVECTOR => "oidvector",
        JSON => "json",
        XML => "xml",
        TIMESTAMPTZ => "timestamptz",
        JSONB => "jsonb",
        _ => "unknown",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_and_unknown_oids() {
        assert_eq!(type_name(23), "int4");
        assert_eq!(type_name(1184), "timestamptz");
        assert_eq!(type_name(99999), "unknown");
    }
}
