//! Predefined variable and function catalog.
//!
//! This is a representative subset of the provider catalog covering the
//! variable families and function namespaces the linter exercises; extend it
//! here as coverage grows. Reference URLs point at the provider docs.

use std::collections::HashSet;

use crate::context::functions::{Function, FunctionNode};
use crate::context::scope::Scope;
use crate::context::types::VclType;
use crate::context::variables::{Accessor, VariableNode};

const DOCS: &str = "https://developer.fastly.com/reference/vcl";

fn client_scopes() -> Scope {
    Scope::RECV
        | Scope::HASH
        | Scope::HIT
        | Scope::MISS
        | Scope::PASS
        | Scope::ERROR
        | Scope::DELIVER
        | Scope::LOG
}

pub fn variables() -> VariableNode {
    use VclType::*;

    let mut root = VariableNode::default();
    let client = client_scopes();
    let backend = Scope::BACKEND;

    // Client connection
    root.insert("client.ip", Accessor::read_only(Ip, client));
    root.insert(
        "client.identity",
        Accessor::read_write(String, client).with_reference(DOCS),
    );
    root.insert("client.port", Accessor::read_only(Integer, client));
    root.insert("client.geo.city", Accessor::read_only(String, client));
    root.insert("client.geo.country_code", Accessor::read_only(String, client));
    root.insert("client.requests", Accessor::read_only(Integer, client));

    // Server / service
    root.insert("server.ip", Accessor::read_only(Ip, client));
    root.insert("server.hostname", Accessor::read_only(String, client));
    root.insert("server.identity", Accessor::read_only(String, client));
    root.insert("server.region", Accessor::read_only(String, client));

    // Time
    root.insert("now", Accessor::read_only(Time, Scope::ANY));
    root.insert("now.sec", Accessor::read_only(String, Scope::ANY));

    // Client request
    root.insert("req.method", Accessor::read_write(String, client));
    root.insert("req.url", Accessor::read_write(String, client));
    root.insert("req.proto", Accessor::read_only(String, client));
    root.insert("req.backend", Accessor::read_write(Backend, Scope::RECV));
    root.insert("req.restarts", Accessor::read_only(Integer, client));
    root.insert("req.hash", Accessor::read_write(String, Scope::HASH));
    root.insert(
        "req.hash_always_miss",
        Accessor::read_write(Bool, Scope::RECV),
    );
    root.insert(
        "req.hash_ignore_busy",
        Accessor::read_write(Bool, Scope::RECV),
    );
    root.insert("req.is_ipv6", Accessor::read_only(Bool, client));
    root.insert("req.body", Accessor::read_only(String, client));
    root.insert_wildcard("req.http", Accessor::header(client).with_reference(DOCS));

    // Backend request
    root.insert("bereq.method", Accessor::read_write(String, backend));
    root.insert("bereq.url", Accessor::read_write(String, backend));
    root.insert("bereq.proto", Accessor::read_only(String, backend));
    root.insert(
        "bereq.between_bytes_timeout",
        Accessor::read_write(Rtime, backend),
    );
    root.insert(
        "bereq.connect_timeout",
        Accessor::read_write(Rtime, backend),
    );
    root.insert(
        "bereq.first_byte_timeout",
        Accessor::read_write(Rtime, backend),
    );
    root.insert_wildcard("bereq.http", Accessor::header(backend));

    // Backend response
    root.insert("beresp.status", Accessor::read_write(Integer, Scope::FETCH));
    root.insert("beresp.response", Accessor::read_write(String, Scope::FETCH));
    root.insert("beresp.ttl", Accessor::read_write(Rtime, Scope::FETCH));
    root.insert("beresp.grace", Accessor::read_write(Rtime, Scope::FETCH));
    root.insert(
        "beresp.stale_while_revalidate",
        Accessor::read_write(Rtime, Scope::FETCH),
    );
    root.insert("beresp.cacheable", Accessor::read_write(Bool, Scope::FETCH));
    root.insert(
        "beresp.backend.name",
        Accessor::read_only(String, Scope::FETCH),
    );
    root.insert(
        "beresp.backend.ip",
        Accessor::read_only(Ip, Scope::FETCH),
    );
    root.insert_wildcard("beresp.http", Accessor::header(Scope::FETCH));

    // Cached object
    root.insert(
        "obj.status",
        Accessor::read_write(Integer, Scope::HIT | Scope::ERROR),
    );
    root.insert(
        "obj.response",
        Accessor::read_write(String, Scope::ERROR),
    );
    root.insert("obj.hits", Accessor::read_only(Integer, Scope::HIT));
    root.insert(
        "obj.ttl",
        Accessor::read_write(Rtime, Scope::HIT | Scope::ERROR),
    );
    root.insert(
        "obj.grace",
        Accessor::read_write(Rtime, Scope::HIT | Scope::ERROR),
    );
    root.insert(
        "obj.stale_if_error",
        Accessor::read_write(Rtime, Scope::HIT | Scope::ERROR),
    );
    root.insert_wildcard("obj.http", Accessor::header(Scope::HIT | Scope::ERROR));

    // Client response
    let resp_scopes = Scope::DELIVER | Scope::LOG;
    root.insert("resp.status", Accessor::read_write(Integer, resp_scopes));
    root.insert("resp.response", Accessor::read_write(String, resp_scopes));
    root.insert("resp.proto", Accessor::read_write(String, resp_scopes));
    root.insert("resp.is_locally_generated", Accessor::read_only(Bool, resp_scopes));
    root.insert_wildcard("resp.http", Accessor::header(resp_scopes));

    // Regex capture groups materialise under re.group.N after a match.
    root.insert_wildcard("re.group", Accessor::read_only(String, Scope::ANY));

    // Error bookkeeping
    root.insert("fastly.error", Accessor::read_only(String, Scope::ERROR));

    root
}

pub fn functions() -> FunctionNode {
    use VclType::*;

    let mut root = FunctionNode::default();
    let any = Scope::ANY;

    let f = |ret: Option<VclType>, args: Vec<Vec<VclType>>| Function {
        return_type: ret,
        arguments: args,
        scopes: any,
        reference: Some(DOCS),
    };

    // std namespace
    root.insert("std.atoi", f(Some(Integer), vec![vec![String]]));
    root.insert("std.atof", f(Some(Float), vec![vec![String]]));
    root.insert(
        "std.itoa",
        f(Some(String), vec![vec![Integer], vec![Integer, Integer]]),
    );
    root.insert("std.strlen", f(Some(Integer), vec![vec![String]]));
    root.insert("std.tolower", f(Some(String), vec![vec![String]]));
    root.insert("std.toupper", f(Some(String), vec![vec![String]]));
    root.insert("std.strstr", f(Some(String), vec![vec![String, String]]));
    root.insert("std.prefixof", f(Some(Bool), vec![vec![String, String]]));
    root.insert("std.suffixof", f(Some(Bool), vec![vec![String, String]]));
    root.insert(
        "std.replace",
        f(Some(String), vec![vec![String, String, String]]),
    );
    root.insert(
        "std.replaceall",
        f(Some(String), vec![vec![String, String, String]]),
    );
    root.insert("std.strrev", f(Some(String), vec![vec![String]]));
    root.insert("std.ip", f(Some(Ip), vec![vec![String, String]]));
    root.insert("std.time", f(Some(Time), vec![vec![String, Time]]));
    root.insert("std.integer2time", f(Some(Time), vec![vec![Integer]]));
    root.insert(
        "std.collect",
        f(None, vec![vec![Id], vec![Id, String]]),
    );

    // Global helpers
    root.insert(
        "substr",
        f(
            Some(String),
            vec![vec![String, Integer], vec![String, Integer, Integer]],
        ),
    );
    root.insert(
        "regsub",
        f(Some(String), vec![vec![String, String, String]]),
    );
    root.insert(
        "regsuball",
        f(Some(String), vec![vec![String, String, String]]),
    );
    root.insert("randombool", f(Some(Bool), vec![vec![Integer, Integer]]));
    root.insert(
        "randomint",
        f(Some(Integer), vec![vec![Integer, Integer]]),
    );
    root.insert(
        "http_status_matches",
        f(Some(Bool), vec![vec![Integer, String]]),
    );
    root.insert(
        "subfield",
        f(Some(String), vec![vec![String, String], vec![String, String, String]]),
    );

    // table namespace: first argument is the table name written bare.
    root.insert(
        "table.lookup",
        f(Some(String), vec![vec![Id, String], vec![Id, String, String]]),
    );
    root.insert(
        "table.lookup_bool",
        f(Some(Bool), vec![vec![Id, String, Bool]]),
    );
    root.insert(
        "table.lookup_integer",
        f(Some(Integer), vec![vec![Id, String, Integer]]),
    );
    root.insert(
        "table.lookup_rtime",
        f(Some(Rtime), vec![vec![Id, String, Rtime]]),
    );
    root.insert("table.contains", f(Some(Bool), vec![vec![Id, String]]));

    // header namespace
    root.insert("header.get", f(Some(String), vec![vec![Id, String]]));
    root.insert("header.set", f(None, vec![vec![Id, String, String]]));
    root.insert("header.unset", f(None, vec![vec![Id, String]]));
    root.insert(
        "header.filter",
        f(None, vec![vec![Id, String], vec![Id, String, String]]),
    );

    // digest namespace
    root.insert("digest.hash_md5", f(Some(String), vec![vec![String]]));
    root.insert("digest.hash_sha1", f(Some(String), vec![vec![String]]));
    root.insert("digest.hash_sha256", f(Some(String), vec![vec![String]]));
    root.insert("digest.base64", f(Some(String), vec![vec![String]]));
    root.insert("digest.base64_decode", f(Some(String), vec![vec![String]]));
    root.insert(
        "digest.secure_is_equal",
        f(Some(Bool), vec![vec![String, String]]),
    );

    // math namespace
    root.insert("math.floor", f(Some(Float), vec![vec![Float]]));
    root.insert("math.ceil", f(Some(Float), vec![vec![Float]]));
    root.insert("math.round", f(Some(Float), vec![vec![Float]]));
    root.insert("math.pow", f(Some(Float), vec![vec![Float, Float]]));
    root.insert("math.min", f(Some(Float), vec![vec![Float, Float]]));
    root.insert("math.max", f(Some(Float), vec![vec![Float, Float]]));

    // uuid namespace
    root.insert("uuid.version4", f(Some(String), vec![vec![]]));
    root.insert("uuid.is_valid", f(Some(Bool), vec![vec![String]]));

    // querystring namespace
    root.insert(
        "querystring.get",
        f(Some(String), vec![vec![String, String]]),
    );
    root.insert("querystring.remove", f(Some(String), vec![vec![String]]));
    root.insert(
        "querystring.filter",
        f(Some(String), vec![vec![String, String]]),
    );
    root.insert("querystring.sort", f(Some(String), vec![vec![String]]));

    // ratelimit namespace: penaltybox / ratecounter names are bare idents.
    root.insert(
        "ratelimit.check_rate",
        f(
            Some(Bool),
            vec![vec![String, Id, Integer, Integer, Integer, Id, Rtime]],
        ),
    );
    root.insert(
        "ratelimit.penaltybox_add",
        f(None, vec![vec![Id, String, Rtime]]),
    );
    root.insert(
        "ratelimit.penaltybox_has",
        f(Some(Bool), vec![vec![Id, String]]),
    );
    root.insert(
        "ratelimit.ratecounter_increment",
        f(None, vec![vec![Id, String], vec![Id, String, Integer]]),
    );

    root
}

/// Bare identifiers that are reserved but untyped: lifecycle return states,
/// cipher suites and padding modes accepted by crypto functions.
pub fn reserved_identifiers() -> HashSet<&'static str> {
    [
        // return states
        "lookup",
        "pass",
        "error",
        "restart",
        "deliver",
        "deliver_stale",
        "fetch",
        "hash",
        "upgrade",
        "none",
        // cipher names
        "aes128",
        "aes192",
        "aes256",
        // block modes / padding
        "cbc",
        "ctr",
        "pkcs1",
        "oaep",
        "nopad",
    ]
    .into_iter()
    .collect()
}
