//! Wire-level tests against a scripted backend.
//!
//! Backend replies are written into one side of an in-memory duplex before
//! the client acts, then the bytes the client wrote are read back out and
//! checked against the protocol.
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::time::timeout;

use pgsimple::{Config, Connection, ErrorKind, ServerStatus, Value};

fn frame(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(((body.len() + 4) as i32).to_be_bytes());
    out.extend(body);
    out
}

fn auth(code: i32) -> Vec<u8> {
    frame(b'R', &code.to_be_bytes())
}

fn parameter_status(name: &str, value: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(name.as_bytes());
    body.push(0);
    body.extend(value.as_bytes());
    body.push(0);
    frame(b'S', &body)
}

fn backend_key_data(process_id: i32, secret_key: i32) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(process_id.to_be_bytes());
    body.extend(secret_key.to_be_bytes());
    frame(b'K', &body)
}

fn ready(status: u8) -> Vec<u8> {
    frame(b'Z', &[status])
}

fn row_description(fields: &[(&str, u32)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend((fields.len() as i16).to_be_bytes());
    for (name, type_oid) in fields {
        body.extend(name.as_bytes());
        body.push(0);
        body.extend(0i32.to_be_bytes()); // table oid
        body.extend(0i16.to_be_bytes()); // column id
        body.extend((*type_oid as i32).to_be_bytes());
        body.extend((-1i16).to_be_bytes()); // type size
        body.extend((-1i32).to_be_bytes()); // type modifier
        body.extend(0i16.to_be_bytes()); // text format
    }
    frame(b'T', &body)
}

fn data_row(cells: &[Option<&str>]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend((cells.len() as i16).to_be_bytes());
    for cell in cells {
        match cell {
            None => body.extend((-1i32).to_be_bytes()),
            Some(text) => {
                body.extend((text.len() as i32).to_be_bytes());
                body.extend(text.as_bytes());
            }
        }
    }
    frame(b'D', &body)
}

fn command_complete(tag: &str) -> Vec<u8> {
    let mut body = tag.as_bytes().to_vec();
    body.push(0);
    frame(b'C', &body)
}

fn error_response(fields: &[(char, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (code, value) in fields {
        body.push(*code as u8);
        body.extend(value.as_bytes());
        body.push(0);
    }
    body.push(0);
    frame(b'E', &body)
}

fn handshake_replies() -> Vec<u8> {
    let mut replies = auth(0);
    replies.extend(parameter_status("server_version", "16.1"));
    replies.extend(backend_key_data(123, 456));
    replies.extend(ready(b'I'));
    replies
}

fn config() -> Config {
    Config::new("alice", "mydb")
}

/// Read the untagged startup message from the backend side.
async fn read_startup(io: &mut DuplexStream) -> Vec<u8> {
    let mut len = [0u8; 4];
    io.read_exact(&mut len).await.unwrap();
    let mut rest = vec![0u8; i32::from_be_bytes(len) as usize - 4];
    io.read_exact(&mut rest).await.unwrap();
    rest
}

/// Read one tagged frame from the backend side.
async fn read_frame(io: &mut DuplexStream) -> (u8, Vec<u8>) {
    let mut header = [0u8; 5];
    io.read_exact(&mut header).await.unwrap();
    let len = i32::from_be_bytes(header[1..5].try_into().unwrap());
    let mut body = vec![0u8; len as usize - 4];
    io.read_exact(&mut body).await.unwrap();
    (header[0], body)
}

async fn connected(config: Config) -> (Connection<DuplexStream>, DuplexStream) {
    let (client, mut server) = duplex(1 << 16);
    server.write_all(&handshake_replies()).await.unwrap();

    let mut conn = Connection::with_transport(client, config);
    conn.connect().await.unwrap();
    read_startup(&mut server).await;
    (conn, server)
}

#[tokio::test]
async fn trust_handshake() {
    let (client, mut server) = duplex(1 << 16);
    server.write_all(&handshake_replies()).await.unwrap();

    let mut conn = Connection::with_transport(client, config());
    conn.connect().await.unwrap();

    assert_eq!(conn.server_status(), Some(ServerStatus::Idle));
    assert_eq!(conn.server_param("server_version"), Some("16.1"));
    let cancel = conn.cancel_info().unwrap();
    assert_eq!((cancel.process_id, cancel.secret_key), (123, 456));

    let startup = read_startup(&mut server).await;
    assert_eq!(&startup[..4], &196608i32.to_be_bytes());
    let params: Vec<&[u8]> = startup[4..].split(|b| *b == 0).collect();
    assert_eq!(&params[..4], &[&b"user"[..], b"alice", b"database", b"mydb"]);
}

#[tokio::test]
async fn connect_twice_writes_no_second_startup() {
    let (mut conn, mut server) = connected(config()).await;

    conn.connect().await.unwrap();

    let mut byte = [0u8; 1];
    let read = timeout(Duration::from_millis(50), server.read(&mut byte)).await;
    assert!(read.is_err(), "unexpected bytes after repeated connect");
}

#[tokio::test]
async fn cleartext_password_handshake() {
    let (client, mut server) = duplex(1 << 16);
    let mut replies = auth(3);
    replies.extend(handshake_replies());
    server.write_all(&replies).await.unwrap();

    let mut conn = Connection::with_transport(client, config().password("secret"));
    conn.connect().await.unwrap();

    read_startup(&mut server).await;
    let (tag, body) = read_frame(&mut server).await;
    assert_eq!(tag, b'p');
    assert_eq!(&body[..], b"secret\0");
}

#[tokio::test]
async fn cleartext_without_password_fails() {
    let (client, mut server) = duplex(1 << 16);
    server.write_all(&auth(3)).await.unwrap();

    let mut conn = Connection::with_transport(client, config());
    let err = conn.connect().await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Config(_)));
}

#[tokio::test]
async fn md5_and_sasl_are_rejected() {
    for code in [5, 10] {
        let (client, mut server) = duplex(1 << 16);
        server.write_all(&auth(code)).await.unwrap();

        let mut conn = Connection::with_transport(client, config().password("secret"));
        let err = conn.connect().await.unwrap_err();
        let ErrorKind::Auth(auth) = err.kind() else {
            panic!("expected auth error, got {err:?}");
        };
        let expected = if code == 5 { "md5" } else { "sasl" };
        assert_eq!(auth.method(), Some(expected));
    }
}

#[tokio::test]
async fn handshake_error_response_aborts() {
    let (client, mut server) = duplex(1 << 16);
    server
        .write_all(&error_response(&[
            ('S', "FATAL"),
            ('C', "28P01"),
            ('M', "password authentication failed for user \"alice\""),
        ]))
        .await
        .unwrap();

    let mut conn = Connection::with_transport(client, config());
    let err = conn.connect().await.unwrap_err();
    let db = err.into_db_error().unwrap();
    assert_eq!(db.code, "28P01");
    assert_eq!(db.name, Some("InvalidPassword"));

    // handshake failure is terminal
    assert!(conn.execute("SELECT 1").await.is_err());
}

#[tokio::test]
async fn select_one() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = row_description(&[("?column?", 23)]);
    replies.extend(data_row(&[Some("1")]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("SELECT 1").await.unwrap();
    assert_eq!(res.row_count, 1);
    assert_eq!(res.rows[0].get("?column?"), Some(&Value::Int(1)));
    assert_eq!(res.columns[0].type_name, "int4");
    assert_eq!(res.command_tags, ["SELECT 1"]);
    assert_eq!(conn.server_status(), Some(ServerStatus::Idle));

    let (tag, body) = read_frame(&mut server).await;
    assert_eq!(tag, b'Q');
    assert_eq!(&body[..], b"SELECT 1\0");
}

#[tokio::test]
async fn null_cells_and_camel_case() {
    let (mut conn, mut server) = connected(config().camel_case(true)).await;

    let mut replies = row_description(&[("user_id", 23), ("display_name", 25)]);
    replies.extend(data_row(&[Some("7"), None]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("SELECT user_id, display_name FROM users").await.unwrap();
    let row = &res.rows[0];
    assert_eq!(row.get("userId"), Some(&Value::Int(7)));
    assert_eq!(row.get("displayName"), Some(&Value::Null));
    assert_eq!(row.get("user_id"), None);
    assert_eq!(res.columns[0].name, "user_id");
    assert_eq!(res.columns[0].alias, "userId");
}

#[tokio::test]
async fn camel_case_off_keeps_names() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = row_description(&[("user_id", 23)]);
    replies.extend(data_row(&[Some("7")]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("SELECT user_id FROM users").await.unwrap();
    assert_eq!(res.rows[0].get("user_id"), Some(&Value::Int(7)));
}

#[tokio::test]
async fn typed_cells_decode() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = row_description(&[
        ("flag", 16),
        ("payload", 3802),
        ("seen_at", 1184),
        ("addr", 869),
    ]);
    replies.extend(data_row(&[
        Some("t"),
        Some(r#"{"a":1}"#),
        Some("2024-01-15 10:23:54.5+02"),
        Some("192.168.0.1"),
    ]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("SELECT * FROM events").await.unwrap();
    let row = &res.rows[0];
    assert_eq!(row.get("flag").unwrap().as_bool(), Some(true));
    assert_eq!(row.get("payload").unwrap().as_json().unwrap()["a"], 1);
    assert!(matches!(row.get("seen_at"), Some(Value::Timestamptz(_))));
    // unmapped oid stays text
    assert_eq!(row.get("addr").unwrap().as_str(), Some("192.168.0.1"));
    assert_eq!(res.columns[3].type_name, "unknown");
}

#[tokio::test]
async fn database_error_keeps_connection_usable() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = error_response(&[
        ('S', "ERROR"),
        ('C', "23505"),
        ('M', "duplicate key value"),
    ]);
    replies.extend(ready(b'E'));
    server.write_all(&replies).await.unwrap();

    let err = conn.execute("INSERT INTO users VALUES (1)").await.unwrap_err();
    let db = err.into_db_error().unwrap();
    assert_eq!(db.code, "23505");
    assert_eq!(db.name, Some("UniqueViolation"));
    assert_eq!(db.message, "duplicate key value");
    assert_eq!(conn.server_status(), Some(ServerStatus::Error));

    // the exchange was drained to ReadyForQuery, the next query goes through
    let mut replies = row_description(&[("?column?", 23)]);
    replies.extend(data_row(&[Some("2")]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("SELECT 2").await.unwrap();
    assert_eq!(res.rows[0].get("?column?"), Some(&Value::Int(2)));
}

#[tokio::test]
async fn empty_query() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = frame(b'I', &[]);
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("").await.unwrap();
    assert_eq!(res.row_count, 0);
    assert!(res.command_tags.is_empty());
}

#[tokio::test]
async fn multi_statement_accumulates() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = row_description(&[("a", 23)]);
    replies.extend(data_row(&[Some("1")]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(row_description(&[("b", 25)]));
    replies.extend(data_row(&[Some("two")]));
    replies.extend(command_complete("SELECT 1"));
    replies.extend(ready(b'I'));
    server.write_all(&replies).await.unwrap();

    let res = conn.execute("SELECT 1 AS a; SELECT 'two' AS b").await.unwrap();
    assert_eq!(res.row_count, 2);
    // earlier rows keep the columns they were decoded against
    assert_eq!(res.rows[0].get("a"), Some(&Value::Int(1)));
    assert_eq!(res.rows[1].get("b"), Some(&Value::Text("two".into())));
    assert_eq!(res.columns[0].name, "b");
    assert_eq!(res.command_tags, ["SELECT 1", "SELECT 1"]);
}

#[tokio::test]
async fn column_count_mismatch_is_fatal() {
    let (mut conn, mut server) = connected(config()).await;

    let mut replies = row_description(&[("a", 23)]);
    replies.extend(data_row(&[Some("1"), Some("2")]));
    server.write_all(&replies).await.unwrap();

    let err = conn.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Protocol(_)));

    // framing can no longer be trusted, the connection is done
    let err = conn.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Protocol(_)));
}

#[tokio::test]
async fn closed_transport_mid_query() {
    let (mut conn, mut server) = connected(config()).await;

    server.write_all(&row_description(&[("a", 23)])).await.unwrap();
    drop(server);

    let err = conn.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ConnectionClosed));
}

#[tokio::test]
async fn close_sends_terminate() {
    let (mut conn, mut server) = connected(config()).await;

    conn.close().await.unwrap();

    let (tag, body) = read_frame(&mut server).await;
    assert_eq!(tag, b'X');
    assert!(body.is_empty());
}
