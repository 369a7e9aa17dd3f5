use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use querylab::rowstore::{RowStore, SelectQuery};
use querylab::{published_lessons, HttpRowStore, LabError, RowStoreSettings};

/// Serve one canned response and hand back the request line.
fn serve_once(status: &str, body: &str) -> (HttpRowStore, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                break;
            }
        }
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request_line
    });

    let store = HttpRowStore::new(&RowStoreSettings {
        url: format!("http://{}", addr),
        api_key: "anon-key".to_string(),
    });
    (store, server)
}

#[test]
fn test_missing_relation_is_not_found() {
    let (store, server) = serve_once(
        "404 Not Found",
        r#"{"code":"42P01","message":"relation \"public.lessons\" does not exist"}"#,
    );

    match published_lessons(&store) {
        Err(LabError::NotFound(message)) => {
            assert_eq!(message, "relation \"public.lessons\" does not exist")
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(server.join().unwrap().starts_with("GET /rest/v1/lessons?"));
}

#[test]
fn test_rejected_credentials_are_auth_errors() {
    for status in ["401 Unauthorized", "403 Forbidden"] {
        let (store, server) = serve_once(status, r#"{"message":"JWT expired"}"#);
        match store.select(&SelectQuery::from("lessons")) {
            Err(LabError::Auth(message)) => assert_eq!(message, "JWT expired"),
            other => panic!("expected Auth for {}, got {:?}", status, other),
        }
        server.join().unwrap();
    }
}

#[test]
fn test_server_errors_are_transient() {
    let (store, server) = serve_once("503 Service Unavailable", "");

    let err = store.select(&SelectQuery::from("lessons")).unwrap_err();
    assert!(err.is_transient());
    match err {
        LabError::Http { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "empty response");
        }
        other => panic!("expected Http, got {:?}", other),
    }
    server.join().unwrap();
}

#[test]
fn test_client_errors_are_not_transient() {
    let (store, server) = serve_once("400 Bad Request", r#"{"msg":"bad filter"}"#);

    let err = store.select(&SelectQuery::from("lessons")).unwrap_err();
    assert!(!err.is_transient());
    assert!(matches!(err, LabError::Http { status: 400, .. }));
    server.join().unwrap();
}

#[test]
fn test_success_decodes_rows() {
    let (store, server) = serve_once(
        "200 OK",
        r#"[{"id":1,"title":"SELECT basics","order_index":1,"is_published":true}]"#,
    );

    let lessons = published_lessons(&store).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].title, "SELECT basics");

    let request_line = server.join().unwrap();
    assert!(request_line.contains("is_published=eq.true"));
    assert!(request_line.contains("order=order_index.asc"));
}
