use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use webterm_cli::config::ClientConfig;
use webterm_cli::metadata::{build_client, fetch_shell_info};
use webterm_core::{ShellInfo, WebTermError};

struct ScriptedResponse {
    status: &'static str,
    content_type: &'static str,
    body: String,
}

impl ScriptedResponse {
    fn json(body: &str) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    fn status(status: &'static str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::from("nope"),
        }
    }
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|window| window == b"\r\n\r\n")
}

fn read_request_line(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("read timeout");
    let mut bytes = Vec::new();
    let mut buf = [0_u8; 1024];
    while find_header_end(&bytes).is_none() {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => bytes.extend_from_slice(&buf[..read]),
        }
    }
    String::from_utf8_lossy(&bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Serve one scripted response; the join handle yields the request line.
fn serve_once(response: ScriptedResponse) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let server = format!("http://{}", listener.local_addr().expect("local addr"));
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let request_line = read_request_line(&mut stream);
        let payload = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response.status,
            response.content_type,
            response.body.len(),
            response.body
        );
        let _ = stream.write_all(payload.as_bytes());
        let _ = stream.flush();
        request_line
    });
    (server, handle)
}

fn config(server: &str) -> ClientConfig {
    ClientConfig::new(server, PathBuf::new()).expect("config")
}

#[test]
fn fetches_and_decodes_shell_info() {
    let (server, handle) = serve_once(ScriptedResponse::json(
        r#"{"shell":"/bin/bash","args":["-i"],"full_command":"/bin/bash -i"}"#,
    ));
    let config = config(&server);
    let client = build_client(&config).expect("client");

    let info = fetch_shell_info(&client, &config.origin).expect("shell info");
    assert_eq!(info, ShellInfo::new("/bin/bash", vec!["-i".to_string()]));
    assert_eq!(
        handle.join().expect("server thread"),
        "GET /api/shell-info HTTP/1.1"
    );
}

#[test]
fn missing_full_command_is_derived() {
    let (server, handle) = serve_once(ScriptedResponse::json(r#"{"shell":"fish"}"#));
    let config = config(&server);
    let client = build_client(&config).expect("client");

    let info = fetch_shell_info(&client, &config.origin).expect("shell info");
    assert_eq!(info.command_line(), "fish");
    handle.join().expect("server thread");
}

#[test]
fn server_error_status_is_a_request_error() {
    let (server, handle) = serve_once(ScriptedResponse::status("500 Internal Server Error"));
    let config = config(&server);
    let client = build_client(&config).expect("client");

    let error = fetch_shell_info(&client, &config.origin).expect_err("500");
    match error {
        WebTermError::ShellInfoRequest(message) => assert!(message.contains("500"), "{message}"),
        other => panic!("unexpected error {other:?}"),
    }
    handle.join().expect("server thread");
}

#[test]
fn html_body_is_a_decode_error() {
    let (server, handle) = serve_once(ScriptedResponse::json("<html>oops</html>"));
    let config = config(&server);
    let client = build_client(&config).expect("client");

    let error = fetch_shell_info(&client, &config.origin).expect_err("not json");
    assert!(matches!(error, WebTermError::ShellInfoDecode(_)));
    handle.join().expect("server thread");
}

#[test]
fn unreachable_server_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = config(&format!("http://{addr}"));
    let client = build_client(&config).expect("client");
    let error = fetch_shell_info(&client, &config.origin).expect_err("refused");
    assert!(matches!(error, WebTermError::ShellInfoRequest(_)));
}
