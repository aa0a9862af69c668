//! Throwaway loopback HTTP server answering from a routing closure.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

/// `(method, target)` of every request served, e.g. `("GET", "/x?page=1")`.
pub type RequestLog = Arc<Mutex<Vec<(String, String)>>>;

pub struct MockApi {
    pub url: String,
    log: RequestLog,
}

impl MockApi {
    /// Serve every connection with `route(method, target, body) -> (status, json)`.
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str, &str) -> (u16, String) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let log: RequestLog = Arc::default();

        let served = Arc::clone(&log);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                if let Err(err) = serve(stream, &route, &served) {
                    eprintln!("mock api: {err}");
                }
            }
        });

        Self { url, log }
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.log.lock().expect("log lock").clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|(m, _)| m == method).count()
    }
}

fn serve<F>(stream: TcpStream, route: &F, log: &RequestLog) -> std::io::Result<()>
where
    F: Fn(&str, &str, &str) -> (u16, String),
{
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" || header == "\n" {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    let body = String::from_utf8_lossy(&body).into_owned();

    log.lock()
        .expect("log lock")
        .push((method.clone(), target.clone()));
    let (status, payload) = route(&method, &target, &body);

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        reason(status),
        payload.len(),
    )?;
    stream.flush()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// `maildelegate` with a clean environment pointed at `api_url`.
pub fn maildelegate_cmd(home: &Path, api_url: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("maildelegate"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("MAILDELEGATE_ORG_ID", "42")
        .env("MAILDELEGATE_TOKEN", "test-token")
        .env("MAILDELEGATE_API_URL", api_url)
        .env("MAILDELEGATE_REQUEST_DELAY_MS", "0")
        .env_remove("MAILDELEGATE_PER_PAGE")
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}
