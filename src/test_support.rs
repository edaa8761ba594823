//! In-process fake servers for transfer tests
//!
//! Both servers bind to an ephemeral port on 127.0.0.1 and serve every
//! connection on its own thread. They implement just enough of HTTP/1.1
//! and FTP for the client libraries used by the transports.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

/// A port nothing listens on
pub(crate) fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Misbehavior injected by [`FakeHttpServer`]
#[derive(Debug, Clone)]
pub(crate) enum HttpFault {
    /// Read the request, then close the socket without answering
    CloseWithoutResponse,
    /// Announce `declared` body bytes but send only `sent`, then close
    TruncatedBody { declared: usize, sent: Vec<u8> },
    /// Read the request and wait before answering 200
    Stall(Duration),
}

#[derive(Debug, Clone)]
enum HttpBehavior {
    Respond { status: u16, body: Vec<u8> },
    Fault(HttpFault),
}

/// One request as received by [`FakeHttpServer`]
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// One part of a multipart/form-data body
#[derive(Debug, Clone)]
pub(crate) struct MultipartPart {
    pub name: String,
    pub filename: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed multipart part by form field name
    pub fn multipart_part(&self, field: &str) -> Option<MultipartPart> {
        let content_type = self.header("content-type")?;
        let boundary = content_type
            .split(';')
            .map(str::trim)
            .find_map(|p| p.strip_prefix("boundary="))?
            .trim_matches('"');
        let delimiter = format!("--{}", boundary).into_bytes();

        let mut cursor = find(&self.body, &delimiter, 0)? + delimiter.len();
        loop {
            if self.body[cursor..].starts_with(b"--") {
                return None;
            }
            let next = find(&self.body, &delimiter, cursor)?;
            let segment = &self.body[cursor..next];
            let segment = segment.strip_prefix(b"\r\n").unwrap_or(segment);
            let header_end = find(segment, b"\r\n\r\n", 0)?;
            let headers = String::from_utf8_lossy(&segment[..header_end]).to_string();
            let mut body = &segment[header_end + 4..];
            body = body.strip_suffix(b"\r\n").unwrap_or(body);

            let disposition = headers
                .lines()
                .find(|l| l.to_ascii_lowercase().starts_with("content-disposition"))?;
            let name = disposition_param(disposition, "name");
            if name.as_deref() == Some(field) {
                return Some(MultipartPart {
                    name: field.to_string(),
                    filename: disposition_param(disposition, "filename"),
                    body: body.to_vec(),
                });
            }
            cursor = next + delimiter.len();
        }
    }
}

fn disposition_param(line: &str, key: &str) -> Option<String> {
    line.split(';').map(str::trim).find_map(|p| {
        let (k, v) = p.split_once('=')?;
        (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Minimal HTTP/1.1 server answering every request the same way
pub(crate) struct FakeHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeHttpServer {
    /// Answer every request with `status` and `body`
    pub fn respond(status: u16, body: &[u8]) -> Self {
        Self::start(HttpBehavior::Respond {
            status,
            body: body.to_vec(),
        })
    }

    /// Misbehave on every request
    pub fn with_fault(fault: HttpFault) -> Self {
        Self::start(HttpBehavior::Fault(fault))
    }

    fn start(behavior: HttpBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let behavior = behavior.clone();
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || {
                    let _ = serve_http(stream, &behavior, &recorded);
                });
            }
        });

        Self { addr, requests }
    }

    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }

    /// Most recent complete request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of complete requests received
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn serve_http(
    stream: TcpStream,
    behavior: &HttpBehavior,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);

    let request = read_request(&mut reader)?;
    recorded.lock().unwrap().push(request);

    match behavior {
        HttpBehavior::Respond { status, body } => write_response(&mut writer, *status, body),
        HttpBehavior::Fault(HttpFault::CloseWithoutResponse) => Ok(()),
        HttpBehavior::Fault(HttpFault::TruncatedBody { declared, sent }) => {
            write!(
                writer,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            )?;
            writer.write_all(sent)?;
            writer.flush()
        }
        HttpBehavior::Fault(HttpFault::Stall(delay)) => {
            thread::sleep(*delay);
            write_response(&mut writer, 200, b"late")
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>) -> std::io::Result<RecordedRequest> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((k, v)) = header.split_once(':') {
            headers.push((k.trim().to_string(), v.trim().to_string()));
        }
    }

    let find_header = |name: &str| {
        headers
            .iter()
            .find(|(k, _): &&(String, String)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    };

    let mut body = Vec::new();
    if let Some(len) = find_header("content-length").and_then(|v| v.parse::<usize>().ok()) {
        body.resize(len, 0);
        reader.read_exact(&mut body)?;
    } else if find_header("transfer-encoding").map_or(false, |v| v.eq_ignore_ascii_case("chunked")) {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line)?;
            let size = usize::from_str_radix(size_line.trim().split(';').next().unwrap_or("0"), 16)
                .unwrap_or(0);
            if size == 0 {
                let mut trailer = String::new();
                reader.read_line(&mut trailer)?;
                break;
            }
            let mut chunk = vec![0u8; size];
            reader.read_exact(&mut chunk)?;
            body.extend_from_slice(&chunk);
            let mut crlf = [0u8; 2];
            reader.read_exact(&mut crlf)?;
        }
    }

    Ok(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn write_response(writer: &mut TcpStream, status: u16, body: &[u8]) -> std::io::Result<()> {
    let reason = if status == 200 { "OK" } else { "Status" };
    write!(
        writer,
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    )?;
    writer.write_all(body)?;
    writer.flush()
}

// ---------------------------------------------------------------------------
// FTP
// ---------------------------------------------------------------------------

/// Misbehavior injected by [`FakeFtpServer`]
#[derive(Debug, Clone, Copy)]
pub(crate) enum FtpFault {
    /// Send `after` bytes of a RETR, then drop data and control connections
    DropDuringRetrieve { after: usize },
    /// Refuse every STOR with 553
    RejectStore,
    /// Receive a STOR, then drop the control connection without a final reply
    DropDuringStore,
}

struct FtpState {
    user: String,
    password: String,
    files: Mutex<HashMap<String, Vec<u8>>>,
    fault: Mutex<Option<FtpFault>>,
    quits: AtomicUsize,
    active: AtomicUsize,
}

struct ActiveSession(Arc<FtpState>);

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Minimal FTP server with one account and an in-memory file store
pub(crate) struct FakeFtpServer {
    port: u16,
    state: Arc<FtpState>,
}

impl FakeFtpServer {
    /// Accept logins from `user` / `password`
    pub fn start(user: &str, password: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(FtpState {
            user: user.to_string(),
            password: password.to_string(),
            files: Mutex::new(HashMap::new()),
            fault: Mutex::new(None),
            quits: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
        });

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                shared.active.fetch_add(1, Ordering::SeqCst);
                let session = ActiveSession(Arc::clone(&shared));
                thread::spawn(move || {
                    let _ = serve_ftp(stream, &session.0);
                    drop(session);
                });
            }
        });

        Self { port, state }
    }

    /// `ftp://` URL for `path` with the given credentials
    pub fn url(&self, user: &str, password: &str, path: &str) -> String {
        format!("ftp://{}:{}@127.0.0.1:{}/{}", user, password, self.port, path)
    }

    /// Contents of a stored file
    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.state.files.lock().unwrap().get(name).cloned()
    }

    /// Seed a file for retrieval
    pub fn put_file(&self, name: &str, content: Vec<u8>) {
        self.state.files.lock().unwrap().insert(name.to_string(), content);
    }

    /// Inject a fault for all later sessions
    pub fn set_fault(&self, fault: FtpFault) {
        *self.state.fault.lock().unwrap() = Some(fault);
    }

    /// Number of QUIT commands received
    pub fn quit_count(&self) -> usize {
        self.state.quits.load(Ordering::SeqCst)
    }

    /// Block until every control connection has ended
    pub fn wait_for_sessions_closed(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.state.active.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
    }
}

fn reply(writer: &mut TcpStream, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")?;
    writer.flush()
}

fn serve_ftp(stream: TcpStream, state: &FtpState) -> std::io::Result<()> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut user: Option<String> = None;
    let mut logged_in = false;
    let mut passive: Option<TcpListener> = None;

    reply(&mut writer, "220 fake ftp ready")?;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim_end();
        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c.to_ascii_uppercase(), a.to_string()),
            None => (line.to_ascii_uppercase(), String::new()),
        };

        match command.as_str() {
            "USER" => {
                user = Some(arg);
                reply(&mut writer, "331 Password required")?;
            }
            "PASS" => {
                if user.as_deref() == Some(state.user.as_str()) && arg == state.password {
                    logged_in = true;
                    reply(&mut writer, "230 Logged in")?;
                } else {
                    reply(&mut writer, "530 Login incorrect")?;
                }
            }
            "QUIT" => {
                state.quits.fetch_add(1, Ordering::SeqCst);
                reply(&mut writer, "221 Bye")?;
                return Ok(());
            }
            _ if !logged_in => reply(&mut writer, "530 Not logged in")?,
            "TYPE" => reply(&mut writer, "200 Type set")?,
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0")?;
                let port = listener.local_addr()?.port();
                passive = Some(listener);
                reply(
                    &mut writer,
                    &format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{})",
                        port >> 8,
                        port & 0xff
                    ),
                )?;
            }
            "STOR" => {
                let Some(listener) = passive.take() else {
                    reply(&mut writer, "425 Use PASV first")?;
                    continue;
                };
                let fault = *state.fault.lock().unwrap();
                if matches!(fault, Some(FtpFault::RejectStore)) {
                    // The client may already be connecting to the data port;
                    // keep listening so it sees the refusal, not a reset.
                    passive = Some(listener);
                    reply(&mut writer, "553 Requested action not taken")?;
                    continue;
                }
                reply(&mut writer, "150 Ok to send data")?;
                let (mut data, _) = listener.accept()?;
                let mut content = Vec::new();
                data.read_to_end(&mut content)?;
                drop(data);
                if matches!(fault, Some(FtpFault::DropDuringStore)) {
                    return Ok(());
                }
                state.files.lock().unwrap().insert(arg, content);
                reply(&mut writer, "226 Transfer complete")?;
            }
            "RETR" => {
                let Some(listener) = passive.take() else {
                    reply(&mut writer, "425 Use PASV first")?;
                    continue;
                };
                let content = state.files.lock().unwrap().get(&arg).cloned();
                let Some(content) = content else {
                    passive = Some(listener);
                    reply(&mut writer, "550 File not found")?;
                    continue;
                };
                reply(&mut writer, "150 Opening data connection")?;
                let (mut data, _) = listener.accept()?;
                let fault = *state.fault.lock().unwrap();
                if let Some(FtpFault::DropDuringRetrieve { after }) = fault {
                    data.write_all(&content[..after.min(content.len())])?;
                    // Dropping both sockets ends the session mid-transfer.
                    return Ok(());
                }
                data.write_all(&content)?;
                drop(data);
                reply(&mut writer, "226 Transfer complete")?;
            }
            _ => reply(&mut writer, "502 Command not implemented")?,
        }
    }
}
