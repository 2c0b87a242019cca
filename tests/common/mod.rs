use rand::seq::SliceRandom;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

pub fn build_domain() -> &'static str {
    let domains = [
        "google.com",
        "github.com",
        "wikipedia.org",
        "cloudflare.com",
        "example.com",
        "rust-lang.org",
        "mozilla.org",
        "iana.org",
    ];

    domains.choose(&mut rand::thread_rng()).unwrap()
}

pub fn build_invalid_domain() -> &'static str {
    let inputs = [
        "not a domain",
        "invalid..domain..name",
        "example",
        "example.c",
        "http://example.com",
        "exa_mple.com",
    ];

    inputs.choose(&mut rand::thread_rng()).unwrap()
}

/// Running server plus its pipes.
pub struct McpProcess {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: BufReader<ChildStdout>,
}

impl McpProcess {
    /// Starts the server with no lookup endpoints configured, so nothing
    /// leaves the machine.
    pub fn spawn_offline() -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_tools-crowd-mcp"))
            .env_remove("TOOLS_API_URL")
            .env_remove("TOOLS_API_KEY")
            .env_remove("TOOLS_SITE_URL")
            .env_remove("TOOLS_PDF_URL")
            .env_remove("TOOLS_NSLOOKUP_URL")
            .env("TOOLS_BASE64_DELAY_MS", "0")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().ok_or("Failed to open stdin")?;
        let stdout = BufReader::new(child.stdout.take().ok_or("Failed to open stdout")?);

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    pub fn request(&mut self, request: Value) -> Result<Value, Box<dyn std::error::Error>> {
        writeln!(self.stdin, "{}", serde_json::to_string(&request)?)?;
        self.stdin.flush()?;

        let mut response_line = String::new();
        self.stdout.read_line(&mut response_line)?;

        let response: Value = serde_json::from_str(response_line.trim())?;
        Ok(response)
    }

    pub fn call_tool(
        &mut self,
        id: u64,
        name: &str,
        arguments: Value,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        self.request(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {
                "name": name,
                "arguments": arguments
            }
        }))
    }

    pub fn initialize(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        let init_response = self.request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "roots": {
                        "listChanged": false
                    },
                    "sampling": {}
                },
                "clientInfo": {
                    "name": "test-client",
                    "version": "1.0.0"
                }
            }
        }))?;

        // Required by the protocol before any other request.
        let initialized_notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
            "params": {}
        });
        writeln!(
            self.stdin,
            "{}",
            serde_json::to_string(&initialized_notification)?
        )?;
        self.stdin.flush()?;
        thread::sleep(Duration::from_millis(100));

        Ok(init_response)
    }
}

impl Drop for McpProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
