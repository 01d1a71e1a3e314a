//! chromedriver process management
//!
//! The suite normally spawns its own chromedriver on a free port and tears
//! it down when the run ends; set `E2E_WEBDRIVER_URL` to attach to an
//! endpoint managed elsewhere instead.

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Handle to a running chromedriver process
#[derive(Debug)]
pub struct DriverServer {
    child: Child,
    url: String,
    port: u16,
}

impl DriverServer {
    /// Spawn chromedriver and wait for its status endpoint to come up.
    pub async fn spawn(config: DriverConfig) -> Result<Self> {
        let port = match config.port {
            Some(p) => p,
            None => find_free_port()?,
        };
        let url = format!("http://127.0.0.1:{port}");

        info!("spawning chromedriver on port {port}");

        let child = Command::new(&config.binary)
            .arg(format!("--port={port}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::DriverStartup(format!("failed to spawn {}: {e}", config.binary)))?;

        let server = DriverServer { child, url, port };
        server.wait_until_ready(config.startup_timeout).await?;

        info!("chromedriver ready at {}", server.url);
        Ok(server)
    }

    /// Poll the WebDriver status endpoint until it answers.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;
            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => warn!("chromedriver status returned {}", resp.status()),
                Err(e) => {
                    // Connection refused is expected while it boots.
                    if !e.is_connect() {
                        warn!("chromedriver status error: {e}");
                    }
                }
            }
            sleep(Duration::from_millis(100)).await;
        }

        Err(Error::DriverHealthCheck(attempts))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop the process, graceful first.
    pub fn stop(&mut self) -> Result<()> {
        info!("stopping chromedriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(300));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for DriverServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for spawning chromedriver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// chromedriver binary name or path
    pub binary: String,
    /// Port to listen on (None = find a free one)
    pub port: Option<u16>,
    /// How long startup may take
    pub startup_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            binary: "chromedriver".to_string(),
            port: None,
            startup_timeout: Duration::from_secs(15),
        }
    }
}

fn find_free_port() -> Result<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
