use anyhow::{Context, Result};
use std::future::Future;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::webdriver::BrowserType;

/// Starts and tracks chromedriver/geckodriver processes for test sessions
pub struct WebDriverManager {
    processes: Mutex<Vec<DriverProcess>>,
    // Held across check-and-start so concurrent sessions share one driver
    start_lock: tokio::sync::Mutex<()>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl Default for WebDriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
            start_lock: tokio::sync::Mutex::new(()),
        }
    }
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a WebDriver is running for the given browser type.
    /// Returns the URL to connect to.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        self.ensure_driver_with(browser_type, || self.start_driver(browser_type))
            .await
    }

    /// Reuse a healthy managed or external driver, otherwise call `start`.
    /// Only one caller at a time gets past the check.
    pub(crate) async fn ensure_driver_with<F, Fut>(
        &self,
        browser_type: &BrowserType,
        start: F,
    ) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let _guard = self.start_lock.lock().await;
        self.prune_exited();

        for url in self.managed_urls(browser_type) {
            if Self::verify_driver_working(&url).await {
                debug!("Using managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // Externally started drivers on the conventional port
        let standard = format!("http://localhost:{}", Self::standard_port(browser_type));
        if Self::verify_driver_working(&standard).await {
            debug!("Found external WebDriver at {}", standard);
            return Ok(standard);
        }

        info!(
            "{} not detected, starting it automatically",
            browser_type.driver_name()
        );
        start().await
    }

    /// Forget drivers whose process has already exited
    fn prune_exited(&self) {
        self.lock().retain_mut(|p| match p.child.try_wait() {
            Ok(Some(status)) => {
                warn!("WebDriver on port {} exited ({})", p.port, status);
                false
            }
            _ => true,
        });
    }

    pub(crate) fn track(&self, browser_type: BrowserType, child: Child, port: u16, url: &str) {
        self.lock().push(DriverProcess {
            browser_type,
            child,
            port,
            url: url.to_string(),
        });
    }

    fn managed_urls(&self, browser_type: &BrowserType) -> Vec<String> {
        let processes = self.lock();
        processes
            .iter()
            .filter(|p| p.browser_type == *browser_type)
            .map(|p| p.url.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DriverProcess>> {
        // A panic while holding the lock leaves the list itself intact
        self.processes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn standard_port(browser_type: &BrowserType) -> u16 {
        match browser_type {
            BrowserType::Firefox => 4444,
            BrowserType::Chrome => 9515,
        }
    }

    /// Arguments passed to the driver binary for a given port
    pub fn driver_args(browser_type: &BrowserType, port: u16) -> Vec<String> {
        match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        }
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let command = browser_type.driver_name();
        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Install it or start it manually on port {}",
                command,
                Self::standard_port(browser_type)
            );
        }

        let port = Self::find_free_port(browser_type)?;
        info!("Starting {} on port {}", command, port);

        let mut cmd = Command::new(command);
        cmd.args(Self::driver_args(browser_type, port))
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group so the browser children die with the driver
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", command))?;
        let url = format!("http://localhost:{}", port);

        self.track(*browser_type, child, port, &url);

        // 3 seconds total
        for _ in 0..30 {
            if Self::is_driver_running(&url).await {
                info!("{} ready on port {}", command, port);
                return Ok(url);
            }
            sleep(Duration::from_millis(100)).await;
        }

        self.remove_where(|p| p.port == port);
        anyhow::bail!("{} failed to start within timeout", command)
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        let finder = if cfg!(windows) { "where" } else { "which" };
        Command::new(finder)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Find a free port, preferring the driver's conventional range
    pub fn find_free_port(browser_type: &BrowserType) -> Result<u16> {
        let base = Self::standard_port(browser_type);
        for port in base..base + 3 {
            if !Self::is_port_in_use(port) {
                return Ok(port);
            }
            debug!("Port {} is in use", port);
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// Check if a WebDriver answers its status endpoint
    pub async fn is_driver_running(url: &str) -> bool {
        Self::status(url).await.is_some()
    }

    /// A working driver reports `value.ready == true`
    async fn verify_driver_working(url: &str) -> bool {
        Self::status(url)
            .await
            .and_then(|body| body.pointer("/value/ready").and_then(|r| r.as_bool()))
            .unwrap_or(false)
    }

    async fn status(url: &str) -> Option<serde_json::Value> {
        let response = reqwest::Client::new()
            .get(format!("{}/status", url))
            .timeout(Duration::from_secs(1))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<serde_json::Value>().await.ok()
    }

    fn remove_where(&self, pred: impl Fn(&DriverProcess) -> bool) {
        let mut processes = self.lock();
        let mut kept = Vec::with_capacity(processes.len());
        for mut process in processes.drain(..) {
            if pred(&process) {
                Self::terminate(&mut process);
            } else {
                kept.push(process);
            }
        }
        *processes = kept;
    }

    fn terminate(process: &mut DriverProcess) {
        debug!("Stopping WebDriver on port {}", process.port);

        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            // process_group(0) made the child its own group leader
            let pgid = Pid::from_raw(process.child.id() as i32);
            if let Err(e) = killpg(pgid, Signal::SIGTERM) {
                debug!("SIGTERM to process group {} failed: {}", pgid, e);
            }
            std::thread::sleep(Duration::from_millis(100));
            let _ = killpg(pgid, Signal::SIGKILL);
        }

        let _ = process.child.kill();
        let _ = process.child.wait();
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        self.remove_where(|_| true);
    }

    pub fn managed_count(&self) -> usize {
        self.lock().len()
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

// Global WebDriver manager instance
lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
