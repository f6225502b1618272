//! Browser lifecycle management and isolated browsing contexts.
//!
//! One Chrome process is shared by a whole run. Each scenario gets its own
//! [`IsolatedContext`]: a fresh CDP browser context (separate cookies, storage
//! and cache) holding a single page. Contexts are disposed explicitly so an
//! aborted scenario leaves nothing behind in the shared browser.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use crate::wait::WaitConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lower bound on the CDP request timeout; screenshots and context setup
/// share it with navigation.
const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for launching a test browser.
#[derive(Debug, Clone)]
pub struct TestBrowserConfig {
    /// Run in headless mode (default: true unless the `visible` feature is on).
    pub headless: bool,

    /// Browser window size (default: 1280x720).
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,

    /// Wait window handed to every page created by this browser.
    pub wait: WaitConfig,
}

impl TestBrowserConfig {
    /// Creates a new config with defaults for headless testing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables visible mode for debugging.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets a custom window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Adds additional Chrome arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args.extend(args);
        self
    }

    /// Uses a specific Chrome executable.
    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Sets the page wait window.
    #[must_use]
    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Timeout chromiumoxide applies to each CDP request, `goto` included.
    fn request_timeout(&self) -> Duration {
        self.wait.timeout.max(MIN_REQUEST_TIMEOUT)
    }

    #[allow(clippy::result_large_err)]
    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        if !self.headless {
            config = config.with_head();
        }

        config = config
            .window_size(self.window_size.0, self.window_size.1)
            .request_timeout(self.request_timeout());

        // A unique profile dir per launch keeps parallel runs from tripping
        // over Chrome's ProcessSingleton lock.
        let user_data_dir =
            std::env::temp_dir().join(format!("atoz-browser-{}", uuid::Uuid::new_v4()));
        config = config.user_data_dir(user_data_dir);

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for TestBrowserConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1280, 720),
            args: vec![
                // Needed when user namespaces are unavailable (containers, CI).
                "--no-sandbox".to_string(),
                // Prevents /dev/shm exhaustion in containerized environments
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
            wait: WaitConfig::default(),
        }
    }
}

/// A managed browser instance shared by all scenarios of a run.
///
/// Cheap to clone; clones share the same process.
///
/// # Example
///
/// ```ignore
/// let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
/// let context = browser.new_context().await?;
/// context.page().navigate("https://example.com").await?;
/// context.close().await?;
/// browser.close().await?;
/// ```
#[derive(Clone)]
pub struct TestBrowser {
    inner: Arc<Mutex<Option<Browser>>>,
    handler: Arc<JoinHandle<()>>,
    wait: WaitConfig,
}

impl std::fmt::Debug for TestBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestBrowser").field("wait", &self.wait).finish_non_exhaustive()
    }
}

impl TestBrowser {
    /// Launches a new browser instance with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is not installed, not executable,
    /// or fails to start.
    pub async fn launch(config: TestBrowserConfig) -> Result<Self> {
        debug!("Launching browser with config: {:?}", config);

        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP events while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                }
            }
        });

        debug!("Browser launched successfully");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            handler: Arc::new(handler),
            wait: config.wait,
        })
    }

    /// Creates a fresh isolated browsing context with one blank page.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed, or
    /// `ContextFailed` if Chrome refuses to create the context or its page.
    pub async fn new_context(&self) -> Result<IsolatedContext> {
        let guard = self.inner.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let created = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| BrowserError::ContextFailed(e.to_string()))?;
        let id = created.result.browser_context_id.clone();

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(id.clone())
            .build()
            .map_err(BrowserError::ContextFailed)?;

        let chrome_page = match browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.execute(DisposeBrowserContextParams::new(id)).await;
                return Err(BrowserError::ContextFailed(e.to_string()));
            }
        };

        debug!(context = ?id, "browsing context created");

        Ok(IsolatedContext {
            id,
            page: Page::new(chrome_page, self.wait),
            browser: Arc::clone(&self.inner),
        })
    }

    /// Closes the browser and kills the Chrome process.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully.
    pub async fn close(self) -> Result<()> {
        let mut browser_guard = self.inner.lock().await;

        if let Some(mut browser) = browser_guard.take() {
            debug!("Closing browser gracefully");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
            let _ = browser.wait().await;
        }
        self.handler.abort();

        Ok(())
    }

    /// Returns true if the browser has been closed.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

/// One scenario's private browsing context.
#[derive(Debug)]
pub struct IsolatedContext {
    id: BrowserContextId,
    page: Page,
    browser: Arc<Mutex<Option<Browser>>>,
}

impl IsolatedContext {
    /// The context's page.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Closes the page and disposes the browser context.
    ///
    /// Disposal is skipped when the browser itself is already gone.
    ///
    /// # Errors
    ///
    /// Returns `ContextFailed` if Chrome rejects the disposal.
    pub async fn close(self) -> Result<()> {
        if let Err(e) = self.page.close().await {
            debug!("page close failed, disposing context anyway: {e}");
        }

        let guard = self.browser.lock().await;
        if let Some(browser) = guard.as_ref() {
            browser
                .execute(DisposeBrowserContextParams::new(self.id.clone()))
                .await
                .map_err(|e| BrowserError::ContextFailed(e.to_string()))?;
            debug!(context = ?self.id, "browsing context disposed");
        }
        Ok(())
    }
}
