//! Per-call start requests.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;

use crate::chain::ChainOptions;

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-supplied async step, run at most once per orchestrator.
pub struct ExtraHook(Box<dyn FnOnce() -> BoxFuture<'static, Result<Value, HookError>> + Send>);

impl ExtraHook {
    pub fn new<F, Fut, E>(hook: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: Into<HookError>,
    {
        Self(Box::new(move || {
            async move { hook().await.map_err(Into::into) }.boxed()
        }))
    }

    pub(crate) async fn run(self) -> Result<Value, HookError> {
        (self.0)().await
    }
}

impl fmt::Debug for ExtraHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtraHook(..)")
    }
}

/// What a single `Orchestrator::start` call asks for.
///
/// ```
/// use devstack::orchestrator::StartConfig;
///
/// let request = StartConfig::new().chain().deploy_contracts().storage().populate_fixtures();
/// assert!(request.storage);
/// ```
#[derive(Debug, Default)]
pub struct StartConfig {
    /// Start the chain emulator, with these overrides.
    pub chain: Option<ChainOptions>,
    /// Run the contract migration (every time it is requested).
    pub deploy_contracts: bool,
    /// Start the storage node.
    pub storage: bool,
    /// Upload the fixture tree. Ignored unless `storage` is also set.
    pub populate_fixtures: bool,
    /// One-shot hook whose result is retained for the process lifetime.
    pub extra: Option<ExtraHook>,
}

impl StartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(self) -> Self {
        self.chain_with(ChainOptions::default())
    }

    pub fn chain_with(mut self, options: ChainOptions) -> Self {
        self.chain = Some(options);
        self
    }

    pub fn deploy_contracts(mut self) -> Self {
        self.deploy_contracts = true;
        self
    }

    pub fn storage(mut self) -> Self {
        self.storage = true;
        self
    }

    pub fn populate_fixtures(mut self) -> Self {
        self.populate_fixtures = true;
        self
    }

    pub fn extra(mut self, hook: ExtraHook) -> Self {
        self.extra = Some(hook);
        self
    }
}
