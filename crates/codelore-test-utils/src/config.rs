//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use codelore_config::{AppConfig, LlmProviderKind};

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .provider(LlmProviderKind::Ollama)
///     .api_base("http://127.0.0.1:4545")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn listen_addr(mut self, addr: &str) -> Self {
        self.config.server.listen_addr = addr.to_string();
        self
    }

    pub fn listen_port(mut self, port: u16) -> Self {
        self.config.server.listen_port = port;
        self
    }

    pub fn provider(mut self, provider: LlmProviderKind) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.config.llm.api_key = key.to_string();
        self
    }

    pub fn api_base(mut self, base: &str) -> Self {
        self.config.llm.api_base = Some(base.to_string());
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.llm.model = model.to_string();
        self
    }

    pub fn commit_limit(mut self, limit: usize) -> Self {
        self.config.git.commit_limit = limit;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
