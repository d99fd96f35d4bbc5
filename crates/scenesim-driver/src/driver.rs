//! Simulated browser session.

use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};
use crate::page::SimulatedPage;
use crate::registry::{InstanceLease, InstanceRegistry};
use tracing::{debug, info};

/// Stand-in for a browser automation handle. One browser, one page.
#[derive(Debug)]
pub struct SimulatedDriver {
    config: DriverConfig,
    registry: InstanceRegistry,
    lease: Option<InstanceLease>,
    page: Option<SimulatedPage>,
}

impl SimulatedDriver {
    pub fn new(config: DriverConfig, registry: InstanceRegistry) -> Self {
        Self {
            config,
            registry,
            lease: None,
            page: None,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Initialized and not released by the registry.
    pub fn is_initialized(&self) -> bool {
        self.validate_initialized().is_ok()
    }

    /// Start the session and register with the instance registry.
    pub async fn initialize(&mut self) -> DriverResult<()> {
        if self.page.is_some() {
            return Err(DriverError::DoubleInitialization);
        }

        let lease = self.registry.register();
        info!(
            instance = lease.id(),
            width = self.config.viewport.width,
            height = self.config.viewport.height,
            headless = self.config.headless,
            "Simulated driver initialized"
        );
        self.page = Some(SimulatedPage::new(&self.config));
        self.lease = Some(lease);
        Ok(())
    }

    /// End the session. A no-op when never initialized; safe to repeat.
    pub async fn cleanup(&mut self) {
        let Some(mut page) = self.page.take() else {
            debug!("Cleanup on uninitialized driver");
            return;
        };
        page.close();
        if let Some(lease) = self.lease.take() {
            self.registry.unregister(&lease);
            info!(instance = lease.id(), "Simulated driver cleaned up");
        }
    }

    /// Fails unless the session is live.
    pub fn validate_initialized(&self) -> DriverResult<()> {
        match (&self.page, &self.lease) {
            (Some(_), Some(lease)) if lease.is_released() => Err(DriverError::ReleasedByRegistry),
            (Some(_), Some(_)) => Ok(()),
            _ => Err(DriverError::NotInitialized),
        }
    }

    /// The live page.
    pub fn page(&mut self) -> DriverResult<&mut SimulatedPage> {
        self.validate_initialized()?;
        self.page.as_mut().ok_or(DriverError::NotInitialized)
    }
}

impl Drop for SimulatedDriver {
    fn drop(&mut self) {
        if let Some(lease) = self.lease.take() {
            self.registry.unregister(&lease);
            debug!(instance = lease.id(), "Simulated driver dropped without cleanup");
        }
    }
}
