use crate::lookup::IpSource;

/// Recorded when neither lookup service answers.
pub const PRIVATE_IP: &str = "Private/Internal";

/// Primary-then-fallback IP resolution that always produces an address.
pub struct IpResolver {
    primary: Box<dyn IpSource>,
    fallback: Box<dyn IpSource>,
}

impl IpResolver {
    pub fn new(primary: Box<dyn IpSource>, fallback: Box<dyn IpSource>) -> Self {
        Self { primary, fallback }
    }

    /// The visitor's IP, or [`PRIVATE_IP`] when both lookups fail.
    pub async fn resolve(&self) -> String {
        match self.primary.lookup().await {
            Ok(ip) => {
                tracing::debug!(source = self.primary.name(), %ip, "Resolved visitor IP");
                return ip;
            }
            Err(e) => {
                tracing::info!(
                    source = self.primary.name(),
                    error = %e,
                    "Primary IP lookup failed, trying fallback",
                );
            }
        }

        match self.fallback.lookup().await {
            Ok(ip) => {
                tracing::debug!(source = self.fallback.name(), %ip, "Resolved visitor IP via fallback");
                ip
            }
            Err(e) => {
                tracing::warn!(
                    source = self.fallback.name(),
                    error = %e,
                    "All IP lookups failed, recording {PRIVATE_IP}",
                );
                PRIVATE_IP.to_string()
            }
        }
    }
}
