/// Service health status
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceHealth {
    /// Service is operating normally
    Healthy,

    /// Service is operating but with degraded performance
    Degraded(String),

    /// Service is starting up
    Starting,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceHealth::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ServiceHealth::Degraded(_))
    }

    /// Lowercase label for JSON status output
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceHealth::Healthy => "healthy",
            ServiceHealth::Degraded(_) => "degraded",
            ServiceHealth::Starting => "starting",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ServiceHealth::Degraded(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_detail() {
        assert!(ServiceHealth::Healthy.is_healthy());
        assert_eq!(ServiceHealth::Starting.as_str(), "starting");
        assert_eq!(ServiceHealth::Starting.detail(), None);

        let degraded = ServiceHealth::Degraded("HTTP 503".to_string());
        assert!(degraded.is_degraded());
        assert!(!degraded.is_healthy());
        assert_eq!(degraded.as_str(), "degraded");
        assert_eq!(degraded.detail(), Some("HTTP 503"));
    }
}
