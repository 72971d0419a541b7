//! Convenience macros for common logging patterns.

/// Log a timed operation (measures and logs duration)
#[macro_export]
macro_rules! log_timed {
    ($name:expr, $block:expr) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(target: "timing", operation = $name, duration_ms = duration_ms, "operation completed");
        result
    }};
}

/// Log an external service call
#[macro_export]
macro_rules! log_external_call {
    ($service:expr, $endpoint:expr) => {
        tracing::debug!(target: "external", service = $service, endpoint = $endpoint, "calling external service");
    };
    ($service:expr, $endpoint:expr, $duration_ms:expr, $status:expr) => {
        tracing::debug!(target: "external", service = $service, endpoint = $endpoint, duration_ms = $duration_ms, status = $status, "external call completed");
    };
}

/// Log a graph database operation
#[macro_export]
macro_rules! log_db {
    ($operation:expr, $label:expr) => {
        tracing::debug!(target: "database", operation = $operation, label = $label, "db operation");
    };
    ($operation:expr, $label:expr, $count:expr) => {
        tracing::debug!(target: "database", operation = $operation, label = $label, count = $count, "db operation");
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        let value = log_timed!("sum", 1 + 1);
        assert_eq!(value, 2);

        log_external_call!("qdrant", "/collections");
        log_external_call!("qdrant", "/collections", 12u64, 200u16);

        log_db!("CREATE", "Entity");
        log_db!("CREATE", "Entity", 3usize);
    }
}
