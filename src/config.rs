use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medtrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_PORT: u16 = 8600;

/// Get the application data directory.
/// `MEDTRACK_DATA_DIR` overrides the default `~/Medtrack/`.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEDTRACK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medtrack")
}

/// Path of the service database
pub fn database_path() -> PathBuf {
    app_data_dir().join("medtrack.db")
}

/// Address the API server binds. `MEDTRACK_ADDR` overrides the
/// default `127.0.0.1:8600`.
pub fn bind_addr() -> SocketAddr {
    if let Ok(value) = std::env::var("MEDTRACK_ADDR") {
        match value.parse() {
            Ok(addr) => return addr,
            Err(e) => tracing::warn!("Ignoring invalid MEDTRACK_ADDR {value:?}: {e}"),
        }
    }
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

/// Log filter used when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "medtrack=info,tower_http=info"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_under_data_dir() {
        let path = database_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("medtrack.db"));
    }

    #[test]
    fn bind_addr_defaults_to_loopback() {
        if std::env::var("MEDTRACK_ADDR").is_err() {
            let addr = bind_addr();
            assert!(addr.ip().is_loopback());
            assert_eq!(addr.port(), DEFAULT_PORT);
        }
    }

    #[test]
    fn app_name_is_medtrack() {
        assert_eq!(APP_NAME, "Medtrack");
        assert!(!APP_VERSION.is_empty());
    }
}
