use std::sync::Mutex;
use std::time::Duration;
use vigil::config::Config;
use vigil::error::ServerError;

// The environment is process-global; tests touching it take turns.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 5] = [
    "LISTEN",
    "VIGIL_CONFIG",
    "VIGIL_DEADLINE_SECS",
    "VIGIL_WORKERS",
    "VIGIL_MAX_REQUEST_BYTES",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

#[test]
fn test_config_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.deadline, Duration::from_secs(60));
    assert_eq!(cfg.workers, 1);
    assert_eq!(cfg.max_request_bytes, 8192);
    assert_eq!(cfg, Config::default());
}

#[test]
fn test_config_custom_address_from_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:3000");
        std::env::set_var("VIGIL_DEADLINE_SECS", "5");
        std::env::set_var("VIGIL_WORKERS", "4");
    }

    let cfg = Config::load().unwrap();
    clear_env();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.deadline, Duration::from_secs(5));
    assert_eq!(cfg.workers, 4);
}

#[test]
fn test_config_rejects_bad_numbers() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("VIGIL_DEADLINE_SECS", "soon");
    }

    let result = Config::load();
    clear_env();

    assert!(matches!(result, Err(ServerError::Config(_))));
}

#[test]
fn test_config_rejects_zero_deadline() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("VIGIL_DEADLINE_SECS", "0");
    }

    let result = Config::load();
    clear_env();

    assert!(matches!(result, Err(ServerError::Config(_))));
}

#[test]
fn test_config_file_then_env_override() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let path = std::env::temp_dir().join(format!("vigil-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "listen: 10.0.0.1:9000\ndeadline_secs: 30\nworkers: 2\n").unwrap();
    unsafe {
        std::env::set_var("VIGIL_CONFIG", &path);
        std::env::set_var("VIGIL_WORKERS", "8");
    }

    let cfg = Config::load();
    clear_env();
    std::fs::remove_file(&path).unwrap();
    let cfg = cfg.unwrap();

    assert_eq!(cfg.listen_addr, "10.0.0.1:9000");
    assert_eq!(cfg.deadline, Duration::from_secs(30));
    assert_eq!(cfg.workers, 8);
    assert_eq!(cfg.max_request_bytes, 8192);
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let cfg = Config::from_file("/nonexistent/vigil.yaml").unwrap();

    assert_eq!(cfg, Config::default());
}

#[test]
fn test_config_yaml_partial() {
    let cfg = Config::from_yaml("max_request_bytes: 1024\n").unwrap();

    assert_eq!(cfg.max_request_bytes, 1024);
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
}

#[test]
fn test_config_yaml_unknown_key() {
    let result = Config::from_yaml("listen: 127.0.0.1:1\nkeepalive: true\n");

    assert!(matches!(result, Err(ServerError::Config(_))));
}

#[test]
fn test_config_yaml_wrong_type() {
    let result = Config::from_yaml("workers: many\n");

    assert!(matches!(result, Err(ServerError::Config(_))));
}

#[test]
fn test_config_new() {
    let cfg = Config::new("127.0.0.1", 0);

    assert_eq!(cfg.listen_addr, "127.0.0.1:0");
    assert_eq!(cfg.deadline, Duration::from_secs(60));
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::new("0.0.0.0", 5000);
    let cfg2 = cfg1.clone();

    assert_eq!(cfg1, cfg2);
}
