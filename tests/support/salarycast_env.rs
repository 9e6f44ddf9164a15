use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use salarycast::{app_dirs::CONFIG_HOME_ENV, config::API_URL_ENV};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points the app directories (and optionally the service URL) at test
/// values, restoring the previous environment on drop.
pub struct SalarycastEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl SalarycastEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        Self::set(path, None)
    }

    pub fn set(config_home: PathBuf, api_url: Option<&str>) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = [CONFIG_HOME_ENV, API_URL_ENV]
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME_ENV, config_home);
            match api_url {
                Some(url) => std::env::set_var(API_URL_ENV, url),
                None => std::env::remove_var(API_URL_ENV),
            }
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for SalarycastEnvGuard {
    fn drop(&mut self) {
        for (name, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}
