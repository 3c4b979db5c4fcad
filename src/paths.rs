use anyhow::{Result, bail};
use std::{env, path::PathBuf};

/// Directory holding reposync's own files.
///
/// `$XDG_CONFIG_HOME/reposync`, or `$HOME/.config/reposync` when
/// `XDG_CONFIG_HOME` is unset.
pub fn reposync_home() -> Result<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => match env::var_os("HOME").filter(|v| !v.is_empty()) {
            Some(home) => PathBuf::from(home).join(".config"),
            None => bail!("neither XDG_CONFIG_HOME nor HOME is set"),
        },
    };
    Ok(base.join("reposync"))
}

/// Location of the optional defaults file.
pub fn config_path() -> Result<PathBuf> {
    Ok(reposync_home()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn prefers_xdg_config_home() {
        let td = tempfile::tempdir().unwrap();
        let prev = env::var_os("XDG_CONFIG_HOME");
        unsafe { env::set_var("XDG_CONFIG_HOME", td.path()) };

        let got = config_path().unwrap();

        match prev {
            Some(v) => unsafe { env::set_var("XDG_CONFIG_HOME", v) },
            None => unsafe { env::remove_var("XDG_CONFIG_HOME") },
        }
        assert_eq!(got, td.path().join("reposync").join("config.toml"));
    }

    #[test]
    #[serial]
    fn falls_back_to_home_dot_config() {
        let td = tempfile::tempdir().unwrap();
        let prev_xdg = env::var_os("XDG_CONFIG_HOME");
        let prev_home = env::var_os("HOME");
        unsafe {
            env::remove_var("XDG_CONFIG_HOME");
            env::set_var("HOME", td.path());
        }

        let got = reposync_home().unwrap();

        unsafe {
            if let Some(v) = prev_xdg {
                env::set_var("XDG_CONFIG_HOME", v);
            }
            match prev_home {
                Some(v) => env::set_var("HOME", v),
                None => env::remove_var("HOME"),
            }
        }
        assert_eq!(got, td.path().join(".config").join("reposync"));
    }
}
