use std::env;
use std::io;
use std::path::PathBuf;

/// Resolve the application home directory.
///
/// `explicit` may start with `~`, which expands to the user's home. With no
/// explicit value the platform default is `<home>/<default_subdir>`
/// (the roaming config dir on Windows). Relative results are made absolute
/// against the current directory.
pub(crate) fn resolve_home_dir(
    explicit: Option<String>,
    default_subdir: &str,
    create: bool,
) -> io::Result<PathBuf> {
    let path = match explicit {
        Some(raw) => expand_tilde(&raw)?,
        None => default_base()?.join(default_subdir),
    };
    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()?.join(path)
    };
    if create {
        std::fs::create_dir_all(&path)?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> io::Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

fn user_home() -> io::Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory"))
}

fn default_base() -> io::Result<PathBuf> {
    if cfg!(windows) {
        dirs::config_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "cannot determine config directory")
        })
    } else {
        user_home()
    }
}
