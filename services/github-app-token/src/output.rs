//! Token file output
//!
//! The token file is owner-only from the moment it exists.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Write `token` to `path`, creating or truncating it with mode 0600 on unix
pub fn write_token_file(path: &Path, token: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    // An existing file keeps its old mode on open
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(token.as_bytes())?;
    file.flush()
}
