//! Utility functions for HTTP responses and storage queries

use std::path::Path;

/// Derive a destination file name from an HTTP response
///
/// Prefers the `Content-Disposition` header (both the quoted `filename=` and
/// the RFC 5987 `filename*=` forms), then falls back to the last URL path
/// segment, then to `"download"`. The extension is kept: the result is used
/// verbatim as the on-disk name of a store or package file.
///
/// # Arguments
///
/// * `response` - The response whose headers to inspect
/// * `url` - The original URL (used as fallback)
pub fn filename_from_response(response: &reqwest::Response, url: &str) -> String {
    if let Some(disposition) = response.headers().get("content-disposition")
        && let Ok(value) = disposition.to_str()
    {
        for part in value.split(';') {
            let part = part.trim();
            if let Some(name) = part.strip_prefix("filename=") {
                let name = name.trim_matches('"');
                if !name.is_empty() {
                    return name.to_string();
                }
            } else if let Some(encoded) = part.strip_prefix("filename*=") {
                // charset'lang'percent-encoded-name
                if let Some(idx) = encoded.rfind('\'')
                    && let Ok(decoded) = urlencoding::decode(&encoded[idx + 1..])
                    && !decoded.is_empty()
                {
                    return decoded.into_owned();
                }
            }
        }
    }

    if let Ok(parsed) = url::Url::parse(url)
        && let Some(mut segments) = parsed.path_segments()
        && let Some(last) = segments.next_back()
        && !last.is_empty()
    {
        return last.to_string();
    }

    "download".to_string()
}

/// Get available disk space for a given path
///
/// Uses statvfs on unix and GetDiskFreeSpaceExW on Windows. Backs the
/// optional free-space precheck before a download is persisted.
pub fn get_available_space(path: &Path) -> std::io::Result<u64> {
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid null-terminated C string, stat is zeroed
        // before the call, and its fields are only read after statvfs reports
        // success.
        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            // Blocks available to unprivileged users times the fragment size.
            Ok(stat.f_bavail.saturating_mul(stat.f_frsize))
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::fileapi::GetDiskFreeSpaceExW;

        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide_path is null-terminated and the out-pointers reference
        // valid u64s that are only read after the call reports success.
        unsafe {
            let mut free_bytes_available: u64 = 0;
            let mut _total_bytes: u64 = 0;
            let mut _total_free_bytes: u64 = 0;

            if GetDiskFreeSpaceExW(
                wide_path.as_ptr(),
                &mut free_bytes_available as *mut u64 as *mut _,
                &mut _total_bytes as *mut u64 as *mut _,
                &mut _total_free_bytes as *mut u64 as *mut _,
            ) == 0
            {
                return Err(std::io::Error::last_os_error());
            }

            Ok(free_bytes_available)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Disk space checking is not supported on this platform",
        ))
    }
}
