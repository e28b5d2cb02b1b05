use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::SiteConfig;

pub const TEMPLATE_DIR: &str = "website/templates";
pub const STATIC_DIR: &str = "website/static";

/// Templates the admin area cannot work without
const CRITICAL_TEMPLATES: &[&str] = &[
    "website/templates/admin/login.html.tera",
    "website/templates/admin/dashboard.html.tera",
];

/// Create a file in `dir` and remove it again.
fn check_writable(dir: &Path) -> Result<(), String> {
    let test_file = dir.join(".write_test");
    fs::write(&test_file, "test").map_err(|e| e.to_string())?;
    let _ = fs::remove_file(&test_file);
    Ok(())
}

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, warns about missing templates, and
/// aborts if the data directory cannot be written.
pub fn run(config: &SiteConfig) {
    info!("Easel boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    for dir in [config.data_dir.as_path(), config.uploads_dir.as_path()] {
        if !dir.exists() {
            match fs::create_dir_all(dir) {
                Ok(_) => info!("  Created directory: {}", dir.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir.display(), e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Data directory writable ─────────────────────
    if config.data_dir.exists() {
        if let Err(e) = check_writable(&config.data_dir) {
            error!("  Data directory not writable: {}", e);
            errors += 1;
        }
    }

    // ── 3. Uploads directory writable ──────────────────
    if config.uploads_dir.exists() {
        if let Err(e) = check_writable(&config.uploads_dir) {
            warn!("  Uploads directory not writable: {} (local uploads will fail)", e);
            warnings += 1;
        }
    }

    // ── 4. Templates ───────────────────────────────────
    if !Path::new(TEMPLATE_DIR).is_dir() {
        warn!("  Template directory {} not found (pages will 500)", TEMPLATE_DIR);
        warnings += 1;
    } else {
        for file in CRITICAL_TEMPLATES {
            if !Path::new(file).exists() {
                warn!("  Missing template: {}", file);
                warnings += 1;
            }
        }
    }

    // ── 5. Static assets ───────────────────────────────
    if !Path::new(STATIC_DIR).is_dir() {
        match fs::create_dir_all(STATIC_DIR) {
            Ok(_) => {
                warn!("  Created empty {} (pages will be unstyled)", STATIC_DIR);
                warnings += 1;
            }
            Err(e) => {
                error!("  FAILED to create directory {}: {}", STATIC_DIR, e);
                errors += 1;
            }
        }
    }

    // ── 6. Image storage ───────────────────────────────
    match &config.cloudinary {
        Some(c) => info!("  Uploads go to Cloudinary (cloud {})", c.cloud_name),
        None => info!("  Uploads go to {}", config.uploads_dir.display()),
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}
