use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rocket::fs::TempFile;
use rocket::tokio::fs::OpenOptions;

use super::{upload_extension, MediaStorage, StorageBackend, StoredMedia};

/// Uploads kept on local disk and served from `/uploads`.
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalStorage { dir: dir.into() }
    }

    /// Claim `<unix millis>.<ext>` by creating it empty, appending `-<n>`
    /// while the name is taken. The claim holds across concurrent uploads.
    async fn reserve_filename(&self, ext: &str) -> Result<String, String> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let mut name = format!("{}.{}", stamp, ext);
        let mut n = 1;
        loop {
            let claimed = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&name))
                .await;
            match claimed {
                Ok(_) => return Ok(name),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    name = format!("{}-{}.{}", stamp, n, ext);
                    n += 1;
                }
                Err(e) => return Err(format!("{}: {}", name, e)),
            }
        }
    }

    /// Only bare file names resolve inside the uploads directory.
    fn path_for(&self, filename: &str) -> Result<PathBuf, String> {
        let candidate = Path::new(filename);
        match candidate.file_name() {
            Some(name) if name == candidate.as_os_str() => Ok(self.dir.join(name)),
            _ => Err(format!("invalid upload filename: {}", filename)),
        }
    }
}

#[rocket::async_trait]
impl MediaStorage for LocalStorage {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn store(&self, file: &mut TempFile<'_>) -> Result<StoredMedia, String> {
        rocket::tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| format!("{}: {}", self.dir.display(), e))?;

        let filename = self.reserve_filename(&upload_extension(file)).await?;
        let dest = self.dir.join(&filename);
        if let Err(e) = file.move_copy_to(&dest).await {
            let _ = rocket::tokio::fs::remove_file(&dest).await;
            return Err(format!("failed to save upload {}: {}", filename, e));
        }

        Ok(StoredMedia::local(filename))
    }

    async fn delete(&self, media: &StoredMedia) -> Result<(), String> {
        let path = self.path_for(&media.reference)?;
        match rocket::tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("{}: {}", path.display(), e)),
        }
    }

    fn url(&self, media: &StoredMedia) -> String {
        format!("/uploads/{}", media.reference)
    }
}
