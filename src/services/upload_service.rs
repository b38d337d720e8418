//! Almacenamiento de archivos subidos
//!
//! Los archivos se guardan en `<upload_dir>/<kind>/<uuid>.<ext>` y se
//! sirven de forma estática bajo `/uploads`.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::{multipart::Field, Multipart};
use tracing::{debug, info};
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

pub const PUBLIC_PREFIX: &str = "/uploads";

/// Tipo de archivo subido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    LicenseDocument,
    CarPhoto,
    Selfie,
}

impl UploadKind {
    pub fn directory(&self) -> &'static str {
        match self {
            UploadKind::LicenseDocument => "licenses",
            UploadKind::CarPhoto => "cars",
            UploadKind::Selfie => "selfies",
        }
    }

    /// Content types aceptados y la extensión con la que se guardan
    fn accepted(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            UploadKind::LicenseDocument => &[
                ("application/pdf", "pdf"),
                ("image/jpeg", "jpg"),
                ("image/png", "png"),
            ],
            UploadKind::CarPhoto => &[
                ("image/jpeg", "jpg"),
                ("image/png", "png"),
                ("image/webp", "webp"),
            ],
            UploadKind::Selfie => &[("image/jpeg", "jpg"), ("image/png", "png")],
        }
    }

    pub fn extension_for(&self, content_type: &str) -> Option<&'static str> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.accepted()
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
            .map(|(_, ext)| *ext)
    }
}

/// Almacén de archivos en disco
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validar y guardar un archivo. Devuelve la URL pública.
    pub async fn store(&self, kind: UploadKind, content_type: Option<&str>, bytes: Bytes) -> AppResult<String> {
        let content_type = content_type
            .ok_or_else(|| AppError::UnsupportedMediaType("Falta el content type del archivo".to_string()))?;
        let extension = kind.extension_for(content_type).ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "Tipo '{}' no permitido para {}",
                content_type,
                kind.directory()
            ))
        })?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("El archivo está vacío".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "El archivo supera el máximo de {} bytes",
                self.max_bytes
            )));
        }

        let directory = self.root.join(kind.directory());
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| AppError::Internal(format!("Error creando directorio de subida: {}", e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(directory.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Error guardando archivo: {}", e)))?;

        info!("📎 Archivo guardado: {}/{} ({} bytes)", kind.directory(), file_name, bytes.len());
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, kind.directory(), file_name))
    }

    /// Guardar un campo de un formulario multipart
    pub async fn store_field(&self, kind: UploadKind, field: Field<'_>) -> AppResult<String> {
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        self.store(kind, content_type.as_deref(), bytes).await
    }

    /// Guardar el primer campo `field_name` de un formulario con un solo archivo
    pub async fn store_from_multipart(
        &self,
        kind: UploadKind,
        multipart: &mut Multipart,
        field_name: &str,
    ) -> AppResult<String> {
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some(field_name) {
                return self.store_field(kind, field).await;
            }
        }
        Err(AppError::BadRequest(format!("Falta el archivo '{}'", field_name)))
    }

    /// Borrar un archivo a partir de su URL pública; los errores se ignoran
    pub async fn remove(&self, public_url: &str) {
        let Some(relative) = public_url.strip_prefix(PUBLIC_PREFIX) else {
            return;
        };
        let relative = relative.trim_start_matches('/');
        if relative.contains("..") {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            debug!("No se pudo borrar {}: {}", public_url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(max_bytes: usize) -> UploadStore {
        UploadStore::new(std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4())), max_bytes)
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(UploadKind::LicenseDocument.extension_for("application/pdf"), Some("pdf"));
        assert_eq!(UploadKind::CarPhoto.extension_for("image/webp"), Some("webp"));
        assert_eq!(UploadKind::Selfie.extension_for("IMAGE/PNG"), Some("png"));
        assert_eq!(UploadKind::Selfie.extension_for("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(UploadKind::Selfie.extension_for("application/pdf"), None);
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_url() {
        let store = temp_store(1024);
        let url = store
            .store(UploadKind::CarPhoto, Some("image/png"), Bytes::from_static(b"\x89PNG data"))
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/cars/"));
        assert!(url.ends_with(".png"));

        let on_disk = store.root().join(url.trim_start_matches("/uploads/"));
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"\x89PNG data");

        store.remove(&url).await;
        assert!(tokio::fs::metadata(&on_disk).await.is_err());
        let _ = tokio::fs::remove_dir_all(store.root()).await;
    }

    #[tokio::test]
    async fn test_store_rejects_invalid_files() {
        let store = temp_store(4);

        let err = store
            .store(UploadKind::Selfie, Some("application/pdf"), Bytes::from_static(b"%PDF"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));

        let err = store.store(UploadKind::Selfie, None, Bytes::from_static(b"abc")).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));

        let err = store
            .store(UploadKind::Selfie, Some("image/png"), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = store
            .store(UploadKind::Selfie, Some("image/png"), Bytes::from_static(b"too large"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }
}
