use async_process::{Command, Output};
use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::{ExtractionError, MetadataExtractor, VideoInfo};

/// Selección de formato: audio m4a primero, luego cualquier audio
const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";

/// Extractor basado en el binario `yt-dlp`
pub struct YtDlpExtractor {
    binary: String,
    // Limitar procesos concurrentes para evitar rate limiting
    rate_limiter: Semaphore,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<String>, max_concurrent: usize) -> Self {
        Self {
            binary: binary.into(),
            rate_limiter: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Versión instalada de yt-dlp (usado por el health check)
    pub async fn version(&self) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary).arg("--version").output().await?;
        let stdout = Self::check_output(output)?;
        Ok(stdout.trim().to_string())
    }

    async fn run(&self, args: &[&str]) -> Result<String, ExtractionError> {
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|_| ExtractionError::Upstream("extractor pool closed".to_string()))?;

        let output = Command::new(&self.binary).args(args).output().await?;
        Self::check_output(output)
    }

    fn check_output(output: Output) -> Result<String, ExtractionError> {
        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Upstream(error.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Una entrada JSON por línea; las líneas que no parsean se ignoran
    fn parse_lines(stdout: &str) -> Vec<VideoInfo> {
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<VideoInfo>(line).ok())
            .collect()
    }
}

#[async_trait]
impl MetadataExtractor for YtDlpExtractor {
    async fn extract(&self, reference: &str) -> Result<VideoInfo, ExtractionError> {
        debug!("📊 Obteniendo info de: {}", reference);

        let stdout = self
            .run(&[
                "--no-playlist",
                "--dump-single-json",
                "--skip-download",
                "--no-warnings",
                "-f",
                AUDIO_FORMAT,
                "--",
                reference,
            ])
            .await?;

        let info: VideoInfo = serde_json::from_str(stdout.trim())?;
        Ok(info)
    }

    async fn extract_search(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<VideoInfo>, ExtractionError> {
        info!("🔍 Buscando en YouTube: {}", query);

        let search_query = format!("ytsearch{}:{}", count, query);
        let stdout = self
            .run(&[
                "--flat-playlist",
                "--dump-json",
                "--skip-download",
                "--no-warnings",
                "--",
                &search_query,
            ])
            .await?;

        Ok(Self::parse_lines(&stdout))
    }
}
