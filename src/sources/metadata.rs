use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Información cruda que devuelve el extractor (yt-dlp `-J` o una línea de
/// `--flat-playlist`). Casi todo es opcional: el upstream devuelve datos
/// parciales con frecuencia.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// URL ya resuelta del formato elegido
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Vec<FormatInfo>,
    #[serde(default)]
    pub thumbnails: Vec<ThumbnailInfo>,
    #[serde(default)]
    pub related_videos: Vec<VideoInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatInfo {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThumbnailInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl VideoInfo {
    /// Mejor URL reproducible: la de nivel superior, o la del primer formato
    /// (en el orden que declara el extractor) que tenga URL.
    pub fn stream_url(&self) -> Option<String> {
        non_empty(&self.url)
            .or_else(|| self.formats.iter().find_map(|f| non_empty(&f.url)))
            .map(str::to_string)
    }

    /// Miniatura de mayor resolución. Sin dimensiones gana la última, que es
    /// la preferida por yt-dlp.
    pub fn best_thumbnail(&self) -> Option<&str> {
        self.thumbnails
            .iter()
            .filter(|t| non_empty(&t.url).is_some())
            .max_by_key(|t| u64::from(t.width.unwrap_or(0)) * u64::from(t.height.unwrap_or(0)))
            .and_then(|t| non_empty(&t.url))
    }

    /// Artista declarado o, en su defecto, el uploader
    pub fn primary_artist(&self) -> Option<&str> {
        non_empty(&self.artist).or_else(|| non_empty(&self.uploader))
    }

    /// Consulta de respaldo para el autoplay: "artista título" recortado, o
    /// "popular songs" si ambos faltan.
    pub fn fallback_query(&self) -> String {
        let query = format!(
            "{} {}",
            self.primary_artist().unwrap_or_default(),
            non_empty(&self.title).unwrap_or_default()
        );
        let query = query.trim();

        if query.is_empty() {
            "popular songs".to_string()
        } else {
            query.to_string()
        }
    }

    /// Convierte hasta `max_related` videos relacionados, descartando los
    /// que no traen id.
    pub fn related_metadata(&self, max_related: usize) -> Vec<Metadata> {
        self.related_videos
            .iter()
            .take(max_related)
            .filter_map(Metadata::from_entry)
            .collect()
    }
}

/// Registro normalizado de un video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(rename = "videoId")]
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(skip)]
    pub related: Vec<Metadata>,
}

impl Metadata {
    /// Normaliza una entrada del extractor. `None` si no tiene id.
    pub fn from_entry(entry: &VideoInfo) -> Option<Self> {
        let id = non_empty(&entry.id)?.to_string();

        Some(Self {
            title: non_empty(&entry.title).unwrap_or(UNKNOWN_TITLE).to_string(),
            artist: non_empty(&entry.uploader)
                .or_else(|| non_empty(&entry.channel))
                .unwrap_or(UNKNOWN_ARTIST)
                .to_string(),
            thumbnail_url: entry
                .best_thumbnail()
                .map(str::to_string)
                .unwrap_or_else(|| thumbnail_for(&id)),
            related: Vec::new(),
            id,
        })
    }

    /// Igual que [`Metadata::from_entry`] pero conservando los relacionados
    pub fn with_related(entry: &VideoInfo, max_related: usize) -> Option<Self> {
        let mut metadata = Self::from_entry(entry)?;
        metadata.related = entry.related_metadata(max_related);
        Some(metadata)
    }
}

/// Miniatura determinista a partir del id, cuando el upstream no trae ninguna
pub fn thumbnail_for(id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id)
}

/// Un id suelto se convierte en URL de YouTube; lo que ya es URL se respeta
pub fn watch_url(reference: &str) -> String {
    if url::Url::parse(reference).is_ok() {
        reference.to_string()
    } else {
        format!("{}{}", WATCH_URL_PREFIX, reference)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
