use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

const PLAYLISTS_FILE: &str = "playlists.json";
const LIKES_FILE: &str = "liked_songs.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Playlist not found")]
    PlaylistNotFound(u64),

    #[error("Playlist name required")]
    EmptyName,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canción guardada en una playlist o en favoritos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl SongRecord {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: None,
            artist: None,
            thumbnail: None,
            added_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<SongRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlaylistsFile {
    #[serde(default)]
    playlists: Vec<Playlist>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LikesFile {
    #[serde(default)]
    liked: Vec<SongRecord>,
}

/// Repositorio de playlists y favoritos en archivos JSON.
///
/// Se carga una vez al arrancar y cada mutación se escribe a disco.
pub struct LibraryStore {
    data_dir: PathBuf,
    playlists: Vec<Playlist>,
    liked: Vec<SongRecord>,
}

impl LibraryStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, StorageError> {
        // Crear directorio de datos si no existe
        fs::create_dir_all(&data_dir).await?;

        let playlists: PlaylistsFile = load_or_default(&data_dir.join(PLAYLISTS_FILE)).await;
        let likes: LikesFile = load_or_default(&data_dir.join(LIKES_FILE)).await;

        info!(
            "📁 Biblioteca cargada desde {}: {} playlists, {} favoritos",
            data_dir.display(),
            playlists.playlists.len(),
            likes.liked.len()
        );

        Ok(Self {
            data_dir,
            playlists: playlists.playlists,
            liked: likes.liked,
        })
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: u64) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub async fn create_playlist(&mut self, name: &str) -> Result<Playlist, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }

        let id = self.playlists.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let playlist = Playlist {
            id,
            name: name.to_string(),
            songs: Vec::new(),
            created_at: Some(Utc::now()),
        };

        let mut playlists = self.playlists.clone();
        playlists.push(playlist.clone());
        self.commit_playlists(playlists).await?;

        info!("📝 Playlist creada: {} ({})", playlist.name, id);
        Ok(playlist)
    }

    pub async fn add_song(
        &mut self,
        playlist_id: u64,
        mut song: SongRecord,
    ) -> Result<AddOutcome, StorageError> {
        let mut playlists = self.playlists.clone();
        let playlist = find_playlist(&mut playlists, playlist_id)?;

        if playlist.songs.iter().any(|s| s.video_id == song.video_id) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        song.added_at.get_or_insert_with(Utc::now);
        playlist.songs.push(song);
        self.commit_playlists(playlists).await?;
        Ok(AddOutcome::Added)
    }

    /// `false` si la canción no estaba en la playlist
    pub async fn remove_song(&mut self, playlist_id: u64, video_id: &str) -> Result<bool, StorageError> {
        let mut playlists = self.playlists.clone();
        let playlist = find_playlist(&mut playlists, playlist_id)?;

        let before = playlist.songs.len();
        playlist.songs.retain(|s| s.video_id != video_id);
        if playlist.songs.len() == before {
            return Ok(false);
        }

        self.commit_playlists(playlists).await?;
        Ok(true)
    }

    /// Idempotente: borrar una playlist inexistente no es un error
    pub async fn delete_playlist(&mut self, playlist_id: u64) -> Result<bool, StorageError> {
        let mut playlists = self.playlists.clone();
        playlists.retain(|p| p.id != playlist_id);
        let removed = playlists.len() != self.playlists.len();

        self.commit_playlists(playlists).await?;
        if removed {
            info!("🗑️ Playlist eliminada: {}", playlist_id);
        }
        Ok(removed)
    }

    pub fn liked(&self) -> &[SongRecord] {
        &self.liked
    }

    /// Marca o desmarca una canción. Devuelve el nuevo estado.
    pub async fn toggle_like(&mut self, mut song: SongRecord) -> Result<bool, StorageError> {
        let mut liked = self.liked.clone();
        liked.retain(|s| s.video_id != song.video_id);

        let now_liked = liked.len() == self.liked.len();
        if now_liked {
            song.added_at.get_or_insert_with(Utc::now);
            liked.push(song);
        }

        let file = LikesFile { liked };
        self.save(LIKES_FILE, &file).await?;
        self.liked = file.liked;
        Ok(now_liked)
    }

    // Métodos privados

    /// Escribe la nueva lista y sólo entonces la adopta en memoria
    async fn commit_playlists(&mut self, playlists: Vec<Playlist>) -> Result<(), StorageError> {
        let file = PlaylistsFile { playlists };
        self.save(PLAYLISTS_FILE, &file).await?;
        self.playlists = file.playlists;
        Ok(())
    }

    /// Escribe a un temporal y renombra para no dejar archivos a medias
    async fn save<T: Serialize>(&self, file_name: &str, value: &T) -> Result<(), StorageError> {
        let path = self.data_dir.join(file_name);
        let tmp = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn find_playlist(playlists: &mut [Playlist], playlist_id: u64) -> Result<&mut Playlist, StorageError> {
    playlists
        .iter_mut()
        .find(|p| p.id == playlist_id)
        .ok_or(StorageError::PlaylistNotFound(playlist_id))
}

/// Un archivo ausente o corrupto cuenta como vacío
async fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!("Error leyendo {}: {}", path.display(), e);
            return T::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Archivo corrupto {}, se ignora: {}", path.display(), e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn store() -> (LibraryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LibraryStore::new(dir.path().to_path_buf()).await.unwrap();
        (store, dir)
    }

    fn song(id: &str) -> SongRecord {
        SongRecord {
            title: Some(format!("Title {id}")),
            ..SongRecord::new(id)
        }
    }

    #[tokio::test]
    async fn playlist_ids_increment_from_max() {
        let (mut store, _dir) = store().await;

        let first = store.create_playlist("  Chill  ").await.unwrap();
        let second = store.create_playlist("Gym").await.unwrap();
        store.delete_playlist(first.id).await.unwrap();
        let third = store.create_playlist("Road").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(first.name, "Chill");
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (mut store, _dir) = store().await;
        assert!(matches!(store.create_playlist("   ").await, Err(StorageError::EmptyName)));
    }

    #[tokio::test]
    async fn add_song_is_idempotent_per_video() {
        let (mut store, _dir) = store().await;
        let playlist = store.create_playlist("Mix").await.unwrap();

        assert_eq!(store.add_song(playlist.id, song("a")).await.unwrap(), AddOutcome::Added);
        assert_eq!(
            store.add_song(playlist.id, song("a")).await.unwrap(),
            AddOutcome::AlreadyPresent
        );
        assert_eq!(store.playlist(playlist.id).unwrap().songs.len(), 1);
        assert!(store.playlist(playlist.id).unwrap().songs[0].added_at.is_some());

        assert!(matches!(
            store.add_song(99, song("a")).await,
            Err(StorageError::PlaylistNotFound(99))
        ));
    }

    #[tokio::test]
    async fn remove_song_reports_absence() {
        let (mut store, _dir) = store().await;
        let playlist = store.create_playlist("Mix").await.unwrap();
        store.add_song(playlist.id, song("a")).await.unwrap();

        assert!(store.remove_song(playlist.id, "a").await.unwrap());
        assert!(!store.remove_song(playlist.id, "a").await.unwrap());
    }

    #[tokio::test]
    async fn toggle_like_flips_state() {
        let (mut store, _dir) = store().await;

        assert!(store.toggle_like(song("a")).await.unwrap());
        assert_eq!(store.liked().len(), 1);
        assert!(!store.toggle_like(song("a")).await.unwrap());
        assert!(store.liked().is_empty());
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let (mut store, dir) = store().await;
        let playlist = store.create_playlist("Keep").await.unwrap();
        store.add_song(playlist.id, song("a")).await.unwrap();
        store.toggle_like(song("b")).await.unwrap();

        let reloaded = LibraryStore::new(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(reloaded.playlists(), store.playlists());
        assert_eq!(reloaded.liked(), store.liked());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PLAYLISTS_FILE), "{not json").unwrap();

        let store = LibraryStore::new(dir.path().to_path_buf()).await.unwrap();
        assert!(store.playlists().is_empty());
    }

    #[tokio::test]
    async fn reads_files_without_timestamps() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PLAYLISTS_FILE),
            r#"{"playlists":[{"id":4,"name":"Old","songs":[{"videoId":"x","title":"T","artist":null,"thumbnail":null}]}]}"#,
        )
        .unwrap();

        let mut store = LibraryStore::new(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(store.playlists()[0].songs[0].video_id, "x");
        assert_eq!(store.create_playlist("New").await.unwrap().id, 5);
    }

    #[tokio::test]
    async fn failed_writes_leave_memory_untouched() {
        let (mut store, dir) = store().await;
        let playlist = store.create_playlist("Keep").await.unwrap();
        store.add_song(playlist.id, song("a")).await.unwrap();
        store.toggle_like(song("b")).await.unwrap();
        let playlists_before = store.playlists().to_vec();
        let liked_before = store.liked().to_vec();

        // Sin directorio de datos toda escritura falla
        std::fs::remove_dir_all(dir.path()).unwrap();

        assert!(matches!(store.create_playlist("Ghost").await, Err(StorageError::Io(_))));
        assert!(store.add_song(playlist.id, song("c")).await.is_err());
        assert!(store.remove_song(playlist.id, "a").await.is_err());
        assert!(store.delete_playlist(playlist.id).await.is_err());
        assert!(store.toggle_like(song("b")).await.is_err());
        assert!(store.toggle_like(song("d")).await.is_err());

        assert_eq!(store.playlists(), playlists_before.as_slice());
        assert_eq!(store.liked(), liked_before.as_slice());
    }
}
