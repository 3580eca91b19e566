use std::{cmp::Reverse, collections::HashSet};

use crate::sources::Metadata;

/// Quita el video semilla y los ids repetidos (gana la primera aparición).
///
/// `seed_ids` lleva todas las formas conocidas de la semilla: la referencia
/// pedida y el id que resolvió el extractor.
pub fn dedupe_candidates(candidates: Vec<Metadata>, seed_ids: &[&str]) -> Vec<Metadata> {
    let mut seen: HashSet<String> = seed_ids.iter().map(|id| id.to_string()).collect();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}

/// Orden descendente estable por dos claves:
/// 1. el artista del candidato contiene el artista de la semilla,
/// 2. título + artista contienen "music".
///
/// `seed_artist` ya viene en minúsculas. Si está vacío todos los candidatos
/// coinciden en la primera clave.
pub fn rank_candidates(candidates: &mut [Metadata], seed_artist: &str) {
    candidates.sort_by_key(|c| {
        let artist = c.artist.to_lowercase();
        let same_artist = artist.contains(seed_artist);
        let mentions_music = format!("{}{}", c.title.to_lowercase(), artist).contains("music");
        Reverse((same_artist, mentions_music))
    });
}
