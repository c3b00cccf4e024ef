//! Randomization for enqueued batches and shuffled advance

use cadence_core::Song;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use std::sync::Arc;

/// Fisher-Yates permutation of a batch about to be appended
pub fn shuffle_batch(songs: &mut [Arc<Song>]) {
    let mut rng = thread_rng();
    songs.shuffle(&mut rng);
}

/// Uniformly random queue index; `len` must be non-zero
pub fn random_index(len: usize) -> usize {
    thread_rng().gen_range(0..len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::SongId;
    use std::collections::HashSet;

    fn song(id: &str) -> Arc<Song> {
        Arc::new(Song::placeholder(SongId::new(id), format!("/music/{id}.mp3"), 1, None))
    }

    #[test]
    fn shuffle_preserves_all_songs() {
        let mut songs: Vec<_> = (0..10).map(|i| song(&i.to_string())).collect();
        shuffle_batch(&mut songs);

        let ids: HashSet<_> = songs.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn shuffle_empty_and_single() {
        let mut empty: Vec<Arc<Song>> = vec![];
        shuffle_batch(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![song("1")];
        shuffle_batch(&mut one);
        assert_eq!(one[0].id, SongId::new("1"));
    }

    #[test]
    fn random_index_in_range() {
        for _ in 0..200 {
            assert!(random_index(3) < 3);
        }
        assert_eq!(random_index(1), 0);
    }
}
