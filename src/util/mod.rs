pub mod compute_stats;
pub mod id_allocator;
pub mod levenshtein;
