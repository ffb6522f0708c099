//! Column clustering over embeddings.
//!
//! Source columns get a k-nearest-neighbour list (cosine distance, the column
//! itself included). Target columns are partitioned with k-means seeded by a
//! deterministic farthest-first pass, so repeated runs give the same groups.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Neighbours kept per source column.
pub const MAX_SOURCE_NEIGHBORS: usize = 10;
/// Upper bound on the number of target groups.
pub const MAX_TARGET_CLUSTERS: usize = 20;
const MAX_KMEANS_ITERATIONS: usize = 100;

/// Cosine similarity in `[-1, 1]`; 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// For each column, the `min(10, N)` nearest columns by cosine distance.
///
/// Ties keep column order, so a column is normally its own first neighbour.
pub fn knn_clusters(names: &[String], embeddings: &[Vec<f32>]) -> BTreeMap<String, Vec<String>> {
    let k = MAX_SOURCE_NEIGHBORS.min(names.len());
    let mut clusters = BTreeMap::new();
    for (i, name) in names.iter().enumerate() {
        let Some(query) = embeddings.get(i) else {
            continue;
        };
        let mut ranked: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(j, other)| {
                let distance = if i == j {
                    0.0
                } else {
                    1.0 - cosine_similarity(query, other)
                };
                (j, distance)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        let neighbours = ranked
            .into_iter()
            .take(k)
            .filter_map(|(j, _)| names.get(j).cloned())
            .collect();
        clusters.insert(name.clone(), neighbours);
    }
    clusters
}

/// Deterministic farthest-first seeding: first vector, then repeatedly the
/// vector farthest from its nearest chosen centroid.
fn farthest_first_init(vectors: &[Vec<f32>], k: usize) -> Vec<Vec<f32>> {
    let mut centroids = vec![vectors[0].clone()];
    let mut min_distances = vec![f32::MAX; vectors.len()];

    while centroids.len() < k {
        let Some(last) = centroids.last() else {
            break;
        };
        for (i, vector) in vectors.iter().enumerate() {
            min_distances[i] = min_distances[i].min(squared_distance(vector, last));
        }
        let Some((next, distance)) = min_distances
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        else {
            break;
        };
        if distance <= 0.0 {
            // Fewer distinct points than clusters.
            break;
        }
        centroids.push(vectors[next].clone());
    }
    centroids
}

fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::MAX;
    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(vector, centroid);
        if distance < best_distance {
            best = idx;
            best_distance = distance;
        }
    }
    best
}

fn compute_centroids(vectors: &[Vec<f32>], assignments: &[usize], previous: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let dims = vectors.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f32; dims]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (vector, &cluster) in vectors.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(vector) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), old)| {
            if count == 0 {
                return old.clone();
            }
            for value in &mut sum {
                *value /= count as f32;
            }
            sum
        })
        .collect()
}

/// Partitions columns into at most `min(20, M)` groups with k-means.
///
/// Groups are listed in order of their first member's column position, and
/// members keep column order.
pub fn kmeans_clusters(names: &[String], embeddings: &[Vec<f32>]) -> Vec<Vec<String>> {
    let n = names.len().min(embeddings.len());
    if n == 0 {
        return Vec::new();
    }
    let vectors = &embeddings[..n];
    let k = MAX_TARGET_CLUSTERS.min(n);

    let mut centroids = farthest_first_init(vectors, k);
    let mut assignments: Vec<usize> = vectors
        .iter()
        .map(|v| nearest_centroid(v, &centroids))
        .collect();

    for _ in 0..MAX_KMEANS_ITERATIONS {
        centroids = compute_centroids(vectors, &assignments, &centroids);
        let next: Vec<usize> = vectors
            .iter()
            .map(|v| nearest_centroid(v, &centroids))
            .collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }

    let mut order: Vec<usize> = Vec::new();
    let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (name, cluster) in names.iter().zip(&assignments) {
        if !groups.contains_key(cluster) {
            order.push(*cluster);
        }
        groups.entry(*cluster).or_default().push(name.clone());
    }
    order
        .into_iter()
        .filter_map(|cluster| groups.remove(&cluster))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn knn_includes_self_first() {
        let cols = names(&["a", "b", "c"]);
        let vectors = vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0]];
        let clusters = knn_clusters(&cols, &vectors);
        assert_eq!(clusters["a"], names(&["a", "b", "c"]));
        assert_eq!(clusters["c"][0], "c");
        assert_eq!(clusters["c"].len(), 3);
    }

    #[test]
    fn knn_caps_neighbours_at_ten() {
        let cols: Vec<String> = (0..12).map(|i| format!("c{i}")).collect();
        let vectors: Vec<Vec<f32>> = (0..12).map(|i| vec![1.0, i as f32]).collect();
        let clusters = knn_clusters(&cols, &vectors);
        assert!(clusters.values().all(|n| n.len() == 10));
    }

    #[test]
    fn kmeans_separates_obvious_groups() {
        let cols = names(&["x1", "y1", "x2", "y2"]);
        let vectors = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.95, 0.05],
            vec![0.05, 0.95],
        ];
        let clusters = kmeans_clusters(&cols, &vectors);
        // Four points, k = 4, all distinct: every column is its own group.
        assert_eq!(clusters.len(), 4);
        assert_eq!(clusters[0], names(&["x1"]));
    }

    #[test]
    fn kmeans_merges_identical_points() {
        let cols = names(&["a", "b", "c"]);
        let vectors = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let clusters = kmeans_clusters(&cols, &vectors);
        assert_eq!(clusters, vec![names(&["a", "b"]), names(&["c"])]);
    }

    #[test]
    fn kmeans_of_nothing_is_empty() {
        assert!(kmeans_clusters(&[], &[]).is_empty());
    }
}
