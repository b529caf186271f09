/// Score at or above which a fuzzy pattern candidate is accepted.
pub const FUZZY_ACCEPT_THRESHOLD: f32 = 0.65;

/// Normalized similarity between two strings in [0.0, 1.0].
///
/// The metric is Levenshtein edit distance over Unicode scalar values,
/// normalized by the longer string's length: `1 - distance / max_len`.
/// Symmetric, reflexive (`similarity(a, a) == 1.0`), and monotonic under
/// single-character edits. This exact formulation is the compatibility
/// surface behind [`FUZZY_ACCEPT_THRESHOLD`].
pub fn similarity(s1: &str, s2: &str) -> f32 {
    if s1 == s2 {
        return 1.0;
    }

    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - (levenshtein(&a, &b) as f32 / max_len as f32)
}

/// Edit distance using the two-row O(min(m,n)) space algorithm. Runs in
/// time proportional to the product of the input lengths.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let (m, n) = (a.len(), b.len());
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b, _m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
