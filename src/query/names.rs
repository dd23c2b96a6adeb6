//! Variable name allocation

/// Find a name that is not taken, starting from `candidate`
///
/// The candidate is returned as is when it is free. Otherwise its trailing
/// number is incremented (`id` → `id1` → `id2`, `x9` → `x10`) until a free
/// name is found.
pub fn unique_name(candidate: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(candidate) {
        return candidate.to_string();
    }

    let stem = candidate.trim_end_matches(|c: char| c.is_ascii_digit());
    let mut n: u64 = candidate[stem.len()..]
        .parse::<u64>()
        .map(|n| n + 1)
        .unwrap_or(1);

    loop {
        let name = format!("{}{}", stem, n);
        if !is_taken(&name) {
            return name;
        }
        n += 1;
    }
}
