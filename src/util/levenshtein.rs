use std::cmp::{max, min};

/// Picks the candidate nearest to `name` by edit distance, or [`None`] if
/// none is within a third of the length of `name`.
///
/// Used to suggest a declared property when a read names one that does not
/// exist.
///
/// # Examples
/// ```ignore
/// let names = ["full_name", "initials"];
/// assert_eq!(closest_name("ful_name", names.iter()), Some(&"full_name"));
/// assert_eq!(closest_name("age", names.iter()), None);
/// ```
pub fn closest_name<S>(name: &str, names: impl Iterator<Item = S>) -> Option<S>
where
    S: AsRef<str>,
{
    let limit = max(name.chars().count(), 3) / 3;
    let mut best: Option<(usize, S)> = None;
    for candidate in names {
        if candidate.as_ref().is_empty() {
            continue;
        }
        let dist = distance(name, candidate.as_ref());
        let closer = match &best {
            Option::Some((best_dist, _)) => dist < *best_dist,
            Option::None => true,
        };
        if dist <= limit && closer {
            best = Some((dist, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Number of single-character insertions, deletions and substitutions
/// turning `a` into `b`.
fn distance(a: &str, b: &str) -> usize {
    let b = b.chars().collect::<Vec<_>>();
    let mut previous = (0..=b.len()).collect::<Vec<_>>();
    let mut current = vec![0; b.len() + 1];
    for (i, ac) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let substitute = previous[j] + usize::from(ac != *bc);
            current[j + 1] = min(substitute, min(previous[j + 1], current[j]) + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::{closest_name, distance};

    #[test]
    fn identical() {
        assert_eq!(distance("abc", "abc"), 0);
        assert_eq!(distance("", ""), 0);
    }

    #[test]
    fn empty() {
        for text in &["a", "ab", "abc", "abcd"] {
            assert_eq!(distance(text, ""), text.len());
            assert_eq!(distance("", text), text.len());
        }
    }

    #[test]
    fn general() {
        assert_eq!(distance("sitting", "kitten"), 3);
        assert_eq!(distance("gumbo", "gambol"), 2);
        assert_eq!(distance("saturday", "sunday"), 3);
        assert_eq!(distance("full_name", "ful_name"), 1);
        assert_eq!(distance("Tier", "Tor"), 2);
    }

    #[test]
    fn closest() {
        let names = ["full_name", "initials", "display"];
        assert_eq!(closest_name("fullname", names.iter()), Some(&"full_name"));
        assert_eq!(closest_name("initial", names.iter()), Some(&"initials"));
        assert_eq!(closest_name("zzzzzz", names.iter()), None);
        assert_eq!(closest_name("x", std::iter::empty::<&str>()), None);
    }

    #[test]
    fn ties_keep_first() {
        let names = ["abce", "", "abcf", "abcd"];
        assert_eq!(closest_name("abcx", names.iter()), Some(&"abce"));
        assert_eq!(closest_name("abcd", names.iter()), Some(&"abcd"));
    }
}
