//! Unique name generation for layers and states.

/// Return `name` if `taken(name)` is false, otherwise increment its trailing
/// number until a free name is found (`Walk` -> `Walk1`, `Walk1` -> `Walk2`).
pub fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }

    let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let mut number: u64 = name[base.len()..].parse().unwrap_or(0);
    loop {
        number += 1;
        let candidate = format!("{base}{number}");
        if !taken(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_name_is_kept() {
        assert_eq!(unique_name("Walk", |_| false), "Walk");
    }

    #[test]
    fn trailing_number_is_incremented() {
        let taken = ["Walk", "Walk1", "Run3"];
        assert_eq!(unique_name("Walk", |n| taken.contains(&n)), "Walk2");
        assert_eq!(unique_name("Run3", |n| taken.contains(&n)), "Run4");
    }
}
