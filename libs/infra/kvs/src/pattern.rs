// [libs/infra/kvs/src/pattern.rs]
//! Minimal glob matcher for `scan_by_pattern` — only the `*` wildcard is
//! recognized, which is all the scheduler and retention-enforcement job ever
//! need (`scheduler:lease:*`, `lens:source:*`).

pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == candidate;
    }

    let mut cursor = 0usize;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            if !candidate[cursor..].starts_with(segment) {
                return false;
            }
            cursor += segment.len();
        } else if i == segments.len() - 1 {
            return candidate[cursor..].ends_with(segment);
        } else {
            match candidate[cursor..].find(segment) {
                Some(offset) => cursor += offset + segment.len(),
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_prefix_wildcard() {
        assert!(glob_match("scheduler:lease:*", "scheduler:lease:morning_sparks:2026-07-27"));
        assert!(!glob_match("scheduler:lease:*", "scheduler:next_due:morning_sparks"));
    }

    #[test]
    fn matches_exact_pattern_without_wildcard() {
        assert!(glob_match("ack:nonce:abc", "ack:nonce:abc"));
        assert!(!glob_match("ack:nonce:abc", "ack:nonce:abcd"));
    }

    #[test]
    fn matches_middle_wildcard() {
        assert!(glob_match("sword:user:*:sparks", "sword:user:u-1:sparks"));
        assert!(!glob_match("sword:user:*:sparks", "sword:user:u-1:goals"));
    }
}
