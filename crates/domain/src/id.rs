use chrono::Utc;
use uuid::Uuid;

const RANDOM_LEN: usize = 9;

/// Generate a record id of the form `{prefix}_{unix millis}_{random}`.
///
/// The random part keeps ids generated within the same millisecond apart.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}_{}_{}",
        Utc::now().timestamp_millis(),
        &random[..RANDOM_LEN]
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("exercise");
        let parts = id.split('_').collect::<Vec<_>>();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "exercise");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), RANDOM_LEN);
    }

    #[test]
    fn test_generate_id_unique_within_same_millisecond() {
        let ids = (0..1000)
            .map(|_| generate_id("workout"))
            .collect::<std::collections::BTreeSet<_>>();

        assert_eq!(ids.len(), 1000);
    }
}
