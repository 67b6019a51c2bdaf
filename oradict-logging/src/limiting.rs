use std::fmt::{self, Debug, Display};

/// Truncates the formatted value to at most `limit` characters
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxLogLength<'a, T> {
    limit: Option<usize>,
    val: &'a T,
}

impl<'a, T> MaxLogLength<'a, T> {
    pub fn new(limit: Option<usize>, val: &'a T) -> Self {
        Self { limit, val }
    }

    fn write_limited(&self, f: &mut fmt::Formatter<'_>, fmt: String) -> fmt::Result {
        let cut = self
            .limit
            .and_then(|limit| fmt.char_indices().nth(limit).map(|(idx, _)| idx));

        match cut {
            Some(idx) => write!(f, "{}...", &fmt[..idx]),
            None => write!(f, "{}", fmt),
        }
    }
}

impl<'a, T: Debug> Debug for MaxLogLength<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_limited(f, format!("{:?}", self.val))
    }
}

impl<'a, T: Display> Display for MaxLogLength<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_limited(f, self.val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_log_length_within_bounds() {
        let val = vec![1, 2, 3, 4, 5];
        let fmt = format!("{:?}", MaxLogLength::new(Some(50), &val));

        assert_eq!(fmt, "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn test_max_log_length_no_limit() {
        let val = vec![1, 2, 3, 4, 5];
        let fmt = format!("{:?}", MaxLogLength::new(None, &val));

        assert_eq!(fmt, "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn test_max_log_length_truncated() {
        let val = vec![1, 2, 3, 4, 5];
        let fmt = format!("{:?}", MaxLogLength::new(Some(5), &val));

        assert_eq!(fmt, "[1, 2...");
    }

    #[test]
    fn test_max_log_length_display_multibyte() {
        let val = "ÄÖÜ-TABLE";
        let fmt = format!("{}", MaxLogLength::new(Some(2), &val));

        assert_eq!(fmt, "ÄÖ...");
    }
}
