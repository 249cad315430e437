use std::path::PathBuf;

use dirs_next::home_dir;

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde(" /tmp/form.yaml "), PathBuf::from("/tmp/form.yaml"));
    }

    #[test]
    fn tilde_prefix_expands_to_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/forms/a.yaml"), home.join("forms/a.yaml"));
        }
    }
}
