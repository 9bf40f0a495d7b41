//! Companion test lookup over the files of one scan.

use std::path::Path;

use govlint_core::FxHashMap;

use crate::engine::CompanionResolver;

/// Maps lowercased file stems to the loaded text of each `.cls` file.
/// Apex class names are case-insensitive and match their file names.
pub struct CompanionIndex<'t> {
    by_stem: FxHashMap<String, &'t str>,
}

impl<'t> CompanionIndex<'t> {
    /// Index `files`; the first file wins when two stems collide.
    pub fn new<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a Path, &'t str)>,
    {
        let mut by_stem = FxHashMap::default();
        for (path, text) in files {
            if !is_class_file(path) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                by_stem.entry(stem.to_ascii_lowercase()).or_insert(text);
            }
        }
        Self { by_stem }
    }

    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }
}

impl CompanionResolver for CompanionIndex<'_> {
    fn resolve(&self, class_name: &str) -> Option<String> {
        self.by_stem
            .get(&class_name.to_ascii_lowercase())
            .map(|text| text.to_string())
    }
}

fn is_class_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("cls"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_case_insensitive_stem() {
        let files = [
            (Path::new("classes/AccountService.cls"), "class AccountService {}"),
            (Path::new("classes/accountservicetest.cls"), "class AccountServiceTest {}"),
            (Path::new("triggers/AccountServiceTest.trigger"), "trigger X on Account (after insert) {}"),
        ];
        let index = CompanionIndex::new(files);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.resolve("AccountServiceTest").as_deref(),
            Some("class AccountServiceTest {}")
        );
        assert!(index.resolve("Missing").is_none());
    }
}
