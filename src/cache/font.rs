//! Font size cache
//!
//! Bitmap fonts are baked at a handful of discrete sizes, each registered as
//! its own font named `{family}_{size}`. This cache remembers which sizes
//! exist per family and picks the baked font to use for a requested size.

use crate::repository::Repository;

/// Available baked sizes per font family (whole pixels), kept sorted ascending
#[derive(Debug, Default)]
pub struct FontSizeCache {
    sizes: Repository<Vec<u32>>,
}

impl FontSizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a baked size for a family. Duplicates are kept.
    pub fn add_font_size(&mut self, family: &str, size: u32) {
        if !self.sizes.has(family) {
            self.sizes.add(family, Vec::new());
        }
        if let Some(list) = self.sizes.get_mut(family) {
            list.push(size);
            list.sort_unstable();
        }
    }

    /// Name of the baked font to use for `size`.
    ///
    /// Picks the first known size strictly greater than `size`, or the largest
    /// known size when none is. Unknown families are returned unchanged.
    pub fn get_font_name(&self, family: &str, size: u32) -> String {
        let Some(list) = self.sizes.get(family) else {
            return family.to_string();
        };
        let chosen = list
            .iter()
            .copied()
            .find(|&known| size < known)
            .or_else(|| list.last().copied());
        match chosen {
            Some(known) => format!("{}_{}", family, known),
            None => family.to_string(),
        }
    }

    /// Sizes registered for a family, ascending
    pub fn sizes(&self, family: &str) -> Option<&[u32]> {
        self.sizes.get(family).map(|v| v.as_slice())
    }

    pub fn families(&self) -> &[String] {
        self.sizes.keys()
    }

    pub fn remove_family(&mut self, family: &str) -> bool {
        self.sizes.remove(family)
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arial() -> FontSizeCache {
        let mut cache = FontSizeCache::new();
        cache.add_font_size("Arial", 12);
        cache.add_font_size("Arial", 24);
        cache.add_font_size("Arial", 18);
        cache
    }

    #[test]
    fn test_sizes_stay_sorted() {
        assert_eq!(arial().sizes("Arial"), Some(&[12, 18, 24][..]));
    }

    #[test]
    fn test_font_name_lookup() {
        let cache = arial();
        assert_eq!(cache.get_font_name("Arial", 10), "Arial_12");
        assert_eq!(cache.get_font_name("Arial", 20), "Arial_24");
        assert_eq!(cache.get_font_name("Arial", 30), "Arial_24");
        // Strictly greater: an exact match moves to the next size up
        assert_eq!(cache.get_font_name("Arial", 12), "Arial_18");
        assert_eq!(cache.get_font_name("Arial", 24), "Arial_24");
    }

    #[test]
    fn test_unknown_family_passthrough() {
        assert_eq!(arial().get_font_name("Helvetica", 10), "Helvetica");
    }

    #[test]
    fn test_single_size_family() {
        let mut cache = FontSizeCache::new();
        cache.add_font_size("Pixel", 8);
        assert_eq!(cache.get_font_name("Pixel", 4), "Pixel_8");
        assert_eq!(cache.get_font_name("Pixel", 8), "Pixel_8");
        assert_eq!(cache.get_font_name("Pixel", 16), "Pixel_8");
    }

    #[test]
    fn test_duplicates_retained() {
        let mut cache = FontSizeCache::new();
        cache.add_font_size("Mono", 10);
        cache.add_font_size("Mono", 10);
        assert_eq!(cache.sizes("Mono"), Some(&[10, 10][..]));
        assert_eq!(cache.families(), ["Mono"]);
    }

    #[test]
    fn test_remove_family() {
        let mut cache = arial();
        assert!(cache.remove_family("Arial"));
        assert_eq!(cache.get_font_name("Arial", 10), "Arial");
    }
}
