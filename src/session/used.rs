use std::collections::HashSet;

/// Barcodes already reserved in the selected folder, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct UsedBarcodes {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl UsedBarcodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the barcode was already present.
    pub fn insert(&mut self, barcode: &str) -> bool {
        if self.seen.contains(barcode) {
            return false;
        }
        self.seen.insert(barcode.to_string());
        self.order.push(barcode.to_string());
        true
    }

    pub fn contains(&self, barcode: &str) -> bool {
        self.seen.contains(barcode)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for UsedBarcodes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut used = Self::new();
        for barcode in iter {
            used.insert(barcode.as_ref());
        }
        used
    }
}
